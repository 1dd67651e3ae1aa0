use serde::Deserialize;
use thiserror::Error;

pub(crate) const MSG_NOT_LOGGED_IN: &str = "用户未登录或用户ID无效，请重新登录";
pub(crate) const MSG_MISSING_PRODUCT: &str = "缺少商品信息";
pub(crate) const MSG_CREATE_FAILED: &str = "创建订单失败";
pub(crate) const MSG_ORDER_NOT_FOUND: &str = "订单不存在";
pub(crate) const MSG_NETWORK: &str = "网络错误，请稍后重试";
pub(crate) const MSG_SUBMIT_FAILED: &str = "提交失败，请重试";
pub(crate) const MSG_EXPIRED: &str = "订单已过期，请重新下单";
pub(crate) const MSG_CANCELLED: &str = "订单已取消";
pub(crate) const MSG_CANCEL_FAILED: &str = "取消订单失败";
pub(crate) const MSG_LIST_FAILED: &str = "获取订单列表失败";

#[derive(Error, Debug)]
pub enum CheckoutError {
    #[error("{0}")]
    Auth(String),

    #[error("{0}")]
    Input(String),

    #[error("order API error: status={status}, message={message}")]
    Request { status: u16, message: String },

    #[error("order not found: {message}")]
    NotFound { message: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{}", MSG_EXPIRED)]
    Expired,

    #[error("operation not allowed in state {state}")]
    InvalidState { state: &'static str },

    #[error("a submission is already in flight")]
    SubmitInFlight,

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckoutError {
    /// The single message shown to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            CheckoutError::Auth(msg) | CheckoutError::Input(msg) => msg.clone(),
            CheckoutError::Request { message, .. } | CheckoutError::NotFound { message } => {
                message.clone()
            }
            CheckoutError::Network(msg) => msg.clone(),
            CheckoutError::Http(_) | CheckoutError::Serialize(_) | CheckoutError::Io(_) => {
                MSG_NETWORK.to_string()
            }
            CheckoutError::Expired => MSG_EXPIRED.to_string(),
            CheckoutError::InvalidState { state } => format!("当前订单状态不允许此操作: {state}"),
            CheckoutError::SubmitInFlight => "正在提交，请稍候".to_string(),
            CheckoutError::Config(msg) => msg.clone(),
        }
    }

    /// True for failures that never reached the backend or never got a reply.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CheckoutError::Http(_) | CheckoutError::Network(_) | CheckoutError::Serialize(_)
        )
    }
}

/// Error body returned by the order backend on non-2xx responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorResponse {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ApiErrorResponse {
    /// Human-readable detail. Validation failures arrive as a JSON array and
    /// are passed through as their JSON text.
    pub fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.is_empty() => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}
