use serde::{Deserialize, Serialize};

use super::product::PayMethod;

/// Status field as reported by the order backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Pending,
    Submitted,
    Paid,
    Rejected,
    Expired,
    Cancelled,
    /// Any status string this client does not know about.
    #[serde(other)]
    Unknown,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Submitted => "submitted",
            OrderStatus::Paid => "paid",
            OrderStatus::Rejected => "rejected",
            OrderStatus::Expired => "expired",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Order {
    pub order_no: String,
    pub product_name: String,
    #[serde(default)]
    pub product_type: Option<String>,
    #[serde(default)]
    pub product_id: Option<String>,
    pub base_amount: f64,
    pub pay_amount: f64,
    pub price_code: String,
    #[serde(default)]
    pub pay_method: Option<PayMethod>,
    #[serde(default)]
    pub qrcode_url: Option<String>,
    /// Absent on the create payload.
    #[serde(default)]
    pub status: Option<OrderStatus>,
    pub expire_at: String,
    /// Server-computed seconds left at response time, never negative.
    #[serde(default)]
    pub expire_seconds: u64,
    #[serde(default)]
    pub transaction_id: Option<String>,
    #[serde(default)]
    pub reject_reason: Option<String>,
}

/// Row returned by the order listing endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct OrderSummary {
    pub order_no: String,
    pub product_name: String,
    pub pay_amount: f64,
    pub status: OrderStatus,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateOrderRequest<'a> {
    pub user_id: &'a str,
    pub product_type: &'a str,
    pub product_id: &'a str,
    pub pay_method: PayMethod,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmitOrderRequest {
    /// Serialized as `null` when the user left the field blank.
    pub transaction_id: Option<String>,
}

impl SubmitOrderRequest {
    pub fn new(transaction_id: Option<&str>) -> Self {
        Self {
            transaction_id: transaction_id
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from),
        }
    }
}

/// Envelope of the create endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateOrderResponse {
    pub data: Order,
    /// Set when the backend handed back an already pending order for the
    /// same product instead of creating a new one.
    #[serde(default)]
    pub existing: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderActionResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub redirect_url: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ListOrdersQuery {
    pub status: Option<OrderStatus>,
    pub limit: Option<u32>,
}
