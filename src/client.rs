use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};
use reqwest::StatusCode;
use tracing::{debug, warn};

use crate::config::ClientConfig;
use crate::error::{ApiErrorResponse, CheckoutError, MSG_NETWORK};

pub struct CheckoutClient {
    pub(crate) config: ClientConfig,
    pub(crate) http: reqwest::Client,
}

impl CheckoutClient {
    /// Create a client for the order backend described by `config`.
    pub fn new(config: ClientConfig) -> Self {
        let http = config.http_client.clone().unwrap_or_default();
        Self { config, http }
    }

    /// Build a client from `CHECKOUT_API_URL`.
    pub fn from_env() -> Result<Self, CheckoutError> {
        Ok(Self::new(ClientConfig::from_env()?))
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// POST a JSON body and deserialize the JSON response.
    ///
    /// `fallback` is the message used when a non-2xx body carries no detail.
    pub(crate) async fn post<Req, Resp>(
        &self,
        path: &str,
        body: &Req,
        fallback: &str,
    ) -> Result<Resp, CheckoutError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned,
    {
        let body_str = serde_json::to_string(body)?;
        let (status, resp_body) = self
            .do_request(reqwest::Method::POST, path, Some(body_str))
            .await?;
        self.read_json(status, &resp_body, fallback)
    }

    /// POST a JSON body where any 2xx reply counts as success.
    ///
    /// The reply is decoded when it parses; an empty or non-JSON success
    /// body (204, plain text) yields `Resp::default()`.
    pub(crate) async fn post_action<Req, Resp>(
        &self,
        path: &str,
        body: &Req,
        fallback: &str,
    ) -> Result<Resp, CheckoutError>
    where
        Req: serde::Serialize,
        Resp: serde::de::DeserializeOwned + Default,
    {
        let body_str = serde_json::to_string(body)?;
        let (status, resp_body) = self
            .do_request(reqwest::Method::POST, path, Some(body_str))
            .await?;
        self.read_lenient(status, &resp_body, fallback)
    }

    /// GET and deserialize the JSON response.
    pub(crate) async fn get<Resp>(&self, path: &str, fallback: &str) -> Result<Resp, CheckoutError>
    where
        Resp: serde::de::DeserializeOwned,
    {
        let (status, resp_body) = self.do_request(reqwest::Method::GET, path, None).await?;
        self.read_json(status, &resp_body, fallback)
    }

    async fn do_request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<String>,
    ) -> Result<(StatusCode, String), CheckoutError> {
        let full_url = format!("{}{path}", self.config.base_url);
        debug!(method = %method, path, "sending order API request");

        let mut req = self
            .http
            .request(method, &full_url)
            .header("Accept", "application/json")
            .header("User-Agent", &self.config.user_agent);

        if let Some(timeout) = self.config.timeout {
            req = req.timeout(timeout);
        }

        if let Some(body) = body {
            req = req.header("Content-Type", "application/json").body(body);
        }

        let resp = req.send().await?;
        let status = resp.status();
        let text = resp.text().await?;
        debug!(status = status.as_u16(), path, "order API responded");

        Ok((status, text))
    }

    fn read_json<Resp>(
        &self,
        status: StatusCode,
        body: &str,
        fallback: &str,
    ) -> Result<Resp, CheckoutError>
    where
        Resp: serde::de::DeserializeOwned,
    {
        if !status.is_success() {
            return self.parse_api_error(status, body, fallback);
        }
        serde_json::from_str(body).map_err(CheckoutError::from)
    }

    fn read_lenient<Resp>(
        &self,
        status: StatusCode,
        body: &str,
        fallback: &str,
    ) -> Result<Resp, CheckoutError>
    where
        Resp: serde::de::DeserializeOwned + Default,
    {
        if !status.is_success() {
            return self.parse_api_error(status, body, fallback);
        }
        match serde_json::from_str(body) {
            Ok(resp) => Ok(resp),
            Err(e) => {
                debug!(status = status.as_u16(), error = %e, "success reply has no usable body");
                Ok(Resp::default())
            }
        }
    }

    fn parse_api_error<T>(
        &self,
        status: StatusCode,
        body: &str,
        fallback: &str,
    ) -> Result<T, CheckoutError> {
        match serde_json::from_str::<ApiErrorResponse>(body) {
            Ok(err_resp) => Err(CheckoutError::Request {
                status: status.as_u16(),
                message: err_resp.message().unwrap_or_else(|| fallback.to_string()),
            }),
            Err(_) => {
                warn!(status = status.as_u16(), "order API error body is not JSON");
                Err(CheckoutError::Network(MSG_NETWORK.to_string()))
            }
        }
    }
}

/// Percent-encode a string so it is safe to use in a URL path segment or query value.
pub(crate) fn encode_path_segment(s: &str) -> String {
    utf8_percent_encode(s, NON_ALPHANUMERIC).to_string()
}
