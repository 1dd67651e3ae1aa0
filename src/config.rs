use std::time::Duration;

use crate::error::CheckoutError;

const DEFAULT_BASE_URL: &str = "http://localhost:8000";
const DEFAULT_USER_AGENT: &str = "checkout-client/0.1.0";

/// Environment variable selecting the order backend host.
pub const BASE_URL_ENV: &str = "CHECKOUT_API_URL";

pub struct ClientConfig {
    pub base_url: String,
    pub http_client: Option<reqwest::Client>,
    /// Per-request timeout. `None` leaves reqwest's default (no timeout).
    pub timeout: Option<Duration>,
    pub user_agent: String,
}

pub struct ClientConfigBuilder {
    base_url: Option<String>,
    http_client: Option<reqwest::Client>,
    timeout: Option<Duration>,
    user_agent: Option<String>,
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_url: None,
            http_client: None,
            timeout: None,
            user_agent: None,
        }
    }

    /// Build a config whose base URL comes from `CHECKOUT_API_URL`,
    /// falling back to the local development backend.
    pub fn from_env() -> Result<Self, CheckoutError> {
        let mut builder = Self::builder();
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            if !url.trim().is_empty() {
                builder = builder.base_url(url);
            }
        }
        builder.build()
    }
}

impl ClientConfigBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn build(self) -> Result<ClientConfig, CheckoutError> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(CheckoutError::Config(format!(
                "base_url must start with http:// or https://, got {base_url:?}"
            )));
        }

        if let Some(timeout) = self.timeout {
            if timeout.is_zero() {
                return Err(CheckoutError::Config("timeout must be non-zero".into()));
            }
        }

        Ok(ClientConfig {
            base_url,
            http_client: self.http_client,
            timeout: self.timeout,
            user_agent: self
                .user_agent
                .unwrap_or_else(|| DEFAULT_USER_AGENT.to_string()),
        })
    }
}
