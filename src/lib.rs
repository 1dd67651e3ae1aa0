pub mod api;
pub mod checkout;
pub mod client;
pub mod config;
pub mod error;
pub mod model;
pub mod studio;

pub use checkout::{CheckoutSession, CheckoutState, ExpiryTimer, OrderGateway};
pub use client::CheckoutClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::CheckoutError;
