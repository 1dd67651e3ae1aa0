pub mod gateway;
pub mod session;
pub mod state;
pub mod timer;

pub use gateway::OrderGateway;
pub use session::CheckoutSession;
pub use state::CheckoutState;
pub use timer::{ExpiryTimer, format_countdown};
