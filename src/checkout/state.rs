use tracing::warn;

use crate::model::order::{Order, OrderStatus};

/// Where a checkout currently stands, from the client's point of view.
///
/// `Expired` is deliberately not a variant: an expired order stays `Pending`
/// and the session raises the expiry banner instead.
#[derive(Debug, Clone, PartialEq)]
pub enum CheckoutState {
    Loading,
    Pending { order: Order },
    Submitted { order: Order },
    Rejected { order: Order },
    Error { message: String },
}

impl CheckoutState {
    /// Derive the view for an order fetched from the backend.
    ///
    /// Only `submitted` and `rejected` leave the pending view. A missing
    /// status is the create payload's normal shape; anything else the
    /// checkout has no screen for is logged and shown as pending.
    pub fn from_order(order: Order) -> Self {
        match order.status {
            Some(OrderStatus::Submitted) => CheckoutState::Submitted { order },
            Some(OrderStatus::Rejected) => CheckoutState::Rejected { order },
            None | Some(OrderStatus::Pending) => CheckoutState::Pending { order },
            Some(
                other @ (OrderStatus::Paid
                | OrderStatus::Expired
                | OrderStatus::Cancelled
                | OrderStatus::Unknown),
            ) => {
                warn!(
                    order_no = %order.order_no,
                    status = other.as_str(),
                    "order status has no checkout view, showing as pending"
                );
                CheckoutState::Pending { order }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CheckoutState::Loading => "loading",
            CheckoutState::Pending { .. } => "pending",
            CheckoutState::Submitted { .. } => "submitted",
            CheckoutState::Rejected { .. } => "rejected",
            CheckoutState::Error { .. } => "error",
        }
    }

    pub fn order(&self) -> Option<&Order> {
        match self {
            CheckoutState::Pending { order }
            | CheckoutState::Submitted { order }
            | CheckoutState::Rejected { order } => Some(order),
            CheckoutState::Loading | CheckoutState::Error { .. } => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, CheckoutState::Pending { .. })
    }

    /// Submitted and error are final for this session.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CheckoutState::Submitted { .. } | CheckoutState::Error { .. }
        )
    }
}
