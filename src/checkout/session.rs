use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{info, warn};

use super::gateway::OrderGateway;
use super::state::CheckoutState;
use super::timer::{ExpiryTimer, format_countdown};
use crate::error::{
    CheckoutError, MSG_CANCELLED, MSG_EXPIRED, MSG_MISSING_PRODUCT, MSG_NETWORK,
    MSG_NOT_LOGGED_IN, MSG_SUBMIT_FAILED,
};
use crate::model::order::Order;
use crate::model::product::ProductSelection;

struct Inner {
    state: CheckoutState,
    timer: Option<ExpiryTimer>,
    /// Banner shown over a non-error view (submit failure, expiry).
    banner: Option<String>,
    expired: bool,
    /// Off for a resubmitted rejected order; the backend only enforces
    /// expiry on orders that were never submitted.
    enforce_expiry: bool,
    is_submitting: bool,
    existing: bool,
}

impl Inner {
    fn stop_timer(&mut self) {
        if let Some(mut timer) = self.timer.take() {
            timer.cancel();
        }
    }

    fn enter_pending(&mut self, order: Order) {
        self.stop_timer();
        self.timer = Some(ExpiryTimer::start(order.expire_seconds));
        self.expired = false;
        self.enforce_expiry = true;
        self.banner = None;
        self.state = CheckoutState::Pending { order };
    }

    /// Back to pending after a rejection. The countdown is shown while it
    /// has time left but never blocks submission.
    fn reenter_pending(&mut self, order: Order) {
        self.stop_timer();
        self.timer = (order.expire_seconds > 0).then(|| ExpiryTimer::start(order.expire_seconds));
        self.expired = false;
        self.enforce_expiry = false;
        self.banner = None;
        self.state = CheckoutState::Pending { order };
    }

    fn shows_order(&self, order_no: &str) -> bool {
        self.state.is_pending() && self.state.order().is_some_and(|o| o.order_no == order_no)
    }

    fn enter(&mut self, state: CheckoutState) {
        match state {
            CheckoutState::Pending { order } => self.enter_pending(order),
            other => {
                self.stop_timer();
                self.banner = None;
                self.state = other;
            }
        }
    }

    fn fail(&mut self, err: &CheckoutError) {
        self.stop_timer();
        self.banner = None;
        self.state = CheckoutState::Error {
            message: err.user_message(),
        };
    }

    /// Fold a countdown that reached zero into the expiry banner.
    fn sync_expiry(&mut self) {
        if self.expired || !self.enforce_expiry || !self.state.is_pending() {
            return;
        }
        if self.timer.as_ref().is_some_and(ExpiryTimer::is_expired) {
            self.expired = true;
            self.banner = Some(MSG_EXPIRED.to_string());
            if let Some(order) = self.state.order() {
                warn!(order_no = %order.order_no, "order expired before submission");
            }
        }
    }
}

/// Clears the in-flight flag even if the submit future is dropped.
struct SubmitGuard<'a> {
    inner: &'a Mutex<Inner>,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.inner.lock().is_submitting = false;
    }
}

/// Checkout flow for one order: create or open it, count down its expiry,
/// submit payment proof.
///
/// All failures end up as a single user-facing message, either the
/// [`CheckoutState::Error`] view or the banner returned by [`Self::error`].
/// Operations also return the error for callers that want it.
pub struct CheckoutSession<G> {
    gateway: G,
    user_id: Option<String>,
    inner: Mutex<Inner>,
}

impl<G: OrderGateway> CheckoutSession<G> {
    pub fn new(gateway: G, user_id: Option<String>) -> Self {
        Self {
            gateway,
            user_id: user_id.filter(|id| !id.trim().is_empty()),
            inner: Mutex::new(Inner {
                state: CheckoutState::Loading,
                timer: None,
                banner: None,
                expired: false,
                enforce_expiry: true,
                is_submitting: false,
                existing: false,
            }),
        }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn state(&self) -> CheckoutState {
        let mut inner = self.inner.lock();
        inner.sync_expiry();
        inner.state.clone()
    }

    pub fn order(&self) -> Option<Order> {
        self.inner.lock().state.order().cloned()
    }

    /// Seconds left on the pending order, 0 when no countdown applies.
    pub fn countdown(&self) -> u64 {
        let inner = self.inner.lock();
        match (&inner.state, &inner.timer) {
            (CheckoutState::Pending { .. }, Some(timer)) => timer.remaining(),
            _ => 0,
        }
    }

    /// Countdown as `m:ss`, only while pending.
    pub fn countdown_display(&self) -> Option<String> {
        let inner = self.inner.lock();
        match (&inner.state, &inner.timer) {
            (CheckoutState::Pending { .. }, Some(timer)) => {
                Some(format_countdown(timer.remaining()))
            }
            _ => None,
        }
    }

    /// Tick stream of the running countdown.
    pub fn watch_countdown(&self) -> Option<watch::Receiver<u64>> {
        let inner = self.inner.lock();
        match (&inner.state, &inner.timer) {
            (CheckoutState::Pending { .. }, Some(timer)) => Some(timer.subscribe()),
            _ => None,
        }
    }

    /// The message the user should currently see, if any.
    pub fn error(&self) -> Option<String> {
        let mut inner = self.inner.lock();
        inner.sync_expiry();
        match &inner.state {
            CheckoutState::Error { message } => Some(message.clone()),
            _ => inner.banner.clone(),
        }
    }

    pub fn is_expired(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.sync_expiry();
        inner.expired
    }

    pub fn is_submitting(&self) -> bool {
        self.inner.lock().is_submitting
    }

    /// Whether the backend returned an already pending order on create.
    pub fn is_existing_order(&self) -> bool {
        self.inner.lock().existing
    }

    /// Submission is possible: pending, not expired, nothing in flight.
    pub fn can_submit(&self) -> bool {
        let mut inner = self.inner.lock();
        inner.sync_expiry();
        inner.state.is_pending() && !inner.expired && !inner.is_submitting
    }

    fn require_user(&self) -> Result<&str, CheckoutError> {
        self.user_id
            .as_deref()
            .ok_or_else(|| CheckoutError::Auth(MSG_NOT_LOGGED_IN.to_string()))
    }

    fn reject(&self, err: CheckoutError) -> Result<(), CheckoutError> {
        self.inner.lock().fail(&err);
        Err(err)
    }

    /// Create a new order for `selection` and show it as pending.
    ///
    /// Identity and selection are checked before any request is made.
    pub async fn start_order(&self, selection: &ProductSelection) -> Result<(), CheckoutError> {
        let user_id = match self.require_user() {
            Ok(id) => id,
            Err(e) => return self.reject(e),
        };
        let Some((product_type, product_id)) = selection.complete() else {
            return self.reject(CheckoutError::Input(MSG_MISSING_PRODUCT.to_string()));
        };

        self.inner.lock().enter(CheckoutState::Loading);
        info!(product_type, product_id, pay_method = %selection.pay_method, "creating order");

        let result = self
            .gateway
            .create_order(user_id, product_type, product_id, selection.pay_method)
            .await;

        match result {
            Ok(resp) => {
                info!(
                    order_no = %resp.data.order_no,
                    existing = resp.existing,
                    expire_seconds = resp.data.expire_seconds,
                    "order ready for payment"
                );
                let mut inner = self.inner.lock();
                inner.existing = resp.existing;
                inner.enter_pending(resp.data);
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "order creation failed");
                self.reject(network_fallback(e, MSG_NETWORK))
            }
        }
    }

    /// Load an existing order and show the view matching its status.
    pub async fn open_order(&self, order_no: &str) -> Result<(), CheckoutError> {
        let user_id = match self.require_user() {
            Ok(id) => id,
            Err(e) => return self.reject(e),
        };

        self.inner.lock().enter(CheckoutState::Loading);

        match self.gateway.get_order(order_no, user_id).await {
            Ok(order) => {
                let state = CheckoutState::from_order(order);
                info!(order_no, view = state.name(), "order loaded");
                self.inner.lock().enter(state);
                Ok(())
            }
            Err(e) => {
                warn!(order_no, error = %e, "order fetch failed");
                self.reject(network_fallback(e, MSG_NETWORK))
            }
        }
    }

    /// Send payment proof for the pending order.
    ///
    /// A blank `transaction_id` is sent as `null`. On failure the session
    /// stays pending with the server's message as banner so the user can
    /// retry.
    pub async fn submit(&self, transaction_id: Option<&str>) -> Result<(), CheckoutError> {
        let user_id = self.require_user()?;

        let order = {
            let mut inner = self.inner.lock();
            inner.sync_expiry();
            if inner.is_submitting {
                return Err(CheckoutError::SubmitInFlight);
            }
            let order = match &inner.state {
                CheckoutState::Pending { order } => order.clone(),
                other => {
                    return Err(CheckoutError::InvalidState {
                        state: other.name(),
                    });
                }
            };
            if inner.expired {
                return Err(CheckoutError::Expired);
            }
            inner.is_submitting = true;
            inner.banner = None;
            order
        };
        let guard = SubmitGuard { inner: &self.inner };

        let result = self
            .gateway
            .submit_order(&order.order_no, user_id, transaction_id)
            .await;
        drop(guard);

        let mut inner = self.inner.lock();
        if !inner.shows_order(&order.order_no) {
            // the session moved on to another order while this one was in flight
            warn!(
                order_no = %order.order_no,
                succeeded = result.is_ok(),
                "dropping submit result for an order no longer shown"
            );
            return result.map(|_| ());
        }
        match result {
            Ok(_) => {
                info!(order_no = %order.order_no, "order submitted for review");
                inner.enter(CheckoutState::Submitted { order });
                Ok(())
            }
            Err(e) => {
                let err = network_fallback(e, MSG_SUBMIT_FAILED);
                warn!(order_no = %order.order_no, error = %err, "order submission failed");
                inner.banner = Some(err.user_message());
                Err(err)
            }
        }
    }

    /// Go back from the rejected view to the pending form.
    ///
    /// This is a local reset only; the backend accepts a new submission on a
    /// rejected order however long ago it was created, so the expiry block
    /// does not apply. A countdown still runs if the order has time left.
    pub async fn resubmit(&self) -> Result<(), CheckoutError> {
        let mut inner = self.inner.lock();
        let order = match &inner.state {
            CheckoutState::Rejected { order } => order.clone(),
            other => {
                return Err(CheckoutError::InvalidState {
                    state: other.name(),
                });
            }
        };
        info!(order_no = %order.order_no, "resubmitting rejected order");
        inner.reenter_pending(order);
        Ok(())
    }

    /// Cancel the pending order on the backend and close the session.
    ///
    /// Refused while a submission is in flight.
    pub async fn cancel(&self) -> Result<(), CheckoutError> {
        let user_id = self.require_user()?;
        let order = {
            let inner = self.inner.lock();
            if inner.is_submitting {
                return Err(CheckoutError::SubmitInFlight);
            }
            match &inner.state {
                CheckoutState::Pending { order } => order.clone(),
                other => {
                    return Err(CheckoutError::InvalidState {
                        state: other.name(),
                    });
                }
            }
        };

        match self.gateway.cancel_order(&order.order_no, user_id).await {
            Ok(_) => {
                info!(order_no = %order.order_no, "order cancelled");
                let mut inner = self.inner.lock();
                if !inner.shows_order(&order.order_no) {
                    return Ok(());
                }
                inner.stop_timer();
                inner.banner = None;
                inner.state = CheckoutState::Error {
                    message: MSG_CANCELLED.to_string(),
                };
                Ok(())
            }
            Err(e) => {
                let err = network_fallback(e, MSG_NETWORK);
                self.inner.lock().banner = Some(err.user_message());
                Err(err)
            }
        }
    }
}

/// Transport failures carry a generic message; server replies keep theirs.
fn network_fallback(err: CheckoutError, message: &str) -> CheckoutError {
    if err.is_transport() {
        CheckoutError::Network(message.to_string())
    } else {
        err
    }
}
