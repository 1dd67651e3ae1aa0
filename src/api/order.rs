use crate::client::{CheckoutClient, encode_path_segment};
use crate::error::{
    CheckoutError, MSG_CANCEL_FAILED, MSG_CREATE_FAILED, MSG_LIST_FAILED, MSG_ORDER_NOT_FOUND,
    MSG_SUBMIT_FAILED,
};
use crate::model::order::{
    CreateOrderRequest, CreateOrderResponse, DataEnvelope, ListOrdersQuery, Order,
    OrderActionResponse, OrderSummary, SubmitOrderRequest,
};
use crate::model::product::PayMethod;

/// Upper bound the backend accepts for the listing `limit`.
pub const MAX_LIST_LIMIT: u32 = 100;

impl CheckoutClient {
    /// Create an order.
    ///
    /// POST /api/v1/orders
    pub async fn create_order(
        &self,
        user_id: &str,
        product_type: &str,
        product_id: &str,
        pay_method: PayMethod,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        let body = CreateOrderRequest {
            user_id,
            product_type,
            product_id,
            pay_method,
        };
        self.post("/api/v1/orders", &body, MSG_CREATE_FAILED).await
    }

    /// Fetch an order owned by `user_id`.
    ///
    /// GET /api/v1/orders/{order_no}?user_id={user_id}
    ///
    /// Any non-2xx reply is reported as [`CheckoutError::NotFound`].
    pub async fn get_order(&self, order_no: &str, user_id: &str) -> Result<Order, CheckoutError> {
        let path = format!(
            "/api/v1/orders/{}?user_id={}",
            encode_path_segment(order_no),
            encode_path_segment(user_id)
        );
        match self.get::<DataEnvelope<Order>>(&path, MSG_ORDER_NOT_FOUND).await {
            Ok(envelope) => Ok(envelope.data),
            Err(CheckoutError::Request { message, .. }) => Err(CheckoutError::NotFound { message }),
            Err(e) => Err(e),
        }
    }

    /// Submit payment proof for an order.
    ///
    /// POST /api/v1/orders/{order_no}/submit?user_id={user_id}
    ///
    /// A blank `transaction_id` is sent as `null`. Any 2xx reply is a
    /// success, whatever its body.
    pub async fn submit_order(
        &self,
        order_no: &str,
        user_id: &str,
        transaction_id: Option<&str>,
    ) -> Result<OrderActionResponse, CheckoutError> {
        let path = format!(
            "/api/v1/orders/{}/submit?user_id={}",
            encode_path_segment(order_no),
            encode_path_segment(user_id)
        );
        self.post_action(&path, &SubmitOrderRequest::new(transaction_id), MSG_SUBMIT_FAILED)
            .await
    }

    /// Cancel a pending order.
    ///
    /// POST /api/v1/orders/{order_no}/cancel?user_id={user_id}
    pub async fn cancel_order(
        &self,
        order_no: &str,
        user_id: &str,
    ) -> Result<OrderActionResponse, CheckoutError> {
        let path = format!(
            "/api/v1/orders/{}/cancel?user_id={}",
            encode_path_segment(order_no),
            encode_path_segment(user_id)
        );
        self.post_action(&path, &serde_json::json!({}), MSG_CANCEL_FAILED)
            .await
    }

    /// List the user's orders, newest first.
    ///
    /// GET /api/v1/orders?user_id={user_id}&status={status}&limit={limit}
    pub async fn list_orders(
        &self,
        user_id: &str,
        query: &ListOrdersQuery,
    ) -> Result<Vec<OrderSummary>, CheckoutError> {
        let mut path = format!("/api/v1/orders?user_id={}", encode_path_segment(user_id));
        if let Some(status) = query.status {
            path.push_str(&format!("&status={}", status.as_str()));
        }
        if let Some(limit) = query.limit {
            path.push_str(&format!("&limit={}", limit.min(MAX_LIST_LIMIT)));
        }
        let envelope: DataEnvelope<Vec<OrderSummary>> = self.get(&path, MSG_LIST_FAILED).await?;
        Ok(envelope.data)
    }
}
