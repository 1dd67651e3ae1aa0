use async_trait::async_trait;

use crate::client::CheckoutClient;
use crate::error::CheckoutError;
use crate::model::order::{CreateOrderResponse, Order, OrderActionResponse};
use crate::model::product::PayMethod;

/// Order backend operations a checkout session needs.
///
/// [`CheckoutClient`] is the HTTP implementation.
#[async_trait]
pub trait OrderGateway: Send + Sync {
    async fn create_order(
        &self,
        user_id: &str,
        product_type: &str,
        product_id: &str,
        pay_method: PayMethod,
    ) -> Result<CreateOrderResponse, CheckoutError>;

    async fn get_order(&self, order_no: &str, user_id: &str) -> Result<Order, CheckoutError>;

    async fn submit_order(
        &self,
        order_no: &str,
        user_id: &str,
        transaction_id: Option<&str>,
    ) -> Result<OrderActionResponse, CheckoutError>;

    async fn cancel_order(
        &self,
        order_no: &str,
        user_id: &str,
    ) -> Result<OrderActionResponse, CheckoutError>;
}

#[async_trait]
impl OrderGateway for CheckoutClient {
    async fn create_order(
        &self,
        user_id: &str,
        product_type: &str,
        product_id: &str,
        pay_method: PayMethod,
    ) -> Result<CreateOrderResponse, CheckoutError> {
        CheckoutClient::create_order(self, user_id, product_type, product_id, pay_method).await
    }

    async fn get_order(&self, order_no: &str, user_id: &str) -> Result<Order, CheckoutError> {
        CheckoutClient::get_order(self, order_no, user_id).await
    }

    async fn submit_order(
        &self,
        order_no: &str,
        user_id: &str,
        transaction_id: Option<&str>,
    ) -> Result<OrderActionResponse, CheckoutError> {
        CheckoutClient::submit_order(self, order_no, user_id, transaction_id).await
    }

    async fn cancel_order(
        &self,
        order_no: &str,
        user_id: &str,
    ) -> Result<OrderActionResponse, CheckoutError> {
        CheckoutClient::cancel_order(self, order_no, user_id).await
    }
}
