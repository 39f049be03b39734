//! Placement service.

use async_trait::async_trait;
use martina::orders::Quote;
use mockall::automock;

use crate::domain::{
    orders::models::Order,
    payments::{CapturedPayment, ExternalPaymentOrder},
    placement::{
        errors::PlacementError,
        models::{ExternalPaymentRequest, OrderDraft, PlacementOutcome, PlacementRequest},
    },
    users::models::{User, UserUuid},
};

#[automock]
#[async_trait]
pub trait PlacementService: Send + Sync {
    /// Validates, prices and places an order for `caller`.
    async fn place_order(
        &self,
        caller: &User,
        request: PlacementRequest,
    ) -> Result<PlacementOutcome, PlacementError>;

    /// Prices a draft without persisting anything.
    async fn quote(&self, caller: &User, draft: OrderDraft) -> Result<Quote, PlacementError>;

    /// Opens an external payment for the recomputed total of a draft.
    async fn create_external_payment(
        &self,
        caller: &User,
        request: ExternalPaymentRequest,
    ) -> Result<ExternalPaymentOrder, PlacementError>;

    /// Captures an approved external payment.
    async fn capture_external_payment(
        &self,
        external_order_id: String,
    ) -> Result<CapturedPayment, PlacementError>;

    /// Orders placed by `caller`, newest first.
    async fn my_orders(&self, caller: &User) -> Result<Vec<Order>, PlacementError>;

    /// Orders placed by any user. Admins only.
    async fn user_orders(&self, caller: &User, user: UserUuid)
    -> Result<Vec<Order>, PlacementError>;
}
