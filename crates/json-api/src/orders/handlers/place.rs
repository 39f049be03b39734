//! Place Order Handler

use std::sync::Arc;

use martina_app::domain::placement::models::PlacementRequest;
use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    observability::observe_placement,
    orders::models::{PlaceOrderRequest, PlacedOrderResponse},
    state::State,
};

/// Place Order Handler
///
/// Prices the draft against current stock and discounts, reserves stock,
/// persists the order and records its payment and tracking.
#[endpoint(
    tags("orders"),
    summary = "Place Order",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<PlaceOrderRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<PlacedOrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?.clone();
    let request = PlacementRequest::try_from(json.into_inner())?;
    let placement = Arc::clone(&state.app.placement);

    // A client disconnect must not cancel a placement halfway through.
    let result = tokio::spawn(async move { placement.place_order(&caller, request).await })
        .await
        .or_500("placement_task_failed")?;

    match result {
        Ok(outcome) => {
            observe_placement(outcome.state.as_str(), "none");

            Ok(ApiResponse::created(
                "Order placed successfully",
                outcome.into(),
            ))
        }
        Err(error) => {
            observe_placement(error.state().as_str(), error.reason());

            Err(error.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use jiff::Timestamp;
    use martina_app::domain::{
        payments::models::{PaymentMethod, Transaction, TransactionStatus, TransactionUuid},
        placement::{
            MockPlacementService, PlacementError,
            models::{PlacementOutcome, PlacementState},
        },
        trackings::models::{ORDER_RECEIVED, Tracking, TrackingMethod, TrackingUuid},
        users::models::User,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        envelope::ErrorBody,
        test_helpers::{Envelope, make_order, make_user, placement_service},
    };

    use super::*;

    fn make_service(placement: MockPlacementService, caller: User) -> Service {
        placement_service(
            placement,
            caller,
            Router::with_path("orders").post(handler),
        )
    }

    fn make_outcome(caller: &User) -> PlacementOutcome {
        let order = make_order(caller.uuid, 3_900);

        PlacementOutcome {
            transaction: Transaction {
                uuid: TransactionUuid::new(),
                order: order.uuid,
                method: PaymentMethod::CashOnDelivery,
                external_id: None,
                amount: 3_900,
                status: TransactionStatus::Pending,
                created_at: Timestamp::UNIX_EPOCH,
            },
            tracking: Tracking {
                uuid: TrackingUuid::new(),
                order: order.uuid,
                method: TrackingMethod::Standard,
                shipping_date: Timestamp::UNIX_EPOCH,
                event: ORDER_RECEIVED.to_string(),
                status: ORDER_RECEIVED.to_string(),
                created_at: Timestamp::UNIX_EPOCH,
            },
            order,
            state: PlacementState::SideEffectsApplied,
        }
    }

    fn strict(placement: &mut MockPlacementService) {
        placement.expect_quote().never();
        placement.expect_create_external_payment().never();
        placement.expect_capture_external_payment().never();
        placement.expect_my_orders().never();
        placement.expect_user_orders().never();
    }

    #[tokio::test]
    async fn test_place_order_success_returns_201() -> TestResult {
        let caller = make_user("Ada");
        let caller_uuid = caller.uuid;
        let product = Uuid::now_v7();
        let outcome = make_outcome(&caller);
        let order_uuid = outcome.order.uuid.into_uuid();

        let mut placement = MockPlacementService::new();

        placement
            .expect_place_order()
            .once()
            .withf(move |caller, request| {
                caller.uuid == caller_uuid
                    && request.draft.products.len() == 1
                    && request.payment.method == PaymentMethod::CashOnDelivery
            })
            .return_once(move |_, _| Ok(outcome));

        strict(&mut placement);

        let mut res = TestClient::post("http://example.com/orders")
            .json(&json!({
                "products": [{ "product_id": product, "quantity": 1 }],
                "payment": { "method": "CASH_ON_DELIVERY" }
            }))
            .send(&make_service(placement, caller))
            .await;

        let body: Envelope<PlacedOrderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert!(body.success, "expected a success envelope");
        assert_eq!(body.message, "Order placed successfully");
        assert_eq!(body.data.order.uuid, order_uuid);
        assert_eq!(body.data.order.total, 3_900);
        assert_eq!(body.data.transaction.method, "CASH_ON_DELIVERY");
        assert_eq!(body.data.tracking.status, ORDER_RECEIVED);
        assert_eq!(body.data.state, "SIDE_EFFECTS_APPLIED");

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_stock_conflict_returns_409() -> TestResult {
        let mut placement = MockPlacementService::new();

        placement
            .expect_place_order()
            .once()
            .return_once(|_, _| {
                Err(PlacementError::Conflict {
                    message: "Not enough stock for Oak Chair".to_string(),
                    reason: "stock_insufficient",
                    state: PlacementState::Rejected,
                })
            });

        strict(&mut placement);

        let mut res = TestClient::post("http://example.com/orders")
            .json(&json!({
                "products": [{ "product_id": Uuid::now_v7(), "quantity": 99 }],
                "payment": { "method": "CASH_ON_DELIVERY" }
            }))
            .send(&make_service(placement, make_user("Ada")))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CONFLICT));
        assert!(!body.success, "expected a failure envelope");
        assert_eq!(body.reason, "stock_insufficient");
        assert_eq!(body.message, "Not enough stock for Oak Chair");

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_unknown_payment_method_returns_400() -> TestResult {
        let mut placement = MockPlacementService::new();

        placement.expect_place_order().never();
        strict(&mut placement);

        let mut res = TestClient::post("http://example.com/orders")
            .json(&json!({
                "products": [{ "product_id": Uuid::now_v7(), "quantity": 1 }],
                "payment": { "method": "BITCOIN" }
            }))
            .send(&make_service(placement, make_user("Ada")))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_REQUEST));
        assert_eq!(body.reason, "payment_method_invalid");

        Ok(())
    }

    #[tokio::test]
    async fn test_place_order_failed_after_commit_returns_500() -> TestResult {
        let mut placement = MockPlacementService::new();

        placement
            .expect_place_order()
            .once()
            .return_once(|_, _| {
                Err(PlacementError::Internal {
                    message: "Could not record the tracking".to_string(),
                    reason: "tracking_not_persisted",
                    state: PlacementState::Failed,
                })
            });

        strict(&mut placement);

        let mut res = TestClient::post("http://example.com/orders")
            .json(&json!({
                "products": [{ "product_id": Uuid::now_v7(), "quantity": 1 }],
                "payment": { "method": "CASH_ON_DELIVERY" }
            }))
            .send(&make_service(placement, make_user("Ada")))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::INTERNAL_SERVER_ERROR));
        assert_eq!(body.reason, "tracking_not_persisted");

        Ok(())
    }
}
