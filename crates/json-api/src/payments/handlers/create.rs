//! Create PayPal Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::JsonBody, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    payments::models::{PaypalOrderRequest, PaypalOrderResponse},
    state::State,
};

/// Create PayPal Order Handler
///
/// Validates and prices the draft, then opens a PayPal order for its total.
#[endpoint(
    tags("payments"),
    summary = "Create PayPal Order",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    json: JsonBody<PaypalOrderRequest>,
    depot: &mut Depot,
) -> Result<ApiResponse<PaypalOrderResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;
    let caller = depot.caller_or_401()?;

    let order = state
        .app
        .placement
        .create_external_payment(caller, json.into_inner().into())
        .await?;

    Ok(ApiResponse::created("PayPal order created", order.into()))
}

#[cfg(test)]
mod tests {
    use martina_app::domain::{
        payments::ExternalPaymentOrder,
        placement::{MockPlacementService, PlacementError, models::PlacementState},
        users::models::User,
    };
    use salvo::test::{ResponseExt, TestClient};
    use serde_json::json;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::{
        envelope::ErrorBody,
        test_helpers::{Envelope, make_user, placement_service},
    };

    use super::*;

    fn make_service(placement: MockPlacementService, caller: User) -> Service {
        placement_service(
            placement,
            caller,
            Router::with_path("payments/paypal/orders").post(handler),
        )
    }

    fn strict(placement: &mut MockPlacementService) {
        placement.expect_place_order().never();
        placement.expect_quote().never();
        placement.expect_capture_external_payment().never();
        placement.expect_my_orders().never();
        placement.expect_user_orders().never();
    }

    #[tokio::test]
    async fn test_create_paypal_order_returns_201() -> TestResult {
        let address = Uuid::now_v7();

        let mut placement = MockPlacementService::new();

        placement
            .expect_create_external_payment()
            .once()
            .withf(move |_, request| {
                request.address.map(|address| address.into_uuid()) == Some(address)
                    && request.draft.products.len() == 1
            })
            .return_once(|_, _| {
                Ok(ExternalPaymentOrder {
                    id: "5O190127TN364715T".to_string(),
                    value: "39.00".to_string(),
                    currency_code: "USD".to_string(),
                })
            });

        strict(&mut placement);

        let mut res = TestClient::post("http://example.com/payments/paypal/orders")
            .json(&json!({
                "products": [{ "product_id": Uuid::now_v7(), "quantity": 1 }],
                "address": address
            }))
            .send(&make_service(placement, make_user("Ada")))
            .await;

        let body: Envelope<PaypalOrderResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::CREATED));
        assert_eq!(body.data.id, "5O190127TN364715T");
        assert_eq!(body.data.value, "39.00");
        assert_eq!(body.data.currency_code, "USD");

        Ok(())
    }

    #[tokio::test]
    async fn test_gateway_failure_returns_502() -> TestResult {
        let mut placement = MockPlacementService::new();

        placement
            .expect_create_external_payment()
            .once()
            .return_once(|_, _| {
                Err(PlacementError::ExternalService {
                    message: "PayPal did not accept the order".to_string(),
                    reason: "payment_gateway_failed",
                    state: PlacementState::Rejected,
                })
            });

        strict(&mut placement);

        let mut res = TestClient::post("http://example.com/payments/paypal/orders")
            .json(&json!({
                "products": [{ "product_id": Uuid::now_v7(), "quantity": 1 }]
            }))
            .send(&make_service(placement, make_user("Ada")))
            .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));
        assert_eq!(body.reason, "payment_gateway_failed");

        Ok(())
    }
}
