//! Capture PayPal Order Handler

use std::sync::Arc;

use salvo::{oapi::extract::PathParam, prelude::*};

use crate::{
    envelope::{ApiError, ApiResponse},
    extensions::*,
    payments::models::CapturedPaymentResponse,
    state::State,
};

/// Capture PayPal Order Handler
#[endpoint(
    tags("payments"),
    summary = "Capture PayPal Order",
    security(("bearer_auth" = [])),
)]
pub(crate) async fn handler(
    paypal_order_id: PathParam<String>,
    depot: &mut Depot,
) -> Result<ApiResponse<CapturedPaymentResponse>, ApiError> {
    let state = depot.obtain_or_500::<Arc<State>>()?;

    let captured = state
        .app
        .placement
        .capture_external_payment(paypal_order_id.into_inner())
        .await?;

    Ok(ApiResponse::ok("Payment captured", captured.into()))
}

#[cfg(test)]
mod tests {
    use martina_app::domain::{
        payments::CapturedPayment,
        placement::{MockPlacementService, PlacementError, models::PlacementState},
    };
    use salvo::test::{ResponseExt, TestClient};
    use testresult::TestResult;

    use crate::{
        envelope::ErrorBody,
        test_helpers::{Envelope, make_user, placement_service},
    };

    use super::*;

    fn make_service(placement: MockPlacementService) -> Service {
        placement_service(
            placement,
            make_user("Ada"),
            Router::with_path("payments/paypal/orders/{paypal_order_id}/capture").post(handler),
        )
    }

    fn strict(placement: &mut MockPlacementService) {
        placement.expect_place_order().never();
        placement.expect_quote().never();
        placement.expect_create_external_payment().never();
        placement.expect_my_orders().never();
        placement.expect_user_orders().never();
    }

    #[tokio::test]
    async fn test_capture_returns_transaction_id() -> TestResult {
        let mut placement = MockPlacementService::new();

        placement
            .expect_capture_external_payment()
            .once()
            .withf(|order| order == "5O190127TN364715T")
            .return_once(|_| {
                Ok(CapturedPayment {
                    transaction_id: "3C679366HH908993F".to_string(),
                })
            });

        strict(&mut placement);

        let mut res = TestClient::post(
            "http://example.com/payments/paypal/orders/5O190127TN364715T/capture",
        )
        .send(&make_service(placement))
        .await;

        let body: Envelope<CapturedPaymentResponse> = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::OK));
        assert_eq!(body.message, "Payment captured");
        assert_eq!(body.data.transaction_id, "3C679366HH908993F");

        Ok(())
    }

    #[tokio::test]
    async fn test_capture_without_transaction_returns_502() -> TestResult {
        let mut placement = MockPlacementService::new();

        placement
            .expect_capture_external_payment()
            .once()
            .return_once(|_| {
                Err(PlacementError::ExternalService {
                    message: "PayPal did not capture the order".to_string(),
                    reason: "payment_capture_failed",
                    state: PlacementState::Rejected,
                })
            });

        strict(&mut placement);

        let mut res = TestClient::post(
            "http://example.com/payments/paypal/orders/5O190127TN364715T/capture",
        )
        .send(&make_service(placement))
        .await;

        let body: ErrorBody = res.take_json().await?;

        assert_eq!(res.status_code, Some(StatusCode::BAD_GATEWAY));
        assert_eq!(body.reason, "payment_capture_failed");

        Ok(())
    }
}
