//! External payment gateway.
//!
//! The PayPal client speaks the Orders v2 API: it fetches a client credentials
//! token, creates a `CAPTURE` order for a recomputed amount and later captures
//! it, handing back the capture id recorded on the order transaction.

use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use mockall::automock;
use reqwest::{
    Client, Response,
    header::{AUTHORIZATION, CONTENT_TYPE},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Connection settings for the PayPal REST API.
#[derive(Clone)]
pub struct PaypalConfig {
    /// API base URL, e.g. `"https://api-m.sandbox.paypal.com"`.
    pub api: String,

    pub client_id: String,

    pub client_secret: String,

    /// Timeout applied to every request.
    pub timeout: Duration,
}

impl std::fmt::Debug for PaypalConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaypalConfig")
            .field("api", &self.api)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A payment order opened with the gateway, awaiting customer approval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalPaymentOrder {
    /// Gateway order id
    pub id: String,

    /// Amount charged, two decimals
    pub value: String,

    pub currency_code: String,
}

/// A captured payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedPayment {
    /// Gateway transaction id, supplied back when placing the order
    pub transaction_id: String,
}

/// Errors that can occur when talking to the payment gateway.
#[derive(Debug, Error)]
pub enum PaymentGatewayError {
    /// An HTTP transport or serialization error occurred.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The gateway returned a non-2xx response or an unexpected body.
    #[error("unexpected response from payment gateway: {0}")]
    UnexpectedResponse(String),
}

#[automock]
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Opens a payment order for `value` (two decimals) in `currency_code`.
    async fn create_order(
        &self,
        value: String,
        currency_code: String,
    ) -> Result<ExternalPaymentOrder, PaymentGatewayError>;

    /// Captures a previously approved payment order.
    async fn capture_order(&self, order_id: String)
    -> Result<CapturedPayment, PaymentGatewayError>;
}

/// HTTP client for the PayPal Orders API.
#[derive(Debug, Clone)]
pub struct PaypalGateway {
    config: PaypalConfig,
    http: Client,
}

impl PaypalGateway {
    /// Create a new client from the given configuration.
    ///
    /// # Errors
    ///
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(config: PaypalConfig) -> Result<Self, PaymentGatewayError> {
        let http = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { config, http })
    }

    async fn access_token(&self) -> Result<String, PaymentGatewayError> {
        let url = format!("{}/v1/oauth2/token", self.config.api);

        let credentials = BASE64.encode(format!(
            "{}:{}",
            self.config.client_id, self.config.client_secret
        ));

        let response = self
            .http
            .post(&url)
            .header(AUTHORIZATION, format!("Basic {credentials}"))
            .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await?;

        let parsed: TokenResponse = successful(response, "token").await?.json().await?;

        Ok(parsed.access_token)
    }
}

#[async_trait]
impl PaymentGateway for PaypalGateway {
    #[tracing::instrument(name = "paypal.create_order", skip(self), err)]
    async fn create_order(
        &self,
        value: String,
        currency_code: String,
    ) -> Result<ExternalPaymentOrder, PaymentGatewayError> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders", self.config.api);

        let body = serde_json::json!({
            "intent": "CAPTURE",
            "purchase_units": [{
                "amount": {
                    "currency_code": currency_code,
                    "value": value,
                },
            }],
        });

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let parsed: CreateOrderResponse = successful(response, "create order")
            .await?
            .json()
            .await?;

        debug!(paypal_order_id = %parsed.id, "created paypal order");

        Ok(ExternalPaymentOrder {
            id: parsed.id,
            value,
            currency_code,
        })
    }

    #[tracing::instrument(name = "paypal.capture_order", skip(self), err)]
    async fn capture_order(
        &self,
        order_id: String,
    ) -> Result<CapturedPayment, PaymentGatewayError> {
        let token = self.access_token().await?;
        let url = format!("{}/v2/checkout/orders/{order_id}/capture", self.config.api);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&token)
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let parsed: CaptureResponse = successful(response, "capture").await?.json().await?;

        Ok(CapturedPayment {
            transaction_id: parsed.capture_id()?,
        })
    }
}

async fn successful(response: Response, request: &str) -> Result<Response, PaymentGatewayError> {
    if response.status().is_success() {
        return Ok(response);
    }

    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    Err(PaymentGatewayError::UnexpectedResponse(format!(
        "{request} request failed with status {status}: {text}"
    )))
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Debug, Deserialize)]
struct CreateOrderResponse {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CaptureResponse {
    #[serde(default)]
    purchase_units: Vec<PurchaseUnit>,
}

impl CaptureResponse {
    fn capture_id(self) -> Result<String, PaymentGatewayError> {
        self.purchase_units
            .into_iter()
            .next()
            .and_then(|unit| unit.payments.captures.into_iter().next())
            .map(|capture| capture.id)
            .ok_or_else(|| {
                PaymentGatewayError::UnexpectedResponse(
                    "capture response holds no captures".to_string(),
                )
            })
    }
}

#[derive(Debug, Deserialize)]
struct PurchaseUnit {
    #[serde(default)]
    payments: Payments,
}

#[derive(Debug, Default, Deserialize)]
struct Payments {
    #[serde(default)]
    captures: Vec<Capture>,
}

#[derive(Debug, Deserialize)]
struct Capture {
    id: String,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn capture_id_is_read_from_the_first_purchase_unit() -> TestResult {
        let response: CaptureResponse = serde_json::from_value(serde_json::json!({
            "id": "5O190127TN364715T",
            "status": "COMPLETED",
            "purchase_units": [{
                "reference_id": "default",
                "payments": {
                    "captures": [{ "id": "3C679366HH908993F", "status": "COMPLETED" }]
                }
            }]
        }))?;

        assert_eq!(response.capture_id()?, "3C679366HH908993F");

        Ok(())
    }

    #[test]
    fn capture_without_captures_is_unexpected() -> TestResult {
        let response: CaptureResponse = serde_json::from_value(serde_json::json!({
            "id": "5O190127TN364715T",
            "purchase_units": [{ "reference_id": "default" }]
        }))?;

        assert!(matches!(
            response.capture_id(),
            Err(PaymentGatewayError::UnexpectedResponse(_))
        ));

        Ok(())
    }

    #[test]
    fn config_debug_hides_the_secret() {
        let config = PaypalConfig {
            api: "https://api-m.sandbox.paypal.com".to_string(),
            client_id: "client".to_string(),
            client_secret: "hunter2".to_string(),
            timeout: Duration::from_secs(10),
        };

        assert!(!format!("{config:?}").contains("hunter2"));
    }
}
