//! PayPal Config

use std::time::Duration;

use clap::Args;
use martina_app::domain::payments::PaypalConfig;

/// PayPal REST API settings.
#[derive(Debug, Args)]
pub struct PaypalSettings {
    /// PayPal API base URL
    #[arg(
        long,
        env = "PAYPAL_API",
        default_value = "https://api-m.sandbox.paypal.com"
    )]
    pub paypal_api: String,

    /// PayPal REST client id
    #[arg(long, env = "PAYPAL_CLIENT_ID")]
    pub paypal_client_id: String,

    /// PayPal REST client secret
    #[arg(long, env = "PAYPAL_CLIENT_SECRET", hide_env_values = true)]
    pub paypal_client_secret: String,

    /// Timeout for each PayPal request, in seconds
    #[arg(long, env = "PAYPAL_TIMEOUT_SECONDS", default_value_t = 10_u64)]
    pub paypal_timeout_seconds: u64,
}

impl PaypalSettings {
    /// Gateway client settings.
    #[must_use]
    pub fn to_gateway_config(&self) -> PaypalConfig {
        PaypalConfig {
            api: self.paypal_api.trim_end_matches('/').to_string(),
            client_id: self.paypal_client_id.clone(),
            client_secret: self.paypal_client_secret.clone(),
            timeout: Duration::from_secs(self.paypal_timeout_seconds),
        }
    }
}
