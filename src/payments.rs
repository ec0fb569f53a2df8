//! Payment-gateway collaborators — opaque "create charge / verify charge"
//! capabilities over two external providers.
//!
//! The core never interprets gateway responses beyond the paid/unpaid
//! outcome; request/transport failures are surfaced verbatim to the caller
//! and nothing is retried. Calls are synchronous from the handler's point
//! of view and block that worker for their duration.

use serde_json::Value;
use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("Payment gateway not configured")]
    NotConfigured,
    #[error("Payment gateway error: {0}")]
    Gateway(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Gateway(err.to_string())
    }
}

/// A charge created at a gateway, to be settled by the client.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ChargeIntent {
    /// Gateway-side reference (order id or checkout session id).
    pub reference: String,
    pub amount_minor: i64,
    pub currency: String,
    /// Hosted checkout URL, when the gateway provides one.
    pub checkout_url: Option<String>,
}

/// Result of asking a gateway whether a charge settled.
#[derive(Debug, Clone, PartialEq)]
pub struct VerifiedCharge {
    pub paid: bool,
    /// The receipt the charge was created with — our appointment id.
    pub receipt: Option<String>,
}

/// Fees are stored as major currency units; gateways bill in minor units.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

// ─── Razorpay ────────────────────────────────────────────────────────────────

const RAZORPAY_API: &str = "https://api.razorpay.com/v1";

/// Order-based gateway: a server-side order is created up front and later
/// fetched back to learn whether it was paid.
#[derive(Debug, Clone)]
pub struct RazorpayClient {
    http: reqwest::Client,
    key_id: String,
    key_secret: String,
    currency: String,
    base_url: String,
}

impl RazorpayClient {
    pub fn new(key_id: String, key_secret: String, currency: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            key_id,
            key_secret,
            currency,
            base_url: RAZORPAY_API.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub async fn create_charge(
        &self,
        appointment_id: &Uuid,
        amount: f64,
    ) -> Result<ChargeIntent, PaymentError> {
        let body = serde_json::json!({
            "amount": to_minor_units(amount),
            "currency": self.currency,
            "receipt": appointment_id.to_string(),
        });

        let response = self
            .http
            .post(format!("{}/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;
        let order = read_json(response).await?;

        Ok(ChargeIntent {
            reference: order["id"].as_str().unwrap_or_default().to_string(),
            amount_minor: to_minor_units(amount),
            currency: self.currency.clone(),
            checkout_url: None,
        })
    }

    pub async fn verify_charge(&self, order_id: &str) -> Result<VerifiedCharge, PaymentError> {
        let response = self
            .http
            .get(format!("{}/orders/{order_id}", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        let order = read_json(response).await?;

        Ok(VerifiedCharge {
            paid: order["status"].as_str() == Some("paid"),
            receipt: order["receipt"].as_str().map(str::to_string),
        })
    }
}

// ─── Stripe ──────────────────────────────────────────────────────────────────

const STRIPE_API: &str = "https://api.stripe.com/v1";

/// Checkout-session gateway: the client is redirected to a hosted page and
/// comes back with a success flag the gateway's redirect flow vouches for.
#[derive(Debug, Clone)]
pub struct StripeClient {
    http: reqwest::Client,
    secret_key: String,
    currency: String,
    base_url: String,
}

impl StripeClient {
    pub fn new(secret_key: String, currency: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            secret_key,
            currency,
            base_url: STRIPE_API.to_string(),
        }
    }

    #[cfg(test)]
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    /// Create a hosted checkout session; the client settles the charge on
    /// the returned URL and is sent back to `origin`.
    pub async fn create_charge(
        &self,
        appointment_id: &Uuid,
        amount: f64,
        origin: &str,
    ) -> Result<ChargeIntent, PaymentError> {
        let amount_minor = to_minor_units(amount);
        let form = session_form(appointment_id, amount_minor, &self.currency, origin);

        let response = self
            .http
            .post(format!("{}/checkout/sessions", self.base_url))
            .bearer_auth(&self.secret_key)
            .form(&form)
            .send()
            .await?;
        let session = read_json(response).await?;

        Ok(ChargeIntent {
            reference: session["id"].as_str().unwrap_or_default().to_string(),
            amount_minor,
            currency: self.currency.clone(),
            checkout_url: session["url"].as_str().map(str::to_string),
        })
    }
}

/// Form fields for a single-item checkout session.
fn session_form(
    appointment_id: &Uuid,
    amount_minor: i64,
    currency: &str,
    origin: &str,
) -> Vec<(String, String)> {
    vec![
        ("mode".into(), "payment".into()),
        (
            "success_url".into(),
            format!("{origin}/verify?success=true&appointmentId={appointment_id}"),
        ),
        (
            "cancel_url".into(),
            format!("{origin}/verify?success=false&appointmentId={appointment_id}"),
        ),
        ("line_items[0][quantity]".into(), "1".into()),
        (
            "line_items[0][price_data][currency]".into(),
            currency.to_string(),
        ),
        (
            "line_items[0][price_data][unit_amount]".into(),
            amount_minor.to_string(),
        ),
        (
            "line_items[0][price_data][product_data][name]".into(),
            "Appointment fee".into(),
        ),
    ]
}

/// Decode a gateway response, surfacing non-2xx bodies verbatim.
async fn read_json(response: reqwest::Response) -> Result<Value, PaymentError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(PaymentError::Gateway(format!("{status}: {body}")));
    }
    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minor_units_round_half_cents() {
        assert_eq!(to_minor_units(150.0), 15000);
        assert_eq!(to_minor_units(99.99), 9999);
        assert_eq!(to_minor_units(0.005), 1);
    }

    #[test]
    fn session_form_carries_redirects_and_amount() {
        let id = Uuid::new_v4();
        let form = session_form(&id, 15000, "usd", "https://clinic.example");

        let lookup = |k: &str| {
            form.iter()
                .find(|(key, _)| key == k)
                .map(|(_, v)| v.clone())
                .unwrap()
        };
        assert_eq!(
            lookup("success_url"),
            format!("https://clinic.example/verify?success=true&appointmentId={id}")
        );
        assert_eq!(lookup("line_items[0][price_data][unit_amount]"), "15000");
        assert_eq!(lookup("line_items[0][price_data][currency]"), "usd");
    }

    #[tokio::test]
    async fn gateway_error_body_is_surfaced_verbatim() {
        // Unroutable loopback port: the transport error text reaches the caller.
        let client = RazorpayClient::new("key".into(), "secret".into(), "usd".into())
            .with_base_url("http://127.0.0.1:1".into());
        let err = client.verify_charge("order_x").await.unwrap_err();
        match err {
            PaymentError::Gateway(msg) => assert!(!msg.is_empty()),
            other => panic!("Expected Gateway error, got: {other}"),
        }
    }
}
