//! Payment provider webhook payloads
//!
//! ```json
//! {
//!   "id": "evt_01",
//!   "type": "payment.completed",
//!   "data": { "providerRef": "stripe_5f2c...", "amountCents": 2900, "currency": "usd" }
//! }
//! ```

use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentEventKind {
    Completed,
    Refunded,
    Failed,
    /// Anything else is acknowledged and ignored
    Other(String),
}

impl PaymentEventKind {
    pub fn from_type(event_type: &str) -> Self {
        match event_type {
            "payment.completed" => PaymentEventKind::Completed,
            "payment.refunded" => PaymentEventKind::Refunded,
            "payment.failed" => PaymentEventKind::Failed,
            other => PaymentEventKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PaymentEvent {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: PaymentEventData,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentEventData {
    pub provider_ref: String,
    pub amount_cents: Option<i64>,
    pub currency: Option<String>,
}

impl PaymentEvent {
    pub fn kind(&self) -> PaymentEventKind {
        PaymentEventKind::from_type(&self.event_type)
    }
}
