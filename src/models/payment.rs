use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Failed,
    Cancelled,
    Refunded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    #[serde(rename = "_id")]
    pub id: String,
    pub transaction_id: String,
    pub amount: f64,
    pub status: PaymentStatus,
    /// Linked ride, bare id or populated depending on the endpoint.
    #[serde(default)]
    pub ride: Option<serde_json::Value>,
    #[serde(default)]
    pub invoice_url: Option<String>,
}
