use serde::{Deserialize, Serialize};

/// Запись журнала коммуникаций с клиентом
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunicationEntry {
    pub id: i64,
    pub phone: String,
    pub customer_doc: Option<String>,
    /// "whatsapp", "call", "sms"
    pub channel: String,
    /// "outbound" | "inbound"
    pub direction: String,
    /// "campaign", "manual", "reply", "opt-out"
    pub kind: String,
    pub message: String,
    pub campaign_id: Option<String>,
    pub created_at: String,
}

/// POST /api/communications
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateCommunicationRequest {
    pub phone: String,
    #[serde(default)]
    pub customer_doc: Option<String>,
    pub channel: String,
    #[serde(default = "default_direction")]
    pub direction: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    pub message: String,
}

fn default_direction() -> String {
    "outbound".to_string()
}

fn default_kind() -> String {
    "manual".to_string()
}

/// Последний контакт с клиентом (для периода охлаждения рассылок)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactTracking {
    pub phone: String,
    pub customer_doc: Option<String>,
    pub campaign_id: Option<String>,
    pub status: String,
    pub last_contacted_at: String,
}
