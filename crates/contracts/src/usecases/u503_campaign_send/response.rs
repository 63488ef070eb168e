use serde::{Deserialize, Serialize};

use crate::shared::messaging::SendOutcome;

/// Отчёт об отправке кампании
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSendReport {
    pub campaign_id: String,
    pub total: u32,
    pub sent: u32,
    pub failed: u32,
    pub skipped: u32,
    pub outcomes: Vec<SendOutcome>,
}
