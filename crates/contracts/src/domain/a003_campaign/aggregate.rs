use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Active,
    Paused,
    Finished,
}

impl Default for CampaignStatus {
    fn default() -> Self {
        CampaignStatus::Draft
    }
}

/// Маркетинговая кампания с купоном.
///
/// Связывается с транзакциями по совпадению кода купона.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    #[serde(default)]
    pub name: String,
    pub coupon_code: String,
    #[serde(default)]
    pub discount_percent: f64,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    /// Лимит погашений купона (None = без лимита)
    #[serde(rename = "max_redemptions", default)]
    pub redemption_cap: Option<u32>,
    /// Идентификатор шаблона WhatsApp у провайдера
    #[serde(rename = "content_sid", default)]
    pub template_id: Option<String>,
    #[serde(default)]
    pub status: CampaignStatus,
}

impl Campaign {
    pub fn is_valid_on(&self, day: NaiveDate) -> bool {
        day >= self.valid_from && day <= self.valid_to
    }

    /// Длительность кампании в днях (включительно), минимум 1
    pub fn duration_days(&self) -> i64 {
        ((self.valid_to - self.valid_from).num_days() + 1).max(1)
    }
}
