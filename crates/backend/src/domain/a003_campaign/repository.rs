use chrono::{NaiveDateTime, Utc};
use contracts::domain::a003_campaign::aggregate::Campaign;
use contracts::domain::RawRow;
use serde::{Deserialize, Serialize};

use crate::shared::supabase::{self, Query};

const TABLE: &str = "campaigns";
const CONTACTS_TABLE: &str = "campaign_contacts";

/// Строка `campaign_contacts`: факт отправки и статус доставки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignContactRow {
    pub campaign_id: String,
    pub phone: String,
    pub customer_doc: Option<String>,
    pub message_sid: Option<String>,
    pub status: String,
    pub error_code: Option<u32>,
    pub error_message: Option<String>,
    pub sent_at: NaiveDateTime,
}

/// Изменение статуса доставки по `message_sid`
#[derive(Debug, Clone, Serialize)]
pub struct DeliveryStatusPatch {
    pub delivery_status: String,
    pub error_code: Option<u32>,
    pub updated_at: NaiveDateTime,
}

impl DeliveryStatusPatch {
    pub fn new(status: &str, error_code: Option<u32>) -> Self {
        Self {
            delivery_status: status.to_string(),
            error_code,
            updated_at: Utc::now().naive_utc(),
        }
    }
}

fn parse_campaign(row: RawRow) -> Option<Campaign> {
    match serde_json::from_value::<Campaign>(serde_json::Value::Object(row)) {
        Ok(c) => Some(c),
        Err(e) => {
            tracing::warn!("Skipping malformed campaign row: {}", e);
            None
        }
    }
}

pub async fn get_by_id(id: &str) -> anyhow::Result<Option<Campaign>> {
    let rows = supabase::client()?
        .select(TABLE, &Query::new().select("*").eq("id", id).limit(1))
        .await?;
    Ok(rows.into_iter().next().and_then(parse_campaign))
}

pub async fn list() -> anyhow::Result<Vec<Campaign>> {
    let rows = supabase::client()?
        .select_all(TABLE, &Query::new().select("*").order("valid_from", false))
        .await?;
    Ok(rows.into_iter().filter_map(parse_campaign).collect())
}

pub async fn insert_contacts(rows: &[CampaignContactRow]) -> anyhow::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }
    supabase::client()?.insert(CONTACTS_TABLE, rows).await?;
    Ok(())
}

/// Обновить статус доставки; возвращает число затронутых строк
pub async fn update_delivery_status(
    message_sid: &str,
    patch: &DeliveryStatusPatch,
) -> anyhow::Result<usize> {
    let updated = supabase::client()?
        .update(
            CONTACTS_TABLE,
            &Query::new().eq("message_sid", message_sid),
            patch,
        )
        .await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_campaign_row() {
        let row = json!({
            "id": "c1",
            "name": "Volta",
            "coupon_code": "VOLTA10",
            "discount_percent": 10,
            "valid_from": "2024-06-01",
            "valid_to": "2024-06-30",
            "max_redemptions": 50,
            "content_sid": "HX123",
            "status": "active"
        });
        let campaign = parse_campaign(row.as_object().unwrap().clone()).unwrap();
        assert_eq!(campaign.redemption_cap, Some(50));
        assert_eq!(campaign.template_id.as_deref(), Some("HX123"));
        assert_eq!(campaign.duration_days(), 30);
    }

    #[test]
    fn test_malformed_campaign_is_skipped() {
        let row = json!({ "id": "c2", "coupon_code": "X", "valid_from": "ontem" });
        assert!(parse_campaign(row.as_object().unwrap().clone()).is_none());
    }
}
