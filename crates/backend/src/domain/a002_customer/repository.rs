use contracts::domain::a002_customer::aggregate::CustomerProfile;
use contracts::usecases::u502_upload_customers::response::{
    RefreshMetricsResult, SmartUpsertResponse,
};
use serde_json::json;

use crate::shared::supabase::{self, Query, SupabaseError};

const TABLE: &str = "customers";

pub async fn list_profiles() -> anyhow::Result<Vec<CustomerProfile>> {
    let client = supabase::client()?;
    let rows = client
        .select_all(TABLE, &Query::new().select("*").order("doc", true))
        .await?;
    let profiles = rows
        .into_iter()
        .filter_map(|row| {
            serde_json::from_value::<CustomerProfile>(serde_json::Value::Object(row))
                .map_err(|e| tracing::debug!("Skipping customer row: {}", e))
                .ok()
        })
        .collect();
    Ok(profiles)
}

/// Upsert через RPC, не откатывающий даты и счётчики к меньшим значениям
pub async fn smart_upsert_batch(
    batch: &[CustomerProfile],
) -> Result<SmartUpsertResponse, SupabaseError> {
    let response = supabase::client()?
        .rpc("upsert_customer_profiles_batch", &json!({ "p_customers": batch }))
        .await?;
    if response.is_null() {
        return Ok(SmartUpsertResponse::default());
    }
    Ok(serde_json::from_value(response)?)
}

/// Простой upsert по `doc`
pub async fn upsert_batch(batch: &[CustomerProfile]) -> Result<(), SupabaseError> {
    supabase::client()?.upsert(TABLE, batch, "doc").await
}

/// Пересчитать вычисляемые метрики клиентов в базе
pub async fn refresh_metrics() -> RefreshMetricsResult {
    let client = match supabase::client() {
        Ok(c) => c,
        Err(e) => {
            return RefreshMetricsResult {
                success: false,
                updated: 0,
                error: Some(e.to_string()),
            }
        }
    };

    match client.rpc("refresh_customer_metrics", &json!({})).await {
        Ok(value) => RefreshMetricsResult {
            success: true,
            updated: value.as_i64().unwrap_or(0),
            error: None,
        },
        Err(e) => {
            tracing::warn!("refresh_customer_metrics failed: {}", e);
            RefreshMetricsResult {
                success: false,
                updated: 0,
                error: Some(e.to_string()),
            }
        }
    }
}
