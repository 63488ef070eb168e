use chrono::Utc;
use contracts::domain::a004_blacklist::aggregate::{BlacklistEntry, BlacklistReason};
use std::collections::HashSet;

use crate::shared::supabase::{self, Query};

const TABLE: &str = "blacklist";

pub fn new_entry(
    phone: &str,
    customer_name: Option<String>,
    reason: BlacklistReason,
    source: &str,
    error_code: Option<u32>,
) -> BlacklistEntry {
    BlacklistEntry {
        phone: phone.to_string(),
        customer_name,
        reason,
        source: source.to_string(),
        error_code,
        created_at: Some(Utc::now().to_rfc3339()),
    }
}

/// Upsert по `phone`: повторная запись обновляет причину и источник
pub async fn upsert(entry: &BlacklistEntry) -> anyhow::Result<()> {
    supabase::client()?
        .upsert(TABLE, std::slice::from_ref(entry), "phone")
        .await?;
    tracing::info!("Blacklisted {} ({:?})", entry.phone, entry.reason);
    Ok(())
}

pub async fn list() -> anyhow::Result<Vec<BlacklistEntry>> {
    let entries = supabase::client()?
        .select_as::<BlacklistEntry>(TABLE, &Query::new().select("*").order("created_at", false))
        .await?;
    Ok(entries)
}

/// Множество телефонов в чёрном списке
pub async fn phones() -> anyhow::Result<HashSet<String>> {
    let rows = supabase::client()?
        .select_all(TABLE, &Query::new().select("phone"))
        .await?;
    Ok(rows
        .iter()
        .filter_map(|r| r.get("phone").and_then(|v| v.as_str()))
        .map(str::to_string)
        .collect())
}
