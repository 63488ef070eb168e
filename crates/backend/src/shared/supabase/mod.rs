//! Клиент hosted-базы (PostgREST API Supabase).

pub mod client;
pub mod query;
pub mod settings;

use once_cell::sync::OnceCell;

pub use client::{SupabaseClient, SupabaseError};
pub use query::Query;

use crate::shared::config::SupabaseConfig;

static SUPABASE: OnceCell<Option<SupabaseClient>> = OnceCell::new();

/// Создать глобальный клиент; без url/key остаётся `None`
pub fn initialize(config: &SupabaseConfig) -> anyhow::Result<()> {
    let client = if config.is_configured() {
        tracing::info!("Supabase configured: {}", config.url);
        Some(SupabaseClient::new(&config.url, &config.key, config.timeout_secs)?)
    } else {
        tracing::warn!("Supabase is not configured, hosted data will be unavailable");
        None
    };
    SUPABASE
        .set(client)
        .map_err(|_| anyhow::anyhow!("Supabase client already initialized"))
}

/// Глобальный клиент или `SupabaseError::NotConfigured`
pub fn client() -> Result<&'static SupabaseClient, SupabaseError> {
    SUPABASE
        .get()
        .and_then(Option::as_ref)
        .ok_or(SupabaseError::NotConfigured)
}
