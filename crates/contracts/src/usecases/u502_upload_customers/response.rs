use serde::{Deserialize, Serialize};

/// Ответ RPC `upsert_customer_profiles_batch`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SmartUpsertResponse {
    #[serde(default)]
    pub inserted: u32,
    #[serde(default)]
    pub updated: u32,
}

/// Ответ RPC `refresh_customer_metrics`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RefreshMetricsResult {
    pub success: bool,
    pub updated: i64,
    pub error: Option<String>,
}
