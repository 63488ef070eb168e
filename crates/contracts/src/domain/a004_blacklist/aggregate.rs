use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlacklistReason {
    /// Клиент сам отказался от рассылки
    OptOut,
    /// Номер недоступен для доставки (не WhatsApp, неверный номер)
    Undeliverable,
    Manual,
}

/// Запись таблицы `blacklist` (upsert по `phone`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlacklistEntry {
    pub phone: String,
    #[serde(default)]
    pub customer_name: Option<String>,
    pub reason: BlacklistReason,
    pub source: String,
    #[serde(default)]
    pub error_code: Option<u32>,
    #[serde(default)]
    pub created_at: Option<String>,
}
