use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Получатель кампании
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipient {
    pub phone: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub customer_doc: Option<String>,
    /// Переменные шаблона; по умолчанию {"1": имя клиента}
    #[serde(default)]
    pub variables: Option<HashMap<String, String>>,
}

/// POST /api/campaigns/:id/send
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignSendRequest {
    pub recipients: Vec<Recipient>,
    /// Переопределяет шаблон кампании
    #[serde(default)]
    pub template_id: Option<String>,
    /// Не учитывать период охлаждения контактов
    #[serde(default)]
    pub ignore_cooldown: bool,
}
