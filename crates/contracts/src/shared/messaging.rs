use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Поля form-urlencoded callback'а провайдера WhatsApp (Twilio-совместимый).
///
/// Все поля опциональны: форма запроса определяет тип события.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct WebhookForm {
    pub message_sid: Option<String>,
    pub account_sid: Option<String>,
    pub from: Option<String>,
    pub to: Option<String>,
    pub body: Option<String>,
    pub message_status: Option<String>,
    pub sms_status: Option<String>,
    pub error_code: Option<String>,
    pub error_message: Option<String>,
    pub button_payload: Option<String>,
    pub button_text: Option<String>,
    pub profile_name: Option<String>,
    pub wa_id: Option<String>,
}

/// Статус доставки сообщения
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryStatus {
    Queued,
    Sent,
    Delivered,
    Read,
    Failed,
    Undelivered,
    Unknown,
}

impl DeliveryStatus {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "accepted" | "queued" | "sending" => DeliveryStatus::Queued,
            "sent" => DeliveryStatus::Sent,
            "delivered" => DeliveryStatus::Delivered,
            "read" => DeliveryStatus::Read,
            "failed" => DeliveryStatus::Failed,
            "undelivered" => DeliveryStatus::Undelivered,
            _ => DeliveryStatus::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryStatus::Queued => "queued",
            DeliveryStatus::Sent => "sent",
            DeliveryStatus::Delivered => "delivered",
            DeliveryStatus::Read => "read",
            DeliveryStatus::Failed => "failed",
            DeliveryStatus::Undelivered => "undelivered",
            DeliveryStatus::Unknown => "unknown",
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, DeliveryStatus::Failed | DeliveryStatus::Undelivered)
    }
}

/// Запрос на отправку шаблонного сообщения
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendRequest {
    /// Телефон в формате E.164 (+55...)
    pub phone: String,
    pub template_id: String,
    #[serde(default)]
    pub variables: HashMap<String, String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStatus {
    Sent,
    Failed,
    Skipped,
}

/// Результат отправки одному получателю
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendOutcome {
    pub phone: String,
    pub customer_doc: Option<String>,
    pub status: SendStatus,
    pub message_sid: Option<String>,
    pub error_code: Option<u32>,
    /// Сообщение для пользователя (pt-BR)
    pub error_message: Option<String>,
    pub attempts: u32,
}
