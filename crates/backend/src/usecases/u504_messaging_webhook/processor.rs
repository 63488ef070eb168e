use chrono::Utc;
use contracts::domain::a004_blacklist::aggregate::BlacklistReason;
use contracts::shared::communication::CreateCommunicationRequest;
use contracts::shared::logger::LogLevel;
use contracts::shared::messaging::{DeliveryStatus, WebhookForm};
use serde::Serialize;

use super::classifier::{classify, WebhookEvent};
use crate::domain::a003_campaign::repository::{self as campaigns, DeliveryStatusPatch};
use crate::domain::a004_blacklist::repository as blacklist;
use crate::domain::a006_communication_log::repository as communication_log;
use crate::shared::logger;
use crate::shared::messaging::error_codes::is_undeliverable;
use crate::shared::messaging::phone::normalize_br_phone;
use crate::shared::supabase;

const EVENTS_TABLE: &str = "webhook_events";

/// Строка `webhook_events`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WebhookEventRow {
    pub event_type: String,
    pub message_sid: Option<String>,
    pub phone: Option<String>,
    pub status: Option<String>,
    pub error_code: Option<u32>,
    pub body: Option<String>,
    pub payload: Option<String>,
    pub created_at: String,
}

impl WebhookEventRow {
    fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            message_sid: None,
            phone: None,
            status: None,
            error_code: None,
            body: None,
            payload: None,
            created_at: Utc::now().to_rfc3339(),
        }
    }
}

/// Побочный эффект обработки события
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookAction {
    Blacklist {
        phone: String,
        name: Option<String>,
        reason: BlacklistReason,
        error_code: Option<u32>,
    },
    UpdateDeliveryStatus {
        message_sid: String,
        status: DeliveryStatus,
        error_code: Option<u32>,
    },
    RecordEvent(WebhookEventRow),
    LogInbound(CreateCommunicationRequest),
}

/// Телефон в E.164, если удаётся нормализовать, иначе как пришёл
fn canonical_phone(phone: &str) -> String {
    normalize_br_phone(phone).unwrap_or_else(|| phone.to_string())
}

fn inbound_log(phone: &str, kind: &str, message: &str) -> CreateCommunicationRequest {
    CreateCommunicationRequest {
        phone: phone.to_string(),
        customer_doc: None,
        channel: "whatsapp".to_string(),
        direction: "inbound".to_string(),
        kind: kind.to_string(),
        message: message.to_string(),
    }
}

/// Действия по событию (без ввода-вывода)
pub fn plan_actions(event: &WebhookEvent) -> Vec<WebhookAction> {
    let opt_out = event.is_opt_out();
    let mut actions = Vec::new();

    match event {
        WebhookEvent::ButtonClick {
            phone,
            payload,
            text,
            message_sid,
            profile_name,
        } => {
            let phone = canonical_phone(phone);
            if opt_out {
                actions.push(WebhookAction::Blacklist {
                    phone: phone.clone(),
                    name: profile_name.clone(),
                    reason: BlacklistReason::OptOut,
                    error_code: None,
                });
            }
            let mut row = WebhookEventRow::new(event.kind());
            row.phone = Some(phone.clone());
            row.message_sid = message_sid.clone();
            row.payload = Some(payload.clone());
            row.body = text.clone();
            actions.push(WebhookAction::RecordEvent(row));
            actions.push(WebhookAction::LogInbound(inbound_log(
                &phone,
                if opt_out { "opt-out" } else { "reply" },
                text.as_deref().unwrap_or(payload),
            )));
        }
        WebhookEvent::StatusCallback {
            message_sid,
            status,
            error_code,
            phone,
        } => {
            actions.push(WebhookAction::UpdateDeliveryStatus {
                message_sid: message_sid.clone(),
                status: *status,
                error_code: *error_code,
            });
            let phone = phone.as_deref().map(canonical_phone);
            if status.is_failure() && is_undeliverable(*error_code) {
                if let Some(phone) = &phone {
                    actions.push(WebhookAction::Blacklist {
                        phone: phone.clone(),
                        name: None,
                        reason: BlacklistReason::Undeliverable,
                        error_code: *error_code,
                    });
                }
            }
            let mut row = WebhookEventRow::new(event.kind());
            row.message_sid = Some(message_sid.clone());
            row.phone = phone;
            row.status = Some(status.as_str().to_string());
            row.error_code = *error_code;
            actions.push(WebhookAction::RecordEvent(row));
        }
        WebhookEvent::InboundText {
            phone,
            body,
            message_sid,
            profile_name,
        } => {
            let phone = canonical_phone(phone);
            if opt_out {
                actions.push(WebhookAction::Blacklist {
                    phone: phone.clone(),
                    name: profile_name.clone(),
                    reason: BlacklistReason::OptOut,
                    error_code: None,
                });
            } else {
                let mut row = WebhookEventRow::new(event.kind());
                row.phone = Some(phone.clone());
                row.message_sid = message_sid.clone();
                row.body = Some(body.clone());
                actions.push(WebhookAction::RecordEvent(row));
            }
            actions.push(WebhookAction::LogInbound(inbound_log(
                &phone,
                if opt_out { "opt-out" } else { "reply" },
                body,
            )));
        }
        WebhookEvent::Unknown => {}
    }
    actions
}

async fn execute(action: &WebhookAction) -> anyhow::Result<()> {
    match action {
        WebhookAction::Blacklist {
            phone,
            name,
            reason,
            error_code,
        } => {
            let entry = blacklist::new_entry(phone, name.clone(), *reason, "webhook", *error_code);
            blacklist::upsert(&entry).await?;
            logger::webhook(
                LogLevel::Info,
                "blacklist",
                &format!("{} adicionado à lista de bloqueio ({:?})", phone, reason),
            );
        }
        WebhookAction::UpdateDeliveryStatus {
            message_sid,
            status,
            error_code,
        } => {
            let patch = DeliveryStatusPatch::new(status.as_str(), *error_code);
            let updated = campaigns::update_delivery_status(message_sid, &patch).await?;
            if updated == 0 {
                tracing::debug!("webhook: no campaign contact for {}", message_sid);
            }
        }
        WebhookAction::RecordEvent(row) => {
            supabase::client()?
                .insert(EVENTS_TABLE, std::slice::from_ref(row))
                .await?;
        }
        WebhookAction::LogInbound(entry) => {
            communication_log::add(entry, None).await?;
        }
    }
    Ok(())
}

/// Обработать callback провайдера. Ошибки только логируются.
pub async fn process_webhook(form: &WebhookForm) {
    let event = classify(form);
    tracing::info!("webhook: {} ({:?})", event.kind(), form.message_sid);

    if matches!(event, WebhookEvent::Unknown) {
        logger::webhook(LogLevel::Warn, "unknown", "Evento de webhook não reconhecido");
        return;
    }

    for action in plan_actions(&event) {
        if let Err(e) = execute(&action).await {
            tracing::error!("webhook action {:?} failed: {:#}", action, e);
            logger::webhook(LogLevel::Error, event.kind(), &format!("{:#}", e));
        }
    }
}
