use chrono::Utc;
use contracts::domain::a004_blacklist::aggregate::BlacklistReason;
use contracts::shared::communication::CreateCommunicationRequest;
use contracts::shared::messaging::{SendOutcome, SendRequest, SendStatus};
use contracts::usecases::u503_campaign_send::request::{CampaignSendRequest, Recipient};
use contracts::usecases::u503_campaign_send::response::CampaignSendReport;
use std::collections::{HashMap, HashSet};

use crate::domain::a003_campaign::repository::{self as campaigns, CampaignContactRow};
use crate::domain::a004_blacklist::repository as blacklist;
use crate::domain::a005_contact_tracking::repository as contact_tracking;
use crate::domain::a006_communication_log::repository as communication_log;
use crate::shared::config::get_config;
use crate::shared::logger;
use crate::shared::messaging::error_codes::is_undeliverable;
use crate::shared::messaging::phone::normalize_br_phone;
use crate::shared::messaging::{send_with_retry, MessageSender, RetryPolicy, TwilioClient};

/// Ограничения рассылки: кому уже нельзя писать
#[derive(Debug, Default)]
pub struct SendFilters {
    pub blacklist: HashSet<String>,
    pub recently_contacted: HashSet<String>,
}

fn skipped(phone: &str, recipient: &Recipient, message: &str) -> SendOutcome {
    SendOutcome {
        phone: phone.to_string(),
        customer_doc: recipient.customer_doc.clone(),
        status: SendStatus::Skipped,
        message_sid: None,
        error_code: None,
        error_message: Some(message.to_string()),
        attempts: 0,
    }
}

/// Переменные шаблона: явные либо {"1": имя}
fn template_variables(recipient: &Recipient) -> HashMap<String, String> {
    match &recipient.variables {
        Some(vars) => vars.clone(),
        None => {
            let name = recipient
                .name
                .as_deref()
                .and_then(|n| n.split_whitespace().next())
                .unwrap_or("cliente");
            HashMap::from([("1".to_string(), name.to_string())])
        }
    }
}

/// Решение по получателю: запрос на отправку или пропуск
pub fn plan_recipient(
    recipient: &Recipient,
    template_id: &str,
    filters: &SendFilters,
    seen: &mut HashSet<String>,
) -> Result<SendRequest, SendOutcome> {
    let Some(phone) = normalize_br_phone(&recipient.phone) else {
        return Err(skipped(&recipient.phone, recipient, "Número de telefone inválido."));
    };
    if filters.blacklist.contains(&phone) {
        return Err(skipped(&phone, recipient, "Cliente na lista de bloqueio."));
    }
    if filters.recently_contacted.contains(&phone) {
        return Err(skipped(&phone, recipient, "Cliente contatado recentemente."));
    }
    if !seen.insert(phone.clone()) {
        return Err(skipped(&phone, recipient, "Número duplicado na campanha."));
    }
    Ok(SendRequest {
        phone,
        template_id: template_id.to_string(),
        variables: template_variables(recipient),
    })
}

/// Последовательная отправка получателям с повтором временных ошибок
pub async fn dispatch(
    sender: &dyn MessageSender,
    recipients: &[Recipient],
    template_id: &str,
    filters: &SendFilters,
    policy: &RetryPolicy,
) -> Vec<SendOutcome> {
    let mut seen = HashSet::new();
    let mut outcomes = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let request = match plan_recipient(recipient, template_id, filters, &mut seen) {
            Ok(r) => r,
            Err(outcome) => {
                outcomes.push(outcome);
                continue;
            }
        };

        let delivery = send_with_retry(sender, &request, policy).await;
        let outcome = match delivery.result {
            Ok(sid) => SendOutcome {
                phone: request.phone,
                customer_doc: recipient.customer_doc.clone(),
                status: SendStatus::Sent,
                message_sid: Some(sid),
                error_code: None,
                error_message: None,
                attempts: delivery.attempts,
            },
            Err(e) => {
                tracing::warn!("u503: send to {} failed: {}", request.phone, e);
                SendOutcome {
                    phone: request.phone,
                    customer_doc: recipient.customer_doc.clone(),
                    status: SendStatus::Failed,
                    message_sid: None,
                    error_code: e.code(),
                    error_message: Some(e.user_message()),
                    attempts: delivery.attempts,
                }
            }
        };
        outcomes.push(outcome);
    }
    outcomes
}

pub fn build_report(campaign_id: &str, outcomes: Vec<SendOutcome>) -> CampaignSendReport {
    let count = |status: SendStatus| outcomes.iter().filter(|o| o.status == status).count() as u32;
    CampaignSendReport {
        campaign_id: campaign_id.to_string(),
        total: outcomes.len() as u32,
        sent: count(SendStatus::Sent),
        failed: count(SendStatus::Failed),
        skipped: count(SendStatus::Skipped),
        outcomes,
    }
}

/// Строки `campaign_contacts` для отправленных и неудачных сообщений
pub fn contact_rows(campaign_id: &str, outcomes: &[SendOutcome]) -> Vec<CampaignContactRow> {
    let now = Utc::now().naive_utc();
    outcomes
        .iter()
        .filter(|o| o.status != SendStatus::Skipped)
        .map(|o| CampaignContactRow {
            campaign_id: campaign_id.to_string(),
            phone: o.phone.clone(),
            customer_doc: o.customer_doc.clone(),
            message_sid: o.message_sid.clone(),
            status: if o.status == SendStatus::Sent {
                "sent".to_string()
            } else {
                "failed".to_string()
            },
            error_code: o.error_code,
            error_message: o.error_message.clone(),
            sent_at: now,
        })
        .collect()
}

async fn persist(campaign_id: &str, campaign_name: &str, outcomes: &[SendOutcome]) {
    if let Err(e) = campaigns::insert_contacts(&contact_rows(campaign_id, outcomes)).await {
        tracing::error!("u503: failed to save campaign contacts: {:#}", e);
    }

    for outcome in outcomes {
        match outcome.status {
            SendStatus::Sent => {
                if let Err(e) = contact_tracking::record(
                    &outcome.phone,
                    outcome.customer_doc.as_deref(),
                    Some(campaign_id),
                    "sent",
                )
                .await
                {
                    tracing::warn!("u503: contact tracking failed for {}: {:#}", outcome.phone, e);
                }

                let entry = CreateCommunicationRequest {
                    phone: outcome.phone.clone(),
                    customer_doc: outcome.customer_doc.clone(),
                    channel: "whatsapp".to_string(),
                    direction: "outbound".to_string(),
                    kind: "campaign".to_string(),
                    message: format!("Campanha {}", campaign_name),
                };
                if let Err(e) = communication_log::add(&entry, Some(campaign_id)).await {
                    tracing::warn!("u503: communication log failed for {}: {:#}", outcome.phone, e);
                }
            }
            SendStatus::Failed if is_undeliverable(outcome.error_code) => {
                let entry = blacklist::new_entry(
                    &outcome.phone,
                    None,
                    BlacklistReason::Undeliverable,
                    "campaign_send",
                    outcome.error_code,
                );
                if let Err(e) = blacklist::upsert(&entry).await {
                    tracing::warn!("u503: blacklist upsert failed for {}: {:#}", outcome.phone, e);
                }
            }
            _ => {}
        }
    }
}

/// Отправить кампанию; `None`, если кампания не найдена
pub async fn send_campaign(
    campaign_id: &str,
    request: CampaignSendRequest,
) -> anyhow::Result<Option<CampaignSendReport>> {
    let Some(campaign) = campaigns::get_by_id(campaign_id).await? else {
        return Ok(None);
    };
    let Some(template_id) = request
        .template_id
        .clone()
        .or_else(|| campaign.template_id.clone())
        .filter(|t| !t.trim().is_empty())
    else {
        anyhow::bail!("Campaign {} has no message template", campaign_id);
    };

    let config = get_config();
    let sender = TwilioClient::new(&config.messaging)?;
    let filters = SendFilters {
        blacklist: blacklist::phones().await?,
        recently_contacted: if request.ignore_cooldown {
            HashSet::new()
        } else {
            contact_tracking::recently_contacted(config.messaging.cooldown_days).await?
        },
    };
    let policy = RetryPolicy::from_config(&config.retry);

    tracing::info!(
        "u503: sending campaign {} to {} recipients",
        campaign_id,
        request.recipients.len()
    );
    let outcomes = dispatch(&sender, &request.recipients, &template_id, &filters, &policy).await;
    persist(campaign_id, &campaign.name, &outcomes).await;

    let report = build_report(campaign_id, outcomes);
    logger::log(
        "campaign",
        &format!(
            "Campanha {}: {} enviadas, {} falhas, {} ignoradas",
            campaign.name, report.sent, report.failed, report.skipped
        ),
    );
    Ok(Some(report))
}
