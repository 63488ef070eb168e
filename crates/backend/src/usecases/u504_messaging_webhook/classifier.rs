use contracts::shared::messaging::{DeliveryStatus, WebhookForm};

use crate::shared::messaging::phone::strip_channel_prefix;

/// Ключевые слова отказа от рассылки (после нормализации)
const OPT_OUT_KEYWORDS: &[&str] = &[
    "parar",
    "sair",
    "stop",
    "cancelar",
    "descadastrar",
    "nao quero",
    "optout",
];

/// Событие провайдера, определённое по набору полей формы
#[derive(Debug, Clone, PartialEq)]
pub enum WebhookEvent {
    ButtonClick {
        phone: String,
        payload: String,
        text: Option<String>,
        message_sid: Option<String>,
        profile_name: Option<String>,
    },
    StatusCallback {
        message_sid: String,
        status: DeliveryStatus,
        error_code: Option<u32>,
        phone: Option<String>,
    },
    InboundText {
        phone: String,
        body: String,
        message_sid: Option<String>,
        profile_name: Option<String>,
    },
    Unknown,
}

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn address(v: &Option<String>) -> Option<String> {
    non_empty(v).map(|a| strip_channel_prefix(&a).to_string())
}

/// Кнопка важнее статуса, статус важнее текста
pub fn classify(form: &WebhookForm) -> WebhookEvent {
    let from = address(&form.from);
    let payload = non_empty(&form.button_payload);
    let button_text = non_empty(&form.button_text);

    if payload.is_some() || button_text.is_some() {
        if let Some(phone) = from.clone() {
            return WebhookEvent::ButtonClick {
                phone,
                payload: payload.or_else(|| button_text.clone()).unwrap_or_default(),
                text: button_text,
                message_sid: non_empty(&form.message_sid),
                profile_name: non_empty(&form.profile_name),
            };
        }
    }

    let status = non_empty(&form.message_status).or_else(|| non_empty(&form.sms_status));
    if let (Some(status), Some(message_sid)) = (status, non_empty(&form.message_sid)) {
        // входящее сообщение приходит со статусом "received"
        if !status.eq_ignore_ascii_case("received") {
            return WebhookEvent::StatusCallback {
                message_sid,
                status: DeliveryStatus::parse(&status),
                error_code: non_empty(&form.error_code).and_then(|c| c.parse().ok()),
                phone: address(&form.to),
            };
        }
    }

    match (from, non_empty(&form.body)) {
        (Some(phone), Some(body)) => WebhookEvent::InboundText {
            phone,
            body,
            message_sid: non_empty(&form.message_sid),
            profile_name: non_empty(&form.profile_name),
        },
        _ => WebhookEvent::Unknown,
    }
}

fn fold_accent(c: char) -> char {
    match c {
        'á' | 'à' | 'â' | 'ã' | 'ä' => 'a',
        'é' | 'è' | 'ê' | 'ë' => 'e',
        'í' | 'ì' | 'î' | 'ï' => 'i',
        'ó' | 'ò' | 'ô' | 'õ' | 'ö' => 'o',
        'ú' | 'ù' | 'û' | 'ü' => 'u',
        'ç' => 'c',
        _ => c,
    }
}

/// Нижний регистр без диакритики; дефис и подчёркивание убираются, прочая пунктуация = пробел
pub fn normalize_text(text: &str) -> String {
    let cleaned: String = text
        .to_lowercase()
        .chars()
        .map(fold_accent)
        .filter(|c| *c != '-' && *c != '_')
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Отказ: текст совпадает с ключевым словом или начинается с него
pub fn is_opt_out(text: &str) -> bool {
    let normalized = normalize_text(text);
    OPT_OUT_KEYWORDS.iter().any(|k| {
        normalized == *k
            || normalized
                .strip_prefix(k)
                .map(|rest| rest.starts_with(' '))
                .unwrap_or(false)
    })
}

impl WebhookEvent {
    pub fn is_opt_out(&self) -> bool {
        match self {
            WebhookEvent::ButtonClick { payload, text, .. } => {
                is_opt_out(payload) || text.as_deref().map(is_opt_out).unwrap_or(false)
            }
            WebhookEvent::InboundText { body, .. } => is_opt_out(body),
            _ => false,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            WebhookEvent::ButtonClick { .. } => "button_click",
            WebhookEvent::StatusCallback { .. } => "status_callback",
            WebhookEvent::InboundText { .. } => "inbound_message",
            WebhookEvent::Unknown => "unknown",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> WebhookForm {
        WebhookForm::default()
    }

    #[test]
    fn test_button_wins_over_status_and_text() {
        let f = WebhookForm {
            from: Some("whatsapp:+5511987654321".into()),
            button_payload: Some("OPTOUT".into()),
            button_text: Some("Parar promoções".into()),
            message_status: Some("delivered".into()),
            message_sid: Some("SM1".into()),
            body: Some("Parar promoções".into()),
            ..form()
        };
        let event = classify(&f);
        assert!(matches!(
            &event,
            WebhookEvent::ButtonClick { phone, payload, .. }
                if phone == "+5511987654321" && payload == "OPTOUT"
        ));
        assert!(event.is_opt_out());
    }

    #[test]
    fn test_status_callback() {
        let f = WebhookForm {
            message_sid: Some("SM2".into()),
            message_status: Some("undelivered".into()),
            error_code: Some("63003".into()),
            to: Some("whatsapp:+5511987654321".into()),
            from: Some("whatsapp:+5511900000000".into()),
            ..form()
        };
        assert_eq!(
            classify(&f),
            WebhookEvent::StatusCallback {
                message_sid: "SM2".into(),
                status: DeliveryStatus::Undelivered,
                error_code: Some(63003),
                phone: Some("+5511987654321".into()),
            }
        );
    }

    #[test]
    fn test_inbound_text_with_received_status() {
        let f = WebhookForm {
            message_sid: Some("SM3".into()),
            sms_status: Some("received".into()),
            from: Some("whatsapp:+5511987654321".into()),
            body: Some("Qual o horário?".into()),
            profile_name: Some("Ana".into()),
            ..form()
        };
        let event = classify(&f);
        assert_eq!(event.kind(), "inbound_message");
        assert!(!event.is_opt_out());
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify(&form()), WebhookEvent::Unknown);
        let f = WebhookForm {
            body: Some("oi".into()),
            ..form()
        };
        assert_eq!(classify(&f), WebhookEvent::Unknown);
    }

    #[test]
    fn test_opt_out_keywords() {
        assert!(is_opt_out("PARAR"));
        assert!(is_opt_out("  Stop! "));
        assert!(is_opt_out("Não quero"));
        assert!(is_opt_out("nao quero mais receber"));
        assert!(is_opt_out("opt-out"));
        assert!(is_opt_out("Descadastrar"));
        assert!(!is_opt_out("quero saber o horário"));
        assert!(!is_opt_out("sairá hoje?"));
        assert!(!is_opt_out(""));
    }
}
