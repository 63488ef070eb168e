use async_trait::async_trait;
use contracts::shared::messaging::SendRequest;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

use super::error_codes::{self, ErrorClass};
use super::phone::to_whatsapp_address;
use crate::shared::config::MessagingConfig;

#[derive(Debug, Error)]
pub enum MessagingError {
    #[error("Messaging provider is not configured")]
    NotConfigured,

    #[error("Provider rejected message (HTTP {status}, code {code:?}): {message}")]
    Provider {
        status: u16,
        code: Option<u32>,
        message: String,
    },

    #[error("Messaging transport error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Unexpected provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl MessagingError {
    pub fn code(&self) -> Option<u32> {
        match self {
            MessagingError::Provider { code, .. } => *code,
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            MessagingError::Provider { status, code, .. } => {
                error_codes::classify(*code, *status) == ErrorClass::Retryable
            }
            MessagingError::Network(_) => true,
            MessagingError::NotConfigured | MessagingError::Decode(_) => false,
        }
    }

    /// Сообщение для оператора (pt-BR)
    pub fn user_message(&self) -> String {
        match self {
            MessagingError::NotConfigured => "Envio de mensagens não configurado.".to_string(),
            MessagingError::Provider { code, .. } => error_codes::user_message(*code),
            MessagingError::Network(_) => "Falha de conexão com o provedor.".to_string(),
            MessagingError::Decode(_) => "Resposta inesperada do provedor.".to_string(),
        }
    }
}

/// Отправитель шаблонных сообщений; возвращает SID сообщения
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, request: &SendRequest) -> Result<String, MessagingError>;
}

#[derive(Debug, Deserialize)]
struct MessageResponse {
    sid: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProviderErrorBody {
    code: Option<u32>,
    message: Option<String>,
}

fn provider_error(status: u16, body: &str) -> MessagingError {
    let parsed: ProviderErrorBody = serde_json::from_str(body).unwrap_or_default();
    MessagingError::Provider {
        status,
        code: parsed.code,
        message: parsed
            .message
            .unwrap_or_else(|| body.chars().take(300).collect()),
    }
}

/// Клиент Twilio Messages API (WhatsApp-шаблоны через Content API)
pub struct TwilioClient {
    http: reqwest::Client,
    base_url: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl TwilioClient {
    pub fn new(config: &MessagingConfig) -> Result<Self, MessagingError> {
        if !config.is_configured() {
            return Err(MessagingError::NotConfigured);
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            account_sid: config.account_sid.clone(),
            auth_token: config.auth_token.clone(),
            from: config.from.clone(),
        })
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        )
    }

    fn form(&self, request: &SendRequest) -> Result<Vec<(&'static str, String)>, MessagingError> {
        let from = if self.from.starts_with("whatsapp:") {
            self.from.clone()
        } else {
            to_whatsapp_address(&self.from)
        };
        Ok(vec![
            ("To", to_whatsapp_address(&request.phone)),
            ("From", from),
            ("ContentSid", request.template_id.clone()),
            ("ContentVariables", serde_json::to_string(&request.variables)?),
        ])
    }
}

#[async_trait]
impl MessageSender for TwilioClient {
    async fn send(&self, request: &SendRequest) -> Result<String, MessagingError> {
        let response = self
            .http
            .post(self.messages_url())
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&self.form(request)?)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("Twilio send to {} failed ({}): {}", request.phone, status, body);
            return Err(provider_error(status.as_u16(), &body));
        }
        let parsed: MessageResponse = serde_json::from_str(&body)?;
        Ok(parsed.sid)
    }
}
