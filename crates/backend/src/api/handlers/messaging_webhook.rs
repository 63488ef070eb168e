use axum::{
    http::{header, StatusCode},
    response::IntoResponse,
    Form,
};
use contracts::shared::messaging::WebhookForm;

use crate::usecases::u504_messaging_webhook;

const EMPTY_TWIML: &str = r#"<?xml version="1.0" encoding="UTF-8"?><Response></Response>"#;

/// POST /api/webhook/messaging
///
/// Провайдер всегда получает 200 с пустым TwiML, ошибки остаются в журнале.
pub async fn receive(form: Option<Form<WebhookForm>>) -> impl IntoResponse {
    match form {
        Some(Form(form)) => u504_messaging_webhook::process_webhook(&form).await,
        None => tracing::warn!("webhook: unreadable form body"),
    }
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/xml")],
        EMPTY_TWIML,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u504_messaging_webhook::{classify, WebhookEvent};
    use contracts::shared::messaging::DeliveryStatus;

    #[tokio::test]
    async fn test_unreadable_form_still_acknowledged() {
        let response = receive(None).await.into_response();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/xml"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], EMPTY_TWIML.as_bytes());
    }

    async fn decode(body: &'static str) -> WebhookForm {
        use axum::body::Body;
        use axum::extract::FromRequest;
        use axum::http::Request;

        let req = Request::builder()
            .method("POST")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap();
        let Form(form) = Form::<WebhookForm>::from_request(req, &()).await.unwrap();
        form
    }

    #[tokio::test]
    async fn test_provider_form_fields_are_decoded() {
        let form = decode(
            "MessageSid=SM123&AccountSid=AC1&From=whatsapp%3A%2B5511987654321\
             &To=whatsapp%3A%2B5511900000000&ButtonPayload=PARAR&ButtonText=Parar\
             &ProfileName=Maria&WaId=5511987654321",
        )
        .await;
        assert_eq!(form.message_sid.as_deref(), Some("SM123"));
        assert_eq!(form.from.as_deref(), Some("whatsapp:+5511987654321"));
        assert_eq!(form.wa_id.as_deref(), Some("5511987654321"));

        match classify(&form) {
            WebhookEvent::ButtonClick { phone, payload, .. } => {
                assert_eq!(phone, "+5511987654321");
                assert_eq!(payload, "PARAR");
            }
            other => panic!("expected button click, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_callback_form() {
        let form = decode(
            "MessageSid=SM456&SmsStatus=undelivered&MessageStatus=undelivered\
             &ErrorCode=63003&To=whatsapp%3A%2B5511987654321&From=whatsapp%3A%2B5511900000000",
        )
        .await;
        assert_eq!(
            classify(&form),
            WebhookEvent::StatusCallback {
                message_sid: "SM456".to_string(),
                status: DeliveryStatus::Undelivered,
                error_code: Some(63003),
                phone: Some("+5511987654321".to_string()),
            }
        );
    }

    #[tokio::test]
    async fn test_inbound_text_form() {
        let form = decode(
            "MessageSid=SM789&SmsStatus=received&Body=Ol%C3%A1%2C+tudo+bem%3F\
             &From=whatsapp%3A%2B5511987654321&ProfileName=Jo%C3%A3o",
        )
        .await;
        match classify(&form) {
            WebhookEvent::InboundText {
                phone,
                body,
                profile_name,
                ..
            } => {
                assert_eq!(phone, "+5511987654321");
                assert_eq!(body, "Olá, tudo bem?");
                assert_eq!(profile_name.as_deref(), Some("João"));
            }
            other => panic!("expected inbound text, got {:?}", other),
        }
    }
}

