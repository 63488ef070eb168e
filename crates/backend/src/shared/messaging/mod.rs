//! Отправка WhatsApp-сообщений через провайдера и политика повторов.

pub mod error_codes;
pub mod phone;
pub mod retry;
pub mod twilio_client;

pub use retry::{send_with_retry, Delivery, RetryPolicy};
pub use twilio_client::{MessageSender, MessagingError, TwilioClient};
