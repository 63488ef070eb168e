use backon::{ExponentialBuilder, Retryable};
use contracts::shared::messaging::SendRequest;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use super::twilio_client::{MessageSender, MessagingError};
use crate::shared::config::RetryConfig;

/// Политика повторов: экспоненциальная задержка с потолком и джиттером
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Всего попыток, включая первую
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
            max_delay: Duration::from_millis(config.max_delay_ms.max(config.base_delay_ms)),
        }
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_min_delay(self.base_delay)
            .with_max_delay(self.max_delay)
            .with_factor(2.0)
            .with_max_times(self.max_attempts.saturating_sub(1) as usize)
            .with_jitter()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

/// Результат отправки с числом сделанных попыток
#[derive(Debug)]
pub struct Delivery {
    pub result: Result<String, MessagingError>,
    pub attempts: u32,
}

/// Отправка с повтором только временных ошибок
pub async fn send_with_retry(
    sender: &dyn MessageSender,
    request: &SendRequest,
    policy: &RetryPolicy,
) -> Delivery {
    let attempts = AtomicU32::new(0);
    let counter = &attempts;

    let result = (move || async move {
        counter.fetch_add(1, Ordering::SeqCst);
        sender.send(request).await
    })
    .retry(policy.backoff())
    .sleep(tokio::time::sleep)
    .when(|e: &MessagingError| e.is_retryable())
    .notify(|e: &MessagingError, delay: Duration| {
        tracing::warn!(
            "Retrying message to {} in {:?}: {}",
            request.phone,
            delay,
            e
        );
    })
    .await;

    Delivery {
        result,
        attempts: attempts.load(Ordering::SeqCst),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Отдаёт заранее заданные ответы по очереди
    struct ScriptedSender {
        responses: Mutex<Vec<Result<String, MessagingError>>>,
    }

    impl ScriptedSender {
        fn new(mut responses: Vec<Result<String, MessagingError>>) -> Self {
            responses.reverse();
            Self {
                responses: Mutex::new(responses),
            }
        }
    }

    #[async_trait]
    impl MessageSender for ScriptedSender {
        async fn send(&self, _request: &SendRequest) -> Result<String, MessagingError> {
            self.responses
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok("SM-default".to_string()))
        }
    }

    fn provider(status: u16, code: Option<u32>) -> MessagingError {
        MessagingError::Provider {
            status,
            code,
            message: "x".to_string(),
        }
    }

    fn request() -> SendRequest {
        SendRequest {
            phone: "+5511987654321".to_string(),
            template_id: "HX1".to_string(),
            variables: HashMap::new(),
        }
    }

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    #[tokio::test]
    async fn test_retries_transient_then_succeeds() {
        let sender = ScriptedSender::new(vec![
            Err(provider(429, None)),
            Err(provider(400, Some(63018))),
            Ok("SM1".to_string()),
        ]);
        let delivery = send_with_retry(&sender, &request(), &fast_policy(3)).await;
        assert_eq!(delivery.result.unwrap(), "SM1");
        assert_eq!(delivery.attempts, 3);
    }

    #[tokio::test]
    async fn test_permanent_error_is_not_retried() {
        let sender = ScriptedSender::new(vec![Err(provider(400, Some(21211)))]);
        let delivery = send_with_retry(&sender, &request(), &fast_policy(5)).await;
        assert_eq!(delivery.attempts, 1);
        assert_eq!(delivery.result.unwrap_err().code(), Some(21211));
    }

    #[tokio::test]
    async fn test_gives_up_after_max_attempts() {
        let sender = ScriptedSender::new(vec![
            Err(provider(500, None)),
            Err(provider(500, None)),
            Err(provider(500, None)),
            Ok("late".to_string()),
        ]);
        let delivery = send_with_retry(&sender, &request(), &fast_policy(3)).await;
        assert_eq!(delivery.attempts, 3);
        assert!(delivery.result.is_err());
    }

    #[test]
    fn test_policy_from_config() {
        let policy = RetryPolicy::from_config(&RetryConfig {
            max_attempts: 0,
            base_delay_ms: 500,
            max_delay_ms: 100,
        });
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.max_delay, Duration::from_millis(500));
    }
}
