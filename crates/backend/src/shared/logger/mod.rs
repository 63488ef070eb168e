pub mod repository;

use contracts::shared::logger::LogLevel;
use repository::log_event_internal;

/// Запись события сервера в журнал (асинхронно, ошибки не пробрасываются)
///
/// ```ignore
/// logger::log("startup", "Servidor iniciado");
/// ```
pub fn log(category: &str, message: &str) {
    log_event_internal("server", LogLevel::Info, category, message);
}

/// Событие, пришедшее от провайдера мессенджера
pub fn webhook(level: LogLevel, category: &str, message: &str) {
    log_event_internal("webhook", level, category, message);
}
