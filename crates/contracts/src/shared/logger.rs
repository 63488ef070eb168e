use serde::{Deserialize, Serialize};

/// Уровень записи журнала событий
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "warn" => LogLevel::Warn,
            "error" => LogLevel::Error,
            _ => LogLevel::Info,
        }
    }
}

/// Запись журнала событий
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    pub timestamp: String,
    pub source: String, // "dashboard", "server" или "webhook"
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

/// DTO для создания новой записи журнала
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateLogRequest {
    pub source: String,
    #[serde(default = "default_level")]
    pub level: LogLevel,
    pub category: String,
    pub message: String,
}

fn default_level() -> LogLevel {
    LogLevel::Info
}
