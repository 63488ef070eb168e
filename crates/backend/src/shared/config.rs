use chrono::NaiveDate;
use contracts::shared::settings::AppSettings;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::path::{Path, PathBuf};

static CONFIG: OnceCell<Config> = OnceCell::new();

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub supabase: SupabaseConfig,
    #[serde(default)]
    pub messaging: MessagingConfig,
    #[serde(default)]
    pub retry: RetryConfig,
    #[serde(default)]
    pub business: BusinessConfig,
    #[serde(default)]
    pub segments: SegmentsConfig,
    #[serde(default)]
    pub upload: UploadConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/app.db".to_string(),
        }
    }
}

/// Hosted database (PostgREST). Empty url/key means "not configured".
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SupabaseConfig {
    pub url: String,
    pub key: String,
    pub timeout_secs: u64,
    pub settings_cache_ttl_secs: u64,
}

impl Default for SupabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            key: String::new(),
            timeout_secs: 30,
            settings_cache_ttl_secs: 300,
        }
    }
}

impl SupabaseConfig {
    pub fn is_configured(&self) -> bool {
        !self.url.trim().is_empty() && !self.key.trim().is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MessagingConfig {
    pub base_url: String,
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, "whatsapp:+55..."
    pub from: String,
    pub timeout_secs: u64,
    /// Do not contact the same phone again within this many days
    pub cooldown_days: i64,
}

impl Default for MessagingConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.twilio.com".to_string(),
            account_sid: String::new(),
            auth_token: String::new(),
            from: String::new(),
            timeout_secs: 30,
            cooldown_days: 7,
        }
    }
}

impl MessagingConfig {
    pub fn is_configured(&self) -> bool {
        !self.account_sid.is_empty() && !self.auth_token.is_empty() && !self.from.is_empty()
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1000,
            max_delay_ms: 10_000,
        }
    }
}

/// Defaults for `app_settings` when the hosted row is missing or partial.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct BusinessConfig {
    pub cashback_percent: f64,
    pub cashback_start_date: NaiveDate,
    pub fixed_costs_monthly: f64,
    pub maintenance_costs_monthly: f64,
    pub variable_cost_per_service: f64,
}

impl Default for BusinessConfig {
    fn default() -> Self {
        Self {
            cashback_percent: 7.5,
            cashback_start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap_or_default(),
            fixed_costs_monthly: 0.0,
            maintenance_costs_monthly: 0.0,
            variable_cost_per_service: 0.0,
        }
    }
}

impl BusinessConfig {
    pub fn to_settings(&self) -> AppSettings {
        AppSettings {
            cashback_percent: self.cashback_percent,
            cashback_start_date: self.cashback_start_date,
            fixed_costs_monthly: self.fixed_costs_monthly,
            maintenance_costs_monthly: self.maintenance_costs_monthly,
            variable_cost_per_service: self.variable_cost_per_service,
        }
    }
}

/// Days-since-last-visit thresholds for churn risk segments.
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SegmentsConfig {
    pub healthy_max_days: i64,
    pub monitor_max_days: i64,
    pub at_risk_max_days: i64,
}

impl Default for SegmentsConfig {
    fn default() -> Self {
        Self {
            healthy_max_days: 30,
            monitor_max_days: 60,
            at_risk_max_days: 90,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct UploadConfig {
    pub delimiter: char,
    pub batch_size: usize,
    /// Максимальный размер тела CSV-загрузки, МБ
    pub max_body_mb: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            delimiter: ';',
            batch_size: 100,
            max_body_mb: 50,
        }
    }
}

impl UploadConfig {
    pub fn max_body_bytes(&self) -> usize {
        self.max_body_mb.max(1) * 1024 * 1024
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[server]
host = "0.0.0.0"
port = 3000

[database]
path = "target/db/app.db"

[supabase]
url = ""
key = ""

[messaging]
base_url = "https://api.twilio.com"
cooldown_days = 7

[retry]
max_attempts = 3
base_delay_ms = 1000
max_delay_ms = 10000

[business]
cashback_percent = 7.5
cashback_start_date = "2024-06-01"

[segments]
healthy_max_days = 30
monitor_max_days = 60
at_risk_max_days = 90

[upload]
delimiter = ";"
batch_size = 100
max_body_mb = 50
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Falls back to embedded default config
///
/// Secrets are then overridden from the environment.
pub fn load_config() -> anyhow::Result<Config> {
    let mut config = read_config_file()?;
    apply_env_overrides(&mut config, |name| std::env::var(name).ok());
    Ok(config)
}

fn read_config_file() -> anyhow::Result<Config> {
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            let config_path = exe_dir.join("config.toml");

            if config_path.exists() {
                tracing::info!("Loading config from: {}", config_path.display());
                let contents = std::fs::read_to_string(&config_path)?;
                let config: Config = toml::from_str(&contents)?;
                return Ok(config);
            } else {
                tracing::warn!("config.toml not found at: {}", config_path.display());
            }
        }
    }

    tracing::info!("Using default embedded configuration");
    let config: Config = toml::from_str(DEFAULT_CONFIG)?;
    Ok(config)
}

/// Переопределение секретов из переменных окружения
fn apply_env_overrides(config: &mut Config, env: impl Fn(&str) -> Option<String>) {
    let non_empty = |name: &str| env(name).filter(|v| !v.trim().is_empty());

    if let Some(url) = non_empty("SUPABASE_URL") {
        config.supabase.url = url;
    }
    if let Some(key) = non_empty("SUPABASE_KEY").or_else(|| non_empty("SUPABASE_ANON_KEY")) {
        config.supabase.key = key;
    }
    if let Some(sid) = non_empty("TWILIO_ACCOUNT_SID") {
        config.messaging.account_sid = sid;
    }
    if let Some(token) = non_empty("TWILIO_AUTH_TOKEN") {
        config.messaging.auth_token = token;
    }
    if let Some(from) = non_empty("TWILIO_WHATSAPP_FROM") {
        config.messaging.from = from;
    }
}

/// Сохранить конфигурацию глобально (вызывается один раз при старте)
pub fn set_global(config: Config) {
    if CONFIG.set(config).is_err() {
        tracing::warn!("Global config already initialized, keeping the first one");
    }
}

/// Глобальная конфигурация; до инициализации возвращает значения по умолчанию
pub fn get_config() -> &'static Config {
    CONFIG.get_or_init(Config::default)
}

/// Get the database file path from configuration
/// Resolves relative paths relative to the executable directory
pub fn get_database_path(config: &Config) -> anyhow::Result<PathBuf> {
    let db_path_str = &config.database.path;
    let db_path = Path::new(db_path_str);

    if db_path.is_absolute() {
        return Ok(db_path.to_path_buf());
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return Ok(exe_dir.join(db_path));
        }
    }

    Ok(PathBuf::from(db_path_str))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config_loads() {
        let config: Result<Config, _> = toml::from_str(DEFAULT_CONFIG);
        assert!(config.is_ok());
        let config = config.unwrap();
        assert_eq!(config.database.path, "target/db/app.db");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.delimiter, ';');
        assert_eq!(config.upload.max_body_bytes(), 50 * 1024 * 1024);
        assert_eq!(config.retry.max_attempts, 3);
        assert_eq!(
            config.business.cashback_start_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert!(!config.supabase.is_configured());
    }

    #[test]
    fn test_partial_config_uses_section_defaults() {
        let config: Config = toml::from_str("[server]\nport = 8080\n").unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.segments.healthy_max_days, 30);
        assert_eq!(config.messaging.cooldown_days, 7);
    }

    #[test]
    fn test_env_overrides_secrets() {
        let mut config = Config::default();
        let env: HashMap<&str, &str> = [
            ("SUPABASE_URL", "https://x.supabase.co"),
            ("SUPABASE_KEY", ""),
            ("SUPABASE_ANON_KEY", "anon"),
            ("TWILIO_ACCOUNT_SID", "AC123"),
        ]
        .into_iter()
        .collect();

        apply_env_overrides(&mut config, |name| env.get(name).map(|v| v.to_string()));

        assert_eq!(config.supabase.url, "https://x.supabase.co");
        assert_eq!(config.supabase.key, "anon");
        assert!(config.supabase.is_configured());
        assert_eq!(config.messaging.account_sid, "AC123");
        assert!(!config.messaging.is_configured());
    }
}
