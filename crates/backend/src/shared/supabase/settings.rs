use contracts::domain::RawRow;
use contracts::shared::settings::AppSettings;
use once_cell::sync::Lazy;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use super::Query;
use crate::shared::config::get_config;
use crate::shared::parsing::{parse_date, value_f64, value_string};

type SettingsCache = Mutex<Option<(Instant, AppSettings)>>;

static SETTINGS_CACHE: Lazy<SettingsCache> = Lazy::new(|| Mutex::new(None));

fn is_fresh(loaded_at: Instant, now: Instant, ttl: Duration) -> bool {
    now.saturating_duration_since(loaded_at) < ttl
}

/// Настройки из строки `app_settings`; отсутствующие поля берутся из `defaults`
pub fn settings_from_row(row: &RawRow, defaults: &AppSettings) -> AppSettings {
    let number = |key: &str, fallback: f64| {
        if row.get(key).map(|v| v.is_null()).unwrap_or(true) {
            fallback
        } else {
            value_f64(row.get(key))
        }
    };

    AppSettings {
        cashback_percent: number("cashback_percent", defaults.cashback_percent),
        cashback_start_date: value_string(row.get("cashback_start_date"))
            .and_then(|s| parse_date(&s))
            .unwrap_or(defaults.cashback_start_date),
        fixed_costs_monthly: number("fixed_costs_monthly", defaults.fixed_costs_monthly),
        maintenance_costs_monthly: number(
            "maintenance_costs_monthly",
            defaults.maintenance_costs_monthly,
        ),
        variable_cost_per_service: number(
            "variable_cost_per_service",
            defaults.variable_cost_per_service,
        ),
    }
}

fn cached(cache: &SettingsCache, now: Instant, ttl: Duration) -> Option<AppSettings> {
    let guard = cache.lock().ok()?;
    let hit = guard
        .as_ref()
        .filter(|(loaded_at, _)| is_fresh(*loaded_at, now, ttl))
        .map(|(_, settings)| settings.clone());
    hit
}

/// Кэшируются только реально загруженные настройки; при ошибке
/// возвращаются `defaults`, и следующий вызов снова идёт в базу.
fn settle(
    cache: &SettingsCache,
    loaded: anyhow::Result<AppSettings>,
    defaults: AppSettings,
    now: Instant,
) -> AppSettings {
    match loaded {
        Ok(settings) => {
            if let Ok(mut cache) = cache.lock() {
                *cache = Some((now, settings.clone()));
            }
            settings
        }
        Err(e) => {
            tracing::warn!("[AppSettings] Using defaults: {}", e);
            defaults
        }
    }
}

/// Бизнес-настройки с кэшем (TTL из конфигурации).
///
/// Никогда не возвращает ошибку: при недоступности базы используются значения
/// из секции `[business]`.
pub async fn get_app_settings() -> AppSettings {
    let config = get_config();
    let ttl = Duration::from_secs(config.supabase.settings_cache_ttl_secs);
    let now = Instant::now();

    if let Some(settings) = cached(&SETTINGS_CACHE, now, ttl) {
        return settings;
    }

    let defaults = config.business.to_settings();
    let loaded = load_settings(&defaults).await;
    settle(&SETTINGS_CACHE, loaded, defaults, now)
}

async fn load_settings(defaults: &AppSettings) -> anyhow::Result<AppSettings> {
    let client = super::client()?;
    let rows = client
        .select("app_settings", &Query::new().select("*").eq("id", "default").limit(1))
        .await?;

    let settings = match rows.first() {
        Some(row) => settings_from_row(row, defaults),
        None => defaults.clone(),
    };
    tracing::info!(
        "[AppSettings] Loaded: {}% cashback from {}",
        settings.cashback_percent,
        settings.cashback_start_date
    );
    Ok(settings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::config::BusinessConfig;
    use chrono::NaiveDate;
    use serde_json::json;

    #[test]
    fn test_is_fresh_respects_ttl() {
        let loaded = Instant::now();
        let ttl = Duration::from_secs(300);
        assert!(is_fresh(loaded, loaded + Duration::from_secs(299), ttl));
        assert!(!is_fresh(loaded, loaded + Duration::from_secs(300), ttl));
    }

    #[test]
    fn test_settings_from_row_with_partial_values() {
        let defaults = BusinessConfig::default().to_settings();
        let row = json!({
            "id": "default",
            "cashback_percent": "10",
            "cashback_start_date": null,
            "fixed_costs_monthly": 5000.0
        });
        let row = row.as_object().unwrap().clone();

        let settings = settings_from_row(&row, &defaults);
        assert_eq!(settings.cashback_percent, 10.0);
        assert_eq!(
            settings.cashback_start_date,
            NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
        );
        assert_eq!(settings.fixed_costs_monthly, 5000.0);
        assert_eq!(settings.maintenance_costs_monthly, 0.0);
    }

    #[test]
    fn test_failed_load_is_not_cached() {
        let cache: SettingsCache = Mutex::new(None);
        let defaults = BusinessConfig::default().to_settings();
        let now = Instant::now();

        let settings = settle(
            &cache,
            Err(anyhow::anyhow!("connection refused")),
            defaults.clone(),
            now,
        );
        assert_eq!(settings.cashback_percent, defaults.cashback_percent);
        assert!(cache.lock().unwrap().is_none());
        assert!(cached(&cache, now, Duration::from_secs(300)).is_none());
    }

    #[test]
    fn test_loaded_settings_are_cached() {
        let cache: SettingsCache = Mutex::new(None);
        let defaults = BusinessConfig::default().to_settings();
        let mut loaded = defaults.clone();
        loaded.cashback_percent = 10.0;
        let now = Instant::now();

        let settings = settle(&cache, Ok(loaded), defaults, now);
        assert_eq!(settings.cashback_percent, 10.0);

        let hit = cached(&cache, now + Duration::from_secs(10), Duration::from_secs(300));
        assert_eq!(hit.map(|s| s.cashback_percent), Some(10.0));
        assert!(cached(&cache, now + Duration::from_secs(300), Duration::from_secs(300)).is_none());
    }
}
