use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Бизнес-настройки прачечной (строка `app_settings` с id = "default").
///
/// Используются расчётами прибыльности, кэшбэка и ROI кампаний.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    /// Процент кэшбэка (7.5 = 7,5%)
    pub cashback_percent: f64,
    /// Кэшбэк начисляется только на продажи с этой даты
    pub cashback_start_date: NaiveDate,
    /// Постоянные расходы в месяц (аренда, зарплаты, интернет)
    pub fixed_costs_monthly: f64,
    /// Обслуживание машин в месяц
    pub maintenance_costs_monthly: f64,
    /// Переменные расходы на один цикл (вода, энергия, химия)
    pub variable_cost_per_service: f64,
}

impl AppSettings {
    pub fn cashback_rate(&self) -> f64 {
        self.cashback_percent / 100.0
    }

    pub fn monthly_costs(&self) -> f64 {
        self.fixed_costs_monthly + self.maintenance_costs_monthly
    }
}
