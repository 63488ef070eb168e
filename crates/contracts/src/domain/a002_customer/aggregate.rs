use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Сегмент риска оттока по числу дней с последнего визита
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RiskSegment {
    Healthy,
    Monitor,
    #[serde(rename = "At Risk")]
    AtRisk,
    Churning,
}

impl RiskSegment {
    pub const ALL: [RiskSegment; 4] = [
        RiskSegment::Healthy,
        RiskSegment::Monitor,
        RiskSegment::AtRisk,
        RiskSegment::Churning,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            RiskSegment::Healthy => "Healthy",
            RiskSegment::Monitor => "Monitor",
            RiskSegment::AtRisk => "At Risk",
            RiskSegment::Churning => "Churning",
        }
    }

    /// Активный клиент: ещё не в зоне риска
    pub fn is_retained(&self) -> bool {
        matches!(self, RiskSegment::Healthy | RiskSegment::Monitor)
    }
}

/// Агрегированные метрики клиента, вычисляются из транзакций
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetrics {
    pub doc: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub total_spent: f64,
    pub visit_count: u32,
    pub avg_ticket: f64,
    pub total_services: u32,
    pub cashback_earned: f64,
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
    pub days_since_last_visit: Option<i64>,
    pub risk_segment: RiskSegment,
}

/// Профиль клиента в таблице `customers` (строка выгрузки POS)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub doc: String,
    pub nome: Option<String>,
    pub telefone: Option<String>,
    pub email: Option<String>,
    pub data_cadastro: Option<NaiveDateTime>,
    #[serde(default)]
    pub saldo_carteira: f64,
    pub first_visit: Option<NaiveDate>,
    pub last_visit: Option<NaiveDate>,
    #[serde(default)]
    pub transaction_count: u32,
    #[serde(default)]
    pub total_spent: f64,
    pub source: Option<String>,
}

/// Количество клиентов и выручка по сегменту
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentCount {
    pub segment: RiskSegment,
    pub customers: u32,
    pub revenue: f64,
    pub share_percent: f64,
}

/// Распределение клиентской базы по сегментам риска
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentSummary {
    pub total_customers: u32,
    pub segments: Vec<SegmentCount>,
    /// Доля клиентов в сегментах Healthy + Monitor, 0..1
    pub retention_rate: f64,
}
