//! KPI-карточки дашборда прачечной: каталог, контекст периода, значения.

use serde::{Deserialize, Serialize};

/// Идентификатор показателя (`revenue`, `avg_ticket`, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndicatorId(pub String);

impl IndicatorId {
    pub fn new(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum ValueFormat {
    /// Денежная сумма, например `R$`
    Money { currency: String },
    Integer,
}

/// Оценка изменения к прошлому периоду
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum IndicatorStatus {
    Good,
    Bad,
    Neutral,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorMeta {
    pub id: IndicatorId,
    pub label: String,
    pub format: ValueFormat,
    pub description: String,
}

/// Именованная группа показателей (например, обзор лавандерии)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorSet {
    pub id: String,
    pub label: String,
    pub indicators: Vec<IndicatorId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorCatalogResponse {
    pub indicators: Vec<IndicatorMeta>,
    pub sets: Vec<IndicatorSet>,
}

/// Значение показателя за период и за такой же период месяцем раньше.
///
/// `value == None`, если показатель не удалось посчитать; причина в `subtitle`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorValue {
    pub id: IndicatorId,
    pub value: Option<f64>,
    pub previous_value: Option<f64>,
    /// Изменение в процентах; `None`, если прошлый период пустой
    pub change_percent: Option<f64>,
    pub status: IndicatorStatus,
    pub subtitle: Option<String>,
}

/// Период `YYYY-MM-DD..YYYY-MM-DD` (включительно) и фильтр по loja
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndicatorContext {
    pub date_from: String,
    pub date_to: String,
    #[serde(default)]
    pub store: Option<String>,
}

/// POST /api/indicators/compute
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeIndicatorsRequest {
    pub indicator_ids: Vec<IndicatorId>,
    pub context: IndicatorContext,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputeIndicatorsResponse {
    pub values: Vec<IndicatorValue>,
}
