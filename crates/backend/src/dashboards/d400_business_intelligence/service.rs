use anyhow::Result;
use chrono::{Datelike, Duration, Local, NaiveDate};
use contracts::dashboards::d400_business_intelligence::dto::{
    CampaignRoiReport, DateRangeRequest, GrowthRequest, GrowthTrendReport, HealthScoreInputs,
    HealthScoreReport, MonthRequest, OperationsSummary, ProfitabilityReport, WeatherImpactReport,
};
use contracts::domain::a002_customer::aggregate::{CustomerMetrics, SegmentSummary};

use super::calculations::{self, month_bounds, shift_month};
use super::repository;
use crate::domain::a001_transaction::repository as transactions;
use crate::domain::a002_customer::metrics;
use crate::domain::a003_campaign::repository as campaigns;
use crate::shared::config::get_config;
use crate::shared::supabase::settings::get_app_settings;

/// Окно активности клиентов для сегментации
const CUSTOMER_LOOKBACK_DAYS: i64 = 365;

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn first_day_months_ago(day: NaiveDate, months: u32) -> NaiveDate {
    let (y, m) = shift_month(day.year(), day.month(), -(months as i32));
    NaiveDate::from_ymd_opt(y, m, 1).unwrap_or(day)
}

/// Прибыльность за месяц
pub async fn get_profitability(request: MonthRequest) -> Result<ProfitabilityReport> {
    let settings = get_app_settings().await;
    let Some((first, last)) = month_bounds(request.year, request.month) else {
        anyhow::bail!("Invalid month: {}-{}", request.year, request.month);
    };
    let txs = transactions::list_between(first, last + Duration::days(1)).await?;
    tracing::info!(
        "d400 profitability {}-{:02}: {} transactions",
        request.year,
        request.month,
        txs.len()
    );
    Ok(calculations::calculate_profitability(
        &txs,
        &settings,
        request.year,
        request.month,
        today(),
    ))
}

pub async fn get_weather_impact(request: DateRangeRequest) -> Result<WeatherImpactReport> {
    let txs =
        transactions::list_between(request.date_from, request.date_to + Duration::days(1)).await?;
    let weather = repository::load_weather(request.date_from, request.date_to).await?;
    Ok(calculations::calculate_weather_impact(&txs, &weather))
}

/// ROI кампании; `None`, если кампания не найдена
pub async fn get_campaign_roi(campaign_id: &str) -> Result<Option<CampaignRoiReport>> {
    let Some(campaign) = campaigns::get_by_id(campaign_id).await? else {
        return Ok(None);
    };
    // окно кампании + такое же окно перед ней
    let from = campaign.valid_from - Duration::days(campaign.duration_days());
    let to = campaign.valid_to + Duration::days(1);
    let txs = transactions::list_between(from, to).await?;
    Ok(Some(calculations::calculate_campaign_roi(&campaign, &txs)))
}

/// Окно `[from, to)` для тренда: `months` закрытых месяцев плюс ещё один
/// перед ними для роста первого месяца; текущий неполный месяц не входит.
fn growth_window(today: NaiveDate, months: u32) -> (NaiveDate, NaiveDate) {
    (
        first_day_months_ago(today, months + 1),
        first_day_months_ago(today, 0),
    )
}

pub async fn get_growth_trend(request: GrowthRequest) -> Result<GrowthTrendReport> {
    let months = request.months.clamp(1, 36);
    let (from, to) = growth_window(today(), months);
    let txs = transactions::list_between(from, to).await?;
    Ok(calculations::calculate_growth_trend(&txs, months))
}

pub async fn get_operations_summary(request: DateRangeRequest) -> Result<OperationsSummary> {
    let txs =
        transactions::list_between(request.date_from, request.date_to + Duration::days(1)).await?;
    Ok(calculations::calculate_operations_summary(&txs))
}

/// Метрики клиентов по транзакциям за последний год
pub async fn get_customer_metrics() -> Result<Vec<CustomerMetrics>> {
    let today = today();
    let txs = transactions::list_between(
        today - Duration::days(CUSTOMER_LOOKBACK_DAYS),
        today + Duration::days(1),
    )
    .await?;
    Ok(metrics::compute_customer_metrics(
        &txs,
        today,
        &get_config().segments,
    ))
}

pub async fn get_segment_summary() -> Result<SegmentSummary> {
    let customers = get_customer_metrics().await?;
    Ok(metrics::segment_summary(&customers))
}

/// Индекс здоровья: рост за 6 закрытых месяцев, удержание клиентов, маржа
/// прошлого (закрытого) месяца.
pub async fn get_health_score() -> Result<HealthScoreReport> {
    let growth = get_growth_trend(GrowthRequest { months: 6 }).await?;
    let segments = get_segment_summary().await?;

    let today = today();
    let (year, month) = shift_month(today.year(), today.month(), -1);
    let profitability = get_profitability(MonthRequest { year, month }).await?;

    let inputs = HealthScoreInputs {
        avg_growth_percent: growth.avg_growth_percent,
        retention_rate: segments.retention_rate,
        margin_percent: profitability.margin_percent,
    };
    Ok(calculations::calculate_health_score(&inputs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_business_intelligence::calculations::test_support::sale;
    use contracts::dashboards::d400_business_intelligence::dto::TrendDirection;

    #[test]
    fn test_first_day_months_ago() {
        let day = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert_eq!(
            first_day_months_ago(day, 6),
            NaiveDate::from_ymd_opt(2023, 9, 1).unwrap()
        );
        assert_eq!(
            first_day_months_ago(day, 0),
            NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_growth_window_excludes_current_month() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let (from, to) = growth_window(today, 4);
        assert_eq!(from, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(to, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    }

    #[test]
    fn test_flat_business_with_partial_month_is_stable() {
        let today = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let mut all: Vec<_> = (1..=5).map(|m| sale(2024, m, 10, 3000.0)).collect();
        all.extend((1..=3).map(|d| sale(2024, 6, d, 100.0)));

        let (from, to) = growth_window(today, 6);
        let txs: Vec<_> = all
            .into_iter()
            .filter(|tx| tx.day() >= from && tx.day() < to)
            .collect();
        let report = calculations::calculate_growth_trend(&txs, 6);

        assert_eq!(report.months.last().map(|m| m.period.as_str()), Some("2024-05"));
        assert_eq!(report.latest_growth_percent, Some(0.0));
        assert_eq!(report.avg_growth_percent, 0.0);
        assert_eq!(report.trend, TrendDirection::Stable);
    }
}
