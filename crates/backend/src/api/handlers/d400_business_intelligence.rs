use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::dashboards::d400_business_intelligence::dto::{
    CampaignRoiReport, DateRangeRequest, GrowthRequest, GrowthTrendReport, HealthScoreReport,
    MonthRequest, OperationsSummary, ProfitabilityReport, WeatherImpactReport,
};
use contracts::domain::a002_customer::aggregate::SegmentSummary;

use crate::dashboards::d400_business_intelligence::service;

fn internal_error(context: &str, e: anyhow::Error) -> StatusCode {
    tracing::error!("D400 BI: {} failed: {:#}", context, e);
    StatusCode::INTERNAL_SERVER_ERROR
}

/// GET /api/d400/profitability?year=2025&month=3
pub async fn get_profitability(
    Query(request): Query<MonthRequest>,
) -> Result<Json<ProfitabilityReport>, StatusCode> {
    if !(1..=12).contains(&request.month) {
        return Err(StatusCode::BAD_REQUEST);
    }
    tracing::info!(
        "D400 BI: profitability for {}-{:02}",
        request.year,
        request.month
    );
    service::get_profitability(request)
        .await
        .map(Json)
        .map_err(|e| internal_error("profitability", e))
}

/// GET /api/d400/weather?date_from=2025-01-01&date_to=2025-03-31
pub async fn get_weather_impact(
    Query(request): Query<DateRangeRequest>,
) -> Result<Json<WeatherImpactReport>, StatusCode> {
    if request.date_from > request.date_to {
        return Err(StatusCode::BAD_REQUEST);
    }
    service::get_weather_impact(request)
        .await
        .map(Json)
        .map_err(|e| internal_error("weather impact", e))
}

/// GET /api/d400/campaigns/:id/roi
pub async fn get_campaign_roi(
    Path(campaign_id): Path<String>,
) -> Result<Json<CampaignRoiReport>, StatusCode> {
    match service::get_campaign_roi(&campaign_id).await {
        Ok(Some(report)) => Ok(Json(report)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(internal_error("campaign ROI", e)),
    }
}

/// GET /api/d400/growth?months=6
pub async fn get_growth_trend(
    Query(request): Query<GrowthRequest>,
) -> Result<Json<GrowthTrendReport>, StatusCode> {
    service::get_growth_trend(request)
        .await
        .map(Json)
        .map_err(|e| internal_error("growth trend", e))
}

/// GET /api/d400/health
pub async fn get_health_score() -> Result<Json<HealthScoreReport>, StatusCode> {
    match service::get_health_score().await {
        Ok(report) => {
            tracing::info!("D400 BI: health score {} ({:?})", report.score, report.grade);
            Ok(Json(report))
        }
        Err(e) => Err(internal_error("health score", e)),
    }
}

/// GET /api/d400/operations?date_from=2025-01-01&date_to=2025-01-31
pub async fn get_operations_summary(
    Query(request): Query<DateRangeRequest>,
) -> Result<Json<OperationsSummary>, StatusCode> {
    if request.date_from > request.date_to {
        return Err(StatusCode::BAD_REQUEST);
    }
    service::get_operations_summary(request)
        .await
        .map(Json)
        .map_err(|e| internal_error("operations summary", e))
}

/// GET /api/d400/segments
pub async fn get_segment_summary() -> Result<Json<SegmentSummary>, StatusCode> {
    service::get_segment_summary()
        .await
        .map(Json)
        .map_err(|e| internal_error("segments", e))
}
