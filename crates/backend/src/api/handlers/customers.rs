use axum::{extract::Query, http::StatusCode, Json};
use contracts::domain::a002_customer::aggregate::{
    CustomerMetrics, CustomerProfile, RiskSegment,
};
use serde::Deserialize;

use crate::dashboards::d400_business_intelligence::service;
use crate::domain::a002_customer::repository;

#[derive(Debug, Deserialize)]
pub struct ProfilesQuery {
    /// Подстрока имени, телефона или CPF
    pub search: Option<String>,
    pub limit: Option<usize>,
}

fn digits_of(s: &str) -> String {
    s.chars().filter(char::is_ascii_digit).collect()
}

fn matches_search(profile: &CustomerProfile, needle: &str) -> bool {
    let needle = needle.to_lowercase();
    let digits = digits_of(&needle);
    let name_hit = profile
        .nome
        .as_deref()
        .map(|n| n.to_lowercase().contains(&needle))
        .unwrap_or(false);
    let number_hit = !digits.is_empty()
        && (profile.doc.contains(&digits)
            || profile
                .telefone
                .as_deref()
                .map(|t| digits_of(t).contains(&digits))
                .unwrap_or(false));
    name_hit || number_hit
}

/// GET /api/customers?search=maria&limit=20
pub async fn list_profiles(
    Query(query): Query<ProfilesQuery>,
) -> Result<Json<Vec<CustomerProfile>>, StatusCode> {
    match repository::list_profiles().await {
        Ok(profiles) => {
            let search = query.search.as_deref().map(str::trim);
            let mut profiles: Vec<CustomerProfile> = match search {
                Some(needle) if !needle.is_empty() => profiles
                    .into_iter()
                    .filter(|p| matches_search(p, needle))
                    .collect(),
                _ => profiles,
            };
            if let Some(limit) = query.limit {
                profiles.truncate(limit);
            }
            Ok(Json(profiles))
        }
        Err(e) => {
            tracing::error!("Customers: failed to list profiles: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct MetricsQuery {
    /// "Healthy", "Monitor", "At Risk", "Churning"
    pub segment: Option<RiskSegment>,
    pub limit: Option<usize>,
}

/// GET /api/customers/metrics?segment=At%20Risk&limit=50
pub async fn get_metrics(
    Query(query): Query<MetricsQuery>,
) -> Result<Json<Vec<CustomerMetrics>>, StatusCode> {
    match service::get_customer_metrics().await {
        Ok(metrics) => {
            let mut metrics: Vec<CustomerMetrics> = match query.segment {
                Some(segment) => metrics
                    .into_iter()
                    .filter(|m| m.risk_segment == segment)
                    .collect(),
                None => metrics,
            };
            if let Some(limit) = query.limit {
                metrics.truncate(limit);
            }
            tracing::info!("Customers: returning {} metrics rows", metrics.len());
            Ok(Json(metrics))
        }
        Err(e) => {
            tracing::error!("Customers: failed to compute metrics: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
