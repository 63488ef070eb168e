use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::shared::communication::{
    CommunicationEntry, ContactTracking, CreateCommunicationRequest,
};
use serde::Deserialize;

use crate::domain::a005_contact_tracking::repository as contact_tracking;
use crate::domain::a006_communication_log::repository as communication_log;
use crate::shared::messaging::phone::normalize_br_phone;

const DEFAULT_LIMIT: u64 = 100;

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<u64>,
}

fn canonical(phone: &str) -> String {
    normalize_br_phone(phone).unwrap_or_else(|| phone.trim().to_string())
}

/// GET /api/communications/:phone?limit=100
pub async fn history(
    Path(phone): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<CommunicationEntry>>, StatusCode> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT);
    communication_log::history(&canonical(&phone), limit)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Communications: history failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// GET /api/communications/:phone/contacts
pub async fn contacts(Path(phone): Path<String>) -> Result<Json<Vec<ContactTracking>>, StatusCode> {
    contact_tracking::history_for_phone(&canonical(&phone))
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Communications: contact history failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}

/// POST /api/communications
pub async fn create(
    Json(mut request): Json<CreateCommunicationRequest>,
) -> Result<Json<CommunicationEntry>, StatusCode> {
    if request.message.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    request.phone = canonical(&request.phone);
    communication_log::add(&request, None)
        .await
        .map(Json)
        .map_err(|e| {
            tracing::error!("Communications: insert failed: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })
}
