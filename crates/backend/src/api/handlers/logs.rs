use axum::{extract::Query, http::StatusCode, Json};
use contracts::shared::logger::{CreateLogRequest, LogEntry};
use serde::Deserialize;

use crate::shared::logger;

#[derive(Debug, Deserialize)]
pub struct LogsQuery {
    pub limit: Option<u64>,
}

/// GET /api/logs?limit=200
pub async fn list_all(Query(query): Query<LogsQuery>) -> Result<Json<Vec<LogEntry>>, StatusCode> {
    match logger::repository::get_all_logs(query.limit).await {
        Ok(logs) => Ok(Json(logs)),
        Err(e) => {
            tracing::error!("Failed to load logs: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/logs
pub async fn create(Json(req): Json<CreateLogRequest>) -> StatusCode {
    match logger::repository::log_event(&req.source, req.level, &req.category, &req.message).await
    {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::error!("Failed to write log entry: {:#}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// DELETE /api/logs
pub async fn clear_all() -> StatusCode {
    match logger::repository::clear_all_logs().await {
        Ok(_) => StatusCode::OK,
        Err(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}
