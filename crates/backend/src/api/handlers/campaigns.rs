use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a003_campaign::aggregate::Campaign;
use contracts::usecases::u503_campaign_send::{
    request::CampaignSendRequest, response::CampaignSendReport,
};

use crate::domain::a003_campaign::repository;
use crate::usecases::u503_campaign_send;

/// GET /api/campaigns
pub async fn list_all() -> Result<Json<Vec<Campaign>>, StatusCode> {
    match repository::list().await {
        Ok(items) => Ok(Json(items)),
        Err(e) => {
            tracing::error!("Campaigns: list failed: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

/// POST /api/campaigns/:id/send
pub async fn send(
    Path(campaign_id): Path<String>,
    Json(request): Json<CampaignSendRequest>,
) -> Result<Json<CampaignSendReport>, StatusCode> {
    if request.recipients.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    match u503_campaign_send::send_campaign(&campaign_id, request).await {
        Ok(Some(report)) => Ok(Json(report)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => {
            tracing::error!("Campaign {}: send failed: {:#}", campaign_id, e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
