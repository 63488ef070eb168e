use axum::{extract::Query, http::StatusCode, Json};
use contracts::domain::a004_blacklist::aggregate::{BlacklistEntry, BlacklistReason};
use serde::Deserialize;

use crate::domain::a004_blacklist::repository;

#[derive(Debug, Deserialize)]
pub struct BlacklistQuery {
    /// "opt-out", "undeliverable", "manual"
    pub reason: Option<BlacklistReason>,
}

fn filter_by_reason(
    entries: Vec<BlacklistEntry>,
    reason: Option<BlacklistReason>,
) -> Vec<BlacklistEntry> {
    match reason {
        Some(reason) => entries.into_iter().filter(|e| e.reason == reason).collect(),
        None => entries,
    }
}

/// GET /api/blacklist?reason=opt-out
pub async fn list_all(
    Query(query): Query<BlacklistQuery>,
) -> Result<Json<Vec<BlacklistEntry>>, StatusCode> {
    match repository::list().await {
        Ok(entries) => {
            let entries = filter_by_reason(entries, query.reason);
            tracing::info!("Blacklist: returning {} entries", entries.len());
            Ok(Json(entries))
        }
        Err(e) => {
            tracing::error!("Blacklist: list failed: {:#}", e);
            Err(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::a004_blacklist::repository::new_entry;

    #[test]
    fn test_filter_by_reason() {
        let entries = vec![
            new_entry("+5511999990001", None, BlacklistReason::OptOut, "webhook", None),
            new_entry(
                "+5511999990002",
                None,
                BlacklistReason::Undeliverable,
                "campaign",
                Some(63003),
            ),
            new_entry("+5511999990003", None, BlacklistReason::OptOut, "manual", None),
        ];

        let opt_outs = filter_by_reason(entries.clone(), Some(BlacklistReason::OptOut));
        assert_eq!(opt_outs.len(), 2);
        assert!(opt_outs.iter().all(|e| e.reason == BlacklistReason::OptOut));

        assert_eq!(filter_by_reason(entries, None).len(), 3);
    }

    #[test]
    fn test_reason_query_uses_wire_names() {
        let uri: axum::http::Uri = "/api/blacklist?reason=undeliverable".parse().unwrap();
        let Query(query) = Query::<BlacklistQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.reason, Some(BlacklistReason::Undeliverable));

        let uri: axum::http::Uri = "/api/blacklist".parse().unwrap();
        let Query(query) = Query::<BlacklistQuery>::try_from_uri(&uri).unwrap();
        assert_eq!(query.reason, None);
    }
}
