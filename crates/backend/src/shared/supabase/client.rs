use contracts::domain::RawRow;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use super::Query;

/// Размер страницы при выборке всех строк
const PAGE_SIZE: usize = 1000;

#[derive(Debug, Error)]
pub enum SupabaseError {
    #[error("Supabase is not configured")]
    NotConfigured,

    #[error("Supabase request failed with status {status}: {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Supabase transport error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Failed to decode Supabase response: {0}")]
    Decode(#[from] serde_json::Error),
}

impl SupabaseError {
    /// RPC-функция (или ресурс) отсутствует в базе
    pub fn is_missing_function(&self) -> bool {
        match self {
            SupabaseError::Api { status, code, message } => {
                matches!(code.as_deref(), Some("PGRST202") | Some("PGRST116") | Some("42883"))
                    || message.contains("does not exist")
                    || message.contains("Could not find the function")
                    || (*status == StatusCode::NOT_FOUND.as_u16() && message.contains("function"))
            }
            _ => false,
        }
    }
}

/// Тело ошибки PostgREST
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    code: Option<String>,
    message: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

fn api_error(status: StatusCode, body: &str) -> SupabaseError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = match (parsed.message, parsed.details.or(parsed.hint)) {
        (Some(m), Some(d)) => format!("{} ({})", m, d),
        (Some(m), None) => m,
        (None, _) => body.chars().take(300).collect(),
    };
    SupabaseError::Api {
        status: status.as_u16(),
        code: parsed.code,
        message,
    }
}

/// HTTP-клиент PostgREST
pub struct SupabaseClient {
    client: reqwest::Client,
    base_url: String,
    key: String,
}

impl SupabaseClient {
    pub fn new(url: &str, key: &str, timeout_secs: u64) -> Result<Self, SupabaseError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.max(1)))
            .build()?;
        Ok(Self {
            client,
            base_url: url.trim_end_matches('/').to_string(),
            key: key.to_string(),
        })
    }

    fn rest_url(&self, path: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.rest_url(path))
            .header("apikey", &self.key)
            .header("Authorization", format!("Bearer {}", self.key))
            .header("Accept", "application/json")
    }

    async fn check(response: Response, context: &str) -> Result<Response, SupabaseError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        tracing::error!("Supabase {} failed ({}): {}", context, status, body);
        Err(api_error(status, &body))
    }

    /// SELECT одной страницы
    pub async fn select(&self, table: &str, query: &Query) -> Result<Vec<RawRow>, SupabaseError> {
        let response = self
            .request(Method::GET, table)
            .query(query.params())
            .send()
            .await?;
        let response = Self::check(response, &format!("select {}", table)).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// SELECT всех строк постранично (limit/offset)
    pub async fn select_all(&self, table: &str, query: &Query) -> Result<Vec<RawRow>, SupabaseError> {
        let mut rows = Vec::new();
        let mut offset = 0usize;
        loop {
            let page_query = query.clone().limit(PAGE_SIZE).offset(offset);
            let page = self.select(table, &page_query).await?;
            let fetched = page.len();
            rows.extend(page);
            if fetched < PAGE_SIZE {
                break;
            }
            offset += fetched;
        }
        tracing::debug!("Supabase select_all {}: {} rows", table, rows.len());
        Ok(rows)
    }

    /// SELECT с десериализацией строк в тип
    pub async fn select_as<T: for<'de> Deserialize<'de>>(
        &self,
        table: &str,
        query: &Query,
    ) -> Result<Vec<T>, SupabaseError> {
        let rows = self.select(table, query).await?;
        rows.into_iter()
            .map(|row| serde_json::from_value(serde_json::Value::Object(row)).map_err(SupabaseError::from))
            .collect()
    }

    pub async fn insert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        rows: &T,
    ) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=minimal")
            .json(rows)
            .send()
            .await?;
        Self::check(response, &format!("insert {}", table)).await?;
        Ok(())
    }

    /// INSERT ... ON CONFLICT (on_conflict) DO UPDATE
    pub async fn upsert<T: Serialize + ?Sized>(
        &self,
        table: &str,
        rows: &T,
        on_conflict: &str,
    ) -> Result<(), SupabaseError> {
        let response = self
            .request(Method::POST, table)
            .query(&[("on_conflict", on_conflict)])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(rows)
            .send()
            .await?;
        Self::check(response, &format!("upsert {}", table)).await?;
        Ok(())
    }

    /// PATCH строк, подходящих под фильтр; возвращает число обновлённых строк
    pub async fn update<T: Serialize + ?Sized>(
        &self,
        table: &str,
        filter: &Query,
        patch: &T,
    ) -> Result<usize, SupabaseError> {
        let response = self
            .request(Method::PATCH, table)
            .query(filter.params())
            .header("Prefer", "return=representation")
            .json(patch)
            .send()
            .await?;
        let response = Self::check(response, &format!("update {}", table)).await?;
        let body = response.text().await?;
        let updated: Vec<serde_json::Value> = if body.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(&body)?
        };
        Ok(updated.len())
    }

    /// Вызов функции базы: POST /rest/v1/rpc/{function}
    pub async fn rpc<T: Serialize + ?Sized>(
        &self,
        function: &str,
        args: &T,
    ) -> Result<serde_json::Value, SupabaseError> {
        let response = self
            .request(Method::POST, &format!("rpc/{}", function))
            .json(args)
            .send()
            .await?;
        let response = Self::check(response, &format!("rpc {}", function)).await?;
        let body = response.text().await?;
        if body.trim().is_empty() {
            return Ok(serde_json::Value::Null);
        }
        Ok(serde_json::from_str(&body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_parses_postgrest_body() {
        let err = api_error(
            StatusCode::NOT_FOUND,
            r#"{"code":"PGRST202","message":"Could not find the function public.refresh_customer_metrics","details":null,"hint":null}"#,
        );
        match &err {
            SupabaseError::Api { status, code, .. } => {
                assert_eq!(*status, 404);
                assert_eq!(code.as_deref(), Some("PGRST202"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(err.is_missing_function());
    }

    #[test]
    fn test_api_error_with_plain_body() {
        let err = api_error(StatusCode::BAD_REQUEST, "bad things");
        assert!(matches!(
            &err,
            SupabaseError::Api { message, code: None, .. } if message == "bad things"
        ));
        assert!(!err.is_missing_function());
    }

    #[test]
    fn test_missing_relation_detected_by_message() {
        let err = SupabaseError::Api {
            status: 400,
            code: Some("42P01".into()),
            message: "relation \"public.customers\" does not exist".into(),
        };
        assert!(err.is_missing_function());
        assert!(!SupabaseError::NotConfigured.is_missing_function());
    }

    #[test]
    fn test_rest_url_trims_trailing_slash() {
        let client = SupabaseClient::new("https://demo.supabase.co/", "key", 10).unwrap();
        assert_eq!(
            client.rest_url("transactions"),
            "https://demo.supabase.co/rest/v1/transactions"
        );
    }
}
