use axum::{extract::Query, http::StatusCode, Json};
use contracts::usecases::u501_upload_sales::response::{UploadFileType, UploadResult};
use serde::Deserialize;

use crate::usecases::upload_history::detect_file_type;
use crate::usecases::{u501_upload_sales, u502_upload_customers};

#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub file_name: Option<String>,
    pub source: Option<String>,
}

impl UploadQuery {
    fn file_name(&self) -> &str {
        self.file_name.as_deref().unwrap_or("upload.csv")
    }

    fn source(&self) -> &str {
        self.source.as_deref().unwrap_or("api_upload")
    }
}

/// POST /api/upload/sales?file_name=vendas.csv (тело: CSV)
pub async fn upload_sales(Query(query): Query<UploadQuery>, body: String) -> Json<UploadResult> {
    tracing::info!("Upload: sales file {} ({} bytes)", query.file_name(), body.len());
    Json(u501_upload_sales::upload_sales(&body, query.file_name(), query.source()).await)
}

/// POST /api/upload/customers?file_name=clientes.csv (тело: CSV)
pub async fn upload_customers(
    Query(query): Query<UploadQuery>,
    body: String,
) -> Json<UploadResult> {
    tracing::info!(
        "Upload: customers file {} ({} bytes)",
        query.file_name(),
        body.len()
    );
    Json(u502_upload_customers::upload_customers(&body, query.file_name(), query.source()).await)
}

/// POST /api/upload (тип файла определяется по заголовку)
pub async fn upload_auto(
    Query(query): Query<UploadQuery>,
    body: String,
) -> Result<Json<UploadResult>, StatusCode> {
    match detect_file_type(&body) {
        UploadFileType::Sales => Ok(upload_sales(Query(query), body).await),
        UploadFileType::Customer => Ok(upload_customers(Query(query), body).await),
        UploadFileType::Unknown => {
            tracing::warn!("Upload: unknown file type for {}", query.file_name());
            Err(StatusCode::UNPROCESSABLE_ENTITY)
        }
    }
}
