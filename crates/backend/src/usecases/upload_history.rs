//! Журнал загрузок CSV (`upload_history`) и общие шаги загрузчиков.

use contracts::usecases::u501_upload_sales::response::{UploadFileType, UploadResult};
use serde::Serialize;

use crate::shared::csv_rows::clean_text;
use crate::shared::supabase;

const TABLE: &str = "upload_history";
const MAX_LOGGED_ERRORS: usize = 10;

/// Строка `upload_history`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UploadHistoryRecord {
    pub file_type: String,
    pub file_name: String,
    pub records_total: u32,
    pub records_inserted: u32,
    pub records_updated: u32,
    pub records_skipped: u32,
    pub errors: Vec<String>,
    pub source: String,
    pub duration_ms: u64,
    pub status: String,
}

impl UploadHistoryRecord {
    pub fn new(file_type: UploadFileType, file_name: &str, result: &UploadResult, source: &str) -> Self {
        Self {
            file_type: file_type.as_str().to_string(),
            file_name: file_name.to_string(),
            records_total: result.total,
            records_inserted: result.inserted,
            records_updated: result.updated,
            records_skipped: result.skipped,
            errors: result.errors.iter().take(MAX_LOGGED_ERRORS).cloned().collect(),
            source: source.to_string(),
            duration_ms: result.duration_ms,
            status: if result.errors.is_empty() {
                "success".to_string()
            } else {
                "partial".to_string()
            },
        }
    }
}

/// Записать загрузку в историю; ошибка записи не влияет на результат загрузки
pub async fn log_upload_history(
    file_type: UploadFileType,
    file_name: &str,
    result: &UploadResult,
    source: &str,
) -> bool {
    let record = UploadHistoryRecord::new(file_type, file_name, result, source);
    let client = match supabase::client() {
        Ok(c) => c,
        Err(_) => return false,
    };
    match client.insert(TABLE, std::slice::from_ref(&record)).await {
        Ok(()) => {
            tracing::info!(
                "[UploadHistory] Logged {} upload: {} inserted",
                record.file_type,
                record.records_inserted
            );
            true
        }
        Err(e) => {
            tracing::warn!("[UploadHistory] Failed to log: {}", e);
            false
        }
    }
}

/// Тип файла по строке заголовков
pub fn detect_file_type(text: &str) -> UploadFileType {
    let first_line = clean_text(text)
        .lines()
        .next()
        .unwrap_or("")
        .to_lowercase();

    if first_line.contains("data_hora") || first_line.contains("maquinas") {
        UploadFileType::Sales
    } else if first_line.contains("documento") || first_line.contains("saldo_carteira") {
        UploadFileType::Customer
    } else {
        UploadFileType::Unknown
    }
}
