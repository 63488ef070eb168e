use serde::{Deserialize, Serialize};

/// Тип CSV-выгрузки POS, определяется по строке заголовков
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadFileType {
    Sales,
    Customer,
    Unknown,
}

impl UploadFileType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UploadFileType::Sales => "sales",
            UploadFileType::Customer => "customers",
            UploadFileType::Unknown => "unknown",
        }
    }
}

/// Итог загрузки CSV во внешнюю базу
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    pub success: bool,
    pub total: u32,
    pub inserted: u32,
    pub updated: u32,
    pub skipped: u32,
    pub errors: Vec<String>,
    pub duration_ms: u64,
}
