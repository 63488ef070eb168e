pub mod a001_transaction;
pub mod a002_customer;
pub mod a003_campaign;
pub mod a004_blacklist;

/// Сырая строка из внешнего хранилища (JSON-объект, как его вернул REST API)
pub type RawRow = serde_json::Map<String, serde_json::Value>;
