use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Тип транзакции кассы
///
/// - `TYPE_1`: обычная покупка (машины + сумма > 0)
/// - `TYPE_2`: покупка с баланса кошелька
/// - `TYPE_3`: пополнение кошелька (recarga)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    #[serde(rename = "TYPE_1")]
    Purchase,
    #[serde(rename = "TYPE_2")]
    WalletPurchase,
    #[serde(rename = "TYPE_3")]
    WalletRecharge,
    #[serde(rename = "UNKNOWN")]
    Unknown,
}

impl TransactionType {
    pub fn code(&self) -> &'static str {
        match self {
            TransactionType::Purchase => "TYPE_1",
            TransactionType::WalletPurchase => "TYPE_2",
            TransactionType::WalletRecharge => "TYPE_3",
            TransactionType::Unknown => "UNKNOWN",
        }
    }

    pub fn from_code(code: &str) -> Self {
        match code.trim().to_uppercase().as_str() {
            "TYPE_1" => TransactionType::Purchase,
            "TYPE_2" => TransactionType::WalletPurchase,
            "TYPE_3" => TransactionType::WalletRecharge,
            _ => TransactionType::Unknown,
        }
    }
}

impl Default for TransactionType {
    fn default() -> Self {
        TransactionType::Unknown
    }
}

/// Транзакция продаж прачечной.
///
/// Имена полей в JSON совпадают с колонками таблицы `transactions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(rename = "data_hora")]
    pub date: NaiveDateTime,
    #[serde(rename = "doc_cliente")]
    pub customer_doc: String,
    #[serde(rename = "nome_cliente", default)]
    pub customer_name: Option<String>,
    #[serde(rename = "telefone", default)]
    pub phone: Option<String>,
    /// Валовая сумма продажи
    #[serde(rename = "valor_venda", default)]
    pub gross_value: f64,
    /// Фактически оплачено
    #[serde(rename = "valor_pago", default)]
    pub paid_value: f64,
    /// Чистая выручка (кэшбэк не вычитается, это обязательство)
    #[serde(default)]
    pub net_value: f64,
    #[serde(default)]
    pub cashback_amount: f64,
    #[serde(default)]
    pub transaction_type: TransactionType,
    #[serde(rename = "is_recarga", default)]
    pub is_recharge: bool,
    #[serde(default)]
    pub wash_count: u32,
    #[serde(default)]
    pub dry_count: u32,
    #[serde(default)]
    pub total_services: u32,
    #[serde(rename = "usou_cupom", default)]
    pub used_coupon: bool,
    #[serde(rename = "codigo_cupom", default)]
    pub coupon_code: Option<String>,
    #[serde(rename = "meio_de_pagamento", default)]
    pub payment_method: Option<String>,
    #[serde(rename = "bandeira_cartao", default)]
    pub card_brand: Option<String>,
    #[serde(rename = "comprovante_cartao", default)]
    pub card_receipt: Option<String>,
    #[serde(rename = "loja", default)]
    pub store: Option<String>,
    #[serde(rename = "maquinas", default)]
    pub machines: Option<String>,
    #[serde(default)]
    pub import_hash: Option<String>,
    #[serde(default)]
    pub source_file: Option<String>,
}

impl Transaction {
    pub fn day(&self) -> NaiveDate {
        self.date.date()
    }

    pub fn services(&self) -> u32 {
        if self.total_services > 0 {
            self.total_services
        } else {
            self.wash_count + self.dry_count
        }
    }

    /// Код купона в нормализованном виде (trim + upper), `None` для пустых и "N/D"
    pub fn normalized_coupon(&self) -> Option<String> {
        self.coupon_code
            .as_deref()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty() && c != "N/D")
    }
}
