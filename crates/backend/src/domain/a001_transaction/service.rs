use chrono::NaiveDate;
use contracts::domain::a001_transaction::aggregate::{Transaction, TransactionType};
use contracts::domain::RawRow;
use contracts::shared::settings::AppSettings;
use sha2::{Digest, Sha256};
use std::collections::HashSet;

use crate::shared::csv_rows::CsvRow;
use crate::shared::parsing::{
    normalize_cpf, parse_br_number, parse_datetime, value_bool, value_f64, value_string,
    value_u32,
};

// ---------------------------------------------------------------------------
// Правила классификации
// ---------------------------------------------------------------------------

/// Количество стирок и сушек в строке машин ("Lavadora 01, Secadora 02")
pub fn count_machines(machines: &str) -> (u32, u32) {
    let lower = machines.to_lowercase();
    lower.split(',').fold((0, 0), |(wash, dry), m| {
        if m.contains("lavadora") {
            (wash + 1, dry)
        } else if m.contains("secadora") {
            (wash, dry + 1)
        } else {
            (wash, dry)
        }
    })
}

/// Тип транзакции по строке машин, способу оплаты и сумме
pub fn classify(machines: &str, payment_method: &str, gross_value: f64) -> TransactionType {
    let machines = machines.trim().to_lowercase();
    let payment_method = payment_method.to_lowercase();

    if machines.contains("recarga") {
        return TransactionType::WalletRecharge;
    }
    if payment_method.contains("saldo da carteira") {
        return TransactionType::WalletPurchase;
    }
    if !machines.is_empty() && gross_value == 0.0 {
        return TransactionType::WalletPurchase;
    }
    if !machines.is_empty() && gross_value > 0.0 {
        return TransactionType::Purchase;
    }
    TransactionType::Unknown
}

/// Кэшбэк начисляется на продажи с суммой > 0 начиная с даты запуска программы
pub fn cashback_for(gross_value: f64, day: NaiveDate, settings: &AppSettings) -> f64 {
    if gross_value > 0.0 && day >= settings.cashback_start_date {
        round2(gross_value * settings.cashback_rate())
    } else {
        0.0
    }
}

/// Код купона: upper-case, "n/d" и пустые значения отбрасываются
pub fn normalize_coupon(raw: &str) -> Option<String> {
    let code = raw.trim();
    if code.is_empty() || code.eq_ignore_ascii_case("n/d") {
        None
    } else {
        Some(code.to_uppercase())
    }
}

/// Хеш дедупликации: первые 32 hex-символа SHA-256 от `data_hora|doc|valor|maquinas`
pub fn import_hash(data_hora: &str, doc: &str, gross_value: &str, machines: &str) -> String {
    let content = format!("{}|{}|{}|{}", data_hora, doc, gross_value, machines);
    let digest = Sha256::digest(content.as_bytes());
    let hex = format!("{:x}", digest);
    hex[..32].to_string()
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Строки hosted-базы -> Transaction
// ---------------------------------------------------------------------------

/// Транзакция из строки REST API; `None`, если дата не разбирается
pub fn from_raw_row(row: &RawRow) -> Option<Transaction> {
    let date = value_string(row.get("data_hora")).and_then(|s| parse_datetime(&s))?;

    let gross_value = value_f64(row.get("valor_venda"));
    let paid_value = value_f64(row.get("valor_pago"));
    let machines = value_string(row.get("maquinas"));
    let payment_method = value_string(row.get("meio_de_pagamento"));

    let net_value = match row.get("net_value") {
        Some(v) if !v.is_null() => value_f64(Some(v)),
        _ => paid_value,
    };

    let transaction_type = match value_string(row.get("transaction_type")) {
        Some(code) => TransactionType::from_code(&code),
        None => classify(
            machines.as_deref().unwrap_or(""),
            payment_method.as_deref().unwrap_or(""),
            gross_value,
        ),
    };

    let (mut wash_count, mut dry_count) = (
        value_u32(row.get("wash_count")),
        value_u32(row.get("dry_count")),
    );
    if wash_count == 0 && dry_count == 0 {
        (wash_count, dry_count) = count_machines(machines.as_deref().unwrap_or(""));
    }
    let total_services = match value_u32(row.get("total_services")) {
        0 => wash_count + dry_count,
        n => n,
    };

    let coupon_code = value_string(row.get("codigo_cupom")).and_then(|c| normalize_coupon(&c));

    Some(Transaction {
        date,
        customer_doc: value_string(row.get("doc_cliente"))
            .map(|d| normalize_cpf(&d))
            .unwrap_or_default(),
        customer_name: value_string(row.get("nome_cliente")),
        phone: value_string(row.get("telefone")),
        gross_value,
        paid_value,
        net_value,
        cashback_amount: value_f64(row.get("cashback_amount")),
        transaction_type,
        is_recharge: value_bool(row.get("is_recarga"))
            || transaction_type == TransactionType::WalletRecharge,
        wash_count,
        dry_count,
        total_services,
        used_coupon: value_bool(row.get("usou_cupom")) || coupon_code.is_some(),
        coupon_code,
        payment_method,
        card_brand: value_string(row.get("bandeira_cartao")),
        card_receipt: value_string(row.get("comprovante_cartao")),
        store: value_string(row.get("loja")),
        machines,
        import_hash: value_string(row.get("import_hash")),
        source_file: value_string(row.get("source_file")),
    })
}

/// Строки с неразборчивой датой пропускаются
pub fn parse_transactions(rows: &[RawRow]) -> Vec<Transaction> {
    let parsed: Vec<Transaction> = rows.iter().filter_map(from_raw_row).collect();
    if parsed.len() < rows.len() {
        tracing::debug!(
            "Skipped {} transaction rows with invalid date",
            rows.len() - parsed.len()
        );
    }
    parsed
}

// ---------------------------------------------------------------------------
// Строки выгрузки POS (CSV) -> Transaction
// ---------------------------------------------------------------------------

/// Результат разбора файла продаж
#[derive(Debug, Default)]
pub struct SalesBatch {
    pub transactions: Vec<Transaction>,
    /// Строки без даты или документа клиента
    pub skipped: usize,
    /// Повторы внутри файла (одинаковый хеш)
    pub duplicates: usize,
}

/// Транзакция из строки CSV; `None`, если нет даты или CPF
pub fn from_csv_row(row: &CsvRow, settings: &AppSettings, source: &str) -> Option<Transaction> {
    let date = parse_datetime(row.get_or_empty("Data_Hora"))?;
    let customer_doc = normalize_cpf(row.get_or_empty("Doc_Cliente"));
    if customer_doc.is_empty() {
        return None;
    }

    let gross_value = parse_br_number(row.get_or_empty("Valor_Venda"));
    let paid_value = parse_br_number(row.get_or_empty("Valor_Pago"));
    let machines = row.get_or_empty("Maquinas");
    let payment_method = row.get_or_empty("Meio_de_Pagamento");
    let (wash_count, dry_count) = count_machines(machines);
    let coupon_code = normalize_coupon(row.get_or_empty("Codigo_Cupom"));

    Some(Transaction {
        date,
        customer_doc,
        customer_name: row.get("Nome_Cliente").map(str::to_string),
        phone: row.get("Telefone").map(str::to_string),
        gross_value,
        paid_value,
        // кэшбэк не уменьшает выручку
        net_value: paid_value,
        cashback_amount: cashback_for(gross_value, date.date(), settings),
        transaction_type: classify(machines, payment_method, gross_value),
        is_recharge: machines.to_lowercase().contains("recarga"),
        wash_count,
        dry_count,
        total_services: wash_count + dry_count,
        used_coupon: row.get_or_empty("Usou_Cupom").eq_ignore_ascii_case("sim"),
        coupon_code,
        payment_method: row.get("Meio_de_Pagamento").map(str::to_string),
        card_brand: row.get("Bandeira_Cartao").map(str::to_string),
        card_receipt: row.get("Comprovante_cartao").map(str::to_string),
        store: row.get("Loja").map(str::to_string),
        machines: (!machines.is_empty()).then(|| machines.to_string()),
        import_hash: Some(import_hash(
            row.raw("Data_Hora"),
            row.raw("Doc_Cliente"),
            row.raw("Valor_Venda"),
            row.raw("Maquinas"),
        )),
        source_file: Some(source.to_string()),
    })
}

pub fn build_transactions(rows: &[CsvRow], settings: &AppSettings, source: &str) -> SalesBatch {
    let mut batch = SalesBatch::default();
    let mut seen: HashSet<String> = HashSet::new();

    for row in rows {
        let Some(tx) = from_csv_row(row, settings, source) else {
            batch.skipped += 1;
            continue;
        };
        let hash = tx.import_hash.clone().unwrap_or_default();
        if !seen.insert(hash) {
            batch.duplicates += 1;
            continue;
        }
        batch.transactions.push(tx);
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> AppSettings {
        AppSettings {
            cashback_percent: 7.5,
            cashback_start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            fixed_costs_monthly: 0.0,
            maintenance_costs_monthly: 0.0,
            variable_cost_per_service: 0.0,
        }
    }

    fn sale(date: &str, doc: &str, value: &str, machines: &str) -> CsvRow {
        CsvRow::from_pairs(&[
            ("Data_Hora", date),
            ("Doc_Cliente", doc),
            ("Valor_Venda", value),
            ("Valor_Pago", value),
            ("Maquinas", machines),
            ("Meio_de_Pagamento", "Cartão de Crédito"),
            ("Usou_Cupom", "Sim"),
            ("Codigo_Cupom", " volta10 "),
        ])
    }

    #[test]
    fn test_count_machines() {
        assert_eq!(count_machines("Lavadora 01, Secadora 03, Lavadora 02"), (2, 1));
        assert_eq!(count_machines(""), (0, 0));
        assert_eq!(count_machines("Recarga"), (0, 0));
    }

    #[test]
    fn test_classify() {
        assert_eq!(classify("Recarga", "Pix", 50.0), TransactionType::WalletRecharge);
        assert_eq!(
            classify("Lavadora 01", "Saldo da Carteira", 18.0),
            TransactionType::WalletPurchase
        );
        assert_eq!(classify("Lavadora 01", "Pix", 0.0), TransactionType::WalletPurchase);
        assert_eq!(classify("Lavadora 01", "Pix", 18.0), TransactionType::Purchase);
        assert_eq!(classify("", "Pix", 18.0), TransactionType::Unknown);
    }

    #[test]
    fn test_cashback_only_after_start_date() {
        let s = settings();
        let before = NaiveDate::from_ymd_opt(2024, 5, 31).unwrap();
        let after = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(cashback_for(20.0, before, &s), 0.0);
        assert_eq!(cashback_for(20.0, after, &s), 1.5);
        assert_eq!(cashback_for(0.0, after, &s), 0.0);
    }

    #[test]
    fn test_import_hash_is_stable_32_hex() {
        let a = import_hash("01/06/2024 10:00", "123", "18,00", "Lavadora 01");
        let b = import_hash("01/06/2024 10:00", "123", "18,00", "Lavadora 01");
        let c = import_hash("01/06/2024 10:00", "123", "18,00", "Lavadora 02");
        assert_eq!(a.len(), 32);
        assert!(a.chars().all(|ch| ch.is_ascii_hexdigit()));
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_build_transactions_drops_invalid_and_duplicates() {
        let rows = vec![
            sale("02/06/2024 10:00", "123.456.789-01", "20,00", "Lavadora 01, Secadora 02"),
            sale("02/06/2024 10:00", "123.456.789-01", "20,00", "Lavadora 01, Secadora 02"),
            sale("bad date", "12345678901", "20,00", "Lavadora 01"),
            sale("02/06/2024 11:00", "", "20,00", "Lavadora 01"),
        ];
        let batch = build_transactions(&rows, &settings(), "test.csv");

        assert_eq!(batch.transactions.len(), 1);
        assert_eq!(batch.duplicates, 1);
        assert_eq!(batch.skipped, 2);

        let tx = &batch.transactions[0];
        assert_eq!(tx.customer_doc, "12345678901");
        assert_eq!(tx.transaction_type, TransactionType::Purchase);
        assert_eq!((tx.wash_count, tx.dry_count, tx.total_services), (1, 1, 2));
        assert_eq!(tx.cashback_amount, 1.5);
        assert_eq!(tx.net_value, 20.0);
        assert_eq!(tx.coupon_code.as_deref(), Some("VOLTA10"));
        assert!(tx.used_coupon);
        assert_eq!(tx.source_file.as_deref(), Some("test.csv"));
    }

    #[test]
    fn test_parse_transactions_from_rest_rows() {
        let rows: Vec<RawRow> = vec![
            json!({
                "data_hora": "2024-06-02T10:00:00+00:00",
                "doc_cliente": "12345678901",
                "valor_venda": 20.0,
                "valor_pago": "20.00",
                "net_value": null,
                "maquinas": "Lavadora 01, Lavadora 02",
                "codigo_cupom": "n/d"
            }),
            json!({ "data_hora": "not a date", "valor_venda": 10 }),
            json!({
                "data_hora": "2024-06-03 09:00:00",
                "valor_venda": "abc",
                "transaction_type": "TYPE_3",
                "total_services": 0
            }),
        ]
        .into_iter()
        .map(|v| v.as_object().unwrap().clone())
        .collect();

        let txs = parse_transactions(&rows);
        assert_eq!(txs.len(), 2);
        assert_eq!(txs[0].net_value, 20.0);
        assert_eq!(txs[0].wash_count, 2);
        assert_eq!(txs[0].transaction_type, TransactionType::Purchase);
        assert_eq!(txs[0].coupon_code, None);
        assert_eq!(txs[1].gross_value, 0.0);
        assert!(txs[1].is_recharge);
    }
}
