use contracts::shared::settings::AppSettings;
use contracts::usecases::u501_upload_sales::response::{UploadFileType, UploadResult};
use std::time::Instant;

use crate::domain::a001_transaction::repository as transactions;
use crate::domain::a001_transaction::service::{build_transactions, SalesBatch};
use crate::shared::config::get_config;
use crate::shared::csv_rows::read_csv;
use crate::shared::logger;
use crate::shared::supabase::{self, settings::get_app_settings};
use crate::usecases::upload_history::log_upload_history;

/// Файл продаж, разобранный и готовый к загрузке
#[derive(Debug)]
pub struct PreparedSales {
    pub batch: SalesBatch,
    /// Строк данных в файле, включая битые
    pub total: u32,
    pub malformed: u32,
}

impl PreparedSales {
    /// Пропущенные строки: без даты/CPF, битые и повторы внутри файла
    pub fn skipped(&self) -> u32 {
        (self.batch.skipped + self.batch.duplicates) as u32 + self.malformed
    }
}

pub fn prepare_sales(
    text: &str,
    delimiter: char,
    settings: &AppSettings,
    source: &str,
) -> anyhow::Result<PreparedSales> {
    let csv = read_csv(text, delimiter)?;
    let batch = build_transactions(&csv.rows, settings, source);
    Ok(PreparedSales {
        total: (csv.rows.len() + csv.malformed) as u32,
        malformed: csv.malformed as u32,
        batch,
    })
}

/// Загрузить CSV продаж в таблицу `transactions` (upsert по `import_hash`)
pub async fn upload_sales(text: &str, file_name: &str, source: &str) -> UploadResult {
    let started = Instant::now();
    let mut result = UploadResult::default();

    if supabase::client().is_err() {
        result.errors.push("Supabase not configured".to_string());
        return result;
    }

    let config = get_config();
    let settings = get_app_settings().await;

    match prepare_sales(text, config.upload.delimiter, &settings, source) {
        Ok(prepared) => {
            result.total = prepared.total;
            result.skipped = prepared.skipped();
            tracing::info!(
                "u501: {} rows, {} transactions to upload, {} skipped",
                prepared.total,
                prepared.batch.transactions.len(),
                result.skipped
            );

            let size = config.upload.batch_size.max(1);
            for (i, chunk) in prepared.batch.transactions.chunks(size).enumerate() {
                match transactions::upsert_batch(chunk).await {
                    Ok(()) => result.inserted += chunk.len() as u32,
                    Err(e) => {
                        tracing::error!("u501: batch {} failed: {:#}", i, e);
                        result.errors.push(format!("Batch {}: {}", i, e));
                    }
                }
            }
        }
        Err(e) => result.errors.push(format!("Upload failed: {}", e)),
    }

    result.success = result.errors.is_empty();
    result.duration_ms = started.elapsed().as_millis() as u64;

    log_upload_history(UploadFileType::Sales, file_name, &result, source).await;
    logger::log(
        "upload",
        &format!(
            "Vendas {}: {} inseridas, {} ignoradas, {} erros",
            file_name,
            result.inserted,
            result.skipped,
            result.errors.len()
        ),
    );
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn settings() -> AppSettings {
        AppSettings {
            cashback_percent: 7.5,
            cashback_start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            fixed_costs_monthly: 0.0,
            maintenance_costs_monthly: 0.0,
            variable_cost_per_service: 0.0,
        }
    }

    const SALES_CSV: &str = "\u{feff}Data_Hora;Valor_Venda;Valor_Pago;Meio_de_Pagamento;Loja;Nome_Cliente;Doc_Cliente;Telefone;Maquinas;Usou_Cupom;Codigo_Cupom
05/06/2024 10:15;20,00;20,00;Cartão de Crédito;Centro;Ana;123.456.789-01;11987654321;Lavadora 1, Secadora 2;Não;N/D
05/06/2024 10:15;20,00;20,00;Cartão de Crédito;Centro;Ana;123.456.789-01;11987654321;Lavadora 1, Secadora 2;Não;N/D
;10,00;10,00;Pix;Centro;Bruno;98765432100;;Lavadora 3;Não;
06/06/2024 18:00;1.250,50;1.250,50;Pix;Centro;Carla;;;Lavadora 4;Sim;volta10
";

    #[test]
    fn test_prepare_sales_counts() {
        let prepared = prepare_sales(SALES_CSV, ';', &settings(), "test").unwrap();
        assert_eq!(prepared.total, 4);
        assert_eq!(prepared.batch.transactions.len(), 1);
        assert_eq!(prepared.batch.duplicates, 1);
        assert_eq!(prepared.batch.skipped, 2);
        assert_eq!(prepared.skipped(), 3);

        let tx = &prepared.batch.transactions[0];
        assert_eq!(tx.customer_doc, "12345678901");
        assert_eq!(tx.wash_count, 1);
        assert_eq!(tx.dry_count, 1);
        assert_eq!(tx.cashback_amount, 1.5);
        assert_eq!(tx.net_value, 20.0);
    }

    #[test]
    fn test_prepare_empty_file() {
        let prepared = prepare_sales("", ';', &settings(), "test").unwrap();
        assert_eq!(prepared.total, 0);
        assert!(prepared.batch.transactions.is_empty());
    }
}
