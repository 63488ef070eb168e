use contracts::domain::a002_customer::aggregate::CustomerProfile;
use contracts::usecases::u501_upload_sales::response::{UploadFileType, UploadResult};
use std::collections::HashMap;
use std::time::Instant;

use crate::domain::a002_customer::repository as customers;
use crate::shared::config::get_config;
use crate::shared::csv_rows::{read_csv, CsvRow};
use crate::shared::logger;
use crate::shared::parsing::{normalize_cpf, parse_br_number, parse_date, parse_datetime};
use crate::shared::supabase;
use crate::usecases::upload_history::log_upload_history;

/// Клиенты из CSV, без повторов по CPF
#[derive(Debug, Default)]
pub struct CustomerBatch {
    pub customers: Vec<CustomerProfile>,
    /// Строки без CPF
    pub skipped: usize,
    pub total: usize,
}

pub fn profile_from_row(row: &CsvRow, source: &str) -> Option<CustomerProfile> {
    let doc = normalize_cpf(row.get_or_empty("Documento"));
    if doc.is_empty() {
        return None;
    }
    let registered = row.get_or_empty("Data_Cadastro");
    Some(CustomerProfile {
        doc,
        nome: row.get("Nome").map(str::to_string),
        telefone: row.get("Telefone").map(str::to_string),
        email: row.get("Email").map(str::to_string),
        data_cadastro: parse_datetime(registered),
        saldo_carteira: parse_br_number(row.get_or_empty("Saldo_Carteira")),
        first_visit: parse_date(registered),
        last_visit: parse_date(row.get_or_empty("Data_Ultima_Compra")),
        transaction_count: row
            .get_or_empty("Quantidade_Compras")
            .parse()
            .unwrap_or(0),
        total_spent: parse_br_number(row.get_or_empty("Total_Compras")),
        source: Some(source.to_string()),
    })
}

/// Последняя строка с тем же CPF побеждает, порядок первого появления сохраняется
pub fn build_customers(rows: &[CsvRow], source: &str) -> CustomerBatch {
    let mut batch = CustomerBatch {
        total: rows.len(),
        ..Default::default()
    };
    let mut index: HashMap<String, usize> = HashMap::new();

    for row in rows {
        let Some(profile) = profile_from_row(row, source) else {
            batch.skipped += 1;
            continue;
        };
        match index.get(&profile.doc) {
            Some(&i) => batch.customers[i] = profile,
            None => {
                index.insert(profile.doc.clone(), batch.customers.len());
                batch.customers.push(profile);
            }
        }
    }
    batch
}

/// Загрузить CSV клиентов: умный upsert через RPC, при его отсутствии обычный upsert по `doc`
pub async fn upload_customers(text: &str, file_name: &str, source: &str) -> UploadResult {
    let started = Instant::now();
    let mut result = UploadResult::default();

    if supabase::client().is_err() {
        result.errors.push("Supabase not configured".to_string());
        return result;
    }

    let config = get_config();
    match read_csv(text, config.upload.delimiter) {
        Ok(csv) => {
            let batch = build_customers(&csv.rows, source);
            result.total = (batch.total + csv.malformed) as u32;
            result.skipped = (batch.skipped + csv.malformed) as u32;

            let mut use_smart_upsert = true;
            let size = config.upload.batch_size.max(1);

            for (i, chunk) in batch.customers.chunks(size).enumerate() {
                if use_smart_upsert {
                    match customers::smart_upsert_batch(chunk).await {
                        Ok(response) => {
                            result.inserted += response.inserted;
                            result.updated += response.updated;
                            continue;
                        }
                        Err(e) if e.is_missing_function() => {
                            tracing::info!(
                                "[CustomerUpload] Smart upsert not available, using simple upsert"
                            );
                            use_smart_upsert = false;
                        }
                        Err(e) => {
                            result.errors.push(format!("Batch {}: {}", i, e));
                            continue;
                        }
                    }
                }

                match customers::upsert_batch(chunk).await {
                    Ok(()) => result.inserted += chunk.len() as u32,
                    Err(e) => result.errors.push(format!("Batch {}: {}", i, e)),
                }
            }
        }
        Err(e) => result.errors.push(format!("Upload failed: {}", e)),
    }

    result.success = result.errors.is_empty();
    result.duration_ms = started.elapsed().as_millis() as u64;

    log_upload_history(UploadFileType::Customer, file_name, &result, source).await;

    if result.inserted + result.updated > 0 {
        let refresh = customers::refresh_metrics().await;
        if refresh.success {
            tracing::info!("u502: refreshed metrics for {} customers", refresh.updated);
        } else {
            tracing::warn!("u502: metrics refresh failed: {:?}", refresh.error);
        }
    }

    logger::log(
        "upload",
        &format!(
            "Clientes {}: {} inseridos, {} atualizados, {} ignorados",
            file_name, result.inserted, result.updated, result.skipped
        ),
    );
    result
}
