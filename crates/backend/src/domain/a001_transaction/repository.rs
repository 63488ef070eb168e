use chrono::NaiveDate;
use contracts::domain::a001_transaction::aggregate::Transaction;

use super::service::parse_transactions;
use crate::shared::supabase::{self, Query};

const TABLE: &str = "transactions";

/// Транзакции за период `[from, to)` по дате продажи
pub async fn list_between(from: NaiveDate, to: NaiveDate) -> anyhow::Result<Vec<Transaction>> {
    let query = Query::new()
        .select("*")
        .gte("data_hora", from.format("%Y-%m-%d"))
        .lt("data_hora", to.format("%Y-%m-%d"))
        .order("data_hora", true);
    let rows = supabase::client()?.select_all(TABLE, &query).await?;
    Ok(parse_transactions(&rows))
}

/// Upsert пачки по `import_hash`
pub async fn upsert_batch(batch: &[Transaction]) -> anyhow::Result<()> {
    if batch.is_empty() {
        return Ok(());
    }
    supabase::client()?
        .upsert(TABLE, batch, "import_hash")
        .await?;
    Ok(())
}
