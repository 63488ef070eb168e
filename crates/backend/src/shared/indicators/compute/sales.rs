use anyhow::Result;
use chrono::Duration;
use contracts::domain::a001_transaction::aggregate::Transaction;
use contracts::shared::indicators::*;
use std::collections::HashSet;

use super::{parse_day, pct_change, previous_period, status_by_change};
use crate::domain::a001_transaction::repository as transactions;
use crate::shared::indicators::metadata::ids;

// ---------------------------------------------------------------------------
// Internal aggregation
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Clone, PartialEq)]
struct SalesAgg {
    revenue: f64,
    services: u32,
    transactions: u32,
    cashback: f64,
    customers: u32,
}

impl SalesAgg {
    fn avg_ticket(&self) -> f64 {
        if self.transactions > 0 {
            self.revenue / self.transactions as f64
        } else {
            0.0
        }
    }
}

fn matches_store(tx: &Transaction, store: Option<&str>) -> bool {
    match store.map(str::trim).filter(|s| !s.is_empty()) {
        None => true,
        Some(wanted) => tx
            .store
            .as_deref()
            .map(|s| s.trim().eq_ignore_ascii_case(wanted))
            .unwrap_or(false),
    }
}

fn aggregate(txs: &[Transaction], store: Option<&str>) -> SalesAgg {
    let mut agg = SalesAgg::default();
    let mut docs: HashSet<&str> = HashSet::new();
    for tx in txs.iter().filter(|tx| matches_store(tx, store)) {
        agg.revenue += tx.net_value;
        agg.services += tx.services();
        agg.transactions += 1;
        agg.cashback += tx.cashback_amount;
        let doc = tx.customer_doc.trim();
        if !doc.is_empty() {
            docs.insert(doc);
        }
    }
    agg.customers = docs.len() as u32;
    agg
}

async fn fetch_agg(ctx: &IndicatorContext) -> Result<SalesAgg> {
    let from = parse_day(&ctx.date_from)?;
    let to = parse_day(&ctx.date_to)?;
    let txs = transactions::list_between(from, to + Duration::days(1)).await?;
    Ok(aggregate(&txs, ctx.store.as_deref()))
}

fn build_value(id: IndicatorId, cur: f64, prev: f64, higher_is_good: bool) -> IndicatorValue {
    let change = pct_change(cur, prev);
    IndicatorValue {
        id,
        value: Some(cur),
        previous_value: Some(prev),
        change_percent: change,
        status: status_by_change(change, higher_is_good),
        subtitle: None,
    }
}

async fn current_and_previous(ctx: &IndicatorContext) -> Result<(SalesAgg, SalesAgg)> {
    let cur = fetch_agg(ctx).await?;
    let prev = fetch_agg(&previous_period(ctx)).await?;
    Ok((cur, prev))
}

// ---------------------------------------------------------------------------
// Public compute functions
// ---------------------------------------------------------------------------

pub async fn compute_revenue(ctx: &IndicatorContext) -> Result<IndicatorValue> {
    let (cur, prev) = current_and_previous(ctx).await?;
    Ok(build_value(ids::revenue(), cur.revenue, prev.revenue, true))
}

pub async fn compute_services_count(ctx: &IndicatorContext) -> Result<IndicatorValue> {
    let (cur, prev) = current_and_previous(ctx).await?;
    Ok(build_value(
        ids::services_count(),
        cur.services as f64,
        prev.services as f64,
        true,
    ))
}

pub async fn compute_avg_ticket(ctx: &IndicatorContext) -> Result<IndicatorValue> {
    let (cur, prev) = current_and_previous(ctx).await?;
    Ok(build_value(
        ids::avg_ticket(),
        cur.avg_ticket(),
        prev.avg_ticket(),
        true,
    ))
}

/// Рост обязательств по кэшбэку считается плохим
pub async fn compute_cashback_liability(ctx: &IndicatorContext) -> Result<IndicatorValue> {
    let (cur, prev) = current_and_previous(ctx).await?;
    Ok(build_value(
        ids::cashback_liability(),
        cur.cashback,
        prev.cashback,
        false,
    ))
}

pub async fn compute_active_customers(ctx: &IndicatorContext) -> Result<IndicatorValue> {
    let (cur, prev) = current_and_previous(ctx).await?;
    Ok(build_value(
        ids::active_customers(),
        cur.customers as f64,
        prev.customers as f64,
        true,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dashboards::d400_business_intelligence::calculations::test_support::sale;

    #[test]
    fn test_aggregate_with_store_filter() {
        let mut a = sale(2024, 6, 1, 30.0);
        a.store = Some("Centro".into());
        a.cashback_amount = 2.25;
        a.wash_count = 1;
        a.dry_count = 1;
        a.total_services = 2;
        let mut b = sale(2024, 6, 2, 10.0);
        b.store = Some(" centro ".into());
        b.customer_doc = "98765432100".into();
        let mut c = sale(2024, 6, 3, 100.0);
        c.store = Some("Praia".into());

        let all = aggregate(&[a.clone(), b.clone(), c.clone()], None);
        assert_eq!(all.transactions, 3);
        assert_eq!(all.revenue, 140.0);
        assert_eq!(all.customers, 2);

        let centro = aggregate(&[a, b, c], Some("CENTRO"));
        assert_eq!(centro.transactions, 2);
        assert_eq!(centro.revenue, 40.0);
        assert_eq!(centro.services, 3);
        assert_eq!(centro.cashback, 2.25);
        assert_eq!(centro.avg_ticket(), 20.0);
    }

    #[test]
    fn test_empty_aggregate() {
        let agg = aggregate(&[], Some(""));
        assert_eq!(agg, SalesAgg::default());
        assert_eq!(agg.avg_ticket(), 0.0);
    }

    #[test]
    fn test_build_value_for_liability() {
        let v = build_value(ids::cashback_liability(), 120.0, 100.0, false);
        assert_eq!(v.change_percent, Some(20.0));
        assert_eq!(v.status, IndicatorStatus::Bad);
    }
}
