use chrono::{Datelike, Timelike};
use contracts::dashboards::d400_business_intelligence::dto::OperationsSummary;
use contracts::domain::a001_transaction::aggregate::{Transaction, TransactionType};

use super::round2;

/// Индекс максимума; при равенстве берётся меньший индекс
fn busiest(counts: &[u32]) -> Option<u32> {
    counts
        .iter()
        .enumerate()
        .filter(|(_, c)| **c > 0)
        .fold(None, |best: Option<(usize, u32)>, (i, c)| match best {
            Some((_, bc)) if bc >= *c => best,
            _ => Some((i, *c)),
        })
        .map(|(i, _)| i as u32)
}

pub fn calculate_operations_summary(txs: &[Transaction]) -> OperationsSummary {
    let mut by_weekday = [0u32; 7];
    let mut by_hour = [0u32; 24];
    let mut summary = OperationsSummary {
        transactions: 0,
        revenue: 0.0,
        wash_count: 0,
        dry_count: 0,
        total_services: 0,
        recharge_count: 0,
        wallet_purchase_count: 0,
        coupon_count: 0,
        avg_ticket: 0.0,
        busiest_weekday: None,
        busiest_hour: None,
    };

    for tx in txs {
        summary.transactions += 1;
        summary.revenue += tx.net_value;
        summary.wash_count += tx.wash_count;
        summary.dry_count += tx.dry_count;
        summary.total_services += tx.services();
        if tx.is_recharge || tx.transaction_type == TransactionType::WalletRecharge {
            summary.recharge_count += 1;
        }
        if tx.transaction_type == TransactionType::WalletPurchase {
            summary.wallet_purchase_count += 1;
        }
        if tx.normalized_coupon().is_some() {
            summary.coupon_count += 1;
        }
        by_weekday[tx.date.weekday().num_days_from_monday() as usize] += 1;
        by_hour[tx.date.hour() as usize] += 1;
    }

    if summary.transactions > 0 {
        summary.avg_ticket = round2(summary.revenue / summary.transactions as f64);
    }
    summary.revenue = round2(summary.revenue);
    summary.busiest_weekday = busiest(&by_weekday);
    summary.busiest_hour = busiest(&by_hour);
    summary
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sale;
    use super::*;

    #[test]
    fn test_operations_summary() {
        // 2024-06-03 понедельник, 2024-06-08 суббота
        let mut recharge = sale(2024, 6, 8, 50.0);
        recharge.transaction_type = TransactionType::WalletRecharge;
        recharge.is_recharge = true;
        recharge.wash_count = 0;
        recharge.total_services = 0;

        let mut wallet = sale(2024, 6, 8, 0.0);
        wallet.transaction_type = TransactionType::WalletPurchase;
        wallet.dry_count = 1;
        wallet.total_services = 2;
        wallet.coupon_code = Some("volta10".into());

        let mut morning = sale(2024, 6, 3, 30.0);
        morning.date = morning.date.with_hour(9).unwrap();

        let txs = vec![sale(2024, 6, 8, 20.0), recharge, wallet, morning];
        let s = calculate_operations_summary(&txs);

        assert_eq!(s.transactions, 4);
        assert_eq!(s.revenue, 100.0);
        assert_eq!(s.wash_count, 3);
        assert_eq!(s.dry_count, 1);
        assert_eq!(s.total_services, 4);
        assert_eq!(s.recharge_count, 1);
        assert_eq!(s.wallet_purchase_count, 1);
        assert_eq!(s.coupon_count, 1);
        assert_eq!(s.avg_ticket, 25.0);
        assert_eq!(s.busiest_weekday, Some(5));
        assert_eq!(s.busiest_hour, Some(12));
    }

    #[test]
    fn test_empty_summary() {
        let s = calculate_operations_summary(&[]);
        assert_eq!(s.transactions, 0);
        assert_eq!(s.avg_ticket, 0.0);
        assert_eq!(s.busiest_weekday, None);
        assert_eq!(s.busiest_hour, None);
    }

    #[test]
    fn test_busiest_tie_takes_first() {
        assert_eq!(busiest(&[0, 2, 2, 1]), Some(1));
        assert_eq!(busiest(&[0, 0]), None);
    }
}
