use chrono::NaiveDate;
use contracts::domain::a001_transaction::aggregate::Transaction;
use contracts::domain::a002_customer::aggregate::{
    CustomerMetrics, RiskSegment, SegmentCount, SegmentSummary,
};
use std::collections::{BTreeSet, HashMap};

use crate::shared::config::SegmentsConfig;

/// Сегмент по числу дней с последнего визита; без визитов -> Churning
pub fn risk_segment(days_since_last_visit: Option<i64>, thresholds: &SegmentsConfig) -> RiskSegment {
    match days_since_last_visit {
        Some(d) if d <= thresholds.healthy_max_days => RiskSegment::Healthy,
        Some(d) if d <= thresholds.monitor_max_days => RiskSegment::Monitor,
        Some(d) if d <= thresholds.at_risk_max_days => RiskSegment::AtRisk,
        _ => RiskSegment::Churning,
    }
}

#[derive(Default)]
struct Accumulator<'a> {
    name: Option<&'a str>,
    phone: Option<&'a str>,
    total_spent: f64,
    total_services: u32,
    cashback_earned: f64,
    days: BTreeSet<NaiveDate>,
}

/// Метрики по клиентам (по документу). Визит = календарный день с покупкой.
///
/// Транзакции без документа не учитываются. Результат отсортирован по сумме
/// покупок по убыванию.
pub fn compute_customer_metrics(
    txs: &[Transaction],
    as_of: NaiveDate,
    thresholds: &SegmentsConfig,
) -> Vec<CustomerMetrics> {
    let mut by_doc: HashMap<&str, Accumulator> = HashMap::new();

    for tx in txs.iter().filter(|t| !t.customer_doc.is_empty()) {
        let acc = by_doc.entry(tx.customer_doc.as_str()).or_default();
        acc.total_spent += tx.net_value;
        acc.total_services += tx.services();
        acc.cashback_earned += tx.cashback_amount;
        acc.days.insert(tx.day());
        if let Some(name) = tx.customer_name.as_deref() {
            acc.name = Some(name);
        }
        if let Some(phone) = tx.phone.as_deref() {
            acc.phone = Some(phone);
        }
    }

    let mut metrics: Vec<CustomerMetrics> = by_doc
        .into_iter()
        .map(|(doc, acc)| {
            let visit_count = acc.days.len() as u32;
            let first_visit = acc.days.iter().next().copied();
            let last_visit = acc.days.iter().next_back().copied();
            let days_since_last_visit = last_visit.map(|d| (as_of - d).num_days().max(0));
            CustomerMetrics {
                doc: doc.to_string(),
                name: acc.name.map(str::to_string),
                phone: acc.phone.map(str::to_string),
                total_spent: acc.total_spent,
                visit_count,
                avg_ticket: if visit_count > 0 {
                    acc.total_spent / visit_count as f64
                } else {
                    0.0
                },
                total_services: acc.total_services,
                cashback_earned: acc.cashback_earned,
                first_visit,
                last_visit,
                days_since_last_visit,
                risk_segment: risk_segment(days_since_last_visit, thresholds),
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.total_spent
            .total_cmp(&a.total_spent)
            .then_with(|| a.doc.cmp(&b.doc))
    });
    metrics
}

/// Распределение клиентов по сегментам (все сегменты присутствуют, даже пустые)
pub fn segment_summary(metrics: &[CustomerMetrics]) -> SegmentSummary {
    let total_customers = metrics.len() as u32;

    let segments: Vec<SegmentCount> = RiskSegment::ALL
        .iter()
        .map(|segment| {
            let members = metrics.iter().filter(|m| m.risk_segment == *segment);
            let (customers, revenue) =
                members.fold((0u32, 0.0f64), |(n, r), m| (n + 1, r + m.total_spent));
            SegmentCount {
                segment: *segment,
                customers,
                revenue,
                share_percent: if total_customers > 0 {
                    customers as f64 / total_customers as f64 * 100.0
                } else {
                    0.0
                },
            }
        })
        .collect();

    let retained = metrics.iter().filter(|m| m.risk_segment.is_retained()).count();

    SegmentSummary {
        total_customers,
        segments,
        retention_rate: if total_customers > 0 {
            retained as f64 / total_customers as f64
        } else {
            0.0
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::domain::a001_transaction::aggregate::TransactionType;

    fn tx(doc: &str, day: u32, hour: u32, value: f64) -> Transaction {
        Transaction {
            date: NaiveDate::from_ymd_opt(2024, 6, day)
                .unwrap()
                .and_hms_opt(hour, 0, 0)
                .unwrap(),
            customer_doc: doc.to_string(),
            customer_name: Some(format!("Cliente {}", doc)),
            phone: None,
            gross_value: value,
            paid_value: value,
            net_value: value,
            cashback_amount: 0.0,
            transaction_type: TransactionType::Purchase,
            is_recharge: false,
            wash_count: 1,
            dry_count: 1,
            total_services: 2,
            used_coupon: false,
            coupon_code: None,
            payment_method: None,
            card_brand: None,
            card_receipt: None,
            store: None,
            machines: None,
            import_hash: None,
            source_file: None,
        }
    }

    #[test]
    fn test_risk_segment_thresholds() {
        let t = SegmentsConfig::default();
        assert_eq!(risk_segment(Some(0), &t), RiskSegment::Healthy);
        assert_eq!(risk_segment(Some(30), &t), RiskSegment::Healthy);
        assert_eq!(risk_segment(Some(31), &t), RiskSegment::Monitor);
        assert_eq!(risk_segment(Some(60), &t), RiskSegment::Monitor);
        assert_eq!(risk_segment(Some(90), &t), RiskSegment::AtRisk);
        assert_eq!(risk_segment(Some(91), &t), RiskSegment::Churning);
        assert_eq!(risk_segment(None, &t), RiskSegment::Churning);
    }

    #[test]
    fn test_visits_are_distinct_days() {
        let txs = vec![
            tx("A", 1, 10, 20.0),
            tx("A", 1, 11, 10.0),
            tx("A", 10, 9, 30.0),
            tx("B", 2, 9, 15.0),
            tx("", 3, 9, 99.0),
        ];
        let as_of = NaiveDate::from_ymd_opt(2024, 6, 20).unwrap();
        let metrics = compute_customer_metrics(&txs, as_of, &SegmentsConfig::default());

        assert_eq!(metrics.len(), 2);
        let a = &metrics[0];
        assert_eq!(a.doc, "A");
        assert_eq!(a.visit_count, 2);
        assert_eq!(a.total_spent, 60.0);
        assert_eq!(a.avg_ticket, 30.0);
        assert_eq!(a.total_services, 6);
        assert_eq!(a.last_visit, NaiveDate::from_ymd_opt(2024, 6, 10));
        assert_eq!(a.days_since_last_visit, Some(10));
        assert_eq!(a.risk_segment, RiskSegment::Healthy);
    }

    #[test]
    fn test_segment_summary_includes_empty_segments() {
        let txs = vec![tx("A", 1, 10, 20.0), tx("B", 2, 10, 10.0)];
        let as_of = NaiveDate::from_ymd_opt(2024, 8, 15).unwrap();
        let metrics = compute_customer_metrics(&txs, as_of, &SegmentsConfig::default());
        let summary = segment_summary(&metrics);

        assert_eq!(summary.total_customers, 2);
        assert_eq!(summary.segments.len(), 4);
        let monitor = &summary.segments[1];
        assert_eq!(monitor.segment, RiskSegment::Monitor);
        assert_eq!(monitor.customers, 0);
        let at_risk = &summary.segments[2];
        assert_eq!(at_risk.customers, 2);
        assert_eq!(at_risk.revenue, 30.0);
        assert_eq!(at_risk.share_percent, 100.0);
        assert_eq!(summary.retention_rate, 0.0);
    }

    #[test]
    fn test_empty_input() {
        let summary = segment_summary(&[]);
        assert_eq!(summary.total_customers, 0);
        assert_eq!(summary.retention_rate, 0.0);
    }
}
