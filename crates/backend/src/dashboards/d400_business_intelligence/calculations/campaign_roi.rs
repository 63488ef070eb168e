use chrono::Duration;
use contracts::dashboards::d400_business_intelligence::dto::{CampaignRoiReport, CampaignRoiStatus};
use contracts::domain::a001_transaction::aggregate::Transaction;
use contracts::domain::a003_campaign::aggregate::Campaign;

use super::round2;

fn status_for(redemptions: u32, roi: f64) -> CampaignRoiStatus {
    if redemptions == 0 {
        CampaignRoiStatus::NoData
    } else if roi >= 2.0 {
        CampaignRoiStatus::Excellent
    } else if roi >= 1.0 {
        CampaignRoiStatus::Good
    } else if roi >= 0.0 {
        CampaignRoiStatus::Marginal
    } else {
        CampaignRoiStatus::Negative
    }
}

fn recommendation(status: CampaignRoiStatus, cap_reached: bool) -> String {
    let base = match status {
        CampaignRoiStatus::NoData => {
            "Nenhum resgate registrado no período. Revise a divulgação do cupom."
        }
        CampaignRoiStatus::Excellent => {
            "Campanha excelente: repita a ação e considere ampliar o público."
        }
        CampaignRoiStatus::Good => "Campanha positiva: a receita extra cobre o custo do desconto.",
        CampaignRoiStatus::Marginal => {
            "Retorno marginal: considere reduzir o desconto ou segmentar melhor."
        }
        CampaignRoiStatus::Negative => {
            "Campanha com prejuízo: o desconto custou mais do que a receita gerada."
        }
    };
    if cap_reached {
        format!("{} Limite de resgates atingido.", base)
    } else {
        base.to_string()
    }
}

/// ROI кампании по купону.
///
/// - погашения: транзакции с кодом купона кампании внутри окна действия;
/// - стоимость скидки: сумма `gross_value` погашений × процент скидки;
/// - фактическая выручка: вся выручка в окне кампании;
/// - базовая выручка: средняя дневная выручка за такое же окно перед
///   кампанией × длительность кампании;
/// - ROI = (фактическая − базовая) / стоимость скидки.
pub fn calculate_campaign_roi(campaign: &Campaign, txs: &[Transaction]) -> CampaignRoiReport {
    let code = campaign.coupon_code.trim().to_uppercase();
    let days = campaign.duration_days();
    let baseline_from = campaign.valid_from - Duration::days(days);

    let mut redemptions = 0u32;
    let mut redeemed_gross = 0.0;
    let mut actual_revenue = 0.0;
    let mut baseline_total = 0.0;

    for tx in txs {
        let day = tx.day();
        if campaign.is_valid_on(day) {
            actual_revenue += tx.net_value;
            if !code.is_empty() && tx.normalized_coupon().as_deref() == Some(code.as_str()) {
                redemptions += 1;
                redeemed_gross += tx.gross_value;
            }
        } else if day >= baseline_from && day < campaign.valid_from {
            baseline_total += tx.net_value;
        }
    }

    let discount_cost = redeemed_gross * campaign.discount_percent.max(0.0) / 100.0;
    // days >= 1, окно до кампании той же длины
    let baseline_daily = baseline_total / days as f64;
    let baseline_revenue = baseline_daily * days as f64;
    let incremental_revenue = actual_revenue - baseline_revenue;

    let roi = if redemptions == 0 || discount_cost <= 0.0 {
        0.0
    } else {
        incremental_revenue / discount_cost
    };

    let cap = campaign.redemption_cap.filter(|c| *c > 0);
    let redemption_rate = cap.map(|c| round2(redemptions as f64 / c as f64));
    let cap_reached = cap.map(|c| redemptions >= c).unwrap_or(false);

    let status = status_for(redemptions, roi);

    CampaignRoiReport {
        campaign_id: campaign.id.clone(),
        coupon_code: code,
        redemptions,
        redemption_rate,
        cap_reached,
        discount_cost: round2(discount_cost),
        actual_revenue: round2(actual_revenue),
        baseline_revenue: round2(baseline_revenue),
        incremental_revenue: round2(incremental_revenue),
        roi: round2(roi),
        status,
        recommendation: recommendation(status, cap_reached),
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sale;
    use super::*;
    use chrono::NaiveDate;
    use contracts::domain::a003_campaign::aggregate::CampaignStatus;

    fn campaign(cap: Option<u32>) -> Campaign {
        Campaign {
            id: "c1".to_string(),
            name: "Volta".to_string(),
            coupon_code: " volta10 ".to_string(),
            discount_percent: 10.0,
            valid_from: NaiveDate::from_ymd_opt(2024, 6, 11).unwrap(),
            valid_to: NaiveDate::from_ymd_opt(2024, 6, 20).unwrap(),
            redemption_cap: cap,
            template_id: None,
            status: CampaignStatus::Active,
        }
    }

    fn coupon_sale(d: u32, value: f64, code: &str) -> Transaction {
        let mut tx = sale(2024, 6, d, value);
        tx.coupon_code = Some(code.to_string());
        tx.used_coupon = true;
        tx
    }

    #[test]
    fn test_no_redemptions_returns_zero_roi() {
        let txs = vec![sale(2024, 6, 12, 100.0), sale(2024, 6, 5, 50.0)];
        let report = calculate_campaign_roi(&campaign(None), &txs);
        assert_eq!(report.redemptions, 0);
        assert_eq!(report.roi, 0.0);
        assert_eq!(report.status, CampaignRoiStatus::NoData);
        assert_eq!(report.actual_revenue, 100.0);
        assert_eq!(report.baseline_revenue, 50.0);
    }

    #[test]
    fn test_incremental_roi_and_cap() {
        let txs = vec![
            // окно до кампании: 1..10 июня
            sale(2024, 6, 1, 100.0),
            sale(2024, 6, 10, 100.0),
            // раньше базового окна, не учитывается
            sale(2024, 5, 30, 1000.0),
            // кампания
            coupon_sale(11, 100.0, "VOLTA10"),
            coupon_sale(15, 100.0, "volta10 "),
            coupon_sale(16, 100.0, "OUTRO"),
            sale(2024, 6, 20, 100.0),
            // после окна
            coupon_sale(21, 100.0, "VOLTA10"),
        ];
        let report = calculate_campaign_roi(&campaign(Some(2)), &txs);

        assert_eq!(report.coupon_code, "VOLTA10");
        assert_eq!(report.redemptions, 2);
        assert_eq!(report.discount_cost, 20.0);
        assert_eq!(report.actual_revenue, 400.0);
        assert_eq!(report.baseline_revenue, 200.0);
        assert_eq!(report.incremental_revenue, 200.0);
        assert_eq!(report.roi, 10.0);
        assert_eq!(report.status, CampaignRoiStatus::Excellent);
        assert_eq!(report.redemption_rate, Some(1.0));
        assert!(report.cap_reached);
        assert!(report.recommendation.contains("Limite de resgates"));
    }

    #[test]
    fn test_negative_roi() {
        let txs = vec![
            sale(2024, 6, 5, 500.0),
            coupon_sale(12, 100.0, "VOLTA10"),
        ];
        let report = calculate_campaign_roi(&campaign(None), &txs);
        assert_eq!(report.incremental_revenue, -400.0);
        assert_eq!(report.roi, -40.0);
        assert_eq!(report.status, CampaignRoiStatus::Negative);
        assert_eq!(report.redemption_rate, None);
        assert!(!report.cap_reached);
    }

    #[test]
    fn test_single_day_campaign_uses_previous_day_only() {
        let mut c = campaign(None);
        c.valid_from = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        c.valid_to = c.valid_from;
        let txs = vec![
            sale(2024, 6, 13, 900.0),
            sale(2024, 6, 14, 80.0),
            coupon_sale(15, 200.0, "VOLTA10"),
        ];
        let report = calculate_campaign_roi(&c, &txs);
        assert_eq!(report.baseline_revenue, 80.0);
        assert_eq!(report.incremental_revenue, 120.0);
        assert_eq!(report.roi, 6.0);
    }

    #[test]
    fn test_status_thresholds() {
        assert_eq!(status_for(1, 2.0), CampaignRoiStatus::Excellent);
        assert_eq!(status_for(1, 1.0), CampaignRoiStatus::Good);
        assert_eq!(status_for(1, 0.0), CampaignRoiStatus::Marginal);
        assert_eq!(status_for(1, -0.01), CampaignRoiStatus::Negative);
        assert_eq!(status_for(0, 5.0), CampaignRoiStatus::NoData);
    }
}
