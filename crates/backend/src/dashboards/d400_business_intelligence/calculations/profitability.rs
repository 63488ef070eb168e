use chrono::{Datelike, NaiveDate};
use contracts::dashboards::d400_business_intelligence::dto::ProfitabilityReport;
use contracts::domain::a001_transaction::aggregate::Transaction;
use contracts::shared::settings::AppSettings;

use super::{month_bounds, round2};

/// Прибыльность месяца.
///
/// Выручка = сумма `net_value` (кэшбэк показывается отдельно как обязательство).
/// Постоянные расходы и обслуживание пропорциональны прошедшим дням, если
/// `as_of` попадает внутрь месяца; за закрытый или будущий месяц берутся целиком.
/// Точка безубыточности считается от полной месячной суммы постоянных расходов
/// и маржинального дохода на один цикл.
pub fn calculate_profitability(
    txs: &[Transaction],
    settings: &AppSettings,
    year: i32,
    month: u32,
    as_of: NaiveDate,
) -> ProfitabilityReport {
    let period = format!("{:04}-{:02}", year, month);
    let Some((first, last)) = month_bounds(year, month) else {
        return empty_report(period, settings);
    };
    let days_in_month = last.day();

    let (revenue, cashback, services) = txs
        .iter()
        .filter(|t| t.day() >= first && t.day() <= last)
        .fold((0.0, 0.0, 0u32), |(r, c, s), t| {
            (r + t.net_value, c + t.cashback_amount, s + t.services())
        });

    let in_progress = as_of >= first && as_of < last;
    let days_elapsed = if in_progress {
        as_of.day()
    } else if as_of >= last {
        days_in_month
    } else {
        0
    };
    let factor = if in_progress {
        days_elapsed as f64 / days_in_month as f64
    } else {
        1.0
    };

    let fixed_costs = settings.fixed_costs_monthly * factor;
    let maintenance_costs = settings.maintenance_costs_monthly * factor;
    let variable_costs = services as f64 * settings.variable_cost_per_service;
    let total_costs = fixed_costs + maintenance_costs + variable_costs;
    let profit = revenue - total_costs;
    let margin_percent = if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    };

    let avg_revenue_per_service = if services > 0 {
        revenue / services as f64
    } else {
        0.0
    };

    let monthly_costs = settings.monthly_costs();
    let contribution = avg_revenue_per_service - settings.variable_cost_per_service;
    let (break_even_services, break_even_revenue) = if monthly_costs <= 0.0 {
        (Some(0), 0.0)
    } else if contribution > 0.0 {
        let needed = (monthly_costs / contribution).ceil();
        (
            Some(needed.min(u32::MAX as f64) as u32),
            needed * avg_revenue_per_service,
        )
    } else {
        (None, monthly_costs)
    };

    let break_even_progress_percent = if break_even_revenue > 0.0 {
        revenue / break_even_revenue * 100.0
    } else if revenue > 0.0 || monthly_costs <= 0.0 {
        100.0
    } else {
        0.0
    };

    ProfitabilityReport {
        period,
        revenue: round2(revenue),
        cashback_liability: round2(cashback),
        services,
        fixed_costs: round2(fixed_costs),
        maintenance_costs: round2(maintenance_costs),
        variable_costs: round2(variable_costs),
        total_costs: round2(total_costs),
        profit: round2(profit),
        margin_percent: round2(margin_percent),
        avg_revenue_per_service: round2(avg_revenue_per_service),
        break_even_revenue: round2(break_even_revenue),
        break_even_services,
        break_even_progress_percent: round2(break_even_progress_percent),
        prorated: in_progress,
        days_elapsed,
        days_in_month,
    }
}

fn empty_report(period: String, settings: &AppSettings) -> ProfitabilityReport {
    let total = settings.monthly_costs();
    ProfitabilityReport {
        period,
        revenue: 0.0,
        cashback_liability: 0.0,
        services: 0,
        fixed_costs: settings.fixed_costs_monthly,
        maintenance_costs: settings.maintenance_costs_monthly,
        variable_costs: 0.0,
        total_costs: total,
        profit: -total,
        margin_percent: 0.0,
        avg_revenue_per_service: 0.0,
        break_even_revenue: total,
        break_even_services: None,
        break_even_progress_percent: 0.0,
        prorated: false,
        days_elapsed: 0,
        days_in_month: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sale;
    use super::*;

    fn settings() -> AppSettings {
        AppSettings {
            cashback_percent: 7.5,
            cashback_start_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            fixed_costs_monthly: 3000.0,
            maintenance_costs_monthly: 600.0,
            variable_cost_per_service: 2.0,
        }
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_zero_records_gives_zero_revenue_and_full_fixed_cost() {
        let report = calculate_profitability(&[], &settings(), 2024, 5, day(2024, 7, 1));
        assert_eq!(report.revenue, 0.0);
        assert_eq!(report.fixed_costs, 3000.0);
        assert_eq!(report.maintenance_costs, 600.0);
        assert_eq!(report.total_costs, 3600.0);
        assert_eq!(report.profit, -3600.0);
        assert_eq!(report.margin_percent, 0.0);
        assert_eq!(report.break_even_services, None);
        assert!(!report.prorated);
        assert_eq!(report.days_in_month, 31);
    }

    #[test]
    fn test_closed_month_full_costs_and_break_even() {
        let mut txs: Vec<_> = (1..=30).map(|d| sale(2024, 6, d, 20.0)).collect();
        let mut with_cashback = sale(2024, 6, 15, 20.0);
        with_cashback.cashback_amount = 1.5;
        txs.push(with_cashback);
        txs.push(sale(2024, 7, 1, 500.0));

        let report = calculate_profitability(&txs, &settings(), 2024, 6, day(2024, 7, 10));
        assert_eq!(report.revenue, 620.0);
        assert_eq!(report.cashback_liability, 1.5);
        assert_eq!(report.services, 31);
        assert_eq!(report.variable_costs, 62.0);
        assert_eq!(report.total_costs, 3662.0);
        assert_eq!(report.profit, -3042.0);
        assert_eq!(report.avg_revenue_per_service, 20.0);
        // 3600 / (20 - 2) = 200 циклов
        assert_eq!(report.break_even_services, Some(200));
        assert_eq!(report.break_even_revenue, 4000.0);
        assert_eq!(report.break_even_progress_percent, 15.5);
        assert!(!report.prorated);
        assert_eq!(report.days_elapsed, 30);
    }

    #[test]
    fn test_month_in_progress_prorates_costs() {
        let txs = vec![sale(2024, 6, 1, 100.0)];
        let report = calculate_profitability(&txs, &settings(), 2024, 6, day(2024, 6, 10));
        assert!(report.prorated);
        assert_eq!(report.days_elapsed, 10);
        assert_eq!(report.fixed_costs, 1000.0);
        assert_eq!(report.maintenance_costs, 200.0);
    }

    #[test]
    fn test_invalid_month_does_not_panic() {
        let report = calculate_profitability(&[], &settings(), 2024, 13, day(2024, 6, 10));
        assert_eq!(report.period, "2024-13");
        assert_eq!(report.revenue, 0.0);
        assert_eq!(report.total_costs, 3600.0);
    }

    #[test]
    fn test_no_costs_means_break_even_reached() {
        let free = AppSettings {
            fixed_costs_monthly: 0.0,
            maintenance_costs_monthly: 0.0,
            variable_cost_per_service: 0.0,
            ..settings()
        };
        let report = calculate_profitability(&[sale(2024, 6, 2, 10.0)], &free, 2024, 6, day(2024, 8, 1));
        assert_eq!(report.break_even_services, Some(0));
        assert_eq!(report.break_even_progress_percent, 100.0);
        assert_eq!(report.margin_percent, 100.0);
    }
}
