use chrono::Datelike;
use contracts::dashboards::d400_business_intelligence::dto::{
    GrowthTrendReport, MonthlyRevenue, TrendDirection,
};
use contracts::domain::a001_transaction::aggregate::Transaction;
use std::collections::BTreeMap;

use super::{round2, shift_month};

/// Помесячная выручка от первого до последнего месяца с данными (пропуски = 0)
pub fn monthly_revenue_series(txs: &[Transaction]) -> Vec<MonthlyRevenue> {
    let mut by_month: BTreeMap<(i32, u32), (f64, u32)> = BTreeMap::new();
    for tx in txs {
        let day = tx.day();
        let entry = by_month.entry((day.year(), day.month())).or_insert((0.0, 0));
        entry.0 += tx.net_value;
        entry.1 += tx.services();
    }

    let (Some(&(y0, m0)), Some(&(y1, m1))) = (
        by_month.keys().next(),
        by_month.keys().next_back(),
    ) else {
        return Vec::new();
    };

    let span = (y1 * 12 + m1 as i32) - (y0 * 12 + m0 as i32);
    let mut series: Vec<MonthlyRevenue> = Vec::with_capacity(span as usize + 1);
    let mut previous: Option<f64> = None;

    for offset in 0..=span {
        let (y, m) = shift_month(y0, m0, offset);
        let (revenue, services) = by_month.get(&(y, m)).copied().unwrap_or((0.0, 0));
        let growth_percent = previous
            .filter(|p| *p > 0.0)
            .map(|p| round2((revenue - p) / p * 100.0));
        series.push(MonthlyRevenue {
            period: format!("{:04}-{:02}", y, m),
            revenue: round2(revenue),
            services,
            growth_percent,
        });
        previous = Some(revenue);
    }
    series
}

/// Линейная регрессия y = slope·x + intercept по x = 0..n-1; возвращает (slope, intercept, R²)
fn linear_regression(ys: &[f64]) -> (f64, f64, f64) {
    let n = ys.len();
    if n == 0 {
        return (0.0, 0.0, 0.0);
    }
    if n == 1 {
        return (0.0, ys[0], 0.0);
    }
    let nf = n as f64;
    let mean_x = (nf - 1.0) / 2.0;
    let mean_y = ys.iter().sum::<f64>() / nf;

    let (mut sxy, mut sxx) = (0.0, 0.0);
    for (i, y) in ys.iter().enumerate() {
        let dx = i as f64 - mean_x;
        sxy += dx * (y - mean_y);
        sxx += dx * dx;
    }
    let slope = sxy / sxx;
    let intercept = mean_y - slope * mean_x;

    let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = ys
        .iter()
        .enumerate()
        .map(|(i, y)| (y - (slope * i as f64 + intercept)).powi(2))
        .sum();
    let r_squared = if ss_tot > f64::EPSILON {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    } else {
        0.0
    };
    (slope, intercept, r_squared)
}

/// Тренд выручки за последние `months` месяцев, заканчивая последним месяцем с данными.
///
/// Наклон меньше 1% средней выручки в месяц считается стабильным трендом.
pub fn calculate_growth_trend(txs: &[Transaction], months: u32) -> GrowthTrendReport {
    let series = monthly_revenue_series(txs);
    let take = (months.max(1) as usize).min(series.len());
    let window: Vec<MonthlyRevenue> = series[series.len() - take..].to_vec();

    let growths: Vec<f64> = window.iter().filter_map(|m| m.growth_percent).collect();
    let avg_growth_percent = if growths.is_empty() {
        0.0
    } else {
        growths.iter().sum::<f64>() / growths.len() as f64
    };

    let revenues: Vec<f64> = window.iter().map(|m| m.revenue).collect();
    let (slope, intercept, r_squared) = linear_regression(&revenues);
    let mean_revenue = if revenues.is_empty() {
        0.0
    } else {
        revenues.iter().sum::<f64>() / revenues.len() as f64
    };

    let trend = if revenues.len() < 2 || mean_revenue <= 0.0 || slope.abs() < mean_revenue * 0.01 {
        TrendDirection::Stable
    } else if slope > 0.0 {
        TrendDirection::Growing
    } else {
        TrendDirection::Declining
    };

    GrowthTrendReport {
        latest_growth_percent: window.last().and_then(|m| m.growth_percent),
        months: window,
        avg_growth_percent: round2(avg_growth_percent),
        slope: round2(slope),
        intercept: round2(intercept),
        r_squared: (r_squared * 1000.0).round() / 1000.0,
        trend,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sale;
    use super::*;

    #[test]
    fn test_series_fills_gaps_and_computes_mom() {
        let txs = vec![
            sale(2024, 1, 5, 100.0),
            sale(2024, 3, 5, 150.0),
            sale(2024, 4, 5, 300.0),
        ];
        let series = monthly_revenue_series(&txs);
        let periods: Vec<&str> = series.iter().map(|m| m.period.as_str()).collect();
        assert_eq!(periods, vec!["2024-01", "2024-02", "2024-03", "2024-04"]);
        assert_eq!(series[0].growth_percent, None);
        assert_eq!(series[1].growth_percent, Some(-100.0));
        // база февраля = 0
        assert_eq!(series[2].growth_percent, None);
        assert_eq!(series[3].growth_percent, Some(100.0));
    }

    #[test]
    fn test_growing_trend_with_perfect_fit() {
        let txs: Vec<_> = (1..=6).map(|m| sale(2024, m, 10, 100.0 * m as f64)).collect();
        let report = calculate_growth_trend(&txs, 6);
        assert_eq!(report.months.len(), 6);
        assert_eq!(report.slope, 100.0);
        assert_eq!(report.intercept, 100.0);
        assert_eq!(report.r_squared, 1.0);
        assert_eq!(report.trend, TrendDirection::Growing);
        assert_eq!(report.latest_growth_percent, Some(20.0));
    }

    #[test]
    fn test_window_crosses_year_and_uses_previous_month_for_growth() {
        let txs = vec![
            sale(2023, 11, 1, 100.0),
            sale(2023, 12, 1, 100.0),
            sale(2024, 1, 1, 100.5),
        ];
        let report = calculate_growth_trend(&txs, 2);
        assert_eq!(report.months[0].period, "2023-12");
        assert_eq!(report.months[0].growth_percent, Some(0.0));
        assert_eq!(report.trend, TrendDirection::Stable);
    }

    #[test]
    fn test_declining_trend() {
        let txs = vec![
            sale(2024, 1, 1, 300.0),
            sale(2024, 2, 1, 200.0),
            sale(2024, 3, 1, 100.0),
        ];
        let report = calculate_growth_trend(&txs, 12);
        assert_eq!(report.months.len(), 3);
        assert_eq!(report.trend, TrendDirection::Declining);
        assert_eq!(report.slope, -100.0);
    }

    #[test]
    fn test_empty() {
        let report = calculate_growth_trend(&[], 6);
        assert!(report.months.is_empty());
        assert_eq!(report.avg_growth_percent, 0.0);
        assert_eq!(report.trend, TrendDirection::Stable);
        assert_eq!(report.latest_growth_percent, None);
    }
}
