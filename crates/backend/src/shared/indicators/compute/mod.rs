pub mod sales;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate};
use contracts::shared::indicators::{IndicatorContext, IndicatorStatus};

use crate::dashboards::d400_business_intelligence::calculations::{month_bounds, shift_month};

pub(crate) fn parse_day(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .with_context(|| format!("invalid date '{}'", s))
}

/// Сдвиг даты на `months` месяцев; день обрезается до длины месяца
fn shift_date(day: NaiveDate, months: i32) -> NaiveDate {
    let (y, m) = shift_month(day.year(), day.month(), months);
    match month_bounds(y, m) {
        Some((first, last)) => first
            .with_day(day.day().min(last.day()))
            .unwrap_or(last),
        None => day,
    }
}

/// Тот же период месяцем раньше, для сравнения.
pub(crate) fn previous_period(ctx: &IndicatorContext) -> IndicatorContext {
    let shift = |s: &str| match parse_day(s) {
        Ok(d) => shift_date(d, -1).format("%Y-%m-%d").to_string(),
        Err(_) => s.to_string(),
    };
    IndicatorContext {
        date_from: shift(&ctx.date_from),
        date_to: shift(&ctx.date_to),
        store: ctx.store.clone(),
    }
}

pub(crate) fn pct_change(cur: f64, prev: f64) -> Option<f64> {
    if prev.abs() < 0.01 {
        None
    } else {
        Some((cur - prev) / prev.abs() * 100.0)
    }
}

pub(crate) fn status_by_change(change: Option<f64>, higher_is_good: bool) -> IndicatorStatus {
    match change {
        Some(c) if c > 5.0 => {
            if higher_is_good {
                IndicatorStatus::Good
            } else {
                IndicatorStatus::Bad
            }
        }
        Some(c) if c < -5.0 => {
            if higher_is_good {
                IndicatorStatus::Bad
            } else {
                IndicatorStatus::Good
            }
        }
        _ => IndicatorStatus::Neutral,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx(from: &str, to: &str) -> IndicatorContext {
        IndicatorContext {
            date_from: from.to_string(),
            date_to: to.to_string(),
            store: Some("Centro".to_string()),
        }
    }

    #[test]
    fn test_previous_period_clamps_day() {
        let prev = previous_period(&ctx("2024-03-01", "2024-03-31"));
        assert_eq!(prev.date_from, "2024-02-01");
        assert_eq!(prev.date_to, "2024-02-29");
        assert_eq!(prev.store.as_deref(), Some("Centro"));

        let prev = previous_period(&ctx("2024-01-01", "2024-01-15"));
        assert_eq!(prev.date_from, "2023-12-01");
        assert_eq!(prev.date_to, "2023-12-15");
    }

    #[test]
    fn test_previous_period_keeps_garbage() {
        let prev = previous_period(&ctx("abc", "2024-05-31"));
        assert_eq!(prev.date_from, "abc");
        assert_eq!(prev.date_to, "2024-04-30");
    }

    #[test]
    fn test_pct_change() {
        assert_eq!(pct_change(110.0, 100.0), Some(10.0));
        assert_eq!(pct_change(50.0, -100.0), Some(150.0));
        assert_eq!(pct_change(10.0, 0.0), None);
        assert_eq!(pct_change(10.0, 0.005), None);
    }

    #[test]
    fn test_status_by_change() {
        assert_eq!(status_by_change(Some(6.0), true), IndicatorStatus::Good);
        assert_eq!(status_by_change(Some(6.0), false), IndicatorStatus::Bad);
        assert_eq!(status_by_change(Some(-6.0), true), IndicatorStatus::Bad);
        assert_eq!(status_by_change(Some(-6.0), false), IndicatorStatus::Good);
        assert_eq!(status_by_change(Some(5.0), true), IndicatorStatus::Neutral);
        assert_eq!(status_by_change(None, true), IndicatorStatus::Neutral);
    }
}
