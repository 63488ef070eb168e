//! Расчёты BI над плоскими списками транзакций.
//!
//! Все функции чистые и не возвращают ошибок: некорректные строки отбрасываются
//! ещё на этапе разбора, пустой вход даёт нулевые показатели.

pub mod campaign_roi;
pub mod growth;
pub mod health;
pub mod operations;
pub mod profitability;
pub mod weather;

use chrono::{Datelike, NaiveDate};

pub use campaign_roi::calculate_campaign_roi;
pub use growth::{calculate_growth_trend, monthly_revenue_series};
pub use health::calculate_health_score;
pub use operations::calculate_operations_summary;
pub use profitability::calculate_profitability;
pub use weather::{calculate_weather_impact, precipitation_bucket};

/// Первый и последний день месяца; `None` для несуществующего месяца
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first, next.pred_opt()?))
}

/// Сдвиг на `delta` месяцев (первое число)
pub fn shift_month(year: i32, month: u32, delta: i32) -> (i32, u32) {
    let index = year * 12 + month as i32 - 1 + delta;
    (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
}

pub fn period_key(day: NaiveDate) -> String {
    format!("{:04}-{:02}", day.year(), day.month())
}

pub(crate) fn round2(v: f64) -> f64 {
    if v.is_finite() {
        (v * 100.0).round() / 100.0
    } else {
        0.0
    }
}

/// Коэффициент корреляции Пирсона; 0, если не определён
pub fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len().min(ys.len());
    if n < 2 {
        return 0.0;
    }
    let mean_x = xs[..n].iter().sum::<f64>() / n as f64;
    let mean_y = ys[..n].iter().sum::<f64>() / n as f64;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for i in 0..n {
        let dx = xs[i] - mean_x;
        let dy = ys[i] - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }
    if var_x <= f64::EPSILON || var_y <= f64::EPSILON {
        return 0.0;
    }
    let r = cov / (var_x.sqrt() * var_y.sqrt());
    if r.is_finite() {
        r.clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
