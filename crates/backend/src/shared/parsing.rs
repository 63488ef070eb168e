//! Разбор бразильских форматов из выгрузок POS и строк REST API.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::Value;

/// Дата/время в формате `DD/MM/YYYY[ HH:MM[:SS]]` или ISO 8601.
///
/// Двузначный год трактуется как 20YY. Невалидная строка даёт `None`.
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if s.contains('/') {
        return parse_br_datetime(s);
    }
    parse_iso_datetime(s)
}

fn parse_br_datetime(s: &str) -> Option<NaiveDateTime> {
    let mut parts = s.splitn(2, |c: char| c == ' ' || c == 'T');
    let date_part = parts.next()?;
    let time_part = parts.next().map(str::trim).unwrap_or("");

    let fields: Vec<&str> = date_part.split('/').collect();
    let [day, month, year] = fields.as_slice() else {
        return None;
    };
    let day: u32 = day.trim().parse().ok()?;
    let month: u32 = month.trim().parse().ok()?;
    let year = year.trim();
    let year: i32 = if year.len() == 2 {
        2000 + year.parse::<i32>().ok()?
    } else {
        year.parse().ok()?
    };
    let date = NaiveDate::from_ymd_opt(year, month, day)?;

    let time = if time_part.is_empty() {
        NaiveTime::MIN
    } else {
        NaiveTime::parse_from_str(time_part, "%H:%M:%S")
            .or_else(|_| NaiveTime::parse_from_str(time_part, "%H:%M"))
            .ok()?
    };
    Some(date.and_time(time))
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }
    // "+00" / "+00:00" от PostgREST для timestamptz
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f%#z") {
        return Some(dt.naive_utc());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

pub fn parse_date(s: &str) -> Option<NaiveDate> {
    parse_datetime(s).map(|dt| dt.date())
}

/// Число в формате `1.234,56`, `1,5` или `1234.56`; при ошибке 0.0
pub fn parse_br_number(s: &str) -> f64 {
    let s = s.trim().trim_start_matches("R$").trim();
    if s.is_empty() {
        return 0.0;
    }
    let normalized = if s.contains(',') {
        s.replace('.', "").replace(',', ".")
    } else {
        s.to_string()
    };
    normalized
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// CPF из 11 цифр: нецифровые символы удаляются, короткие дополняются нулями
/// слева, длинные обрезаются до последних 11. Пустая строка, если цифр нет.
pub fn normalize_cpf(doc: &str) -> String {
    let digits: String = doc.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return String::new();
    }
    if digits.len() > 11 {
        digits[digits.len() - 11..].to_string()
    } else {
        format!("{:0>11}", digits)
    }
}

// ---------------------------------------------------------------------------
// JSON-значения из REST API
// ---------------------------------------------------------------------------

/// Число из JSON: number, строка в любом поддерживаемом формате; иначе 0.0
pub fn value_f64(v: Option<&Value>) -> f64 {
    match v {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => parse_br_number(s),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    }
}

pub fn value_u32(v: Option<&Value>) -> u32 {
    let f = value_f64(v);
    if f <= 0.0 {
        0
    } else {
        f.min(u32::MAX as f64) as u32
    }
}

/// Непустая строка (числа приводятся к строке)
pub fn value_string(v: Option<&Value>) -> Option<String> {
    match v {
        Some(Value::String(s)) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

pub fn value_bool(v: Option<&Value>) -> bool {
    match v {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Some(Value::String(s)) => matches!(
            s.trim().to_lowercase().as_str(),
            "true" | "sim" | "s" | "yes" | "1"
        ),
        _ => false,
    }
}
