use chrono::NaiveDate;
use contracts::dashboards::d400_business_intelligence::dto::WeatherDay;
use contracts::domain::RawRow;

use crate::shared::parsing::{parse_date, value_f64, value_string};
use crate::shared::supabase::{self, Query};

/// Погода за день из строки `weather_daily`; строки без даты отбрасываются
pub fn weather_from_row(row: &RawRow) -> Option<WeatherDay> {
    let date = value_string(row.get("date")).and_then(|s| parse_date(&s))?;
    let precipitation = row
        .get("precipitation_mm")
        .or_else(|| row.get("precipitation"));
    let temp_max = row
        .get("temp_max")
        .filter(|v| !v.is_null())
        .map(|v| value_f64(Some(v)));
    Some(WeatherDay {
        date,
        precipitation_mm: value_f64(precipitation),
        temp_max,
    })
}

/// Погода за период `[from, to]`
pub async fn load_weather(from: NaiveDate, to: NaiveDate) -> anyhow::Result<Vec<WeatherDay>> {
    let query = Query::new()
        .select("*")
        .gte("date", from)
        .lte("date", to)
        .order("date", true);
    let rows = supabase::client()?.select_all("weather_daily", &query).await?;
    Ok(rows.iter().filter_map(weather_from_row).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_weather_from_row_variants() {
        let row = json!({ "date": "2024-06-01", "precipitation": "3,5", "temp_max": 28.1 });
        let day = weather_from_row(row.as_object().unwrap()).unwrap();
        assert_eq!(day.precipitation_mm, 3.5);
        assert_eq!(day.temp_max, Some(28.1));

        let no_rain = json!({ "date": "2024-06-02", "temp_max": null });
        let day = weather_from_row(no_rain.as_object().unwrap()).unwrap();
        assert_eq!(day.precipitation_mm, 0.0);
        assert_eq!(day.temp_max, None);

        let bad = json!({ "date": "??" });
        assert!(weather_from_row(bad.as_object().unwrap()).is_none());
    }
}
