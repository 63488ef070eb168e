use chrono::NaiveDate;
use contracts::dashboards::d400_business_intelligence::dto::{
    PrecipitationBucket, WeatherBucketStats, WeatherDay, WeatherImpactReport,
};
use contracts::domain::a001_transaction::aggregate::Transaction;
use std::collections::{BTreeMap, HashMap};

use super::{pearson, round2};

pub fn precipitation_bucket(mm: f64) -> PrecipitationBucket {
    if !mm.is_finite() || mm < 0.1 {
        PrecipitationBucket::Dry
    } else if mm < 5.0 {
        PrecipitationBucket::Light
    } else if mm < 15.0 {
        PrecipitationBucket::Moderate
    } else {
        PrecipitationBucket::Heavy
    }
}

/// Влияние осадков на выручку.
///
/// Анализируются только дни, где есть и погода, и продажи. Для дубликатов
/// дат в погодных данных берётся последняя запись.
pub fn calculate_weather_impact(txs: &[Transaction], weather: &[WeatherDay]) -> WeatherImpactReport {
    let mut daily: HashMap<NaiveDate, (f64, u32)> = HashMap::new();
    for tx in txs {
        let entry = daily.entry(tx.day()).or_insert((0.0, 0));
        entry.0 += tx.net_value;
        entry.1 += tx.services();
    }

    let precipitation: BTreeMap<NaiveDate, f64> = weather
        .iter()
        .map(|w| (w.date, if w.precipitation_mm.is_finite() { w.precipitation_mm.max(0.0) } else { 0.0 }))
        .collect();

    // (осадки, выручка, циклы) по дням
    let joined: Vec<(f64, f64, u32)> = precipitation
        .iter()
        .filter_map(|(day, mm)| daily.get(day).map(|(rev, svc)| (*mm, *rev, *svc)))
        .collect();

    let mut sums: BTreeMap<PrecipitationBucket, (u32, f64, u32)> = BTreeMap::new();
    for (mm, revenue, services) in &joined {
        let entry = sums.entry(precipitation_bucket(*mm)).or_insert((0, 0.0, 0));
        entry.0 += 1;
        entry.1 += revenue;
        entry.2 += services;
    }

    let averages = |bucket: PrecipitationBucket| -> (u32, f64, f64) {
        match sums.get(&bucket) {
            Some((days, revenue, services)) if *days > 0 => (
                *days,
                revenue / *days as f64,
                *services as f64 / *days as f64,
            ),
            _ => (0, 0.0, 0.0),
        }
    };

    let (dry_days, dry_avg, _) = averages(PrecipitationBucket::Dry);

    let buckets = PrecipitationBucket::ALL
        .iter()
        .map(|bucket| {
            let (days, avg_revenue, avg_services) = averages(*bucket);
            let impact_percent = (days > 0 && dry_days > 0 && dry_avg > 0.0)
                .then(|| round2((avg_revenue - dry_avg) / dry_avg * 100.0));
            WeatherBucketStats {
                bucket: *bucket,
                label: bucket.label().to_string(),
                days,
                avg_revenue: round2(avg_revenue),
                avg_services: round2(avg_services),
                impact_percent,
            }
        })
        .collect();

    let xs: Vec<f64> = joined.iter().map(|(mm, _, _)| *mm).collect();
    let ys: Vec<f64> = joined.iter().map(|(_, rev, _)| *rev).collect();

    WeatherImpactReport {
        days_analyzed: joined.len() as u32,
        buckets,
        correlation: (pearson(&xs, &ys) * 1000.0).round() / 1000.0,
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::sale;
    use super::*;

    fn weather(d: u32, mm: f64) -> WeatherDay {
        WeatherDay {
            date: NaiveDate::from_ymd_opt(2024, 6, d).unwrap(),
            precipitation_mm: mm,
            temp_max: None,
        }
    }

    #[test]
    fn test_bucket_boundaries() {
        assert_eq!(precipitation_bucket(0.0), PrecipitationBucket::Dry);
        assert_eq!(precipitation_bucket(0.09), PrecipitationBucket::Dry);
        assert_eq!(precipitation_bucket(0.1), PrecipitationBucket::Light);
        assert_eq!(precipitation_bucket(4.99), PrecipitationBucket::Light);
        assert_eq!(precipitation_bucket(5.0), PrecipitationBucket::Moderate);
        assert_eq!(precipitation_bucket(15.0), PrecipitationBucket::Heavy);
        assert_eq!(precipitation_bucket(f64::NAN), PrecipitationBucket::Dry);
    }

    #[test]
    fn test_rainy_days_raise_revenue() {
        let txs = vec![
            sale(2024, 6, 1, 100.0),
            sale(2024, 6, 2, 100.0),
            sale(2024, 6, 3, 150.0),
            sale(2024, 6, 4, 200.0),
            sale(2024, 6, 4, 100.0),
        ];
        let days = vec![
            weather(1, 0.0),
            weather(2, 0.0),
            weather(3, 2.0),
            weather(4, 20.0),
            // нет продаж в этот день
            weather(5, 30.0),
        ];

        let report = calculate_weather_impact(&txs, &days);
        assert_eq!(report.days_analyzed, 4);
        assert_eq!(report.buckets.len(), 4);

        let dry = &report.buckets[0];
        assert_eq!(dry.days, 2);
        assert_eq!(dry.avg_revenue, 100.0);
        assert_eq!(dry.impact_percent, Some(0.0));

        let light = &report.buckets[1];
        assert_eq!(light.impact_percent, Some(50.0));

        let moderate = &report.buckets[2];
        assert_eq!(moderate.days, 0);
        assert_eq!(moderate.impact_percent, None);

        let heavy = &report.buckets[3];
        assert_eq!(heavy.avg_revenue, 300.0);
        assert_eq!(heavy.avg_services, 2.0);
        assert_eq!(heavy.impact_percent, Some(200.0));

        assert!(report.correlation > 0.9);
    }

    #[test]
    fn test_empty_inputs() {
        let report = calculate_weather_impact(&[], &[]);
        assert_eq!(report.days_analyzed, 0);
        assert_eq!(report.correlation, 0.0);
        assert!(report.buckets.iter().all(|b| b.days == 0 && b.impact_percent.is_none()));
    }
}
