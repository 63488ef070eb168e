use contracts::dashboards::d400_business_intelligence::dto::{
    HealthGrade, HealthScoreInputs, HealthScoreReport,
};

use super::round2;

const GROWTH_WEIGHT: f64 = 0.30;
const RETENTION_WEIGHT: f64 = 0.35;
const PROFITABILITY_WEIGHT: f64 = 0.35;

fn finite_or_zero(v: f64) -> f64 {
    if v.is_finite() {
        v
    } else {
        0.0
    }
}

fn clamp_score(v: f64) -> f64 {
    finite_or_zero(v).clamp(0.0, 100.0)
}

fn grade_for(score: f64) -> HealthGrade {
    if score >= 80.0 {
        HealthGrade::Excellent
    } else if score >= 60.0 {
        HealthGrade::Good
    } else if score >= 40.0 {
        HealthGrade::Attention
    } else {
        HealthGrade::Critical
    }
}

/// Композитный индекс здоровья бизнеса 0..100.
///
/// - рост: 0% в месяц = 50 баллов, каждые ±1% = ±5 баллов;
/// - удержание: доля активных клиентов × 100;
/// - прибыльность: маржа 40% и выше = 100 баллов, 0% и ниже = 0.
pub fn calculate_health_score(inputs: &HealthScoreInputs) -> HealthScoreReport {
    let growth_score = clamp_score(50.0 + finite_or_zero(inputs.avg_growth_percent) * 5.0);
    let retention_score = clamp_score(inputs.retention_rate * 100.0);
    let profitability_score = clamp_score(inputs.margin_percent * 2.5);

    let score = growth_score * GROWTH_WEIGHT
        + retention_score * RETENTION_WEIGHT
        + profitability_score * PROFITABILITY_WEIGHT;
    let score = (score * 10.0).round() / 10.0;

    HealthScoreReport {
        score,
        grade: grade_for(score),
        growth_score: round2(growth_score),
        retention_score: round2(retention_score),
        profitability_score: round2(profitability_score),
        inputs: inputs.clone(),
    }
}
