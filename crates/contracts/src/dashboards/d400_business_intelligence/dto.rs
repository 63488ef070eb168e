use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// GET /api/d400/profitability?year=2025&month=3
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthRequest {
    pub year: i32,
    pub month: u32,
}

/// GET /api/d400/weather?date_from=2025-01-01&date_to=2025-03-31
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DateRangeRequest {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
}

/// GET /api/d400/growth?months=6
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthRequest {
    #[serde(default = "default_growth_months")]
    pub months: u32,
}

fn default_growth_months() -> u32 {
    6
}

// ---------------------------------------------------------------------------
// Profitability
// ---------------------------------------------------------------------------

/// Monthly profitability: revenue minus prorated fixed/maintenance costs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfitabilityReport {
    /// Period in format "YYYY-MM"
    pub period: String,
    pub revenue: f64,
    /// Cashback issued in the period; a liability, not deducted from revenue
    pub cashback_liability: f64,
    pub services: u32,
    pub fixed_costs: f64,
    pub maintenance_costs: f64,
    pub variable_costs: f64,
    pub total_costs: f64,
    pub profit: f64,
    pub margin_percent: f64,
    pub avg_revenue_per_service: f64,
    pub break_even_revenue: f64,
    /// `None` when there is no revenue per service to divide by
    pub break_even_services: Option<u32>,
    pub break_even_progress_percent: f64,
    /// `true` when costs were prorated for a month still in progress
    pub prorated: bool,
    pub days_elapsed: u32,
    pub days_in_month: u32,
}

// ---------------------------------------------------------------------------
// Weather impact
// ---------------------------------------------------------------------------

/// Daily weather observation (table `weather_daily`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherDay {
    pub date: NaiveDate,
    #[serde(default)]
    pub precipitation_mm: f64,
    #[serde(default)]
    pub temp_max: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrecipitationBucket {
    Dry,
    Light,
    Moderate,
    Heavy,
}

impl PrecipitationBucket {
    pub const ALL: [PrecipitationBucket; 4] = [
        PrecipitationBucket::Dry,
        PrecipitationBucket::Light,
        PrecipitationBucket::Moderate,
        PrecipitationBucket::Heavy,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            PrecipitationBucket::Dry => "Sem chuva",
            PrecipitationBucket::Light => "Chuva fraca",
            PrecipitationBucket::Moderate => "Chuva moderada",
            PrecipitationBucket::Heavy => "Chuva forte",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherBucketStats {
    pub bucket: PrecipitationBucket,
    pub label: String,
    pub days: u32,
    pub avg_revenue: f64,
    pub avg_services: f64,
    /// Difference of average revenue vs dry days, percent (`None` without dry days)
    pub impact_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherImpactReport {
    pub days_analyzed: u32,
    pub buckets: Vec<WeatherBucketStats>,
    /// Pearson correlation between daily precipitation and daily revenue
    pub correlation: f64,
}

// ---------------------------------------------------------------------------
// Campaign ROI
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CampaignRoiStatus {
    NoData,
    Excellent,
    Good,
    Marginal,
    Negative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignRoiReport {
    pub campaign_id: String,
    pub coupon_code: String,
    pub redemptions: u32,
    /// Redemptions / cap, `None` when the campaign has no cap
    pub redemption_rate: Option<f64>,
    pub cap_reached: bool,
    pub discount_cost: f64,
    pub actual_revenue: f64,
    pub baseline_revenue: f64,
    pub incremental_revenue: f64,
    pub roi: f64,
    pub status: CampaignRoiStatus,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Growth trend
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Growing,
    Declining,
    Stable,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyRevenue {
    /// "YYYY-MM"
    pub period: String,
    pub revenue: f64,
    pub services: u32,
    /// Month-over-month change, percent (`None` for the first month or zero base)
    pub growth_percent: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthTrendReport {
    pub months: Vec<MonthlyRevenue>,
    pub latest_growth_percent: Option<f64>,
    pub avg_growth_percent: f64,
    /// Least-squares slope, revenue per month
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
    pub trend: TrendDirection,
}

// ---------------------------------------------------------------------------
// Health score
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreInputs {
    pub avg_growth_percent: f64,
    /// Share of retained customers, 0..1
    pub retention_rate: f64,
    pub margin_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthGrade {
    Excellent,
    Good,
    Attention,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthScoreReport {
    pub score: f64,
    pub grade: HealthGrade,
    pub growth_score: f64,
    pub retention_score: f64,
    pub profitability_score: f64,
    pub inputs: HealthScoreInputs,
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperationsSummary {
    pub transactions: u32,
    pub revenue: f64,
    pub wash_count: u32,
    pub dry_count: u32,
    pub total_services: u32,
    pub recharge_count: u32,
    pub wallet_purchase_count: u32,
    pub coupon_count: u32,
    pub avg_ticket: f64,
    /// 0 = Monday .. 6 = Sunday
    pub busiest_weekday: Option<u32>,
    pub busiest_hour: Option<u32>,
}
