// Chart-ready view models served to the dashboard client
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiCards {
    pub revenue_total: f64,
    pub order_count: u64,
    pub average_basket: f64,
    pub unique_customers: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub return_rate: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductBar {
    pub stock_code: String,
    pub description: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoyaltySlice {
    pub name: String,
    pub percentage: f64,
    pub count: u64,
}

/// One row of the country ranking, scaled against the leading country.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryBar {
    pub country: String,
    pub revenue: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub orders: Option<u64>,
    pub percent_of_leader: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastComparison {
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simple: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xgboost: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SegmentProfile {
    pub segment: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recency_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub monetary_mean: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverviewView {
    pub kpis: KpiCards,
    pub monthly_revenue: Vec<LabeledValue>,
    pub top_products: Vec<ProductBar>,
    pub loyalty: Vec<LoyaltySlice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_clients: Option<u64>,
    pub countries: Vec<CountryBar>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MlView {
    pub segment_shares: Vec<LabeledValue>,
    pub segment_profiles: Vec<SegmentProfile>,
    pub forecast_comparison: Vec<ForecastComparison>,
}
