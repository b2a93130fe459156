// View binder - pure reshaping of decoded snapshots into chart models
use crate::domain::analytics::{
    CountryStat, ForecastPoint, KpiOverview, LoyaltyStats, OrderedMetrics, OrderedSeries, TopProduct,
};
use crate::domain::view::{
    CountryBar, ForecastComparison, KpiCards, LabeledValue, LoyaltySlice, ProductBar, SegmentProfile,
};
use crate::error::AttemptError;

const SEGMENT_COUNT_METRIC: &str = "Monetary_count";

pub fn kpi_cards(kpis: &KpiOverview) -> KpiCards {
    KpiCards {
        revenue_total: kpis.ca_total,
        order_count: kpis.nb_commandes,
        average_basket: kpis.panier_moyen,
        unique_customers: kpis.clients_uniques,
        return_rate: kpis.taux_retour,
    }
}

/// Category map to `{label, value}` pairs, in source key order.
pub fn labeled_values(series: &OrderedSeries) -> Vec<LabeledValue> {
    series
        .0
        .iter()
        .map(|(label, value)| LabeledValue {
            label: label.clone(),
            value: *value,
        })
        .collect()
}

pub fn product_bars(products: &[TopProduct]) -> Vec<ProductBar> {
    products
        .iter()
        .map(|p| ProductBar {
            stock_code: p.stock_code.clone(),
            description: p.description.trim().to_string(),
            revenue: p.total_price,
        })
        .collect()
}

pub fn loyalty_slices(loyalty: &LoyaltyStats) -> Vec<LoyaltySlice> {
    loyalty
        .segments
        .iter()
        .map(|s| LoyaltySlice {
            name: s.name.clone(),
            percentage: s.percentage,
            count: s.count,
        })
        .collect()
}

/// Country ranking scaled as a percentage of the top revenue.
///
/// The basis is computed once so every bar in a bind shares the same scale.
pub fn country_bars(countries: &[CountryStat]) -> Vec<CountryBar> {
    let basis = countries
        .iter()
        .map(|c| c.revenue)
        .fold(f64::NEG_INFINITY, f64::max);

    countries
        .iter()
        .map(|c| CountryBar {
            country: c.country.clone(),
            revenue: c.revenue,
            orders: c.orders,
            percent_of_leader: relative_to(c.revenue, basis),
        })
        .collect()
}

fn relative_to(value: f64, basis: f64) -> f64 {
    if basis.is_finite() && basis > 0.0 {
        value / basis * 100.0
    } else {
        0.0
    }
}

/// Pair two forecast runs by position. The shorter side leaves its value absent.
pub fn zip_forecasts(simple: &[ForecastPoint], xgboost: &[ForecastPoint]) -> Vec<ForecastComparison> {
    let len = simple.len().max(xgboost.len());

    (0..len)
        .map(|i| {
            let a = simple.get(i);
            let b = xgboost.get(i);
            ForecastComparison {
                // One of the two is always present for i < len.
                date: a.or(b).map(|p| p.date.clone()).unwrap_or_default(),
                simple: a.map(|p| p.prediction),
                xgboost: b.map(|p| p.prediction),
            }
        })
        .collect()
}

/// Customer count per RFM segment, labelled `Segment <id>`.
pub fn segment_shares(summary: &OrderedMetrics) -> Result<Vec<LabeledValue>, AttemptError> {
    let counts = summary.metric(SEGMENT_COUNT_METRIC).ok_or_else(|| {
        AttemptError::malformed("segments", format!("summary has no {}", SEGMENT_COUNT_METRIC))
    })?;

    Ok(counts
        .0
        .iter()
        .map(|(segment, count)| LabeledValue {
            label: format!("Segment {}", segment),
            value: *count,
        })
        .collect())
}

/// One row per segment, in order of first appearance across metrics.
pub fn segment_profiles(summary: &OrderedMetrics) -> Vec<SegmentProfile> {
    let mut segments: Vec<&str> = Vec::new();
    for (_, series) in &summary.0 {
        for (segment, _) in &series.0 {
            if !segments.contains(&segment.as_str()) {
                segments.push(segment);
            }
        }
    }

    let lookup = |metric: &str, segment: &str| summary.metric(metric).and_then(|s| s.get(segment));

    segments
        .into_iter()
        .map(|segment| SegmentProfile {
            segment: segment.to_string(),
            recency_mean: lookup("Recency_mean", segment),
            frequency_mean: lookup("Frequency_mean", segment),
            monetary_mean: lookup("Monetary_mean", segment),
            count: lookup(SEGMENT_COUNT_METRIC, segment),
        })
        .collect()
}
