// Analytics API response schemas
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KpiOverview {
    pub ca_total: f64,
    pub nb_commandes: u64,
    pub panier_moyen: f64,
    pub clients_uniques: u64,
    #[serde(default)]
    pub taux_retour: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TopProduct {
    #[serde(rename = "StockCode", deserialize_with = "string_or_number")]
    pub stock_code: String,
    #[serde(rename = "Description")]
    pub description: String,
    #[serde(rename = "TotalPrice")]
    pub total_price: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoyaltySegment {
    pub name: String,
    pub percentage: f64,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LoyaltyStats {
    pub segments: Vec<LoyaltySegment>,
    #[serde(default)]
    pub total_clients: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CountryStat {
    pub country: String,
    pub revenue: f64,
    #[serde(default)]
    pub orders: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ForecastPoint {
    pub date: String,
    pub prediction: f64,
}

/// RFM segmentation result. `summary` maps a metric such as `Monetary_count`
/// to a per-segment series.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SegmentSummary {
    pub summary: OrderedMetrics,
}

/// A JSON object of `label -> number`, decoded in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedSeries(pub Vec<(String, f64)>);

impl OrderedSeries {
    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.iter().find(|(l, _)| l == label).map(|(_, v)| *v)
    }
}

/// A JSON object of `metric -> OrderedSeries`, decoded in document order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedMetrics(pub Vec<(String, OrderedSeries)>);

impl OrderedMetrics {
    pub fn metric(&self, name: &str) -> Option<&OrderedSeries> {
        self.0.iter().find(|(m, _)| m == name).map(|(_, s)| s)
    }
}

struct OrderedMapVisitor<V>(std::marker::PhantomData<V>);

impl<'de, V: Deserialize<'de>> Visitor<'de> for OrderedMapVisitor<V> {
    type Value = Vec<(String, V)>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a JSON object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, value)) = map.next_entry::<String, V>()? {
            entries.push((key, value));
        }
        Ok(entries)
    }
}

impl<'de> Deserialize<'de> for OrderedSeries {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedMapVisitor(std::marker::PhantomData))
            .map(OrderedSeries)
    }
}

impl<'de> Deserialize<'de> for OrderedMetrics {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer
            .deserialize_map(OrderedMapVisitor(std::marker::PhantomData))
            .map(OrderedMetrics)
    }
}

// Stock codes come through pandas as either strings or integers.
fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
