// Endpoint descriptors - the fixed request set a page issues on every attempt
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A single named request against the analytics API.
///
/// `path` is relative to the configured base URL and may carry a query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    pub method: Method,
    pub path: String,
}

impl EndpointDescriptor {
    pub fn get(name: &'static str, path: impl Into<String>) -> Self {
        Self {
            name,
            method: Method::Get,
            path: path.into(),
        }
    }

    pub fn post(name: &'static str, path: impl Into<String>) -> Self {
        Self {
            name,
            method: Method::Post,
            path: path.into(),
        }
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} ({})", self.method, self.path, self.name)
    }
}

/// Ordered set of descriptors fetched together. Names are unique.
#[derive(Debug, Clone, Default)]
pub struct EndpointSet {
    descriptors: Vec<EndpointDescriptor>,
}

impl EndpointSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a descriptor. A duplicate name is a wiring mistake: it is logged
    /// and replaces the earlier descriptor in place.
    pub fn with(mut self, descriptor: EndpointDescriptor) -> Self {
        match self.descriptors.iter_mut().find(|d| d.name == descriptor.name) {
            Some(existing) => {
                tracing::warn!(
                    endpoint = descriptor.name,
                    replaced = %existing.path,
                    path = %descriptor.path,
                    "duplicate endpoint name in set"
                );
                *existing = descriptor;
            }
            None => self.descriptors.push(descriptor),
        }
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &EndpointDescriptor> {
        self.descriptors.iter()
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.descriptors.iter().map(|d| d.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_keeps_insertion_order() {
        let set = EndpointSet::new()
            .with(EndpointDescriptor::get("kpis", "/kpis/overview"))
            .with(EndpointDescriptor::get("timeseries", "/sales/timeseries"))
            .with(EndpointDescriptor::post("xgboost_forecast", "/ml/predict/xgboost-forecast"));

        let names: Vec<_> = set.names().collect();
        assert_eq!(names, vec!["kpis", "timeseries", "xgboost_forecast"]);
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let set = EndpointSet::new()
            .with(EndpointDescriptor::get("countries", "/stats/countries?limit=6"))
            .with(EndpointDescriptor::get("kpis", "/kpis/overview"))
            .with(EndpointDescriptor::get("countries", "/stats/countries?limit=10"));

        assert_eq!(set.iter().count(), 2);
        let first = set.iter().next().unwrap();
        assert_eq!(first.name, "countries");
        assert_eq!(first.path, "/stats/countries?limit=10");
    }

    #[test]
    fn test_display() {
        let d = EndpointDescriptor::post("xgboost_forecast", "/ml/predict/xgboost-forecast");
        assert_eq!(d.to_string(), "POST /ml/predict/xgboost-forecast (xgboost_forecast)");
    }
}
