// Dashboard pages - endpoint set, readiness and binding per page
use crate::application::validator::{Readiness, ReadinessRule, SnapshotValidator};
use crate::application::view_binder;
use crate::domain::analytics::{
    CountryStat, ForecastPoint, KpiOverview, LoyaltyStats, OrderedSeries, SegmentSummary, TopProduct,
};
use crate::domain::endpoint::{EndpointDescriptor, EndpointSet};
use crate::domain::snapshot::RawResponseBundle;
use crate::domain::view::{MlView, OverviewView};
use crate::error::AttemptError;
use serde::Serialize;

pub trait Page: Send + Sync + 'static {
    type View: Serialize + Send + Sync + 'static;

    fn name(&self) -> &'static str;

    fn endpoints(&self) -> &EndpointSet;

    fn validator(&self) -> &dyn SnapshotValidator;

    /// Decode an accepted bundle into typed schemas and shape it for display.
    /// Pure: no I/O, same bundle in gives an equal view out.
    fn bind(&self, bundle: &RawResponseBundle) -> Result<Self::View, AttemptError>;
}

pub struct OverviewPage {
    endpoints: EndpointSet,
    readiness: Readiness,
}

impl OverviewPage {
    pub const KPIS: &'static str = "kpis";
    pub const TOP_PRODUCTS: &'static str = "top_products";
    pub const TIMESERIES: &'static str = "timeseries";
    pub const LOYALTY: &'static str = "loyalty";
    pub const COUNTRIES: &'static str = "countries";

    pub fn new(country_limit: u32) -> Self {
        let endpoints = EndpointSet::new()
            .with(EndpointDescriptor::get(Self::KPIS, "/kpis/overview"))
            .with(EndpointDescriptor::get(Self::TOP_PRODUCTS, "/sales/top-products"))
            .with(EndpointDescriptor::get(Self::TIMESERIES, "/sales/timeseries"))
            .with(EndpointDescriptor::get(Self::LOYALTY, "/ml/loyalty"))
            .with(EndpointDescriptor::get(
                Self::COUNTRIES,
                format!("/stats/countries?limit={}", country_limit),
            ));

        let readiness = Readiness::new(endpoints.clone())
            .rule(ReadinessRule::NonEmptyObject(Self::KPIS))
            .rule(ReadinessRule::FieldPresent(Self::LOYALTY, "segments"));

        Self {
            endpoints,
            readiness,
        }
    }
}

impl Page for OverviewPage {
    type View = OverviewView;

    fn name(&self) -> &'static str {
        "overview"
    }

    fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    fn validator(&self) -> &dyn SnapshotValidator {
        &self.readiness
    }

    fn bind(&self, bundle: &RawResponseBundle) -> Result<OverviewView, AttemptError> {
        let kpis: KpiOverview = bundle.decode(Self::KPIS)?;
        let products: Vec<TopProduct> = bundle.decode(Self::TOP_PRODUCTS)?;
        let timeseries: OrderedSeries = bundle.decode(Self::TIMESERIES)?;
        let loyalty: LoyaltyStats = bundle.decode(Self::LOYALTY)?;
        let countries: Vec<CountryStat> = bundle.decode(Self::COUNTRIES)?;

        Ok(OverviewView {
            kpis: view_binder::kpi_cards(&kpis),
            monthly_revenue: view_binder::labeled_values(&timeseries),
            top_products: view_binder::product_bars(&products),
            loyalty: view_binder::loyalty_slices(&loyalty),
            total_clients: loyalty.total_clients,
            countries: view_binder::country_bars(&countries),
        })
    }
}

pub struct MlPage {
    endpoints: EndpointSet,
    readiness: Readiness,
}

impl MlPage {
    pub const SEGMENTS: &'static str = "segments";
    pub const FORECAST: &'static str = "forecast";
    pub const XGBOOST_FORECAST: &'static str = "xgboost_forecast";

    pub fn new() -> Self {
        let endpoints = EndpointSet::new()
            .with(EndpointDescriptor::get(Self::SEGMENTS, "/ml/segments/summary"))
            .with(EndpointDescriptor::get(Self::FORECAST, "/ml/predict/forecast"))
            .with(EndpointDescriptor::post(
                Self::XGBOOST_FORECAST,
                "/ml/predict/xgboost-forecast",
            ));

        let readiness = Readiness::new(endpoints.clone())
            .rule(ReadinessRule::NonEmptyMapField(Self::SEGMENTS, "summary"));

        Self {
            endpoints,
            readiness,
        }
    }
}

impl Default for MlPage {
    fn default() -> Self {
        Self::new()
    }
}

impl Page for MlPage {
    type View = MlView;

    fn name(&self) -> &'static str {
        "ml"
    }

    fn endpoints(&self) -> &EndpointSet {
        &self.endpoints
    }

    fn validator(&self) -> &dyn SnapshotValidator {
        &self.readiness
    }

    fn bind(&self, bundle: &RawResponseBundle) -> Result<MlView, AttemptError> {
        let segments: SegmentSummary = bundle.decode(Self::SEGMENTS)?;
        let forecast: Vec<ForecastPoint> = bundle.decode(Self::FORECAST)?;
        let xgboost: Vec<ForecastPoint> = bundle.decode(Self::XGBOOST_FORECAST)?;

        Ok(MlView {
            segment_shares: view_binder::segment_shares(&segments.summary)?,
            segment_profiles: view_binder::segment_profiles(&segments.summary),
            forecast_comparison: view_binder::zip_forecasts(&forecast, &xgboost),
        })
    }
}
