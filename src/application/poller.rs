// Page poller - fetches a page's endpoint set on a fixed interval until a
// bundle passes readiness, then installs it once and stops.
use crate::application::analytics_source::AnalyticsSource;
use crate::application::pages::Page;
use crate::domain::snapshot::{RawResponseBundle, Snapshot};
use crate::error::AttemptError;
use futures::future::join_all;
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, instrument, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PollStatus {
    Idle,
    Loading,
    Ready,
    Stopped,
    Exhausted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollSettings {
    pub interval: Duration,
    /// `None` retries forever.
    pub max_attempts: Option<u32>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(5000),
            max_attempts: None,
        }
    }
}

/// Point-in-time view of a poller.
#[derive(Debug)]
pub struct PageReport<V> {
    pub page: &'static str,
    pub status: PollStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub snapshot: Option<Arc<Snapshot<V>>>,
}

struct PageState<V> {
    status: PollStatus,
    attempts: u32,
    last_error: Option<String>,
    snapshot: Option<Arc<Snapshot<V>>>,
}

struct Shared<P: Page> {
    page: P,
    source: Arc<dyn AnalyticsSource>,
    settings: PollSettings,
    state: RwLock<PageState<P::View>>,
}

pub struct Poller<P: Page> {
    shared: Arc<Shared<P>>,
    cancel: watch::Sender<bool>,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<P: Page> Poller<P> {
    pub fn new(page: P, source: Arc<dyn AnalyticsSource>, settings: PollSettings) -> Self {
        let (cancel, _) = watch::channel(false);
        Self {
            shared: Arc::new(Shared {
                page,
                source,
                settings,
                state: RwLock::new(PageState {
                    status: PollStatus::Idle,
                    attempts: 0,
                    last_error: None,
                    snapshot: None,
                }),
            }),
            cancel,
            task: Mutex::new(None),
        }
    }

    /// Issue the first attempt now and keep polling on the configured interval.
    /// Only an idle poller starts; later calls are no-ops.
    pub fn start(&self) {
        {
            let mut state = self.shared.write_state();
            if state.status != PollStatus::Idle {
                debug!(page = self.shared.page.name(), status = ?state.status, "poller already started");
                return;
            }
            state.status = PollStatus::Loading;
        }

        let handle = tokio::spawn(run(self.shared.clone(), self.cancel.subscribe()));
        *self.task.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
    }

    /// Cancel the pending tick and discard any in-flight attempt. Idempotent.
    pub fn stop(&self) {
        self.cancel.send_replace(true);

        let mut state = self.shared.write_state();
        if matches!(state.status, PollStatus::Idle | PollStatus::Loading) {
            state.status = PollStatus::Stopped;
            debug!(page = self.shared.page.name(), "poller stopped");
        }
    }

    /// Stop and wait for the loop task to wind down.
    pub async fn shutdown(&self) {
        self.stop();
        let handle = self.task.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(page = self.shared.page.name(), error = %e, "poller task ended abnormally");
            }
        }
    }

    pub fn report(&self) -> PageReport<P::View> {
        let state = self.shared.read_state();
        PageReport {
            page: self.shared.page.name(),
            status: state.status,
            attempts: state.attempts,
            last_error: state.last_error.clone(),
            snapshot: state.snapshot.clone(),
        }
    }
}

#[cfg(test)]
impl<P: Page> Poller<P> {
    pub fn snapshot(&self) -> Option<Arc<Snapshot<P::View>>> {
        self.shared.read_state().snapshot.clone()
    }

    pub fn status(&self) -> PollStatus {
        self.shared.read_state().status
    }
}

impl<P: Page> Drop for Poller<P> {
    fn drop(&mut self) {
        self.cancel.send_replace(true);
    }
}

impl<P: Page> Shared<P> {
    fn read_state(&self) -> std::sync::RwLockReadGuard<'_, PageState<P::View>> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, PageState<P::View>> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Fetch every endpoint concurrently, then validate and bind.
    async fn attempt(&self) -> Result<P::View, AttemptError> {
        let endpoints = self.page.endpoints();
        let results = join_all(endpoints.iter().map(|endpoint| async move {
            (endpoint.name, self.source.fetch(endpoint).await)
        }))
        .await;

        let mut bundle = RawResponseBundle::new();
        for (name, result) in results {
            match result {
                Ok(body) => bundle.insert(name, body),
                Err(e) => bundle.record_failure(name, e.to_string()),
            }
        }

        if !bundle.failures().is_empty() {
            return Err(AttemptError::Transport(
                bundle
                    .failures()
                    .iter()
                    .map(|(name, reason)| format!("{}: {}", name, reason))
                    .collect(),
            ));
        }

        self.page
            .validator()
            .validate(&bundle)
            .map_err(|rejection| AttemptError::NotReady(rejection.to_string()))?;

        self.page.bind(&bundle)
    }

    /// Install the first accepted view. Returns false when the poller was
    /// cancelled meanwhile or a snapshot is already in place.
    fn install(&self, view: P::View, attempts: u32, cancel: &watch::Receiver<bool>) -> bool {
        let mut state = self.write_state();
        if *cancel.borrow() || state.snapshot.is_some() {
            return false;
        }
        state.snapshot = Some(Arc::new(Snapshot::new(view, attempts)));
        state.status = PollStatus::Ready;
        state.last_error = None;
        true
    }

    fn begin_attempt(&self, attempt: u32) {
        self.write_state().attempts = attempt;
    }

    fn record_failure(&self, error: &AttemptError) {
        self.write_state().last_error = Some(error.to_string());
    }

    fn exhaust(&self) {
        let mut state = self.write_state();
        if state.status == PollStatus::Loading {
            state.status = PollStatus::Exhausted;
        }
    }
}

#[instrument(skip_all, fields(page = shared.page.name()))]
async fn run<P: Page>(shared: Arc<Shared<P>>, mut cancel: watch::Receiver<bool>) {
    let mut ticker = tokio::time::interval(shared.settings.interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut attempt: u32 = 0;

    loop {
        if *cancel.borrow() {
            break;
        }

        // A closed channel means the poller was dropped; treat it as a stop.
        tokio::select! {
            biased;
            _ = cancel.changed() => break,
            _ = ticker.tick() => {}
        }

        attempt = attempt.saturating_add(1);
        shared.begin_attempt(attempt);

        let outcome = tokio::select! {
            biased;
            _ = cancel.changed() => {
                debug!(attempt, "stopped during attempt, discarding in-flight result");
                break;
            }
            outcome = shared.attempt() => outcome,
        };

        match outcome {
            Ok(view) => {
                if shared.install(view, attempt, &cancel) {
                    info!(attempt, "snapshot ready");
                } else {
                    debug!(attempt, "snapshot discarded");
                }
                break;
            }
            Err(e) if e.is_expected() => {
                debug!(attempt, error = %e, "waiting for data");
                shared.record_failure(&e);
            }
            Err(e) => {
                warn!(attempt, error = %e, "unusable payload, retrying");
                shared.record_failure(&e);
            }
        }

        if let Some(max) = shared.settings.max_attempts {
            if attempt >= max {
                warn!(attempt, "giving up after max attempts");
                shared.exhaust();
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::pages::fixtures::ready_overview_bundle;
    use crate::application::pages::OverviewPage;
    use crate::domain::endpoint::EndpointDescriptor;
    use crate::error::SourceError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const ENDPOINTS: usize = 5;

    /// Serves the ready overview bundle, except that KPIs stay empty for the
    /// first `warmup` attempts, `failing` always answers 503 and `garbled`
    /// sends a wrong-shape body for its first N attempts.
    struct ScriptedSource {
        bundle: RawResponseBundle,
        warmup: usize,
        failing: Option<&'static str>,
        garbled: Option<(&'static str, usize)>,
        delay: Duration,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(warmup: usize) -> Self {
            Self {
                bundle: ready_overview_bundle(),
                warmup,
                failing: None,
                garbled: None,
                delay: Duration::from_millis(100),
                calls: AtomicUsize::new(0),
                in_flight: AtomicUsize::new(0),
                max_in_flight: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl AnalyticsSource for ScriptedSource {
        async fn fetch(&self, endpoint: &EndpointDescriptor) -> Result<Value, SourceError> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            let attempt = call / ENDPOINTS + 1;

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.failing == Some(endpoint.name) {
                return Err(SourceError::Status {
                    status: 503,
                    body: "loading".to_string(),
                });
            }
            if let Some((name, until)) = self.garbled {
                if endpoint.name == name && attempt <= until {
                    return Ok(json!({"bad": true}));
                }
            }
            if endpoint.name == OverviewPage::KPIS && attempt <= self.warmup {
                return Ok(json!({}));
            }
            Ok(self.bundle.get(endpoint.name).cloned().unwrap_or(Value::Null))
        }
    }

    fn poller(source: Arc<ScriptedSource>, settings: PollSettings) -> Poller<OverviewPage> {
        Poller::new(OverviewPage::new(6), source, settings)
    }

    async fn wait_for(poller: &Poller<OverviewPage>, status: PollStatus) {
        for _ in 0..120 {
            if poller.status() == status {
                return;
            }
            tokio::time::sleep(Duration::from_millis(500)).await;
        }
        panic!("poller never reached {:?}, still {:?}", status, poller.status());
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_after_first_ready_snapshot() {
        let source = Arc::new(ScriptedSource::new(2));
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        wait_for(&poller, PollStatus::Ready).await;

        let report = poller.report();
        assert_eq!(report.attempts, 3);
        assert!(report.last_error.is_none());
        let snapshot = report.snapshot.unwrap();
        assert_eq!(snapshot.attempts, 3);
        assert_eq!(snapshot.view.kpis.revenue_total, 1000.0);

        let calls = source.calls();
        assert_eq!(calls, 3 * ENDPOINTS);
        tokio::time::sleep(Duration::from_secs(60)).await;
        assert_eq!(source.calls(), calls, "no attempts after success");
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_kpis_keep_loading() {
        let source = Arc::new(ScriptedSource::new(usize::MAX));
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        tokio::time::sleep(Duration::from_secs(21)).await;

        let report = poller.report();
        assert_eq!(report.status, PollStatus::Loading);
        assert!(report.snapshot.is_none());
        assert!(report.attempts >= 4);
        assert_eq!(report.last_error.as_deref(), Some("not ready: kpis is empty"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_fails_whole_attempt() {
        let mut source = ScriptedSource::new(0);
        source.failing = Some(OverviewPage::COUNTRIES);
        let source = Arc::new(source);
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        tokio::time::sleep(Duration::from_secs(11)).await;

        let report = poller.report();
        assert!(report.snapshot.is_none());
        assert_eq!(report.status, PollStatus::Loading);
        assert!(report.last_error.unwrap().starts_with("transport failure: countries"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_malformed_payload_retried_until_valid() {
        let mut source = ScriptedSource::new(0);
        source.garbled = Some((OverviewPage::COUNTRIES, 1));
        let source = Arc::new(source);
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let report = poller.report();
        assert_eq!(report.status, PollStatus::Loading);
        assert!(report.snapshot.is_none());
        let error = report.last_error.unwrap();
        assert!(
            error.starts_with("malformed payload from countries"),
            "unexpected error: {}",
            error
        );

        wait_for(&poller, PollStatus::Ready).await;
        let report = poller.report();
        assert_eq!(report.attempts, 2);
        assert_eq!(report.snapshot.unwrap().attempts, 2);
        assert_eq!(source.calls(), 2 * ENDPOINTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempts_never_overlap() {
        let mut source = ScriptedSource::new(usize::MAX);
        source.delay = Duration::from_secs(7);
        let source = Arc::new(source);
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        tokio::time::sleep(Duration::from_secs(40)).await;
        poller.stop();

        assert!(source.calls() >= 2 * ENDPOINTS);
        assert_eq!(source.max_in_flight.load(Ordering::SeqCst), ENDPOINTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_mid_attempt_discards_result() {
        let mut source = ScriptedSource::new(0);
        source.delay = Duration::from_secs(2);
        let source = Arc::new(source);
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        tokio::time::sleep(Duration::from_secs(1)).await;
        poller.stop();
        tokio::time::sleep(Duration::from_secs(30)).await;

        assert_eq!(poller.status(), PollStatus::Stopped);
        assert!(poller.snapshot().is_none());
        assert_eq!(source.calls(), ENDPOINTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_attempts_ceiling() {
        let source = Arc::new(ScriptedSource::new(usize::MAX));
        let settings = PollSettings {
            interval: Duration::from_secs(1),
            max_attempts: Some(3),
        };
        let poller = poller(source.clone(), settings);

        poller.start();
        wait_for(&poller, PollStatus::Exhausted).await;
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(poller.report().attempts, 3);
        assert_eq!(source.calls(), 3 * ENDPOINTS);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_is_idempotent_and_start_after_stop_is_noop() {
        let source = Arc::new(ScriptedSource::new(0));
        let poller = poller(source.clone(), PollSettings::default());

        poller.stop();
        poller.stop();
        poller.start();
        tokio::time::sleep(Duration::from_secs(10)).await;

        assert_eq!(poller.status(), PollStatus::Stopped);
        assert_eq!(source.calls(), 0);
        poller.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_after_ready_keeps_snapshot() {
        let source = Arc::new(ScriptedSource::new(0));
        let poller = poller(source.clone(), PollSettings::default());

        poller.start();
        wait_for(&poller, PollStatus::Ready).await;
        poller.shutdown().await;

        assert_eq!(poller.status(), PollStatus::Ready);
        assert!(poller.snapshot().is_some());
    }

    #[tokio::test]
    async fn test_install_happens_once() {
        let source = Arc::new(ScriptedSource::new(0));
        let poller = poller(source, PollSettings::default());
        let page = OverviewPage::new(6);
        let bundle = ready_overview_bundle();
        let (_tx, cancel) = watch::channel(false);

        let first = page.bind(&bundle).unwrap();
        let mut stale = page.bind(&bundle).unwrap();
        stale.kpis.revenue_total = 1.0;

        assert!(poller.shared.install(first, 1, &cancel));
        assert!(!poller.shared.install(stale, 2, &cancel));

        let snapshot = poller.snapshot().unwrap();
        assert_eq!(snapshot.attempts, 1);
        assert_eq!(snapshot.view.kpis.revenue_total, 1000.0);
    }
}
