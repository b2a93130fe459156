// Application state for HTTP handlers
use crate::application::pages::{MlPage, OverviewPage};
use crate::application::poller::Poller;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub overview: Arc<Poller<OverviewPage>>,
    pub ml: Arc<Poller<MlPage>>,
}

impl AppState {
    pub fn start_all(&self) {
        self.overview.start();
        self.ml.start();
    }

    pub async fn shutdown_all(&self) {
        self.overview.shutdown().await;
        self.ml.shutdown().await;
    }
}
