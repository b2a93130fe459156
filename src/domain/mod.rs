// Domain layer - endpoint descriptors, response schemas, snapshots and view models
pub mod analytics;
pub mod endpoint;
pub mod snapshot;
pub mod view;
