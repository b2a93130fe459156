// Application layer - pages, readiness, binding and polling
pub mod analytics_source;
pub mod pages;
pub mod poller;
pub mod validator;
pub mod view_binder;
