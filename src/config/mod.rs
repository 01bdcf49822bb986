pub mod dashboard;

pub use dashboard::{DashboardConfig, Endpoints, HttpSettings, RequestDefaults};
