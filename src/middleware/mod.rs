/// Middleware module

mod request_metrics;

pub use request_metrics::RequestMetrics;
