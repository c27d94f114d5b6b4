//! Graphite backend: fetches a metric over a window from the render API and
//! reduces the returned series into good/bad event counts.

pub mod backend;
pub mod client;
pub mod counting;

pub use backend::{GraphiteBackend, MetricsQuery};
pub use client::{format_graphite_time, GraphiteClient, HttpMethod};
pub use counting::{count, count_threshold};

// Re-export commonly used types
pub use slo_core::{BucketCounts, EventSum, SloError, NO_DATA};
