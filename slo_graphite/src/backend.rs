use crate::client::GraphiteClient;
use crate::counting::{count, count_threshold};
use async_trait::async_trait;
use serde_json::Value;
use slo_config::SloConfig;
use slo_core::{BucketCounts, EventSum, Result, SloError};
use tracing::{debug, info};

/// Source of render responses for a metric over `[start, end]`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetricsQuery: Send + Sync {
    async fn query(&self, start: i64, end: i64, metric: &str) -> Result<Value>;
}

#[async_trait]
impl MetricsQuery for GraphiteClient {
    async fn query(&self, start: i64, end: i64, metric: &str) -> Result<Value> {
        self.render(start, end, metric).await
    }
}

pub struct GraphiteBackend<Q = GraphiteClient> {
    client: Q,
}

impl GraphiteBackend<GraphiteClient> {
    pub fn from_config(config: &SloConfig) -> Result<Self> {
        Ok(Self::new(GraphiteClient::from_config(&config.backend)?))
    }
}

impl<Q: MetricsQuery> GraphiteBackend<Q> {
    pub fn new(client: Q) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Q {
        &self.client
    }

    /// Fetches the window ending at `timestamp` and reduces it to good/bad
    /// counts around the configured threshold.
    ///
    /// Transport failures are returned as errors; an unusable response is
    /// `Ok(BucketCounts::NoData)`.
    pub async fn threshold(
        &self,
        timestamp: i64,
        window: i64,
        slo_config: &SloConfig,
    ) -> Result<BucketCounts> {
        let measurement = &slo_config.backend.measurement;
        let response = self.query(timestamp, window, &measurement.metric).await?;

        let counts = count_threshold(
            &response,
            measurement.threshold,
            measurement.good_below_threshold,
        );

        info!(
            "SLO '{}': {:?} (threshold {}, good below: {})",
            slo_config.display_name(),
            counts,
            measurement.threshold,
            measurement.good_below_threshold
        );

        Ok(counts)
    }

    /// Same window as [`threshold`](Self::threshold), summed as a counter.
    pub async fn count_events(
        &self,
        timestamp: i64,
        window: i64,
        slo_config: &SloConfig,
    ) -> Result<EventSum> {
        let metric = &slo_config.backend.measurement.metric;
        let response = self.query(timestamp, window, metric).await?;
        let sum = count(&response);

        info!("SLO '{}': {:?}", slo_config.display_name(), sum);

        Ok(sum)
    }

    async fn query(&self, timestamp: i64, window: i64, metric: &str) -> Result<Value> {
        let start = timestamp.checked_sub(window).ok_or_else(|| {
            SloError::Other(anyhow::anyhow!(
                "Window of {}s before {} is out of range",
                window,
                timestamp
            ))
        })?;
        let end = timestamp;
        let response = self.client.query(start, end, metric).await?;
        debug!("Result valid: {}", response);
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::{always, eq};
    use serde_json::json;

    fn config(good_below_threshold: bool) -> SloConfig {
        SloConfig::builder()
            .api_url("http://g")
            .metric("a.b.c")
            .threshold(50.0)
            .good_below_threshold(good_below_threshold)
            .build()
    }

    fn samples() -> Value {
        json!([{
            "target": "a.b.c",
            "datapoints": [[10.0, 1000], [null, 1300], [60.0, 1600], [50.0, 1900]]
        }])
    }

    #[tokio::test]
    async fn test_threshold_queries_window() {
        let mut query = MockMetricsQuery::new();
        query
            .expect_query()
            .with(eq(1612254300i64), eq(1612257900i64), eq("a.b.c"))
            .times(1)
            .returning(|_, _, _| Ok(samples()));

        let backend = GraphiteBackend::new(query);
        let counts = backend
            .threshold(1612257900, 3600, &config(true))
            .await
            .unwrap();

        assert_eq!(counts, BucketCounts::new(2, 1));
    }

    #[tokio::test]
    async fn test_threshold_good_above() {
        let mut query = MockMetricsQuery::new();
        query
            .expect_query()
            .returning(|_, _, _| Ok(samples()));

        let backend = GraphiteBackend::new(query);
        let counts = backend.threshold(2000, 1000, &config(false)).await.unwrap();

        assert_eq!(counts, BucketCounts::new(1, 2));
        assert_eq!(counts.contract_pair(), (1, 2));
    }

    #[tokio::test]
    async fn test_threshold_empty_response_is_no_data() {
        let mut query = MockMetricsQuery::new();
        query.expect_query().returning(|_, _, _| Ok(json!([])));

        let backend = GraphiteBackend::new(query);
        let counts = backend.threshold(2000, 1000, &config(true)).await.unwrap();

        assert_eq!(counts, BucketCounts::NoData);
        assert_eq!(counts.contract_pair(), (-1, -1));
    }

    #[tokio::test]
    async fn test_threshold_propagates_query_errors() {
        let mut query = MockMetricsQuery::new();
        query
            .expect_query()
            .with(always(), always(), always())
            .returning(|_, _, _| Err(SloError::Decode("<html>".to_string())));

        let backend = GraphiteBackend::new(query);
        let result = backend.threshold(2000, 1000, &config(true)).await;

        assert!(matches!(result, Err(SloError::Decode(_))));
    }

    #[tokio::test]
    async fn test_window_underflow_is_an_error() {
        let mut query = MockMetricsQuery::new();
        query.expect_query().times(0);

        let backend = GraphiteBackend::new(query);
        let result = backend.threshold(i64::MIN, 1, &config(true)).await;
        assert!(matches!(result, Err(SloError::Other(_))));

        let result = backend.count_events(i64::MIN, 60, &config(true)).await;
        assert!(matches!(result, Err(SloError::Other(_))));
    }

    #[tokio::test]
    async fn test_count_events() {
        let mut query = MockMetricsQuery::new();
        query.expect_query().returning(|_, _, _| {
            Ok(json!([{ "datapoints": [[5, 1], [-3, 2], [0, 3], [null, 4], [7, 5]] }]))
        });

        let backend = GraphiteBackend::new(query);
        let sum = backend.count_events(2000, 1000, &config(true)).await.unwrap();

        assert_eq!(sum, EventSum::Sum { total: 12.0 });
    }

    #[test]
    fn test_from_config() {
        let backend = GraphiteBackend::from_config(&config(true)).unwrap();
        assert_eq!(backend.client().base_url(), "http://g");
    }
}
