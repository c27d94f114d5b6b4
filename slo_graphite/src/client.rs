use chrono::{DateTime, Local, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde_json::Value;
use slo_config::{BackendConfig, Timezone};
use slo_core::{Result, SloError};
use std::fmt;
use std::time::Duration;
use tracing::{debug, info, warn};

/// `strftime` pattern accepted by Graphite for `from`/`until`.
pub const GRAPHITE_TIME_FORMAT: &str = "%H:%M_%Y%m%d";

const RENDER_ENDPOINT: &str = "render";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
        };
        f.write_str(name)
    }
}

/// Thin wrapper around a pooled `reqwest::Client` pointed at one Graphite API.
#[derive(Debug, Clone)]
pub struct GraphiteClient {
    client: reqwest::Client,
    url: String,
    timezone: Timezone,
}

impl GraphiteClient {
    /// Client with the same defaults an omitted config section would get.
    pub fn new(api_url: impl Into<String>) -> Result<Self> {
        Self::build(
            api_url.into(),
            slo_config::config::DEFAULT_TIMEOUT,
            false,
            slo_config::config::DEFAULT_USER_AGENT,
            Timezone::Utc,
        )
    }

    pub fn from_config(config: &BackendConfig) -> Result<Self> {
        Self::build(
            config.api_url.clone(),
            config.timeout,
            config.verify_tls,
            &config.user_agent,
            config.timezone,
        )
    }

    fn build(
        api_url: String,
        timeout: Duration,
        verify_tls: bool,
        user_agent: &str,
        timezone: Timezone,
    ) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if !verify_tls {
            warn!("TLS certificate verification is disabled for {}", api_url);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(user_agent)
            .timeout(timeout)
            .danger_accept_invalid_certs(!verify_tls)
            .build()?;

        Ok(Self {
            client,
            url: api_url.trim_end_matches('/').to_string(),
            timezone,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.url
    }

    /// Builds `{base}/{endpoint}?k=v&...`.
    ///
    /// Values go in verbatim: render targets such as `sumSeries(a.*.b)` must
    /// reach Graphite unencoded.
    pub fn endpoint_url(&self, endpoint: &str, params: &[(&str, String)]) -> String {
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");

        format!("{}/{}?{}", self.url, endpoint.trim_start_matches('/'), query)
    }

    pub fn render_url(&self, start: i64, end: i64, metric: &str) -> Result<String> {
        let params = [
            ("target", metric.to_string()),
            ("from", format_graphite_time(start, self.timezone)?),
            ("until", format_graphite_time(end, self.timezone)?),
            ("format", "json".to_string()),
        ];
        Ok(self.endpoint_url(RENDER_ENDPOINT, &params))
    }

    /// Sends one request and decodes the JSON body.
    ///
    /// Only `GET` is supported; write methods have no defined payload.
    pub async fn request(&self, method: HttpMethod, url: &str) -> Result<Value> {
        let request = match method {
            HttpMethod::Get => self.client.get(url),
            HttpMethod::Put | HttpMethod::Post => {
                return Err(SloError::UnsupportedMethod(method.to_string()));
            }
        };

        debug!("{} {}", method, url);

        let response = request.send().await?.error_for_status()?;
        let body = response.text().await?;

        let data: Value = serde_json::from_str(&body).map_err(|e| {
            SloError::Decode(format!("{} (body: {})", e, truncate(&body, 200)))
        })?;
        debug!("Response: {}", data);

        Ok(data)
    }

    /// Queries the render API for `metric` between two UNIX timestamps.
    pub async fn render(&self, start: i64, end: i64, metric: &str) -> Result<Value> {
        let url = self.render_url(start, end, metric)?;
        info!("Querying Graphite for '{}' from {} to {}", metric, start, end);
        self.request(HttpMethod::Get, &url).await
    }
}

/// Renders a UNIX timestamp as `HH:MM_YYYYMMDD`.
pub fn format_graphite_time(timestamp: i64, timezone: Timezone) -> Result<String> {
    let utc: DateTime<Utc> = DateTime::from_timestamp(timestamp, 0).ok_or_else(|| {
        SloError::Other(anyhow::anyhow!("Timestamp {} is out of range", timestamp))
    })?;

    let formatted = match timezone {
        Timezone::Utc => utc.format(GRAPHITE_TIME_FORMAT).to_string(),
        Timezone::Local => utc
            .with_timezone(&Local)
            .format(GRAPHITE_TIME_FORMAT)
            .to_string(),
    };

    Ok(formatted)
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
