use reqwest::Url;
use serde::{Deserialize, Serialize};
use slo_core::{Result, SloError};
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "slo-generator";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SloConfig {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    pub backend: BackendConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    pub api_url: String,
    pub measurement: Measurement,
    #[serde(with = "humantime_serde", default = "default_timeout")]
    pub timeout: Duration,
    /// TLS certificates are not verified unless this is set.
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default)]
    pub timezone: Timezone,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub metric: String,
    pub threshold: f64,
    #[serde(default = "default_good_below_threshold")]
    pub good_below_threshold: bool,
}

/// Clock used to render `from`/`until` for the render API.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Timezone {
    #[default]
    Utc,
    Local,
}

/// TOML documents nest the config under a `[slo]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SloConfigFile {
    pub slo: SloConfig,
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_good_below_threshold() -> bool {
    true
}

impl SloConfig {
    pub fn builder() -> SloConfigBuilder {
        SloConfigBuilder::default()
    }

    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .unwrap_or(&self.backend.measurement.metric)
    }

    pub fn validate(&self) -> Result<()> {
        let backend = &self.backend;

        if backend.api_url.trim().is_empty() {
            return Err(SloError::InvalidConfig(
                "backend.api_url cannot be empty".to_string(),
            ));
        }

        let url = Url::parse(&backend.api_url).map_err(|e| {
            SloError::InvalidConfig(format!(
                "backend.api_url '{}' is not a valid URL: {}",
                backend.api_url, e
            ))
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(SloError::InvalidConfig(format!(
                "backend.api_url '{}' must use http or https",
                backend.api_url
            )));
        }

        if url.host_str().map_or(true, str::is_empty) {
            return Err(SloError::InvalidConfig(format!(
                "backend.api_url '{}' has no host",
                backend.api_url
            )));
        }

        if backend.measurement.metric.trim().is_empty() {
            return Err(SloError::InvalidConfig(
                "backend.measurement.metric cannot be empty".to_string(),
            ));
        }

        if !backend.measurement.threshold.is_finite() {
            return Err(SloError::InvalidConfig(format!(
                "backend.measurement.threshold must be finite, got {}",
                backend.measurement.threshold
            )));
        }

        if backend.timeout.is_zero() {
            return Err(SloError::InvalidConfig(
                "backend.timeout must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Default)]
pub struct SloConfigBuilder {
    name: Option<String>,
    description: Option<String>,
    api_url: Option<String>,
    metric: Option<String>,
    threshold: Option<f64>,
    good_below_threshold: Option<bool>,
    timeout: Option<Duration>,
    verify_tls: bool,
    user_agent: Option<String>,
    timezone: Timezone,
}

impl SloConfigBuilder {
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = Some(api_url.into());
        self
    }

    pub fn metric(mut self, metric: impl Into<String>) -> Self {
        self.metric = Some(metric.into());
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn good_below_threshold(mut self, good_below_threshold: bool) -> Self {
        self.good_below_threshold = Some(good_below_threshold);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn verify_tls(mut self, verify_tls: bool) -> Self {
        self.verify_tls = verify_tls;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }

    pub fn timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    pub fn build(self) -> SloConfig {
        SloConfig {
            name: self.name,
            description: self.description,
            backend: BackendConfig {
                api_url: self.api_url.unwrap_or_default(),
                measurement: Measurement {
                    metric: self.metric.unwrap_or_default(),
                    threshold: self.threshold.unwrap_or(0.0),
                    good_below_threshold: self.good_below_threshold.unwrap_or(true),
                },
                timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
                verify_tls: self.verify_tls,
                user_agent: self.user_agent.unwrap_or_else(default_user_agent),
                timezone: self.timezone,
            },
        }
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
