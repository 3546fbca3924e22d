use std::time::Duration;

use crate::retry::RetryConfig;
use crate::throttling::RequestQuota;

pub const DEFAULT_ENDPOINT: &str = "https://www.alphavantage.co/query";

pub const ENV_API_KEY: &str = "CHARTDECK_ALPHAVANTAGE_API_KEY";
pub const ENV_ENDPOINT: &str = "CHARTDECK_ALPHAVANTAGE_ENDPOINT";
pub const ENV_TIMEOUT_MS: &str = "CHARTDECK_REQUEST_TIMEOUT_MS";
pub const ENV_MAX_RETRIES: &str = "CHARTDECK_MAX_RETRIES";

/// Settings for [`crate::AlphaVantageSource`].
#[derive(Clone, PartialEq)]
pub struct ClientConfig {
    pub endpoint: String,
    pub api_key: String,
    /// Upper bound on a single request, including the response body.
    pub timeout: Duration,
    pub retry: RetryConfig,
    /// `None` disables client-side throttling.
    pub quota: Option<RequestQuota>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            endpoint: String::from(DEFAULT_ENDPOINT),
            api_key: String::from("demo"),
            timeout: Duration::from_secs(10),
            retry: RetryConfig::default(),
            quota: Some(RequestQuota::per_minute(5)),
        }
    }
}

impl ClientConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup. Unset or unparsable
    /// values keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(api_key) = lookup(ENV_API_KEY).filter(|value| !value.trim().is_empty()) {
            config.api_key = api_key.trim().to_owned();
        }

        if let Some(endpoint) = lookup(ENV_ENDPOINT).filter(|value| !value.trim().is_empty()) {
            config.endpoint = endpoint.trim().trim_end_matches('?').to_owned();
        }

        if let Some(timeout_ms) = parse_var::<u64>(&lookup, ENV_TIMEOUT_MS).filter(|ms| *ms > 0) {
            config.timeout = Duration::from_millis(timeout_ms);
        }

        if let Some(max_retries) = parse_var::<u32>(&lookup, ENV_MAX_RETRIES) {
            config.retry.max_retries = max_retries;
            config.retry.enabled = max_retries > 0;
        }

        config
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_quota(mut self, quota: Option<RequestQuota>) -> Self {
        self.quota = quota;
        self
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(variable = key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}

// Keeps the API key out of debug output.
impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .field("retry", &self.retry)
            .field("quota", &self.quota)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect::<HashMap<_, _>>();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn defaults_match_free_tier() {
        let config = ClientConfig::from_lookup(lookup(&[]));

        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.api_key, "demo");
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.quota, Some(RequestQuota::per_minute(5)));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[
            (ENV_API_KEY, " secret "),
            (ENV_ENDPOINT, "http://localhost:9000/query"),
            (ENV_TIMEOUT_MS, "2500"),
            (ENV_MAX_RETRIES, "0"),
        ]));

        assert_eq!(config.api_key, "secret");
        assert_eq!(config.endpoint, "http://localhost:9000/query");
        assert_eq!(config.timeout, Duration::from_millis(2500));
        assert!(!config.retry.enabled);
    }

    #[test]
    fn unparsable_values_keep_defaults() {
        let config = ClientConfig::from_lookup(lookup(&[(ENV_TIMEOUT_MS, "soon")]));
        assert_eq!(config.timeout, Duration::from_secs(10));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = ClientConfig::default().with_api_key("top-secret");
        assert!(!format!("{config:?}").contains("top-secret"));
    }
}
