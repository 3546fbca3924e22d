//! Alpha Vantage market data source.
//!
//! One GET per symbol per [`ApiFunction`]. The source owns transport concerns
//! only: URL construction, request timeout, client-side throttling and
//! bounded retry of quota refusals. Payload shape checks live in
//! [`crate::normalize`].

use std::sync::Arc;

use serde_json::Value;

use crate::config::ClientConfig;
use crate::http_client::{HttpClient, HttpRequest, ReqwestHttpClient};
use crate::normalize::{normalize_daily_series, normalize_profile};
use crate::throttling::RequestThrottle;
use crate::{
    CompanyProfile, DailyBar, DashboardError, NetworkError, NetworkErrorKind, Symbol, WindowSize,
};

const QUOTA_NOTICE_KEYS: [&str; 2] = ["Note", "Information"];

/// Upstream query function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiFunction {
    Overview,
    TimeSeriesDaily,
}

impl ApiFunction {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Overview => "OVERVIEW",
            Self::TimeSeriesDaily => "TIME_SERIES_DAILY",
        }
    }
}

/// Fetches overview and daily-series payloads for single symbols.
#[derive(Clone)]
pub struct AlphaVantageSource {
    http_client: Arc<dyn HttpClient>,
    config: ClientConfig,
    throttle: Option<RequestThrottle>,
}

impl AlphaVantageSource {
    pub fn new(http_client: Arc<dyn HttpClient>, config: ClientConfig) -> Self {
        let throttle = config.quota.map(RequestThrottle::new);
        Self {
            http_client,
            config,
            throttle,
        }
    }

    /// Reqwest transport configured from `CHARTDECK_*` environment variables.
    pub fn from_env() -> Self {
        Self::new(Arc::new(ReqwestHttpClient::new()), ClientConfig::from_env())
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn request_url(&self, function: ApiFunction, symbol: &Symbol) -> String {
        let separator = if self.config.endpoint.contains('?') { '&' } else { '?' };
        let mut url = format!(
            "{}{separator}function={}&symbol={}",
            self.config.endpoint,
            function.as_str(),
            urlencoding::encode(symbol.as_str()),
        );
        if function == ApiFunction::TimeSeriesDaily {
            url.push_str("&outputsize=full");
        }
        url.push_str("&apikey=");
        url.push_str(&urlencoding::encode(&self.config.api_key));
        url
    }

    /// Fetches and normalizes a company overview.
    pub async fn fetch_profile(&self, symbol: &Symbol) -> Result<CompanyProfile, DashboardError> {
        let raw = self.fetch_raw(ApiFunction::Overview, symbol).await?;
        Ok(normalize_profile(symbol, &raw)?)
    }

    /// Fetches the full daily history and keeps the most recent `window` days.
    pub async fn fetch_daily_series(
        &self,
        symbol: &Symbol,
        window: WindowSize,
    ) -> Result<Vec<DailyBar>, DashboardError> {
        let raw = self.fetch_raw(ApiFunction::TimeSeriesDaily, symbol).await?;
        Ok(normalize_daily_series(&raw, window)?)
    }

    /// Returns the decoded JSON body, retrying quota refusals per the retry policy.
    pub async fn fetch_raw(
        &self,
        function: ApiFunction,
        symbol: &Symbol,
    ) -> Result<Value, NetworkError> {
        let url = self.request_url(function, symbol);
        let mut attempt = 0_u32;

        loop {
            match self.fetch_once(&url).await {
                Ok(body) => {
                    tracing::debug!(function = function.as_str(), %symbol, attempt, "fetch succeeded");
                    return Ok(body);
                }
                Err(error) if self.is_retry_candidate(&error) && self.config.retry.allows_retry(attempt) => {
                    let delay = self.config.retry.delay_for_attempt(attempt);
                    tracing::warn!(
                        function = function.as_str(),
                        %symbol,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "rate limited; retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(error) => {
                    tracing::warn!(function = function.as_str(), %symbol, attempt, error = %error, "fetch failed");
                    return Err(error);
                }
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Value, NetworkError> {
        if let Some(throttle) = &self.throttle {
            throttle.acquire().await;
        }

        let timeout = self.config.timeout;
        let request = HttpRequest::get(url)
            .with_header("accept", "application/json")
            .with_timeout(timeout);

        let response = match tokio::time::timeout(timeout, self.http_client.execute(request)).await {
            Err(_) => {
                return Err(NetworkError::timeout(format!(
                    "no response within {} ms",
                    timeout.as_millis()
                )))
            }
            Ok(Err(error)) if error.timed_out() => {
                return Err(NetworkError::timeout(error.message()))
            }
            Ok(Err(error)) => return Err(NetworkError::transport(error.message())),
            Ok(Ok(response)) => response,
        };

        if response.status == 429 {
            return Err(NetworkError::rate_limited("upstream returned status 429").with_status(429));
        }
        if !response.is_success() {
            return Err(NetworkError::status(response.status));
        }

        let body: Value = serde_json::from_str(&response.body)
            .map_err(|e| NetworkError::invalid_body(format!("response is not JSON: {e}")))?;

        if let Some(notice) = quota_notice(&body) {
            return Err(NetworkError::rate_limited(notice));
        }

        Ok(body)
    }

    fn is_retry_candidate(&self, error: &NetworkError) -> bool {
        match error.http_status() {
            Some(status) => self.config.retry.should_retry_status(status),
            None => {
                error.kind() == NetworkErrorKind::RateLimited && self.config.retry.retry_on_quota_notice
            }
        }
    }
}

impl std::fmt::Debug for AlphaVantageSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlphaVantageSource")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// A body made only of `Note`/`Information` text is a quota refusal.
fn quota_notice(body: &Value) -> Option<String> {
    let object = body.as_object()?;
    if object.is_empty() || !object.keys().all(|key| QUOTA_NOTICE_KEYS.contains(&key.as_str())) {
        return None;
    }

    QUOTA_NOTICE_KEYS
        .iter()
        .find_map(|key| object.get(*key).and_then(Value::as_str))
        .map(str::to_owned)
}

#[cfg(test)]
mod tests {
    use std::future::Future;
    use std::pin::Pin;

    use serde_json::json;

    use super::*;
    use crate::http_client::{HttpError, HttpResponse};

    struct StaticHttpClient;

    impl HttpClient for StaticHttpClient {
        fn execute<'a>(
            &'a self,
            _request: HttpRequest,
        ) -> Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>> {
            Box::pin(async { Ok(HttpResponse::ok_json("{}")) })
        }
    }

    fn source(config: ClientConfig) -> AlphaVantageSource {
        AlphaVantageSource::new(Arc::new(StaticHttpClient), config)
    }

    #[test]
    fn overview_url_carries_function_symbol_and_key() {
        let source = source(ClientConfig::default().with_api_key("alpha-key"));
        let url = source.request_url(ApiFunction::Overview, &Symbol::parse("ibm").expect("valid"));

        assert_eq!(
            url,
            "https://www.alphavantage.co/query?function=OVERVIEW&symbol=IBM&apikey=alpha-key"
        );
    }

    #[test]
    fn daily_url_requests_full_output() {
        let source = source(ClientConfig::default().with_api_key("k"));
        let url = source.request_url(
            ApiFunction::TimeSeriesDaily,
            &Symbol::parse("BRK.B").expect("valid"),
        );

        assert_eq!(
            url,
            "https://www.alphavantage.co/query?function=TIME_SERIES_DAILY&symbol=BRK.B&outputsize=full&apikey=k"
        );
    }

    #[test]
    fn endpoint_with_query_string_is_extended() {
        let source = source(ClientConfig::default().with_endpoint("http://proxy.test/av?tenant=1"));
        let url = source.request_url(ApiFunction::Overview, &Symbol::parse("A").expect("valid"));

        assert!(url.starts_with("http://proxy.test/av?tenant=1&function=OVERVIEW"));
    }

    #[test]
    fn note_only_body_is_a_quota_notice() {
        let body = json!({ "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute." });
        assert!(quota_notice(&body).is_some());
    }

    #[test]
    fn error_message_and_data_bodies_are_not_quota_notices() {
        assert!(quota_notice(&json!({ "Error Message": "Invalid API call." })).is_none());
        assert!(quota_notice(&json!({ "Symbol": "IBM", "Information": "x" })).is_none());
        assert!(quota_notice(&json!({})).is_none());
    }
}
