//! Shared fakes for the integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chartdeck_core::{
    AlphaVantageSource, ChartRenderer, ChartSnapshot, ClientConfig, HttpClient, HttpError,
    HttpRequest, HttpResponse, RetryConfig,
};
use serde_json::{json, Map, Value};
use tokio::sync::oneshot;

type BoxedResponse<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, HttpError>> + Send + 'a>>;

/// Config with no client-side quota and fast fixed retries.
pub fn test_config() -> ClientConfig {
    ClientConfig::default()
        .with_api_key("test-key")
        .with_quota(None)
        .with_retry(RetryConfig::fixed(Duration::from_millis(1), 3))
}

pub fn source_with(client: Arc<dyn HttpClient>) -> AlphaVantageSource {
    AlphaVantageSource::new(client, test_config())
}

/// Extracts the `symbol` query parameter from a request URL.
pub fn symbol_of(request: &HttpRequest) -> String {
    request
        .url
        .split(['?', '&'])
        .find_map(|pair| pair.strip_prefix("symbol="))
        .unwrap_or_default()
        .to_owned()
}

// =============================================================================
// Transports
// =============================================================================

/// Replays queued responses in order and records every request.
#[derive(Default)]
pub struct ScriptedHttpClient {
    responses: Mutex<VecDeque<Result<HttpResponse, HttpError>>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedHttpClient {
    pub fn new(responses: impl IntoIterator<Item = Result<HttpResponse, HttpError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().expect("not poisoned").clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("not poisoned").len()
    }
}

impl HttpClient for ScriptedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> BoxedResponse<'a> {
        self.requests.lock().expect("not poisoned").push(request);
        let next = self
            .responses
            .lock()
            .expect("not poisoned")
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::new("no scripted response left")));
        Box::pin(async move { next })
    }
}

/// Answers by symbol from a fixed table.
#[derive(Default)]
pub struct FixtureHttpClient {
    bodies: HashMap<String, String>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl FixtureHttpClient {
    pub fn with(mut self, symbol: &str, body: impl Into<String>) -> Self {
        self.bodies.insert(symbol.to_owned(), body.into());
        self
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().expect("not poisoned").len()
    }
}

impl HttpClient for FixtureHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> BoxedResponse<'a> {
        let response = match self.bodies.get(&symbol_of(&request)) {
            Some(body) => Ok(HttpResponse::ok_json(body.clone())),
            None => Ok(HttpResponse::new(404, "")),
        };
        self.requests.lock().expect("not poisoned").push(request);
        Box::pin(async move { response })
    }
}

/// Holds each request's response until the test releases it. Requests for
/// the same symbol take gates in the order they were registered.
#[derive(Default)]
pub struct GatedHttpClient {
    gates: Mutex<HashMap<String, VecDeque<oneshot::Receiver<HttpResponse>>>>,
}

impl GatedHttpClient {
    /// Registers a gate for the next request for `symbol`; the response is
    /// delivered when the returned sender fires.
    pub fn hold(&self, symbol: &str) -> oneshot::Sender<HttpResponse> {
        let (sender, receiver) = oneshot::channel();
        self.gates
            .lock()
            .expect("not poisoned")
            .entry(symbol.to_owned())
            .or_default()
            .push_back(receiver);
        sender
    }
}

impl HttpClient for GatedHttpClient {
    fn execute<'a>(&'a self, request: HttpRequest) -> BoxedResponse<'a> {
        let symbol = symbol_of(&request);
        let gate = self
            .gates
            .lock()
            .expect("not poisoned")
            .get_mut(&symbol)
            .and_then(VecDeque::pop_front);
        Box::pin(async move {
            match gate {
                Some(receiver) => receiver
                    .await
                    .map_err(|_| HttpError::new(format!("gate for {symbol} dropped"))),
                None => Err(HttpError::new(format!("no gate registered for {symbol}"))),
            }
        })
    }
}

/// Never answers.
pub struct StalledHttpClient;

impl HttpClient for StalledHttpClient {
    fn execute<'a>(&'a self, _request: HttpRequest) -> BoxedResponse<'a> {
        Box::pin(std::future::pending())
    }
}

// =============================================================================
// Renderer
// =============================================================================

#[derive(Default)]
pub struct RecordingRenderer {
    snapshots: Mutex<Vec<ChartSnapshot>>,
}

impl RecordingRenderer {
    pub fn count(&self) -> usize {
        self.snapshots.lock().expect("not poisoned").len()
    }

    pub fn last(&self) -> Option<ChartSnapshot> {
        self.snapshots.lock().expect("not poisoned").last().cloned()
    }
}

impl ChartRenderer for RecordingRenderer {
    fn render(&self, snapshot: &ChartSnapshot) {
        self.snapshots
            .lock()
            .expect("not poisoned")
            .push(snapshot.clone());
    }
}

// =============================================================================
// Payload builders
// =============================================================================

pub fn overview_body(symbol: &str, currency: &str, sector: &str, shares: &str, profit: &str) -> String {
    json!({
        "Symbol": symbol,
        "AssetType": "Common Stock",
        "Currency": currency,
        "Sector": sector,
        "SharesOutstanding": shares,
        "GrossProfitTTM": profit,
    })
    .to_string()
}

/// `TIME_SERIES_DAILY` payload with one entry per `(date, close)`; open is
/// one below close, high one above, low two below.
pub fn daily_body(days: &[(&str, f64)]) -> String {
    let series = days
        .iter()
        .map(|(date, close)| {
            let day = json!({
                "1. open": format!("{:.4}", close - 1.0),
                "2. high": format!("{:.4}", close + 1.0),
                "3. low": format!("{:.4}", close - 2.0),
                "4. close": format!("{close:.4}"),
                "5. volume": "1000",
            });
            ((*date).to_owned(), day)
        })
        .collect::<Map<String, Value>>();

    json!({
        "Meta Data": { "1. Information": "Daily Prices (open, high, low, close) and Volumes" },
        "Time Series (Daily)": series,
    })
    .to_string()
}

pub fn note_body() -> String {
    json!({ "Note": "Thank you for using Alpha Vantage! Our standard API call frequency is 5 calls per minute." })
        .to_string()
}
