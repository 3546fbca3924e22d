use std::fmt::{Display, Formatter};

use thiserror::Error;

use crate::Symbol;

/// Validation errors for user-entered values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },
}

/// Payload shape errors raised while turning raw API JSON into domain records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("{}", missing_field_message(.field, .upstream.as_deref()))]
    MissingField {
        field: String,
        /// `Error Message`, `Note` or `Information` text returned in place of data.
        upstream: Option<String>,
    },
    #[error("field '{field}' is not a number: '{value}'")]
    InvalidNumber { field: String, value: String },
    #[error("window size must be a positive whole number of days: '{value}'")]
    InvalidWindow { value: String },
    #[error("invalid calendar date '{value}', expected YYYY-MM-DD")]
    InvalidDate { value: String },
}

fn missing_field_message(field: &str, upstream: Option<&str>) -> String {
    match upstream {
        Some(note) => format!("response is missing '{field}'; upstream said: {note}"),
        None => format!("response is missing '{field}'"),
    }
}

impl NormalizationError {
    pub fn missing(field: impl Into<String>) -> Self {
        Self::MissingField {
            field: field.into(),
            upstream: None,
        }
    }
}

/// Aggregate store invariant violations. These are local validation failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("symbol '{symbol}' is already tracked")]
    DuplicateSymbol { symbol: Symbol },
    #[error("symbol '{symbol}' is not tracked")]
    UnknownSymbol { symbol: Symbol },
}

/// Network failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkErrorKind {
    /// Connection or transport failure before a response arrived.
    Transport,
    /// The upstream answered with a non-2xx status.
    Status,
    /// The request did not finish within the configured timeout.
    Timeout,
    /// The upstream refused the call because of its request quota.
    RateLimited,
    /// The body could not be decoded as JSON.
    InvalidBody,
}

/// Structured network error surfaced by the market data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    kind: NetworkErrorKind,
    message: String,
    status: Option<u16>,
}

impl NetworkError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: NetworkErrorKind::Transport,
            message: message.into(),
            status: None,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            kind: NetworkErrorKind::Status,
            message: format!("upstream returned status {status}"),
            status: Some(status),
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: NetworkErrorKind::Timeout,
            message: message.into(),
            status: None,
        }
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self {
            kind: NetworkErrorKind::RateLimited,
            message: message.into(),
            status: None,
        }
    }

    pub fn invalid_body(message: impl Into<String>) -> Self {
        Self {
            kind: NetworkErrorKind::InvalidBody,
            message: message.into(),
            status: None,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub const fn kind(&self) -> NetworkErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn http_status(&self) -> Option<u16> {
        self.status
    }

    /// Only rate-limit refusals are worth repeating.
    pub const fn retryable(&self) -> bool {
        matches!(self.kind, NetworkErrorKind::RateLimited)
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            NetworkErrorKind::Transport => "network.transport",
            NetworkErrorKind::Status => "network.status",
            NetworkErrorKind::Timeout => "network.timeout",
            NetworkErrorKind::RateLimited => "network.rate_limited",
            NetworkErrorKind::InvalidBody => "network.invalid_body",
        }
    }
}

impl Display for NetworkError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for NetworkError {}

/// Top-level error returned by dashboard commands.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    #[error(transparent)]
    Normalization(#[from] NormalizationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DashboardError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "input.invalid_symbol",
            Self::Network(error) => error.code(),
            Self::Normalization(NormalizationError::MissingField { .. }) => {
                "normalize.missing_field"
            }
            Self::Normalization(NormalizationError::InvalidNumber { .. }) => {
                "normalize.invalid_number"
            }
            Self::Normalization(NormalizationError::InvalidWindow { .. }) => {
                "normalize.invalid_window"
            }
            Self::Normalization(NormalizationError::InvalidDate { .. }) => {
                "normalize.invalid_date"
            }
            Self::Store(StoreError::DuplicateSymbol { .. }) => "store.duplicate_symbol",
            Self::Store(StoreError::UnknownSymbol { .. }) => "store.unknown_symbol",
        }
    }
}
