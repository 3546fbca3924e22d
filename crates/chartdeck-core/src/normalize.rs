//! Conversion of raw Alpha Vantage payloads into domain records.
//!
//! The upstream answers HTTP 200 even when it refuses a call; in that case the
//! body carries an `Error Message`, `Note` or `Information` field instead of
//! data. Every normalizer checks for the fields it needs rather than assuming
//! the payload shape, so such bodies surface as [`NormalizationError::MissingField`].

use serde_json::Value;
use time::macros::format_description;
use time::Date;

use crate::{CompanyProfile, DailyBar, NormalizationError, Symbol, WindowSize};

pub const TIME_SERIES_DAILY_KEY: &str = "Time Series (Daily)";

const CURRENCY: &str = "Currency";
const SECTOR: &str = "Sector";
const SHARES_OUTSTANDING: &str = "SharesOutstanding";
const GROSS_PROFIT_TTM: &str = "GrossProfitTTM";

const OPEN: &str = "1. open";
const HIGH: &str = "2. high";
const LOW: &str = "3. low";
const CLOSE: &str = "4. close";

const UPSTREAM_MESSAGE_KEYS: [&str; 3] = ["Error Message", "Note", "Information"];

/// Returns the upstream's explanation when a payload is an error or quota notice.
pub fn upstream_message(raw: &Value) -> Option<&str> {
    UPSTREAM_MESSAGE_KEYS
        .iter()
        .find_map(|key| raw.get(*key).and_then(Value::as_str))
}

/// Builds a [`CompanyProfile`] from an `OVERVIEW` payload.
pub fn normalize_profile(symbol: &Symbol, raw: &Value) -> Result<CompanyProfile, NormalizationError> {
    Ok(CompanyProfile {
        symbol: symbol.clone(),
        currency: required_text(raw, CURRENCY)?,
        sector: required_text(raw, SECTOR)?,
        shares_outstanding: required_number(raw, raw, SHARES_OUTSTANDING, SHARES_OUTSTANDING)?,
        gross_profit_ttm: required_number(raw, raw, GROSS_PROFIT_TTM, GROSS_PROFIT_TTM)?,
    })
}

/// Builds the ascending bar sequence for the most recent `window` days of a
/// `TIME_SERIES_DAILY` payload.
///
/// ISO date keys sort chronologically as plain strings, so the keys are sorted
/// lexicographically and the tail of the sorted sequence is kept.
pub fn normalize_daily_series(
    raw: &Value,
    window: WindowSize,
) -> Result<Vec<DailyBar>, NormalizationError> {
    let series = raw
        .get(TIME_SERIES_DAILY_KEY)
        .and_then(Value::as_object)
        .ok_or_else(|| missing_field(raw, TIME_SERIES_DAILY_KEY))?;

    let mut dates = series.keys().map(String::as_str).collect::<Vec<_>>();
    dates.sort_unstable();
    let start = dates.len().saturating_sub(window.days());

    dates[start..]
        .iter()
        .map(|date| normalize_bar(raw, date, &series[*date]))
        .collect()
}

fn normalize_bar(root: &Value, date: &str, day: &Value) -> Result<DailyBar, NormalizationError> {
    let format = format_description!("[year]-[month]-[day]");
    let parsed = Date::parse(date, &format).map_err(|_| NormalizationError::InvalidDate {
        value: date.to_owned(),
    })?;

    let field = |name: &str| format!("{TIME_SERIES_DAILY_KEY}[{date}][{name}]");

    Ok(DailyBar::new(
        parsed,
        required_number(root, day, OPEN, &field(OPEN))?,
        required_number(root, day, HIGH, &field(HIGH))?,
        required_number(root, day, LOW, &field(LOW))?,
        required_number(root, day, CLOSE, &field(CLOSE))?,
    ))
}

fn required_text(raw: &Value, key: &str) -> Result<String, NormalizationError> {
    raw.get(key)
        .and_then(Value::as_str)
        .map(str::to_owned)
        .ok_or_else(|| missing_field(raw, key))
}

fn required_number(
    root: &Value,
    object: &Value,
    key: &str,
    field: &str,
) -> Result<f64, NormalizationError> {
    let value = object.get(key).ok_or_else(|| missing_field(root, field))?;
    coerce_number(field, value)
}

/// Numeric coercion for string-encoded numbers. Anything that is not a finite
/// number (`"None"`, `"-"`, `""`) is rejected.
fn coerce_number(field: &str, value: &Value) -> Result<f64, NormalizationError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    parsed
        .filter(|number| number.is_finite())
        .ok_or_else(|| NormalizationError::InvalidNumber {
            field: field.to_owned(),
            value: match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            },
        })
}

fn missing_field(root: &Value, field: &str) -> NormalizationError {
    NormalizationError::MissingField {
        field: field.to_owned(),
        upstream: upstream_message(root).map(str::to_owned),
    }
}
