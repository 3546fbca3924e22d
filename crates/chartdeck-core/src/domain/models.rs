use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::Date;

use crate::Symbol;

/// `YYYY-MM-DD` serde representation for [`Date`] fields.
pub(crate) mod iso_date {
    use serde::de::Error as DeError;
    use serde::ser::Error as SerError;
    use serde::{Deserialize, Deserializer, Serializer};
    use time::macros::format_description;
    use time::Date;

    pub fn serialize<S>(date: &Date, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let text = date
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(S::Error::custom)?;
        serializer.serialize_str(&text)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Date, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = String::deserialize(deserializer)?;
        Date::parse(&text, format_description!("[year]-[month]-[day]")).map_err(D::Error::custom)
    }
}

/// Static company attributes taken from one `OVERVIEW` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: Symbol,
    pub currency: String,
    pub sector: String,
    pub shares_outstanding: f64,
    pub gross_profit_ttm: f64,
}

impl CompanyProfile {
    pub fn category(&self, field: CategoryField) -> &str {
        match field {
            CategoryField::Currency => &self.currency,
            CategoryField::Sector => &self.sector,
        }
    }

    pub fn scalar(&self, metric: ScalarMetric) -> f64 {
        match metric {
            ScalarMetric::SharesOutstanding => self.shares_outstanding,
            ScalarMetric::GrossProfitTtm => self.gross_profit_ttm,
        }
    }
}

/// One trading day of prices.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyBar {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl DailyBar {
    pub const fn new(date: Date, open: f64, high: f64, low: f64, close: f64) -> Self {
        Self {
            date,
            open,
            high,
            low,
            close,
        }
    }

    pub fn direction(&self) -> Direction {
        if self.close > self.open {
            Direction::Up
        } else if self.close < self.open {
            Direction::Down
        } else {
            Direction::Flat
        }
    }
}

/// Sign of `close - open`, used to color candle bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Flat,
}

/// Categorical profile attribute counted by bar and pie dashboards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryField {
    Currency,
    Sector,
}

impl CategoryField {
    pub const ALL: [Self; 2] = [Self::Currency, Self::Sector];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Currency => "currency",
            Self::Sector => "sector",
        }
    }
}

impl Display for CategoryField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-symbol numeric profile attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarMetric {
    SharesOutstanding,
    GrossProfitTtm,
}

impl ScalarMetric {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SharesOutstanding => "shares_outstanding",
            Self::GrossProfitTtm => "gross_profit_ttm",
        }
    }
}

impl Display for ScalarMetric {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Series slot on a time-series dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Primary,
    Secondary,
}

impl Role {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
