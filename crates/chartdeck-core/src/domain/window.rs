use std::fmt::{Display, Formatter};
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::NormalizationError;

/// Number of most recent trading days kept from a daily series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct WindowSize(NonZeroUsize);

impl WindowSize {
    pub const DEFAULT_DAYS: usize = 30;

    pub fn new(days: i64) -> Result<Self, NormalizationError> {
        usize::try_from(days)
            .ok()
            .and_then(NonZeroUsize::new)
            .map(Self)
            .ok_or_else(|| NormalizationError::InvalidWindow {
                value: days.to_string(),
            })
    }

    /// Parses slider text. Fractions, signs other than a positive value and
    /// non-numeric input are rejected.
    pub fn parse(input: &str) -> Result<Self, NormalizationError> {
        let trimmed = input.trim();
        trimmed
            .parse::<i64>()
            .map_err(|_| NormalizationError::InvalidWindow {
                value: trimmed.to_owned(),
            })
            .and_then(Self::new)
    }

    pub const fn days(self) -> usize {
        self.0.get()
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        Self(NonZeroUsize::new(Self::DEFAULT_DAYS).unwrap_or(NonZeroUsize::MIN))
    }
}

impl Display for WindowSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} days", self.days())
    }
}

impl TryFrom<i64> for WindowSize {
    type Error = NormalizationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindowSize> for i64 {
    fn from(value: WindowSize) -> Self {
        value.days() as i64
    }
}
