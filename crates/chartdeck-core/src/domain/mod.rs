//! # Domain Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated uppercase ticker |
//! | [`CompanyProfile`] | Currency, sector and scalar attributes from an overview payload |
//! | [`DailyBar`] | One day of open/high/low/close prices |
//! | [`WindowSize`] | Number of most recent days kept from a daily series |
//! | [`CategoryField`] | Attribute counted by category dashboards |
//! | [`ScalarMetric`] | Per-symbol value plotted by bar and pie dashboards |
//! | [`Role`] | Series slot on a time-series dashboard |

mod models;
mod symbol;
mod window;

pub(crate) use models::iso_date;
pub use models::{CategoryField, CompanyProfile, DailyBar, Direction, Role, ScalarMetric};
pub use symbol::Symbol;
pub use window::WindowSize;
