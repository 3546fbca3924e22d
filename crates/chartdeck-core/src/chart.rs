//! Renderer contract and chart-ready records.
//!
//! Drawing is left to whatever UI layer implements [`ChartRenderer`]. The
//! records below carry everything a bar, pie, candlestick or line chart needs,
//! so renderers only map values to pixels.

use serde::{Deserialize, Serialize};
use time::Date;

use crate::store::{CategorySnapshot, SeriesSnapshot, SymbolSeries};
use crate::{CategoryField, Direction, ScalarMetric, Symbol};

/// State handed to a renderer after each successful mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ChartSnapshot {
    Category(CategorySnapshot),
    Series(SeriesSnapshot),
}

/// Draws a snapshot, replacing whatever was drawn before.
///
/// Dashboards call `render` explicitly after every successful mutation and
/// never after a failed one.
pub trait ChartRenderer: Send + Sync {
    fn render(&self, snapshot: &ChartSnapshot);
}

/// One labeled bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarEntry {
    pub label: String,
    pub value: f64,
}

/// One pie wedge. `symbol` is the id passed back when its remove button is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieSlice {
    pub symbol: Symbol,
    pub value: f64,
    /// Share of the total, in `0.0..=1.0`.
    pub fraction: f64,
}

/// One candlestick: a low-high wick and an open-close body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandleGlyph {
    #[serde(with = "crate::domain::iso_date")]
    pub date: Date,
    pub low: f64,
    pub high: f64,
    pub open: f64,
    pub close: f64,
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinePoint {
    #[serde(with = "crate::domain::iso_date")]
    pub date: Date,
    pub close: f64,
}

/// Bars for a category distribution, in label order.
pub fn category_bars(snapshot: &CategorySnapshot, field: CategoryField) -> Vec<BarEntry> {
    snapshot
        .counts(field)
        .iter()
        .map(|(label, count)| BarEntry {
            label: label.to_owned(),
            value: count as f64,
        })
        .collect()
}

/// One bar per symbol for a scalar metric, in insertion order.
pub fn scalar_bars(snapshot: &CategorySnapshot, metric: ScalarMetric) -> Vec<BarEntry> {
    snapshot
        .scalars
        .iter()
        .map(|entry| BarEntry {
            label: entry.symbol.to_string(),
            value: entry.value(metric),
        })
        .collect()
}

pub fn pie_slices(snapshot: &CategorySnapshot, metric: ScalarMetric) -> Vec<PieSlice> {
    let total: f64 = snapshot.scalars.iter().map(|entry| entry.value(metric)).sum();

    snapshot
        .scalars
        .iter()
        .map(|entry| {
            let value = entry.value(metric);
            PieSlice {
                symbol: entry.symbol.clone(),
                value,
                fraction: if total > 0.0 { value / total } else { 0.0 },
            }
        })
        .collect()
}

pub fn candle_glyphs(series: &SymbolSeries) -> Vec<CandleGlyph> {
    series
        .bars
        .iter()
        .map(|bar| CandleGlyph {
            date: bar.date,
            low: bar.low,
            high: bar.high,
            open: bar.open,
            close: bar.close,
            direction: bar.direction(),
        })
        .collect()
}

pub fn close_line(series: &SymbolSeries) -> Vec<LinePoint> {
    series
        .bars
        .iter()
        .map(|bar| LinePoint {
            date: bar.date,
            close: bar.close,
        })
        .collect()
}

impl ChartSnapshot {
    pub fn as_category(&self) -> Option<&CategorySnapshot> {
        match self {
            Self::Category(snapshot) => Some(snapshot),
            Self::Series(_) => None,
        }
    }

    pub fn as_series(&self) -> Option<&SeriesSnapshot> {
        match self {
            Self::Series(snapshot) => Some(snapshot),
            Self::Category(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;
    use crate::store::ProfileStore;
    use crate::{CompanyProfile, DailyBar};

    fn store_with(entries: &[(&str, &str, f64)]) -> ProfileStore {
        let mut store = ProfileStore::new();
        for (symbol, sector, profit) in entries {
            store
                .add_symbol(CompanyProfile {
                    symbol: Symbol::parse(symbol).expect("valid"),
                    currency: String::from("USD"),
                    sector: (*sector).to_owned(),
                    shares_outstanding: 10.0,
                    gross_profit_ttm: *profit,
                })
                .expect("add");
        }
        store
    }

    #[test]
    fn category_bars_follow_label_order() {
        let store = store_with(&[("XOM", "ENERGY", 1.0), ("AAPL", "TECHNOLOGY", 1.0), ("CVX", "ENERGY", 1.0)]);

        let bars = category_bars(&store.snapshot(), CategoryField::Sector);
        assert_eq!(
            bars,
            vec![
                BarEntry { label: String::from("ENERGY"), value: 2.0 },
                BarEntry { label: String::from("TECHNOLOGY"), value: 1.0 },
            ]
        );
    }

    #[test]
    fn scalar_bars_follow_insertion_order() {
        let store = store_with(&[("MSFT", "TECHNOLOGY", 146.0), ("AAPL", "TECHNOLOGY", 170.0)]);

        let bars = scalar_bars(&store.snapshot(), ScalarMetric::GrossProfitTtm);
        assert_eq!(
            bars,
            vec![
                BarEntry { label: String::from("MSFT"), value: 146.0 },
                BarEntry { label: String::from("AAPL"), value: 170.0 },
            ]
        );
        assert!(scalar_bars(&store.snapshot(), ScalarMetric::SharesOutstanding)
            .iter()
            .all(|bar| bar.value == 10.0));
    }

    #[test]
    fn pie_fractions_sum_to_one() {
        let store = store_with(&[("AAPL", "TECHNOLOGY", 300.0), ("MSFT", "TECHNOLOGY", 100.0)]);

        let slices = pie_slices(&store.snapshot(), ScalarMetric::GrossProfitTtm);
        assert_eq!(slices.len(), 2);
        assert_eq!(slices[0].fraction, 0.75);
        assert_eq!(slices[1].fraction, 0.25);
    }

    #[test]
    fn candles_carry_direction() {
        let series = SymbolSeries {
            symbol: Symbol::parse("IBM").expect("valid"),
            bars: vec![
                DailyBar::new(date!(2024 - 02 - 01), 10.0, 11.0, 9.0, 9.5),
                DailyBar::new(date!(2024 - 02 - 02), 9.5, 10.5, 9.0, 10.0),
            ],
        };

        let directions = candle_glyphs(&series)
            .iter()
            .map(|glyph| glyph.direction)
            .collect::<Vec<_>>();
        assert_eq!(directions, vec![Direction::Down, Direction::Up]);
        assert_eq!(close_line(&series)[1].close, 10.0);
    }
}
