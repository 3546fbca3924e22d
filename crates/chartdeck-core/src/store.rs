//! Aggregate stores behind the dashboards.
//!
//! [`ProfileStore`] backs category-mode dashboards (bar and pie charts over
//! company overviews). [`SeriesStore`] backs time-series dashboards
//! (candlestick and line charts over daily bars). All mutations are
//! synchronous; snapshots are owned copies the renderer cannot mutate.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    CategoryField, CompanyProfile, DailyBar, Role, ScalarMetric, StoreError, Symbol, WindowSize,
};

/// Number of tracked symbols per category label, ordered by label.
///
/// Labels are only present while their count is positive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryCounts(BTreeMap<String, usize>);

impl CategoryCounts {
    pub fn increment(&mut self, label: &str) {
        *self.0.entry(label.to_owned()).or_insert(0) += 1;
    }

    /// Decrements `label`, deleting it when it reaches zero. Returns `false`
    /// when the label was not present.
    pub fn decrement(&mut self, label: &str) -> bool {
        let Some(count) = self.0.get_mut(label) else {
            return false;
        };

        *count -= 1;
        if *count == 0 {
            self.0.remove(label);
        }
        true
    }

    pub fn get(&self, label: &str) -> Option<usize> {
        self.0.get(label).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, usize)> {
        self.0.iter().map(|(label, count)| (label.as_str(), *count))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for CategoryCounts {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        let mut counts = Self::default();
        for label in iter {
            counts.increment(label);
        }
        counts
    }
}

/// Scalar attributes of one tracked company.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarEntry {
    pub symbol: Symbol,
    pub shares_outstanding: f64,
    pub gross_profit_ttm: f64,
}

impl ScalarEntry {
    pub fn value(&self, metric: ScalarMetric) -> f64 {
        match metric {
            ScalarMetric::SharesOutstanding => self.shares_outstanding,
            ScalarMetric::GrossProfitTtm => self.gross_profit_ttm,
        }
    }
}

/// Immutable view of a [`ProfileStore`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategorySnapshot {
    pub currency_counts: CategoryCounts,
    pub sector_counts: CategoryCounts,
    /// One entry per symbol, in the order symbols were added.
    pub scalars: Vec<ScalarEntry>,
}

impl CategorySnapshot {
    pub fn counts(&self, field: CategoryField) -> &CategoryCounts {
        match field {
            CategoryField::Currency => &self.currency_counts,
            CategoryField::Sector => &self.sector_counts,
        }
    }

    pub fn symbols(&self) -> impl Iterator<Item = &Symbol> {
        self.scalars.iter().map(|entry| &entry.symbol)
    }
}

/// Category-mode store: one profile per symbol plus derived counts.
#[derive(Debug, Clone, Default)]
pub struct ProfileStore {
    profiles: Vec<CompanyProfile>,
    currency_counts: CategoryCounts,
    sector_counts: CategoryCounts,
}

impl ProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracks a new symbol. An already tracked symbol is rejected, never overwritten.
    pub fn add_symbol(&mut self, profile: CompanyProfile) -> Result<(), StoreError> {
        if self.contains(&profile.symbol) {
            return Err(StoreError::DuplicateSymbol {
                symbol: profile.symbol,
            });
        }

        self.count_in(&profile);
        tracing::debug!(symbol = %profile.symbol, currency = %profile.currency, sector = %profile.sector, "profile added");
        self.profiles.push(profile);
        Ok(())
    }

    pub fn remove_symbol(&mut self, symbol: &Symbol) -> Result<CompanyProfile, StoreError> {
        let index = self
            .profiles
            .iter()
            .position(|profile| &profile.symbol == symbol)
            .ok_or_else(|| StoreError::UnknownSymbol {
                symbol: symbol.clone(),
            })?;

        let profile = self.profiles.remove(index);
        self.count_out(&profile);
        tracing::debug!(%symbol, "profile removed");
        Ok(profile)
    }

    /// Replaces the stored profile of an already tracked symbol, moving its
    /// category counts. Returns the previous profile.
    pub fn replace_profile(&mut self, profile: CompanyProfile) -> Result<CompanyProfile, StoreError> {
        let slot = self
            .profiles
            .iter_mut()
            .find(|current| current.symbol == profile.symbol)
            .ok_or_else(|| StoreError::UnknownSymbol {
                symbol: profile.symbol.clone(),
            })?;

        let symbol = profile.symbol.clone();
        let previous = std::mem::replace(slot, profile.clone());
        self.count_out(&previous);
        self.count_in(&profile);
        tracing::debug!(%symbol, "profile replaced");
        Ok(previous)
    }

    pub fn contains(&self, symbol: &Symbol) -> bool {
        self.profile(symbol).is_some()
    }

    pub fn profile(&self, symbol: &Symbol) -> Option<&CompanyProfile> {
        self.profiles.iter().find(|profile| &profile.symbol == symbol)
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    pub fn counts(&self, field: CategoryField) -> &CategoryCounts {
        match field {
            CategoryField::Currency => &self.currency_counts,
            CategoryField::Sector => &self.sector_counts,
        }
    }

    fn counts_mut(&mut self, field: CategoryField) -> &mut CategoryCounts {
        match field {
            CategoryField::Currency => &mut self.currency_counts,
            CategoryField::Sector => &mut self.sector_counts,
        }
    }

    fn count_in(&mut self, profile: &CompanyProfile) {
        for field in CategoryField::ALL {
            self.counts_mut(field).increment(profile.category(field));
        }
    }

    fn count_out(&mut self, profile: &CompanyProfile) {
        for field in CategoryField::ALL {
            self.counts_mut(field).decrement(profile.category(field));
        }
    }

    pub fn snapshot(&self) -> CategorySnapshot {
        CategorySnapshot {
            currency_counts: self.currency_counts.clone(),
            sector_counts: self.sector_counts.clone(),
            scalars: self
                .profiles
                .iter()
                .map(|profile| ScalarEntry {
                    symbol: profile.symbol.clone(),
                    shares_outstanding: profile.shares_outstanding,
                    gross_profit_ttm: profile.gross_profit_ttm,
                })
                .collect(),
        }
    }
}

/// Date and value extents of one or more series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesDomain {
    #[serde(with = "crate::domain::iso_date")]
    pub start: Date,
    #[serde(with = "crate::domain::iso_date")]
    pub end: Date,
    pub min_low: f64,
    pub max_high: f64,
    pub min_close: f64,
    pub max_close: f64,
}

impl SeriesDomain {
    pub fn of(bars: &[DailyBar]) -> Option<Self> {
        let first = bars.first()?;
        let seed = Self {
            start: first.date,
            end: first.date,
            min_low: first.low,
            max_high: first.high,
            min_close: first.close,
            max_close: first.close,
        };

        Some(bars.iter().skip(1).fold(seed, |domain, bar| Self {
            start: domain.start.min(bar.date),
            end: domain.end.max(bar.date),
            min_low: domain.min_low.min(bar.low),
            max_high: domain.max_high.max(bar.high),
            min_close: domain.min_close.min(bar.close),
            max_close: domain.max_close.max(bar.close),
        }))
    }

    pub fn union(self, other: Self) -> Self {
        Self {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            min_low: self.min_low.min(other.min_low),
            max_high: self.max_high.max(other.max_high),
            min_close: self.min_close.min(other.min_close),
            max_close: self.max_close.max(other.max_close),
        }
    }
}

/// Bars currently shown for one role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymbolSeries {
    pub symbol: Symbol,
    pub bars: Vec<DailyBar>,
}

impl SymbolSeries {
    pub fn domain(&self) -> Option<SeriesDomain> {
        SeriesDomain::of(&self.bars)
    }

    /// Change from the first to the last close of the window, in percent.
    pub fn percent_change(&self) -> Option<f64> {
        let first = self.bars.first()?.close;
        let last = self.bars.last()?.close;
        if first == 0.0 {
            return None;
        }
        Some((last - first) / first * 100.0)
    }
}

/// Immutable view of a [`SeriesStore`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub window: WindowSize,
    pub series: BTreeMap<Role, SymbolSeries>,
    /// Joint extents over every series, for shared axes.
    pub domain: Option<SeriesDomain>,
}

impl SeriesSnapshot {
    pub fn get(&self, role: Role) -> Option<&SymbolSeries> {
        self.series.get(&role)
    }
}

/// Time-series store keyed by role. Each update replaces the role's bars.
#[derive(Debug, Clone, Default)]
pub struct SeriesStore {
    series: BTreeMap<Role, SymbolSeries>,
}

impl SeriesStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_series(&mut self, role: Role, symbol: Symbol, bars: Vec<DailyBar>) {
        tracing::debug!(%role, %symbol, bars = bars.len(), "series replaced");
        self.series.insert(role, SymbolSeries { symbol, bars });
    }

    pub fn clear(&mut self, role: Role) -> Option<SymbolSeries> {
        let removed = self.series.remove(&role);
        if removed.is_some() {
            tracing::debug!(%role, "series cleared");
        }
        removed
    }

    pub fn get(&self, role: Role) -> Option<&SymbolSeries> {
        self.series.get(&role)
    }

    /// Populated roles with their symbols, in role order.
    pub fn tracked(&self) -> Vec<(Role, Symbol)> {
        self.series
            .iter()
            .map(|(role, series)| (*role, series.symbol.clone()))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    pub fn domain(&self) -> Option<SeriesDomain> {
        self.series
            .values()
            .filter_map(SymbolSeries::domain)
            .reduce(SeriesDomain::union)
    }

    pub fn snapshot(&self, window: WindowSize) -> SeriesSnapshot {
        SeriesSnapshot {
            window,
            series: self.series.clone(),
            domain: self.domain(),
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    fn profile(symbol: &str, currency: &str, sector: &str) -> CompanyProfile {
        CompanyProfile {
            symbol: Symbol::parse(symbol).expect("valid symbol"),
            currency: currency.to_owned(),
            sector: sector.to_owned(),
            shares_outstanding: 1_000.0,
            gross_profit_ttm: 50.0,
        }
    }

    fn symbol(value: &str) -> Symbol {
        Symbol::parse(value).expect("valid symbol")
    }

    #[test]
    fn counts_drop_keys_that_reach_zero() {
        let mut counts = CategoryCounts::from_iter(["USD", "USD", "EUR"]);

        assert!(counts.decrement("EUR"));
        assert_eq!(counts.get("EUR"), None);
        assert_eq!(counts.get("USD"), Some(2));
        assert!(!counts.decrement("JPY"));
    }

    #[test]
    fn duplicate_add_is_rejected_without_changing_counts() {
        let mut store = ProfileStore::new();
        store
            .add_symbol(profile("AAPL", "USD", "TECHNOLOGY"))
            .expect("first add");

        let error = store
            .add_symbol(profile("AAPL", "EUR", "ENERGY"))
            .expect_err("duplicate");
        assert_eq!(error, StoreError::DuplicateSymbol { symbol: symbol("AAPL") });
        assert_eq!(store.counts(CategoryField::Currency).get("USD"), Some(1));
        assert_eq!(store.counts(CategoryField::Currency).get("EUR"), None);
        assert_eq!(store.profile(&symbol("AAPL")).map(|p| p.sector.as_str()), Some("TECHNOLOGY"));
    }

    #[test]
    fn add_then_remove_restores_previous_counts() {
        let mut store = ProfileStore::new();
        store.add_symbol(profile("IBM", "USD", "TECHNOLOGY")).expect("add");
        let before = store.snapshot();

        store.add_symbol(profile("SAP", "EUR", "TECHNOLOGY")).expect("add");
        store.remove_symbol(&symbol("SAP")).expect("remove");

        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn replacing_a_profile_moves_its_counts() {
        let mut store = ProfileStore::new();
        store.add_symbol(profile("SHEL", "GBP", "ENERGY")).expect("add");

        let previous = store
            .replace_profile(profile("SHEL", "USD", "ENERGY"))
            .expect("tracked symbol");
        assert_eq!(previous.currency, "GBP");
        assert_eq!(store.counts(CategoryField::Currency).get("GBP"), None);
        assert_eq!(store.counts(CategoryField::Currency).get("USD"), Some(1));
        assert_eq!(store.counts(CategoryField::Sector).get("ENERGY"), Some(1));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn removing_unknown_symbol_fails() {
        let mut store = ProfileStore::new();
        let error = store.remove_symbol(&symbol("NOPE")).expect_err("unknown");
        assert_eq!(error, StoreError::UnknownSymbol { symbol: symbol("NOPE") });
    }

    #[test]
    fn snapshot_keeps_insertion_order_of_scalars() {
        let mut store = ProfileStore::new();
        for name in ["MSFT", "AAPL", "GOOG"] {
            store.add_symbol(profile(name, "USD", "TECHNOLOGY")).expect("add");
        }

        let snapshot = store.snapshot();
        let order = snapshot.symbols().map(Symbol::as_str).collect::<Vec<_>>();
        assert_eq!(order, vec!["MSFT", "AAPL", "GOOG"]);
    }

    #[test]
    fn set_series_replaces_previous_bars() {
        let mut store = SeriesStore::new();
        let day = date!(2024 - 05 - 01);
        store.set_series(Role::Primary, symbol("IBM"), vec![DailyBar::new(day, 1.0, 2.0, 0.5, 1.5); 3]);
        store.set_series(Role::Primary, symbol("IBM"), vec![DailyBar::new(day, 1.0, 2.0, 0.5, 1.5)]);

        assert_eq!(store.get(Role::Primary).map(|s| s.bars.len()), Some(1));
        assert!(store.clear(Role::Primary).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn joint_domain_spans_both_series() {
        let mut store = SeriesStore::new();
        store.set_series(
            Role::Primary,
            symbol("AAPL"),
            vec![
                DailyBar::new(date!(2024 - 01 - 02), 10.0, 12.0, 9.0, 11.0),
                DailyBar::new(date!(2024 - 01 - 03), 11.0, 13.0, 10.0, 12.0),
            ],
        );
        store.set_series(
            Role::Secondary,
            symbol("MSFT"),
            vec![
                DailyBar::new(date!(2023 - 12 - 29), 300.0, 310.0, 295.0, 305.0),
                DailyBar::new(date!(2024 - 01 - 02), 305.0, 306.0, 299.0, 300.0),
            ],
        );

        let domain = store.domain().expect("series present");
        assert_eq!(domain.start, date!(2023 - 12 - 29));
        assert_eq!(domain.end, date!(2024 - 01 - 03));
        assert_eq!(domain.min_low, 9.0);
        assert_eq!(domain.max_high, 310.0);
        assert_eq!(domain.min_close, 11.0);
        assert_eq!(domain.max_close, 305.0);
    }

    #[test]
    fn percent_change_uses_first_and_last_close() {
        let series = SymbolSeries {
            symbol: symbol("IBM"),
            bars: vec![
                DailyBar::new(date!(2024 - 01 - 02), 1.0, 1.0, 1.0, 100.0),
                DailyBar::new(date!(2024 - 01 - 03), 1.0, 1.0, 1.0, 110.0),
            ],
        };

        let change = series.percent_change().expect("two closes");
        assert!((change - 10.0).abs() < 1e-9);
    }
}
