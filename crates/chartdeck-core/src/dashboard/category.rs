use std::sync::{Arc, Mutex, MutexGuard};

use crate::chart::{ChartRenderer, ChartSnapshot};
use crate::dashboard::CommandOutcome;
use crate::sequencer::{RequestSequencer, RequestTicket};
use crate::source::AlphaVantageSource;
use crate::store::{CategorySnapshot, ProfileStore};
use crate::{CompanyProfile, DashboardError, StoreError, Symbol};

#[derive(Debug, Default)]
struct CategoryState {
    store: ProfileStore,
    requests: RequestSequencer<Symbol>,
}

/// Controller for bar and pie dashboards built from company overviews.
///
/// Adding a symbol that is already tracked is rejected.
pub struct CategoryDashboard {
    source: AlphaVantageSource,
    renderer: Arc<dyn ChartRenderer>,
    state: Mutex<CategoryState>,
}

impl CategoryDashboard {
    pub fn new(source: AlphaVantageSource, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self {
            source,
            renderer,
            state: Mutex::new(CategoryState::default()),
        }
    }

    /// Fetches the overview for `input` and starts tracking it.
    pub async fn on_add_symbol(&self, input: &str) -> Result<CommandOutcome, DashboardError> {
        let symbol = Symbol::parse(input)?;
        let ticket = {
            let mut state = self.lock();
            if state.store.contains(&symbol) {
                tracing::warn!(%symbol, "symbol already tracked");
                return Err(StoreError::DuplicateSymbol { symbol }.into());
            }
            state.requests.issue(symbol.clone())
        };

        let fetched = self.source.fetch_profile(&symbol).await;
        self.apply(ticket, fetched, |store, profile| store.add_symbol(profile))
    }

    /// Re-fetches a tracked symbol and replaces its profile wholesale.
    pub async fn on_refresh_symbol(&self, input: &str) -> Result<CommandOutcome, DashboardError> {
        let symbol = Symbol::parse(input)?;
        let ticket = {
            let mut state = self.lock();
            if !state.store.contains(&symbol) {
                return Err(StoreError::UnknownSymbol { symbol }.into());
            }
            state.requests.issue(symbol.clone())
        };

        let fetched = self.source.fetch_profile(&symbol).await;
        self.apply(ticket, fetched, |store, profile| {
            store.replace_profile(profile).map(|_| ())
        })
    }

    /// Stops tracking `id`. Any in-flight fetch for it is superseded.
    pub fn on_remove_symbol(&self, id: &str) -> Result<CommandOutcome, DashboardError> {
        let symbol = Symbol::parse(id)?;
        let snapshot = {
            let mut state = self.lock();
            state.store.remove_symbol(&symbol)?;
            state.requests.issue(symbol.clone());
            state.store.snapshot()
        };

        tracing::info!(%symbol, "symbol removed");
        self.renderer.render(&ChartSnapshot::Category(snapshot));
        Ok(CommandOutcome::Applied)
    }

    pub fn snapshot(&self) -> CategorySnapshot {
        self.lock().store.snapshot()
    }

    fn apply(
        &self,
        ticket: RequestTicket<Symbol>,
        fetched: Result<CompanyProfile, DashboardError>,
        mutate: impl FnOnce(&mut ProfileStore, CompanyProfile) -> Result<(), StoreError>,
    ) -> Result<CommandOutcome, DashboardError> {
        let snapshot = {
            let mut state = self.lock();
            if !state.requests.is_latest(&ticket) {
                tracing::warn!(symbol = %ticket.key, seq = ticket.seq, "discarding superseded overview");
                return Ok(CommandOutcome::Superseded);
            }

            let profile = fetched.inspect_err(|error| {
                tracing::warn!(symbol = %ticket.key, code = error.code(), %error, "overview rejected");
            })?;
            mutate(&mut state.store, profile)?;
            state.store.snapshot()
        };

        tracing::info!(symbol = %ticket.key, tracked = snapshot.scalars.len(), "overview applied");
        self.renderer.render(&ChartSnapshot::Category(snapshot));
        Ok(CommandOutcome::Applied)
    }

    fn lock(&self) -> MutexGuard<'_, CategoryState> {
        self.state
            .lock()
            .expect("dashboard state lock is not poisoned")
    }
}
