use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::chart::{ChartRenderer, ChartSnapshot};
use crate::dashboard::CommandOutcome;
use crate::sequencer::{RequestSequencer, RequestTicket};
use crate::source::AlphaVantageSource;
use crate::store::{SeriesSnapshot, SeriesStore};
use crate::{DailyBar, DashboardError, Role, Symbol, WindowSize};

#[derive(Debug)]
struct SeriesState {
    store: SeriesStore,
    requests: RequestSequencer<Role>,
    /// Latest symbol the user picked per role, including picks still in flight.
    chosen: BTreeMap<Role, Symbol>,
    /// Window the stored bars were trimmed to.
    window: WindowSize,
    /// Window used for new fetches. Runs ahead of `window` while a resize is in flight.
    requested_window: WindowSize,
    resizes: u64,
}

impl SeriesState {
    /// Points `role` back at whatever the store holds after a failed pick.
    fn restore_choice(&mut self, role: Role) {
        match self.store.get(role) {
            Some(series) => {
                self.chosen.insert(role, series.symbol.clone());
            }
            None => {
                self.chosen.remove(&role);
            }
        }
    }
}

/// Controller for candlestick and line dashboards.
///
/// Each [`Role`] holds at most one symbol; choosing a new symbol for a role
/// overwrites whatever it held.
pub struct SeriesDashboard {
    source: AlphaVantageSource,
    renderer: Arc<dyn ChartRenderer>,
    state: Mutex<SeriesState>,
}

impl SeriesDashboard {
    pub fn new(source: AlphaVantageSource, renderer: Arc<dyn ChartRenderer>) -> Self {
        Self::with_window(source, renderer, WindowSize::default())
    }

    pub fn with_window(
        source: AlphaVantageSource,
        renderer: Arc<dyn ChartRenderer>,
        window: WindowSize,
    ) -> Self {
        Self {
            source,
            renderer,
            state: Mutex::new(SeriesState {
                store: SeriesStore::new(),
                requests: RequestSequencer::new(),
                chosen: BTreeMap::new(),
                window,
                requested_window: window,
                resizes: 0,
            }),
        }
    }

    /// Fetches daily bars for `input` and puts them in the `role` slot.
    pub async fn on_symbol_changed(
        &self,
        role: Role,
        input: &str,
    ) -> Result<CommandOutcome, DashboardError> {
        let symbol = Symbol::parse(input)?;
        let (ticket, window) = {
            let mut state = self.lock();
            state.chosen.insert(role, symbol.clone());
            (state.requests.issue(role), state.requested_window)
        };

        let fetched = self.source.fetch_daily_series(&symbol, window).await;

        let snapshot = {
            let mut state = self.lock();
            if !state.requests.is_latest(&ticket) {
                tracing::warn!(%role, %symbol, seq = ticket.seq, "discarding superseded series");
                return Ok(CommandOutcome::Superseded);
            }

            let bars = match fetched {
                Ok(bars) => bars,
                Err(error) => {
                    tracing::warn!(%role, %symbol, code = error.code(), %error, "series rejected");
                    state.restore_choice(role);
                    return Err(error);
                }
            };
            state.store.set_series(role, symbol.clone(), bars);
            state.window = window;
            state.store.snapshot(window)
        };

        tracing::info!(%role, %symbol, %window, "series applied");
        self.renderer.render(&ChartSnapshot::Series(snapshot));
        Ok(CommandOutcome::Applied)
    }

    /// Validates `days`, then re-fetches the chosen symbol of every role with
    /// the new window.
    ///
    /// The update is all-or-nothing: if any fetch fails, no role is replaced
    /// and later fetches keep using the previous window.
    pub async fn on_window_size_changed(&self, days: i64) -> Result<CommandOutcome, DashboardError> {
        let window = WindowSize::new(days)?;
        let (generation, pending) = {
            let mut state = self.lock();
            state.resizes += 1;
            state.requested_window = window;
            let pending = state
                .chosen
                .clone()
                .into_iter()
                .map(|(role, symbol)| (state.requests.issue(role), symbol))
                .collect::<Vec<_>>();
            (state.resizes, pending)
        };

        if pending.is_empty() {
            let snapshot = {
                let mut state = self.lock();
                state.window = window;
                state.store.snapshot(window)
            };
            tracing::info!(%window, "window changed");
            self.renderer.render(&ChartSnapshot::Series(snapshot));
            return Ok(CommandOutcome::Applied);
        }

        let mut fetched = Vec::with_capacity(pending.len());
        for (ticket, symbol) in pending {
            let bars = self.source.fetch_daily_series(&symbol, window).await;
            fetched.push((ticket, symbol, bars));
        }

        let snapshot = {
            let mut state = self.lock();
            let fresh = take_fresh(&state.requests, fetched);
            if fresh.is_empty() {
                tracing::warn!(%window, "discarding superseded resize");
                return Ok(CommandOutcome::Superseded);
            }

            let mut updates = Vec::with_capacity(fresh.len());
            for (ticket, symbol, bars) in fresh {
                match bars {
                    Ok(bars) => updates.push((ticket.key, symbol, bars)),
                    Err(error) => {
                        tracing::warn!(role = %ticket.key, %symbol, code = error.code(), %error, "resize rejected");
                        if state.resizes == generation {
                            let applied = state.window;
                            state.requested_window = applied;
                        }
                        return Err(error);
                    }
                }
            }

            for (role, symbol, bars) in updates {
                state.store.set_series(role, symbol, bars);
            }
            state.window = window;
            state.store.snapshot(window)
        };

        tracing::info!(%window, roles = snapshot.series.len(), "window applied");
        self.renderer.render(&ChartSnapshot::Series(snapshot));
        Ok(CommandOutcome::Applied)
    }

    /// Empties the `role` slot. Any in-flight fetch for it is superseded.
    pub fn on_clear(&self, role: Role) -> CommandOutcome {
        let snapshot = {
            let mut state = self.lock();
            state.requests.issue(role);
            state.chosen.remove(&role);
            state.store.clear(role);
            state.store.snapshot(state.window)
        };

        tracing::info!(%role, "series cleared");
        self.renderer.render(&ChartSnapshot::Series(snapshot));
        CommandOutcome::Applied
    }

    pub fn window(&self) -> WindowSize {
        self.lock().window
    }

    pub fn snapshot(&self) -> SeriesSnapshot {
        let state = self.lock();
        state.store.snapshot(state.window)
    }

    fn lock(&self) -> MutexGuard<'_, SeriesState> {
        self.state
            .lock()
            .expect("dashboard state lock is not poisoned")
    }
}

type Fetched = (RequestTicket<Role>, Symbol, Result<Vec<DailyBar>, DashboardError>);

fn take_fresh(requests: &RequestSequencer<Role>, fetched: Vec<Fetched>) -> Vec<Fetched> {
    fetched
        .into_iter()
        .filter(|(ticket, symbol, _)| {
            let latest = requests.is_latest(ticket);
            if !latest {
                tracing::debug!(role = %ticket.key, %symbol, "resize result superseded");
            }
            latest
        })
        .collect()
}
