//! Dashboard controllers.
//!
//! A controller owns one aggregate store for the lifetime of a dashboard and
//! exposes the user commands as async methods. Commands suspend only while
//! fetching; store mutation and rendering happen synchronously afterwards,
//! guarded by a last-request-wins check.
//!
//! | Controller | Store | Duplicate policy |
//! |------------|-------|------------------|
//! | [`CategoryDashboard`] | [`crate::ProfileStore`] | reject |
//! | [`SeriesDashboard`] | [`crate::SeriesStore`] | overwrite |

mod category;
mod series;

pub use category::CategoryDashboard;
pub use series::SeriesDashboard;

/// Result of a command that completed without error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// The store was updated and the renderer was called.
    Applied,
    /// A later request for the same key was issued while this one was in
    /// flight; its result was discarded and nothing was rendered.
    Superseded,
}
