//! Aggregation and display of recorded sessions.

mod summary;
mod view;

pub use summary::{summarize, Summary, SummaryCache};
pub use view::{SessionListView, Snapshot};
