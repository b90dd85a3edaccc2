//! Content editor support.
//!
//! - `history`: undo/redo stack for a lesson body being edited

pub mod history;

pub use history::{EditHistory, HistoryConfig, Snapshot};
