//! Undo/redo history for a single editable field.
//!
//! Snapshots are taken of the content *before* each edit, so `undo` restores
//! the pre-edit state. The one special rule: every new edit clears the redo
//! stack.
//!
//! ```text
//! record("a") record("b") record("c")
//!   undo: ["a", "b"]   redo: []      current: "c"
//! undo()
//!   undo: ["a"]        redo: ["c"]   current: "b"
//! record("d")  (redo dropped)
//!   undo: ["a", "b"]   redo: []      current: "d"
//! ```
//!
//! A blank current value (e.g. an empty body) is not worth restoring, so it is
//! not pushed when the next edit arrives.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Content that can be kept in an [`EditHistory`].
pub trait Snapshot: Clone {
    /// True if the value carries no content worth restoring.
    fn is_blank(&self) -> bool;
}

impl Snapshot for String {
    fn is_blank(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Snapshot> Snapshot for Option<T> {
    fn is_blank(&self) -> bool {
        self.as_ref().map_or(true, Snapshot::is_blank)
    }
}

/// Configuration for an edit history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryConfig {
    /// Maximum number of undo snapshots kept. `None` keeps everything; when
    /// set, the oldest snapshot is evicted once the limit is exceeded.
    pub max_depth: Option<usize>,
}

impl HistoryConfig {
    /// Unbounded history.
    pub fn unbounded() -> Self {
        Self { max_depth: None }
    }

    /// History keeping at most `max_depth` undo snapshots.
    pub fn bounded(max_depth: usize) -> Self {
        Self {
            max_depth: Some(max_depth),
        }
    }
}

/// Undo/redo stacks for one editor instance. Never persisted.
pub struct EditHistory<T: Snapshot = String> {
    current: T,
    /// Pre-edit snapshots, most recent at the back.
    undo_stack: VecDeque<T>,
    /// Undone values, most recently undone at the back.
    redo_stack: Vec<T>,
    config: HistoryConfig,
}

impl<T: Snapshot> fmt::Debug for EditHistory<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EditHistory")
            .field("undo_depth", &self.undo_stack.len())
            .field("redo_depth", &self.redo_stack.len())
            .field("config", &self.config)
            .finish()
    }
}

impl<T: Snapshot> EditHistory<T> {
    /// Starts an empty history at `initial`.
    pub fn new(initial: T) -> Self {
        Self::with_config(initial, HistoryConfig::default())
    }

    /// Starts an empty history with the given configuration.
    pub fn with_config(initial: T, config: HistoryConfig) -> Self {
        Self {
            current: initial,
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            config,
        }
    }

    /// Current content.
    pub fn current(&self) -> &T {
        &self.current
    }

    /// Records an edit: snapshots the previous content (unless blank), clears
    /// redo, and makes `content` current.
    pub fn record_edit(&mut self, content: T) {
        let previous = std::mem::replace(&mut self.current, content);
        if !previous.is_blank() {
            self.push_undo(previous);
        }
        self.redo_stack.clear();
    }

    /// Restores the previous snapshot. Returns false (and changes nothing)
    /// when there is nothing to undo.
    pub fn undo(&mut self) -> bool {
        let Some(previous) = self.undo_stack.pop_back() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, previous);
        self.redo_stack.push(current);
        true
    }

    /// Re-applies the most recently undone value. Returns false (and changes
    /// nothing) when there is nothing to redo.
    pub fn redo(&mut self) -> bool {
        let Some(next) = self.redo_stack.pop() else {
            return false;
        };
        let current = std::mem::replace(&mut self.current, next);
        self.push_undo(current);
        true
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of snapshots on the undo stack.
    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of values on the redo stack.
    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Get the configuration.
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Drops both stacks and starts over at `content`.
    pub fn reset(&mut self, content: T) {
        self.current = content;
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    /// Consumes the history, keeping only the current content.
    pub fn into_current(self) -> T {
        self.current
    }

    fn push_undo(&mut self, snapshot: T) {
        self.undo_stack.push_back(snapshot);
        if let Some(max) = self.config.max_depth {
            while self.undo_stack.len() > max {
                self.undo_stack.pop_front();
            }
        }
    }
}

impl<T: Snapshot + Default> Default for EditHistory<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

// =============================================================================
// TESTS
// =============================================================================
