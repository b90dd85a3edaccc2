//! Error types for the curriculum engine.

use std::fmt;

use thiserror::Error;

/// Result type alias for curriculum operations.
pub type CurriculumResult<T> = Result<T, CurriculumError>;

/// Message shown to the user when an order update could not be stored.
pub const REORDER_FAILED_MESSAGE: &str = "Failed to update order, please try again";

/// What kind of item an id was expected to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    Module,
    Lesson,
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ItemKind::Module => f.write_str("module"),
            ItemKind::Lesson => f.write_str("lesson"),
        }
    }
}

/// Errors that can occur while editing a curriculum.
#[derive(Error, Debug)]
pub enum CurriculumError {
    /// Automerge error during snapshot document operations.
    #[error("Automerge error: {0}")]
    Automerge(#[from] automerge::AutomergeError),

    /// Autosurgeon hydration error.
    #[error("Hydration error: {0}")]
    Hydrate(#[from] autosurgeon::HydrateError),

    /// Autosurgeon reconcile error.
    #[error("Reconcile error: {0}")]
    Reconcile(#[from] autosurgeon::ReconcileError),

    /// Unknown module or lesson id.
    #[error("{kind} not found: {id}")]
    NotFound { kind: ItemKind, id: String },

    /// Positional index outside a container.
    #[error("Index {index} out of range for container of length {length}")]
    IndexOutOfRange { index: usize, length: usize },

    /// Inserting the item would break global id uniqueness.
    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    /// An order-update call to the course service failed.
    #[error("Failed to persist {target}: {message}")]
    PersistenceFailure { target: String, message: String },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CurriculumError {
    /// Creates a NotFound error for a module id.
    pub fn module_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: ItemKind::Module,
            id: id.into(),
        }
    }

    /// Creates a NotFound error for a lesson id.
    pub fn lesson_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            kind: ItemKind::Lesson,
            id: id.into(),
        }
    }

    /// Creates an IndexOutOfRange error.
    pub fn index_out_of_range(index: usize, length: usize) -> Self {
        Self::IndexOutOfRange { index, length }
    }

    /// Creates a DuplicateId error.
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId(id.into())
    }

    /// Creates a PersistenceFailure error.
    pub fn persistence(target: impl Into<String>, message: impl Into<String>) -> Self {
        Self::PersistenceFailure {
            target: target.into(),
            message: message.into(),
        }
    }

    /// Creates a Serialization error.
    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    /// True for errors that only happen when a caller works from stale or
    /// inconsistent UI state. These abort the operation but not the session.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::NotFound { .. } | Self::IndexOutOfRange { .. } | Self::DuplicateId(_)
        )
    }

    /// Text suitable for showing to the user.
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PersistenceFailure { .. } => REORDER_FAILED_MESSAGE,
            _ => "Something went wrong while editing the curriculum",
        }
    }
}

impl From<serde_json::Error> for CurriculumError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
