//! Curriculum structure module.
//!
//! This module provides:
//! - `model`: Module, Lesson, Course and the CurriculumTree value
//! - `ordered`: dense 0..n-1 ordering shared by every container
//! - `tree`: structural operations on the tree (moves, insert/remove)
//! - `reorder`: drag classification and application
//! - `manager`: CurriculumManager, the document-backed session copy of the tree

pub mod manager;
pub mod model;
pub mod ordered;
pub mod reorder;
mod tree;

pub use manager::CurriculumManager;
pub use model::{Course, CurriculumTree, Lesson, LessonKind, Module};
pub use ordered::Ordered;
pub use reorder::{classify, classify_and_apply, DragAction, DragState, ReorderOutcome};
