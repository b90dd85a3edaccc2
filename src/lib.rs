//! Coursecraft - curriculum structure and progress engine for course builders.
//!
//! The drag-and-drop curriculum builder, the "continue learning" buttons and the
//! lesson editor all sit on three small pieces with real invariants:
//!
//! - **Curriculum tree**: Modules→Lessons, every container densely ordered
//!   `0..n-1`, ids globally unique and stable across moves
//! - **Reorder engine**: reduces a finished drag to `(active_id, over_id)` and
//!   resolves it into a module move, an in-module lesson move or a cross-module
//!   lesson move
//! - **Progress resolver** and **edit history**: resume-lesson lookup and
//!   undo/redo for lesson bodies
//!
//! # Example
//!
//! ```rust
//! use coursecraft::{Course, CurriculumTree, Lesson, Module, classify_and_apply};
//!
//! let course = Course::new("course-1", "Rust 101")
//!     .with_module(
//!         Module::new("A", "Basics")
//!             .with_lesson(Lesson::new("L1", "Hello").with_order(0))
//!             .with_lesson(Lesson::new("L2", "Cargo").with_order(1)),
//!     )
//!     .with_module(
//!         Module::new("B", "Ownership")
//!             .with_order(1)
//!             .with_lesson(Lesson::new("L3", "Moves")),
//!     );
//! let mut tree = CurriculumTree::from_course(course).unwrap();
//!
//! // Drop L2 onto L3: L2 lands right before L3 in module B.
//! let outcome = classify_and_apply(&mut tree, "L2", "L3").unwrap();
//! assert_eq!(outcome.lesson_orders_changed, vec!["A", "B"]);
//! assert_eq!(tree.lesson_ids_of("B").unwrap(), vec!["L2", "L3"]);
//! ```

pub mod curriculum;
pub mod editor;
pub mod error;
pub mod progress;
pub mod service;
pub mod session;

#[cfg(feature = "wasm")]
pub mod wasm;

// Re-exports for convenience
pub use curriculum::{
    classify, classify_and_apply, Course, CurriculumManager, CurriculumTree, DragAction, DragState,
    Lesson, LessonKind, Module, ReorderOutcome,
};
pub use editor::{EditHistory, HistoryConfig};
pub use error::{CurriculumError, CurriculumResult};
pub use progress::{completion_percentage, next_uncompleted_lesson, Progress, ProgressSummary};
pub use service::{persist_reorder, CourseService, MemoryCourseService, ServiceConfig};
pub use session::EditSession;

#[cfg(feature = "client")]
pub use service::HttpCourseService;

#[cfg(feature = "wasm")]
pub use wasm::{JsCurriculumManager, JsEditHistory};
