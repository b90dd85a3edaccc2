//! Course service boundary.
//!
//! The engine consumes four calls from the surrounding app: load a course with
//! its lessons, load progress, and persist the two kinds of order update. After
//! an optimistic local reorder, [`persist_reorder`] issues the module-order call
//! (if the module order changed) and then one lesson-order call per changed
//! module. There is no transaction across those calls and no rollback: if one
//! fails the local tree and the server disagree until the next full reload.

pub mod memory;

#[cfg(feature = "client")]
pub mod http;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::curriculum::{Course, CurriculumTree, ReorderOutcome};
use crate::error::{CurriculumError, CurriculumResult};
use crate::progress::Progress;

pub use memory::MemoryCourseService;

#[cfg(feature = "client")]
pub use http::HttpCourseService;

/// Connection settings for the REST course service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    /// Base URL, e.g. `https://lms.example.com`.
    pub base_url: String,
    /// Bearer token, if the service requires one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl ServiceConfig {
    /// Creates a config for `base_url` without credentials.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: None,
        }
    }

    /// Builder: Set bearer token.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }
}

/// Operations the engine needs from the course backend.
#[allow(async_fn_in_trait)]
pub trait CourseService {
    /// Loads a course with its modules and lessons.
    async fn load_course_with_lessons(&self, course_id: &str) -> CurriculumResult<Course>;

    /// Loads the learner's progress in a course.
    async fn load_progress(&self, course_id: &str) -> CurriculumResult<Progress>;

    /// Stores the module order of a course.
    async fn persist_module_order(&self, course_id: &str, module_ids: &[String]) -> CurriculumResult<()>;

    /// Stores the lesson order of one module.
    async fn persist_lesson_order(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_ids: &[String],
    ) -> CurriculumResult<()>;
}

/// Persists whatever a reorder changed.
///
/// Every call is attempted even after one fails; each failure is logged and the
/// first one is returned. The caller's tree is left as it is either way.
pub async fn persist_reorder<S: CourseService>(
    service: &S,
    course_id: &str,
    tree: &CurriculumTree,
    outcome: &ReorderOutcome,
) -> CurriculumResult<()> {
    let mut first_failure = None;

    if outcome.module_order_changed {
        let module_ids = tree.module_ids();
        match service.persist_module_order(course_id, &module_ids).await {
            Ok(()) => debug!(course = course_id, "persisted module order"),
            Err(err) => {
                warn!(course = course_id, error = %err, "failed to persist module order");
                first_failure.get_or_insert(as_persistence_failure("module order", err));
            }
        }
    }

    for module_id in &outcome.lesson_orders_changed {
        let target = format!("lesson order of module {}", module_id);
        let result = match tree.lesson_ids_of(module_id) {
            Ok(lesson_ids) => {
                service
                    .persist_lesson_order(course_id, module_id, &lesson_ids)
                    .await
            }
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => debug!(course = course_id, module = %module_id, "persisted lesson order"),
            Err(err) => {
                warn!(course = course_id, module = %module_id, error = %err, "failed to persist lesson order");
                first_failure.get_or_insert(as_persistence_failure(&target, err));
            }
        }
    }

    match first_failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

fn as_persistence_failure(target: &str, err: CurriculumError) -> CurriculumError {
    match err {
        err @ CurriculumError::PersistenceFailure { .. } => err,
        other => CurriculumError::persistence(target, other.to_string()),
    }
}
