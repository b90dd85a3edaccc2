//! One course-editing session: load, drag, optimistic mutate, persist.
//!
//! The session exclusively owns its tree. A drop is applied locally first and
//! the order-update calls follow. A failed call surfaces as a
//! `PersistenceFailure` but the local reorder is kept; `reload` is the way back
//! to the server's view.

use tracing::{debug, error, info, warn};

use crate::curriculum::{CurriculumManager, CurriculumTree, DragState, Lesson, ReorderOutcome};
use crate::editor::{EditHistory, HistoryConfig};
use crate::error::{CurriculumError, CurriculumResult};
use crate::progress::{self, Progress, ProgressSummary};
use crate::service::{persist_reorder, CourseService};

/// Editing session for one course.
pub struct EditSession<S: CourseService> {
    service: S,
    course_id: String,
    manager: CurriculumManager,
    progress: Progress,
    drag: DragState,
    history_config: HistoryConfig,
}

impl<S: CourseService> EditSession<S> {
    /// Loads the course and the learner's progress from the service.
    pub async fn load(service: S, course_id: &str) -> CurriculumResult<Self> {
        let course = service.load_course_with_lessons(course_id).await?;
        let progress = service.load_progress(course_id).await?;
        let manager = CurriculumManager::from_course(course)?;
        info!(course = course_id, "loaded course for editing");

        Ok(Self {
            service,
            course_id: course_id.to_string(),
            manager,
            progress,
            drag: DragState::new(),
            history_config: HistoryConfig::default(),
        })
    }

    /// Builder: Set the configuration used for new editor histories.
    pub fn with_history_config(mut self, config: HistoryConfig) -> Self {
        self.history_config = config;
        self
    }

    /// The course being edited.
    pub fn course_id(&self) -> &str {
        &self.course_id
    }

    /// The backing service.
    pub fn service(&self) -> &S {
        &self.service
    }

    /// Current tree.
    pub fn tree(&mut self) -> CurriculumResult<&CurriculumTree> {
        self.manager.state()
    }

    /// Direct access to the session document (structural CRUD, field setters).
    pub fn manager(&mut self) -> &mut CurriculumManager {
        &mut self.manager
    }

    /// Progress as last loaded.
    pub fn progress(&self) -> &Progress {
        &self.progress
    }

    /// Session snapshot bytes.
    pub fn snapshot(&mut self) -> Vec<u8> {
        self.manager.save()
    }

    // =========================================================================
    // DRAG AND DROP
    // =========================================================================

    /// Starts a drag. Returns false if one is already in flight.
    pub fn begin_drag(&mut self, id: &str) -> bool {
        let started = self.drag.begin(id);
        if !started {
            debug!(id, active = ?self.drag.active(), "drag already in flight");
        }
        started
    }

    /// Abandons the current drag.
    pub fn cancel_drag(&mut self) {
        self.drag.cancel();
    }

    /// Item currently being dragged.
    pub fn active_drag(&self) -> Option<&str> {
        self.drag.active()
    }

    /// Ends the current drag over `over_id` (`None`: dropped outside any item).
    pub async fn drop_on(&mut self, over_id: Option<&str>) -> CurriculumResult<ReorderOutcome> {
        match self.drag.finish(over_id) {
            Some((active, over)) => self.reorder(&active, &over).await,
            None => Ok(ReorderOutcome::unchanged()),
        }
    }

    /// Applies the drag `(active_id, over_id)` locally and persists it.
    pub async fn reorder(&mut self, active_id: &str, over_id: &str) -> CurriculumResult<ReorderOutcome> {
        let outcome = self
            .manager
            .apply_drag(active_id, over_id)
            .inspect_err(|err| log_rejection("reorder", err))?;
        if outcome.is_noop() {
            return Ok(outcome);
        }

        let tree = self.manager.state()?;
        persist_reorder(&self.service, &self.course_id, tree, &outcome).await?;
        Ok(outcome)
    }

    /// Throws away local state and reloads course and progress.
    pub async fn reload(&mut self) -> CurriculumResult<()> {
        let course = self.service.load_course_with_lessons(&self.course_id).await?;
        self.progress = self.service.load_progress(&self.course_id).await?;
        self.manager = CurriculumManager::from_course(course)?;
        self.drag.cancel();
        Ok(())
    }

    // =========================================================================
    // PROGRESS
    // =========================================================================

    /// Lesson the learner should resume at.
    pub fn continue_learning(&mut self) -> CurriculumResult<Option<Lesson>> {
        let tree = self.manager.state()?;
        Ok(progress::continue_learning(tree, &self.progress).cloned())
    }

    /// Completion percentage of the loaded progress.
    pub fn completion_percentage(&self) -> u8 {
        progress::completion_percentage(&self.progress)
    }

    /// Full progress summary against the current tree.
    pub fn progress_summary(&mut self) -> CurriculumResult<ProgressSummary> {
        let tree = self.manager.state()?;
        Ok(ProgressSummary::resolve(tree, &self.progress))
    }

    // =========================================================================
    // EDITOR
    // =========================================================================

    /// Opens a fresh edit history for a lesson body.
    pub fn open_editor(&mut self, lesson_id: &str, body: impl Into<String>) -> CurriculumResult<EditHistory> {
        if self.manager.state()?.lesson(lesson_id).is_none() {
            let err = CurriculumError::lesson_not_found(lesson_id);
            log_rejection("open editor", &err);
            return Err(err);
        }
        Ok(EditHistory::with_config(body.into(), self.history_config))
    }
}

/// Logs a rejected operation. Stale ids or indices are warnings, anything else
/// is an error.
fn log_rejection(operation: &str, err: &CurriculumError) {
    if err.is_invariant_violation() {
        warn!(operation, error = %err, "operation rejected: ids or indices out of date");
    } else {
        error!(operation, error = %err, user_message = err.user_message(), "operation failed");
    }
}
