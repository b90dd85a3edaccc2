//! Learner progress and "continue learning" resolution.
//!
//! Progress is a bare completed-lesson count kept by the course service. It is
//! read against the tree's lesson order, on the assumption that lessons are
//! completed strictly in that order from the first one. Counts outside
//! `[0, total]` are tolerated: negative counts resume at the first lesson and
//! over-reported counts mean there is nothing left to resume.

use std::borrow::Borrow;

use serde::{Deserialize, Serialize};

use crate::curriculum::{CurriculumTree, Lesson};

// =============================================================================
// PROGRESS
// =============================================================================

/// Progress record as returned by the course service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub course_id: String,
    #[serde(default)]
    pub completed_lessons: i64,
    #[serde(default)]
    pub total_lessons: i64,
    /// Last lesson the learner opened, when the service tracks it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_lesson_id: Option<String>,
}

impl Progress {
    /// Creates a progress record.
    pub fn new(course_id: impl Into<String>, completed_lessons: i64, total_lessons: i64) -> Self {
        Self {
            course_id: course_id.into(),
            completed_lessons,
            total_lessons,
            last_lesson_id: None,
        }
    }

    /// Completed count clamped to `[0, total_lessons]`.
    pub fn clamped_completed(&self) -> i64 {
        self.completed_lessons.clamp(0, self.total_lessons.max(0))
    }

    /// Returns true if every lesson counts as completed.
    pub fn is_complete(&self) -> bool {
        self.total_lessons > 0 && self.completed_lessons >= self.total_lessons
    }

    /// Completion percentage, see [`completion_percentage`].
    pub fn percentage(&self) -> u8 {
        completion_percentage(self)
    }
}

// =============================================================================
// RESOLVER
// =============================================================================

/// Index of the lesson to resume at in a sequence of `len` lessons.
pub fn next_uncompleted_index(len: usize, completed_count: i64) -> Option<usize> {
    if len == 0 {
        return None;
    }
    if completed_count <= 0 {
        return Some(0);
    }
    usize::try_from(completed_count).ok().filter(|&i| i < len)
}

/// The lesson to resume at: the one right after the last completed lesson.
///
/// Empty sequences and counts at or past the end resolve to `None`. A pure
/// O(1) index, so `lessons` must already be in completion order.
pub fn next_uncompleted_lesson<L: Borrow<Lesson>>(lessons: &[L], completed_count: i64) -> Option<&Lesson> {
    next_uncompleted_index(lessons.len(), completed_count).map(|i| lessons[i].borrow())
}

/// `round(100 * clamp(completed, 0, total) / total)`, `0` when there are no
/// lessons. Halves round up.
pub fn completion_percentage(progress: &Progress) -> u8 {
    if progress.total_lessons <= 0 {
        return 0;
    }
    let total = progress.total_lessons as i128;
    let completed = progress.clamped_completed() as i128;
    ((200 * completed + total) / (2 * total)) as u8
}

/// Resolves the resume lesson against a tree's flattened lesson order.
pub fn continue_learning<'a>(tree: &'a CurriculumTree, progress: &Progress) -> Option<&'a Lesson> {
    let lessons: Vec<&'a Lesson> = tree.lessons().collect();
    next_uncompleted_index(lessons.len(), progress.completed_lessons).map(|i| lessons[i])
}

/// Everything a course page shows about a learner's progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub percentage: u8,
    pub next_lesson_id: Option<String>,
    pub remaining_lessons: usize,
    pub is_complete: bool,
}

impl ProgressSummary {
    /// Summarizes progress against the tree. The tree's own lesson count is
    /// used for the remaining count so a stale `total_lessons` cannot make it
    /// negative. A course without lessons is never complete, as with
    /// [`Progress::is_complete`].
    pub fn resolve(tree: &CurriculumTree, progress: &Progress) -> Self {
        let next = continue_learning(tree, progress);
        let done = usize::try_from(progress.completed_lessons.max(0)).unwrap_or(usize::MAX);
        Self {
            percentage: completion_percentage(progress),
            next_lesson_id: next.map(|l| l.id.clone()),
            remaining_lessons: tree.lesson_count().saturating_sub(done),
            is_complete: tree.lesson_count() > 0 && next.is_none(),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
