//! In-memory course service.
//!
//! Holds courses and progress in process, records every order-update call, and
//! can be told to fail specific calls. A call that is rejected leaves the
//! stored course as it was. Backs the session tests and any caller that needs
//! a course service without a network.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::curriculum::{Course, CurriculumTree};
use crate::error::{CurriculumError, CurriculumResult};
use crate::progress::Progress;
use crate::service::CourseService;

/// One recorded order-update call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderCall {
    ModuleOrder {
        course_id: String,
        module_ids: Vec<String>,
    },
    LessonOrder {
        course_id: String,
        module_id: String,
        lesson_ids: Vec<String>,
    },
}

#[derive(Debug, Default)]
struct Store {
    courses: HashMap<String, Course>,
    progress: HashMap<String, Progress>,
    calls: Vec<OrderCall>,
    fail_module_order: bool,
    fail_lesson_order: HashSet<String>,
}

/// Course service backed by in-process maps.
#[derive(Debug, Default)]
pub struct MemoryCourseService {
    store: Mutex<Store>,
}

impl MemoryCourseService {
    /// Creates an empty service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder: Add a course.
    pub fn with_course(self, course: Course) -> Self {
        self.lock().courses.insert(course.id.clone(), course);
        self
    }

    /// Builder: Add progress for a course.
    pub fn with_progress(self, progress: Progress) -> Self {
        self.lock().progress.insert(progress.course_id.clone(), progress);
        self
    }

    /// Makes every module-order call fail until cleared.
    pub fn fail_module_order(&self, fail: bool) {
        self.lock().fail_module_order = fail;
    }

    /// Makes lesson-order calls for `module_id` fail.
    pub fn fail_lesson_order(&self, module_id: impl Into<String>) {
        self.lock().fail_lesson_order.insert(module_id.into());
    }

    /// Every order-update call received so far, failed ones included.
    pub fn calls(&self) -> Vec<OrderCall> {
        self.lock().calls.clone()
    }

    /// The course as the service currently stores it.
    pub fn stored_course(&self, course_id: &str) -> Option<Course> {
        self.lock().courses.get(course_id).cloned()
    }

    /// Replaces the stored course with the tree's current shape.
    pub fn store_tree(&self, tree: &CurriculumTree) {
        self.lock()
            .courses
            .insert(tree.course_id.clone(), tree.to_course());
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl CourseService for MemoryCourseService {
    async fn load_course_with_lessons(&self, course_id: &str) -> CurriculumResult<Course> {
        self.lock()
            .courses
            .get(course_id)
            .cloned()
            .ok_or_else(|| CurriculumError::serialization(format!("unknown course {}", course_id)))
    }

    async fn load_progress(&self, course_id: &str) -> CurriculumResult<Progress> {
        let mut store = self.lock();
        if let Some(progress) = store.progress.get(course_id) {
            return Ok(progress.clone());
        }
        let total = store
            .courses
            .get(course_id)
            .map(|c| c.lessons().count() as i64)
            .unwrap_or(0);
        let progress = Progress::new(course_id, 0, total);
        store.progress.insert(course_id.to_string(), progress.clone());
        Ok(progress)
    }

    async fn persist_module_order(&self, course_id: &str, module_ids: &[String]) -> CurriculumResult<()> {
        let mut store = self.lock();
        store.calls.push(OrderCall::ModuleOrder {
            course_id: course_id.to_string(),
            module_ids: module_ids.to_vec(),
        });
        if store.fail_module_order {
            return Err(CurriculumError::persistence("module order", "service unavailable"));
        }

        let course = store
            .courses
            .get_mut(course_id)
            .ok_or_else(|| CurriculumError::persistence("module order", "unknown course"))?;
        // Reorder a copy so a rejected call leaves the stored course untouched.
        let mut remaining = course.modules.clone();
        let mut reordered = Vec::with_capacity(module_ids.len());
        for (order, id) in module_ids.iter().enumerate() {
            let position = remaining
                .iter()
                .position(|m| &m.id == id)
                .ok_or_else(|| CurriculumError::persistence("module order", format!("unknown module {}", id)))?;
            let mut module = remaining.remove(position);
            module.order = order as u32;
            reordered.push(module);
        }
        reordered.append(&mut remaining);
        course.modules = reordered;
        Ok(())
    }

    async fn persist_lesson_order(
        &self,
        course_id: &str,
        module_id: &str,
        lesson_ids: &[String],
    ) -> CurriculumResult<()> {
        let mut store = self.lock();
        store.calls.push(OrderCall::LessonOrder {
            course_id: course_id.to_string(),
            module_id: module_id.to_string(),
            lesson_ids: lesson_ids.to_vec(),
        });
        let target = format!("lesson order of module {}", module_id);
        if store.fail_lesson_order.contains(module_id) {
            return Err(CurriculumError::persistence(target, "service unavailable"));
        }

        // Like the real backend, a lesson-order update may pull lessons in from
        // other modules of the same course.
        let course = store
            .courses
            .get_mut(course_id)
            .ok_or_else(|| CurriculumError::persistence(&target, "unknown course"))?;
        let mut modules = course.modules.clone();
        let mut lessons = Vec::with_capacity(lesson_ids.len());
        for (order, id) in lesson_ids.iter().enumerate() {
            let mut lesson = modules
                .iter_mut()
                .find_map(|m| m.lesson_index(id).map(|i| m.lessons.remove(i)))
                .ok_or_else(|| CurriculumError::persistence(&target, format!("unknown lesson {}", id)))?;
            lesson.order = order as u32;
            lessons.push(lesson);
        }
        let module = modules
            .iter_mut()
            .find(|m| m.id == module_id)
            .ok_or_else(|| CurriculumError::persistence(&target, "unknown module"))?;
        lessons.append(&mut module.lessons);
        module.lessons = lessons;
        course.modules = modules;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::{Lesson, Module};

    fn course() -> Course {
        Course::new("c-1", "Course")
            .with_module(
                Module::new("A", "A")
                    .with_lesson(Lesson::new("L1", "1"))
                    .with_lesson(Lesson::new("L2", "2")),
            )
            .with_module(Module::new("B", "B").with_order(1).with_lesson(Lesson::new("L3", "3")))
    }

    #[tokio::test]
    async fn test_default_progress_counts_lessons() {
        let service = MemoryCourseService::new().with_course(course());
        let progress = service.load_progress("c-1").await.unwrap();
        assert_eq!(progress.completed_lessons, 0);
        assert_eq!(progress.total_lessons, 3);
    }

    #[tokio::test]
    async fn test_lesson_order_moves_lessons_between_modules() {
        let service = MemoryCourseService::new().with_course(course());
        service
            .persist_lesson_order("c-1", "B", &["L2".to_string(), "L3".to_string()])
            .await
            .unwrap();

        let stored = service.stored_course("c-1").unwrap();
        assert_eq!(stored.modules[0].lesson_ids(), vec!["L1"]);
        assert_eq!(stored.modules[1].lesson_ids(), vec!["L2", "L3"]);
        assert_eq!(service.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_injected_failure_is_recorded() {
        let service = MemoryCourseService::new().with_course(course());
        service.fail_module_order(true);

        let err = service
            .persist_module_order("c-1", &["B".to_string(), "A".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CurriculumError::PersistenceFailure { .. }));
        assert_eq!(service.calls().len(), 1);
        assert_eq!(service.stored_course("c-1").unwrap().modules[0].id, "A");
    }

    #[tokio::test]
    async fn test_rejected_order_calls_leave_store_untouched() {
        let service = MemoryCourseService::new().with_course(course());
        let before = service.stored_course("c-1").unwrap();

        let err = service
            .persist_module_order("c-1", &["B".to_string(), "ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CurriculumError::PersistenceFailure { .. }));
        assert_eq!(service.stored_course("c-1").unwrap(), before);

        let err = service
            .persist_lesson_order("c-1", "A", &["L2".to_string(), "ghost".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, CurriculumError::PersistenceFailure { .. }));
        assert_eq!(service.stored_course("c-1").unwrap(), before);

        // A repeated id fails on its second occurrence.
        assert!(service
            .persist_module_order("c-1", &["B".to_string(), "B".to_string()])
            .await
            .is_err());
        assert!(service
            .persist_lesson_order("c-1", "nope", &["L1".to_string()])
            .await
            .is_err());
        assert_eq!(service.stored_course("c-1").unwrap(), before);
        assert_eq!(service.calls().len(), 4);
    }

    #[tokio::test]
    async fn test_store_tree_replaces_course() {
        let service = MemoryCourseService::new().with_course(course());
        let mut tree = CurriculumTree::from_course(course()).unwrap();
        tree.move_lesson_across_modules("A", "B", "L1", 0).unwrap();

        service.store_tree(&tree);
        let stored = service.load_course_with_lessons("c-1").await.unwrap();
        assert_eq!(stored.modules[0].lesson_ids(), vec!["L2"]);
        assert_eq!(stored.modules[1].lesson_ids(), vec!["L1", "L3"]);
    }
}
