//! Structural operations on the Module→Lesson tree.
//!
//! Every operation validates its ids and indices before touching anything, so a
//! failed call leaves the tree exactly as it was. Only the one or two containers
//! an operation names get their `order` fields recomputed.

use std::collections::HashSet;

use tracing::debug;

use crate::curriculum::model::{Course, CurriculumTree, Lesson, Module};
use crate::curriculum::ordered::{self, Ordered};
use crate::error::{CurriculumError, CurriculumResult};

impl CurriculumTree {
    // =========================================================================
    // CONSTRUCTION
    // =========================================================================

    /// Creates an empty tree for a course.
    pub fn new(course_id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            course_id: course_id.into(),
            title: title.into(),
            modules: Vec::new(),
        }
    }

    /// Builds a tree from a loaded course payload.
    ///
    /// Modules and lessons are sorted by their incoming `order` and
    /// re-densified. Ids share one namespace: a repeated id is rejected
    /// whether it names a module or a lesson.
    pub fn from_course(course: Course) -> CurriculumResult<Self> {
        let mut ids = HashSet::new();
        for module in &course.modules {
            if !ids.insert(module.id.as_str()) {
                return Err(CurriculumError::duplicate_id(&module.id));
            }
            for lesson in &module.lessons {
                if !ids.insert(lesson.id.as_str()) {
                    return Err(CurriculumError::duplicate_id(&lesson.id));
                }
            }
        }

        let mut modules = course.modules;
        ordered::normalize(&mut modules);
        for module in &mut modules {
            ordered::normalize(&mut module.lessons);
        }

        Ok(Self {
            course_id: course.id,
            title: course.title,
            modules,
        })
    }

    /// Converts back into a course payload.
    pub fn to_course(&self) -> Course {
        Course {
            id: self.course_id.clone(),
            title: self.title.clone(),
            description: None,
            modules: self.modules.clone(),
        }
    }

    // =========================================================================
    // QUERIES
    // =========================================================================

    /// Gets a module by id.
    pub fn module(&self, module_id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == module_id)
    }

    /// Position of a module in the tree.
    pub fn module_index(&self, module_id: &str) -> Option<usize> {
        ordered::position(&self.modules, module_id)
    }

    /// Returns true if `id` names a module.
    pub fn is_module(&self, id: &str) -> bool {
        self.module_index(id).is_some()
    }

    /// Finds a lesson's `(module index, lesson index)`.
    pub fn locate_lesson(&self, lesson_id: &str) -> Option<(usize, usize)> {
        self.modules.iter().enumerate().find_map(|(mi, module)| {
            module.lesson_index(lesson_id).map(|li| (mi, li))
        })
    }

    /// Gets a lesson by id, wherever it lives.
    pub fn lesson(&self, lesson_id: &str) -> Option<&Lesson> {
        self.locate_lesson(lesson_id)
            .map(|(mi, li)| &self.modules[mi].lessons[li])
    }

    /// The module currently holding a lesson.
    pub fn module_of_lesson(&self, lesson_id: &str) -> Option<&Module> {
        self.locate_lesson(lesson_id).map(|(mi, _)| &self.modules[mi])
    }

    /// Returns true if `id` already names a module or a lesson.
    pub fn contains_id(&self, id: &str) -> bool {
        self.is_module(id) || self.locate_lesson(id).is_some()
    }

    /// Module ids in display order.
    pub fn module_ids(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.id.clone()).collect()
    }

    /// Lesson ids of one module in display order.
    pub fn lesson_ids_of(&self, module_id: &str) -> CurriculumResult<Vec<String>> {
        self.module(module_id)
            .map(Module::lesson_ids)
            .ok_or_else(|| CurriculumError::module_not_found(module_id))
    }

    /// Every lesson in tree order: module by module, lesson by lesson.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }

    /// Total number of lessons across all modules.
    pub fn lesson_count(&self) -> usize {
        self.modules.iter().map(|m| m.lessons.len()).sum()
    }

    /// Returns true if every container is densely ordered and all ids are unique.
    pub fn is_consistent(&self) -> bool {
        if !ordered::is_dense(&self.modules) {
            return false;
        }
        let mut ids = HashSet::new();
        for module in &self.modules {
            if !ids.insert(module.id.as_str()) || !ordered::is_dense(&module.lessons) {
                return false;
            }
            for lesson in &module.lessons {
                if !ids.insert(lesson.id.as_str()) {
                    return false;
                }
            }
        }
        true
    }

    // =========================================================================
    // MOVES
    // =========================================================================

    /// Moves a module from one position to another.
    pub fn move_module(&mut self, from: usize, to: usize) -> CurriculumResult<()> {
        ordered::reorder(&mut self.modules, from, to)?;
        debug!(course = %self.course_id, from, to, "moved module");
        Ok(())
    }

    /// Moves a lesson inside one module.
    pub fn move_lesson_within_module(
        &mut self,
        module_id: &str,
        from: usize,
        to: usize,
    ) -> CurriculumResult<()> {
        let module = self.module_mut(module_id)?;
        ordered::reorder(&mut module.lessons, from, to)?;
        debug!(module = module_id, from, to, "moved lesson within module");
        Ok(())
    }

    /// Moves a lesson out of `source_module_id` into `target_module_id` at
    /// `target_index`. The index is clamped to the target's length, so an
    /// out-of-range drop appends. Returns the index the lesson landed at.
    pub fn move_lesson_across_modules(
        &mut self,
        source_module_id: &str,
        target_module_id: &str,
        lesson_id: &str,
        target_index: usize,
    ) -> CurriculumResult<usize> {
        let source = self
            .module_index(source_module_id)
            .ok_or_else(|| CurriculumError::module_not_found(source_module_id))?;
        let target = self
            .module_index(target_module_id)
            .ok_or_else(|| CurriculumError::module_not_found(target_module_id))?;
        if !self.modules[source].contains_lesson(lesson_id) {
            return Err(CurriculumError::lesson_not_found(lesson_id));
        }

        // Validated above: both steps below are infallible, so the lesson is
        // never observable outside of exactly one module.
        let lesson = ordered::remove_by_id(&mut self.modules[source].lessons, lesson_id)
            .ok_or_else(|| CurriculumError::lesson_not_found(lesson_id))?;
        let landed =
            ordered::insert_clamped(&mut self.modules[target].lessons, Some(target_index), lesson);

        debug!(
            lesson = lesson_id,
            source = source_module_id,
            target = target_module_id,
            index = landed,
            "moved lesson across modules"
        );
        Ok(landed)
    }

    // =========================================================================
    // STRUCTURAL CRUD
    // =========================================================================

    /// Inserts a module at `at` (clamped; `None` appends). The module's own
    /// lessons are re-densified. Returns the index it landed at.
    pub fn insert_module(&mut self, at: Option<usize>, mut module: Module) -> CurriculumResult<usize> {
        if self.contains_id(&module.id) {
            return Err(CurriculumError::duplicate_id(&module.id));
        }
        let mut incoming = HashSet::from([module.id.as_str()]);
        for lesson in &module.lessons {
            if !incoming.insert(lesson.id.as_str()) || self.contains_id(&lesson.id) {
                return Err(CurriculumError::duplicate_id(&lesson.id));
            }
        }

        ordered::renumber(&mut module.lessons);
        let id = module.id.clone();
        let index = ordered::insert_clamped(&mut self.modules, at, module);
        debug!(module = %id, index, "inserted module");
        Ok(index)
    }

    /// Removes a module together with its lessons.
    pub fn remove_module(&mut self, module_id: &str) -> CurriculumResult<Module> {
        let module = ordered::remove_by_id(&mut self.modules, module_id)
            .ok_or_else(|| CurriculumError::module_not_found(module_id))?;
        debug!(module = module_id, lessons = module.lessons.len(), "removed module");
        Ok(module)
    }

    /// Inserts a lesson into a module at `at` (clamped; `None` appends).
    pub fn insert_lesson(
        &mut self,
        module_id: &str,
        at: Option<usize>,
        lesson: Lesson,
    ) -> CurriculumResult<usize> {
        let mi = self
            .module_index(module_id)
            .ok_or_else(|| CurriculumError::module_not_found(module_id))?;
        if self.contains_id(&lesson.id) {
            return Err(CurriculumError::duplicate_id(&lesson.id));
        }

        let id = lesson.id.clone();
        let index = ordered::insert_clamped(&mut self.modules[mi].lessons, at, lesson);
        debug!(module = module_id, lesson = %id, index, "inserted lesson");
        Ok(index)
    }

    /// Removes a lesson from a module.
    pub fn remove_lesson(&mut self, module_id: &str, lesson_id: &str) -> CurriculumResult<Lesson> {
        let module = self.module_mut(module_id)?;
        let lesson = ordered::remove_by_id(&mut module.lessons, lesson_id)
            .ok_or_else(|| CurriculumError::lesson_not_found(lesson_id))?;
        debug!(module = module_id, lesson = lesson_id, "removed lesson");
        Ok(lesson)
    }

    fn module_mut(&mut self, module_id: &str) -> CurriculumResult<&mut Module> {
        self.modules
            .iter_mut()
            .find(|m| m.id() == module_id)
            .ok_or_else(|| CurriculumError::module_not_found(module_id))
    }
}

// =============================================================================
// TESTS
// =============================================================================
