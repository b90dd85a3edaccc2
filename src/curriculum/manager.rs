//! CurriculumManager: the editing session's copy of the curriculum tree.
//!
//! The tree lives in an Automerge document so an unsaved editing session can be
//! snapshotted (`save`) and restored (`from_bytes`) without a round-trip to the
//! course service. Two kinds of operation:
//! - Structural operations via hydrate/reconcile (`try_update_state`). Module and
//!   lesson lists reconcile keyed by id, so a drag is stored as a move.
//! - Targeted O(1) field setters via direct puts for high-frequency text edits.

use automerge::{transaction::Transactable, AutoCommit, ObjId, ReadDoc, ScalarValue, Value, ROOT};
use autosurgeon::{hydrate, reconcile};
use paste::paste;

use crate::curriculum::model::{Course, CurriculumTree, Lesson, Module};
use crate::curriculum::reorder::{self, ReorderOutcome};
use crate::error::{CurriculumError, CurriculumResult};

// =============================================================================
// FIELD SETTER MACRO
// =============================================================================

/// Generates O(1) setters for optional string fields.
/// All setters follow the same path: cache invalidate → locate ObjId → put.
macro_rules! optional_field_setters {
    ($entity:ident, $locate:ident, [$($field:ident),* $(,)?]) => {
        paste! {
            $(
                #[doc = concat!("Sets the ", stringify!($entity), " `", stringify!($field), "` field (O(1) targeted update).")]
                pub fn [<set_ $entity _ $field>](&mut self, id: &str, value: Option<&str>) -> CurriculumResult<()> {
                    let obj = self.$locate(id)?;
                    self.put_opt_str(&obj, stringify!($field), value)
                }
            )*
        }
    };
}

// =============================================================================
// CURRICULUM MANAGER
// =============================================================================

/// Document-backed curriculum tree for one course-editing session.
pub struct CurriculumManager {
    doc: AutoCommit,
    /// Cached hydrated state - invalidated after direct document mutations.
    cached_state: Option<CurriculumTree>,
}

impl CurriculumManager {
    // =========================================================================
    // INITIALIZATION
    // =========================================================================

    /// Creates a manager holding `tree`.
    pub fn new(tree: CurriculumTree) -> CurriculumResult<Self> {
        let mut doc = AutoCommit::new();
        reconcile(&mut doc, &tree)?;
        Ok(Self {
            doc,
            cached_state: Some(tree),
        })
    }

    /// Creates a manager from a loaded course payload.
    pub fn from_course(course: Course) -> CurriculumResult<Self> {
        Self::new(CurriculumTree::from_course(course)?)
    }

    /// Restores a manager from a saved snapshot.
    pub fn from_bytes(bytes: &[u8]) -> CurriculumResult<Self> {
        let doc = AutoCommit::load(bytes)?;
        Ok(Self {
            doc,
            cached_state: None,
        })
    }

    /// Saves the session snapshot to binary format.
    pub fn save(&mut self) -> Vec<u8> {
        self.doc.save()
    }

    // =========================================================================
    // HIGH-LEVEL OPERATIONS (via Hydrate/Reconcile)
    // =========================================================================

    /// Hydrates the tree (cloned from the cache when possible).
    pub fn get_state(&mut self) -> CurriculumResult<CurriculumTree> {
        Ok(self.state()?.clone())
    }

    /// Borrows the hydrated tree.
    pub fn state(&mut self) -> CurriculumResult<&CurriculumTree> {
        if self.cached_state.is_none() {
            let state: CurriculumTree = hydrate(&self.doc)?;
            self.cached_state = Some(state);
        }
        self.cached_state
            .as_ref()
            .ok_or_else(|| CurriculumError::serialization("curriculum state unavailable"))
    }

    /// Applies an infallible mutation, then reconciles back to the document.
    pub fn update_state<F>(&mut self, f: F) -> CurriculumResult<()>
    where
        F: FnOnce(&mut CurriculumTree),
    {
        self.try_update_state(|state| {
            f(state);
            Ok(())
        })
    }

    /// Applies a fallible mutation. The document is only touched if `f` succeeds.
    pub fn try_update_state<T, F>(&mut self, f: F) -> CurriculumResult<T>
    where
        F: FnOnce(&mut CurriculumTree) -> CurriculumResult<T>,
    {
        let mut state = self.get_state()?;
        let value = f(&mut state)?;
        reconcile(&mut self.doc, &state)?;
        self.cached_state = Some(state);
        Ok(value)
    }

    // =========================================================================
    // STRUCTURAL OPERATIONS
    // =========================================================================

    /// Moves a module from one position to another.
    pub fn move_module(&mut self, from: usize, to: usize) -> CurriculumResult<()> {
        self.try_update_state(|tree| tree.move_module(from, to))
    }

    /// Moves a lesson inside one module.
    pub fn move_lesson_within_module(
        &mut self,
        module_id: &str,
        from: usize,
        to: usize,
    ) -> CurriculumResult<()> {
        self.try_update_state(|tree| tree.move_lesson_within_module(module_id, from, to))
    }

    /// Moves a lesson into another module (target index clamped).
    pub fn move_lesson_across_modules(
        &mut self,
        source_module_id: &str,
        target_module_id: &str,
        lesson_id: &str,
        target_index: usize,
    ) -> CurriculumResult<usize> {
        self.try_update_state(|tree| {
            tree.move_lesson_across_modules(source_module_id, target_module_id, lesson_id, target_index)
        })
    }

    /// Inserts a module (`None` appends).
    pub fn insert_module(&mut self, at: Option<usize>, module: Module) -> CurriculumResult<usize> {
        self.try_update_state(|tree| tree.insert_module(at, module))
    }

    /// Removes a module and its lessons.
    pub fn remove_module(&mut self, module_id: &str) -> CurriculumResult<Module> {
        self.try_update_state(|tree| tree.remove_module(module_id))
    }

    /// Inserts a lesson into a module (`None` appends).
    pub fn insert_lesson(
        &mut self,
        module_id: &str,
        at: Option<usize>,
        lesson: Lesson,
    ) -> CurriculumResult<usize> {
        self.try_update_state(|tree| tree.insert_lesson(module_id, at, lesson))
    }

    /// Removes a lesson from a module.
    pub fn remove_lesson(&mut self, module_id: &str, lesson_id: &str) -> CurriculumResult<Lesson> {
        self.try_update_state(|tree| tree.remove_lesson(module_id, lesson_id))
    }

    /// Classifies and applies a finished drag.
    pub fn apply_drag(&mut self, active_id: &str, over_id: &str) -> CurriculumResult<ReorderOutcome> {
        let action = reorder::classify(self.state()?, active_id, over_id);
        if action == reorder::DragAction::NoOp {
            return Ok(ReorderOutcome::unchanged());
        }
        self.try_update_state(|tree| reorder::apply(tree, action))
    }

    // =========================================================================
    // TARGETED FIELD SETTERS (Direct put, O(1))
    // =========================================================================

    /// Sets a module title (O(1)).
    pub fn set_module_title(&mut self, module_id: &str, title: &str) -> CurriculumResult<()> {
        let obj = self.module_obj(module_id)?;
        self.put_str(&obj, "title", title)
    }

    /// Sets a lesson title (O(1)).
    pub fn set_lesson_title(&mut self, lesson_id: &str, title: &str) -> CurriculumResult<()> {
        let obj = self.lesson_obj(lesson_id)?;
        self.put_str(&obj, "title", title)
    }

    optional_field_setters!(module, module_obj, [description]);
    optional_field_setters!(lesson, lesson_obj, [duration, video_url]);

    // =========================================================================
    // INTERNAL HELPERS
    // =========================================================================

    fn put_str(&mut self, obj: &ObjId, key: &str, value: &str) -> CurriculumResult<()> {
        self.cached_state = None;
        self.doc.put(obj, key, ScalarValue::Str(value.into()))?;
        Ok(())
    }

    /// Writes null for `None`, matching what reconcile writes for an absent option.
    fn put_opt_str(&mut self, obj: &ObjId, key: &str, value: Option<&str>) -> CurriculumResult<()> {
        self.cached_state = None;
        match value {
            Some(v) => self.doc.put(obj, key, ScalarValue::Str(v.into()))?,
            None => self.doc.put(obj, key, ScalarValue::Null)?,
        }
        Ok(())
    }

    /// Gets the ObjId of a module map.
    fn module_obj(&mut self, module_id: &str) -> CurriculumResult<ObjId> {
        let index = self
            .state()?
            .module_index(module_id)
            .ok_or_else(|| CurriculumError::module_not_found(module_id))?;
        let modules = self.get_obj_at_key(&ROOT, "modules")?;
        self.get_obj_at_index(&modules, index)
    }

    /// Gets the ObjId of a lesson map.
    fn lesson_obj(&mut self, lesson_id: &str) -> CurriculumResult<ObjId> {
        let (mi, li) = self
            .state()?
            .locate_lesson(lesson_id)
            .ok_or_else(|| CurriculumError::lesson_not_found(lesson_id))?;
        let modules = self.get_obj_at_key(&ROOT, "modules")?;
        let module = self.get_obj_at_index(&modules, mi)?;
        let lessons = self.get_obj_at_key(&module, "lessons")?;
        self.get_obj_at_index(&lessons, li)
    }

    /// Gets an object ID at a map key.
    fn get_obj_at_key(&self, parent: &ObjId, key: &str) -> CurriculumResult<ObjId> {
        match self.doc.get(parent, key)? {
            Some((Value::Object(_), obj_id)) => Ok(obj_id),
            Some(_) => Err(CurriculumError::serialization(format!(
                "'{}' is not an object",
                key
            ))),
            None => Err(CurriculumError::serialization(format!("missing '{}'", key))),
        }
    }

    /// Gets an object ID at a list index.
    fn get_obj_at_index(&self, parent: &ObjId, index: usize) -> CurriculumResult<ObjId> {
        match self.doc.get(parent, index)? {
            Some((Value::Object(_), obj_id)) => Ok(obj_id),
            Some(_) => Err(CurriculumError::serialization(format!(
                "list entry {} is not an object",
                index
            ))),
            None => Err(CurriculumError::index_out_of_range(
                index,
                self.doc.length(parent),
            )),
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================
