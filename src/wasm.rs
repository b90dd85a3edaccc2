//! WASM bindings for the curriculum builder.
//!
//! JavaScript-friendly wrappers around [`CurriculumManager`] and
//! [`EditHistory`]. Persistence stays on the JS side: `onDragEnd` returns the
//! reorder outcome and the page issues the order-update calls it lists.

use js_sys::Uint8Array;
use serde::Serialize;
use serde_wasm_bindgen::{from_value, Serializer};
use wasm_bindgen::prelude::*;

use crate::curriculum::{Course, CurriculumManager, Lesson, LessonKind, Module};
use crate::editor::{EditHistory, HistoryConfig};
use crate::error::CurriculumError;
use crate::progress::{self, Progress, ProgressSummary};

/// Serialize a value to JsValue with maps as plain JS objects.
fn to_js_value<T: Serialize>(value: &T) -> Result<JsValue, serde_wasm_bindgen::Error> {
    value.serialize(&Serializer::new().serialize_maps_as_objects(true))
}

/// Helper macro for Result conversion
macro_rules! js_result {
    ($expr:expr) => {
        $expr.map_err(|e: CurriculumError| JsValue::from_str(&e.to_string()))
    };
}

// =============================================================================
// CURRICULUM MANAGER
// =============================================================================

/// JavaScript-friendly wrapper around CurriculumManager.
#[wasm_bindgen]
pub struct JsCurriculumManager {
    inner: CurriculumManager,
}

#[wasm_bindgen]
impl JsCurriculumManager {
    /// Creates a manager from a course payload object.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const course = await fetch(`/api/v1/courses/${id}?include=lessons`).then(r => r.json());
    /// const manager = new JsCurriculumManager(course);
    /// ```
    #[wasm_bindgen(constructor)]
    pub fn new(course: JsValue) -> Result<JsCurriculumManager, JsValue> {
        let course: Course = from_value(course)?;
        let inner = js_result!(CurriculumManager::from_course(course))?;
        Ok(JsCurriculumManager { inner })
    }

    /// Restores a session snapshot (Uint8Array).
    #[wasm_bindgen(js_name = fromBytes)]
    pub fn from_bytes(bytes: &[u8]) -> Result<JsCurriculumManager, JsValue> {
        let inner = js_result!(CurriculumManager::from_bytes(bytes))?;
        Ok(JsCurriculumManager { inner })
    }

    /// Saves a session snapshot (returns Uint8Array).
    #[wasm_bindgen(js_name = toBytes)]
    pub fn to_bytes(&mut self) -> Uint8Array {
        let bytes = self.inner.save();
        Uint8Array::from(&bytes[..])
    }

    /// Gets the full tree as a JavaScript object.
    #[wasm_bindgen(js_name = getState)]
    pub fn get_state(&mut self) -> Result<JsValue, JsValue> {
        let state = js_result!(self.inner.get_state())?;
        Ok(to_js_value(&state)?)
    }

    /// Ordered module ids.
    #[wasm_bindgen(js_name = moduleIds)]
    pub fn module_ids(&mut self) -> Result<Vec<String>, JsValue> {
        Ok(js_result!(self.inner.state())?.module_ids())
    }

    /// Ordered lesson ids of one module.
    #[wasm_bindgen(js_name = lessonIds)]
    pub fn lesson_ids(&mut self, module_id: &str) -> Result<Vec<String>, JsValue> {
        let tree = js_result!(self.inner.state())?;
        js_result!(tree.lesson_ids_of(module_id))
    }

    // =========================================================================
    // DRAG AND DROP
    // =========================================================================

    /// Applies a finished drag and returns the outcome.
    ///
    /// # Example (JavaScript)
    /// ```js
    /// const outcome = manager.onDragEnd(active.id, over.id);
    /// if (outcome.moduleOrderChanged) await saveModuleOrder(manager.moduleIds());
    /// for (const m of outcome.lessonOrdersChanged) await saveLessonOrder(m, manager.lessonIds(m));
    /// ```
    #[wasm_bindgen(js_name = onDragEnd)]
    pub fn on_drag_end(&mut self, active_id: &str, over_id: &str) -> Result<JsValue, JsValue> {
        let outcome = js_result!(self.inner.apply_drag(active_id, over_id))?;
        Ok(to_js_value(&outcome)?)
    }

    /// Moves a module.
    #[wasm_bindgen(js_name = moveModule)]
    pub fn move_module(&mut self, from: usize, to: usize) -> Result<(), JsValue> {
        js_result!(self.inner.move_module(from, to))
    }

    /// Moves a lesson inside a module.
    #[wasm_bindgen(js_name = moveLessonWithinModule)]
    pub fn move_lesson_within_module(&mut self, module_id: &str, from: usize, to: usize) -> Result<(), JsValue> {
        js_result!(self.inner.move_lesson_within_module(module_id, from, to))
    }

    /// Moves a lesson to another module. Returns the index it landed at.
    #[wasm_bindgen(js_name = moveLessonAcrossModules)]
    pub fn move_lesson_across_modules(
        &mut self,
        source_module_id: &str,
        target_module_id: &str,
        lesson_id: &str,
        target_index: usize,
    ) -> Result<usize, JsValue> {
        js_result!(self.inner.move_lesson_across_modules(
            source_module_id,
            target_module_id,
            lesson_id,
            target_index
        ))
    }

    // =========================================================================
    // STRUCTURAL CRUD
    // =========================================================================

    /// Adds an empty module with a generated id. Returns the id.
    #[wasm_bindgen(js_name = addModule)]
    pub fn add_module(&mut self, title: &str, at: Option<usize>) -> Result<String, JsValue> {
        let module = Module::generated(title);
        let id = module.id.clone();
        js_result!(self.inner.insert_module(at, module))?;
        Ok(id)
    }

    /// Removes a module and its lessons.
    #[wasm_bindgen(js_name = removeModule)]
    pub fn remove_module(&mut self, module_id: &str) -> Result<(), JsValue> {
        js_result!(self.inner.remove_module(module_id)).map(|_| ())
    }

    /// Adds a lesson with a generated id. `kind` is "video" or "text".
    #[wasm_bindgen(js_name = addLesson)]
    pub fn add_lesson(
        &mut self,
        module_id: &str,
        title: &str,
        kind: &str,
        at: Option<usize>,
    ) -> Result<String, JsValue> {
        let kind: LessonKind = kind.parse().map_err(|e: String| JsValue::from_str(&e))?;
        let lesson = Lesson::generated(title, kind);
        let id = lesson.id.clone();
        js_result!(self.inner.insert_lesson(module_id, at, lesson))?;
        Ok(id)
    }

    /// Removes a lesson.
    #[wasm_bindgen(js_name = removeLesson)]
    pub fn remove_lesson(&mut self, module_id: &str, lesson_id: &str) -> Result<(), JsValue> {
        js_result!(self.inner.remove_lesson(module_id, lesson_id)).map(|_| ())
    }

    // =========================================================================
    // FIELD SETTERS
    // =========================================================================

    /// Sets the module title (O(1)).
    #[wasm_bindgen(js_name = setModuleTitle)]
    pub fn set_module_title(&mut self, module_id: &str, title: &str) -> Result<(), JsValue> {
        js_result!(self.inner.set_module_title(module_id, title))
    }

    /// Sets the module description (O(1)).
    #[wasm_bindgen(js_name = setModuleDescription)]
    pub fn set_module_description(&mut self, module_id: &str, description: Option<String>) -> Result<(), JsValue> {
        js_result!(self.inner.set_module_description(module_id, description.as_deref()))
    }

    /// Sets the lesson title (O(1)).
    #[wasm_bindgen(js_name = setLessonTitle)]
    pub fn set_lesson_title(&mut self, lesson_id: &str, title: &str) -> Result<(), JsValue> {
        js_result!(self.inner.set_lesson_title(lesson_id, title))
    }

    /// Sets the lesson duration (O(1)).
    #[wasm_bindgen(js_name = setLessonDuration)]
    pub fn set_lesson_duration(&mut self, lesson_id: &str, duration: Option<String>) -> Result<(), JsValue> {
        js_result!(self.inner.set_lesson_duration(lesson_id, duration.as_deref()))
    }

    /// Sets the lesson video URL (O(1)).
    #[wasm_bindgen(js_name = setLessonVideoUrl)]
    pub fn set_lesson_video_url(&mut self, lesson_id: &str, url: Option<String>) -> Result<(), JsValue> {
        js_result!(self.inner.set_lesson_video_url(lesson_id, url.as_deref()))
    }

    // =========================================================================
    // PROGRESS
    // =========================================================================

    /// Id of the lesson to resume at, or undefined when nothing is left.
    #[wasm_bindgen(js_name = nextUncompletedLesson)]
    pub fn next_uncompleted_lesson(&mut self, completed_count: i64) -> Result<Option<String>, JsValue> {
        let tree = js_result!(self.inner.state())?;
        let learner = Progress::new(tree.course_id.clone(), completed_count, tree.lesson_count() as i64);
        Ok(progress::continue_learning(tree, &learner).map(|l| l.id.clone()))
    }

    /// Progress summary for a progress payload object.
    #[wasm_bindgen(js_name = progressSummary)]
    pub fn progress_summary(&mut self, progress: JsValue) -> Result<JsValue, JsValue> {
        let learner: Progress = from_value(progress)?;
        let tree = js_result!(self.inner.state())?;
        Ok(to_js_value(&ProgressSummary::resolve(tree, &learner))?)
    }
}

// =============================================================================
// EDIT HISTORY
// =============================================================================

/// JavaScript-friendly wrapper around EditHistory.
#[wasm_bindgen]
pub struct JsEditHistory {
    inner: EditHistory,
}

#[wasm_bindgen]
impl JsEditHistory {
    /// Starts a history at `initial`. `maxDepth` bounds the undo stack.
    #[wasm_bindgen(constructor)]
    pub fn new(initial: String, max_depth: Option<usize>) -> JsEditHistory {
        let config = match max_depth {
            Some(depth) => HistoryConfig::bounded(depth),
            None => HistoryConfig::unbounded(),
        };
        JsEditHistory {
            inner: EditHistory::with_config(initial, config),
        }
    }

    /// Current content.
    #[wasm_bindgen(getter)]
    pub fn content(&self) -> String {
        self.inner.current().clone()
    }

    /// Records an edit.
    #[wasm_bindgen(js_name = recordEdit)]
    pub fn record_edit(&mut self, content: String) {
        self.inner.record_edit(content);
    }

    /// Undoes the last edit. Returns false if there was nothing to undo.
    pub fn undo(&mut self) -> bool {
        self.inner.undo()
    }

    /// Redoes the last undo. Returns false if there was nothing to redo.
    pub fn redo(&mut self) -> bool {
        self.inner.redo()
    }

    #[wasm_bindgen(js_name = canUndo)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(js_name = canRedo)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }
}
