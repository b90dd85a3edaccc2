//! Drag-and-drop reorder engine.
//!
//! A finished drag is reduced to the pair `(active_id, over_id)`. [`classify`]
//! turns that pair into one of three tree mutations (or nothing) without
//! touching the tree, and [`apply`] performs it. The UI layer only has to
//! produce the id pair, whatever its pointer or keyboard model looks like.
//!
//! Check order matters: module-over-module is tested before lesson containment,
//! so dragging a module is never mistaken for a lesson move.

use serde::Serialize;
use tracing::{debug, warn};

use crate::curriculum::model::CurriculumTree;
use crate::error::CurriculumResult;

// =============================================================================
// DRAG ACTION
// =============================================================================

/// The tree mutation a drag resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum DragAction {
    /// Nothing to do: same item, unknown ids, or an unsupported pairing.
    #[serde(rename = "none")]
    NoOp,
    #[serde(rename_all = "camelCase")]
    MoveModule { from: usize, to: usize },
    #[serde(rename_all = "camelCase")]
    MoveLessonWithinModule {
        module_id: String,
        from: usize,
        to: usize,
    },
    #[serde(rename_all = "camelCase")]
    MoveLessonAcrossModules {
        source_module_id: String,
        target_module_id: String,
        lesson_id: String,
        target_index: usize,
    },
}

/// What an applied drag changed, for driving the order-persistence calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderOutcome {
    pub action: DragAction,
    /// The top-level module order changed.
    pub module_order_changed: bool,
    /// Modules whose lesson order changed, source before target.
    pub lesson_orders_changed: Vec<String>,
}

impl ReorderOutcome {
    /// Outcome of a drag that changed nothing.
    pub fn unchanged() -> Self {
        Self {
            action: DragAction::NoOp,
            module_order_changed: false,
            lesson_orders_changed: Vec::new(),
        }
    }

    /// Returns true if the tree was not touched.
    pub fn is_noop(&self) -> bool {
        !self.module_order_changed && self.lesson_orders_changed.is_empty()
    }
}

// =============================================================================
// CLASSIFY / APPLY
// =============================================================================

/// Resolves a drag into the mutation it stands for. Pure.
pub fn classify(tree: &CurriculumTree, active_id: &str, over_id: &str) -> DragAction {
    if active_id == over_id {
        return DragAction::NoOp;
    }

    if let (Some(from), Some(to)) = (tree.module_index(active_id), tree.module_index(over_id)) {
        return DragAction::MoveModule { from, to };
    }

    let Some((source, from)) = tree.locate_lesson(active_id) else {
        return DragAction::NoOp;
    };
    let source_module = &tree.modules[source];

    if let Some(to) = source_module.lesson_index(over_id) {
        return DragAction::MoveLessonWithinModule {
            module_id: source_module.id.clone(),
            from,
            to,
        };
    }

    match tree.locate_lesson(over_id) {
        Some((target, target_index)) => DragAction::MoveLessonAcrossModules {
            source_module_id: source_module.id.clone(),
            target_module_id: tree.modules[target].id.clone(),
            lesson_id: active_id.to_string(),
            target_index,
        },
        None => DragAction::NoOp,
    }
}

/// Applies a classified action. On error the tree is unchanged.
pub fn apply(tree: &mut CurriculumTree, action: DragAction) -> CurriculumResult<ReorderOutcome> {
    let (module_order_changed, lesson_orders_changed) = match &action {
        DragAction::NoOp => return Ok(ReorderOutcome::unchanged()),
        DragAction::MoveModule { from, to } => {
            tree.move_module(*from, *to)?;
            (from != to, Vec::new())
        }
        DragAction::MoveLessonWithinModule {
            module_id,
            from,
            to,
        } => {
            tree.move_lesson_within_module(module_id, *from, *to)?;
            if from != to {
                (false, vec![module_id.clone()])
            } else {
                (false, Vec::new())
            }
        }
        DragAction::MoveLessonAcrossModules {
            source_module_id,
            target_module_id,
            lesson_id,
            target_index,
        } => {
            tree.move_lesson_across_modules(
                source_module_id,
                target_module_id,
                lesson_id,
                *target_index,
            )?;
            let mut changed = vec![source_module_id.clone()];
            if target_module_id != source_module_id {
                changed.push(target_module_id.clone());
            }
            (false, changed)
        }
    };

    Ok(ReorderOutcome {
        action,
        module_order_changed,
        lesson_orders_changed,
    })
}

/// Classifies a finished drag and applies it to the tree.
pub fn classify_and_apply(
    tree: &mut CurriculumTree,
    active_id: &str,
    over_id: &str,
) -> CurriculumResult<ReorderOutcome> {
    let action = classify(tree, active_id, over_id);
    debug!(active = active_id, over = over_id, ?action, "classified drag");
    apply(tree, action).inspect_err(|err| {
        warn!(active = active_id, over = over_id, error = %err, "drag could not be applied");
    })
}

// =============================================================================
// DRAG STATE
// =============================================================================

/// Tracks the one drag that may be in flight.
#[derive(Debug, Clone, Default)]
pub struct DragState {
    active: Option<String>,
}

impl DragState {
    /// Creates an idle drag state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts dragging `id`. Refused (returns false) while another drag is
    /// still in flight.
    pub fn begin(&mut self, id: impl Into<String>) -> bool {
        if self.active.is_some() {
            return false;
        }
        self.active = Some(id.into());
        true
    }

    /// Id of the item being dragged, if any.
    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Returns true while a drag is in flight.
    pub fn is_dragging(&self) -> bool {
        self.active.is_some()
    }

    /// Abandons the current drag.
    pub fn cancel(&mut self) {
        self.active = None;
    }

    /// Ends the drag over `over_id` and yields the `(active, over)` pair.
    /// A drop outside any item just ends the drag.
    pub fn finish(&mut self, over_id: Option<&str>) -> Option<(String, String)> {
        let active = self.active.take()?;
        over_id.map(|over| (active, over.to_string()))
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::curriculum::model::{Course, Lesson, Module};

    fn sample_tree() -> CurriculumTree {
        let course = Course::new("course-1", "Rust 101")
            .with_module(
                Module::new("A", "Basics")
                    .with_lesson(Lesson::new("L1", "One").with_order(0))
                    .with_lesson(Lesson::new("L2", "Two").with_order(1))
                    .with_lesson(Lesson::new("L3", "Three").with_order(2)),
            )
            .with_module(
                Module::new("B", "Ownership")
                    .with_order(1)
                    .with_lesson(Lesson::new("L4", "Four").with_order(0))
                    .with_lesson(Lesson::new("L5", "Five").with_order(1)),
            )
            .with_module(Module::new("C", "Empty").with_order(2));
        CurriculumTree::from_course(course).unwrap()
    }

    #[test]
    fn test_same_id_is_noop() {
        let tree = sample_tree();
        assert_eq!(classify(&tree, "L1", "L1"), DragAction::NoOp);
        assert_eq!(classify(&tree, "A", "A"), DragAction::NoOp);
    }

    #[test]
    fn test_module_over_module() {
        let mut tree = sample_tree();
        let lessons_before: Vec<_> = tree.modules.iter().map(|m| m.lessons.clone()).collect();

        let outcome = classify_and_apply(&mut tree, "C", "A").unwrap();
        assert_eq!(outcome.action, DragAction::MoveModule { from: 2, to: 0 });
        assert!(outcome.module_order_changed);
        assert!(outcome.lesson_orders_changed.is_empty());
        assert_eq!(tree.module_ids(), vec!["C", "A", "B"]);

        // No lesson sequence was touched.
        assert_eq!(tree.module("A").unwrap().lessons, lessons_before[0]);
        assert_eq!(tree.module("B").unwrap().lessons, lessons_before[1]);
    }

    #[test]
    fn test_lesson_within_module() {
        let mut tree = sample_tree();
        let outcome = classify_and_apply(&mut tree, "L1", "L3").unwrap();

        assert_eq!(
            outcome.action,
            DragAction::MoveLessonWithinModule {
                module_id: "A".into(),
                from: 0,
                to: 2
            }
        );
        assert_eq!(outcome.lesson_orders_changed, vec!["A"]);
        assert_eq!(tree.lesson_ids_of("A").unwrap(), vec!["L2", "L3", "L1"]);
    }

    #[test]
    fn test_lesson_across_modules_insert_before() {
        let mut tree = sample_tree();
        let outcome = classify_and_apply(&mut tree, "L1", "L5").unwrap();

        assert_eq!(
            outcome.action,
            DragAction::MoveLessonAcrossModules {
                source_module_id: "A".into(),
                target_module_id: "B".into(),
                lesson_id: "L1".into(),
                target_index: 1,
            }
        );
        assert_eq!(outcome.lesson_orders_changed, vec!["A", "B"]);
        assert!(!outcome.module_order_changed);
        assert_eq!(tree.lesson_ids_of("B").unwrap(), vec!["L4", "L1", "L5"]);
        assert_eq!(tree.lesson_ids_of("A").unwrap(), vec!["L2", "L3"]);
        assert!(tree.is_consistent());
    }

    #[test]
    fn test_unknown_or_unsupported_pairs_are_noops() {
        let mut tree = sample_tree();
        let before = tree.clone();

        // Unknown active id.
        assert!(classify_and_apply(&mut tree, "ghost", "L1").unwrap().is_noop());
        // Lesson dropped on unknown target.
        assert!(classify_and_apply(&mut tree, "L1", "ghost").unwrap().is_noop());
        // Lesson dropped on a module header.
        assert!(classify_and_apply(&mut tree, "L1", "C").unwrap().is_noop());
        // Module dropped on a lesson.
        assert!(classify_and_apply(&mut tree, "A", "L4").unwrap().is_noop());

        assert_eq!(tree, before);
    }

    #[test]
    fn test_stale_action_fails_without_mutation() {
        let mut tree = sample_tree();
        let before = tree.clone();
        let stale = DragAction::MoveLessonWithinModule {
            module_id: "B".into(),
            from: 0,
            to: 7,
        };

        assert!(apply(&mut tree, stale).is_err());
        assert_eq!(tree, before);
    }

    #[test]
    fn test_drag_state_single_flight() {
        let mut drag = DragState::new();
        assert!(drag.begin("L1"));
        assert!(!drag.begin("L2"));
        assert_eq!(drag.active(), Some("L1"));

        assert_eq!(drag.finish(Some("L3")), Some(("L1".into(), "L3".into())));
        assert!(!drag.is_dragging());

        assert!(drag.begin("L2"));
        assert_eq!(drag.finish(None), None);
        assert!(!drag.is_dragging());

        assert!(drag.begin("A"));
        drag.cancel();
        assert_eq!(drag.active(), None);
    }

    #[test]
    fn test_outcome_serializes_for_ui() {
        let outcome = ReorderOutcome {
            action: DragAction::MoveModule { from: 0, to: 1 },
            module_order_changed: true,
            lesson_orders_changed: Vec::new(),
        };
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["action"]["type"], "moveModule");
        assert_eq!(json["moduleOrderChanged"], true);
    }
}
