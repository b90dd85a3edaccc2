//! Edit session tests against the in-memory course service: optimistic reorder,
//! order-update calls, failure without rollback, and reload.

use coursecraft::error::{ItemKind, REORDER_FAILED_MESSAGE};
use coursecraft::service::memory::OrderCall;
use coursecraft::{
    Course, CurriculumError, DragAction, EditSession, HistoryConfig, Lesson, LessonKind, MemoryCourseService,
    Module, Progress,
};

/// Module A = [L1, L2, L3], Module B = [L4, L5].
fn course() -> Course {
    Course::new("c-1", "Rust 101")
        .with_module(
            Module::new("A", "Basics")
                .with_lesson(Lesson::new("L1", "Hello").with_order(0))
                .with_lesson(Lesson::new("L2", "Cargo").with_order(1))
                .with_lesson(Lesson::new("L3", "Crates").with_order(2).with_kind(LessonKind::Text)),
        )
        .with_module(
            Module::new("B", "Ownership")
                .with_order(1)
                .with_lesson(Lesson::new("L4", "Moves").with_order(0))
                .with_lesson(Lesson::new("L5", "Borrows").with_order(1)),
        )
}

async fn session() -> EditSession<MemoryCourseService> {
    let service = MemoryCourseService::new()
        .with_course(course())
        .with_progress(Progress::new("c-1", 2, 5));
    EditSession::load(service, "c-1").await.unwrap()
}

fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_load_unknown_course_fails() {
    let result = EditSession::load(MemoryCourseService::new(), "missing").await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_module_drop_persists_module_order_only() {
    let mut session = session().await;

    let outcome = session.reorder("B", "A").await.unwrap();
    assert_eq!(outcome.action, DragAction::MoveModule { from: 1, to: 0 });
    assert!(outcome.module_order_changed);
    assert!(outcome.lesson_orders_changed.is_empty());

    assert_eq!(session.tree().unwrap().module_ids(), ids(&["B", "A"]));
    assert_eq!(
        session.service().calls(),
        vec![OrderCall::ModuleOrder {
            course_id: "c-1".to_string(),
            module_ids: ids(&["B", "A"]),
        }]
    );
    let stored = session.service().stored_course("c-1").unwrap();
    assert_eq!(stored.modules[0].id, "B");
    assert_eq!(stored.modules[1].lesson_ids(), ids(&["L1", "L2", "L3"]));
}

#[tokio::test]
async fn test_cross_module_drop_persists_source_then_target() {
    let mut session = session().await;

    session.reorder("L2", "L4").await.unwrap();

    let tree = session.tree().unwrap().clone();
    assert_eq!(tree.lesson_ids_of("A").unwrap(), ids(&["L1", "L3"]));
    assert_eq!(tree.lesson_ids_of("B").unwrap(), ids(&["L2", "L4", "L5"]));
    assert!(tree.is_consistent());

    assert_eq!(
        session.service().calls(),
        vec![
            OrderCall::LessonOrder {
                course_id: "c-1".to_string(),
                module_id: "A".to_string(),
                lesson_ids: ids(&["L1", "L3"]),
            },
            OrderCall::LessonOrder {
                course_id: "c-1".to_string(),
                module_id: "B".to_string(),
                lesson_ids: ids(&["L2", "L4", "L5"]),
            },
        ]
    );
    let stored = session.service().stored_course("c-1").unwrap();
    assert_eq!(stored.modules[0].lesson_ids(), ids(&["L1", "L3"]));
    assert_eq!(stored.modules[1].lesson_ids(), ids(&["L2", "L4", "L5"]));
}

#[tokio::test]
async fn test_failed_persistence_keeps_local_reorder() {
    let mut session = session().await;
    session.service().fail_lesson_order("B");

    let err = session.reorder("L2", "L4").await.unwrap_err();
    assert!(matches!(err, CurriculumError::PersistenceFailure { .. }));
    assert_eq!(err.user_message(), REORDER_FAILED_MESSAGE);

    // No rollback: the optimistic move stays in place.
    let tree = session.tree().unwrap().clone();
    assert_eq!(tree.lesson_ids_of("B").unwrap(), ids(&["L2", "L4", "L5"]));
    assert!(tree.is_consistent());

    let stored = session.service().stored_course("c-1").unwrap();
    assert_eq!(stored.modules[1].lesson_ids(), ids(&["L4", "L5"]));
}

#[tokio::test]
async fn test_every_call_is_attempted_after_a_failure() {
    let mut session = session().await;
    session.service().fail_lesson_order("A");

    let err = session.reorder("L2", "L4").await.unwrap_err();
    match err {
        CurriculumError::PersistenceFailure { target, .. } => assert!(target.contains('A')),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(session.service().calls().len(), 2);
}

#[tokio::test]
async fn test_reload_discards_unpersisted_changes() {
    let mut session = session().await;
    session.service().fail_module_order(true);

    assert!(session.reorder("B", "A").await.is_err());
    assert_eq!(session.tree().unwrap().module_ids(), ids(&["B", "A"]));

    session.reload().await.unwrap();
    assert_eq!(session.tree().unwrap().module_ids(), ids(&["A", "B"]));
}

#[tokio::test]
async fn test_noop_drops_issue_no_calls() {
    let mut session = session().await;

    assert!(session.reorder("L1", "L1").await.unwrap().is_noop());
    assert!(session.reorder("A", "L4").await.unwrap().is_noop());
    // Lesson dropped on a module header.
    assert!(session.reorder("L1", "B").await.unwrap().is_noop());
    assert!(session.reorder("ghost", "L1").await.unwrap().is_noop());

    assert!(session.service().calls().is_empty());
    assert_eq!(session.tree().unwrap().lesson_ids_of("A").unwrap(), ids(&["L1", "L2", "L3"]));
}

#[tokio::test]
async fn test_drag_lifecycle() {
    let mut session = session().await;

    assert!(session.begin_drag("L5"));
    assert!(!session.begin_drag("L1"));
    assert_eq!(session.active_drag(), Some("L5"));

    // Dropped outside any item.
    assert!(session.drop_on(None).await.unwrap().is_noop());
    assert_eq!(session.active_drag(), None);

    assert!(session.begin_drag("L5"));
    let outcome = session.drop_on(Some("L4")).await.unwrap();
    assert_eq!(
        outcome.action,
        DragAction::MoveLessonWithinModule {
            module_id: "B".to_string(),
            from: 1,
            to: 0,
        }
    );
    assert_eq!(outcome.lesson_orders_changed, ids(&["B"]));
    assert_eq!(session.tree().unwrap().lesson_ids_of("B").unwrap(), ids(&["L5", "L4"]));

    assert!(session.begin_drag("A"));
    session.cancel_drag();
    assert_eq!(session.active_drag(), None);
    assert_eq!(session.service().calls().len(), 1);
}

#[tokio::test]
async fn test_continue_learning_follows_tree_order() {
    let mut session = session().await;

    let next = session.continue_learning().unwrap().unwrap();
    assert_eq!(next.id, "L3");
    assert_eq!(session.completion_percentage(), 40);

    // Reordering changes which lesson comes next.
    session.reorder("L3", "L1").await.unwrap();
    let next = session.continue_learning().unwrap().unwrap();
    assert_eq!(next.id, "L2");

    let summary = session.progress_summary().unwrap();
    assert_eq!(summary.next_lesson_id.as_deref(), Some("L2"));
    assert_eq!(summary.remaining_lessons, 3);
    assert!(!summary.is_complete);
}

#[tokio::test]
async fn test_open_editor() {
    let mut session = session()
        .await
        .with_history_config(HistoryConfig::bounded(2));

    let mut history = session.open_editor("L3", "draft").unwrap();
    assert_eq!(history.config().max_depth, Some(2));
    history.record_edit("second".to_string());
    assert!(history.undo());
    assert_eq!(history.current(), "draft");

    let err = session.open_editor("nope", "").unwrap_err();
    assert!(matches!(
        err,
        CurriculumError::NotFound {
            kind: ItemKind::Lesson,
            ..
        }
    ));
    assert!(err.is_invariant_violation());
    assert_ne!(err.user_message(), REORDER_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_persistence_failure_is_not_an_invariant_violation() {
    let mut session = session().await;
    session.service().fail_module_order(true);

    let err = session.reorder("B", "A").await.unwrap_err();
    assert!(!err.is_invariant_violation());
    assert_eq!(err.user_message(), REORDER_FAILED_MESSAGE);
}

#[tokio::test]
async fn test_snapshot_restores_session_tree() {
    let mut session = session().await;
    session.reorder("L2", "L4").await.unwrap();

    let bytes = session.snapshot();
    let mut restored = coursecraft::CurriculumManager::from_bytes(&bytes).unwrap();
    assert_eq!(&restored.get_state().unwrap(), session.tree().unwrap());
}
