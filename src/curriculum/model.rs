//! Data models for the curriculum tree.
//!
//! Wire shapes use camelCase to match the course REST payloads. The same structs
//! derive autosurgeon traits so the tree can live in a session snapshot document;
//! `Module` and `Lesson` reconcile keyed by `id`, so moving one is stored as a
//! move rather than a rewrite of every slot it passes.

use std::fmt;
use std::str::FromStr;

use autosurgeon::reconcile::NoKey;
use autosurgeon::{Hydrate, HydrateError, Reconcile, Reconciler};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::curriculum::ordered::Ordered;

// =============================================================================
// LESSON KIND
// =============================================================================

/// Media type of a lesson.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonKind {
    #[default]
    Video,
    Text,
}

impl LessonKind {
    /// Wire name of the kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            LessonKind::Video => "video",
            LessonKind::Text => "text",
        }
    }
}

impl fmt::Display for LessonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(LessonKind::Video),
            "text" => Ok(LessonKind::Text),
            other => Err(format!("unknown lesson kind '{}'", other)),
        }
    }
}

/// Stored as its wire string so documents stay readable from other clients.
impl Reconcile for LessonKind {
    type Key<'a> = NoKey;

    fn reconcile<R: Reconciler>(&self, mut reconciler: R) -> Result<(), R::Error> {
        reconciler.str(self.as_str())
    }
}

impl Hydrate for LessonKind {
    fn hydrate_string(s: &'_ str) -> Result<Self, HydrateError> {
        s.parse()
            .map_err(|_| HydrateError::unexpected("\"video\" or \"text\"", s.to_string()))
    }
}

// =============================================================================
// LESSON
// =============================================================================

/// A single content unit. Ids are unique across the whole tree.
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    #[key]
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub kind: LessonKind,
    /// Dense position within the owning module.
    #[serde(default)]
    pub order: u32,
    /// Display duration, e.g. "12:30".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

impl Lesson {
    /// Creates a new lesson with the given id and title.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            kind: LessonKind::default(),
            order: 0,
            duration: None,
            video_url: None,
        }
    }

    /// Creates a lesson with a freshly minted id.
    pub fn generated(title: impl Into<String>, kind: LessonKind) -> Self {
        Self::new(Uuid::new_v4().to_string(), title).with_kind(kind)
    }

    /// Builder: Set kind.
    pub fn with_kind(mut self, kind: LessonKind) -> Self {
        self.kind = kind;
        self
    }

    /// Builder: Set order.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Builder: Set duration.
    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    /// Builder: Set video URL.
    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }
}

impl Ordered for Lesson {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

// =============================================================================
// MODULE
// =============================================================================

/// A named, ordered group of lessons (a "section" in the course pages).
#[derive(Debug, Clone, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Module {
    #[key]
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Dense position within the tree.
    #[serde(default)]
    pub order: u32,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

impl Module {
    /// Creates a new empty module.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: None,
            order: 0,
            lessons: Vec::new(),
        }
    }

    /// Creates an empty module with a freshly minted id.
    pub fn generated(title: impl Into<String>) -> Self {
        Self::new(Uuid::new_v4().to_string(), title)
    }

    /// Builder: Set description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: Set order.
    pub fn with_order(mut self, order: u32) -> Self {
        self.order = order;
        self
    }

    /// Builder: Append a lesson. Its order is assigned when the tree is built.
    pub fn with_lesson(mut self, lesson: Lesson) -> Self {
        self.lessons.push(lesson);
        self
    }

    /// Position of a lesson inside this module.
    pub fn lesson_index(&self, lesson_id: &str) -> Option<usize> {
        self.lessons.iter().position(|l| l.id == lesson_id)
    }

    /// Returns true if this module directly holds the lesson.
    pub fn contains_lesson(&self, lesson_id: &str) -> bool {
        self.lesson_index(lesson_id).is_some()
    }

    /// Lesson ids in display order.
    pub fn lesson_ids(&self) -> Vec<String> {
        self.lessons.iter().map(|l| l.id.clone()).collect()
    }
}

impl Ordered for Module {
    fn id(&self) -> &str {
        &self.id
    }

    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}

// =============================================================================
// COURSE PAYLOAD
// =============================================================================

/// Course as returned by the course service, lessons grouped by module.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub modules: Vec<Module>,
}

impl Course {
    /// Creates a new course payload with no modules.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    /// Builder: Append a module.
    pub fn with_module(mut self, module: Module) -> Self {
        self.modules.push(module);
        self
    }

    /// Parses a course from its JSON payload.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// All lessons in payload order.
    pub fn lessons(&self) -> impl Iterator<Item = &Lesson> {
        self.modules.iter().flat_map(|m| m.lessons.iter())
    }
}

// =============================================================================
// CURRICULUM TREE
// =============================================================================

/// Module→Lesson hierarchy of one course. Owns its modules and, through them,
/// every lesson. Structural operations live in `tree.rs`.
#[derive(Debug, Clone, Default, Reconcile, Hydrate, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumTree {
    pub course_id: String,
    pub title: String,
    pub modules: Vec<Module>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lesson_builder() {
        let lesson = Lesson::new("l-1", "Intro")
            .with_kind(LessonKind::Text)
            .with_duration("05:00");

        assert_eq!(lesson.id, "l-1");
        assert_eq!(lesson.kind, LessonKind::Text);
        assert_eq!(lesson.duration.as_deref(), Some("05:00"));
        assert!(lesson.video_url.is_none());
    }

    #[test]
    fn test_generated_ids_are_distinct() {
        let a = Module::generated("A");
        let b = Module::generated("A");
        assert_ne!(a.id, b.id);

        let lesson = Lesson::generated("Untitled", LessonKind::Video);
        assert_eq!(lesson.id.len(), 36);
    }

    #[test]
    fn test_lesson_kind_parse() {
        assert_eq!("video".parse::<LessonKind>(), Ok(LessonKind::Video));
        assert_eq!("text".parse::<LessonKind>(), Ok(LessonKind::Text));
        assert!("quiz".parse::<LessonKind>().is_err());
    }

    #[test]
    fn test_course_json_camel_case() {
        let json = r#"{
            "id": "c-1",
            "title": "Rust 101",
            "modules": [
                {
                    "id": "m-1",
                    "title": "Basics",
                    "order": 0,
                    "lessons": [
                        { "id": "l-1", "title": "Hello", "kind": "video", "order": 0, "videoUrl": "https://cdn/1.mp4" },
                        { "id": "l-2", "title": "Notes", "kind": "text", "order": 1 }
                    ]
                }
            ]
        }"#;

        let course = Course::from_json(json).unwrap();
        assert_eq!(course.modules.len(), 1);
        let lessons: Vec<&Lesson> = course.lessons().collect();
        assert_eq!(lessons[0].video_url.as_deref(), Some("https://cdn/1.mp4"));
        assert_eq!(lessons[1].kind, LessonKind::Text);

        let back = serde_json::to_value(&course.modules[0].lessons[0]).unwrap();
        assert_eq!(back["videoUrl"], "https://cdn/1.mp4");
        assert_eq!(back["kind"], "video");
    }

    #[test]
    fn test_module_lesson_lookup() {
        let module = Module::new("m-1", "Basics")
            .with_lesson(Lesson::new("l-1", "One"))
            .with_lesson(Lesson::new("l-2", "Two"));

        assert_eq!(module.lesson_index("l-2"), Some(1));
        assert!(!module.contains_lesson("l-3"));
        assert_eq!(module.lesson_ids(), vec!["l-1", "l-2"]);
    }
}
