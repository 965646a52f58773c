//! Review notes synthesized when an annotation cannot be carried over
//! unambiguously.

use indexmap::IndexMap;

use crate::model::annotations::{Annotation, AnnotationHeader};

/// Text of the review note left on one candidate target.
pub fn todo_text(original: &Annotation, candidates: &[&str]) -> String {
    format!(
        "The annotation {} on {} could not be migrated automatically. \
         The element now corresponds to {}; check whether it applies here.",
        original.describe(),
        original.target(),
        candidates.join(", ")
    )
}

/// Review notes keyed by target, merged when several hit the same target.
#[derive(Debug, Default)]
pub struct TodoBoard {
    notes: IndexMap<String, Vec<String>>,
}

impl TodoBoard {
    pub fn push(&mut self, target: &str, text: String) {
        let notes = self.notes.entry(target.to_string()).or_default();
        if !notes.contains(&text) {
            notes.push(text);
        }
    }

    pub fn len(&self) -> usize {
        self.notes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty()
    }

    /// One unsure `Todo` per target, texts joined by newlines.
    pub fn into_annotations(self, author: &str) -> Vec<Annotation> {
        self.notes
            .into_iter()
            .map(|(target, notes)| {
                let mut todo = Annotation::Todo {
                    header: AnnotationHeader::new(target, author),
                    new_todo: notes.join("\n"),
                };
                todo.mark_unsure("ambiguous mapping".to_string());
                todo
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::annotations::ReviewResult;

    #[test]
    fn test_todo_text_mentions_payload_and_candidates() {
        let original = Annotation::Move {
            header: AnnotationHeader::new("pkg/mod/test", "alice"),
            destination: "pkg.other".into(),
        };
        let text = todo_text(&original, &["pkg/mod/a", "pkg/mod/b"]);
        assert!(text.contains("@Move"));
        assert!(text.contains("pkg.other"));
        assert!(text.contains("pkg/mod/test"));
        assert!(text.contains("pkg/mod/a, pkg/mod/b"));
    }

    #[test]
    fn test_notes_on_same_target_are_merged() {
        let mut board = TodoBoard::default();
        board.push("pkg/x", "first".into());
        board.push("pkg/y", "other".into());
        board.push("pkg/x", "second".into());
        board.push("pkg/x", "second".into());
        let todos = board.into_annotations("$migration$");
        assert_eq!(todos.len(), 2);
        match &todos[0] {
            Annotation::Todo { header, new_todo } => {
                assert_eq!(header.target, "pkg/x");
                assert_eq!(new_todo, "first\nsecond");
                assert_eq!(header.review_result, ReviewResult::Unsure);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
