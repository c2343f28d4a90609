use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::TagId;

/// A user-set state on a tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionMark {
    Include,
    Exclude,
}

impl fmt::Display for SelectionMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// Map of tag id to its user-set mark.
///
/// A missing key means the tag is untouched. Each id carries at most one
/// mark. This type only stores marks; the rules about which marks are
/// allowed live in [`crate::selection`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SelectionState {
    marks: BTreeMap<TagId, SelectionMark>,
}

impl SelectionState {
    /// Creates an empty selection.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<SelectionMark> {
        self.marks.get(id).copied()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.marks.contains_key(id)
    }

    pub fn is_included(&self, id: &str) -> bool {
        self.get(id) == Some(SelectionMark::Include)
    }

    pub fn is_excluded(&self, id: &str) -> bool {
        self.get(id) == Some(SelectionMark::Exclude)
    }

    /// Sets a mark, replacing any previous one.
    pub fn mark(&mut self, id: TagId, mark: SelectionMark) {
        self.marks.insert(id, mark);
    }

    /// Removes any mark, returning the previous one.
    pub fn unmark(&mut self, id: &str) -> Option<SelectionMark> {
        self.marks.remove(id)
    }

    /// Keeps only the marks for which `keep` returns true.
    pub fn retain(&mut self, mut keep: impl FnMut(&TagId, SelectionMark) -> bool) {
        self.marks.retain(|id, mark| keep(id, *mark));
    }

    /// Iterates marks in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&TagId, SelectionMark)> {
        self.marks.iter().map(|(id, mark)| (id, *mark))
    }

    /// Returns the ids carrying `mark`, in id order.
    pub fn ids_with(&self, mark: SelectionMark) -> Vec<&TagId> {
        self.iter()
            .filter(|(_, m)| *m == mark)
            .map(|(id, _)| id)
            .collect()
    }

    pub fn has_any(&self, mark: SelectionMark) -> bool {
        self.marks.values().any(|m| *m == mark)
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_replaces_previous_state() {
        let mut state = SelectionState::new();
        state.mark(TagId::new("fracture"), SelectionMark::Include);
        state.mark(TagId::new("fracture"), SelectionMark::Exclude);

        assert_eq!(state.len(), 1);
        assert!(state.is_excluded("fracture"));
        assert!(!state.is_included("fracture"));
    }

    #[test]
    fn unmark_returns_previous_mark() {
        let mut state = SelectionState::new();
        state.mark(TagId::new("fracture"), SelectionMark::Include);

        assert_eq!(state.unmark("fracture"), Some(SelectionMark::Include));
        assert_eq!(state.unmark("fracture"), None);
        assert!(state.is_empty());
    }

    #[test]
    fn ids_with_lists_in_id_order() {
        let mut state = SelectionState::new();
        state.mark(TagId::new("salary_loss"), SelectionMark::Include);
        state.mark(TagId::new("exclude_worksite"), SelectionMark::Exclude);
        state.mark(TagId::new("fracture"), SelectionMark::Include);

        let included: Vec<&str> = state
            .ids_with(SelectionMark::Include)
            .into_iter()
            .map(TagId::as_str)
            .collect();
        assert_eq!(included, vec!["fracture", "salary_loss"]);
        assert!(state.has_any(SelectionMark::Exclude));
    }

    #[test]
    fn serializes_as_id_to_mark_object() {
        let mut state = SelectionState::new();
        state.mark(TagId::new("fracture"), SelectionMark::Include);

        let json = serde_json::to_string(&state).unwrap();
        assert_eq!(json, r#"{"fracture":"include"}"#);
    }
}
