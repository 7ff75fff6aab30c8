//! Checklist tracking
//!
//! Each phase owns one ordered checklist (ingredients or steps). Items are
//! identified by their text, matched case-insensitively against what the
//! vision provider reports. Completion is monotonic within a phase: once an
//! item is marked done it stays done until the phase resets.

use serde::{Deserialize, Serialize};

/// One required ingredient or recipe step
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChecklistItem {
    /// Immutable identity key; matched case-insensitively after trimming
    pub text: String,
    pub completed: bool,
}

impl ChecklistItem {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            completed: false,
        }
    }
}

/// How observed texts are matched against checklist item texts.
///
/// `Exact` is the contract: case-insensitive equality after trimming.
/// `Contains` (either text containing the other) is a deliberately looser
/// mode that callers must opt into explicitly; it is never the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchMode {
    #[default]
    Exact,
    Contains,
}

/// What the seen-history records when an observation is applied.
///
/// The preparation phase remembers everything the provider reported seeing
/// (so it is never re-announced); the cooking phase only remembers steps
/// that actually completed, since its history block reads back to the model
/// as "previously completed steps".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryPolicy {
    RecordObserved,
    RecordCompleted,
}

impl MatchMode {
    fn matches(self, observed: &str, item: &str) -> bool {
        let observed = observed.trim().to_lowercase();
        let item = item.trim().to_lowercase();
        match self {
            MatchMode::Exact => observed == item,
            MatchMode::Contains => observed.contains(&item) || item.contains(&observed),
        }
    }
}

/// Append-only record of observed item texts within a phase.
///
/// Keys are normalized (lowercased, trimmed); the stored value keeps the
/// casing of the first observation. Insertion order is preserved so the
/// prompt block reads back in the order things were first seen.
#[derive(Debug, Clone, Default)]
pub struct SeenHistory {
    entries: Vec<(String, String)>,
}

impl SeenHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert if the normalized text is not already present.
    /// Returns true when the entry is new.
    pub fn insert(&mut self, text: &str) -> bool {
        let key = text.trim().to_lowercase();
        if key.is_empty() || self.entries.iter().any(|(k, _)| *k == key) {
            return false;
        }
        self.entries.push((key, text.trim().to_string()));
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        let key = text.trim().to_lowercase();
        self.entries.iter().any(|(k, _)| *k == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Phase reset. The only way entries are ever removed.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Render as the dash list fed back into the next prompt
    pub fn as_prompt_block(&self) -> String {
        self.entries
            .iter()
            .map(|(_, original)| format!("- {}", original))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// An ordered checklist plus the seen-history for its phase
#[derive(Debug, Clone)]
pub struct Checklist {
    items: Vec<ChecklistItem>,
    seen: SeenHistory,
}

impl Checklist {
    pub fn new(texts: &[String]) -> Self {
        Self {
            items: texts.iter().map(ChecklistItem::new).collect(),
            seen: SeenHistory::new(),
        }
    }

    pub fn items(&self) -> &[ChecklistItem] {
        &self.items
    }

    pub fn seen(&self) -> &SeenHistory {
        &self.seen
    }

    /// True iff every item is completed
    pub fn all_ready(&self) -> bool {
        self.items.iter().all(|item| item.completed)
    }

    pub fn completed_count(&self) -> usize {
        self.items.iter().filter(|item| item.completed).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// First item not yet completed, in checklist order
    pub fn next_incomplete(&self) -> Option<&ChecklistItem> {
        self.items.iter().find(|item| !item.completed)
    }

    /// Item after the next incomplete one, for "coming up" prompts
    pub fn following_incomplete(&self) -> Option<&ChecklistItem> {
        let idx = self.items.iter().position(|item| !item.completed)?;
        self.items.get(idx + 1)
    }

    /// Apply one observation from the vision provider.
    ///
    /// Marks matching non-completed items as completed and appends to the
    /// seen-history per the policy. Returns the items that transitioned to
    /// completed in this call, in checklist order (not observation order).
    pub fn apply_observation(
        &mut self,
        observed: &[String],
        mode: MatchMode,
        policy: HistoryPolicy,
    ) -> Vec<ChecklistItem> {
        let mut newly_completed = Vec::new();

        for item in &mut self.items {
            if item.completed {
                continue;
            }
            if observed.iter().any(|seen| mode.matches(seen, &item.text)) {
                item.completed = true;
                newly_completed.push(item.clone());
            }
        }

        match policy {
            HistoryPolicy::RecordObserved => {
                for text in observed {
                    self.seen.insert(text);
                }
            }
            HistoryPolicy::RecordCompleted => {
                for item in &newly_completed {
                    self.seen.insert(&item.text);
                }
            }
        }

        newly_completed
    }

    /// Reset the seen-history without touching completion state.
    /// Used when a new phase takes ownership of the checklist.
    pub fn reset_history(&mut self) {
        self.seen.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checklist(texts: &[&str]) -> Checklist {
        Checklist::new(&texts.iter().map(|s| s.to_string()).collect::<Vec<_>>())
    }

    #[test]
    fn exact_match_marks_item_completed() {
        let mut list = checklist(&["3 fresh eggs", "1 cup milk"]);
        let newly = list.apply_observation(&["3 Fresh Eggs".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);

        assert_eq!(newly.len(), 1);
        assert_eq!(newly[0].text, "3 fresh eggs");
        assert!(list.items()[0].completed);
        assert!(!list.items()[1].completed);
    }

    #[test]
    fn exact_match_rejects_substrings() {
        let mut list = checklist(&["3 fresh eggs"]);
        let newly = list.apply_observation(&["eggs".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);

        assert!(newly.is_empty());
        assert!(!list.items()[0].completed);
    }

    #[test]
    fn contains_mode_is_an_explicit_opt_in() {
        let mut list = checklist(&["crack 3 eggs into a large mixing bowl"]);
        let observed = vec!["I can tell you crack 3 eggs into a large mixing bowl now".to_string()];

        let newly = list.clone().apply_observation(&observed, MatchMode::Exact, HistoryPolicy::RecordCompleted);
        assert!(newly.is_empty());

        let newly = list.apply_observation(&observed, MatchMode::Contains, HistoryPolicy::RecordCompleted);
        assert_eq!(newly.len(), 1);
    }

    #[test]
    fn completion_is_monotonic() {
        let mut list = checklist(&["1 cup butter"]);
        list.apply_observation(&["1 cup butter".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        assert!(list.items()[0].completed);

        // An observation without the item must not revert it
        let newly = list.apply_observation(&["1 cup milk".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        assert!(newly.is_empty());
        assert!(list.items()[0].completed);
    }

    #[test]
    fn newly_completed_preserves_checklist_order() {
        let mut list = checklist(&["a", "b", "c"]);
        let newly = list.apply_observation(
            &["c".to_string(), "a".to_string()],
            MatchMode::Exact,
            HistoryPolicy::RecordObserved,
        );

        let texts: Vec<_> = newly.iter().map(|i| i.text.as_str()).collect();
        assert_eq!(texts, vec!["a", "c"]);
    }

    #[test]
    fn seen_history_is_append_only_and_keeps_first_casing() {
        let mut list = checklist(&["3 fresh eggs"]);
        list.apply_observation(&["3 Fresh Eggs".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        assert_eq!(list.seen().len(), 1);
        assert_eq!(list.seen().as_prompt_block(), "- 3 Fresh Eggs");

        // Re-observing with different casing neither duplicates nor rewrites
        list.apply_observation(&["3 FRESH EGGS".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        assert_eq!(list.seen().len(), 1);
        assert_eq!(list.seen().as_prompt_block(), "- 3 Fresh Eggs");
    }

    #[test]
    fn seen_history_records_unmatched_observations_too() {
        let mut list = checklist(&["1 cup milk"]);
        list.apply_observation(&["a wooden spoon".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);

        assert!(!list.items()[0].completed);
        assert!(list.seen().contains("a wooden spoon"));
    }

    #[test]
    fn all_ready_and_next_incomplete() {
        let mut list = checklist(&["a", "b"]);
        assert!(!list.all_ready());
        assert_eq!(list.next_incomplete().unwrap().text, "a");
        assert_eq!(list.following_incomplete().unwrap().text, "b");

        list.apply_observation(&["a".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        assert_eq!(list.next_incomplete().unwrap().text, "b");
        assert!(list.following_incomplete().is_none());

        list.apply_observation(&["b".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        assert!(list.all_ready());
        assert!(list.next_incomplete().is_none());
    }

    #[test]
    fn reset_history_keeps_completion() {
        let mut list = checklist(&["a"]);
        list.apply_observation(&["a".to_string()], MatchMode::Exact, HistoryPolicy::RecordObserved);
        list.reset_history();

        assert!(list.seen().is_empty());
        assert!(list.items()[0].completed);
    }
}
