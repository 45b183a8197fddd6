//! Edited-state tracking.

use quire_model::ChangeKind;

use crate::undo::UndoEvent;

/// Tracks how far the document has moved from its last saved state.
///
/// The distance is signed: undoing past the saved point leaves the content
/// different from the saved copy, so it still counts as edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeTracker {
    /// Net changes since the saved baseline.
    distance: i64,

    /// Total number of recorded changes, never reset.
    generation: u64,

    /// Set when the baseline can no longer be reached by undo/redo.
    forced: bool,
}

impl ChangeTracker {
    /// Create a new tracker with no unsaved changes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a change.
    pub fn record_change(&mut self, kind: ChangeKind) {
        match kind {
            ChangeKind::Done | ChangeKind::Redone => {
                self.distance += 1;
                self.generation += 1;
            }
            ChangeKind::Undone => {
                self.distance -= 1;
                self.generation += 1;
            }
            ChangeKind::ClearedAtSave => {
                self.distance = 0;
                self.forced = false;
            }
        }
    }

    /// Feed an event from the undo log.
    pub fn apply_undo_event(&mut self, event: UndoEvent) {
        match event {
            UndoEvent::Done => self.record_change(ChangeKind::Done),
            UndoEvent::Undone => self.record_change(ChangeKind::Undone),
            UndoEvent::Redone => self.record_change(ChangeKind::Redone),
            UndoEvent::Cleared => {}
        }
    }

    /// Mark the document edited until the next save, whatever undo does.
    pub fn mark_edited(&mut self) {
        self.forced = true;
        self.generation += 1;
    }

    /// Check if the current state differs from the saved baseline.
    #[inline]
    pub fn is_edited(&self) -> bool {
        self.forced || self.distance != 0
    }

    /// Whether the saved state is only reachable through redo.
    pub fn is_behind_baseline(&self) -> bool {
        self.distance < 0
    }

    /// Number of changes separating the document from its saved state.
    pub fn change_count(&self) -> u64 {
        self.distance.unsigned_abs()
    }

    /// Monotonic counter of every recorded change.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_new_tracker_is_clean() {
        let tracker = ChangeTracker::new();
        assert!(!tracker.is_edited());
        assert_eq!(tracker.change_count(), 0);
    }

    #[test]
    fn test_undo_back_to_saved_is_clean() {
        let mut tracker = ChangeTracker::new();
        tracker.record_change(ChangeKind::Done);
        assert!(tracker.is_edited());

        tracker.record_change(ChangeKind::Undone);
        assert!(!tracker.is_edited());
        assert_eq!(tracker.generation(), 2);
    }

    #[test]
    fn test_undo_past_saved_is_edited() {
        let mut tracker = ChangeTracker::new();
        tracker.record_change(ChangeKind::Done);
        tracker.record_change(ChangeKind::ClearedAtSave);
        assert!(!tracker.is_edited());

        tracker.record_change(ChangeKind::Undone);
        assert!(tracker.is_edited());
        assert_eq!(tracker.change_count(), 1);

        tracker.record_change(ChangeKind::Redone);
        assert!(!tracker.is_edited());
    }

    #[test]
    fn test_mark_edited_survives_undo() {
        let mut tracker = ChangeTracker::new();
        tracker.mark_edited();
        tracker.record_change(ChangeKind::Done);
        tracker.record_change(ChangeKind::Undone);
        assert!(tracker.is_edited());

        tracker.record_change(ChangeKind::ClearedAtSave);
        assert!(!tracker.is_edited());
    }

    #[test]
    fn test_behind_baseline_after_undo_past_save() {
        let mut tracker = ChangeTracker::new();
        tracker.record_change(ChangeKind::Done);
        tracker.record_change(ChangeKind::ClearedAtSave);
        assert!(!tracker.is_behind_baseline());

        tracker.record_change(ChangeKind::Undone);
        assert!(tracker.is_behind_baseline());

        // The saved state is gone once a new edit drops the redo stack.
        tracker.mark_edited();
        tracker.record_change(ChangeKind::Done);
        assert!(!tracker.is_behind_baseline());
        assert!(tracker.is_edited());
    }

    fn change_kind() -> impl Strategy<Value = ChangeKind> {
        prop_oneof![
            Just(ChangeKind::Done),
            Just(ChangeKind::Undone),
            Just(ChangeKind::ClearedAtSave),
        ]
    }

    proptest! {
        #[test]
        fn test_edited_iff_net_count_differs_from_baseline(
            kinds in proptest::collection::vec(change_kind(), 0..64)
        ) {
            let mut tracker = ChangeTracker::new();
            let mut net: i64 = 0;
            let mut baseline: i64 = 0;

            for kind in kinds {
                tracker.record_change(kind);
                match kind {
                    ChangeKind::Done | ChangeKind::Redone => net += 1,
                    ChangeKind::Undone => net -= 1,
                    ChangeKind::ClearedAtSave => baseline = net,
                }
                prop_assert_eq!(tracker.is_edited(), net != baseline);
            }
        }
    }
}
