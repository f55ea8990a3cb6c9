//! # Undo/Redo History
//!
//! Bounded stacks of full scene snapshots.
//!
//! ```text
//! discrete command:   record(pre-state)            → undo stack, redo cleared
//! continuous edits:   note_edit(pre-state, t) ...  → one pending snapshot
//!                     poll(t ≥ deadline) / flush() → committed like a record
//! undo:               current → redo, pop undo → restore
//! ```
//!
//! Continuous edits (slider drags, typing) keep the snapshot from before the
//! first edit of a burst and commit it once no edit arrived for the debounce
//! interval, so a burst becomes a single undo step.

use std::collections::VecDeque;

use crate::{Background, Element, Scene};

/// Default number of snapshots kept per stack.
pub const DEFAULT_CAPACITY: usize = 50;

/// Default quiescence interval before a continuous edit is committed.
pub const DEFAULT_DEBOUNCE_MS: u64 = 500;

/// Deep copy of the restorable part of a scene.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    /// Elements in insertion order.
    pub elements: Vec<Element>,
    /// Background at capture time.
    pub background: Background,
}

impl Snapshot {
    /// Capture the current state of a scene.
    #[must_use]
    pub fn capture(scene: &Scene) -> Self {
        Self {
            elements: scene.elements_vec().to_vec(),
            background: scene.background.clone(),
        }
    }

    /// Write this snapshot back into a scene. Clears the selection and keeps
    /// the id counter, so ids handed out since capture stay retired.
    pub fn restore(self, scene: &mut Scene) {
        scene.background = self.background;
        scene.replace_elements(self.elements);
    }
}

#[derive(Debug, Clone)]
struct PendingEdit {
    snapshot: Snapshot,
    deadline_ms: u64,
}

/// Undo/redo stacks with debounced commits for continuous edits.
#[derive(Debug, Clone)]
pub struct History {
    undo_stack: VecDeque<Snapshot>,
    redo_stack: VecDeque<Snapshot>,
    capacity: usize,
    debounce_ms: u64,
    pending: Option<PendingEdit>,
}

impl History {
    /// Create a history with default capacity and debounce interval.
    #[must_use]
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_CAPACITY, DEFAULT_DEBOUNCE_MS)
    }

    /// Create a history with a custom capacity and debounce interval.
    ///
    /// A capacity of zero is treated as one.
    #[must_use]
    pub fn with_limits(capacity: usize, debounce_ms: u64) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: VecDeque::new(),
            capacity: capacity.max(1),
            debounce_ms,
            pending: None,
        }
    }

    /// Record a pre-mutation snapshot for a discrete operation.
    ///
    /// Evicts the oldest entry when full and invalidates redo history.
    pub fn record(&mut self, snapshot: Snapshot) {
        push_bounded(&mut self.undo_stack, snapshot, self.capacity);
        if !self.redo_stack.is_empty() {
            tracing::debug!(dropped = self.redo_stack.len(), "redo history invalidated");
            self.redo_stack.clear();
        }
    }

    /// Step back: stash `current` for redo and return the state to restore.
    ///
    /// `None` (and no change) when there is nothing to undo.
    pub fn undo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let previous = self.undo_stack.pop_back()?;
        push_bounded(&mut self.redo_stack, current, self.capacity);
        Some(previous)
    }

    /// Step forward: stash `current` for undo and return the state to restore.
    ///
    /// `None` (and no change) when there is nothing to redo.
    pub fn redo(&mut self, current: Snapshot) -> Option<Snapshot> {
        let next = self.redo_stack.pop_back()?;
        push_bounded(&mut self.undo_stack, current, self.capacity);
        Some(next)
    }

    /// Note a continuous edit at `now_ms`.
    ///
    /// `before` is only taken for the first edit of a burst; later edits just
    /// push the deadline out.
    pub fn note_edit(&mut self, before: impl FnOnce() -> Snapshot, now_ms: u64) {
        let deadline_ms = now_ms.saturating_add(self.debounce_ms);
        match &mut self.pending {
            Some(pending) => pending.deadline_ms = deadline_ms,
            None => {
                self.pending = Some(PendingEdit {
                    snapshot: before(),
                    deadline_ms,
                });
            }
        }
    }

    /// Commit the pending edit if its deadline has passed.
    ///
    /// Returns whether a snapshot was committed.
    pub fn poll(&mut self, now_ms: u64) -> bool {
        match &self.pending {
            Some(pending) if now_ms >= pending.deadline_ms => self.flush(),
            _ => false,
        }
    }

    /// Commit the pending edit now, regardless of its deadline.
    ///
    /// Returns whether a snapshot was committed.
    pub fn flush(&mut self) -> bool {
        let Some(pending) = self.pending.take() else {
            return false;
        };
        tracing::debug!("committing debounced edit");
        self.record(pending.snapshot);
        true
    }

    /// Whether a continuous edit is waiting to be committed.
    #[must_use]
    pub const fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Deadline of the pending edit, if any.
    #[must_use]
    pub fn pending_deadline(&self) -> Option<u64> {
        self.pending.as_ref().map(|p| p.deadline_ms)
    }

    /// Whether there is anything to undo.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Whether there is anything to redo.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    /// Number of undo steps available.
    #[must_use]
    pub fn undo_len(&self) -> usize {
        self.undo_stack.len()
    }

    /// Number of redo steps available.
    #[must_use]
    pub fn redo_len(&self) -> usize {
        self.redo_stack.len()
    }

    /// Maximum entries per stack.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all history, including a pending edit.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
        self.pending = None;
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

fn push_bounded(stack: &mut VecDeque<Snapshot>, snapshot: Snapshot, capacity: usize) {
    // Drop oldest if at capacity
    while stack.len() >= capacity {
        stack.pop_front();
    }
    stack.push_back(snapshot);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CanvasFormat, ElementKind, Geometry};

    fn snap(n: usize) -> Snapshot {
        let mut scene = Scene::new(CanvasFormat::Square);
        for _ in 0..n {
            scene.add_element(ElementKind::text("x"), Geometry::default());
        }
        Snapshot::capture(&scene)
    }

    #[test]
    fn test_undo_on_empty_is_noop() {
        let mut history = History::new();
        assert!(history.undo(snap(0)).is_none());
        assert!(!history.can_redo());
    }

    #[test]
    fn test_undo_redo_round_trip() {
        let mut history = History::new();
        history.record(snap(0));

        let restored = history.undo(snap(1)).expect("undo");
        assert_eq!(restored, snap(0));
        assert!(history.can_redo());

        let again = history.redo(snap(0)).expect("redo");
        assert_eq!(again, snap(1));
        assert_eq!(history.undo_len(), 1);
        assert_eq!(history.redo_len(), 0);
    }

    #[test]
    fn test_record_clears_redo() {
        let mut history = History::new();
        history.record(snap(0));
        history.undo(snap(1));
        assert!(history.can_redo());
        history.record(snap(0));
        assert!(!history.can_redo());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let mut history = History::with_limits(3, 0);
        for n in 0..5 {
            history.record(snap(n));
        }
        assert_eq!(history.undo_len(), 3);
        let mut last = None;
        while let Some(s) = history.undo(snap(9)) {
            last = Some(s);
        }
        // Oldest surviving entry is the third one recorded.
        assert_eq!(last, Some(snap(2)));
    }

    #[test]
    fn test_debounce_coalesces_a_burst() {
        let mut history = History::with_limits(50, 500);
        let mut captured = 0;
        for t in [0, 100, 200, 300] {
            history.note_edit(
                || {
                    captured += 1;
                    snap(0)
                },
                t,
            );
        }
        assert_eq!(captured, 1);
        assert_eq!(history.pending_deadline(), Some(800));
        assert!(!history.poll(799));
        assert!(history.poll(800));
        assert_eq!(history.undo_len(), 1);
        assert!(!history.has_pending());
    }

    #[test]
    fn test_flush_commits_immediately() {
        let mut history = History::new();
        history.note_edit(|| snap(0), 0);
        assert!(history.flush());
        assert!(!history.flush());
        assert_eq!(history.undo_len(), 1);
    }

    #[test]
    fn test_restore_keeps_id_counter() {
        let mut scene = Scene::new(CanvasFormat::Square);
        let before = Snapshot::capture(&scene);
        let id = scene.add_element(ElementKind::text("a"), Geometry::default());
        scene.select(id).expect("select");
        before.restore(&mut scene);
        assert!(scene.is_empty());
        assert_eq!(scene.selected_id(), None);
        let next = scene.add_element(ElementKind::text("b"), Geometry::default());
        assert_ne!(next, id);
    }
}
