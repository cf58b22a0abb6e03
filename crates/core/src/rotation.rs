//! Pure rotation state machine for the poster kiosk.
//!
//! Holds the last observed poster list and the displayed index. No timers,
//! no I/O: the kiosk controller drives it from ticks, key presses and store
//! notifications.
//!
//! ```text
//! Loading --load ok--> Ready | Empty
//! Loading --load err--> Failed --load ok--> Ready | Empty
//! Ready --tick / navigate / jump--> Ready
//! Ready | Empty --posters replaced--> Ready | Empty
//! ```

use serde::Serialize;

use crate::error::CoreError;
use crate::poster::{PosterPatch, PosterRecord};

/// Lifecycle phase of the rotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "phase", content = "message", rename_all = "snake_case")]
pub enum Phase {
    Loading,
    Ready,
    Empty,
    Failed(String),
}

/// Direction of a manual navigation step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Previous,
    Next,
}

/// How the index reacts when the poster list is replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ListChangePolicy {
    /// Keep the index, clamped to the new last position.
    #[default]
    Clamp,
    /// Like `Clamp`, but when the list grew while the last poster was shown,
    /// move to the new last poster.
    FollowTail,
}

impl std::str::FromStr for ListChangePolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "clamp" => Ok(Self::Clamp),
            "follow-tail" | "follow_tail" => Ok(Self::FollowTail),
            other => Err(CoreError::Validation(format!(
                "Unknown list change policy '{other}'"
            ))),
        }
    }
}

/// A local edit awaiting the store's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub previous: PosterRecord,
    pub applied: PosterRecord,
}

/// The rotation's posters, index and phase.
#[derive(Debug, Clone)]
pub struct RotationState {
    phase: Phase,
    posters: Vec<PosterRecord>,
    index: usize,
    policy: ListChangePolicy,
}

impl Default for RotationState {
    fn default() -> Self {
        Self::new(ListChangePolicy::default())
    }
}

impl RotationState {
    /// A fresh state in the `Loading` phase.
    pub fn new(policy: ListChangePolicy) -> Self {
        Self {
            phase: Phase::Loading,
            posters: Vec::new(),
            index: 0,
            policy,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn posters(&self) -> &[PosterRecord] {
        &self.posters
    }

    pub fn len(&self) -> usize {
        self.posters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posters.is_empty()
    }

    /// Displayed index. Meaningless when the list is empty.
    pub fn index(&self) -> usize {
        self.index
    }

    /// The poster currently on display.
    pub fn current(&self) -> Option<&PosterRecord> {
        self.posters.get(self.index)
    }

    /// Automatic advance and manual navigation only apply with 2+ posters.
    pub fn timer_enabled(&self) -> bool {
        self.posters.len() > 1
    }

    /// `"2 of 5"`-style position label, `None` when empty.
    pub fn position_label(&self) -> Option<String> {
        self.current()
            .map(|_| format!("{} of {}", self.index + 1, self.posters.len()))
    }

    // -- transitions --------------------------------------------------------

    /// Initial (or retried) fetch succeeded.
    pub fn load_succeeded(&mut self, posters: Vec<PosterRecord>) {
        self.posters = posters;
        self.index = 0;
        self.refresh_phase();
    }

    /// Initial fetch failed. Keeps whatever list was previously loaded.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.phase = Phase::Failed(message.into());
    }

    /// Automatic advance: `(index + 1) mod len`. Returns whether it moved.
    pub fn tick(&mut self) -> bool {
        self.navigate(Direction::Next)
    }

    /// Manual step with wrap-around. Ignored with fewer than two posters.
    pub fn navigate(&mut self, direction: Direction) -> bool {
        let len = self.posters.len();
        if len <= 1 {
            return false;
        }
        self.index = match direction {
            Direction::Next => (self.index + 1) % len,
            Direction::Previous => (self.index + len - 1) % len,
        };
        true
    }

    /// Show the poster at `index`.
    pub fn jump(&mut self, index: usize) -> Result<(), CoreError> {
        if index >= self.posters.len() {
            return Err(CoreError::Validation(format!(
                "Index {index} is out of range for {} posters",
                self.posters.len()
            )));
        }
        self.index = index;
        Ok(())
    }

    /// Replace the list with a fresh snapshot and re-clamp the index.
    pub fn replace_posters(&mut self, posters: Vec<PosterRecord>) {
        let old_len = self.posters.len();
        let was_at_tail = old_len > 0 && self.index == old_len - 1;
        let new_len = posters.len();
        self.posters = posters;

        if new_len == 0 {
            self.index = 0;
        } else if self.policy == ListChangePolicy::FollowTail && was_at_tail && new_len > old_len
        {
            self.index = new_len - 1;
        } else {
            self.index = self.index.min(new_len - 1);
        }
        self.refresh_phase();
    }

    // -- optimistic local edits --------------------------------------------

    /// Apply `patch` locally. `None` when `id` is not in the list.
    pub fn apply_patch(&mut self, id: &str, patch: &PosterPatch) -> Option<PendingEdit> {
        let record = self.posters.iter_mut().find(|p| p.id == id)?;
        let previous = record.clone();
        record.apply_patch(patch);
        Some(PendingEdit {
            previous,
            applied: record.clone(),
        })
    }

    /// Undo an optimistic edit by putting its previous record back.
    ///
    /// Only an edit that is still shown is undone. Returns `false` when the
    /// poster has disappeared or was replaced by a newer store snapshot.
    pub fn restore(&mut self, edit: PendingEdit) -> bool {
        match self.posters.iter_mut().find(|p| p.id == edit.previous.id) {
            Some(record) if *record == edit.applied => {
                *record = edit.previous;
                true
            }
            _ => false,
        }
    }

    /// Replace a record with the authoritative version from the store.
    pub fn reconcile(&mut self, confirmed: PosterRecord) {
        if let Some(record) = self.posters.iter_mut().find(|p| p.id == confirmed.id) {
            *record = confirmed;
        }
    }

    fn refresh_phase(&mut self) {
        self.phase = if self.posters.is_empty() {
            Phase::Empty
        } else {
            Phase::Ready
        };
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
