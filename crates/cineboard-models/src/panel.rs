//! Panel state: the ordered shot collection and the page-level phase.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::shot::{ShotDescriptor, ShotId, ShotType};

/// Page-level workflow phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum BatchPhase {
    /// Waiting for a script
    #[default]
    Input,
    /// Shots decomposed, user editing
    Review,
    /// A batch is in flight
    Generating,
    /// Batch finished (individual shots may still have failed)
    Done,
}

/// The ordered collection of shots for one storyboard.
///
/// Shots are mutated through their own slot only; concurrent generation
/// tasks each own a disjoint slot, so panel-level locking is unnecessary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct PanelState {
    shots: Vec<ShotDescriptor>,
    #[serde(default)]
    pub phase: BatchPhase,
}

impl PanelState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces all shots (script decomposition result) and moves to Review.
    pub fn populate(&mut self, mut shots: Vec<ShotDescriptor>) {
        for (i, shot) in shots.iter_mut().enumerate() {
            shot.sort_order = i as u32;
        }
        self.shots = shots;
        self.phase = BatchPhase::Review;
    }

    /// Appends a manually added shot with a default framing.
    pub fn add_shot(&mut self, id: impl Into<String>, description: impl Into<String>) -> &ShotDescriptor {
        let mut shot = ShotDescriptor::new(id, description);
        shot.shot_type = ShotType::Mid;
        let idx = self.shots.len();
        shot.sort_order = idx as u32;
        self.shots.push(shot);
        &self.shots[idx]
    }

    /// Removes a shot by id. Remaining sort orders are compacted.
    pub fn remove_shot(&mut self, id: &ShotId) -> bool {
        let before = self.shots.len();
        self.shots.retain(|s| &s.id != id);
        let removed = self.shots.len() != before;
        if removed {
            for (i, shot) in self.shots.iter_mut().enumerate() {
                shot.sort_order = i as u32;
            }
        }
        removed
    }

    /// Drops everything and returns to the input phase.
    pub fn reset(&mut self) {
        self.shots.clear();
        self.phase = BatchPhase::Input;
    }

    pub fn shots(&self) -> &[ShotDescriptor] {
        &self.shots
    }

    pub fn len(&self) -> usize {
        self.shots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shots.is_empty()
    }

    pub fn get(&self, id: &ShotId) -> Option<&ShotDescriptor> {
        self.shots.iter().find(|s| &s.id == id)
    }

    pub fn get_mut(&mut self, id: &ShotId) -> Option<&mut ShotDescriptor> {
        self.shots.iter_mut().find(|s| &s.id == id)
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ShotDescriptor> {
        self.shots.iter_mut()
    }

    /// True when every shot has left the queued state.
    pub fn batch_settled(&self) -> bool {
        self.shots.iter().all(|s| !s.is_loading())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_populate_assigns_sort_order() {
        let mut panel = PanelState::new();
        panel.populate(vec![
            ShotDescriptor::new("a", "first"),
            ShotDescriptor::new("b", "second"),
        ]);
        assert_eq!(panel.phase, BatchPhase::Review);
        assert_eq!(panel.shots()[0].sort_order, 0);
        assert_eq!(panel.shots()[1].sort_order, 1);
    }

    #[test]
    fn test_remove_compacts_order() {
        let mut panel = PanelState::new();
        panel.populate(vec![
            ShotDescriptor::new("a", "first"),
            ShotDescriptor::new("b", "second"),
            ShotDescriptor::new("c", "third"),
        ]);
        assert!(panel.remove_shot(&ShotId::new("b")));
        assert_eq!(panel.len(), 2);
        assert_eq!(panel.shots()[1].id.as_str(), "c");
        assert_eq!(panel.shots()[1].sort_order, 1);
        assert!(!panel.remove_shot(&ShotId::new("b")));
    }

    #[test]
    fn test_add_shot_defaults_to_mid() {
        let mut panel = PanelState::new();
        let shot = panel.add_shot("x", "...");
        assert_eq!(shot.shot_type, ShotType::Mid);
    }

    #[test]
    fn test_reset_returns_to_input() {
        let mut panel = PanelState::new();
        panel.populate(vec![ShotDescriptor::new("a", "first")]);
        panel.reset();
        assert!(panel.is_empty());
        assert_eq!(panel.phase, BatchPhase::Input);
    }
}
