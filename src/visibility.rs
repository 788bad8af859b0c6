use std::collections::HashSet;
use std::sync::{PoisonError, RwLock};

/// Teams hidden from ranked views. Everything is visible until toggled.
#[derive(Debug, Default)]
pub struct VisibilitySet {
    hidden: RwLock<HashSet<u32>>,
}

impl VisibilitySet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips the team's membership and returns its new visibility.
    pub fn toggle(&self, team_id: u32) -> bool {
        let mut hidden = self.hidden.write().unwrap_or_else(PoisonError::into_inner);
        if hidden.remove(&team_id) {
            true
        } else {
            hidden.insert(team_id);
            false
        }
    }

    pub fn is_visible(&self, team_id: u32) -> bool {
        !self
            .hidden
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&team_id)
    }

    pub fn hidden(&self) -> Vec<u32> {
        let mut ids: Vec<u32> = self
            .hidden
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .copied()
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn show_all(&self) {
        self.hidden
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}
