use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use crate::error::{FdrError, Result};
use crate::model::Location;

/// User-entered strengths keyed by `(team, location)`. Entries replace the
/// feed default for that side only and live until reset.
#[derive(Debug, Default)]
pub struct StrengthOverrides {
    entries: RwLock<HashMap<(u32, Location), u32>>,
}

impl StrengthOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, team_id: u32, location: Location) -> Option<u32> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(team_id, location))
            .copied()
    }

    /// Stores `value`, replacing any previous entry. Negative or oversized
    /// input is rejected and leaves the table untouched.
    pub fn set(&self, team_id: u32, location: Location, value: i64) -> Result<()> {
        let Ok(value) = u32::try_from(value) else {
            log::warn!(
                "rejected strength {value} for team {team_id} ({})",
                location.label()
            );
            return Err(FdrError::InvalidValue {
                field: "strength",
                value,
            });
        };
        self.put(team_id, location, value);
        Ok(())
    }

    /// Stores an already validated value.
    pub fn put(&self, team_id: u32, location: Location, value: u32) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((team_id, location), value);
    }

    pub fn reset(&self, team_id: u32, location: Location) -> Option<u32> {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(team_id, location))
    }

    pub fn reset_team(&self, team_id: u32) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|(id, _), _| *id != team_id);
    }

    pub fn clear(&self) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Sorted copy of every entry.
    pub fn entries(&self) -> Vec<(u32, Location, u32)> {
        let guard = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut out: Vec<_> = guard
            .iter()
            .map(|(&(team, loc), &value)| (team, loc, value))
            .collect();
        out.sort();
        out
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
