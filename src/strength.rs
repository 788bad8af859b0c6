use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::model::Location;

/// Intrinsic strength a feed reports for one team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRating {
    pub team_id: u32,
    pub home: Option<u32>,
    pub away: Option<u32>,
}

/// Strength lookup consulted when no override exists, ahead of the ratings
/// carried by the feed snapshot.
pub trait StrengthSource: Send + Sync {
    fn default_strength(&self, team_id: u32, location: Location) -> Option<u32>;
}

impl<F> StrengthSource for F
where
    F: Fn(u32, Location) -> Option<u32> + Send + Sync,
{
    fn default_strength(&self, team_id: u32, location: Location) -> Option<u32> {
        self(team_id, location)
    }
}

/// Knows nothing; lookups fall through to the feed, then to neutral.
#[derive(Debug, Default, Clone, Copy)]
pub struct NeutralStrengths;

impl StrengthSource for NeutralStrengths {
    fn default_strength(&self, _team_id: u32, _location: Location) -> Option<u32> {
        None
    }
}

/// Explicit per-location baseline entries. Refreshes never touch it.
#[derive(Debug, Default)]
pub struct StrengthTable {
    table: RwLock<HashMap<(u32, Location), u32>>,
}

impl StrengthTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, team_id: u32, location: Location, value: u32) {
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert((team_id, location), value);
    }

    pub fn remove(&self, team_id: u32, location: Location) -> Option<u32> {
        self.table
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&(team_id, location))
    }

    pub fn len(&self) -> usize {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StrengthSource for StrengthTable {
    fn default_strength(&self, team_id: u32, location: Location) -> Option<u32> {
        self.table
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(team_id, location))
            .copied()
    }
}

/// Flattens feed ratings into a `(team, location)` lookup.
pub fn rating_table(ratings: &[TeamRating]) -> HashMap<(u32, Location), u32> {
    let mut out = HashMap::with_capacity(ratings.len() * 2);
    for r in ratings {
        if let Some(home) = r.home {
            out.insert((r.team_id, Location::Home), home);
        }
        if let Some(away) = r.away {
            out.insert((r.team_id, Location::Away), away);
        }
    }
    out
}
