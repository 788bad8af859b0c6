use crate::model::{Fixture, GameweekWindow, Location, NEUTRAL_STRENGTH, NO_DATA_FDR};
use crate::overrides::StrengthOverrides;
use crate::store::Snapshot;
use crate::strength::StrengthSource;

/// Running total of per-fixture difficulties over a window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FdrTally {
    pub total: u64,
    pub fixtures: u32,
}

impl FdrTally {
    pub fn add(&mut self, difficulty: u32) {
        self.total += u64::from(difficulty);
        self.fixtures += 1;
    }

    pub fn average(&self) -> Option<f64> {
        (self.fixtures > 0).then(|| self.total as f64 / f64::from(self.fixtures))
    }
}

/// Scores fixtures against one snapshot. Cheap to build; build one per query
/// batch so every number in the batch comes from the same refresh.
pub struct DifficultyEngine<'a> {
    snapshot: &'a Snapshot,
    overrides: &'a StrengthOverrides,
    defaults: &'a dyn StrengthSource,
}

impl<'a> DifficultyEngine<'a> {
    pub fn new(
        snapshot: &'a Snapshot,
        overrides: &'a StrengthOverrides,
        defaults: &'a dyn StrengthSource,
    ) -> Self {
        Self {
            snapshot,
            overrides,
            defaults,
        }
    }

    pub fn snapshot(&self) -> &'a Snapshot {
        self.snapshot
    }

    /// Override first, then the injected default, then the feed rating of
    /// this snapshot, then neutral.
    pub fn resolve_strength(&self, team_id: u32, location: Location) -> u32 {
        if let Some(value) = self.overrides.get(team_id, location) {
            return value;
        }
        if let Some(value) = self.defaults.default_strength(team_id, location) {
            return value;
        }
        if let Some(value) = self.snapshot.feed_strength(team_id, location) {
            return value;
        }
        log::trace!(
            "no strength for team {team_id} ({}), using neutral",
            location.label()
        );
        NEUTRAL_STRENGTH
    }

    /// Difficulty of `fixture` for `team_id`: the opponent's strength on the
    /// side the opponent actually plays. `None` if the team is not in it.
    pub fn difficulty(&self, team_id: u32, fixture: &Fixture) -> Option<u32> {
        let location = fixture.location_of(team_id)?;
        let opponent = fixture.opponent_of(team_id)?;
        Some(self.resolve_strength(opponent, location.opposite()))
    }

    pub fn tally(&self, team_id: u32, window: GameweekWindow) -> FdrTally {
        let mut tally = FdrTally::default();
        for fixture in self.snapshot.fixtures_for_team(team_id) {
            let Some(gameweek) = self.snapshot.gameweek_of(fixture) else {
                continue;
            };
            if !window.contains(gameweek) {
                continue;
            }
            if let Some(d) = self.difficulty(team_id, fixture) {
                tally.add(d);
            }
        }
        tally
    }

    /// Mean difficulty over the window, or `NO_DATA_FDR` when the team has
    /// nothing scheduled in it.
    pub fn average_fdr(&self, team_id: u32, window: GameweekWindow) -> f64 {
        self.tally(team_id, window).average().unwrap_or(NO_DATA_FDR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Event, Team};
    use crate::strength::{NeutralStrengths, TeamRating};

    fn snapshot() -> Snapshot {
        let teams = (1..=3)
            .map(|id| Team {
                id,
                name: format!("Team {id}"),
                short_name: format!("T{id}"),
                code: id,
            })
            .collect();
        let events = (1..=3)
            .map(|gw| Event {
                id: gw,
                gameweek: gw,
                name: format!("Gameweek {gw}"),
                finished: false,
                data_checked: false,
                is_current: gw == 1,
                is_next: gw == 2,
            })
            .collect();
        let fixtures = vec![
            Fixture {
                id: 1,
                event_id: Some(1),
                home_team_id: 1,
                away_team_id: 2,
                finished: false,
                kickoff: None,
            },
            Fixture {
                id: 2,
                event_id: Some(2),
                home_team_id: 3,
                away_team_id: 1,
                finished: false,
                kickoff: None,
            },
            Fixture {
                id: 3,
                event_id: None,
                home_team_id: 1,
                away_team_id: 3,
                finished: false,
                kickoff: None,
            },
        ];
        Snapshot::build(teams, events, fixtures)
    }

    #[test]
    fn tally_average_of_empty_is_none() {
        assert_eq!(FdrTally::default().average(), None);
    }

    #[test]
    fn missing_defaults_degrade_to_neutral() {
        let snap = snapshot();
        let overrides = StrengthOverrides::new();
        let engine = DifficultyEngine::new(&snap, &overrides, &NeutralStrengths);
        assert_eq!(engine.resolve_strength(2, Location::Away), NEUTRAL_STRENGTH);
    }

    #[test]
    fn difficulty_reads_opponent_on_their_side() {
        let snap = snapshot();
        let overrides = StrengthOverrides::new();
        let defaults = |team: u32, loc: Location| -> Option<u32> {
            match (team, loc) {
                (2, Location::Away) => Some(4),
                (3, Location::Home) => Some(5),
                _ => Some(1),
            }
        };
        let engine = DifficultyEngine::new(&snap, &overrides, &defaults);
        let f1 = &snap.fixtures()[0];
        let f2 = &snap.fixtures()[1];
        assert_eq!(engine.difficulty(1, f1), Some(4));
        assert_eq!(engine.difficulty(1, f2), Some(5));
        assert_eq!(engine.difficulty(2, f2), None);
    }

    #[test]
    fn feed_ratings_sit_below_injected_defaults() {
        let snap = snapshot().with_ratings(&[TeamRating {
            team_id: 2,
            home: Some(2),
            away: Some(6),
        }]);
        let overrides = StrengthOverrides::new();
        let engine = DifficultyEngine::new(&snap, &overrides, &NeutralStrengths);
        assert_eq!(engine.resolve_strength(2, Location::Away), 6);
        let defaults =
            |team: u32, loc: Location| (team == 2 && loc == Location::Away).then_some(1u32);
        let engine = DifficultyEngine::new(&snap, &overrides, &defaults);
        assert_eq!(engine.resolve_strength(2, Location::Away), 1);
        assert_eq!(engine.resolve_strength(2, Location::Home), 2);
        overrides.set(2, Location::Away, 7).unwrap();
        assert_eq!(engine.resolve_strength(2, Location::Away), 7);
    }

    #[test]
    fn unscheduled_fixtures_never_count() {
        let snap = snapshot();
        let overrides = StrengthOverrides::new();
        let engine = DifficultyEngine::new(&snap, &overrides, &NeutralStrengths);
        let tally = engine.tally(1, GameweekWindow::new(1, 38));
        assert_eq!(tally.fixtures, 2);
        assert_eq!(engine.average_fdr(1, GameweekWindow::single(3)), NO_DATA_FDR);
    }
}
