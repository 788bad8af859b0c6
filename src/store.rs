use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use crate::error::{FdrError, Result};
use crate::model::{Event, Fixture, Location, Team};
use crate::strength::{TeamRating, rating_table};

/// One refresh worth of entities plus the lookup tables derived from them.
/// Never mutated after construction; readers hold it through an `Arc`.
#[derive(Debug, Default)]
pub struct Snapshot {
    teams: Vec<Team>,
    team_index: HashMap<u32, usize>,
    events: Vec<Event>,
    event_index: HashMap<u32, usize>,
    fixtures: Vec<Fixture>,
    // Team id -> indexes into `fixtures`, in feed order.
    by_team: HashMap<u32, Vec<usize>>,
    ratings: HashMap<(u32, Location), u32>,
}

impl Snapshot {
    pub fn build(mut teams: Vec<Team>, mut events: Vec<Event>, fixtures: Vec<Fixture>) -> Self {
        teams.sort_by_key(|t| t.id);
        let before = teams.len();
        teams.dedup_by_key(|t| t.id);
        if teams.len() != before {
            log::warn!("dropped {} duplicate team ids", before - teams.len());
        }
        events.sort_by_key(|e| e.id);
        events.dedup_by_key(|e| e.id);

        let team_index = teams.iter().enumerate().map(|(i, t)| (t.id, i)).collect();
        let event_index = events.iter().enumerate().map(|(i, e)| (e.id, i)).collect();

        let mut by_team: HashMap<u32, Vec<usize>> = HashMap::new();
        for (idx, fixture) in fixtures.iter().enumerate() {
            by_team.entry(fixture.home_team_id).or_default().push(idx);
            if fixture.away_team_id != fixture.home_team_id {
                by_team.entry(fixture.away_team_id).or_default().push(idx);
            }
        }

        Self {
            teams,
            team_index,
            events,
            event_index,
            fixtures,
            by_team,
            ratings: HashMap::new(),
        }
    }

    /// Attaches the feed's team ratings, so they swap in together with the
    /// fixtures they were published alongside.
    pub fn with_ratings(mut self, ratings: &[TeamRating]) -> Self {
        self.ratings = rating_table(ratings);
        self
    }

    /// Strength the feed reported for this team and side, if any.
    pub fn feed_strength(&self, team_id: u32, location: Location) -> Option<u32> {
        self.ratings.get(&(team_id, location)).copied()
    }

    /// Teams ordered by id.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// Events ordered by id.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn fixtures(&self) -> &[Fixture] {
        &self.fixtures
    }

    pub fn team(&self, id: u32) -> Option<&Team> {
        self.team_index.get(&id).map(|&i| &self.teams[i])
    }

    pub fn event(&self, id: u32) -> Option<&Event> {
        self.event_index.get(&id).map(|&i| &self.events[i])
    }

    /// Every fixture where the team is home or away. Unknown teams get none.
    pub fn fixtures_for_team(&self, team_id: u32) -> impl Iterator<Item = &Fixture> + '_ {
        self.by_team
            .get(&team_id)
            .into_iter()
            .flatten()
            .map(|&i| &self.fixtures[i])
    }

    /// Gameweek a fixture is scheduled in; `None` when unscheduled or when
    /// its event is not part of this snapshot.
    pub fn gameweek_of(&self, fixture: &Fixture) -> Option<u32> {
        let event_id = fixture.event_id?;
        self.event(event_id).map(|e| e.gameweek)
    }

    pub fn fixtures_in_gameweek(
        &self,
        team_id: u32,
        gameweek: u32,
    ) -> impl Iterator<Item = &Fixture> + '_ {
        self.fixtures_for_team(team_id)
            .filter(move |f| self.gameweek_of(f) == Some(gameweek))
    }

    pub fn current_event(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.is_current)
    }

    pub fn next_event(&self) -> Option<&Event> {
        self.events.iter().find(|e| e.is_next)
    }

    /// Lowest gameweek among events that are not finished yet.
    pub fn first_open_gameweek(&self) -> Option<u32> {
        self.events
            .iter()
            .filter(|e| !e.finished)
            .map(|e| e.gameweek)
            .min()
    }

    pub fn unscheduled_count(&self) -> usize {
        self.fixtures
            .iter()
            .filter(|f| self.gameweek_of(f).is_none())
            .count()
    }
}

/// Holds the current snapshot. Writers build a full replacement off to the
/// side and swap the pointer, so a reader sees one refresh or the next, never
/// a mix.
#[derive(Debug, Default)]
pub struct EntityStore {
    current: RwLock<Arc<Snapshot>>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace_all(&self, teams: Vec<Team>, events: Vec<Event>, fixtures: Vec<Fixture>) {
        self.install(Snapshot::build(teams, events, fixtures));
    }

    pub fn install(&self, snapshot: Snapshot) {
        let next = Arc::new(snapshot);
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = next;
    }

    /// Consistent view for the caller to read from without holding the lock.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn get_team(&self, id: u32) -> Result<Team> {
        self.snapshot()
            .team(id)
            .cloned()
            .ok_or(FdrError::NotFound { kind: "team", id })
    }

    pub fn get_event(&self, id: u32) -> Result<Event> {
        self.snapshot()
            .event(id)
            .cloned()
            .ok_or(FdrError::NotFound { kind: "event", id })
    }

    pub fn fixtures_for_team(&self, team_id: u32) -> Vec<Fixture> {
        self.snapshot().fixtures_for_team(team_id).cloned().collect()
    }
}
