use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{FdrError, Result};
use crate::model::{Event, Fixture, Team};
use crate::store::Snapshot;
use crate::strength::TeamRating;

/// Teams and events from the league's bootstrap document.
#[derive(Debug, Clone, Default)]
pub struct Bootstrap {
    pub teams: Vec<Team>,
    pub events: Vec<Event>,
    pub ratings: Vec<TeamRating>,
}

/// Everything one refresh needs, fully decoded.
#[derive(Debug, Clone, Default)]
pub struct FeedBatch {
    pub teams: Vec<Team>,
    pub events: Vec<Event>,
    pub fixtures: Vec<Fixture>,
    pub ratings: Vec<TeamRating>,
}

impl FeedBatch {
    pub fn new(bootstrap: Bootstrap, fixtures: Vec<Fixture>) -> Self {
        Self {
            teams: bootstrap.teams,
            events: bootstrap.events,
            fixtures,
            ratings: bootstrap.ratings,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IngestSummary {
    pub teams: usize,
    pub events: usize,
    pub fixtures: usize,
    pub unscheduled: usize,
}

#[derive(Debug, Deserialize)]
struct BootstrapWire {
    teams: Vec<Value>,
    events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct TeamWire {
    id: u32,
    name: String,
    short_name: String,
    code: u32,
    #[serde(default)]
    strength: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct EventWire {
    id: u32,
    name: String,
    finished: bool,
    #[serde(default)]
    data_checked: bool,
    #[serde(default)]
    is_current: bool,
    #[serde(default)]
    is_next: bool,
}

#[derive(Debug, Deserialize)]
struct FixtureWire {
    id: u32,
    event: Option<u32>,
    team_h: u32,
    team_a: u32,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    kickoff_time: Option<String>,
}

pub fn parse_bootstrap_json(raw: &str) -> Result<Bootstrap> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FdrError::parse("empty bootstrap response"));
    }
    let wire: BootstrapWire = serde_json::from_str(trimmed)
        .map_err(|err| FdrError::parse(format!("invalid bootstrap json: {err}")))?;

    let mut out = Bootstrap::default();
    for (idx, value) in wire.teams.iter().enumerate() {
        let (team, rating) = decode_team(value).map_err(|err| at("team", idx, err))?;
        out.teams.push(team);
        out.ratings.push(rating);
    }
    for (idx, value) in wire.events.iter().enumerate() {
        out.events
            .push(decode_event(value).map_err(|err| at("event", idx, err))?);
    }
    Ok(out)
}

pub fn parse_fixtures_json(raw: &str) -> Result<Vec<Fixture>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Err(FdrError::parse("empty fixtures response"));
    }
    let values: Vec<Value> = serde_json::from_str(trimmed)
        .map_err(|err| FdrError::parse(format!("invalid fixtures json: {err}")))?;
    values
        .iter()
        .enumerate()
        .map(|(idx, value)| decode_fixture(value).map_err(|err| at("fixture", idx, err)))
        .collect()
}

/// Decodes one team record along with the strength the feed reports for it.
pub fn decode_team(value: &Value) -> Result<(Team, TeamRating)> {
    let wire = TeamWire::deserialize(value)?;
    let rating = TeamRating {
        team_id: wire.id,
        home: wire.strength,
        away: wire.strength,
    };
    let team = Team {
        id: wire.id,
        name: wire.name,
        short_name: wire.short_name,
        code: wire.code,
    };
    Ok((team, rating))
}

/// The league numbers its events 1..N, so the id doubles as the gameweek.
pub fn decode_event(value: &Value) -> Result<Event> {
    let wire = EventWire::deserialize(value)?;
    Ok(Event {
        id: wire.id,
        gameweek: wire.id,
        name: wire.name,
        finished: wire.finished,
        data_checked: wire.data_checked,
        is_current: wire.is_current,
        is_next: wire.is_next,
    })
}

pub fn decode_fixture(value: &Value) -> Result<Fixture> {
    let wire = FixtureWire::deserialize(value)?;
    let kickoff = match wire.kickoff_time.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(parse_kickoff(raw)?),
    };
    Ok(Fixture {
        id: wire.id,
        event_id: wire.event,
        home_team_id: wire.team_h,
        away_team_id: wire.team_a,
        finished: wire.finished,
        kickoff,
    })
}

pub fn parse_kickoff(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| FdrError::parse(format!("bad kickoff_time {raw:?}: {err}")))
}

/// Builds the replacement snapshot for a batch and reports what it holds.
pub fn build_snapshot(batch: FeedBatch) -> (Snapshot, IngestSummary) {
    let snapshot =
        Snapshot::build(batch.teams, batch.events, batch.fixtures).with_ratings(&batch.ratings);
    let summary = IngestSummary {
        teams: snapshot.teams().len(),
        events: snapshot.events().len(),
        fixtures: snapshot.fixtures().len(),
        unscheduled: snapshot.unscheduled_count(),
    };
    (snapshot, summary)
}

fn at(kind: &str, idx: usize, err: FdrError) -> FdrError {
    match err {
        FdrError::Parse(msg) => FdrError::Parse(format!("{kind} #{idx}: {msg}")),
        other => other,
    }
}
