use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Strength used when neither an override nor a feed default exists.
pub const NEUTRAL_STRENGTH: u32 = 3;
/// Top of the strength editor scale (1..=7).
pub const MAX_STRENGTH: u32 = 7;
/// Average FDR reported for a team with no fixtures in the window.
pub const NO_DATA_FDR: f64 = 0.0;
pub const DEFAULT_SEASON_LENGTH: u32 = 38;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: u32,
    pub name: String,
    pub short_name: String,
    pub code: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: u32,
    pub gameweek: u32,
    pub name: String,
    pub finished: bool,
    pub data_checked: bool,
    pub is_current: bool,
    pub is_next: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fixture {
    pub id: u32,
    pub event_id: Option<u32>,
    pub home_team_id: u32,
    pub away_team_id: u32,
    pub finished: bool,
    pub kickoff: Option<DateTime<Utc>>,
}

impl Fixture {
    pub fn involves(&self, team_id: u32) -> bool {
        self.home_team_id == team_id || self.away_team_id == team_id
    }

    /// Where `team_id` plays this fixture, if it plays at all.
    pub fn location_of(&self, team_id: u32) -> Option<Location> {
        if self.home_team_id == team_id {
            Some(Location::Home)
        } else if self.away_team_id == team_id {
            Some(Location::Away)
        } else {
            None
        }
    }

    pub fn opponent_of(&self, team_id: u32) -> Option<u32> {
        match self.location_of(team_id)? {
            Location::Home => Some(self.away_team_id),
            Location::Away => Some(self.home_team_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Home,
    Away,
}

impl Location {
    pub fn opposite(self) -> Self {
        match self {
            Location::Home => Location::Away,
            Location::Away => Location::Home,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Location::Home => "home",
            Location::Away => "away",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "home" | "h" => Some(Location::Home),
            "away" | "a" => Some(Location::Away),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureDisplay {
    pub fixture_id: u32,
    pub opponent_id: u32,
    pub opponent_short_name: String,
    pub difficulty: u32,
    pub is_home: bool,
    pub date: Option<DateTime<Utc>>,
}

/// Inclusive gameweek range. `start` never exceeds `end`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "WindowBounds")]
pub struct GameweekWindow {
    start: u32,
    end: u32,
}

#[derive(Deserialize)]
struct WindowBounds {
    start: u32,
    end: u32,
}

impl From<WindowBounds> for GameweekWindow {
    fn from(raw: WindowBounds) -> Self {
        Self::new(raw.start, raw.end)
    }
}

impl GameweekWindow {
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end,
        }
    }

    pub fn single(gameweek: u32) -> Self {
        Self::new(gameweek, gameweek)
    }

    pub fn start(&self) -> u32 {
        self.start
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    pub fn contains(&self, gameweek: u32) -> bool {
        (self.start..=self.end).contains(&gameweek)
    }

    pub fn gameweeks(&self) -> std::ops::RangeInclusive<u32> {
        self.start..=self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start) as usize + 1
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    Easiest,
    Hardest,
    TeamId,
}

impl SortMode {
    pub fn from_ease(sort_by_ease: bool) -> Self {
        if sort_by_ease {
            SortMode::Easiest
        } else {
            SortMode::Hardest
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "easiest" | "ease" | "easy" => Some(SortMode::Easiest),
            "hardest" | "hard" => Some(SortMode::Hardest),
            "id" | "team" | "team_id" => Some(SortMode::TeamId),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortMode::Easiest => "easiest",
            SortMode::Hardest => "hardest",
            SortMode::TeamId => "id",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub start_gameweek: u32,
    pub end_gameweek: u32,
    pub sort: SortMode,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            start_gameweek: 1,
            end_gameweek: DEFAULT_SEASON_LENGTH,
            sort: SortMode::Hardest,
        }
    }
}

impl Settings {
    pub fn window(&self) -> GameweekWindow {
        GameweekWindow::new(self.start_gameweek, self.end_gameweek)
    }

    pub fn sort_by_ease(&self) -> bool {
        self.sort == SortMode::Easiest
    }

    pub fn set_sort_by_ease(&mut self, sort_by_ease: bool) {
        self.sort = SortMode::from_ease(sort_by_ease);
    }

    /// Restores `start <= end`. Returns true when anything moved.
    pub fn normalize(&mut self) -> bool {
        if self.start_gameweek > self.end_gameweek {
            self.start_gameweek = self.end_gameweek;
            return true;
        }
        false
    }

    /// Pulls the window inside the season: start no earlier than the first
    /// unplayed gameweek, end no later than the season length.
    pub fn fit_to_season(&mut self, first_open_gameweek: Option<u32>, season_length: u32) -> bool {
        let before = *self;
        if let Some(first) = first_open_gameweek
            && self.start_gameweek < first
        {
            self.start_gameweek = first;
        }
        if self.end_gameweek > season_length {
            self.end_gameweek = season_length;
        }
        self.normalize();
        before != *self
    }
}
