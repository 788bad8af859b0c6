use std::cmp::Ordering;

use rayon::prelude::*;
use serde::Serialize;

use crate::engine::DifficultyEngine;
use crate::model::{FixtureDisplay, GameweekWindow, NO_DATA_FDR, Settings, SortMode, Team};
use crate::visibility::VisibilitySet;

const UNKNOWN_SHORT_NAME: &str = "UNK";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedTeam {
    pub team: Team,
    pub average_fdr: f64,
    pub fixtures: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameweekCell {
    pub gameweek: u32,
    pub fixtures: Vec<FixtureDisplay>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridRow {
    pub team: Team,
    pub average_fdr: f64,
    pub cells: Vec<GameweekCell>,
}

impl GridRow {
    /// Most fixtures in any single gameweek of the row, at least one.
    pub fn depth(&self) -> usize {
        self.cells
            .iter()
            .map(|c| c.fixtures.len())
            .max()
            .unwrap_or(0)
            .max(1)
    }
}

pub struct ViewBuilder<'a> {
    engine: DifficultyEngine<'a>,
    visibility: &'a VisibilitySet,
}

impl<'a> ViewBuilder<'a> {
    pub fn new(engine: DifficultyEngine<'a>, visibility: &'a VisibilitySet) -> Self {
        Self { engine, visibility }
    }

    pub fn engine(&self) -> &DifficultyEngine<'a> {
        &self.engine
    }

    /// Visible teams with their window score, in display order.
    pub fn ranked_teams(&self, settings: &Settings) -> Vec<RankedTeam> {
        let window = settings.window();
        let visible: Vec<&Team> = self
            .engine
            .snapshot()
            .teams()
            .iter()
            .filter(|t| self.visibility.is_visible(t.id))
            .collect();

        let mut rows: Vec<RankedTeam> = visible
            .par_iter()
            .map(|team| {
                let tally = self.engine.tally(team.id, window);
                RankedTeam {
                    team: (*team).clone(),
                    average_fdr: tally.average().unwrap_or(NO_DATA_FDR),
                    fixtures: tally.fixtures,
                }
            })
            .collect();

        rows.sort_by(|a, b| compare_ranked(settings.sort, a, b));
        rows
    }

    pub fn sorted_teams(&self, settings: &Settings) -> Vec<Team> {
        self.ranked_teams(settings)
            .into_iter()
            .map(|r| r.team)
            .collect()
    }

    /// Everything the team plays in one gameweek, earliest kickoff first.
    /// Blank gameweeks give an empty list; doubles give two entries.
    pub fn fixtures_for_team(&self, team_id: u32, gameweek: u32) -> Vec<FixtureDisplay> {
        let snapshot = self.engine.snapshot();
        let mut out: Vec<FixtureDisplay> = snapshot
            .fixtures_in_gameweek(team_id, gameweek)
            .filter_map(|fixture| {
                let opponent_id = fixture.opponent_of(team_id)?;
                let difficulty = self.engine.difficulty(team_id, fixture)?;
                let opponent_short_name = snapshot
                    .team(opponent_id)
                    .map(|t| t.short_name.clone())
                    .unwrap_or_else(|| UNKNOWN_SHORT_NAME.to_string());
                Some(FixtureDisplay {
                    fixture_id: fixture.id,
                    opponent_id,
                    opponent_short_name,
                    difficulty,
                    is_home: fixture.home_team_id == team_id,
                    date: fixture.kickoff,
                })
            })
            .collect();

        out.sort_by(|a, b| match (a.date, b.date) {
            (Some(x), Some(y)) => x.cmp(&y).then(a.fixture_id.cmp(&b.fixture_id)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => a.fixture_id.cmp(&b.fixture_id),
        });
        out
    }

    pub fn gameweek_cells(&self, team_id: u32, window: GameweekWindow) -> Vec<GameweekCell> {
        window
            .gameweeks()
            .map(|gameweek| GameweekCell {
                gameweek,
                fixtures: self.fixtures_for_team(team_id, gameweek),
            })
            .collect()
    }

    /// Ranked teams with one cell per gameweek of the configured window.
    pub fn fixture_grid(&self, settings: &Settings) -> Vec<GridRow> {
        let window = settings.window();
        self.ranked_teams(settings)
            .into_iter()
            .map(|ranked| GridRow {
                cells: self.gameweek_cells(ranked.team.id, window),
                average_fdr: ranked.average_fdr,
                team: ranked.team,
            })
            .collect()
    }
}

fn compare_ranked(sort: SortMode, a: &RankedTeam, b: &RankedTeam) -> Ordering {
    let by_score = match sort {
        SortMode::Easiest => a.average_fdr.total_cmp(&b.average_fdr),
        SortMode::Hardest => b.average_fdr.total_cmp(&a.average_fdr),
        SortMode::TeamId => Ordering::Equal,
    };
    by_score.then(a.team.id.cmp(&b.team.id))
}
