use std::sync::{Arc, PoisonError, RwLock};

use crate::engine::DifficultyEngine;
use crate::error::Result;
use crate::feed::{FeedSource, load_batch};
use crate::ingest::{FeedBatch, IngestSummary, build_snapshot};
use crate::model::{
    DEFAULT_SEASON_LENGTH, Event, Fixture, FixtureDisplay, GameweekWindow, Location, Settings,
    SortMode, Team,
};
use crate::overrides::StrengthOverrides;
use crate::store::{EntityStore, Snapshot};
use crate::strength::{NeutralStrengths, StrengthSource};
use crate::view::{GridRow, RankedTeam, ViewBuilder};
use crate::visibility::VisibilitySet;

/// Everything the planner knows: feed data, user overrides, hidden teams and
/// the ranking settings. Build one at startup and share it by reference.
pub struct FdrContext {
    store: EntityStore,
    overrides: StrengthOverrides,
    visibility: VisibilitySet,
    settings: RwLock<Settings>,
    strengths: Arc<dyn StrengthSource>,
    season_length: u32,
}

impl Default for FdrContext {
    fn default() -> Self {
        Self::new(Arc::new(NeutralStrengths))
    }
}

impl FdrContext {
    pub fn new(strengths: Arc<dyn StrengthSource>) -> Self {
        Self {
            store: EntityStore::new(),
            overrides: StrengthOverrides::new(),
            visibility: VisibilitySet::new(),
            settings: RwLock::new(Settings::default()),
            strengths,
            season_length: DEFAULT_SEASON_LENGTH,
        }
    }

    pub fn with_settings(self, settings: Settings) -> Self {
        self.set_settings(settings);
        self
    }

    pub fn with_season_length(mut self, season_length: u32) -> Self {
        self.season_length = season_length.max(1);
        self
    }

    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    pub fn overrides(&self) -> &StrengthOverrides {
        &self.overrides
    }

    pub fn visibility(&self) -> &VisibilitySet {
        &self.visibility
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.store.snapshot()
    }

    // --- ingestion ---

    /// Pulls both feed documents and installs them. On any error the current
    /// data stays in place and the error is handed back unchanged.
    pub fn refresh_from(&self, source: &dyn FeedSource) -> Result<IngestSummary> {
        let batch = load_batch(source).inspect_err(|err| {
            log::warn!("refresh from {} failed: {err}", source.describe());
        })?;
        Ok(self.ingest(batch))
    }

    /// Installs a decoded batch. Feed ratings ride inside the snapshot, so a
    /// reader scores fixtures and strengths from the same refresh.
    pub fn ingest(&self, batch: FeedBatch) -> IngestSummary {
        let (snapshot, summary) = build_snapshot(batch);
        let first_open = snapshot.first_open_gameweek();
        self.store.install(snapshot);

        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        let before = *settings;
        if settings.fit_to_season(first_open, self.season_length) {
            log::info!(
                "window moved from {}-{} to {}-{}",
                before.start_gameweek,
                before.end_gameweek,
                settings.start_gameweek,
                settings.end_gameweek
            );
        }
        log::info!(
            "ingested {} teams, {} events, {} fixtures ({} unscheduled)",
            summary.teams,
            summary.events,
            summary.fixtures,
            summary.unscheduled
        );
        summary
    }

    pub fn replace_all(&self, teams: Vec<Team>, events: Vec<Event>, fixtures: Vec<Fixture>) {
        self.store.replace_all(teams, events, fixtures);
    }

    // --- settings ---

    pub fn settings(&self) -> Settings {
        *self.settings.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn set_settings(&self, mut settings: Settings) {
        if settings.normalize() {
            log::info!("start gameweek clamped to {}", settings.start_gameweek);
        }
        *self.settings.write().unwrap_or_else(PoisonError::into_inner) = settings;
    }

    pub fn set_window(&self, start_gameweek: u32, end_gameweek: u32) -> GameweekWindow {
        let window = GameweekWindow::new(start_gameweek, end_gameweek);
        let mut settings = self.settings.write().unwrap_or_else(PoisonError::into_inner);
        settings.start_gameweek = window.start();
        settings.end_gameweek = window.end();
        window
    }

    pub fn set_sort(&self, sort: SortMode) {
        self.settings
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .sort = sort;
    }

    pub fn set_sort_by_ease(&self, sort_by_ease: bool) {
        self.set_sort(SortMode::from_ease(sort_by_ease));
    }

    // --- user edits ---

    pub fn set_override(&self, team_id: u32, location: Location, value: i64) -> Result<()> {
        self.overrides.set(team_id, location, value)
    }

    pub fn toggle_visibility(&self, team_id: u32) -> bool {
        self.visibility.toggle(team_id)
    }

    pub fn is_visible(&self, team_id: u32) -> bool {
        self.visibility.is_visible(team_id)
    }

    // --- queries ---

    /// Runs `f` against an engine bound to the current snapshot.
    pub fn with_engine<T>(&self, f: impl FnOnce(&DifficultyEngine<'_>) -> T) -> T {
        let snapshot = self.store.snapshot();
        let engine = DifficultyEngine::new(&snapshot, &self.overrides, self.strengths.as_ref());
        f(&engine)
    }

    /// Runs `f` against a view builder bound to the current snapshot.
    pub fn with_views<T>(&self, f: impl FnOnce(&ViewBuilder<'_>) -> T) -> T {
        let snapshot = self.store.snapshot();
        let engine = DifficultyEngine::new(&snapshot, &self.overrides, self.strengths.as_ref());
        let views = ViewBuilder::new(engine, &self.visibility);
        f(&views)
    }

    pub fn strength(&self, team_id: u32, location: Location) -> u32 {
        self.with_engine(|engine| engine.resolve_strength(team_id, location))
    }

    pub fn average_fdr(&self, team_id: u32, start_gameweek: u32, end_gameweek: u32) -> f64 {
        let window = GameweekWindow::new(start_gameweek, end_gameweek);
        self.with_engine(|engine| engine.average_fdr(team_id, window))
    }

    pub fn ranked_teams(&self) -> Vec<RankedTeam> {
        let settings = self.settings();
        self.with_views(|views| views.ranked_teams(&settings))
    }

    pub fn sorted_teams(&self) -> Vec<Team> {
        let settings = self.settings();
        self.with_views(|views| views.sorted_teams(&settings))
    }

    pub fn fixtures_for_team(&self, team_id: u32, gameweek: u32) -> Vec<FixtureDisplay> {
        self.with_views(|views| views.fixtures_for_team(team_id, gameweek))
    }

    pub fn fixture_grid(&self) -> Vec<GridRow> {
        let settings = self.settings();
        self.with_views(|views| views.fixture_grid(&settings))
    }
}
