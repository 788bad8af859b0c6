use std::path::PathBuf;
use std::sync::Arc;

use fdr_planner::FdrContext;
use fdr_planner::feed::DirFeed;
use fdr_planner::model::{Event, Fixture, Location, SortMode, Team};
use fdr_planner::strength::{StrengthSource, StrengthTable};

fn feed_context() -> FdrContext {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let ctx = FdrContext::new(Arc::new(StrengthTable::new()));
    ctx.refresh_from(&DirFeed::new(dir)).expect("fixture feed should load");
    ctx
}

fn ids(teams: &[Team]) -> Vec<u32> {
    teams.iter().map(|t| t.id).collect()
}

fn two_team_context() -> FdrContext {
    // Team 1 faces a strength-2 visitor, team 2 a strength-4 host.
    let defaults: Arc<dyn StrengthSource> =
        Arc::new(|team: u32, loc: Location| -> Option<u32> {
            match (team, loc) {
                (1, Location::Home) => Some(4),
                (2, Location::Away) => Some(2),
                _ => None,
            }
        });
    let ctx = FdrContext::new(defaults);
    ctx.replace_all(
        vec![
            Team {
                id: 1,
                name: "Alpha".to_string(),
                short_name: "A".to_string(),
                code: 1,
            },
            Team {
                id: 2,
                name: "Beta".to_string(),
                short_name: "B".to_string(),
                code: 2,
            },
        ],
        vec![Event {
            id: 1,
            gameweek: 1,
            name: "Gameweek 1".to_string(),
            finished: false,
            data_checked: false,
            is_current: true,
            is_next: false,
        }],
        vec![Fixture {
            id: 1,
            event_id: Some(1),
            home_team_id: 1,
            away_team_id: 2,
            finished: false,
            kickoff: None,
        }],
    );
    ctx.set_window(1, 1);
    ctx
}

#[test]
fn easiest_first_then_hidden_team_drops_out() {
    let ctx = two_team_context();
    ctx.set_sort_by_ease(true);
    assert_eq!(ctx.average_fdr(1, 1, 1), 2.0);
    assert_eq!(ctx.average_fdr(2, 1, 1), 4.0);
    assert_eq!(ids(&ctx.sorted_teams()), vec![1, 2]);

    ctx.toggle_visibility(1);
    assert_eq!(ids(&ctx.sorted_teams()), vec![2]);
    ctx.toggle_visibility(1);
    assert_eq!(ids(&ctx.sorted_teams()), vec![1, 2]);
}

#[test]
fn sort_by_ease_false_is_hardest_first() {
    let ctx = two_team_context();
    ctx.set_sort_by_ease(false);
    assert!(!ctx.settings().sort_by_ease());
    assert_eq!(ids(&ctx.sorted_teams()), vec![2, 1]);
}

#[test]
fn feed_ranking_in_each_mode() {
    let ctx = feed_context();
    ctx.set_sort(SortMode::Easiest);
    assert_eq!(ids(&ctx.sorted_teams()), vec![3, 4, 2, 1]);
    ctx.set_sort(SortMode::Hardest);
    assert_eq!(ids(&ctx.sorted_teams()), vec![1, 2, 4, 3]);
    ctx.set_sort(SortMode::TeamId);
    assert_eq!(ids(&ctx.sorted_teams()), vec![1, 2, 3, 4]);
}

#[test]
fn sorted_teams_is_permutation_of_visible() {
    let ctx = feed_context();
    ctx.toggle_visibility(2);
    ctx.toggle_visibility(42);
    for sort in [SortMode::Easiest, SortMode::Hardest, SortMode::TeamId] {
        ctx.set_sort(sort);
        let mut got = ids(&ctx.sorted_teams());
        got.sort_unstable();
        assert_eq!(got, vec![1, 3, 4]);
    }
}

#[test]
fn equal_scores_break_ties_by_id() {
    let ctx = feed_context();
    // Blank window: everyone scores the sentinel.
    ctx.set_window(30, 31);
    ctx.set_sort(SortMode::Hardest);
    assert_eq!(ids(&ctx.sorted_teams()), vec![1, 2, 3, 4]);
    ctx.set_sort(SortMode::Easiest);
    assert_eq!(ids(&ctx.sorted_teams()), vec![1, 2, 3, 4]);
}

#[test]
fn double_gameweek_is_ordered_by_kickoff() {
    let ctx = feed_context();
    let gw3 = ctx.fixtures_for_team(1, 3);
    let fixture_ids: Vec<u32> = gw3.iter().map(|f| f.fixture_id).collect();
    assert_eq!(fixture_ids, vec![303, 301]);

    assert_eq!(gw3[0].opponent_id, 4);
    assert_eq!(gw3[0].opponent_short_name, "LIV");
    assert!(!gw3[0].is_home);
    assert_eq!(gw3[0].difficulty, 5);
    assert_eq!(gw3[1].opponent_short_name, "CHE");
    assert!(gw3[1].is_home);
    assert_eq!(gw3[1].difficulty, 4);
}

#[test]
fn blank_gameweek_is_empty() {
    let ctx = feed_context();
    assert!(ctx.fixtures_for_team(2, 4).is_empty());
    assert!(ctx.fixtures_for_team(77, 2).is_empty());
}

#[test]
fn unknown_opponent_shows_placeholder_name() {
    let ctx = two_team_context();
    ctx.replace_all(
        vec![Team {
            id: 1,
            name: "Alpha".to_string(),
            short_name: "A".to_string(),
            code: 1,
        }],
        ctx.snapshot().events().to_vec(),
        ctx.snapshot().fixtures().to_vec(),
    );
    let gw1 = ctx.fixtures_for_team(1, 1);
    assert_eq!(gw1.len(), 1);
    assert_eq!(gw1[0].opponent_short_name, "UNK");
}

#[test]
fn grid_rows_follow_ranking_and_report_depth() {
    let ctx = feed_context();
    ctx.set_sort(SortMode::Hardest);
    ctx.set_window(2, 4);
    let grid = ctx.fixture_grid();
    let row_ids: Vec<u32> = grid.iter().map(|r| r.team.id).collect();
    assert_eq!(row_ids, vec![1, 2, 4, 3]);

    let arsenal = &grid[0];
    assert_eq!(arsenal.cells.len(), 3);
    assert_eq!(arsenal.cells[0].gameweek, 2);
    assert_eq!(arsenal.depth(), 2);
    assert_eq!(arsenal.average_fdr, 4.75);

    let bournemouth = &grid[1];
    assert!(bournemouth.cells[2].fixtures.is_empty());
    assert_eq!(bournemouth.depth(), 1);
}
