use std::path::PathBuf;
use std::sync::Arc;

use fdr_planner::FdrContext;
use fdr_planner::feed::DirFeed;
use fdr_planner::model::{Event, Fixture, Location, NEUTRAL_STRENGTH, NO_DATA_FDR, Team};
use fdr_planner::strength::{StrengthSource, StrengthTable};

fn team(id: u32, short_name: &str) -> Team {
    Team {
        id,
        name: short_name.to_string(),
        short_name: short_name.to_string(),
        code: id,
    }
}

fn event(id: u32, gameweek: u32) -> Event {
    Event {
        id,
        gameweek,
        name: format!("Gameweek {gameweek}"),
        finished: false,
        data_checked: false,
        is_current: false,
        is_next: false,
    }
}

fn fixture(id: u32, event_id: u32, home: u32, away: u32) -> Fixture {
    Fixture {
        id,
        event_id: Some(event_id),
        home_team_id: home,
        away_team_id: away,
        finished: false,
        kickoff: None,
    }
}

fn feed_context() -> FdrContext {
    let dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join("fixtures");
    let ctx = FdrContext::new(Arc::new(StrengthTable::new()));
    ctx.refresh_from(&DirFeed::new(dir)).expect("fixture feed should load");
    ctx
}

#[test]
fn override_replaces_default_for_opponent_side() {
    let defaults: Arc<dyn StrengthSource> =
        Arc::new(|team: u32, loc: Location| (team == 2 && loc == Location::Away).then_some(4u32));
    let ctx = FdrContext::new(defaults);
    ctx.replace_all(
        vec![team(1, "A"), team(2, "B")],
        vec![event(10, 1)],
        vec![fixture(1, 10, 1, 2)],
    );

    assert_eq!(ctx.average_fdr(1, 1, 1), 4.0);
    ctx.set_override(2, Location::Away, 2).unwrap();
    assert_eq!(ctx.average_fdr(1, 1, 1), 2.0);
}

#[test]
fn unresolvable_strength_is_neutral() {
    let ctx = FdrContext::default();
    ctx.replace_all(
        vec![team(1, "A"), team(2, "B")],
        vec![event(1, 1)],
        vec![fixture(1, 1, 1, 2)],
    );
    assert_eq!(ctx.average_fdr(2, 1, 1), f64::from(NEUTRAL_STRENGTH));
}

#[test]
fn empty_window_returns_sentinel() {
    let ctx = feed_context();
    assert_eq!(ctx.average_fdr(1, 20, 30), NO_DATA_FDR);
    assert_eq!(ctx.average_fdr(99, 1, 38), NO_DATA_FDR);
}

#[test]
fn average_is_mean_of_window_fixtures() {
    let ctx = feed_context();
    // Gameweek 1 is finished but still counts when the window covers it.
    assert_eq!(ctx.average_fdr(1, 1, 1), 2.0);
    assert_eq!(ctx.average_fdr(1, 2, 4), (5.0 + 4.0 + 5.0 + 5.0) / 4.0);
    assert_eq!(ctx.average_fdr(2, 2, 4), (4.0 + 5.0) / 2.0);
    assert_eq!(ctx.average_fdr(3, 2, 4), (2.0 + 5.0) / 2.0);
    assert_eq!(ctx.average_fdr(4, 2, 4), (5.0 + 2.0 + 5.0 + 5.0) / 4.0);
}

#[test]
fn average_matches_fixture_difficulties() {
    let ctx = feed_context();
    let snapshot = ctx.snapshot();
    for t in snapshot.teams() {
        for (start, end) in [(1, 1), (1, 4), (2, 3), (3, 3), (4, 4)] {
            let ds: Vec<u32> = (start..=end)
                .flat_map(|gw| ctx.fixtures_for_team(t.id, gw))
                .map(|f| f.difficulty)
                .collect();
            let expected = if ds.is_empty() {
                NO_DATA_FDR
            } else {
                ds.iter().sum::<u32>() as f64 / ds.len() as f64
            };
            assert_eq!(ctx.average_fdr(t.id, start, end), expected, "team {}", t.id);
        }
    }
}

#[test]
fn inverted_window_is_clamped() {
    let ctx = feed_context();
    assert_eq!(ctx.average_fdr(1, 9, 3), ctx.average_fdr(1, 3, 3));
}

#[test]
fn overrides_do_not_leak_across_location() {
    let ctx = feed_context();
    let before_202 = ctx.fixtures_for_team(4, 2)[0].difficulty;
    ctx.set_override(1, Location::Home, 1).unwrap();

    // Chelsea and Liverpool visit Arsenal: both now face a home strength of 1.
    assert_eq!(ctx.fixtures_for_team(3, 3)[0].difficulty, 1);
    assert_eq!(ctx.fixtures_for_team(4, 4)[0].difficulty, 1);
    // Liverpool hosting Arsenal still reads Arsenal's away side.
    assert_eq!(ctx.fixtures_for_team(4, 2)[0].difficulty, before_202);
    // Arsenal's own difficulties never read its own strength.
    assert_eq!(ctx.average_fdr(1, 2, 4), (5.0 + 4.0 + 5.0 + 5.0) / 4.0);
}

#[test]
fn negative_override_is_rejected() {
    let ctx = feed_context();
    assert!(ctx.set_override(2, Location::Home, -3).is_err());
    assert_eq!(ctx.overrides().get(2, Location::Home), None);
    assert_eq!(ctx.strength(2, Location::Home), 2);
}
