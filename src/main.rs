use std::sync::Arc;
use std::sync::mpsc;

use anyhow::{Context, Result, anyhow, bail};

use fdr_planner::FdrContext;
use fdr_planner::config::Config;
use fdr_planner::model::{FixtureDisplay, GameweekWindow, Location, SortMode};
use fdr_planner::persist;
use fdr_planner::view::GridRow;
use fdr_planner::worker::{RefreshCommand, RefreshEvent, spawn_refresher};

const USAGE: &str = "\
usage: fdr_planner [--verbose] [command]

commands:
  table                               ranked fixture grid (default)
  team <id> [gw]                      fixtures for one team
  strength <team> <home|away> <n>     override a team's strength
  reset-strength <team>               drop a team's overrides
  toggle <team>                       hide/show a team
  window <start> <end>                set the gameweek window
  sort <easiest|hardest|id>           set the ranking order
  hidden                              list hidden teams";

enum Command {
    Table,
    Team { id: u32, gameweek: Option<u32> },
    Strength { team: u32, location: Location, value: i64 },
    ResetStrength { team: u32 },
    Toggle { team: u32 },
    Window { start: u32, end: u32 },
    Sort(SortMode),
    Hidden,
}

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");

    let mut args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = take_flag(&mut args, "--verbose") | take_flag(&mut args, "-v");
    if take_flag(&mut args, "--help") || take_flag(&mut args, "-h") {
        println!("{USAGE}");
        return Ok(());
    }
    let log_level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level))
        .format_timestamp(None)
        .init();

    let command = parse_command(&args)?;
    let cfg = Config::from_env();

    let ctx = Arc::new(
        FdrContext::default()
            .with_settings(cfg.settings)
            .with_season_length(cfg.season_length),
    );
    if cfg.persist && persist::load_into(&ctx) {
        log::debug!("loaded saved preferences");
        if !cfg.pinned.is_empty() {
            ctx.set_settings(cfg.pinned.apply_to(ctx.settings()));
        }
    }

    // Edits that don't need feed data are applied and saved straight away.
    if let Some(msg) = apply_edit(&ctx, &command)? {
        println!("{msg}");
        if cfg.persist {
            persist::save_from(&ctx).context("saving preferences")?;
        }
        return Ok(());
    }

    refresh(&ctx, &cfg)?;

    match command {
        Command::Table => print_table(&ctx.fixture_grid()),
        Command::Team { id, gameweek } => print_team(&ctx, id, gameweek)?,
        Command::Hidden => print_hidden(&ctx),
        _ => {}
    }

    if cfg.persist {
        persist::save_from(&ctx).context("saving preferences")?;
    }
    Ok(())
}

fn refresh(ctx: &Arc<FdrContext>, cfg: &Config) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    let handle = spawn_refresher(ctx.clone(), cfg.feed_source(), cmd_rx, tx);

    cmd_tx
        .send(RefreshCommand::Refresh)
        .map_err(|_| anyhow!("refresh worker is gone"))?;
    let outcome = loop {
        match rx.recv().context("refresh worker hung up")? {
            RefreshEvent::Log(line) => log::debug!("{line}"),
            RefreshEvent::Completed(outcome) => break outcome,
        }
    };
    let _ = cmd_tx.send(RefreshCommand::Shutdown);
    let _ = handle.join();

    let summary = outcome.context("loading league data")?;
    log::info!(
        "{} teams, {} events, {} fixtures",
        summary.teams,
        summary.events,
        summary.fixtures
    );
    Ok(())
}

fn apply_edit(ctx: &FdrContext, command: &Command) -> Result<Option<String>> {
    let msg = match *command {
        Command::Strength {
            team,
            location,
            value,
        } => {
            ctx.set_override(team, location, value)?;
            format!("team {team} {} strength set to {value}", location.label())
        }
        Command::ResetStrength { team } => {
            ctx.overrides().reset_team(team);
            format!("team {team} strengths reset")
        }
        Command::Toggle { team } => {
            let visible = ctx.toggle_visibility(team);
            format!(
                "team {team} is now {}",
                if visible { "shown" } else { "hidden" }
            )
        }
        Command::Window { start, end } => {
            let window = ctx.set_window(start, end);
            format!("window set to GW{}-GW{}", window.start(), window.end())
        }
        Command::Sort(sort) => {
            ctx.set_sort(sort);
            format!("sorting by {}", sort.label())
        }
        Command::Table | Command::Team { .. } | Command::Hidden => return Ok(None),
    };
    Ok(Some(msg))
}

fn print_table(rows: &[GridRow]) {
    let Some(first) = rows.first() else {
        println!("No teams to show.");
        return;
    };
    let mut header = format!("{:<5} {:>5} ", "Team", "FDR");
    for cell in &first.cells {
        header.push_str(&format!("{:<10}", format!("GW{}", cell.gameweek)));
    }
    println!("{}", header.trim_end());

    for row in rows {
        for line in 0..row.depth() {
            let mut out = if line == 0 {
                format!("{:<5} {:>5.2} ", row.team.short_name, row.average_fdr)
            } else {
                format!("{:<5} {:>5} ", "", "")
            };
            for cell in &row.cells {
                let text = cell.fixtures.get(line).map(fixture_label).unwrap_or_default();
                out.push_str(&format!("{text:<10}"));
            }
            println!("{}", out.trim_end());
        }
    }
}

fn print_team(ctx: &FdrContext, id: u32, gameweek: Option<u32>) -> Result<()> {
    let team = ctx.store().get_team(id)?;
    let settings = ctx.settings();
    let window = match gameweek {
        Some(gw) => GameweekWindow::single(gw),
        None => settings.window(),
    };
    println!(
        "{} ({}) avg FDR {:.2} over GW{}-GW{}",
        team.name,
        team.short_name,
        ctx.average_fdr(id, window.start(), window.end()),
        window.start(),
        window.end()
    );
    for gw in window.gameweeks() {
        let fixtures = ctx.fixtures_for_team(id, gw);
        if fixtures.is_empty() {
            println!("  GW{gw:<3} blank");
            continue;
        }
        for f in &fixtures {
            let when = f
                .date
                .map(|d| d.format("%a %d %b %H:%M").to_string())
                .unwrap_or_else(|| "TBC".to_string());
            println!("  GW{gw:<3} {:<10} {when}", fixture_label(f));
        }
    }
    Ok(())
}

fn print_hidden(ctx: &FdrContext) {
    let hidden = ctx.visibility().hidden();
    if hidden.is_empty() {
        println!("All teams visible.");
        return;
    }
    let snapshot = ctx.snapshot();
    for id in hidden {
        let name = snapshot
            .team(id)
            .map(|t| t.name.as_str())
            .unwrap_or("(unknown)");
        println!("{id:>3} {name}");
    }
}

fn fixture_label(f: &FixtureDisplay) -> String {
    let side = if f.is_home { "H" } else { "A" };
    format!("{} ({side}) {}", f.opponent_short_name, f.difficulty)
}

fn parse_command(args: &[String]) -> Result<Command> {
    let Some(name) = args.first() else {
        return Ok(Command::Table);
    };
    let cmd = match name.as_str() {
        "table" => Command::Table,
        "team" => Command::Team {
            id: num(args, 1, "team id")?,
            gameweek: match args.get(2) {
                Some(_) => Some(num(args, 2, "gameweek")?),
                None => None,
            },
        },
        "strength" => Command::Strength {
            team: num(args, 1, "team id")?,
            location: Location::parse(arg(args, 2, "location")?)
                .ok_or_else(|| anyhow!("location must be home or away"))?,
            value: arg(args, 3, "strength")?
                .parse::<i64>()
                .context("strength must be an integer")?,
        },
        "reset-strength" => Command::ResetStrength {
            team: num(args, 1, "team id")?,
        },
        "toggle" => Command::Toggle {
            team: num(args, 1, "team id")?,
        },
        "window" => Command::Window {
            start: num(args, 1, "start gameweek")?,
            end: num(args, 2, "end gameweek")?,
        },
        "sort" => Command::Sort(
            SortMode::parse(arg(args, 1, "sort mode")?)
                .ok_or_else(|| anyhow!("sort must be easiest, hardest or id"))?,
        ),
        "hidden" => Command::Hidden,
        other => bail!("unknown command {other:?}\n\n{USAGE}"),
    };
    Ok(cmd)
}

fn arg<'a>(args: &'a [String], idx: usize, what: &str) -> Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .ok_or_else(|| anyhow!("missing {what}\n\n{USAGE}"))
}

fn num(args: &[String], idx: usize, what: &str) -> Result<u32> {
    arg(args, idx, what)?
        .parse::<u32>()
        .with_context(|| format!("{what} must be a number"))
}

fn take_flag(args: &mut Vec<String>, flag: &str) -> bool {
    let before = args.len();
    args.retain(|a| a != flag);
    args.len() != before
}
