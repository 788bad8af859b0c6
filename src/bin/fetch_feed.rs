use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

use fdr_planner::config::Config;
use fdr_planner::feed::{BOOTSTRAP_FILE, FIXTURES_FILE, FeedSource, HttpFeed};
use fdr_planner::ingest::{parse_bootstrap_json, parse_fixtures_json};

/// Downloads both feed documents into a directory usable as `FDR_FEED_DIR`.
fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp(None)
        .init();

    let cfg = Config::from_env();
    let out_dir = parse_out_arg()
        .or_else(|| cfg.feed_dir.clone())
        .context("pass --out <dir> or set FDR_FEED_DIR")?;
    let feed = HttpFeed::new(cfg.feed_url.clone(), cfg.timeout_secs);

    let bootstrap = feed.fetch_bootstrap()?;
    let fixtures = feed.fetch_fixtures()?;

    // Refuse to save documents the planner could not load later.
    let parsed = parse_bootstrap_json(&bootstrap).context("bootstrap did not parse")?;
    let fixture_rows = parse_fixtures_json(&fixtures).context("fixtures did not parse")?;

    fs::create_dir_all(&out_dir).context("create output dir")?;
    fs::write(out_dir.join(BOOTSTRAP_FILE), bootstrap).context("write bootstrap")?;
    fs::write(out_dir.join(FIXTURES_FILE), fixtures).context("write fixtures")?;

    println!("Feed snapshot saved");
    println!("Dir: {}", out_dir.display());
    println!(
        "Teams: {}  Events: {}  Fixtures: {}",
        parsed.teams.len(),
        parsed.events.len(),
        fixture_rows.len()
    );
    Ok(())
}

fn parse_out_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--out=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--out" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}
