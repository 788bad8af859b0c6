use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::context::FdrContext;
use crate::model::{Location, Settings};

const CACHE_DIR: &str = "fdr_planner";
const PREFS_FILE: &str = "preferences.json";
const PREFS_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrengthPair {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub away: Option<u32>,
}

/// What the host keeps between runs. The engine itself never reads this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    version: u32,
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub overrides: BTreeMap<u32, StrengthPair>,
    #[serde(default)]
    pub hidden: Vec<u32>,
    #[serde(default)]
    pub saved_at: Option<u64>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            version: PREFS_VERSION,
            settings: Settings::default(),
            overrides: BTreeMap::new(),
            hidden: Vec::new(),
            saved_at: None,
        }
    }
}

impl Preferences {
    pub fn capture(ctx: &FdrContext) -> Self {
        let mut overrides: BTreeMap<u32, StrengthPair> = BTreeMap::new();
        for (team_id, location, value) in ctx.overrides().entries() {
            let pair = overrides.entry(team_id).or_default();
            match location {
                Location::Home => pair.home = Some(value),
                Location::Away => pair.away = Some(value),
            }
        }
        Self {
            version: PREFS_VERSION,
            settings: ctx.settings(),
            overrides,
            hidden: ctx.visibility().hidden(),
            saved_at: system_time_to_secs(SystemTime::now()),
        }
    }

    /// Replaces the context's settings, overrides and hidden set.
    pub fn apply(&self, ctx: &FdrContext) {
        ctx.set_settings(self.settings);
        ctx.overrides().clear();
        for (&team_id, pair) in &self.overrides {
            if let Some(home) = pair.home {
                ctx.overrides().put(team_id, Location::Home, home);
            }
            if let Some(away) = pair.away {
                ctx.overrides().put(team_id, Location::Away, away);
            }
        }
        ctx.visibility().show_all();
        for &team_id in &self.hidden {
            if ctx.is_visible(team_id) {
                ctx.toggle_visibility(team_id);
            }
        }
    }
}

/// Missing, unreadable or outdated files all read as "no preferences".
pub fn load_from_path(path: &Path) -> Option<Preferences> {
    let raw = fs::read_to_string(path).ok()?;
    let prefs = serde_json::from_str::<Preferences>(&raw).ok()?;
    if prefs.version != PREFS_VERSION {
        log::warn!(
            "ignoring preferences v{} at {} (want v{PREFS_VERSION})",
            prefs.version,
            path.display()
        );
        return None;
    }
    Some(prefs)
}

pub fn save_to_path(path: &Path, prefs: &Preferences) -> Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir).context("create preferences dir")?;
    }
    let tmp = path.with_extension("json.tmp");
    let json = serde_json::to_string_pretty(prefs).context("serialize preferences")?;
    fs::write(&tmp, json).context("write preferences")?;
    fs::rename(&tmp, path).context("swap preferences")?;
    Ok(())
}

pub fn load_into(ctx: &FdrContext) -> bool {
    let Some(path) = prefs_path() else {
        return false;
    };
    let Some(prefs) = load_from_path(&path) else {
        return false;
    };
    prefs.apply(ctx);
    true
}

pub fn save_from(ctx: &FdrContext) -> Result<()> {
    let Some(path) = prefs_path() else {
        return Ok(());
    };
    save_to_path(&path, &Preferences::capture(ctx))
}

pub fn prefs_path() -> Option<PathBuf> {
    app_cache_dir().map(|dir| dir.join(PREFS_FILE))
}

pub fn app_cache_dir() -> Option<PathBuf> {
    // Prefer XDG cache.
    if let Ok(base) = std::env::var("XDG_CACHE_HOME") {
        if !base.trim().is_empty() {
            return Some(PathBuf::from(base).join(CACHE_DIR));
        }
    }
    let home = std::env::var("HOME").ok()?;
    if home.trim().is_empty() {
        return None;
    }
    Some(PathBuf::from(home).join(".cache").join(CACHE_DIR))
}

fn system_time_to_secs(time: SystemTime) -> Option<u64> {
    time.duration_since(UNIX_EPOCH).ok().map(|d| d.as_secs())
}
