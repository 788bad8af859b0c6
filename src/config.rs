use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use crate::feed::{DEFAULT_FEED_URL, DirFeed, FeedSource, HttpFeed};
use crate::http_client::DEFAULT_TIMEOUT_SECS;
use crate::model::{DEFAULT_SEASON_LENGTH, Settings, SortMode};

/// Settings the environment set explicitly. These beat saved preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PinnedSettings {
    pub start_gameweek: Option<u32>,
    pub end_gameweek: Option<u32>,
    pub sort: Option<SortMode>,
}

impl PinnedSettings {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Overlays the pinned fields on `settings` and restores `start <= end`.
    pub fn apply_to(&self, mut settings: Settings) -> Settings {
        if let Some(start) = self.start_gameweek {
            settings.start_gameweek = start;
        }
        if let Some(end) = self.end_gameweek {
            settings.end_gameweek = end;
        }
        if let Some(sort) = self.sort {
            settings.sort = sort;
        }
        settings.normalize();
        settings
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub feed_url: String,
    pub feed_dir: Option<PathBuf>,
    pub timeout_secs: u64,
    pub settings: Settings,
    pub pinned: PinnedSettings,
    pub season_length: u32,
    pub persist: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: DEFAULT_FEED_URL.to_string(),
            feed_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            settings: Settings::default(),
            pinned: PinnedSettings::default(),
            season_length: DEFAULT_SEASON_LENGTH,
            persist: true,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` with an arbitrary key lookup; unparseable values
    /// fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let season_length = non_empty("FDR_SEASON_LENGTH")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .unwrap_or(DEFAULT_SEASON_LENGTH)
            .clamp(1, 60);
        let pinned = PinnedSettings {
            start_gameweek: non_empty("FDR_START_GW")
                .and_then(|val| val.trim().parse::<u32>().ok())
                .map(|gw| gw.clamp(1, season_length)),
            end_gameweek: non_empty("FDR_END_GW")
                .and_then(|val| val.trim().parse::<u32>().ok())
                .map(|gw| gw.clamp(1, season_length)),
            sort: non_empty("FDR_SORT").and_then(|val| SortMode::parse(&val)),
        };
        let settings = pinned.apply_to(Settings {
            end_gameweek: season_length,
            ..defaults.settings
        });

        Self {
            feed_url: non_empty("FDR_FEED_URL").unwrap_or(defaults.feed_url),
            feed_dir: non_empty("FDR_FEED_DIR").map(PathBuf::from),
            timeout_secs: non_empty("FDR_TIMEOUT_SECS")
                .and_then(|val| val.trim().parse::<u64>().ok())
                .unwrap_or(DEFAULT_TIMEOUT_SECS)
                .clamp(1, 120),
            settings,
            pinned,
            season_length,
            persist: non_empty("FDR_PERSIST")
                .map(|val| parse_flag(&val))
                .unwrap_or(defaults.persist),
        }
    }

    /// A directory feed when one is configured, otherwise the public API.
    pub fn feed_source(&self) -> Arc<dyn FeedSource> {
        match &self.feed_dir {
            Some(dir) => Arc::new(DirFeed::new(dir.clone())),
            None => Arc::new(HttpFeed::new(self.feed_url.clone(), self.timeout_secs)),
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    !matches!(
        raw.trim().to_ascii_lowercase().as_str(),
        "0" | "false" | "no" | "off"
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config(pairs: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn empty_environment_is_default() {
        assert_eq!(config(&[]), Config::default());
    }

    #[test]
    fn window_is_clamped_and_ordered() {
        let cfg = config(&[
            ("FDR_START_GW", "30"),
            ("FDR_END_GW", "99"),
            ("FDR_SEASON_LENGTH", "34"),
        ]);
        assert_eq!(cfg.settings.start_gameweek, 30);
        assert_eq!(cfg.settings.end_gameweek, 34);

        let cfg = config(&[("FDR_START_GW", "20"), ("FDR_END_GW", "5")]);
        assert_eq!((cfg.settings.start_gameweek, cfg.settings.end_gameweek), (5, 5));
    }

    #[test]
    fn only_set_values_are_pinned() {
        let cfg = config(&[("FDR_END_GW", "12"), ("FDR_SORT", "easiest")]);
        assert_eq!(cfg.pinned.start_gameweek, None);
        assert_eq!(cfg.pinned.end_gameweek, Some(12));

        let saved = Settings {
            start_gameweek: 20,
            end_gameweek: 30,
            sort: SortMode::TeamId,
        };
        let merged = cfg.pinned.apply_to(saved);
        assert_eq!((merged.start_gameweek, merged.end_gameweek), (12, 12));
        assert_eq!(merged.sort, SortMode::Easiest);
        assert_eq!(Config::default().pinned.apply_to(saved), saved);
    }

    #[test]
    fn junk_values_fall_back() {
        let cfg = config(&[
            ("FDR_TIMEOUT_SECS", "fast"),
            ("FDR_SORT", "sideways"),
            ("FDR_PERSIST", "off"),
            ("FDR_FEED_DIR", "  "),
        ]);
        assert_eq!(cfg.timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(cfg.settings.sort, SortMode::Hardest);
        assert!(!cfg.persist);
        assert_eq!(cfg.feed_dir, None);
    }
}
