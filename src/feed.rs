use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{FdrError, Result};
use crate::http_client::{DEFAULT_TIMEOUT_SECS, http_client};
use crate::ingest::{FeedBatch, parse_bootstrap_json, parse_fixtures_json};

pub const DEFAULT_FEED_URL: &str = "https://fantasy.premierleague.com/api";
pub const BOOTSTRAP_FILE: &str = "bootstrap-static.json";
pub const FIXTURES_FILE: &str = "fixtures.json";

/// Where raw feed documents come from. Implementations only move bytes;
/// decoding happens in `ingest`.
pub trait FeedSource: Send + Sync {
    fn fetch_bootstrap(&self) -> Result<String>;
    fn fetch_fixtures(&self) -> Result<String>;

    fn describe(&self) -> String;
}

/// Fetches and decodes both documents. Nothing is returned unless both parse.
pub fn load_batch(source: &dyn FeedSource) -> Result<FeedBatch> {
    let bootstrap = parse_bootstrap_json(&source.fetch_bootstrap()?)?;
    let fixtures = parse_fixtures_json(&source.fetch_fixtures()?)?;
    Ok(FeedBatch::new(bootstrap, fixtures))
}

#[derive(Debug, Clone)]
pub struct HttpFeed {
    base_url: String,
    timeout_secs: u64,
}

impl HttpFeed {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout_secs,
        }
    }

    pub fn bootstrap_url(&self) -> String {
        format!("{}/bootstrap-static/", self.base_url)
    }

    pub fn fixtures_url(&self) -> String {
        format!("{}/fixtures/", self.base_url)
    }

    fn get(&self, url: &str) -> Result<String> {
        let client = http_client(self.timeout_secs)?;
        let resp = client
            .get(url)
            .send()
            .map_err(|err| FdrError::transport(format!("request to {url} failed: {err}")))?;
        let status = resp.status();
        let body = resp
            .text()
            .map_err(|err| FdrError::transport(format!("failed reading body of {url}: {err}")))?;
        if !status.is_success() {
            return Err(FdrError::transport(format!("http {status} from {url}")));
        }
        Ok(body)
    }
}

impl Default for HttpFeed {
    fn default() -> Self {
        Self::new(DEFAULT_FEED_URL, DEFAULT_TIMEOUT_SECS)
    }
}

impl FeedSource for HttpFeed {
    fn fetch_bootstrap(&self) -> Result<String> {
        self.get(&self.bootstrap_url())
    }

    fn fetch_fixtures(&self) -> Result<String> {
        self.get(&self.fixtures_url())
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

/// Reads previously saved documents from a directory.
#[derive(Debug, Clone)]
pub struct DirFeed {
    dir: PathBuf,
}

impl DirFeed {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn read(&self, name: &str) -> Result<String> {
        let path = self.dir.join(name);
        fs::read_to_string(&path)
            .map_err(|err| FdrError::transport(format!("reading {}: {err}", path.display())))
    }
}

impl FeedSource for DirFeed {
    fn fetch_bootstrap(&self) -> Result<String> {
        self.read(BOOTSTRAP_FILE)
    }

    fn fetch_fixtures(&self) -> Result<String> {
        self.read(FIXTURES_FILE)
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}
