pub mod config;
pub mod context;
pub mod engine;
pub mod error;
pub mod feed;
pub mod http_client;
pub mod ingest;
pub mod model;
pub mod overrides;
pub mod persist;
pub mod store;
pub mod strength;
pub mod view;
pub mod visibility;
pub mod worker;

pub use context::FdrContext;
pub use error::{FdrError, Result};
