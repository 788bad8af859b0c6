use thiserror::Error;

pub type Result<T> = std::result::Result<T, FdrError>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FdrError {
    #[error("{kind} {id} not found")]
    NotFound { kind: &'static str, id: u32 },
    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: i64 },
    #[error("malformed feed: {0}")]
    Parse(String),
    #[error("feed transport failed: {0}")]
    Transport(String),
}

impl FdrError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

impl From<serde_json::Error> for FdrError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse(err.to_string())
    }
}
