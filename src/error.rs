use thiserror::Error;

#[derive(Error, Debug)]
pub enum OverlapError {
    #[error("Config error: {0}")]
    Config(String),
    #[error("Connection failure: {0}")]
    Connection(String),
    #[error("Load error: {0}")]
    Load(String),
    #[error("Parse error: {message}")]
    Parse { message: String },
    #[error("Type mismatch: cannot compare {left} with {right}")]
    TypeMismatch { left: &'static str, right: &'static str },
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
    #[error("Internal invariant violated: {0}")]
    Invariant(String),
}

pub type Result<T> = std::result::Result<T, OverlapError>;

// Helper conversions
impl From<std::io::Error> for OverlapError {
    fn from(e: std::io::Error) -> Self { Self::Load(e.to_string()) }
}
impl From<serde_json::Error> for OverlapError {
    fn from(e: serde_json::Error) -> Self { Self::Load(e.to_string()) }
}
impl From<config::ConfigError> for OverlapError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
