use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(#[from] crate::config::ConfigError),
    #[error("load error: {0}")]
    Load(#[from] crate::loader::LoadError),
    #[error("narrative error: {0}")]
    Narrative(#[from] crate::narrative::NarrativeError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0}")]
    Other(String),
}
