use thiserror::Error;

#[derive(Error, Debug)]
pub enum CrewError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Duplicate hero name: {0}")]
    DuplicateHero(String),

    #[error("Duplicate trinket name: {0}")]
    DuplicateTrinket(String),

    #[error("Unknown solver backend: {0}")]
    UnknownBackend(String),
}

pub type Result<T> = std::result::Result<T, CrewError>;
