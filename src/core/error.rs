use thiserror::Error;

#[derive(Error, Debug)]
pub enum AiError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("unknown species: {0}")]
    UnknownSpecies(String),
}

pub type Result<T> = std::result::Result<T, AiError>;
