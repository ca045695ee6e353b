use thiserror::Error;

/// Errors surfaced by the cinematic library
#[derive(Debug, Error)]
pub enum CinematicError {
    #[error("config error: {0}")]
    Config(String),

    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    #[error("audio error: {0}")]
    Audio(String),

    #[error("speech error: {0}")]
    Speech(String),

    #[error("render error: {0}")]
    Render(String),

    #[error("export error: {0}")]
    Export(String),
}

impl From<serde_json::Error> for CinematicError {
    fn from(e: serde_json::Error) -> Self {
        CinematicError::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CinematicError>;
