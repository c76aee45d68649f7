use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid tracker config: {0}")]
    InvalidConfig(String),

    #[error("Rotation {0} not supported")]
    UnsupportedRotation(i32),

    #[error("Empty source frame: {width}x{height}")]
    EmptyFrame { width: u32, height: u32 },

    #[error("Config parse error: {0}")]
    Json(#[from] serde_json::Error),
}
