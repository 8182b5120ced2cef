use thiserror::Error;

pub type Result<T> = std::result::Result<T, DungeonError>;

/// Errors surfaced before generation starts. Generation itself never fails.
#[derive(Debug, Error)]
pub enum DungeonError {
    #[error("room count must be at least 1")]
    NoRooms,
    #[error("grid must be at least 1x1, got {width}x{height}")]
    EmptyGrid { width: u32, height: u32 },
    #[error("grid of {width}x{height} cells is too large")]
    GridTooLarge { width: u32, height: u32 },
    #[error("stage is {stage_width}x{stage_height} but the config describes {width}x{height}")]
    StageMismatch {
        stage_width: i32,
        stage_height: i32,
        width: u32,
        height: u32,
    },
    #[error("max attempts per room must be at least 1")]
    NoAttempts,
    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
