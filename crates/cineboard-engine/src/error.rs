//! Engine error types.
//!
//! Only failures that abort an operation live here. Per-shot generation
//! failures never escape as errors; the orchestrator converts them to
//! `ShotOutcome::Failure` and records them against the shot.

use cineboard_genai::GenAiError;
use cineboard_models::{CharacterId, ShotId};
use cineboard_storage::StorageError;
use thiserror::Error;

/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors that abort an engine operation.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Script analysis failed: {0}")]
    Analysis(String),

    #[error("Unknown shot: {0}")]
    UnknownShot(ShotId),

    #[error("Unknown character: {0}")]
    UnknownCharacter(CharacterId),

    #[error("Shot {0} has no generated image to repaint")]
    MissingImage(ShotId),

    #[error("Backend error: {0}")]
    Backend(#[from] GenAiError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Image download failed: {0}")]
    Download(#[from] reqwest::Error),
}
