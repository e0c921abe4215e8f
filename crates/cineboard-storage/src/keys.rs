//! Object key layout for persisted panels.
//!
//! Rendered panels live under their project:
//! `{project_id}/{shot_id}_{unix_millis}.png`. The timestamp keeps every
//! regeneration addressable; nothing is overwritten.

use crate::error::{StorageError, StorageResult};

fn validate_segment(segment: &str, what: &str) -> StorageResult<()> {
    if segment.is_empty() {
        return Err(StorageError::invalid_key(format!("{what} is empty")));
    }
    if segment.contains('/') || segment.contains("..") {
        return Err(StorageError::invalid_key(format!("{what} contains path separators: {segment}")));
    }
    Ok(())
}

/// Builds the storage key for one rendered shot.
pub fn shot_key(project_id: &str, shot_id: &str, unix_millis: i64) -> StorageResult<String> {
    validate_segment(project_id, "project id")?;
    validate_segment(shot_id, "shot id")?;
    Ok(format!("{project_id}/{shot_id}_{unix_millis}.png"))
}
