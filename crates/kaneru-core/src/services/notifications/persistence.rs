use std::path::Path;
use thiserror::Error;
use tracing::debug;

use super::model::Notification;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Load notification history. A missing or blank file is an empty history.
pub fn load_history(path: &Path) -> Result<Vec<Notification>, PersistenceError> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let data = std::fs::read_to_string(path)?;
    if data.trim().is_empty() {
        return Ok(Vec::new());
    }

    let history: Vec<Notification> = serde_json::from_str(&data)?;
    debug!("Loaded {} notifications from {:?}", history.len(), path);
    Ok(history)
}

/// Write history as pretty JSON, creating the cache directory if needed
pub fn save_history(path: &Path, history: &[Notification]) -> Result<(), PersistenceError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }

    let data = serde_json::to_string_pretty(history)?;
    std::fs::write(path, data)?;
    Ok(())
}
