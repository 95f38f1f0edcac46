//! JSON file persistence for the conversation log
//!
//! The file holds a bare JSON array of turns and is rewritten wholesale on
//! every save. There is no atomic rename, so a crash mid-write can leave a
//! corrupt file behind; loading treats that the same as a missing file.

use std::fs;
use std::path::{Path, PathBuf};

use friday_ai::Turn;

use crate::{ConversationLog, Result};

/// How many of the most recent turns survive a save
pub const PERSISTED_TURNS: usize = 20;

/// The backing file for a conversation log
#[derive(Debug, Clone)]
pub struct ConversationFile {
    path: PathBuf,
}

impl ConversationFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the log back from disk
    pub fn load(&self) -> Result<ConversationLog> {
        let content = fs::read_to_string(&self.path)?;
        let turns: Vec<Turn> = serde_json::from_str(&content)?;
        Ok(ConversationLog::from(turns))
    }

    /// Load, falling back to an empty log on any failure
    pub fn load_or_empty(&self) -> ConversationLog {
        match self.load() {
            Ok(log) => {
                tracing::debug!(path = %self.path.display(), turns = log.len(), "Loaded conversation");
                log
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(path = %self.path.display(), "No conversation file yet");
                ConversationLog::new()
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "Discarding unreadable conversation file: {}", e);
                ConversationLog::new()
            }
        }
    }

    /// Overwrite the file with the last [`PERSISTED_TURNS`] turns of `log`
    pub fn save(&self, log: &ConversationLog) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }

        let content = serde_json::to_string(log.window(PERSISTED_TURNS))?;
        fs::write(&self.path, content)?;
        Ok(())
    }

    /// Save, logging and swallowing any failure
    pub fn save_or_log(&self, log: &ConversationLog) {
        if let Err(e) = self.save(log) {
            tracing::error!(path = %self.path.display(), "Error saving conversation: {}", e);
        }
    }
}
