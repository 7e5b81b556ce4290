//! JSON file backend.

use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::Utc;

use super::{Backend, StoreError};
use crate::models::player::Leaderboard;

/// Keeps the whole leaderboard in a single pretty-printed JSON file.
///
/// Saves go to a `.tmp` sibling which is then renamed over the target, so a
/// failed write never clobbers the last committed document.
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        JsonFile {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Writes an empty leaderboard if no document exists yet.
    pub fn initialize(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            tracing::info!("Data file exists: {}", self.path.display());
            return Ok(());
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| StoreError::io(parent, e))?;
        }
        tracing::info!("Creating new data file: {}", self.path.display());
        self.save(&Leaderboard::default())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_owned();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Moves an unreadable document out of the way so the next save
    /// cannot overwrite it.
    fn quarantine(&self) -> Result<PathBuf, StoreError> {
        let mut name = self.path.as_os_str().to_owned();
        name.push(format!(".corrupt-{}", Utc::now().format("%Y%m%dT%H%M%S%.3fZ")));
        let target = PathBuf::from(name);
        fs::rename(&self.path, &target).map_err(|e| StoreError::io(&self.path, e))?;
        Ok(target)
    }
}

impl Backend for JsonFile {
    fn load(&self) -> Result<Leaderboard, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No data file at {}, starting empty", self.path.display());
                return Ok(Leaderboard::default());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        match serde_json::from_str::<Leaderboard>(&raw) {
            Ok(board) => {
                tracing::debug!(
                    "Loaded {} players from {}",
                    board.len(),
                    self.path.display()
                );
                Ok(board)
            }
            Err(e) => {
                let moved = self.quarantine()?;
                tracing::error!(
                    "Data file {} is malformed ({}); moved to {} and starting empty",
                    self.path.display(),
                    e,
                    moved.display()
                );
                Ok(Leaderboard::default())
            }
        }
    }

    fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        let bytes = serde_json::to_vec_pretty(board)?;
        let temp = self.temp_path();
        let mut file = File::create(&temp).map_err(|e| StoreError::io(&temp, e))?;
        file.write_all(&bytes).map_err(|e| StoreError::io(&temp, e))?;
        file.sync_all().map_err(|e| StoreError::io(&temp, e))?;
        drop(file);
        fs::rename(&temp, &self.path).map_err(|e| StoreError::io(&self.path, e))?;
        tracing::debug!("Saved {} players to {}", board.len(), self.path.display());
        Ok(())
    }
}
