//! Persistence for the leaderboard document.
//!
//! A [`Backend`] only knows how to load and save the whole document; two
//! independent load/save pairs against the same backend are last-writer-wins.
//! [`Store`] wraps a backend with a writer mutex so every [`Store::write`]
//! issued through one instance runs its load, mutation and save without
//! interleaving. Separate processes sharing a data file are still
//! last-writer-wins.

mod error;
mod file;
mod memory;

use std::path::Path;
use std::sync::Mutex;

pub use error::StoreError;
pub use file::JsonFile;
pub use memory::InMemory;

use crate::error::AppError;
use crate::models::player::Leaderboard;

pub trait Backend: Send + Sync {
    /// Reads the current document. A missing document is an empty board.
    fn load(&self) -> Result<Leaderboard, StoreError>;

    /// Replaces the persisted document with `board`.
    fn save(&self, board: &Leaderboard) -> Result<(), StoreError>;
}

/// Result of a mutation passed to [`Store::write`].
#[derive(Debug)]
pub enum Change<T> {
    /// The board was modified and must be saved.
    Commit(T),
    /// Nothing changed; skip the save.
    Keep(T),
}

pub struct Store {
    backend: Box<dyn Backend>,
    writer: Mutex<()>,
}

impl Store {
    pub fn new(backend: impl Backend + 'static) -> Self {
        Store {
            backend: Box::new(backend),
            writer: Mutex::new(()),
        }
    }

    /// Opens the JSON document at `path`, creating an empty one if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let file = JsonFile::new(path);
        file.initialize()?;
        Ok(Store::new(file))
    }

    pub fn in_memory() -> Self {
        Store::new(InMemory::new())
    }

    /// Loads a fresh copy of the board and hands it to `f`.
    pub fn read<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&Leaderboard) -> Result<T, AppError>,
    {
        let board = self.backend.load()?;
        f(&board)
    }

    /// Runs one load, mutate, save cycle while holding the writer lock.
    ///
    /// The board is saved only when `f` returns [`Change::Commit`]; an error
    /// from `f` leaves the persisted document untouched.
    pub fn write<F, T>(&self, f: F) -> Result<T, AppError>
    where
        F: FnOnce(&mut Leaderboard) -> Result<Change<T>, AppError>,
    {
        let _guard = self.writer.lock().map_err(|_| StoreError::LockPoisoned)?;
        let mut board = self.backend.load()?;
        match f(&mut board)? {
            Change::Commit(value) => {
                self.backend.save(&board)?;
                Ok(value)
            }
            Change::Keep(value) => Ok(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::player::{PlayerRecord, ShipState};
    use serde_json::Map;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::thread;

    fn record(username: &str, high_score: u64) -> PlayerRecord {
        PlayerRecord {
            username: username.into(),
            high_score,
            ship: ShipState::default(),
            enemies: Vec::new(),
            level: 1,
            last_updated: None,
            extra: Map::new(),
        }
    }

    /// Counts saves and fails them on demand.
    struct Flaky {
        inner: InMemory,
        saves: Arc<AtomicUsize>,
        fail_saves: bool,
    }

    impl Backend for Flaky {
        fn load(&self) -> Result<Leaderboard, StoreError> {
            self.inner.load()
        }

        fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            if self.fail_saves {
                return Err(StoreError::io(
                    "board.json",
                    std::io::Error::new(std::io::ErrorKind::Other, "disk full"),
                ));
            }
            self.inner.save(board)
        }
    }

    #[test]
    fn test_backend_is_last_writer_wins() {
        let backend = InMemory::new();

        let mut first = backend.load().unwrap();
        let mut second = backend.load().unwrap();
        first.players.push(record("alpha", 10));
        second.players.push(record("bravo", 20));
        backend.save(&first).unwrap();
        backend.save(&second).unwrap();

        let board = backend.load().unwrap();
        assert!(board.find("alpha").is_none(), "first write is lost");
        assert!(board.find("bravo").is_some());
    }

    #[test]
    fn test_write_serializes_concurrent_writers() {
        let store = Arc::new(Store::in_memory());
        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = store.clone();
                thread::spawn(move || {
                    store
                        .write(|board| {
                            board.players.push(record(&format!("pilot-{i}"), i));
                            Ok(Change::Commit(()))
                        })
                        .unwrap();
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let count = store.read(|board| Ok(board.len())).unwrap();
        assert_eq!(count, 16);
    }

    #[test]
    fn test_keep_skips_save() {
        let saves = Arc::new(AtomicUsize::new(0));
        let store = Store::new(Flaky {
            inner: InMemory::new(),
            saves: saves.clone(),
            fail_saves: false,
        });
        store.write(|_| Ok(Change::Keep(()))).unwrap();
        assert_eq!(saves.load(Ordering::SeqCst), 0);
        store
            .write(|board| {
                board.players.push(record("alpha", 1));
                Ok(Change::Commit(()))
            })
            .unwrap();
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert_eq!(store.read(|b| Ok(b.len())).unwrap(), 1);
    }

    #[test]
    fn test_save_failure_propagates() {
        let store = Store::new(Flaky {
            inner: InMemory::with_board(Leaderboard {
                players: vec![record("alpha", 5)],
            }),
            saves: Arc::new(AtomicUsize::new(0)),
            fail_saves: true,
        });

        let err = store
            .write(|board| {
                board.players[0].high_score = 50;
                Ok(Change::Commit(()))
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Storage(_)));

        let score = store.read(|b| Ok(b.players[0].high_score)).unwrap();
        assert_eq!(score, 5);
    }

    #[test]
    fn test_mutation_error_leaves_document_untouched() {
        let store = Store::in_memory();
        let err = store
            .write::<_, ()>(|board| {
                board.players.push(record("alpha", 1));
                Err(AppError::Validation("nope".into()))
            })
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(store.read(|b| Ok(b.len())).unwrap(), 0);
    }
}
