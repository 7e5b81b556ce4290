//! In-memory backend for tests and throwaway runs.

use std::sync::RwLock;

use super::{Backend, StoreError};
use crate::models::player::Leaderboard;

#[derive(Default)]
pub struct InMemory {
    board: RwLock<Leaderboard>,
}

impl InMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_board(board: Leaderboard) -> Self {
        InMemory {
            board: RwLock::new(board),
        }
    }
}

impl Backend for InMemory {
    fn load(&self) -> Result<Leaderboard, StoreError> {
        let board = self.board.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(board.clone())
    }

    fn save(&self, board: &Leaderboard) -> Result<(), StoreError> {
        let mut current = self.board.write().map_err(|_| StoreError::LockPoisoned)?;
        *current = board.clone();
        Ok(())
    }
}
