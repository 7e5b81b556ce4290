pub mod leaderboard;
pub mod merge;
pub mod stats;
