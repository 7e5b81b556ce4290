use crate::models::player::{Leaderboard, LeaderboardStats};

/// Summary numbers over every record on the board.
///
/// The average is rounded to the nearest integer with halves going up. Ties
/// for the top spot go to whoever appears first on the board.
pub fn summarize(board: &Leaderboard) -> LeaderboardStats {
    let count = board.len();
    if count == 0 {
        return LeaderboardStats {
            total_players: 0,
            highest_score: 0,
            average_score: 0,
            top_player: None,
        };
    }

    let top = board
        .players
        .iter()
        .reduce(|best, p| if p.high_score > best.high_score { p } else { best });
    let sum: u128 = board.players.iter().map(|p| p.high_score as u128).sum();
    let n = count as u128;
    let average = (2 * sum + n) / (2 * n);

    LeaderboardStats {
        total_players: count,
        highest_score: top.map(|p| p.high_score).unwrap_or(0),
        average_score: average as u64,
        top_player: top.cloned(),
    }
}
