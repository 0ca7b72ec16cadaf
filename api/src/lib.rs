pub mod client;
pub mod wire;

use chrono::{DateTime, Utc};

// ---------------------------------------------------------------------------
// Domain types — clean model, independent of the backend wire format
// ---------------------------------------------------------------------------

/// One ranked player as returned by the leaderboard endpoint.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeaderboardEntry {
    /// Server-assigned rank, displayed verbatim and never re-sorted.
    pub rank: u32,
    pub user_id: String,
    pub name: String,
    pub avatar_url: String,
    /// Raw aggregate score before display scaling.
    pub total_score: f64,
    pub play_count: u32,
}

/// A player's full score history, fetched on demand when a detail row opens.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerScoreHistory {
    pub user_id: String,
    pub name: String,
    pub avatar_url: String,
    pub high_scores: Vec<ScoreEntry>,
}

impl PlayerScoreHistory {
    pub fn played_count(&self) -> usize {
        self.high_scores.iter().filter(|s| s.score.is_some()).count()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreEntry {
    pub song: SongInfo,
    /// None when the player has no submitted result for this song.
    pub score: Option<Score>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SongInfo {
    pub name: String,
    pub diff_name: String,
    pub cover_url: String,
}

impl SongInfo {
    /// "Song Name [Difficulty]"
    pub fn title(&self) -> String {
        format!("{} [{}]", self.name, self.diff_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Score {
    /// Fraction in 0..=1.
    pub accuracy: f64,
    /// Unix seconds.
    pub timeset: i64,
    pub bad_cuts: u32,
    pub missed_notes: u32,
    pub bomb_cuts: u32,
    pub walls_hit: u32,
    pub pauses: u32,
    pub full_combo: bool,
}

impl Score {
    pub fn set_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.timeset, 0)
    }
}
