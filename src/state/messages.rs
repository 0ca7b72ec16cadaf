use crate::state::network::LoadingState;
use beatboard_api::client::ApiError;
use beatboard_api::{LeaderboardEntry, PlayerScoreHistory};
use crossterm::event::KeyEvent;

#[derive(Debug, Clone)]
pub enum NetworkRequest {
    LoadLeaderboard,
    LoadPlayerScores { user_id: String },
    ForceFetchPlayer { user_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    LeaderboardLoaded { entries: Vec<LeaderboardEntry> },
    LeaderboardFailed { error: ApiError },
    /// `user_id` is the id the request was issued for.
    PlayerScoresLoaded { user_id: String, history: PlayerScoreHistory },
    PlayerScoresFailed { user_id: String, error: ApiError },
    ForceFetchCompleted { user_id: String, message: String },
    ForceFetchFailed { user_id: String, error: ApiError },
}

impl NetworkResponse {
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            NetworkResponse::LeaderboardFailed { .. }
                | NetworkResponse::PlayerScoresFailed { .. }
                | NetworkResponse::ForceFetchFailed { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    /// Posted by a message bar timer once the message's time is up.
    ClearMessage { generation: u64 },
}
