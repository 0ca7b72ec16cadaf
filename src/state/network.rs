use crate::state::messages::{NetworkRequest, NetworkResponse};
use beatboard_api::client::LeaderboardApi;
use log::{debug, error};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];
pub const ERROR_CHAR: char = '!';

#[derive(Debug, Copy, Clone)]
pub struct LoadingState {
    pub is_loading: bool,
    pub spinner_char: char,
}

impl Default for LoadingState {
    fn default() -> Self {
        Self { is_loading: false, spinner_char: ' ' }
    }
}

/// In-flight request count plus ownership of the one spinner task.
#[derive(Debug, Default)]
struct Activity {
    in_flight: AtomicUsize,
    spinning: AtomicBool,
}

impl Activity {
    /// Registers a request. Returns true if the caller must start the spinner.
    fn begin(&self) -> bool {
        self.in_flight.fetch_add(1, Ordering::SeqCst);
        self.spinning
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    /// Returns true when the last in-flight request finished.
    fn end(&self) -> bool {
        self.in_flight.fetch_sub(1, Ordering::SeqCst) == 1
    }

    /// Checked by the spinner on every tick; false means the task must exit.
    fn keep_spinning(&self) -> bool {
        if self.in_flight.load(Ordering::SeqCst) > 0 {
            return true;
        }
        self.spinning.store(false, Ordering::SeqCst);
        // a request that arrived between the load and the store saw the
        // spinner as running, so this task has to keep going for it
        self.in_flight.load(Ordering::SeqCst) > 0
            && self
                .spinning
                .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                .is_ok()
    }
}

/// Receives requests and runs each one as its own task, so player fetches are
/// independent and complete in whatever order the backend answers.
pub struct NetworkWorker {
    client: Arc<LeaderboardApi>,
    requests: mpsc::Receiver<NetworkRequest>,
    responses: mpsc::Sender<NetworkResponse>,
    activity: Arc<Activity>,
}

impl NetworkWorker {
    pub fn new(
        client: LeaderboardApi,
        requests: mpsc::Receiver<NetworkRequest>,
        responses: mpsc::Sender<NetworkResponse>,
    ) -> Self {
        Self {
            client: Arc::new(client),
            requests,
            responses,
            activity: Arc::new(Activity::default()),
        }
    }

    pub async fn run(mut self) {
        while let Some(request) = self.requests.recv().await {
            if self.activity.begin() {
                start_loading_animation(self.responses.clone(), self.activity.clone()).await;
            }

            let client = self.client.clone();
            let responses = self.responses.clone();
            let activity = self.activity.clone();

            tokio::spawn(async move {
                let response = handle_request(&client, request).await;
                let is_ok = !response.is_error();

                if let Err(e) = responses.send(response).await {
                    error!("Failed to send network response: {e}");
                }
                if activity.end() {
                    stop_loading_animation(&responses, is_ok).await;
                }
            });
        }
    }
}

pub async fn handle_request(client: &LeaderboardApi, request: NetworkRequest) -> NetworkResponse {
    match request {
        NetworkRequest::LoadLeaderboard => {
            debug!("loading leaderboard");
            match client.fetch_leaderboard().await {
                Ok(entries) => NetworkResponse::LeaderboardLoaded { entries },
                Err(error) => NetworkResponse::LeaderboardFailed { error },
            }
        }
        NetworkRequest::LoadPlayerScores { user_id } => {
            debug!("loading scores for player {user_id}");
            match client.fetch_player_scores(&user_id).await {
                Ok(history) => NetworkResponse::PlayerScoresLoaded { user_id, history },
                Err(error) => NetworkResponse::PlayerScoresFailed { user_id, error },
            }
        }
        NetworkRequest::ForceFetchPlayer { user_id } => {
            debug!("force fetching player {user_id}");
            match client.force_fetch_player(&user_id).await {
                Ok(message) => NetworkResponse::ForceFetchCompleted { user_id, message },
                Err(error) => NetworkResponse::ForceFetchFailed { user_id, error },
            }
        }
    }
}

async fn start_loading_animation(
    responses: mpsc::Sender<NetworkResponse>,
    activity: Arc<Activity>,
) {
    let mut loading_state = LoadingState { is_loading: true, spinner_char: SPINNER_CHARS[0] };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged { loading_state })
        .await;

    tokio::spawn(async move {
        let mut spinner_index = 1;
        let mut interval = tokio::time::interval(Duration::from_millis(33));
        loop {
            interval.tick().await;
            if !activity.keep_spinning() {
                break;
            }
            loading_state.spinner_char = SPINNER_CHARS[spinner_index];
            spinner_index = (spinner_index + 1) % SPINNER_CHARS.len();
            let _ = responses
                .send(NetworkResponse::LoadingStateChanged { loading_state })
                .await;
        }
    });
}

async fn stop_loading_animation(responses: &mpsc::Sender<NetworkResponse>, is_ok: bool) {
    tokio::time::sleep(Duration::from_millis(15)).await;

    let spinner_char = if is_ok { ' ' } else { ERROR_CHAR };
    let _ = responses
        .send(NetworkResponse::LoadingStateChanged {
            loading_state: LoadingState { is_loading: false, spinner_char },
        })
        .await;
}
