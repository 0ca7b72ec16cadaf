use crate::app::App;
use crate::state::details::Effect;
use crate::state::messages::{NetworkRequest, UiEvent};
use log::error;
use std::time::Duration;
use tokio::sync::mpsc;

/// Carries out the effects produced by state transitions.
#[derive(Clone)]
pub struct EffectRunner {
    network_requests: mpsc::Sender<NetworkRequest>,
    ui_events: mpsc::Sender<UiEvent>,
    message_ttl: Duration,
}

impl EffectRunner {
    pub fn new(
        network_requests: mpsc::Sender<NetworkRequest>,
        ui_events: mpsc::Sender<UiEvent>,
        message_ttl: Duration,
    ) -> Self {
        Self { network_requests, ui_events, message_ttl }
    }

    pub async fn load_leaderboard(&self) {
        self.request(NetworkRequest::LoadLeaderboard).await;
    }

    pub async fn run(&self, app: &mut App, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::FetchScores { user_id } => {
                    self.request(NetworkRequest::LoadPlayerScores { user_id }).await
                }
                Effect::ForceFetch { user_id } => {
                    self.request(NetworkRequest::ForceFetchPlayer { user_id }).await
                }
                Effect::ShowMessage(text) => {
                    let generation = app.state.message.show(text);
                    self.schedule_clear(generation);
                }
            }
        }
    }

    async fn request(&self, request: NetworkRequest) {
        if let Err(e) = self.network_requests.send(request).await {
            error!("Failed to queue network request: {e}");
        }
    }

    fn schedule_clear(&self, generation: u64) {
        let ui_events = self.ui_events.clone();
        let ttl = self.message_ttl;
        tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let _ = ui_events.send(UiEvent::ClearMessage { generation }).await;
        });
    }
}
