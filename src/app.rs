use crate::html;
use crate::state::app_settings::AppSettings;
use crate::state::app_state::AppState;
use crate::state::details::Effect;
use crate::state::messages::NetworkResponse;
use beatboard_api::LeaderboardEntry;
use beatboard_api::client::ApiError;
use log::error;
use std::path::Path;

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new(settings: AppSettings) -> Self {
        let app = Self { state: AppState::new(), settings };

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    // -----------------------------------------------------------------------
    // Network response handlers — called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_network_response(&mut self, response: NetworkResponse) -> Vec<Effect> {
        match response {
            NetworkResponse::LoadingStateChanged { .. } => vec![],
            NetworkResponse::LeaderboardLoaded { entries } => {
                self.on_leaderboard_loaded(entries);
                vec![]
            }
            NetworkResponse::LeaderboardFailed { error } => {
                self.on_leaderboard_failed(&error);
                vec![]
            }
            NetworkResponse::PlayerScoresLoaded { user_id, history } => {
                self.state.details.on_scores_loaded_for(&user_id, history)
            }
            NetworkResponse::PlayerScoresFailed { user_id, error } => {
                error!("Error fetching player scores for {user_id}: {error}");
                self.state.details.on_scores_failed(&user_id, &error)
            }
            NetworkResponse::ForceFetchCompleted { user_id, message } => {
                self.state.details.on_refresh_succeeded(&user_id, message)
            }
            NetworkResponse::ForceFetchFailed { user_id, error } => {
                error!("Error force fetching player {user_id}: {error}");
                self.state.details.on_refresh_failed(&user_id, &error)
            }
        }
    }

    pub fn on_leaderboard_loaded(&mut self, entries: Vec<LeaderboardEntry>) {
        self.state.details.reset(&entries);
        self.state.leaderboard.load(entries);
    }

    /// Only logged; nothing goes to the message bar.
    pub fn on_leaderboard_failed(&mut self, error: &ApiError) {
        error!("Error fetching leaderboard: {error}");
        self.state.leaderboard.load_error = Some(error.to_string());
    }

    // -----------------------------------------------------------------------
    // User actions
    // -----------------------------------------------------------------------

    pub fn toggle_selected_details(&mut self) -> Vec<Effect> {
        let Some(user_id) = self.selected_user_id() else {
            return vec![];
        };
        self.state.details.toggle(&user_id)
    }

    pub fn refresh_selected_player(&mut self) -> Vec<Effect> {
        let Some(user_id) = self.selected_user_id() else {
            return vec![];
        };
        self.state.details.request_refresh(&user_id)
    }

    /// Write the current view to the configured export path.
    pub fn export_html(&self) -> Vec<Effect> {
        let path = self.settings.export_path.clone();
        match self.write_html(&path) {
            Ok(()) => vec![Effect::ShowMessage(format!("Exported to {}", path.display()))],
            Err(e) => {
                error!("HTML export failed: {e:#}");
                vec![Effect::ShowMessage(format!("Error: export failed: {e}"))]
            }
        }
    }

    fn write_html(&self, path: &Path) -> anyhow::Result<()> {
        let page = html::render_page(
            self.state.leaderboard.entries(),
            &self.state.details,
            self.settings.score_format,
        )?;
        std::fs::write(path, page)?;
        Ok(())
    }

    pub fn selected_user_id(&self) -> Option<String> {
        self.state
            .leaderboard
            .selected_entry()
            .map(|e| e.user_id.clone())
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::details::LoadStatus;
    use beatboard_api::PlayerScoreHistory;

    fn app_with_board() -> App {
        let mut app = App { settings: AppSettings::default(), state: AppState::new() };
        app.on_network_response(NetworkResponse::LeaderboardLoaded {
            entries: vec![
                LeaderboardEntry { rank: 1, user_id: "a".into(), ..Default::default() },
                LeaderboardEntry { rank: 2, user_id: "b".into(), ..Default::default() },
            ],
        });
        app
    }

    #[test]
    fn test_leaderboard_failure_sets_no_message() {
        let mut app = App { settings: AppSettings::default(), state: AppState::new() };
        let effects = app.on_network_response(NetworkResponse::LeaderboardFailed {
            error: ApiError::RefetchFailed,
        });
        assert!(effects.is_empty());
        assert!(app.state.message.text().is_none());
        assert!(app.state.leaderboard.entries.is_none());
        assert!(app.state.leaderboard.load_error.is_some());
    }

    #[test]
    fn test_toggle_selected_fetches_selected_player() {
        let mut app = app_with_board();
        app.state.leaderboard.select_next();
        assert_eq!(
            app.toggle_selected_details(),
            vec![Effect::FetchScores { user_id: "b".into() }]
        );
    }

    #[test]
    fn test_scores_loaded_under_requested_id() {
        let mut app = app_with_board();
        app.toggle_selected_details();
        // backend echoes a differently formatted id
        let history = PlayerScoreHistory { user_id: "A".into(), ..Default::default() };
        app.on_network_response(NetworkResponse::PlayerScoresLoaded {
            user_id: "a".into(),
            history,
        });
        assert_eq!(app.state.details.state("a").unwrap().load, LoadStatus::Loaded);
    }

    #[test]
    fn test_force_fetch_flow_refetches_without_click() {
        let mut app = app_with_board();
        app.toggle_selected_details();
        app.on_network_response(NetworkResponse::PlayerScoresLoaded {
            user_id: "a".into(),
            history: PlayerScoreHistory { user_id: "a".into(), ..Default::default() },
        });

        assert_eq!(
            app.refresh_selected_player(),
            vec![Effect::ForceFetch { user_id: "a".into() }]
        );
        let effects = app.on_network_response(NetworkResponse::ForceFetchCompleted {
            user_id: "a".into(),
            message: "Fetched".into(),
        });
        assert_eq!(
            effects,
            vec![
                Effect::ShowMessage("Fetched".into()),
                Effect::FetchScores { user_id: "a".into() },
            ]
        );
    }

    #[test]
    fn test_player_not_found_message() {
        let mut app = app_with_board();
        app.toggle_selected_details();
        let effects = app.on_network_response(NetworkResponse::PlayerScoresFailed {
            user_id: "a".into(),
            error: ApiError::PlayerNotFound,
        });
        assert_eq!(
            effects,
            vec![Effect::ShowMessage("Error fetching player scores: Player not found".into())]
        );
    }

    #[test]
    fn test_refresh_with_empty_board_does_nothing() {
        let mut app = App { settings: AppSettings::default(), state: AppState::new() };
        assert!(app.refresh_selected_player().is_empty());
        assert!(app.toggle_selected_details().is_empty());
    }
}
