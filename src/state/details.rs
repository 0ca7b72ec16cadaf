use beatboard_api::client::ApiError;
use beatboard_api::{LeaderboardEntry, PlayerScoreHistory};
use std::collections::HashMap;

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Collapsed,
    Expanded,
}

/// Once Loaded, only a successful force-fetch puts a row back to NotLoaded.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum LoadStatus {
    #[default]
    NotLoaded,
    Loaded,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DetailRowState {
    pub visibility: Visibility,
    pub load: LoadStatus,
}

impl DetailRowState {
    pub fn is_expanded(&self) -> bool {
        self.visibility == Visibility::Expanded
    }

    pub fn is_loaded(&self) -> bool {
        self.load == LoadStatus::Loaded
    }
}

/// Work the caller has to carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchScores { user_id: String },
    ForceFetch { user_id: String },
    ShowMessage(String),
}

#[derive(Debug, Clone)]
pub enum DetailEvent {
    Click,
    ScoresLoaded,
    ScoresFailed(String),
    RefreshRequested,
    RefreshSucceeded { message: String },
    RefreshFailed(String),
}

/// Pure transition function for one player's detail row.
pub fn transition(
    state: DetailRowState,
    user_id: &str,
    event: DetailEvent,
) -> (DetailRowState, Vec<Effect>) {
    match event {
        DetailEvent::Click => match (state.visibility, state.load) {
            (Visibility::Expanded, _) => (
                DetailRowState { visibility: Visibility::Collapsed, ..state },
                vec![],
            ),
            (Visibility::Collapsed, LoadStatus::Loaded) => (
                DetailRowState { visibility: Visibility::Expanded, ..state },
                vec![],
            ),
            (Visibility::Collapsed, LoadStatus::NotLoaded) => (
                DetailRowState { visibility: Visibility::Expanded, ..state },
                vec![Effect::FetchScores { user_id: user_id.to_string() }],
            ),
        },
        DetailEvent::ScoresLoaded => (DetailRowState { load: LoadStatus::Loaded, ..state }, vec![]),
        DetailEvent::ScoresFailed(reason) => (
            state,
            vec![Effect::ShowMessage(format!("Error fetching player scores: {reason}"))],
        ),
        DetailEvent::RefreshRequested => {
            (state, vec![Effect::ForceFetch { user_id: user_id.to_string() }])
        }
        DetailEvent::RefreshSucceeded { message } => (
            DetailRowState { load: LoadStatus::NotLoaded, ..state },
            vec![
                Effect::ShowMessage(message),
                Effect::FetchScores { user_id: user_id.to_string() },
            ],
        ),
        DetailEvent::RefreshFailed(reason) => {
            (state, vec![Effect::ShowMessage(format!("Error: {reason}"))])
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct DetailRow {
    pub state: DetailRowState,
    /// Kept across a force-fetch until the replacement arrives.
    pub history: Option<PlayerScoreHistory>,
}

/// Per-player detail rows, keyed by user id. No data is shared between rows.
#[derive(Debug, Default)]
pub struct DetailController {
    rows: HashMap<String, DetailRow>,
}

impl DetailController {
    /// Start over with one collapsed, not-loaded row per entry.
    pub fn reset(&mut self, entries: &[LeaderboardEntry]) {
        self.rows = entries
            .iter()
            .map(|e| (e.user_id.clone(), DetailRow::default()))
            .collect();
    }

    pub fn row(&self, user_id: &str) -> Option<&DetailRow> {
        self.rows.get(user_id)
    }

    pub fn state(&self, user_id: &str) -> Option<DetailRowState> {
        self.rows.get(user_id).map(|r| r.state)
    }

    pub fn toggle(&mut self, user_id: &str) -> Vec<Effect> {
        self.apply(user_id, DetailEvent::Click)
    }

    /// Refresh is only reachable from an expanded row's header.
    pub fn request_refresh(&mut self, user_id: &str) -> Vec<Effect> {
        // The refresh control only exists once a history has been shown.
        match self.rows.get(user_id) {
            Some(row) if row.state.is_expanded() && row.history.is_some() => {
                self.apply(user_id, DetailEvent::RefreshRequested)
            }
            _ => vec![],
        }
    }

    pub fn on_scores_loaded(&mut self, history: PlayerScoreHistory) -> Vec<Effect> {
        let user_id = history.user_id.clone();
        let effects = self.apply(&user_id, DetailEvent::ScoresLoaded);
        if let Some(row) = self.rows.get_mut(&user_id) {
            row.history = Some(history);
        }
        effects
    }

    /// `requested_for` is the id the request was issued with; the backend may
    /// echo it back in a different form, so the row is looked up by the former.
    pub fn on_scores_loaded_for(
        &mut self,
        requested_for: &str,
        mut history: PlayerScoreHistory,
    ) -> Vec<Effect> {
        history.user_id = requested_for.to_string();
        self.on_scores_loaded(history)
    }

    pub fn on_scores_failed(&mut self, user_id: &str, error: &ApiError) -> Vec<Effect> {
        self.apply(user_id, DetailEvent::ScoresFailed(error.to_string()))
    }

    pub fn on_refresh_succeeded(&mut self, user_id: &str, message: String) -> Vec<Effect> {
        self.apply(user_id, DetailEvent::RefreshSucceeded { message })
    }

    pub fn on_refresh_failed(&mut self, user_id: &str, error: &ApiError) -> Vec<Effect> {
        self.apply(user_id, DetailEvent::RefreshFailed(error.to_string()))
    }

    /// Events for players that are no longer on the board are dropped.
    fn apply(&mut self, user_id: &str, event: DetailEvent) -> Vec<Effect> {
        let Some(row) = self.rows.get_mut(user_id) else {
            log::debug!("dropping {event:?} for unknown player {user_id}");
            return vec![];
        };
        let (next, effects) = transition(row.state, user_id, event);
        row.state = next;
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(user_id: &str) -> LeaderboardEntry {
        LeaderboardEntry { user_id: user_id.into(), ..Default::default() }
    }

    fn history(user_id: &str) -> PlayerScoreHistory {
        PlayerScoreHistory { user_id: user_id.into(), ..Default::default() }
    }

    fn fetches(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::FetchScores { .. }))
            .count()
    }

    fn controller(ids: &[&str]) -> DetailController {
        let mut c = DetailController::default();
        let entries: Vec<_> = ids.iter().map(|id| entry(id)).collect();
        c.reset(&entries);
        c
    }

    #[test]
    fn test_click_collapsed_not_loaded_expands_and_fetches() {
        let (next, effects) = transition(DetailRowState::default(), "a", DetailEvent::Click);
        assert_eq!(next.visibility, Visibility::Expanded);
        assert_eq!(next.load, LoadStatus::NotLoaded);
        assert_eq!(effects, vec![Effect::FetchScores { user_id: "a".into() }]);
    }

    #[test]
    fn test_click_collapsed_loaded_expands_without_fetch() {
        let state = DetailRowState { visibility: Visibility::Collapsed, load: LoadStatus::Loaded };
        let (next, effects) = transition(state, "a", DetailEvent::Click);
        assert!(next.is_expanded());
        assert!(next.is_loaded());
        assert!(effects.is_empty());
    }

    #[test]
    fn test_click_expanded_collapses_and_keeps_load() {
        for load in [LoadStatus::NotLoaded, LoadStatus::Loaded] {
            let state = DetailRowState { visibility: Visibility::Expanded, load };
            let (next, effects) = transition(state, "a", DetailEvent::Click);
            assert_eq!(next, DetailRowState { visibility: Visibility::Collapsed, load });
            assert!(effects.is_empty());
        }
    }

    #[test]
    fn test_first_click_fetches_once_then_never_again() {
        let mut c = controller(&["a"]);
        assert_eq!(fetches(&c.toggle("a")), 1);
        c.on_scores_loaded(history("a"));
        assert_eq!(fetches(&c.toggle("a")), 0); // collapse
        assert_eq!(fetches(&c.toggle("a")), 0); // expand again, cached
        assert!(c.row("a").unwrap().history.is_some());
    }

    #[test]
    fn test_not_found_keeps_row_not_loaded() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        let effects = c.on_scores_failed("a", &ApiError::PlayerNotFound);
        assert_eq!(
            effects,
            vec![Effect::ShowMessage("Error fetching player scores: Player not found".into())]
        );
        assert_eq!(c.state("a").unwrap().load, LoadStatus::NotLoaded);

        // collapsing and expanding again retries
        c.toggle("a");
        assert_eq!(fetches(&c.toggle("a")), 1);
    }

    #[test]
    fn test_refresh_success_resets_and_refetches_once() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        c.on_scores_loaded(history("a"));

        assert_eq!(c.request_refresh("a"), vec![Effect::ForceFetch { user_id: "a".into() }]);
        let effects = c.on_refresh_succeeded("a", "Refreshed".into());
        assert_eq!(
            effects,
            vec![
                Effect::ShowMessage("Refreshed".into()),
                Effect::FetchScores { user_id: "a".into() },
            ]
        );
        let state = c.state("a").unwrap();
        assert_eq!(state.load, LoadStatus::NotLoaded);
        assert!(state.is_expanded());
        // stale history stays until the new one lands
        assert!(c.row("a").unwrap().history.is_some());

        c.on_scores_loaded(history("a"));
        assert!(c.state("a").unwrap().is_loaded());
    }

    #[test]
    fn test_refresh_500_keeps_loaded() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        c.on_scores_loaded(history("a"));
        let effects = c.on_refresh_failed("a", &ApiError::RefetchFailed);
        assert_eq!(effects, vec![Effect::ShowMessage("Error: Re-fetch failed".into())]);
        assert!(c.state("a").unwrap().is_loaded());
    }

    #[test]
    fn test_refresh_404_message() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        let effects = c.on_refresh_failed("a", &ApiError::PlayerNotFound);
        assert_eq!(effects, vec![Effect::ShowMessage("Error: Player not found".into())]);
    }

    #[test]
    fn test_refresh_requires_expanded_row() {
        let mut c = controller(&["a"]);
        assert!(c.request_refresh("a").is_empty());
    }

    #[test]
    fn test_refresh_requires_loaded_history() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        assert!(c.request_refresh("a").is_empty());

        c.on_scores_failed("a", &ApiError::PlayerNotFound);
        assert!(c.state("a").unwrap().is_expanded());
        assert!(c.request_refresh("a").is_empty());
    }

    #[test]
    fn test_out_of_order_responses_touch_only_their_row() {
        let mut c = controller(&["a", "b"]);
        c.toggle("a");
        c.toggle("b");
        c.on_scores_loaded(history("b"));
        assert!(c.state("b").unwrap().is_loaded());
        assert!(!c.state("a").unwrap().is_loaded());
        c.on_scores_loaded(history("a"));
        assert!(c.state("a").unwrap().is_loaded());
    }

    #[test]
    fn test_load_after_collapse_still_caches() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        c.toggle("a");
        c.on_scores_loaded(history("a"));
        let state = c.state("a").unwrap();
        assert!(!state.is_expanded());
        assert!(state.is_loaded());
    }

    #[test]
    fn test_reexpand_while_pending_fetches_again() {
        let mut c = controller(&["a"]);
        assert_eq!(fetches(&c.toggle("a")), 1);
        c.toggle("a");
        assert_eq!(fetches(&c.toggle("a")), 1);
    }

    #[test]
    fn test_unknown_player_is_ignored() {
        let mut c = controller(&["a"]);
        assert!(c.toggle("zzz").is_empty());
        assert!(c.on_scores_loaded(history("zzz")).is_empty());
        assert!(c.row("zzz").is_none());
    }

    #[test]
    fn test_reset_discards_previous_rows() {
        let mut c = controller(&["a"]);
        c.toggle("a");
        c.reset(&[entry("b")]);
        assert!(c.row("a").is_none());
        assert_eq!(c.state("b"), Some(DetailRowState::default()));
    }
}
