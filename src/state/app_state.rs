use crate::state::details::DetailController;
use crate::state::notice::MessageBar;
use beatboard_api::LeaderboardEntry;

// ---------------------------------------------------------------------------
// Leaderboard table state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct LeaderboardState {
    /// None until the first successful load.
    pub entries: Option<Vec<LeaderboardEntry>>,
    /// Set when the startup load fails; shown in place of the empty table.
    pub load_error: Option<String>,
    /// Index into `entries` of the highlighted player.
    pub selected: usize,
}

impl LeaderboardState {
    /// Replace the whole table, keeping server order.
    pub fn load(&mut self, entries: Vec<LeaderboardEntry>) {
        self.entries = Some(entries);
        self.load_error = None;
        self.selected = 0;
    }

    pub fn entries(&self) -> &[LeaderboardEntry] {
        self.entries.as_deref().unwrap_or_default()
    }

    pub fn selected_entry(&self) -> Option<&LeaderboardEntry> {
        self.entries().get(self.selected)
    }

    pub fn select_next(&mut self) {
        let len = self.entries().len();
        if len > 0 {
            self.selected = (self.selected + 1).min(len - 1);
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.entries().len().saturating_sub(1);
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct AppState {
    pub leaderboard: LeaderboardState,
    pub details: DetailController,
    pub message: MessageBar,
    pub show_logs: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }
}
