use crate::app::App;
use crate::state::effects::EffectRunner;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::Mutex;

pub async fn handle_key_bindings(key_event: KeyEvent, app: &Arc<Mutex<App>>, effects: &EffectRunner) {
    let mut guard = app.lock().await;

    let pending = match (key_event.code, key_event.modifiers) {
        // Quit
        (Char('q'), _) | (Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Navigation
        (Char('j') | KeyCode::Down, _) => {
            guard.state.leaderboard.select_next();
            vec![]
        }
        (Char('k') | KeyCode::Up, _) => {
            guard.state.leaderboard.select_prev();
            vec![]
        }
        (Char('g') | KeyCode::Home, _) => {
            guard.state.leaderboard.select_first();
            vec![]
        }
        (Char('G') | KeyCode::End, _) => {
            guard.state.leaderboard.select_last();
            vec![]
        }

        // Player details
        (KeyCode::Enter | Char(' '), _) => guard.toggle_selected_details(),
        (Char('r'), _) => guard.refresh_selected_player(),

        // Global
        (Char('e'), _) => guard.export_html(),
        (Char('f'), _) => {
            guard.toggle_full_screen();
            vec![]
        }
        (Char('"'), _) => {
            guard.toggle_show_logs();
            vec![]
        }

        _ => vec![],
    };

    effects.run(&mut guard, pending).await;
}
