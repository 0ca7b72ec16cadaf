mod app;
mod draw;
mod format;
mod html;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::details::DetailController;
use crate::state::effects::EffectRunner;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use anyhow::Context;
use beatboard_api::client::LeaderboardApi;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::LevelFilter;
use std::io::{Stdout, Write};
use std::path::PathBuf;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tui::{Terminal, backend::CrosstermBackend};

#[derive(Debug, PartialEq)]
enum CliAction {
    Interactive,
    /// Write the static page to the path, or stdout when None.
    Html(Option<PathBuf>),
    Help,
    Version,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let action = match parse_cli_args(std::env::args().skip(1)) {
        Ok(action) => action,
        Err(message) => {
            eprintln!("{message}\n\n{}", usage_text());
            std::process::exit(2);
        }
    };

    match action {
        CliAction::Help => {
            println!("{}", usage_text());
            Ok(())
        }
        CliAction::Version => {
            println!("beatboard {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        CliAction::Html(path) => run_html_export(AppSettings::load()?, path).await,
        CliAction::Interactive => run_interactive(AppSettings::load()?).await,
    }
}

fn parse_cli_args(mut args: impl Iterator<Item = String>) -> Result<CliAction, String> {
    let Some(arg) = args.next() else {
        return Ok(CliAction::Interactive);
    };

    let action = match arg.as_str() {
        "-h" | "--help" => CliAction::Help,
        "-V" | "--version" => CliAction::Version,
        "--html" => CliAction::Html(args.next().map(PathBuf::from)),
        _ => return Err(format!("Unknown argument: {arg}")),
    };

    match args.next() {
        Some(extra) => Err(format!("Unexpected argument: {extra}")),
        None => Ok(action),
    }
}

fn usage_text() -> &'static str {
    "beatboard - leaderboard terminal UI

Usage:
  beatboard
  beatboard --html [PATH]
  beatboard --help
  beatboard --version

Environment:
  BEATBOARD_BASE_URL          Leaderboard backend base URL
  BEATBOARD_SCORE_MULTIPLIER  Display multiplier for total scores (default 1000)
  BEATBOARD_SCORE_DECIMALS    Decimal places for total scores (default 2)
  BEATBOARD_MESSAGE_SECS      Seconds a status message stays visible (default 5)
  BEATBOARD_TIMEOUT_SECS      Request timeout in seconds (default none)
  BEATBOARD_EXPORT_PATH       Where the `e` key writes the HTML page (default leaderboard.html)
  BEATBOARD_LOG               Log level: error, warn, info, debug, trace"
}

/// Fetch the leaderboard once and write the page with every detail row collapsed.
async fn run_html_export(settings: AppSettings, path: Option<PathBuf>) -> anyhow::Result<()> {
    env_logger::Builder::new()
        .filter_level(settings.log_level.unwrap_or(LevelFilter::Error))
        .init();

    let client = LeaderboardApi::new(&settings.base_url, settings.request_timeout)?;
    let entries = client
        .fetch_leaderboard()
        .await
        .context("failed to fetch leaderboard")?;
    log::info!("fetched {} leaderboard entries", entries.len());

    let mut details = DetailController::default();
    details.reset(&entries);
    let page = html::render_page(&entries, &details, settings.score_format)?;

    match path {
        Some(path) => std::fs::write(&path, page)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => io::stdout().write_all(page.as_bytes())?,
    }
    Ok(())
}

async fn run_interactive(settings: AppSettings) -> anyhow::Result<()> {
    better_panic::install();

    let client = LeaderboardApi::new(&settings.base_url, settings.request_timeout)?;
    let message_ttl = settings.message_ttl;

    tui_logger::init_logger(LevelFilter::Error)?;
    tui_logger::set_default_level(LevelFilter::Error);

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal()?;

    let app = Arc::new(Mutex::new(App::new(settings)));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    let effects = EffectRunner::new(network_req_tx, ui_event_tx.clone(), message_ttl);

    // Trigger leaderboard load on startup
    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_resp_rx, effects).await;

    input_handler.abort();
    network_task.abort();
    cleanup_terminal();

    Ok(())
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
    effects: EffectRunner,
) {
    let mut loading = LoadingState::default();

    loop {
        let should_redraw = tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                handle_ui_event(ui_event, &app, &effects).await
            }
            Some(response) = network_responses.recv() => {
                handle_network_response(response, &app, &effects, &mut loading).await
            }
            else => break,
        };

        if should_redraw {
            let mut app_guard = app.lock().await;
            draw::draw(&mut terminal, &mut app_guard, loading);
        }
    }
}

async fn handle_ui_event(ui_event: UiEvent, app: &Arc<Mutex<App>>, effects: &EffectRunner) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            effects.load_leaderboard().await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, effects).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::ClearMessage { generation } => app.lock().await.state.message.clear(generation),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    effects: &EffectRunner,
    loading: &mut LoadingState,
) -> bool {
    if let NetworkResponse::LoadingStateChanged { loading_state } = response {
        *loading = loading_state;
        return true;
    }

    let mut guard = app.lock().await;
    let pending = guard.on_network_response(response);
    effects.run(&mut guard, pending).await;
    true
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        let event = match tokio::task::spawn_blocking(crossterm_event::read).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => {
                log::error!("failed to read terminal event: {e}");
                continue;
            }
            Err(_) => break,
        };

        let ui_event = match event {
            Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
            Event::Resize(_, _) => Some(UiEvent::Resize),
            _ => None,
        };

        if let Some(ui_event) = ui_event
            && ui_events.send(ui_event).await.is_err()
        {
            break;
        }
    }
}

fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();
    execute!(stdout, cursor::Hide)?;
    execute!(stdout, terminal::EnterAlternateScreen)?;
    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
    terminal::enable_raw_mode()
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliAction, String> {
        parse_cli_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_no_args_is_interactive() {
        assert_eq!(parse(&[]), Ok(CliAction::Interactive));
    }

    #[test]
    fn test_html_with_and_without_path() {
        assert_eq!(parse(&["--html"]), Ok(CliAction::Html(None)));
        assert_eq!(
            parse(&["--html", "out.html"]),
            Ok(CliAction::Html(Some(PathBuf::from("out.html"))))
        );
    }

    #[test]
    fn test_unknown_and_extra_args_are_rejected() {
        assert!(parse(&["--bogus"]).is_err());
        assert!(parse(&["--help", "extra"]).is_err());
        assert_eq!(parse(&["-V"]), Ok(CliAction::Version));
    }
}
