use tui::backend::Backend;
use tui::layout::{Alignment, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::App;
use crate::format::{SCORE_HEADERS, format_total_score, score_cells, truncate_name};
use crate::state::details::DetailRow;
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::ui::layout::LayoutAreas;
use beatboard_api::{LeaderboardEntry, PlayerScoreHistory};

const KEY_HINTS: &str = "j/k move  Enter details  r refresh  e export  \" logs  q quit ";

const RANK_WIDTH: usize = 6;
const NAME_WIDTH: usize = 28;
const TOTAL_WIDTH: usize = 14;
const PLAYS_WIDTH: usize = 10;

const SONG_WIDTH: usize = 34;
/// Widths for Accuracy .. Full Combo.
const SCORE_WIDTHS: [usize; 8] = [9, 20, 9, 13, 10, 10, 7, 10];
const DETAIL_INDENT: &str = "      ";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let result = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_header(f, layout.header, app);
        }
        draw_leaderboard(f, layout.main, app);
        if app.state.show_logs {
            draw_logs(f, layout.logs);
        }
        draw_message_bar(f, layout.message, app);
        draw_loading_spinner(f, f.area(), app, loading);
    });

    if let Err(e) = result {
        log::error!("draw failed: {e}");
    }
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_header(f: &mut Frame, header: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let players = app.state.leaderboard.entries().len();
    let title = Paragraph::new(format!(" Leaderboard | {players} players | {}", app.settings.base_url))
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(title, header[0]);

    let help = Paragraph::new(KEY_HINTS)
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, header[1]);
}

fn draw_leaderboard(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Rankings ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.state.leaderboard.entries.is_none() {
        let msg = match app.state.leaderboard.load_error.as_deref() {
            Some(err) => format!("Leaderboard load failed:\n{err}"),
            None => "Loading leaderboard...".to_string(),
        };
        f.render_widget(
            Paragraph::new(msg).style(Style::default().fg(Color::DarkGray)),
            inner,
        );
        return;
    }

    let (lines, selected_line) = board_lines(app);
    let offset = selected_line.saturating_sub(usize::from(inner.height) / 3);
    let offset = u16::try_from(offset).unwrap_or(u16::MAX);
    f.render_widget(Paragraph::new(lines).scroll((offset, 0)), inner);
}

/// All lines of the leaderboard view plus the index of the selected summary line.
pub fn board_lines(app: &App) -> (Vec<Line<'static>>, usize) {
    let board = &app.state.leaderboard;
    let mut lines = Vec::with_capacity(board.entries().len() + 1);
    let mut selected_line = 0;

    lines.push(Line::styled(
        format!(
            "  {:<RANK_WIDTH$}{:<NAME_WIDTH$}{:>TOTAL_WIDTH$}{:>PLAYS_WIDTH$}",
            "Rank", "Name", "Total Score", "Plays"
        ),
        Style::default().add_modifier(Modifier::BOLD),
    ));

    for (idx, entry) in board.entries().iter().enumerate() {
        let row = app.state.details.row(&entry.user_id);
        let expanded = row.is_some_and(|r| r.state.is_expanded());
        let is_selected = idx == board.selected;
        if is_selected {
            selected_line = lines.len();
        }

        lines.push(summary_line(entry, expanded, is_selected, app));

        if let Some(row) = row.filter(|_| expanded) {
            lines.extend(detail_lines(row));
        }
    }

    (lines, selected_line)
}

fn summary_line(entry: &LeaderboardEntry, expanded: bool, is_selected: bool, app: &App) -> Line<'static> {
    let marker = if is_selected { ">" } else { " " };
    let fold = if expanded { "▾" } else { "▸" };
    let total = format_total_score(entry.total_score, app.settings.score_format);
    let text = format!(
        "{marker}{fold}{:<RANK_WIDTH$}{:<NAME_WIDTH$}{:>TOTAL_WIDTH$}{:>PLAYS_WIDTH$}",
        entry.rank,
        truncate_name(&entry.name, NAME_WIDTH - 2),
        total,
        entry.play_count,
    );
    let style = if is_selected {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::styled(text, style)
}

fn detail_lines(row: &DetailRow) -> Vec<Line<'static>> {
    let Some(history) = row.history.as_ref() else {
        return vec![Line::styled(
            format!("{DETAIL_INDENT}(no scores loaded)"),
            Style::default().fg(Color::DarkGray),
        )];
    };

    let mut lines = Vec::with_capacity(history.high_scores.len() + 3);
    lines.push(history_header(history, row.state.is_loaded()));
    lines.push(Line::styled(
        score_header_text(),
        Style::default().fg(Color::Gray).add_modifier(Modifier::UNDERLINED),
    ));

    for score in &history.high_scores {
        let cells = score_cells(score);
        let mut text = format!(
            "{DETAIL_INDENT}{:<SONG_WIDTH$}",
            truncate_name(&score.song.title(), SONG_WIDTH - 1)
        );
        for (cell, width) in cells.iter().zip(SCORE_WIDTHS) {
            text.push_str(&format!("{cell:<width$}"));
        }
        let style = if score.score.is_some() {
            Style::default()
        } else {
            Style::default().fg(Color::DarkGray)
        };
        lines.push(Line::styled(text, style));
    }
    lines.push(Line::default());
    lines
}

fn history_header(history: &PlayerScoreHistory, loaded: bool) -> Line<'static> {
    let mut spans = vec![
        Span::raw(DETAIL_INDENT),
        Span::styled(history.name.clone(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(
            "  {}/{} played  ",
            history.played_count(),
            history.high_scores.len()
        )),
        Span::styled("[r] Refresh", Style::default().fg(Color::Cyan)),
    ];
    if !loaded {
        spans.push(Span::styled("  updating...", Style::default().fg(Color::DarkGray)));
    }
    Line::from(spans)
}

/// Cover is an image column; the terminal view leaves it out.
fn score_header_text() -> String {
    let mut text = format!("{DETAIL_INDENT}{:<SONG_WIDTH$}", SCORE_HEADERS[1]);
    for (header, width) in SCORE_HEADERS[2..].iter().zip(SCORE_WIDTHS) {
        text.push_str(&format!("{header:<width$}"));
    }
    text
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_message_bar(f: &mut Frame, area: Rect, app: &App) {
    let Some(text) = app.state.message.text() else {
        return;
    };
    let style = if text.starts_with("Error") {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Green)
    };
    f.render_widget(Paragraph::new(format!(" {text}")).style(style), area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(3), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}
