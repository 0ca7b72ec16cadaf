use crate::format::{LEADERBOARD_HEADERS, SCORE_HEADERS, format_total_score, score_cells};
use crate::state::app_settings::ScoreFormat;
use crate::state::details::DetailController;
use anyhow::anyhow;
use beatboard_api::{LeaderboardEntry, PlayerScoreHistory};
use once_cell::sync::Lazy;
use serde::Serialize;
use tera::Tera;

const PAGE: &str = "leaderboard.html";

static TEMPLATES: Lazy<Result<Tera, String>> =
    Lazy::new(|| collect_templates().map_err(|e| format!("{e:?}")));

fn collect_templates() -> tera::Result<Tera> {
    let mut tera = Tera::default();
    tera.add_raw_template(PAGE, include_str!("res/leaderboard.html"))?;
    Ok(tera)
}

#[derive(Debug, Serialize)]
struct PageContext<'a> {
    headers: &'a [&'a str],
    score_headers: &'a [&'a str],
    rows: Vec<RowContext>,
}

#[derive(Debug, Serialize)]
struct RowContext {
    rank: u32,
    user_id: String,
    name: String,
    avatar_url: String,
    total_score: String,
    play_count: u32,
    expanded: bool,
    loaded: bool,
    history: Option<HistoryContext>,
}

#[derive(Debug, Serialize)]
struct HistoryContext {
    name: String,
    avatar_url: String,
    scores: Vec<ScoreContext>,
}

#[derive(Debug, Serialize)]
struct ScoreContext {
    cover_url: String,
    song_name: String,
    title: String,
    cells: [String; 8],
}

/// Render the leaderboard page: a summary row and a detail row per player,
/// in the order given. Detail rows are hidden unless expanded.
pub fn render_page(
    entries: &[LeaderboardEntry],
    details: &DetailController,
    format: ScoreFormat,
) -> anyhow::Result<String> {
    let tera = TEMPLATES
        .as_ref()
        .map_err(|e| anyhow!("failed to load templates: {e}"))?;

    let context = PageContext {
        headers: &LEADERBOARD_HEADERS,
        score_headers: &SCORE_HEADERS,
        rows: entries.iter().map(|e| row_context(e, details, format)).collect(),
    };
    log::debug!("rendering page with {} rows", context.rows.len());

    let context = tera::Context::from_serialize(&context)?;
    Ok(tera.render(PAGE, &context)?)
}

fn row_context(entry: &LeaderboardEntry, details: &DetailController, format: ScoreFormat) -> RowContext {
    let row = details.row(&entry.user_id);
    let state = row.map(|r| r.state).unwrap_or_default();

    RowContext {
        rank: entry.rank,
        user_id: entry.user_id.clone(),
        name: entry.name.clone(),
        avatar_url: entry.avatar_url.clone(),
        total_score: format_total_score(entry.total_score, format),
        play_count: entry.play_count,
        expanded: state.is_expanded(),
        loaded: state.is_loaded(),
        history: row.and_then(|r| r.history.as_ref()).map(history_context),
    }
}

fn history_context(history: &PlayerScoreHistory) -> HistoryContext {
    HistoryContext {
        name: history.name.clone(),
        avatar_url: history.avatar_url.clone(),
        scores: history
            .high_scores
            .iter()
            .map(|s| ScoreContext {
                cover_url: s.song.cover_url.clone(),
                song_name: s.song.name.clone(),
                title: s.song.title(),
                cells: score_cells(s),
            })
            .collect(),
    }
}
