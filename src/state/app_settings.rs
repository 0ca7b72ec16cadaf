use crate::format::MAX_FIXED_DECIMALS;
use anyhow::{Context, anyhow, bail};
use beatboard_api::client::DEFAULT_BASE_URL;
use log::LevelFilter;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_SCORE_MULTIPLIER: f64 = 1000.0;
pub const DEFAULT_SCORE_DECIMALS: usize = 2;
pub const DEFAULT_MESSAGE_TTL: Duration = Duration::from_secs(5);
pub const DEFAULT_EXPORT_PATH: &str = "leaderboard.html";

/// How a raw total score is turned into its displayed form.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ScoreFormat {
    pub multiplier: f64,
    pub decimals: usize,
}

impl Default for ScoreFormat {
    fn default() -> Self {
        Self { multiplier: DEFAULT_SCORE_MULTIPLIER, decimals: DEFAULT_SCORE_DECIMALS }
    }
}

/// Startup configuration. Built once and handed to whatever needs it.
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub full_screen: bool,
    pub log_level: Option<LevelFilter>,
    pub base_url: String,
    pub score_format: ScoreFormat,
    /// How long a transient message stays in the message bar.
    pub message_ttl: Duration,
    /// None leaves requests unbounded.
    pub request_timeout: Option<Duration>,
    pub export_path: PathBuf,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            full_screen: false,
            log_level: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            score_format: ScoreFormat::default(),
            message_ttl: DEFAULT_MESSAGE_TTL,
            request_timeout: None,
            export_path: PathBuf::from(DEFAULT_EXPORT_PATH),
        }
    }
}

impl AppSettings {
    pub fn load() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Apply `BEATBOARD_*` overrides on top of the defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let mut settings = Self::default();

        if let Some(url) = get("BEATBOARD_BASE_URL") {
            settings.base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(raw) = get("BEATBOARD_SCORE_MULTIPLIER") {
            let multiplier: f64 = parse_var("BEATBOARD_SCORE_MULTIPLIER", &raw)?;
            if !multiplier.is_finite() {
                bail!("BEATBOARD_SCORE_MULTIPLIER must be finite, got {raw}");
            }
            settings.score_format.multiplier = multiplier;
        }
        if let Some(raw) = get("BEATBOARD_SCORE_DECIMALS") {
            let decimals: usize = parse_var("BEATBOARD_SCORE_DECIMALS", &raw)?;
            if decimals > MAX_FIXED_DECIMALS {
                bail!("BEATBOARD_SCORE_DECIMALS must be at most {MAX_FIXED_DECIMALS}, got {raw}");
            }
            settings.score_format.decimals = decimals;
        }
        if let Some(raw) = get("BEATBOARD_MESSAGE_SECS") {
            settings.message_ttl = Duration::from_secs(parse_var("BEATBOARD_MESSAGE_SECS", &raw)?);
        }
        if let Some(raw) = get("BEATBOARD_TIMEOUT_SECS") {
            let secs: u64 = parse_var("BEATBOARD_TIMEOUT_SECS", &raw)?;
            settings.request_timeout = (secs > 0).then(|| Duration::from_secs(secs));
        }
        if let Some(path) = get("BEATBOARD_EXPORT_PATH") {
            settings.export_path = PathBuf::from(path);
        }
        if let Some(raw) = get("BEATBOARD_LOG") {
            let level = raw
                .parse::<LevelFilter>()
                .map_err(|_| anyhow!("invalid value for BEATBOARD_LOG: {raw:?}"))?;
            settings.log_level = Some(level);
        }

        Ok(settings)
    }
}

fn parse_var<T>(key: &str, raw: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.parse::<T>()
        .with_context(|| format!("invalid value for {key}: {raw:?}"))
}
