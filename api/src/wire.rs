/// Leaderboard backend raw wire types — serde shapes for deserializing responses.
/// These map to the clean domain types in client.rs.
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// GET /leaderboard
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<WireLeaderboardEntry>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireLeaderboardEntry {
    pub rank: u32,
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    pub total_score: f64,
    #[serde(default)]
    pub play_count: u32,
}

// ---------------------------------------------------------------------------
// GET /player/{userId}/scores
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScoresResponse {
    #[serde(deserialize_with = "string_or_number")]
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: String,
    pub high_scores: Vec<WireScoreEntry>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WireScoreEntry {
    pub leaderboard: WireSong,
    /// Missing or null when the player has not played the song.
    #[serde(default)]
    pub score: Option<WireScore>,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireSong {
    pub name: String,
    #[serde(default)]
    pub diff_name: String,
    #[serde(default)]
    pub cover_url: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WireScore {
    pub accuracy: f64,
    #[serde(deserialize_with = "int_or_numeric_string")]
    pub timeset: i64,
    #[serde(default)]
    pub bad_cuts: u32,
    #[serde(default)]
    pub missed_notes: u32,
    #[serde(default)]
    pub bomb_cuts: u32,
    #[serde(default)]
    pub walls_hit: u32,
    #[serde(default)]
    pub pauses: u32,
    #[serde(default)]
    pub full_combo: bool,
}

// ---------------------------------------------------------------------------
// POST /player/{userId}/force-fetch
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
pub struct ForceFetchResponse {
    pub message: String,
}

/// Player ids are opaque; the backend emits them as strings, but numeric
/// platform ids (e.g. Steam ids) are accepted as well.
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

/// Unix seconds, sent either as a JSON number or as its decimal text.
fn int_or_numeric_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Seconds {
        Int(i64),
        Float(f64),
        Text(String),
    }

    match Seconds::deserialize(deserializer)? {
        Seconds::Int(n) => Ok(n),
        Seconds::Float(f) => Ok(f.trunc() as i64),
        Seconds::Text(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .or_else(|_| s.parse::<f64>().map(|f| f.trunc() as i64))
                .map_err(|_| serde::de::Error::custom(format!("invalid timeset: {s:?}")))
        }
    }
}
