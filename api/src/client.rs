use crate::wire::{
    ForceFetchResponse, LeaderboardResponse, PlayerScoresResponse, WireLeaderboardEntry,
    WireScoreEntry,
};
use crate::{LeaderboardEntry, PlayerScoreHistory, Score, ScoreEntry, SongInfo};
use reqwest::{Client, Method, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::fmt;
use std::time::Duration;

pub type ApiResult<T> = Result<T, ApiError>;

pub const DEFAULT_BASE_URL: &str = "https://vrgi-leaderboard-38b4be7542c5.herokuapp.com";

/// Client for the leaderboard backend.
#[derive(Debug, Clone)]
pub struct LeaderboardApi {
    client: Client,
    base_url: Url,
    /// None means requests may stall indefinitely.
    timeout: Option<Duration>,
}

#[derive(Debug)]
pub enum ApiError {
    Network(reqwest::Error, String),
    Parsing(reqwest::Error, String),
    /// 404 from a per-player endpoint.
    PlayerNotFound,
    /// 500 from the force-fetch endpoint.
    RefetchFailed,
    Status(StatusCode, String),
    Url(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Network(e, url) => write!(f, "Network error for {url}: {e}"),
            ApiError::Parsing(e, url) => write!(f, "Parse error for {url}: {e}"),
            ApiError::PlayerNotFound => write!(f, "Player not found"),
            ApiError::RefetchFailed => write!(f, "Re-fetch failed"),
            ApiError::Status(status, url) => write!(f, "Request to {url} failed with {status}"),
            ApiError::Url(msg) => write!(f, "Invalid base URL: {msg}"),
        }
    }
}

impl std::error::Error for ApiError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ApiError::Network(e, _) | ApiError::Parsing(e, _) => Some(e),
            _ => None,
        }
    }
}

impl LeaderboardApi {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> ApiResult<Self> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| ApiError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::Url(base_url.to_string()));
        }

        let client = Client::builder()
            .user_agent(concat!("beatboard/", env!("CARGO_PKG_VERSION")))
            .build()
            .unwrap_or_default();

        Ok(Self { client, base_url, timeout })
    }

    /// Fetch the full ranked list, in the order the server sent it.
    pub async fn fetch_leaderboard(&self) -> ApiResult<Vec<LeaderboardEntry>> {
        let url = self.endpoint(&["leaderboard"])?;
        let raw: LeaderboardResponse = self.send(Method::GET, url, |_| None).await?;
        Ok(raw.leaderboard.into_iter().map(map_entry).collect())
    }

    /// Fetch one player's score history. 404 means the backend doesn't know the player.
    pub async fn fetch_player_scores(&self, user_id: &str) -> ApiResult<PlayerScoreHistory> {
        let url = self.endpoint(&["player", user_id, "scores"])?;
        let raw: PlayerScoresResponse = self
            .send(Method::GET, url, |status| {
                (status == StatusCode::NOT_FOUND).then_some(ApiError::PlayerNotFound)
            })
            .await?;
        Ok(map_history(raw))
    }

    /// Ask the backend to pull fresh data for one player from its upstream source.
    /// Returns the server's confirmation message.
    pub async fn force_fetch_player(&self, user_id: &str) -> ApiResult<String> {
        let url = self.endpoint(&["player", user_id, "force-fetch"])?;
        let raw: ForceFetchResponse = self
            .send(Method::POST, url, |status| match status {
                StatusCode::NOT_FOUND => Some(ApiError::PlayerNotFound),
                StatusCode::INTERNAL_SERVER_ERROR => Some(ApiError::RefetchFailed),
                _ => None,
            })
            .await?;
        Ok(raw.message)
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> ApiResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn send<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        classify: impl Fn(StatusCode) -> Option<ApiError>,
    ) -> ApiResult<T> {
        let mut request = self.client.request(method, url.clone());
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e, url.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify(status).unwrap_or_else(|| ApiError::Status(status, url.to_string())));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parsing(e, url.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Mapping: wire types → clean domain types
// ---------------------------------------------------------------------------

fn map_entry(raw: WireLeaderboardEntry) -> LeaderboardEntry {
    LeaderboardEntry {
        rank: raw.rank,
        user_id: raw.user_id,
        name: raw.name,
        avatar_url: raw.avatar_url,
        total_score: raw.total_score,
        play_count: raw.play_count,
    }
}

fn map_history(raw: PlayerScoresResponse) -> PlayerScoreHistory {
    PlayerScoreHistory {
        user_id: raw.user_id,
        name: raw.name,
        avatar_url: raw.avatar_url,
        high_scores: raw.high_scores.into_iter().map(map_score_entry).collect(),
    }
}

fn map_score_entry(raw: WireScoreEntry) -> ScoreEntry {
    ScoreEntry {
        song: SongInfo {
            name: raw.leaderboard.name,
            diff_name: raw.leaderboard.diff_name,
            cover_url: raw.leaderboard.cover_url,
        },
        score: raw.score.map(|s| Score {
            accuracy: s.accuracy,
            timeset: s.timeset,
            bad_cuts: s.bad_cuts,
            missed_notes: s.missed_notes,
            bomb_cuts: s.bomb_cuts,
            walls_hit: s.walls_hit,
            pauses: s.pauses,
            full_combo: s.full_combo,
        }),
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    const LEADERBOARD_JSON: &str = r#"{
        "leaderboard": [
            {"rank": 2, "userId": "b", "name": "Bravo", "avatarUrl": "https://a/b.png", "totalScore": 0.5, "playCount": 4},
            {"rank": 1, "userId": "a", "name": "Alpha", "avatarUrl": "https://a/a.png", "totalScore": 1.2345, "playCount": 9}
        ]
    }"#;

    const SCORES_JSON: &str = r#"{
        "userId": "a",
        "name": "Alpha",
        "avatarUrl": "https://a/a.png",
        "highScores": [
            {
                "leaderboard": {"name": "Ghost", "diffName": "Expert", "coverUrl": "https://c/1.png"},
                "score": {"accuracy": 0.9567, "timeset": 1700000000, "badCuts": 1, "missedNotes": 2,
                          "bombCuts": 0, "wallsHit": 3, "pauses": 1, "fullCombo": false}
            },
            {
                "leaderboard": {"name": "Lights", "diffName": "Hard", "coverUrl": "https://c/2.png"}
            }
        ]
    }"#;

    fn api(server: &Server) -> LeaderboardApi {
        LeaderboardApi::new(&server.url(), None).unwrap()
    }

    #[tokio::test]
    async fn test_leaderboard_keeps_server_order() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/leaderboard")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(LEADERBOARD_JSON)
            .create_async()
            .await;

        let entries = api(&server).fetch_leaderboard().await.unwrap();

        mock.assert_async().await;
        let ranks: Vec<u32> = entries.iter().map(|e| e.rank).collect();
        assert_eq!(ranks, vec![2, 1]);
        assert_eq!(entries[1].user_id, "a");
        assert_eq!(entries[1].total_score, 1.2345);
        assert_eq!(entries[1].play_count, 9);
    }

    #[tokio::test]
    async fn test_leaderboard_malformed_body_is_parse_error() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/leaderboard")
            .with_status(200)
            .with_body("<html>oops</html>")
            .create_async()
            .await;

        let err = api(&server).fetch_leaderboard().await.unwrap_err();
        assert!(matches!(err, ApiError::Parsing(..)), "got {err}");
    }

    #[tokio::test]
    async fn test_leaderboard_server_error_is_status() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/leaderboard")
            .with_status(503)
            .create_async()
            .await;

        let err = api(&server).fetch_leaderboard().await.unwrap_err();
        assert!(matches!(err, ApiError::Status(StatusCode::SERVICE_UNAVAILABLE, _)));
    }

    #[tokio::test]
    async fn test_player_scores_maps_present_and_absent_scores() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/player/a/scores")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SCORES_JSON)
            .create_async()
            .await;

        let history = api(&server).fetch_player_scores("a").await.unwrap();
        assert_eq!(history.name, "Alpha");
        assert_eq!(history.high_scores.len(), 2);

        let first = history.high_scores[0].score.as_ref().unwrap();
        assert_eq!(first.accuracy, 0.9567);
        assert_eq!(first.walls_hit, 3);
        assert!(!first.full_combo);
        assert_eq!(history.high_scores[1].song.diff_name, "Hard");
        assert!(history.high_scores[1].score.is_none());
    }

    #[tokio::test]
    async fn test_player_scores_404_is_player_not_found() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/player/ghost/scores")
            .with_status(404)
            .with_body(r#"{"error":"nope"}"#)
            .create_async()
            .await;

        let err = api(&server).fetch_player_scores("ghost").await.unwrap_err();
        assert!(matches!(err, ApiError::PlayerNotFound));
        assert_eq!(err.to_string(), "Player not found");
    }

    #[tokio::test]
    async fn test_player_scores_other_status_is_generic() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/player/a/scores")
            .with_status(500)
            .create_async()
            .await;

        let err = api(&server).fetch_player_scores("a").await.unwrap_err();
        assert!(matches!(err, ApiError::Status(StatusCode::INTERNAL_SERVER_ERROR, _)));
    }

    #[tokio::test]
    async fn test_force_fetch_returns_message() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/player/a/force-fetch")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"Player data refreshed"}"#)
            .create_async()
            .await;

        let message = api(&server).force_fetch_player("a").await.unwrap();
        mock.assert_async().await;
        assert_eq!(message, "Player data refreshed");
    }

    #[tokio::test]
    async fn test_force_fetch_status_mapping() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/player/missing/force-fetch")
            .with_status(404)
            .create_async()
            .await;
        server
            .mock("POST", "/player/broken/force-fetch")
            .with_status(500)
            .create_async()
            .await;
        server
            .mock("POST", "/player/teapot/force-fetch")
            .with_status(418)
            .create_async()
            .await;

        let api = api(&server);
        assert!(matches!(
            api.force_fetch_player("missing").await,
            Err(ApiError::PlayerNotFound)
        ));
        let err = api.force_fetch_player("broken").await.unwrap_err();
        assert_eq!(err.to_string(), "Re-fetch failed");
        assert!(matches!(
            api.force_fetch_player("teapot").await,
            Err(ApiError::Status(StatusCode::IM_A_TEAPOT, _))
        ));
    }

    #[test]
    fn test_endpoint_encodes_user_id_segment() {
        let api = LeaderboardApi::new("http://localhost:8080/", None).unwrap();
        let url = api.endpoint(&["player", "a b/c", "scores"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/player/a%20b%2Fc/scores");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let api = LeaderboardApi::new("http://localhost:8080/api", None).unwrap();
        let url = api.endpoint(&["leaderboard"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8080/api/leaderboard");
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        assert!(matches!(
            LeaderboardApi::new("not a url", None),
            Err(ApiError::Url(_))
        ));
    }
}
