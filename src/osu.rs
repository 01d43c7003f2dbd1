//! Minimal osu! API v2 client for our use-cases.
//!
//! Authenticates with the client-credentials grant and caches the token until
//! shortly before it expires. The cache lives inside the client (cloned handles
//! share it) and is refreshed under an async mutex, so callers arriving at
//! expiry wait for a single refresh instead of each requesting a token.
//!
//! Responses are decoded into typed payloads at this boundary; anything that
//! does not match is reported as `OsuApiError::Payload`.
//!
//! NOTE: We never log the client secret or tokens.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::catalog::{Catalog, SearchQuery};
use crate::domain::{CatalogItem, GameMode, RankedStatus, ScoreSample, UserSummary};
use crate::error::OsuApiError;
use crate::util::trunc_for_log;

const DEFAULT_BASE_URL: &str = "https://osu.ppy.sh";
const CLIENT_USER_AGENT: &str = "dailypp-backend/0.1";
/// Tokens are treated as expired this long before the server says so.
const EXPIRY_SKEW: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct OsuClient {
  pub client: reqwest::Client,
  pub base_url: String,
  client_id: String,
  client_secret: String,
  token: Arc<Mutex<Option<CachedToken>>>,
}

#[derive(Clone, Debug)]
struct CachedToken {
  access_token: String,
  expires_at: Instant,
}

impl CachedToken {
  fn new(access_token: String, expires_in_secs: u64, now: Instant) -> Self {
    Self { access_token, expires_at: now + Duration::from_secs(expires_in_secs) }
  }

  fn is_fresh(&self, now: Instant) -> bool {
    now + EXPIRY_SKEW < self.expires_at
  }
}

impl OsuClient {
  /// Construct the client if we find OSU_CLIENT_ID and OSU_CLIENT_SECRET; otherwise return None.
  pub fn from_env() -> Option<Self> {
    let client_id = std::env::var("OSU_CLIENT_ID").ok()?;
    let client_secret = std::env::var("OSU_CLIENT_SECRET").ok()?;
    let base_url = std::env::var("OSU_API_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.into());
    Self::new(base_url, client_id, client_secret)
  }

  pub fn new(base_url: String, client_id: String, client_secret: String) -> Option<Self> {
    let client = reqwest::Client::builder()
      .timeout(Duration::from_secs(20))
      .user_agent(CLIENT_USER_AGENT)
      .build()
      .ok()?;
    let base_url = base_url.trim_end_matches('/').to_string();
    Some(Self { client, base_url, client_id, client_secret, token: Arc::new(Mutex::new(None)) })
  }

  /// Cached bearer token, refreshed when missing or about to expire.
  async fn access_token(&self) -> Result<String, OsuApiError> {
    let mut guard = self.token.lock().await;
    if let Some(cached) = guard.as_ref() {
      if cached.is_fresh(Instant::now()) {
        return Ok(cached.access_token.clone());
      }
    }

    let fresh = self.request_token().await?;
    let token = fresh.access_token.clone();
    *guard = Some(fresh);
    Ok(token)
  }

  #[instrument(level = "info", skip(self), fields(base_url = %self.base_url))]
  async fn request_token(&self) -> Result<CachedToken, OsuApiError> {
    let url = format!("{}/oauth/token", self.base_url);
    let req = TokenRequest {
      client_id: &self.client_id,
      client_secret: &self.client_secret,
      grant_type: "client_credentials",
      scope: "public",
    };

    let res = self.client.post(&url)
      .header(ACCEPT, "application/json")
      .json(&req).send().await?;
    let body: TokenResponse = decode(res).await?;
    info!(target: "osu_api", expires_in = body.expires_in, "Obtained client-credentials token");
    Ok(CachedToken::new(body.access_token, body.expires_in, Instant::now()))
  }

  /// Authorized GET against `/api/v2/...`, decoded into `T`.
  async fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T, OsuApiError> {
    let token = self.access_token().await?;
    let url = format!("{}/api/v2/{}", self.base_url, path);
    let start = Instant::now();
    let res = self.client.get(&url)
      .header(ACCEPT, "application/json")
      .header(AUTHORIZATION, format!("Bearer {}", token))
      .query(query)
      .send().await?;
    let out = decode(res).await;
    debug!(target: "osu_api", %path, elapsed = ?start.elapsed(), ok = out.is_ok(), "osu! API call finished");
    out
  }
}

/// Map non-success statuses to `OsuApiError::Status`, then decode the body strictly.
async fn decode<T: DeserializeOwned>(res: reqwest::Response) -> Result<T, OsuApiError> {
  let status = res.status();
  let body = res.text().await?;
  if !status.is_success() {
    let message = extract_osu_error(&body).unwrap_or_else(|| trunc_for_log(&body, 200));
    return Err(OsuApiError::Status { status: status.as_u16(), message });
  }
  Ok(serde_json::from_str::<T>(&body)?)
}

impl Catalog for OsuClient {
  #[instrument(level = "info", skip(self, query), fields(min = query.band.min, max = query.band.max))]
  async fn search(&self, query: &SearchQuery) -> Result<Vec<CatalogItem>, OsuApiError> {
    let mut params = vec![
      ("m", query.mode.ruleset_id().to_string()),
      ("s", query.status.as_str().to_string()),
      ("q", query.filter_text()),
    ];
    if let Some(sort) = query.sort {
      params.push(("sort", sort.as_param().to_string()));
    }
    let body: SearchResponse = self.get_json("beatmapsets/search", &params).await?;
    let items = body.into_items();
    info!(target: "osu_api", candidates = items.len(), "Catalog search returned");
    Ok(items)
  }

  #[instrument(level = "info", skip(self))]
  async fn user_summary(&self, user_id: &str) -> Result<UserSummary, OsuApiError> {
    let body: UserPayload = self.get_json(&format!("users/{}/osu", user_id), &[]).await?;
    Ok(body.into_summary())
  }

  #[instrument(level = "info", skip(self))]
  async fn user_best_scores(&self, user_id: &str, limit: usize) -> Result<Vec<ScoreSample>, OsuApiError> {
    let params = [("mode", "osu".to_string()), ("limit", limit.to_string())];
    let body: Vec<ScorePayload> = self.get_json(&format!("users/{}/scores/best", user_id), &params).await?;
    Ok(body.into_iter().map(ScorePayload::into_sample).collect())
  }
}

// --- Wire DTOs ---

#[derive(Serialize)]
struct TokenRequest<'a> {
  client_id: &'a str,
  client_secret: &'a str,
  grant_type: &'a str,
  scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
  access_token: String,
  expires_in: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
  beatmapsets: Vec<BeatmapsetPayload>,
}

#[derive(Deserialize)]
struct BeatmapsetPayload {
  id: u64,
  title: String,
  artist: String,
  creator: String,
  #[serde(default)] covers: Covers,
  #[serde(default)] beatmaps: Vec<BeatmapPayload>,
}

#[derive(Deserialize, Default)]
struct Covers {
  #[serde(default)] cover: String,
}

#[derive(Deserialize)]
struct BeatmapPayload {
  id: u64,
  beatmapset_id: u64,
  difficulty_rating: f64,
  total_length: u32,
  mode: GameMode,
  status: RankedStatus,
  version: String,
  #[serde(default)] bpm: f64,
}

impl SearchResponse {
  /// Flatten sets into playable difficulties, carrying set metadata down.
  fn into_items(self) -> Vec<CatalogItem> {
    let mut out = Vec::new();
    for set in self.beatmapsets {
      for map in set.beatmaps {
        out.push(CatalogItem {
          id: map.id,
          beatmapset_id: map.beatmapset_id,
          difficulty_rating: map.difficulty_rating,
          total_length: map.total_length,
          status: map.status,
          mode: map.mode,
          title: set.title.clone(),
          artist: set.artist.clone(),
          version: map.version,
          creator: set.creator.clone(),
          bpm: map.bpm,
          cover_url: set.covers.cover.clone(),
        });
      }
      debug!(target: "osu_api", set_id = set.id, "Flattened beatmapset");
    }
    out
  }
}

#[derive(Deserialize)]
struct UserPayload {
  #[serde(default)] username: String,
  #[serde(default)] statistics: Option<UserStatistics>,
}

impl UserPayload {
  fn into_summary(self) -> UserSummary {
    UserSummary { username: self.username, pp: self.statistics.and_then(|s| s.pp).unwrap_or(0.0) }
  }
}

#[derive(Deserialize)]
struct UserStatistics {
  #[serde(default)] pp: Option<f64>,
}

#[derive(Deserialize)]
struct ScorePayload {
  accuracy: f64,
  #[serde(default)] mods: Vec<String>,
  beatmap: ScoreBeatmap,
}

#[derive(Deserialize)]
struct ScoreBeatmap {
  difficulty_rating: f64,
}

impl ScorePayload {
  fn into_sample(self) -> ScoreSample {
    ScoreSample { accuracy: self.accuracy, difficulty_rating: self.beatmap.difficulty_rating, mods: self.mods }
  }
}

/// Try to extract a clean error message from an osu! error body.
fn extract_osu_error(body: &str) -> Option<String> {
  #[derive(Deserialize)]
  struct EObj { error: Option<String>, message: Option<String> }
  serde_json::from_str::<EObj>(body).ok().and_then(|e| e.error.or(e.message))
}
