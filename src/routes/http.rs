//! HTTP endpoint handlers. These are thin wrappers that forward to state and core logic.
//! Each handler is instrumented and logs the caller and basic result info.
//!
//! Callers are identified by the `X-User-Id` header, set by the auth layer in
//! front of this service. Requests without it are rejected with 401.

use std::sync::Arc;

use axum::{
  async_trait,
  extract::{rejection::JsonRejection, FromRequestParts, Path, State},
  http::{request::Parts, StatusCode},
  response::IntoResponse,
  Json,
};
use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::domain::{BeatmapFeedback, ProfileUpdate, UserProfile, UserSettings};
use crate::error::{ApiError, OsuApiError};
use crate::protocol::*;
use crate::state::AppState;
use crate::stats::{challenge_stats, dashboard};

pub const USER_HEADER: &str = "x-user-id";

/// osu! user id of the authenticated caller.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub String);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for CurrentUser {
  type Rejection = ApiError;

  async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
    parts
      .headers
      .get(USER_HEADER)
      .and_then(|v| v.to_str().ok())
      .map(str::trim)
      .filter(|v| !v.is_empty())
      .map(|v| CurrentUser(v.to_string()))
      .ok_or(ApiError::Unauthorized)
  }
}

fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
  body.map(|Json(v)| v).map_err(|e| ApiError::BadRequest(e.body_text()))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_challenges(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<ChallengesOut>, ApiError> {
  let day = state.todays_challenge(&user_id, Utc::now()).await;
  let fallbacks = day.challenges.iter().filter(|c| c.origin == crate::domain::BeatmapOrigin::Fallback).count();
  info!(target: "challenge", %user_id, id = %day.id, fallbacks, "HTTP challenges served");
  Ok(Json(challenges_out(&day)))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_complete(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<CompleteIn>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
  let body = json_body(body)?;
  let beatmap_id: u64 = body
    .beatmap_id
    .trim()
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("Invalid beatmap_id: {}", body.beatmap_id)))?;

  state
    .complete_challenge(&user_id, beatmap_id, Utc::now())
    .await
    .ok_or_else(|| ApiError::NotFound("Challenge not found".into()))?;
  info!(target: "challenge", %user_id, beatmap_id, "Challenge completed");
  Ok(StatusCode::OK)
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_feedback(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<FeedbackIn>, JsonRejection>,
) -> Result<Json<SuccessOut>, ApiError> {
  let body = json_body(body)?;
  let feedback = BeatmapFeedback {
    id: Uuid::new_v4().to_string(),
    user_id,
    beatmap_id: body.beatmap_id,
    pattern_type: body.pattern_type,
    difficulty_feel: body.difficulty_feel,
    created_at: Utc::now(),
  };
  info!(target: "challenge", user_id = %feedback.user_id, beatmap_id = %feedback.beatmap_id, "Feedback stored");
  state.insert_feedback(feedback).await;
  Ok(Json(SuccessOut { success: true }))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_post_setting_goal(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<UserSettings>, JsonRejection>,
) -> Result<Json<SettingsOut>, ApiError> {
  let settings = json_body(body)?;
  let settings = state
    .save_settings(&user_id, settings, Utc::now())
    .await
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
  Ok(Json(SettingsOut { settings }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_user(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<UserProfile>, ApiError> {
  state
    .user_profile(&user_id)
    .await
    .map(Json)
    .ok_or_else(|| ApiError::NotFound("User not found".into()))
}

#[instrument(level = "info", skip(state, body))]
pub async fn http_put_user(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
  body: Result<Json<ProfileUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
  let update = json_body(body)?;
  state
    .update_profile(&user_id, update, Utc::now())
    .await
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;
  info!(target: "dailypp_backend", %user_id, "Profile updated");
  Ok(StatusCode::OK)
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_stats(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  let records = state.user_challenges(&user_id).await;
  Ok(Json(challenge_stats(&records, Utc::now().date_naive())))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_user_stats(
  State(state): State<Arc<AppState>>,
  Path(user_id): Path<String>,
) -> Result<Json<UserStatsOut>, ApiError> {
  if user_id.trim().is_empty() {
    return Err(ApiError::BadRequest("User ID is required".into()));
  }
  let client = state.osu.as_ref().ok_or(OsuApiError::Disabled)?;
  let pp_raw = client.user_summary(&user_id).await?.pp;
  Ok(Json(UserStatsOut { pp_raw }))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_dashboard(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
  let records = state.user_challenges(&user_id).await;
  let history = state.user_pp_history(&user_id).await;
  let board = dashboard(&records, &history, Utc::now());
  info!(target: "dailypp_backend", %user_id, streak = board.current_streak, "Dashboard served");
  Ok(Json(board))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_history(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<HistoryDayOut>>, ApiError> {
  let days = state.recent_history(&user_id, Utc::now().date_naive()).await;
  Ok(Json(days.iter().map(history_day_out).collect()))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_pp_history(
  State(state): State<Arc<AppState>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<PpPointOut>>, ApiError> {
  let since = Utc::now() - chrono::Duration::days(crate::stats::HISTORY_DAYS);
  let points = state.user_pp_history(&user_id).await;
  Ok(Json(points.iter().filter(|p| p.recorded_at >= since).map(PpPointOut::from).collect()))
}

#[cfg(test)]
mod tests {
  use axum::{
    body::{to_bytes, Body},
    http::{Method, Request},
    Router,
  };
  use serde_json::Value;
  use tower::ServiceExt;

  use super::*;
  use crate::config::SelectionConfig;
  use crate::routes::build_router;

  fn app() -> Router {
    build_router(Arc::new(AppState::with_parts(None, SelectionConfig::default())))
  }

  fn get(uri: &str, user: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().method(Method::GET).uri(uri);
    if let Some(u) = user {
      req = req.header(USER_HEADER, u);
    }
    req.body(Body::empty()).unwrap()
  }

  fn post_json(uri: &str, user: &str, body: &str) -> Request<Body> {
    Request::builder()
      .method(Method::POST)
      .uri(uri)
      .header(USER_HEADER, user)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  async fn json_of(res: axum::response::Response) -> Value {
    let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  #[tokio::test]
  async fn health_is_ok() {
    let res = app().oneshot(get("/api/v1/health", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_of(res).await["ok"], Value::Bool(true));
  }

  #[tokio::test]
  async fn missing_user_is_unauthorized() {
    let res = app().oneshot(get("/api/challenges", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_of(res).await["code"], "unauthorized");
  }

  #[tokio::test]
  async fn challenges_fall_back_without_osu_api() {
    let res = app().oneshot(get("/api/challenges", Some("7"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_of(res).await;
    let list = body["challenges"].as_array().unwrap();
    assert_eq!(list.len(), 3);
    assert_eq!(list[0]["difficulty"], "EASY");
    assert_eq!(list[1]["difficulty"], "NORMAL");
    assert_eq!(list[2]["difficulty"], "HARD");
    assert_eq!(list[0]["beatmap_id"], "75");
    assert_eq!(list[0]["origin"], "fallback");
    assert_eq!(list[0]["beatmap"]["difficulty_rating"], 2.55);
  }

  #[tokio::test]
  async fn complete_flow_feeds_stats_and_dashboard() {
    let app = app();
    app.clone().oneshot(get("/api/challenges", Some("7"))).await.unwrap();

    let res = app.clone().oneshot(post_json("/api/challenges/complete", "7", r#"{"beatmap_id":"75"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let stats = json_of(app.clone().oneshot(get("/api/user/stats", Some("7"))).await.unwrap()).await;
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["completed"], 1);
    assert_eq!(stats["byDifficulty"]["EASY"]["completed"], 1);

    let board = json_of(app.clone().oneshot(get("/api/user/dashboard", Some("7"))).await.unwrap()).await;
    assert_eq!(board["today_completed"], 1);
    assert_eq!(board["weekly_completed"], 1);
    assert_eq!(board["current_streak"], 1);
    assert_eq!(board["pp_growth"], 0);

    let history = json_of(app.clone().oneshot(get("/api/user/history", Some("7"))).await.unwrap()).await;
    assert_eq!(history.as_array().unwrap().len(), 1);
    assert_eq!(history[0]["challenges"][0]["completed"], true);

    let pp = json_of(app.oneshot(get("/api/user/pp-history", Some("7"))).await.unwrap()).await;
    assert_eq!(pp.as_array().unwrap().len(), 1);
  }

  #[tokio::test]
  async fn completing_unknown_challenge_is_not_found() {
    let res = app().oneshot(post_json("/api/challenges/complete", "7", r#"{"beatmap_id":"75"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_of(res).await["error"], "Challenge not found");
  }

  #[tokio::test]
  async fn malformed_bodies_are_bad_requests() {
    let res = app().oneshot(post_json("/api/challenges/complete", "7", r#"{"beatmap":1}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app().oneshot(post_json("/api/challenges/complete", "7", r#"{"beatmap_id":"abc"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = app()
      .oneshot(post_json("/api/challenges/setting-goal", "7", r#"{"targetRanks":{"EASY":"Z","NORMAL":"A","HARD":"S"}}"#))
      .await
      .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
  }

  fn put_json(uri: &str, user: &str, body: &str) -> Request<Body> {
    Request::builder()
      .method(Method::PUT)
      .uri(uri)
      .header(USER_HEADER, user)
      .header("content-type", "application/json")
      .body(Body::from(body.to_string()))
      .unwrap()
  }

  #[tokio::test]
  async fn settings_are_readable_through_user_endpoint() {
    let app = app();
    let raw = r#"{"targetRanks":{"EASY":"SH","NORMAL":"A","HARD":"ANY"}}"#;

    // No profile until the first challenge request.
    let res = app.clone().oneshot(post_json("/api/challenges/setting-goal", "7", raw)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    app.clone().oneshot(get("/api/challenges", Some("7"))).await.unwrap();
    let res = app.clone().oneshot(post_json("/api/challenges/setting-goal", "7", raw)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_of(res).await["settings"]["targetRanks"]["EASY"], "SH");

    let res = app.oneshot(get("/api/user", Some("7"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let user = json_of(res).await;
    assert_eq!(user["osu_id"], "7");
    assert_eq!(user["pp_raw"], 0.0);
    assert_eq!(user["settings"]["targetRanks"]["EASY"], "SH");
    assert_eq!(user["settings"]["targetRanks"]["NORMAL"], "A");
    assert!(user["last_login"].is_string());
  }

  #[tokio::test]
  async fn user_profile_get_and_put() {
    let app = app();
    let res = app.clone().oneshot(get("/api/user", Some("7"))).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let res = app.clone().oneshot(put_json("/api/user", "7", r#"{"username":"peppy"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_of(res).await["error"], "User not found");

    app.clone().oneshot(get("/api/challenges", Some("7"))).await.unwrap();
    let res = app.clone().oneshot(put_json("/api/user", "7", r#"{"username":"peppy"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let user = json_of(app.clone().oneshot(get("/api/user", Some("7"))).await.unwrap()).await;
    assert_eq!(user["username"], "peppy");
    assert_eq!(user["settings"]["targetRanks"]["HARD"], "ANY");

    let res = app.oneshot(get("/api/user", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn feedback_is_accepted() {
    let state = Arc::new(AppState::with_parts(None, SelectionConfig::default()));
    let app = build_router(state.clone());
    let raw = r#"{"beatmap_id":"129891","pattern_type":"stream","difficulty_feel":"hard"}"#;
    let res = app.clone().oneshot(post_json("/api/challenges/feedback", "7", raw)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_of(res).await["success"], true);

    // Partial feedback is kept as well.
    let res = app.oneshot(post_json("/api/challenges/feedback", "7", r#"{"beatmap_id":"75"}"#)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let stored = state.feedback.read().await;
    assert_eq!(stored.len(), 2);
    assert_eq!(stored[1].beatmap_id, "75");
    assert_eq!(stored[1].pattern_type, "");
  }

  #[tokio::test]
  async fn user_stats_proxy_needs_osu_api() {
    let res = app().oneshot(get("/api/user/stats/2", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
  }
}
