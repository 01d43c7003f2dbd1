//! Application state: in-memory stores, selection config, osu! API client.
//!
//! This module owns:
//!   - daily challenge sets (by user, one per UTC day)
//!   - pp history points (by user)
//!   - user profiles (name, pp, target-rank settings) and beatmap feedback
//!   - the selection config (from TOML or defaults)
//!   - optional osu! API client
//!
//! Generating today's set is the only path that talks to the osu! API; it never
//! fails, falling back to the default beatmap per tier when needed.

use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, NaiveDate, Utc};
use rand::{rngs::StdRng, SeedableRng};
use tokio::sync::RwLock;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::catalog::Catalog;
use crate::config::{load_selection_config_from_env, SelectionConfig};
use crate::domain::{
    BeatmapFeedback, ChallengeEntry, DailyChallenge, PpPoint, ProfileUpdate, UserProfile, UserSettings, UserSummary,
};
use crate::logic::generate_daily_set;
use crate::osu::OsuClient;
use crate::stats::{within_days, HISTORY_DAYS};

#[derive(Clone)]
pub struct AppState {
    pub challenges: Arc<RwLock<HashMap<String, Vec<DailyChallenge>>>>,
    pub pp_history: Arc<RwLock<HashMap<String, Vec<PpPoint>>>>,
    pub feedback: Arc<RwLock<Vec<BeatmapFeedback>>>,
    pub users: Arc<RwLock<HashMap<String, UserProfile>>>,
    pub osu: Option<OsuClient>,
    pub selection: SelectionConfig,
}

impl AppState {
    /// Build state from env: load config, init the osu! API client.
    #[instrument(level = "info", skip_all)]
    pub fn new() -> Self {
        let selection = load_selection_config_from_env().unwrap_or_default();

        let osu = OsuClient::from_env();
        if let Some(client) = &osu {
            info!(target: "dailypp_backend", base_url = %client.base_url, "osu! API enabled.");
        } else {
            warn!(target: "dailypp_backend", "osu! API disabled (no OSU_CLIENT_ID / OSU_CLIENT_SECRET). Every challenge will be the default beatmap.");
        }

        Self::with_parts(osu, selection)
    }

    pub fn with_parts(osu: Option<OsuClient>, selection: SelectionConfig) -> Self {
        Self {
            challenges: Arc::new(RwLock::new(HashMap::new())),
            pp_history: Arc::new(RwLock::new(HashMap::new())),
            feedback: Arc::new(RwLock::new(Vec::new())),
            users: Arc::new(RwLock::new(HashMap::new())),
            osu,
            selection,
        }
    }

    /// Read-only lookup of a user's set for `date`.
    #[instrument(level = "debug", skip(self))]
    pub async fn daily_challenge(&self, user_id: &str, date: NaiveDate) -> Option<DailyChallenge> {
        let challenges = self.challenges.read().await;
        challenges
            .get(user_id)
            .and_then(|days| days.iter().find(|d| d.date == date).cloned())
    }

    /// Today's set for the user, generating and storing it on first request.
    /// Every call refreshes the caller's profile (`last_login`, and name/pp on generation).
    #[instrument(level = "info", skip(self))]
    pub async fn todays_challenge(&self, user_id: &str, now: DateTime<Utc>) -> DailyChallenge {
        let today = now.date_naive();
        if let Some(existing) = self.daily_challenge(user_id, today).await {
            self.touch_profile(user_id, None, now).await;
            info!(target: "challenge", %user_id, %today, "Returning existing challenges for today");
            return existing;
        }

        let summary = self.current_summary(user_id).await;
        let pp = summary.as_ref().map_or(0.0, |s| s.pp);
        self.touch_profile(user_id, summary, now).await;
        self.record_pp(user_id, pp, now).await;

        let picks = generate_daily_set(
            self.osu.as_ref(),
            &self.selection,
            pp,
            user_id,
            StdRng::from_entropy(),
        )
        .await;

        let challenges = picks
            .into_iter()
            .map(|(tier, picked)| ChallengeEntry {
                beatmap_id: picked.beatmap.id,
                difficulty: tier,
                completed: false,
                completed_at: None,
                beatmap: picked.beatmap,
                origin: picked.origin,
            })
            .collect();
        let generated = DailyChallenge {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            date: today,
            challenges,
            created_at: now,
            updated_at: now,
        };

        // A concurrent request may have stored a set meanwhile; first one wins.
        let mut store = self.challenges.write().await;
        let days = store.entry(user_id.to_string()).or_default();
        if let Some(existing) = days.iter().find(|d| d.date == today) {
            return existing.clone();
        }
        days.push(generated.clone());
        info!(target: "challenge", %user_id, %today, id = %generated.id, "Stored new daily challenge set");
        generated
    }

    /// Name and pp from the osu! API; `None` when unavailable (pp then counts as 0).
    async fn current_summary(&self, user_id: &str) -> Option<UserSummary> {
        let client = self.osu.as_ref()?;
        match client.user_summary(user_id).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(target: "challenge", %user_id, error = %e, "User pp unavailable; treating as 0");
                None
            }
        }
    }

    /// Create or refresh the caller's profile. Upstream data, when present, replaces name and pp.
    async fn touch_profile(&self, user_id: &str, summary: Option<UserSummary>, now: DateTime<Utc>) {
        let mut users = self.users.write().await;
        let profile = users.entry(user_id.to_string()).or_insert_with(|| UserProfile::new(user_id, now));
        if let Some(summary) = summary {
            profile.username = summary.username;
            profile.pp_raw = summary.pp;
            profile.updated_at = now;
        }
        profile.last_login = now;
    }

    pub async fn user_profile(&self, user_id: &str) -> Option<UserProfile> {
        self.users.read().await.get(user_id).cloned()
    }

    /// Apply a partial update to an existing profile. `None` if the user is unknown.
    #[instrument(level = "info", skip(self, update))]
    pub async fn update_profile(&self, user_id: &str, update: ProfileUpdate, now: DateTime<Utc>) -> Option<UserProfile> {
        let mut users = self.users.write().await;
        let profile = users.get_mut(user_id)?;
        profile.apply(update, now);
        Some(profile.clone())
    }

    /// Mark today's entry with `beatmap_id` completed. `None` if there is no such entry.
    #[instrument(level = "info", skip(self))]
    pub async fn complete_challenge(&self, user_id: &str, beatmap_id: u64, now: DateTime<Utc>) -> Option<DailyChallenge> {
        let today = now.date_naive();
        let mut store = self.challenges.write().await;
        let day = store.get_mut(user_id)?.iter_mut().find(|d| d.date == today)?;
        let entry = day.challenges.iter_mut().find(|c| c.beatmap_id == beatmap_id)?;
        entry.completed = true;
        entry.completed_at = Some(now);
        day.updated_at = now;
        Some(day.clone())
    }

    /// All stored sets of a user (any date).
    pub async fn user_challenges(&self, user_id: &str) -> Vec<DailyChallenge> {
        self.challenges.read().await.get(user_id).cloned().unwrap_or_default()
    }

    /// Sets from the last 30 days, newest first.
    pub async fn recent_history(&self, user_id: &str, today: NaiveDate) -> Vec<DailyChallenge> {
        let mut days: Vec<DailyChallenge> = self
            .user_challenges(user_id)
            .await
            .into_iter()
            .filter(|d| within_days(d.date, today, HISTORY_DAYS))
            .collect();
        days.sort_by(|a, b| b.date.cmp(&a.date));
        days
    }

    pub async fn record_pp(&self, user_id: &str, pp: f64, at: DateTime<Utc>) {
        let mut history = self.pp_history.write().await;
        history.entry(user_id.to_string()).or_default().push(PpPoint { pp, recorded_at: at });
    }

    /// Full pp history of a user, oldest first.
    pub async fn user_pp_history(&self, user_id: &str) -> Vec<PpPoint> {
        let mut points = self.pp_history.read().await.get(user_id).cloned().unwrap_or_default();
        points.sort_by_key(|p| p.recorded_at);
        points
    }

    pub async fn insert_feedback(&self, feedback: BeatmapFeedback) {
        self.feedback.write().await.push(feedback);
    }

    /// Replace the target-rank settings of a known user.
    pub async fn save_settings(&self, user_id: &str, settings: UserSettings, now: DateTime<Utc>) -> Option<UserSettings> {
        let update = ProfileUpdate { username: None, settings: Some(settings) };
        self.update_profile(user_id, update, now).await.map(|p| p.settings)
    }
}
