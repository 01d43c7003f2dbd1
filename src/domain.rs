//! Domain models: difficulty tiers and bands, catalog beatmaps, score samples,
//! and the per-user records kept by the in-memory store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Daily challenge slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DifficultyTier {
  Easy,
  Normal,
  Hard,
}

impl DifficultyTier {
  /// Generation order of one daily set.
  pub const ALL: [DifficultyTier; 3] = [DifficultyTier::Easy, DifficultyTier::Normal, DifficultyTier::Hard];

  pub fn as_str(&self) -> &'static str {
    match self {
      DifficultyTier::Easy => "EASY",
      DifficultyTier::Normal => "NORMAL",
      DifficultyTier::Hard => "HARD",
    }
  }
}

impl std::fmt::Display for DifficultyTier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Inclusive star-rating range used for one catalog search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyBand {
  pub min: f64,
  pub max: f64,
}

impl DifficultyBand {
  pub const fn new(min: f64, max: f64) -> Self {
    Self { min, max }
  }

  pub fn contains(&self, rating: f64) -> bool {
    rating >= self.min && rating <= self.max
  }
}

/// Ruleset of a beatmap, as spelled by the osu! API.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
  Osu,
  Taiko,
  Fruits,
  Mania,
}

impl GameMode {
  /// Numeric ruleset id used by the search endpoint (`m=`).
  pub fn ruleset_id(&self) -> u8 {
    match self {
      GameMode::Osu => 0,
      GameMode::Taiko => 1,
      GameMode::Fruits => 2,
      GameMode::Mania => 3,
    }
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RankedStatus {
  Graveyard,
  Wip,
  Pending,
  Ranked,
  Approved,
  Qualified,
  Loved,
}

impl RankedStatus {
  pub fn as_str(&self) -> &'static str {
    match self {
      RankedStatus::Graveyard => "graveyard",
      RankedStatus::Wip => "wip",
      RankedStatus::Pending => "pending",
      RankedStatus::Ranked => "ranked",
      RankedStatus::Approved => "approved",
      RankedStatus::Qualified => "qualified",
      RankedStatus::Loved => "loved",
    }
  }
}

/// One playable difficulty from the external catalog. Read-only for us.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CatalogItem {
  pub id: u64,
  pub beatmapset_id: u64,
  pub difficulty_rating: f64,
  pub total_length: u32,
  pub status: RankedStatus,
  pub mode: GameMode,

  // Display metadata
  pub title: String,
  pub artist: String,
  pub version: String,
  pub creator: String,
  pub bpm: f64,
  pub cover_url: String,
}

/// Where a selected beatmap came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeatmapOrigin {
  Catalog,
  Fallback, // default beatmap after an empty search or upstream failure
}

#[derive(Clone, Debug, PartialEq)]
pub struct SelectedBeatmap {
  pub beatmap: CatalogItem,
  pub origin: BeatmapOrigin,
}

impl SelectedBeatmap {
  pub fn is_fallback(&self) -> bool {
    self.origin == BeatmapOrigin::Fallback
  }
}

/// A recent best score, reduced to what the skill estimator needs.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ScoreSample {
  /// 0..=1
  pub accuracy: f64,
  pub difficulty_rating: f64,
  /// Mod acronyms as reported by the API ("DT", "HR", ...).
  pub mods: Vec<String>,
}

impl ScoreSample {
  pub fn has_any_mod(&self, acronyms: &[&str]) -> bool {
    self.mods.iter().any(|m| acronyms.iter().any(|a| m.eq_ignore_ascii_case(a)))
  }
}

/// One slot of a stored daily set.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChallengeEntry {
  pub beatmap_id: u64,
  pub difficulty: DifficultyTier,
  pub completed: bool,
  #[serde(default)] pub completed_at: Option<DateTime<Utc>>,
  pub beatmap: CatalogItem,
  pub origin: BeatmapOrigin,
}

/// The three challenges generated for one user on one (UTC) day.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DailyChallenge {
  pub id: String,
  pub user_id: String,
  pub date: NaiveDate,
  pub challenges: Vec<ChallengeEntry>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl DailyChallenge {
  pub fn completed_count(&self) -> usize {
    self.challenges.iter().filter(|c| c.completed).count()
  }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PpPoint {
  pub pp: f64,
  pub recorded_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BeatmapFeedback {
  pub id: String,
  pub user_id: String,
  pub beatmap_id: String,
  pub pattern_type: String,
  pub difficulty_feel: String,
  pub created_at: DateTime<Utc>,
}

/// Rank a user aims for on a tier.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TargetRank {
  #[default]
  Any,
  C,
  B,
  A,
  S,
  Sh,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct TargetRanks {
  #[serde(rename = "EASY")] pub easy: TargetRank,
  #[serde(rename = "NORMAL")] pub normal: TargetRank,
  #[serde(rename = "HARD")] pub hard: TargetRank,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
  pub target_ranks: TargetRanks,
}

/// Name and current pp of an osu! user, as reported upstream.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct UserSummary {
  pub username: String,
  pub pp: f64,
}

/// Stored profile of a caller, refreshed whenever today's set is requested.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UserProfile {
  pub osu_id: String,
  pub username: String,
  pub pp_raw: f64,
  pub settings: UserSettings,
  pub last_login: DateTime<Utc>,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

/// Partial profile update; absent fields are left as they are.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ProfileUpdate {
  #[serde(default)] pub username: Option<String>,
  #[serde(default)] pub settings: Option<UserSettings>,
}

impl UserProfile {
  pub fn new(osu_id: &str, now: DateTime<Utc>) -> Self {
    Self {
      osu_id: osu_id.to_string(),
      username: String::new(),
      pp_raw: 0.0,
      settings: UserSettings::default(),
      last_login: now,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn apply(&mut self, update: ProfileUpdate, now: DateTime<Utc>) {
    if let Some(username) = update.username {
      self.username = username;
    }
    if let Some(settings) = update.settings {
      self.settings = settings;
    }
    self.updated_at = now;
  }
}
