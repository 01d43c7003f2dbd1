//! Public protocol structs for HTTP endpoints (serde ready).
//! Field names follow what the frontend already consumes (snake_case, string beatmap ids).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::{BeatmapOrigin, CatalogItem, ChallengeEntry, DailyChallenge, DifficultyTier, PpPoint, UserSettings};

/// Beatmap metadata shown on a challenge card.
#[derive(Debug, Serialize)]
pub struct BeatmapOut {
    pub id: String,
    pub beatmapset_id: String,
    pub title: String,
    pub artist: String,
    pub version: String,
    pub creator: String,
    pub difficulty_rating: f64,
    pub bpm: f64,
    pub total_length: u32,
    pub cover_url: String,
}

#[derive(Debug, Serialize)]
pub struct ChallengeOut {
    pub beatmap_id: String,
    pub difficulty: DifficultyTier,
    pub completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
    pub origin: BeatmapOrigin,
    pub beatmap: BeatmapOut,
}

#[derive(Debug, Serialize)]
pub struct ChallengesOut {
    pub challenges: Vec<ChallengeOut>,
}

#[derive(Debug, Serialize)]
pub struct HistoryDayOut {
    pub date: NaiveDate,
    pub challenges: Vec<ChallengeOut>,
}

pub fn beatmap_out(b: &CatalogItem) -> BeatmapOut {
    BeatmapOut {
        id: b.id.to_string(),
        beatmapset_id: b.beatmapset_id.to_string(),
        title: b.title.clone(),
        artist: b.artist.clone(),
        version: b.version.clone(),
        creator: b.creator.clone(),
        difficulty_rating: b.difficulty_rating,
        bpm: b.bpm,
        total_length: b.total_length,
        cover_url: b.cover_url.clone(),
    }
}

/// Convert a stored entry to the public DTO.
pub fn to_out(c: &ChallengeEntry) -> ChallengeOut {
    ChallengeOut {
        beatmap_id: c.beatmap_id.to_string(),
        difficulty: c.difficulty,
        completed: c.completed,
        completed_at: c.completed_at,
        origin: c.origin,
        beatmap: beatmap_out(&c.beatmap),
    }
}

pub fn challenges_out(day: &DailyChallenge) -> ChallengesOut {
    ChallengesOut { challenges: day.challenges.iter().map(to_out).collect() }
}

pub fn history_day_out(day: &DailyChallenge) -> HistoryDayOut {
    HistoryDayOut { date: day.date, challenges: day.challenges.iter().map(to_out).collect() }
}

#[derive(Debug, Serialize)]
pub struct PpPointOut {
    pub pp: f64,
    pub recorded_at: DateTime<Utc>,
}

impl From<&PpPoint> for PpPointOut {
    fn from(p: &PpPoint) -> Self {
        Self { pp: p.pp, recorded_at: p.recorded_at }
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct CompleteIn {
    pub beatmap_id: String,
}

/// Free-form feedback; missing fields are stored as empty strings.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FeedbackIn {
    pub beatmap_id: String,
    pub pattern_type: String,
    pub difficulty_feel: String,
}

#[derive(Serialize)]
pub struct SuccessOut {
    pub success: bool,
}

#[derive(Serialize)]
pub struct UserStatsOut {
    pub pp_raw: f64,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}

#[derive(Serialize)]
pub struct SettingsOut {
    pub settings: UserSettings,
}
