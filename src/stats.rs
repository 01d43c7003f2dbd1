//! Dashboard and completion statistics over a user's stored daily sets and pp history.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::Serialize;

use crate::domain::{DailyChallenge, DifficultyTier, PpPoint};
use crate::util::round_half_up;

pub const HISTORY_DAYS: i64 = 30;
pub const WEEK_DAYS: i64 = 7;
/// The streak never looks further back than this many daily sets.
pub const STREAK_LOOKBACK: usize = 30;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TierCount {
  pub total: usize,
  pub completed: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ByDifficulty {
  #[serde(rename = "EASY")] pub easy: TierCount,
  #[serde(rename = "NORMAL")] pub normal: TierCount,
  #[serde(rename = "HARD")] pub hard: TierCount,
}

impl ByDifficulty {
  fn get_mut(&mut self, tier: DifficultyTier) -> &mut TierCount {
    match tier {
      DifficultyTier::Easy => &mut self.easy,
      DifficultyTier::Normal => &mut self.normal,
      DifficultyTier::Hard => &mut self.hard,
    }
  }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChallengeStats {
  pub total: usize,
  pub completed: usize,
  pub by_difficulty: ByDifficulty,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
  pub weekly_completed: usize,
  pub current_streak: usize,
  pub pp_growth: i64,
  pub today_completed: usize,
}

/// Whether a set dated `date` lies within the last `days` days of `today`.
/// A set date stands for the start of its UTC day, so the day exactly `days`
/// back is already outside the window.
pub fn within_days(date: NaiveDate, today: NaiveDate, days: i64) -> bool {
  date > today - Duration::days(days) && date <= today
}

/// Totals per tier over sets dated within the last 30 days.
pub fn challenge_stats(records: &[DailyChallenge], today: NaiveDate) -> ChallengeStats {
  let mut stats = ChallengeStats::default();
  let recent = records.iter().filter(|r| within_days(r.date, today, HISTORY_DAYS));
  for entry in recent.flat_map(|r| r.challenges.iter()) {
    let done = usize::from(entry.completed);
    let tier = stats.by_difficulty.get_mut(entry.difficulty);
    tier.total += 1;
    tier.completed += done;
    stats.total += 1;
    stats.completed += done;
  }
  stats
}

/// Consecutive most-recent daily sets (newest first, at most 30) with a completion.
pub fn current_streak(records: &[DailyChallenge], today: NaiveDate) -> usize {
  let mut days: Vec<&DailyChallenge> = records.iter().filter(|r| r.date <= today).collect();
  days.sort_by(|a, b| b.date.cmp(&a.date));
  days
    .into_iter()
    .take(STREAK_LOOKBACK)
    .take_while(|d| d.challenges.iter().any(|c| c.completed))
    .count()
}

/// Latest minus oldest pp over the last 30 days, rounded; 0 with fewer than two points.
pub fn pp_growth(history: &[PpPoint], now: DateTime<Utc>) -> i64 {
  let since = now - Duration::days(HISTORY_DAYS);
  let mut recent: Vec<&PpPoint> = history.iter().filter(|p| p.recorded_at >= since).collect();
  if recent.len() < 2 {
    return 0;
  }
  recent.sort_by_key(|p| p.recorded_at);
  let oldest = recent[0].pp;
  let latest = recent[recent.len() - 1].pp;
  round_half_up(latest - oldest)
}

pub fn dashboard(records: &[DailyChallenge], history: &[PpPoint], now: DateTime<Utc>) -> Dashboard {
  let today = now.date_naive();

  let today_completed = records.iter().filter(|r| r.date == today).map(DailyChallenge::completed_count).sum();
  let weekly_completed = records
    .iter()
    .filter(|r| within_days(r.date, today, WEEK_DAYS))
    .map(DailyChallenge::completed_count)
    .sum();

  Dashboard {
    weekly_completed,
    current_streak: current_streak(records, today),
    pp_growth: pp_growth(history, now),
    today_completed,
  }
}
