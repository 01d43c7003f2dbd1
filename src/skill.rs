//! Stable skill estimation from a user's recent best scores.
//!
//! The result is a star-rating equivalent: the hardest map the user clears
//! reliably (high accuracy), with speed-up and hard modifiers folded into the
//! rating and easing modifiers disqualifying a play.

use crate::domain::ScoreSample;

/// Returned when no play qualifies.
pub const RATING_FLOOR: f64 = 2.0;
pub const MIN_ACCURACY: f64 = 0.95;

const MAX_CONSIDERED: usize = 10;
const TOP_PLAYS: usize = 3;

const SPEED_UP_MODS: &[&str] = &["DT", "NC"];
const HARD_MODS: &[&str] = &["HR"];
const EASING_MODS: &[&str] = &["EZ", "HT"];

const SPEED_UP_FACTOR: f64 = 1.4;
const HARD_FACTOR: f64 = 1.05;

/// Derive the stable top rating from up to ten best scores, in the order the
/// caller supplies them.
pub fn estimate_stable_rating(scores: &[ScoreSample]) -> f64 {
  scores
    .iter()
    .take(MAX_CONSIDERED)
    .filter(|s| s.accuracy >= MIN_ACCURACY)
    .take(TOP_PLAYS)
    .filter_map(adjusted_rating)
    .fold(None, |best: Option<f64>, r| Some(best.map_or(r, |b| b.max(r))))
    .unwrap_or(RATING_FLOOR)
}

/// Modifier-adjusted difficulty of one play; `None` when the play is invalid.
fn adjusted_rating(score: &ScoreSample) -> Option<f64> {
  if score.has_any_mod(EASING_MODS) {
    return None;
  }
  if !score.difficulty_rating.is_finite() || score.difficulty_rating <= 0.0 {
    return None;
  }

  let mut rating = score.difficulty_rating;
  if score.has_any_mod(SPEED_UP_MODS) {
    rating *= SPEED_UP_FACTOR;
  }
  if score.has_any_mod(HARD_MODS) {
    rating *= HARD_FACTOR;
  }
  Some(rating)
}
