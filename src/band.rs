//! Difficulty band calculation: (pp, stable top rating, tier) -> star range.

use crate::config::BandConfig;
use crate::domain::{DifficultyBand, DifficultyTier};
use crate::skill::RATING_FLOOR;

/// Below this pp the literal beginner tables apply.
pub const GENERAL_REGIME_PP: f64 = 1000.0;
const NOVICE_MAX_PP: f64 = 300.0;
const BEGINNER_MAX_PP: f64 = 600.0;

/// Pure: identical inputs always produce identical bands.
pub fn compute_band(cfg: &BandConfig, skill_rating: f64, stable_top_rating: f64, tier: DifficultyTier) -> DifficultyBand {
  let skill = if skill_rating.is_finite() && skill_rating > 0.0 { skill_rating } else { 0.0 };

  if skill < GENERAL_REGIME_PP {
    let table = if skill <= NOVICE_MAX_PP {
      &cfg.low_skill.novice
    } else if skill <= BEGINNER_MAX_PP {
      &cfg.low_skill.beginner
    } else {
      &cfg.low_skill.intermediate
    };
    return table.get(tier);
  }

  let stable_top = if stable_top_rating.is_finite() && stable_top_rating > 0.0 {
    stable_top_rating
  } else {
    RATING_FLOOR
  };
  let base = stable_top + cfg.offsets.get(tier);
  DifficultyBand {
    min: (base - cfg.margin).max(0.0),
    max: (base + cfg.margin).max(0.0),
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use approx::assert_abs_diff_eq;

  #[test]
  fn novice_easy_is_literal() {
    let cfg = BandConfig::default();
    for pp in [0.0, 120.0, 299.9] {
      assert_eq!(compute_band(&cfg, pp, 6.0, DifficultyTier::Easy), DifficultyBand::new(2.0, 2.3));
    }
  }

  #[test]
  fn low_skill_buckets() {
    let cfg = BandConfig::default();
    assert_eq!(compute_band(&cfg, 300.0, 0.0, DifficultyTier::Hard), cfg.low_skill.novice.hard);
    assert_eq!(compute_band(&cfg, 450.0, 0.0, DifficultyTier::Normal), cfg.low_skill.beginner.normal);
    assert_eq!(compute_band(&cfg, 999.0, 0.0, DifficultyTier::Easy), cfg.low_skill.intermediate.easy);
  }

  #[test]
  fn general_regime_centres_on_stable_top() {
    let cfg = BandConfig::default();
    let hard = compute_band(&cfg, 2500.0, 5.0, DifficultyTier::Hard);
    assert_abs_diff_eq!(hard.min, 4.85, epsilon = 1e-9);
    assert_abs_diff_eq!(hard.max, 5.35, epsilon = 1e-9);

    let easy = compute_band(&cfg, 2500.0, 5.0, DifficultyTier::Easy);
    assert_abs_diff_eq!(easy.min, 4.05, epsilon = 1e-9);
    assert_abs_diff_eq!(easy.max, 4.55, epsilon = 1e-9);
  }

  #[test]
  fn tiers_are_ordered_in_general_regime() {
    let cfg = BandConfig::default();
    let bands: Vec<_> = DifficultyTier::ALL.iter().map(|t| compute_band(&cfg, 4000.0, 6.2, *t)).collect();
    assert!(bands[0].min < bands[1].min && bands[1].min < bands[2].min);
    assert!(cfg.offsets.easy < cfg.offsets.normal && cfg.offsets.normal < cfg.offsets.hard);
  }

  #[test]
  fn min_never_negative() {
    let mut cfg = BandConfig::default();
    cfg.offsets.easy = -5.0;
    let band = compute_band(&cfg, 1200.0, 2.0, DifficultyTier::Easy);
    assert_eq!(band.min, 0.0);
    assert!(band.min <= band.max);
  }

  #[test]
  fn invalid_inputs_are_clamped() {
    let cfg = BandConfig::default();
    assert_eq!(compute_band(&cfg, -50.0, 3.0, DifficultyTier::Easy), DifficultyBand::new(2.0, 2.3));
    assert_eq!(compute_band(&cfg, f64::NAN, 3.0, DifficultyTier::Easy), DifficultyBand::new(2.0, 2.3));
    let band = compute_band(&cfg, 1500.0, f64::NAN, DifficultyTier::Normal);
    assert_abs_diff_eq!(band.min, 1.45, epsilon = 1e-9);
  }

  #[test]
  fn deterministic() {
    let cfg = BandConfig::default();
    let a = compute_band(&cfg, 1800.0, 4.4, DifficultyTier::Normal);
    let b = compute_band(&cfg, 1800.0, 4.4, DifficultyTier::Normal);
    assert_eq!(a, b);
  }
}
