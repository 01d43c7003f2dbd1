//! Loading selection configuration (difficulty bands, search constraints) from TOML.
//!
//! Every key is optional; missing keys keep the built-in defaults. Example:
//!
//! ```toml
//! selection_window = 25
//! min_length = 60
//! max_length = 300
//! sort = "plays_desc"
//!
//! [bands]
//! margin = 0.25
//! offsets = { easy = -0.7, normal = -0.3, hard = 0.1 }
//!
//! [bands.low_skill.novice]
//! easy = { min = 2.0, max = 2.3 }
//! normal = { min = 2.3, max = 2.7 }
//! hard = { min = 2.7, max = 3.1 }
//! ```

use serde::Deserialize;
use tracing::{error, info};

use crate::catalog::SearchSort;
use crate::domain::{DifficultyBand, DifficultyTier};

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SelectionConfig {
  pub bands: BandConfig,
  /// Only the first `selection_window` filtered candidates are eligible for the random pick.
  pub selection_window: usize,
  /// Length constraints (seconds) sent with every catalog search.
  pub min_length: u32,
  pub max_length: u32,
  /// Upstream ordering of search results; the selection window is taken from its head.
  pub sort: SearchSort,
}

impl Default for SelectionConfig {
  fn default() -> Self {
    Self { bands: BandConfig::default(), selection_window: 25, min_length: 60, max_length: 300, sort: SearchSort::PlaysDesc }
  }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BandConfig {
  pub low_skill: LowSkillBands,
  pub offsets: TierOffsets,
  pub margin: f64,
}

impl Default for BandConfig {
  fn default() -> Self {
    Self { low_skill: LowSkillBands::default(), offsets: TierOffsets::default(), margin: 0.25 }
  }
}

/// Literal star ranges for players under 1000pp, keyed by coarse pp bucket.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LowSkillBands {
  /// pp <= 300
  pub novice: TierBands,
  /// pp <= 600
  pub beginner: TierBands,
  /// pp < 1000
  pub intermediate: TierBands,
}

impl Default for LowSkillBands {
  fn default() -> Self {
    Self {
      novice: TierBands {
        easy: DifficultyBand::new(2.0, 2.3),
        normal: DifficultyBand::new(2.3, 2.7),
        hard: DifficultyBand::new(2.7, 3.1),
      },
      beginner: TierBands {
        easy: DifficultyBand::new(2.5, 2.9),
        normal: DifficultyBand::new(2.9, 3.3),
        hard: DifficultyBand::new(3.3, 3.7),
      },
      intermediate: TierBands {
        easy: DifficultyBand::new(3.0, 3.4),
        normal: DifficultyBand::new(3.4, 3.9),
        hard: DifficultyBand::new(3.9, 4.4),
      },
    }
  }
}

#[derive(Clone, Copy, Debug, Deserialize)]
pub struct TierBands {
  pub easy: DifficultyBand,
  pub normal: DifficultyBand,
  pub hard: DifficultyBand,
}

impl TierBands {
  pub fn get(&self, tier: DifficultyTier) -> DifficultyBand {
    match tier {
      DifficultyTier::Easy => self.easy,
      DifficultyTier::Normal => self.normal,
      DifficultyTier::Hard => self.hard,
    }
  }
}

/// Star offsets from the stable top rating, one per tier.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct TierOffsets {
  pub easy: f64,
  pub normal: f64,
  pub hard: f64,
}

impl Default for TierOffsets {
  fn default() -> Self {
    Self { easy: -0.7, normal: -0.3, hard: 0.1 }
  }
}

impl TierOffsets {
  pub fn get(&self, tier: DifficultyTier) -> f64 {
    match tier {
      DifficultyTier::Easy => self.easy,
      DifficultyTier::Normal => self.normal,
      DifficultyTier::Hard => self.hard,
    }
  }
}

impl SelectionConfig {
  /// Reject configurations the band calculator cannot honor.
  pub fn validate(&self) -> Result<(), String> {
    let o = &self.bands.offsets;
    if !(o.easy < o.normal && o.normal < o.hard) {
      return Err(format!(
        "offsets must satisfy easy < normal < hard (got {}, {}, {})",
        o.easy, o.normal, o.hard
      ));
    }
    if !self.bands.margin.is_finite() || self.bands.margin < 0.0 {
      return Err(format!("margin must be a non-negative number (got {})", self.bands.margin));
    }
    let low = &self.bands.low_skill;
    for (bucket, bands) in [("novice", &low.novice), ("beginner", &low.beginner), ("intermediate", &low.intermediate)] {
      for tier in DifficultyTier::ALL {
        let band = bands.get(tier);
        if !(band.min >= 0.0 && band.min <= band.max) {
          return Err(format!("low_skill.{bucket}.{tier} must satisfy 0 <= min <= max"));
        }
      }
    }
    if self.selection_window == 0 {
      return Err("selection_window must be at least 1".into());
    }
    if self.min_length > self.max_length {
      return Err("min_length must not exceed max_length".into());
    }
    Ok(())
  }
}

pub fn parse_selection_config(raw: &str) -> Result<SelectionConfig, String> {
  let cfg = toml::from_str::<SelectionConfig>(raw).map_err(|e| e.to_string())?;
  cfg.validate()?;
  Ok(cfg)
}

/// Attempt to load `SelectionConfig` from DAILYPP_CONFIG_PATH. On any IO/parse/validation error, returns None.
pub fn load_selection_config_from_env() -> Option<SelectionConfig> {
  let path = std::env::var("DAILYPP_CONFIG_PATH").ok()?;
  match std::fs::read_to_string(&path) {
    Ok(s) => match parse_selection_config(&s) {
      Ok(cfg) => {
        info!(target: "dailypp_backend", %path, "Loaded selection config (TOML)");
        Some(cfg)
      }
      Err(e) => {
        error!(target: "dailypp_backend", %path, error = %e, "Invalid selection config; using defaults");
        None
      }
    },
    Err(e) => {
      error!(target: "dailypp_backend", %path, error = %e, "Failed to read selection config file");
      None
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn defaults_are_valid() {
    assert!(SelectionConfig::default().validate().is_ok());
  }

  #[test]
  fn partial_toml_keeps_defaults() {
    let cfg = parse_selection_config("selection_window = 10\n[bands]\nmargin = 0.4\n").unwrap();
    assert_eq!(cfg.selection_window, 10);
    assert_eq!(cfg.bands.margin, 0.4);
    assert_eq!(cfg.bands.offsets.hard, 0.1);
    assert_eq!(cfg.bands.low_skill.novice.easy, DifficultyBand::new(2.0, 2.3));
    assert_eq!(cfg.max_length, 300);
    assert_eq!(cfg.sort, SearchSort::PlaysDesc);
  }

  #[test]
  fn sort_is_configurable() {
    let cfg = parse_selection_config("sort = \"ranked_desc\"\n").unwrap();
    assert_eq!(cfg.sort, SearchSort::RankedDesc);
  }

  #[test]
  fn unordered_offsets_are_rejected() {
    let raw = "[bands.offsets]\neasy = 0.5\nnormal = 0.0\nhard = 1.0\n";
    let err = parse_selection_config(raw).unwrap_err();
    assert!(err.contains("easy < normal < hard"));
  }

  #[test]
  fn inverted_literal_band_is_rejected() {
    let raw = "[bands.low_skill.beginner]\neasy = { min = 3.0, max = 2.0 }\nnormal = { min = 3.0, max = 3.2 }\nhard = { min = 3.2, max = 3.5 }\n";
    assert!(parse_selection_config(raw).is_err());
  }
}
