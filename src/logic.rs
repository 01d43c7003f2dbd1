//! Challenge generation: skill estimate -> band -> catalog search -> selection.
//!
//! A `GenerationCycle` is the per-request context for one daily set. It owns
//! the recent-selection tracker and the random source, borrows the catalog and
//! the selection config, and memoizes the stable top rating so the three tiers
//! share one best-scores lookup. Tiers run sequentially: each selection must
//! be visible to the tracker before the next tier searches.

use rand::Rng;
use tracing::{info, instrument, warn};

use crate::band::{compute_band, GENERAL_REGIME_PP};
use crate::catalog::{Catalog, SearchQuery};
use crate::config::SelectionConfig;
use crate::domain::{DifficultyTier, RankedStatus, SelectedBeatmap};
use crate::error::OsuApiError;
use crate::recent::RecentSelections;
use crate::selector::{select_from_search, TARGET_MODE};
use crate::skill::{estimate_stable_rating, RATING_FLOOR};

/// How many best scores feed the skill estimator.
pub const BEST_SCORES_LIMIT: usize = 10;

pub struct GenerationCycle<'a, C, R> {
  catalog: Option<&'a C>,
  config: &'a SelectionConfig,
  user_id: &'a str,
  recent: RecentSelections,
  rng: R,
  stable_top: Option<f64>,
}

impl<'a, C, R> GenerationCycle<'a, C, R>
where
  C: Catalog + Sync,
  R: Rng + Send,
{
  /// `catalog` is `None` when the osu! API is not configured; every tier then
  /// resolves to the default beatmap.
  pub fn new(catalog: Option<&'a C>, config: &'a SelectionConfig, user_id: &'a str, rng: R) -> Self {
    Self { catalog, config, user_id, recent: RecentSelections::new(), rng, stable_top: None }
  }

  pub fn recent(&self) -> &RecentSelections {
    &self.recent
  }

  /// Stable top rating of the cycle's user; upstream failures count as "no scores".
  async fn stable_top_rating(&mut self) -> f64 {
    if let Some(r) = self.stable_top {
      return r;
    }
    let rating = match self.catalog {
      Some(catalog) => match catalog.user_best_scores(self.user_id, BEST_SCORES_LIMIT).await {
        Ok(scores) => estimate_stable_rating(&scores),
        Err(e) => {
          warn!(target: "challenge", user_id = %self.user_id, error = %e, "Best scores unavailable; using rating floor");
          RATING_FLOOR
        }
      },
      None => RATING_FLOOR,
    };
    self.stable_top = Some(rating);
    rating
  }

  /// Produce one beatmap for `tier`. Always returns a beatmap.
  #[instrument(level = "info", skip(self), fields(user_id = %self.user_id))]
  pub async fn generate_challenge(&mut self, skill_rating: f64, tier: DifficultyTier) -> SelectedBeatmap {
    // The low-skill regime uses literal tables, so skip the scores lookup there.
    let stable_top = if skill_rating >= GENERAL_REGIME_PP {
      self.stable_top_rating().await
    } else {
      RATING_FLOOR
    };
    let band = compute_band(&self.config.bands, skill_rating, stable_top, tier);

    let query = SearchQuery {
      mode: TARGET_MODE,
      status: RankedStatus::Ranked,
      band,
      length: Some((self.config.min_length, self.config.max_length)),
      sort: Some(self.config.sort),
    };
    let search = match self.catalog {
      Some(catalog) => catalog.search(&query).await,
      None => Err(OsuApiError::Disabled),
    };

    let picked = select_from_search(search, &band, &mut self.recent, self.config.selection_window, &mut self.rng);
    info!(
      target: "challenge",
      %tier, stable_top, band_min = band.min, band_max = band.max,
      beatmap_id = picked.beatmap.id, fallback = picked.is_fallback(),
      "Challenge beatmap chosen"
    );
    picked
  }
}

/// Generate the EASY, NORMAL and HARD beatmaps of one daily set, in that order.
#[instrument(level = "info", skip(catalog, config, rng))]
pub async fn generate_daily_set<C, R>(
  catalog: Option<&C>,
  config: &SelectionConfig,
  skill_rating: f64,
  user_id: &str,
  rng: R,
) -> Vec<(DifficultyTier, SelectedBeatmap)>
where
  C: Catalog + Sync,
  R: Rng + Send,
{
  let mut cycle = GenerationCycle::new(catalog, config, user_id, rng);
  let mut out = Vec::with_capacity(DifficultyTier::ALL.len());
  for tier in DifficultyTier::ALL {
    let picked = cycle.generate_challenge(skill_rating, tier).await;
    out.push((tier, picked));
  }
  out
}
