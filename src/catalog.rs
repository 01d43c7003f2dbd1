//! The external beatmap catalog as seen by challenge generation.
//!
//! `OsuClient` is the production implementation; tests plug in fakes.

use std::future::Future;

use serde::Deserialize;

use crate::domain::{CatalogItem, DifficultyBand, GameMode, RankedStatus, ScoreSample, UserSummary};
use crate::util::{ceil_to_cents, floor_to_cents};
use crate::error::OsuApiError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSort {
  PlaysDesc,
  RankedDesc,
  DifficultyAsc,
}

impl SearchSort {
  pub fn as_param(&self) -> &'static str {
    match self {
      SearchSort::PlaysDesc => "plays_desc",
      SearchSort::RankedDesc => "ranked_desc",
      SearchSort::DifficultyAsc => "difficulty_asc",
    }
  }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
  pub mode: GameMode,
  pub status: RankedStatus,
  pub band: DifficultyBand,
  /// Inclusive (min, max) length in seconds.
  pub length: Option<(u32, u32)>,
  pub sort: Option<SearchSort>,
}

impl SearchQuery {
  /// Search-syntax filter string, e.g. `stars>=2.00 stars<=2.30 length>=60 length<=300`.
  /// Star bounds are rounded outwards so the upstream filter never drops a
  /// beatmap the local band accepts.
  pub fn filter_text(&self) -> String {
    let mut q = format!("stars>={:.2} stars<={:.2}", floor_to_cents(self.band.min), ceil_to_cents(self.band.max));
    if let Some((min, max)) = self.length {
      q.push_str(&format!(" length>={} length<={}", min, max));
    }
    q
  }
}

pub trait Catalog {
  /// Flattened playable difficulties matching the query, in upstream order.
  fn search(&self, query: &SearchQuery) -> impl Future<Output = Result<Vec<CatalogItem>, OsuApiError>> + Send;

  /// Username and current pp of a user.
  fn user_summary(&self, user_id: &str) -> impl Future<Output = Result<UserSummary, OsuApiError>> + Send;

  /// Best scores of a user, best first.
  fn user_best_scores(&self, user_id: &str, limit: usize) -> impl Future<Output = Result<Vec<ScoreSample>, OsuApiError>> + Send;
}
