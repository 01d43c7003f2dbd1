//! Beatmap selection: filter catalog candidates against a band and the recent
//! set, then pick one at random from the head of the list.
//!
//! Selection never fails. An empty filtered list or an unreachable catalog both
//! yield the default beatmap and reset the recent set, so a fruitless tier does
//! not handicap the next one.

use rand::Rng;
use tracing::{debug, warn};

use crate::domain::{BeatmapOrigin, CatalogItem, DifficultyBand, GameMode, RankedStatus, SelectedBeatmap};
use crate::error::OsuApiError;
use crate::recent::RecentSelections;
use crate::seeds::fallback_selection;

pub const TARGET_MODE: GameMode = GameMode::Osu;

fn is_eligible(item: &CatalogItem, band: &DifficultyBand, excluded: &RecentSelections) -> bool {
  item.mode == TARGET_MODE
    && item.status == RankedStatus::Ranked
    && band.contains(item.difficulty_rating)
    && !excluded.contains(item.beatmapset_id)
}

/// Pick uniformly among the first `window` eligible candidates and record the
/// chosen set in `excluded`.
pub fn select_beatmap<R: Rng + ?Sized>(
  candidates: &[CatalogItem],
  band: &DifficultyBand,
  excluded: &mut RecentSelections,
  window: usize,
  rng: &mut R,
) -> SelectedBeatmap {
  let eligible: Vec<&CatalogItem> = candidates.iter().filter(|c| is_eligible(c, band, excluded)).collect();

  if eligible.is_empty() {
    debug!(target: "challenge", candidates = candidates.len(), band_min = band.min, band_max = band.max, "No eligible beatmap; using default");
    excluded.clear();
    return fallback_selection();
  }

  let bound = eligible.len().min(window.max(1));
  let roll: f64 = rng.gen();
  // roll is in [0, 1); the min guards against float edge cases.
  let index = ((roll * bound as f64).floor() as usize).min(bound - 1);
  let chosen = eligible[index].clone();
  excluded.add(chosen.beatmapset_id);

  debug!(target: "challenge", eligible = eligible.len(), bound, index, beatmap_id = chosen.id, "Selected beatmap");
  SelectedBeatmap { beatmap: chosen, origin: BeatmapOrigin::Catalog }
}

/// Selection over a raw search outcome: upstream errors are absorbed here.
pub fn select_from_search<R: Rng + ?Sized>(
  search: Result<Vec<CatalogItem>, OsuApiError>,
  band: &DifficultyBand,
  excluded: &mut RecentSelections,
  window: usize,
  rng: &mut R,
) -> SelectedBeatmap {
  match search {
    Ok(candidates) => select_beatmap(&candidates, band, excluded, window, rng),
    Err(e) => {
      warn!(target: "challenge", error = %e, "Catalog search failed; using default beatmap");
      excluded.clear();
      fallback_selection()
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::mock::StepRng;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  use crate::seeds::default_beatmap;

  fn item(id: u64, set: u64, rating: f64) -> CatalogItem {
    CatalogItem {
      id,
      beatmapset_id: set,
      difficulty_rating: rating,
      total_length: 120,
      status: RankedStatus::Ranked,
      mode: GameMode::Osu,
      title: format!("song {set}"),
      artist: "artist".into(),
      version: format!("diff {id}"),
      creator: "mapper".into(),
      bpm: 180.0,
      cover_url: String::new(),
    }
  }

  fn band() -> DifficultyBand {
    DifficultyBand::new(2.0, 3.0)
  }

  #[test]
  fn empty_candidates_give_default() {
    let mut recent = RecentSelections::new();
    recent.add(5);
    let picked = select_beatmap(&[], &band(), &mut recent, 25, &mut StepRng::new(0, 0));
    assert!(picked.is_fallback());
    assert_eq!(picked.beatmap, default_beatmap());
    assert_eq!(picked.beatmap.id, 75);
    assert_eq!(picked.beatmap.difficulty_rating, 2.55);
    assert!(recent.is_empty());
  }

  #[test]
  fn filters_mode_status_band_and_recent() {
    let mut taiko = item(1, 10, 2.5);
    taiko.mode = GameMode::Taiko;
    let mut loved = item(2, 11, 2.5);
    loved.status = RankedStatus::Loved;
    let too_hard = item(3, 12, 3.01);
    let excluded_set = item(4, 13, 2.5);
    let good = item(5, 14, 3.0);

    let mut recent = RecentSelections::new();
    recent.add(13);
    let candidates = [taiko, loved, too_hard, excluded_set, good];
    let picked = select_beatmap(&candidates, &band(), &mut recent, 25, &mut StepRng::new(0, 0));
    assert_eq!(picked.beatmap.id, 5);
    assert_eq!(picked.origin, BeatmapOrigin::Catalog);
    assert!(recent.contains(14));
    assert!(recent.contains(13));
  }

  #[test]
  fn all_excluded_resets_tracker() {
    let mut recent = RecentSelections::new();
    recent.add(42);
    let candidates = [item(1, 42, 2.1), item(2, 42, 2.2)];
    let picked = select_beatmap(&candidates, &band(), &mut recent, 25, &mut StepRng::new(0, 0));
    assert!(picked.is_fallback());
    assert!(!recent.contains(42));
    assert!(recent.is_empty());
  }

  #[test]
  fn pick_stays_inside_window() {
    let candidates: Vec<_> = (0..100).map(|i| item(i, 1000 + i, 2.5)).collect();
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
      let mut recent = RecentSelections::new();
      let picked = select_beatmap(&candidates, &band(), &mut recent, 20, &mut rng);
      assert!(picked.beatmap.id < 20);
    }
  }

  #[test]
  fn same_seed_same_pick() {
    let candidates: Vec<_> = (0..30).map(|i| item(i, 500 + i, 2.5)).collect();
    let a = select_beatmap(&candidates, &band(), &mut RecentSelections::new(), 25, &mut StdRng::seed_from_u64(99));
    let b = select_beatmap(&candidates, &band(), &mut RecentSelections::new(), 25, &mut StdRng::seed_from_u64(99));
    assert_eq!(a, b);
  }

  #[test]
  fn max_roll_picks_last_in_window() {
    let candidates: Vec<_> = (0..5).map(|i| item(i, 300 + i, 2.5)).collect();
    let mut rng = StepRng::new(u64::MAX, 0);
    let picked = select_beatmap(&candidates, &band(), &mut RecentSelections::new(), 3, &mut rng);
    assert_eq!(picked.beatmap.id, 2);
  }

  #[test]
  fn search_error_is_absorbed() {
    let mut recent = RecentSelections::new();
    recent.add(1);
    let err = OsuApiError::Status { status: 503, message: "down".into() };
    let picked = select_from_search(Err(err), &band(), &mut recent, 25, &mut StepRng::new(0, 0));
    assert!(picked.is_fallback());
    assert!(recent.is_empty());
  }
}
