//! Built-in default content.

use crate::domain::{BeatmapOrigin, CatalogItem, GameMode, RankedStatus, SelectedBeatmap};

/// Absolute last-resort beatmap: served whenever a search yields nothing usable
/// or the catalog cannot be reached, so callers always get a playable map.
pub fn default_beatmap() -> CatalogItem {
  CatalogItem {
    id: 75,
    beatmapset_id: 1,
    difficulty_rating: 2.55,
    total_length: 142,
    status: RankedStatus::Ranked,
    mode: GameMode::Osu,
    title: "DISCO PRINCE".into(),
    artist: "Kenji Ninuma".into(),
    version: "Normal".into(),
    creator: "peppy".into(),
    bpm: 119.999,
    cover_url: "https://assets.ppy.sh/beatmaps/1/covers/cover.jpg".into(),
  }
}

pub fn fallback_selection() -> SelectedBeatmap {
  SelectedBeatmap { beatmap: default_beatmap(), origin: BeatmapOrigin::Fallback }
}
