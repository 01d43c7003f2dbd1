//! Tiny FIFO set of recently picked beatmapset ids.
//!
//! One instance lives for one generation cycle (the three tiers of a daily set)
//! so consecutive tiers do not land on the same beatmapset.

use std::collections::VecDeque;

pub const RECENT_CAPACITY: usize = 2;

#[derive(Clone, Debug, Default)]
pub struct RecentSelections {
  ids: VecDeque<u64>,
}

impl RecentSelections {
  pub fn new() -> Self {
    Self { ids: VecDeque::with_capacity(RECENT_CAPACITY) }
  }

  /// Insert a set id; past capacity the earliest insertion is evicted.
  /// Re-adding a present id leaves its position unchanged.
  pub fn add(&mut self, id: u64) {
    if self.ids.contains(&id) {
      return;
    }
    if self.ids.len() == RECENT_CAPACITY {
      self.ids.pop_front();
    }
    self.ids.push_back(id);
  }

  pub fn contains(&self, id: u64) -> bool {
    self.ids.contains(&id)
  }

  pub fn clear(&mut self) {
    self.ids.clear();
  }

  pub fn len(&self) -> usize {
    self.ids.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids.is_empty()
  }
}
