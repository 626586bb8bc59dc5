//! A range-compressed set of symbol IDs, plus an `epsilon` flag for use in
//! FIRST/FOLLOW/prefix computation. Equivalent IDs are always stored as a
//! sorted, disjoint, maximally-merged vector of `(low, high)` pairs, so
//! that `includes_id` can binary-search rather than scan.

use crate::symbol::{Domain, Id};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SymbolSet {
  domain: Domain,
  ranges: Vec<(Id, Id)>,
  epsilon: bool,
}

impl SymbolSet {
  pub fn new(domain: Domain) -> Self {
    Self { domain, ranges: Vec::new(), epsilon: false }
  }

  pub fn epsilon_only(domain: Domain) -> Self {
    Self { domain, ranges: Vec::new(), epsilon: true }
  }

  pub fn domain(&self) -> Domain {
    self.domain
  }

  pub fn has_epsilon(&self) -> bool {
    self.epsilon
  }

  pub fn set_epsilon(&mut self, value: bool) {
    self.epsilon = value;
  }

  /// Number of non-epsilon elements in the set.
  pub fn len(&self) -> u64 {
    self.ranges.iter().map(|&(lo, hi)| (hi - lo) as u64 + 1).sum()
  }

  pub fn is_empty(&self) -> bool {
    self.ranges.is_empty()
  }

  pub fn ranges(&self) -> &[(Id, Id)] {
    &self.ranges
  }

  pub fn add_id(&mut self, id: Id) {
    self.add_range(id, id);
  }

  pub fn add_range(&mut self, low: Id, high: Id) {
    assert!(low <= high);
    self.ranges.push((low, high));
    self.ranges.sort_unstable_by_key(|&(lo, _)| lo);
    let mut merged: Vec<(Id, Id)> = Vec::with_capacity(self.ranges.len());
    for &(lo, hi) in &self.ranges {
      if let Some(last) = merged.last_mut() {
        if lo <= last.1.saturating_add(1) {
          last.1 = last.1.max(hi);
          continue;
        }
      }
      merged.push((lo, hi));
    }
    self.ranges = merged;
  }

  pub fn add_set(&mut self, other: &SymbolSet) {
    for &(lo, hi) in &other.ranges {
      self.add_range(lo, hi);
    }
    self.epsilon = self.epsilon || other.epsilon;
  }

  pub fn remove_id(&mut self, id: Id) {
    self.remove_range(id, id);
  }

  pub fn remove_range(&mut self, low: Id, high: Id) {
    assert!(low <= high);
    let mut remaining = Vec::with_capacity(self.ranges.len());
    for &(rl, rh) in &self.ranges {
      if rh < low || rl > high {
        remaining.push((rl, rh));
        continue;
      }
      if rl < low {
        remaining.push((rl, low - 1));
      }
      if rh > high {
        remaining.push((high + 1, rh));
      }
    }
    self.ranges = remaining;
  }

  pub fn remove_set(&mut self, other: &SymbolSet) {
    for &(lo, hi) in &other.ranges {
      self.remove_range(lo, hi);
    }
    if other.epsilon {
      self.epsilon = false;
    }
  }

  pub fn includes_id(&self, id: Id) -> bool {
    self.ranges.binary_search_by(|&(lo, hi)| if id < lo { std::cmp::Ordering::Greater } else if id > hi { std::cmp::Ordering::Less } else { std::cmp::Ordering::Equal }).is_ok()
  }

  pub fn includes_range(&self, low: Id, high: Id) -> bool {
    assert!(low <= high);
    match self.ranges.binary_search_by(|&(lo, hi)| if low < lo { std::cmp::Ordering::Greater } else if low > hi { std::cmp::Ordering::Less } else { std::cmp::Ordering::Equal }) {
      Ok(idx) => self.ranges[idx].1 >= high,
      Err(_) => false,
    }
  }

  pub fn includes_set(&self, other: &SymbolSet) -> bool {
    if other.epsilon && !self.epsilon {
      return false;
    }
    other.ranges.iter().all(|&(lo, hi)| self.includes_range(lo, hi))
  }

  /// Complement relative to the full legal terminal range of this set's
  /// domain (which includes the end-of-input sentinel), with epsilon
  /// flipped.
  pub fn inverse(&self) -> SymbolSet {
    let (dom_lo, dom_hi) = self.domain.terminal_domain();
    let mut out = Vec::new();
    let mut cursor = dom_lo;
    let mut exhausted = false;
    for &(lo, hi) in &self.ranges {
      if lo > cursor {
        out.push((cursor, lo - 1));
      }
      if hi >= dom_hi {
        exhausted = true;
        break;
      }
      cursor = hi + 1;
    }
    if !exhausted && cursor <= dom_hi {
      out.push((cursor, dom_hi));
    }
    SymbolSet { domain: self.domain, ranges: out, epsilon: !self.epsilon }
  }

  pub fn union(&self, other: &SymbolSet) -> SymbolSet {
    let mut out = self.clone();
    out.add_set(other);
    out
  }

  pub fn difference(&self, other: &SymbolSet) -> SymbolSet {
    let mut out = self.clone();
    out.remove_set(other);
    out
  }

  /// Ascending iteration over IDs in the set. Epsilon is never yielded.
  pub fn iter(&self) -> impl Iterator<Item = Id> + '_ {
    self.ranges.iter().flat_map(|&(lo, hi)| lo..=hi)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn glyph() -> SymbolSet {
    SymbolSet::new(Domain::Glyph)
  }

  #[test]
  fn add_merges_adjacent_and_overlapping() {
    let mut s = glyph();
    s.add_range(10, 20);
    s.add_range(21, 30);
    s.add_range(5, 9);
    assert_eq!(s.ranges(), &[(5, 30)]);
  }

  #[test]
  fn remove_splits_interior_range() {
    let mut s = glyph();
    s.add_range(0, 100);
    s.remove_range(40, 50);
    assert_eq!(s.ranges(), &[(0, 39), (51, 100)]);
  }

  #[test]
  fn remove_shrinks_from_either_edge() {
    let mut s = glyph();
    s.add_range(0, 100);
    s.remove_range(0, 10);
    assert_eq!(s.ranges(), &[(11, 100)]);
    s.remove_range(90, 100);
    assert_eq!(s.ranges(), &[(11, 89)]);
  }

  #[test]
  fn includes_checks() {
    let mut s = glyph();
    s.add_range(10, 20);
    s.add_range(30, 40);
    assert!(s.includes_id(15));
    assert!(!s.includes_id(25));
    assert!(s.includes_range(10, 20));
    assert!(!s.includes_range(10, 21));
    assert!(!s.includes_range(18, 35));
  }

  #[test]
  fn inverse_round_trips() {
    let mut s = glyph();
    s.add_range(10, 20);
    s.add_range(1000, 2000);
    s.set_epsilon(true);
    let inv = s.inverse();
    assert!(!inv.includes_id(15));
    assert!(inv.includes_id(0));
    assert!(!inv.has_epsilon());
    let back = inv.inverse();
    assert_eq!(back, s);
  }

  #[test]
  fn inverse_of_empty_is_whole_domain() {
    let s = glyph();
    let inv = s.inverse();
    let (lo, hi) = Domain::Glyph.terminal_domain();
    assert_eq!(inv.ranges(), &[(lo, hi)]);
    assert!(inv.has_epsilon());
  }

  #[test]
  fn inverse_of_whole_domain_is_empty() {
    let mut s = glyph();
    let (lo, hi) = Domain::Glyph.terminal_domain();
    s.add_range(lo, hi);
    let inv = s.inverse();
    assert!(inv.is_empty());
  }

  #[test]
  fn union_and_difference_are_idempotent() {
    let mut s = glyph();
    s.add_range(0, 50);
    assert_eq!(s.union(&s), s);
    let empty = glyph();
    assert_eq!(s.difference(&s), empty);
  }

  #[test]
  fn iter_is_ascending() {
    let mut s = glyph();
    s.add_range(5, 7);
    s.add_range(20, 21);
    assert_eq!(s.iter().collect::<Vec<_>>(), vec![5, 6, 7, 20, 21]);
  }
}
