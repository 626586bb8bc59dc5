//! Collapses the (potentially enormous) terminal domain of a table into a
//! bounded number of "groups", so that a parse-table mapping keyed on
//! `(nonterminal, group)` doesn't need one column per Unicode code point.
//!
//! The grouper starts as a single cell spanning the whole terminal domain.
//! Each `add_use_case(low, high)` cuts the partition so that `[low, high]`
//! becomes the union of whole cells, never splitting a use-case range
//! across a column boundary. All use cases must be added before
//! `get_group_id`/`get_symbol_range` are called.

use crate::symbol::{Domain, Id};

pub type GroupId = usize;

#[derive(Clone, Debug)]
pub struct IdGrouper {
  domain: Domain,
  ranges: Vec<(Id, Id)>,
}

impl IdGrouper {
  pub fn new(domain: Domain) -> Self {
    let (lo, hi) = domain.terminal_domain();
    Self { domain, ranges: vec![(lo, hi)] }
  }

  pub fn domain(&self) -> Domain {
    self.domain
  }

  pub fn group_count(&self) -> usize {
    self.ranges.len()
  }

  pub fn add_use_case(&mut self, low: Id, high: Id) {
    assert!(low <= high);
    let mut i = 0usize;
    while i < self.ranges.len() {
      let (rlo, rhi) = self.ranges[i];
      let in_range = |x: Id| x >= rlo && x <= rhi;
      let has_low = in_range(low) && low != rlo;
      let has_high = in_range(high) && high != rhi;
      let may_exit = in_range(high);

      if has_low && has_high {
        self.ranges.splice(i..=i, [(rlo, low - 1), (low, high), (high + 1, rhi)]);
      } else if has_low {
        self.ranges.splice(i..=i, [(rlo, low - 1), (low, rhi)]);
      } else if has_high {
        self.ranges.splice(i..=i, [(rlo, high), (high + 1, rhi)]);
      }

      if may_exit {
        break;
      }
      i += 1;
    }
  }

  pub fn get_group_id(&self, id: Id) -> GroupId {
    self
      .ranges
      .binary_search_by(|&(lo, hi)| if id < lo { std::cmp::Ordering::Greater } else if id > hi { std::cmp::Ordering::Less } else { std::cmp::Ordering::Equal })
      .expect("id must be legal for this grouper's domain")
  }

  pub fn get_symbol_range(&self, group: GroupId) -> (Id, Id) {
    self.ranges[group]
  }
}
