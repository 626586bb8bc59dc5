//! FIRST / FOLLOW / Prefix computation and the mapping + ambiguity pass
//! that runs once lowering has produced every rule of a table.

use std::collections::HashMap;

use crate::diagnostics::{Diagnostic, Report};
use crate::llspec::SourcePos;
use crate::parse_table::{ParseTable, Term};
use crate::symbol::{Domain, Id};
use crate::symbol_set::SymbolSet;

/// FIRST of a term sequence, given the current (possibly partial) FIRST
/// estimate for every non-terminal. Precedence predicates and pylons are
/// transparent: they neither consume input nor block further terms from
/// contributing.
fn seq_first(terms: &[Term], domain: Domain, first_of: &HashMap<Id, SymbolSet>) -> SymbolSet {
  let mut out = SymbolSet::new(domain);
  for term in terms {
    match term {
      Term::Terminal { low, high, .. } => {
        out.add_range(*low, *high);
        return out;
      }
      Term::NonterminalRef { id, .. } | Term::NonterminalRefInherit { id } => {
        let f = first_of.get(id).cloned().unwrap_or_else(|| SymbolSet::new(domain));
        let nullable = f.has_epsilon();
        out.add_set(&f);
        out.set_epsilon(false);
        if !nullable {
          return out;
        }
      }
      Term::PrecedencePredicate { .. } | Term::Pylon => continue,
    }
  }
  out.set_epsilon(true);
  out
}

fn compute_first(table: &ParseTable) -> HashMap<Id, SymbolSet> {
  let domain = table.domain();
  let ids: Vec<Id> = table.nonterm_ids().collect();
  let mut first: HashMap<Id, SymbolSet> = ids.iter().map(|&id| (id, SymbolSet::new(domain))).collect();

  loop {
    let mut changed = false;
    for &id in &ids {
      let info = table.nonterm_info(id).expect("id came from nonterm_ids()");
      let mut merged = SymbolSet::new(domain);
      for &ridx in &info.rules {
        let f = seq_first(&table.rule(ridx).terms, domain, &first);
        merged.add_set(&f);
      }
      if first.get(&id) != Some(&merged) {
        changed = true;
        first.insert(id, merged);
      }
    }
    if !changed {
      break;
    }
  }
  first
}

/// Computes FIRST/FOLLOW/Prefix for every non-terminal, builds the grouper's
/// use cases from each rule's own prefix set, and populates the
/// `(nonterminal, group) -> rule` mapping. Ambiguities (mapping collisions,
/// or a rule whose prefix is empty without epsilon) are reported but do not
/// stop the pass from finishing, so the caller sees every ambiguity in one
/// compile.
pub fn finalize(table: &mut ParseTable, report: &mut Report) {
  let domain = table.domain();
  let first = compute_first(table);
  let ids: Vec<Id> = table.nonterm_ids().collect();

  let follow: HashMap<Id, SymbolSet> = first.iter().map(|(&id, f)| (id, f.inverse())).collect();

  let mut rule_prefixes: Vec<(Id, usize, SymbolSet)> = Vec::new();
  for &id in &ids {
    let f = first.get(&id).cloned().unwrap_or_else(|| SymbolSet::new(domain));
    let fo = follow.get(&id).cloned().unwrap_or_else(|| SymbolSet::new(domain));
    let prefix = if f.has_epsilon() { f.union(&fo) } else { f.clone() };

    let rule_idxs = table.nonterm_info(id).expect("id came from nonterm_ids()").rules.clone();
    for ridx in rule_idxs {
      let rule_first = seq_first(&table.rule(ridx).terms, domain, &first);
      let rule_prefix = if rule_first.has_epsilon() { rule_first.union(&fo) } else { rule_first };
      for &(lo, hi) in rule_prefix.ranges() {
        table.grouper_mut().add_use_case(lo, hi);
      }
      rule_prefixes.push((id, ridx, rule_prefix));
    }

    let info = table.nonterm_info_mut(id);
    info.first = Some(f);
    info.follow = Some(fo);
    info.prefix = Some(prefix);
  }

  for (id, ridx, prefix) in rule_prefixes {
    if prefix.is_empty() && !prefix.has_epsilon() {
      let name = table.name_of(id).unwrap_or("?").to_string();
      report.push(Diagnostic::IllegalAmbiguity { at: SourcePos::synthetic(), nonterm: name });
      continue;
    }
    table.map_rule(id, ridx, &prefix);
  }

  for &(id, _group) in table.collisions() {
    let name = table.name_of(id).unwrap_or("?").to_string();
    report.push(Diagnostic::IllegalAmbiguity { at: SourcePos::synthetic(), nonterm: name });
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::parse_table::Rule;

  #[test]
  fn nullable_rule_contributes_epsilon() {
    let mut t = ParseTable::new(Domain::Glyph);
    let a = 1000;
    t.add_rule(a, Rule { terms: vec![] });
    let first = compute_first(&t);
    assert!(first[&a].has_epsilon());
  }

  #[test]
  fn terminal_rule_blocks_epsilon() {
    let mut t = ParseTable::new(Domain::Glyph);
    let a = 1000;
    t.add_rule(a, Rule { terms: vec![Term::Terminal { low: 10, high: 10, assertion: false }] });
    let first = compute_first(&t);
    assert!(!first[&a].has_epsilon());
    assert!(first[&a].includes_id(10));
  }

  #[test]
  fn finalize_maps_simple_rule() {
    let mut t = ParseTable::new(Domain::Glyph);
    let a = 1000;
    let idx = t.add_rule(a, Rule { terms: vec![Term::Terminal { low: 10, high: 20, assertion: false }] });
    let mut report = Report::new();
    finalize(&mut t, &mut report);
    assert!(!report.has_errors());
    assert_eq!(t.lookup(a, 15), Some(idx));
  }

  fn ranges_overlap(a: &[(Id, Id)], b: &[(Id, Id)]) -> bool {
    a.iter().any(|&(alo, ahi)| b.iter().any(|&(blo, bhi)| alo <= bhi && blo <= ahi))
  }

  /// Invariant 1: FIRST(A) ∪ FOLLOW(A) covers the whole terminal domain, and
  /// FIRST(A) ∩ FOLLOW(A) is empty (the two sets are complements by
  /// construction; epsilon is the only place they're allowed to differ on
  /// that score, and only one of them may carry it). Checked against a
  /// two-rule grammar with both a nullable non-terminal (`A : 'a' A | ;`)
  /// and a non-nullable one that depends on it (`B : A 'b'`), matching the
  /// shape of a precedence PPR's base/loop-helper split.
  #[test]
  fn finalize_first_and_follow_partition_the_domain() {
    let mut t = ParseTable::new(Domain::Glyph);
    let a = 1000;
    let b = 1001;
    t.add_rule(a, Rule { terms: vec![] });
    t.add_rule(a, Rule { terms: vec![Term::Terminal { low: 10, high: 10, assertion: false }, Term::NonterminalRef { id: a, preced_val: 0 }] });
    t.add_rule(b, Rule { terms: vec![Term::NonterminalRef { id: a, preced_val: 0 }, Term::Terminal { low: 20, high: 20, assertion: false }] });

    let mut report = Report::new();
    finalize(&mut t, &mut report);
    assert!(!report.has_errors());

    let (dom_lo, dom_hi) = Domain::Glyph.terminal_domain();
    for &id in &[a, b] {
      let first = t.first_of(id).expect("finalize populates FIRST");
      let follow = t.follow_of(id).expect("finalize populates FOLLOW");

      assert!(
        first.union(follow).includes_range(dom_lo, dom_hi),
        "FIRST({id}) union FOLLOW({id}) must cover the whole terminal domain"
      );
      assert!(
        !ranges_overlap(first.ranges(), follow.ranges()),
        "FIRST({id}) and FOLLOW({id}) must not share a non-epsilon terminal"
      );
    }

    assert!(t.first_of(a).unwrap().has_epsilon(), "A is nullable");
    assert!(!t.follow_of(a).unwrap().has_epsilon(), "FOLLOW is the complement of non-epsilon FIRST");
    assert!(!t.first_of(b).unwrap().has_epsilon(), "B always consumes at least 'a' or 'b'");
  }
}
