//! The parse-table data model shared by the lexer table and the parser
//! table: a set of numbered rules, each a sequence of terms, plus a
//! `(nonterminal, group) -> rule index` mapping built from Prefix sets.

use std::collections::HashMap;

use crate::id_grouper::{GroupId, IdGrouper};
use crate::llspec::Qualifier;
use crate::symbol::{Domain, Id};
use crate::symbol_set::SymbolSet;

/// One element of a rule's right-hand side.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Term {
  /// Matches a single ID in `[low, high]`. An assertion term does not
  /// consume input or emit output; it only constrains what follows.
  Terminal { low: Id, high: Id, assertion: bool },
  /// A reference to another non-terminal, carrying the precedence value
  /// propagated into it (0 for non-precedence contexts).
  NonterminalRef { id: Id, preced_val: u32 },
  /// A reference whose precedence value is not a fixed constant but is
  /// inherited from whatever `preced_val` the enclosing rule's own
  /// invocation received. Used only by a precedence PPR's continuation-loop
  /// helper, to thread its climbing level down without a separate rule per
  /// level. Always rewritten to a plain `NonterminalRef` before it reaches
  /// the stack.
  NonterminalRefInherit { id: Id },
  /// A precedence guard: if `preced_val <= preced_max` fails, everything up
  /// to and including the next `Pylon` is discarded at parse time.
  PrecedencePredicate { preced_max: u32, preced_val: u32 },
  /// Marks the boundary a failed `PrecedencePredicate` unwinds to.
  Pylon,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct Rule {
  pub terms: Vec<Term>,
}

impl Rule {
  pub fn new() -> Self {
    Self::default()
  }
}

/// Whether a non-terminal is a "main" rule the grammar author named, or a
/// "helper" synthesized while lowering a composite expression. Helpers are
/// transparent to the parsing engine: they don't emit begin/end events and
/// don't increase stack depth.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum NontermKind {
  Main,
  Helper,
}

#[derive(Clone, Debug, Default)]
pub struct NontermInfo {
  pub name: Option<String>,
  pub kind: Option<NontermKind>,
  pub qualifier: Option<Qualifier>,
  pub rules: Vec<usize>,
  pub first: Option<SymbolSet>,
  pub follow: Option<SymbolSet>,
  pub prefix: Option<SymbolSet>,
}

/// One of the two tables the compiler builds (lexer or parser). Owns every
/// rule produced for non-terminals in its domain, the grouper used to
/// compress its terminal alphabet, and the `(nonterminal, group) -> rule`
/// mapping used to drive a parse.
#[derive(Debug)]
pub struct ParseTable {
  domain: Domain,
  rules: Vec<Rule>,
  nonterms: HashMap<Id, NontermInfo>,
  grouper: IdGrouper,
  mapping: HashMap<(Id, GroupId), usize>,
  collisions: Vec<(Id, GroupId)>,
}

impl ParseTable {
  pub fn new(domain: Domain) -> Self {
    Self {
      domain,
      rules: Vec::new(),
      nonterms: HashMap::new(),
      grouper: IdGrouper::new(domain),
      mapping: HashMap::new(),
      collisions: Vec::new(),
    }
  }

  pub fn domain(&self) -> Domain {
    self.domain
  }

  pub fn grouper(&self) -> &IdGrouper {
    &self.grouper
  }

  pub fn grouper_mut(&mut self) -> &mut IdGrouper {
    &mut self.grouper
  }

  pub fn add_rule(&mut self, nonterm: Id, rule: Rule) -> usize {
    let idx = self.rules.len();
    self.rules.push(rule);
    let info = self.nonterms.entry(nonterm).or_default();
    info.rules.push(idx);
    idx
  }

  pub fn rule(&self, idx: usize) -> &Rule {
    &self.rules[idx]
  }

  pub fn rule_mut(&mut self, idx: usize) -> &mut Rule {
    &mut self.rules[idx]
  }

  pub fn rule_count(&self) -> usize {
    self.rules.len()
  }

  pub fn nonterm_info(&self, id: Id) -> Option<&NontermInfo> {
    self.nonterms.get(&id)
  }

  pub fn nonterm_info_mut(&mut self, id: Id) -> &mut NontermInfo {
    self.nonterms.entry(id).or_default()
  }

  pub fn nonterm_ids(&self) -> impl Iterator<Item = Id> + '_ {
    self.nonterms.keys().copied()
  }

  pub fn set_name(&mut self, id: Id, name: String, kind: NontermKind) {
    let info = self.nonterms.entry(id).or_default();
    info.name = Some(name);
    info.kind = Some(kind);
  }

  pub fn set_qualifier(&mut self, id: Id, qualifier: Qualifier) {
    self.nonterms.entry(id).or_default().qualifier = Some(qualifier);
  }

  pub fn qualifier_of(&self, id: Id) -> Option<Qualifier> {
    self.nonterms.get(&id)?.qualifier
  }

  pub fn is_helper(&self, id: Id) -> bool {
    matches!(self.nonterms.get(&id).and_then(|i| i.kind), Some(NontermKind::Helper))
  }

  pub fn name_of(&self, id: Id) -> Option<&str> {
    self.nonterms.get(&id)?.name.as_deref()
  }

  /// FIRST(id), populated by `compiler::sets::finalize`. `None` before
  /// finalization has run.
  pub fn first_of(&self, id: Id) -> Option<&SymbolSet> {
    self.nonterms.get(&id)?.first.as_ref()
  }

  /// FOLLOW(id): the complement of non-epsilon FIRST(id) within the table's
  /// terminal domain. Populated by `compiler::sets::finalize`.
  pub fn follow_of(&self, id: Id) -> Option<&SymbolSet> {
    self.nonterms.get(&id)?.follow.as_ref()
  }

  /// Prefix(id): FIRST(id) widened with FOLLOW(id) when `id` is nullable,
  /// used to build the rule-dispatch mapping. Populated by
  /// `compiler::sets::finalize`.
  pub fn prefix_of(&self, id: Id) -> Option<&SymbolSet> {
    self.nonterms.get(&id)?.prefix.as_ref()
  }

  /// Inserts `(nonterm, group) -> rule` for every group covered by `prefix`.
  /// Collisions are recorded rather than overwriting the existing entry.
  pub fn map_rule(&mut self, nonterm: Id, rule_idx: usize, prefix: &SymbolSet) {
    let groups: Vec<GroupId> = prefix.ranges().iter().flat_map(|&(lo, hi)| {
      let mut ids = Vec::new();
      let mut cur = lo;
      loop {
        let (glo, ghi) = self.grouper.get_symbol_range(self.grouper.get_group_id(cur));
        ids.push(self.grouper.get_group_id(cur));
        if ghi >= hi {
          break;
        }
        cur = ghi.max(glo) + 1;
      }
      ids
    }).collect();

    for g in groups {
      let key = (nonterm, g);
      if self.mapping.contains_key(&key) {
        self.collisions.push(key);
        continue;
      }
      self.mapping.insert(key, rule_idx);
    }
  }

  pub fn lookup(&self, nonterm: Id, input_id: Id) -> Option<usize> {
    let g = self.grouper.get_group_id(input_id);
    self.mapping.get(&(nonterm, g)).copied()
  }

  pub fn collisions(&self) -> &[(Id, GroupId)] {
    &self.collisions
  }
}
