//! The immutable grammar object produced by a successful compile: the two
//! parse tables plus the name resolution needed to find a start rule.

use std::collections::HashMap;

use crate::compiler;
use crate::diagnostics::Report;
use crate::llspec::{LlSpec, Qualifier};
use crate::parse_table::ParseTable;
use crate::symbol::{Domain, Id};

#[derive(Debug)]
pub struct Grammar {
  lpr_table: ParseTable,
  ppr_table: ParseTable,
  names: HashMap<String, (Id, Domain)>,
}

impl Grammar {
  /// Compiles `spec` end to end. Returns the grammar on success, or the
  /// accumulated diagnostics if any part of compilation failed.
  pub fn compile(spec: &LlSpec) -> Result<Grammar, Report> {
    let out = compiler::compile(spec);
    if out.report.has_errors() {
      return Err(out.report);
    }
    Ok(Grammar { lpr_table: out.lpr_table, ppr_table: out.ppr_table, names: out.names })
  }

  pub fn lpr_table(&self) -> &ParseTable {
    &self.lpr_table
  }

  pub fn ppr_table(&self) -> &ParseTable {
    &self.ppr_table
  }

  pub fn resolve(&self, name: &str) -> Option<(Id, Domain)> {
    self.names.get(name).copied()
  }

  /// Looks up the main non-terminal ID of a declared PPR, for seeding a
  /// parser driver's `parse(start_rule_name)`.
  pub fn start_ppr(&self, name: &str) -> Option<Id> {
    match self.resolve(name) {
      Some((id, Domain::Token)) => Some(id),
      _ => None,
    }
  }

  pub fn start_lpr(&self, name: &str) -> Option<Id> {
    match self.resolve(name) {
      Some((id, Domain::Glyph)) => Some(id),
      _ => None,
    }
  }

  /// All main (grammar-declared, non-helper, non-`support`) LPR IDs in
  /// declaration order: the entry points the lexer driver tries per §4.6.
  pub fn lpr_entry_points(&self) -> Vec<Id> {
    let mut ids: Vec<Id> = self.names.values().filter(|&&(_, d)| d == Domain::Glyph).map(|&(id, _)| id).collect();
    ids.sort_unstable();
    ids.retain(|&id| !self.lpr_table.is_helper(id) && !matches!(self.lpr_table.qualifier_of(id), Some(Qualifier::Support)));
    ids
  }

  pub fn lpr_qualifier(&self, id: Id) -> Option<Qualifier> {
    self.lpr_table.qualifier_of(id)
  }
}

pub type RuleQualifier = Qualifier;
