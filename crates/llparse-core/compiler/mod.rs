//! The grammar compiler: opcode stream -> validated, lowered parse tables
//! -> FIRST/FOLLOW/prefix sets -> mapping and ambiguity detection.

pub mod charset;
pub mod lower;
pub mod sets;
pub mod validate;

use std::collections::HashMap;

use crate::diagnostics::Report;
use crate::llspec::LlSpec;
use crate::parse_table::ParseTable;
use crate::symbol::{Domain, Id};

pub struct CompileOutput {
  pub report: Report,
  pub lpr_table: ParseTable,
  pub ppr_table: ParseTable,
  pub names: HashMap<String, (Id, Domain)>,
}

/// Runs the full pipeline over one opcode stream. The two tables are always
/// returned (a caller doing incremental diagnostics may still want to
/// inspect what lowered); `report.has_errors()` says whether they're fit to
/// build a `Grammar` from.
pub fn compile(spec: &LlSpec) -> CompileOutput {
  let lowered = lower::Lowerer::new().run(spec);
  let mut report = lowered.report;
  let mut lpr_table = lowered.lpr_table;
  let mut ppr_table = lowered.ppr_table;

  sets::finalize(&mut lpr_table, &mut report);
  sets::finalize(&mut ppr_table, &mut report);

  CompileOutput { report, lpr_table, ppr_table, names: lowered.names }
}
