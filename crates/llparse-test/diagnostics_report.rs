//! Scenario 9: a deliberately malformed opcode stream accumulates one
//! diagnostic per structural error and yields no grammar.

use llparse_core::llspec::{Opcode, Qualifier, Writer};
use llparse_core::Grammar;

use crate::utils::w_emit;

#[test]
fn malformed_stream_reports_every_structural_error_and_builds_nothing() {
  let mut w = Writer::new();
  w_emit(&mut w, Opcode::LprDecl { name: "A".into() });
  w_emit(&mut w, Opcode::Lpr { name: "A".into(), qualifier: Qualifier::None });
  w_emit(&mut w, Opcode::Alternative);
  w_emit(&mut w, Opcode::KleeneStar);
  w_emit(&mut w, Opcode::Charset { text: "a".into() });
  // illegal: a kleene_star body may not hold more than one alternative
  w_emit(&mut w, Opcode::Alternative);
  w_emit(&mut w, Opcode::Charset { text: "b".into() });
  w_emit(&mut w, Opcode::Close); // closes kleene_star
  w_emit(&mut w, Opcode::Close); // closes the lpr
  w_emit(&mut w, Opcode::Close); // stray: nothing left open

  let spec = w.finish();
  let report = Grammar::compile(&spec).expect_err("malformed stream must not produce a grammar");

  assert!(report.error_count() >= 2, "expected at least two diagnostics, got:\n{report}");
}
