//! Scenario 11: the REPL's `exit` line terminates cleanly without ever
//! invoking the parser driver.

use std::process::ExitCode;

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_cli::{handle_line, run_repl, LineOutcome};

use crate::utils::{compile, w_emit};

fn start_grammar() -> llparse_core::Grammar {
  compile(|w| {
    w_emit(w, Opcode::PprDecl { name: "Start".into() });
    w_emit(w, Opcode::Ppr { name: "Start".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::End);
    w_emit(w, Opcode::Close);
  })
}

#[test]
fn handle_line_short_circuits_on_exit_without_parsing() {
  let g = start_grammar();
  assert_eq!(handle_line(&g, "exit"), LineOutcome::Exit);
}

#[test]
fn run_repl_stops_on_exit_line_with_no_parse_result_printed() {
  let g = start_grammar();
  // a line after `exit` that would otherwise need a real parse attempt;
  // its presence in the output would mean the loop kept going past `exit`.
  let mut input: &[u8] = b"exit\nnonsense\n";
  let mut output = Vec::new();
  let code = run_repl(&g, &mut input, &mut output);
  assert_eq!(format!("{code:?}"), format!("{:?}", ExitCode::SUCCESS));
  let text = String::from_utf8(output).unwrap();
  assert!(!text.contains("ok"), "exit must not report a parse result: {text:?}");
  assert!(!text.contains("parse failed"), "exit must not report a parse result: {text:?}");
}
