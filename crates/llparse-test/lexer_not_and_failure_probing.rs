//! Scenario 3: a `not` rule fails on its excluded character, and the
//! lexer's failure probe reports exactly the unmatched span.

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_core::symbol::Domain;

use crate::utils::{compile, lex_all, w_emit};

#[test]
fn not_excludes_one_char_and_failure_spans_the_unmatched_run() {
  let g = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "A".into() });
    w_emit(w, Opcode::Lpr { name: "A".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::Not);
    w_emit(w, Opcode::Charset { text: "a".into() });
    w_emit(w, Opcode::Close);
    w_emit(w, Opcode::Close);
  });

  let a = g.resolve("A").unwrap().0;
  let failure = Domain::Token.failure();
  let end = Domain::Token.end_of_input();

  let (seen, _) = lex_all(&g, "bbaabb");
  let got: Vec<(u32, usize, usize)> = seen.iter().map(|t| (t.id, t.byte_offset, t.byte_len)).collect();
  assert_eq!(got, vec![(a, 0, 1), (a, 1, 1), (failure, 2, 2), (a, 4, 1), (a, 5, 1), (end, 6, 0)]);
}
