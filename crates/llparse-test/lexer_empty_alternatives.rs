//! Scenario 6: a nullable LPR (one alternative matches nothing) can't match
//! the same zero-width span twice in a row; a repeat falls through to the
//! failure probe instead of spinning forever. At end-of-input, the nullable
//! alternative still gets one match before the end-of-input token.

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_core::symbol::Domain;

use crate::utils::{compile, lex_all, w_emit};

#[test]
fn nullable_alternative_alternates_with_failure_probing() {
  let g = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "A".into() });
    w_emit(w, Opcode::Lpr { name: "A".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "a".into() });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::Close);
  });

  let a = g.resolve("A").unwrap().0;
  let failure = Domain::Token.failure();
  let end = Domain::Token.end_of_input();

  let (seen, _) = lex_all(&g, "abaab");
  let got: Vec<(u32, usize, usize)> = seen.iter().map(|t| (t.id, t.byte_offset, t.byte_len)).collect();
  assert_eq!(
    got,
    vec![
      (a, 0, 1),
      (a, 1, 0),
      (failure, 1, 1),
      (a, 2, 1),
      (a, 3, 1),
      (a, 4, 0),
      (failure, 4, 1),
      (a, 5, 0),
      (end, 5, 0),
    ]
  );
}
