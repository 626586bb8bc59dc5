//! Scenario 1: a single literal-string LPR tokenizes a repeated input.

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_core::symbol::Domain;

use crate::utils::{compile, w_emit};

#[test]
fn repeats_single_char_token_to_end_of_input() {
  let g = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "A".into() });
    w_emit(w, Opcode::Lpr { name: "A".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "a".into() });
    w_emit(w, Opcode::Close);
  });

  let a = g.resolve("A").unwrap().0;
  let (seen, _) = crate::utils::lex_all(&g, "aaaa");
  let end = Domain::Token.end_of_input();

  let got: Vec<(u32, usize, usize)> = seen.iter().map(|t| (t.id, t.byte_offset, t.byte_len)).collect();
  assert_eq!(got, vec![(a, 0, 1), (a, 1, 1), (a, 2, 1), (a, 3, 1), (end, 4, 0)]);
}
