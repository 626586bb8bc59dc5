//! Scenario 2 (skip tokens, observer visibility) and scenario 4
//! (longest-match-wins across competing LPRs).

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_core::symbol::Domain;

use crate::utils::{compile, lex_all, w_emit};

#[test]
fn skip_tokens_are_hidden_from_the_token_stream_but_not_the_observer() {
  let g = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "A".into() });
    w_emit(w, Opcode::LprDecl { name: "B".into() });
    w_emit(w, Opcode::Lpr { name: "A".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "a".into() });
    w_emit(w, Opcode::Close);
    w_emit(w, Opcode::Lpr { name: "B".into(), qualifier: Qualifier::Skip });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "b".into() });
    w_emit(w, Opcode::Close);
  });

  let a = g.resolve("A").unwrap().0;
  let b = g.resolve("B").unwrap().0;
  let end = Domain::Token.end_of_input();

  let (seen, skipped) = lex_all(&g, "aababbaba");

  let got: Vec<(u32, usize)> = seen.iter().map(|t| (t.id, t.byte_offset)).collect();
  assert_eq!(got, vec![(a, 0), (a, 1), (a, 3), (a, 6), (a, 8), (end, 9)]);

  let skip_offsets: Vec<usize> = skipped.iter().filter(|t| t.id == b).map(|t| t.byte_offset).collect();
  assert_eq!(skip_offsets, vec![2, 4, 5, 7]);
}

#[test]
fn longest_match_wins_among_competing_lprs() {
  let g = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "A1".into() });
    w_emit(w, Opcode::LprDecl { name: "A2".into() });
    w_emit(w, Opcode::LprDecl { name: "B".into() });
    w_emit(w, Opcode::LprDecl { name: "C".into() });
    w_emit(w, Opcode::Lpr { name: "A1".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "a".into() });
    w_emit(w, Opcode::Close);
    w_emit(w, Opcode::Lpr { name: "A2".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "abc".into() });
    w_emit(w, Opcode::Close);
    w_emit(w, Opcode::Lpr { name: "B".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "b".into() });
    w_emit(w, Opcode::Close);
    w_emit(w, Opcode::Lpr { name: "C".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "c".into() });
    w_emit(w, Opcode::Close);
  });

  let a2 = g.resolve("A2").unwrap().0;
  let b = g.resolve("B").unwrap().0;

  let (seen, _) = lex_all(&g, "abcbbabc");
  let got: Vec<(u32, usize, usize)> = seen[..4].iter().map(|t| (t.id, t.byte_offset, t.byte_len)).collect();
  assert_eq!(got, vec![(a2, 0, 3), (b, 3, 1), (b, 4, 1), (a2, 5, 3)]);
}
