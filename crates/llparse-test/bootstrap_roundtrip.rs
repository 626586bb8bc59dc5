//! Scenario 10: the text form of scenario 1's grammar, translated through
//! the bootstrap grammar, produces the same lexer behaviour as scenario 1's
//! hand-built opcode stream.

use llparse_core::llspec::{Opcode, Qualifier};
use llparse_core::symbol::Domain;
use llparse_core::Grammar;

use crate::utils::{compile, lex_all, w_emit};

#[test]
fn text_grammar_matches_hand_built_opcode_stream() {
  let hand_built = compile(|w| {
    w_emit(w, Opcode::LprDecl { name: "A".into() });
    w_emit(w, Opcode::Lpr { name: "A".into(), qualifier: Qualifier::None });
    w_emit(w, Opcode::Alternative);
    w_emit(w, Opcode::String { text: "a".into() });
    w_emit(w, Opcode::Close);
  });

  let spec = llparse_bootstrap::translate::translate("t", "lexer A: 'a';").expect("text grammar should parse");
  let from_text = Grammar::compile(&spec).unwrap_or_else(|report| panic!("translated grammar failed to compile:\n{report}"));

  let a_hand = hand_built.resolve("A").unwrap().0;
  let a_text = from_text.resolve("A").unwrap().0;
  let end = Domain::Token.end_of_input();

  let (hand_tokens, _) = lex_all(&hand_built, "aaaa");
  let (text_tokens, _) = lex_all(&from_text, "aaaa");

  let norm = |tokens: &[llparse_runtime::Token], a_id: u32| -> Vec<(bool, usize, usize)> {
    tokens.iter().map(|t| (t.id == a_id, t.byte_offset, t.byte_len)).collect()
  };

  assert_eq!(norm(&hand_tokens, a_hand), norm(&text_tokens, a_text));
  assert_eq!(text_tokens.last().unwrap().id, end);
}
