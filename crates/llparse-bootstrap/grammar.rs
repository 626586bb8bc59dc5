//! The grammar that parses grammar-file text, built directly through the
//! `Writer` API rather than parsed from text (there being no earlier
//! grammar to parse it with). Compiled once and cached for the life of the
//! process.
//!
//! Text-grammar syntax covered, per the external text format:
//!   `lexer name: <body>;` / `parser name: <body>;` declare and define a
//!   rule in one statement. A body is `|`-separated alternatives, each a
//!   sequence of atoms. An atom is an identifier reference, a `'...'`
//!   string, a `[...]` charset, or one of the prefix forms `&atom`
//!   (lookahead), `-!atom` (lookahead-not), `!atom` (not); atoms may carry
//!   one postfix qualifier: `?`, `*`, `+`. `#` starts a line comment.

use std::sync::OnceLock;

use llparse_core::llspec::{LlSpec, Opcode, Qualifier, SourcePos, Writer};
use llparse_core::Grammar;

const POS: SourcePos = SourcePos::synthetic();

fn lpr_decl(w: &mut Writer, name: &str) {
  w.emit(POS, Opcode::LprDecl { name: name.to_string() });
}

fn ppr_decl(w: &mut Writer, name: &str) {
  w.emit(POS, Opcode::PprDecl { name: name.to_string() });
}

fn open_lpr(w: &mut Writer, name: &str, qualifier: Qualifier) {
  w.emit(POS, Opcode::Lpr { name: name.to_string(), qualifier });
}

fn open_ppr(w: &mut Writer, name: &str, qualifier: Qualifier) {
  w.emit(POS, Opcode::Ppr { name: name.to_string(), qualifier });
}

fn close(w: &mut Writer) {
  w.emit(POS, Opcode::Close);
}

fn alt(w: &mut Writer) {
  w.emit(POS, Opcode::Alternative);
}

fn name(w: &mut Writer, target: &str) {
  w.emit(POS, Opcode::Name { target: target.to_string() });
}

fn string(w: &mut Writer, text: &str) {
  w.emit(POS, Opcode::String { text: text.to_string() });
}

fn charset(w: &mut Writer, text: &str) {
  w.emit(POS, Opcode::Charset { text: text.to_string() });
}

fn kleene_star(w: &mut Writer, body: impl FnOnce(&mut Writer)) {
  w.emit(POS, Opcode::KleeneStar);
  body(w);
  close(w);
}

fn kleene_plus(w: &mut Writer, body: impl FnOnce(&mut Writer)) {
  w.emit(POS, Opcode::KleenePlus);
  body(w);
  close(w);
}

fn optional(w: &mut Writer, body: impl FnOnce(&mut Writer)) {
  w.emit(POS, Opcode::Optional);
  body(w);
  close(w);
}

fn not(w: &mut Writer, body: impl FnOnce(&mut Writer)) {
  w.emit(POS, Opcode::Not);
  body(w);
  close(w);
}

/// Lexer rule names, used by both `grammar.rs` and `translate.rs` so the
/// two never drift out of sync.
pub mod lpr {
  pub const WS: &str = "ws";
  pub const COMMENT: &str = "comment";
  pub const KW_LEXER: &str = "kw_lexer";
  pub const KW_PARSER: &str = "kw_parser";
  pub const IDENT: &str = "ident";
  pub const STR: &str = "str";
  pub const CHARSET: &str = "charset_lit";
  pub const COLON: &str = "colon";
  pub const SEMI: &str = "semi";
  pub const PIPE: &str = "pipe";
  pub const AMP: &str = "amp";
  pub const DASH_BANG: &str = "dash_bang";
  pub const BANG: &str = "bang";
  pub const QUEST: &str = "quest";
  pub const STAR: &str = "star";
  pub const PLUS: &str = "plus";
}

/// Parser rule names.
pub mod ppr {
  pub const GRAMMAR: &str = "Grammar";
  pub const RULE_DECL: &str = "RuleDecl";
  pub const ALTERNATION: &str = "Alternation";
  pub const SEQUENCE: &str = "Sequence";
  pub const POSTFIX: &str = "Postfix";
  pub const POSTFIX_OP: &str = "PostfixOp";
  pub const ATOM: &str = "Atom";
}

fn build() -> LlSpec {
  let mut w = Writer::new();

  for n in [
    lpr::WS,
    lpr::COMMENT,
    lpr::KW_LEXER,
    lpr::KW_PARSER,
    lpr::IDENT,
    lpr::STR,
    lpr::CHARSET,
    lpr::COLON,
    lpr::SEMI,
    lpr::PIPE,
    lpr::AMP,
    lpr::DASH_BANG,
    lpr::BANG,
    lpr::QUEST,
    lpr::STAR,
    lpr::PLUS,
  ] {
    lpr_decl(&mut w, n);
  }
  for n in [ppr::GRAMMAR, ppr::RULE_DECL, ppr::ALTERNATION, ppr::SEQUENCE, ppr::POSTFIX, ppr::POSTFIX_OP, ppr::ATOM] {
    ppr_decl(&mut w, n);
  }

  // ws: [ \t\r\n]+
  open_lpr(&mut w, lpr::WS, Qualifier::Skip);
  alt(&mut w);
  kleene_plus(&mut w, |w| charset(w, " \\t\\r\\n"));
  close(&mut w);

  // comment: '#' (not [\n])*
  open_lpr(&mut w, lpr::COMMENT, Qualifier::Skip);
  alt(&mut w);
  string(&mut w, "#");
  kleene_star(&mut w, |w| not(w, |w| charset(w, "\\n")));
  close(&mut w);

  open_lpr(&mut w, lpr::KW_LEXER, Qualifier::None);
  alt(&mut w);
  string(&mut w, "lexer");
  close(&mut w);

  open_lpr(&mut w, lpr::KW_PARSER, Qualifier::None);
  alt(&mut w);
  string(&mut w, "parser");
  close(&mut w);

  // ident: [a-zA-Z_] [a-zA-Z0-9_]*
  open_lpr(&mut w, lpr::IDENT, Qualifier::None);
  alt(&mut w);
  charset(&mut w, "a-zA-Z_");
  kleene_star(&mut w, |w| charset(w, "a-zA-Z0-9_"));
  close(&mut w);

  // str: ' (not ['])* '
  open_lpr(&mut w, lpr::STR, Qualifier::None);
  alt(&mut w);
  string(&mut w, "'");
  kleene_star(&mut w, |w| not(w, |w| charset(w, "'")));
  string(&mut w, "'");
  close(&mut w);

  // charset_lit: [ (not [\]])* ]
  open_lpr(&mut w, lpr::CHARSET, Qualifier::None);
  alt(&mut w);
  string(&mut w, "[");
  kleene_star(&mut w, |w| not(w, |w| charset(w, "\\]")));
  string(&mut w, "]");
  close(&mut w);

  // `-!` must win longest-match over a lone `-`; there's no separate `-`
  // token so no tie to worry about.
  open_lpr(&mut w, lpr::DASH_BANG, Qualifier::None);
  alt(&mut w);
  string(&mut w, "-!");
  close(&mut w);

  for (n, text) in [
    (lpr::COLON, ":"),
    (lpr::SEMI, ";"),
    (lpr::PIPE, "|"),
    (lpr::AMP, "&"),
    (lpr::BANG, "!"),
    (lpr::QUEST, "?"),
    (lpr::STAR, "*"),
    (lpr::PLUS, "+"),
  ] {
    open_lpr(&mut w, n, Qualifier::None);
    alt(&mut w);
    string(&mut w, text);
    close(&mut w);
  }

  // Grammar ::= RuleDecl*
  open_ppr(&mut w, ppr::GRAMMAR, Qualifier::None);
  alt(&mut w);
  kleene_star(&mut w, |w| name(w, ppr::RULE_DECL));
  close(&mut w);

  // RuleDecl ::= (kw_lexer | kw_parser) ident colon Alternation semi
  open_ppr(&mut w, ppr::RULE_DECL, Qualifier::None);
  alt(&mut w);
  name(&mut w, lpr::KW_LEXER);
  name(&mut w, lpr::IDENT);
  name(&mut w, lpr::COLON);
  name(&mut w, ppr::ALTERNATION);
  name(&mut w, lpr::SEMI);
  alt(&mut w);
  name(&mut w, lpr::KW_PARSER);
  name(&mut w, lpr::IDENT);
  name(&mut w, lpr::COLON);
  name(&mut w, ppr::ALTERNATION);
  name(&mut w, lpr::SEMI);
  close(&mut w);

  // Alternation ::= Sequence (pipe Sequence)*
  open_ppr(&mut w, ppr::ALTERNATION, Qualifier::None);
  alt(&mut w);
  name(&mut w, ppr::SEQUENCE);
  kleene_star(&mut w, |w| {
    name(w, lpr::PIPE);
    name(w, ppr::SEQUENCE);
  });
  close(&mut w);

  // Sequence ::= Postfix+
  open_ppr(&mut w, ppr::SEQUENCE, Qualifier::None);
  alt(&mut w);
  kleene_plus(&mut w, |w| name(w, ppr::POSTFIX));
  close(&mut w);

  // Postfix ::= Atom PostfixOp?
  open_ppr(&mut w, ppr::POSTFIX, Qualifier::None);
  alt(&mut w);
  name(&mut w, ppr::ATOM);
  optional(&mut w, |w| name(w, ppr::POSTFIX_OP));
  close(&mut w);

  // PostfixOp ::= quest | star | plus
  open_ppr(&mut w, ppr::POSTFIX_OP, Qualifier::None);
  alt(&mut w);
  name(&mut w, lpr::QUEST);
  alt(&mut w);
  name(&mut w, lpr::STAR);
  alt(&mut w);
  name(&mut w, lpr::PLUS);
  close(&mut w);

  // Atom ::= ident | str | charset_lit | amp Atom | dash_bang Atom | bang Atom
  open_ppr(&mut w, ppr::ATOM, Qualifier::None);
  alt(&mut w);
  name(&mut w, lpr::IDENT);
  alt(&mut w);
  name(&mut w, lpr::STR);
  alt(&mut w);
  name(&mut w, lpr::CHARSET);
  alt(&mut w);
  name(&mut w, lpr::AMP);
  name(&mut w, ppr::ATOM);
  alt(&mut w);
  name(&mut w, lpr::DASH_BANG);
  name(&mut w, ppr::ATOM);
  alt(&mut w);
  name(&mut w, lpr::BANG);
  name(&mut w, ppr::ATOM);
  close(&mut w);

  w.finish()
}

static BOOTSTRAP: OnceLock<Grammar> = OnceLock::new();

/// The compiled bootstrap grammar, built once per process.
///
/// # Panics
/// Panics if the hand-built spec fails to compile; that would be a defect
/// in this module, not in any input text.
pub fn bootstrap_grammar() -> &'static Grammar {
  BOOTSTRAP.get_or_init(|| Grammar::compile(&build()).unwrap_or_else(|report| panic!("bootstrap grammar failed to compile:\n{}", report)))
}
