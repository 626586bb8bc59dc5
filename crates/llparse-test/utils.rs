//! Shared helpers: hand-constructing small grammars through the same
//! `Writer` API the bootstrap grammar itself is built with, and driving the
//! lexer/parser engines over fixed input strings.

use llparse_core::llspec::{Opcode, SourcePos, Writer};
use llparse_core::symbol::Domain;
use llparse_core::{Grammar, Id};
use llparse_runtime::{
  ErrorHandler, LexerDriver, LexerObserver, LexerTokenSource, NullLexerObserver, ParseObserver, ParserDriver, SourceReader, Token,
};

const POS: SourcePos = SourcePos::synthetic();

pub fn w_emit(w: &mut Writer, op: Opcode) {
  w.emit(POS, op);
}

/// Compiles a grammar built by `build`, panicking with the diagnostic report
/// on failure (a failure here is always a defect in the test itself).
pub fn compile(build: impl FnOnce(&mut Writer)) -> Grammar {
  let mut w = Writer::new();
  build(&mut w);
  let spec = w.finish();
  Grammar::compile(&spec).unwrap_or_else(|report| panic!("test grammar failed to compile:\n{report}"))
}

#[derive(Default)]
struct Recorder {
  tokens: Vec<Token>,
}

impl LexerObserver for Recorder {
  fn on_token(&mut self, token: &Token) {
    self.tokens.push(token.clone());
  }
}

/// Runs the lexer driver to exhaustion over `text`. Returns the tokens the
/// caller would actually see (including the trailing end-of-input token)
/// and, separately, every token the observer saw — which, with
/// `cut_skip_tokens` on, is just the skipped ones.
pub fn lex_all(grammar: &Grammar, text: &str) -> (Vec<Token>, Vec<Token>) {
  let mut reader = SourceReader::new();
  reader.add_str("t", text);
  let mut observer = Recorder::default();
  let mut lexer = LexerDriver::new();
  let mut seen = Vec::new();
  loop {
    let token = lexer.next(grammar, &reader, &mut observer);
    let is_end = token.id == Domain::Token.end_of_input();
    seen.push(token);
    if is_end {
      break;
    }
  }
  (seen, observer.tokens)
}

/// A leaf or branch of the tree a `ParseObserver` builds, readable enough to
/// assert against directly.
#[derive(Debug, PartialEq, Eq)]
pub enum Node {
  Branch(Id, Vec<Node>),
  Leaf(Id),
}

#[derive(Default)]
struct TreeBuilder {
  stack: Vec<(Id, Vec<Node>)>,
  roots: Vec<Node>,
}

impl ParseObserver for TreeBuilder {
  fn begin(&mut self, nonterm: Id) {
    self.stack.push((nonterm, Vec::new()));
  }

  fn terminal(&mut self, token_id: Id) {
    let leaf = Node::Leaf(token_id);
    match self.stack.last_mut() {
      Some((_, children)) => children.push(leaf),
      None => self.roots.push(leaf),
    }
  }

  fn end(&mut self) {
    let (id, children) = self.stack.pop().expect("end without matching begin");
    let node = Node::Branch(id, children);
    match self.stack.last_mut() {
      Some((_, children)) => children.push(node),
      None => self.roots.push(node),
    }
  }
}

/// Parses `start_rule_name` over `text`, returning the single root node.
/// Panics if the parse doesn't succeed or doesn't produce exactly one root —
/// callers that expect failure should use `try_parse` instead.
pub fn parse_tree(grammar: &Grammar, start_rule_name: &str, text: &str) -> Node {
  let (ok, mut roots) = try_parse(grammar, start_rule_name, text);
  assert!(ok, "parse of {text:?} against {start_rule_name} failed");
  assert_eq!(roots.len(), 1, "expected exactly one root node, got {roots:?}");
  roots.remove(0)
}

/// Parses `start_rule_name` over `text`, returning whether it succeeded and
/// whatever root nodes were built along the way (possibly none, on
/// failure).
pub fn try_parse(grammar: &Grammar, start_rule_name: &str, text: &str) -> (bool, Vec<Node>) {
  let mut reader = SourceReader::new();
  reader.add_str("t", text);
  let mut lexer_observer = NullLexerObserver;
  let mut source = LexerTokenSource { grammar, reader: &reader, lexer: LexerDriver::new(), observer: &mut lexer_observer };
  let mut builder = TreeBuilder::default();
  let ok = ParserDriver::new().parse(grammar, start_rule_name, &mut source, &mut builder, None).is_ok();
  (ok, builder.roots)
}

/// Like `try_parse`, but installs `handler` so recovery can be exercised.
pub fn try_parse_with_handler(grammar: &Grammar, start_rule_name: &str, text: &str, handler: &mut dyn ErrorHandler) -> (bool, Vec<Node>) {
  let mut reader = SourceReader::new();
  reader.add_str("t", text);
  let mut lexer_observer = NullLexerObserver;
  let mut source = LexerTokenSource { grammar, reader: &reader, lexer: LexerDriver::new(), observer: &mut lexer_observer };
  let mut builder = TreeBuilder::default();
  let ok = ParserDriver::new().parse(grammar, start_rule_name, &mut source, &mut builder, Some(handler)).is_ok();
  (ok, builder.roots)
}

pub fn name_of(grammar: &Grammar, domain: Domain, id: Id) -> String {
  let table = match domain {
    Domain::Glyph => grammar.lpr_table(),
    Domain::Token => grammar.ppr_table(),
  };
  table.name_of(id).unwrap_or("?").to_string()
}
