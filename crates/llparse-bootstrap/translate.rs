//! Drives the bootstrap grammar's lexer and parser over grammar-file text
//! and re-emits what it sees as an `LlSpec`, through the same `Writer` API
//! a hand-built grammar goes through.

use std::fmt;

use llparse_core::llspec::{Opcode, Qualifier, SourcePos, Writer};
use llparse_core::{Grammar, Id, LlSpec};
use llparse_runtime::{LexerDriver, LexerTokenSource, NullLexerObserver, ParseObserver, ParserDriver, SourceReader, Token, TokenSource};

use crate::grammar::{bootstrap_grammar, lpr, ppr};

#[derive(Debug)]
pub enum TranslateError {
  /// The bootstrap parser rejected the text (syntax error in the source
  /// grammar file; no diagnostic position is carried since the bootstrap
  /// grammar has no error-recovery handler installed).
  Syntax,
  /// The parse tree didn't have the shape `translate` expects. Indicates a
  /// mismatch between `grammar.rs`'s rule shapes and this module, not a
  /// problem with the input text.
  Malformed(String),
}

impl fmt::Display for TranslateError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      TranslateError::Syntax => write!(f, "syntax error in grammar text"),
      TranslateError::Malformed(msg) => write!(f, "malformed bootstrap parse tree: {msg}"),
    }
  }
}

enum Node {
  Branch { id: Id, children: Vec<Node> },
  Leaf { id: Id, token: Token },
}

impl Node {
  fn children(&self) -> Result<&[Node], TranslateError> {
    match self {
      Node::Branch { children, .. } => Ok(children),
      Node::Leaf { .. } => Err(TranslateError::Malformed("expected a branch, found a leaf".into())),
    }
  }

  fn token(&self) -> Result<&Token, TranslateError> {
    match self {
      Node::Leaf { token, .. } => Ok(token),
      Node::Branch { .. } => Err(TranslateError::Malformed("expected a leaf, found a branch".into())),
    }
  }
}

/// Collects mutable references to every leaf's placeholder token, in
/// left-to-right (document) order, matching the order tokens were
/// consumed in.
fn collect_leaves<'a>(node: &'a mut Node, out: &mut Vec<&'a mut Token>) {
  match node {
    Node::Branch { children, .. } => {
      for c in children {
        collect_leaves(c, out);
      }
    }
    Node::Leaf { token, .. } => out.push(token),
  }
}

struct TreeBuilder {
  stack: Vec<(Id, Vec<Node>)>,
  root: Option<Node>,
}

impl TreeBuilder {
  fn new() -> Self {
    Self { stack: Vec::new(), root: None }
  }
}

impl ParseObserver for TreeBuilder {
  fn begin(&mut self, nonterm: Id) {
    self.stack.push((nonterm, Vec::new()));
  }

  fn terminal(&mut self, token_id: Id) {
    // byte_offset/byte_len are filled in afterward from the token log;
    // this placeholder is never observed in its zeroed state.
    let leaf = Node::Leaf { id: token_id, token: Token { id: token_id, byte_offset: 0, byte_len: 0 } };
    match self.stack.last_mut() {
      Some((_, children)) => children.push(leaf),
      None => self.root = Some(leaf),
    }
  }

  fn end(&mut self) {
    let Some((id, children)) = self.stack.pop() else { return };
    let node = Node::Branch { id, children };
    match self.stack.last_mut() {
      Some((_, parent_children)) => parent_children.push(node),
      None => self.root = Some(node),
    }
  }
}

/// Wraps a token source to log every token actually consumed, in order.
/// `Engine::consume_terminal` always calls `output_terminal` immediately
/// before `next()` for the same matched token, with no other token-source
/// traffic in between, so this log lines up term-for-term with the
/// `ParseObserver::terminal` calls the same parse produces.
struct LoggingSource<'a> {
  inner: LexerTokenSource<'a>,
  log: Vec<Token>,
}

impl<'a> TokenSource for LoggingSource<'a> {
  fn peek(&mut self) -> Token {
    self.inner.peek()
  }

  fn next(&mut self) -> Token {
    let t = self.inner.next();
    self.log.push(t.clone());
    t
  }
}

fn id_of(g: &Grammar, name: &str) -> Id {
  g.resolve(name).unwrap_or_else(|| panic!("bootstrap grammar has no rule named {name}")).0
}

fn slice<'a>(text: &'a str, token: &Token) -> &'a str {
  &text[token.byte_offset..token.byte_offset + token.byte_len]
}

fn strip_ends(s: &str) -> &str {
  &s[1..s.len() - 1]
}

/// Parses `text` against the bootstrap grammar and re-emits it as an
/// `LlSpec` for `Grammar::compile`.
pub fn translate(origin: &str, text: &str) -> Result<LlSpec, TranslateError> {
  let grammar = bootstrap_grammar();

  let mut reader = SourceReader::new();
  reader.add_str(origin, text);

  let mut lexer_observer = NullLexerObserver;
  let inner = LexerTokenSource { grammar, reader: &reader, lexer: LexerDriver::new(), observer: &mut lexer_observer };
  let mut source = LoggingSource { inner, log: Vec::new() };

  let mut builder = TreeBuilder::new();
  ParserDriver::new().parse(grammar, ppr::GRAMMAR, &mut source, &mut builder, None).map_err(|_| TranslateError::Syntax)?;

  let mut tree = builder.root.ok_or(TranslateError::Syntax)?;
  let mut leaves = Vec::new();
  collect_leaves(&mut tree, &mut leaves);
  for (leaf, tok) in leaves.into_iter().zip(source.log.iter()) {
    *leaf = tok.clone();
  }

  let decls = tree.children()?;

  let mut w = Writer::new();
  for decl in decls {
    declare_one(grammar, decl, text, &mut w)?;
  }
  for decl in decls {
    define_one(grammar, decl, text, &mut w)?;
  }
  Ok(w.finish())
}

fn pos_of(origin_offset: usize, tok: &Token) -> SourcePos {
  SourcePos::new(0, (origin_offset + tok.byte_offset) as u32)
}

fn declare_one(g: &Grammar, decl: &Node, text: &str, w: &mut Writer) -> Result<(), TranslateError> {
  let children = decl.children()?;
  let kw = children.first().ok_or_else(|| TranslateError::Malformed("RuleDecl missing keyword".into()))?.token()?;
  let ident = children.get(1).ok_or_else(|| TranslateError::Malformed("RuleDecl missing name".into()))?.token()?;
  let name = slice(text, ident).to_string();
  let pos = pos_of(0, ident);
  if kw.id == id_of(g, lpr::KW_LEXER) {
    w.emit(pos, Opcode::LprDecl { name });
  } else if kw.id == id_of(g, lpr::KW_PARSER) {
    w.emit(pos, Opcode::PprDecl { name });
  } else {
    return Err(TranslateError::Malformed("RuleDecl keyword is neither lexer nor parser".into()));
  }
  Ok(())
}

fn define_one(g: &Grammar, decl: &Node, text: &str, w: &mut Writer) -> Result<(), TranslateError> {
  let children = decl.children()?;
  let kw = children[0].token()?;
  let ident = children[1].token()?;
  let name = slice(text, ident).to_string();
  let pos = pos_of(0, ident);
  let alternation = children.get(3).ok_or_else(|| TranslateError::Malformed("RuleDecl missing body".into()))?;

  let is_lexer = kw.id == id_of(g, lpr::KW_LEXER);
  if is_lexer {
    w.emit(pos, Opcode::Lpr { name, qualifier: Qualifier::None });
  } else {
    w.emit(pos, Opcode::Ppr { name, qualifier: Qualifier::None });
  }
  emit_alternation(g, alternation, text, w)?;
  w.emit(pos, Opcode::Close);
  Ok(())
}

fn emit_alternation(g: &Grammar, node: &Node, text: &str, w: &mut Writer) -> Result<(), TranslateError> {
  let seq_id = id_of(g, ppr::SEQUENCE);
  for child in node.children()? {
    if let Node::Branch { id, .. } = child {
      if *id == seq_id {
        w.emit(SourcePos::synthetic(), Opcode::Alternative);
        emit_sequence(g, child, text, w)?;
      }
    }
  }
  Ok(())
}

fn emit_sequence(g: &Grammar, node: &Node, text: &str, w: &mut Writer) -> Result<(), TranslateError> {
  for postfix in node.children()? {
    emit_postfix(g, postfix, text, w)?;
  }
  Ok(())
}

fn emit_postfix(g: &Grammar, node: &Node, text: &str, w: &mut Writer) -> Result<(), TranslateError> {
  let children = node.children()?;
  let atom = children.first().ok_or_else(|| TranslateError::Malformed("Postfix missing atom".into()))?;
  match children.get(1) {
    None => emit_atom(g, atom, text, w),
    Some(op_node) => {
      let op_children = op_node.children()?;
      let op_leaf = op_children.first().ok_or_else(|| TranslateError::Malformed("PostfixOp missing operator".into()))?.token()?;
      let op = if op_leaf.id == id_of(g, lpr::QUEST) {
        Opcode::Optional
      } else if op_leaf.id == id_of(g, lpr::STAR) {
        Opcode::KleeneStar
      } else if op_leaf.id == id_of(g, lpr::PLUS) {
        Opcode::KleenePlus
      } else {
        return Err(TranslateError::Malformed("PostfixOp operator is none of ?*+".into()));
      };
      w.emit(pos_of(0, op_leaf), op);
      emit_atom(g, atom, text, w)?;
      w.emit(pos_of(0, op_leaf), Opcode::Close);
      Ok(())
    }
  }
}

fn emit_atom(g: &Grammar, node: &Node, text: &str, w: &mut Writer) -> Result<(), TranslateError> {
  let children = node.children()?;
  match children.len() {
    1 => {
      let tok = children[0].token()?;
      let pos = pos_of(0, tok);
      if tok.id == id_of(g, lpr::IDENT) {
        w.emit(pos, Opcode::Name { target: slice(text, tok).to_string() });
      } else if tok.id == id_of(g, lpr::STR) {
        w.emit(pos, Opcode::String { text: strip_ends(slice(text, tok)).to_string() });
      } else if tok.id == id_of(g, lpr::CHARSET) {
        w.emit(pos, Opcode::Charset { text: strip_ends(slice(text, tok)).to_string() });
      } else {
        return Err(TranslateError::Malformed("Atom leaf is none of ident/str/charset".into()));
      }
      Ok(())
    }
    2 => {
      let prefix = children[0].token()?;
      let pos = pos_of(0, prefix);
      let opcode = if prefix.id == id_of(g, lpr::AMP) {
        Opcode::Lookahead
      } else if prefix.id == id_of(g, lpr::DASH_BANG) {
        Opcode::LookaheadNot
      } else if prefix.id == id_of(g, lpr::BANG) {
        Opcode::Not
      } else {
        return Err(TranslateError::Malformed("Atom prefix is none of &/-!/!".into()));
      };
      w.emit(pos, opcode);
      emit_atom(g, &children[1], text, w)?;
      w.emit(pos, Opcode::Close);
      Ok(())
    }
    n => Err(TranslateError::Malformed(format!("Atom has {n} children, expected 1 or 2"))),
  }
}
