//! Drives the parser parse-table over a token stream, delivering a parse
//! tree via `ParseObserver` callbacks and giving an optional `ErrorHandler`
//! a chance to recover before a parse aborts.

use llparse_core::grammar::Grammar;
use llparse_core::Id;

use crate::engine::{Engine, Policy, RunResult};
use crate::glyph::Token;

/// Whatever feeds tokens to the parser driver; implemented by a
/// lexer-backed adapter in ordinary use, or by a fixed `Vec<Token>` in
/// tests.
pub trait TokenSource {
  fn peek(&mut self) -> Token;
  fn next(&mut self) -> Token;
}

pub struct VecTokenSource {
  tokens: Vec<Token>,
  pos: usize,
  end: Token,
}

impl VecTokenSource {
  pub fn new(tokens: Vec<Token>, end: Token) -> Self {
    Self { tokens, pos: 0, end }
  }
}

impl TokenSource for VecTokenSource {
  fn peek(&mut self) -> Token {
    self.tokens.get(self.pos).cloned().unwrap_or_else(|| self.end.clone())
  }

  fn next(&mut self) -> Token {
    let t = self.peek();
    if self.pos < self.tokens.len() {
      self.pos += 1;
    }
    t
  }
}

/// Receives the tree the parser builds: `begin(nonterm)` ... `terminal` /
/// nested `begin`/`end` ... `end()`.
pub trait ParseObserver {
  fn begin(&mut self, nonterm: Id);
  fn terminal(&mut self, token_id: Id);
  fn end(&mut self);
}

pub struct NullObserver;
impl ParseObserver for NullObserver {
  fn begin(&mut self, _nonterm: Id) {}
  fn terminal(&mut self, _token_id: Id) {}
  fn end(&mut self) {}
}

/// External recovery hooks. Handlers may call `peek`/`next` on the same
/// token source the engine is driving; the engine re-samples input and
/// retries the failed term once after a handler returns `true`.
pub trait ErrorHandler {
  fn startup(&mut self) {}
  fn shutdown(&mut self) {}
  fn terminal_error(&mut self, expected_low: Id, expected_high: Id, found: Id, source: &mut dyn TokenSource) -> bool {
    let _ = (expected_low, expected_high, found, source);
    false
  }
  fn nonterminal_error(&mut self, nonterm: Id, found: Id, source: &mut dyn TokenSource) -> bool {
    let _ = (nonterm, found, source);
    false
  }
  fn recovery_failed(&mut self) {}
}

struct ParserPolicy<'a> {
  source: &'a mut dyn TokenSource,
  observer: &'a mut dyn ParseObserver,
  handler: Option<&'a mut dyn ErrorHandler>,
}

impl<'a> Policy for ParserPolicy<'a> {
  fn peek(&mut self) -> Id {
    self.source.peek().id
  }

  fn next(&mut self) {
    self.source.next();
  }

  fn reinit_output(&mut self, _start_rule: Id) {}

  fn output_terminal(&mut self, id: Id) {
    self.observer.terminal(id);
  }

  fn output_nonterminal_begin(&mut self, id: Id) {
    self.observer.begin(id);
  }

  fn output_nonterminal_end(&mut self) {
    self.observer.end();
  }

  fn terminal_error(&mut self, expected_low: Id, expected_high: Id, found: Id) -> bool {
    match self.handler.as_mut() {
      Some(h) => h.terminal_error(expected_low, expected_high, found, self.source),
      None => false,
    }
  }

  fn nonterminal_error(&mut self, nonterm: Id, found: Id) -> bool {
    match self.handler.as_mut() {
      Some(h) => h.nonterminal_error(nonterm, found, self.source),
      None => false,
    }
  }

  fn recovery_failed(&mut self) {
    if let Some(h) = self.handler.as_mut() {
      h.recovery_failed();
    }
  }
}

pub struct ParserDriver {
  engine: Engine,
}

impl ParserDriver {
  pub fn new() -> Self {
    Self { engine: Engine::new() }
  }

  /// Seeds the stack with a reference to `start_rule_name`'s PPR and drives
  /// the engine. Returns `Ok(())` on a clean parse, `Err(())` if the start
  /// rule doesn't exist or the parse aborted after a failed recovery.
  pub fn parse<'a>(
    &mut self,
    grammar: &Grammar,
    start_rule_name: &str,
    source: &'a mut dyn TokenSource,
    observer: &'a mut dyn ParseObserver,
    mut handler: Option<&'a mut dyn ErrorHandler>,
  ) -> Result<(), ()> {
    let Some(start) = grammar.start_ppr(start_rule_name) else {
      return Err(());
    };
    if let Some(h) = handler.as_deref_mut() {
      h.startup();
    }
    let mut policy = ParserPolicy { source, observer, handler };
    let result = self.engine.run(grammar.ppr_table(), start, &mut policy);
    if let Some(h) = policy.handler.as_deref_mut() {
      h.shutdown();
    }
    match result {
      RunResult::Success => Ok(()),
      RunResult::Aborted => Err(()),
    }
  }
}

impl Default for ParserDriver {
  fn default() -> Self {
    Self::new()
  }
}
