//! Longest-match tokenizer built on top of the generic parsing engine, run
//! once per declared (non-`support`) LPR start rule.

use llparse_core::grammar::Grammar;
use llparse_core::llspec::Qualifier;
use llparse_core::symbol::Domain;
use llparse_core::Id;

use crate::engine::{Engine, Policy, RunResult};
use crate::glyph::Token;
use crate::reader::SourceReader;

/// Receives every token the lexer driver produces, including ones skipped
/// via `cut_skip_tokens`, before the caller ever sees them.
pub trait LexerObserver {
  fn on_token(&mut self, token: &Token);
}

pub struct NullObserver;
impl LexerObserver for NullObserver {
  fn on_token(&mut self, _token: &Token) {}
}

struct GlyphPolicy<'a> {
  reader: &'a SourceReader,
  cursor: usize,
}

impl<'a> Policy for GlyphPolicy<'a> {
  fn peek(&mut self) -> Id {
    self.reader.glyph_at(self.cursor).map(|g| g.id).unwrap_or(Domain::Glyph.end_of_input())
  }

  fn next(&mut self) {
    if let Some(g) = self.reader.glyph_at(self.cursor) {
      self.cursor += g.byte_len as usize;
    }
  }

  fn reinit_output(&mut self, _start_rule: Id) {}
  fn output_terminal(&mut self, _id: Id) {}
  fn output_nonterminal_begin(&mut self, _id: Id) {}
  fn output_nonterminal_end(&mut self) {}
}

pub struct LexerDriver {
  offset: usize,
  cut_skip_tokens: bool,
  engine: Engine,
  peeked: Option<Token>,
  /// The offset a zero-width (nullable-rule) match was last returned from.
  /// A second match attempt at the same offset is treated as if nothing
  /// matched, so a nullable LPR can't spin forever re-matching the empty
  /// string; it falls through to the failure probe instead.
  last_zero_width_at: Option<usize>,
}

impl LexerDriver {
  pub fn new() -> Self {
    Self { offset: 0, cut_skip_tokens: true, engine: Engine::new(), peeked: None, last_zero_width_at: None }
  }

  pub fn set_cut_skip_tokens(&mut self, value: bool) {
    self.cut_skip_tokens = value;
  }

  pub fn offset(&self) -> usize {
    self.offset
  }

  pub fn seek(&mut self, offset: usize) {
    self.offset = offset;
    self.peeked = None;
    self.last_zero_width_at = None;
  }

  pub fn peek(&mut self, grammar: &Grammar, reader: &SourceReader, observer: &mut dyn LexerObserver) -> Token {
    if let Some(t) = &self.peeked {
      return t.clone();
    }
    let t = self.compute(grammar, reader, observer);
    self.peeked = Some(t.clone());
    t
  }

  pub fn next(&mut self, grammar: &Grammar, reader: &SourceReader, observer: &mut dyn LexerObserver) -> Token {
    let t = self.peek(grammar, reader, observer);
    self.offset = t.byte_offset + t.byte_len;
    self.peeked = None;
    t
  }

  fn try_match(&mut self, grammar: &Grammar, reader: &SourceReader, start: Id) -> Option<usize> {
    let mut policy = GlyphPolicy { reader, cursor: self.offset };
    match self.engine.run(grammar.lpr_table(), start, &mut policy) {
      RunResult::Success => Some(policy.cursor - self.offset),
      RunResult::Aborted => None,
    }
  }

  fn longest_match(&mut self, grammar: &Grammar, reader: &SourceReader) -> Option<(Id, usize)> {
    let mut best: Option<(Id, usize)> = None;
    for start in grammar.lpr_entry_points() {
      if let Some(len) = self.try_match(grammar, reader, start) {
        let better = match best {
          Some((_, blen)) => len > blen,
          None => true,
        };
        if better {
          best = Some((start, len));
        }
      }
    }
    best
  }

  fn compute(&mut self, grammar: &Grammar, reader: &SourceReader, observer: &mut dyn LexerObserver) -> Token {
    loop {
      let at_eof = self.offset >= reader.byte_len();
      // A nullable rule matches everywhere, including at the offset it just
      // matched at with zero width. Treat a repeat of that exact match as a
      // non-match so the driver doesn't spin forever re-emitting it.
      let suppress_repeat = self.last_zero_width_at == Some(self.offset);

      let found = if suppress_repeat { None } else { self.longest_match(grammar, reader) };

      match found {
        Some((id, len)) => {
          let token = Token { id, byte_offset: self.offset, byte_len: len };
          if matches!(grammar.lpr_qualifier(id), Some(Qualifier::Skip)) && self.cut_skip_tokens {
            observer.on_token(&token);
            if len == 0 {
              // a zero-length skip match would never advance `self.offset`;
              // return it rather than spin forever re-matching it.
              return token;
            }
            self.offset += len;
            self.last_zero_width_at = None;
            continue;
          }
          self.last_zero_width_at = if len == 0 { Some(self.offset) } else { None };
          return token;
        }
        None if at_eof => return Token::end_of_input(Domain::Token.end_of_input(), self.offset),
        None => {
          let fail_start = self.offset;
          let mut probe = self.offset;
          loop {
            let Some(g) = reader.glyph_at(probe) else {
              probe = reader.byte_len();
              break;
            };
            probe += g.byte_len as usize;
            if probe >= reader.byte_len() {
              break;
            }
            let saved = self.offset;
            self.offset = probe;
            let matched = self.longest_match(grammar, reader).is_some();
            self.offset = saved;
            if matched {
              break;
            }
          }
          self.last_zero_width_at = None;
          let token = Token { id: Domain::Token.failure(), byte_offset: fail_start, byte_len: probe - fail_start };
          return token;
        }
      }
    }
  }
}

impl Default for LexerDriver {
  fn default() -> Self {
    Self::new()
  }
}

/// Adapts a `LexerDriver` to the parser driver's `TokenSource` trait, so a
/// parser can pull tokens straight off a source buffer.
pub struct LexerTokenSource<'a> {
  pub grammar: &'a Grammar,
  pub reader: &'a SourceReader,
  pub lexer: LexerDriver,
  pub observer: &'a mut dyn LexerObserver,
}

impl<'a> crate::parser::TokenSource for LexerTokenSource<'a> {
  fn peek(&mut self) -> Token {
    self.lexer.peek(self.grammar, self.reader, self.observer)
  }

  fn next(&mut self) -> Token {
    self.lexer.next(self.grammar, self.reader, self.observer)
  }
}
