//! The unified symbol-ID space.
//!
//! Code-point, lexer-rule, and parser-rule symbols all live in a single
//! `u32` space so that ranges, sets, and parse-table terms never need to
//! know which kind of ID they're holding until a caller asks. Non-terminal
//! IDs for the lexer table are allocated out of the *same* numeric range as
//! lexer-rule IDs: the main non-terminal for the Nth declared LPR is
//! numerically identical to the token ID that LPR produces. Non-terminal
//! IDs for the parser table live in the parser-rule range above that.

/// Raw symbol ID. Never construct one of these by hand outside this module;
/// use the `*_id` constructors below.
pub type Id = u32;

const NORMAL_CP_COUNT: Id = 0x110000;
const SPECIAL_CP_COUNT: Id = 1;
const NORMAL_LPR_COUNT: Id = 0x10000;
const SPECIAL_LPR_COUNT: Id = 2;
const NORMAL_PPR_COUNT: Id = 0x10000;

pub const FIRST_CP: Id = 0;
pub const LAST_NORMAL_CP: Id = FIRST_CP + NORMAL_CP_COUNT - 1;
pub const END_CP: Id = LAST_NORMAL_CP + 1;
pub const LAST_CP: Id = END_CP;

pub const FIRST_LPR: Id = LAST_CP + 1;
pub const LAST_NORMAL_LPR: Id = FIRST_LPR + NORMAL_LPR_COUNT - 1;
pub const FAILURE_LPR: Id = LAST_NORMAL_LPR + 1;
pub const END_LPR: Id = FAILURE_LPR + 1;
pub const LAST_LPR: Id = END_LPR;

pub const FIRST_PPR: Id = LAST_LPR + 1;
pub const LAST_PPR: Id = FIRST_PPR + NORMAL_PPR_COUNT - 1;

const _: () = assert!(SPECIAL_CP_COUNT == 1);
const _: () = assert!(SPECIAL_LPR_COUNT == 2);

/// Constructs the symbol ID of a Unicode code point.
pub const fn cp_id(cp: u32) -> Id {
  debug_assert!(cp <= LAST_NORMAL_CP);
  FIRST_CP + cp
}

/// Constructs the symbol ID of the Nth declared LPR (also the token ID it
/// produces once matched).
pub const fn lpr_id(index: u32) -> Id {
  debug_assert!(FIRST_LPR + index <= LAST_NORMAL_LPR);
  FIRST_LPR + index
}

/// Constructs the symbol ID of the Nth declared PPR.
pub const fn ppr_id(index: u32) -> Id {
  debug_assert!(FIRST_PPR + index <= LAST_PPR);
  FIRST_PPR + index
}

/// Which of the three symbol-ID sections `id` falls into.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SymbolKind {
  CodePoint,
  LexerRule,
  ParserRule,
}

pub fn classify(id: Id) -> Option<SymbolKind> {
  if (FIRST_CP..=LAST_CP).contains(&id) {
    Some(SymbolKind::CodePoint)
  } else if (FIRST_LPR..=LAST_LPR).contains(&id) {
    Some(SymbolKind::LexerRule)
  } else if (FIRST_PPR..=LAST_PPR).contains(&id) {
    Some(SymbolKind::ParserRule)
  } else {
    None
  }
}

pub fn is_normal_cp(id: Id) -> bool {
  (FIRST_CP..=LAST_NORMAL_CP).contains(&id)
}

pub fn is_normal_lpr(id: Id) -> bool {
  (FIRST_LPR..=LAST_NORMAL_LPR).contains(&id)
}

pub fn is_normal_ppr(id: Id) -> bool {
  (FIRST_PPR..=LAST_PPR).contains(&id)
}

/// The two tables the compiler builds: the lexer table consumes code points
/// and produces tokens, the parser table consumes tokens and produces a
/// parse tree. Each has its own terminal domain and non-terminal range.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Domain {
  Glyph,
  Token,
}

impl Domain {
  /// Inclusive range of legal terminal IDs for this domain, including the
  /// end-of-input sentinel.
  pub const fn terminal_domain(self) -> (Id, Id) {
    match self {
      Domain::Glyph => (FIRST_CP, LAST_CP),
      Domain::Token => (FIRST_LPR, LAST_LPR),
    }
  }

  /// The end-of-input sentinel ID for this domain.
  pub const fn end_of_input(self) -> Id {
    match self {
      Domain::Glyph => END_CP,
      Domain::Token => END_LPR,
    }
  }

  /// The `failure` terminal, only meaningful for the token domain.
  pub const fn failure(self) -> Id {
    FAILURE_LPR
  }

  /// Inclusive range of legal non-terminal IDs for this domain.
  pub const fn nonterminal_domain(self) -> (Id, Id) {
    match self {
      Domain::Glyph => (FIRST_LPR, LAST_LPR),
      Domain::Token => (FIRST_PPR, LAST_PPR),
    }
  }

  pub fn is_legal_terminal(self, id: Id) -> bool {
    let (lo, hi) = self.terminal_domain();
    (lo..=hi).contains(&id)
  }

  pub fn is_legal_nonterminal(self, id: Id) -> bool {
    let (lo, hi) = self.nonterminal_domain();
    (lo..=hi).contains(&id)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn layout_matches_spec() {
    assert_eq!(FIRST_CP, 0);
    assert_eq!(LAST_NORMAL_CP, 0x10FFFF);
    assert_eq!(END_CP, 0x110000);
    assert_eq!(FIRST_LPR, 0x110001);
    assert_eq!(LAST_NORMAL_LPR, 0x120000);
    assert_eq!(FAILURE_LPR, 0x120001);
    assert_eq!(END_LPR, 0x120002);
    assert_eq!(FIRST_PPR, 0x120003);
    assert_eq!(LAST_PPR, 0x130002);
  }

  #[test]
  fn lpr_id_doubles_as_token_id() {
    // The whole point of sharing the LPR range between "lexer-table
    // non-terminal" and "token ID" is that this holds unconditionally.
    assert_eq!(lpr_id(0), FIRST_LPR);
    assert_eq!(lpr_id(5), FIRST_LPR + 5);
  }

  #[test]
  fn classify_sections() {
    assert_eq!(classify(cp_id(65)), Some(SymbolKind::CodePoint));
    assert_eq!(classify(lpr_id(0)), Some(SymbolKind::LexerRule));
    assert_eq!(classify(ppr_id(0)), Some(SymbolKind::ParserRule));
    assert_eq!(classify(LAST_PPR + 1), None);
  }

  #[test]
  fn domain_bounds() {
    assert_eq!(Domain::Glyph.terminal_domain(), (FIRST_CP, LAST_CP));
    assert_eq!(Domain::Glyph.nonterminal_domain(), (FIRST_LPR, LAST_LPR));
    assert_eq!(Domain::Token.terminal_domain(), (FIRST_LPR, LAST_LPR));
    assert_eq!(Domain::Token.nonterminal_domain(), (FIRST_PPR, LAST_PPR));
  }
}
