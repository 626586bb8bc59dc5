//! Compiler diagnostics and the `Report` that accumulates them.
//!
//! No logging or error-handling crate is pulled in for this: every
//! diagnostic carries its own `SourcePos` and formatted message, and a
//! `Report` is just a `Vec` with a couple of convenience queries, matching
//! the zero-dependency error-reporting style of the rest of this crate.

use std::fmt::{self, Display};

use crate::llspec::SourcePos;

#[derive(Clone, Debug)]
pub enum Diagnostic {
  StrayClose { at: SourcePos },
  ScopeNotClosed { at: SourcePos },
  IllegalInNoScope { at: SourcePos },
  IllegalInLprScope { at: SourcePos },
  IllegalInPprScope { at: SourcePos },
  IllegalInSingleTerminalScope { at: SourcePos },
  IllegalInNoAlternationScope { at: SourcePos },
  IllegalInSingleSubexprScope { at: SourcePos },
  IllegalInNoEndSubexprScope { at: SourcePos },
  RuleNameConflict { at: SourcePos, name: String },
  RuleNeverDeclared { at: SourcePos, name: String },
  RuleNeverDefined { at: SourcePos, name: String },
  RuleAlreadyDefined { at: SourcePos, name: String },
  RuleNotFound { at: SourcePos, name: String },
  RuleMayNotBePpr { at: SourcePos, name: String },
  IllegalRuleDeclare { at: SourcePos, name: String },
  IllegalQualifier { at: SourcePos },
  IllegalRightAssoc { at: SourcePos },
  IllegalStringLiteral { at: SourcePos, text: String },
  IllegalCharsetLiteral { at: SourcePos, text: String },
  IllegalAmbiguity { at: SourcePos, nonterm: String },
  InternalError { at: SourcePos, message: String },

  /// Raised by a lexer/parser driver at parse time, not by the compiler.
  TerminalError { at: SourcePos, expected_low: u32, expected_high: u32, found: u32 },
  NonterminalError { at: SourcePos, nonterm: String, found: u32 },
  RecoveryFailed { at: SourcePos },
}

impl Diagnostic {
  pub fn at(&self) -> SourcePos {
    match self {
      Diagnostic::StrayClose { at }
      | Diagnostic::ScopeNotClosed { at }
      | Diagnostic::IllegalInNoScope { at }
      | Diagnostic::IllegalInLprScope { at }
      | Diagnostic::IllegalInPprScope { at }
      | Diagnostic::IllegalInSingleTerminalScope { at }
      | Diagnostic::IllegalInNoAlternationScope { at }
      | Diagnostic::IllegalInSingleSubexprScope { at }
      | Diagnostic::IllegalInNoEndSubexprScope { at }
      | Diagnostic::RuleNameConflict { at, .. }
      | Diagnostic::RuleNeverDeclared { at, .. }
      | Diagnostic::RuleNeverDefined { at, .. }
      | Diagnostic::RuleAlreadyDefined { at, .. }
      | Diagnostic::RuleNotFound { at, .. }
      | Diagnostic::RuleMayNotBePpr { at, .. }
      | Diagnostic::IllegalRuleDeclare { at, .. }
      | Diagnostic::IllegalQualifier { at }
      | Diagnostic::IllegalRightAssoc { at }
      | Diagnostic::IllegalStringLiteral { at, .. }
      | Diagnostic::IllegalCharsetLiteral { at, .. }
      | Diagnostic::IllegalAmbiguity { at, .. }
      | Diagnostic::InternalError { at, .. }
      | Diagnostic::TerminalError { at, .. }
      | Diagnostic::NonterminalError { at, .. }
      | Diagnostic::RecoveryFailed { at } => *at,
    }
  }
}

impl Display for Diagnostic {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Diagnostic::StrayClose { at } => write!(f, "[{}:{}] close with no matching open", at.origin, at.offset),
      Diagnostic::ScopeNotClosed { at } => write!(f, "[{}:{}] scope was never closed", at.origin, at.offset),
      Diagnostic::IllegalInNoScope { at } => write!(f, "[{}:{}] opcode appears outside any rule body", at.origin, at.offset),
      Diagnostic::IllegalInLprScope { at } => write!(f, "[{}:{}] opcode is not legal inside a lexer rule", at.origin, at.offset),
      Diagnostic::IllegalInPprScope { at } => write!(f, "[{}:{}] opcode is not legal inside a parser rule", at.origin, at.offset),
      Diagnostic::IllegalInSingleTerminalScope { at } => write!(f, "[{}:{}] only a single terminal is legal here", at.origin, at.offset),
      Diagnostic::IllegalInNoAlternationScope { at } => write!(f, "[{}:{}] this construct may not have more than one alternative", at.origin, at.offset),
      Diagnostic::IllegalInSingleSubexprScope { at } => write!(f, "[{}:{}] this alternative must contain exactly one subexpression", at.origin, at.offset),
      Diagnostic::IllegalInNoEndSubexprScope { at } => write!(f, "[{}:{}] `end` may not appear here", at.origin, at.offset),
      Diagnostic::RuleNameConflict { at, name } => write!(f, "[{}:{}] `{}` conflicts with another rule name", at.origin, at.offset, name),
      Diagnostic::RuleNeverDeclared { at, name } => write!(f, "[{}:{}] `{}` is defined but was never declared", at.origin, at.offset, name),
      Diagnostic::RuleNeverDefined { at, name } => write!(f, "[{}:{}] `{}` is declared but never defined", at.origin, at.offset, name),
      Diagnostic::RuleAlreadyDefined { at, name } => write!(f, "[{}:{}] `{}` is defined more than once", at.origin, at.offset, name),
      Diagnostic::RuleNotFound { at, name } => write!(f, "[{}:{}] no rule named `{}`", at.origin, at.offset, name),
      Diagnostic::RuleMayNotBePpr { at, name } => write!(f, "[{}:{}] `{}` is a parser rule and cannot be referenced here", at.origin, at.offset, name),
      Diagnostic::IllegalRuleDeclare { at, name } => write!(f, "[{}:{}] `{}` declared after rule-defining has begun", at.origin, at.offset, name),
      Diagnostic::IllegalQualifier { at } => write!(f, "[{}:{}] qualifier is not legal on this declaration", at.origin, at.offset),
      Diagnostic::IllegalRightAssoc { at } => write!(f, "[{}:{}] right_assoc may only open a precedence-rule alternative", at.origin, at.offset),
      Diagnostic::IllegalStringLiteral { at, text } => write!(f, "[{}:{}] illegal string literal `{}`", at.origin, at.offset, text),
      Diagnostic::IllegalCharsetLiteral { at, text } => write!(f, "[{}:{}] illegal charset literal `{}`", at.origin, at.offset, text),
      Diagnostic::IllegalAmbiguity { at, nonterm } => write!(f, "[{}:{}] `{}` is ambiguous", at.origin, at.offset, nonterm),
      Diagnostic::InternalError { at, message } => write!(f, "[{}:{}] internal error: {}", at.origin, at.offset, message),
      Diagnostic::TerminalError { at, expected_low, expected_high, found } => {
        write!(f, "[{}:{}] expected a symbol in [{}, {}], found {}", at.origin, at.offset, expected_low, expected_high, found)
      }
      Diagnostic::NonterminalError { at, nonterm, found } => write!(f, "[{}:{}] `{}` has no rule for {}", at.origin, at.offset, nonterm, found),
      Diagnostic::RecoveryFailed { at } => write!(f, "[{}:{}] error recovery failed", at.origin, at.offset),
    }
  }
}

/// Accumulates diagnostics over one `compile()` call (or one parse). A
/// grammar object is only produced if `has_errors()` is false at the end of
/// compilation.
#[derive(Clone, Debug, Default)]
pub struct Report {
  diagnostics: Vec<Diagnostic>,
}

impl Report {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn push(&mut self, d: Diagnostic) {
    self.diagnostics.push(d);
  }

  pub fn error_count(&self) -> usize {
    self.diagnostics.len()
  }

  pub fn has_errors(&self) -> bool {
    !self.diagnostics.is_empty()
  }

  pub fn diagnostics(&self) -> &[Diagnostic] {
    &self.diagnostics
  }

  pub fn extend(&mut self, other: Report) {
    self.diagnostics.extend(other.diagnostics);
  }
}

impl Display for Report {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    for d in &self.diagnostics {
      writeln!(f, "{}", d)?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn report_starts_clean() {
    let r = Report::new();
    assert!(!r.has_errors());
    assert_eq!(r.error_count(), 0);
  }

  #[test]
  fn report_accumulates() {
    let mut r = Report::new();
    r.push(Diagnostic::StrayClose { at: SourcePos::new(0, 4) });
    r.push(Diagnostic::RuleNotFound { at: SourcePos::new(0, 8), name: "Foo".into() });
    assert!(r.has_errors());
    assert_eq!(r.error_count(), 2);
  }
}
