//! Lowering: turns the opcode stream into rules in the lexer and parser
//! parse tables, running alongside `validate::Validator` in one traversal.

use std::collections::HashMap;

use crate::compiler::charset::{parse_charset_literal, parse_string_literal};
use crate::compiler::validate::{ScopeKind, Validator};
use crate::diagnostics::{Diagnostic, Report};
use crate::llspec::{LlSpec, Qualifier, SourcePos, Visitor};
use crate::nonterm_alloc::NontermIdAlloc;
use crate::parse_table::{NontermKind, ParseTable, Rule, Term};
use crate::symbol::{self, Domain, Id};
use crate::symbol_set::SymbolSet;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Mode {
  Lpr,
  Ppr,
  PprPrecedence,
  Sequence,
  Lookahead,
  LookaheadNot,
  Not,
  Optional,
  KleeneStar,
  KleenePlusBody,
}

impl Mode {
  fn is_set_like(self) -> bool {
    matches!(self, Mode::Lookahead | Mode::LookaheadNot | Mode::Not)
  }

  fn assertion(self) -> bool {
    matches!(self, Mode::Lookahead | Mode::LookaheadNot)
  }
}

struct SubruleFrame {
  nonterm: Id,
  domain: Domain,
  mode: Mode,
  current_rule: Option<usize>,
  pending_set: SymbolSet,
  pending_terms: Vec<Term>,
  preced_alts: Vec<(Vec<Term>, bool)>,
  pending_right_assoc: bool,
  preced_val: u32,
}

pub struct Lowerer {
  report: Report,
  validator: Validator,
  lpr_table: ParseTable,
  ppr_table: ParseTable,
  lpr_alloc: NontermIdAlloc,
  ppr_alloc: NontermIdAlloc,
  names: HashMap<String, (Id, Domain)>,
  declared: std::collections::HashSet<String>,
  defined: std::collections::HashSet<String>,
  defining_started: bool,
  subrules: Vec<SubruleFrame>,
  helper_counter: u32,
}

pub struct LoweredTables {
  pub report: Report,
  pub lpr_table: ParseTable,
  pub ppr_table: ParseTable,
  pub names: HashMap<String, (Id, Domain)>,
}

impl Lowerer {
  pub fn new() -> Self {
    Self {
      report: Report::new(),
      validator: Validator::new(),
      lpr_table: ParseTable::new(Domain::Glyph),
      ppr_table: ParseTable::new(Domain::Token),
      lpr_alloc: NontermIdAlloc::new(Domain::Glyph),
      ppr_alloc: NontermIdAlloc::new(Domain::Token),
      names: HashMap::new(),
      declared: std::collections::HashSet::new(),
      defined: std::collections::HashSet::new(),
      defining_started: false,
      subrules: Vec::new(),
      helper_counter: 0,
    }
  }

  pub fn run(mut self, spec: &LlSpec) -> LoweredTables {
    crate::llspec::walk(spec, &mut self);
    for name in self.declared.difference(&self.defined).cloned().collect::<Vec<_>>() {
      self.report.push(Diagnostic::RuleNeverDefined { at: SourcePos::synthetic(), name });
    }
    for frame in self.validator.unclosed().collect::<Vec<_>>() {
      self.report.push(Diagnostic::ScopeNotClosed { at: frame.open_pos });
    }
    LoweredTables { report: self.report, lpr_table: self.lpr_table, ppr_table: self.ppr_table, names: self.names }
  }

  fn table_mut(&mut self, domain: Domain) -> &mut ParseTable {
    match domain {
      Domain::Glyph => &mut self.lpr_table,
      Domain::Token => &mut self.ppr_table,
    }
  }

  fn alloc_mut(&mut self, domain: Domain) -> &mut NontermIdAlloc {
    match domain {
      Domain::Glyph => &mut self.lpr_alloc,
      Domain::Token => &mut self.ppr_alloc,
    }
  }

  fn next_helper_name(&mut self, base: &str) -> String {
    self.helper_counter += 1;
    format!("{}~h{}", base, self.helper_counter)
  }

  /// Appends `term` to whatever the innermost active subrule is tracking:
  /// the set-like accumulator, the pending-terms buffer, or the current
  /// rule in the owning table.
  fn emit_term(&mut self, term: Term) {
    let Some(frame) = self.subrules.last_mut() else {
      self.report.push(Diagnostic::IllegalInNoScope { at: SourcePos::synthetic() });
      return;
    };
    if frame.mode.is_set_like() {
      match term {
        Term::Terminal { low, high, .. } => frame.pending_set.add_range(low, high),
        _ => self.report.push(Diagnostic::IllegalInSingleTerminalScope { at: SourcePos::synthetic() }),
      }
      return;
    }
    match (frame.mode, frame.current_rule) {
      (Mode::Sequence | Mode::KleenePlusBody, _) => frame.pending_terms.push(term),
      (Mode::PprPrecedence, _) => {
        if frame.preced_alts.is_empty() {
          frame.preced_alts.push((Vec::new(), false));
        }
        frame.preced_alts.last_mut().unwrap().0.push(term);
      }
      (_, Some(idx)) => {
        let domain = frame.domain;
        self.table_mut(domain).rule_mut(idx).terms.push(term);
      }
      (_, None) => self.report.push(Diagnostic::IllegalInNoScope { at: SourcePos::synthetic() }),
    }
  }

  fn resolve_name(&mut self, pos: SourcePos, target: &str, from_domain: Domain) -> Option<Term> {
    let Some(&(id, domain)) = self.names.get(target) else {
      self.report.push(Diagnostic::RuleNotFound { at: pos, name: target.to_string() });
      return None;
    };
    match (from_domain, domain) {
      (Domain::Glyph, Domain::Glyph) => Some(Term::NonterminalRef { id, preced_val: 0 }),
      (Domain::Glyph, Domain::Token) => {
        self.report.push(Diagnostic::RuleMayNotBePpr { at: pos, name: target.to_string() });
        None
      }
      (Domain::Token, Domain::Glyph) => Some(Term::Terminal { low: id, high: id, assertion: false }),
      (Domain::Token, Domain::Token) => {
        let preced_val = self.subrules.last().map(|f| f.preced_val).unwrap_or(0);
        Some(Term::NonterminalRef { id, preced_val })
      }
    }
  }
}

impl Visitor for Lowerer {
  fn on_lpr_decl(&mut self, pos: SourcePos, name: &str) {
    if self.defining_started {
      self.report.push(Diagnostic::IllegalRuleDeclare { at: pos, name: name.to_string() });
      return;
    }
    if self.names.contains_key(name) {
      self.report.push(Diagnostic::RuleNameConflict { at: pos, name: name.to_string() });
      return;
    }
    let id = self.lpr_alloc.alloc_main();
    self.names.insert(name.to_string(), (id, Domain::Glyph));
    self.declared.insert(name.to_string());
    self.lpr_table.set_name(id, name.to_string(), NontermKind::Main);
  }

  fn on_ppr_decl(&mut self, pos: SourcePos, name: &str) {
    if self.defining_started {
      self.report.push(Diagnostic::IllegalRuleDeclare { at: pos, name: name.to_string() });
      return;
    }
    if self.names.contains_key(name) {
      self.report.push(Diagnostic::RuleNameConflict { at: pos, name: name.to_string() });
      return;
    }
    let id = self.ppr_alloc.alloc_main();
    self.names.insert(name.to_string(), (id, Domain::Token));
    self.declared.insert(name.to_string());
    self.ppr_table.set_name(id, name.to_string(), NontermKind::Main);
  }

  fn on_lpr(&mut self, pos: SourcePos, name: &str, qualifier: Qualifier) {
    self.defining_started = true;
    if matches!(qualifier, Qualifier::Precedence) {
      self.report.push(Diagnostic::IllegalQualifier { at: pos });
    }
    if !self.declared.contains(name) {
      self.report.push(Diagnostic::RuleNeverDeclared { at: pos, name: name.to_string() });
    }
    if !self.defined.insert(name.to_string()) {
      self.report.push(Diagnostic::RuleAlreadyDefined { at: pos, name: name.to_string() });
    }
    let id = match self.names.get(name) {
      Some(&(id, _)) => id,
      None => {
        let id = self.lpr_alloc.alloc_helper();
        self.names.insert(name.to_string(), (id, Domain::Glyph));
        self.lpr_table.set_name(id, name.to_string(), NontermKind::Main);
        id
      }
    };
    self.lpr_table.set_qualifier(id, qualifier);
    self.validator.push(ScopeKind::Lpr, pos);
    self.subrules.push(SubruleFrame {
      nonterm: id,
      domain: Domain::Glyph,
      mode: Mode::Lpr,
      current_rule: None,
      pending_set: SymbolSet::new(Domain::Glyph),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
  }

  fn on_ppr(&mut self, pos: SourcePos, name: &str, qualifier: Qualifier) {
    self.defining_started = true;
    if matches!(qualifier, Qualifier::Skip | Qualifier::Support) {
      self.report.push(Diagnostic::IllegalQualifier { at: pos });
    }
    if !self.declared.contains(name) {
      self.report.push(Diagnostic::RuleNeverDeclared { at: pos, name: name.to_string() });
    }
    if !self.defined.insert(name.to_string()) {
      self.report.push(Diagnostic::RuleAlreadyDefined { at: pos, name: name.to_string() });
    }
    let id = match self.names.get(name) {
      Some(&(id, _)) => id,
      None => {
        let id = self.ppr_alloc.alloc_helper();
        self.names.insert(name.to_string(), (id, Domain::Token));
        self.ppr_table.set_name(id, name.to_string(), NontermKind::Main);
        id
      }
    };
    self.ppr_table.set_qualifier(id, qualifier);
    self.validator.push(ScopeKind::Ppr, pos);
    let mode = if matches!(qualifier, Qualifier::Precedence) { Mode::PprPrecedence } else { Mode::Ppr };
    self.subrules.push(SubruleFrame {
      nonterm: id,
      domain: Domain::Token,
      mode,
      current_rule: None,
      pending_set: SymbolSet::new(Domain::Token),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
  }

  fn on_close(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.pop(pos) {
      self.report.push(d);
      return;
    }
    let Some(frame) = self.subrules.pop() else { return };
    match frame.mode {
      Mode::Lookahead | Mode::LookaheadNot | Mode::Not => {
        let mut set = frame.pending_set;
        if matches!(frame.mode, Mode::LookaheadNot | Mode::Not) {
          set = set.inverse();
          set.remove_id(frame.domain.end_of_input());
          set.set_epsilon(false);
        }
        let assertion = frame.mode.assertion();
        for &(lo, hi) in set.ranges() {
          self.table_mut(frame.domain).add_rule(frame.nonterm, Rule { terms: vec![Term::Terminal { low: lo, high: hi, assertion }] });
        }
        self.emit_term(Term::NonterminalRef { id: frame.nonterm, preced_val: 0 });
      }
      Mode::Sequence => {
        self.table_mut(frame.domain).add_rule(frame.nonterm, Rule { terms: frame.pending_terms });
        self.emit_term(Term::NonterminalRef { id: frame.nonterm, preced_val: 0 });
      }
      Mode::KleenePlusBody => {
        // `frame` carries the body V; wrap with two more helpers to get "V V*".
        let v_id = frame.nonterm;
        let domain = frame.domain;
        self.table_mut(domain).add_rule(v_id, Rule { terms: frame.pending_terms });

        let star_id = self.alloc_mut(domain).alloc_helper();
        let __name = self.next_helper_name("kleene_star");
        self.table_mut(domain).set_name(star_id, __name, NontermKind::Helper);
        self.table_mut(domain).add_rule(star_id, Rule { terms: vec![] });
        self.table_mut(domain).add_rule(
          star_id,
          Rule { terms: vec![Term::NonterminalRef { id: v_id, preced_val: 0 }, Term::NonterminalRef { id: star_id, preced_val: 0 }] },
        );

        let seq_id = self.alloc_mut(domain).alloc_helper();
        let __name = self.next_helper_name("kleene_plus");
        self.table_mut(domain).set_name(seq_id, __name, NontermKind::Helper);
        self.table_mut(domain).add_rule(
          seq_id,
          Rule { terms: vec![Term::NonterminalRef { id: v_id, preced_val: 0 }, Term::NonterminalRef { id: star_id, preced_val: 0 }] },
        );

        self.emit_term(Term::NonterminalRef { id: seq_id, preced_val: 0 });
      }
      Mode::KleeneStar => {
        // the repetition rule's body was filled in incrementally; append the
        // self-recursive tail call now that the body is complete.
        let idx = frame.current_rule.expect("kleene_star always opens its repetition rule");
        self.table_mut(frame.domain).rule_mut(idx).terms.push(Term::NonterminalRef { id: frame.nonterm, preced_val: 0 });
      }
      Mode::Optional => {
        // handled incrementally: the epsilon and body alternatives were
        // already written directly into the table as they closed, and the
        // reference was emitted when the helper was allocated.
      }
      Mode::Lpr | Mode::Ppr => {}
      Mode::PprPrecedence => self.close_precedence_ppr(frame),
    }
  }

  fn on_alternative(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.begin_alternative(pos) {
      self.report.push(d);
      return;
    }
    let Some(frame) = self.subrules.last_mut() else { return };
    frame.pending_right_assoc = false;
    if frame.mode.is_set_like() || matches!(frame.mode, Mode::Sequence | Mode::KleenePlusBody) {
      return;
    }
    if matches!(frame.mode, Mode::PprPrecedence) {
      frame.preced_alts.push((Vec::new(), false));
      return;
    }
    let domain = frame.domain;
    let nonterm = frame.nonterm;
    let idx = self.table_mut(domain).add_rule(nonterm, Rule::new());
    self.subrules.last_mut().unwrap().current_rule = Some(idx);
  }

  fn on_right_assoc(&mut self, pos: SourcePos) {
    let Some(frame) = self.subrules.last_mut() else {
      self.report.push(Diagnostic::IllegalRightAssoc { at: pos });
      return;
    };
    if !matches!(frame.mode, Mode::PprPrecedence) {
      self.report.push(Diagnostic::IllegalRightAssoc { at: pos });
      return;
    }
    frame.pending_right_assoc = true;
    if let Some(alt) = frame.preced_alts.last_mut() {
      alt.1 = true;
    }
  }

  fn on_end(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, true, true) {
      self.report.push(d);
      return;
    }
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    self.emit_term(Term::Terminal { low: domain.end_of_input(), high: domain.end_of_input(), assertion: true });
  }

  fn on_any(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, true, false) {
      self.report.push(d);
      return;
    }
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    let (lo, hi) = match domain {
      Domain::Glyph => (symbol::FIRST_CP, symbol::LAST_NORMAL_CP),
      Domain::Token => (symbol::FIRST_LPR, symbol::LAST_NORMAL_LPR),
    };
    self.emit_term(Term::Terminal { low: lo, high: hi, assertion: false });
  }

  fn on_string(&mut self, pos: SourcePos, text: &str) {
    let is_single = text.chars().count() <= 1;
    if let Some(d) = self.validator.enter_subexpr(pos, is_single, false) {
      self.report.push(d);
      return;
    }
    let cps = match parse_string_literal(text) {
      Ok(cps) => cps,
      Err(_) => {
        self.report.push(Diagnostic::IllegalStringLiteral { at: pos, text: text.to_string() });
        return;
      }
    };
    for cp in cps {
      self.emit_term(Term::Terminal { low: cp, high: cp, assertion: false });
    }
  }

  fn on_charset(&mut self, pos: SourcePos, text: &str) {
    if let Some(d) = self.validator.enter_subexpr(pos, true, false) {
      self.report.push(d);
      return;
    }
    let ranges = match parse_charset_literal(text) {
      Ok(r) => r,
      Err(_) => {
        self.report.push(Diagnostic::IllegalCharsetLiteral { at: pos, text: text.to_string() });
        return;
      }
    };
    let set_like = self.subrules.last().is_some_and(|f| f.mode.is_set_like());
    if set_like {
      for (lo, hi) in ranges {
        self.emit_term(Term::Terminal { low: lo, high: hi, assertion: false });
      }
      return;
    }
    if ranges.len() == 1 {
      let (lo, hi) = ranges[0];
      self.emit_term(Term::Terminal { low: lo, high: hi, assertion: false });
      return;
    }
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    let helper = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name("charset");
    self.table_mut(domain).set_name(helper, __name, NontermKind::Helper);
    for (lo, hi) in ranges {
      self.table_mut(domain).add_rule(helper, Rule { terms: vec![Term::Terminal { low: lo, high: hi, assertion: false }] });
    }
    self.emit_term(Term::NonterminalRef { id: helper, preced_val: 0 });
  }

  fn on_token(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, true, false) {
      self.report.push(d);
      return;
    }
    self.emit_term(Term::Terminal { low: symbol::FIRST_LPR, high: symbol::LAST_NORMAL_LPR, assertion: false });
  }

  fn on_failure(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, true, false) {
      self.report.push(d);
      return;
    }
    self.emit_term(Term::Terminal { low: symbol::FAILURE_LPR, high: symbol::FAILURE_LPR, assertion: false });
  }

  fn on_name(&mut self, pos: SourcePos, target: &str) {
    if let Some(d) = self.validator.enter_subexpr(pos, true, false) {
      self.report.push(d);
      return;
    }
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    if let Some(term) = self.resolve_name(pos, target, domain) {
      self.emit_term(term);
    }
  }

  fn on_sequence(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, false, false) {
      self.report.push(d);
      return;
    }
    self.validator.push(ScopeKind::Sequence, pos);
    let set_like = self.subrules.last().is_some_and(|f| f.mode.is_set_like());
    if set_like || self.subrules.last().is_some_and(|f| matches!(f.mode, Mode::KleenePlusBody)) {
      // transparent: handled by the validator's single_terminal inheritance;
      // no new subrule frame, terms flow straight into the parent.
      return;
    }
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    self.subrules.push(SubruleFrame {
      nonterm: 0,
      domain,
      mode: Mode::Sequence,
      current_rule: None,
      pending_set: SymbolSet::new(domain),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
    let helper = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name("sequence");
    self.table_mut(domain).set_name(helper, __name, NontermKind::Helper);
    self.subrules.last_mut().unwrap().nonterm = helper;
  }

  fn on_lookahead(&mut self, pos: SourcePos) {
    self.open_set_like(pos, ScopeKind::Lookahead, Mode::Lookahead, "lookahead");
  }

  fn on_lookahead_not(&mut self, pos: SourcePos) {
    self.open_set_like(pos, ScopeKind::LookaheadNot, Mode::LookaheadNot, "lookahead_not");
  }

  fn on_not(&mut self, pos: SourcePos) {
    self.open_set_like(pos, ScopeKind::Not, Mode::Not, "not");
  }

  fn on_optional(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, false, false) {
      self.report.push(d);
      return;
    }
    self.validator.push(ScopeKind::Optional, pos);
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    let helper = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name("optional");
    self.table_mut(domain).set_name(helper, __name, NontermKind::Helper);
    self.table_mut(domain).add_rule(helper, Rule { terms: vec![] });
    self.emit_term(Term::NonterminalRef { id: helper, preced_val: 0 });
    let idx = self.table_mut(domain).add_rule(helper, Rule::new());
    self.subrules.push(SubruleFrame {
      nonterm: helper,
      domain,
      mode: Mode::Optional,
      current_rule: Some(idx),
      pending_set: SymbolSet::new(domain),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
  }

  fn on_kleene_star(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, false, false) {
      self.report.push(d);
      return;
    }
    self.validator.push(ScopeKind::KleeneStar, pos);
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    let helper = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name("kleene_star");
    self.table_mut(domain).set_name(helper, __name, NontermKind::Helper);
    self.table_mut(domain).add_rule(helper, Rule { terms: vec![] });
    self.emit_term(Term::NonterminalRef { id: helper, preced_val: 0 });
    let idx = self.table_mut(domain).add_rule(helper, Rule::new());
    self.subrules.push(SubruleFrame {
      nonterm: helper,
      domain,
      mode: Mode::KleeneStar,
      current_rule: Some(idx),
      pending_set: SymbolSet::new(domain),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
  }

  fn on_kleene_plus(&mut self, pos: SourcePos) {
    if let Some(d) = self.validator.enter_subexpr(pos, false, false) {
      self.report.push(d);
      return;
    }
    self.validator.push(ScopeKind::KleenePlus, pos);
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    let v_id = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name("kleene_plus_body");
    self.table_mut(domain).set_name(v_id, __name, NontermKind::Helper);
    self.subrules.push(SubruleFrame {
      nonterm: v_id,
      domain,
      mode: Mode::KleenePlusBody,
      current_rule: None,
      pending_set: SymbolSet::new(domain),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
  }

  fn on_preced_pred(&mut self, pos: SourcePos, preced_max: u32, preced_val: u32) {
    self.emit_term(Term::PrecedencePredicate { preced_max, preced_val });
    let _ = pos;
  }

  fn on_pylon(&mut self, _pos: SourcePos) {
    self.emit_term(Term::Pylon);
  }
}

impl Lowerer {
  fn open_set_like(&mut self, pos: SourcePos, scope: ScopeKind, mode: Mode, label: &str) {
    if let Some(d) = self.validator.enter_subexpr(pos, false, false) {
      self.report.push(d);
      return;
    }
    self.validator.push(scope, pos);
    let domain = self.subrules.last().map(|f| f.domain).unwrap_or(Domain::Glyph);
    let helper = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name(label);
    self.table_mut(domain).set_name(helper, __name, NontermKind::Helper);
    self.subrules.push(SubruleFrame {
      nonterm: helper,
      domain,
      mode,
      current_rule: None,
      pending_set: SymbolSet::new(domain),
      pending_terms: Vec::new(),
      preced_alts: Vec::new(),
      pending_right_assoc: false,
      preced_val: 0,
    });
  }

  /// Re-shapes a precedence PPR's collected alternatives into classic
  /// precedence-climbing form: base alternatives (not opening with a direct
  /// self-reference) become the PPR's own rules, each followed by a call
  /// into a synthesized continuation-loop helper; recurse alternatives
  /// (opening with a direct self-reference, standing for "the operand
  /// already parsed") become the helper's own guarded, self-looping rules,
  /// dispatched on their own leading terminal rather than on the PPR's
  /// (shared, ambiguous) FIRST set. A left-associative alternative's operand
  /// re-enters one level above its own, so the loop won't fold a later
  /// same-precedence operator into it; a right-associative one re-enters at
  /// its own level, so it will.
  ///
  /// Scope: only the last term of a recurse alternative may refer back to
  /// the PPR itself (one right-hand operand per alternative); n-ary
  /// operators aren't supported.
  fn close_precedence_ppr(&mut self, frame: SubruleFrame) {
    let nonterm = frame.nonterm;
    let domain = frame.domain;

    let mut base_alts = Vec::new();
    let mut recurse_alts = Vec::new();
    for (alt_index, (terms, right_assoc)) in frame.preced_alts.into_iter().enumerate() {
      let alt_index = alt_index as u32 + 1;
      let is_recurse = matches!(terms.first(), Some(Term::NonterminalRef { id, .. }) if *id == nonterm);
      if is_recurse {
        recurse_alts.push((alt_index, terms, right_assoc));
      } else {
        base_alts.push(terms);
      }
    }

    if recurse_alts.is_empty() {
      for terms in base_alts {
        self.table_mut(domain).add_rule(nonterm, Rule { terms });
      }
      return;
    }

    let helper = self.alloc_mut(domain).alloc_helper();
    let __name = self.next_helper_name("preced_loop");
    self.table_mut(domain).set_name(helper, __name, NontermKind::Helper);
    self.table_mut(domain).add_rule(helper, Rule { terms: vec![] });

    for mut terms in base_alts {
      terms.push(Term::NonterminalRefInherit { id: helper });
      self.table_mut(domain).add_rule(nonterm, Rule { terms });
    }

    for (alt_index, terms, right_assoc) in recurse_alts {
      let reentry_val = if right_assoc { alt_index } else { alt_index + 1 };
      let mut rule_terms = Vec::with_capacity(terms.len() + 2);
      rule_terms.push(Term::PrecedencePredicate { preced_max: alt_index, preced_val: 0 });
      rule_terms.extend(terms.into_iter().skip(1).map(|t| match t {
        Term::NonterminalRef { id, .. } if id == nonterm => Term::NonterminalRef { id, preced_val: reentry_val },
        other => other,
      }));
      rule_terms.push(Term::NonterminalRefInherit { id: helper });
      rule_terms.push(Term::Pylon);
      self.table_mut(domain).add_rule(helper, Rule { terms: rule_terms });
    }
  }
}
