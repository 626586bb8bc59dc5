//! The stack-driven parsing engine shared by the lexer and parser drivers,
//! generic over a `Policy` supplying input and receiving output events.

use llparse_core::parse_table::{ParseTable, Term};
use llparse_core::Id;

/// Supplies input to, and receives output from, one run of the engine.
/// The lexer driver's policy peeks/advances code points; the parser
/// driver's policy peeks/advances tokens.
pub trait Policy {
  fn peek(&mut self) -> Id;
  fn next(&mut self);

  fn reinit_output(&mut self, start_rule: Id);
  fn output_terminal(&mut self, id: Id);
  fn output_nonterminal_begin(&mut self, id: Id);
  fn output_nonterminal_end(&mut self);

  /// Returns `true` to retry the term once against freshly sampled input
  /// (the handler may have advanced/discarded input as a side effect).
  fn terminal_error(&mut self, expected_low: Id, expected_high: Id, found: Id) -> bool {
    let _ = (expected_low, expected_high, found);
    false
  }

  fn nonterminal_error(&mut self, nonterm: Id, found: Id) -> bool {
    let _ = (nonterm, found);
    false
  }

  fn recovery_failed(&mut self) {}
}

#[derive(Clone, Debug)]
struct StackItem {
  term: Term,
  depth: u32,
}

pub enum RunResult {
  Success,
  Aborted,
}

pub struct Engine {
  stack: Vec<StackItem>,
  current_depth: u32,
}

impl Engine {
  pub fn new() -> Self {
    Self { stack: Vec::new(), current_depth: 0 }
  }

  /// Drives the engine from `start` (a main non-terminal ID) to completion
  /// against `table`, reporting events to `policy`.
  pub fn run<P: Policy>(&mut self, table: &ParseTable, start: Id, policy: &mut P) -> RunResult {
    self.stack.clear();
    self.current_depth = 0;
    policy.reinit_output(start);
    self.stack.push(StackItem { term: Term::NonterminalRef { id: start, preced_val: 0 }, depth: 0 });

    loop {
      let Some(item) = self.stack.pop() else {
        while self.current_depth > 0 {
          policy.output_nonterminal_end();
          self.current_depth -= 1;
        }
        return RunResult::Success;
      };

      while self.current_depth > item.depth {
        policy.output_nonterminal_end();
        self.current_depth -= 1;
      }

      match item.term {
        Term::Terminal { low, high, assertion } => {
          if !self.consume_terminal(low, high, assertion, policy) {
            return RunResult::Aborted;
          }
        }
        Term::NonterminalRef { id, preced_val } => {
          if !self.expand_nonterminal(table, id, preced_val, item.depth, policy) {
            return RunResult::Aborted;
          }
        }
        Term::PrecedencePredicate { preced_max, preced_val } => {
          if preced_val > preced_max {
            while let Some(next) = self.stack.pop() {
              if matches!(next.term, Term::Pylon) {
                break;
              }
            }
          }
        }
        Term::Pylon => {}
        Term::NonterminalRefInherit { .. } => unreachable!("rewritten to NonterminalRef before reaching the stack"),
      }
    }
  }

  fn consume_terminal<P: Policy>(&mut self, low: Id, high: Id, assertion: bool, policy: &mut P) -> bool {
    let found = policy.peek();
    if (low..=high).contains(&found) {
      if !assertion {
        policy.output_terminal(found);
        policy.next();
      }
      return true;
    }
    if policy.terminal_error(low, high, found) {
      let found = policy.peek();
      if (low..=high).contains(&found) {
        if !assertion {
          policy.output_terminal(found);
          policy.next();
        }
        return true;
      }
    }
    policy.recovery_failed();
    false
  }

  fn expand_nonterminal<P: Policy>(&mut self, table: &ParseTable, id: Id, preced_val: u32, caller_depth: u32, policy: &mut P) -> bool {
    let found = policy.peek();
    let mut rule_idx = table.lookup(id, found);
    if rule_idx.is_none() && policy.nonterminal_error(id, found) {
      let found = policy.peek();
      rule_idx = table.lookup(id, found);
    }
    let Some(rule_idx) = rule_idx else {
      policy.recovery_failed();
      return false;
    };

    let is_helper = table.is_helper(id);
    let child_depth = if is_helper {
      caller_depth
    } else {
      policy.output_nonterminal_begin(id);
      self.current_depth += 1;
      self.current_depth
    };

    for term in table.rule(rule_idx).terms.iter().rev() {
      let term = match term {
        Term::PrecedencePredicate { preced_max, preced_val: 0 } => Term::PrecedencePredicate { preced_max: *preced_max, preced_val },
        Term::NonterminalRefInherit { id } => Term::NonterminalRef { id: *id, preced_val },
        other => other.clone(),
      };
      self.stack.push(StackItem { term, depth: child_depth });
    }
    true
  }
}

impl Default for Engine {
  fn default() -> Self {
    Self::new()
  }
}
