//! Low-level IR: a linear stream of opcode records with source positions.
//!
//! A `LlSpec` is built by a `Writer` (either directly, by hand-constructed
//! grammars such as the bootstrap grammar, or indirectly, by translating
//! parsed grammar-file text) and consumed by a `Visitor` implementation
//! during compilation. Concatenating two specs is just buffer
//! concatenation: `a.concat(&b)` appends `b`'s records after `a`'s.

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SourcePos {
  pub origin: u32,
  pub offset: u32,
}

impl SourcePos {
  pub const fn new(origin: u32, offset: u32) -> Self {
    Self { origin, offset }
  }

  pub const fn synthetic() -> Self {
    Self { origin: u32::MAX, offset: 0 }
  }
}

/// Composite qualifiers on `lpr`/`ppr` declarations.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Qualifier {
  None,
  Skip,
  Support,
  Precedence,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Opcode {
  LprDecl { name: String },
  PprDecl { name: String },
  Lpr { name: String, qualifier: Qualifier },
  Ppr { name: String, qualifier: Qualifier },
  Close,
  Alternative,
  RightAssoc,

  End,
  Any,
  String { text: String },
  Charset { text: String },
  Token,
  Failure,
  Name { target: String },

  Sequence,
  Lookahead,
  LookaheadNot,
  Not,
  Optional,
  KleeneStar,
  KleenePlus,

  PrecedPred { preced_max: u32, preced_val: u32 },
  Pylon,
}

#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct LlSpec {
  records: Vec<(SourcePos, Opcode)>,
}

impl LlSpec {
  pub fn new() -> Self {
    Self { records: Vec::new() }
  }

  pub fn len(&self) -> usize {
    self.records.len()
  }

  pub fn is_empty(&self) -> bool {
    self.records.is_empty()
  }

  pub fn push(&mut self, pos: SourcePos, op: Opcode) {
    self.records.push((pos, op));
  }

  pub fn concat(&mut self, other: &LlSpec) {
    self.records.extend_from_slice(&other.records);
  }

  pub fn records(&self) -> &[(SourcePos, Opcode)] {
    &self.records
  }
}

/// Builds an `LlSpec` through the same API every grammar (hand-built or
/// translated) goes through.
#[derive(Default)]
pub struct Writer {
  spec: LlSpec,
}

impl Writer {
  pub fn new() -> Self {
    Self { spec: LlSpec::new() }
  }

  pub fn emit(&mut self, pos: SourcePos, op: Opcode) -> &mut Self {
    self.spec.push(pos, op);
    self
  }

  pub fn finish(self) -> LlSpec {
    self.spec
  }
}

/// Walks an `LlSpec` one record at a time, decoding operands before each
/// `on_*` call.
pub struct Cursor<'a> {
  records: &'a [(SourcePos, Opcode)],
  index: usize,
}

impl<'a> Cursor<'a> {
  pub fn new(spec: &'a LlSpec) -> Self {
    Self { records: spec.records(), index: 0 }
  }

  pub fn pos(&self) -> Option<SourcePos> {
    self.records.get(self.index).map(|(p, _)| *p)
  }

  pub fn peek(&self) -> Option<&Opcode> {
    self.records.get(self.index).map(|(_, op)| op)
  }

  pub fn advance(&mut self) -> Option<(SourcePos, &'a Opcode)> {
    let rec = self.records.get(self.index)?;
    self.index += 1;
    Some((rec.0, &rec.1))
  }
}

/// Implemented by both compiler passes; driven by walking a `Cursor` to
/// completion. Each method receives the already-decoded operands and the
/// record's source position.
pub trait Visitor {
  fn on_lpr_decl(&mut self, pos: SourcePos, name: &str);
  fn on_ppr_decl(&mut self, pos: SourcePos, name: &str);
  fn on_lpr(&mut self, pos: SourcePos, name: &str, qualifier: Qualifier);
  fn on_ppr(&mut self, pos: SourcePos, name: &str, qualifier: Qualifier);
  fn on_close(&mut self, pos: SourcePos);
  fn on_alternative(&mut self, pos: SourcePos);
  fn on_right_assoc(&mut self, pos: SourcePos);

  fn on_end(&mut self, pos: SourcePos);
  fn on_any(&mut self, pos: SourcePos);
  fn on_string(&mut self, pos: SourcePos, text: &str);
  fn on_charset(&mut self, pos: SourcePos, text: &str);
  fn on_token(&mut self, pos: SourcePos);
  fn on_failure(&mut self, pos: SourcePos);
  fn on_name(&mut self, pos: SourcePos, target: &str);

  fn on_sequence(&mut self, pos: SourcePos);
  fn on_lookahead(&mut self, pos: SourcePos);
  fn on_lookahead_not(&mut self, pos: SourcePos);
  fn on_not(&mut self, pos: SourcePos);
  fn on_optional(&mut self, pos: SourcePos);
  fn on_kleene_star(&mut self, pos: SourcePos);
  fn on_kleene_plus(&mut self, pos: SourcePos);

  fn on_preced_pred(&mut self, pos: SourcePos, preced_max: u32, preced_val: u32);
  fn on_pylon(&mut self, pos: SourcePos);
}

/// Drives `visitor` over every record in `spec`, in order.
pub fn walk<V: Visitor>(spec: &LlSpec, visitor: &mut V) {
  for (pos, op) in spec.records() {
    let pos = *pos;
    match op {
      Opcode::LprDecl { name } => visitor.on_lpr_decl(pos, name),
      Opcode::PprDecl { name } => visitor.on_ppr_decl(pos, name),
      Opcode::Lpr { name, qualifier } => visitor.on_lpr(pos, name, *qualifier),
      Opcode::Ppr { name, qualifier } => visitor.on_ppr(pos, name, *qualifier),
      Opcode::Close => visitor.on_close(pos),
      Opcode::Alternative => visitor.on_alternative(pos),
      Opcode::RightAssoc => visitor.on_right_assoc(pos),

      Opcode::End => visitor.on_end(pos),
      Opcode::Any => visitor.on_any(pos),
      Opcode::String { text } => visitor.on_string(pos, text),
      Opcode::Charset { text } => visitor.on_charset(pos, text),
      Opcode::Token => visitor.on_token(pos),
      Opcode::Failure => visitor.on_failure(pos),
      Opcode::Name { target } => visitor.on_name(pos, target),

      Opcode::Sequence => visitor.on_sequence(pos),
      Opcode::Lookahead => visitor.on_lookahead(pos),
      Opcode::LookaheadNot => visitor.on_lookahead_not(pos),
      Opcode::Not => visitor.on_not(pos),
      Opcode::Optional => visitor.on_optional(pos),
      Opcode::KleeneStar => visitor.on_kleene_star(pos),
      Opcode::KleenePlus => visitor.on_kleene_plus(pos),

      Opcode::PrecedPred { preced_max, preced_val } => visitor.on_preced_pred(pos, *preced_max, *preced_val),
      Opcode::Pylon => visitor.on_pylon(pos),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Default)]
  struct Counter {
    n: usize,
  }

  impl Visitor for Counter {
    fn on_lpr_decl(&mut self, _: SourcePos, _: &str) {
      self.n += 1;
    }
    fn on_ppr_decl(&mut self, _: SourcePos, _: &str) {}
    fn on_lpr(&mut self, _: SourcePos, _: &str, _: Qualifier) {
      self.n += 1;
    }
    fn on_ppr(&mut self, _: SourcePos, _: &str, _: Qualifier) {}
    fn on_close(&mut self, _: SourcePos) {
      self.n += 1;
    }
    fn on_alternative(&mut self, _: SourcePos) {}
    fn on_right_assoc(&mut self, _: SourcePos) {}
    fn on_end(&mut self, _: SourcePos) {}
    fn on_any(&mut self, _: SourcePos) {}
    fn on_string(&mut self, _: SourcePos, _: &str) {}
    fn on_charset(&mut self, _: SourcePos, _: &str) {}
    fn on_token(&mut self, _: SourcePos) {}
    fn on_failure(&mut self, _: SourcePos) {}
    fn on_name(&mut self, _: SourcePos, _: &str) {}
    fn on_sequence(&mut self, _: SourcePos) {}
    fn on_lookahead(&mut self, _: SourcePos) {}
    fn on_lookahead_not(&mut self, _: SourcePos) {}
    fn on_not(&mut self, _: SourcePos) {}
    fn on_optional(&mut self, _: SourcePos) {}
    fn on_kleene_star(&mut self, _: SourcePos) {}
    fn on_kleene_plus(&mut self, _: SourcePos) {}
    fn on_preced_pred(&mut self, _: SourcePos, _: u32, _: u32) {}
    fn on_pylon(&mut self, _: SourcePos) {}
  }

  #[test]
  fn writer_then_walk_round_trips() {
    let mut w = Writer::new();
    w.emit(SourcePos::new(0, 0), Opcode::LprDecl { name: "digit".into() });
    w.emit(SourcePos::new(0, 10), Opcode::Lpr { name: "digit".into(), qualifier: Qualifier::None });
    w.emit(SourcePos::new(0, 20), Opcode::Close);
    let spec = w.finish();
    assert_eq!(spec.len(), 3);

    let mut c = Counter::default();
    walk(&spec, &mut c);
    assert_eq!(c.n, 3);
  }

  #[test]
  fn concat_appends_records_in_order() {
    let mut a = LlSpec::new();
    a.push(SourcePos::new(0, 0), Opcode::Any);
    let mut b = LlSpec::new();
    b.push(SourcePos::new(1, 0), Opcode::End);
    a.concat(&b);
    assert_eq!(a.len(), 2);
    assert_eq!(a.records()[1].0, SourcePos::new(1, 0));
  }

  #[test]
  fn cursor_peek_does_not_advance() {
    let mut spec = LlSpec::new();
    spec.push(SourcePos::new(0, 0), Opcode::Any);
    spec.push(SourcePos::new(0, 1), Opcode::End);
    let mut cur = Cursor::new(&spec);
    assert_eq!(cur.peek(), Some(&Opcode::Any));
    assert_eq!(cur.peek(), Some(&Opcode::Any));
    cur.advance();
    assert_eq!(cur.peek(), Some(&Opcode::End));
  }
}
