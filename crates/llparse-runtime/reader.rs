//! Owns the concatenated source buffer both the grammar loader and the REPL
//! line parser read from. Chunks remember their origin label and starting
//! byte offset so future diagnostics can point back at "which file, which
//! line", even though rendering that is out of scope here.

use crate::glyph::Glyph;
use llparse_core::symbol::cp_id;

pub struct Chunk {
  pub origin: String,
  pub start: usize,
}

pub struct SourceReader {
  buffer: String,
  chunks: Vec<Chunk>,
}

impl SourceReader {
  pub fn new() -> Self {
    Self { buffer: String::new(), chunks: Vec::new() }
  }

  /// Appends a labeled chunk to the active buffer.
  pub fn add_str(&mut self, origin: impl Into<String>, text: &str) {
    let start = self.buffer.len();
    self.chunks.push(Chunk { origin: origin.into(), start });
    self.buffer.push_str(text);
  }

  /// Discards the current buffer and starts a fresh one from `text`, under
  /// a synthetic origin label. Used between REPL lines.
  pub fn change_input(&mut self, text: &str) {
    self.buffer.clear();
    self.chunks.clear();
    self.add_str("<input>", text);
  }

  pub fn as_str(&self) -> &str {
    &self.buffer
  }

  pub fn byte_len(&self) -> usize {
    self.buffer.len()
  }

  pub fn chunks(&self) -> &[Chunk] {
    &self.chunks
  }

  /// Decodes the code point starting at `byte_offset`, or `None` past the
  /// end of the buffer.
  pub fn glyph_at(&self, byte_offset: usize) -> Option<Glyph> {
    let ch = self.buffer[byte_offset..].chars().next()?;
    Some(Glyph { id: cp_id(ch as u32), byte_offset, byte_len: ch.len_utf8() as u8 })
  }
}

impl Default for SourceReader {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn add_str_tracks_chunk_start() {
    let mut r = SourceReader::new();
    r.add_str("a.grammar", "foo");
    r.add_str("b.grammar", "bar");
    assert_eq!(r.chunks()[1].start, 3);
    assert_eq!(r.as_str(), "foobar");
  }

  #[test]
  fn change_input_resets_buffer() {
    let mut r = SourceReader::new();
    r.add_str("grammar", "Start : 'a' ;");
    r.change_input("a");
    assert_eq!(r.as_str(), "a");
    assert_eq!(r.chunks().len(), 1);
  }

  #[test]
  fn glyph_at_decodes_multibyte() {
    let mut r = SourceReader::new();
    r.add_str("x", "a\u{1F600}b");
    let g0 = r.glyph_at(0).unwrap();
    assert_eq!(g0.byte_len, 1);
    let g1 = r.glyph_at(1).unwrap();
    assert_eq!(g1.byte_len, 4);
    assert_eq!(g1.id, cp_id(0x1F600));
  }
}
