//! REPL core behind the `llparse parse <grammar-file>` command, split out
//! of `bin.rs` so it can be driven over an in-memory reader/writer in
//! tests instead of real stdio.

use std::io::{BufRead, Write};
use std::path::Path;
use std::process::ExitCode;

use llparse_bootstrap::translate;
use llparse_core::Grammar;
use llparse_runtime::{LexerDriver, LexerTokenSource, NullLexerObserver, NullParseObserver, ParserDriver, SourceReader};

pub const START_RULE: &str = "Start";

/// Loads and compiles the grammar at `path`. The returned `Err` string is
/// already formatted for direct display; it folds together file-read
/// failures, bootstrap-translation failures, and compiler diagnostics.
pub fn load_grammar(path: &Path) -> Result<Grammar, String> {
  let text = std::fs::read_to_string(path).map_err(|e| format!("failed to read {}: {e}", path.display()))?;
  let origin = path.display().to_string();
  let spec = translate(&origin, &text).map_err(|e| format!("{}: {e}", path.display()))?;
  Grammar::compile(&spec).map_err(|report| format!("{}: {report}", path.display()))
}

#[derive(Debug, PartialEq, Eq)]
pub enum LineOutcome {
  /// The `exit` line was seen; the parser driver was never invoked.
  Exit,
  Parsed { ok: bool },
}

/// Classifies and, unless it's `exit`, parses one REPL line against
/// `grammar`'s `Start` rule.
pub fn handle_line(grammar: &Grammar, line: &str) -> LineOutcome {
  if line == "exit" {
    return LineOutcome::Exit;
  }
  let mut reader = SourceReader::new();
  reader.add_str("<input>", line);
  let mut lexer_observer = NullLexerObserver;
  let mut source = LexerTokenSource { grammar, reader: &reader, lexer: LexerDriver::new(), observer: &mut lexer_observer };
  let mut observer = NullParseObserver;
  let ok = ParserDriver::new().parse(grammar, START_RULE, &mut source, &mut observer, None).is_ok();
  LineOutcome::Parsed { ok }
}

/// Drives the REPL loop over `input`, writing prompts and results to
/// `output`, until `exit` or end-of-input.
pub fn run_repl(grammar: &Grammar, mut input: impl BufRead, output: &mut impl Write) -> ExitCode {
  loop {
    let _ = write!(output, "> ");
    let _ = output.flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
      Ok(0) => return ExitCode::SUCCESS,
      Ok(_) => {}
      Err(e) => {
        let _ = writeln!(output, "input error: {e}");
        return ExitCode::FAILURE;
      }
    }
    let line = line.trim_end_matches(['\n', '\r']);
    match handle_line(grammar, line) {
      LineOutcome::Exit => return ExitCode::SUCCESS,
      LineOutcome::Parsed { ok: true } => {
        let _ = writeln!(output, "ok");
      }
      LineOutcome::Parsed { ok: false } => {
        let _ = writeln!(output, "parse failed");
      }
    }
  }
}
