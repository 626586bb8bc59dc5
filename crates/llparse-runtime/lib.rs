//! Runtime half of the toolkit: turns a compiled `Grammar` and a source
//! buffer into a running lexer + parser pipeline.

pub mod engine;
pub mod glyph;
pub mod lexer;
pub mod parser;
pub mod reader;

pub use engine::{Engine, Policy, RunResult};
pub use glyph::{Glyph, Token};
pub use lexer::{LexerDriver, LexerObserver, LexerTokenSource, NullObserver as NullLexerObserver};
pub use parser::{ErrorHandler, NullObserver as NullParseObserver, ParseObserver, ParserDriver, TokenSource, VecTokenSource};
pub use reader::SourceReader;
