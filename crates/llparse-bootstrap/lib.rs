//! The fixed, hand-built grammar that compiles grammar-file text into an
//! opcode stream, and the tree-walking translator that drives it.

pub mod grammar;
pub mod translate;

pub use grammar::bootstrap_grammar;
pub use translate::{translate, TranslateError};
