#[cfg(test)]
mod lexer_basics;

#[cfg(test)]
mod lexer_skip_and_longest_match;

#[cfg(test)]
mod lexer_not_and_failure_probing;

#[cfg(test)]
mod lexer_empty_alternatives;

#[cfg(test)]
mod parser_precedence_climbing;

#[cfg(test)]
mod diagnostics_report;

#[cfg(test)]
mod bootstrap_roundtrip;

#[cfg(test)]
mod cli_repl;

#[cfg(test)]
mod opcode_preced_pred_and_pylon;

mod utils;
