use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{arg, value_parser, ArgMatches, Command};
use llparse_cli::{load_grammar, run_repl};

fn command() -> ArgMatches {
  Command::new("llparse")
    .version("0.1.0")
    .subcommand(
      Command::new("parse")
        .about("Loads a grammar file, then parses each line typed at stdin against its Start rule.")
        .arg(arg!(<GRAMMAR> "Path to the grammar-file to load").value_parser(value_parser!(PathBuf)).required(true)),
    )
    .get_matches()
}

fn main() -> ExitCode {
  let matches = command();
  let Some(matches) = matches.subcommand_matches("parse") else {
    eprintln!("expected subcommand: parse <GRAMMAR>");
    return ExitCode::FAILURE;
  };
  let path = matches.get_one::<PathBuf>("GRAMMAR").expect("required");
  let grammar = match load_grammar(path) {
    Ok(g) => g,
    Err(msg) => {
      eprintln!("{msg}");
      return ExitCode::FAILURE;
    }
  };
  let stdin = io::stdin();
  let mut stdout = io::stdout();
  run_repl(&grammar, stdin.lock(), &mut stdout)
}
