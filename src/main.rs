mod ast;
mod builtins;
mod config;
mod diagnostics;
mod env;
mod error;
mod interpreter;
mod parser;
mod scanner;
mod token;
mod value;

use ast::Stmt;
use clap::Parser as ClapParser;
use diagnostics::Diagnostics;
use interpreter::Interpreter;
use parser::Parser as LoxParser;
use rustyline::error::ReadlineError;
use rustyline::{Config, DefaultEditor};
use scanner::Scanner;
use std::path::PathBuf;
use std::process::ExitCode;

/// A tree-walking interpreter for the Lox scripting language.
#[derive(ClapParser, Debug)]
#[command(name = "plox")]
#[command(version = config::VERSION)]
#[command(about = "A tree-walking interpreter for Lox")]
struct CliArgs {
    /// Script file to execute. Starts the REPL when omitted.
    #[arg(value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() -> ExitCode {
    let args = CliArgs::parse();

    match args.script {
        Some(path) => run_file(&path),
        None => run_repl(),
    }
}

/// Runs a script file. Exit codes follow sysexits convention: 65 for a
/// syntax error, 70 for a runtime error, 1 if the file can't be opened.
fn run_file(path: &PathBuf) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(source) => source,
        Err(err) => {
            eprintln!("Cannot read file '{}': {}", path.display(), err);
            return ExitCode::from(1);
        }
    };

    let mut diagnostics = Diagnostics::new();
    let statements = parse_source(&source, &mut diagnostics);

    if diagnostics.had_syntax_error {
        return ExitCode::from(65);
    }

    let interpreter = Interpreter::new();
    interpreter.interpret(&statements, &mut diagnostics);

    if diagnostics.had_runtime_error {
        return ExitCode::from(70);
    }

    ExitCode::SUCCESS
}

/// Runs the interactive REPL. `.exit` quits, `.clear` clears the
/// screen; any other input is scanned/parsed/evaluated as a one-line
/// program, sharing a single `Interpreter` (and thus a single global
/// environment) across the whole session.
fn run_repl() -> ExitCode {
    println!("{} {}", config::WELCOME_BANNER, config::VERSION);

    let rl_config = Config::builder().auto_add_history(true).build();
    let mut editor = match DefaultEditor::with_config(rl_config) {
        Ok(editor) => editor,
        Err(err) => {
            eprintln!("Failed to initialize REPL: {err}");
            return ExitCode::from(1);
        }
    };
    let _ = editor.load_history(config::HISTORY_FILE);

    let interpreter = Interpreter::new();
    let mut diagnostics = Diagnostics::new();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                match trimmed {
                    "" => continue,
                    ".exit" => break,
                    ".clear" => {
                        print!("\x1B[2J\x1B[H");
                        continue;
                    }
                    _ => {}
                }

                let statements = parse_source(&line, &mut diagnostics);
                if !diagnostics.had_syntax_error {
                    interpreter.interpret(&statements, &mut diagnostics);
                }
                // A typo on one line shouldn't poison the rest of the
                // session; runtime-error state is left alone.
                diagnostics.reset_syntax_error();
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("Readline error: {err}");
                break;
            }
        }
    }

    let _ = editor.save_history(config::HISTORY_FILE);
    ExitCode::SUCCESS
}

fn parse_source(source: &str, diagnostics: &mut Diagnostics) -> Vec<Stmt> {
    let tokens = Scanner::new(source, diagnostics).scan_tokens();
    if diagnostics.had_syntax_error {
        return Vec::new();
    }

    LoxParser::new(tokens, diagnostics)
        .parse()
        .into_iter()
        .flatten()
        .collect()
}
