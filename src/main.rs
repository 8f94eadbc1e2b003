use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Result};
use clap::Parser;
use log::{error, info};
use rustyline::error::ReadlineError;
use rustyline::history::FileHistory;
use rustyline::{config::Config as EditorConfig, Editor};
use simplelog::{Config as LogConfig, LevelFilter, SimpleLogger};

mod repl;

use fncalc::lang::token::OPERATORS;
use fncalc::Runtime;
use repl::ReplHelper;

const HISTORY_FILE: &str = ".fncalc_history";
const PROMPT: &str = "(fncalc) ";

#[derive(Parser)]
#[command(version, about)]
struct Opt {
    /// Show debug output
    #[arg(short, long)]
    debug: bool,

    /// Run a script (one statement per line) instead of starting the REPL
    script: Option<PathBuf>,
}

fn init_logging(debug: bool) -> Result<()> {
    let filter = if debug {
        LevelFilter::Info
    } else {
        LevelFilter::Error
    };

    match SimpleLogger::init(filter, LogConfig::default()) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to init logger: {}", e),
    }
}

fn init_editor() -> Result<Editor<ReplHelper, FileHistory>> {
    let config = EditorConfig::builder().auto_add_history(true).build();
    let mut editor = Editor::with_config(config)?;
    editor.set_helper(Some(ReplHelper::new()));

    Ok(editor)
}

fn init_history(editor: &mut Editor<ReplHelper, FileHistory>) {
    let _ = editor.load_history(HISTORY_FILE);
}

fn save_history(editor: &mut Editor<ReplHelper, FileHistory>) -> Result<()> {
    match editor.save_history(HISTORY_FILE) {
        Ok(_) => Ok(()),
        Err(e) => bail!("Failed to save history: {}", e),
    }
}

fn welcome() {
    println!("fncalc v{}", env!("CARGO_PKG_VERSION"));
    println!("Type 'help' for help");
    println!();
}

fn print_help() {
    let ops = OPERATORS
        .iter()
        .map(|op| op.to_string())
        .collect::<Vec<_>>()
        .join(" ");

    println!("fn <name> <params> => <body>\tDeclare a function");
    println!("<name> = <expression>\t\tAssign a variable");
    println!("<expression>\t\t\tEvaluate and print");
    println!();
    println!("Operators: {}", ops);
    println!("Functions apply to the following operands: 'add 1 2'");
    println!();
    println!("help\t\tPrint help");
    println!("quit\t\tExit");
}

fn run_script(runtime: &mut Runtime, path: &Path) -> Result<()> {
    let source = match fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => bail!("Failed to read '{}': {}", path.display(), e),
    };

    for (lineno, line) in source.lines().enumerate() {
        match runtime.interpret(line) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => (),
            Err(e) => bail!("line {}: {}", lineno + 1, e),
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let opts = Opt::parse();
    init_logging(opts.debug)?;

    let mut runtime = Runtime::new();

    if let Some(path) = &opts.script {
        return run_script(&mut runtime, path);
    }

    let mut editor = init_editor()?;
    init_history(&mut editor);
    welcome();

    loop {
        match editor.readline(PROMPT) {
            Ok(line) => {
                info!("read: {}", &line);

                match line.trim() {
                    "" => continue,
                    "help" => {
                        print_help();
                        continue;
                    }
                    "quit" => break,
                    _ => (),
                }

                match runtime.interpret(&line) {
                    Ok(Some(value)) => println!("{}", value),
                    Ok(None) => (),
                    Err(e) => eprintln!("{}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                eprintln!("Press Ctrl-D or type 'quit' to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("quit");
                break;
            }
            Err(e) => {
                error!("Unexpected error: {}", e);
                break;
            }
        }
    }

    save_history(&mut editor)?;

    Ok(())
}
