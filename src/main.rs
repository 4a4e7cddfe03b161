mod config;
mod highlighter;

use clap::Parser;
use config::{PROMPT, VERSION, WELCOME_MESSAGE, WELCOME_SUBTITLE};
use goscheme_rs::builtins::register_builtins;
use goscheme_rs::builtins::control::load_source;
use goscheme_rs::env::Environment;
use goscheme_rs::eval::eval;
use goscheme_rs::reader::read_all;
use goscheme_rs::stdlib::load_stdlib;
use highlighter::LispHelper;
use rustyline::error::ReadlineError;
use rustyline::{Config, Editor};
use std::path::PathBuf;
use std::sync::Arc;

/// A Scheme-flavored Lisp interpreter with syntax-rules macros and
/// Go-style concurrency.
#[derive(Parser, Debug)]
#[command(name = "goscheme-rs")]
#[command(version = VERSION)]
#[command(about = "A Scheme-flavored Lisp interpreter")]
struct CliArgs {
    /// Script files to load, in order, before entering the REPL
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Keep the REPL open after loading files
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Hint the number of OS threads available for concurrent `go` tasks
    #[arg(long = "cores", value_name = "N")]
    cores: Option<usize>,

    /// Skip loading the bundled standard library
    #[arg(long = "no-stdlib")]
    no_stdlib: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();
    if let Some(n) = args.cores {
        std::env::set_var("GOSCHEME_CORES_HINT", n.to_string());
    }

    let env = Environment::new();
    register_builtins(&env);
    if !args.no_stdlib {
        load_stdlib(&env);
    }

    for path in &args.files {
        if let Err(e) = run_file(path, &env) {
            eprintln!("Error loading {}: {e}", path.display());
            std::process::exit(1);
        }
    }

    if args.files.is_empty() || args.interactive {
        run_repl(&env)?;
    }

    Ok(())
}

fn run_file(path: &PathBuf, env: &Arc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let source = std::fs::read_to_string(path)?;
    load_source(&source, env).map_err(|e| e.to_string())?;
    Ok(())
}

fn run_repl(env: &Arc<Environment>) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::builder().auto_add_history(true).build();
    let mut rl = Editor::with_config(config)?;
    rl.set_helper(Some(LispHelper::new()));

    let history_file = ".goscheme_history";
    let _ = rl.load_history(history_file);

    println!("{WELCOME_MESSAGE}");
    println!("{WELCOME_SUBTITLE}");

    loop {
        match rl.readline(PROMPT) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                if trimmed == ":q" || trimmed == ":quit" {
                    break;
                }
                match read_all(&line) {
                    Ok(forms) => {
                        for form in forms {
                            match eval(&form, env) {
                                Ok(result) if result.is_unspecified() => {}
                                Ok(result) => println!("{result}"),
                                Err(e) => eprintln!("Error: {e}"),
                            }
                        }
                    }
                    Err(e) => eprintln!("Parse error: {e}"),
                }
            }
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("Error: {e}");
                break;
            }
        }
    }

    let _ = rl.save_history(history_file);
    Ok(())
}
