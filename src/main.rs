use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;
use rustyline::error::ReadlineError;
use rustyline::Editor;

use roxide as lox;

use lox::ast_printer::AstPrinter;
use lox::interpreter::Interpreter;
use lox::parser::{Parser, Stmt};
use lox::resolver::Resolver;
use lox::scanner::{scan_tokens, Scanner};
use lox::token::Token;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to app.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print one JSON object per token instead of the plain form
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints it back
    Parse { filename: Option<PathBuf> },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive session
    Repl,
}

/// Maps the contents of a file into memory.
fn map_file(filename: PathBuf) -> Result<Mmap> {
    info!("Mapping file: {:?}", filename);
    let file = File::open(&filename).context(format!("Failed to open file {:?}", filename))?;

    // Safety: the mapping is read-only and private to this process.
    let mmap =
        unsafe { Mmap::map(&file) }.context(format!("Failed to map file {:?}", filename))?;

    info!("Mapped {} bytes from {:?}", mmap.len(), filename);

    Ok(mmap)
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("app.log").context("Failed to create app.log")?;

    // Configure env_logger to write to file with module path and source line
    Builder::new()
        .format(|buf, record| {
            // Strip 'roxide::' from module path
            let module = record
                .module_path()
                .unwrap_or("<unnamed>")
                .strip_prefix("roxide::")
                .unwrap_or(record.module_path().unwrap_or("<unnamed>"));
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .init();

    info!("Logger initialized, writing to app.log");
    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => match filename {
            Some(filename) => {
                info!("Running Tokenize subcommand");
                let src = map_file(filename)?;
                let mut scanner = Scanner::new(&src);
                let mut tokenized = true;

                while let Some(token) = scanner.next() {
                    match token {
                        Ok(token) => {
                            debug!("Scanned token: {}", token);

                            if json {
                                println!(
                                    "{}",
                                    serde_json::json!({
                                        "type": token.token_type,
                                        "lexeme": token.lexeme,
                                        "line": token.line,
                                    })
                                );
                            } else {
                                println!("{}", token);
                            }
                        }

                        Err(e) => {
                            tokenized = false;

                            debug!("Tokenization debug: {}", e);

                            eprintln!("{}", e);
                        }
                    }
                }

                if !tokenized {
                    debug!("Tokenization failed, exiting with code 65");

                    std::process::exit(65);
                }

                info!("Tokenization completed successfully");
            }
            None => {
                info!("No filepath provided for Tokenize");

                println!("No input filepath was provided. Exiting...");

                std::process::exit(0);
            }
        },

        Commands::Parse { filename } => match filename {
            Some(filename) => {
                info!("Running Parse subcommand");
                let src = map_file(filename)?;
                let (tokens, scan_errors) = scan_tokens(&src);

                if !scan_errors.is_empty() {
                    for e in &scan_errors {
                        eprintln!("{}", e);
                    }
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);

                match parser.parse_expression() {
                    Ok(expr) => {
                        info!("Expression parsed successfully");
                        let rendered = AstPrinter::print(&expr);

                        debug!("AST: {}", rendered);
                        println!("{}", rendered);
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Parse subcommand completed");
            }
            None => {
                info!("No filepath provided for Parse");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Evaluate { filename } => match filename {
            Some(filename) => {
                info!("Running Evaluate subcommand");

                let src = map_file(filename)?;
                let (tokens, scan_errors) = scan_tokens(&src);

                if !scan_errors.is_empty() {
                    for e in &scan_errors {
                        eprintln!("{}", e);
                    }
                    std::process::exit(65);
                }

                let mut parser = Parser::new(&tokens);
                let mut interpreter = Interpreter::new();

                match parser.parse_expression() {
                    Ok(expr) => {
                        info!("Expression parsed successfully");

                        match interpreter.evaluate_expression(&expr) {
                            Ok(value) => {
                                debug!("Evaluated to: {}", value);
                                println!("{}", value);
                            }

                            Err(e) => {
                                debug!("Evaluation debug: {}", e);
                                eprintln!("{}", e);
                                std::process::exit(70);
                            }
                        }
                    }

                    Err(e) => {
                        debug!("Parse debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(65);
                    }
                }

                info!("Evaluate subcommand completed");
            }

            None => {
                info!("No filepath provided for Evaluate");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Run { filename } => match filename {
            Some(filename) => {
                info!("Running Run subcommand");
                let src = map_file(filename)?;

                // For logging only
                info!("Provided input:\n{}", String::from_utf8_lossy(&src));

                let (tokens, scan_errors) = scan_tokens(&src);
                let mut parser = Parser::new(&tokens);
                let (statements, parse_errors) = parser.parse();

                if !scan_errors.is_empty() || !parse_errors.is_empty() {
                    for e in scan_errors.iter().chain(parse_errors.iter()) {
                        debug!("Static error: {}", e);
                        eprintln!("{}", e);
                    }
                    debug!("Static analysis failed, exiting with code 65");
                    std::process::exit(65);
                }

                info!("Parsed {} statements", statements.len());

                let (bindings, resolve_errors) = Resolver::new().resolve(&statements);

                if !resolve_errors.is_empty() {
                    for e in &resolve_errors {
                        eprintln!("{}", e);
                    }
                    std::process::exit(65);
                }

                let mut interpreter = Interpreter::new();

                match interpreter.interpret(&statements, bindings) {
                    Ok(()) => {
                        info!("Program executed successfully");
                    }

                    Err(e) => {
                        debug!("Runtime debug: {}", e);
                        eprintln!("{}", e);
                        std::process::exit(70);
                    }
                }
            }

            None => {
                info!("No filepath provided for Run");
                println!("No input filepath was provided. Exiting...");
                std::process::exit(0);
            }
        },

        Commands::Repl => {
            info!("Running Repl subcommand");
            repl()?;
        }
    }

    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Interactive session
// ─────────────────────────────────────────────────────────────────────────────

/// Reads submissions until Ctrl-D, feeding them all to one persistent
/// interpreter so definitions accumulate across lines. Any error prints
/// and the prompt returns; nothing ends the session early.
fn repl() -> Result<()> {
    println!("Lox interactive session. Ctrl-D exits.");

    let mut editor = Editor::<()>::new();
    editor.load_history(".lox_history").ok();

    let mut interpreter: Interpreter<'static> = Interpreter::new();
    let mut id_seed: usize = 0;

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }

                editor.add_history_entry(line.as_str());
                id_seed = submit(line, id_seed, &mut interpreter);
            }

            Err(ReadlineError::Interrupted) => continue,

            Err(ReadlineError::Eof) => break,

            Err(e) => return Err(e.into()),
        }
    }

    editor.save_history(".lox_history").ok();
    info!("Repl session ended");
    Ok(())
}

/// Runs one submission through the full pipeline, returning the id seed
/// for the next one.
fn submit(line: String, id_seed: usize, interpreter: &mut Interpreter<'static>) -> usize {
    // Functions and classes defined here may outlive this submission,
    // and their bodies borrow the source text. Leaking one line per
    // submission keeps every surviving definition backed for the life
    // of the session.
    let src: &'static [u8] = Vec::leak(line.into_bytes());

    let (tokens, scan_errors) = scan_tokens(src);

    if !scan_errors.is_empty() {
        for e in &scan_errors {
            eprintln!("{}", e);
        }
        return id_seed;
    }

    let tokens: &'static [Token<'static>] = Vec::leak(tokens);

    let mut parser = Parser::resuming(tokens, id_seed);
    let (statements, parse_errors) = parser.parse();
    let next_seed = parser.ids_issued();

    if !parse_errors.is_empty() {
        for e in &parse_errors {
            eprintln!("{}", e);
        }
        return next_seed;
    }

    // Echo the value of a bare expression, as a calculator would.
    let statements: Vec<Stmt<'static>> = statements
        .into_iter()
        .map(|stmt| match stmt {
            Stmt::Expression(expr) => Stmt::Print(expr),
            other => other,
        })
        .collect();

    let (bindings, resolve_errors) = Resolver::new().resolve(&statements);

    if !resolve_errors.is_empty() {
        for e in &resolve_errors {
            eprintln!("{}", e);
        }
        return next_seed;
    }

    if let Err(e) = interpreter.interpret(&statements, bindings) {
        eprintln!("{}", e);
    }

    next_seed
}
