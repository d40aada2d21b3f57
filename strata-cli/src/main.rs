//! Strata command line
//!
//! Commands:
//! - get: print one option's value
//! - eval: print every option with its value or error
//! - dump / pretty: print the document back as source
//! - json: print the evaluated document as JSON
//! - functions: list the callable builtins
//!
//! Log level comes from `STRATA_LOG` (default `warn`).

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use strata::{Document, Strata, DEFAULT_MAX_DEPTH};
use strata_core::{StrataError, StrataResult};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "STRATA_LOG";

#[derive(Parser, Debug)]
#[command(name = "strata", version, about = "Evaluate hierarchical expression config files")]
struct Cli {
    /// Maximum depth of nested option reads
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the value of one option
    Get {
        file: PathBuf,
        /// Dotted option path, e.g. `Section_1.Sub.tau`
        path: String,
    },
    /// Evaluate every option
    Eval { file: PathBuf },
    /// Print the document without indentation
    Dump { file: PathBuf },
    /// Print the document with indented sections
    Pretty { file: PathBuf },
    /// Print all values as a JSON object
    Json { file: PathBuf },
    /// List callable functions as JSON
    Functions {
        #[arg(long)]
        category: Option<String>,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();
    let strata = Strata::new().with_max_depth(cli.max_depth);

    match run(&strata, cli.cmd) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            report(&err);
            ExitCode::FAILURE
        }
    }
}

/// Ok(false) when the command printed its own errors
fn run(strata: &Strata, cmd: Command) -> StrataResult<bool> {
    match cmd {
        Command::Get { file, path } => {
            let value = load(strata, &file)?.get(&path)?;
            println!("{}", value.repr());
        }
        Command::Eval { file } => {
            let doc = load(strata, &file)?;
            let mut ok = true;
            for (path, result) in doc.evaluate_all() {
                match result {
                    Ok(value) => println!("{} = {}", path, value.repr()),
                    Err(err) => {
                        ok = false;
                        println!("{} ! {}", path, err);
                    }
                }
            }
            return Ok(ok);
        }
        Command::Dump { file } => print!("{}", load(strata, &file)?.dump()?),
        Command::Pretty { file } => print!("{}", load(strata, &file)?.pretty_print()?),
        Command::Json { file } => {
            let json = load(strata, &file)?.to_json()?;
            println!("{}", to_pretty(&json)?);
        }
        Command::Functions { category } => {
            let functions = strata.list_functions(category.as_deref());
            let json = serde_json::to_value(&functions)
                .map_err(|e| StrataError::invalid_value(e.to_string()))?;
            println!("{}", to_pretty(&json)?);
        }
    }
    Ok(true)
}

fn load(strata: &Strata, file: &Path) -> StrataResult<Document> {
    debug!(file = %file.display(), "loading");
    strata.parse_file(file)
}

fn to_pretty(json: &serde_json::Value) -> StrataResult<String> {
    serde_json::to_string_pretty(json).map_err(|e| StrataError::invalid_value(e.to_string()))
}

fn report(err: &StrataError) {
    eprintln!("error: {}", err);
    if let Ok(json) = serde_json::to_string(err) {
        eprintln!("{}", json);
    }
}
