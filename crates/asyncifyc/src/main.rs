//! The asyncify compiler CLI.
//!
//! - `asyncifyc compile [FILE]` - print the script with `await` inserted
//! - `asyncifyc check [FILE]` - list every call with its type and whether it is awaited
//! - `asyncifyc repl` - interactive session
//!
//! FILE defaults to stdin (`-`). Options:
//! - `--catalog` - shell API catalog (JSON); the bundled one otherwise
//! - `--json` - diagnostics as JSON objects on stderr
//! - `--no-color` - disable colorized diagnostics
//! - `-v`, `-vv` - debug / trace logging on stderr (`RUST_LOG` overrides)

mod check;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgAction, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use asyncify_repl::ReplConfig;
use asyncify_typeck::catalog::Catalog;
use asyncify_typeck::diagnostics::{render_diagnostic, render_json, DiagnosticOptions};
use asyncify_typeck::error::CompileError;
use asyncify_typeck::AsyncWriter;

#[derive(Parser)]
#[command(name = "asyncifyc", version, about = "Insert await into database shell scripts")]
struct Cli {
    /// More logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the script with every promise-returning call awaited
    Compile {
        /// Script to compile; `-` or absent reads stdin
        file: Option<PathBuf>,

        #[command(flatten)]
        opts: CommonOpts,
    },
    /// List every call site with its resolved type
    Check {
        /// Script to check; `-` or absent reads stdin
        file: Option<PathBuf>,

        #[command(flatten)]
        opts: CommonOpts,
    },
    /// Start an interactive session
    Repl {
        /// Shell API catalog (JSON)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
}

#[derive(clap::Args)]
struct CommonOpts {
    /// Shell API catalog (JSON)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Output diagnostics as JSON (one object per line) instead of human-readable format
    #[arg(long)]
    json: bool,

    /// Disable colorized output
    #[arg(long = "no-color")]
    no_color: bool,
}

impl CommonOpts {
    fn diagnostic_options(&self) -> DiagnosticOptions {
        DiagnosticOptions {
            color: !self.no_color && !self.json,
            json: self.json,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let code = match cli.command {
        Commands::Compile { file, opts } => run(file.as_deref(), &opts, compile),
        Commands::Check { file, opts } => run(file.as_deref(), &opts, check_calls),
        Commands::Repl { catalog } => match load_catalog(catalog.as_deref()) {
            Ok(catalog) => match asyncify_repl::run_repl(&ReplConfig::default(), catalog) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            },
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
    };
    process::exit(code);
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

/// What a subcommand body reports back to [`run`].
enum Outcome {
    Ok,
    Diagnostic(CompileError),
}

/// Shared driver for `compile` and `check`: read input, load the catalog,
/// run `body`, and report failures. Returns the exit code.
fn run(
    file: Option<&Path>,
    opts: &CommonOpts,
    body: fn(&str, &Catalog, &CommonOpts) -> Outcome,
) -> i32 {
    let diag_opts = opts.diagnostic_options();
    let filename = match file {
        Some(path) if path != Path::new("-") => path.display().to_string(),
        _ => "<stdin>".to_string(),
    };

    let prepared = read_source(file).and_then(|source| {
        let catalog = load_catalog(opts.catalog.as_deref())?;
        Ok((source, catalog))
    });
    let (source, catalog) = match prepared {
        Ok(prepared) => prepared,
        Err(e) => {
            report_failure(&e, &diag_opts);
            return 1;
        }
    };

    match body(&source, &catalog, opts) {
        Outcome::Ok => 0,
        Outcome::Diagnostic(err) => {
            debug!(error = %err, "compile failed");
            if diag_opts.json {
                for value in render_json(&err, &filename) {
                    eprintln!("{value}");
                }
            } else {
                eprint!("{}", render_diagnostic(&err, &source, &filename, &diag_opts));
            }
            1
        }
    }
}

fn compile(source: &str, catalog: &Catalog, _opts: &CommonOpts) -> Outcome {
    let mut writer = AsyncWriter::from_catalog(catalog);
    match writer.compile(source) {
        Ok(compiled) => {
            print!("{}", compiled.code);
            if !compiled.code.ends_with('\n') {
                println!();
            }
            Outcome::Ok
        }
        Err(err) => Outcome::Diagnostic(err),
    }
}

fn check_calls(source: &str, catalog: &Catalog, opts: &CommonOpts) -> Outcome {
    match check::call_sites(source, catalog) {
        Ok(sites) => {
            for site in &sites {
                if opts.json {
                    println!("{}", site.to_json());
                } else {
                    println!("{site}");
                }
            }
            Outcome::Ok
        }
        Err(err) => Outcome::Diagnostic(err),
    }
}

/// Errors before compilation starts (unreadable input, bad catalog).
fn report_failure(message: &str, diag_opts: &DiagnosticOptions) {
    if diag_opts.json {
        let msg = serde_json::json!({
            "code": "C0001",
            "severity": "error",
            "message": message,
            "file": "",
            "spans": [],
            "fix": null
        });
        eprintln!("{msg}");
    } else {
        eprintln!("error: {message}");
    }
}

fn read_source(file: Option<&Path>) -> Result<String, String> {
    match file {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read '{}': {}", path.display(), e)),
        _ => {
            let mut source = String::new();
            std::io::stdin()
                .read_to_string(&mut source)
                .map_err(|e| format!("Failed to read stdin: {e}"))?;
            Ok(source)
        }
    }
}

fn load_catalog(path: Option<&Path>) -> Result<Catalog, String> {
    let catalog = match path {
        Some(path) => Catalog::from_path(path)
            .map_err(|e| format!("Failed to load catalog '{}': {}", path.display(), e))?,
        None => Catalog::bundled().map_err(|e| format!("Bundled catalog is invalid: {e}"))?,
    };
    debug!(types = catalog.registry().len(), "catalog ready");
    Ok(catalog)
}
