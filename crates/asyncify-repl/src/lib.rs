//! Interactive REPL for shell scripts.
//!
//! Each input is compiled against one long-lived symbol table and the
//! rewritten code is printed together with its inferred type.
//!
//! ## Architecture
//!
//! - [`session`]: session state, input classification and continuation
//!
//! ## Usage
//!
//! ```no_run
//! use asyncify_repl::{run_repl, ReplConfig};
//! use asyncify_typeck::catalog::Catalog;
//!
//! let config = ReplConfig::default();
//! run_repl(&config, Catalog::bundled().unwrap()).unwrap();
//! ```

pub mod session;

use asyncify_typeck::catalog::Catalog;
use asyncify_typeck::diagnostics::{render_diagnostic, DiagnosticOptions};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

pub use session::{classify_input, needs_continuation, EvalOutput, ReplInput, ReplSession};

const REPL_FILE: &str = "<repl>";

/// Configuration for the REPL.
#[derive(Debug, Clone)]
pub struct ReplConfig {
    /// The primary prompt string (default: "> ").
    pub prompt: String,
    /// The continuation prompt for multi-line input (default: "... ").
    pub continuation: String,
}

impl Default for ReplConfig {
    fn default() -> Self {
        Self {
            prompt: "> ".to_string(),
            continuation: "... ".to_string(),
        }
    }
}

/// Run the interactive loop until `:quit` or Ctrl-D.
pub fn run_repl(config: &ReplConfig, catalog: Catalog) -> Result<(), ReadlineError> {
    println!("asyncify REPL v{}", env!("CARGO_PKG_VERSION"));
    println!("Type :help for commands, :quit to exit\n");

    let mut rl = DefaultEditor::new()?;
    let mut session = ReplSession::new(catalog);

    while let Some(input) = read_input(&mut rl, config)? {
        match classify_input(&input) {
            ReplInput::Empty => {}
            ReplInput::Help => println!("{}", session::HELP_TEXT),
            ReplInput::Quit => break,
            ReplInput::Type(name) if name.is_empty() => println!("Usage: :type <name>"),
            ReplInput::Type(name) => match session.binding_type(&name) {
                Some(ty) => println!("{name}: {ty}"),
                None => println!("{name} is not bound"),
            },
            ReplInput::Reset => {
                session.reset();
                println!("Session reset.");
            }
            ReplInput::History => {
                for (i, (input, output)) in session.history().iter().enumerate() {
                    println!("[{}] {}", i + 1, input);
                    if input != output {
                        println!("  => {output}");
                    }
                }
            }
            ReplInput::UnknownCommand(cmd) => {
                println!("Unknown command: {cmd}. Type :help for available commands.")
            }
            ReplInput::Source(source) => match session.eval(&source) {
                Ok(out) => {
                    println!("{}", out.code);
                    println!("// {}", out.result_type);
                }
                Err(err) => eprint!(
                    "{}",
                    render_diagnostic(&err, &source, REPL_FILE, &DiagnosticOptions::colorless())
                ),
            },
        }
    }

    println!();
    Ok(())
}

/// Read one logical input, following continuation lines while brackets are
/// open. `None` means end of input.
fn read_input(rl: &mut DefaultEditor, config: &ReplConfig) -> Result<Option<String>, ReadlineError> {
    let mut input = match rl.readline(&config.prompt) {
        Ok(line) => line,
        Err(ReadlineError::Interrupted) => return Ok(Some(String::new())),
        Err(ReadlineError::Eof) => return Ok(None),
        Err(err) => return Err(err),
    };

    while needs_continuation(&input) {
        match rl.readline(&config.continuation) {
            Ok(line) => {
                input.push('\n');
                input.push_str(&line);
            }
            // Ctrl-C abandons the partial input.
            Err(ReadlineError::Interrupted) => return Ok(Some(String::new())),
            Err(ReadlineError::Eof) => return Ok(None),
            Err(err) => return Err(err),
        }
    }

    if !input.trim().is_empty() {
        let _ = rl.add_history_entry(input.as_str());
    }
    Ok(Some(input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_prompts() {
        let config = ReplConfig::default();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.continuation, "... ");
    }
}
