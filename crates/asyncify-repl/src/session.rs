//! REPL session state and input handling.
//!
//! A session owns one [`AsyncWriter`], so names declared by one input are
//! typed in the next. Inputs that fail to compile leave the session usable.

use asyncify_typeck::catalog::Catalog;
use asyncify_typeck::error::CompileError;
use asyncify_typeck::ty::Ty;
use asyncify_typeck::AsyncWriter;
use tracing::debug;

pub const HELP_TEXT: &str = "\
Commands:
  :help          Show this help
  :quit    :q    Exit the REPL
  :type <name>   Show the inferred type of a top-level name
  :reset         Forget every declaration made in this session
  :history       Show previous inputs and their rewritten form

Anything else is compiled; calls that return promises are awaited.";

/// A successfully compiled input.
#[derive(Debug, Clone, PartialEq)]
pub struct EvalOutput {
    pub code: String,
    pub result_type: Ty,
}

/// Persistent state for a REPL session.
pub struct ReplSession {
    catalog: Catalog,
    writer: AsyncWriter,
    /// `(input, rewritten)` for every input that compiled.
    history: Vec<(String, String)>,
}

impl ReplSession {
    pub fn new(catalog: Catalog) -> Self {
        let writer = AsyncWriter::from_catalog(&catalog);
        Self {
            catalog,
            writer,
            history: Vec::new(),
        }
    }

    /// Compile one input against the session's bindings.
    pub fn eval(&mut self, input: &str) -> Result<EvalOutput, CompileError> {
        let compiled = self.writer.compile(input)?;
        debug!(
            suspended = compiled.suspended.len(),
            result = %compiled.result_type,
            "evaluated input"
        );
        self.history.push((input.to_string(), compiled.code.clone()));
        Ok(EvalOutput {
            code: compiled.code,
            result_type: compiled.result_type,
        })
    }

    /// The current type of `name`, or `None` if nothing binds it.
    pub fn binding_type(&self, name: &str) -> Option<Ty> {
        let symbols = self.writer.symbols();
        symbols.is_bound(name).then(|| symbols.lookup_type(name))
    }

    pub fn history(&self) -> &[(String, String)] {
        &self.history
    }

    /// Start over from the catalog's globals.
    pub fn reset(&mut self) {
        self.writer = AsyncWriter::from_catalog(&self.catalog);
        self.history.clear();
        debug!("session reset");
    }
}

// ── Input classification ───────────────────────────────────────────────

/// What a line of REPL input asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Help,
    Quit,
    /// `:type name`; the name may be empty.
    Type(String),
    Reset,
    History,
    UnknownCommand(String),
    Source(String),
}

pub fn classify_input(input: &str) -> ReplInput {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return ReplInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix(':') else {
        return ReplInput::Source(input.to_string());
    };
    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };
    match name {
        "help" | "h" => ReplInput::Help,
        "quit" | "q" => ReplInput::Quit,
        "type" | "t" => ReplInput::Type(arg.to_string()),
        "reset" => ReplInput::Reset,
        "history" => ReplInput::History,
        _ => ReplInput::UnknownCommand(trimmed.to_string()),
    }
}

/// Whether `input` has unclosed `(`, `[` or `{`, an unterminated template
/// or an unterminated block comment. Brackets inside strings and comments
/// do not count.
pub fn needs_continuation(input: &str) -> bool {
    #[derive(Clone, Copy, PartialEq)]
    enum State {
        Code,
        Str(char),
        Template,
        /// Inside `${`; holds the bracket depth at which it opened.
        Interpolation(i32),
        LineComment,
        BlockComment,
    }

    let mut depth: i32 = 0;
    let mut stack = vec![State::Code];
    let mut chars = input.chars().peekable();
    while let Some(c) = chars.next() {
        let state = *stack.last().unwrap_or(&State::Code);
        match state {
            State::Code | State::Interpolation(_) => match c {
                '(' | '[' | '{' => depth += 1,
                '}' if state == State::Interpolation(depth) => {
                    stack.pop();
                }
                ')' | ']' | '}' => depth -= 1,
                '\'' | '"' => stack.push(State::Str(c)),
                '`' => stack.push(State::Template),
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    stack.push(State::LineComment);
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    stack.push(State::BlockComment);
                }
                _ => {}
            },
            State::Str(quote) => match c {
                '\\' => {
                    chars.next();
                }
                '\n' => {
                    stack.pop();
                }
                _ if c == quote => {
                    stack.pop();
                }
                _ => {}
            },
            State::Template => match c {
                '\\' => {
                    chars.next();
                }
                '`' => {
                    stack.pop();
                }
                '$' if chars.peek() == Some(&'{') => {
                    chars.next();
                    stack.push(State::Interpolation(depth));
                }
                _ => {}
            },
            State::LineComment => {
                if c == '\n' {
                    stack.pop();
                }
            }
            State::BlockComment => {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    stack.pop();
                }
            }
        }
    }
    depth > 0
        || stack
            .iter()
            .any(|s| matches!(s, State::Template | State::Interpolation(_) | State::BlockComment))
}
