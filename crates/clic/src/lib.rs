//! Minimal flag registration and dispatch.
//!
//! A [`Cli`] holds the application descriptor and a registry of flag tokens,
//! each bound to a handler. [`Cli::parse`] walks the process arguments left to
//! right and invokes the handler of every flag it meets, handing value-taking
//! flags the raw text of the following argument. `-h` and `-v` are registered
//! automatically.
//!
//! ```
//! use std::cell::RefCell;
//!
//! let greeted = RefCell::new(Vec::new());
//! let mut cli = clic::Cli::new("mycli", "A simple CLI tool", "1.0.0");
//! cli.flag_with_value("-n", "Set your name", |name| {
//!     greeted.borrow_mut().push(format!("Hello, {name}!"));
//! });
//!
//! let mut out = Vec::new();
//! cli.parse_with_output(["mycli", "-n", "Ada"], &mut out).unwrap();
//! assert_eq!(*greeted.borrow(), ["Hello, Ada!"]);
//! ```

mod help;

pub use help::{AppMeta, FLAG_COLUMN_WIDTH, FlagMeta, render_help, render_version};

use indexmap::IndexMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::io::{self, Write};

/// Token of the built-in help flag.
pub const HELP_FLAG: &str = "-h";
/// Token of the built-in version flag.
pub const VERSION_FLAG: &str = "-v";

/// Printed when the argument list holds nothing but the program name.
pub const NO_FLAGS_HINT: &str = "No flag provided. Use -h for help";

/// Why a parse pass stopped early.
///
/// `Display` yields the diagnostic already written to the output. For an
/// unknown token that is not valid UTF-8 the output carries the raw bytes,
/// while `Display` falls back to a lossy rendering.
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Unknown flag: {}. Use -h for help", .0.display())]
    UnknownFlag(OsString),
    #[error("Error: {0} requires a value")]
    MissingValue(String),
    /// A `flag_with_value` handler was handed bytes that are not UTF-8.
    #[error("Error: {0} requires a UTF-8 value")]
    InvalidValue(String),
    #[error("failed to write parser output")]
    Io(#[from] io::Error),
}

impl ParseError {
    /// The offending token, if the error was caused by the command line.
    pub fn token(&self) -> Option<&OsStr> {
        match self {
            Self::UnknownFlag(token) => Some(token.as_os_str()),
            Self::MissingValue(token) | Self::InvalidValue(token) => Some(OsStr::new(token)),
            Self::Io(_) => None,
        }
    }

    fn report<W: Write + ?Sized>(self, out: &mut W) -> ParseResult<ParseOutcome> {
        match &self {
            Self::UnknownFlag(token) => {
                out.write_all(b"Unknown flag: ")?;
                out.write_all(token.as_encoded_bytes())?;
                out.write_all(b". Use -h for help\n")?;
            }
            _ => writeln!(out, "{self}")?,
        }
        Err(self)
    }
}

/// Result of a parse pass.
pub type ParseResult<T> = Result<T, ParseError>;

/// How a parse pass ended when nothing went wrong.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseOutcome {
    /// Every argument was consumed. `dispatched` counts handler invocations,
    /// built-in `-h`/`-v` included.
    Done { dispatched: usize },
    /// Only the program name was supplied; the hint was printed.
    NoFlags,
}

enum Action<'a> {
    Help,
    Version,
    Plain(Box<dyn FnMut() + 'a>),
    Value(Box<dyn FnMut(&str) + 'a>),
    OsValue(Box<dyn FnMut(&OsStr) + 'a>),
}

struct Flag<'a> {
    description: String,
    action: Action<'a>,
}

impl Flag<'_> {
    fn takes_value(&self) -> bool {
        matches!(self.action, Action::Value(_) | Action::OsValue(_))
    }
}

/// Flag registry plus the dispatcher that drives it.
///
/// Handlers may borrow host state for `'a`. Registration order is kept, so
/// the help listing is stable; re-registering a token replaces its definition
/// in place.
pub struct Cli<'a> {
    name: String,
    description: String,
    version: String,
    flags: IndexMap<String, Flag<'a>>,
}

impl fmt::Debug for Cli<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cli")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("version", &self.version)
            .field("flags", &self.flags.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl<'a> Cli<'a> {
    /// Create a registry seeded with `-h` and `-v`.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        let mut cli = Self {
            name: name.into(),
            description: description.into(),
            version: version.into(),
            flags: IndexMap::new(),
        };
        cli.insert(
            HELP_FLAG.to_string(),
            "Show all available flags".to_string(),
            Action::Help,
        );
        cli.insert(
            VERSION_FLAG.to_string(),
            "Show version".to_string(),
            Action::Version,
        );
        cli
    }

    /// Register a flag that takes no value.
    ///
    /// Any token is accepted. An existing definition for the same token,
    /// built-ins included, is replaced.
    pub fn flag<F>(
        &mut self,
        token: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: FnMut() + 'a,
    {
        self.insert(token.into(), description.into(), Action::Plain(Box::new(handler)));
        self
    }

    /// Register a flag whose handler receives the text of the next argument.
    ///
    /// A value that is not valid UTF-8 stops the pass with
    /// [`ParseError::InvalidValue`]; use [`Cli::flag_with_os_value`] to accept
    /// arbitrary bytes.
    pub fn flag_with_value<F>(
        &mut self,
        token: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: FnMut(&str) + 'a,
    {
        self.insert(token.into(), description.into(), Action::Value(Box::new(handler)));
        self
    }

    /// Register a flag whose handler receives the next argument untouched.
    pub fn flag_with_os_value<F>(
        &mut self,
        token: impl Into<String>,
        description: impl Into<String>,
        handler: F,
    ) -> &mut Self
    where
        F: FnMut(&OsStr) + 'a,
    {
        self.insert(token.into(), description.into(), Action::OsValue(Box::new(handler)));
        self
    }

    fn insert(&mut self, token: String, description: String, action: Action<'a>) {
        if self.flags.contains_key(&token) {
            tracing::debug!(flag = %token, "replacing existing flag definition");
        }
        self.flags.insert(token, Flag { description, action });
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn version(&self) -> &str {
        &self.version
    }

    /// Whether `token` is registered.
    pub fn contains(&self, token: &str) -> bool {
        self.flags.contains_key(token)
    }

    /// Whether `token` takes a value, or `None` if it is not registered.
    pub fn takes_value(&self, token: &str) -> Option<bool> {
        self.flags.get(token).map(Flag::takes_value)
    }

    /// Number of registered flags, built-ins included.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Snapshot of the descriptor and flag table.
    pub fn meta(&self) -> AppMeta {
        AppMeta {
            name: self.name.clone(),
            description: self.description.clone(),
            version: self.version.clone(),
            flags: self
                .flags
                .iter()
                .map(|(token, flag)| FlagMeta {
                    token: token.clone(),
                    description: flag.description.clone(),
                    takes_value: flag.takes_value(),
                })
                .collect(),
        }
    }

    /// The text printed by `-h`.
    pub fn help(&self) -> String {
        render_help(&self.meta())
    }

    /// The text printed by `-v`.
    pub fn version_text(&self) -> String {
        render_version(&self.name, &self.version)
    }

    /// Parse the process arguments, printing built-in output and diagnostics
    /// to stdout.
    pub fn parse(&mut self) -> ParseResult<ParseOutcome> {
        self.parse_from(std::env::args_os())
    }

    /// Parse `args` (program name first) and print to stdout.
    pub fn parse_from<I, T>(&mut self, args: I) -> ParseResult<ParseOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
    {
        let mut stdout = io::stdout();
        let outcome = self.parse_with_output(args, &mut stdout);
        stdout.flush()?;
        outcome
    }

    /// Parse `args` (program name first), writing built-in output and
    /// diagnostics to `out`.
    ///
    /// Handlers run in command-line order, once per occurrence. The pass
    /// stops at the first unknown token or at a value-taking flag with
    /// nothing after it; nothing past that point is examined.
    pub fn parse_with_output<I, T, W>(&mut self, args: I, out: &mut W) -> ParseResult<ParseOutcome>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString>,
        W: Write + ?Sized,
    {
        let argv: Vec<OsString> = args.into_iter().map(Into::into).collect();
        if argv.len() < 2 {
            tracing::debug!("no flags supplied");
            writeln!(out, "{NO_FLAGS_HINT}")?;
            return Ok(ParseOutcome::NoFlags);
        }

        let mut dispatched = 0usize;
        let mut i = 1usize;
        while i < argv.len() {
            let arg = argv[i].as_os_str();
            tracing::trace!(position = i, token = ?arg, "scanning argument");

            // Registered tokens are UTF-8, so anything else is unknown.
            let Some((token, flag)) = arg
                .to_str()
                .and_then(|token| self.flags.get_mut(token).map(|flag| (token, flag)))
            else {
                return ParseError::UnknownFlag(arg.to_owned()).report(out);
            };

            if flag.takes_value() && i + 1 >= argv.len() {
                return ParseError::MissingValue(token.to_string()).report(out);
            }

            match &mut flag.action {
                Action::Plain(handler) => {
                    tracing::debug!(flag = token, "dispatching flag");
                    handler();
                    i += 1;
                }
                Action::Value(handler) => {
                    let Some(value) = argv[i + 1].to_str() else {
                        return ParseError::InvalidValue(token.to_string()).report(out);
                    };
                    tracing::debug!(flag = token, "dispatching flag with value");
                    handler(value);
                    i += 2;
                }
                Action::OsValue(handler) => {
                    tracing::debug!(flag = token, "dispatching flag with raw value");
                    handler(argv[i + 1].as_os_str());
                    i += 2;
                }
                Action::Help => {
                    let text = self.help();
                    out.write_all(text.as_bytes())?;
                    i += 1;
                }
                Action::Version => {
                    let text = self.version_text();
                    out.write_all(text.as_bytes())?;
                    i += 1;
                }
            }
            dispatched += 1;
        }

        Ok(ParseOutcome::Done { dispatched })
    }
}
