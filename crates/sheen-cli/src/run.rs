#![forbid(unsafe_code)]

//! Executes a parsed [`Opts`] against readers and writers.

use std::fmt;
use std::fs;
use std::io::{self, Read, Write};

use sheen::core::options::parse_bool;
use sheen::format::{BUILTIN_FORMATTERS, BUILTIN_THEMES};
use sheen::{Formatter, HtmlFormatter, Lexer, Registry, Theme, formatter_by_name, highlight};

use crate::cli::{Command, HELP_TEXT, Opts, VERSION};

/// Failure of one CLI invocation.
#[derive(Debug)]
pub enum CliError {
    /// Bad lexer, formatter, theme or option.
    Sheen(sheen::Error),
    /// An input could not be read.
    Input { path: String, source: io::Error },
    /// Output could not be written.
    Output(io::Error),
}

impl CliError {
    /// Process exit code for this failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Output(err) if err.kind() == io::ErrorKind::BrokenPipe => 0,
            _ => 1,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sheen(err) => write!(f, "{err}"),
            Self::Input { path, source } => write!(f, "{path}: {source}"),
            Self::Output(err) => write!(f, "write failed: {err}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Sheen(err) => Some(err),
            Self::Input { source, .. } => Some(source),
            Self::Output(err) => Some(err),
        }
    }
}

impl From<sheen::Error> for CliError {
    fn from(err: sheen::Error) -> Self {
        Self::Sheen(err)
    }
}

impl From<io::Error> for CliError {
    fn from(err: io::Error) -> Self {
        Self::Output(err)
    }
}

/// Run `opts`, reading `-` from `stdin`.
///
/// Rejected `-o`/`-O` options are reported on `stderr` and skipped; every
/// other failure ends the run.
pub fn run(
    opts: &Opts,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<(), CliError> {
    match &opts.command {
        Command::Help => writeln!(stdout, "{HELP_TEXT}")?,
        Command::Version => writeln!(stdout, "sheen {VERSION}")?,
        Command::List => list(Registry::global(), stdout)?,
        Command::Css { .. } => css(opts, stdout)?,
        Command::Highlight => highlight_inputs(opts, stdin, stdout, stderr)?,
    }
    Ok(())
}

fn highlight_inputs(
    opts: &Opts,
    stdin: &mut dyn Read,
    stdout: &mut dyn Write,
    stderr: &mut dyn Write,
) -> Result<(), CliError> {
    let registry = Registry::global();
    let mut formatter = build_formatter(opts, stderr)?;
    // Resolve a forced lexer once so a bad name fails before any output.
    let forced = opts
        .lexer
        .as_deref()
        .map(|query| registry.lexer_from_query(query))
        .transpose()?;

    let stdin_only = ["-".to_owned()];
    let files = if opts.files.is_empty() {
        &stdin_only[..]
    } else {
        &opts.files[..]
    };
    for path in files {
        let source = read_input(path, stdin)?;
        let lexer = match &forced {
            Some(lexer) => configure(lexer.clone(), opts, true, stderr)?,
            None => configure(choose_lexer(registry, path, &source), opts, false, stderr)?,
        };
        tracing::debug!(path = %path, lexer = lexer.name(), "highlighting");
        let out = highlight(&source, &[lexer], &mut formatter)?;
        stdout.write_all(out.as_bytes())?;
    }
    stdout.flush()?;
    Ok(())
}

/// File name patterns first, then content guessing.
fn choose_lexer(registry: &Registry, path: &str, source: &str) -> Lexer {
    if path != "-"
        && let Some(descriptor) = registry.for_filename(path)
    {
        return Lexer::new(descriptor);
    }
    Lexer::new(registry.guess_descriptor(source))
}

/// Apply `-o` options. An explicitly chosen lexer reports every rejected
/// option; a picked one silently skips options it does not declare.
fn configure(
    mut lexer: Lexer,
    opts: &Opts,
    explicit: bool,
    stderr: &mut dyn Write,
) -> Result<Lexer, CliError> {
    for (key, value) in &opts.lexer_options {
        if !explicit && lexer.descriptor().option(key).is_none() {
            tracing::debug!(lexer = lexer.name(), option = %key, "option not declared; skipped");
            continue;
        }
        if let Err(err) = lexer.set_option_str(key, value) {
            writeln!(stderr, "sheen: {err}; option ignored")?;
        }
    }
    Ok(lexer)
}

/// Formatter from `-f`, the theme and color defaults, then `-O` options.
fn build_formatter(
    opts: &Opts,
    stderr: &mut dyn Write,
) -> Result<Box<dyn Formatter + Send>, CliError> {
    let name = opts.formatter.as_str();
    let mut formatter = formatter_by_name(name, &[])?;
    let is_terminal = formatter.name() == "terminal";
    let colors = opts.colors.as_str();

    let mut defaults: Vec<(&str, &str)> = Vec::new();
    if formatter.name() != "plain"
        && let Some(theme) = opts.theme.as_deref()
    {
        defaults.push(("theme", theme));
    }
    if is_terminal {
        defaults.push(("colors", colors));
    }
    let mut accepted = defaults;
    if !accepted.is_empty() {
        formatter = formatter_by_name(name, &accepted)?;
    }

    // One at a time so a bad option skips only itself.
    for (key, value) in &opts.formatter_options {
        let mut candidate = accepted.clone();
        candidate.push((key.as_str(), value.as_str()));
        match formatter_by_name(name, &candidate) {
            Ok(built) => {
                formatter = built;
                accepted = candidate;
            }
            Err(err) => writeln!(stderr, "sheen: {err}; option ignored")?,
        }
    }
    Ok(formatter)
}

fn read_input(path: &str, stdin: &mut dyn Read) -> Result<String, CliError> {
    let bytes = if path == "-" {
        let mut buf = Vec::new();
        stdin.read_to_end(&mut buf).map(|_| buf)
    } else {
        fs::read(path)
    }
    .map_err(|source| CliError::Input {
        path: path.to_owned(),
        source,
    })?;
    // Invalid UTF-8 is highlighted with replacement characters.
    Ok(String::from_utf8(bytes)
        .unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned()))
}

fn css(opts: &Opts, stdout: &mut dyn Write) -> Result<(), CliError> {
    let mut html = HtmlFormatter::new().with_theme(Theme::by_name(opts.css_theme())?);
    for (key, value) in &opts.formatter_options {
        html = match key.as_str() {
            "cssclass" => html.with_css_class(value.as_str()),
            "class_prefix" => html.with_class_prefix(value.as_str()),
            "linenos" => html.with_line_numbers(parse_bool(value).unwrap_or(false)),
            _ => html,
        };
    }
    stdout.write_all(html.stylesheet().as_bytes())?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

fn list(registry: &Registry, out: &mut dyn Write) -> io::Result<()> {
    writeln!(out, "Lexers:")?;
    for descriptor in registry.list() {
        let aliases = descriptor.aliases().join(", ");
        writeln!(out, "  {} ({aliases})", descriptor.name())?;
        if !descriptor.description.is_empty() {
            writeln!(out, "      {}", descriptor.description)?;
        }
        if !descriptor.mimetypes().is_empty() {
            writeln!(out, "      mimetypes: {}", descriptor.mimetypes().join(", "))?;
        }
        if !descriptor.filenames.is_empty() {
            writeln!(out, "      filenames: {}", descriptor.filenames.join(", "))?;
        }
        for option in descriptor.options() {
            writeln!(
                out,
                "      -o {}: {} = {}  {}",
                option.name, option.kind, option.default, option.doc
            )?;
        }
    }

    writeln!(out)?;
    writeln!(out, "Formatters:")?;
    for (name, description) in BUILTIN_FORMATTERS {
        writeln!(out, "  {name:<10}{description}")?;
    }

    writeln!(out)?;
    writeln!(out, "Themes:")?;
    writeln!(out, "  {}", BUILTIN_THEMES.join(", "))?;
    Ok(())
}
