#![forbid(unsafe_code)]

//! Command-line argument parsing.
//!
//! Parses args by hand to keep the binary lean. Environment variables
//! (`SHEEN_*`, plus `NO_COLOR`, `COLORTERM` and `TERM` for color detection)
//! provide defaults that explicit flags override.

use std::env;
use std::process;

use sheen::ColorProfile;
use sheen::format::BUILTIN_THEMES;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const HELP_TEXT: &str = "\
sheen: syntax highlighter for terminals, HTML, BBCode and RTF

USAGE:
    sheen [OPTIONS] [FILE...]

Reads standard input when no FILE (or `-`) is given.

OPTIONS:
    -l, --lexer NAME[?K=V&..]  Force a lexer, optionally with options
    -f, --formatter NAME       Output format: terminal (default), html,
                               bbcode, rtf, plain
    -o, --lexer-option K=V     Set a lexer option (repeatable)
    -O, --formatter-option K=V Set a formatter option (repeatable)
    -L, --list                 List lexers, formatters and themes
        --css [THEME]          Print the HTML stylesheet of a theme
    -h, --help                 Show this help message
    -V, --version              Show version

LEXER CHOICE (per file):
    explicit --lexer, then file name patterns, then content guessing

FORMATTER OPTIONS:
    terminal   theme=NAME colors=none|16|256|truecolor
    html       theme=NAME cssclass=CLASS class_prefix=PREFIX inline_styles=BOOL
               lexer_spans=BOOL linenos=BOOL linestart=N
    bbcode     theme=NAME (default molokai)
    rtf        theme=NAME (default molokai)

ENVIRONMENT VARIABLES:
    SHEEN_FORMATTER   Default for --formatter
    SHEEN_THEME       Default theme
    SHEEN_COLORS      Terminal color profile (none|16|256|truecolor)
    SHEEN_LOG         Log filter for stderr diagnostics (default: warn)
    NO_COLOR          Disable colors when set and non-empty
    COLORTERM         `truecolor` or `24bit` enables 24-bit colors";

/// What the invocation asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Highlight,
    List,
    Css { theme: Option<String> },
    Help,
    Version,
}

/// Parsed command-line options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opts {
    pub command: Command,
    /// Lexer query such as `php?start_inline=on`.
    pub lexer: Option<String>,
    pub formatter: String,
    pub theme: Option<String>,
    /// Terminal color profile, detected or from `SHEEN_COLORS`.
    pub colors: ColorProfile,
    pub lexer_options: Vec<(String, String)>,
    pub formatter_options: Vec<(String, String)>,
    /// Input paths; `-` is standard input.
    pub files: Vec<String>,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            command: Command::Highlight,
            lexer: None,
            formatter: "terminal".into(),
            theme: None,
            colors: ColorProfile::Ansi16,
            lexer_options: Vec::new(),
            formatter_options: Vec::new(),
            files: Vec::new(),
        }
    }
}

impl Opts {
    /// Parse the process arguments and environment, exiting on bad usage.
    pub fn parse() -> Self {
        match Self::parse_from(env::args().skip(1), |key| env::var(key).ok()) {
            Ok(opts) => opts,
            Err(message) => {
                eprintln!("sheen: {message}");
                eprintln!("Run with --help for usage information.");
                process::exit(2);
            }
        }
    }

    /// Parse `args` (without the program name) with `var` as the environment.
    pub fn parse_from<I, S, F>(args: I, var: F) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&str) -> Option<String>,
    {
        let mut opts = Self::default();

        // Environment defaults first.
        if let Some(name) = var("SHEEN_FORMATTER").filter(|v| !v.is_empty()) {
            opts.formatter = name;
        }
        opts.theme = var("SHEEN_THEME").filter(|v| !v.is_empty());
        opts.colors = match var("SHEEN_COLORS").filter(|v| !v.is_empty()) {
            Some(value) => value
                .parse()
                .map_err(|e| format!("invalid SHEEN_COLORS: {e}"))?,
            None => detect_profile(&var),
        };

        let args: Vec<String> = args.into_iter().map(Into::into).collect();
        let mut i = 0;
        let mut only_files = false;
        while i < args.len() {
            let arg = args[i].as_str();
            i += 1;
            if only_files || arg == "-" || !arg.starts_with('-') {
                opts.files.push(arg.to_owned());
                continue;
            }
            let (flag, inline) = match arg.split_once('=') {
                Some((flag, value)) if flag.starts_with("--") => (flag, Some(value)),
                _ => (arg, None),
            };
            let mut value = |name: &str| -> Result<String, String> {
                if let Some(v) = inline {
                    return Ok(v.to_owned());
                }
                let v = args
                    .get(i)
                    .ok_or_else(|| format!("{name} requires a value"))?
                    .clone();
                i += 1;
                Ok(v)
            };
            match flag {
                "--" => only_files = true,
                "-h" | "--help" => opts.command = Command::Help,
                "-V" | "--version" => opts.command = Command::Version,
                "-L" | "--list" => opts.command = Command::List,
                "-l" | "--lexer" => opts.lexer = Some(value(flag)?),
                "-f" | "--formatter" => opts.formatter = value(flag)?,
                "-o" | "--lexer-option" => opts.lexer_options.push(key_value(&value(flag)?)),
                "-O" | "--formatter-option" => {
                    opts.formatter_options.push(key_value(&value(flag)?));
                }
                "--css" => {
                    // A following argument counts as the theme only if it names one.
                    let theme = match inline {
                        Some(v) => Some(v.to_owned()),
                        None => match args.get(i) {
                            Some(next) if is_theme(next) => {
                                i += 1;
                                Some(next.clone())
                            }
                            _ => None,
                        },
                    };
                    opts.command = Command::Css { theme };
                }
                other => return Err(format!("unknown argument: {other}")),
            }
        }
        Ok(opts)
    }

    /// Theme for the stylesheet: `--css THEME`, then `-O theme=`, then the
    /// environment.
    pub fn css_theme(&self) -> &str {
        if let Command::Css { theme: Some(theme) } = &self.command {
            return theme;
        }
        self.formatter_options
            .iter()
            .rev()
            .find(|(k, _)| k == "theme")
            .map(|(_, v)| v.as_str())
            .or(self.theme.as_deref())
            .unwrap_or("default")
    }
}

/// Split `K=V`; a bare `K` gets an empty value, which boolean options read as on.
fn key_value(raw: &str) -> (String, String) {
    let (key, value) = raw.split_once('=').unwrap_or((raw, ""));
    (key.trim().to_owned(), value.to_owned())
}

fn is_theme(name: &str) -> bool {
    BUILTIN_THEMES.iter().any(|t| t.eq_ignore_ascii_case(name))
}

/// Color profile from `NO_COLOR`, `COLORTERM` and `TERM`.
fn detect_profile<F>(var: &F) -> ColorProfile
where
    F: Fn(&str) -> Option<String>,
{
    let no_color = var("NO_COLOR").is_some_and(|v| !v.is_empty());
    let colorterm = var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    let true_color = colorterm == "truecolor" || colorterm == "24bit";
    let term = var("TERM").unwrap_or_default();
    let colors_256 = term.contains("256color");
    if term == "dumb" {
        return ColorProfile::Mono;
    }
    ColorProfile::from_capabilities(no_color, true_color, colors_256)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Opts, String> {
        Opts::parse_from(args.iter().copied(), |_| None)
    }

    fn parse_env(args: &[&str], env: &[(&str, &str)]) -> Result<Opts, String> {
        let env: Vec<(String, String)> = env
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        Opts::parse_from(args.iter().copied(), move |key| {
            env.iter().find(|(k, _)| k == key).map(|(_, v)| v.clone())
        })
    }

    #[test]
    fn default_opts() {
        let opts = parse(&[]).unwrap();
        assert_eq!(opts.command, Command::Highlight);
        assert_eq!(opts.formatter, "terminal");
        assert_eq!(opts.colors, ColorProfile::Ansi16);
        assert!(opts.files.is_empty());
    }

    #[test]
    fn flags_in_short_long_and_inline_forms() {
        let opts = parse(&[
            "-l",
            "php?start_inline=on",
            "--formatter=html",
            "-o",
            "short_tags=off",
            "--lexer-option",
            "asp_tags",
            "-O",
            "cssclass=code",
            "a.php",
            "-",
        ])
        .unwrap();
        assert_eq!(opts.lexer.as_deref(), Some("php?start_inline=on"));
        assert_eq!(opts.formatter, "html");
        assert_eq!(
            opts.lexer_options,
            vec![
                ("short_tags".to_owned(), "off".to_owned()),
                ("asp_tags".to_owned(), String::new()),
            ]
        );
        assert_eq!(
            opts.formatter_options,
            vec![("cssclass".to_owned(), "code".to_owned())]
        );
        assert_eq!(opts.files, ["a.php", "-"]);
    }

    #[test]
    fn double_dash_ends_options() {
        let opts = parse(&["--", "-l", "--list"]).unwrap();
        assert_eq!(opts.files, ["-l", "--list"]);
        assert_eq!(opts.command, Command::Highlight);
    }

    #[test]
    fn usage_errors() {
        assert!(parse(&["--bogus"]).unwrap_err().contains("--bogus"));
        assert!(parse(&["-l"]).unwrap_err().contains("requires a value"));
    }

    #[test]
    fn css_takes_an_optional_theme() {
        let opts = parse(&["--css", "monokai"]).unwrap();
        assert_eq!(opts.css_theme(), "monokai");
        let opts = parse(&["--css", "file.txt"]).unwrap();
        assert_eq!(opts.command, Command::Css { theme: None });
        assert_eq!(opts.files, ["file.txt"]);
        let opts = parse(&["--css=molokai"]).unwrap();
        assert_eq!(opts.css_theme(), "molokai");
        let opts = parse_env(&["--css"], &[("SHEEN_THEME", "monokai")]).unwrap();
        assert_eq!(opts.css_theme(), "monokai");
    }

    #[test]
    fn environment_defaults_and_overrides() {
        let env = [("SHEEN_FORMATTER", "html"), ("SHEEN_THEME", "molokai")];
        let opts = parse_env(&[], &env).unwrap();
        assert_eq!(opts.formatter, "html");
        assert_eq!(opts.theme.as_deref(), Some("molokai"));
        let opts = parse_env(&["-f", "plain"], &env).unwrap();
        assert_eq!(opts.formatter, "plain");
    }

    fn profile(env: &[(&str, &str)]) -> ColorProfile {
        parse_env(&[], env).unwrap().colors
    }

    #[test]
    fn color_detection() {
        assert_eq!(profile(&[("COLORTERM", "truecolor")]), ColorProfile::TrueColor);
        assert_eq!(profile(&[("TERM", "xterm-256color")]), ColorProfile::Ansi256);
        assert_eq!(
            profile(&[("COLORTERM", "24bit"), ("NO_COLOR", "1")]),
            ColorProfile::Mono
        );
        assert_eq!(profile(&[("NO_COLOR", "")]), ColorProfile::Ansi16);
        assert_eq!(profile(&[("TERM", "dumb")]), ColorProfile::Mono);
        assert_eq!(
            profile(&[("SHEEN_COLORS", "256"), ("NO_COLOR", "1")]),
            ColorProfile::Ansi256
        );
        assert!(parse_env(&[], &[("SHEEN_COLORS", "lots")]).is_err());
    }

    #[test]
    fn help_and_version() {
        assert_eq!(parse(&["-h"]).unwrap().command, Command::Help);
        assert_eq!(parse(&["--version"]).unwrap().command, Command::Version);
        assert!(HELP_TEXT.contains("SHEEN_COLORS"));
        assert!(!VERSION.is_empty());
    }
}
