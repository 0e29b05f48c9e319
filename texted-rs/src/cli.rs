//! Command-line argument parsing for the demo binary.
//!
//! Usage:
//!   texted [-f[<file>]] [-s<syntax>] [-t<theme>] [-w<width>] [-h<height>] [-dl] [<line>...]
//!
//! Each positional argument becomes one line of the initial text.

use std::path::PathBuf;

pub const USAGE: &str =
    "Usage: texted [-f[<file>]] [-s<syntax>] [-t<theme>] [-w<width>] [-h<height>] [-dl] [<line>...]";

// ── Public types ──────────────────────────────────────────────────────────────

/// Parsed command-line arguments.  `None` fields defer to the config file.
#[derive(Debug, Default)]
pub struct CliArgs {
    /// Where the config comes from.
    pub config: ConfigFile,
    /// Lexer name (`-s<syntax>`).
    pub syntax: Option<String>,
    /// Theme name (`-t<theme>`).
    pub theme: Option<String>,
    /// Editor width (`-w<n>`).
    pub width: Option<usize>,
    /// Editor height (`-h<n>`).
    pub height: Option<usize>,
    /// Debug logging (`-d`).
    pub debug: bool,
    /// Print the available syntaxes and themes and exit (`-l`).
    pub list: bool,
    /// Initial text, one entry per line.
    pub lines: Vec<String>,
}

/// Source of the `textedrc` file.
#[derive(Debug, Default)]
pub enum ConfigFile {
    /// Look in the platform config directory (default).
    #[default]
    Search,
    /// Bare `-f`: start from built-in defaults.
    Skip,
    /// `-f<file>` or `-f <file>`.
    Explicit(PathBuf),
}

// ── Parsing ───────────────────────────────────────────────────────────────────

/// Arguments of the running process.
pub fn parse_args() -> Result<CliArgs, String> {
    let raw: Vec<String> = std::env::args().collect();
    parse_argv(raw.get(1..).unwrap_or_default())
}

/// Parse `argv` without the program name.
pub fn parse_argv(argv: &[String]) -> Result<CliArgs, String> {
    let mut args = CliArgs::default();
    let mut i = 0;

    while i < argv.len() {
        let arg = argv[i].as_str();

        // Everything after `--` is text.
        if arg == "--" {
            args.lines.extend(argv[i + 1..].iter().cloned());
            break;
        }

        // A plain word is one line of text.
        if !arg.starts_with('-') || arg == "-" {
            args.lines.push(arg.to_owned());
            i += 1;
            continue;
        }

        // Single-letter flags may be bundled: `-dl`, `-dssql`.
        let chars: Vec<char> = arg[1..].chars().collect();
        let mut j = 0;
        while j < chars.len() {
            match chars[j] {
                'd' => args.debug = true,
                'l' => args.list = true,

                // -f[<file>]
                'f' => {
                    if j + 1 < chars.len() {
                        let file: String = chars[j + 1..].iter().collect();
                        args.config = ConfigFile::Explicit(PathBuf::from(file));
                        j = chars.len();
                    } else if i + 1 < argv.len() && !argv[i + 1].starts_with('-') {
                        i += 1;
                        args.config = ConfigFile::Explicit(PathBuf::from(&argv[i]));
                    } else {
                        args.config = ConfigFile::Skip;
                    }
                }

                opt @ ('s' | 't' | 'w' | 'h') => {
                    let value = if j + 1 < chars.len() {
                        let s: String = chars[j + 1..].iter().collect();
                        j = chars.len();
                        s
                    } else if i + 1 < argv.len() {
                        i += 1;
                        argv[i].clone()
                    } else {
                        return Err(format!("-{opt} requires an argument"));
                    };
                    match opt {
                        's' => args.syntax = Some(value),
                        't' => args.theme = Some(value),
                        'w' => args.width = Some(parse_dimension(opt, &value)?),
                        _ => args.height = Some(parse_dimension(opt, &value)?),
                    }
                }

                c => return Err(format!("unknown option: -{c}")),
            }
            j += 1;
        }
        i += 1;
    }

    Ok(args)
}

fn parse_dimension(opt: char, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("-{opt}: invalid size: {value}")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
