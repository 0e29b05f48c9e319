//! `textedrc` configuration file parser.
//!
//! | Directive | Action |
//! |-----------|--------|
//! | `/set <name>=<value>` or `/set <name> <value>` | set an editor option |
//! | `/bind <chord>=<action>` | bind a key, e.g. `/bind ctrl+a=home` |
//! | Lines starting with `;` | comment, ignored |
//! | Any other `/command` | silently skipped |
//!
//! Options: `width`, `height`, `syntax`, `theme`, `caret_fg`, `caret_bg`
//! (`#rrggbb`, or `none`), `caret_bold` (`on`/`off`), `overlay_offset`.
//!
//! A bad value is reported as a [`ConfigError`] and the option keeps its
//! default; loading never stops at the first error.

use std::path::{Path, PathBuf};

use crate::attr::{Attr, Rgb, StyleEntry};
use crate::keybind::{EditAction, KeyChord};
use crate::render::DEFAULT_CARET_STYLE;

/// File name looked up in the user's config directory.
pub const FILE_NAME: &str = "textedrc";

// ── Public API ────────────────────────────────────────────────────────────────

/// A non-fatal error encountered while loading a config file.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ConfigError {
    pub line: usize,
    pub message: String,
}

/// Editor settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub width: usize,
    pub height: usize,
    /// Lexer name or alias.
    pub syntax: String,
    pub theme: String,
    pub caret_style: StyleEntry,
    /// Extra left padding of the completion overlay.
    pub overlay_offset: usize,
    /// Key bindings applied on top of the defaults, in file order.
    pub bindings: Vec<(KeyChord, EditAction)>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            width: 40,
            height: 10,
            syntax: "sql".to_owned(),
            theme: crate::theme::FALLBACK.to_owned(),
            caret_style: DEFAULT_CARET_STYLE,
            overlay_offset: 0,
            bindings: Vec::new(),
        }
    }
}

impl EditorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a config string.
    ///
    /// Returns the config and a list of any errors on recognised lines.
    pub fn load_str(s: &str) -> (Self, Vec<ConfigError>) {
        let mut config = EditorConfig::new();
        let mut errors = Vec::new();

        for (i, raw) in s.lines().enumerate() {
            let lineno = i + 1;
            let line = raw.trim();

            if line.is_empty() || line.starts_with(';') {
                continue;
            }

            let Some(rest) = line.strip_prefix('/') else { continue };

            let (cmd, args) = rest
                .split_once(|c: char| c.is_ascii_whitespace())
                .unwrap_or((rest, ""));
            let args = args.trim();

            let result = match cmd {
                "set" => split_assignment("/set", args).and_then(|(n, v)| config.set(n, v)),
                "bind" => split_assignment("/bind", args).and_then(|(c, a)| config.bind(c, a)),
                _ => Ok(()),
            };
            if let Err(message) = result {
                errors.push(ConfigError { line: lineno, message });
            }
        }

        (config, errors)
    }

    /// Read and parse a config file from disk.
    pub fn load_file(path: &Path) -> std::io::Result<(Self, Vec<ConfigError>)> {
        let s = std::fs::read_to_string(path)?;
        Ok(Self::load_str(&s))
    }

    /// Apply one `name=value` option.
    pub fn set(&mut self, name: &str, value: &str) -> Result<(), String> {
        match name {
            "width" => self.width = parse_size(name, value)?,
            "height" => self.height = parse_size(name, value)?,
            "syntax" => self.syntax = non_empty(name, value)?,
            "theme" => self.theme = non_empty(name, value)?,
            "caret_fg" => self.caret_style.fg = parse_color(name, value)?,
            "caret_bg" => self.caret_style.bg = parse_color(name, value)?,
            "caret_bold" => {
                self.caret_style.attr = if parse_flag(name, value)? {
                    self.caret_style.attr | Attr::BOLD
                } else {
                    self.caret_style.attr.without(Attr::BOLD)
                };
            }
            "overlay_offset" => {
                self.overlay_offset = value
                    .parse()
                    .map_err(|_| format!("{name}: expected a number, got '{value}'"))?;
            }
            _ => return Err(format!("/set: unknown option '{name}'")),
        }
        Ok(())
    }

    fn bind(&mut self, chord: &str, action: &str) -> Result<(), String> {
        let chord = KeyChord::parse(chord).ok_or_else(|| format!("/bind: bad key '{chord}'"))?;
        let action =
            EditAction::from_name(action).ok_or_else(|| format!("/bind: unknown action '{action}'"))?;
        self.bindings.push((chord, action));
        Ok(())
    }
}

/// `$XDG_CONFIG_HOME/texted/textedrc` or the platform equivalent.
pub fn default_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "texted").map(|d| d.config_dir().join(FILE_NAME))
}

// ── Value parsing ─────────────────────────────────────────────────────────────

/// Split `name=value` or `name value`.
fn split_assignment<'a>(cmd: &str, args: &'a str) -> Result<(&'a str, &'a str), String> {
    if args.is_empty() {
        return Err(format!("{cmd}: requires an argument"));
    }
    let (name, value) = match args.split_once('=') {
        Some((n, v)) => (n.trim(), v.trim()),
        None => match args.split_once(|c: char| c.is_ascii_whitespace()) {
            Some((n, v)) => (n, v.trim()),
            None => return Err(format!("{cmd}: missing value for '{args}'")),
        },
    };
    if name.is_empty() {
        return Err(format!("{cmd}: name cannot be empty"));
    }
    Ok((name, value))
}

fn parse_size(name: &str, value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{name}: expected a positive number, got '{value}'")),
    }
}

fn non_empty(name: &str, value: &str) -> Result<String, String> {
    if value.is_empty() {
        Err(format!("{name}: value cannot be empty"))
    } else {
        Ok(value.to_owned())
    }
}

fn parse_color(name: &str, value: &str) -> Result<Option<Rgb>, String> {
    if value.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    value.parse::<Rgb>().map(Some).map_err(|e| format!("{name}: {e}"))
}

fn parse_flag(name: &str, value: &str) -> Result<bool, String> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "on" | "yes" | "true" => Ok(true),
        "0" | "off" | "no" | "false" => Ok(false),
        _ => Err(format!("{name}: expected on/off, got '{value}'")),
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attr::color;
    use crossterm::event::KeyCode;

    // -- Defaults -------------------------------------------------------------

    #[test]
    fn defaults_match_demo_geometry() {
        let cfg = EditorConfig::default();
        assert_eq!((cfg.width, cfg.height), (40, 10));
        assert_eq!(cfg.syntax, "sql");
        assert_eq!(cfg.theme, "monokai");
        assert_eq!(cfg.caret_style, DEFAULT_CARET_STYLE);
        assert_eq!(cfg.overlay_offset, 0);
    }

    // -- /set -----------------------------------------------------------------

    #[test]
    fn set_equals_syntax() {
        let (cfg, errs) = EditorConfig::load_str("/set width=80\n/set theme=github");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.width, 80);
        assert_eq!(cfg.theme, "github");
    }

    #[test]
    fn set_space_syntax() {
        let (cfg, errs) = EditorConfig::load_str("/set height 24");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.height, 24);
    }

    #[test]
    fn caret_options() {
        let (cfg, errs) = EditorConfig::load_str(
            "/set caret_fg=#ffffff\n\
             /set caret_bg=none\n\
             /set caret_bold=off",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.caret_style.fg, Some(color::WHITE));
        assert_eq!(cfg.caret_style.bg, None);
        assert!(!cfg.caret_style.attr.contains(Attr::BOLD));
    }

    #[test]
    fn bad_values_keep_defaults_and_report_line() {
        let (cfg, errs) = EditorConfig::load_str(
            "/set width=wide\n\
             /set caret_bg=red\n\
             /set height=0\n\
             /set overlay_offset=3",
        );
        assert_eq!(errs.len(), 3, "{errs:?}");
        assert_eq!(errs.iter().map(|e| e.line).collect::<Vec<_>>(), [1, 2, 3]);
        assert_eq!(cfg.width, 40);
        assert_eq!(cfg.height, 10);
        assert_eq!(cfg.caret_style.bg, Some(color::RED));
        assert_eq!(cfg.overlay_offset, 3);
    }

    #[test]
    fn unknown_option_is_an_error() {
        let (_, errs) = EditorConfig::load_str("/set wrap=1");
        assert_eq!(errs.len(), 1);
        assert!(errs[0].message.contains("wrap"));
        assert!(errs[0].to_string().starts_with("line 1:"));
    }

    #[test]
    fn set_without_value_is_an_error() {
        let (_, errs) = EditorConfig::load_str("/set width");
        assert_eq!(errs.len(), 1);
    }

    // -- /bind ----------------------------------------------------------------

    #[test]
    fn bind_records_chord_and_action() {
        let (cfg, errs) = EditorConfig::load_str("/bind ctrl+a=home\n/bind tab dismiss");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(
            cfg.bindings,
            vec![
                (KeyChord::ctrl('a'), EditAction::MoveHome),
                (KeyChord::plain(KeyCode::Tab), EditAction::DismissCompletion),
            ]
        );
    }

    #[test]
    fn bad_bind_is_reported() {
        let (cfg, errs) = EditorConfig::load_str("/bind ctrl+a=teleport\n/bind hyper+q=home");
        assert_eq!(errs.len(), 2);
        assert!(cfg.bindings.is_empty());
    }

    // -- Comments & skipping --------------------------------------------------

    #[test]
    fn semicolon_comments_and_blank_lines_ignored() {
        let (cfg, errs) = EditorConfig::load_str(
            ";; This is a comment\n\
             \n\
             ; Also a comment\n\
             /set syntax=json",
        );
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.syntax, "json");
    }

    #[test]
    fn unknown_commands_silently_skipped() {
        let (cfg, errs) = EditorConfig::load_str("/def -i x = /echo hi\n/set width=50");
        assert!(errs.is_empty(), "{errs:?}");
        assert_eq!(cfg.width, 50);
    }

    #[test]
    fn load_file_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(FILE_NAME);
        std::fs::write(&path, "/set theme=bw\n").unwrap();
        let (cfg, errs) = EditorConfig::load_file(&path).unwrap();
        assert!(errs.is_empty());
        assert_eq!(cfg.theme, "bw");
        assert!(EditorConfig::load_file(&dir.path().join("missing")).is_err());
    }
}
