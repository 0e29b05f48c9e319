use std::io;
use std::path::PathBuf;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyModifiers};
use tracing_subscriber::EnvFilter;

use texted::attr::Attr;
use texted::cli::{self, CliArgs, ConfigFile};
use texted::config::{self, EditorConfig};
use texted::hook::KeywordHook;
use texted::terminal::{compose_overlay, frame, StatusLine, Terminal};
use texted::{lexer, theme, EditAction, Editor, IntellisenseItem};

const SAMPLE: &str = "select *\nfrom tab1\nwhere id=120 and f='èasd'";

fn main() {
    let args = match cli::parse_args() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("texted: {e}");
            eprintln!("{}", cli::USAGE);
            std::process::exit(1);
        }
    };

    init_logging(args.debug);

    if args.list {
        println!("syntaxes: {}", lexer::names().join(", "));
        println!("themes:   {}", theme::names().join(", "));
        return;
    }

    let config = load_config(&args);
    let mut editor = Editor::from_config(&config);
    editor.set_hook(table_hook());
    if args.lines.is_empty() {
        editor.set_value(SAMPLE);
    } else {
        editor.set_value(&args.lines.join("\n"));
    }

    if let Err(e) = run(&mut editor) {
        eprintln!("texted: {e}");
        std::process::exit(1);
    }
}

// ── Setup ─────────────────────────────────────────────────────────────────────

/// Log to the file named by `TEXTED_LOG`, else stderr.  `RUST_LOG` overrides
/// the level.
fn init_logging(debug: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "warn" }));

    let file = std::env::var_os("TEXTED_LOG").map(PathBuf::from);
    match file.map(std::fs::File::create) {
        Some(Ok(f)) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(f))
            .init(),
        Some(Err(e)) => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(io::stderr)
                .init();
            tracing::warn!("cannot open TEXTED_LOG: {e}; logging to stderr");
        }
        None => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(io::stderr)
            .init(),
    }
}

fn load_config(args: &CliArgs) -> EditorConfig {
    let path = match &args.config {
        ConfigFile::Skip => None,
        ConfigFile::Explicit(p) => Some(p.clone()),
        ConfigFile::Search => config::default_path().filter(|p| p.exists()),
    };

    let mut config = match path {
        None => EditorConfig::default(),
        Some(path) => match EditorConfig::load_file(&path) {
            Ok((config, errors)) => {
                for e in errors {
                    tracing::warn!(path = %path.display(), "{e}");
                }
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), "cannot read config: {e}");
                EditorConfig::default()
            }
        },
    };

    if let Some(s) = &args.syntax {
        config.syntax = s.clone();
    }
    if let Some(t) = &args.theme {
        config.theme = t.clone();
    }
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    config
}

/// Offer five table names after `select`.
fn table_hook() -> KeywordHook {
    let tables = (1..=5)
        .map(|i| IntellisenseItem::new(format!("table{i}"), "table"))
        .collect();
    KeywordHook::new().on("select", tables)
}

// ── Main loop ─────────────────────────────────────────────────────────────────

fn run(editor: &mut Editor) -> io::Result<()> {
    let _guard = Terminal::enter_raw_mode()?;
    let mut term = Terminal::new(io::stdout())?;
    term.set_bracketed_paste(true)?;
    term.clear_screen()?;

    loop {
        draw(&mut term, editor)?;
        match event::read()? {
            Event::Key(key) if is_quit(&key) => break,
            Event::Key(key) => {
                // Any key but Esc brings a blurred editor back.
                if !editor.focused() && key.code != KeyCode::Esc {
                    editor.focus();
                }
                editor.handle_key(&key);
            }
            Event::Paste(text) => editor.update(EditAction::InsertText(text)),
            Event::Resize(w, h) => term.handle_resize(w, h),
            _ => {}
        }
    }
    Ok(())
}

fn is_quit(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

fn draw(term: &mut Terminal, editor: &mut Editor) -> io::Result<()> {
    let mut body: Vec<String> = editor.view_lossy().split('\n').map(str::to_owned).collect();
    body.resize(editor.height(), String::new());

    let overlay = editor.overlay().unwrap_or_else(|e| {
        tracing::warn!("overlay failed to render: {e}");
        Vec::new()
    });
    let body = compose_overlay(&body, &overlay, editor.caret_screen_row());
    let framed = frame(&body, editor.width(), editor.height());
    term.draw_lines(0, &framed)?;

    let pos = editor.position();
    let status = StatusLine::new(format!(
        "{} · {} · {}:{}  (ctrl+c to quit)",
        editor.lexer().name(),
        editor.theme().name(),
        pos.row + 1,
        pos.col + 1
    ))
    .with_attr(Attr::REVERSE);
    let row = framed.len() as u16;
    term.draw_status(row, &status)?;
    term.clear_below(row.saturating_add(1))?;
    term.flush()
}
