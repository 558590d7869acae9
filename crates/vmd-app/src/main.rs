//! vmd entry point.
//!
//! Resolves the startup document, opens the first window, then feeds
//! stdin commands and file-change events to the session until the last
//! window closes or stdin ends.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};

use anyhow::{Context, Result};
use clap::Parser;

use vmd_app::cli::{self, Args};
use vmd_app::{
    CommandOutput, CommandRegistry, DocumentWatcher, Session, SystemOpener, resolve_startup,
};
use vmd_fs::NativeFs;

enum Event {
    Line(String),
    Changed(PathBuf),
    Eof,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.versions {
        for line in cli::versions() {
            println!("{line}");
        }
        return Ok(());
    }

    let env_config = std::env::var_os(cli::CONFIG_ENV).map(PathBuf::from);
    let config = args
        .resolve_config(env_config.as_deref())
        .context("Failed to load configuration")?;
    let cwd = std::env::current_dir().context("Cannot determine the working directory")?;
    let startup = resolve_startup(args.file.as_deref(), &config, &cwd, &NativeFs)?;
    log::info!("Starting vmd {}", env!("CARGO_PKG_VERSION"));

    let (tx, rx) = mpsc::channel();
    let mut watcher = if config.watch {
        start_watcher(tx.clone())
    } else {
        None
    };
    spawn_stdin_reader(tx);

    let mut session = Session::new(config, Box::new(NativeFs), Box::new(SystemOpener), cwd);
    let registry = CommandRegistry::with_builtins();
    session.open_window(startup);
    flush(&mut session, None)?;
    sync_watcher(watcher.as_mut(), &session);

    for event in rx {
        let reply = match event {
            Event::Line(line) => match registry.execute(&line, &mut session) {
                Ok(CommandOutput::Text(text)) => Some(text),
                Ok(CommandOutput::None | CommandOutput::Quit) => None,
                Err(e) => Some(format!("error: {e}")),
            },
            Event::Changed(path) => {
                if let Some(path) = watcher.as_ref().and_then(|w| w.resolve_event_path(&path)) {
                    log::info!("{} changed, reloading", path.display());
                    session.file_changed(&path);
                }
                None
            },
            Event::Eof => {
                log::info!("Input closed");
                break;
            },
        };
        flush(&mut session, reply)?;
        if session.should_quit() {
            break;
        }
        sync_watcher(watcher.as_mut(), &session);
    }

    log::info!("Exiting");
    Ok(())
}

/// Print what the session produced, then the command's own reply.
fn flush(session: &mut Session, reply: Option<String>) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    for line in session.take_output().into_iter().chain(reply) {
        writeln!(out, "{line}")?;
    }
    out.flush()
}

fn start_watcher(tx: Sender<Event>) -> Option<DocumentWatcher> {
    let watcher = DocumentWatcher::new(move |path| {
        let _ = tx.send(Event::Changed(path));
    });
    match watcher {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            log::warn!("File watching disabled: {e}");
            None
        },
    }
}

fn sync_watcher(watcher: Option<&mut DocumentWatcher>, session: &Session) {
    let Some(watcher) = watcher else {
        return;
    };
    let paths = session.watched_paths();
    if let Err(e) = watcher.sync(paths.iter().map(PathBuf::as_path)) {
        log::warn!("{e}");
    }
}

fn spawn_stdin_reader(tx: Sender<Event>) {
    std::thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(Event::Line(line)).is_err() {
                        return;
                    }
                },
                Err(e) => {
                    log::error!("Failed to read input: {e}");
                    break;
                },
            }
        }
        let _ = tx.send(Event::Eof);
    });
}
