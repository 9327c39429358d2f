//! Operator REPL
//!
//! Drives the simulated controllers from a terminal: `down <key>` / `up <key>`
//! hold and release a keymap key, `tap <key>` does both on consecutive
//! samples. Lines are read on a blocking thread and forwarded to the main loop.

use anyhow::{bail, Context, Result};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use std::str::FromStr;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const PROMPT: &str = "quackbox> ";

pub const HELP: &str = "\
Commands:
  down <key>   hold a keymap key (e.g. down o)
  up <key>     release a keymap key
  tap <key>    press, then release on the next sample
  status       show the current screen, players and focus
  help         show this help
  quit         stop the launcher";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    KeyDown(String),
    KeyUp(String),
    Tap(String),
    Status,
    Help,
    Quit,
}

impl FromStr for ReplCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let Some(verb) = words.next() else {
            bail!("Empty command");
        };
        let key = words.next().map(str::to_string);
        if let Some(extra) = words.next() {
            bail!("Unexpected argument '{}'", extra);
        }

        let needs_key = |key: Option<String>| key.with_context(|| format!("'{}' needs a key", verb));
        match verb.to_lowercase().as_str() {
            "down" => Ok(Self::KeyDown(needs_key(key)?)),
            "up" => Ok(Self::KeyUp(needs_key(key)?)),
            "tap" => Ok(Self::Tap(needs_key(key)?)),
            "status" => Ok(Self::Status),
            "help" | "?" => Ok(Self::Help),
            "quit" | "exit" => Ok(Self::Quit),
            other => bail!("Unknown command '{}' (try 'help')", other),
        }
    }
}

/// Start reading commands on a blocking thread
///
/// The channel closes when input ends (EOF or Ctrl+D); Ctrl+C at the prompt
/// is forwarded as [`ReplCommand::Quit`].
pub fn spawn_repl() -> Result<mpsc::UnboundedReceiver<ReplCommand>> {
    let mut editor = DefaultEditor::new().context("Failed to start line editor")?;
    let (tx, rx) = mpsc::unbounded_channel();

    std::thread::Builder::new()
        .name("repl".to_string())
        .spawn(move || loop {
            match editor.readline(PROMPT) {
                Ok(line) if line.trim().is_empty() => {},
                Ok(line) => {
                    let _ = editor.add_history_entry(line.as_str());
                    match line.parse::<ReplCommand>() {
                        Ok(command) => {
                            let quit = command == ReplCommand::Quit;
                            if tx.send(command).is_err() || quit {
                                break;
                            }
                        },
                        Err(e) => println!("{}", e),
                    }
                },
                Err(ReadlineError::Interrupted) => {
                    let _ = tx.send(ReplCommand::Quit);
                    break;
                },
                Err(ReadlineError::Eof) => {
                    debug!("REPL input closed");
                    break;
                },
                Err(e) => {
                    warn!("REPL error: {}", e);
                    break;
                },
            }
        })
        .context("Failed to spawn REPL thread")?;

    Ok(rx)
}
