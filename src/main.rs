//! Quackbox launcher
//!
//! Headless launcher binary: polls physical and simulated controllers, drives
//! the navigation session and the shell, and runs catalog work in the
//! background.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};
use tracing::{debug, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use quackbox_nav::catalog::{Catalog, CatalogError, GameRecord, Leaderboard, LocalCatalog};
use quackbox_nav::cli::{self, ReplCommand};
use quackbox_nav::config::{AppConfig, ConfigWatcher};
use quackbox_nav::input::{
    poll_sources, print_gamepad_diagnostics, GilrsProvider, InputSource, Keymap, SimulatedSource,
};
use quackbox_nav::paths::AppPaths;
use quackbox_nav::session::{Session, SessionSettings};
use quackbox_nav::shell::{Shell, ShellCommand, WidgetTree};

/// Quackbox - gamepad-navigated game launcher
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to configuration file (created with defaults when missing)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(short, long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also write JSON logs to a daily file in the logs directory
    #[arg(long)]
    log_file: bool,

    /// Enable keyboard-simulated controllers
    #[arg(long)]
    simulated: bool,

    /// Do not poll physical gamepads
    #[arg(long)]
    no_physical: bool,

    /// Print detected gamepads and exit
    #[arg(long)]
    diagnose: bool,
}

impl Args {
    fn apply_overrides(&self, config: &mut AppConfig) {
        if self.simulated {
            config.input.simulated = true;
        }
        if self.no_physical {
            config.input.physical = false;
        }
    }
}

/// Result of a background catalog call
#[derive(Debug)]
enum BackendReply {
    Catalog(Result<Vec<GameRecord>, CatalogError>),
    Leaderboard(String, Result<Leaderboard, CatalogError>),
    Launched(String, Result<(), CatalogError>),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let paths = AppPaths::detect();

    let _log_guard = init_logging(&args.log_level, args.log_file.then_some(paths.logs_dir.as_path()))?;

    info!("Starting Quackbox v{}...", env!("CARGO_PKG_VERSION"));

    if args.diagnose {
        tokio::task::spawn_blocking(print_gamepad_diagnostics).await?;
        return Ok(());
    }

    if let Err(e) = paths.ensure_directories() {
        warn!("Failed to create data directories: {:#}", e);
    }

    let config_path = args.config.clone().unwrap_or_else(|| paths.config.clone());
    info!("Configuration file: {}", config_path.display());
    write_default_config(&config_path).await?;

    let (config_watcher, mut config) = ConfigWatcher::new(&config_path).await?;
    args.apply_overrides(&mut config);
    config.validate().context("Invalid configuration after command line overrides")?;
    info!("Configuration loaded successfully with hot-reload enabled");

    let catalog: Arc<dyn Catalog> = Arc::new(LocalCatalog::new(paths.games_dir_for(&config)));

    run_app(args, config, config_watcher, catalog, shutdown_signal()).await?;

    info!("Quackbox shutdown complete");
    Ok(())
}

/// Everything the main loop mutates
struct Launcher {
    session: Session<WidgetTree>,
    shell: Shell,
    simulated: SimulatedSource,
    physical: Option<GilrsProvider>,
    /// Keys tapped since the last sample, released after it
    tapped: Vec<String>,
    catalog: Arc<dyn Catalog>,
    replies: mpsc::UnboundedSender<BackendReply>,
}

impl Launcher {
    /// One sampler quantum
    fn step(&mut self, now: Instant) {
        let mut sources: Vec<&mut dyn InputSource> = Vec::new();
        sources.push(&mut self.simulated);
        if let Some(provider) = self.physical.as_mut() {
            sources.push(provider);
        }

        let (events, snapshots) = poll_sources(&mut sources);
        for event in events {
            self.session.handle_source_event(event, now);
        }
        self.session.tick(&snapshots, now);

        for key in self.tapped.drain(..) {
            self.simulated.key_up(&key);
        }
        self.session.notifications_mut().expire(now);
        self.settle(now);
    }

    /// Dispatch clicks, re-render, then run the deferred page work
    fn settle(&mut self, now: Instant) {
        for command in self.shell.process_clicks(&mut self.session, now) {
            self.spawn_backend(command);
        }
        self.shell.render(&mut self.session);
        self.session.run_deferred();
    }

    fn spawn_backend(&self, command: ShellCommand) {
        let catalog = self.catalog.clone();
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let reply = match command {
                ShellCommand::LoadLeaderboard(title) => {
                    let result = catalog.get_leaderboard(&title).await;
                    BackendReply::Leaderboard(title, result)
                },
                ShellCommand::LaunchGame(id) => {
                    let result = catalog.launch_game(&id).await;
                    BackendReply::Launched(id, result)
                },
            };
            let _ = replies.send(reply);
        });
    }

    fn load_catalog(&self) {
        let catalog = self.catalog.clone();
        let replies = self.replies.clone();
        tokio::spawn(async move {
            let _ = replies.send(BackendReply::Catalog(catalog.get_game_catalog().await));
        });
    }

    fn on_backend_reply(&mut self, reply: BackendReply, now: Instant) {
        let notifications = self.session.notifications_mut();
        match reply {
            BackendReply::Catalog(Ok(games)) => self.shell.set_games(games),
            BackendReply::Catalog(Err(e)) => {
                notifications.warn(format!("Could not load games: {}", e), now);
            },
            BackendReply::Leaderboard(title, Ok(board)) => {
                debug!("Leaderboard for '{}': {} metric(s)", title, board.len());
                self.shell.set_leaderboard(title, board);
            },
            BackendReply::Leaderboard(title, Err(e)) => {
                notifications.warn(format!("Could not load the leaderboard for {}: {}", title, e), now);
            },
            BackendReply::Launched(id, Ok(())) => {
                notifications.info(format!("Launched {}", id), now);
            },
            BackendReply::Launched(_, Err(e)) => {
                notifications.warn(e.to_string(), now);
            },
        }
        self.settle(now);
    }

    fn on_repl_command(&mut self, command: ReplCommand) -> bool {
        match command {
            ReplCommand::KeyDown(key) | ReplCommand::KeyUp(key) | ReplCommand::Tap(key)
                if !self.simulated.is_enabled() =>
            {
                println!(
                    "Ignoring '{}': simulated controllers are disabled (set input.simulated or use --simulated)",
                    key
                );
            },
            ReplCommand::KeyDown(key) => self.simulated.key_down(&key),
            ReplCommand::KeyUp(key) => self.simulated.key_up(&key),
            ReplCommand::Tap(key) => {
                self.simulated.key_down(&key);
                self.tapped.push(key);
            },
            ReplCommand::Status => println!("{}", self.shell.describe(&self.session)),
            ReplCommand::Help => println!("{}", cli::HELP),
            ReplCommand::Quit => return false,
        }
        true
    }

    fn apply_config(&mut self, config: &AppConfig) {
        self.session.apply_settings(SessionSettings::from(&config.players));
        self.simulated.set_keymap(Keymap::from_config(&config.keymap));
        self.simulated.set_enabled(config.input.simulated);
    }
}

async fn run_app(
    args: Args,
    config: AppConfig,
    mut config_watcher: ConfigWatcher,
    catalog: Arc<dyn Catalog>,
    shutdown: impl std::future::Future<Output = ()>,
) -> Result<()> {
    info!("Starting main application loop...");

    let physical = if config.input.physical {
        Some(GilrsProvider::start(config.physical_slot_base())?)
    } else {
        info!("Physical gamepads disabled");
        None
    };
    if config.input.simulated {
        info!("Simulated controllers enabled (type 'help' at the prompt)");
    }

    let mut simulated = SimulatedSource::new(Keymap::from_config(&config.keymap));
    simulated.set_enabled(config.input.simulated);

    let tree = WidgetTree::new();
    let (replies_tx, mut replies_rx) = mpsc::unbounded_channel();
    let mut launcher = Launcher {
        session: Session::new(tree.clone(), SessionSettings::from(&config.players)),
        shell: Shell::new(tree),
        simulated,
        physical,
        tapped: Vec::new(),
        catalog,
        replies: replies_tx,
    };
    launcher.load_catalog();
    launcher.settle(Instant::now());

    let mut repl_rx = cli::spawn_repl()?;

    let mut sample_interval = config.input.sample_interval();
    let mut sampler = time::interval(sample_interval);
    sampler.set_missed_tick_behavior(MissedTickBehavior::Skip);

    tokio::pin!(shutdown);

    loop {
        let deadline = [
            launcher.session.next_deadline(),
            launcher.session.notifications().next_expiry(),
        ]
        .into_iter()
        .flatten()
        .min();

        tokio::select! {
            _ = sampler.tick() => launcher.step(Instant::now()),

            // Grace periods and notices end between samples
            _ = sleep_until(deadline) => launcher.step(Instant::now()),

            Some(command) = repl_rx.recv() => {
                if !launcher.on_repl_command(command) {
                    info!("Quit requested");
                    break;
                }
            }

            Some(reply) = replies_rx.recv() => launcher.on_backend_reply(reply, Instant::now()),

            Some(mut new_config) = config_watcher.next_config() => {
                info!("📝 Configuration file changed, reloading...");
                args.apply_overrides(&mut new_config);
                if let Err(e) = new_config.validate() {
                    warn!("⚠️  Failed to reload config (keeping old config): {:#}", e);
                    continue;
                }
                launcher.apply_config(&new_config);
                if new_config.input.sample_interval() != sample_interval {
                    sample_interval = new_config.input.sample_interval();
                    sampler = time::interval(sample_interval);
                    sampler.set_missed_tick_behavior(MissedTickBehavior::Skip);
                }
                info!("✅ Configuration reloaded");
            }

            _ = &mut shutdown => {
                info!("Shutdown signal received, stopping event loop");
                break;
            }
        }

        if launcher.session.kill_requested() {
            info!("Kill switch engaged, stopping event loop");
            break;
        }
    }

    info!("Shutting down...");
    if let Some(mut provider) = launcher.physical.take() {
        provider.shutdown().await?;
    }
    Ok(())
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(time::Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}

/// Write a default config file when none exists yet
async fn write_default_config(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
    }
    AppConfig::default().save(&path.to_string_lossy()).await?;
    println!("{} {}", "Created default configuration:".green(), path.display());
    Ok(())
}

fn init_logging(level: &str, log_dir: Option<&Path>) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let (file_layer, guard) = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create logs directory: {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "quackbox-nav.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .json()
                .with_writer(writer)
                .boxed();
            (Some(layer), Some(guard))
        },
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false),
        )
        .with(file_layer)
        .init();

    Ok(guard)
}

async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");
    info!("Shutdown signal received");
}
