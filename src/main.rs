mod config;
mod core;
mod input;
mod playback;
mod session;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crate::config::Settings;
use crate::core::{Day, PointType, RouteSelection};
use crate::input::{JsonFileSource, MemoryRouteSource, RouteSource, RouteStore};
use crate::session::{Command, Session};
use crate::ui::{MapView, TerminalView, TraceRecorder};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Replay a recorded vehicle route, one point per tick
#[derive(Debug, Parser)]
#[command(name = "route-replay", version)]
struct Cli {
    /// Settings file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Route data JSON file
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Day to replay: today, yesterday or 3daysAgo
    #[arg(long)]
    day: Option<Day>,

    /// Point type to replay: wireless or manual
    #[arg(long = "type")]
    point_type: Option<PointType>,

    /// Milliseconds between playback ticks
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Milliseconds for the marker to glide between points
    #[arg(long)]
    animation_ms: Option<u64>,

    /// Start playing as soon as the route is loaded
    #[arg(long)]
    autoplay: bool,

    /// Write a CSV trace of every displayed point
    #[arg(long)]
    export: Option<PathBuf>,

    /// Use the built-in demo route instead of a data file
    #[arg(long)]
    demo: bool,

    /// Persist the effective settings to the config directory
    #[arg(long)]
    save_settings: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(data) = &self.data {
            settings.data_path = data.clone();
        }
        if let Some(day) = self.day {
            settings.selection.day = day;
        }
        if let Some(point_type) = self.point_type {
            settings.selection.point_type = point_type;
        }
        if let Some(ms) = self.tick_ms {
            settings.tick_interval_ms = ms;
        }
        if let Some(ms) = self.animation_ms {
            settings.animation_ms = ms;
        }
        if let Some(path) = &self.export {
            settings.export_path = Some(path.clone());
        }
        settings.autoplay |= self.autoplay;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("route_replay=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path).with_context(|| format!("Failed to load settings from {:?}", path))?,
        None => Settings::load(),
    };
    cli.apply(&mut settings);

    if cli.save_settings {
        let path = settings.save().context("Failed to save settings")?;
        info!("Settings saved to {:?}", path);
    }

    let source: Arc<dyn RouteSource> = if cli.demo {
        Arc::new(MemoryRouteSource::demo())
    } else {
        Arc::new(JsonFileSource::new(&settings.data_path))
    };
    let store = Arc::new(RouteStore::new(source));
    info!("Reading routes from {}", store.source_name());

    let mut views: Vec<Box<dyn MapView>> = vec![Box::new(TerminalView::new(std::io::stdout()))];
    if let Some(path) = &settings.export_path {
        views.push(Box::new(TraceRecorder::create(path)?));
    }

    let session = Session::new(store, settings.playback_config(), Box::new(views))
        .with_viewport(settings.viewport())
        .with_selection(settings.selection)
        .with_autoplay(settings.autoplay);

    print_help(settings.selection);

    let (tx, rx) = mpsc::channel(32);
    tokio::spawn(read_commands(tx));

    crate::session::run(session, rx).await
}

/// Forward commands typed on stdin. Closing stdin closes the channel.
async fn read_commands(tx: mpsc::Sender<Command>) {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                warn!("Failed to read command: {}", e);
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        match line.parse::<Command>() {
            Ok(cmd) => {
                if tx.send(cmd).await.is_err() || cmd == Command::Quit {
                    break;
                }
            }
            Err(e) => warn!("{}", e),
        }
    }
}

fn print_help(selection: RouteSelection) {
    let days: Vec<&str> = Day::ALL.iter().map(|d| d.as_str()).collect();
    let types: Vec<&str> = PointType::ALL.iter().map(|t| t.as_str()).collect();
    println!("Replaying {}", selection);
    println!(
        "Commands: play | pause | toggle | reset | status | quit | select <{}> <{}>",
        days.join("|"),
        types.join("|")
    );
}
