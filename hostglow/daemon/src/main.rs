//! Hostglow Daemon - Host Health on an LED Grid
//!
//! Polls CheckMK, turns state changes into animations and pushes frames to
//! the configured outputs until it receives a stop signal.
//!
//! # Usage
//!
//! ```bash
//! # Start with ~/.config/hostglow/hostglow.toml (or defaults)
//! hostglow-daemon
//!
//! # Custom config file and a terminal preview
//! hostglow-daemon --config /etc/hostglow.toml --preview
//!
//! # Override a few settings
//! hostglow-daemon --theme nord --fps 60 --brightness 0.4
//!
//! # Verbose logging
//! RUST_LOG=debug hostglow-daemon
//! ```
//!
//! # Manual Triggers
//!
//! Creating `hostglow_trigger_<kind>.txt` in the trigger directory fires an
//! animation once (`supernova`, `phoenix`, `warning`, `blackhole`, `spawn`,
//! `celebration`); `hostglow_trigger_hostlist.txt` logs the host list and
//! `hostglow_theme.txt` switches the theme to the name it contains.
//!
//! # Signals
//!
//! - `SIGTERM` / `SIGINT`: Graceful shutdown
//! - `SIGHUP`: Re-read the config file and apply its theme

mod sink;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal::unix::{signal, SignalKind};
use tracing::{error, info, warn};

use hostglow_core::{
    default_config_path, load_config_from_path, CheckmkSource, ConfigOverrides, FileTriggers,
    FrameRenderer, GridLayout, HostExporter, HostglowConfig, MonitorState, RenderLoop,
    SharedTheme, ShutdownSignal, StatusPoller, Theme,
};

use sink::{AnsiSink, LogSink};

/// Hostglow Daemon - host health transitions rendered as light
#[derive(Parser, Debug)]
#[command(name = "hostglow-daemon")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "HOSTGLOW_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Theme name (default, cyberpunk, nord, fire, ocean, matrix, synthwave)
    #[arg(short = 't', long)]
    theme: Option<String>,

    /// Frames per second
    #[arg(long)]
    fps: Option<u32>,

    /// Global brightness, 0.0 to 1.0
    #[arg(short = 'b', long)]
    brightness: Option<f32>,

    /// Seconds between status fetches
    #[arg(short = 'i', long, value_name = "SECS")]
    interval: Option<u64>,

    /// Directory watched for trigger files
    #[arg(long, value_name = "DIR")]
    trigger_dir: Option<PathBuf>,

    /// Write the host list as JSON to this file after every poll
    #[arg(long, value_name = "FILE")]
    export_path: Option<PathBuf>,

    /// Draw the grid in this terminal
    #[arg(short = 'p', long)]
    preview: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "HOSTGLOW_LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> ConfigOverrides {
        let mut overrides = ConfigOverrides::new();
        if let Some(ref theme) = self.theme {
            overrides = overrides.with_theme(theme.as_str());
        }
        if let Some(fps) = self.fps {
            overrides = overrides.with_fps(fps);
        }
        if let Some(b) = self.brightness {
            overrides = overrides.with_brightness(b);
        }
        if let Some(secs) = self.interval {
            overrides = overrides.with_interval_secs(secs);
        }
        if let Some(ref dir) = self.trigger_dir {
            overrides = overrides.with_trigger_dir(dir.clone());
        }
        if let Some(ref path) = self.export_path {
            overrides = overrides.with_export_path(path.clone());
        }
        overrides
    }

    fn config_path(&self) -> Option<PathBuf> {
        self.config.clone().or_else(default_config_path)
    }
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("hostglow_daemon={level},hostglow_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

/// Load, override and validate the configuration
fn resolve_config(args: &Args) -> Result<HostglowConfig> {
    let mut config = load_config_from_path(args.config_path()).context("Failed to load configuration")?;
    args.overrides().apply(&mut config);
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// Wait for SIGTERM/SIGINT, applying the config file's theme on SIGHUP
async fn handle_signals(shutdown: ShutdownSignal, theme: SharedTheme, config_path: Option<PathBuf>) -> Result<()> {
    let mut sigterm = signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("Failed to install SIGINT handler")?;
    let mut sighup = signal(SignalKind::hangup()).context("Failed to install SIGHUP handler")?;

    loop {
        tokio::select! {
            _ = sigterm.recv() => {
                info!("Received SIGTERM, initiating shutdown");
                break;
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, initiating shutdown");
                break;
            }
            _ = sighup.recv() => {
                info!("Received SIGHUP, reloading theme from config");
                match load_config_from_path(config_path.clone()) {
                    Ok(reloaded) => {
                        theme.set_builtin(&reloaded.render.theme);
                    }
                    Err(e) => warn!(error = %e, "Config reload failed, keeping current settings"),
                }
            }
        }
    }

    shutdown.request();
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level);

    info!("Hostglow daemon starting");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let config = resolve_config(&args)?;
    info!(
        source = ?config.source(),
        url = %config.checkmk.url,
        interval_secs = config.poller.fetch_interval.as_secs(),
        fps = config.render.fps,
        cells = config.render.cells,
        theme = %config.render.theme,
        trigger_dir = %config.trigger_dir.display(),
        "Configuration resolved"
    );

    let state = Arc::new(MonitorState::new());
    let theme = SharedTheme::new(Theme::builtin(&config.render.theme).unwrap_or_default());

    let mut poller = StatusPoller::new(
        Arc::new(CheckmkSource::new(&config.checkmk)?),
        Arc::new(FileTriggers::new(config.trigger_dir.clone())),
        Arc::clone(&state),
        config.poller.clone(),
    )?
    .with_theme(theme.clone());
    if let Some(ref path) = config.export_path {
        info!(path = %path.display(), "Exporting host list");
        poller = poller.with_exporter(HostExporter::new(path.clone()));
    }
    let poller = Arc::new(poller);

    let renderer = FrameRenderer::new(
        Arc::clone(&state),
        Arc::new(GridLayout::new(config.render.columns, config.render.cells)),
        Arc::new(theme.clone()),
        &config.render,
    )?;
    let mut frames = RenderLoop::new(renderer, config.render.frame_interval())
        .with_sink(Box::new(LogSink::new(u64::from(config.render.fps) * 10)));
    if args.preview {
        frames = frames.with_sink(Box::new(AnsiSink::stdout(config.render.columns)));
    }

    let shutdown = ShutdownSignal::new();

    let signals = tokio::spawn(handle_signals(shutdown.clone(), theme, args.config_path()));
    let poll_task = {
        let poller = Arc::clone(&poller);
        let shutdown = shutdown.clone();
        tokio::spawn(async move { poller.run(shutdown).await })
    };
    let render_task = {
        let shutdown = shutdown.clone();
        tokio::spawn(async move { frames.run(shutdown).await })
    };

    let (poll_result, render_result) = tokio::join!(poll_task, render_task);
    signals.abort();

    if let Err(e) = poll_result {
        error!(error = %e, "Poller task failed");
    }
    if let Err(e) = render_result {
        error!(error = %e, "Render task failed");
    }

    info!(
        cycles = poller.cycles(),
        failures = poller.failures(),
        "Hostglow daemon stopped cleanly"
    );
    Ok(())
}
