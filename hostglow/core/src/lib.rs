//! Hostglow Core - Host Health Transitions as Light
//!
//! Polls a monitoring system for per-host health, classifies every change
//! between two polls into an animation event, and renders those events as
//! time-phased, spatially spreading effects on a grid of colored cells. This
//! crate has no opinion on where frames end up: an LED controller, a
//! terminal preview or a test harness all plug in as a [`FrameSink`].
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────── StatusPoller ───────────────────────────┐
//! │  fetch tick (30 s)                  trigger tick (500 ms)          │
//! │  StatusSource ─► retry/backoff      TriggerSource ─► inject/theme  │
//! │        │                                   │                       │
//! │        ▼                                   ▼                       │
//! │  ┌──────────────────────── MonitorState ─────────────────────────┐ │
//! │  │ StateDiffer (prev states, known hosts)  EventBook (TTL, latch)│ │
//! │  │ host records (priority order = cell)                          │ │
//! │  └───────────────────────────────┬───────────────────────────────┘ │
//! └──────────────────────────────────┼─────────────────────────────────┘
//!                                    │ snapshot (read only)
//! ┌──────────────────────────────────┼─────────────────────────────────┐
//! │  RenderLoop (tens of Hz)         ▼                                 │
//! │  FrameRenderer: base ─► celebration ─► events ─► brightness        │
//! │        │            (LayoutProvider, ThemeProvider)                │
//! │        ▼                                                           │
//! │  FrameSink … FrameSink                                             │
//! └────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`StatusPoller`]: the two background ticks and the retry policy
//! - [`MonitorState`]: host records and live events behind two locks
//! - [`StateDiffer`]: turns two consecutive polls into animation events
//! - [`FrameRenderer`]: pure snapshot-to-colors function
//! - [`RenderLoop`]: fixed-rate driver feeding frames to sinks
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use hostglow_core::{
//!     CheckmkSource, FileTriggers, FrameRenderer, GridLayout, HostglowConfig,
//!     MemorySink, MonitorState, RenderLoop, SharedTheme, ShutdownSignal,
//!     StatusPoller, Theme,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = HostglowConfig::default();
//!     let state = Arc::new(MonitorState::new());
//!     let theme = SharedTheme::new(Theme::default());
//!
//!     let poller = StatusPoller::new(
//!         Arc::new(CheckmkSource::new(&config.checkmk)?),
//!         Arc::new(FileTriggers::new(&config.trigger_dir)),
//!         Arc::clone(&state),
//!         config.poller.clone(),
//!     )?
//!     .with_theme(theme.clone());
//!
//!     let renderer = FrameRenderer::new(
//!         Arc::clone(&state),
//!         Arc::new(GridLayout::new(config.render.columns, config.render.cells)),
//!         Arc::new(theme),
//!         &config.render,
//!     )?;
//!     let mut frames = RenderLoop::new(renderer, config.render.frame_interval())
//!         .with_sink(Box::new(MemorySink::new()));
//!
//!     let shutdown = ShutdownSignal::new();
//!     tokio::join!(poller.run(shutdown.clone()), frames.run(shutdown));
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`host`]: host states, observations and records
//! - [`priority`]: name-based priority classes and category colors
//! - [`events`]: animation kinds, payloads and TTLs
//! - [`store`]: the event book with its sweep and celebration latch
//! - [`differ`]: transition classification between polls
//! - [`state`]: the shared aggregate and its snapshots
//! - [`source`]: status sources (CheckMK REST API)
//! - [`triggers`]: manual triggers (files, in-memory)
//! - [`poller`]: polling, retry and trigger loops
//! - [`render`]: per-kind phase tables and the frame renderer
//! - [`driver`]: the render loop
//! - [`sink`]: frame output seam
//! - [`theme`], [`layout`], [`color`]: the renderer's collaborators
//! - [`export`]: host list JSON export
//! - [`config`]: TOML, environment and CLI configuration

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod color;
pub mod config;
pub mod differ;
pub mod driver;
pub mod error;
pub mod events;
pub mod export;
pub mod host;
pub mod layout;
pub mod poller;
pub mod priority;
pub mod render;
pub mod shutdown;
pub mod sink;
pub mod source;
pub mod state;
pub mod store;
pub mod theme;
pub mod triggers;

// Re-exports for convenience
pub use color::Rgb;
pub use differ::{CelebrationChange, DiffOutcome, StateDiffer};
pub use driver::RenderLoop;
pub use error::{PollError, TransportError};
pub use events::{AnimationEvent, AnimationKind, EventDetail};
pub use export::HostExporter;
pub use host::{HostExport, HostObservation, HostRecord, HostState};
pub use layout::{GridLayout, LayoutProvider, TableLayout};
pub use poller::{PollReport, PollerConfig, RetryPolicy, StatusPoller};
pub use priority::{category_color, priority_of, sort_by_priority};
pub use render::{FrameRenderer, RenderConfig, RenderedFrame};
pub use shutdown::ShutdownSignal;
pub use sink::{FrameSink, MemorySink};
pub use source::{CheckmkConfig, CheckmkSource, StatusSource};
pub use state::{FrameSnapshot, MonitorState, PollSummary};
pub use store::EventBook;
pub use theme::{SharedTheme, StatusPalette, Theme, ThemeProvider, BUILTIN_THEMES};
pub use triggers::{FileTriggers, MemoryTriggers, TriggerSource};

// Config exports
pub use config::{
    default_config_path, load_config, load_config_from_path, ConfigError, ConfigOverrides,
    ConfigSource, HostglowConfig, HostglowToml,
};
