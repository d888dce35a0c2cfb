//! Frame Renderer
//!
//! Computes one color per output cell from a [`FrameSnapshot`] and a render
//! instant. Rendering is a pure function of the snapshot, the clock and the
//! injected random source; it never blocks on the poller beyond copying the
//! snapshot and never fails.
//!
//! # Layers
//!
//! ```text
//! 1. base        idle gradient breathing (no hosts) or steady status colors
//! 2. celebration whole-grid rainbow while the latch is fresh
//! 3. events      in snapshot order (kind, then host); later writes win
//! 4. brightness  global scale, applied last
//! ```
//!
//! Each event kind is an explicit phase table (see the submodules). Ages
//! past a table's end fall through to the kind's terminal painter, or to the
//! base layer when the kind has none, so correctness never depends on when
//! the poller sweeps expired events.

mod blackhole;
mod canvas;
mod celebration;
mod phase;
mod phoenix;
mod spawn;
mod steady;
mod supernova;
mod warning;

use std::sync::Arc;
use std::time::{Duration, Instant};

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::config::ConfigError;
use crate::events::{AnimationEvent, EventDetail};
use crate::host::HostState;
use crate::layout::LayoutProvider;
use crate::state::{FrameSnapshot, MonitorState};
use crate::theme::{Theme, ThemeProvider};

use canvas::Canvas;
use phase::{PhaseContext, Timeline};

// =============================================================================
// Configuration
// =============================================================================

/// Frame rendering settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Frames per second of the render loop
    pub fps: u32,
    /// Global brightness in `[0, 1]`
    pub brightness: f32,
    /// Multiplier for the ambient clock (pulses, idle breathing, rainbow)
    pub speed: f32,
    /// Number of output cells
    pub cells: usize,
    /// Cells per row of the grid layout
    pub columns: usize,
    /// Name of the built-in theme to start with
    pub theme: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fps: 30,
            brightness: 1.0,
            speed: 1.0,
            cells: 120,
            columns: 24,
            theme: "default".to_string(),
        }
    }
}

impl RenderConfig {
    /// Time between two frames
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs(1) / self.fps.max(1)
    }

    /// Reject values the render loop cannot work with
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] describing the first bad field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=120).contains(&self.fps) {
            return Err(ConfigError::ValidationError(format!(
                "render.fps must be between 1 and 120 (got {})",
                self.fps
            )));
        }
        if !(0.0..=1.0).contains(&self.brightness) {
            return Err(ConfigError::ValidationError(format!(
                "render.brightness must be between 0.0 and 1.0 (got {})",
                self.brightness
            )));
        }
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "render.speed must be a positive number (got {})",
                self.speed
            )));
        }
        if self.cells == 0 || self.columns == 0 {
            return Err(ConfigError::ValidationError(
                "render.cells and render.columns must be greater than zero".to_string(),
            ));
        }
        if !Theme::is_builtin(&self.theme) {
            return Err(ConfigError::ValidationError(format!(
                "unknown theme '{}'",
                self.theme
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Output
// =============================================================================

/// Colors for every cell plus the host-to-cell mapping they were drawn with
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderedFrame {
    /// One color per cell
    pub colors: Vec<Rgb>,
    /// Host shown at each cell, if any
    pub cell_hosts: Vec<Option<String>>,
}

impl RenderedFrame {
    /// Host drawn at `cell`
    #[must_use]
    pub fn host_at(&self, cell: usize) -> Option<&str> {
        self.cell_hosts.get(cell).and_then(Option::as_deref)
    }

    /// Cell `name` was drawn at
    #[must_use]
    pub fn cell_of(&self, name: &str) -> Option<usize> {
        self.cell_hosts
            .iter()
            .position(|h| h.as_deref() == Some(name))
    }

    /// Number of cells
    #[must_use]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    /// Whether the frame has no cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }
}

// =============================================================================
// Renderer
// =============================================================================

/// Turns monitor snapshots into frames
pub struct FrameRenderer {
    state: Arc<MonitorState>,
    layout: Arc<dyn LayoutProvider>,
    theme: Arc<dyn ThemeProvider>,
    brightness: f32,
    speed: f32,
    epoch: Instant,
}

impl std::fmt::Debug for FrameRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameRenderer")
            .field("cells", &self.layout.cell_count())
            .field("brightness", &self.brightness)
            .field("speed", &self.speed)
            .finish_non_exhaustive()
    }
}

impl FrameRenderer {
    /// Renderer reading from `state`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if `config` is invalid.
    pub fn new(
        state: Arc<MonitorState>,
        layout: Arc<dyn LayoutProvider>,
        theme: Arc<dyn ThemeProvider>,
        config: &RenderConfig,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            state,
            layout,
            theme,
            brightness: config.brightness,
            speed: config.speed,
            epoch: Instant::now(),
        })
    }

    /// Start the ambient clock at `epoch` instead of construction time
    #[must_use]
    pub fn with_epoch(mut self, epoch: Instant) -> Self {
        self.epoch = epoch;
        self
    }

    /// Number of cells every frame has
    #[must_use]
    pub fn cell_count(&self) -> usize {
        self.layout.cell_count()
    }

    /// Snapshot the shared state and render it
    pub fn current_frame(&self, now: Instant, rng: &mut dyn RngCore) -> RenderedFrame {
        let snapshot = self.state.snapshot();
        self.render(now, &snapshot, rng)
    }

    /// Render `snapshot` as seen at `now`
    pub fn render(&self, now: Instant, snapshot: &FrameSnapshot, rng: &mut dyn RngCore) -> RenderedFrame {
        let mut canvas = Canvas::new(self.layout.as_ref());
        let clock = now.saturating_duration_since(self.epoch).as_secs_f32() * self.speed;

        if snapshot.hosts.is_empty() {
            steady::paint_idle(&mut canvas, self.theme.as_ref(), clock);
        } else {
            steady::paint_hosts(&mut canvas, &snapshot.hosts, self.theme.as_ref(), clock);
        }

        if let Some(started) = snapshot.celebration {
            let mut ctx = PhaseContext {
                canvas: &mut canvas,
                cell: 0,
                priority: 0,
                age: now.saturating_duration_since(started).as_secs_f32(),
                t: 0.0,
                clock,
                accent: Rgb::BLACK,
                rng: &mut *rng,
            };
            celebration::TIMELINE.play(&mut ctx);
        }

        for event in &snapshot.events {
            let Some(plan) = EventPlan::resolve(event, snapshot, canvas.len()) else {
                continue;
            };
            let age = event.age(now).as_secs_f32();
            if age >= plan.timeline.end() && !plan.settles(snapshot.state_of(&event.host)) {
                continue;
            }
            let mut ctx = PhaseContext {
                canvas: &mut canvas,
                cell: plan.cell,
                priority: event.priority,
                age,
                t: 0.0,
                clock,
                accent: plan.accent,
                rng: &mut *rng,
            };
            plan.timeline.play(&mut ctx);
        }

        canvas.apply_brightness(self.brightness);

        let mut cell_hosts = vec![None; canvas.len()];
        for host in &snapshot.hosts {
            if let Some(slot) = cell_hosts.get_mut(host.cell_index) {
                *slot = Some(host.name.clone());
            }
        }

        RenderedFrame {
            colors: canvas.into_colors(),
            cell_hosts,
        }
    }
}

/// Where and how one event draws this frame
struct EventPlan {
    timeline: &'static Timeline,
    cell: usize,
    accent: Rgb,
    /// State the host must still be in for the terminal painter to apply
    settles_on: Option<HostState>,
}

impl EventPlan {
    fn resolve(event: &AnimationEvent, snapshot: &FrameSnapshot, cells: usize) -> Option<Self> {
        let live_cell = || snapshot.cell_of(&event.host).filter(|&c| c < cells);
        let plan = match event.detail {
            EventDetail::Supernova { prev } => Self {
                timeline: &supernova::TIMELINE,
                cell: live_cell()?,
                accent: supernova::accent(prev),
                settles_on: Some(HostState::Crit),
            },
            EventDetail::Phoenix { prev } => Self {
                timeline: &phoenix::TIMELINE,
                cell: live_cell()?,
                accent: phoenix::accent(prev),
                settles_on: Some(HostState::Ok),
            },
            EventDetail::Warning => Self {
                timeline: &warning::TIMELINE,
                cell: live_cell()?,
                accent: Rgb::new(255, 200, 0),
                settles_on: Some(HostState::Warn),
            },
            EventDetail::Blackhole { position } => Self {
                timeline: &blackhole::TIMELINE,
                cell: Some(position).filter(|&c| c < cells)?,
                accent: Rgb::BLACK,
                settles_on: None,
            },
            EventDetail::Spawn { position } => Self {
                timeline: &spawn::TIMELINE,
                cell: Some(position).filter(|&c| c < cells)?,
                accent: spawn::accent(snapshot.state_of(&event.host).unwrap_or_default()),
                settles_on: None,
            },
        };
        Some(plan)
    }

    /// Whether a finished timeline should keep painting its terminal look
    fn settles(&self, live: Option<HostState>) -> bool {
        self.settles_on.is_some() && self.settles_on == live
    }
}
