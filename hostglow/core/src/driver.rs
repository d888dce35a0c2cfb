//! Render Loop
//!
//! Drives a [`FrameRenderer`] at a fixed frame rate and hands each frame to
//! the configured sinks. It only ever reads snapshots, so a slow or hanging
//! status fetch in the poller cannot hold a frame back.
//!
//! ```text
//!   interval tick ──► snapshot ──► render ──► sink₁ … sinkₙ
//!        ▲                                        │
//!        └───────────── until shutdown ◄──────────┘
//! ```

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::render::{FrameRenderer, RenderedFrame};
use crate::shutdown::ShutdownSignal;
use crate::sink::FrameSink;

/// Fixed-rate render loop
pub struct RenderLoop {
    renderer: FrameRenderer,
    sinks: Vec<Box<dyn FrameSink>>,
    frame_interval: Duration,
    rng: StdRng,
    frames: u64,
    sink_errors: u64,
}

impl RenderLoop {
    /// Loop rendering every `frame_interval`
    #[must_use]
    pub fn new(renderer: FrameRenderer, frame_interval: Duration) -> Self {
        Self {
            renderer,
            sinks: Vec::new(),
            frame_interval: frame_interval.max(Duration::from_millis(1)),
            rng: StdRng::from_entropy(),
            frames: 0,
            sink_errors: 0,
        }
    }

    /// Add an output sink
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn FrameSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    /// Use a fixed seed for the animation noise
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// Frames rendered so far
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Sink commits that failed so far
    #[must_use]
    pub fn sink_errors(&self) -> u64 {
        self.sink_errors
    }

    /// Render one frame for `now` and commit it to every sink
    pub fn render_once(&mut self, now: Instant) -> RenderedFrame {
        let frame = self.renderer.current_frame(now, &mut self.rng);
        for sink in &mut self.sinks {
            if let Err(e) = sink.commit(&frame) {
                self.sink_errors += 1;
                tracing::warn!(sink = sink.name(), error = %e, "Frame commit failed");
            }
        }
        self.frames += 1;
        frame
    }

    /// Render until `shutdown` is requested, then close every sink
    pub async fn run(&mut self, shutdown: ShutdownSignal) {
        tracing::info!(
            fps = 1.0 / self.frame_interval.as_secs_f64(),
            cells = self.renderer.cell_count(),
            sinks = self.sinks.len(),
            "Starting render loop"
        );

        let mut interval = tokio::time::interval(self.frame_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = interval.tick() => {}
                () = shutdown.wait() => break,
            }
            if shutdown.is_requested() {
                break;
            }
            self.render_once(Instant::now());
        }

        for sink in &mut self.sinks {
            sink.close();
        }
        tracing::info!(
            frames = self.frames,
            sink_errors = self.sink_errors,
            "Render loop stopped"
        );
    }
}

impl std::fmt::Debug for RenderLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderLoop")
            .field("renderer", &self.renderer)
            .field("sinks", &self.sinks.iter().map(|s| s.name()).collect::<Vec<_>>())
            .field("frame_interval", &self.frame_interval)
            .field("frames", &self.frames)
            .finish_non_exhaustive()
    }
}
