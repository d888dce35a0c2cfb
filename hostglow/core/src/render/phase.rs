//! Phase Tables
//!
//! Every event animation is a table of `[start, end)` windows in seconds of
//! event age. Exactly one window (or the terminal painter, once the table
//! has run out) paints per frame. The painter receives `t`, the normalized
//! progress through its window.

use rand::{Rng, RngCore};

use super::canvas::Canvas;
use crate::color::Rgb;

pub(crate) type PaintFn = fn(&mut PhaseContext<'_>);

/// One window of an animation
pub(crate) struct Phase {
    pub name: &'static str,
    pub start: f32,
    pub end: f32,
    pub paint: PaintFn,
}

/// Ordered phases plus what to draw after the last one ends
pub(crate) struct Timeline {
    pub phases: &'static [Phase],
    pub terminal: Option<PaintFn>,
}

impl Timeline {
    /// Phase active at `age` and the progress through it
    pub(crate) fn locate(&self, age: f32) -> Option<(&'static Phase, f32)> {
        self.phases
            .iter()
            .find(|p| age >= p.start && age < p.end)
            .map(|p| (p, (age - p.start) / (p.end - p.start)))
    }

    /// Age at which the last phase ends
    pub(crate) fn end(&self) -> f32 {
        self.phases.last().map_or(0.0, |p| p.end)
    }

    /// Paint the frame for `ctx.age`; returns the name of what was painted
    pub(crate) fn play(&self, ctx: &mut PhaseContext<'_>) -> Option<&'static str> {
        if let Some((phase, t)) = self.locate(ctx.age) {
            ctx.t = t;
            (phase.paint)(ctx);
            return Some(phase.name);
        }
        if ctx.age >= self.end() {
            let terminal = self.terminal?;
            ctx.t = 1.0;
            terminal(ctx);
            return Some("terminal");
        }
        None
    }
}

/// Everything a painter may read or touch
pub(crate) struct PhaseContext<'a> {
    pub canvas: &'a mut Canvas,
    /// Cell the event is anchored at
    pub cell: usize,
    pub priority: u8,
    /// Seconds since the event started
    pub age: f32,
    /// Progress through the current phase, `[0, 1)`
    pub t: f32,
    /// Free-running ambient clock (seconds, speed-scaled)
    pub clock: f32,
    /// Kind-specific base color (previous state, final state, ...)
    pub accent: Rgb,
    pub rng: &'a mut dyn RngCore,
}

impl PhaseContext<'_> {
    /// Uniform sample in `[0, 1)`
    pub(crate) fn random(&mut self) -> f32 {
        self.rng.gen::<f32>()
    }

    /// Paint the anchor cell
    pub(crate) fn set_cell(&mut self, color: Rgb) {
        self.canvas.set(self.cell, color);
    }

    /// Radius that grows as priority gets more important (lower)
    pub(crate) fn priority_radius(&self, base: f32, per_step: f32) -> f32 {
        base + f32::from(9 - self.priority.min(9)) * per_step
    }

    /// Ambient pulse `base + sin(clock · rate) · amplitude`
    pub(crate) fn pulse(&self, rate: f32, base: f32, amplitude: f32) -> f32 {
        base + (self.clock * rate).sin() * amplitude
    }
}
