//! Warning: an OK host degraded to WARN
//!
//! Flicker, three decaying amber flashes that spill onto neighbors, two
//! expanding ripples, then a steady amber pulse.

use super::phase::{Phase, PhaseContext, Timeline};
use crate::color::Rgb;

const AMBER: Rgb = Rgb::new(255, 200, 0);
const AMBER_DIM: Rgb = Rgb::new(100, 80, 0);
const SPILL: Rgb = Rgb::new(255, 120, 0);
const RIPPLE: Rgb = Rgb::new(255, 200, 50);

/// Ripple start offsets inside the ripple phase
const RIPPLE_STARTS: [f32; 2] = [0.0, 0.4];

pub(crate) const TIMELINE: Timeline = Timeline {
    phases: &[
        Phase { name: "flicker", start: 0.0, end: 0.3, paint: flicker },
        Phase { name: "flashes", start: 0.3, end: 1.8, paint: flashes },
        Phase { name: "ripples", start: 1.8, end: 3.5, paint: ripples },
    ],
    terminal: Some(settled),
};

fn flicker(ctx: &mut PhaseContext<'_>) {
    let color = if ctx.random() > 0.5 { AMBER } else { AMBER_DIM };
    ctx.set_cell(color);
}

/// Three flashes, each a quarter weaker than the last
fn flashes(ctx: &mut PhaseContext<'_>) {
    let cycles = ctx.t * 3.0;
    let within = cycles.fract();
    let amplitude = 1.0 - cycles.floor() * 0.25;
    let envelope = if within < 0.4 {
        within / 0.4
    } else {
        (1.0 - (within - 0.4) / 0.6).max(0.0)
    };
    let intensity = envelope * amplitude;
    ctx.set_cell(AMBER.scale(intensity));

    if within < 0.3 {
        let radius = ctx.priority_radius(1.5, 0.2);
        ctx.canvas.splash(ctx.cell, radius, SPILL, intensity * 0.4);
    }
}

fn ripples(ctx: &mut PhaseContext<'_>) {
    let p = 0.7 + (ctx.age * 4.0).sin() * 0.3;
    ctx.set_cell(Rgb::new(255, 180, 0).scale(p));

    for start in RIPPLE_STARTS {
        if ctx.t <= start {
            continue;
        }
        let progress = (ctx.t - start) / (1.0 - start);
        let strength = (1.0 - progress).max(0.0) * 0.3;
        ctx.canvas.ring(ctx.cell, 4.0 * progress, 1.0, RIPPLE, strength);
    }
}

fn settled(ctx: &mut PhaseContext<'_>) {
    let p = ctx.pulse(2.0, 0.7, 0.3);
    ctx.set_cell(Rgb::new(255, 180, 0).scale(p));
}
