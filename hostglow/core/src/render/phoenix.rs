//! Phoenix: a host recovered to OK
//!
//! A short flash, ashes falling below the cell, a green flame rising above
//! it, then a healing ring before settling into a calm green breathing.

use super::phase::{Phase, PhaseContext, Timeline};
use crate::color::Rgb;
use crate::host::HostState;

const ASH: Rgb = Rgb::new(80, 40, 20);
const FLAME: Rgb = Rgb::new(50, 255, 80);
const FLAME_TONGUE: Rgb = Rgb::new(100, 255, 100);
const HEAL: Rgb = Rgb::new(50, 255, 100);

/// Color of the state the host recovered from
pub(crate) fn accent(prev: HostState) -> Rgb {
    match prev {
        HostState::Crit => Rgb::RED,
        _ => Rgb::new(255, 180, 0),
    }
}

pub(crate) const TIMELINE: Timeline = Timeline {
    phases: &[
        Phase { name: "flash", start: 0.0, end: 0.5, paint: flash },
        Phase { name: "ash", start: 0.5, end: 2.0, paint: ash },
        Phase { name: "flame", start: 2.0, end: 4.0, paint: flame },
        Phase { name: "healing", start: 4.0, end: 5.5, paint: healing },
    ],
    terminal: Some(settled),
};

fn flash(ctx: &mut PhaseContext<'_>) {
    let color = ctx.accent.scale(0.5 + ctx.age);
    ctx.set_cell(color);
}

fn ash(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    let color = ctx.accent.scale((1.0 - 1.5 * t).max(0.0) * 0.3);
    ctx.set_cell(color);

    let (x, y) = ctx.canvas.position(ctx.cell);
    let depth = 2.0 + 2.0 * t;
    for other in 0..ctx.canvas.len() {
        if other == ctx.cell {
            continue;
        }
        let (ox, oy) = ctx.canvas.position(other);
        let dx = (ox - x).abs();
        let dy = oy - y;
        if dx < 1.5 && dy > 0.0 && dy < depth {
            let amount = (1.0 - dx / 1.5) * (1.0 - dy / depth) * t * (1.0 - t) * 0.5;
            ctx.canvas.blend(other, ASH, amount);
        }
    }
}

fn flame(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    let flicker = 0.8 + 0.2 * ctx.random();
    ctx.set_cell(FLAME.scale((0.3 + 0.7 * t) * flicker));

    let (x, y) = ctx.canvas.position(ctx.cell);
    let height = 3.0 * t;
    if height <= 0.0 {
        return;
    }
    for other in 0..ctx.canvas.len() {
        if other == ctx.cell {
            continue;
        }
        let (ox, oy) = ctx.canvas.position(other);
        let dx = (ox - x).abs();
        let dy = y - oy;
        if dx < 1.0 && dy > 0.0 && dy < height {
            let jitter = 0.7 + 0.3 * ctx.random();
            let amount = (1.0 - dx) * (1.0 - dy / height) * (1.0 - 0.5 * t) * jitter * 0.6;
            ctx.canvas.blend(other, FLAME_TONGUE, amount);
        }
    }
}

fn healing(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    let p = ctx.pulse(2.0, 0.8, 0.2);
    ctx.set_cell(Rgb::new(0, 200, 60).scale(p));
    let strength = (1.0 - 0.7 * t).max(0.0) * 0.4;
    ctx.canvas.ring(ctx.cell, 6.0 * t, 2.5, HEAL, strength);
}

/// Calm green, phase-shifted per cell so neighbors don't breathe in sync
fn settled(ctx: &mut PhaseContext<'_>) {
    #[allow(clippy::cast_precision_loss)]
    let offset = ctx.cell as f32 * 0.1;
    let p = 0.8 + (ctx.clock * 0.5 + offset).sin() * 0.2;
    ctx.set_cell(Rgb::new(0, 180, 50).scale(p));
}
