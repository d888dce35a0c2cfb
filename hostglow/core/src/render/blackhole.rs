//! Blackhole: a host left the inventory
//!
//! Anchored at the cell the host occupied when it vanished. The cell fades
//! to violet, pulls its neighborhood dark, collapses inward and finally a
//! cyan wave sweeps right across the row where the remaining hosts reflow.
//! There is no terminal painter; once the wave has passed the steady pattern
//! shows through.

use super::phase::{Phase, PhaseContext, Timeline};
use crate::color::Rgb;

const EVENT_HORIZON: Rgb = Rgb::new(60, 0, 100);
const REFLOW: Rgb = Rgb::new(0, 200, 255);

pub(crate) const TIMELINE: Timeline = Timeline {
    phases: &[
        Phase { name: "fade", start: 0.0, end: 1.0, paint: fade },
        Phase { name: "suction", start: 1.0, end: 2.5, paint: suction },
        Phase { name: "collapse", start: 2.5, end: 3.5, paint: collapse },
        Phase { name: "reflow", start: 3.5, end: 5.0, paint: reflow },
    ],
    terminal: None,
};

fn fade(ctx: &mut PhaseContext<'_>) {
    let remaining = 1.0 - ctx.t;
    let f = remaining + ctx.random() * 0.3 * remaining;
    ctx.set_cell(Rgb::new(100, 0, 150).scale(f));
}

fn suction(ctx: &mut PhaseContext<'_>) {
    ctx.set_cell(Rgb::BLACK);
    let radius = ctx.priority_radius(3.0, 0.3);
    let t = ctx.t;
    let pulled: Vec<(usize, f32)> = ctx
        .canvas
        .others(ctx.cell)
        .filter(|&(_, d)| d < radius)
        .map(|(i, d)| (i, (1.0 - d / radius) * t * 0.5))
        .collect();
    for (cell, amount) in pulled {
        ctx.canvas.darken(cell, amount);
    }
}

fn collapse(ctx: &mut PhaseContext<'_>) {
    ctx.set_cell(Rgb::BLACK);
    let remaining = 1.0 - ctx.t;
    ctx.canvas
        .ring(ctx.cell, remaining * 4.0, 0.8, EVENT_HORIZON, remaining * 0.6);
}

fn reflow(ctx: &mut PhaseContext<'_>) {
    let (x0, y0) = ctx.canvas.position(ctx.cell);
    let wave_x = x0 + ctx.t * 15.0;
    for cell in 0..ctx.canvas.len() {
        let (x, y) = ctx.canvas.position(cell);
        if x <= x0 || (y - y0).abs() >= 1.0 {
            continue;
        }
        let distance = (x - wave_x).abs();
        if distance < 1.5 {
            ctx.canvas.blend(cell, REFLOW, (1.0 - distance / 1.5) * 0.5);
        }
    }
}
