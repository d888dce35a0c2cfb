//! Base layers painted before any event
//!
//! With no hosts the grid breathes through the theme gradient. With hosts,
//! each occupied cell shows its status color: OK holds still, every other
//! state pulses at its own rate.

use super::canvas::Canvas;
use crate::color::Rgb;
use crate::host::{HostRecord, HostState};
use crate::theme::ThemeProvider;

/// Color of cells that no host occupies
pub(crate) const EMPTY_CELL: Rgb = Rgb::new(2, 2, 2);

/// Slow gradient breathing shown until the first hosts arrive
pub(crate) fn paint_idle(canvas: &mut Canvas, theme: &dyn ThemeProvider, clock: f32) {
    let wave = ((clock * 2.0).sin() + 1.0) / 2.0;
    let breath = wave * wave;
    let color = theme.gradient_color(breath * 0.5).scale(0.1 + 0.9 * breath);
    for cell in 0..canvas.len() {
        canvas.set(cell, color);
    }
}

/// Brightness of a host in `state` at `clock`
pub(crate) fn status_level(state: HostState, clock: f32) -> f32 {
    match state {
        HostState::Ok => 0.85,
        HostState::Warn => 0.3 + (clock * 3.0).sin().abs() * 0.7,
        HostState::Crit => 0.2 + (clock * 5.0).sin().abs() * 0.8,
        HostState::Unknown => 0.3 + (clock * 2.5).sin().abs() * 0.7,
    }
}

pub(crate) fn paint_hosts(
    canvas: &mut Canvas,
    hosts: &[HostRecord],
    theme: &dyn ThemeProvider,
    clock: f32,
) {
    for cell in 0..canvas.len() {
        canvas.set(cell, EMPTY_CELL);
    }
    for host in hosts {
        let color = theme
            .status_color(host.state)
            .scale(status_level(host.state, clock));
        canvas.set(host.cell_index, color);
    }
}
