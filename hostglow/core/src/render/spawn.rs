//! Spawn: a host joined the inventory
//!
//! Sparks at the captured cell, materialization into the host's status
//! color with a bright ring, and a settling glow. Like the blackhole it has
//! no terminal painter.

use super::phase::{Phase, PhaseContext, Timeline};
use crate::color::Rgb;
use crate::host::HostState;

const SPARK: Rgb = Rgb::new(255, 255, 200);
const BIRTH_RING: Rgb = Rgb::new(200, 255, 200);

/// Color the new host materializes into
pub(crate) fn accent(state: HostState) -> Rgb {
    match state {
        HostState::Ok => Rgb::new(0, 255, 0),
        HostState::Warn => Rgb::new(255, 180, 0),
        HostState::Crit | HostState::Unknown => Rgb::RED,
    }
}

pub(crate) const TIMELINE: Timeline = Timeline {
    phases: &[
        Phase { name: "sparks", start: 0.0, end: 0.5, paint: sparks },
        Phase { name: "materialize", start: 0.5, end: 2.0, paint: materialize },
        Phase { name: "settle", start: 2.0, end: 3.5, paint: settle },
    ],
    terminal: None,
};

fn sparks(ctx: &mut PhaseContext<'_>) {
    let threshold = 0.8 * ctx.t;
    let level = if ctx.random() > threshold { 1.0 } else { 0.3 };
    ctx.set_cell(Rgb::WHITE.scale(level));

    let near: Vec<(usize, f32)> = ctx.canvas.others(ctx.cell).filter(|&(_, d)| d < 3.0).collect();
    for (cell, d) in near {
        let roll = ctx.random();
        if roll > 0.7 {
            ctx.canvas.blend(cell, SPARK, (1.0 - d / 3.0) * roll * 0.7);
        }
    }
}

fn materialize(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    let grain = 0.8 + 0.2 * ctx.random();
    let color = Rgb::WHITE.lerp(ctx.accent, t * grain);
    ctx.set_cell(color);
    ctx.canvas.ring(ctx.cell, 5.0 * t, 1.2, BIRTH_RING, (1.0 - t) * 0.4);
}

fn settle(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    let p = 0.8 + (ctx.age * 8.0).sin() * 0.2 * (1.0 - t);
    let color = ctx.accent.scale(p);
    ctx.set_cell(color);
    ctx.canvas.splash(ctx.cell, 2.0 * (1.0 - t), ctx.accent, (1.0 - t) * 0.2);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridLayout;
    use crate::render::canvas::Canvas;
    use rand::rngs::mock::StepRng;

    fn play(canvas: &mut Canvas, age: f32, rng: &mut StepRng) -> Option<&'static str> {
        let mut ctx = PhaseContext {
            canvas,
            cell: 2,
            priority: 7,
            age,
            t: 0.0,
            clock: 0.0,
            accent: accent(HostState::Ok),
            rng,
        };
        TIMELINE.play(&mut ctx)
    }

    #[test]
    fn test_sparks_spill_when_roll_is_high() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        play(&mut canvas, 0.1, &mut StepRng::new(u64::MAX, 0));
        assert_eq!(canvas.get(2), Rgb::WHITE);
        assert!(canvas.get(1).r > 0);

        let mut quiet = Canvas::new(&GridLayout::new(5, 5));
        play(&mut quiet, 0.1, &mut StepRng::new(0, 0));
        assert_eq!(quiet.get(1), Rgb::BLACK);
    }

    #[test]
    fn test_materialize_moves_toward_accent() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        assert_eq!(play(&mut canvas, 1.9, &mut StepRng::new(u64::MAX, 0)), Some("materialize"));
        let c = canvas.get(2);
        assert!(c.r < 30 && c.b < 30);
        assert_eq!(c.g, 255);
    }

    #[test]
    fn test_done_after_settle() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        assert_eq!(play(&mut canvas, 3.5, &mut StepRng::new(0, 0)), None);
        assert_eq!(canvas.get(2), Rgb::BLACK);
    }

    #[test]
    fn test_accent_matches_state() {
        assert_eq!(accent(HostState::Crit), Rgb::RED);
        assert_eq!(accent(HostState::Warn), Rgb::new(255, 180, 0));
    }
}
