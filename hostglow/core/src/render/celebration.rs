//! Celebration: everything is OK again
//!
//! A whole-grid rainbow sweeping along the x axis, eased in over half a
//! second, then faded back into the steady pattern underneath. The latch
//! itself stays set until the next problem clears it; after the fade the
//! grid simply shows the steady layer.

use super::phase::{Phase, PhaseContext, Timeline};
use crate::color::Rgb;

pub(crate) const TIMELINE: Timeline = Timeline {
    phases: &[
        Phase { name: "rainbow", start: 0.0, end: 5.0, paint: rainbow },
        Phase { name: "fade", start: 5.0, end: 6.5, paint: fade },
    ],
    terminal: None,
};

fn rainbow_at(ctx: &PhaseContext<'_>, cell: usize) -> Rgb {
    let (x, _) = ctx.canvas.position(cell);
    Rgb::from_hsv(x / ctx.canvas.width() + ctx.clock * 0.3, 1.0, 1.0)
}

fn wash(ctx: &mut PhaseContext<'_>, amount: f32) {
    for cell in 0..ctx.canvas.len() {
        let color = rainbow_at(ctx, cell);
        ctx.canvas.blend(cell, color, amount);
    }
}

fn rainbow(ctx: &mut PhaseContext<'_>) {
    let envelope = (ctx.age / 0.5).min(1.0);
    wash(ctx, envelope);
}

fn fade(ctx: &mut PhaseContext<'_>) {
    let amount = 1.0 - ctx.t;
    wash(ctx, amount);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridLayout;
    use crate::render::canvas::Canvas;
    use rand::rngs::mock::StepRng;

    fn play(canvas: &mut Canvas, age: f32) -> Option<&'static str> {
        let mut rng = StepRng::new(0, 0);
        let mut ctx = PhaseContext {
            canvas,
            cell: 0,
            priority: 0,
            age,
            t: 0.0,
            clock: 0.0,
            accent: Rgb::BLACK,
            rng: &mut rng,
        };
        TIMELINE.play(&mut ctx)
    }

    #[test]
    fn test_rainbow_spans_hues() {
        let mut canvas = Canvas::new(&GridLayout::new(6, 6));
        assert_eq!(play(&mut canvas, 2.0), Some("rainbow"));
        assert_eq!(canvas.get(0), Rgb::RED);
        assert_ne!(canvas.get(2), canvas.get(4));
    }

    #[test]
    fn test_eases_in() {
        let mut canvas = Canvas::new(&GridLayout::new(6, 6));
        play(&mut canvas, 0.25);
        let c = canvas.get(0);
        assert!(c.r > 100 && c.r < 155);
    }

    #[test]
    fn test_fades_back_to_base() {
        let mut canvas = Canvas::new(&GridLayout::new(6, 6));
        assert_eq!(play(&mut canvas, 6.4), Some("fade"));
        assert!(canvas.get(0).r < 30);
        assert_eq!(play(&mut canvas, 7.0), None);
    }
}
