//! Supernova: a host went critical
//!
//! ```text
//!  0 ─── 4 ──── 5.5 ───── 9 ── 9.5 ── 10 ──── 12.5 ───▶ age (s)
//!  charge  cool    flare   hold  implode shockwave  → red pulse
//! ```

use super::phase::{Phase, PhaseContext, Timeline};
use crate::color::Rgb;
use crate::host::HostState;

const BLUE: Rgb = Rgb::new(50, 50, 255);
const PURPLE: Rgb = Rgb::new(180, 50, 255);
const PALE: Rgb = Rgb::new(150, 200, 255);
const SHOCK: Rgb = Rgb::new(200, 100, 255);

/// Color the host starts charging from
pub(crate) fn accent(prev: HostState) -> Rgb {
    match prev {
        HostState::Ok => Rgb::new(0, 180, 50),
        HostState::Warn => Rgb::new(255, 180, 0),
        HostState::Crit | HostState::Unknown => Rgb::new(150, 50, 200),
    }
}

pub(crate) const TIMELINE: Timeline = Timeline {
    phases: &[
        Phase { name: "charge", start: 0.0, end: 4.0, paint: charge },
        Phase { name: "cool", start: 4.0, end: 5.5, paint: cool },
        Phase { name: "flare", start: 5.5, end: 9.0, paint: flare },
        Phase { name: "hold", start: 9.0, end: 9.5, paint: hold },
        Phase { name: "implosion", start: 9.5, end: 10.0, paint: implosion },
        Phase { name: "shockwave", start: 10.0, end: 12.5, paint: shockwave },
    ],
    terminal: Some(settled),
};

/// Pulse in the previous color, accelerating quadratically
fn charge(ctx: &mut PhaseContext<'_>) {
    let ramp = ctx.age / 4.0;
    let speed = 2.0 + ramp * ramp * 25.0;
    let pulse = 0.3 + (ctx.age * speed * std::f32::consts::PI).sin().abs() * 0.7;
    let color = ctx.accent.scale(pulse);
    ctx.set_cell(color);
}

fn cool(ctx: &mut PhaseContext<'_>) {
    let color = ctx.accent.lerp(BLUE, ctx.t);
    ctx.set_cell(color);
}

/// Blue through purple and pale blue to white, flickering harder as it goes
fn flare(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    let base = if t < 0.33 {
        BLUE.lerp(PURPLE, t * 3.0)
    } else if t < 0.66 {
        PURPLE.lerp(PALE, (t - 0.33) * 3.0)
    } else {
        PALE.lerp(Rgb::WHITE, (t - 0.66) * 3.0)
    };
    let jitter = ctx.random();
    let wobble = 0.5 + 0.5 * (ctx.age * (5.0 + 40.0 * t)).sin();
    let flicker = 1.0 - jitter * (0.1 + 0.5 * t) * wobble;
    ctx.set_cell(base.scale(flicker));
}

fn hold(ctx: &mut PhaseContext<'_>) {
    ctx.set_cell(Rgb::WHITE);
}

/// Collapse to red while the neighborhood flashes white
fn implosion(ctx: &mut PhaseContext<'_>) {
    let t = ctx.t;
    ctx.set_cell(Rgb::WHITE.lerp(Rgb::RED, t));
    let radius = ctx.priority_radius(1.0, 0.3);
    ctx.canvas.splash(ctx.cell, radius, Rgb::WHITE, (1.0 - t) * 0.8);
}

fn shockwave(ctx: &mut PhaseContext<'_>) {
    let pulse = ctx.pulse(4.0, 0.7, 0.3);
    ctx.set_cell(Rgb::RED.scale(pulse));
    let elapsed = ctx.age - 10.0;
    let strength = (1.0 - elapsed / 2.0).max(0.0) * 0.6;
    ctx.canvas.ring(ctx.cell, elapsed * 8.0, 2.0, SHOCK, strength);
}

fn settled(ctx: &mut PhaseContext<'_>) {
    let pulse = ctx.pulse(3.0, 0.6, 0.4);
    ctx.set_cell(Rgb::RED.scale(pulse));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridLayout;
    use crate::render::canvas::Canvas;
    use rand::rngs::mock::StepRng;

    fn paint_at(age: f32, canvas: &mut Canvas) -> Option<&'static str> {
        paint_with(age, canvas, &mut StepRng::new(0, 0))
    }

    fn paint_with(age: f32, canvas: &mut Canvas, rng: &mut StepRng) -> Option<&'static str> {
        let mut ctx = PhaseContext {
            canvas,
            cell: 2,
            priority: 0,
            age,
            t: 0.0,
            clock: 0.0,
            accent: accent(HostState::Ok),
            rng,
        };
        TIMELINE.play(&mut ctx)
    }

    #[test]
    fn test_cool_lies_between_accent_and_blue() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        assert_eq!(paint_at(4.6, &mut canvas), Some("cool"));
        let c = canvas.get(2);
        let from = accent(HostState::Ok);
        assert!(c.r > from.r && c.r < BLUE.r);
        assert!(c.g < from.g && c.g > BLUE.g);
        assert!(c.b > from.b && c.b < BLUE.b);
    }

    #[test]
    fn test_phase_names_in_order() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        let names: Vec<_> = [0.1, 4.1, 6.0, 9.2, 9.7, 11.0, 13.0]
            .iter()
            .map(|&age| paint_at(age, &mut canvas))
            .collect();
        assert_eq!(
            names,
            vec![
                Some("charge"),
                Some("cool"),
                Some("flare"),
                Some("hold"),
                Some("implosion"),
                Some("shockwave"),
                Some("terminal"),
            ]
        );
    }

    #[test]
    fn test_implosion_lights_neighbors() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        paint_at(9.5, &mut canvas);
        assert_eq!(canvas.get(2), Rgb::WHITE);
        assert!(canvas.get(1).r > 0);
        assert!(canvas.get(3).r > 0);
    }

    #[test]
    fn test_flare_stays_within_flicker_envelope() {
        // Base runs blue -> purple -> pale -> white: every channel >= 50, blue pinned
        // at 255. Flicker dims by at most (0.1 + 0.5) of full jitter, so >= 0.4.
        let floor = |c: u8| (f32::from(c) * 0.4).floor() as u8 - 1;
        for &age in &[5.5, 6.1, 6.8, 7.4, 8.0, 8.6, 8.99] {
            for &seed in &[0, u64::MAX / 2, u64::MAX] {
                let mut canvas = Canvas::new(&GridLayout::new(5, 5));
                let mut rng = StepRng::new(seed, 0x9E37_79B9_7F4A_7C15);
                assert_eq!(paint_with(age, &mut canvas, &mut rng), Some("flare"));

                let c = canvas.get(2);
                assert!(c.r >= floor(BLUE.r), "age {age} seed {seed}: {c:?}");
                assert!(c.g >= floor(BLUE.g), "age {age} seed {seed}: {c:?}");
                assert!(c.b >= floor(BLUE.b), "age {age} seed {seed}: {c:?}");
                assert!(c.b >= c.r && c.b >= c.g, "blue dominates, got {c:?}");
            }
        }
    }

    #[test]
    fn test_flare_without_jitter_starts_blue() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        assert_eq!(paint_at(5.5, &mut canvas), Some("flare"));
        assert_eq!(canvas.get(2), BLUE);
    }

    #[test]
    fn test_hold_is_white() {
        let mut canvas = Canvas::new(&GridLayout::new(5, 5));
        paint_at(9.25, &mut canvas);
        assert_eq!(canvas.get(2), Rgb::WHITE);
    }

    #[test]
    fn test_accent_by_previous_state() {
        assert_eq!(accent(HostState::Warn), Rgb::new(255, 180, 0));
        assert_eq!(accent(HostState::Unknown), accent(HostState::Crit));
    }
}
