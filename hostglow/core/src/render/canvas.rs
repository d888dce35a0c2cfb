//! Frame canvas and neighbor-propagation helpers

use crate::color::Rgb;
use crate::layout::LayoutProvider;

/// One frame's worth of cell colors plus the positions they sit at
#[derive(Clone, Debug)]
pub(crate) struct Canvas {
    colors: Vec<Rgb>,
    positions: Vec<(f32, f32)>,
    width: f32,
}

impl Canvas {
    pub(crate) fn new(layout: &dyn LayoutProvider) -> Self {
        let cells = layout.cell_count();
        let positions: Vec<(f32, f32)> = (0..cells).map(|i| layout.position_of(i)).collect();
        let width = positions.iter().map(|p| p.0).fold(0.0_f32, f32::max) + 1.0;
        Self {
            colors: vec![Rgb::BLACK; cells],
            positions,
            width,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.colors.len()
    }

    /// Horizontal extent of the layout, at least one unit
    pub(crate) fn width(&self) -> f32 {
        self.width
    }

    pub(crate) fn get(&self, cell: usize) -> Rgb {
        self.colors.get(cell).copied().unwrap_or(Rgb::BLACK)
    }

    pub(crate) fn set(&mut self, cell: usize, color: Rgb) {
        if let Some(slot) = self.colors.get_mut(cell) {
            *slot = color;
        }
    }

    pub(crate) fn position(&self, cell: usize) -> (f32, f32) {
        self.positions.get(cell).copied().unwrap_or((0.0, 0.0))
    }

    pub(crate) fn distance(&self, a: usize, b: usize) -> f32 {
        let (ax, ay) = self.position(a);
        let (bx, by) = self.position(b);
        (bx - ax).hypot(by - ay)
    }

    /// Move a cell `amount` of the way toward `target`
    pub(crate) fn blend(&mut self, cell: usize, target: Rgb, amount: f32) {
        if amount <= 0.0 {
            return;
        }
        let current = self.get(cell);
        self.set(cell, current.lerp(target, amount));
    }

    /// Dim a cell by `amount` (1 = black)
    pub(crate) fn darken(&mut self, cell: usize, amount: f32) {
        let current = self.get(cell);
        self.set(cell, current.scale(1.0 - amount.clamp(0.0, 1.0)));
    }

    /// Cells other than `center` with their distance to it
    pub(crate) fn others(&self, center: usize) -> impl Iterator<Item = (usize, f32)> + '_ {
        (0..self.len())
            .filter(move |&i| i != center)
            .map(move |i| (i, self.distance(center, i)))
    }

    /// Linear falloff toward `target` inside `radius`, excluding the center
    pub(crate) fn splash(&mut self, center: usize, radius: f32, target: Rgb, strength: f32) {
        if radius <= 0.0 || strength <= 0.0 {
            return;
        }
        let hits: Vec<(usize, f32)> = self
            .others(center)
            .filter(|&(_, d)| d < radius)
            .map(|(i, d)| (i, (1.0 - d / radius) * strength))
            .collect();
        for (cell, amount) in hits {
            self.blend(cell, target, amount);
        }
    }

    /// Band of `width` around distance `radius` from `center`, excluding it
    pub(crate) fn ring(&mut self, center: usize, radius: f32, width: f32, target: Rgb, strength: f32) {
        if width <= 0.0 || strength <= 0.0 {
            return;
        }
        let hits: Vec<(usize, f32)> = self
            .others(center)
            .filter_map(|(i, d)| {
                let off = (d - radius).abs();
                (off < width).then(|| (i, (1.0 - off / width) * strength))
            })
            .collect();
        for (cell, amount) in hits {
            self.blend(cell, target, amount);
        }
    }

    pub(crate) fn apply_brightness(&mut self, brightness: f32) {
        if (brightness - 1.0).abs() < f32::EPSILON {
            return;
        }
        for color in &mut self.colors {
            *color = color.scale(brightness);
        }
    }

    pub(crate) fn into_colors(self) -> Vec<Rgb> {
        self.colors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::GridLayout;

    fn canvas(columns: usize, cells: usize) -> Canvas {
        Canvas::new(&GridLayout::new(columns, cells))
    }

    #[test]
    fn test_out_of_range_is_ignored() {
        let mut c = canvas(4, 4);
        c.set(99, Rgb::WHITE);
        assert_eq!(c.get(99), Rgb::BLACK);
        assert_eq!(c.len(), 4);
    }

    #[test]
    fn test_splash_falls_off_and_skips_center() {
        let mut c = canvas(5, 5);
        c.splash(2, 2.0, Rgb::WHITE, 1.0);
        assert_eq!(c.get(2), Rgb::BLACK);
        assert_eq!(c.get(1), Rgb::new(128, 128, 128));
        assert_eq!(c.get(3), Rgb::new(128, 128, 128));
        assert_eq!(c.get(0), Rgb::BLACK);
    }

    #[test]
    fn test_ring_hits_band_only() {
        let mut c = canvas(9, 9);
        c.ring(0, 4.0, 1.0, Rgb::WHITE, 1.0);
        assert_eq!(c.get(4), Rgb::WHITE);
        assert_eq!(c.get(2), Rgb::BLACK);
        assert_eq!(c.get(8), Rgb::BLACK);
    }

    #[test]
    fn test_width_of_grid() {
        assert!((canvas(6, 12).width() - 6.0).abs() < f32::EPSILON);
        assert!((canvas(6, 0).width() - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_brightness_scales_all() {
        let mut c = canvas(2, 2);
        c.set(0, Rgb::WHITE);
        c.apply_brightness(0.5);
        assert_eq!(c.get(0), Rgb::new(127, 127, 127));
    }
}
