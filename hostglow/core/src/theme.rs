//! Color Themes
//!
//! A theme supplies the four status colors used by the steady-state layer,
//! a gradient for the idle pattern, and a highlight color. The renderer
//! reads the theme through [`ThemeProvider`] on every frame, so swapping the
//! theme behind a [`SharedTheme`] takes effect on the next frame.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::color::Rgb;
use crate::host::HostState;

/// Source of theme colors, consulted every frame
pub trait ThemeProvider: Send + Sync {
    /// Color representing a host state
    fn status_color(&self, state: HostState) -> Rgb;

    /// Color at `position` along the theme gradient (wraps outside `[0, 1)`)
    fn gradient_color(&self, position: f32) -> Rgb;

    /// Accent color
    fn highlight(&self) -> Rgb;
}

/// Status colors of a theme
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPalette {
    /// OK color
    pub ok: Rgb,
    /// WARN color
    pub warn: Rgb,
    /// CRIT color
    pub crit: Rgb,
    /// UNKNOWN color
    pub unknown: Rgb,
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self {
            ok: Rgb::new(46, 204, 113),
            warn: Rgb::new(241, 196, 15),
            crit: Rgb::new(231, 76, 60),
            unknown: Rgb::new(155, 89, 182),
        }
    }
}

/// A named color theme
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Theme {
    /// Theme identifier
    pub name: String,
    /// Gradient stops for ambient patterns
    pub gradient: Vec<Rgb>,
    /// Accent color
    pub highlight: Rgb,
    /// Status colors
    pub status: StatusPalette,
}

/// Names of the built-in themes
pub const BUILTIN_THEMES: &[&str] = &[
    "default",
    "cyberpunk",
    "nord",
    "fire",
    "ocean",
    "matrix",
    "synthwave",
];

const fn c(r: u8, g: u8, b: u8) -> Rgb {
    Rgb::new(r, g, b)
}

impl Theme {
    /// Look up a built-in theme by name
    #[must_use]
    pub fn builtin(name: &str) -> Option<Self> {
        let base = StatusPalette::default();
        let (gradient, highlight, status) = match name {
            "default" => (
                vec![
                    c(255, 0, 128),
                    c(255, 100, 0),
                    c(255, 255, 0),
                    c(0, 255, 128),
                    c(0, 128, 255),
                    c(128, 0, 255),
                ],
                c(255, 255, 255),
                base,
            ),
            "cyberpunk" => (
                vec![c(255, 0, 128), c(0, 255, 255), c(255, 0, 255), c(0, 255, 128)],
                c(255, 0, 255),
                StatusPalette {
                    ok: c(0, 255, 136),
                    warn: c(255, 170, 0),
                    crit: c(255, 0, 68),
                    ..base
                },
            ),
            "nord" => (
                vec![
                    c(94, 129, 172),
                    c(136, 192, 208),
                    c(163, 190, 140),
                    c(235, 203, 139),
                    c(191, 97, 106),
                ],
                c(236, 239, 244),
                StatusPalette {
                    ok: c(163, 190, 140),
                    warn: c(235, 203, 139),
                    crit: c(191, 97, 106),
                    unknown: c(180, 142, 173),
                },
            ),
            "fire" => (
                vec![
                    c(255, 255, 200),
                    c(255, 200, 0),
                    c(255, 100, 0),
                    c(200, 50, 0),
                    c(100, 0, 0),
                ],
                c(255, 255, 200),
                StatusPalette {
                    ok: c(255, 200, 0),
                    warn: c(255, 100, 0),
                    crit: c(200, 0, 0),
                    ..base
                },
            ),
            "ocean" => (
                vec![
                    c(0, 50, 100),
                    c(0, 100, 150),
                    c(0, 150, 200),
                    c(50, 200, 220),
                    c(150, 230, 255),
                ],
                c(200, 255, 255),
                StatusPalette {
                    ok: c(0, 200, 150),
                    warn: c(255, 200, 100),
                    crit: c(255, 80, 80),
                    ..base
                },
            ),
            "matrix" => (
                vec![c(0, 50, 0), c(0, 100, 0), c(0, 180, 0), c(0, 255, 0), c(150, 255, 150)],
                c(200, 255, 200),
                StatusPalette {
                    ok: c(0, 255, 0),
                    warn: c(200, 255, 0),
                    crit: c(255, 50, 50),
                    ..base
                },
            ),
            "synthwave" => (
                vec![
                    c(255, 0, 128),
                    c(255, 0, 255),
                    c(128, 0, 255),
                    c(0, 0, 255),
                    c(0, 128, 255),
                ],
                c(255, 100, 200),
                StatusPalette {
                    ok: c(0, 255, 200),
                    warn: c(255, 200, 0),
                    crit: c(255, 50, 100),
                    ..base
                },
            ),
            _ => return None,
        };

        Some(Self {
            name: name.to_string(),
            gradient,
            highlight,
            status,
        })
    }

    /// Whether `name` is a built-in theme
    #[must_use]
    pub fn is_builtin(name: &str) -> bool {
        BUILTIN_THEMES.contains(&name)
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            gradient: vec![
                c(255, 0, 128),
                c(255, 100, 0),
                c(255, 255, 0),
                c(0, 255, 128),
                c(0, 128, 255),
                c(128, 0, 255),
            ],
            highlight: Rgb::WHITE,
            status: StatusPalette::default(),
        }
    }
}

impl ThemeProvider for Theme {
    fn status_color(&self, state: HostState) -> Rgb {
        match state {
            HostState::Ok => self.status.ok,
            HostState::Warn => self.status.warn,
            HostState::Crit => self.status.crit,
            HostState::Unknown => self.status.unknown,
        }
    }

    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn gradient_color(&self, position: f32) -> Rgb {
        match self.gradient.as_slice() {
            [] => self.highlight,
            [only] => *only,
            stops => {
                let scaled = position.rem_euclid(1.0) * (stops.len() - 1) as f32;
                let idx = (scaled.floor() as usize).min(stops.len() - 2);
                stops[idx].lerp(stops[idx + 1], scaled - idx as f32)
            }
        }
    }

    fn highlight(&self) -> Rgb {
        self.highlight
    }
}

/// A theme that can be swapped while the renderer is running
#[derive(Clone, Debug, Default)]
pub struct SharedTheme {
    inner: Arc<RwLock<Theme>>,
}

impl SharedTheme {
    /// Wrap a theme
    #[must_use]
    pub fn new(theme: Theme) -> Self {
        Self {
            inner: Arc::new(RwLock::new(theme)),
        }
    }

    /// Replace the active theme
    pub fn set(&self, theme: Theme) {
        tracing::info!(theme = %theme.name, "Theme changed");
        *self.inner.write() = theme;
    }

    /// Switch to a built-in theme by name
    ///
    /// Returns `false` (and keeps the current theme) for unknown names.
    pub fn set_builtin(&self, name: &str) -> bool {
        match Theme::builtin(name) {
            Some(theme) => {
                self.set(theme);
                true
            }
            None => {
                tracing::warn!(theme = %name, "Unknown theme requested");
                false
            }
        }
    }

    /// Name of the active theme
    #[must_use]
    pub fn name(&self) -> String {
        self.inner.read().name.clone()
    }

    /// Copy of the active theme
    #[must_use]
    pub fn current(&self) -> Theme {
        self.inner.read().clone()
    }
}

impl ThemeProvider for SharedTheme {
    fn status_color(&self, state: HostState) -> Rgb {
        self.inner.read().status_color(state)
    }

    fn gradient_color(&self, position: f32) -> Rgb {
        self.inner.read().gradient_color(position)
    }

    fn highlight(&self) -> Rgb {
        self.inner.read().highlight
    }
}
