//! Cell Layouts
//!
//! Maps an output cell index to a 2D position. Distances between positions
//! drive every neighbor effect (rings, splashes, waves), so a layout that
//! matches the physical device makes the animations look right.

/// Cell-to-position mapping for the output device
pub trait LayoutProvider: Send + Sync {
    /// Position of `cell` in layout units (one unit = one cell pitch)
    fn position_of(&self, cell: usize) -> (f32, f32);

    /// Number of addressable cells
    fn cell_count(&self) -> usize;
}

/// Row-major rectangular grid
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GridLayout {
    columns: usize,
    cells: usize,
}

impl GridLayout {
    /// Grid of `cells` cells wrapped every `columns` cells
    ///
    /// A zero column count is treated as one column.
    #[must_use]
    pub fn new(columns: usize, cells: usize) -> Self {
        Self {
            columns: columns.max(1),
            cells,
        }
    }

    /// Cells per row
    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }
}

impl LayoutProvider for GridLayout {
    #[allow(clippy::cast_precision_loss)]
    fn position_of(&self, cell: usize) -> (f32, f32) {
        ((cell % self.columns) as f32, (cell / self.columns) as f32)
    }

    fn cell_count(&self) -> usize {
        self.cells
    }
}

/// Explicit per-cell positions, for irregular devices such as keyboards
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableLayout {
    positions: Vec<(f32, f32)>,
}

impl TableLayout {
    /// Layout from a position table
    #[must_use]
    pub fn new(positions: Vec<(f32, f32)>) -> Self {
        Self { positions }
    }
}

impl LayoutProvider for TableLayout {
    #[allow(clippy::cast_precision_loss)]
    fn position_of(&self, cell: usize) -> (f32, f32) {
        self.positions
            .get(cell)
            .copied()
            .unwrap_or((cell as f32, 0.0))
    }

    fn cell_count(&self) -> usize {
        self.positions.len()
    }
}
