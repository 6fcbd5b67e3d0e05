//! Static terrain model of the battlefield.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{CellCoord, UnitKind};

/// Static classification of a single grid cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerrainKind {
    /// Open ground that every unit may cross.
    #[default]
    Open,
    /// Forest that blocks every unit.
    Tree,
    /// Masonry that blocks every unit.
    Wall,
    /// Water that only amphibious units may cross.
    Water,
    /// Open ground that restores one health point to a unit landing on it.
    HealingZone,
}

impl TerrainKind {
    /// Every terrain kind in declaration order.
    pub const ALL: [TerrainKind; 5] = [
        TerrainKind::Open,
        TerrainKind::Tree,
        TerrainKind::Wall,
        TerrainKind::Water,
        TerrainKind::HealingZone,
    ];

    /// Reports whether the terrain stops a unit of the provided kind.
    ///
    /// Walls and trees stop everyone, water stops everyone but wizards.
    #[must_use]
    pub const fn is_blocking_for(self, kind: UnitKind) -> bool {
        match self {
            TerrainKind::Wall | TerrainKind::Tree => true,
            TerrainKind::Water => !kind.is_amphibious(),
            TerrainKind::Open | TerrainKind::HealingZone => false,
        }
    }

    /// Single-character symbol used by text layouts.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            TerrainKind::Open => '.',
            TerrainKind::Tree => 'T',
            TerrainKind::Wall => '#',
            TerrainKind::Water => '~',
            TerrainKind::HealingZone => '+',
        }
    }

    /// Parses a terrain kind from its text layout symbol.
    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<TerrainKind> {
        Self::ALL.into_iter().find(|kind| kind.symbol() == symbol)
    }
}

/// Errors raised by coordinate queries against the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum GridError {
    /// The queried cell lies outside `[0, size)` on either axis.
    #[error("cell {cell:?} lies outside the {size}x{size} grid")]
    OutOfBounds {
        /// Cell that was queried.
        cell: CellCoord,
        /// Edge length of the grid.
        size: u32,
    },
}

/// Errors raised while building a grid from rows or text.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout contained no rows.
    #[error("terrain layout is empty")]
    Empty,
    /// A row length differs from the number of rows.
    #[error("row {row} has {found} cells but the grid is {expected} cells wide")]
    NotSquare {
        /// Zero-based index of the offending row.
        row: usize,
        /// Expected number of cells per row.
        expected: usize,
        /// Actual number of cells in the row.
        found: usize,
    },
    /// A text layout contained a character that names no terrain.
    #[error("unknown terrain symbol {symbol:?} at row {row}, column {column}")]
    UnknownSymbol {
        /// Offending character.
        symbol: char,
        /// Zero-based row of the character.
        row: usize,
        /// Zero-based column of the character.
        column: usize,
    },
    /// The layout is too large to be addressed with cell coordinates.
    #[error("terrain layout with {rows} rows exceeds the addressable size")]
    TooLarge {
        /// Number of rows in the layout.
        rows: usize,
    },
}

/// Immutable square map of terrain kinds, indexed by [`CellCoord`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TerrainGrid {
    size: u32,
    cells: Vec<TerrainKind>,
}

impl TerrainGrid {
    /// Creates a grid of the provided edge length covered by a single terrain kind.
    #[must_use]
    pub fn filled(size: u32, kind: TerrainKind) -> Self {
        let capacity = usize::try_from(u64::from(size) * u64::from(size)).unwrap_or(0);
        Self {
            size,
            cells: vec![kind; capacity],
        }
    }

    /// Builds a grid from rows of terrain, where row `y` holds cells `(0..N, y)`.
    pub fn from_rows(rows: Vec<Vec<TerrainKind>>) -> Result<Self, LayoutError> {
        if rows.is_empty() {
            return Err(LayoutError::Empty);
        }

        let expected = rows.len();
        let size = u32::try_from(expected).map_err(|_| LayoutError::TooLarge { rows: expected })?;
        let mut cells = Vec::with_capacity(expected * expected);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != expected {
                return Err(LayoutError::NotSquare {
                    row,
                    expected,
                    found: values.len(),
                });
            }
            cells.extend(values);
        }

        Ok(Self { size, cells })
    }

    /// Parses a text layout with one line per row and one symbol per cell.
    ///
    /// Surrounding whitespace and blank lines are ignored.
    pub fn parse(layout: &str) -> Result<Self, LayoutError> {
        let mut rows = Vec::new();
        for (row, line) in layout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .enumerate()
        {
            let mut values = Vec::with_capacity(line.len());
            for (column, symbol) in line.chars().enumerate() {
                let kind = TerrainKind::from_symbol(symbol).ok_or(LayoutError::UnknownSymbol {
                    symbol,
                    row,
                    column,
                })?;
                values.push(kind);
            }
            rows.push(values);
        }
        Self::from_rows(rows)
    }

    /// Returns a copy of the grid with one cell replaced.
    pub fn with_terrain(mut self, cell: CellCoord, kind: TerrainKind) -> Result<Self, GridError> {
        let index = self.index(cell).ok_or(GridError::OutOfBounds {
            cell,
            size: self.size,
        })?;
        self.cells[index] = kind;
        Ok(self)
    }

    /// Edge length of the square grid.
    #[must_use]
    pub const fn size(&self) -> u32 {
        self.size
    }

    /// Reports whether the cell lies within `[0, size)²`.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.size && cell.row() < self.size
    }

    /// Terrain kind of the provided cell.
    pub fn terrain_at(&self, cell: CellCoord) -> Result<TerrainKind, GridError> {
        self.index(cell)
            .and_then(|index| self.cells.get(index).copied())
            .ok_or(GridError::OutOfBounds {
                cell,
                size: self.size,
            })
    }

    /// Reports whether a unit of the given kind may stand on the cell.
    #[must_use]
    pub fn is_passable(&self, cell: CellCoord, kind: UnitKind) -> bool {
        self.terrain_at(cell)
            .map_or(false, |terrain| !terrain.is_blocking_for(kind))
    }

    /// Iterator over the rows of the grid from top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[TerrainKind]> {
        let width = usize::try_from(self.size).unwrap_or(0).max(1);
        self.cells.chunks(width)
    }

    fn index(&self, cell: CellCoord) -> Option<usize> {
        if self.contains(cell) {
            let row = usize::try_from(cell.row()).ok()?;
            let column = usize::try_from(cell.column()).ok()?;
            let width = usize::try_from(self.size).ok()?;
            Some(row * width + column)
        } else {
            None
        }
    }
}
