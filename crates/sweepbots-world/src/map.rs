//! Static map parsing.

use serde::{Deserialize, Serialize};
use sweepbots_core::{CellKind, Error, GridPos, Result};

/// The static layer of the world. Built once from the raw map text at
/// startup and immutable thereafter; obstacles, bins and spawn points
/// never move during a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldGrid {
    height: usize,
    width: usize,
    cells: Vec<CellKind>,
}

impl WorldGrid {
    /// Parse map text: a `<height> <width>` header line followed by one
    /// line of space-separated tokens per row.
    ///
    /// Rows shorter than `width` (or missing entirely) leave their
    /// trailing cells Empty. That is accepted input, not an error.
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines();
        let header = lines
            .next()
            .ok_or_else(|| Error::Format("empty map text".into()))?;

        let mut dims = header.split_whitespace();
        let height = parse_dimension(dims.next(), "height")?;
        let width = parse_dimension(dims.next(), "width")?;

        let mut cells = vec![CellKind::Empty; height * width];
        for (row, line) in lines.take(height).enumerate() {
            for (col, token) in line.split_whitespace().take(width).enumerate() {
                cells[row * width + col] = CellKind::from_token(token);
            }
        }

        Ok(Self {
            height,
            width,
            cells,
        })
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn get(&self, pos: GridPos) -> CellKind {
        self.cells[pos.row * self.width + pos.col]
    }

    /// Iterator over all cells with their positions, row-major.
    pub fn iter(&self) -> impl Iterator<Item = (GridPos, CellKind)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, kind)| (GridPos::new(i / self.width, i % self.width), *kind))
    }

    pub fn spawn_points(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.iter()
            .filter(|(_, kind)| *kind == CellKind::SpawnPoint)
            .map(|(pos, _)| pos)
    }
}

/// Shared by the map and frame parsers: both headers declare two positive
/// integer dimensions.
pub(crate) fn parse_dimension(token: Option<&str>, name: &str) -> Result<usize> {
    let value: i64 = token
        .ok_or_else(|| Error::Format(format!("header missing {}", name)))?
        .parse()
        .map_err(|_| Error::Format(format!("header {} is not an integer", name)))?;
    if value <= 0 {
        return Err(Error::Format(format!(
            "{} must be positive, got {}",
            name, value
        )));
    }
    Ok(value as usize)
}
