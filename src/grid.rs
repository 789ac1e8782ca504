use epidemic_common::SimError;
use serde::{Deserialize, Serialize};

/// Integer cell coordinate on the lattice.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: u32,
    pub y: u32,
}

impl Position {
    #[inline(always)]
    pub fn new(x: u32, y: u32) -> Self { Self { x, y } }

    /// Row-major 1D index of this cell.
    #[inline(always)]
    pub fn index(self, width: u32) -> usize {
        self.y as usize * width as usize + self.x as usize
    }
}

impl From<(u32, u32)> for Position {
    fn from((x, y): (u32, u32)) -> Self { Self::new(x, y) }
}

/// Offsets of the Moore neighborhood, dy outer and dx inner, centre excluded.
const MOORE_OFFSETS: [(i64, i64); 8] = [
    (-1, -1), (0, -1), (1, -1),
    (-1, 0),           (1, 0),
    (-1, 1),  (0, 1),  (1, 1),
];

/// Fixed-size toroidal lattice holding at most one occupant per cell.
///
/// Storage is a dense row-major vector, so occupants are addressed by cell
/// index and the grid owns them outright.
#[derive(Debug, Clone)]
pub struct Grid<T> {
    width: u32,
    height: u32,
    cells: Vec<Option<T>>,
}

impl<T> Grid<T> {
    /// Creates an empty `width x height` grid.
    pub fn new(width: u32, height: u32) -> Result<Self, SimError> {
        if width == 0 || height == 0 {
            return Err(SimError::InvalidParameter {
                name: if width == 0 { "width" } else { "height" },
                reason: "grid dimensions must be greater than 0".to_string(),
            });
        }
        let num_cells = width as usize * height as usize;
        let cells = std::iter::repeat_with(|| None).take(num_cells).collect();
        Ok(Self { width, height, cells })
    }

    pub fn width(&self) -> u32 { self.width }

    pub fn height(&self) -> u32 { self.height }

    /// Number of cells, occupied or not.
    pub fn len(&self) -> usize { self.cells.len() }

    pub fn is_empty(&self) -> bool { self.cells.iter().all(Option::is_none) }

    /// True when every cell holds an occupant.
    pub fn is_full(&self) -> bool { self.cells.iter().all(Option::is_some) }

    pub fn contains(&self, pos: Position) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    #[inline]
    fn checked_index(&self, pos: Position) -> Result<usize, SimError> {
        if self.contains(pos) {
            Ok(pos.index(self.width))
        } else {
            Err(SimError::OutOfBounds { x: pos.x, y: pos.y, width: self.width, height: self.height })
        }
    }

    /// Position of the cell with row-major index `idx`.
    #[inline(always)]
    pub fn position_of(&self, idx: usize) -> Position {
        let w = self.width as usize;
        Position::new((idx % w) as u32, (idx / w) as u32)
    }

    /// Puts `occupant` on the cell at `pos`. Never overwrites and never clamps.
    pub fn place(&mut self, occupant: T, pos: Position) -> Result<(), SimError> {
        let idx = self.checked_index(pos)?;
        let cell = &mut self.cells[idx];
        if cell.is_some() {
            return Err(SimError::OccupiedCell { x: pos.x, y: pos.y });
        }
        *cell = Some(occupant);
        Ok(())
    }

    pub fn get(&self, pos: Position) -> Result<Option<&T>, SimError> {
        let idx = self.checked_index(pos)?;
        Ok(self.cells[idx].as_ref())
    }

    /// Distinct cells of the wrapped Moore neighborhood of `pos`, in a fixed
    /// order (dy outer, dx inner). `pos` itself is never included, so grids
    /// narrower than 3 cells yield fewer than 8 positions.
    /// `pos` must lie inside the grid.
    #[inline]
    pub fn neighbor_positions(&self, pos: Position) -> impl Iterator<Item = Position> {
        let (w, h) = (self.width as i64, self.height as i64);
        let wrapped = MOORE_OFFSETS.map(|(dx, dy)| {
            Position::new(
                (pos.x as i64 + dx).rem_euclid(w) as u32,
                (pos.y as i64 + dy).rem_euclid(h) as u32,
            )
        });
        (0..wrapped.len())
            .filter(move |&i| wrapped[i] != pos && !wrapped[..i].contains(&wrapped[i]))
            .map(move |i| wrapped[i])
    }

    /// Occupants of the (up to 8) distinct Moore-neighborhood cells of `pos`,
    /// wrapping at the edges.
    pub fn neighbors(&self, pos: Position) -> Result<impl Iterator<Item = &T> + '_, SimError> {
        self.checked_index(pos)?;
        let width = self.width;
        Ok(self
            .neighbor_positions(pos)
            .filter_map(move |n| self.cells[n.index(width)].as_ref()))
    }

    /// Every cell exactly once in row-major order, with its occupant if any.
    pub fn all_cells(&self) -> impl Iterator<Item = (Position, Option<&T>)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .map(move |(idx, cell)| (self.position_of(idx), cell.as_ref()))
    }

    /// Occupants in row-major order.
    pub fn occupants(&self) -> impl Iterator<Item = &T> + '_ {
        self.cells.iter().flatten()
    }

    pub fn occupants_mut(&mut self) -> impl Iterator<Item = &mut T> + '_ {
        self.cells.iter_mut().flatten()
    }

    /// Occupant by row-major cell index.
    #[inline(always)]
    pub fn at_index(&self, idx: usize) -> Option<&T> {
        self.cells.get(idx).and_then(Option::as_ref)
    }
}
