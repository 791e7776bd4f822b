//! Terrain grid: cell positions, terrain attributes and neighborhood queries.

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::group::{GroupId, Strategy};
use crate::params::Arability;

/// Cell position in the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CellPos {
    pub x: u32,
    pub y: u32,
}

impl CellPos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }
}

/// Adjacency used by neighborhood queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjacency {
    /// Orthogonal cells only (Manhattan distance).
    VonNeumann,
    /// Orthogonal and diagonal cells (Chebyshev distance).
    Moore,
}

impl Adjacency {
    pub fn from_moore(moore: bool) -> Self {
        if moore {
            Adjacency::Moore
        } else {
            Adjacency::VonNeumann
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Terrain {
    pub elevation: f64,
    pub slope: f64,
    pub aspect: f64,
    pub is_water: bool,
    /// Largest forager population the cell supports.
    pub hunter_capacity: f64,
}

impl Default for Terrain {
    fn default() -> Self {
        Self {
            elevation: 100.0,
            slope: 2.0,
            aspect: 180.0,
            is_water: false,
            hunter_capacity: 100.0,
        }
    }
}

impl Terrain {
    pub fn is_arable(&self, thresholds: &Arability) -> bool {
        !self.is_water
            && self.slope <= thresholds.max_slope
            && self.aspect >= thresholds.min_aspect
            && self.aspect <= thresholds.max_aspect
            && self.elevation > thresholds.min_elevation
            && self.elevation < thresholds.max_elevation
    }

    pub fn is_rice_arable(&self, thresholds: &Arability) -> bool {
        self.is_arable(thresholds)
            && self.elevation <= thresholds.rice_max_elevation
            && self.slope <= thresholds.rice_max_slope
    }

    /// Whether a group following `strategy` can settle here at all.
    pub fn able_to_live(&self, strategy: Strategy, thresholds: &Arability) -> bool {
        match strategy {
            Strategy::Forager => !self.is_water,
            Strategy::Farmer => self.is_arable(thresholds),
            Strategy::RiceFarmer => self.is_rice_arable(thresholds),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Cell {
    pub terrain: Terrain,
    pub(crate) occupants: Vec<GroupId>,
}

impl Cell {
    pub fn new(terrain: Terrain) -> Self {
        Self {
            terrain,
            occupants: Vec::new(),
        }
    }

    pub fn occupants(&self) -> &[GroupId] {
        &self.occupants
    }
}

/// Row-major grid of cells.
#[derive(Debug, Clone)]
pub struct Grid {
    width: u32,
    height: u32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn new(width: u32, height: u32, terrain: Terrain) -> Self {
        let count = width as usize * height as usize;
        Self {
            width,
            height,
            cells: vec![Cell::new(terrain); count],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn contains(&self, pos: CellPos) -> bool {
        pos.x < self.width && pos.y < self.height
    }

    pub fn check(&self, pos: CellPos) -> SimResult<CellPos> {
        if self.contains(pos) {
            Ok(pos)
        } else {
            Err(SimError::InvalidPlacement {
                x: pos.x as i64,
                y: pos.y as i64,
            })
        }
    }

    fn index(&self, pos: CellPos) -> Option<usize> {
        self.contains(pos)
            .then(|| pos.y as usize * self.width as usize + pos.x as usize)
    }

    pub fn cell(&self, pos: CellPos) -> Option<&Cell> {
        self.index(pos).map(|idx| &self.cells[idx])
    }

    pub fn cell_mut(&mut self, pos: CellPos) -> Option<&mut Cell> {
        self.index(pos).map(move |idx| &mut self.cells[idx])
    }

    pub fn positions(&self) -> impl Iterator<Item = CellPos> + '_ {
        (0..self.height).flat_map(move |y| (0..self.width).map(move |x| CellPos::new(x, y)))
    }

    /// Cells within `radius` of `pos`, excluding `pos` itself, in row-major
    /// order.
    pub fn neighbors(&self, pos: CellPos, radius: u32, adjacency: Adjacency) -> Vec<CellPos> {
        let mut neighbors = Vec::new();
        if radius == 0 || !self.contains(pos) {
            return neighbors;
        }
        let r = radius as i64;
        let (cx, cy) = (pos.x as i64, pos.y as i64);
        for dy in -r..=r {
            for dx in -r..=r {
                if dx == 0 && dy == 0 {
                    continue;
                }
                if adjacency == Adjacency::VonNeumann && dx.abs() + dy.abs() > r {
                    continue;
                }
                let (x, y) = (cx + dx, cy + dy);
                if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
                    continue;
                }
                neighbors.push(CellPos::new(x as u32, y as u32));
            }
        }
        neighbors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terrain(slope: f64, aspect: f64, elevation: f64, is_water: bool) -> Terrain {
        Terrain {
            elevation,
            slope,
            aspect,
            is_water,
            hunter_capacity: 100.0,
        }
    }

    #[test]
    fn test_neighbors() {
        let grid = Grid::new(10, 5, Terrain::default());

        // Corner cell
        let corner = grid.neighbors(CellPos::new(0, 0), 1, Adjacency::VonNeumann);
        assert_eq!(corner.len(), 2);

        // Middle cell
        let middle = grid.neighbors(CellPos::new(5, 2), 1, Adjacency::VonNeumann);
        assert_eq!(middle.len(), 4);
        let middle = grid.neighbors(CellPos::new(5, 2), 1, Adjacency::Moore);
        assert_eq!(middle.len(), 8);

        let wide = grid.neighbors(CellPos::new(5, 2), 2, Adjacency::VonNeumann);
        assert_eq!(wide.len(), 12);
        assert!(!wide.contains(&CellPos::new(5, 2)));
    }

    #[test]
    fn out_of_grid_positions_are_rejected() {
        let grid = Grid::new(4, 4, Terrain::default());
        assert!(grid.check(CellPos::new(3, 3)).is_ok());
        assert_eq!(
            grid.check(CellPos::new(4, 0)),
            Err(SimError::InvalidPlacement { x: 4, y: 0 })
        );
        assert!(grid.neighbors(CellPos::new(9, 9), 1, Adjacency::Moore).is_empty());
    }

    #[test]
    fn arable_terrain() {
        let thresholds = Arability::default();
        assert!(terrain(5.0, 67.0, 100.0, false).is_arable(&thresholds));
        assert!(terrain(0.0, 60.0, 1.0, false).is_arable(&thresholds));
    }

    #[test]
    fn each_threshold_can_block_arability() {
        let thresholds = Arability::default();
        assert!(!terrain(15.0, 60.0, 100.0, false).is_arable(&thresholds));
        assert!(!terrain(5.0, 35.0, 100.0, false).is_arable(&thresholds));
        assert!(!terrain(5.0, 60.0, 400.0, false).is_arable(&thresholds));
        assert!(!terrain(5.0, 50.0, 100.0, true).is_arable(&thresholds));
        assert!(!terrain(30.0, 315.0, 300.0, true).is_arable(&thresholds));
    }

    #[test]
    fn rice_needs_low_flat_arable_land() {
        let thresholds = Arability::default();
        assert!(terrain(2.0, 180.0, 50.0, false).is_rice_arable(&thresholds));
        assert!(!terrain(8.0, 180.0, 50.0, false).is_rice_arable(&thresholds));
        assert!(!terrain(2.0, 180.0, 150.0, false).is_rice_arable(&thresholds));
    }

    #[test]
    fn habitability_follows_strategy() {
        let thresholds = Arability::default();
        let hills = terrain(20.0, 180.0, 100.0, false);
        assert!(hills.able_to_live(Strategy::Forager, &thresholds));
        assert!(!hills.able_to_live(Strategy::Farmer, &thresholds));
        let lake = terrain(0.0, 180.0, 10.0, true);
        assert!(!lake.able_to_live(Strategy::Forager, &thresholds));
    }
}
