//! Subsistence groups and the size bookkeeping shared by every strategy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::grid::CellPos;
use crate::params::Params;

/// Capacity of a forager that is not standing on any cell.
pub const UNPLACED_CAPACITY: f64 = 100_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GroupId(pub(crate) u64);

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    Forager,
    Farmer,
    RiceFarmer,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Forager, Strategy::Farmer, Strategy::RiceFarmer];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Forager => "forager",
            Strategy::Farmer => "farmer",
            Strategy::RiceFarmer => "rice_farmer",
        }
    }

    /// Farmers and rice farmers both hold land by cultivation.
    pub fn is_agricultural(self) -> bool {
        matches!(self, Strategy::Farmer | Strategy::RiceFarmer)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forager" | "hunter" => Ok(Strategy::Forager),
            "farmer" => Ok(Strategy::Farmer),
            "rice_farmer" | "ricefarmer" | "rice" => Ok(Strategy::RiceFarmer),
            other => Err(SimError::InvalidAgentKind(other.to_string())),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = SimError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(value: Strategy) -> Self {
        value.as_str().to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Group {
    pub(crate) id: GroupId,
    pub(crate) strategy: Strategy,
    pub(crate) size: f64,
    pub(crate) alive: bool,
    pub(crate) cell: Option<CellPos>,
}

impl Group {
    pub(crate) fn new(id: GroupId, strategy: Strategy, size: f64) -> Self {
        Self {
            id,
            strategy,
            size,
            alive: true,
            cell: None,
        }
    }

    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn cell(&self) -> Option<CellPos> {
        self.cell
    }

    pub fn is_placed(&self) -> bool {
        self.cell.is_some()
    }

    /// Terrain-derived capacity. Only foragers are capped by the land they
    /// stand on; `cell_capacity` is the occupied cell's `hunter_capacity`.
    pub fn capacity(&self, cell_capacity: Option<f64>) -> f64 {
        match (self.strategy, self.cell, cell_capacity) {
            (Strategy::Forager, Some(_), Some(capacity)) => capacity.ceil(),
            _ => UNPLACED_CAPACITY,
        }
    }

    pub fn lower_bound(&self, params: &Params) -> f64 {
        params.strategy(self.strategy).min_size
    }

    pub fn upper_bound(&self, params: &Params, cell_capacity: Option<f64>) -> f64 {
        params
            .strategy(self.strategy)
            .max_size
            .min(self.capacity(cell_capacity))
    }

    pub fn clamped_size(&self, value: f64, params: &Params, cell_capacity: Option<f64>) -> f64 {
        let lower = self.lower_bound(params);
        let upper = self.upper_bound(params, cell_capacity).max(lower);
        if value.is_nan() {
            return lower;
        }
        value.clamp(lower, upper)
    }

    /// Settled foragers: placed and above the complexity threshold.
    pub fn is_complex(&self, params: &Params) -> bool {
        self.strategy == Strategy::Forager
            && self.is_placed()
            && self.size > params.complexity_threshold
    }

    pub(crate) fn set_size(&mut self, value: f64, params: &Params, cell_capacity: Option<f64>) {
        self.size = self.clamped_size(value, params, cell_capacity);
    }
}
