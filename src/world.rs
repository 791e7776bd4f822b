//! World state: groups, cell occupancy and the per-tick population record.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};
use crate::grid::{Adjacency, CellPos, Grid};
use crate::group::{Group, GroupId, Strategy};
use crate::params::{Neighborhood, Params};

/// Event counters for the tick in progress. Reset by the engine before the
/// first system runs.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickStats {
    pub new_farmers: u64,
    pub new_rice_farmers: u64,
    pub competitions: u64,
    pub deaths: u64,
    pub conversions_to_farmer: u64,
    pub conversions_to_rice: u64,
    pub diffusions: u64,
    pub moves: u64,
}

/// One row of the per-tick population series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    pub tick: u64,
    pub forager_population: f64,
    pub farmer_population: f64,
    pub rice_farmer_population: f64,
    pub forager_groups: usize,
    pub farmer_groups: usize,
    pub rice_farmer_groups: usize,
    pub stats: TickStats,
}

#[derive(Debug, Serialize)]
pub struct WorldSummary {
    pub scenario: String,
    pub tick: u64,
    pub total_population: f64,
    pub forager_population: f64,
    pub farmer_population: f64,
    pub rice_farmer_population: f64,
    pub forager_groups: usize,
    pub farmer_groups: usize,
    pub rice_farmer_groups: usize,
    pub history: Vec<TickRecord>,
}

#[derive(Debug)]
pub struct World {
    next_group: u64,
    tick: u64,
    params: Params,
    pub(crate) grid: Grid,
    pub(crate) groups: HashMap<GroupId, Group>,
    pub(crate) stats: TickStats,
    pub(crate) history: Vec<TickRecord>,
}

impl World {
    pub fn new(grid: Grid, params: Params) -> SimResult<Self> {
        params.validate()?;
        Ok(Self {
            next_group: 0,
            tick: 0,
            params,
            grid,
            groups: HashMap::new(),
            stats: TickStats::default(),
            history: Vec::new(),
        })
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn advance_time(&mut self) {
        self.tick += 1;
    }

    pub fn stats(&self) -> &TickStats {
        &self.stats
    }

    pub(crate) fn reset_stats(&mut self) {
        self.stats = TickStats::default();
    }

    pub fn history(&self) -> &[TickRecord] {
        &self.history
    }

    /// Creates an unplaced group with its size clamped to the strategy bounds.
    pub fn spawn(&mut self, strategy: Strategy, size: f64) -> GroupId {
        let id = self.allocate();
        let mut group = Group::new(id, strategy, size);
        group.set_size(size, &self.params, None);
        self.groups.insert(id, group);
        id
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn live_group(&self, id: GroupId) -> SimResult<&Group> {
        match self.groups.get(&id) {
            Some(group) if group.alive => Ok(group),
            Some(_) => Err(SimError::InactiveGroup(id)),
            None => Err(SimError::UnknownGroup(id)),
        }
    }

    fn live_group_mut(&mut self, id: GroupId) -> SimResult<&mut Group> {
        match self.groups.get_mut(&id) {
            Some(group) if group.alive => Ok(group),
            Some(_) => Err(SimError::InactiveGroup(id)),
            None => Err(SimError::UnknownGroup(id)),
        }
    }

    pub fn is_alive(&self, id: GroupId) -> bool {
        self.groups.get(&id).is_some_and(|group| group.alive)
    }

    /// Live group ids in ascending order, optionally limited to one strategy.
    pub fn live_ids(&self, strategy: Option<Strategy>) -> Vec<GroupId> {
        let mut ids: Vec<GroupId> = self
            .groups
            .values()
            .filter(|group| group.alive)
            .filter(|group| strategy.map_or(true, |s| group.strategy == s))
            .map(|group| group.id)
            .collect();
        ids.sort();
        ids
    }

    /// The live group standing on `pos`, if any.
    pub fn occupant(&self, pos: CellPos) -> Option<GroupId> {
        self.grid
            .cell(pos)?
            .occupants
            .iter()
            .copied()
            .find(|id| self.is_alive(*id))
    }

    /// Every live group on `pos` other than `id`.
    pub(crate) fn rivals(&self, pos: CellPos, id: GroupId) -> Vec<GroupId> {
        self.grid
            .cell(pos)
            .map(|cell| {
                cell.occupants
                    .iter()
                    .copied()
                    .filter(|other| *other != id && self.is_alive(*other))
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn is_arable(&self, pos: CellPos) -> bool {
        self.grid
            .cell(pos)
            .is_some_and(|cell| cell.terrain.is_arable(&self.params.arability))
    }

    pub fn is_rice_arable(&self, pos: CellPos) -> bool {
        self.grid
            .cell(pos)
            .is_some_and(|cell| cell.terrain.is_rice_arable(&self.params.arability))
    }

    pub fn able_to_live(&self, pos: CellPos, strategy: Strategy) -> bool {
        self.grid
            .cell(pos)
            .is_some_and(|cell| cell.terrain.able_to_live(strategy, &self.params.arability))
    }

    /// Whether any cell in the neighborhood of `pos` hosts a live group of
    /// `strategy`.
    pub fn has_neighbor(&self, pos: CellPos, strategy: Strategy, hood: Neighborhood) -> bool {
        self.grid
            .neighbors(pos, hood.radius, Adjacency::from_moore(hood.moore))
            .into_iter()
            .filter_map(|cell| self.occupant(cell))
            .any(|id| self.groups.get(&id).is_some_and(|g| g.strategy == strategy))
    }

    fn cell_capacity(&self, group: &Group) -> Option<f64> {
        group
            .cell
            .and_then(|pos| self.grid.cell(pos))
            .map(|cell| cell.terrain.hunter_capacity)
    }

    pub fn upper_bound(&self, id: GroupId) -> SimResult<f64> {
        let group = self.live_group(id)?;
        Ok(group.upper_bound(&self.params, self.cell_capacity(group)))
    }

    pub fn clamped_size(&self, id: GroupId, value: f64) -> SimResult<f64> {
        let group = self.live_group(id)?;
        Ok(group.clamped_size(value, &self.params, self.cell_capacity(group)))
    }

    /// Writes a new size, clamped into the group's current bounds.
    pub fn set_size(&mut self, id: GroupId, value: f64) -> SimResult<f64> {
        let size = self.clamped_size(id, value)?;
        let group = self.live_group_mut(id)?;
        group.size = size;
        Ok(size)
    }

    pub fn is_complex(&self, id: GroupId) -> bool {
        self.groups
            .get(&id)
            .is_some_and(|group| group.alive && group.is_complex(&self.params))
    }

    pub fn population_growth(&mut self, id: GroupId, rate: f64) -> SimResult<f64> {
        let size = self.live_group(id)?.size;
        self.set_size(id, size * (1.0 + rate))
    }

    /// Removes the group from the simulation. Calling it again is a no-op.
    pub fn die(&mut self, id: GroupId) {
        let was_alive = self.is_alive(id);
        self.detach(id);
        if let Some(group) = self.groups.get_mut(&id) {
            group.alive = false;
        }
        if was_alive {
            self.stats.deaths += 1;
        }
    }

    fn detach(&mut self, id: GroupId) {
        let Some(previous) = self.groups.get_mut(&id).and_then(|g| g.cell.take()) else {
            return;
        };
        if let Some(cell) = self.grid.cell_mut(previous) {
            cell.occupants.retain(|other| *other != id);
        }
    }

    /// Structural half of placement: moves the group onto `target` (or off the
    /// grid) and reports the live rival already standing there. Resolving the
    /// contest is the caller's job.
    pub(crate) fn relocate(
        &mut self,
        id: GroupId,
        target: Option<CellPos>,
    ) -> SimResult<Option<GroupId>> {
        self.live_group(id)?;
        let target = target.map(|pos| self.grid.check(pos)).transpose()?;
        self.detach(id);
        let Some(pos) = target else {
            return Ok(None);
        };
        let incumbent = self.occupant(pos);
        if let Some(cell) = self.grid.cell_mut(pos) {
            cell.occupants.push(id);
        }
        self.live_group_mut(id)?.cell = Some(pos);
        Ok(incumbent)
    }

    /// Replaces the group with a fresh entity of `strategy` carrying the same
    /// size on the same cell. The old group is terminated.
    pub fn convert_occupant(&mut self, id: GroupId, strategy: Strategy) -> SimResult<GroupId> {
        let (size, cell) = {
            let group = self.live_group(id)?;
            (group.size, group.cell)
        };
        let deaths = self.stats.deaths;
        self.die(id);
        // a conversion is not a death
        self.stats.deaths = deaths;
        let replacement = self.allocate();
        let mut group = Group::new(replacement, strategy, size);
        group.cell = cell;
        if let Some(cell) = cell.and_then(|pos| self.grid.cell_mut(pos)) {
            cell.occupants.push(replacement);
        }
        let capacity = self.cell_capacity(&group);
        group.set_size(size, &self.params, capacity);
        self.groups.insert(replacement, group);
        Ok(replacement)
    }

    pub fn population(&self, strategy: Strategy) -> f64 {
        self.groups
            .values()
            .filter(|group| group.alive && group.strategy == strategy)
            .map(|group| group.size)
            .sum()
    }

    pub fn group_count(&self, strategy: Strategy) -> usize {
        self.groups
            .values()
            .filter(|group| group.alive && group.strategy == strategy)
            .count()
    }

    pub fn total_population(&self) -> f64 {
        Strategy::ALL.iter().map(|s| self.population(*s)).sum()
    }

    pub fn record(&self) -> TickRecord {
        TickRecord {
            tick: self.tick,
            forager_population: self.population(Strategy::Forager),
            farmer_population: self.population(Strategy::Farmer),
            rice_farmer_population: self.population(Strategy::RiceFarmer),
            forager_groups: self.group_count(Strategy::Forager),
            farmer_groups: self.group_count(Strategy::Farmer),
            rice_farmer_groups: self.group_count(Strategy::RiceFarmer),
            stats: self.stats.clone(),
        }
    }

    pub fn summary(&self, scenario: &str) -> WorldSummary {
        WorldSummary {
            scenario: scenario.to_string(),
            tick: self.tick,
            total_population: self.total_population(),
            forager_population: self.population(Strategy::Forager),
            farmer_population: self.population(Strategy::Farmer),
            rice_farmer_population: self.population(Strategy::RiceFarmer),
            forager_groups: self.group_count(Strategy::Forager),
            farmer_groups: self.group_count(Strategy::Farmer),
            rice_farmer_groups: self.group_count(Strategy::RiceFarmer),
            history: self.history.clone(),
        }
    }

    fn allocate(&mut self) -> GroupId {
        let id = GroupId(self.next_group);
        self.next_group += 1;
        id
    }
}
