use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::{
    error::SimError,
    grid::{CellPos, Grid, Terrain},
    group::Strategy,
    params::Params,
    rng::{RandomSource, RngManager},
    systems::ImmigrationRule,
    world::World,
};

fn default_log_level() -> String {
    "info".to_string()
}

fn default_scatter_size() -> (f64, f64) {
    (30.0, 60.0)
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    pub seed: u64,
    #[serde(default)]
    pub ticks: Option<u64>,
    #[serde(default)]
    pub logging: LoggingConfig,
    pub grid: GridSpec,
    #[serde(default)]
    pub params: Params,
    #[serde(default)]
    pub seeds: Vec<SeedGroup>,
    #[serde(default)]
    pub foragers: Option<ForagerScatter>,
    #[serde(default)]
    pub immigration: Vec<ImmigrationRule>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridSpec {
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub terrain: Terrain,
    #[serde(default)]
    pub patches: Vec<TerrainPatch>,
}

/// Rectangle of cells whose terrain differs from the grid default. Fields
/// left out keep the default value.
#[derive(Debug, Clone, Deserialize)]
pub struct TerrainPatch {
    pub x: u32,
    pub y: u32,
    #[serde(default = "one")]
    pub width: u32,
    #[serde(default = "one")]
    pub height: u32,
    pub elevation: Option<f64>,
    pub slope: Option<f64>,
    pub aspect: Option<f64>,
    pub is_water: Option<bool>,
    pub hunter_capacity: Option<f64>,
}

fn one() -> u32 {
    1
}

impl TerrainPatch {
    fn apply(&self, terrain: &mut Terrain) {
        if let Some(elevation) = self.elevation {
            terrain.elevation = elevation;
        }
        if let Some(slope) = self.slope {
            terrain.slope = slope;
        }
        if let Some(aspect) = self.aspect {
            terrain.aspect = aspect;
        }
        if let Some(is_water) = self.is_water {
            terrain.is_water = is_water;
        }
        if let Some(capacity) = self.hunter_capacity {
            terrain.hunter_capacity = capacity;
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedGroup {
    pub strategy: String,
    pub x: u32,
    pub y: u32,
    pub size: f64,
}

/// Foragers dropped on random habitable cells when the world is built.
#[derive(Debug, Clone, Deserialize)]
pub struct ForagerScatter {
    pub count: u32,
    #[serde(default = "default_scatter_size")]
    pub size_range: (f64, f64),
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("Failed to parse scenario")
    }

    pub fn build_grid(&self) -> Result<Grid, SimError> {
        let spec = &self.grid;
        if spec.width == 0 || spec.height == 0 {
            return Err(SimError::InvalidParams(format!(
                "grid must have positive dimensions, got {}x{}",
                spec.width, spec.height
            )));
        }
        let mut grid = Grid::new(spec.width, spec.height, spec.terrain.clone());
        for patch in &spec.patches {
            let far_corner = CellPos::new(
                patch.x.saturating_add(patch.width.saturating_sub(1)),
                patch.y.saturating_add(patch.height.saturating_sub(1)),
            );
            grid.check(CellPos::new(patch.x, patch.y))?;
            grid.check(far_corner)?;
            for y in patch.y..patch.y + patch.height {
                for x in patch.x..patch.x + patch.width {
                    if let Some(cell) = grid.cell_mut(CellPos::new(x, y)) {
                        patch.apply(&mut cell.terrain);
                    }
                }
            }
        }
        for pos in grid.positions() {
            let capacity = grid
                .cell(pos)
                .map_or(0.0, |cell| cell.terrain.hunter_capacity);
            if !(capacity >= 0.0) {
                return Err(SimError::InvalidParams(format!(
                    "hunter_capacity {capacity} at ({}, {}) must be non-negative",
                    pos.x, pos.y
                )));
            }
        }
        Ok(grid)
    }

    /// Builds the initial world: terrain, explicit seed groups, then randomly
    /// scattered foragers drawn from the `setup` stream of the scenario seed.
    pub fn build_world(&self) -> Result<World> {
        let grid = self.build_grid()?;
        let mut world = World::new(grid, self.params.clone())?;

        for seed in &self.seeds {
            let strategy: Strategy = seed.strategy.parse()?;
            let pos = world.grid().check(CellPos::new(seed.x, seed.y))?;
            if !world.able_to_live(pos, strategy) {
                return Err(SimError::InvalidParams(format!(
                    "{strategy} seed at ({}, {}) cannot live on that cell",
                    seed.x, seed.y
                ))
                .into());
            }
            if world.occupant(pos).is_some() {
                return Err(SimError::InvalidParams(format!(
                    "more than one seed group on cell ({}, {})",
                    seed.x, seed.y
                ))
                .into());
            }
            let id = world.spawn(strategy, seed.size);
            world.relocate(id, Some(pos))?;
        }

        if let Some(scatter) = &self.foragers {
            let mut manager = RngManager::new(self.seed);
            let mut rng = manager.stream("setup");
            let mut cells: Vec<CellPos> = world
                .grid()
                .positions()
                .filter(|pos| {
                    world.occupant(*pos).is_none() && world.able_to_live(*pos, Strategy::Forager)
                })
                .collect();
            for _ in 0..scatter.count {
                let Some(choice) = rng.pick(cells.len()) else {
                    break;
                };
                let pos = cells.swap_remove(choice);
                let (min, max) = scatter.size_range;
                let id = world.spawn(Strategy::Forager, rng.between(min, max));
                world.relocate(id, Some(pos))?;
            }
        }

        Ok(world)
    }

    pub fn ticks(&self, override_ticks: Option<u64>) -> u64 {
        override_ticks.or(self.ticks).unwrap_or(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALLEY: &str = r#"
name: valley
seed: 3
grid:
  width: 4
  height: 3
  terrain:
    elevation: 80
    slope: 2
    aspect: 180
    hunter_capacity: 120
  patches:
    - { x: 0, y: 2, width: 4, is_water: true }
params:
  convert_prob:
    to_farmer: 0.2
seeds:
  - { strategy: farmer, x: 0, y: 0, size: 40 }
  - { strategy: hunter, x: 1, y: 0, size: 60 }
foragers:
  count: 20
"#;

    #[test]
    fn builds_terrain_and_seeds() {
        let scenario = Scenario::from_yaml(VALLEY).unwrap();
        let world = scenario.build_world().unwrap();

        assert_eq!(world.grid().cell_count(), 12);
        let water = world.grid().cell(CellPos::new(3, 2)).unwrap();
        assert!(water.terrain.is_water);
        assert_eq!(water.terrain.elevation, 80.0);
        assert_eq!(world.params().convert_prob.to_farmer, 0.2);

        let farmer = world.occupant(CellPos::new(0, 0)).unwrap();
        assert_eq!(world.group(farmer).unwrap().strategy(), Strategy::Farmer);
        // 8 dry cells, two taken by seeds
        assert_eq!(world.group_count(Strategy::Forager), 7);
        assert_eq!(scenario.ticks(None), 100);
        assert_eq!(scenario.ticks(Some(5)), 5);
    }

    #[test]
    fn unknown_seed_strategy_is_rejected() {
        let text = VALLEY.replace("strategy: farmer", "strategy: herder");
        let scenario = Scenario::from_yaml(&text).unwrap();
        let err = scenario.build_world().unwrap_err();
        assert_eq!(
            err.downcast_ref::<SimError>(),
            Some(&SimError::InvalidAgentKind("herder".into()))
        );
    }

    #[test]
    fn seeds_on_water_are_rejected() {
        let text = VALLEY.replace("x: 0, y: 0, size: 40", "x: 0, y: 2, size: 40");
        let scenario = Scenario::from_yaml(&text).unwrap();
        let err = scenario.build_world().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::InvalidParams(_))
        ));
    }

    #[test]
    fn patches_must_fit_the_grid() {
        let text = VALLEY.replace("width: 4, is_water", "width: 5, is_water");
        let scenario = Scenario::from_yaml(&text).unwrap();
        assert_eq!(
            scenario.build_grid().unwrap_err(),
            SimError::InvalidPlacement { x: 4, y: 2 }
        );
    }

    #[test]
    fn scatter_is_deterministic_per_seed() {
        let scenario = Scenario::from_yaml(VALLEY).unwrap();
        let a = scenario.build_world().unwrap();
        let b = scenario.build_world().unwrap();
        let sizes = |world: &World| {
            world
                .live_ids(Some(Strategy::Forager))
                .into_iter()
                .map(|id| {
                    let group = world.group(id).unwrap();
                    (group.cell(), group.size())
                })
                .collect::<Vec<_>>()
        };
        assert_eq!(sizes(&a), sizes(&b));
    }

    #[test]
    fn negative_hunter_capacity_is_rejected() {
        let text = VALLEY.replace("hunter_capacity: 120", "hunter_capacity: -5");
        let scenario = Scenario::from_yaml(&text).unwrap();
        assert!(matches!(
            scenario.build_grid(),
            Err(SimError::InvalidParams(_))
        ));
    }
}
