use anyhow::Result;
use serde::Deserialize;
use tracing::debug;

use crate::{
    engine::{System, SystemContext},
    grid::CellPos,
    group::Strategy,
    rng::{RandomSource, SystemRng},
    world::World,
};

fn default_immigrant_size() -> (f64, f64) {
    (20.0, 50.0)
}

/// Groups arriving from outside the map every tick.
#[derive(Debug, Clone, Deserialize)]
pub struct ImmigrationRule {
    pub strategy: Strategy,
    pub per_tick: u32,
    #[serde(default = "default_immigrant_size")]
    pub size_range: (f64, f64),
}

/// Settles newcomers on random empty cells they can live on. A tick with no
/// suitable land simply receives fewer groups.
pub struct ImmigrationSystem {
    rules: Vec<ImmigrationRule>,
}

impl ImmigrationSystem {
    pub fn new(rules: Vec<ImmigrationRule>) -> Self {
        Self { rules }
    }
}

impl Default for ImmigrationSystem {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

fn vacant_cells(world: &World, strategy: Strategy) -> Vec<CellPos> {
    world
        .grid()
        .positions()
        .filter(|pos| world.occupant(*pos).is_none() && world.able_to_live(*pos, strategy))
        .collect()
}

impl System for ImmigrationSystem {
    fn name(&self) -> &str {
        "immigration"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for rule in &self.rules {
            let mut cells = vacant_cells(world, rule.strategy);
            for _ in 0..rule.per_tick {
                let Some(choice) = rng.pick(cells.len()) else {
                    break;
                };
                let pos = cells.swap_remove(choice);
                let (min, max) = rule.size_range;
                let size = rng.between(min, max);
                let id = world.spawn(rule.strategy, size);
                world.relocate(id, Some(pos))?;
                match rule.strategy {
                    Strategy::Farmer => world.stats.new_farmers += 1,
                    Strategy::RiceFarmer => world.stats.new_rice_farmers += 1,
                    Strategy::Forager => {}
                }
                debug!(group = %id, strategy = %rule.strategy, ?pos, size, "immigrants settled");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::{EngineBuilder, EngineSettings};
    use crate::grid::{Grid, Terrain};
    use crate::params::Params;

    #[test]
    fn immigrants_fill_free_arable_cells_only() {
        let mut world =
            World::new(Grid::new(2, 1, Terrain::default()), Params::default()).unwrap();
        let resident = world.spawn(Strategy::Forager, 50.0);
        world.relocate(resident, Some(CellPos::new(0, 0))).unwrap();

        let rule = ImmigrationRule {
            strategy: Strategy::Farmer,
            per_tick: 3,
            size_range: (30.0, 30.0),
        };
        let mut engine = EngineBuilder::new(EngineSettings {
            scenario_name: "immigration".into(),
            seed: 9,
        })
        .with_system(ImmigrationSystem::new(vec![rule]))
        .build();

        engine.run(&mut world, 1).unwrap();

        let farmers = world.live_ids(Some(Strategy::Farmer));
        assert_eq!(farmers.len(), 1);
        let farmer = world.group(farmers[0]).unwrap();
        assert_eq!(farmer.cell(), Some(CellPos::new(1, 0)));
        assert_eq!(farmer.size(), 30.0);
        assert_eq!(world.record().stats.new_farmers, 1);
    }
}
