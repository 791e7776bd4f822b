use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::World,
};

use super::{roster, still_active};

/// Applies each strategy's growth rate to every placed group.
pub struct GrowthSystem;

impl GrowthSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GrowthSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for GrowthSystem {
    fn name(&self) -> &str {
        "growth"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for id in roster(world, None) {
            if !still_active(world, id) {
                continue;
            }
            let strategy = world.live_group(id)?.strategy();
            let rate = world.params().strategy(strategy).growth_rate;
            world.population_growth(id, rate)?;
        }
        Ok(())
    }
}
