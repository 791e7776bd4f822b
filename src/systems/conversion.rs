use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    group::Strategy,
    rng::SystemRng,
    rules,
    world::World,
};

use super::{roster, still_active};

pub struct ConversionSystem;

impl ConversionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ConversionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for ConversionSystem {
    fn name(&self) -> &str {
        "conversion"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for id in roster(world, Some(Strategy::Forager)) {
            if still_active(world, id) {
                rules::convert(world, id, rng)?;
            }
        }
        Ok(())
    }
}
