use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    group::Strategy,
    rng::SystemRng,
    rules,
    world::World,
};

use super::{roster, still_active};

pub struct MovementSystem;

impl MovementSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for MovementSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for MovementSystem {
    fn name(&self) -> &str {
        "movement"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for id in roster(world, Some(Strategy::Forager)) {
            if still_active(world, id) {
                rules::move_group(world, id, rng)?;
            }
        }
        Ok(())
    }
}
