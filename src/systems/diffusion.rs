use anyhow::Result;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    rules,
    world::World,
};

use super::{roster, still_active};

/// Splits every group at its size bound. Offshoots created here are not
/// visited again until the next phase.
pub struct DiffusionSystem;

impl DiffusionSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for DiffusionSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for DiffusionSystem {
    fn name(&self) -> &str {
        "diffusion"
    }

    fn run(
        &mut self,
        _ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        for id in roster(world, None) {
            if still_active(world, id) {
                rules::diffuse(world, id, rng)?;
            }
        }
        Ok(())
    }
}
