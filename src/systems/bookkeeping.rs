use anyhow::Result;
use tracing::info;

use crate::{
    engine::{System, SystemContext},
    rng::SystemRng,
    world::{TickRecord, World},
};

/// Appends the finished tick's population totals to the world history.
pub struct BookkeepingSystem;

impl BookkeepingSystem {
    pub fn new() -> Self {
        Self
    }
}

impl Default for BookkeepingSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl System for BookkeepingSystem {
    fn name(&self) -> &str {
        "bookkeeping"
    }

    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        _rng: &mut SystemRng<'_>,
    ) -> Result<()> {
        let record = TickRecord {
            tick: ctx.tick + 1,
            ..world.record()
        };
        info!(
            scenario = ctx.scenario_name,
            tick = record.tick,
            foragers = record.forager_population,
            farmers = record.farmer_population,
            rice_farmers = record.rice_farmer_population,
            new_farmers = record.stats.new_farmers,
            conversions = record.stats.conversions_to_farmer + record.stats.conversions_to_rice,
            deaths = record.stats.deaths,
            "tick complete"
        );
        world.history.push(record);
        Ok(())
    }
}
