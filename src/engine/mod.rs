use anyhow::{Context, Result};
use tracing::trace;

use crate::{
    rng::{RngManager, SystemRng},
    world::{TickRecord, World},
};

pub struct EngineSettings {
    pub scenario_name: String,
    pub seed: u64,
}

pub struct EngineBuilder {
    settings: EngineSettings,
    systems: Vec<Box<dyn System>>,
}

impl EngineBuilder {
    pub fn new(settings: EngineSettings) -> Self {
        Self {
            settings,
            systems: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl System + 'static) -> Self {
        self.systems.push(Box::new(system));
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            rng: RngManager::new(self.settings.seed),
            systems: self.systems,
            settings: self.settings,
        }
    }
}

/// Runs the registered systems once per tick, in registration order. Phase
/// order is part of the model: systems never overlap and each sees the world
/// exactly as the previous one left it.
pub struct Engine {
    rng: RngManager,
    systems: Vec<Box<dyn System>>,
    settings: EngineSettings,
}

impl Engine {
    pub fn run(&mut self, world: &mut World, ticks: u64) -> Result<()> {
        self.run_with_hook(world, ticks, |_| {})
    }

    /// Like [`Engine::run`], handing the population record of every finished
    /// tick to `hook`.
    pub fn run_with_hook<F>(&mut self, world: &mut World, ticks: u64, mut hook: F) -> Result<()>
    where
        F: FnMut(&TickRecord),
    {
        for _ in 0..ticks {
            let current_tick = world.tick();
            world.reset_stats();
            for system in &mut self.systems {
                let mut rng_stream = self.rng.stream(system.name());
                let ctx = SystemContext {
                    tick: current_tick,
                    scenario_name: &self.settings.scenario_name,
                };
                trace!(tick = current_tick, system = system.name(), "running system");
                system
                    .run(&ctx, world, &mut rng_stream)
                    .with_context(|| {
                        format!("system '{}' failed at tick {}", system.name(), current_tick)
                    })?;
            }
            world.advance_time();
            hook(&world.record());
        }
        Ok(())
    }
}

pub struct SystemContext<'a> {
    pub tick: u64,
    pub scenario_name: &'a str,
}

pub trait System {
    fn name(&self) -> &str;
    fn run(
        &mut self,
        ctx: &SystemContext,
        world: &mut World,
        rng: &mut SystemRng<'_>,
    ) -> Result<()>;
}
