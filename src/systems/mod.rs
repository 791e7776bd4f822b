//! Tick phases. Register them with the engine in this order: immigration,
//! growth, conversion, diffusion, movement, bookkeeping.

mod bookkeeping;
mod conversion;
mod diffusion;
mod immigration;
mod movement;
mod population;

pub use bookkeeping::BookkeepingSystem;
pub use conversion::ConversionSystem;
pub use diffusion::DiffusionSystem;
pub use immigration::{ImmigrationRule, ImmigrationSystem};
pub use movement::MovementSystem;
pub use population::GrowthSystem;

use crate::group::{GroupId, Strategy};
use crate::world::World;

/// Groups a phase will visit: live and placed at the start of the phase, in
/// id order.
fn roster(world: &World, strategy: Option<Strategy>) -> Vec<GroupId> {
    world
        .live_ids(strategy)
        .into_iter()
        .filter(|id| still_active(world, *id))
        .collect()
}

/// Groups can die or leave the grid while a phase is running.
fn still_active(world: &World, id: GroupId) -> bool {
    world
        .group(id)
        .is_some_and(|group| group.is_alive() && group.is_placed())
}
