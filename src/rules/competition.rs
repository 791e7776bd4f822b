//! Who keeps a contested cell, and what the loser pays.

use tracing::debug;

use crate::error::SimResult;
use crate::group::{Group, GroupId, Strategy};
use crate::params::Params;
use crate::rng::RandomSource;
use crate::rules::movement;
use crate::world::World;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    InitiatorWins,
    IncumbentWins,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Penalty {
    /// The loser is removed from the simulation.
    Eliminated,
    /// The loser shrinks to `size` (before clamping) and retreats.
    Reduced { size: f64 },
}

/// Strength a group brings to a fight. Foragers defending or taking land from
/// agriculturalists fight with the intensification bonus; every other pairing
/// compares plain sizes.
pub fn effective_power(group: &Group, opponent: Strategy, params: &Params) -> f64 {
    match group.strategy() {
        Strategy::Forager if opponent.is_agricultural() => {
            group.size() * params.intensification_coefficient
        }
        Strategy::Forager | Strategy::Farmer | Strategy::RiceFarmer => group.size(),
    }
}

/// Ties go to the initiator.
pub fn contest(initiator: &Group, incumbent: &Group, params: &Params) -> Verdict {
    let attack = effective_power(initiator, incumbent.strategy(), params);
    let defence = effective_power(incumbent, initiator.strategy(), params);
    if attack >= defence {
        Verdict::InitiatorWins
    } else {
        Verdict::IncumbentWins
    }
}

pub fn penalty(loser: &Group, params: &Params) -> Penalty {
    match loser.strategy() {
        Strategy::Farmer | Strategy::RiceFarmer => Penalty::Eliminated,
        Strategy::Forager if loser.is_complex(params) => Penalty::Eliminated,
        Strategy::Forager => Penalty::Reduced {
            size: loser.size() * params.loss_rate,
        },
    }
}

/// Resolves a contest started by `initiator` against `incumbent` and applies
/// the penalty to whichever side lost. Returns whether the initiator won.
pub fn compete<R>(
    world: &mut World,
    initiator: GroupId,
    incumbent: GroupId,
    rng: &mut R,
) -> SimResult<bool>
where
    R: RandomSource + ?Sized,
{
    resolve(world, initiator, incumbent, rng, 0)
}

pub(crate) fn resolve<R>(
    world: &mut World,
    initiator: GroupId,
    incumbent: GroupId,
    rng: &mut R,
    depth: u32,
) -> SimResult<bool>
where
    R: RandomSource + ?Sized,
{
    let verdict = contest(
        world.live_group(initiator)?,
        world.live_group(incumbent)?,
        world.params(),
    );
    world.stats.competitions += 1;
    let (winner, loser) = match verdict {
        Verdict::InitiatorWins => (initiator, incumbent),
        Verdict::IncumbentWins => (incumbent, initiator),
    };
    debug!(%initiator, %incumbent, %winner, depth, "competition resolved");
    suffer_defeat(world, loser, rng, depth)?;
    Ok(verdict == Verdict::InitiatorWins)
}

fn suffer_defeat<R>(world: &mut World, loser: GroupId, rng: &mut R, depth: u32) -> SimResult<()>
where
    R: RandomSource + ?Sized,
{
    match penalty(world.live_group(loser)?, world.params()) {
        Penalty::Eliminated => world.die(loser),
        Penalty::Reduced { size } => {
            world.set_size(loser, size)?;
            if depth < world.params().max_retreat_depth {
                movement::retreat(world, loser, rng, depth + 1)?;
            }
            // a loser with nowhere to go leaves the grid but survives
            let stranded = world
                .group(loser)
                .filter(|group| group.is_alive())
                .and_then(|group| group.cell())
                .is_some_and(|pos| !world.rivals(pos, loser).is_empty());
            if stranded {
                debug!(%loser, "defeated forager found no refuge");
                world.relocate(loser, None)?;
            }
        }
    }
    Ok(())
}
