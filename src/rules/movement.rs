//! Placement, forager movement and diffusion of over-capacity groups.

use tracing::debug;

use crate::error::SimResult;
use crate::grid::{Adjacency, CellPos};
use crate::group::{GroupId, Strategy};
use crate::rng::RandomSource;
use crate::rules::competition;
use crate::world::World;

/// Puts the group on `target`, or takes it off the grid for `None`. Landing on
/// an occupied cell starts a competition with the arriving group as initiator;
/// its consequences are applied before this returns.
pub fn place_on<R>(
    world: &mut World,
    id: GroupId,
    target: Option<CellPos>,
    rng: &mut R,
) -> SimResult<()>
where
    R: RandomSource + ?Sized,
{
    place(world, id, target, rng, 0)
}

fn place<R>(
    world: &mut World,
    id: GroupId,
    target: Option<CellPos>,
    rng: &mut R,
    depth: u32,
) -> SimResult<()>
where
    R: RandomSource + ?Sized,
{
    if let Some(incumbent) = world.relocate(id, target)? {
        competition::resolve(world, id, incumbent, rng, depth)?;
    }
    Ok(())
}

/// Cells around `origin` a group of `strategy` may move or diffuse into.
///
/// Foragers avoid cells held by other foragers but will walk onto farmland,
/// which leads to a fight. Farming groups only take empty land they can
/// cultivate.
pub fn candidate_cells(
    world: &World,
    strategy: Strategy,
    origin: CellPos,
    radius: u32,
) -> Vec<CellPos> {
    world
        .grid()
        .neighbors(origin, radius, Adjacency::VonNeumann)
        .into_iter()
        .filter(|pos| world.able_to_live(*pos, strategy))
        .filter(|pos| match (strategy, world.occupant(*pos)) {
            (_, None) => true,
            (Strategy::Forager, Some(other)) => world
                .group(other)
                .is_some_and(|group| group.strategy() != Strategy::Forager),
            (Strategy::Farmer | Strategy::RiceFarmer, Some(_)) => false,
        })
        .collect()
}

/// One movement action. Only placed, non-complex foragers move; returns
/// whether the group left its cell.
pub fn move_group<R>(world: &mut World, id: GroupId, rng: &mut R) -> SimResult<bool>
where
    R: RandomSource + ?Sized,
{
    step(world, id, rng, 0)
}

/// Movement forced by a lost competition, `depth` levels into a chain of
/// contests.
pub(crate) fn retreat<R>(world: &mut World, id: GroupId, rng: &mut R, depth: u32) -> SimResult<bool>
where
    R: RandomSource + ?Sized,
{
    step(world, id, rng, depth)
}

fn step<R>(world: &mut World, id: GroupId, rng: &mut R, depth: u32) -> SimResult<bool>
where
    R: RandomSource + ?Sized,
{
    let group = world.live_group(id)?;
    if group.strategy() != Strategy::Forager || world.is_complex(id) {
        return Ok(false);
    }
    let Some(origin) = group.cell() else {
        return Ok(false);
    };
    let candidates = candidate_cells(world, Strategy::Forager, origin, world.params().move_radius);
    let Some(choice) = rng.pick(candidates.len()) else {
        return Ok(false);
    };
    let target = candidates[choice];
    world.stats.moves += 1;
    place(world, id, Some(target), rng, depth)?;
    Ok(true)
}

/// Splits an offshoot off a group at or above its size bound. The split is
/// drawn from `diffusion_range` and placed on a neighbouring cell chosen like a
/// move, capped so the parent keeps at least its minimum size. Returns the
/// offshoot, or `None` when the group is below its bound, unplaced, has
/// nothing to spare, or has nowhere to send it.
pub fn diffuse<R>(world: &mut World, id: GroupId, rng: &mut R) -> SimResult<Option<GroupId>>
where
    R: RandomSource + ?Sized,
{
    let group = world.live_group(id)?;
    let (strategy, size) = (group.strategy(), group.size());
    let Some(origin) = group.cell() else {
        return Ok(None);
    };
    let lower = world.params().strategy(strategy).min_size;
    if size < world.upper_bound(id)?.max(lower) {
        return Ok(None);
    }

    // the parent never drops below its minimum, so neither side is padded
    let (min, max) = world.params().diffusion_range;
    let split = rng.between(min, max).min(size - lower);
    if split <= 0.0 {
        return Ok(None);
    }
    let candidates = candidate_cells(world, strategy, origin, world.params().move_radius);
    let Some(choice) = rng.pick(candidates.len()) else {
        return Ok(None);
    };
    let target = candidates[choice];

    world.set_size(id, size - split)?;
    let offshoot = world.spawn(strategy, split);
    world.stats.diffusions += 1;
    debug!(parent = %id, %offshoot, split, ?target, "group diffused");
    place(world, offshoot, Some(target), rng, 0)?;
    Ok(Some(offshoot))
}
