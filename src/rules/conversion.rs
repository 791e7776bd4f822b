//! Foragers taking up farming from their neighbours.

use tracing::debug;

use crate::error::SimResult;
use crate::grid::CellPos;
use crate::group::{GroupId, Strategy};
use crate::params::Params;
use crate::rng::RandomSource;
use crate::world::World;

/// What a forager can see from its cell when deciding to convert.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Surroundings {
    pub farmer_nearby: bool,
    pub rice_farmer_nearby: bool,
    pub arable: bool,
    pub rice_arable: bool,
}

impl Surroundings {
    pub fn survey(world: &World, pos: CellPos) -> Self {
        let hood = world.params().neighborhood;
        Self {
            farmer_nearby: world.has_neighbor(pos, Strategy::Farmer, hood),
            rice_farmer_nearby: world.has_neighbor(pos, Strategy::RiceFarmer, hood),
            arable: world.is_arable(pos),
            rice_arable: world.is_rice_arable(pos),
        }
    }
}

/// Decides the strategy a group switches to, if any. Farming is tried before
/// rice farming and each path takes its own draw, whether or not its other
/// conditions hold.
pub fn evaluate<R>(
    strategy: Strategy,
    surroundings: Surroundings,
    params: &Params,
    rng: &mut R,
) -> Option<Strategy>
where
    R: RandomSource + ?Sized,
{
    match strategy {
        Strategy::Forager => {
            let lucky = rng.unit() < params.convert_prob.to_farmer;
            if surroundings.farmer_nearby && surroundings.arable && lucky {
                return Some(Strategy::Farmer);
            }
            let lucky = rng.unit() < params.convert_prob.to_rice;
            if surroundings.rice_farmer_nearby && surroundings.rice_arable && lucky {
                return Some(Strategy::RiceFarmer);
            }
            None
        }
        Strategy::Farmer | Strategy::RiceFarmer => None,
    }
}

/// Runs the conversion check for one group. Returns the id of the group now
/// standing on the cell: a new entity when the group converted, otherwise
/// `id` itself.
pub fn convert<R>(world: &mut World, id: GroupId, rng: &mut R) -> SimResult<GroupId>
where
    R: RandomSource + ?Sized,
{
    let group = world.live_group(id)?;
    let strategy = group.strategy();
    let Some(pos) = group.cell() else {
        return Ok(id);
    };
    if strategy != Strategy::Forager {
        return Ok(id);
    }
    let surroundings = Surroundings::survey(world, pos);
    let Some(target) = evaluate(strategy, surroundings, world.params(), rng) else {
        return Ok(id);
    };

    let converted = world.convert_occupant(id, target)?;
    match target {
        Strategy::Farmer => world.stats.conversions_to_farmer += 1,
        Strategy::RiceFarmer => world.stats.conversions_to_rice += 1,
        Strategy::Forager => {}
    }
    debug!(from = %id, to = %converted, %target, ?pos, "forager converted");
    Ok(converted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Grid, Terrain};
    use crate::params::ConvertProb;
    use crate::rng::scripted::Scripted;

    fn params(to_farmer: f64, to_rice: f64) -> Params {
        Params {
            convert_prob: ConvertProb { to_farmer, to_rice },
            ..Params::default()
        }
    }

    fn terrain(elevation: f64) -> Terrain {
        Terrain {
            elevation,
            slope: 5.0,
            aspect: 100.0,
            is_water: false,
            hunter_capacity: 100.0,
        }
    }

    /// A 4x4 board with a forager at (3, 3) and a farmer next door at (3, 2).
    fn board(params: Params, elevation: f64) -> (World, GroupId) {
        let mut world = World::new(Grid::new(4, 4, terrain(elevation)), params).unwrap();
        let farmer = world.spawn(Strategy::Farmer, 30.0);
        world.relocate(farmer, Some(CellPos::new(3, 2))).unwrap();
        let forager = world.spawn(Strategy::Forager, 50.0);
        world.relocate(forager, Some(CellPos::new(3, 3))).unwrap();
        (world, forager)
    }

    #[test]
    fn converts_to_farmer_below_probability() {
        let (mut world, forager) = board(params(0.5, 0.0), 100.0);
        let mut rng = Scripted::new(&[0.4]);

        let converted = convert(&mut world, forager, &mut rng).unwrap();

        assert_ne!(converted, forager);
        let group = world.group(converted).unwrap();
        assert_eq!(group.strategy(), Strategy::Farmer);
        assert_eq!(group.size(), 50.0);
        assert_eq!(group.cell(), Some(CellPos::new(3, 3)));
        assert!(!world.is_alive(forager));
        assert_eq!(rng.taken, 1, "rice path is never evaluated");
        assert_eq!(world.stats().conversions_to_farmer, 1);
    }

    #[test]
    fn failed_draw_stays_forager_and_tries_rice() {
        let (mut world, forager) = board(params(0.5, 0.0), 100.0);
        let mut rng = Scripted::new(&[0.6, 0.0]);

        let result = convert(&mut world, forager, &mut rng).unwrap();

        assert_eq!(result, forager);
        assert_eq!(world.group(forager).unwrap().strategy(), Strategy::Forager);
        assert_eq!(rng.taken, 2);
    }

    #[test]
    fn non_arable_land_blocks_conversion() {
        let (mut world, forager) = board(params(0.1, 0.0), 300.0);
        let result = convert(&mut world, forager, &mut Scripted::new(&[0.05])).unwrap();
        assert_eq!(result, forager);
        assert_eq!(world.group(forager).unwrap().size(), 50.0);
    }

    #[test]
    fn rice_path_needs_a_rice_neighbour() {
        let surroundings = Surroundings {
            farmer_nearby: false,
            rice_farmer_nearby: true,
            arable: true,
            rice_arable: true,
        };
        let params = params(1.0, 0.5);
        let mut rng = Scripted::new(&[0.0, 0.3]);
        assert_eq!(
            evaluate(Strategy::Forager, surroundings, &params, &mut rng),
            Some(Strategy::RiceFarmer)
        );

        let lonely = Surroundings {
            rice_farmer_nearby: false,
            ..surroundings
        };
        let mut rng = Scripted::new(&[0.0, 0.0]);
        assert_eq!(evaluate(Strategy::Forager, lonely, &params, &mut rng), None);
    }

    #[test]
    fn missing_probability_never_converts() {
        let surroundings = Surroundings {
            farmer_nearby: true,
            rice_farmer_nearby: true,
            arable: true,
            rice_arable: true,
        };
        let mut rng = Scripted::constant(0.0);
        assert_eq!(
            evaluate(Strategy::Forager, surroundings, &Params::default(), &mut rng),
            None
        );
    }

    #[test]
    fn farmers_do_not_convert() {
        let surroundings = Surroundings {
            farmer_nearby: true,
            arable: true,
            ..Surroundings::default()
        };
        let mut rng = Scripted::constant(0.0);
        assert_eq!(
            evaluate(Strategy::Farmer, surroundings, &params(1.0, 1.0), &mut rng),
            None
        );
        assert_eq!(rng.taken, 0);
    }
}
