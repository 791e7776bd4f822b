pub mod engine;
pub mod error;
pub mod grid;
pub mod group;
pub mod params;
pub mod rng;
pub mod rules;
pub mod scenario;
pub mod systems;
pub mod world;

pub use engine::{Engine, EngineBuilder, EngineSettings};
pub use error::{SimError, SimResult};
pub use group::{GroupId, Strategy};
pub use scenario::{Scenario, ScenarioLoader};
pub use world::{TickRecord, World};
