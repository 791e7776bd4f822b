//! Decision rules applied to individual groups: competition over cells,
//! strategy conversion, movement and diffusion.

pub mod competition;
pub mod conversion;
pub mod movement;

pub use competition::{compete, Penalty, Verdict};
pub use conversion::{convert, Surroundings};
pub use movement::{diffuse, move_group, place_on};
