//! Parakeet round simulation.
//!
//! A side-scrolling obstacle game: the bird falls under gravity, a flap sets
//! its velocity upward, and pipes scroll in from the right with a gap the
//! bird must pass through. Hitting a pipe or leaving the field ends the round.

pub mod logic;
pub mod types;

pub use logic::*;
pub use types::*;
