//! Parakeet - a flap-through-the-pipes game with a small score backend.
//!
//! The simulation in [`game`] is deterministic given its RNG and has no I/O;
//! the terminal client and the JSON backend are built around it.

pub mod config;
pub mod constants;
pub mod game;
pub mod highscore;
pub mod server;
pub mod ui;
pub mod utils;

pub use game::{ParakeetGame, ParakeetInput, TickEvent, TickResult};
