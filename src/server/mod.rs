//! Backend service for Parakeet: score persistence, the leaderboard,
//! accounts with bearer tokens, and a small post feed and chat.
//!
//! Routing and storage are plain synchronous code so they can be exercised
//! without sockets. The TCP listener needs the `server` feature:
//!
//! ```sh
//! cargo build --features server
//! ./target/debug/parakeet serve        # PORT or 3000
//! ./target/debug/parakeet serve=8080   # Custom port
//! ```
//!
//! Then open http://localhost:3000 for the leaderboard page.

pub mod api;
pub mod auth;
pub mod error;
pub mod http;
pub mod store;

#[cfg(feature = "server")]
mod listener;

pub use error::ApiError;
pub use store::Store;

#[cfg(feature = "server")]
pub use listener::{serve, start_server, SharedStore};
