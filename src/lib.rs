//! Library exports for physbox.
//!
//! Exposes the tool dispatcher, the physics world and the configuration types
//! so that other hosts (and the integration tests) can drive a session
//! without going through the CLI.

pub mod backend;
pub mod config;
pub mod draw;
pub mod game;
pub mod input;
pub mod util;
pub mod world;

pub use config::Config;
pub use game::{Game, GameSettings};
pub use world::{RapierWorld, World};
