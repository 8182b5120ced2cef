#![warn(clippy::all, clippy::pedantic, clippy::nursery)]

pub mod config;
pub mod dungeon;
pub mod error;

pub use config::DungeonConfig;
pub use dungeon::{Dungeon, Origin, Stage, Vector};
pub use error::{DungeonError, Result};
