#![doc = "Common types shared across the sqrtbench workspace."]

pub mod config;
pub mod error;
pub mod state;
pub mod ticks;

pub use config::*;
pub use error::*;
pub use state::*;
pub use ticks::*;
