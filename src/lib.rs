pub mod assets;
pub mod config;
pub mod engine;
pub mod games;
pub mod geom;
pub mod input;
pub mod surface;

pub use engine::{Control, Engine, GameState, Simulation};
