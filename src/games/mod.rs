pub mod bong;
pub mod stank;

use anyhow::Result;

use crate::config::ArcadeConfig;
use crate::engine::Simulation;

pub use bong::BongGame;
pub use stank::StankGame;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameKind {
    Stank,
    Bong,
}

impl GameKind {
    pub fn all() -> &'static [GameKind] {
        &[GameKind::Stank, GameKind::Bong]
    }

    pub fn title(&self) -> &'static str {
        match self {
            GameKind::Stank => "Stank",
            GameKind::Bong => "Bong",
        }
    }

    pub fn index(&self) -> usize {
        match self {
            GameKind::Stank => 0,
            GameKind::Bong => 1,
        }
    }

    /// Builds a fresh simulation for one session.
    pub fn build(&self, config: &ArcadeConfig) -> Result<Box<dyn Simulation>> {
        let (w, h) = (config.surface.width, config.surface.height);
        Ok(match self {
            GameKind::Stank => Box::new(StankGame::new(config.stank.clone(), w, h)?),
            GameKind::Bong => Box::new(BongGame::new(config.bong.clone(), w, h)?),
        })
    }
}
