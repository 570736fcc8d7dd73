use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

pub const CONFIG_ENV: &str = "STANKADE_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "stankade.ron";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ArcadeConfig {
    pub surface: SurfaceConfig,
    pub frame_interval_ms: u64,
    pub asset_root: PathBuf,
    pub log_file: PathBuf,
    pub stank: StankConfig,
    pub bong: BongConfig,
}

impl Default for ArcadeConfig {
    fn default() -> Self {
        Self {
            surface: SurfaceConfig::default(),
            frame_interval_ms: 16,
            asset_root: PathBuf::from("assets"),
            log_file: PathBuf::from("stankade.log"),
            stank: StankConfig::default(),
            bong: BongConfig::default(),
        }
    }
}

impl ArcadeConfig {
    /// Loads `$STANKADE_CONFIG`, falling back to `stankade.ron`.
    /// A missing file yields the defaults.
    pub fn load() -> Result<Self> {
        let path = env::var_os(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn parse(text: &str) -> Result<Self> {
        Ok(ron::from_str(text)?)
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct SurfaceConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for SurfaceConfig {
    fn default() -> Self {
        Self {
            width: 600,
            height: 400,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StankConfig {
    pub grid_size: u32,
    pub move_interval_ms: f64,
    /// Collision radius around each trail segment, in cells.
    pub stink_radius: f32,
    pub foods: Vec<FoodKind>,
}

impl Default for StankConfig {
    fn default() -> Self {
        Self {
            grid_size: 20,
            move_interval_ms: 150.0,
            stink_radius: 0.8,
            foods: vec![
                FoodKind::new("Doobie", 50, 10),
                FoodKind::new("Blunt", 50, 15),
                FoodKind::new("Bong", 40, 20),
                FoodKind::new("Rig", 40, 25),
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FoodKind {
    pub name: String,
    pub rarity: u32,
    pub points: u32,
}

impl FoodKind {
    pub fn new(name: &str, rarity: u32, points: u32) -> Self {
        Self {
            name: name.to_string(),
            rarity,
            points,
        }
    }

    pub fn sprite_path(&self) -> String {
        format!("food/{}_{}.txt", self.name, self.rarity)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BongConfig {
    pub paddle_width: f32,
    pub paddle_height: f32,
    pub ball_size: f32,
    pub paddle_speed: f32,
    pub initial_ball_speed: f32,
    pub ball_speed_increment: f32,
    pub winning_score: u32,
}

impl Default for BongConfig {
    fn default() -> Self {
        Self {
            paddle_width: 20.0,
            paddle_height: 100.0,
            ball_size: 30.0,
            paddle_speed: 8.0,
            initial_ball_speed: 5.0,
            ball_speed_increment: 0.2,
            winning_score: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let cfg = ArcadeConfig::parse("(frame_interval_ms: 33, bong: (winning_score: 3))").unwrap();
        assert_eq!(cfg.frame_interval_ms, 33);
        assert_eq!(cfg.bong.winning_score, 3);
        assert_eq!(cfg.bong.paddle_height, 100.0);
        assert_eq!(cfg.surface.width, 600);
        assert_eq!(cfg.stank.foods.len(), 4);
    }

    #[test]
    fn food_table_override() {
        let cfg = ArcadeConfig::parse(
            r#"(stank: (foods: [(name: "Seed", rarity: 1, points: 99)]))"#,
        )
        .unwrap();
        assert_eq!(cfg.stank.foods, vec![FoodKind::new("Seed", 1, 99)]);
        assert_eq!(cfg.stank.foods[0].sprite_path(), "food/Seed_1.txt");
    }

    #[test]
    fn malformed_config_is_an_error() {
        assert!(ArcadeConfig::parse("(frame_interval_ms: \"fast\")").is_err());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let cfg = ArcadeConfig::load_from(Path::new("/no/such/stankade.ron")).unwrap();
        assert_eq!(cfg.stank.grid_size, 20);
    }
}
