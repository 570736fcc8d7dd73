//! Sprite assets and their asynchronous loading.
//!
//! Sprites are glyph art stored as plain text: one row per line, spaces are
//! transparent, and an optional first line `#rrggbb` sets the colour.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;

use anyhow::{ensure, Context, Result};

use crate::surface::Rgb;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Sprite {
    rows: Vec<Vec<char>>,
    width: usize,
    color: Option<Rgb>,
}

impl Sprite {
    pub fn parse(text: &str) -> Result<Self> {
        let mut lines = text.lines().peekable();
        let color = match lines.peek() {
            Some(first) if first.starts_with('#') => {
                let c = Rgb::parse_hex(first).with_context(|| format!("bad colour line {first:?}"))?;
                lines.next();
                Some(c)
            }
            _ => None,
        };
        let rows: Vec<Vec<char>> = lines.map(|l| l.trim_end().chars().collect()).collect();
        let width = rows.iter().map(Vec::len).max().unwrap_or(0);
        ensure!(width > 0, "sprite has no glyphs");
        Ok(Self { rows, width, color })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.rows.is_empty()
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn color(&self) -> Option<Rgb> {
        self.color
    }

    /// Glyph at `(col, row)`; `None` for transparent or out of range.
    pub fn glyph(&self, col: usize, row: usize) -> Option<char> {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .copied()
            .filter(|c| *c != ' ')
    }
}

#[derive(Clone, Debug)]
pub enum AssetState {
    Loading,
    Ready(Arc<Sprite>),
    Failed(String),
}

type LoadResult = (String, Result<Sprite>);

/// Registry of every asset a game declared, keyed by its path.
pub struct Assets {
    states: HashMap<String, AssetState>,
    rx: Option<mpsc::Receiver<LoadResult>>,
}

impl Assets {
    /// A registry whose entries stay `Loading` forever.
    pub fn pending<P: AsRef<str>>(paths: &[P]) -> Self {
        Self {
            states: paths
                .iter()
                .map(|p| (p.as_ref().to_string(), AssetState::Loading))
                .collect(),
            rx: None,
        }
    }

    /// Drains finished loads into the registry.
    pub fn poll(&mut self) {
        let Some(rx) = &self.rx else { return };
        let mut finished = Vec::new();
        let mut disconnected = false;
        loop {
            match rx.try_recv() {
                Ok(result) => finished.push(result),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }
        if disconnected {
            self.rx = None;
        }
        for (path, result) in finished {
            self.resolve(&path, result);
        }
    }

    pub fn resolve(&mut self, path: &str, result: Result<Sprite>) {
        let state = match result {
            Ok(sprite) => {
                tracing::info!(target: "assets", %path, "sprite loaded");
                AssetState::Ready(Arc::new(sprite))
            }
            Err(err) => {
                tracing::warn!(target: "assets", %path, error = %format!("{err:#}"), "sprite failed to load");
                AssetState::Failed(format!("{err:#}"))
            }
        };
        self.states.insert(path.to_string(), state);
    }

    pub fn state(&self, path: &str) -> Option<&AssetState> {
        self.states.get(path)
    }

    /// The sprite for `path` if it finished loading.
    pub fn ready(&self, path: &str) -> Option<&Arc<Sprite>> {
        match self.states.get(path) {
            Some(AssetState::Ready(sprite)) => Some(sprite),
            _ => None,
        }
    }

    pub fn is_settled(&self) -> bool {
        self.states
            .values()
            .all(|s| !matches!(s, AssetState::Loading))
    }
}

/// Resolves asset paths against a root directory on a background thread.
#[derive(Clone, Debug)]
pub struct AssetLoader {
    root: PathBuf,
}

impl AssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn load<P: AsRef<str>>(&self, paths: &[P]) -> Assets {
        let mut assets = Assets::pending(paths);
        let (tx, rx) = mpsc::channel();
        let root = self.root.clone();
        let owned: Vec<String> = paths.iter().map(|p| p.as_ref().to_string()).collect();

        thread::spawn(move || {
            for path in owned {
                let result = read_sprite(&root.join(&path));
                if tx.send((path, result)).is_err() {
                    return;
                }
            }
        });

        assets.rx = Some(rx);
        assets
    }
}

fn read_sprite(path: &Path) -> Result<Sprite> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Sprite::parse(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, Instant};

    #[test]
    fn parse_reads_colour_and_rows() {
        let sprite = Sprite::parse("#ffffff\n /\\\n/__\\\n").unwrap();
        assert_eq!(sprite.color(), Some(Rgb::WHITE));
        assert_eq!(sprite.width(), 4);
        assert_eq!(sprite.height(), 2);
        assert_eq!(sprite.glyph(0, 0), None);
        assert_eq!(sprite.glyph(1, 0), Some('/'));
    }

    #[test]
    fn parse_rejects_blank_art() {
        assert!(Sprite::parse("").is_err());
        assert!(Sprite::parse("#00ff00\n   \n").is_err());
    }

    #[test]
    fn pending_assets_never_resolve() {
        let mut assets = Assets::pending(&["a.txt"]);
        assets.poll();
        assert!(matches!(assets.state("a.txt"), Some(AssetState::Loading)));
        assert!(assets.ready("a.txt").is_none());
    }

    #[test]
    fn missing_files_end_up_failed() {
        let loader = AssetLoader::new("/definitely/not/here");
        let mut assets = loader.load(&["ghost.txt"]);
        let deadline = Instant::now() + Duration::from_secs(5);
        while !assets.is_settled() && Instant::now() < deadline {
            assets.poll();
            thread::sleep(Duration::from_millis(5));
        }
        assert!(matches!(assets.state("ghost.txt"), Some(AssetState::Failed(_))));
    }
}
