use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, PI};

use anyhow::{Context, Result};
use crossterm::event::KeyCode;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::Assets;
use crate::config::{FoodKind, StankConfig};
use crate::engine::{Control, GameState, Simulation};
use crate::geom::{Cell, Rect, Vec2};
use crate::surface::{Align, Rgb, Surface, TextSize};

const SKUNK_SPRITE: &str = "skunk.txt";
const SKUNK_SCALE: f32 = 2.4;
const FOOD_SCALE: f32 = 1.5;
const STINK_COLOR: Rgb = Rgb(144, 238, 144);
const FOOD_FALLBACK: Rgb = Rgb(139, 69, 19);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Heading {
    Up,
    Down,
    Left,
    Right,
}

impl Heading {
    pub fn opposite(self) -> Heading {
        match self {
            Heading::Up => Heading::Down,
            Heading::Down => Heading::Up,
            Heading::Left => Heading::Right,
            Heading::Right => Heading::Left,
        }
    }

    fn step(self) -> Cell {
        match self {
            Heading::Up => Cell::new(0, -1),
            Heading::Down => Cell::new(0, 1),
            Heading::Left => Cell::new(-1, 0),
            Heading::Right => Cell::new(1, 0),
        }
    }

    fn rotation(self) -> f32 {
        match self {
            Heading::Up => -FRAC_PI_2,
            Heading::Down => FRAC_PI_2,
            Heading::Left => PI,
            Heading::Right => 0.0,
        }
    }
}

/// Snake variant: a skunk leaves a stink trail that grows with every snack.
pub struct StankGame {
    config: StankConfig,
    foods: WeightedIndex<u32>,
    rng: StdRng,
    width: u32,
    height: u32,
    cols: i32,
    rows: i32,
    skunk: Cell,
    food: Cell,
    food_kind: usize,
    heading: Heading,
    next_heading: Heading,
    score: u32,
    since_last_move: f64,
    trail: VecDeque<Cell>,
    trail_len: usize,
    eaten: u32,
    state: GameState,
}

impl StankGame {
    pub fn new(config: StankConfig, width: u32, height: u32) -> Result<Self> {
        Self::with_rng(config, width, height, StdRng::from_entropy())
    }

    pub fn with_seed(config: StankConfig, width: u32, height: u32, seed: u64) -> Result<Self> {
        Self::with_rng(config, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: StankConfig, width: u32, height: u32, rng: StdRng) -> Result<Self> {
        let foods = WeightedIndex::new(config.foods.iter().map(|f| f.rarity))
            .context("food rarity table needs at least one positive weight")?;
        let grid = config.grid_size.max(1);
        let cols = (width / grid) as i32;
        let rows = (height / grid) as i32;
        anyhow::ensure!(
            cols > 0 && rows > 0 && cols * rows >= 2,
            "a {width}x{height} surface needs room for the skunk and its food at {grid} units per cell"
        );

        let mut game = Self {
            foods,
            rng,
            width,
            height,
            cols,
            rows,
            skunk: Cell::default(),
            food: Cell::default(),
            food_kind: 0,
            heading: Heading::Right,
            next_heading: Heading::Right,
            score: 0,
            since_last_move: 0.0,
            trail: VecDeque::new(),
            trail_len: 1,
            eaten: 0,
            state: GameState::Running,
            config,
        };
        game.initialize();
        Ok(game)
    }

    fn initialize(&mut self) {
        let grid = self.config.grid_size.max(1);
        self.skunk = Cell::new(
            (self.width / (4 * grid)) as i32,
            (self.height / (2 * grid)) as i32,
        );
        self.spawn_food();
        self.heading = Heading::Right;
        self.next_heading = Heading::Right;
        self.score = 0;
        self.since_last_move = 0.0;
        self.trail.clear();
        self.trail_len = 1;
        self.eaten = 0;
        self.state = GameState::Running;
    }

    /// Buffers a turn; it takes effect on the next move. Turning back onto
    /// the current heading is refused.
    pub fn steer(&mut self, heading: Heading) {
        if heading != self.heading.opposite() {
            self.next_heading = heading;
        }
    }

    fn spawn_food(&mut self) {
        loop {
            let candidate = Cell::new(self.rng.gen_range(0..self.cols), self.rng.gen_range(0..self.rows));
            if candidate != self.skunk {
                self.food = candidate;
                break;
            }
        }
        self.food_kind = self.foods.sample(&mut self.rng);
    }

    fn collides(&self, pos: Cell) -> bool {
        if pos.x < 0 || pos.x >= self.cols || pos.y < 0 || pos.y >= self.rows {
            return true;
        }
        self.trail
            .iter()
            .any(|segment| pos.distance(*segment) < self.config.stink_radius)
    }

    fn advance(&mut self) {
        self.heading = self.next_heading;
        let next = self.skunk + self.heading.step();

        if self.collides(next) {
            tracing::debug!(target: "stank", score = self.score, x = next.x, y = next.y, "skunk crashed");
            self.state = GameState::GameOver;
            return;
        }

        self.trail.push_front(self.skunk);
        self.trail.truncate(self.trail_len);
        self.skunk = next;

        if next == self.food {
            self.score += self.current_food().points;
            self.trail_len += 1;
            self.eaten += 1;
            self.spawn_food();
        }
    }

    pub fn current_food(&self) -> &FoodKind {
        &self.config.foods[self.food_kind]
    }

    pub fn skunk(&self) -> Cell {
        self.skunk
    }

    pub fn food(&self) -> Cell {
        self.food
    }

    pub fn heading(&self) -> Heading {
        self.heading
    }

    pub fn trail(&self) -> &VecDeque<Cell> {
        &self.trail
    }

    pub fn trail_len(&self) -> usize {
        self.trail_len
    }

    pub fn eaten(&self) -> u32 {
        self.eaten
    }

    pub fn grid(&self) -> (i32, i32) {
        (self.cols, self.rows)
    }

    fn cell_rect(&self, cell: Cell, scale: f32) -> Rect {
        let g = self.config.grid_size as f32;
        let size = g * scale;
        let offset = (size - g) / 2.0;
        Rect::new(cell.x as f32 * g - offset, cell.y as f32 * g - offset, size, size)
    }

    fn cell_center(&self, cell: Cell) -> Vec2 {
        self.cell_rect(cell, 1.0).center()
    }

    fn render_skunk(&self, surface: &mut dyn Surface, assets: &Assets) {
        let half = self.config.grid_size as f32 / 2.0;
        if let Some(sprite) = assets.ready(SKUNK_SPRITE) {
            let dest = self.cell_rect(self.skunk, SKUNK_SCALE);
            if let Err(err) = surface.draw_sprite(sprite, dest, self.heading.rotation()) {
                tracing::debug!(target: "stank", error = %err, "skunk sprite draw failed");
                surface.fill_circle(self.cell_center(self.skunk), half, Rgb::WHITE, 1.0);
            }
        } else {
            surface.fill_circle(self.cell_center(self.skunk), half, Rgb::WHITE, 1.0);
        }
    }

    fn render_food(&self, surface: &mut dyn Surface, assets: &Assets) {
        let path = self.current_food().sprite_path();
        if let Some(sprite) = assets.ready(&path) {
            match surface.draw_sprite(sprite, self.cell_rect(self.food, FOOD_SCALE), 0.0) {
                Ok(()) => return,
                Err(err) => {
                    tracing::debug!(target: "stank", %path, error = %err, "food sprite draw failed");
                }
            }
        }
        surface.fill_circle(
            self.cell_center(self.food),
            self.config.grid_size as f32 * 0.5,
            FOOD_FALLBACK,
            1.0,
        );
    }
}

impl Simulation for StankGame {
    fn name(&self) -> &str {
        "Stank"
    }

    fn asset_paths(&self) -> Vec<String> {
        std::iter::once(SKUNK_SPRITE.to_string())
            .chain(self.config.foods.iter().map(FoodKind::sprite_path))
            .collect()
    }

    fn state(&self) -> GameState {
        self.state
    }

    fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    fn update(&mut self, delta_ms: f64) {
        if self.state != GameState::Running {
            return;
        }
        self.since_last_move += delta_ms;
        if self.since_last_move < self.config.move_interval_ms {
            return;
        }
        self.since_last_move = 0.0;
        self.advance();
    }

    fn render(&self, surface: &mut dyn Surface, assets: &Assets) {
        let (w, h) = (surface.width(), surface.height());
        let radius = self.config.grid_size as f32 * self.config.stink_radius;

        let n = self.trail.len() as f32;
        for (i, segment) in self.trail.iter().enumerate() {
            let alpha = 0.7 * (n - i as f32) / n;
            surface.fill_circle(self.cell_center(*segment), radius, STINK_COLOR, alpha);
        }

        self.render_skunk(surface, assets);
        self.render_food(surface, assets);

        surface.fill_text(
            &format!("SCORE: {}", self.score),
            Vec2::new(20.0, 20.0),
            TextSize::Medium,
            Align::Left,
            Rgb::WHITE,
        );

        if self.state == GameState::GameOver {
            surface.fill_rect(Rect::new(0.0, 0.0, w, h), Rgb::BLACK, 0.7);
            surface.fill_text("GAME OVER", Vec2::new(w / 2.0, h / 2.0 - 30.0), TextSize::Large, Align::Center, Rgb::WHITE);
            surface.fill_text(
                &format!("FINAL SCORE: {}", self.score),
                Vec2::new(w / 2.0, h / 2.0 + 20.0),
                TextSize::Medium,
                Align::Center,
                Rgb::WHITE,
            );
            surface.fill_text(
                "PRESS ENTER TO RESTART",
                Vec2::new(w / 2.0, h / 2.0 + 60.0),
                TextSize::Small,
                Align::Center,
                Rgb::WHITE,
            );
        }
    }

    fn on_key(&mut self, key: KeyCode) -> Control {
        match key {
            KeyCode::Up => self.steer(Heading::Up),
            KeyCode::Down => self.steer(Heading::Down),
            KeyCode::Left => self.steer(Heading::Left),
            KeyCode::Right => self.steer(Heading::Right),
            KeyCode::Enter => return Control::Restart,
            _ => {}
        }
        Control::None
    }

    fn reset(&mut self) {
        self.initialize();
    }

    fn score(&self) -> u32 {
        self.score
    }
}
