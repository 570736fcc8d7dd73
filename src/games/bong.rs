use std::f32::consts::{FRAC_PI_2, FRAC_PI_3, FRAC_PI_4, PI};

use anyhow::{ensure, Result};
use crossterm::event::KeyCode;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::assets::Assets;
use crate::config::BongConfig;
use crate::engine::{Control, GameState, Simulation};
use crate::geom::{Rect, Vec2};
use crate::input::Touch;
use crate::surface::{Align, Rgb, Surface, TextSize};

const PADDLE_SPRITE: &str = "bong.txt";
const BALL_SPRITE: &str = "leaf.txt";
const BALL_FALLBACK: Rgb = Rgb(0, 255, 0);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Player {
    One,
    Two,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Nudge {
    Up,
    Down,
}

/// Two-paddle variant. The ball moves once per frame regardless of the
/// frame's duration.
pub struct BongGame {
    config: BongConfig,
    rng: StdRng,
    width: f32,
    height: f32,
    paddles: [Vec2; 2],
    ball: Vec2,
    velocity: Vec2,
    scores: [u32; 2],
    state: GameState,
}

impl BongGame {
    pub fn new(config: BongConfig, width: u32, height: u32) -> Result<Self> {
        Self::with_rng(config, width, height, StdRng::from_entropy())
    }

    pub fn with_seed(config: BongConfig, width: u32, height: u32, seed: u64) -> Result<Self> {
        Self::with_rng(config, width, height, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: BongConfig, width: u32, height: u32, rng: StdRng) -> Result<Self> {
        let (w, h) = (width as f32, height as f32);
        ensure!(
            config.ball_size > 0.0 && config.ball_size <= h && config.ball_size < w,
            "a {}-unit ball does not fit a {width}x{height} table",
            config.ball_size
        );
        ensure!(
            config.paddle_height > 0.0 && config.paddle_height <= h,
            "a {}-unit paddle does not fit a {height}-unit tall table",
            config.paddle_height
        );
        ensure!(
            config.paddle_width > 0.0 && config.paddle_width * 3.0 <= w,
            "{}-unit paddles leave no room on a {width}-unit wide table",
            config.paddle_width
        );
        let mut game = Self {
            config,
            rng,
            width: width as f32,
            height: height as f32,
            paddles: [Vec2::default(); 2],
            ball: Vec2::default(),
            velocity: Vec2::default(),
            scores: [0; 2],
            state: GameState::Running,
        };
        game.initialize();
        Ok(game)
    }

    fn initialize(&mut self) {
        let c = &self.config;
        let paddle_y = (self.height - c.paddle_height) / 2.0;
        self.paddles = [
            Vec2::new(c.paddle_width, paddle_y),
            Vec2::new(self.width - c.paddle_width * 2.0, paddle_y),
        ];
        self.ball = self.center();

        // Within 22.5° of either horizontal.
        let spread = self.rng.gen::<f32>() * FRAC_PI_4 - FRAC_PI_4 / 2.0;
        let angle = if self.rng.gen_bool(0.5) { spread } else { spread + PI };
        self.velocity = Vec2::from_angle(angle, self.config.initial_ball_speed);

        self.scores = [0; 2];
        self.state = GameState::Running;
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    fn nudge(&mut self, player: Player, nudge: Nudge) {
        let max_y = self.height - self.config.paddle_height;
        let speed = self.config.paddle_speed;
        let paddle = &mut self.paddles[player as usize];
        paddle.y = match nudge {
            Nudge::Up => (paddle.y - speed).max(0.0),
            Nudge::Down => (paddle.y + speed).min(max_y),
        };
    }

    fn paddle_rect(&self, player: Player) -> Rect {
        let p = self.paddles[player as usize];
        Rect::new(p.x, p.y, self.config.paddle_width, self.config.paddle_height)
    }

    fn ball_rect(&self) -> Rect {
        Rect::new(self.ball.x, self.ball.y, self.config.ball_size, self.config.ball_size)
    }

    /// Sends the ball back from `player`'s paddle if they overlap. The exit
    /// angle spans ±45° by where on the paddle the ball landed, and the
    /// speed grows by the configured increment.
    fn deflect(&mut self, player: Player) {
        let paddle = self.paddle_rect(player);
        if !self.ball_rect().overlaps(&paddle) {
            return;
        }

        let hit = (self.ball.y + self.config.ball_size / 2.0 - paddle.y) / paddle.h;
        let angle = (hit - 0.5) * FRAC_PI_2;
        let speed = self.velocity.length() + self.config.ball_speed_increment;
        let bounced = Vec2::from_angle(angle, speed);

        match player {
            Player::One => {
                self.velocity = Vec2::new(bounced.x.abs(), bounced.y);
                self.ball.x = paddle.x + paddle.w;
            }
            Player::Two => {
                self.velocity = Vec2::new(-bounced.x.abs(), bounced.y);
                self.ball.x = paddle.x - self.config.ball_size;
            }
        }
        tracing::trace!(target: "bong", ?player, speed, "paddle hit");
    }

    /// Re-serves from the centre at the initial speed, within 30° of the
    /// horizontal toward `toward`.
    fn serve(&mut self, toward: Player) {
        self.ball = self.center();
        let spread = self.rng.gen::<f32>() * FRAC_PI_3 - FRAC_PI_3 / 2.0;
        let angle = match toward {
            Player::One => spread + PI,
            Player::Two => spread,
        };
        self.velocity = Vec2::from_angle(angle, self.config.initial_ball_speed);
    }

    fn point_to(&mut self, scorer: Player) {
        self.scores[scorer as usize] += 1;
        let conceded = match scorer {
            Player::One => Player::Two,
            Player::Two => Player::One,
        };
        tracing::debug!(target: "bong", ?scorer, p1 = self.scores[0], p2 = self.scores[1], "point");
        self.serve(conceded);
    }

    pub fn scores(&self) -> (u32, u32) {
        (self.scores[0], self.scores[1])
    }

    pub fn ball(&self) -> Vec2 {
        self.ball
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    pub fn paddle_y(&self, player: Player) -> f32 {
        self.paddles[player as usize].y
    }

    /// The side with strictly more points; ties go to player two.
    pub fn winner(&self) -> Option<Player> {
        if self.state != GameState::GameOver {
            return None;
        }
        if self.scores[0] > self.scores[1] {
            Some(Player::One)
        } else {
            Some(Player::Two)
        }
    }

    fn render_paddles(&self, surface: &mut dyn Surface, assets: &Assets) {
        for player in [Player::One, Player::Two] {
            let rect = self.paddle_rect(player);
            if let Some(sprite) = assets.ready(PADDLE_SPRITE) {
                match surface.draw_sprite(sprite, rect, 0.0) {
                    Ok(()) => continue,
                    Err(err) => tracing::debug!(target: "bong", error = %err, "paddle sprite draw failed"),
                }
            }
            surface.fill_rect(rect, Rgb::WHITE, 1.0);
        }
    }

    fn render_ball(&self, surface: &mut dyn Surface, assets: &Assets) {
        let rect = self.ball_rect();
        if let Some(sprite) = assets.ready(BALL_SPRITE) {
            let spin = self.velocity.angle() + FRAC_PI_2;
            match surface.draw_sprite(sprite, rect, spin) {
                Ok(()) => return,
                Err(err) => tracing::debug!(target: "bong", error = %err, "ball sprite draw failed"),
            }
        }
        surface.fill_circle(rect.center(), self.config.ball_size / 2.0, BALL_FALLBACK, 1.0);
    }
}

impl Simulation for BongGame {
    fn name(&self) -> &str {
        "Bong"
    }

    fn asset_paths(&self) -> Vec<String> {
        vec![PADDLE_SPRITE.to_string(), BALL_SPRITE.to_string()]
    }

    fn state(&self) -> GameState {
        self.state
    }

    fn set_state(&mut self, state: GameState) {
        self.state = state;
    }

    fn update(&mut self, _delta_ms: f64) {
        if self.state != GameState::Running {
            return;
        }

        self.ball += self.velocity;

        let floor = self.height - self.config.ball_size;
        if self.ball.y < 0.0 || self.ball.y > floor {
            self.velocity.y = -self.velocity.y;
            self.ball.y = self.ball.y.clamp(0.0, floor);
        }

        self.deflect(Player::One);
        self.deflect(Player::Two);

        if self.ball.x < 0.0 {
            self.point_to(Player::Two);
        } else if self.ball.x > self.width {
            self.point_to(Player::One);
        }

        let target = self.config.winning_score;
        if self.scores[0] >= target || self.scores[1] >= target {
            tracing::debug!(target: "bong", p1 = self.scores[0], p2 = self.scores[1], "match over");
            self.state = GameState::GameOver;
        }
    }

    fn render(&self, surface: &mut dyn Surface, assets: &Assets) {
        let (w, h) = (surface.width(), surface.height());

        surface.stroke_dashed_vline(w / 2.0, 10.0, 15.0, Rgb::WHITE);
        self.render_paddles(surface, assets);
        self.render_ball(surface, assets);

        surface.fill_text(&self.scores[0].to_string(), Vec2::new(w / 4.0, 50.0), TextSize::Medium, Align::Center, Rgb::WHITE);
        surface.fill_text(&self.scores[1].to_string(), Vec2::new(w * 3.0 / 4.0, 50.0), TextSize::Medium, Align::Center, Rgb::WHITE);

        if let Some(winner) = self.winner() {
            let banner = match winner {
                Player::One => "PLAYER 1 WINS!",
                Player::Two => "PLAYER 2 WINS!",
            };
            surface.fill_rect(Rect::new(0.0, 0.0, w, h), Rgb::BLACK, 0.7);
            surface.fill_text(banner, Vec2::new(w / 2.0, h / 2.0 - 30.0), TextSize::Large, Align::Center, Rgb::WHITE);
            surface.fill_text(
                "PRESS ENTER TO RESTART",
                Vec2::new(w / 2.0, h / 2.0 + 30.0),
                TextSize::Small,
                Align::Center,
                Rgb::WHITE,
            );
        }
    }

    fn on_key(&mut self, key: KeyCode) -> Control {
        if self.state == GameState::GameOver {
            return if key == KeyCode::Enter { Control::Restart } else { Control::None };
        }
        match key {
            KeyCode::Char('w') => self.nudge(Player::One, Nudge::Up),
            KeyCode::Char('s') => self.nudge(Player::One, Nudge::Down),
            KeyCode::Up => self.nudge(Player::Two, Nudge::Up),
            KeyCode::Down => self.nudge(Player::Two, Nudge::Down),
            _ => {}
        }
        Control::None
    }

    fn on_touch_start(&mut self, touch: Touch) {
        let player = if touch.in_left_half() { Player::One } else { Player::Two };
        let nudge = if touch.in_top_half() { Nudge::Up } else { Nudge::Down };
        self.nudge(player, nudge);
    }

    fn reset(&mut self) {
        self.initialize();
    }

    fn score(&self) -> u32 {
        self.scores[0].max(self.scores[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Canvas;

    fn game(seed: u64) -> BongGame {
        BongGame::with_seed(BongConfig::default(), 600, 400, seed).unwrap()
    }

    fn touch(x: f32, y: f32) -> Touch {
        Touch {
            x,
            y,
            viewport_width: 200.0,
            viewport_height: 100.0,
        }
    }

    #[test]
    fn paddles_start_centred_at_their_edges() {
        let g = game(1);
        assert_eq!(g.paddles[0], Vec2::new(20.0, 150.0));
        assert_eq!(g.paddles[1], Vec2::new(560.0, 150.0));
        assert!((g.velocity().length() - 5.0).abs() < 1e-4);
        let angle = g.velocity().angle().abs();
        assert!(angle <= FRAC_PI_4 / 2.0 + 1e-4 || angle >= PI - FRAC_PI_4 / 2.0 - 1e-4);
    }

    #[test]
    fn paddles_stay_on_the_table() {
        let mut g = game(2);
        for _ in 0..100 {
            g.on_key(KeyCode::Char('w'));
            g.on_key(KeyCode::Down);
        }
        assert_eq!(g.paddle_y(Player::One), 0.0);
        assert_eq!(g.paddle_y(Player::Two), 300.0);
    }

    #[test]
    fn dead_centre_hit_sends_ball_back_faster() {
        let mut g = game(3);
        let before = Vec2::from_angle(PI - FRAC_PI_4, 5.0);
        g.velocity = before;
        // After this frame's move the ball centre lines up with the paddle centre.
        g.ball = Vec2::new(g.paddles[0].x + 10.0, 185.0) - before;
        g.update(16.0);
        assert!(g.velocity().x > 0.0);
        assert!(g.velocity().y.abs() < 1e-4);
        assert!((g.velocity().length() - (before.length() + 0.2)).abs() < 1e-4);
        assert_eq!(g.ball().x, 40.0);
    }

    #[test]
    fn right_paddle_sends_ball_left() {
        let mut g = game(4);
        g.velocity = Vec2::new(5.0, 1.0);
        g.ball = Vec2::new(g.paddles[1].x - 20.0, 160.0);
        g.update(16.0);
        assert!(g.velocity().x < 0.0);
        assert_eq!(g.ball().x, g.paddles[1].x - 30.0);
    }

    #[test]
    fn walls_flip_vertical_velocity_and_clamp() {
        let mut g = game(5);
        g.ball = Vec2::new(300.0, 2.0);
        g.velocity = Vec2::new(1.0, -5.0);
        g.update(16.0);
        assert_eq!(g.ball().y, 0.0);
        assert_eq!(g.velocity().y, 5.0);
    }

    #[test]
    fn speed_never_drops_during_a_rally() {
        let mut g = game(6);
        let mut last = g.velocity().length();
        let mut bounces = 0;
        for _ in 0..5_000 {
            // Keep both paddles tracking the ball so the rally continues.
            let target = g.ball().y + 15.0 - 50.0;
            for p in 0..2 {
                g.paddles[p].y = target.clamp(0.0, 300.0);
            }
            let sign = g.velocity().x.signum();
            g.update(16.0);
            let (p1, p2) = g.scores();
            assert_eq!((p1, p2), (0, 0), "tracking paddles should never miss");
            let speed = g.velocity().length();
            assert!(speed + 1e-4 >= last);
            if g.velocity().x.signum() != sign {
                bounces += 1;
                assert!((speed - last - 0.2).abs() < 1e-3);
            }
            last = speed;
        }
        assert!(bounces > 5);
    }

    #[test]
    fn scoring_resets_speed_and_serves_to_the_conceding_side() {
        let mut g = game(7);
        g.velocity = Vec2::new(-9.0, 0.0);
        g.ball = Vec2::new(3.0, 10.0);
        g.paddles[0].y = 300.0;
        g.update(16.0);
        assert_eq!(g.scores(), (0, 1));
        assert_eq!(g.ball(), Vec2::new(300.0, 200.0));
        assert!((g.velocity().length() - 5.0).abs() < 1e-4);
        assert!(g.velocity().x < 0.0);

        g.velocity = Vec2::new(9.0, 0.0);
        g.ball = Vec2::new(598.0, 10.0);
        g.paddles[1].y = 300.0;
        g.update(16.0);
        assert_eq!(g.scores(), (1, 1));
        assert!(g.velocity().x > 0.0);
    }

    #[test]
    fn match_ends_exactly_at_ten() {
        let mut g = game(8);
        g.paddles[0].y = 300.0;
        for point in 1..=10 {
            assert_eq!(g.state(), GameState::Running);
            g.ball = Vec2::new(1.0, 10.0);
            g.velocity = Vec2::new(-5.0, 0.0);
            g.update(16.0);
            assert_eq!(g.scores(), (0, point));
            if point < 10 {
                assert_eq!(g.winner(), None);
            }
        }
        assert_eq!(g.state(), GameState::GameOver);
        assert_eq!(g.winner(), Some(Player::Two));

        let frozen = g.ball();
        g.update(16.0);
        assert_eq!(g.ball(), frozen);
    }

    #[test]
    fn game_over_only_listens_for_enter() {
        let mut g = game(9);
        g.state = GameState::GameOver;
        let y = g.paddle_y(Player::One);
        assert_eq!(g.on_key(KeyCode::Char('w')), Control::None);
        assert_eq!(g.paddle_y(Player::One), y);
        assert_eq!(g.on_key(KeyCode::Enter), Control::Restart);
    }

    #[test]
    fn touch_quadrants_drive_paddles() {
        let mut g = game(10);
        g.on_touch_start(touch(10.0, 10.0));
        assert_eq!(g.paddle_y(Player::One), 142.0);
        g.on_touch_start(touch(150.0, 90.0));
        assert_eq!(g.paddle_y(Player::Two), 158.0);
        g.on_touch_move(touch(10.0, 10.0));
        assert_eq!(g.paddle_y(Player::One), 142.0);
    }

    #[test]
    fn banner_names_the_leader() {
        let mut g = game(11);
        g.scores = [10, 4];
        g.state = GameState::GameOver;
        let mut canvas = Canvas::acquire(600, 400).unwrap();
        g.render(&mut canvas, &Assets::pending(&g.asset_paths()));
        let texts: Vec<_> = canvas.texts().collect();
        assert!(texts.contains(&"PLAYER 1 WINS!"));
        assert!(texts.contains(&"10"));
    }

    #[test]
    fn oversized_pieces_are_rejected() {
        let ball = BongConfig {
            ball_size: 500.0,
            ..BongConfig::default()
        };
        assert!(BongGame::with_seed(ball, 600, 400, 1).is_err());

        let paddle = BongConfig {
            paddle_height: 401.0,
            ..BongConfig::default()
        };
        assert!(BongGame::with_seed(paddle, 600, 400, 1).is_err());
    }

    #[test]
    fn ball_as_tall_as_the_table_still_plays() {
        let config = BongConfig {
            ball_size: 400.0,
            paddle_height: 400.0,
            ..BongConfig::default()
        };
        let mut g = BongGame::with_seed(config, 600, 400, 1).unwrap();
        for _ in 0..200 {
            g.update(16.0);
        }
        assert!((0.0..=200.0).contains(&g.ball().y));
    }

    #[test]
    fn reset_clears_scores() {
        let mut g = game(12);
        g.scores = [3, 7];
        g.reset();
        assert_eq!(g.scores(), (0, 0));
        assert_eq!(g.state(), GameState::Running);
        assert_eq!(g.ball(), Vec2::new(300.0, 200.0));
    }
}
