//! Logical 2D drawing surface.
//!
//! Games draw into a [`Canvas`] in surface units (600×400 by default). The
//! canvas only records what was drawn; the terminal UI rasterizes the
//! recorded commands onto whatever cell grid it has available.

use std::sync::Arc;

use anyhow::{bail, ensure, Result};

use crate::assets::Sprite;
use crate::geom::{Rect, Vec2};

const MAX_SIDE: u32 = 4096;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const BLACK: Rgb = Rgb(0, 0, 0);
    pub const WHITE: Rgb = Rgb(255, 255, 255);

    /// Parses `#rrggbb`.
    pub fn parse_hex(s: &str) -> Option<Rgb> {
        let hex = s.trim().strip_prefix('#')?;
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn blend(self, over: Rgb, alpha: f32) -> Rgb {
        let a = alpha.clamp(0.0, 1.0);
        let mix = |b: u8, o: u8| (b as f32 + (o as f32 - b as f32) * a).round() as u8;
        Rgb(mix(self.0, over.0), mix(self.1, over.1), mix(self.2, over.2))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    Left,
    Center,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextSize {
    Small,
    Medium,
    Large,
}

#[derive(Clone, Debug)]
pub enum DrawCommand {
    Clear(Rgb),
    FillRect {
        rect: Rect,
        color: Rgb,
        alpha: f32,
    },
    FillCircle {
        center: Vec2,
        radius: f32,
        color: Rgb,
        alpha: f32,
    },
    DashedVLine {
        x: f32,
        dash: f32,
        gap: f32,
        color: Rgb,
    },
    Text {
        text: String,
        pos: Vec2,
        size: TextSize,
        align: Align,
        color: Rgb,
    },
    Sprite {
        sprite: Arc<Sprite>,
        dest: Rect,
        angle: f32,
    },
}

/// The drawing context handed to `Simulation::render`.
pub trait Surface {
    fn width(&self) -> f32;
    fn height(&self) -> f32;
    fn clear(&mut self, color: Rgb);
    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32);
    fn stroke_dashed_vline(&mut self, x: f32, dash: f32, gap: f32, color: Rgb);
    fn fill_text(&mut self, text: &str, pos: Vec2, size: TextSize, align: Align, color: Rgb);

    /// Draws `sprite` scaled into `dest`, rotated by `angle` radians around
    /// the destination centre.
    fn draw_sprite(&mut self, sprite: &Arc<Sprite>, dest: Rect, angle: f32) -> Result<()>;
}

#[derive(Debug)]
pub struct Canvas {
    width: u32,
    height: u32,
    commands: Vec<DrawCommand>,
}

impl Canvas {
    /// Acquires a drawing surface of the given logical size.
    pub fn acquire(width: u32, height: u32) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "surface {width}x{height} has no drawable area"
        );
        ensure!(
            width <= MAX_SIDE && height <= MAX_SIDE,
            "surface {width}x{height} exceeds {MAX_SIDE}x{MAX_SIDE}"
        );
        Ok(Self {
            width,
            height,
            commands: Vec::new(),
        })
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    /// All text drawn since the last clear, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.width as f32
    }

    fn height(&self) -> f32 {
        self.height as f32
    }

    fn clear(&mut self, color: Rgb) {
        self.commands.clear();
        self.commands.push(DrawCommand::Clear(color));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::FillRect { rect, color, alpha });
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        self.commands.push(DrawCommand::FillCircle {
            center,
            radius,
            color,
            alpha,
        });
    }

    fn stroke_dashed_vline(&mut self, x: f32, dash: f32, gap: f32, color: Rgb) {
        self.commands.push(DrawCommand::DashedVLine { x, dash, gap, color });
    }

    fn fill_text(&mut self, text: &str, pos: Vec2, size: TextSize, align: Align, color: Rgb) {
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            pos,
            size,
            align,
            color,
        });
    }

    fn draw_sprite(&mut self, sprite: &Arc<Sprite>, dest: Rect, angle: f32) -> Result<()> {
        if sprite.is_empty() {
            bail!("sprite has no glyphs");
        }
        if !dest.is_finite() || !angle.is_finite() || dest.w <= 0.0 || dest.h <= 0.0 {
            bail!("degenerate sprite destination {dest:?}");
        }
        self.commands.push(DrawCommand::Sprite {
            sprite: Arc::clone(sprite),
            dest,
            angle,
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_rejects_empty_and_oversized_surfaces() {
        assert!(Canvas::acquire(0, 400).is_err());
        assert!(Canvas::acquire(600, 0).is_err());
        assert!(Canvas::acquire(5000, 400).is_err());
        assert!(Canvas::acquire(600, 400).is_ok());
    }

    #[test]
    fn clear_drops_previous_frame() {
        let mut canvas = Canvas::acquire(600, 400).unwrap();
        canvas.fill_rect(Rect::new(0.0, 0.0, 1.0, 1.0), Rgb::WHITE, 1.0);
        canvas.clear(Rgb::BLACK);
        assert_eq!(canvas.commands().len(), 1);
    }

    #[test]
    fn draw_sprite_fails_for_empty_sprite() {
        let mut canvas = Canvas::acquire(600, 400).unwrap();
        let empty = Arc::new(Sprite::default());
        let result = canvas.draw_sprite(&empty, Rect::new(0.0, 0.0, 10.0, 10.0), 0.0);
        assert!(result.is_err());
        assert!(canvas.commands().is_empty());
    }

    #[test]
    fn parse_hex_colour() {
        assert_eq!(Rgb::parse_hex("#90ee90"), Some(Rgb(144, 238, 144)));
        assert_eq!(Rgb::parse_hex("90ee90"), None);
        assert_eq!(Rgb::parse_hex("#90ee9"), None);
    }
}
