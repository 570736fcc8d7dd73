//! Turns a recorded [`Canvas`] into styled terminal cells.

use ratatui::prelude::*;

use stankade::assets::Sprite;
use stankade::geom::{Rect as Area, Vec2};
use stankade::surface::{Align, Canvas, DrawCommand, Rgb, Surface, TextSize};

#[derive(Clone, Copy)]
struct Pixel {
    ch: char,
    fg: Rgb,
    bg: Rgb,
    bold: bool,
}

impl Default for Pixel {
    fn default() -> Self {
        Self {
            ch: ' ',
            fg: Rgb::WHITE,
            bg: Rgb::BLACK,
            bold: false,
        }
    }
}

struct Raster {
    cols: usize,
    rows: usize,
    // Surface units per cell.
    unit_x: f32,
    unit_y: f32,
    cells: Vec<Pixel>,
}

impl Raster {
    fn new(cols: usize, rows: usize, surface_w: f32, surface_h: f32) -> Self {
        Self {
            cols,
            rows,
            unit_x: surface_w / cols.max(1) as f32,
            unit_y: surface_h / rows.max(1) as f32,
            cells: vec![Pixel::default(); cols * rows],
        }
    }

    fn cell_center(&self, col: usize, row: usize) -> Vec2 {
        Vec2::new((col as f32 + 0.5) * self.unit_x, (row as f32 + 0.5) * self.unit_y)
    }

    fn cell_of(&self, p: Vec2) -> Option<(usize, usize)> {
        if p.x < 0.0 || p.y < 0.0 {
            return None;
        }
        let col = (p.x / self.unit_x) as usize;
        let row = (p.y / self.unit_y) as usize;
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    fn pixel(&mut self, col: usize, row: usize) -> &mut Pixel {
        &mut self.cells[row * self.cols + col]
    }

    /// Cells whose centre lies inside the box, clamped to the grid.
    fn span(&self, area: Area) -> (std::ops::Range<usize>, std::ops::Range<usize>) {
        let to_col = |x: f32| ((x / self.unit_x - 0.5).ceil().max(0.0) as usize).min(self.cols);
        let to_row = |y: f32| ((y / self.unit_y - 0.5).ceil().max(0.0) as usize).min(self.rows);
        (
            to_col(area.x)..to_col(area.x + area.w),
            to_row(area.y)..to_row(area.y + area.h),
        )
    }

    fn tint(&mut self, col: usize, row: usize, color: Rgb, alpha: f32) {
        let px = self.pixel(col, row);
        if alpha >= 0.99 {
            *px = Pixel {
                bg: color,
                ..Pixel::default()
            };
        } else {
            px.bg = px.bg.blend(color, alpha);
            px.fg = px.fg.blend(color, alpha);
        }
    }

    fn fill_rect(&mut self, rect: Area, color: Rgb, alpha: f32) {
        let (cols, rows) = self.span(rect);
        let mut hit = false;
        for row in rows {
            for col in cols.clone() {
                self.tint(col, row, color, alpha);
                hit = true;
            }
        }
        // Shapes thinner than a cell still show up somewhere.
        if !hit {
            if let Some((col, row)) = self.cell_of(rect.center()) {
                self.tint(col, row, color, alpha);
            }
        }
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: Rgb, alpha: f32) {
        let bounds = Area::new(center.x - radius, center.y - radius, radius * 2.0, radius * 2.0);
        let (cols, rows) = self.span(bounds);
        let mut hit = false;
        for row in rows {
            for col in cols.clone() {
                if (self.cell_center(col, row) - center).length() <= radius {
                    self.tint(col, row, color, alpha);
                    hit = true;
                }
            }
        }
        if !hit {
            if let Some((col, row)) = self.cell_of(center) {
                self.tint(col, row, color, alpha);
            }
        }
    }

    fn dashed_vline(&mut self, x: f32, dash: f32, gap: f32, color: Rgb) {
        let Some((col, _)) = self.cell_of(Vec2::new(x, 0.0)) else { return };
        let period = (dash + gap).max(f32::EPSILON);
        for row in 0..self.rows {
            if self.cell_center(col, row).y % period < dash {
                let px = self.pixel(col, row);
                px.ch = '┊';
                px.fg = color;
            }
        }
    }

    fn text(&mut self, text: &str, pos: Vec2, size: TextSize, align: Align, color: Rgb) {
        let Some((col, row)) = self.cell_of(pos) else { return };
        let len = text.chars().count();
        let start = match align {
            Align::Left => col,
            Align::Center => col.saturating_sub(len / 2),
        };
        for (i, ch) in text.chars().enumerate() {
            let c = start + i;
            if c >= self.cols {
                break;
            }
            let px = self.pixel(c, row);
            px.ch = ch;
            px.fg = color;
            px.bold = size != TextSize::Small;
        }
    }

    fn sprite(&mut self, sprite: &Sprite, dest: Area, angle: f32) {
        let center = dest.center();
        let reach = (dest.w * dest.w + dest.h * dest.h).sqrt() / 2.0;
        let bounds = Area::new(center.x - reach, center.y - reach, reach * 2.0, reach * 2.0);
        let (sin, cos) = (-angle).sin_cos();
        let color = sprite.color().unwrap_or(Rgb::WHITE);
        let (cols, rows) = self.span(bounds);

        for row in rows {
            for col in cols.clone() {
                let d = self.cell_center(col, row) - center;
                // Undo the rotation to find where this cell samples the art.
                let local = Vec2::new(d.x * cos - d.y * sin, d.x * sin + d.y * cos);
                let u = (local.x + dest.w / 2.0) / dest.w;
                let v = (local.y + dest.h / 2.0) / dest.h;
                if !(0.0..1.0).contains(&u) || !(0.0..1.0).contains(&v) {
                    continue;
                }
                let gx = (u * sprite.width() as f32) as usize;
                let gy = (v * sprite.height() as f32) as usize;
                if let Some(ch) = sprite.glyph(gx, gy) {
                    let px = self.pixel(col, row);
                    px.ch = ch;
                    px.fg = color;
                }
            }
        }
    }

    fn draw(&mut self, command: &DrawCommand) {
        match command {
            DrawCommand::Clear(color) => {
                for px in &mut self.cells {
                    *px = Pixel {
                        bg: *color,
                        ..Pixel::default()
                    };
                }
            }
            DrawCommand::FillRect { rect, color, alpha } => self.fill_rect(*rect, *color, *alpha),
            DrawCommand::FillCircle {
                center,
                radius,
                color,
                alpha,
            } => self.fill_circle(*center, *radius, *color, *alpha),
            DrawCommand::DashedVLine { x, dash, gap, color } => self.dashed_vline(*x, *dash, *gap, *color),
            DrawCommand::Text {
                text,
                pos,
                size,
                align,
                color,
            } => self.text(text, *pos, *size, *align, *color),
            DrawCommand::Sprite { sprite, dest, angle } => self.sprite(sprite, *dest, *angle),
        }
    }

    fn into_lines(self) -> Vec<Line<'static>> {
        self.cells
            .chunks(self.cols.max(1))
            .map(|row| {
                let spans: Vec<Span<'static>> = row
                    .iter()
                    .map(|px| {
                        let mut style = Style::default().fg(color(px.fg)).bg(color(px.bg));
                        if px.bold {
                            style = style.add_modifier(Modifier::BOLD);
                        }
                        Span::styled(String::from(px.ch), style)
                    })
                    .collect();
                Line::from(spans)
            })
            .collect()
    }
}

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Rasterizes the canvas onto a `cols`×`rows` cell grid.
pub fn rasterize(canvas: &Canvas, cols: usize, rows: usize) -> Vec<Line<'static>> {
    if cols == 0 || rows == 0 {
        return Vec::new();
    }
    let mut raster = Raster::new(cols, rows, canvas.width(), canvas.height());
    for command in canvas.commands() {
        raster.draw(command);
    }
    raster.into_lines()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn text_is_centred_on_its_anchor() {
        let mut canvas = Canvas::acquire(600, 400).unwrap();
        canvas.clear(Rgb::BLACK);
        canvas.fill_text("HI", Vec2::new(300.0, 200.0), TextSize::Large, Align::Center, Rgb::WHITE);
        let lines = rasterize(&canvas, 60, 20);
        assert_eq!(lines.len(), 20);
        assert_eq!(row_text(&lines[10]).trim(), "HI");
        assert_eq!(row_text(&lines[10]).find('H'), Some(29));
    }

    #[test]
    fn tiny_circle_still_marks_a_cell() {
        let mut canvas = Canvas::acquire(600, 400).unwrap();
        canvas.clear(Rgb::BLACK);
        canvas.fill_circle(Vec2::new(15.0, 15.0), 1.0, Rgb(0, 255, 0), 1.0);
        let lines = rasterize(&canvas, 60, 20);
        assert_eq!(lines[0].spans[1].style.bg, Some(Color::Rgb(0, 255, 0)));
    }

    #[test]
    fn sprite_glyphs_land_inside_destination() {
        let mut canvas = Canvas::acquire(600, 400).unwrap();
        canvas.clear(Rgb::BLACK);
        let sprite = std::sync::Arc::new(Sprite::parse("@@\n@@").unwrap());
        canvas
            .draw_sprite(&sprite, Area::new(100.0, 100.0, 40.0, 40.0), 0.0)
            .unwrap();
        let lines = rasterize(&canvas, 60, 20);
        let marked: usize = lines.iter().map(|l| row_text(l).matches('@').count()).sum();
        assert_eq!(marked, 8);
        assert!(row_text(&lines[5]).starts_with("          @@@@"));
    }
}
