/// ASCII rasterizer for composed drawings
///
/// Layers arrive back to front, so later shapes simply overwrite earlier
/// cells; there is no depth buffer.
use crossterm::{
    cursor,
    style::{Color, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use nalgebra::{Point2, Vector2};
use prepscene_core::compose::{arrowhead, Drawing, Layer, LayerKind, Shape};
use std::io::Write;

/// Character luminosity ramp for fills (darkest to lightest)
const LUMINOSITY_RAMP: &[char] = &[' ', '.', ':', '-', '=', '+', '*', '#', '%', '@'];

/// Arrowhead size in drawing units.
const ARROW_SIZE: f32 = 2.5;

/// ASCII renderer that converts drawings to terminal characters
pub struct AsciiRenderer {
    width: usize,
    height: usize,
    char_buffer: Vec<char>,
    color_buffer: Vec<Color>,
}

impl AsciiRenderer {
    pub fn new(width: usize, height: usize) -> Self {
        let size = width * height;
        Self {
            width,
            height,
            char_buffer: vec![' '; size],
            color_buffer: vec![Color::Reset; size],
        }
    }

    pub fn resize(&mut self, width: usize, height: usize) {
        *self = Self::new(width, height);
    }

    pub fn clear(&mut self) {
        self.char_buffer.fill(' ');
        self.color_buffer.fill(Color::Reset);
    }

    /// Rasterize a drawing stretched over the whole character grid.
    pub fn render(&mut self, drawing: &Drawing) {
        if self.width == 0 || self.height == 0 || drawing.width <= 0.0 || drawing.height <= 0.0 {
            return;
        }
        let scale = Vector2::new(
            self.width as f32 / drawing.width,
            self.height as f32 / drawing.height,
        );
        for layer in &drawing.layers {
            self.render_layer(layer, scale);
        }
    }

    fn render_layer(&mut self, layer: &Layer, scale: Vector2<f32>) {
        let style = &layer.style;
        let stroke = style.stroke.and_then(hex_color).unwrap_or(Color::White);
        let fill = style.fill.and_then(hex_color).unwrap_or(stroke);
        let to_cell = |p: &Point2<f32>| Point2::new(p.x * scale.x, p.y * scale.y);

        for shape in &layer.shapes {
            match shape {
                Shape::Line { from, to } => {
                    let glyph = layer.kind.is_back_edges().then_some('.');
                    self.line(to_cell(from), to_cell(to), glyph, stroke);
                }
                Shape::Polygon { points } => {
                    let cells: Vec<_> = points.iter().map(to_cell).collect();
                    self.polygon(&cells, fill_char(layer.kind, style.fill_opacity), fill);
                }
                Shape::Circle { center, radius } => {
                    let center = to_cell(center);
                    self.ellipse(center, Vector2::new(radius * scale.x, radius * scale.y), fill);
                }
                Shape::Polyline { points, arrow } => {
                    let cells: Vec<_> = points.iter().map(to_cell).collect();
                    self.polyline(&cells, style.dash.is_some(), stroke);
                    if *arrow {
                        if let Some(head) = arrowhead(points, ARROW_SIZE) {
                            let head = head.map(|p| to_cell(&p));
                            self.polygon(&head, '*', stroke);
                            self.plot(head[0], '*', stroke);
                        }
                    }
                }
                Shape::Text { at, text } => self.text(to_cell(at), text, fill),
            }
        }
    }

    fn plot(&mut self, p: Point2<f32>, c: char, color: Color) {
        if !(p.x.is_finite() && p.y.is_finite()) || p.x < 0.0 || p.y < 0.0 {
            return;
        }
        let (x, y) = (p.x as usize, p.y as usize);
        if x < self.width && y < self.height {
            let idx = y * self.width + x;
            self.char_buffer[idx] = c;
            self.color_buffer[idx] = color;
        }
    }

    fn line(&mut self, from: Point2<f32>, to: Point2<f32>, glyph: Option<char>, color: Color) {
        let delta = to - from;
        let c = glyph.unwrap_or_else(|| slope_char(delta));
        let steps = delta.x.abs().max(delta.y.abs()).ceil().max(1.0) as usize;
        for i in 0..=steps {
            self.plot(from + delta * (i as f32 / steps as f32), c, color);
        }
    }

    fn polyline(&mut self, points: &[Point2<f32>], dashed: bool, color: Color) {
        for (i, pair) in points.windows(2).enumerate() {
            if dashed && i % 2 == 1 {
                continue;
            }
            self.line(pair[0], pair[1], None, color);
        }
    }

    /// Fill a convex polygon as a triangle fan.
    fn polygon(&mut self, points: &[Point2<f32>], c: char, color: Color) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        for pair in rest.windows(2) {
            self.rasterize_triangle([*first, pair[0], pair[1]], c, color);
        }
    }

    fn rasterize_triangle(&mut self, v: [Point2<f32>; 3], c: char, color: Color) {
        // Bounding box
        let min_x = v[0].x.min(v[1].x).min(v[2].x).floor().max(0.0) as usize;
        let max_x = v[0].x.max(v[1].x).max(v[2].x).ceil().min(self.width as f32) as usize;
        let min_y = v[0].y.min(v[1].y).min(v[2].y).floor().max(0.0) as usize;
        let max_y = v[0].y.max(v[1].y).max(v[2].y).ceil().min(self.height as f32) as usize;

        for y in min_y..max_y {
            for x in min_x..max_x {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                if let Some((w0, w1, w2)) = barycentric(v[0], v[1], v[2], p) {
                    if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                        self.plot(p, c, color);
                    }
                }
            }
        }
    }

    fn ellipse(&mut self, center: Point2<f32>, radii: Vector2<f32>, color: Color) {
        if radii.x <= 0.0 || radii.y <= 0.0 {
            return;
        }
        let min_y = (center.y - radii.y).floor().max(0.0) as usize;
        let max_y = (center.y + radii.y).ceil().max(0.0) as usize;
        let min_x = (center.x - radii.x).floor().max(0.0) as usize;
        let max_x = (center.x + radii.x).ceil().max(0.0) as usize;
        let mut hit = false;
        for y in min_y..max_y.min(self.height) {
            for x in min_x..max_x.min(self.width) {
                let p = Point2::new(x as f32 + 0.5, y as f32 + 0.5);
                let d = Vector2::new((p.x - center.x) / radii.x, (p.y - center.y) / radii.y);
                if d.norm_squared() <= 1.0 {
                    self.plot(p, '@', color);
                    hit = true;
                }
            }
        }
        // Balls smaller than a cell still show up.
        if !hit {
            self.plot(center, 'o', color);
        }
    }

    fn text(&mut self, at: Point2<f32>, text: &str, color: Color) {
        let len = text.chars().count() as f32;
        let start = at.x - len / 2.0;
        for (i, c) in text.chars().enumerate() {
            self.plot(Point2::new(start + i as f32, at.y), c, color);
        }
    }

    pub fn draw<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        for y in 0..self.height {
            writer.queue(cursor::MoveTo(0, y as u16))?;
            let mut current = None;
            for x in 0..self.width {
                let idx = y * self.width + x;
                let color = self.color_buffer[idx];
                if current != Some(color) {
                    writer.queue(SetForegroundColor(color))?;
                    current = Some(color);
                }
                writer.queue(Print(self.char_buffer[idx]))?;
            }
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}

fn slope_char(delta: Vector2<f32>) -> char {
    let (dx, dy) = (delta.x.abs(), delta.y.abs());
    if dy < dx * 0.4 {
        '-'
    } else if dx < dy * 0.4 {
        '|'
    } else if (delta.x > 0.0) == (delta.y > 0.0) {
        // Screen y points down.
        '\\'
    } else {
        '/'
    }
}

fn fill_char(kind: LayerKind, opacity: f32) -> char {
    match kind {
        LayerKind::GroundPlane => '.',
        _ => {
            let index = (opacity.clamp(0.0, 1.0) * (LUMINOSITY_RAMP.len() - 1) as f32) as usize;
            LUMINOSITY_RAMP[index.clamp(1, LUMINOSITY_RAMP.len() - 1)]
        }
    }
}

/// Parse `#rrggbb` into a terminal color.
fn hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
    Some(Color::Rgb {
        r: channel(0)?,
        g: channel(2)?,
        b: channel(4)?,
    })
}

/// Calculate barycentric coordinates for a point in a triangle
fn barycentric(
    v0: Point2<f32>,
    v1: Point2<f32>,
    v2: Point2<f32>,
    p: Point2<f32>,
) -> Option<(f32, f32, f32)> {
    let denom = (v1.y - v2.y) * (v0.x - v2.x) + (v2.x - v1.x) * (v0.y - v2.y);

    if denom.abs() < 1e-6 {
        return None;
    }

    let w0 = ((v1.y - v2.y) * (p.x - v2.x) + (v2.x - v1.x) * (p.y - v2.y)) / denom;
    let w1 = ((v2.y - v0.y) * (p.x - v2.x) + (v0.x - v2.x) * (p.y - v2.y)) / denom;
    let w2 = 1.0 - w0 - w1;

    Some((w0, w1, w2))
}
