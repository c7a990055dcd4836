//! Geometry and color primitives shared by the world model and params.
//!
//! Vectors come from `glam`; polygons are kept as flat vertex lists so they map
//! directly onto the comma-separated form used by action parameters.

pub use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle, origin at the bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn origin(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Middle of the top edge; speech bubbles anchor here.
    pub fn top_center(&self) -> Vec2 {
        Vec2::new(self.x + self.width / 2.0, self.y + self.height)
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.x && point.x <= self.x + self.width && point.y >= self.y && point.y <= self.y + self.height
    }
}

/// A polygon stored as `[x0, y0, x1, y1, ...]` plus a translation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Polygon {
    vertices: Vec<f32>,
    position: Vec2,
}

impl Polygon {
    /// Minimum number of vertex components (three points).
    pub const MIN_COMPONENTS: usize = 6;

    /// Build a polygon from raw vertex components.
    ///
    /// Returns `None` for fewer than three vertices or an odd component count.
    pub fn new(vertices: Vec<f32>) -> Option<Self> {
        if vertices.len() < Self::MIN_COMPONENTS || vertices.len() % 2 != 0 {
            return None;
        }
        Some(Self {
            vertices,
            position: Vec2::ZERO,
        })
    }

    /// Axis-aligned rectangle polygon anchored at the origin.
    pub fn rectangle(width: f32, height: f32) -> Self {
        Self {
            vertices: vec![0.0, 0.0, width, 0.0, width, height, 0.0, height],
            position: Vec2::ZERO,
        }
    }

    pub fn vertices(&self) -> &[f32] {
        &self.vertices
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn set_position(&mut self, position: Vec2) {
        self.position = position;
    }

    /// Bounding rectangle of the translated vertices.
    pub fn bounding_rect(&self) -> Rect {
        let mut min = Vec2::splat(f32::MAX);
        let mut max = Vec2::splat(f32::MIN);
        for point in self.vertices.chunks_exact(2) {
            let p = Vec2::new(point[0], point[1]) + self.position;
            min = min.min(p);
            max = max.max(p);
        }
        if self.vertices.is_empty() {
            return Rect::new(self.position.x, self.position.y, 0.0, 0.0);
        }
        Rect::new(min.x, min.y, max.x - min.x, max.y - min.y)
    }
}

/// RGBA color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Parse `RRGGBB` or `RRGGBBAA`, with or without a leading `#`.
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim().trim_start_matches('#');
        if !(hex.len() == 6 || hex.len() == 8) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |idx: usize| -> Option<f32> {
            u8::from_str_radix(&hex[idx..idx + 2], 16)
                .ok()
                .map(|v| f32::from(v) / 255.0)
        };
        let a = if hex.len() == 8 { channel(6)? } else { 1.0 };
        Some(Self::rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Lowercase `rrggbbaa` form.
    pub fn to_hex(&self) -> String {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!(
            "{:02x}{:02x}{:02x}{:02x}",
            byte(self.r),
            byte(self.g),
            byte(self.b),
            byte(self.a)
        )
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn polygon_rejects_short_or_odd_vertex_lists() {
        assert!(Polygon::new(vec![0.0, 0.0, 1.0, 1.0]).is_none());
        assert!(Polygon::new(vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0]).is_none());
        assert!(Polygon::new(vec![0.0, 0.0, 1.0, 0.0, 1.0, 1.0]).is_some());
    }

    #[test]
    fn bounding_rect_includes_position() {
        let mut poly = Polygon::rectangle(10.0, 20.0);
        poly.set_position(Vec2::new(5.0, 7.0));
        let rect = poly.bounding_rect();
        assert_eq!(rect, Rect::new(5.0, 7.0, 10.0, 20.0));
        assert_eq!(rect.top_center(), Vec2::new(10.0, 27.0));
    }

    #[test]
    fn hex_colors_parse_with_optional_alpha() {
        let orange = Color::from_hex("#ff8000").expect("valid hex");
        assert!((orange.r - 1.0).abs() < f32::EPSILON);
        assert!((orange.g - 128.0 / 255.0).abs() < 1e-6);
        assert!((orange.a - 1.0).abs() < f32::EPSILON);

        let faded = Color::from_hex("00000080").expect("valid hex");
        assert!((faded.a - 128.0 / 255.0).abs() < 1e-6);

        assert!(Color::from_hex("nothex").is_none());
        assert!(Color::from_hex("fff").is_none());
        assert_eq!(Color::WHITE.to_hex(), "ffffffff");
    }
}
