//! Anchored layout frames.
//!
//! A [`Frame`] describes a rectangle relative to its parent: a size made of a
//! fraction of the parent plus a fixed amount, and a position obtained by
//! lining up an anchor on the parent with an anchor on the frame itself.
//! The root parent is always the viewport.

use eframe::egui;
use egui::{Pos2, Rect, Vec2};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Frame {
    /// Size as a fraction of the parent size.
    pub relative_scale: Vec2,
    /// Size in screen pixels, added to the relative part.
    pub absolute_scale: Vec2,
    /// Anchor on the parent, 0..1 on each axis.
    pub parent_origin: Vec2,
    /// Anchor on this frame that is placed on `parent_origin`.
    pub self_origin: Vec2,
    /// Final translation in screen pixels.
    pub offset: Vec2,
}

impl Default for Frame {
    /// Fills its parent exactly.
    fn default() -> Self {
        Self {
            relative_scale: Vec2::splat(1.0),
            absolute_scale: Vec2::ZERO,
            parent_origin: Vec2::ZERO,
            self_origin: Vec2::ZERO,
            offset: Vec2::ZERO,
        }
    }
}

impl Frame {
    /// Fixed-size frame centered in its parent.
    pub fn centered(size: Vec2) -> Self {
        Self {
            relative_scale: Vec2::ZERO,
            absolute_scale: size,
            parent_origin: Vec2::splat(0.5),
            self_origin: Vec2::splat(0.5),
            offset: Vec2::ZERO,
        }
    }

    /// Fixed-size frame whose bottom-right corner sits on the parent's
    /// bottom-right corner, then shifted by `offset`.
    pub fn bottom_right(size: Vec2, offset: Vec2) -> Self {
        Self {
            relative_scale: Vec2::ZERO,
            absolute_scale: size,
            parent_origin: Vec2::splat(1.0),
            self_origin: Vec2::splat(1.0),
            offset,
        }
    }

    /// Resolve against an already-resolved parent rectangle.
    pub fn resolve_in(&self, parent: Rect) -> Rect {
        let size = self.relative_scale * parent.size() + self.absolute_scale;
        let min = parent.min + parent.size() * self.parent_origin - size * self.self_origin
            + self.offset;
        Rect::from_min_size(min, size)
    }

    /// Resolve directly inside the viewport.
    pub fn resolve(&self, viewport: Rect) -> Rect {
        self.resolve_in(viewport)
    }
}

/// Resolve the last frame of `chain`, where each frame is laid out inside the
/// one before it and the first one inside `viewport`. An empty chain yields
/// the viewport itself.
pub fn resolve_chain(chain: &[Frame], viewport: Rect) -> Rect {
    chain
        .iter()
        .fold(viewport, |parent, frame| frame.resolve_in(parent))
}

/// Integer screen rectangle, used for hit-testing and texture mapping.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

impl PixelRect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Round each component of a float rectangle to the nearest pixel.
    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: rect.min.x.round() as i32,
            y: rect.min.y.round() as i32,
            w: rect.width().round() as i32,
            h: rect.height().round() as i32,
        }
    }

    /// Half-open containment: the right and bottom edges are outside.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.w && y < self.y + self.h
    }

    pub fn to_rect(self) -> Rect {
        Rect::from_min_size(
            Pos2::new(self.x as f32, self.y as f32),
            Vec2::new(self.w as f32, self.h as f32),
        )
    }
}
