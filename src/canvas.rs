use std::collections::VecDeque;
use eframe::egui;
use egui::{Rect, Vec2};
use image::{Rgba, RgbaImage};

use crate::layout::{Frame, PixelRect};

/// Number of palette slots. Pixel indices are bytes, so every index is valid.
pub const PALETTE_SIZE: usize = 256;

/// Zoom a freshly created canvas starts at.
pub const DEFAULT_ZOOM: u32 = 16;

pub type Palette = [Rgba<u8>; PALETTE_SIZE];

const CLEAR: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Upper bound on the canvas span in screen pixels.
const MAX_SCREEN_SPAN: u32 = i32::MAX as u32 / 16;

// ============================================================================
// INDEXED CANVAS - paletted raster with a cached RGBA display bitmap
// ============================================================================

/// A fixed-size raster of palette indices.
///
/// All mutation goes through the methods below, which keep `dirty` in sync:
/// whenever it is false, `display` holds exactly `palette[pixels[i]]` for
/// every pixel. Coordinates outside the raster are ignored rather than
/// reported, so callers can pass raw mapped pointer positions straight in.
pub struct IndexedCanvas {
    width: u32,
    height: u32,
    /// Row-major, `x + y * width`.
    pixels: Vec<u8>,
    palette: Palette,
    zoom: u32,
    dirty: bool,
    display: RgbaImage,
    /// Layout slot inside the viewport; rebuilt by `set_zoom`.
    area: Frame,
}

impl IndexedCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        let (width, height) = if width == 0 || height == 0 {
            log_warn!("IndexedCanvas::new: invalid size {}x{}, clamped to 1x1", width, height);
            (width.max(1), height.max(1))
        } else {
            (width, height)
        };

        let mut palette = [CLEAR; PALETTE_SIZE];
        palette[0] = Rgba([255, 0, 0, 255]);
        palette[1] = Rgba([255, 255, 255, 255]);
        palette[2] = Rgba([0, 255, 255, 255]);

        let mut canvas = Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize],
            palette,
            zoom: DEFAULT_ZOOM,
            dirty: true,
            display: RgbaImage::new(width, height),
            area: Frame::default(),
        };
        canvas.set_zoom(DEFAULT_ZOOM as i32);
        log_info!("Created {}x{} indexed canvas", width, height);
        canvas
    }

    // ---- geometry -----------------------------------------------------------

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Buffer offset of `(x, y)`, or `None` when it lies outside the raster.
    fn offset(&self, x: i32, y: i32) -> Option<usize> {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return None;
        }
        Some(x as usize + y as usize * self.width as usize)
    }

    // ---- pixel access -------------------------------------------------------

    /// Store `index` at `(x, y)`. Out-of-range coordinates are a no-op.
    pub fn set_pixel(&mut self, index: u8, x: i32, y: i32) {
        if let Some(i) = self.offset(x, y) {
            self.pixels[i] = index;
            self.dirty = true;
        }
    }

    /// Palette index at `(x, y)`; `None` outside the raster.
    pub fn get_pixel(&self, x: i32, y: i32) -> Option<u8> {
        self.offset(x, y).map(|i| self.pixels[i])
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bresenham line from `(x0, y0)` to `(x1, y1)` inclusive. Points that
    /// fall outside the raster are skipped. Returns how many in-range points
    /// were written.
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, index: u8) -> usize {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;
        let (mut x, mut y) = (x0, y0);

        let mut written = 0;
        let mut changed = false;
        loop {
            if let Some(i) = self.offset(x, y) {
                written += 1;
                if self.pixels[i] != index {
                    self.pixels[i] = index;
                    changed = true;
                }
            }
            if x == x1 && y == y1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }

        if changed {
            self.dirty = true;
        }
        written
    }

    /// 4-connected scanline flood fill from `(x, y)`.
    ///
    /// Each queued seed is re-checked against the colour captured at the
    /// start before its span is grown, so seeds that were already swallowed
    /// by an earlier span are simply dropped. Returns the number of pixels
    /// recoloured.
    pub fn fill(&mut self, x: i32, y: i32, index: u8) -> usize {
        let Some(seed) = self.offset(x, y) else { return 0 };
        let old = self.pixels[seed];
        if old == index {
            return 0;
        }

        let w = self.width as usize;
        let h = self.height as usize;
        let mut queue: VecDeque<(usize, usize)> = VecDeque::new();
        queue.push_back((x as usize, y as usize));

        let mut recoloured = 0;
        while let Some((sx, sy)) = queue.pop_front() {
            let row = sy * w;
            if self.pixels[row + sx] != old {
                continue;
            }

            let mut west = sx;
            while west > 0 && self.pixels[row + west - 1] == old {
                west -= 1;
            }
            let mut east = sx;
            while east + 1 < w && self.pixels[row + east + 1] == old {
                east += 1;
            }

            for cx in west..=east {
                self.pixels[row + cx] = index;
                recoloured += 1;
                if sy + 1 < h && self.pixels[row + w + cx] == old {
                    queue.push_back((cx, sy + 1));
                }
                if sy > 0 && self.pixels[row - w + cx] == old {
                    queue.push_back((cx, sy - 1));
                }
            }
        }

        self.dirty = true;
        recoloured
    }

    // ---- palette ------------------------------------------------------------

    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    pub fn palette_colour(&self, index: u8) -> Rgba<u8> {
        self.palette[index as usize]
    }

    /// Overwrite one palette slot. The display depends on the palette as
    /// much as on the indices, so this always invalidates it.
    pub fn set_palette_colour(&mut self, colour: Rgba<u8>, index: u8) {
        self.palette[index as usize] = colour;
        self.dirty = true;
    }

    // ---- zoom & screen mapping ---------------------------------------------

    pub fn zoom(&self) -> u32 {
        self.zoom
    }

    /// Largest zoom whose screen geometry (canvas span, shadow shift and the
    /// viewport offset added to them) still fits in `i32`.
    pub fn max_zoom(&self) -> u32 {
        let longest = self.width.max(self.height).max(8);
        (MAX_SCREEN_SPAN / longest).max(1)
    }

    /// Set the integer zoom, clamped to `1..=max_zoom()`, and re-centre the
    /// canvas slot at `width*zoom` by `height*zoom` screen pixels.
    pub fn set_zoom(&mut self, zoom: i32) {
        let zoom = (zoom.max(1) as u32).min(self.max_zoom());
        self.zoom = zoom;
        self.area = Frame::centered(Vec2::new(
            self.width as f32 * zoom as f32,
            self.height as f32 * zoom as f32,
        ));
    }

    /// Zoom in (`delta > 0`) or out by whole steps.
    pub fn adjust_zoom(&mut self, delta: i32) {
        let current = i32::try_from(self.zoom).unwrap_or(i32::MAX);
        self.set_zoom(current.saturating_add(delta));
    }

    /// On-screen rectangle of the canvas in `viewport`, in float form.
    pub fn screen_rect(&self, viewport: Rect) -> Rect {
        self.area.resolve(viewport)
    }

    /// On-screen rectangle rounded to whole pixels. Hit-testing, mapping and
    /// presentation all use this one rectangle.
    pub fn bounds(&self, viewport: Rect) -> PixelRect {
        PixelRect::from_rect(self.screen_rect(viewport))
    }

    /// Map a screen point to raster coordinates. Points left of or above the
    /// canvas map to negative coordinates, so they never alias onto the edge.
    pub fn map_to_texture(&self, viewport: Rect, screen: (i32, i32)) -> (i32, i32) {
        let b = self.bounds(viewport);
        (
            map_axis(screen.0 - b.x, self.width, b.w),
            map_axis(screen.1 - b.y, self.height, b.h),
        )
    }

    // ---- display bitmap -----------------------------------------------------

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Rebuild the RGBA display bitmap if anything changed since the last
    /// rebuild. Returns `true` when a rebuild happened.
    pub fn materialize(&mut self) -> bool {
        if !self.dirty {
            return false;
        }
        for (dst, &index) in self.display.pixels_mut().zip(self.pixels.iter()) {
            *dst = self.palette[index as usize];
        }
        self.dirty = false;
        true
    }

    /// The up-to-date display bitmap.
    pub fn display(&mut self) -> &RgbaImage {
        self.materialize();
        &self.display
    }
}

fn map_axis(distance: i32, raster: u32, span: i32) -> i32 {
    if span <= 0 {
        return 0;
    }
    (distance as i64 * raster as i64).div_euclid(span as i64) as i32
}
