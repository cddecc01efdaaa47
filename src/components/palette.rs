use eframe::egui;
use egui::{Color32, Pos2, Rect, Vec2};
use image::{Rgba, RgbaImage};

use crate::canvas::{IndexedCanvas, PALETTE_SIZE, Palette};
use crate::colour::{HUE_CYCLE, hsv_colour};
use crate::input::FrameInput;
use crate::layout::Frame;
use crate::present::{FULL_UV, ImageSlot, PresentSink, Renderable, Updatable};

/// Swatches per row and per column.
pub const GRID_CELLS: u32 = 16;
/// Screen pixels per swatch cell (grid line included).
pub const DEFAULT_SCALE: u32 = 17;
/// Side of the transparency checker tile, in texels.
pub const CHECKER_TILE: u32 = 32;
/// Screen pixels per checker texel when the tile is repeated.
pub const CHECKER_TEXEL: f32 = 4.0;

const CHECKER_LIGHT: Rgba<u8> = Rgba([0xFF, 0xFF, 0xFF, 0xFF]);
const CHECKER_DARK: Rgba<u8> = Rgba([0xBF, 0xBF, 0xBF, 0xFF]);

/// Distance from the bottom-right corner of the viewport.
const MARGIN: f32 = 16.0;

// ============================================================================
// PALETTE DISPLAY - 16×16 swatch grid in the bottom-right corner
// ============================================================================

/// Shows every palette slot of a canvas as a grid of swatches.
///
/// The swatch bitmap is only rebuilt when the canvas palette actually
/// differs from the private copy taken at the last rebuild. The display reads
/// the canvas each frame and never writes to it.
pub struct PaletteDisplay {
    pub visible: bool,
    pub shadow_colour: Color32,
    pub shadow_offset: Vec2,
    pub grid_colour: Color32,
    scale: u32,
    area: Frame,
    last_seen: Palette,
    swatch: RgbaImage,
    /// Rebuilt but not yet handed to a sink.
    swatch_stale: bool,
    checker: Option<RgbaImage>,
    checker_presented: bool,
    regenerations: u64,
}

impl PaletteDisplay {
    pub fn new(canvas: &IndexedCanvas, scale: u32) -> Self {
        let mut display = Self {
            visible: true,
            shadow_colour: Color32::from_rgba_unmultiplied(0, 0, 0, 127),
            shadow_offset: Vec2::new(8.0, 8.0),
            grid_colour: Color32::from_rgb(12, 23, 39),
            scale: 0,
            area: Frame::default(),
            last_seen: *canvas.palette(),
            swatch: RgbaImage::new(GRID_CELLS, GRID_CELLS),
            swatch_stale: true,
            checker: None,
            checker_presented: false,
            regenerations: 0,
        };
        display.regenerate();
        display.set_scale(scale);
        display
    }

    pub fn scale(&self) -> u32 {
        self.scale
    }

    /// Cell size in screen pixels; zero is bumped to one.
    pub fn set_scale(&mut self, scale: u32) {
        let scale = scale.max(1);
        if scale == self.scale {
            return;
        }
        self.scale = scale;
        let side = (scale * GRID_CELLS + 1) as f32;
        self.area = Frame::bottom_right(Vec2::splat(side), Vec2::splat(-MARGIN));
    }

    pub fn rect(&self, viewport: Rect) -> Rect {
        self.area.resolve(viewport)
    }

    /// How many times the swatch bitmap has been built.
    pub fn regenerations(&self) -> u64 {
        self.regenerations
    }

    pub fn swatch(&self) -> &RgbaImage {
        &self.swatch
    }

    /// Pick up palette changes from the canvas. Returns `true` if the swatch
    /// had to be rebuilt.
    pub fn refresh(&mut self, canvas: &IndexedCanvas) -> bool {
        let palette = canvas.palette();
        if self.last_seen == *palette {
            return false;
        }
        self.last_seen = *palette;
        self.regenerate();
        true
    }

    fn regenerate(&mut self) {
        for (i, colour) in self.last_seen.iter().enumerate().take(PALETTE_SIZE) {
            let i = i as u32;
            self.swatch.put_pixel(i % GRID_CELLS, i / GRID_CELLS, *colour);
        }
        self.swatch_stale = true;
        self.regenerations += 1;
    }

    pub fn render(&mut self, canvas: &IndexedCanvas, sink: &mut dyn PresentSink, viewport: Rect) {
        self.refresh(canvas);
        if !self.visible {
            return;
        }
        let rect = self.rect(viewport);

        sink.fill_rect(rect.translate(self.shadow_offset), self.shadow_colour);
        self.draw_checker(sink, rect);
        sink.image(ImageSlot::PaletteSwatch, &self.swatch, self.swatch_stale, rect, FULL_UV);
        self.swatch_stale = false;
        self.draw_grid(sink, rect.min);
    }

    /// Repeat the checker tile across `rect`; edge tiles are cropped via UV.
    fn draw_checker(&mut self, sink: &mut dyn PresentSink, rect: Rect) {
        let mut changed = !self.checker_presented;
        let checker = self.checker.get_or_insert_with(build_checker);
        let tile = CHECKER_TILE as f32 * CHECKER_TEXEL;

        let mut y = rect.min.y;
        while y < rect.max.y {
            let h = (rect.max.y - y).min(tile);
            let mut x = rect.min.x;
            while x < rect.max.x {
                let w = (rect.max.x - x).min(tile);
                let dst = Rect::from_min_size(Pos2::new(x, y), Vec2::new(w, h));
                let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(w / tile, h / tile));
                sink.image(ImageSlot::Checker, checker, changed, dst, uv);
                // One upload serves every tile.
                changed = false;
                x += tile;
            }
            y += tile;
        }
        self.checker_presented = true;
    }

    /// GRID_CELLS+1 lines each way, one every `scale` pixels.
    fn draw_grid(&self, sink: &mut dyn PresentSink, origin: Pos2) {
        let step = self.scale as f32;
        let span = step * GRID_CELLS as f32;
        for i in 0..=GRID_CELLS {
            let offset = i as f32 * step;
            sink.line(
                Pos2::new(origin.x, origin.y + offset),
                Pos2::new(origin.x + span, origin.y + offset),
                self.grid_colour,
            );
        }
        for i in 0..=GRID_CELLS {
            let offset = i as f32 * step;
            sink.line(
                Pos2::new(origin.x + offset, origin.y),
                Pos2::new(origin.x + offset, origin.y + span),
                self.grid_colour,
            );
        }
    }
}

impl Renderable for PaletteDisplay {
    fn render(&mut self, canvas: &mut IndexedCanvas, sink: &mut dyn PresentSink, viewport: Rect) {
        PaletteDisplay::render(self, canvas, sink, viewport);
    }
}

fn build_checker() -> RgbaImage {
    RgbaImage::from_fn(CHECKER_TILE, CHECKER_TILE, |x, y| {
        if (x ^ y) & 1 == 1 { CHECKER_LIGHT } else { CHECKER_DARK }
    })
}

// ============================================================================
// PALETTE CYCLER - rotates one slot through the hue circle
// ============================================================================

/// Rewrites one palette slot every frame with a fully saturated colour whose
/// hue goes once around the circle every `period_ms`.
#[derive(Clone, Debug)]
pub struct PaletteCycler {
    pub slot: u8,
    pub period_ms: u32,
}

impl Default for PaletteCycler {
    fn default() -> Self {
        Self { slot: 1, period_ms: 5000 }
    }
}

impl PaletteCycler {
    pub fn colour_at(&self, time: f64) -> Rgba<u8> {
        let period = self.period_ms.max(1) as f64;
        let hue = (time * 1000.0 * HUE_CYCLE as f64 / period) as i64;
        hsv_colour(hue.rem_euclid(HUE_CYCLE as i64) as i32, 1.0, 1.0)
    }
}

impl Updatable for PaletteCycler {
    fn update(&mut self, input: &FrameInput, canvas: &mut IndexedCanvas, _viewport: Rect) {
        let colour = self.colour_at(input.time());
        if canvas.palette_colour(self.slot) != colour {
            canvas.set_palette_colour(colour, self.slot);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::present::recording::{Draw, RecordingSink};

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, Vec2::new(800.0, 600.0))
    }

    #[test]
    fn swatch_follows_palette_layout() {
        let mut canvas = IndexedCanvas::new(4, 4);
        canvas.set_palette_colour(Rgba([9, 8, 7, 255]), 17);
        let display = PaletteDisplay::new(&canvas, DEFAULT_SCALE);
        assert_eq!(*display.swatch().get_pixel(1, 1), Rgba([9, 8, 7, 255]));
        assert_eq!(*display.swatch().get_pixel(0, 0), Rgba([255, 0, 0, 255]));
        assert_eq!(*display.swatch().get_pixel(2, 0), Rgba([0, 255, 255, 255]));
    }

    #[test]
    fn regenerates_only_on_palette_change() {
        let mut canvas = IndexedCanvas::new(4, 4);
        let mut display = PaletteDisplay::new(&canvas, DEFAULT_SCALE);
        let mut sink = RecordingSink::default();
        let base = display.regenerations();

        display.render(&canvas, &mut sink, viewport());
        display.render(&canvas, &mut sink, viewport());
        assert_eq!(display.regenerations(), base);

        // Pixel edits do not touch the palette.
        canvas.set_pixel(5, 1, 1);
        display.render(&canvas, &mut sink, viewport());
        assert_eq!(display.regenerations(), base);

        canvas.set_palette_colour(Rgba([1, 2, 3, 255]), 200);
        display.render(&canvas, &mut sink, viewport());
        assert_eq!(display.regenerations(), base + 1);
        assert_eq!(*display.swatch().get_pixel(8, 12), Rgba([1, 2, 3, 255]));

        display.render(&canvas, &mut sink, viewport());
        assert_eq!(display.regenerations(), base + 1);
    }

    #[test]
    fn rewriting_same_colour_is_not_a_change() {
        let mut canvas = IndexedCanvas::new(4, 4);
        let mut display = PaletteDisplay::new(&canvas, DEFAULT_SCALE);
        let base = display.regenerations();
        canvas.set_palette_colour(canvas.palette_colour(1), 1);
        assert!(!display.refresh(&canvas));
        assert_eq!(display.regenerations(), base);
    }

    #[test]
    fn draws_in_layer_order() {
        let canvas = IndexedCanvas::new(4, 4);
        let mut display = PaletteDisplay::new(&canvas, DEFAULT_SCALE);
        let mut sink = RecordingSink::default();
        display.render(&canvas, &mut sink, viewport());

        let rect = display.rect(viewport());
        assert_eq!(rect.size(), Vec2::splat(273.0));
        assert_eq!(rect.max, Pos2::new(784.0, 584.0));

        assert_eq!(
            sink.draws[0],
            Draw::Fill(rect.translate(Vec2::new(8.0, 8.0)), display.shadow_colour)
        );
        // 273px area with 128px tiles: 3x3 tiles, last ones cropped.
        let checkers: Vec<_> = sink.draws[1..10].to_vec();
        assert!(checkers.iter().all(|d| matches!(d, Draw::Image { slot: ImageSlot::Checker, .. })));
        let Draw::Image { uv, rect: last, .. } = checkers[8].clone() else { unreachable!() };
        assert_eq!(last.max, rect.max);
        assert!((uv.max.x - 17.0 / 128.0).abs() < 1e-6);
        // Only the first tile carries the upload.
        assert!(matches!(checkers[0], Draw::Image { changed: true, .. }));
        assert!(checkers[1..].iter().all(|d| matches!(d, Draw::Image { changed: false, .. })));

        assert!(matches!(
            sink.draws[10],
            Draw::Image { slot: ImageSlot::PaletteSwatch, changed: true, .. }
        ));
        let lines = sink.draws[11..].iter().filter(|d| matches!(d, Draw::Line(..))).count();
        assert_eq!(lines, 34);
        assert_eq!(sink.draws.len(), 11 + 34);
        assert_eq!(
            sink.draws[11],
            Draw::Line(rect.min, Pos2::new(rect.min.x + 272.0, rect.min.y), display.grid_colour)
        );
    }

    #[test]
    fn checker_is_built_once() {
        let canvas = IndexedCanvas::new(4, 4);
        let mut display = PaletteDisplay::new(&canvas, 2);
        assert!(display.checker.is_none());

        let mut first = RecordingSink::default();
        display.render(&canvas, &mut first, viewport());
        let mut second = RecordingSink::default();
        display.render(&canvas, &mut second, viewport());

        assert!(matches!(first.draws[1], Draw::Image { slot: ImageSlot::Checker, changed: true, .. }));
        assert!(matches!(second.draws[1], Draw::Image { slot: ImageSlot::Checker, changed: false, .. }));
        assert!(matches!(second.draws[2], Draw::Image { slot: ImageSlot::PaletteSwatch, changed: false, .. }));

        let tile = display.checker.as_ref().unwrap();
        assert_eq!(tile.dimensions(), (CHECKER_TILE, CHECKER_TILE));
        assert_eq!(*tile.get_pixel(0, 0), CHECKER_DARK);
        assert_eq!(*tile.get_pixel(1, 0), CHECKER_LIGHT);
        assert_eq!(*tile.get_pixel(1, 1), CHECKER_DARK);
    }

    #[test]
    fn hidden_display_still_tracks_palette() {
        let mut canvas = IndexedCanvas::new(4, 4);
        let mut display = PaletteDisplay::new(&canvas, DEFAULT_SCALE);
        display.visible = false;
        let base = display.regenerations();
        canvas.set_palette_colour(Rgba([0, 0, 0, 255]), 3);
        let mut sink = RecordingSink::default();
        display.render(&canvas, &mut sink, viewport());
        assert!(sink.draws.is_empty());
        assert_eq!(display.regenerations(), base + 1);
    }

    #[test]
    fn set_scale_relays_out() {
        let canvas = IndexedCanvas::new(4, 4);
        let mut display = PaletteDisplay::new(&canvas, DEFAULT_SCALE);
        display.set_scale(4);
        assert_eq!(display.rect(viewport()).size(), Vec2::splat(65.0));
        display.set_scale(0);
        assert_eq!(display.scale(), 1);
    }

    #[test]
    fn cycler_walks_the_hue_circle() {
        let cycler = PaletteCycler::default();
        assert_eq!(cycler.colour_at(0.0), Rgba([255, 0, 0, 255]));
        assert_eq!(cycler.colour_at(5.0), Rgba([255, 0, 0, 255]));
        // A third of the period lands on green.
        let third = 5.0 / 3.0;
        assert_eq!(cycler.colour_at(third), hsv_colour(HUE_CYCLE / 3, 1.0, 1.0));

        let mut canvas = IndexedCanvas::new(2, 2);
        canvas.materialize();
        let mut cycler = PaletteCycler { slot: 7, period_ms: 1000 };
        cycler.update(&FrameInput::at(0, 0).with_time(0.5), &mut canvas, viewport());
        assert_eq!(canvas.palette_colour(7), hsv_colour(HUE_CYCLE / 2, 1.0, 1.0));
        assert!(canvas.is_dirty());

        canvas.materialize();
        cycler.update(&FrameInput::at(0, 0).with_time(0.5), &mut canvas, viewport());
        assert!(!canvas.is_dirty());
    }
}
