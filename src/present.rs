//! Presentation: the drawing primitives elements render through, the element
//! capability traits the frame driver iterates, and the canvas view.

use std::collections::HashMap;
use eframe::egui;
use egui::{Color32, Pos2, Rect, Stroke, TextureHandle, TextureOptions, Vec2};
use image::RgbaImage;

use crate::canvas::IndexedCanvas;
use crate::colour::rgba_image_to_color_image;
use crate::input::FrameInput;

/// Window background behind everything.
pub const BACKGROUND: Color32 = Color32::from_rgb(12, 23, 39);
/// Drop shadow behind the canvas.
pub const CANVAS_SHADOW: Color32 = Color32::from_rgb(6, 11, 19);

/// Whole-texture UV rectangle.
pub const FULL_UV: Rect = Rect {
    min: Pos2::ZERO,
    max: Pos2 { x: 1.0, y: 1.0 },
};

/// Identifies a bitmap across frames so the sink can keep its texture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ImageSlot {
    Canvas,
    PaletteSwatch,
    Checker,
}

impl ImageSlot {
    fn texture_name(self) -> &'static str {
        match self {
            ImageSlot::Canvas => "canvas",
            ImageSlot::PaletteSwatch => "palette_swatch",
            ImageSlot::Checker => "palette_checker",
        }
    }
}

// ============================================================================
// CAPABILITIES
// ============================================================================

/// Where elements draw to.
pub trait PresentSink {
    fn fill_rect(&mut self, rect: Rect, colour: Color32);

    /// Draw `image` (or the part of it selected by `uv`) stretched over
    /// `rect`. `changed` tells the sink whether the bitmap differs from what
    /// it last received for `slot`.
    fn image(&mut self, slot: ImageSlot, image: &RgbaImage, changed: bool, rect: Rect, uv: Rect);

    /// One-pixel line.
    fn line(&mut self, from: Pos2, to: Pos2, colour: Color32);
}

/// Something drawn once per frame, after all updates.
pub trait Renderable {
    fn render(&mut self, canvas: &mut IndexedCanvas, sink: &mut dyn PresentSink, viewport: Rect);
}

/// Something that reacts to input once per frame, before rendering.
pub trait Updatable {
    fn update(&mut self, input: &FrameInput, canvas: &mut IndexedCanvas, viewport: Rect);
}

// ============================================================================
// EGUI SINK
// ============================================================================

/// Textures kept alive between frames, one per slot.
#[derive(Default)]
pub struct TextureCache {
    handles: HashMap<ImageSlot, TextureHandle>,
}

impl TextureCache {
    /// Upload `image` if the slot is empty or the bitmap changed, and return
    /// the slot's texture.
    fn sync(
        &mut self,
        ctx: &egui::Context,
        slot: ImageSlot,
        image: &RgbaImage,
        changed: bool,
    ) -> &TextureHandle {
        if changed && let Some(handle) = self.handles.get_mut(&slot) {
            handle.set(rgba_image_to_color_image(image), TextureOptions::NEAREST);
        }
        self.handles.entry(slot).or_insert_with(|| {
            ctx.load_texture(
                slot.texture_name(),
                rgba_image_to_color_image(image),
                TextureOptions::NEAREST,
            )
        })
    }
}

/// Paints through an `egui::Painter`.
pub struct EguiSink<'a> {
    pub ctx: &'a egui::Context,
    pub painter: &'a egui::Painter,
    pub textures: &'a mut TextureCache,
}

impl PresentSink for EguiSink<'_> {
    fn fill_rect(&mut self, rect: Rect, colour: Color32) {
        self.painter.rect_filled(rect, 0.0, colour);
    }

    fn image(&mut self, slot: ImageSlot, image: &RgbaImage, changed: bool, rect: Rect, uv: Rect) {
        let id = self.textures.sync(self.ctx, slot, image, changed).id();
        self.painter.image(id, rect, uv, Color32::WHITE);
    }

    fn line(&mut self, from: Pos2, to: Pos2, colour: Color32) {
        // Centre on the pixel so a 1px stroke covers exactly one row/column.
        let half = Vec2::splat(0.5);
        self.painter
            .line_segment([from + half, to + half], Stroke::new(1.0, colour));
    }
}

// ============================================================================
// CANVAS VIEW
// ============================================================================

/// Presents the canvas: background, drop shadow, then the display bitmap.
#[derive(Default)]
pub struct CanvasView;

impl Renderable for CanvasView {
    fn render(&mut self, canvas: &mut IndexedCanvas, sink: &mut dyn PresentSink, viewport: Rect) {
        sink.fill_rect(viewport, BACKGROUND);

        let bounds = canvas.bounds(viewport);
        let shift = 8 * canvas.zoom() as i32 - 2;
        let shadow = Rect::from_min_size(
            Pos2::new((bounds.x + shift) as f32, (bounds.y + shift) as f32),
            Vec2::new((bounds.w + 2) as f32, (bounds.h + 2) as f32),
        );
        sink.fill_rect(shadow, CANVAS_SHADOW);

        let changed = canvas.materialize();
        sink.image(ImageSlot::Canvas, canvas.display(), changed, bounds.to_rect(), FULL_UV);
    }
}

// ============================================================================
// RECORDING SINK (tests)
// ============================================================================
