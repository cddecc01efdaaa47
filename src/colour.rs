use eframe::egui;
use egui::{Color32, ColorImage};
use image::{Rgba, RgbaImage};

/// Length of one hue ramp; a full hue circle is six ramps.
pub const HUE_RAMP: i32 = 255;
pub const HUE_CYCLE: i32 = HUE_RAMP * 6;

// -- Colour-space conversions -----------------------------------

/// Colour for an integer hue on a `0..HUE_CYCLE` circle (wrapping), with
/// saturation and value in `0.0..=1.0`. Always opaque.
///
/// The circle runs red → yellow → green → cyan → blue → magenta, each leg a
/// linear ramp of one channel over `HUE_RAMP` steps.
pub fn hsv_colour(hue: i32, saturation: f32, value: f32) -> Rgba<u8> {
    let h = hue.rem_euclid(HUE_CYCLE);
    let t = h % HUE_RAMP;
    let (r, g, b) = match h / HUE_RAMP {
        0 => (255, t, 0),
        1 => (255 - t, 255, 0),
        2 => (0, 255, t),
        3 => (0, 255 - t, 255),
        4 => (t, 0, 255),
        _ => (255, 0, 255 - t),
    };

    let saturation = saturation.clamp(0.0, 1.0);
    let value = value.clamp(0.0, 1.0);
    let channel = |c: i32| -> u8 {
        let desaturated = 255.0 - (255 - c) as f32 * saturation;
        (desaturated * value) as u8
    };
    Rgba([channel(r), channel(g), channel(b), 255])
}

/// Converts an RgbaImage to egui's ColorImage format
pub fn rgba_image_to_color_image(img: &RgbaImage) -> ColorImage {
    let size = [img.width() as usize, img.height() as usize];
    let color_pixels: Vec<Color32> = img
        .as_raw()
        .chunks_exact(4)
        .map(|chunk| Color32::from_rgba_unmultiplied(chunk[0], chunk[1], chunk[2], chunk[3]))
        .collect();

    ColorImage {
        size,
        pixels: color_pixels,
    }
}
