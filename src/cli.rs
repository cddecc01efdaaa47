// ============================================================================
// PixelFE CLI - start-up overrides for the settings file
// ============================================================================
//
// Usage examples:
//   pixelfe --width 32 --height 32 --zoom 12
//   pixelfe --config ./my_settings.cfg --no-cycle
//   pixelfe --fps 0                                    (uncapped frame rate)
//
// Every flag is optional. Anything given here wins over the settings file,
// which in turn wins over the built-in defaults.

use std::path::PathBuf;

use clap::Parser;

use crate::settings::AppSettings;

// ============================================================================
// CLI argument definition (clap Derive)
// ============================================================================

/// PixelFE indexed-colour pixel editor.
#[derive(Parser, Debug, Default)]
#[command(
    name = "pixelfe",
    about = "PixelFE indexed-colour pixel editor",
    long_about = "Paint on a 256-colour indexed canvas with pencil and flood fill.\n\
                  Left and right mouse buttons paint with their own palette colour,\n\
                  the scroll wheel zooms, P and F switch between pencil and fill.\n\n\
                  Example:\n  \
                  pixelfe --width 64 --height 64 --zoom 8"
)]
pub struct CliArgs {
    /// Canvas width in pixels.
    #[arg(long, value_name = "PX")]
    pub width: Option<u32>,

    /// Canvas height in pixels.
    #[arg(long, value_name = "PX")]
    pub height: Option<u32>,

    /// Initial zoom (screen pixels per canvas pixel).
    #[arg(short, long, value_name = "N")]
    pub zoom: Option<u32>,

    /// Frame rate cap; 0 renders as fast as the display allows.
    #[arg(long, value_name = "FPS")]
    pub fps: Option<u32>,

    /// Read settings from this file instead of the per-user settings file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Start with the palette grid hidden.
    #[arg(long)]
    pub no_palette: bool,

    /// Disable palette colour cycling.
    #[arg(long)]
    pub no_cycle: bool,
}

impl CliArgs {
    /// Settings from `--config` (or the default settings file) with the
    /// remaining flags applied on top.
    pub fn resolve_settings(&self) -> AppSettings {
        let mut settings = match &self.config {
            Some(path) => AppSettings::load_from(path),
            None => {
                AppSettings::ensure_file_exists();
                AppSettings::load()
            }
        };
        self.apply(&mut settings);
        settings
    }

    /// Overwrite whatever the command line specifies.
    pub fn apply(&self, settings: &mut AppSettings) {
        if let Some(w) = self.width {
            settings.canvas_width = w;
        }
        if let Some(h) = self.height {
            settings.canvas_height = h;
        }
        if let Some(z) = self.zoom {
            settings.initial_zoom = z;
        }
        if let Some(fps) = self.fps {
            settings.frame_cap_fps = fps;
        }
        if self.no_palette {
            settings.palette_visible = false;
        }
        if self.no_cycle {
            settings.cycle_slot = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    #[test]
    fn flags_override_settings() {
        let args = CliArgs::try_parse_from([
            "pixelfe", "--width", "32", "--zoom", "3", "--fps", "0", "--no-cycle",
        ])
        .unwrap();
        let mut settings = AppSettings::default();
        args.apply(&mut settings);
        assert_eq!(settings.canvas_width, 32);
        assert_eq!(settings.canvas_height, 100);
        assert_eq!(settings.initial_zoom, 3);
        assert_eq!(settings.frame_cap_fps, 0);
        assert_eq!(settings.cycle_slot, None);
        assert!(settings.palette_visible);
    }

    #[test]
    fn no_flags_change_nothing() {
        let args = CliArgs::try_parse_from(["pixelfe"]).unwrap();
        let mut settings = AppSettings::default();
        settings.left_colour = 5;
        args.apply(&mut settings);
        assert_eq!(settings.left_colour, 5);
        assert_eq!(settings.cycle_slot, Some(1));
    }

    #[test]
    fn config_file_is_read_before_flags() {
        let dir = std::env::temp_dir().join(format!("pixelfe_cli_test_{}", std::process::id()));
        let path = dir.join("settings.cfg");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(&path, "canvas_width=20\ncanvas_height=24\n").unwrap();

        let args = CliArgs::try_parse_from([
            OsString::from("pixelfe"),
            OsString::from("--config"),
            path.clone().into_os_string(),
            OsString::from("--height"),
            OsString::from("8"),
            OsString::from("--no-palette"),
        ])
        .unwrap();
        let settings = args.resolve_settings();
        assert_eq!(settings.canvas_width, 20);
        assert_eq!(settings.canvas_height, 8);
        assert!(!settings.palette_visible);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn rejects_bad_numbers() {
        assert!(CliArgs::try_parse_from(["pixelfe", "--width", "-3"]).is_err());
    }
}
