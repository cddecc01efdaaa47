// Release builds are GUI-subsystem binaries on Windows: no console window.
// Debug builds keep the console so `--help` and panics stay visible.
#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use clap::Parser;
use eframe::egui;
use pixelfe::app::PixelFEApp;
use pixelfe::cli::CliArgs;
use pixelfe::{i18n, log_err, logger, t};

fn main() -> Result<(), eframe::Error> {
    let args = CliArgs::parse();

    // Initialize session log (overwrites previous session log)
    logger::init();

    // Initialize the internationalization system
    i18n::init();

    let settings = args.resolve_settings();
    i18n::set_language(&settings.language);

    // Define the native window options
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_maximized(true)
            .with_title(t!("app.title")),
        ..Default::default()
    };

    // Run the application
    let result = eframe::run_native(
        "PixelFE",
        options,
        Box::new(move |cc| Box::new(PixelFEApp::new(cc, settings))),
    );
    if let Err(e) = &result {
        log_err!("Window failed: {}", e);
    }
    result
}
