use crate::canvas::IndexedCanvas;
use crate::components::palette::{PaletteCycler, PaletteDisplay};
use crate::components::tools::ToolSession;
use crate::input::{FrameInput, InputTracker};
use crate::present::{
    BACKGROUND, CanvasView, EguiSink, PresentSink, Renderable, TextureCache, Updatable,
};
use crate::settings::{AppSettings, BindableAction, KeyBindings};
use eframe::egui;
use egui::Rect;
use std::time::{Duration, Instant};

// ============================================================================
// FRAME PACER - caps the frame rate by sleeping out the frame budget
// ============================================================================

pub struct FramePacer {
    /// `None` when uncapped.
    min_frame: Option<Duration>,
    last: Option<Instant>,
}

impl FramePacer {
    /// Frame budget of `1000 / fps` whole milliseconds; 0 fps means no cap.
    pub fn new(fps: u32) -> Self {
        let min_frame = (fps > 0).then(|| Duration::from_millis(1000 / u64::from(fps)));
        Self {
            min_frame,
            last: None,
        }
    }

    pub fn min_frame(&self) -> Option<Duration> {
        self.min_frame
    }

    /// How long to sleep after a frame that took `elapsed`.
    pub fn remaining(&self, elapsed: Duration) -> Option<Duration> {
        self.min_frame?
            .checked_sub(elapsed)
            .filter(|d| !d.is_zero())
    }

    /// Block until the current frame has used its budget, then start the next.
    pub fn wait(&mut self) {
        if let Some(last) = self.last
            && let Some(sleep) = self.remaining(last.elapsed())
        {
            std::thread::sleep(sleep);
        }
        self.last = Some(Instant::now());
    }
}

// ============================================================================
// EDITOR - canvas plus everything that reads or writes it each frame
// ============================================================================

pub struct Editor {
    pub canvas: IndexedCanvas,
    pub tools: ToolSession,
    pub palette: PaletteDisplay,
    pub cycler: Option<PaletteCycler>,
    pub bindings: KeyBindings,
    view: CanvasView,
}

impl Editor {
    pub fn from_settings(settings: &AppSettings) -> Self {
        let mut canvas = IndexedCanvas::new(settings.canvas_width, settings.canvas_height);
        canvas.set_zoom(i32::try_from(settings.initial_zoom).unwrap_or(i32::MAX));

        let mut palette = PaletteDisplay::new(&canvas, settings.palette_scale);
        palette.visible = settings.palette_visible;

        let cycler = settings.cycle_slot.map(|slot| PaletteCycler {
            slot,
            period_ms: settings.cycle_period_ms,
        });

        for action in BindableAction::all() {
            if let Some(combo) = settings.keybindings.get(*action) {
                log_info!("Key binding: {} = {}", action.display_name(), combo.display());
            }
        }

        Self {
            canvas,
            tools: ToolSession::new(settings.left_colour, settings.right_colour),
            palette,
            cycler,
            bindings: settings.keybindings.clone(),
            view: CanvasView,
        }
    }

    /// One frame: key bindings, then every updatable, then every renderable.
    pub fn step(&mut self, input: &FrameInput, viewport: Rect, sink: &mut dyn PresentSink) {
        for action in self.bindings.dispatch(input) {
            self.tools.switch_tool(action.tool());
        }

        let mut updatables: Vec<&mut dyn Updatable> = Vec::with_capacity(2);
        if let Some(cycler) = self.cycler.as_mut() {
            updatables.push(cycler);
        }
        updatables.push(&mut self.tools);
        for updatable in updatables {
            updatable.update(input, &mut self.canvas, viewport);
        }

        let renderables: [&mut dyn Renderable; 2] = [&mut self.view, &mut self.palette];
        for renderable in renderables {
            renderable.render(&mut self.canvas, sink, viewport);
        }
    }

    /// Window title: app name, active tool and zoom.
    pub fn title(&self) -> String {
        t!(
            "title.format",
            app = t!("app.title"),
            tool = self.tools.label(),
            zoom = self.canvas.zoom()
        )
    }
}

// ============================================================================
// APP
// ============================================================================

pub struct PixelFEApp {
    editor: Editor,
    tracker: InputTracker,
    textures: TextureCache,
    pacer: FramePacer,
    title: String,
}

impl PixelFEApp {
    pub fn new(_cc: &eframe::CreationContext<'_>, settings: AppSettings) -> Self {
        log_info!(
            "Starting: {}x{} canvas, zoom {}, {} fps cap",
            settings.canvas_width,
            settings.canvas_height,
            settings.initial_zoom,
            settings.frame_cap_fps
        );
        Self {
            editor: Editor::from_settings(&settings),
            tracker: InputTracker::default(),
            textures: TextureCache::default(),
            pacer: FramePacer::new(settings.frame_cap_fps),
            title: String::new(),
        }
    }
}

impl eframe::App for PixelFEApp {
    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        let c = BACKGROUND;
        [
            c.r() as f32 / 255.0,
            c.g() as f32 / 255.0,
            c.b() as f32 / 255.0,
            1.0,
        ]
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let input = ctx.input(|i| self.tracker.capture(i));

        egui::CentralPanel::default()
            .frame(egui::Frame::none())
            .show(ctx, |ui| {
                let viewport = ui.max_rect();
                let mut sink = EguiSink {
                    ctx,
                    painter: ui.painter(),
                    textures: &mut self.textures,
                };
                self.editor.step(&input, viewport, &mut sink);
            });

        // --- Dynamic window title: "PixelFE - <tool> - <zoom>x" ---
        let title = self.editor.title();
        if title != self.title {
            ctx.send_viewport_cmd(egui::ViewportCommand::Title(title.clone()));
            self.title = title;
        }

        self.pacer.wait();
        ctx.request_repaint();
    }
}
