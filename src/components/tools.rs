use eframe::egui;
use egui::Rect;

use crate::canvas::IndexedCanvas;
use crate::input::{FrameInput, InputEvent, MouseButton};
use crate::layout::PixelRect;
use crate::present::Updatable;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Tool {
    #[default]
    Pencil,
    /// Selectable, but draws nothing yet.
    Line,
    Fill,
}

impl Tool {
    pub fn label(&self) -> String {
        match self {
            Tool::Pencil => t!("tool.pencil"),
            Tool::Line => t!("tool.line"),
            Tool::Fill => t!("tool.fill"),
        }
    }

    pub fn all() -> &'static [Tool] {
        &[Tool::Pencil, Tool::Line, Tool::Fill]
    }
}

/// Colour and stroke flag for one mouse button.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StrokeState {
    pub colour: u8,
    pub drawing: bool,
}

impl StrokeState {
    fn new(colour: u8) -> Self {
        Self {
            colour,
            drawing: false,
        }
    }
}

// ============================================================================
// TOOL SESSION
// ============================================================================

/// The active tool and what each mouse button is doing with it.
///
/// At most one button strokes at a time: a press of the other button while a
/// stroke is running is ignored until the stroke ends.
#[derive(Clone, Debug)]
pub struct ToolSession {
    current: Tool,
    left: StrokeState,
    right: StrokeState,
}

impl Default for ToolSession {
    fn default() -> Self {
        Self::new(1, 2)
    }
}

impl ToolSession {
    pub fn new(left_colour: u8, right_colour: u8) -> Self {
        Self {
            current: Tool::default(),
            left: StrokeState::new(left_colour),
            right: StrokeState::new(right_colour),
        }
    }

    pub fn current(&self) -> Tool {
        self.current
    }

    /// Localized name of the active tool.
    pub fn label(&self) -> String {
        self.current.label()
    }

    pub fn colour(&self, button: MouseButton) -> u8 {
        self.stroke(button).colour
    }

    pub fn set_colour(&mut self, button: MouseButton, index: u8) {
        self.stroke_mut(button).colour = index;
    }

    pub fn is_drawing(&self, button: MouseButton) -> bool {
        self.stroke(button).drawing
    }

    fn stroke(&self, button: MouseButton) -> &StrokeState {
        match button {
            MouseButton::Left => &self.left,
            MouseButton::Right => &self.right,
        }
    }

    fn stroke_mut(&mut self, button: MouseButton) -> &mut StrokeState {
        match button {
            MouseButton::Left => &mut self.left,
            MouseButton::Right => &mut self.right,
        }
    }

    /// Deactivate the current tool, activate `tool`. Selecting the active
    /// tool again does nothing.
    pub fn switch_tool(&mut self, tool: Tool) {
        if tool == self.current {
            return;
        }
        self.disable(self.current);
        self.enable(tool);
        log_info!("Tool: {:?} -> {:?}", self.current, tool);
        self.current = tool;
    }

    fn disable(&mut self, tool: Tool) {
        if tool == Tool::Pencil {
            self.left.drawing = false;
            self.right.drawing = false;
        }
    }

    fn enable(&mut self, _tool: Tool) {
        // No tool keeps drag state that has to be primed on activation.
    }

    /// Run one frame of tool logic. Wheel zoom applies whatever the tool, and
    /// before the tool sees the canvas bounds.
    pub fn update(&mut self, input: &FrameInput, canvas: &mut IndexedCanvas, viewport: Rect) {
        let events = input.events();
        for event in &events {
            if let InputEvent::Wheel(steps) = *event {
                canvas.adjust_zoom(steps);
            }
        }

        let bounds = canvas.bounds(viewport);
        match self.current {
            Tool::Pencil => self.pencil(input, &events, canvas, viewport, bounds),
            Tool::Line => {}
            Tool::Fill => self.fill(input, &events, canvas, viewport, bounds),
        }
    }

    // ---- pencil -------------------------------------------------------------

    fn pencil(
        &mut self,
        input: &FrameInput,
        events: &[InputEvent],
        canvas: &mut IndexedCanvas,
        viewport: Rect,
        bounds: PixelRect,
    ) {
        // A button that is up ends its stroke even if the release edge was
        // lost, e.g. while the window was unfocused.
        for button in MouseButton::ALL {
            if !input.held(button) {
                self.stroke_mut(button).drawing = false;
            }
        }

        let (mx, my) = input.pointer();
        for event in events {
            match *event {
                InputEvent::ButtonPressed(button) => {
                    // Only the press needs to land on the canvas; a running
                    // stroke keeps drawing (clamped) when the pointer leaves.
                    if !self.stroke(other(button)).drawing && bounds.contains(mx, my) {
                        let stroke = self.stroke_mut(button);
                        stroke.drawing = true;
                        let colour = stroke.colour;
                        let (x, y) = canvas.map_to_texture(viewport, (mx, my));
                        canvas.set_pixel(colour, x, y);
                    }
                }
                InputEvent::ButtonReleased(button) => {
                    self.stroke_mut(button).drawing = false;
                }
                InputEvent::PointerMoved { from, to } => {
                    let (x0, y0) = canvas.map_to_texture(viewport, from);
                    let (x1, y1) = canvas.map_to_texture(viewport, to);
                    for button in MouseButton::ALL {
                        let stroke = *self.stroke(button);
                        if stroke.drawing {
                            canvas.draw_line(x0, y0, x1, y1, stroke.colour);
                        }
                    }
                }
                InputEvent::KeyPressed(_) | InputEvent::Wheel(_) => {}
            }
        }
    }

    // ---- fill ---------------------------------------------------------------

    fn fill(
        &self,
        input: &FrameInput,
        events: &[InputEvent],
        canvas: &mut IndexedCanvas,
        viewport: Rect,
        bounds: PixelRect,
    ) {
        let (mx, my) = input.pointer();
        if !bounds.contains(mx, my) {
            return;
        }
        let (x, y) = canvas.map_to_texture(viewport, (mx, my));
        for event in events {
            if let InputEvent::ButtonPressed(button) = *event {
                canvas.fill(x, y, self.stroke(button).colour);
            }
        }
    }
}

impl Updatable for ToolSession {
    fn update(&mut self, input: &FrameInput, canvas: &mut IndexedCanvas, viewport: Rect) {
        ToolSession::update(self, input, canvas, viewport);
    }
}

fn other(button: MouseButton) -> MouseButton {
    match button {
        MouseButton::Left => MouseButton::Right,
        MouseButton::Right => MouseButton::Left,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{Pos2, Vec2};

    use MouseButton::{Left, Right};

    /// 10x10 canvas at zoom 4 in a 200x200 viewport: the canvas spans
    /// screen pixels 80..120 on both axes.
    fn setup() -> (ToolSession, IndexedCanvas, Rect) {
        let mut canvas = IndexedCanvas::new(10, 10);
        canvas.set_zoom(4);
        let viewport = Rect::from_min_size(Pos2::ZERO, Vec2::splat(200.0));
        (ToolSession::default(), canvas, viewport)
    }

    #[test]
    fn defaults() {
        let session = ToolSession::default();
        assert_eq!(session.current(), Tool::Pencil);
        assert_eq!(session.colour(Left), 1);
        assert_eq!(session.colour(Right), 2);
        assert!(!session.is_drawing(Left));
        assert!(!session.is_drawing(Right));
    }

    #[test]
    fn pencil_press_sets_pixel_and_drag_draws_line() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(80, 80).press(Left), &mut canvas, viewport);
        assert!(session.is_drawing(Left));
        assert_eq!(canvas.get_pixel(0, 0), Some(1));

        session.update(
            &FrameInput::at(96, 80).moved_from(80, 80).hold(Left),
            &mut canvas,
            viewport,
        );
        for x in 0..=4 {
            assert_eq!(canvas.get_pixel(x, 0), Some(1), "x = {x}");
        }
        assert_eq!(canvas.get_pixel(5, 0), Some(0));

        session.update(&FrameInput::at(96, 80).release(Left), &mut canvas, viewport);
        assert!(!session.is_drawing(Left));
        session.update(&FrameInput::at(96, 100).moved_from(96, 80), &mut canvas, viewport);
        assert_eq!(canvas.get_pixel(4, 5), Some(0));
    }

    #[test]
    fn press_outside_canvas_never_starts_a_stroke() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(10, 10).press(Left), &mut canvas, viewport);
        assert!(!session.is_drawing(Left));

        // Dragging back onto the canvas with the button held draws nothing.
        session.update(
            &FrameInput::at(90, 90).moved_from(10, 10).hold(Left),
            &mut canvas,
            viewport,
        );
        assert!(canvas.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn stroke_continues_off_canvas_clamped() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(80, 80).press(Left), &mut canvas, viewport);
        session.update(
            &FrameInput::at(60, 80).moved_from(80, 80).hold(Left),
            &mut canvas,
            viewport,
        );
        assert!(session.is_drawing(Left));
        assert_eq!(canvas.get_pixel(0, 0), Some(1));
        assert_eq!(canvas.get_pixel(1, 0), Some(0));
    }

    #[test]
    fn buttons_are_mutually_exclusive() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(80, 80).press(Left), &mut canvas, viewport);
        session.update(&FrameInput::at(84, 80).press(Right).hold(Left), &mut canvas, viewport);
        assert!(session.is_drawing(Left));
        assert!(!session.is_drawing(Right));
        assert_eq!(canvas.get_pixel(1, 0), Some(0));

        session.update(&FrameInput::at(84, 80).release(Left).hold(Right), &mut canvas, viewport);
        // Right is still held but its press happened during the left stroke.
        assert!(!session.is_drawing(Right));

        session.update(&FrameInput::at(84, 80).press(Right), &mut canvas, viewport);
        assert!(session.is_drawing(Right));
        assert_eq!(canvas.get_pixel(1, 0), Some(2));
    }

    #[test]
    fn simultaneous_presses_favour_left() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(
            &FrameInput::at(80, 80).press(Left).press(Right),
            &mut canvas,
            viewport,
        );
        assert!(session.is_drawing(Left));
        assert!(!session.is_drawing(Right));
        assert_eq!(canvas.get_pixel(0, 0), Some(1));
    }

    #[test]
    fn leaving_pencil_resets_strokes() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(80, 80).press(Right), &mut canvas, viewport);
        assert!(session.is_drawing(Right));
        session.switch_tool(Tool::Fill);
        assert!(!session.is_drawing(Right));
        session.switch_tool(Tool::Pencil);
        assert!(!session.is_drawing(Right));
    }

    #[test]
    fn switching_to_same_tool_keeps_stroke() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(80, 80).press(Left), &mut canvas, viewport);
        session.switch_tool(Tool::Pencil);
        assert!(session.is_drawing(Left));
    }

    #[test]
    fn stroke_ends_when_button_is_up_without_release_edge() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(&FrameInput::at(80, 80).press(Left), &mut canvas, viewport);
        // Release lost: the next frame simply reports the button up.
        session.update(&FrameInput::at(96, 80).moved_from(80, 80), &mut canvas, viewport);
        assert!(!session.is_drawing(Left));
        assert_eq!(canvas.get_pixel(4, 0), Some(0));
    }

    #[test]
    fn click_within_one_frame_sets_one_pixel() {
        let (mut session, mut canvas, viewport) = setup();
        session.update(
            &FrameInput::at(84, 80).moved_from(80, 80).press(Left).release(Left),
            &mut canvas,
            viewport,
        );
        assert!(!session.is_drawing(Left));
        assert_eq!(canvas.pixels().iter().filter(|&&p| p == 1).count(), 1);
        assert_eq!(canvas.get_pixel(1, 0), Some(1));
    }

    #[test]
    fn fill_uses_button_colour() {
        let (mut session, mut canvas, viewport) = setup();
        session.switch_tool(Tool::Fill);
        session.set_colour(Right, 7);
        session.update(&FrameInput::at(100, 100).press(Right), &mut canvas, viewport);
        assert!(canvas.pixels().iter().all(|&p| p == 7));

        session.update(&FrameInput::at(100, 100).press(Left), &mut canvas, viewport);
        assert!(canvas.pixels().iter().all(|&p| p == 1));
        // Fill never starts a stroke.
        assert!(!session.is_drawing(Left));
    }

    #[test]
    fn fill_outside_canvas_does_nothing() {
        let (mut session, mut canvas, viewport) = setup();
        session.switch_tool(Tool::Fill);
        session.update(&FrameInput::at(120, 120).press(Left), &mut canvas, viewport);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
    }

    #[test]
    fn wheel_zooms_for_every_tool() {
        let (mut session, mut canvas, viewport) = setup();
        for tool in Tool::all() {
            session.switch_tool(*tool);
            let before = canvas.zoom();
            session.update(&FrameInput::at(0, 0).wheel(2), &mut canvas, viewport);
            assert_eq!(canvas.zoom(), before + 2);
        }
        session.update(&FrameInput::at(0, 0).wheel(-100), &mut canvas, viewport);
        assert_eq!(canvas.zoom(), 1);
    }

    #[test]
    fn wheel_at_zoom_limit_keeps_drawing() {
        let (mut session, mut canvas, viewport) = setup();
        canvas.set_zoom(i32::MAX);
        let limit = canvas.zoom();
        session.update(&FrameInput::at(100, 100).press(Left).wheel(5), &mut canvas, viewport);
        assert_eq!(canvas.zoom(), limit);
        assert!(session.is_drawing(Left));
        assert_eq!(canvas.pixels().iter().filter(|&&p| p == 1).count(), 1);
    }

    #[test]
    fn zoom_applies_before_hit_test() {
        let (mut session, mut canvas, viewport) = setup();
        // At zoom 4 the canvas ends at 120; one step in grows it to 75..125.
        session.update(&FrameInput::at(122, 100).press(Left).wheel(1), &mut canvas, viewport);
        assert!(session.is_drawing(Left));
        assert_eq!(canvas.get_pixel(9, 5), Some(1));
    }

    #[test]
    fn line_tool_draws_nothing() {
        let (mut session, mut canvas, viewport) = setup();
        session.switch_tool(Tool::Line);
        session.update(&FrameInput::at(90, 90).press(Left), &mut canvas, viewport);
        assert!(canvas.pixels().iter().all(|&p| p == 0));
        assert!(!session.is_drawing(Left));
    }
}
