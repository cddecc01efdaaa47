use eframe::egui;
use egui::{Key, Modifiers, PointerButton};

/// Scroll distance (in egui points) that counts as one wheel notch.
pub const POINTS_PER_WHEEL_STEP: f32 = 50.0;

// ============================================================================
// FRAME INPUT - immutable per-frame snapshot
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
}

impl MouseButton {
    pub const ALL: [MouseButton; 2] = [MouseButton::Left, MouseButton::Right];

    fn slot(self) -> usize {
        match self {
            MouseButton::Left => 0,
            MouseButton::Right => 1,
        }
    }

    fn egui_button(self) -> PointerButton {
        match self {
            MouseButton::Left => PointerButton::Primary,
            MouseButton::Right => PointerButton::Secondary,
        }
    }
}

/// Transition flags for one button during one frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ButtonEdges {
    pub pressed: bool,
    pub released: bool,
    pub down: bool,
}

/// Tagged input events, derived from a [`FrameInput`] for table dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputEvent {
    ButtonPressed(MouseButton),
    ButtonReleased(MouseButton),
    KeyPressed(Key),
    PointerMoved { from: (i32, i32), to: (i32, i32) },
    Wheel(i32),
}

/// Everything tools may ask about input, frozen at the start of a frame.
///
/// Tools never see a button change state half way through a frame: the
/// snapshot is built once and only read afterwards.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FrameInput {
    time: f64,
    pointer: (i32, i32),
    prev_pointer: (i32, i32),
    wheel_steps: i32,
    buttons: [ButtonEdges; 2],
    keys_pressed: Vec<Key>,
    modifiers: Modifiers,
}

impl FrameInput {
    /// A quiet frame with the pointer resting at `(x, y)`.
    pub fn at(x: i32, y: i32) -> Self {
        Self {
            pointer: (x, y),
            prev_pointer: (x, y),
            ..Default::default()
        }
    }

    // ---- builders (used by the tracker and by tests) -----------------------

    pub fn moved_from(mut self, x: i32, y: i32) -> Self {
        self.prev_pointer = (x, y);
        self
    }

    pub fn press(mut self, button: MouseButton) -> Self {
        let b = &mut self.buttons[button.slot()];
        b.pressed = true;
        b.down = true;
        self
    }

    pub fn hold(mut self, button: MouseButton) -> Self {
        self.buttons[button.slot()].down = true;
        self
    }

    pub fn release(mut self, button: MouseButton) -> Self {
        let b = &mut self.buttons[button.slot()];
        b.released = true;
        b.down = false;
        self
    }

    pub fn wheel(mut self, steps: i32) -> Self {
        self.wheel_steps = steps;
        self
    }

    pub fn key(mut self, key: Key) -> Self {
        self.keys_pressed.push(key);
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    // ---- queries ------------------------------------------------------------

    /// Went down this frame.
    pub fn pressed(&self, button: MouseButton) -> bool {
        self.buttons[button.slot()].pressed
    }

    /// Went up this frame.
    pub fn released(&self, button: MouseButton) -> bool {
        self.buttons[button.slot()].released
    }

    /// Down at the end of this frame.
    pub fn held(&self, button: MouseButton) -> bool {
        self.buttons[button.slot()].down
    }

    pub fn key_pressed(&self, key: Key) -> bool {
        self.keys_pressed.contains(&key)
    }

    /// Modifier keys held during this frame.
    pub fn modifiers(&self) -> Modifiers {
        self.modifiers
    }

    pub fn pointer(&self) -> (i32, i32) {
        self.pointer
    }

    pub fn prev_pointer(&self) -> (i32, i32) {
        self.prev_pointer
    }

    pub fn moved(&self) -> bool {
        self.pointer != self.prev_pointer
    }

    /// Whole wheel notches this frame, positive away from the user.
    pub fn wheel_steps(&self) -> i32 {
        self.wheel_steps
    }

    /// Seconds since the application started.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// This frame's input as a list of tagged events.
    pub fn events(&self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        for button in MouseButton::ALL {
            if self.pressed(button) {
                events.push(InputEvent::ButtonPressed(button));
            }
            if self.released(button) {
                events.push(InputEvent::ButtonReleased(button));
            }
        }
        events.extend(self.keys_pressed.iter().map(|&k| InputEvent::KeyPressed(k)));
        if self.moved() {
            events.push(InputEvent::PointerMoved {
                from: self.prev_pointer,
                to: self.pointer,
            });
        }
        if self.wheel_steps != 0 {
            events.push(InputEvent::Wheel(self.wheel_steps));
        }
        events
    }
}

// ============================================================================
// INPUT TRACKER - turns egui's input state into FrameInput snapshots
// ============================================================================

/// Carries state between frames: the last known pointer position (egui
/// forgets it when the pointer leaves the window) and the fractional part of
/// smooth scrolling that has not yet added up to a full wheel step.
#[derive(Clone, Debug, Default)]
pub struct InputTracker {
    pointer: (i32, i32),
    wheel_remainder: f32,
}

impl InputTracker {
    pub fn capture(&mut self, input: &egui::InputState) -> FrameInput {
        let prev_pointer = self.pointer;
        if let Some(pos) = input.pointer.hover_pos() {
            self.pointer = (pos.x.floor() as i32, pos.y.floor() as i32);
        }

        let mut snapshot = FrameInput::at(self.pointer.0, self.pointer.1)
            .moved_from(prev_pointer.0, prev_pointer.1)
            .with_time(input.time)
            .with_modifiers(input.modifiers);

        for button in MouseButton::ALL {
            let eb = button.egui_button();
            snapshot.buttons[button.slot()] = ButtonEdges {
                pressed: input.pointer.button_pressed(eb),
                released: input.pointer.button_released(eb),
                down: input.pointer.button_down(eb),
            };
        }

        for event in &input.events {
            if let egui::Event::Key {
                key,
                pressed: true,
                repeat: false,
                ..
            } = event
            {
                snapshot.keys_pressed.push(*key);
            }
        }

        snapshot.wheel_steps = self.accumulate_wheel(input.scroll_delta.y);
        snapshot
    }

    /// Add a scroll amount in points and return the whole steps it completes.
    fn accumulate_wheel(&mut self, points: f32) -> i32 {
        self.wheel_remainder += points / POINTS_PER_WHEEL_STEP;
        let steps = self.wheel_remainder.trunc();
        self.wheel_remainder -= steps;
        steps as i32
    }
}

/// Parse a key name as written in the settings file ("F", "7", "F2", "Space").
pub fn parse_key(name: &str) -> Option<Key> {
    let name = name.trim();
    let upper = name.to_ascii_uppercase();
    let key = match upper.as_str() {
        "A" => Key::A, "B" => Key::B, "C" => Key::C, "D" => Key::D, "E" => Key::E,
        "F" => Key::F, "G" => Key::G, "H" => Key::H, "I" => Key::I, "J" => Key::J,
        "K" => Key::K, "L" => Key::L, "M" => Key::M, "N" => Key::N, "O" => Key::O,
        "P" => Key::P, "Q" => Key::Q, "R" => Key::R, "S" => Key::S, "T" => Key::T,
        "U" => Key::U, "V" => Key::V, "W" => Key::W, "X" => Key::X, "Y" => Key::Y,
        "Z" => Key::Z,
        "0" => Key::Num0, "1" => Key::Num1, "2" => Key::Num2, "3" => Key::Num3,
        "4" => Key::Num4, "5" => Key::Num5, "6" => Key::Num6, "7" => Key::Num7,
        "8" => Key::Num8, "9" => Key::Num9,
        "F1" => Key::F1, "F2" => Key::F2, "F3" => Key::F3, "F4" => Key::F4,
        "F5" => Key::F5, "F6" => Key::F6, "F7" => Key::F7, "F8" => Key::F8,
        "F9" => Key::F9, "F10" => Key::F10, "F11" => Key::F11, "F12" => Key::F12,
        "SPACE" => Key::Space,
        "TAB" => Key::Tab,
        "ESC" | "ESCAPE" => Key::Escape,
        "ENTER" => Key::Enter,
        _ => return None,
    };
    Some(key)
}

/// Name used for `key` in the settings file; the inverse of [`parse_key`].
pub fn key_name(key: Key) -> Option<&'static str> {
    let name = match key {
        Key::A => "A", Key::B => "B", Key::C => "C", Key::D => "D", Key::E => "E",
        Key::F => "F", Key::G => "G", Key::H => "H", Key::I => "I", Key::J => "J",
        Key::K => "K", Key::L => "L", Key::M => "M", Key::N => "N", Key::O => "O",
        Key::P => "P", Key::Q => "Q", Key::R => "R", Key::S => "S", Key::T => "T",
        Key::U => "U", Key::V => "V", Key::W => "W", Key::X => "X", Key::Y => "Y",
        Key::Z => "Z",
        Key::Num0 => "0", Key::Num1 => "1", Key::Num2 => "2", Key::Num3 => "3",
        Key::Num4 => "4", Key::Num5 => "5", Key::Num6 => "6", Key::Num7 => "7",
        Key::Num8 => "8", Key::Num9 => "9",
        Key::F1 => "F1", Key::F2 => "F2", Key::F3 => "F3", Key::F4 => "F4",
        Key::F5 => "F5", Key::F6 => "F6", Key::F7 => "F7", Key::F8 => "F8",
        Key::F9 => "F9", Key::F10 => "F10", Key::F11 => "F11", Key::F12 => "F12",
        Key::Space => "Space",
        Key::Tab => "Tab",
        Key::Escape => "Esc",
        Key::Enter => "Enter",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_set_edges() {
        let input = FrameInput::at(5, 6)
            .moved_from(1, 2)
            .press(MouseButton::Left)
            .release(MouseButton::Right);
        assert!(input.pressed(MouseButton::Left));
        assert!(input.held(MouseButton::Left));
        assert!(input.released(MouseButton::Right));
        assert!(!input.held(MouseButton::Right));
        assert_eq!(input.prev_pointer(), (1, 2));
        assert!(input.moved());
        assert!(!FrameInput::at(3, 3).moved());
    }

    #[test]
    fn events_are_tagged_in_order() {
        let input = FrameInput::at(2, 0)
            .moved_from(0, 0)
            .press(MouseButton::Right)
            .key(Key::F)
            .wheel(-2);
        assert_eq!(
            input.events(),
            vec![
                InputEvent::ButtonPressed(MouseButton::Right),
                InputEvent::KeyPressed(Key::F),
                InputEvent::PointerMoved { from: (0, 0), to: (2, 0) },
                InputEvent::Wheel(-2),
            ]
        );
        assert!(FrameInput::at(0, 0).events().is_empty());
    }

    #[test]
    fn wheel_accumulates_into_whole_steps() {
        let mut tracker = InputTracker::default();
        assert_eq!(tracker.accumulate_wheel(20.0), 0);
        assert_eq!(tracker.accumulate_wheel(40.0), 1);
        assert_eq!(tracker.accumulate_wheel(100.0), 2);
        assert_eq!(tracker.accumulate_wheel(-150.0), -2);
    }

    #[test]
    fn parses_key_names() {
        assert_eq!(parse_key("f"), Some(Key::F));
        assert_eq!(parse_key(" P "), Some(Key::P));
        assert_eq!(parse_key("7"), Some(Key::Num7));
        assert_eq!(parse_key("F11"), Some(Key::F11));
        assert_eq!(parse_key("Esc"), Some(Key::Escape));
        assert_eq!(parse_key("Hyper"), None);
    }

    #[test]
    fn key_names_parse_back() {
        for key in [Key::A, Key::Z, Key::Num0, Key::F12, Key::Space, Key::Escape] {
            let name = key_name(key).unwrap();
            assert_eq!(parse_key(name), Some(key));
        }
        assert_eq!(key_name(Key::ArrowUp), None);
    }
}
