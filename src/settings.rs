use std::collections::HashMap;
use std::path::{Path, PathBuf};

use eframe::egui;

use crate::canvas::DEFAULT_ZOOM;
use crate::components::palette::{DEFAULT_SCALE, PaletteCycler};
use crate::components::tools::Tool;
use crate::input::{FrameInput, InputEvent, key_name, parse_key};

// ═══════════════════════════════════════════════════════════════════════════
// KEYBINDINGS
// ═══════════════════════════════════════════════════════════════════════════

/// A key plus the modifiers that must be held with it.
#[derive(Clone, Debug, PartialEq)]
pub struct KeyCombo {
    pub ctrl: bool,
    pub shift: bool,
    pub alt: bool,
    pub key: egui::Key,
}

impl KeyCombo {
    pub fn key(k: egui::Key) -> Self {
        Self { ctrl: false, shift: false, alt: false, key: k }
    }

    /// Human-readable form, e.g. "Ctrl+F".
    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl { parts.push("Ctrl"); }
        if self.shift { parts.push("Shift"); }
        if self.alt { parts.push("Alt"); }
        parts.push(key_name(self.key).unwrap_or("?"));
        parts.join("+")
    }

    /// Serialize to config string
    pub fn to_config_string(&self) -> Option<String> {
        let mut parts = Vec::new();
        if self.ctrl { parts.push("ctrl".to_string()); }
        if self.shift { parts.push("shift".to_string()); }
        if self.alt { parts.push("alt".to_string()); }
        parts.push(format!("key:{}", key_name(self.key)?));
        Some(parts.join("+"))
    }

    /// Deserialize from config string. A bare key name ("F") is accepted too.
    pub fn from_config_string(s: &str) -> Option<Self> {
        let (mut ctrl, mut shift, mut alt) = (false, false, false);
        let mut key = None;
        for part in s.split('+') {
            let part = part.trim();
            match part {
                "ctrl" => ctrl = true,
                "shift" => shift = true,
                "alt" => alt = true,
                _ => key = parse_key(part.strip_prefix("key:").unwrap_or(part)),
            }
        }
        key.map(|key| Self { ctrl, shift, alt, key })
    }

    fn matches(&self, key: egui::Key, modifiers: egui::Modifiers) -> bool {
        self.key == key
            && self.ctrl == modifiers.command
            && self.shift == modifiers.shift
            && self.alt == modifiers.alt
    }
}

/// All bindable actions in the application
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BindableAction {
    ToolPencil,
    ToolLine,
    ToolFill,
}

impl BindableAction {
    pub fn display_name(&self) -> String {
        match self {
            Self::ToolPencil => t!("keybind.tool_pencil"),
            Self::ToolLine => t!("keybind.tool_line"),
            Self::ToolFill => t!("keybind.tool_fill"),
        }
    }

    /// All actions in display order
    pub fn all() -> &'static [BindableAction] {
        &[Self::ToolPencil, Self::ToolLine, Self::ToolFill]
    }

    /// Name used after `keybind.` in the settings file.
    pub fn config_name(&self) -> &'static str {
        match self {
            Self::ToolPencil => "ToolPencil",
            Self::ToolLine => "ToolLine",
            Self::ToolFill => "ToolFill",
        }
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|a| a.config_name() == name)
    }

    /// The tool this action selects.
    pub fn tool(&self) -> Tool {
        match self {
            Self::ToolPencil => Tool::Pencil,
            Self::ToolLine => Tool::Line,
            Self::ToolFill => Tool::Fill,
        }
    }
}

/// Keybinding map from action to key combo. Actions without an entry are
/// unbound.
#[derive(Clone, Debug)]
pub struct KeyBindings {
    pub bindings: HashMap<BindableAction, KeyCombo>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        use BindableAction::*;
        use egui::Key;
        let mut map = HashMap::new();
        map.insert(ToolPencil, KeyCombo::key(Key::P));
        map.insert(ToolFill,   KeyCombo::key(Key::F));
        Self { bindings: map }
    }
}

impl KeyBindings {
    pub fn get(&self, action: BindableAction) -> Option<&KeyCombo> {
        self.bindings.get(&action)
    }

    /// Serialize all bindings for config file
    pub fn to_config_lines(&self) -> Vec<String> {
        BindableAction::all()
            .iter()
            .filter_map(|action| {
                let combo = self.bindings.get(action)?.to_config_string()?;
                Some(format!("keybind.{}={}", action.config_name(), combo))
            })
            .collect()
    }

    /// Load a single `keybind.<action>=<combo>` line. `none` unbinds.
    pub fn load_config_line(&mut self, action_name: &str, combo_str: &str) {
        let Some(action) = BindableAction::from_config_name(action_name) else {
            log_warn!("Settings: unknown key binding action '{}'", action_name);
            return;
        };
        if combo_str.eq_ignore_ascii_case("none") {
            self.bindings.remove(&action);
            return;
        }
        match KeyCombo::from_config_string(combo_str) {
            Some(combo) => {
                self.bindings.insert(action, combo);
            }
            None => log_warn!("Settings: bad key '{}' for {}", combo_str, action_name),
        }
    }

    /// Actions triggered by this frame's key presses, in press order.
    pub fn dispatch(&self, input: &FrameInput) -> Vec<BindableAction> {
        let modifiers = input.modifiers();
        let mut triggered = Vec::new();
        for event in input.events() {
            let InputEvent::KeyPressed(key) = event else { continue };
            for action in BindableAction::all() {
                if let Some(combo) = self.bindings.get(action)
                    && combo.matches(key, modifiers)
                {
                    triggered.push(*action);
                }
            }
        }
        triggered
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// APP SETTINGS
// ═══════════════════════════════════════════════════════════════════════════

const SETTINGS_FILE: &str = "pixelfe_settings.cfg";

/// Start-up settings read from the settings file.
#[derive(Clone, Debug)]
pub struct AppSettings {
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub initial_zoom: u32,
    /// Upper bound on frames per second; 0 disables the cap.
    pub frame_cap_fps: u32,
    pub palette_scale: u32,
    pub palette_visible: bool,
    pub left_colour: u8,
    pub right_colour: u8,
    /// Palette slot rewritten by the hue cycler, `None` when cycling is off.
    pub cycle_slot: Option<u8>,
    pub cycle_period_ms: u32,
    /// Language code; empty means the system language.
    pub language: String,
    pub keybindings: KeyBindings,
}

impl Default for AppSettings {
    fn default() -> Self {
        let cycler = PaletteCycler::default();
        Self {
            canvas_width: 100,
            canvas_height: 100,
            initial_zoom: DEFAULT_ZOOM,
            frame_cap_fps: 60,
            palette_scale: DEFAULT_SCALE,
            palette_visible: true,
            left_colour: 1,
            right_colour: 2,
            cycle_slot: Some(cycler.slot),
            cycle_period_ms: cycler.period_ms,
            language: String::new(),
            keybindings: KeyBindings::default(),
        }
    }
}

impl AppSettings {
    /// Path to the settings file.
    /// On Linux:   ~/.config/pixelfe/pixelfe_settings.cfg  (XDG_CONFIG_HOME respected)
    /// On Windows: %APPDATA%\PixelFE\pixelfe_settings.cfg
    /// On macOS:   ~/Library/Application Support/PixelFE/pixelfe_settings.cfg
    /// Fallback:   same directory as the executable.
    pub fn settings_path() -> Option<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            let config_dir = std::env::var("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|_| {
                    let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
                    PathBuf::from(home).join(".config")
                })
                .join("pixelfe");
            return Some(config_dir.join(SETTINGS_FILE));
        }
        #[cfg(target_os = "windows")]
        {
            let appdata = std::env::var("APPDATA")
                .or_else(|_| std::env::var("USERPROFILE"))
                .ok()?;
            return Some(PathBuf::from(appdata).join("PixelFE").join(SETTINGS_FILE));
        }
        #[cfg(target_os = "macos")]
        {
            let home = std::env::var("HOME").unwrap_or_else(|_| "~".to_string());
            return Some(
                PathBuf::from(home)
                    .join("Library")
                    .join("Application Support")
                    .join("PixelFE")
                    .join(SETTINGS_FILE),
            );
        }
        #[cfg(not(any(target_os = "linux", target_os = "windows", target_os = "macos")))]
        {
            std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|d| d.join(SETTINGS_FILE)))
        }
    }

    /// Load settings from the default location (defaults if missing or unreadable).
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                log_info!("Loaded settings from {}", path.display());
                Self::parse(&content)
            }
            Err(e) => {
                log_info!("No settings at {} ({}), using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    /// Parse `key=value` lines. Unknown keys and bad values are logged and
    /// leave the default in place.
    pub fn parse(content: &str) -> Self {
        let mut s = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                log_warn!("Settings: ignoring line without '=': {}", line);
                continue;
            };
            let key = key.trim();
            let val = val.trim();
            match key {
                "canvas_width" => parse_into(key, val, &mut s.canvas_width),
                "canvas_height" => parse_into(key, val, &mut s.canvas_height),
                "initial_zoom" => parse_into(key, val, &mut s.initial_zoom),
                "frame_cap_fps" => parse_into(key, val, &mut s.frame_cap_fps),
                "palette_scale" => parse_into(key, val, &mut s.palette_scale),
                "palette_visible" => parse_into(key, val, &mut s.palette_visible),
                "left_colour" => parse_into(key, val, &mut s.left_colour),
                "right_colour" => parse_into(key, val, &mut s.right_colour),
                "cycle_slot" => {
                    if val.eq_ignore_ascii_case("none") {
                        s.cycle_slot = None;
                    } else {
                        match val.parse::<u8>() {
                            Ok(slot) => s.cycle_slot = Some(slot),
                            Err(_) => log_warn!("Settings: bad value '{}' for {}", val, key),
                        }
                    }
                }
                "cycle_period_ms" => parse_into(key, val, &mut s.cycle_period_ms),
                "language" => s.language = val.to_string(),
                _ => {
                    if let Some(action_name) = key.strip_prefix("keybind.") {
                        s.keybindings.load_config_line(action_name, val);
                    } else {
                        log_warn!("Settings: unknown key '{}'", key);
                    }
                }
            }
        }
        s
    }

    pub fn to_config_string(&self) -> String {
        let mut content = String::new();
        content.push_str(&format!("canvas_width={}\n", self.canvas_width));
        content.push_str(&format!("canvas_height={}\n", self.canvas_height));
        content.push_str(&format!("initial_zoom={}\n", self.initial_zoom));
        content.push_str(&format!("frame_cap_fps={}\n", self.frame_cap_fps));
        content.push_str(&format!("palette_scale={}\n", self.palette_scale));
        content.push_str(&format!("palette_visible={}\n", self.palette_visible));
        content.push_str(&format!("left_colour={}\n", self.left_colour));
        content.push_str(&format!("right_colour={}\n", self.right_colour));
        match self.cycle_slot {
            Some(slot) => content.push_str(&format!("cycle_slot={}\n", slot)),
            None => content.push_str("cycle_slot=none\n"),
        }
        content.push_str(&format!("cycle_period_ms={}\n", self.cycle_period_ms));
        content.push_str(&format!("language={}\n", self.language));
        for line in self.keybindings.to_config_lines() {
            content.push_str(&line);
            content.push('\n');
        }
        content
    }

    pub fn save_to(&self, path: &Path) -> std::io::Result<()> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_config_string())
    }

    /// Write the defaults on first launch so there is a file to edit.
    pub fn ensure_file_exists() {
        let Some(path) = Self::settings_path() else { return };
        if path.exists() {
            return;
        }
        match Self::default().save_to(&path) {
            Ok(()) => log_info!("Wrote default settings to {}", path.display()),
            Err(e) => log_warn!("Could not write settings to {}: {}", path.display(), e),
        }
    }
}

/// Parse `val` into `slot`; on failure log and keep the current value.
fn parse_into<T: std::str::FromStr>(key: &str, val: &str, slot: &mut T) {
    match val.parse() {
        Ok(v) => *slot = v,
        Err(_) => log_warn!("Settings: bad value '{}' for {}", val, key),
    }
}
