use crate::config::InputConfig;
use bevy_ecs::prelude::Resource;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::warn;
use winit::event::{ElementState, MouseButton, WindowEvent};
use winit::keyboard::{Key, NamedKey};

/// Logical actions the zoning tool listens to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    /// Primary: select while held, apply on release.
    Apply,
    /// Secondary: cycle the zoning mode.
    SecondaryApply,
    Cancel,
    TogglePanel,
}

impl InputAction {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "apply" => Some(Self::Apply),
            "secondary_apply" => Some(Self::SecondaryApply),
            "cancel" => Some(Self::Cancel),
            "toggle_panel" => Some(Self::TogglePanel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ActionState {
    held: bool,
    pressed: bool,
    released: bool,
}

#[derive(Resource)]
pub struct Input {
    bindings: InputBindings,
    actions: HashMap<InputAction, ActionState>,
    shift_held: bool,
    ctrl_held: bool,
}

impl Input {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(path: impl AsRef<Path>) -> Self {
        Self::with_bindings(InputBindings::load_or_default(path))
    }

    /// Builds bindings from an already parsed `action -> keys` table.
    pub fn from_binding_table(table: &HashMap<String, Vec<String>>, origin: &str) -> Self {
        let config = InputConfigFile { bindings: table.clone() };
        Self::with_bindings(InputBindings::from_config(config, origin))
    }

    /// Bindings file first, then the inline table on top of it.
    pub fn from_input_config(config: &InputConfig) -> Self {
        let mut table = match config.bindings_path.as_deref() {
            Some(path) => InputConfigFile::read_table(Path::new(path)),
            None => HashMap::new(),
        };
        table.extend(config.bindings.iter().map(|(action, keys)| (action.clone(), keys.clone())));
        if table.is_empty() {
            return Self::default();
        }
        Self::from_binding_table(&table, "config")
    }

    fn with_bindings(bindings: InputBindings) -> Self {
        Self { bindings, actions: HashMap::new(), shift_held: false, ctrl_held: false }
    }

    pub fn push(&mut self, ev: InputEvent) {
        match ev {
            InputEvent::Key { key, pressed } => {
                if let Key::Named(named) = &key {
                    match named {
                        NamedKey::Shift => self.shift_held = pressed,
                        NamedKey::Control => self.ctrl_held = pressed,
                        _ => {}
                    }
                }
                if let Some(trigger) = BindingTrigger::from_event_key(&key) {
                    self.apply_trigger(&trigger, pressed);
                }
            }
            InputEvent::MouseButton { button, pressed } => {
                if let Some(trigger) = BindingTrigger::from_mouse_button(button) {
                    self.apply_trigger(&trigger, pressed);
                }
            }
            InputEvent::Other => {}
        }
    }

    pub fn clear_frame(&mut self) {
        for state in self.actions.values_mut() {
            state.pressed = false;
            state.released = false;
        }
    }

    pub fn was_pressed(&self, action: InputAction) -> bool {
        self.actions.get(&action).is_some_and(|state| state.pressed)
    }

    pub fn was_released(&self, action: InputAction) -> bool {
        self.actions.get(&action).is_some_and(|state| state.released)
    }

    pub fn is_held(&self, action: InputAction) -> bool {
        self.actions.get(&action).is_some_and(|state| state.held)
    }

    fn apply_trigger(&mut self, trigger: &BindingTrigger, pressed: bool) {
        let (shift, ctrl) = (self.shift_held, self.ctrl_held);
        let actions: Vec<_> = self
            .bindings
            .actions_for(trigger)
            .filter(|(binding, _)| !pressed || binding.modifiers_satisfied(shift, ctrl))
            .map(|(_, action)| action)
            .collect();
        for action in actions {
            let state = self.actions.entry(action).or_default();
            if pressed {
                // Key repeat arrives as another press while held.
                if !state.held {
                    state.pressed = true;
                }
                state.held = true;
            } else if state.held {
                state.held = false;
                state.released = true;
            }
        }
    }
}

impl Default for Input {
    fn default() -> Self {
        Self::with_bindings(InputBindings::default())
    }
}

#[derive(Debug, Clone)]
struct InputBindings {
    trigger_to_actions: HashMap<BindingTrigger, Vec<(InputKeyBinding, InputAction)>>,
}

impl InputBindings {
    fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str::<InputConfigFile>(&contents) {
                Ok(config) => Self::from_config(config, &path.display().to_string()),
                Err(err) => {
                    warn!("[input] Failed to parse {}: {err}. Falling back to default bindings.", path.display());
                    Self::default()
                }
            },
            Err(err) => {
                warn!("[input] Failed to read {}: {err}. Falling back to default bindings.", path.display());
                Self::default()
            }
        }
    }

    fn from_config(config: InputConfigFile, origin: &str) -> Self {
        let overrides = config.into_overrides(origin);
        let mut action_map = Self::default_action_map();
        for (action, keys) in overrides {
            if keys.is_empty() {
                continue;
            }
            action_map.insert(action, keys);
        }
        Self::from_action_map(action_map)
    }

    fn default_action_map() -> HashMap<InputAction, Vec<InputKeyBinding>> {
        use InputAction::*;
        let mut map = HashMap::new();
        map.insert(Apply, vec![InputKeyBinding::plain(BindingTrigger::Mouse(MouseCode::Left))]);
        map.insert(SecondaryApply, vec![InputKeyBinding::plain(BindingTrigger::Mouse(MouseCode::Right))]);
        map.insert(Cancel, vec![InputKeyBinding::plain(BindingTrigger::Named(NamedKeyCode::Escape))]);
        map.insert(
            TogglePanel,
            vec![InputKeyBinding { trigger: BindingTrigger::Character("z".into()), shift: true, ctrl: false }],
        );
        map
    }

    fn from_action_map(action_map: HashMap<InputAction, Vec<InputKeyBinding>>) -> Self {
        let mut trigger_to_actions: HashMap<BindingTrigger, Vec<(InputKeyBinding, InputAction)>> = HashMap::new();
        for (action, keys) in action_map {
            for key in keys {
                trigger_to_actions.entry(key.trigger.clone()).or_default().push((key, action));
            }
        }
        Self { trigger_to_actions }
    }

    fn actions_for(&self, trigger: &BindingTrigger) -> impl Iterator<Item = (&InputKeyBinding, InputAction)> + '_ {
        self.trigger_to_actions.get(trigger).into_iter().flatten().map(|(binding, action)| (binding, *action))
    }
}

impl Default for InputBindings {
    fn default() -> Self {
        Self::from_action_map(Self::default_action_map())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum BindingTrigger {
    Character(String),
    Named(NamedKeyCode),
    Mouse(MouseCode),
}

impl BindingTrigger {
    fn from_event_key(key: &Key) -> Option<Self> {
        match key {
            Key::Character(ch) => {
                let s = ch.to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(Self::Character(s.to_lowercase()))
                }
            }
            Key::Named(named) => NamedKeyCode::from_named_key(named).map(Self::Named),
            _ => None,
        }
    }

    fn from_mouse_button(button: MouseButton) -> Option<Self> {
        match button {
            MouseButton::Left => Some(Self::Mouse(MouseCode::Left)),
            MouseButton::Right => Some(Self::Mouse(MouseCode::Right)),
            MouseButton::Middle => Some(Self::Mouse(MouseCode::Middle)),
            _ => None,
        }
    }

    fn from_config_value(raw: &str) -> Option<Self> {
        if let Some(named) = NamedKeyCode::from_str(raw) {
            return Some(Self::Named(named));
        }
        if let Some(mouse) = MouseCode::from_str(raw) {
            return Some(Self::Mouse(mouse));
        }
        if raw.chars().count() == 1 {
            return Some(Self::Character(raw.to_string()));
        }
        None
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct InputKeyBinding {
    trigger: BindingTrigger,
    shift: bool,
    ctrl: bool,
}

impl InputKeyBinding {
    fn plain(trigger: BindingTrigger) -> Self {
        Self { trigger, shift: false, ctrl: false }
    }

    fn modifiers_satisfied(&self, shift_held: bool, ctrl_held: bool) -> bool {
        (!self.shift || shift_held) && (!self.ctrl || ctrl_held)
    }

    /// Parses `z`, `escape`, `mouse_left` or chords such as `shift+z`.
    fn from_config_value(raw: &str) -> Result<Self, ()> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(());
        }
        let mut parts: Vec<&str> = normalized.split('+').map(str::trim).collect();
        let key = parts.pop().ok_or(())?;
        let mut shift = false;
        let mut ctrl = false;
        for modifier in parts {
            match modifier {
                "shift" => shift = true,
                "ctrl" | "control" => ctrl = true,
                _ => return Err(()),
            }
        }
        let trigger = BindingTrigger::from_config_value(key).ok_or(())?;
        Ok(Self { trigger, shift, ctrl })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum NamedKeyCode {
    Escape,
    Enter,
    Space,
    Tab,
}

impl NamedKeyCode {
    fn from_named_key(key: &NamedKey) -> Option<Self> {
        match key {
            NamedKey::Escape => Some(Self::Escape),
            NamedKey::Enter => Some(Self::Enter),
            NamedKey::Space => Some(Self::Space),
            NamedKey::Tab => Some(Self::Tab),
            _ => None,
        }
    }

    fn from_str(value: &str) -> Option<Self> {
        match value {
            "escape" | "esc" => Some(Self::Escape),
            "enter" | "return" => Some(Self::Enter),
            "space" => Some(Self::Space),
            "tab" => Some(Self::Tab),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum MouseCode {
    Left,
    Right,
    Middle,
}

impl MouseCode {
    fn from_str(value: &str) -> Option<Self> {
        match value {
            "mouse_left" | "lmb" => Some(Self::Left),
            "mouse_right" | "rmb" => Some(Self::Right),
            "mouse_middle" | "mmb" => Some(Self::Middle),
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InputConfigFile {
    #[serde(default)]
    bindings: HashMap<String, Vec<String>>,
}

impl InputConfigFile {
    fn read_table(path: &Path) -> HashMap<String, Vec<String>> {
        let parsed = fs::read_to_string(path)
            .map_err(|err| err.to_string())
            .and_then(|contents| serde_json::from_str::<InputConfigFile>(&contents).map_err(|err| err.to_string()));
        match parsed {
            Ok(config) => config.bindings,
            Err(err) => {
                warn!("[input] Failed to load {}: {err}. Using inline bindings only.", path.display());
                HashMap::new()
            }
        }
    }

    fn into_overrides(self, origin: &str) -> HashMap<InputAction, Vec<InputKeyBinding>> {
        let mut overrides = HashMap::new();
        for (action_name, keys) in self.bindings {
            let action_key = action_name.trim().to_lowercase();
            match InputAction::from_str(&action_key) {
                Some(action) => {
                    let mut parsed = Vec::new();
                    for key in keys {
                        match InputKeyBinding::from_config_value(&key) {
                            Ok(binding) => parsed.push(binding),
                            Err(_) => {
                                warn!("[input] {origin}: unknown key '{key}' for action '{action_name}', ignoring.")
                            }
                        }
                    }
                    if parsed.is_empty() {
                        warn!("[input] {origin}: action '{action_name}' has no valid keys, keeping defaults.");
                        continue;
                    }
                    overrides.insert(action, parsed);
                }
                None => warn!("[input] {origin}: unknown action '{action_name}', ignoring."),
            }
        }
        overrides
    }
}

pub enum InputEvent {
    Key { key: Key, pressed: bool },
    MouseButton { button: MouseButton, pressed: bool },
    Other,
}

impl InputEvent {
    pub fn from_window_event(ev: &WindowEvent) -> Self {
        match ev {
            WindowEvent::MouseInput { state, button, .. } => {
                InputEvent::MouseButton { button: *button, pressed: *state == ElementState::Pressed }
            }
            WindowEvent::KeyboardInput { event, .. } => InputEvent::Key {
                key: event.logical_key.clone(),
                pressed: event.state == ElementState::Pressed,
            },
            _ => InputEvent::Other,
        }
    }

    pub fn mouse(button: MouseButton, pressed: bool) -> Self {
        InputEvent::MouseButton { button, pressed }
    }

    pub fn named(key: NamedKey, pressed: bool) -> Self {
        InputEvent::Key { key: Key::Named(key), pressed }
    }

    pub fn character(ch: &str, pressed: bool) -> Self {
        InputEvent::Key { key: Key::Character(ch.into()), pressed }
    }
}
