/// Platform-agnostic input handling system
use std::collections::HashSet;

/// On-screen touch buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TouchButton {
    Left,
    Right,
    Boost,
}

impl TouchButton {
    pub const ALL: [TouchButton; 3] = [TouchButton::Left, TouchButton::Right, TouchButton::Boost];

    /// DOM id of the button in the host page
    pub fn element_id(&self) -> &'static str {
        match self {
            TouchButton::Left => "leftBtn",
            TouchButton::Right => "rightBtn",
            TouchButton::Boost => "boostBtn",
        }
    }
}

/// Platform-independent input events
#[derive(Debug, Clone)]
pub enum InputEvent {
    // Keyboard events, carrying the DOM `KeyboardEvent.key` name
    KeyDown(String),
    KeyUp(String),

    // Touch buttons
    Touch { button: TouchButton, pressed: bool },

    // Window events
    FocusLost,
    VisibilityChanged { visible: bool },
}

/// Held keys and touch buttons, written by event handlers and read once per frame
#[derive(Debug, Default)]
pub struct InputState {
    pub pressed_keys: HashSet<String>,
    pub touch: HashSet<TouchButton>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process an input event and update state
    pub fn process_event(&mut self, event: &InputEvent) {
        match event {
            InputEvent::KeyDown(key) => {
                self.pressed_keys.insert(key.to_lowercase());
            }
            InputEvent::KeyUp(key) => {
                self.pressed_keys.remove(&key.to_lowercase());
            }
            InputEvent::Touch { button, pressed } => {
                if *pressed {
                    self.touch.insert(*button);
                } else {
                    self.touch.remove(button);
                }
            }
            InputEvent::FocusLost => {
                self.clear();
            }
            InputEvent::VisibilityChanged { visible: _ } => {
                self.clear();
            }
        }
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    pub fn is_touched(&self, button: TouchButton) -> bool {
        self.touch.contains(&button)
    }

    /// Release everything, e.g. when the page loses focus and key-ups would be missed
    pub fn clear(&mut self) {
        self.pressed_keys.clear();
        self.touch.clear();
    }
}

/// Merged per-frame view of the controls, independent of the source device
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub steer_left: bool,
    pub steer_right: bool,
    pub drift: bool,
    pub nitro: bool,
}

/// Key mapping configuration; names are lowercase `KeyboardEvent.key` values
#[derive(Clone)]
pub struct KeyBindings {
    pub left: Vec<String>,
    pub right: Vec<String>,
    pub drift: Vec<String>,
    pub nitro: Vec<String>,
}

impl Default for KeyBindings {
    fn default() -> Self {
        let keys = |names: &[&str]| names.iter().map(|s| s.to_string()).collect();
        Self {
            left: keys(&["arrowleft", "a"]),
            right: keys(&["arrowright", "d"]),
            drift: keys(&["shift"]),
            nitro: keys(&[" "]),
        }
    }
}

/// High-level input processor
#[derive(Clone, Default)]
pub struct InputProcessor {
    bindings: KeyBindings,
}

impl InputProcessor {
    pub fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    fn any_pressed(input: &InputState, keys: &[String]) -> bool {
        keys.iter().any(|k| input.is_key_pressed(k))
    }

    pub fn is_steering_left(&self, input: &InputState) -> bool {
        Self::any_pressed(input, &self.bindings.left) || input.is_touched(TouchButton::Left)
    }

    pub fn is_steering_right(&self, input: &InputState) -> bool {
        Self::any_pressed(input, &self.bindings.right) || input.is_touched(TouchButton::Right)
    }

    pub fn is_drifting(&self, input: &InputState) -> bool {
        Self::any_pressed(input, &self.bindings.drift)
    }

    pub fn wants_nitro(&self, input: &InputState) -> bool {
        Self::any_pressed(input, &self.bindings.nitro) || input.is_touched(TouchButton::Boost)
    }

    pub fn snapshot(&self, input: &InputState) -> InputSnapshot {
        InputSnapshot {
            steer_left: self.is_steering_left(input),
            steer_right: self.is_steering_right(input),
            drift: self.is_drifting(input),
            nitro: self.wants_nitro(input),
        }
    }

    /// Keys whose browser default (scrolling) should be suppressed
    pub fn is_game_key(&self, key: &str) -> bool {
        let key = key.to_lowercase();
        [&self.bindings.left, &self.bindings.right, &self.bindings.drift, &self.bindings.nitro]
            .iter()
            .any(|keys| keys.contains(&key))
    }
}

pub mod wasm {
    use super::*;
    use web_sys::KeyboardEvent;

    pub fn keyboard_event_to_input(e: &KeyboardEvent, is_down: bool) -> InputEvent {
        let key = e.key();
        if is_down {
            InputEvent::KeyDown(key)
        } else {
            InputEvent::KeyUp(key)
        }
    }

    pub fn touch_to_input(button: TouchButton, pressed: bool) -> InputEvent {
        InputEvent::Touch { button, pressed }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(state: &mut InputState, key: &str) {
        state.process_event(&InputEvent::KeyDown(key.to_string()));
    }

    #[test]
    fn arrows_and_letters_both_steer() {
        let processor = InputProcessor::default();
        let mut state = InputState::new();
        press(&mut state, "ArrowLeft");
        assert!(processor.snapshot(&state).steer_left);

        state.process_event(&InputEvent::KeyUp("ArrowLeft".into()));
        press(&mut state, "D");
        let snap = processor.snapshot(&state);
        assert!(!snap.steer_left && snap.steer_right);
    }

    #[test]
    fn shift_drifts_and_space_boosts() {
        let processor = InputProcessor::default();
        let mut state = InputState::new();
        press(&mut state, "Shift");
        press(&mut state, " ");
        let snap = processor.snapshot(&state);
        assert!(snap.drift && snap.nitro);
        assert!(!snap.steer_left && !snap.steer_right);
    }

    #[test]
    fn touch_buttons_merge_with_keyboard() {
        let processor = InputProcessor::default();
        let mut state = InputState::new();
        state.process_event(&InputEvent::Touch { button: TouchButton::Left, pressed: true });
        state.process_event(&InputEvent::Touch { button: TouchButton::Boost, pressed: true });
        press(&mut state, "ArrowRight");
        let snap = processor.snapshot(&state);
        assert_eq!(
            snap,
            InputSnapshot { steer_left: true, steer_right: true, drift: false, nitro: true }
        );

        state.process_event(&InputEvent::Touch { button: TouchButton::Left, pressed: false });
        assert!(!processor.snapshot(&state).steer_left);
    }

    #[test]
    fn focus_loss_releases_everything() {
        let processor = InputProcessor::default();
        let mut state = InputState::new();
        press(&mut state, "a");
        state.process_event(&InputEvent::Touch { button: TouchButton::Right, pressed: true });
        state.process_event(&InputEvent::FocusLost);
        assert_eq!(processor.snapshot(&state), InputSnapshot::default());

        press(&mut state, " ");
        state.process_event(&InputEvent::VisibilityChanged { visible: false });
        assert_eq!(processor.snapshot(&state), InputSnapshot::default());
    }

    #[test]
    fn game_keys_are_recognized_in_any_case() {
        let processor = InputProcessor::default();
        assert!(processor.is_game_key("ArrowLeft"));
        assert!(processor.is_game_key("Shift"));
        assert!(processor.is_game_key(" "));
        assert!(!processor.is_game_key("Escape"));
    }
}
