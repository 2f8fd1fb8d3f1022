//! Translation from winit events to viewer input events.

use std::collections::HashSet;

use modelview_input::{KeyState, MouseButton};
use winit::event::{MouseButton as WinitButton, MouseScrollDelta};
use winit::keyboard::KeyCode;

/// Pixels per scroll line for touchpads that report pixel deltas.
const PIXELS_PER_LINE: f32 = 20.0;

/// Currently held keys, reduced to the movement snapshot the loop consumes.
#[derive(Debug, Default)]
pub struct HeldKeys {
    held: HashSet<KeyCode>,
}

impl HeldKeys {
    /// Records a key transition. Returns the new snapshot when it changed.
    pub fn update(&mut self, key: KeyCode, pressed: bool) -> Option<KeyState> {
        let before = self.snapshot();
        if pressed {
            self.held.insert(key);
        } else {
            self.held.remove(&key);
        }
        let after = self.snapshot();
        (after != before).then_some(after)
    }

    /// Forgets every key, e.g. when the window loses focus.
    pub fn clear(&mut self) -> Option<KeyState> {
        let before = self.snapshot();
        self.held.clear();
        (before != KeyState::default()).then_some(KeyState::default())
    }

    pub fn snapshot(&self) -> KeyState {
        let held = |key| self.held.contains(&key);
        KeyState {
            forward: held(KeyCode::KeyW),
            backward: held(KeyCode::KeyS),
            left: held(KeyCode::KeyA),
            right: held(KeyCode::KeyD),
            sprint: held(KeyCode::ShiftLeft) || held(KeyCode::ShiftRight),
        }
    }
}

pub fn mouse_button(button: WinitButton) -> MouseButton {
    match button {
        WinitButton::Left => MouseButton::Left,
        WinitButton::Right => MouseButton::Right,
        WinitButton::Middle => MouseButton::Middle,
        WinitButton::Back => MouseButton::Other(3),
        WinitButton::Forward => MouseButton::Other(4),
        WinitButton::Other(n) => MouseButton::Other(n),
    }
}

/// Vertical scroll in lines, positive away from the user.
pub fn scroll_amount(delta: MouseScrollDelta) -> f32 {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => y,
        MouseScrollDelta::PixelDelta(position) => position.y as f32 / PIXELS_PER_LINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn movement_keys_map_to_snapshot() {
        let mut keys = HeldKeys::default();
        let state = keys.update(KeyCode::KeyW, true).unwrap();
        assert!(state.forward && !state.backward);
        let state = keys.update(KeyCode::ShiftLeft, true).unwrap();
        assert!(state.forward && state.sprint);
        let state = keys.update(KeyCode::KeyW, false).unwrap();
        assert!(!state.forward && state.sprint);
    }

    #[test]
    fn unrelated_keys_do_not_emit() {
        let mut keys = HeldKeys::default();
        assert_eq!(keys.update(KeyCode::KeyQ, true), None);
        keys.update(KeyCode::KeyD, true);
        // Key repeat reports the same press again.
        assert_eq!(keys.update(KeyCode::KeyD, true), None);
    }

    #[test]
    fn clearing_releases_everything() {
        let mut keys = HeldKeys::default();
        assert_eq!(keys.clear(), None);
        keys.update(KeyCode::KeyA, true);
        assert_eq!(keys.clear(), Some(KeyState::default()));
        assert!(!keys.snapshot().is_moving());
    }

    #[test]
    fn buttons_and_scroll_translate() {
        assert_eq!(mouse_button(WinitButton::Left), MouseButton::Left);
        assert_eq!(mouse_button(WinitButton::Other(9)), MouseButton::Other(9));
        assert_eq!(scroll_amount(MouseScrollDelta::LineDelta(0.0, -2.0)), -2.0);
        let pixels = MouseScrollDelta::PixelDelta(PhysicalPosition::new(0.0, 40.0));
        assert_eq!(scroll_amount(pixels), 2.0);
    }
}
