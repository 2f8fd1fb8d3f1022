use modelview_common::Viewport;

/// Mouse buttons the viewer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

/// Snapshot of the held movement keys at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KeyState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    pub sprint: bool,
}

impl KeyState {
    /// True if any directional key is held.
    pub fn is_moving(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// One discrete input event drained by the frame loop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// The user asked to close the viewer.
    Quit,
    /// Scroll wheel movement, positive away from the user.
    Scroll(f32),
    /// Relative pointer movement in screen units, positive `dy` is down.
    PointerMotion { dx: f32, dy: f32 },
    ButtonDown(MouseButton),
    /// Replaces the held-key snapshot.
    Keys(KeyState),
    /// The drawable surface changed size.
    Resized(Viewport),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_state_moving() {
        assert!(!KeyState::default().is_moving());
        let sprint_only = KeyState {
            sprint: true,
            ..KeyState::default()
        };
        assert!(!sprint_only.is_moving());
        let forward = KeyState {
            forward: true,
            ..KeyState::default()
        };
        assert!(forward.is_moving());
    }

    #[test]
    fn pointer_motion_carries_deltas() {
        let e = InputEvent::PointerMotion { dx: 1.5, dy: -2.0 };
        assert!(matches!(e, InputEvent::PointerMotion { dx, dy } if dx == 1.5 && dy == -2.0));
    }
}
