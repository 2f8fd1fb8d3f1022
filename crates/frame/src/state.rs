use std::time::Duration;

/// Whether the loop keeps iterating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Running,
    /// Terminal: there is no transition out of this state.
    Terminated,
}

/// Timing and quit flag carried from one iteration to the next.
#[derive(Debug, Clone)]
pub struct FrameState {
    timestamp: Option<Duration>,
    delta: f32,
    max_delta: f32,
    quit: bool,
}

impl FrameState {
    /// `max_delta` caps a single step, in seconds, so a stall does not turn
    /// into one huge camera jump.
    pub fn new(max_delta: f32) -> Self {
        Self {
            timestamp: None,
            delta: 0.0,
            max_delta: max_delta.max(0.0),
            quit: false,
        }
    }

    /// Records `now` and returns seconds elapsed since the previous call.
    /// The first call and any backwards clock step yield zero.
    pub fn advance(&mut self, now: Duration) -> f32 {
        self.delta = match self.timestamp {
            Some(previous) => now.saturating_sub(previous).as_secs_f32().min(self.max_delta),
            None => 0.0,
        };
        self.timestamp = Some(now);
        self.delta
    }

    pub fn delta(&self) -> f32 {
        self.delta
    }

    pub fn timestamp(&self) -> Option<Duration> {
        self.timestamp
    }

    pub fn request_quit(&mut self) {
        self.quit = true;
    }

    pub fn is_quit(&self) -> bool {
        self.quit
    }

    pub fn loop_state(&self) -> LoopState {
        if self.quit {
            LoopState::Terminated
        } else {
            LoopState::Running
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_delta_is_zero() {
        let mut s = FrameState::new(0.1);
        assert_eq!(s.advance(Duration::from_secs(42)), 0.0);
        assert_eq!(s.timestamp(), Some(Duration::from_secs(42)));
    }

    #[test]
    fn delta_is_elapsed_seconds() {
        let mut s = FrameState::new(0.1);
        s.advance(Duration::from_millis(1000));
        let d = s.advance(Duration::from_millis(1016));
        assert!((d - 0.016).abs() < 1e-6);
        assert_eq!(s.delta(), d);
    }

    #[test]
    fn backwards_clock_yields_zero() {
        let mut s = FrameState::new(0.1);
        s.advance(Duration::from_millis(500));
        assert_eq!(s.advance(Duration::from_millis(400)), 0.0);
    }

    #[test]
    fn long_stalls_are_capped() {
        let mut s = FrameState::new(0.1);
        s.advance(Duration::ZERO);
        assert_eq!(s.advance(Duration::from_secs(3)), 0.1);
    }

    #[test]
    fn quit_is_sticky() {
        let mut s = FrameState::new(0.1);
        assert_eq!(s.loop_state(), LoopState::Running);
        s.request_quit();
        s.advance(Duration::from_secs(1));
        assert!(s.is_quit());
        assert_eq!(s.loop_state(), LoopState::Terminated);
    }
}
