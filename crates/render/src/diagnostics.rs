use std::collections::VecDeque;

use crate::device::GpuError;

/// One reported per-frame error.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameDiagnostic {
    pub frame: u64,
    pub error: GpuError,
}

/// Sink for tolerated per-frame errors.
///
/// Every report is logged at error level and the most recent ones are kept
/// for inspection. The total count keeps growing past the retained window.
#[derive(Debug, Clone)]
pub struct Diagnostics {
    recent: VecDeque<FrameDiagnostic>,
    capacity: usize,
    total: u64,
}

impl Diagnostics {
    pub const DEFAULT_CAPACITY: usize = 64;

    pub fn new(capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(capacity),
            capacity,
            total: 0,
        }
    }

    pub fn report(&mut self, frame: u64, error: GpuError) {
        match &error {
            GpuError::Api {
                call,
                file,
                line,
                message,
            } => tracing::error!(frame, call, file, line, "gpu error: {message}"),
            other => tracing::error!(frame, "gpu error: {other}"),
        }
        self.total += 1;
        if self.capacity == 0 {
            return;
        }
        if self.recent.len() == self.capacity {
            self.recent.pop_front();
        }
        self.recent.push_back(FrameDiagnostic { frame, error });
    }

    /// Reports the error of `result`, if any, and passes the result on.
    pub fn check<T>(&mut self, frame: u64, result: Result<T, GpuError>) -> Option<T> {
        match result {
            Ok(value) => Some(value),
            Err(error) => {
                self.report(frame, error);
                None
            }
        }
    }

    pub fn recent(&self) -> impl Iterator<Item = &FrameDiagnostic> {
        self.recent.iter()
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(line: u32) -> GpuError {
        GpuError::Api {
            call: "present",
            file: "device.rs",
            line,
            message: "surface outdated".into(),
        }
    }

    #[test]
    fn keeps_most_recent_within_capacity() {
        let mut d = Diagnostics::new(2);
        d.report(1, api(1));
        d.report(2, api(2));
        d.report(3, api(3));
        assert_eq!(d.total(), 3);
        let frames: Vec<u64> = d.recent().map(|r| r.frame).collect();
        assert_eq!(frames, vec![2, 3]);
    }

    #[test]
    fn check_passes_values_and_records_errors() {
        let mut d = Diagnostics::default();
        assert_eq!(d.check(0, Ok::<_, GpuError>(7)), Some(7));
        assert!(d.is_empty());
        assert_eq!(d.check::<()>(4, Err(GpuError::NoFrame("draw_model"))), None);
        assert_eq!(d.total(), 1);
        assert_eq!(d.recent().next().unwrap().frame, 4);
    }

    #[test]
    fn zero_capacity_only_counts() {
        let mut d = Diagnostics::new(0);
        d.report(0, api(9));
        assert_eq!(d.total(), 1);
        assert_eq!(d.recent().count(), 0);
    }
}
