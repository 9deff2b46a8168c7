//! Coarse progress reporting for UI feedback.
//!
//! Percentages are observability only, never correctness-bearing. Callers
//! that do not care pass `NoopProgress`; closures are wrapped in
//! `ProgressFn`.

pub trait ProgressSink {
    /// Report overall progress as a percentage in [0, 100].
    fn update(&mut self, percent: u8);
}

/// Adapter turning a closure into a `ProgressSink`.
pub struct ProgressFn<F: FnMut(u8)>(pub F);

impl<F: FnMut(u8)> ProgressSink for ProgressFn<F> {
    fn update(&mut self, percent: u8) {
        (self.0)(percent)
    }
}

pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn update(&mut self, _percent: u8) {}
}
