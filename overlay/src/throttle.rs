//! Frame coalescing for high-frequency updates.
//!
//! Pointer-move bursts can outpace the display. [`FrameCoalescer`] keeps only
//! the newest value between ticks, so at most one commit happens per frame.
//! The final value of a gesture is never lost: the owner takes whatever is
//! pending when the gesture ends, whether or not a tick has fired since.

#[cfg(test)]
#[path = "throttle_test.rs"]
mod throttle_test;

/// Holds the latest value pushed since the last take.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<T>,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl<T> FrameCoalescer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new value, replacing any pending one.
    ///
    /// Returns `true` when nothing was pending, i.e. the caller should
    /// schedule a tick.
    pub fn push(&mut self, value: T) -> bool {
        self.pending.replace(value).is_none()
    }

    /// Take the pending value, if any. Called on each tick and once more when
    /// the gesture ends.
    pub fn take(&mut self) -> Option<T> {
        self.pending.take()
    }

    /// Whether a value is waiting for the next tick.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}
