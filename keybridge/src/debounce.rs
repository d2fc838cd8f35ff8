use embassy_time::{Duration, Instant};

/// Debounce state
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DebounceState {
    /// The edge is a new press
    Debounced,
    /// The edge came too close to the last accepted one on the same source
    Ignored,
}

pub trait DebouncerTrait {
    /// Check an edge of `source` that happened at `at`.
    fn detect_edge_with_debounce(&mut self, source: usize, at: Instant) -> DebounceState;
}

/// Debouncer for edge-triggered inputs.
///
/// An edge is accepted when it is the first one on its source, or when more than `window` passed
/// since the last accepted edge. Rejected edges don't move the window.
///
/// A source starts without a last timestamp rather than a zero one, so a press within `window`
/// of boot is accepted.
pub struct EdgeDebouncer<const N: usize> {
    /// Last accepted edge for each source
    last_accepted: [Option<Instant>; N],
    window: Duration,
}

impl<const N: usize> EdgeDebouncer<N> {
    pub const fn new(window: Duration) -> Self {
        Self {
            last_accepted: [None; N],
            window,
        }
    }

    /// Timestamp of the last accepted edge of `source`
    pub fn last_accepted(&self, source: usize) -> Option<Instant> {
        self.last_accepted.get(source).copied().flatten()
    }
}

impl<const N: usize> DebouncerTrait for EdgeDebouncer<N> {
    fn detect_edge_with_debounce(&mut self, source: usize, at: Instant) -> DebounceState {
        let Some(last) = self.last_accepted.get_mut(source) else {
            return DebounceState::Ignored;
        };

        if let Some(prev) = *last {
            // An edge older than the last accepted one saturates to zero, so the timestamp never goes back
            if at.saturating_duration_since(prev) <= self.window {
                return DebounceState::Ignored;
            }
        }

        *last = Some(at);
        DebounceState::Debounced
    }
}
