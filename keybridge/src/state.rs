use core::sync::atomic::{AtomicU8, Ordering};

/// Lifecycle of the connection to the host
#[repr(u8)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionState {
    /// The transport is still starting
    Booting = 0,
    NotConnected = 1,
    /// An outgoing connection was started and no result arrived yet
    Connecting = 2,
    Connected = 3,
}

impl From<u8> for ConnectionState {
    fn from(value: u8) -> Self {
        match value {
            0 => ConnectionState::Booting,
            1 => ConnectionState::NotConnected,
            2 => ConnectionState::Connecting,
            3 => ConnectionState::Connected,
            _ => ConnectionState::NotConnected,
        }
    }
}

/// Connection state shared between the input task and the bridge task.
///
/// Lifecycle transitions are applied by the bridge task only. The input task reads the state and
/// may move `NotConnected` to `Connecting` when the connect trigger fires.
pub struct ConnectionTracker {
    state: AtomicU8,
}

impl Default for ConnectionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectionTracker {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(ConnectionState::Booting as u8),
        }
    }

    pub fn get(&self) -> ConnectionState {
        self.state.load(Ordering::Acquire).into()
    }

    pub fn is_connected(&self) -> bool {
        self.get() == ConnectionState::Connected
    }

    /// The transport finished booting. Only the first call has an effect.
    pub fn on_lower_layer_ready(&self) -> bool {
        self.transition(ConnectionState::Booting, ConnectionState::NotConnected)
    }

    /// Move `NotConnected` to `Connecting`, return false if the tracker was in any other state.
    pub fn try_begin_connecting(&self) -> bool {
        self.transition(ConnectionState::NotConnected, ConnectionState::Connecting)
    }

    /// Apply the result of a connection attempt, returns the new state
    pub fn on_connection_opened(&self, success: bool) -> ConnectionState {
        let new_state = if success {
            ConnectionState::Connected
        } else {
            ConnectionState::NotConnected
        };
        self.set(new_state);
        new_state
    }

    /// The connection was closed. Returns true if the tracker was connected before.
    pub fn on_connection_closed(&self) -> bool {
        let prev: ConnectionState = self
            .state
            .swap(ConnectionState::NotConnected as u8, Ordering::AcqRel)
            .into();
        prev == ConnectionState::Connected
    }

    fn set(&self, state: ConnectionState) {
        self.state.store(state as u8, Ordering::Release);
    }

    fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_starts_booting() {
        let tracker = ConnectionTracker::new();
        assert_eq!(tracker.get(), ConnectionState::Booting);
        assert!(!tracker.is_connected());
    }

    #[test]
    fn test_lower_layer_ready_once() {
        let tracker = ConnectionTracker::new();
        assert!(tracker.on_lower_layer_ready());
        assert_eq!(tracker.get(), ConnectionState::NotConnected);
        tracker.on_connection_opened(true);
        // A second ready signal must not knock the tracker out of Connected
        assert!(!tracker.on_lower_layer_ready());
        assert_eq!(tracker.get(), ConnectionState::Connected);
    }

    #[test]
    fn test_connect_cycle() {
        let tracker = ConnectionTracker::new();
        tracker.on_lower_layer_ready();
        assert!(tracker.try_begin_connecting());
        assert!(!tracker.try_begin_connecting());
        assert_eq!(tracker.get(), ConnectionState::Connecting);
        assert_eq!(tracker.on_connection_opened(true), ConnectionState::Connected);
        assert!(tracker.is_connected());
        assert!(tracker.on_connection_closed());
        assert_eq!(tracker.get(), ConnectionState::NotConnected);
        assert!(tracker.try_begin_connecting());
    }

    #[test]
    fn test_connection_failure() {
        let tracker = ConnectionTracker::new();
        tracker.on_lower_layer_ready();
        tracker.try_begin_connecting();
        assert_eq!(tracker.on_connection_opened(false), ConnectionState::NotConnected);
        assert!(!tracker.on_connection_closed());
    }

    #[test]
    fn test_cannot_connect_while_booting() {
        let tracker = ConnectionTracker::new();
        assert!(!tracker.try_begin_connecting());
        assert_eq!(tracker.get(), ConnectionState::Booting);
    }
}
