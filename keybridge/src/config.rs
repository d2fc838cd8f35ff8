use core::fmt;
use core::str::FromStr;

use ::heapless::Vec;
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;
use embassy_time::Duration;

use crate::hid::TransportEvent;
use crate::queue::CharQueue;
use crate::state::ConnectionTracker;
use crate::{DEFAULT_QUEUE_SIZE, MAX_BUTTONS, RawMutex, TRANSPORT_EVENT_CHANNEL_SIZE};

/// The config struct for the keystroke bridge.
pub struct BridgeConfig {
    pub timing: TimingConfig,
    /// Host to connect to when the connect trigger is pressed
    pub target_address: BdAddr,
    /// Character typed by each button
    pub buttons: Vec<ButtonBinding, MAX_BUTTONS>,
    /// Source id of the button that starts a connection while disconnected
    pub connect_trigger: usize,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            timing: TimingConfig::default(),
            target_address: BdAddr::new([0xbc, 0xec, 0x5d, 0xe6, 0x15, 0x03]),
            buttons: Vec::from_iter([
                ButtonBinding::new(0, b'd'),
                ButtonBinding::new(1, b'w'),
                ButtonBinding::new(2, b'a'),
                ButtonBinding::new(3, b's'),
            ]),
            connect_trigger: 0,
        }
    }
}

impl BridgeConfig {
    /// Character bound to `source`, if any
    pub fn character_for(&self, source: usize) -> Option<u8> {
        self.binding_for(source).map(|(_, character)| character)
    }

    /// Index of the binding of `source` in `buttons`, and its character.
    ///
    /// The index is always below [`MAX_BUTTONS`], whatever the source id is.
    pub fn binding_for(&self, source: usize) -> Option<(usize, u8)> {
        self.buttons
            .iter()
            .position(|b| b.source == source)
            .map(|slot| (slot, self.buttons[slot].character))
    }
}

/// Timing of the typing protocol and the input debouncer
#[derive(Clone, Copy, Debug)]
pub struct TimingConfig {
    /// How long a key stays pressed between the key-down and the key-up report
    pub key_down_hold: Duration,
    /// Gap after a key-up report before the next character is typed
    pub inter_key_delay: Duration,
    /// Back-off after a character that has no keycode
    pub retry_delay: Duration,
    /// Minimum interval between two accepted presses of the same button
    pub debounce_window: Duration,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            key_down_hold: Duration::from_millis(20),
            inter_key_delay: Duration::from_millis(20),
            retry_delay: Duration::from_millis(20),
            debounce_window: Duration::from_millis(300),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ButtonBinding {
    pub source: usize,
    pub character: u8,
}

impl ButtonBinding {
    pub const fn new(source: usize, character: u8) -> Self {
        Self { source, character }
    }
}

/// Bluetooth device address, most significant byte first
#[derive(Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BdAddr(pub [u8; 6]);

impl BdAddr {
    pub const fn new(bytes: [u8; 6]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}:{:02X}:{:02X}:{:02X}:{:02X}:{:02X}",
            b[0], b[1], b[2], b[3], b[4], b[5]
        )
    }
}

impl fmt::Debug for BdAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressParseError {
    /// Not exactly six colon separated groups
    InvalidLength,
    /// A group is not a two digit hex number
    InvalidHex,
}

impl FromStr for BdAddr {
    type Err = AddressParseError;

    /// Parse the `"BC:EC:5D:E6:15:03"` form, case insensitive
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0u8; 6];
        let mut groups = s.split(':');
        for byte in bytes.iter_mut() {
            let group = groups.next().ok_or(AddressParseError::InvalidLength)?;
            if group.len() != 2 || !group.bytes().all(|b| b.is_ascii_hexdigit()) {
                return Err(AddressParseError::InvalidHex);
            }
            *byte = u8::from_str_radix(group, 16).map_err(|_| AddressParseError::InvalidHex)?;
        }
        if groups.next().is_some() {
            return Err(AddressParseError::InvalidLength);
        }
        Ok(Self(bytes))
    }
}

/// Channels and shared state connecting the input task, the transport and the bridge task.
///
/// Everything in here is const-constructible, so the whole bundle can live in a `static`.
pub struct BridgeChannels<const QUEUE_SIZE: usize = DEFAULT_QUEUE_SIZE> {
    /// Characters waiting to be typed
    pub queue: CharQueue<QUEUE_SIZE>,
    /// Lifecycle events from the transport
    pub transport_events: Channel<RawMutex, TransportEvent, TRANSPORT_EVENT_CHANNEL_SIZE>,
    /// Raised by the input task when the connect trigger fires while disconnected
    pub connect_request: Signal<RawMutex, ()>,
    pub connection: ConnectionTracker,
}

impl<const QUEUE_SIZE: usize> Default for BridgeChannels<QUEUE_SIZE> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const QUEUE_SIZE: usize> BridgeChannels<QUEUE_SIZE> {
    pub const fn new() -> Self {
        Self {
            queue: CharQueue::new(),
            transport_events: Channel::new(),
            connect_request: Signal::new(),
            connection: ConnectionTracker::new(),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_parse_address() {
        let addr: BdAddr = "BC:EC:5D:E6:15:03".parse().unwrap();
        assert_eq!(addr, BdAddr::new([0xbc, 0xec, 0x5d, 0xe6, 0x15, 0x03]));
        assert_eq!(addr, BridgeConfig::default().target_address);
        let lower: BdAddr = "bc:ec:5d:e6:15:03".parse().unwrap();
        assert_eq!(addr, lower);
    }

    #[test]
    fn test_parse_address_errors() {
        assert_eq!("BC:EC:5D:E6:15".parse::<BdAddr>(), Err(AddressParseError::InvalidLength));
        assert_eq!(
            "BC:EC:5D:E6:15:03:00".parse::<BdAddr>(),
            Err(AddressParseError::InvalidLength)
        );
        assert_eq!("BC:EC:5D:E6:15:0G".parse::<BdAddr>(), Err(AddressParseError::InvalidHex));
        assert_eq!("BC:EC:5D:E6:15:3".parse::<BdAddr>(), Err(AddressParseError::InvalidHex));
        assert_eq!("BC:EC:5D:E6:15:+3".parse::<BdAddr>(), Err(AddressParseError::InvalidHex));
        assert_eq!("".parse::<BdAddr>(), Err(AddressParseError::InvalidHex));
    }

    #[test]
    fn test_address_display() {
        let addr = BdAddr::new([0xbc, 0xec, 0x5d, 0xe6, 0x15, 0x03]);
        assert_eq!(format!("{}", addr), "BC:EC:5D:E6:15:03");
    }

    #[test]
    fn test_default_bindings() {
        let config = BridgeConfig::default();
        assert_eq!(config.character_for(0), Some(b'd'));
        assert_eq!(config.character_for(1), Some(b'w'));
        assert_eq!(config.character_for(2), Some(b'a'));
        assert_eq!(config.character_for(3), Some(b's'));
        assert_eq!(config.character_for(4), None);
        assert_eq!(config.connect_trigger, 0);
        assert_eq!(config.timing.debounce_window, Duration::from_millis(300));
    }

    #[test]
    fn test_binding_slot_is_position() {
        let config = BridgeConfig {
            buttons: Vec::from_iter([ButtonBinding::new(20, b'a'), ButtonBinding::new(10, b'd')]),
            connect_trigger: 10,
            ..BridgeConfig::default()
        };
        assert_eq!(config.binding_for(20), Some((0, b'a')));
        assert_eq!(config.binding_for(10), Some((1, b'd')));
        assert_eq!(config.binding_for(0), None);
    }
}
