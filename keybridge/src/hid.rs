//! Keyboard input report, HID descriptor and the transport the reports are written to.
use crate::config::BdAddr;
use crate::hid_state::HidModifiers;
use crate::keycode::KeyStroke;

/// Transaction header of a HID input report sent on the interrupt channel
pub const HID_INPUT_REPORT: u8 = 0xa1;
/// Report id of the keyboard collection in [`KEYBOARD_DESCRIPTOR`]
pub const KEYBOARD_REPORT_ID: u8 = 0x01;
/// Length of a serialized keyboard report, including header and report id
pub const KEYBOARD_REPORT_LEN: usize = 10;

/// Keyboard descriptor with report id, close to USB HID Specification 1.1, Appendix B.1
#[rustfmt::skip]
pub const KEYBOARD_DESCRIPTOR: [u8; 65] = [
    0x05, 0x01,                    // Usage Page (Generic Desktop)
    0x09, 0x06,                    // Usage (Keyboard)
    0xa1, 0x01,                    // Collection (Application)
    0x85, KEYBOARD_REPORT_ID,      //   Report ID

    // Modifier byte (input)
    0x75, 0x01,                    //   Report Size (1)
    0x95, 0x08,                    //   Report Count (8)
    0x05, 0x07,                    //   Usage Page (Key codes)
    0x19, 0xe0,                    //   Usage Minimum (Keyboard LeftControl)
    0x29, 0xe7,                    //   Usage Maximum (Keyboard Right GUI)
    0x15, 0x00,                    //   Logical Minimum (0)
    0x25, 0x01,                    //   Logical Maximum (1)
    0x81, 0x02,                    //   Input (Data, Variable, Absolute)

    // Reserved byte (input)
    0x75, 0x01,                    //   Report Size (1)
    0x95, 0x08,                    //   Report Count (8)
    0x81, 0x03,                    //   Input (Constant, Variable, Absolute)

    // LED report + padding (output)
    0x95, 0x05,                    //   Report Count (5)
    0x75, 0x01,                    //   Report Size (1)
    0x05, 0x08,                    //   Usage Page (LEDs)
    0x19, 0x01,                    //   Usage Minimum (Num Lock)
    0x29, 0x05,                    //   Usage Maximum (Kana)
    0x91, 0x02,                    //   Output (Data, Variable, Absolute)
    0x95, 0x01,                    //   Report Count (1)
    0x75, 0x03,                    //   Report Size (3)
    0x91, 0x03,                    //   Output (Constant, Variable, Absolute)

    // Keycodes (input)
    0x95, 0x06,                    //   Report Count (6)
    0x75, 0x08,                    //   Report Size (8)
    0x15, 0x00,                    //   Logical Minimum (0)
    0x25, 0xff,                    //   Logical Maximum (255)
    0x05, 0x07,                    //   Usage Page (Key codes)
    0x19, 0x00,                    //   Usage Minimum (Reserved (no event indicated))
    0x29, 0xff,                    //   Usage Maximum (Reserved)
    0x81, 0x00,                    //   Input (Data, Array)

    0xc0,                          // End Collection
];

/// Keyboard report carrying at most one pressed key
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct KeyboardReport {
    pub modifier: HidModifiers,
    pub keycode: u8,
}

impl KeyboardReport {
    /// All keys released
    pub const RELEASED: Self = Self {
        modifier: HidModifiers::NONE,
        keycode: 0,
    };

    /// Serialize into the wire layout
    /// `[header, report id, modifier, reserved, keycode, 0, 0, 0, 0, 0]`.
    pub fn serialize(&self) -> [u8; KEYBOARD_REPORT_LEN] {
        let mut buf = [0; KEYBOARD_REPORT_LEN];
        buf[0] = HID_INPUT_REPORT;
        buf[1] = KEYBOARD_REPORT_ID;
        buf[2] = self.modifier.into_bits();
        buf[4] = self.keycode;
        buf
    }
}

impl From<KeyStroke> for KeyboardReport {
    fn from(stroke: KeyStroke) -> Self {
        Self {
            modifier: stroke.modifier.into(),
            keycode: stroke.keycode,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// No HID channel is open
    Disconnected,
    /// Raw status code reported by the stack
    Raw(u8),
}

/// Outgoing connection failed with the given status code
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ConnectError {
    pub status: u8,
}

/// Lifecycle callbacks that the transport delivers to the bridge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportEvent {
    /// The stack finished booting and is ready to connect
    LowerLayerReady,
    /// Result of an outgoing or incoming HID connection
    ConnectionOpened(Result<(), ConnectError>),
    /// The HID connection was closed
    ConnectionClosed,
    /// A credit requested by [`HidTransport::request_send_credit`] was granted, exactly one report may be sent
    CanSendNow,
}

/// HidTransport is used for writing keyboard reports to the host, via BLE or classic HID.
///
/// The transport only accepts one report per credit: the bridge calls `request_send_credit` and
/// waits for a [`TransportEvent::CanSendNow`] before it calls `send_report`.
pub trait HidTransport {
    /// Ask for permission to send one report. Completion arrives as [`TransportEvent::CanSendNow`].
    fn request_send_credit(&mut self);

    /// Write a serialized keyboard report to the host
    fn send_report(&mut self, report: &[u8; KEYBOARD_REPORT_LEN]) -> Result<(), TransportError>;

    /// Start an outgoing connection to the host at `address`.
    /// The result arrives as [`TransportEvent::ConnectionOpened`].
    fn initiate_connection(&mut self, address: BdAddr) -> Result<(), TransportError>;
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::keycode::translate;

    #[test]
    fn test_report_layout() {
        let report = KeyboardReport::from(translate(b'd').unwrap());
        assert_eq!(report.serialize(), [0xa1, 0x01, 0x00, 0x00, 0x07, 0, 0, 0, 0, 0]);

        let report = KeyboardReport::from(translate(b'D').unwrap());
        assert_eq!(report.serialize(), [0xa1, 0x01, 0x02, 0x00, 0x07, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_released_report() {
        assert_eq!(KeyboardReport::RELEASED.serialize(), [0xa1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(KeyboardReport::default(), KeyboardReport::RELEASED);
    }

    #[test]
    fn test_descriptor_report_id() {
        assert_eq!(KEYBOARD_DESCRIPTOR[6], 0x85);
        assert_eq!(KEYBOARD_DESCRIPTOR[7], KEYBOARD_REPORT_ID);
        assert_eq!(KEYBOARD_DESCRIPTOR.last(), Some(&0xc0));
    }
}
