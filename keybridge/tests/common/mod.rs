#![allow(dead_code)]

use core::cell::RefCell;

use keybridge::config::BdAddr;
use keybridge::hid::{HidTransport, KEYBOARD_REPORT_LEN, TransportError};

// Init logger for tests
#[ctor::ctor]
pub fn init_log() {
    let _ = env_logger::builder()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}

pub const KEY_UP: [u8; KEYBOARD_REPORT_LEN] = [0xa1, 0x01, 0, 0, 0, 0, 0, 0, 0, 0];

pub const fn key_down(modifier: u8, keycode: u8) -> [u8; KEYBOARD_REPORT_LEN] {
    [0xa1, 0x01, modifier, 0x00, keycode, 0, 0, 0, 0, 0]
}

/// Everything the bridge asked the transport to do, in order
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TransportCall {
    RequestCredit,
    Report([u8; KEYBOARD_REPORT_LEN]),
    Connect(BdAddr),
}

/// Transport that records calls into a shared log, so a test can inspect it while the bridge
/// holds the transport
pub struct RecordingTransport<'a> {
    pub calls: &'a RefCell<Vec<TransportCall>>,
}

impl<'a> RecordingTransport<'a> {
    pub fn new(calls: &'a RefCell<Vec<TransportCall>>) -> Self {
        Self { calls }
    }
}

impl HidTransport for RecordingTransport<'_> {
    fn request_send_credit(&mut self) {
        self.calls.borrow_mut().push(TransportCall::RequestCredit);
    }

    fn send_report(&mut self, report: &[u8; KEYBOARD_REPORT_LEN]) -> Result<(), TransportError> {
        self.calls.borrow_mut().push(TransportCall::Report(*report));
        Ok(())
    }

    fn initiate_connection(&mut self, address: BdAddr) -> Result<(), TransportError> {
        self.calls.borrow_mut().push(TransportCall::Connect(address));
        Ok(())
    }
}

/// Only the reports, credit requests and connects filtered out
pub fn reports(calls: &RefCell<Vec<TransportCall>>) -> Vec<[u8; KEYBOARD_REPORT_LEN]> {
    calls
        .borrow()
        .iter()
        .filter_map(|c| match c {
            TransportCall::Report(r) => Some(*r),
            _ => None,
        })
        .collect()
}

pub fn credit_requests(calls: &RefCell<Vec<TransportCall>>) -> usize {
    calls
        .borrow()
        .iter()
        .filter(|c| matches!(c, TransportCall::RequestCredit))
        .count()
}
