//! # keybridge
//!
//! Turns debounced button presses into keystrokes on a paired wireless host.
//!
//! Characters produced by the input task are queued and typed one at a time by the
//! [`engine::TransmissionEngine`]: a key-down report, a short hold, then an all-released report.
//! Every report waits for a send credit from the transport, so at most one report is ever in flight.
//!
//! ## Feature flags
#![doc = document_features::document_features!()]
#![cfg_attr(not(test), no_std)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod bridge;
pub mod config;
pub mod debounce;
pub mod engine;
pub mod hid;
pub mod hid_state;
pub mod input;
pub mod keycode;
pub mod queue;
pub mod state;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;

pub use crate::bridge::KeystrokeBridge;
pub use crate::config::{BridgeChannels, BridgeConfig};

/// Raw mutex used by every channel and signal shared between the input task and the bridge task.
pub type RawMutex = CriticalSectionRawMutex;

/// Default number of characters buffered between the input task and the engine
pub const DEFAULT_QUEUE_SIZE: usize = 16;
/// Number of transport lifecycle events that can be buffered before the transport has to wait
pub const TRANSPORT_EVENT_CHANNEL_SIZE: usize = 8;
/// Max number of physical buttons that can be bound to characters
pub const MAX_BUTTONS: usize = 8;
