//! Producer side of the bridge: button edges in, queued characters out.
use embassy_futures::select::select_array;
use embassy_time::Instant;
use embedded_hal_async::digital::Wait;

use crate::config::{BridgeChannels, BridgeConfig};
use crate::debounce::{DebounceState, DebouncerTrait, EdgeDebouncer};
use crate::state::ConnectionState;
use crate::MAX_BUTTONS;

/// What happened to a button edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum InputOutcome {
    /// The bound character was queued for typing
    Queued(u8),
    /// The connect trigger was pressed while disconnected, a connection was requested
    ConnectRequested,
    /// Accepted press, but the character is dropped in the current connection state
    Discarded,
    /// Bounce, ignored
    Bounced,
    /// No character is bound to the source
    UnknownSource,
}

/// Turns button edges into characters.
///
/// Only does a timestamp comparison and a non-blocking queue write per edge, it never touches
/// the engine.
pub struct KeyInput<'a, const QUEUE_SIZE: usize> {
    config: &'a BridgeConfig,
    channels: &'a BridgeChannels<QUEUE_SIZE>,
    debouncer: EdgeDebouncer<MAX_BUTTONS>,
}

impl<'a, const QUEUE_SIZE: usize> KeyInput<'a, QUEUE_SIZE> {
    pub fn new(config: &'a BridgeConfig, channels: &'a BridgeChannels<QUEUE_SIZE>) -> Self {
        Self {
            config,
            channels,
            debouncer: EdgeDebouncer::new(config.timing.debounce_window),
        }
    }

    /// Process a falling edge of `source` that happened at `at`.
    pub fn on_edge(&mut self, source: usize, at: Instant) -> InputOutcome {
        let Some((slot, character)) = self.config.binding_for(source) else {
            return InputOutcome::UnknownSource;
        };

        // Debounce slots follow the binding order, source ids can be any pin number
        if self.debouncer.detect_edge_with_debounce(slot, at) == DebounceState::Ignored {
            return InputOutcome::Bounced;
        }

        match self.channels.connection.get() {
            ConnectionState::Connected => {
                debug!("Button {} pressed, queue {}", source, character as char);
                self.channels.queue.enqueue(character);
                InputOutcome::Queued(character)
            }
            ConnectionState::NotConnected if source == self.config.connect_trigger => {
                if self.channels.connection.try_begin_connecting() {
                    info!("Button {} pressed, connecting to {:?}", source, self.config.target_address);
                    self.channels.connect_request.signal(());
                    InputOutcome::ConnectRequested
                } else {
                    InputOutcome::Discarded
                }
            }
            state => {
                debug!("Button {} pressed in {:?}, discarded", source, state);
                InputOutcome::Discarded
            }
        }
    }
}

/// Buttons wired to edge-capable input pins, the pin index is the source id.
pub struct ButtonInput<'a, P: Wait, const N: usize, const QUEUE_SIZE: usize> {
    pins: [P; N],
    input: KeyInput<'a, QUEUE_SIZE>,
}

impl<'a, P: Wait, const N: usize, const QUEUE_SIZE: usize> ButtonInput<'a, P, N, QUEUE_SIZE> {
    pub fn new(pins: [P; N], input: KeyInput<'a, QUEUE_SIZE>) -> Self {
        Self { pins, input }
    }

    /// Wait for the next falling edge on any pin and process it
    pub async fn scan(&mut self) -> Option<InputOutcome> {
        let futs = self.pins.each_mut().map(|pin| pin.wait_for_falling_edge());
        let (result, source) = select_array(futs).await;
        match result {
            Ok(()) => Some(self.input.on_edge(source, Instant::now())),
            Err(_) => {
                error!("Wait for edge on button {} failed", source);
                None
            }
        }
    }

    /// Run the button task forever.
    pub async fn run(&mut self) -> ! {
        loop {
            if let Some(outcome) = self.scan().await {
                trace!("Button edge: {:?}", outcome);
            }
        }
    }
}
