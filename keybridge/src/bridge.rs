use core::future::pending;

use embassy_futures::select::{Either4, select4};
use embassy_time::{Instant, Timer};
use embedded_hal::digital::OutputPin;

use crate::config::{BridgeChannels, BridgeConfig};
use crate::engine::TransmissionEngine;
use crate::hid::{HidTransport, TransportEvent};
use crate::state::ConnectionState;

/// Consumer side of the bridge.
///
/// Owns the transmission engine and is the only place where transport callbacks, engine timers
/// and connection requests are handled, so none of them ever run concurrently.
pub struct KeystrokeBridge<'a, O: OutputPin, const QUEUE_SIZE: usize> {
    config: &'a BridgeConfig,
    channels: &'a BridgeChannels<QUEUE_SIZE>,
    engine: TransmissionEngine,
    /// On while connected
    status_led: Option<O>,
}

impl<'a, O: OutputPin, const QUEUE_SIZE: usize> KeystrokeBridge<'a, O, QUEUE_SIZE> {
    pub fn new(config: &'a BridgeConfig, channels: &'a BridgeChannels<QUEUE_SIZE>, status_led: Option<O>) -> Self {
        Self {
            config,
            channels,
            engine: TransmissionEngine::new(config.timing),
            status_led,
        }
    }

    pub fn engine(&self) -> &TransmissionEngine {
        &self.engine
    }

    pub fn connection_state(&self) -> ConnectionState {
        self.channels.connection.get()
    }

    /// Main bridge task: handles transport events, engine timers, queued characters and
    /// connection requests, forever.
    pub async fn run<T: HidTransport>(&mut self, transport: &mut T) -> ! {
        let channels = self.channels;
        self.update_status_led();
        loop {
            self.kick(transport, Instant::now());

            let deadline = self.engine.deadline();
            let wait_for_chars = channels.connection.is_connected() && !self.engine.is_send_active();
            let timer = async move {
                match deadline {
                    Some(at) => Timer::at(at).await,
                    None => pending::<()>().await,
                }
            };
            let chars = async move {
                if wait_for_chars {
                    channels.queue.wait_enqueued().await
                } else {
                    pending::<()>().await
                }
            };

            match select4(
                channels.transport_events.receive(),
                timer,
                chars,
                channels.connect_request.wait(),
            )
            .await
            {
                Either4::First(event) => self.process_event(event, transport, Instant::now()),
                Either4::Second(()) => self.fire_timer(transport, Instant::now()),
                // Queued characters are picked up by `kick` at the top of the loop
                Either4::Third(()) => {}
                Either4::Fourth(()) => self.service_connect_request(transport),
            }
        }
    }

    /// Handle a lifecycle callback from the transport.
    pub fn process_event<T: HidTransport>(&mut self, event: TransportEvent, transport: &mut T, now: Instant) {
        match event {
            TransportEvent::LowerLayerReady => {
                if self.channels.connection.on_lower_layer_ready() {
                    info!("Transport ready, press button {} to connect", self.config.connect_trigger);
                    self.update_status_led();
                }
            }
            TransportEvent::ConnectionOpened(Ok(())) => {
                self.channels.connection.on_connection_opened(true);
                info!("HID connected");
                self.update_status_led();
                self.kick(transport, now);
            }
            TransportEvent::ConnectionOpened(Err(e)) => {
                self.channels.connection.on_connection_opened(false);
                warn!("Connection failed, status {:#04x}", e.status);
                self.engine.reset();
                self.update_status_led();
            }
            TransportEvent::ConnectionClosed => {
                if self.channels.connection.on_connection_closed() {
                    info!("HID disconnected");
                    self.engine.reset();
                    self.update_status_led();
                } else {
                    debug!("Connection closed while not connected");
                }
            }
            TransportEvent::CanSendNow => self.engine.on_can_send_now(transport, now),
        }
    }

    /// Advance the engine if its timer has expired at `now`.
    pub fn fire_timer<T: HidTransport>(&mut self, transport: &mut T, now: Instant) {
        self.engine.on_timer(&self.channels.queue, transport, now);
    }

    /// Start typing if the bridge is connected, the engine is idle and characters are pending.
    pub fn kick<T: HidTransport>(&mut self, transport: &mut T, now: Instant) -> bool {
        if !self.channels.connection.is_connected() || self.engine.is_send_active() || self.channels.queue.is_empty()
        {
            return false;
        }
        self.engine.start(&self.channels.queue, transport, now)
    }

    /// Start the connection requested by the connect trigger.
    pub fn service_connect_request<T: HidTransport>(&mut self, transport: &mut T) {
        if self.channels.connection.get() != ConnectionState::Connecting {
            return;
        }
        let address = self.config.target_address;
        if let Err(e) = transport.initiate_connection(address) {
            error!("Connect to {:?} failed: {:?}", address, e);
            self.channels.connection.on_connection_opened(false);
            self.update_status_led();
        }
    }

    fn update_status_led(&mut self) {
        let connected = self.channels.connection.is_connected();
        if let Some(led) = self.status_led.as_mut() {
            let result = if connected { led.set_high() } else { led.set_low() };
            if result.is_err() {
                error!("Failed to set status LED");
            }
        }
    }
}
