//! Keystroke transmission engine.
//!
//! Types queued characters one at a time as a key-down report, a hold, and a key-up report.
//! Every report is preceded by a send credit request, and the engine never holds more than one
//! outstanding credit, so at most one report is ever in flight.
//!
//! ```text
//!            dequeue ok            grant                 hold expired
//!   Idle ─────────────▶ AwaitingKeyDownGrant ──▶ KeyDownSent ──────────▶ AwaitingKeyUpGrant
//!    ▲  ◀── queue empty ──┐                                                     │ grant
//!    │                    │        timer expired                                ▼
//!    └── disconnect   RetryWait ◀────────── unmappable / key-up sent ───────────┘
//! ```
//!
//! The engine doesn't own a clock or a timer. States with a running timer carry its deadline, and
//! the owner calls [`TransmissionEngine::on_timer`] once [`TransmissionEngine::deadline`] has passed.
//! Leaving such a state cancels its timer.

use embassy_time::Instant;

use crate::config::TimingConfig;
use crate::hid::{HidTransport, KeyboardReport};
use crate::keycode::{KeyStroke, translate};
use crate::queue::CharQueue;

/// State of the transmission engine
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EngineState {
    /// Nothing is being typed
    Idle,
    /// A character was translated, waiting for the credit to send its key-down report
    AwaitingKeyDownGrant(KeyStroke),
    /// Key-down report sent, the key is released at `release_at`
    KeyDownSent { release_at: Instant },
    /// Waiting for the credit to send the key-up report
    AwaitingKeyUpGrant,
    /// Pause before the next character is dequeued
    RetryWait { resume_at: Instant },
}

pub struct TransmissionEngine {
    state: EngineState,
    timing: TimingConfig,
}

impl TransmissionEngine {
    pub fn new(timing: TimingConfig) -> Self {
        Self {
            state: EngineState::Idle,
            timing,
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// True while a character is being typed, or the engine is pausing before the next one
    pub fn is_send_active(&self) -> bool {
        self.state != EngineState::Idle
    }

    /// Deadline of the running timer, if the current state has one
    pub fn deadline(&self) -> Option<Instant> {
        match self.state {
            EngineState::KeyDownSent { release_at } => Some(release_at),
            EngineState::RetryWait { resume_at } => Some(resume_at),
            _ => None,
        }
    }

    /// Start typing the next queued character if the engine is idle.
    ///
    /// Returns true if the engine left `Idle`.
    pub fn start<T: HidTransport, const N: usize>(
        &mut self,
        queue: &CharQueue<N>,
        transport: &mut T,
        now: Instant,
    ) -> bool {
        if self.is_send_active() {
            return false;
        }
        self.send_next(queue, transport, now);
        self.is_send_active()
    }

    /// The transport granted a send credit.
    pub fn on_can_send_now<T: HidTransport>(&mut self, transport: &mut T, now: Instant) {
        match self.state {
            EngineState::AwaitingKeyDownGrant(stroke) => {
                let report = KeyboardReport::from(stroke);
                debug!("Key down: {:?}", report);
                if let Err(e) = transport.send_report(&report.serialize()) {
                    // Keep going, the key-up still has to be sent
                    error!("Send key-down report error: {:?}", e);
                }
                self.state = EngineState::KeyDownSent {
                    release_at: now + self.timing.key_down_hold,
                };
            }
            EngineState::AwaitingKeyUpGrant => {
                debug!("Key up");
                if let Err(e) = transport.send_report(&KeyboardReport::RELEASED.serialize()) {
                    error!("Send key-up report error: {:?}", e);
                }
                self.state = EngineState::RetryWait {
                    resume_at: now + self.timing.inter_key_delay,
                };
            }
            state => warn!("Unexpected send credit in {:?}, ignored", state),
        }
    }

    /// Advance the engine after its timer expired. Does nothing if the deadline isn't reached yet.
    pub fn on_timer<T: HidTransport, const N: usize>(
        &mut self,
        queue: &CharQueue<N>,
        transport: &mut T,
        now: Instant,
    ) {
        match self.deadline() {
            Some(deadline) if now >= deadline => {}
            _ => return,
        }

        match self.state {
            EngineState::KeyDownSent { .. } => {
                transport.request_send_credit();
                self.state = EngineState::AwaitingKeyUpGrant;
            }
            EngineState::RetryWait { .. } => self.send_next(queue, transport, now),
            _ => {}
        }
    }

    /// Drop the character being typed and cancel all timers. The queue is left untouched.
    pub fn reset(&mut self) {
        if self.is_send_active() {
            info!("Transmission aborted in {:?}", self.state);
        }
        self.state = EngineState::Idle;
    }

    fn send_next<T: HidTransport, const N: usize>(&mut self, queue: &CharQueue<N>, transport: &mut T, now: Instant) {
        let Some(character) = queue.dequeue() else {
            self.state = EngineState::Idle;
            return;
        };

        match translate(character) {
            Ok(stroke) => {
                transport.request_send_credit();
                self.state = EngineState::AwaitingKeyDownGrant(stroke);
            }
            Err(_) => {
                // The character is dropped, the next one is tried after the delay
                warn!("No keycode for character {:#04x}, skipped", character);
                self.state = EngineState::RetryWait {
                    resume_at: now + self.timing.retry_delay,
                };
            }
        }
    }
}
