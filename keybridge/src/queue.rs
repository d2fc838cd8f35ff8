//! Bounded character queue between the input task and the transmission engine.
//!
//! The producer never waits: when the queue is full the new character is dropped.
use embassy_sync::channel::Channel;
use embassy_sync::signal::Signal;

use crate::RawMutex;

/// FIFO of characters waiting to be typed.
///
/// Written by the input task, read by the engine in the bridge task.
/// The underlying channel is guarded by a critical section, so the writer may run in a different
/// execution context than the reader.
pub struct CharQueue<const N: usize> {
    chars: Channel<RawMutex, u8, N>,
    /// Raised on every successful enqueue, wakes an idle engine
    enqueued: Signal<RawMutex, ()>,
}

impl<const N: usize> Default for CharQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> CharQueue<N> {
    pub const fn new() -> Self {
        Self {
            chars: Channel::new(),
            enqueued: Signal::new(),
        }
    }

    /// Push a character without blocking. If the queue is full, the character is dropped.
    pub fn enqueue(&self, character: u8) {
        match self.chars.try_send(character) {
            Ok(()) => self.enqueued.signal(()),
            Err(_) => debug!("Character queue full, dropping {:#04x}", character),
        }
    }

    /// Pop the oldest character, `None` if nothing is pending.
    pub fn dequeue(&self) -> Option<u8> {
        self.chars.try_receive().ok()
    }

    /// Wait until a character was enqueued since the last wait returned.
    pub async fn wait_enqueued(&self) {
        self.enqueued.wait().await
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}
