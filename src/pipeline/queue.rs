//! Bounded ISR → worker event queue.
//!
//! Wraps an `embassy-sync` channel.  The producer side never blocks: a
//! full queue drops the event and bumps a counter.  The consumer side
//! blocks through a caller-supplied park function so the same queue
//! works with a FreeRTOS task notification on the device and a thread
//! park on the host.

use core::sync::atomic::{AtomicU32, Ordering};

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;

use super::MotionEvent;

pub struct EventQueue<const N: usize> {
    channel: Channel<CriticalSectionRawMutex, MotionEvent, N>,
    dropped: AtomicU32,
}

impl<const N: usize> EventQueue<N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
            dropped: AtomicU32::new(0),
        }
    }

    /// Non-blocking enqueue; ISR-safe.  Returns `false` (and counts the
    /// drop) when the queue is full.
    pub fn try_enqueue(&self, event: MotionEvent) -> bool {
        if self.channel.try_send(event).is_ok() {
            true
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            false
        }
    }

    pub fn try_dequeue(&self) -> Option<MotionEvent> {
        self.channel.try_receive().ok()
    }

    /// Wait for the next event with no timeout.  `park` is called each time
    /// the queue is found empty and must return once a producer has woken it.
    pub fn dequeue_blocking(&self, mut park: impl FnMut()) -> MotionEvent {
        loop {
            if let Some(event) = self.try_dequeue() {
                return event;
            }
            park();
        }
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    pub fn dropped(&self) -> u32 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
