//! Events consumed by the transmission engine and the bounded queue that
//! serializes them.
//!
//! On the reference hardware both event sources share one interrupt vector,
//! so events are never handled concurrently. When a timer expiry and a
//! button edge are pending at the same time, this crate always handles the
//! timer expiry first: phase timing is the part receivers are sensitive to,
//! while a button edge only changes what happens at the next frame boundary.
//! Interrupt handlers written against [`crate::timer`] should poll their
//! flags in the same order.

use heapless::Deque;

use crate::error::{Error, Result};

/// Something the engine reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Event {
    /// The button went down.
    Press,
    /// The button came back up.
    Release,
    /// The one-shot timer expired.
    TimerExpired,
}

/// A bounded event queue holding up to `N` button edges and one pending
/// timer expiry.
///
/// A one-shot timer can only have a single expiry outstanding, so it is kept
/// as a flag, like the hardware overflow flag it models.
#[derive(Debug)]
pub struct EventQueue<const N: usize> {
    timer_pending: bool,
    edges: Deque<Event, N>,
}

impl<const N: usize> EventQueue<N> {
    /// Creates an empty queue.
    pub const fn new() -> Self {
        Self {
            timer_pending: false,
            edges: Deque::new(),
        }
    }

    /// Queues `event`.
    ///
    /// A second timer expiry before the first is taken is merged into it.
    pub fn post(&mut self, event: Event) -> Result<()> {
        match event {
            Event::TimerExpired => {
                self.timer_pending = true;
                Ok(())
            }
            Event::Press | Event::Release => {
                self.edges.push_back(event).map_err(|_| Error::QueueFull)
            }
        }
    }

    /// Takes the next event: a pending timer expiry first, then button edges
    /// in arrival order.
    pub fn next(&mut self) -> Option<Event> {
        if self.timer_pending {
            self.timer_pending = false;
            return Some(Event::TimerExpired);
        }
        self.edges.pop_front()
    }

    /// Whether no event is waiting.
    pub fn is_empty(&self) -> bool {
        !self.timer_pending && self.edges.is_empty()
    }

    /// Number of waiting events.
    pub fn len(&self) -> usize {
        self.edges.len() + usize::from(self.timer_pending)
    }
}

impl<const N: usize> Default for EventQueue<N> {
    fn default() -> Self {
        Self::new()
    }
}
