//! A single scheduled deadline, the building block for the Incomplete
//! Timer and the Block-Ack Timer tracked on every `InFlightRx` slot.
//!
//! The teacher's `Watchdog` multiplexes one deadline per timer *kind*
//! across the whole driver and wakes an async task on the earliest one.
//! Here the host drives time by calling `tick(now)`, so there is no
//! task to wake; what carries over is the earliest-wins, overwrite-on-arm
//! semantics of its setters.

use embassy_time::Instant;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Deadline(Option<Instant>);

impl Default for Deadline {
    fn default() -> Self {
        Self::none()
    }
}

impl Deadline {
    pub fn none() -> Self {
        Self(None)
    }

    pub fn at(instant: Instant) -> Self {
        Self(Some(instant))
    }

    pub fn is_armed(&self) -> bool {
        self.0.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        matches!(self.0, Some(at) if now >= at)
    }

    pub fn clear(&mut self) {
        self.0 = None;
    }

    /// Arms to `instant` unless already armed to an earlier deadline.
    pub fn arm_if_sooner(&mut self, instant: Instant) {
        match self.0 {
            Some(current) if current <= instant => {}
            _ => self.0 = Some(instant),
        }
    }
}
