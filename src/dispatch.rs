//! Poll scheduling.
//!
//! The firmware calls [`Dispatcher::tick`] once at startup and then from
//! its 60 Hz timer, and [`Dispatcher::flush`] once the USB endpoint can take
//! a report. While a report is pending no new samples are taken, so the
//! report on the wire is always the newest one that was worth sending.

use crate::hid::{Personality, ReportBuffer};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Dispatcher {
    pending: bool,
}

impl Dispatcher {
    pub const fn new() -> Self {
        Self { pending: false }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Polls and change-checks unless a report is already waiting.
    ///
    /// Returns whether a report is now pending.
    pub fn tick<P: Personality + ?Sized>(&mut self, personality: &mut P) -> bool {
        if !self.pending {
            personality.update();
            self.pending = personality.has_changed();
        }
        self.pending
    }

    /// Builds the pending report into `report`, if any, and clears the flag.
    pub fn flush<P: Personality + ?Sized>(&mut self, personality: &mut P, report: &mut ReportBuffer) -> Option<usize> {
        if !self.pending {
            return None;
        }
        self.pending = false;
        Some(personality.build_report(report))
    }
}
