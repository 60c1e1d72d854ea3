//! Interrupt lines and the pending-interrupt marker register
//!
//! Edge interrupts are handled in two halves. The platform attaches the
//! parameterless trampolines ([on_data_ready], [on_gesture0] ..
//! [on_gesture3]) to its pin interrupts; each one only sets a bit in the
//! [InterruptMarkers] bound to that line. The driver's `service` routine later
//! picks the bits up, one per call, and does the bus work outside of interrupt
//! context.

use core::{
    cell::Cell,
    sync::atomic::{AtomicU8, Ordering},
};

use critical_section::Mutex;

/// Number of gesture interrupt lines the device can drive
pub const GESTURE_LINES: usize = 4;

/// An interrupt line, in service priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Line {
    /// Transfer status line; asserted when a frame is ready to be read
    DataReady,
    Gesture0,
    Gesture1,
    Gesture2,
    Gesture3,
}

impl Line {
    /// Every line, highest priority first
    pub const PRIORITY: [Line; 5] = [
        Line::DataReady,
        Line::Gesture0,
        Line::Gesture1,
        Line::Gesture2,
        Line::Gesture3,
    ];

    /// Gesture line with the given index, if there is one
    pub fn gesture(index: usize) -> Option<Self> {
        if index < GESTURE_LINES {
            Some(Self::PRIORITY[index + 1])
        } else {
            None
        }
    }

    /// Index of a gesture line, `None` for the data-ready line
    pub fn gesture_index(self) -> Option<usize> {
        match self {
            Self::DataReady => None,
            line => Some(line.index() - 1),
        }
    }

    /// Bit of this line within the marker register
    pub fn mask(self) -> u8 {
        1 << self.index()
    }

    /// Interrupt handler which marks this line pending on its bound register
    pub fn trampoline(self) -> fn() {
        match self {
            Self::DataReady => on_data_ready,
            Self::Gesture0 => on_gesture0,
            Self::Gesture1 => on_gesture1,
            Self::Gesture2 => on_gesture2,
            Self::Gesture3 => on_gesture3,
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Bitset of lines which fired but have not been serviced yet
///
/// Bits are set from interrupt context and cleared by the service routine.
#[derive(Debug, Default)]
pub struct InterruptMarkers {
    pending: AtomicU8,
}

impl InterruptMarkers {
    pub const fn new() -> Self {
        Self {
            pending: AtomicU8::new(0),
        }
    }

    /// Record that `line` fired; safe to call from an interrupt handler
    pub fn mark_pending(&self, line: Line) {
        self.pending.fetch_or(line.mask(), Ordering::AcqRel);
    }

    /// Raw pending bitmask
    pub fn pending(&self) -> u8 {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_pending(&self, line: Line) -> bool {
        self.pending() & line.mask() != 0
    }

    /// Clear and return the highest-priority pending line, leaving the rest
    pub fn take_next(&self) -> Option<Line> {
        let pending = self.pending();
        let line = Line::PRIORITY
            .into_iter()
            .find(|line| pending & line.mask() != 0)?;

        self.pending.fetch_and(!line.mask(), Ordering::AcqRel);

        Some(line)
    }
}

/// Attachment of edge interrupts, provided by the host platform
pub trait EdgeInterrupts {
    type Error;

    /// Call `handler` on every falling edge of the data-ready line
    fn attach_data_ready(&mut self, handler: fn()) -> Result<(), Self::Error>;

    /// Call `handler` on every falling edge of GPIO `pin`
    fn attach_gesture(&mut self, pin: u8, handler: fn()) -> Result<(), Self::Error>;
}

// Marker register bound to each line, indexed by `Line::index`
static ROUTES: Mutex<[Cell<Option<&'static InterruptMarkers>>; 5]> = Mutex::new([
    Cell::new(None),
    Cell::new(None),
    Cell::new(None),
    Cell::new(None),
    Cell::new(None),
]);

/// Route interrupts on `line` to `markers`, replacing any previous binding
pub fn bind(line: Line, markers: &'static InterruptMarkers) {
    critical_section::with(|cs| ROUTES.borrow(cs)[line.index()].set(Some(markers)));
}

/// Stop routing interrupts on `line`
pub fn unbind(line: Line) {
    critical_section::with(|cs| ROUTES.borrow(cs)[line.index()].set(None));
}

/// Marker register currently bound to `line`
pub fn bound(line: Line) -> Option<&'static InterruptMarkers> {
    critical_section::with(|cs| ROUTES.borrow(cs)[line.index()].get())
}

fn route(line: Line) {
    if let Some(markers) = bound(line) {
        markers.mark_pending(line);
    }
}

pub fn on_data_ready() {
    route(Line::DataReady);
}

pub fn on_gesture0() {
    route(Line::Gesture0);
}

pub fn on_gesture1() {
    route(Line::Gesture1);
}

pub fn on_gesture2() {
    route(Line::Gesture2);
}

pub fn on_gesture3() {
    route(Line::Gesture3);
}
