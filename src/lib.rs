//! MGC3130 3D Gesture and Position Tracking Controller
//!
//! The device signals a pending data output message by pulling its transfer
//! status (TS) line low, and may additionally drive up to four gesture
//! interrupt lines. The platform attaches the trampolines from [interrupt] to
//! those lines; the application then calls [Mgc3130::service] on its own
//! schedule, which reads and decodes at most one frame per call.

#![no_std]

use core::fmt::Debug;

use embedded_hal::{
    blocking::{delay::DelayMs, i2c::Read},
    digital::v2::{InputPin, OutputPin},
};

pub use crate::{
    event::{event_label, Event, Swipe, Tap},
    frame::{FrameEvents, Position, State, SystemInfo, MAX_FRAME_LEN},
    interrupt::{EdgeInterrupts, InterruptMarkers, Line, GESTURE_LINES},
};

pub mod event;
pub mod frame;
pub mod interrupt;

/// Default I²C address for the MGC3130
pub const DEFAULT_I2C_ADDR: u8 = 0x42;

// How long reset is held low, and how long the device takes to boot after
const RESET_PULSE_MS: u32 = 10;
const STARTUP_DELAY_MS: u32 = 3000;

/// Any type of error which may occur while interacting with the device
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Some error originating from the communication bus
    BusError(E),
    /// Reading or driving a GPIO pin resulted in an error
    IOError,
    /// Gesture line index outside of `0..4`
    InvalidGestureLine(usize),
    /// The configuration cannot change once the driver has been started
    AlreadyStarted,
    /// The platform failed to attach an edge interrupt
    InterruptError,
}

/// MGC3130 driver
pub struct Mgc3130<I2C, TS, RST> {
    /// Underlying I²C peripheral
    i2c: I2C,
    /// Transfer status pin, open-drain
    ts: TS,
    /// Reset pin
    rst: RST,
    /// I²C address of the device
    address: u8,
    /// Lines which fired and still await servicing
    markers: &'static InterruptMarkers,
    /// GPIO numbers of the gesture interrupt lines in use
    gesture_pins: [Option<u8>; GESTURE_LINES],
    /// Interrupts seen on each gesture line
    gesture_irqs: [u32; GESTURE_LINES],
    state: State,
    ready: bool,
}

impl<I2C, TS, RST, E> Mgc3130<I2C, TS, RST>
where
    I2C: Read<Error = E>,
    TS: InputPin + OutputPin,
    RST: OutputPin,
    E: Debug,
{
    /// Create a new instance of the driver
    ///
    /// Nothing is sent to the device until [Mgc3130::begin] is called.
    pub fn new(
        i2c: I2C,
        ts: TS,
        rst: RST,
        address: u8,
        markers: &'static InterruptMarkers,
    ) -> Self {
        Self {
            i2c,
            ts,
            rst,
            address,
            markers,
            gesture_pins: [None; GESTURE_LINES],
            gesture_irqs: [0; GESTURE_LINES],
            state: State::new(),
            ready: false,
        }
    }

    /// Use GPIO `pin` as gesture interrupt line `line`
    pub fn set_gesture_irq_pin(&mut self, line: usize, pin: u8) -> Result<(), Error<E>> {
        if line >= GESTURE_LINES {
            return Err(Error::InvalidGestureLine(line));
        }
        if self.ready {
            return Err(Error::AlreadyStarted);
        }

        self.gesture_pins[line] = Some(pin);

        Ok(())
    }

    /// Reset the device and start listening for its interrupts
    pub fn begin<IRQ, D>(&mut self, irq: &mut IRQ, delay: &mut D) -> Result<(), Error<E>>
    where
        IRQ: EdgeInterrupts,
        D: DelayMs<u32>,
    {
        if self.ready {
            return Err(Error::AlreadyStarted);
        }

        self.ts.set_high().map_err(|_| Error::IOError)?;

        self.rst.set_low().map_err(|_| Error::IOError)?;
        delay.delay_ms(RESET_PULSE_MS);
        self.rst.set_high().map_err(|_| Error::IOError)?;
        delay.delay_ms(STARTUP_DELAY_MS);

        interrupt::bind(Line::DataReady, self.markers);
        irq.attach_data_ready(Line::DataReady.trampoline())
            .map_err(|_| Error::InterruptError)?;

        for (index, pin) in self.gesture_pins.iter().enumerate() {
            let (Some(pin), Some(line)) = (pin, Line::gesture(index)) else {
                continue;
            };

            interrupt::bind(line, self.markers);
            irq.attach_gesture(*pin, line.trampoline())
                .map_err(|_| Error::InterruptError)?;
        }

        self.ready = true;
        log::info!("MGC3130 at {:#04x} is ready", self.address);

        Ok(())
    }

    /// Has [Mgc3130::begin] completed?
    pub fn is_ready(&self) -> bool {
        self.ready
    }

    /// Is the device currently asserting the transfer status line?
    pub fn data_available(&self) -> Result<bool, Error<E>> {
        self.ts.is_low().map_err(|_| Error::IOError)
    }

    /// Handle the highest-priority pending interrupt, if any
    ///
    /// Returns `1` if an event was handled and `0` otherwise. Lines which are
    /// still pending are left for subsequent calls. Bus and pin failures are
    /// logged and absorbed; if the transfer status line cannot be claimed the
    /// data-ready line stays pending so the next call retries it.
    pub fn service(&mut self) -> u8 {
        let Some(line) = self.markers.take_next() else {
            return 0;
        };

        match line.gesture_index() {
            None => {
                // Hold TS low for the duration of the transfer, then re-arm it
                if self.ts.set_low().is_err() {
                    log::warn!("could not claim transfer status line, retrying later");
                    self.markers.mark_pending(Line::DataReady);
                    self.release_transfer_status();

                    return 0;
                }

                let events = self.decode_frame();
                self.release_transfer_status();

                u8::from(events.count() > 0)
            }
            Some(index) => {
                self.gesture_irqs[index] = self.gesture_irqs[index].wrapping_add(1);
                log::debug!("gesture line {} fired", index);

                1
            }
        }
    }

    /// Read and decode a single frame, discarding it if the transfer fails
    pub fn decode_frame(&mut self) -> FrameEvents {
        self.read_frame().unwrap_or_else(|e| {
            log::warn!("dropping frame: {:?}", e);
            FrameEvents::default()
        })
    }

    /// Read and decode a single frame
    pub fn read_frame(&mut self) -> Result<FrameEvents, Error<E>> {
        let mut data = [0u8; MAX_FRAME_LEN];
        self.read_bytes(&mut data)?;

        Ok(self.state.decode(&data))
    }

    /// Clear all decoded events, the position and the air-wheel total
    pub fn mark_clean(&mut self) {
        self.state.mark_clean();
    }

    /// Decoded state; its [core::fmt::Display] impl gives a readable dump
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Last valid position, or `None` if none was decoded since the last clean
    pub fn position(&self) -> Option<Position> {
        self.state.position()
    }

    /// Legacy byte of the last swipe, `0` if none
    pub fn swipe_code(&self) -> u8 {
        self.state.swipe_code()
    }

    /// Legacy byte of the last tap, `0` if none
    pub fn tap_code(&self) -> u8 {
        self.state.tap_code()
    }

    /// Legacy byte derived from the flags of the last frame, `0` if none
    pub fn generic_code(&self) -> u8 {
        self.state.generic_code()
    }

    /// Running total of air-wheel deltas
    pub fn air_wheel(&self) -> i32 {
        self.state.air_wheel()
    }

    /// Number of frames decoded since the driver was created
    pub fn frame_count(&self) -> u32 {
        self.state.frame_count()
    }

    /// Number of interrupts serviced on a gesture line
    pub fn gesture_irq_count(&self, line: usize) -> Option<u32> {
        self.gesture_irqs.get(line).copied()
    }

    /// I²C address the driver talks to
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Destroy the driver, returning the bus and pins
    pub fn release(self) -> (I2C, TS, RST) {
        (self.i2c, self.ts, self.rst)
    }

    // -----------------------------------------------------------------------
    // PRIVATE

    fn release_transfer_status(&mut self) {
        if self.ts.set_high().is_err() {
            log::warn!("could not release transfer status line");
        }
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .read(self.address, buffer)
            .map_err(|e| Error::BusError(e))
    }
}
