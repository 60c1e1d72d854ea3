//! MGC3130 3D Gesture and Position Tracking Controller

#![no_std]

use core::fmt::Debug;

use embedded_hal::digital::OutputPin;
use embedded_hal_async::{digital::Wait, i2c::I2c};
pub use mgc3130::{
    event_label,
    Error,
    Event,
    FrameEvents,
    Position,
    State,
    Swipe,
    Tap,
    DEFAULT_I2C_ADDR,
    MAX_FRAME_LEN,
};

/// MGC3130 driver
pub struct Mgc3130<I2C, TS> {
    /// Underlying I²C peripheral
    i2c: I2C,
    /// Transfer status pin, open-drain
    ts: TS,
    /// I²C address of the device
    address: u8,
    state: State,
}

impl<I2C, TS, E> Mgc3130<I2C, TS>
where
    I2C: I2c<Error = E>,
    TS: Wait + OutputPin,
    E: Debug,
{
    /// Create a new instance of the driver
    pub fn new(i2c: I2C, ts: TS, address: u8) -> Self {
        Self {
            i2c,
            ts,
            address,
            state: State::new(),
        }
    }

    /// Wait until the device asserts the transfer status line
    pub async fn data_available(&mut self) -> Result<(), Error<E>> {
        self.ts.wait_for_low().await.map_err(|_| Error::IOError)
    }

    /// Read and decode a single frame
    ///
    /// The transfer status line is held low for the duration of the read and
    /// released afterwards, whether or not the read succeeded.
    pub async fn event(&mut self) -> Result<FrameEvents, Error<E>> {
        self.ts.set_low().map_err(|_| Error::IOError)?;

        let mut data = [0u8; MAX_FRAME_LEN];
        let read = self.read_bytes(&mut data).await;

        self.ts.set_high().map_err(|_| Error::IOError)?;
        read?;

        Ok(self.state.decode(&data))
    }

    /// Wait for the next frame, then read and decode it
    pub async fn next_event(&mut self) -> Result<FrameEvents, Error<E>> {
        self.data_available().await?;
        self.event().await
    }

    /// Clear all decoded events, the position and the air-wheel total
    pub fn mark_clean(&mut self) {
        self.state.mark_clean();
    }

    /// Decoded state; its [core::fmt::Display] impl gives a readable dump
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Destroy the driver, returning the bus and pin
    pub fn release(self) -> (I2C, TS) {
        (self.i2c, self.ts)
    }

    // -----------------------------------------------------------------------
    // PRIVATE

    async fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<(), Error<E>> {
        self.i2c
            .read(self.address, buffer)
            .await
            .map_err(|e| {
                log::warn!("transfer from {:#04x} failed: {:?}", self.address, e);
                Error::BusError(e)
            })
    }
}
