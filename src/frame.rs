//! Decoding of the sensor data output message

use core::fmt;

use bondrewd::Bitfields;

use crate::event::{event_label, Event, GESTURE_MARKER, TAP_MARKER};

/// Largest transfer requested from the device in one read
pub const MAX_FRAME_LEN: usize = 32;

// Byte offsets within a frame
const LENGTH: usize = 0;
const FLAGS: usize = 1;
const OUTPUT_MASK_LO: usize = 4;
const OUTPUT_MASK_HI: usize = 5;
const SYSTEM_INFO: usize = 7;
const GESTURE_INFO: usize = 10;
const TOUCH_INFO: usize = 14;
const TOUCH_INFO_HI: usize = 15;
const AIR_WHEEL: usize = 18;
const POSITION: usize = 20;
const POSITION_LAST: usize = 25;

/// System info flags; gate the air-wheel and position blocks later in the frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Bitfields)]
#[bondrewd(default_endianness = "le")]
pub struct SystemInfo {
    #[bondrewd(bit_length = 6)]
    padding0: u8,
    #[bondrewd(bit_length = 1)]
    pub air_wheel_valid: u8,
    #[bondrewd(bit_length = 1)]
    pub position_valid: u8,
}

/// Hand position within the sensing area
#[derive(Debug, Clone, Copy, PartialEq, Eq, Bitfields)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[bondrewd(default_endianness = "le")]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: u16,
}

impl Position {
    /// Each axis as a fraction of the full 16-bit range
    ///
    /// Unlike the legacy Arduino library, which reported `0xFFFF / raw` and
    /// only when no axis was zero, this is a plain linear mapping onto
    /// `0.0..=1.0` and is defined for every raw value.
    pub fn normalized(&self) -> (f32, f32, f32) {
        let scale = |v: u16| f32::from(v) / f32::from(u16::MAX);

        (scale(self.x), scale(self.y), scale(self.z))
    }
}

/// The event categories which fired while decoding a single frame
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FrameEvents {
    pub swipe: Event,
    pub tap: Event,
    pub wheel: Event,
}

impl FrameEvents {
    /// Number of categories which fired; zero if the frame carried no event
    pub fn count(&self) -> u8 {
        [self.swipe, self.tap, self.wheel]
            .iter()
            .filter(|event| !event.is_none())
            .count() as u8
    }
}

/// Last known state of the sensor
///
/// Decoding only ever overwrites fields for which the frame carried a valid
/// value, so stale data lingers until [State::mark_clean] is called.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct State {
    position: Option<Position>,
    swipe: u8,
    tap: u8,
    generic: u8,
    air_wheel: i32,
    frames: u32,
    output_mask: u16,
}

impl State {
    pub const fn new() -> Self {
        Self {
            position: None,
            swipe: 0,
            tap: 0,
            generic: 0,
            air_wheel: 0,
            frames: 0,
            output_mask: 0,
        }
    }

    /// Decode one transfer from the device
    ///
    /// Every offset has a fixed meaning; a frame which ends early leaves the
    /// fields it did not reach untouched.
    pub fn decode(&mut self, frame: &[u8]) -> FrameEvents {
        let mut events = FrameEvents::default();

        let Some(&declared) = frame.first() else {
            return events;
        };
        // The declared length may extend the read past the default request,
        // counting the length byte already consumed; it never shortens it.
        let expected = MAX_FRAME_LEN.max(1 + usize::from(declared.saturating_sub(1)));

        let mut info = SystemInfo::from_bytes([0]);
        let mut mask_lo = 0u8;

        for (offset, &byte) in frame.iter().enumerate().take(expected) {
            match offset {
                LENGTH => {}
                FLAGS if byte > 1 => self.generic = gesture_code(byte),
                OUTPUT_MASK_LO => mask_lo = byte,
                OUTPUT_MASK_HI => self.output_mask = u16::from_le_bytes([mask_lo, byte]),
                SYSTEM_INFO => info = SystemInfo::from_bytes([byte]),
                GESTURE_INFO if byte > 1 => {
                    self.swipe = gesture_code(byte);
                    events.swipe = Event::from(self.swipe);
                }
                TOUCH_INFO if byte > 0b1_1111 => {
                    self.tap = ((byte & 0b1110_0000) >> 5) | TAP_MARKER;
                    events.tap = Event::from(self.tap);
                }
                // Overrides whatever the previous byte reported
                TOUCH_INFO_HI if byte > 0 => {
                    self.tap = ((byte & 0b0011) << 3) | TAP_MARKER;
                    events.tap = Event::from(self.tap);
                }
                AIR_WHEEL if info.air_wheel_valid == 1 => {
                    let delta = byte as i8;
                    self.air_wheel = self.air_wheel.wrapping_add(i32::from(delta));
                    events.wheel = Event::WheelDelta(delta);
                }
                POSITION_LAST if info.position_valid == 1 => {
                    if let Ok(block) = frame[POSITION..=POSITION_LAST].try_into() {
                        self.position = Some(Position::from_bytes(block));
                    }
                }
                _ => {}
            }
        }

        self.frames = self.frames.wrapping_add(1);

        log::debug!(
            "frame {} ({} bytes): {} event(s)",
            self.frames,
            frame.len(),
            events.count()
        );

        events
    }

    /// Forget every decoded event, the position and the air-wheel total
    pub fn mark_clean(&mut self) {
        self.tap = 0;
        self.swipe = 0;
        self.generic = 0;
        self.position = None;
        self.air_wheel = 0;
    }

    /// Last valid position, or `None` if none was decoded since the last clean
    pub fn position(&self) -> Option<Position> {
        self.position
    }

    /// Legacy byte of the last swipe, `0` if none
    pub fn swipe_code(&self) -> u8 {
        self.swipe
    }

    /// Legacy byte of the last tap, `0` if none
    pub fn tap_code(&self) -> u8 {
        self.tap
    }

    /// Legacy byte derived from the flags byte, `0` if none
    pub fn generic_code(&self) -> u8 {
        self.generic
    }

    /// Last swipe as an [Event]
    pub fn swipe(&self) -> Event {
        Event::from(self.swipe)
    }

    /// Last tap as an [Event]
    pub fn tap(&self) -> Event {
        Event::from(self.tap)
    }

    /// Running total of air-wheel deltas
    pub fn air_wheel(&self) -> i32 {
        self.air_wheel
    }

    /// Number of frames decoded since power-up
    pub fn frame_count(&self) -> u32 {
        self.frames
    }

    /// Data output configuration mask from the most recent frame
    pub fn output_mask(&self) -> u16 {
        self.output_mask
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.position {
            Some(Position { x, y, z }) => writeln!(f, "Position: ({}, {}, {})", x, y, z)?,
            None => writeln!(f, "Position: invalid")?,
        }
        writeln!(f, "Swipe: {}", event_label(self.swipe))?;
        writeln!(f, "Tap: {}", event_label(self.tap))?;
        write!(f, "Air wheel: {}", self.air_wheel)
    }
}

fn gesture_code(byte: u8) -> u8 {
    1u8.checked_shl(u32::from(byte - 1)).unwrap_or(0) | GESTURE_MARKER
}
