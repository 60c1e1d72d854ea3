//! Gesture and touch events reported by the MGC3130

/// Marker bit shared by swipe and generic event codes
pub const GESTURE_MARKER: u8 = 0b0010_0000;
/// Marker bit for tap event codes
pub const TAP_MARKER: u8 = 0b0100_0000;

/// Direction of a swipe (flick) gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Swipe {
    Right = 0b0010_0010,
    Left = 0b0010_0100,
    Up = 0b0010_1000,
    Down = 0b0011_0000,
}

impl Swipe {
    /// Look up the swipe encoded by a legacy event byte
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0b0010_0010 => Some(Self::Right),
            0b0010_0100 => Some(Self::Left),
            0b0010_1000 => Some(Self::Up),
            0b0011_0000 => Some(Self::Down),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Right => "Right Swipe",
            Self::Left => "Left Swipe",
            Self::Up => "Up Swipe",
            Self::Down => "Down Swipe",
        }
    }
}

/// Touch-sensitive electrode which was tapped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Tap {
    South = 0b0100_0001,
    West = 0b0100_0010,
    North = 0b0100_0100,
    East = 0b0100_1000,
    Center = 0b0101_0000,
}

impl Tap {
    /// Look up the tap encoded by a legacy event byte
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0b0100_0001 => Some(Self::South),
            0b0100_0010 => Some(Self::West),
            0b0100_0100 => Some(Self::North),
            0b0100_1000 => Some(Self::East),
            0b0101_0000 => Some(Self::Center),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::South => "Tap South",
            Self::West => "Tap West",
            Self::North => "Tap North",
            Self::East => "Tap East",
            Self::Center => "Tap Center",
        }
    }
}

/// A decoded event
///
/// The sensor reports swipes, taps and the frame flags as single bytes whose
/// high bits select the category; [Event::from] and [Event::code] convert
/// between that byte encoding and this type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Nothing was reported
    #[default]
    None,
    /// An event byte with no known meaning
    Generic(u8),
    /// A swipe gesture
    Swipe(Swipe),
    /// A tap on one of the five electrodes
    Tap(Tap),
    /// Rotation of the air wheel since the previous frame
    WheelDelta(i8),
}

impl Event {
    /// Legacy byte encoding of the event; air-wheel deltas have none
    pub fn code(self) -> Option<u8> {
        match self {
            Self::None => Some(0),
            Self::Generic(code) => Some(code),
            Self::Swipe(swipe) => Some(swipe as u8),
            Self::Tap(tap) => Some(tap as u8),
            Self::WheelDelta(_) => None,
        }
    }

    /// Human-readable label, empty for anything but swipes and taps
    pub fn label(self) -> &'static str {
        match self {
            Self::Swipe(swipe) => swipe.label(),
            Self::Tap(tap) => tap.label(),
            _ => "",
        }
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

impl From<u8> for Event {
    fn from(code: u8) -> Self {
        if code == 0 {
            Self::None
        } else if let Some(swipe) = Swipe::from_code(code) {
            Self::Swipe(swipe)
        } else if let Some(tap) = Tap::from_code(code) {
            Self::Tap(tap)
        } else {
            Self::Generic(code)
        }
    }
}

/// Map a legacy event byte to its label; unknown codes map to `""`
pub fn event_label(code: u8) -> &'static str {
    Event::from(code).label()
}
