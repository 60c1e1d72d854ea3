use mgc3130::{Event, FrameEvents, Position, State, Swipe, Tap, MAX_FRAME_LEN};

const POSITION_VALID: u8 = 0b01;
const AIR_WHEEL_VALID: u8 = 0b10;

fn frame(fill: impl FnOnce(&mut [u8; MAX_FRAME_LEN])) -> [u8; MAX_FRAME_LEN] {
    let mut data = [0u8; MAX_FRAME_LEN];
    data[0] = 26;
    fill(&mut data);

    data
}

fn with_position(x: u16, y: u16, z: u16) -> [u8; MAX_FRAME_LEN] {
    frame(|f| {
        f[7] = POSITION_VALID;
        f[20..22].copy_from_slice(&x.to_le_bytes());
        f[22..24].copy_from_slice(&y.to_le_bytes());
        f[24..26].copy_from_slice(&z.to_le_bytes());
    })
}

#[test]
fn position_is_read_little_endian() {
    let mut state = State::new();
    let data = frame(|f| {
        f[7] = POSITION_VALID;
        f[20..26].copy_from_slice(&[0x34, 0x12, 0x78, 0x56, 0xbc, 0x9a]);
    });

    state.decode(&data);

    assert_eq!(
        state.position(),
        Some(Position {
            x: 0x1234,
            y: 0x5678,
            z: 0x9abc
        })
    );
}

#[test]
fn position_untouched_without_valid_flag() {
    let mut state = State::new();
    state.decode(&with_position(100, 200, 300));

    let data = frame(|f| {
        f[20..26].copy_from_slice(&[0xff; 6]);
    });
    state.decode(&data);

    assert_eq!(
        state.position(),
        Some(Position {
            x: 100,
            y: 200,
            z: 300
        })
    );
}

#[test]
fn truncated_position_block_is_not_committed() {
    let mut state = State::new();
    state.decode(&with_position(1, 2, 3));

    let data = with_position(4, 5, 6);
    state.decode(&data[..25]);

    assert_eq!(state.position(), Some(Position { x: 1, y: 2, z: 3 }));
}

#[test]
fn upper_touch_bits_select_tap() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| f[14] = 0b1000_0000));
    assert_eq!(state.tap_code(), 0b0100_0100);
    assert_eq!(mgc3130::event_label(state.tap_code()), "Tap North");
    assert_eq!(events.tap, Event::Tap(Tap::North));
    assert_eq!(events.count(), 1);

    state.decode(&frame(|f| f[14] = 0b1110_0000));
    assert_eq!(state.tap_code(), 0b0100_0111);
    assert_eq!(state.tap(), Event::Generic(0b0100_0111));
}

#[test]
fn low_touch_bits_are_ignored() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| f[14] = 0b0001_1111));

    assert_eq!(state.tap_code(), 0);
    assert_eq!(events, FrameEvents::default());
}

#[test]
fn second_touch_byte_overwrites_first() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| {
        f[14] = 0b1000_0000;
        f[15] = 0b0000_0011;
    }));

    assert_eq!(state.tap_code(), 0b0101_1000);
    assert_eq!(events.tap, Event::Generic(0b0101_1000));
    assert_eq!(events.count(), 1);

    state.decode(&frame(|f| f[15] = 0b01));
    assert_eq!(state.tap(), Event::Tap(Tap::East));

    state.decode(&frame(|f| f[15] = 0b10));
    assert_eq!(state.tap(), Event::Tap(Tap::Center));
}

#[test]
fn gesture_info_selects_swipe() {
    let mut state = State::new();

    for (value, swipe) in [(2, Swipe::Right), (3, Swipe::Left), (4, Swipe::Up), (5, Swipe::Down)] {
        let events = state.decode(&frame(|f| f[10] = value));

        assert_eq!(state.swipe(), Event::Swipe(swipe));
        assert_eq!(events.swipe, Event::Swipe(swipe));
    }

    // No gesture leaves the previous one in place
    let events = state.decode(&frame(|f| f[10] = 1));
    assert_eq!(state.swipe_code(), Swipe::Down as u8);
    assert_eq!(events.count(), 0);
}

#[test]
fn oversized_gesture_value_keeps_only_marker() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| f[10] = 12));

    assert_eq!(state.swipe_code(), 0b0010_0000);
    assert_eq!(events.count(), 1);
}

#[test]
fn flag_byte_sets_generic_code_without_counting() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| f[1] = 3));

    assert_eq!(state.generic_code(), 0b0010_0100);
    assert_eq!(events.count(), 0);
}

#[test]
fn air_wheel_accumulates_signed_deltas() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| {
        f[7] = AIR_WHEEL_VALID;
        f[18] = 5;
    }));
    assert_eq!(events.wheel, Event::WheelDelta(5));
    assert_eq!(events.count(), 1);

    state.decode(&frame(|f| {
        f[7] = AIR_WHEEL_VALID;
        f[18] = 0xfd;
    }));
    assert_eq!(state.air_wheel(), 2);

    // Ignored unless flagged valid
    let events = state.decode(&frame(|f| f[18] = 40));
    assert_eq!(state.air_wheel(), 2);
    assert!(events.wheel.is_none());
}

#[test]
fn categories_are_counted_once_each() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| {
        f[7] = AIR_WHEEL_VALID | POSITION_VALID;
        f[10] = 2;
        f[14] = 0b0010_0000;
        f[15] = 0b01;
        f[18] = 1;
    }));

    assert_eq!(events.count(), 3);
}

#[test]
fn short_transfer_leaves_later_fields_untouched() {
    let mut state = State::new();
    state.decode(&frame(|f| {
        f[7] = AIR_WHEEL_VALID | POSITION_VALID;
        f[14] = 0b0010_0000;
        f[18] = 7;
        f[20..26].copy_from_slice(&[1, 0, 2, 0, 3, 0]);
    }));
    let before = state.clone();

    let data = frame(|f| {
        f[7] = AIR_WHEEL_VALID | POSITION_VALID;
        f[10] = 2;
        f[14] = 0b1000_0000;
        f[18] = 9;
        f[20..26].copy_from_slice(&[9; 6]);
    });
    let events = state.decode(&data[..11]);

    assert_eq!(events.count(), 1);
    assert_eq!(state.swipe(), Event::Swipe(Swipe::Right));
    assert_eq!(state.tap_code(), before.tap_code());
    assert_eq!(state.air_wheel(), before.air_wheel());
    assert_eq!(state.position(), before.position());
}

#[test]
fn output_mask_is_little_endian() {
    let mut state = State::new();

    state.decode(&frame(|f| {
        f[4] = 0x1f;
        f[5] = 0x18;
    }));

    assert_eq!(state.output_mask(), 0x181f);
}

#[test]
fn empty_transfer_is_not_a_frame() {
    let mut state = State::new();

    let events = state.decode(&[]);

    assert_eq!(events.count(), 0);
    assert_eq!(state.frame_count(), 0);

    state.decode(&frame(|_| {}));
    state.decode(&frame(|_| {}));
    assert_eq!(state.frame_count(), 2);
}

#[test]
fn mark_clean_resets_everything_but_frame_count() {
    let mut state = State::new();
    state.decode(&frame(|f| {
        f[1] = 2;
        f[7] = AIR_WHEEL_VALID | POSITION_VALID;
        f[10] = 3;
        f[14] = 0b0100_0000;
        f[18] = 4;
        f[20..26].copy_from_slice(&[1; 6]);
    }));

    state.mark_clean();

    assert_eq!(state.position(), None);
    assert_eq!(state.swipe_code(), 0);
    assert_eq!(state.tap_code(), 0);
    assert_eq!(state.generic_code(), 0);
    assert_eq!(state.air_wheel(), 0);
    assert_eq!(state.frame_count(), 1);
}

#[test]
fn display_dumps_state() {
    let mut state = State::new();
    assert_eq!(
        state.to_string(),
        "Position: invalid\nSwipe: \nTap: \nAir wheel: 0"
    );

    state.decode(&frame(|f| {
        f[7] = AIR_WHEEL_VALID | POSITION_VALID;
        f[10] = 2;
        f[14] = 0b0010_0000;
        f[18] = 0xff;
        f[20..26].copy_from_slice(&[10, 0, 20, 0, 30, 0]);
    }));

    assert_eq!(
        state.to_string(),
        "Position: (10, 20, 30)\nSwipe: Right Swipe\nTap: Tap South\nAir wheel: -1"
    );
}

#[test]
fn normalized_position_spans_unit_range() {
    let position = Position {
        x: 0,
        y: u16::MAX,
        z: 0,
    };

    assert_eq!(position.normalized(), (0.0, 1.0, 0.0));
}

#[test]
fn declared_length_never_shortens_frame() {
    let mut state = State::new();

    let events = state.decode(&frame(|f| {
        f[0] = 5;
        f[14] = 0b0100_0000;
    }));

    assert_eq!(events.tap, Event::Tap(Tap::West));
}

#[test]
fn declared_length_extends_past_default_request() {
    let mut state = State::new();
    let mut data = [0u8; 40];
    data[0] = 40;
    data[7] = POSITION_VALID;
    data[20..26].copy_from_slice(&[7, 0, 8, 0, 9, 0]);

    state.decode(&data);

    assert_eq!(state.position(), Some(Position { x: 7, y: 8, z: 9 }));
    assert_eq!(state.frame_count(), 1);
}
