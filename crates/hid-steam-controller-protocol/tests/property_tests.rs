//! Property tests for feature framing, report decoding and tilt math.

use hid_steam_controller_protocol::{
    AxisConvention, Button, DecodeOptions, FeatureRequest, FrameError, MAX_PARAMS_LEN,
    MotionMode, MotionSample, Position, button_mask, decode, encode_answer_frame, parse_answer,
    tilt_angle,
};
use proptest::prelude::*;

/// Logical values a synthetic frame is built from.
#[derive(Debug, Clone)]
struct State {
    buttons: u32,
    triggers: [u8; 2],
    left: [i16; 2],
    right: [i16; 2],
    accel: [i16; 3],
    gyro: [i16; 3],
}

fn put(frame: &mut [u8; 64], offset: usize, bytes: &[u8]) {
    if let Some(dst) = frame.get_mut(offset..offset + bytes.len()) {
        dst.copy_from_slice(bytes);
    }
}

/// Independent reference encoder for control state frames.
fn encode_state(state: &State) -> [u8; 64] {
    let mut frame = [0u8; 64];
    put(&mut frame, 2, &[0x01, 60]);
    put(&mut frame, 7, &state.buttons.to_le_bytes());
    put(&mut frame, 11, &state.triggers);
    for (i, v) in state.left.iter().enumerate() {
        put(&mut frame, 16 + 2 * i, &v.to_le_bytes());
    }
    for (i, v) in state.right.iter().enumerate() {
        put(&mut frame, 20 + 2 * i, &v.to_le_bytes());
    }
    for (i, v) in state.accel.iter().enumerate() {
        put(&mut frame, 28 + 2 * i, &v.to_le_bytes());
    }
    for (i, v) in state.gyro.iter().enumerate() {
        put(&mut frame, 34 + 2 * i, &v.to_le_bytes());
    }
    frame
}

fn state_strategy() -> impl Strategy<Value = State> {
    (
        any::<u32>(),
        any::<[u8; 2]>(),
        any::<[i16; 2]>(),
        any::<[i16; 2]>(),
        any::<[i16; 3]>(),
        any::<[i16; 3]>(),
    )
        .prop_map(|(buttons, triggers, left, right, accel, gyro)| State {
            buttons: buttons & button_mask::ASSIGNED,
            triggers,
            left,
            right,
            accel,
            gyro,
        })
}

fn inverted(raw: [i16; 2]) -> Position {
    let [x, y] = raw;
    Position {
        x: i32::from(x),
        y: -i32::from(y),
    }
}

proptest! {
    #![proptest_config(proptest::test_runner::Config::with_cases(512))]

    #[test]
    fn prop_decode_reproduces_encoded_state(state in state_strategy()) {
        let options = DecodeOptions::new(AxisConvention::InvertY, MotionMode::Raw)
            .with_center_touchpads(false);
        let input = decode(&encode_state(&state), &options);
        let bit = |m: u32| state.buttons & m != 0;

        for button in Button::ALL {
            if let Some(m) = button.direct_mask() {
                prop_assert_eq!(input.buttons.get(button), Some(bit(m)), "{:?}", button);
            }
        }

        if bit(button_mask::TOUCH_LEFT) {
            prop_assert_eq!(input.left_pad, Some(inverted(state.left)));
            prop_assert_eq!(input.stick, None);
            prop_assert_eq!(input.buttons.get(Button::LeftPadClick), Some(bit(button_mask::CLICK_LEFT)));
            prop_assert_eq!(input.buttons.get(Button::StickClick), None);
        } else {
            prop_assert_eq!(input.stick, Some(inverted(state.left)));
            prop_assert_eq!(input.left_pad, None);
            prop_assert_eq!(input.buttons.get(Button::StickClick), Some(bit(button_mask::CLICK_LEFT)));
            prop_assert_eq!(input.buttons.get(Button::LeftPadClick), None);
        }

        if bit(button_mask::TOUCH_RIGHT) {
            prop_assert_eq!(input.right_pad, Some(inverted(state.right)));
            prop_assert_eq!(input.buttons.get(Button::RightPadClick), Some(bit(button_mask::CLICK_RIGHT)));
        } else {
            prop_assert_eq!(input.right_pad, None);
            prop_assert_eq!(input.buttons.get(Button::RightPadClick), None);
        }

        prop_assert_eq!(input.triggers, state.triggers);
        prop_assert_eq!(input.motion, MotionSample::Raw { accel: state.accel, gyro: state.gyro });
    }

    /// Exactly one of stick and left pad is reported, except for the
    /// synthesized centre of an untouched pad at rest.
    #[test]
    fn prop_left_touch_gating(state in state_strategy(), center in any::<bool>()) {
        let options = DecodeOptions::default().with_center_touchpads(center);
        let input = decode(&encode_state(&state), &options);
        let touched = state.buttons & button_mask::TOUCH_LEFT != 0;
        let centred = center && !touched && state.left == [0, 0];

        if centred {
            prop_assert_eq!(input.stick, Some(Position::CENTER));
            prop_assert_eq!(input.left_pad, Some(Position::CENTER));
        } else {
            prop_assert!(input.stick.is_some() != input.left_pad.is_some());
            prop_assert_eq!(input.left_pad.is_some(), touched);
        }
    }

    #[test]
    fn prop_oversized_params_rejected(len in (MAX_PARAMS_LEN + 1)..256usize, id: u8) {
        let params = vec![0x5Au8; len];
        prop_assert_eq!(
            FeatureRequest::new(id, &params),
            Err(FrameError::ParamsTooLong { len, max: MAX_PARAMS_LEN })
        );
    }

    #[test]
    fn prop_request_frames_recover(
        id: u8,
        params in proptest::collection::vec(any::<u8>(), 0..=MAX_PARAMS_LEN),
    ) {
        let frame = FeatureRequest::new(id, &params)
            .map_err(|e| TestCaseError::fail(e.to_string()))?
            .encode();
        let recovered = FeatureRequest::from_frame(&frame)
            .map_err(|e| TestCaseError::fail(e.to_string()))?;
        prop_assert_eq!(recovered.report_id(), id);
        prop_assert_eq!(recovered.params(), params.as_slice());
    }

    #[test]
    fn prop_answer_id_mismatch_is_protocol_error(
        sent: u8,
        echoed: u8,
        payload in proptest::collection::vec(any::<u8>(), 0..=61),
    ) {
        prop_assume!(sent != echoed);
        let frame = encode_answer_frame(echoed, &payload);
        prop_assert_eq!(
            parse_answer(&frame, sent),
            Err(FrameError::ReportIdMismatch { expected: sent, actual: echoed })
        );
    }

    #[test]
    fn prop_tilt_angle_in_range(h: i16, v: i16) {
        let angle = tilt_angle(h, v);
        prop_assert!((-18_000..=18_000).contains(&angle), "angle {}", angle);
    }

    #[test]
    fn prop_tilt_angle_is_odd_in_horizontal(h in 1i16..=i16::MAX, v: i16) {
        prop_assert_eq!(tilt_angle(-h, v), -tilt_angle(h, v));
    }

    #[test]
    fn prop_tilt_angle_tracks_atan2(h: i16, v: i16) {
        prop_assume!(h != 0);
        let exact = f64::from(h).atan2(f64::from(v)).to_degrees() * 100.0;
        let approx = f64::from(tilt_angle(h, v));
        prop_assert!((exact - approx).abs() <= 35.0, "h={} v={} exact={} approx={}", h, v, exact, approx);
    }
}
