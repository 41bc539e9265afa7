//! Tests for the timecode codec and its shaped wrappers

use super::shaped::{frame_component, frame_to_duration, frame_to_tc, tc_conv, tc_offset, tc_to_frame, Component};
use super::*;
use crate::utils::errors::ErrorKind;
use crate::utils::shape::{Shape, Shaped};

fn fps(value: u32) -> Fps {
    Fps::new(value).unwrap()
}

fn text(value: &str) -> Shape<String> {
    Shape::from(value)
}

#[test]
fn parse_full_timecodes() {
    assert_eq!(parse("01:00:00:00", fps(24)).unwrap(), 86400);
    assert_eq!(parse("00:00:00:00", fps(24)).unwrap(), 0);
    assert_eq!(parse("10:01:02:03", fps(25)).unwrap(), ((10 * 3600 + 62) * 25) + 3);
}

#[test]
fn parse_short_forms_are_right_aligned() {
    assert_eq!(parse("00:00:00", fps(24)).unwrap(), 0);
    assert_eq!(parse("00", fps(24)).unwrap(), 0);
    assert_eq!(parse("1", fps(24)).unwrap(), 1);
    assert_eq!(parse("1:00", fps(24)).unwrap(), 24);
    assert_eq!(parse("1:00:00", fps(24)).unwrap(), 24 * 60);
    assert_eq!(parse("1:0:0", fps(24)).unwrap(), 24 * 60);
}

#[test]
fn parse_ignores_trailing_text() {
    assert_eq!(parse("01:00:00:00 garbage", fps(24)).unwrap(), 86400);
    assert_eq!(parse("01:00:00:00 -1:00:00:00", fps(24)).unwrap(), 86400);
    assert_eq!(
        parse("00:00:05:00 (s: CartonsDebut) (e: 1)", fps(24)).unwrap(),
        120
    );
}

#[test]
fn parse_rejects_bad_grammar() {
    for bad in ["01,00:00:00", " 01:00:00:00", "-1:00:00:00", "01:00:-1:00", "", "1:2:3:4:5"] {
        let err = parse(bad, fps(24)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidTimecode, "{bad}");
    }
    assert_eq!(
        parse("01,00:00:00", fps(24)).unwrap_err().message(),
        "\"01,00:00:00\" does not seem to be a valid TC."
    );
}

#[test]
fn parse_rejects_out_of_range_components() {
    for bad in ["25:00:00:00", "24:00:00:00", "01:60:00:00", "01:00:60:00", "01:00:00:24"] {
        assert_eq!(
            parse(bad, fps(24)).unwrap_err().kind(),
            ErrorKind::InvalidTimecode,
            "{bad}"
        );
    }
    assert!(parse("01:00:00:24", fps(25)).is_ok());
    assert_eq!(
        parse("00:00:20:25", fps(24)).unwrap_err().message(),
        "Illegal \"25\" found in TC"
    );
}

#[test]
fn format_basic_values() {
    assert_eq!(format(86400, fps(24)), "01:00:00:00");
    assert_eq!(format(0, fps(24)), "00:00:00:00");
    assert_eq!(format(86401, fps(24)), "01:00:00:01");
}

#[test]
fn format_wraps_around_a_day() {
    assert_eq!(format(-86400, fps(24)), "23:00:00:00");
    assert_eq!(format(-1, fps(24)), "23:59:59:23");
    assert_eq!(format(86400 * 365 * 24 * -1 - 1, fps(24)), "23:59:59:23");
    assert_eq!(format(86400 * 47, fps(24)), "23:00:00:00");
    assert_eq!(format(86400 * 365 * 24 - 1, fps(24)), "23:59:59:23");
}

#[test]
fn offset_and_convert() {
    assert_eq!(offset("01:00:00:00", 25, fps(25)).unwrap(), "01:00:01:00");
    assert_eq!(offset("01:00:00:00", 25 * 3600, fps(25)).unwrap(), "02:00:00:00");
    assert_eq!(offset("01:00:00:00", -25, fps(25)).unwrap(), "00:59:59:00");
    assert_eq!(offset("00:00:00:00", -25, fps(25)).unwrap(), "23:59:59:00");
    assert_eq!(offset("00", 0, fps(25)).unwrap(), "00:00:00:00");

    assert_eq!(convert("01:00:00:00", fps(24), fps(25)).unwrap(), "00:57:36:00");
    assert_eq!(convert("00:57:36:00", fps(25), fps(24)).unwrap(), "01:00:00:00");
    assert_eq!(convert("1:00", fps(24), fps(25)).unwrap(), "00:00:00:24");
    assert_eq!(convert("1:00:00", fps(24), fps(25)).unwrap(), "00:00:57:15");
}

#[test]
fn normalize_pads_components() {
    assert_eq!(normalize("1:2:3:4", fps(24)).unwrap(), "01:02:03:04");
}

#[test]
fn duration_rendering() {
    assert_eq!(to_duration(86400, 24.0).unwrap(), "01h 00m 0s");
    assert_eq!(to_duration(0, 24.0).unwrap(), "00h 00m 0s");
    assert_eq!(to_duration(86401, 24.0).unwrap(), "01h 00m 0.04s");
    assert_eq!(to_duration(86400 + 23, 24.0).unwrap(), "01h 00m 0.96s");
    assert_eq!(to_duration(86400 + 1 + 60 * 24, 24.0).unwrap(), "01h 01m 0.04s");
    assert_eq!(to_duration(36, 24.0).unwrap(), "00h 00m 1.5s");
    assert!(to_duration(86400, 25.1).is_ok());
    assert_eq!(
        to_duration(86400, 0.0).unwrap_err().kind(),
        ErrorKind::InvalidFps
    );
}

#[test]
fn negative_durations_keep_their_sign() {
    assert_eq!(to_duration(-86400, 24.0).unwrap(), "-1h 00m 0s");
    assert_eq!(to_duration(-1, 24.0).unwrap(), "00h 00m -0.04s");
}

#[test]
fn timecode_must_lead_the_text() {
    assert_eq!(parse("01:00:00:00\nsecond line", fps(24)).unwrap(), 86400);
    assert_eq!(parse("01:00:00:00 note\nmore", fps(24)).unwrap(), 86400);
    assert_eq!(
        parse("note\n01:00:00:00", fps(24)).unwrap_err().kind(),
        ErrorKind::InvalidTimecode
    );
}

#[test]
fn fps_validation() {
    assert!(Fps::new(0).is_err());
    assert_eq!(
        Fps::try_from_f64(-24.0).unwrap_err().message(),
        "fps must be > 0 (-24) given"
    );
    assert_eq!(
        Fps::try_from_f64(25.1).unwrap_err().message(),
        "fractional fps are not supported yet! (25.1) given"
    );
    assert_eq!(Fps::try_from_f64(25.0).unwrap().get(), 25);
    assert!(check_fps(f64::NAN, true).is_err());
    assert!(check_fps(23.976, true).is_ok());
}

#[test]
fn integer_validation() {
    assert_eq!(check_integer(86400.0).unwrap(), 86400);
    assert_eq!(check_integer(-3.0).unwrap(), -3);
    assert!(check_integer(86400.1).is_err());
    assert!(check_integer(0.1).is_err());

    assert_eq!(parse_integer("86400").unwrap(), 86400);
    assert_eq!(parse_integer("-1").unwrap(), -1);
    for bad in ["86400 garbage", "HA!", "", "+1", " 1", "1.0"] {
        assert_eq!(
            parse_integer(bad).unwrap_err().kind(),
            ErrorKind::IntegerExpected,
            "{bad}"
        );
    }
}

#[test]
fn frame_components() {
    let parts = split_frames(86400 + 60 * 24 * 61 + 24 * 5 + 7, fps(24));
    assert_eq!(parts.hours, 2);
    assert_eq!(parts.minutes, 1);
    assert_eq!(parts.total_minutes, 121);
    assert_eq!(parts.seconds, 5);
    assert_eq!(parts.frames, 7);

    let negative = split_frames(-25, fps(24));
    assert_eq!(negative.frames, -1);
    assert_eq!(negative.seconds, -1);
}

#[test]
fn shaped_tc_to_frame() {
    assert_eq!(tc_to_frame(&text(""), 24.0).unwrap(), Shaped::Empty);
    assert_eq!(
        tc_to_frame(&text("1:00:00:00\n1:00:00:01"), 24.0).unwrap(),
        Shaped::Lines("86400\n86401".to_string())
    );

    let nested = Shape::Sequence(vec![
        Shape::Sequence(vec![text("1:00:00:00\n1:00:00:01")]),
        Shape::Sequence(vec![text("1:00:00:02"), text("2:00:00:03")]),
    ]);
    assert_eq!(
        tc_to_frame(&nested, 24.0).unwrap(),
        Shaped::Sequence(vec![
            Shaped::Sequence(vec![Shaped::Lines("86400\n86401".to_string())]),
            Shaped::Sequence(vec![Shaped::Scalar(86402), Shaped::Scalar(2 * 86400 + 3)]),
        ])
    );

    assert_eq!(
        tc_to_frame(&text("01:00:00:00"), 25.1).unwrap_err().kind(),
        ErrorKind::InvalidFps
    );
    assert_eq!(
        tc_to_frame(&text("24:00:00:00"), 24.0).unwrap_err().kind(),
        ErrorKind::InvalidTimecode
    );
}

#[test]
fn shaped_frame_to_tc_contains_errors() {
    let input = Shape::Sequence(vec![
        Shape::Sequence(vec![Shape::lines("86400\n86401")]),
        Shape::Sequence(vec![Shape::lines("86402  654 \n86403 Â²garbage")]),
    ]);
    assert_eq!(
        frame_to_tc(&input, 24.0).unwrap(),
        Shaped::Sequence(vec![
            Shaped::Sequence(vec![Shaped::Lines("01:00:00:00\n01:00:00:01".to_string())]),
            Shaped::Sequence(vec![Shaped::Lines(
                "Integer expected: '86402  654 ' given\nInteger expected: '86403 [...] rbage' given"
                    .to_string()
            )]),
        ])
    );

    let mixed = Shape::Sequence(vec![Shape::from(0.654654), Shape::from(86400_i64 * 2 + 3)]);
    let out = frame_to_tc(&mixed, 24.0).unwrap();
    let Shaped::Sequence(items) = out else {
        panic!("sequence expected");
    };
    assert_eq!(items[0], Shaped::Failed(CoreError::integer_expected("0.654654")));
    assert_eq!(items[1], Shaped::Scalar("02:00:00:03".to_string()));

    assert_eq!(
        frame_to_tc(&Shape::from(86400.1), 25.0).unwrap_err().kind(),
        ErrorKind::IntegerExpected
    );
}

#[test]
fn shaped_duration_and_components() {
    assert_eq!(
        frame_to_duration(&Shape::lines("86400\n86401"), 24.0).unwrap(),
        Shaped::Lines("01h 00m 0s\n01h 00m 0.04s".to_string())
    );
    assert!(frame_to_duration(&Shape::from(86400.0), 25.1).is_ok());

    let out = frame_component(&Shape::from(86400.0 + 30.0), Component::Seconds, 24.0).unwrap();
    assert_eq!(out, Shaped::Scalar(1));
    let out = frame_component(&Shape::from(86400.0 + 30.0), Component::Frames, 24.0).unwrap();
    assert_eq!(out, Shaped::Scalar(6));
    let out = frame_component(&Shape::from(86400.0 * 3.0), Component::Hours, 24.0).unwrap();
    assert_eq!(out, Shaped::Scalar(3));
}

#[test]
fn shaped_offset_and_conversion() {
    assert_eq!(tc_offset(&text(""), 24.0, 25.0).unwrap(), Shaped::Empty);
    assert_eq!(
        tc_offset(&Shape::Sequence(vec![text("01:00:00:00")]), 24.0, -25.0)
            .unwrap_err()
            .kind(),
        ErrorKind::InvalidFps
    );
    assert_eq!(
        tc_offset(&text("01:00:00:00"), 24.1, 24.0).unwrap_err().kind(),
        ErrorKind::IntegerExpected
    );

    let input: Shape<String> = vec![text("1:00:00:00"), text("1:00:00:01")].into();
    assert_eq!(
        tc_conv(&input, 24.0, 25.0).unwrap(),
        Shaped::Sequence(vec![
            Shaped::Scalar("00:57:36:00".to_string()),
            Shaped::Scalar("00:57:36:01".to_string()),
        ])
    );
    assert_eq!(
        tc_conv(&text("1:00:00:00\n1:00:00:01"), 24.0, 25.0).unwrap(),
        Shaped::Lines("00:57:36:00\n00:57:36:01".to_string())
    );
}
