//! Model builder tests

use pretty_assertions::assert_eq;

use super::*;

fn fps24() -> Option<Fps> {
    Some(Fps::new(24).unwrap())
}

const TWO_EVENTS: [[&str; 8]; 2] = [
    ["1", "AX", "V", "C", "00:00:00:00", "00:00:20:08", "00:00:00:00", "00:00:20:08"],
    ["2", "1", "V", "C", "01:00:00:00", "01:00:01:23", "00:00:20:08", "00:00:22:07"],
];

const MAPPED: [[&str; 8]; 4] = [
    ["1", "2", "V", "C", "00:00:00:00", "00:00:20:08", "00:00:00:00", "00:00:20:08"],
    ["2", "1", "V", "C", "01:00:00:00", "01:00:01:23", "00:00:20:08", "00:00:22:07"],
    [">>>", "SOURCE", "1", "bobine_01_929364", "", "", "", ""],
    [">>>", "SOURCE", "2", "bobine_02_929364", "", "", "", ""],
];

const MOTION_EDL: &str = "TITLE: t.Copy.01\n\
FCM: NON-DROP FRAME\n\
001  T1                V  C            01:00:05:18 01:00:05:19 07:07:23:04 07:07:28:03\n\
M2   T1                   -24                      01:00:05:18\n\
002  T1                V  C            01:00:00:19 01:00:00:19 07:07:28:03 07:07:28:03\n\
002  T2                V  D 024        02:00:07:10 02:00:07:11 07:07:28:03 07:07:29:03\n\
M2   T1                   -24                      01:00:00:19\n\
M2   T2                   -12                      02:00:07:10\n\
* BLEND, DISSOLVE\n\
003  T2                V  C            02:00:06:22 02:00:06:23 07:07:29:03 07:07:40:08\n\
M2   T2                   -12                      02:00:06:22\n\
004  GENE_FIN_FR_6545  V  C            01:00:02:21 01:02:17:19 07:08:24:03 07:10:39:01\n";

#[test]
fn simple_table_builds() {
    let sequence = EdlSequence::from_table(&TWO_EVENTS, fps24()).unwrap();
    let events = sequence.events();

    assert_eq!(events.len(), 2);
    assert_eq!(events[0].src_out, 488);
    assert_eq!(events[1].src_in, 86400);
    assert_eq!(events[1].rec_in, 488);
    assert_eq!(events[1].number, 2);
    assert_eq!(sequence.edit_length(), 535);
    assert_eq!(*sequence.stats(), EdlStats::default());
    assert!(!sequence.has_overlaps());
}

#[test]
fn source_mapping_applies_to_every_reference() {
    let sequence = EdlSequence::from_table(&MAPPED, fps24()).unwrap();
    let sources: Vec<&str> = sequence.events().iter().map(|e| e.source.as_str()).collect();
    assert_eq!(sources, vec!["bobine_02_929364", "bobine_01_929364"]);
}

#[test]
fn modulus_header_supplies_rate() {
    let mut table = vec![["TIME_CODE_MODULUS:", "24", "", "", "", "", "", ""]];
    table.extend(MAPPED);
    let sequence = EdlSequence::from_table(&table, None).unwrap();
    assert_eq!(sequence.fps().get(), 24);

    table[0][1] = "Birds fly without fear of falling";
    assert!(EdlSequence::from_table(&table, fps24()).is_ok());

    let err = EdlSequence::from_table(&table, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFps);
}

#[test]
fn missing_rate_is_fatal() {
    let err = EdlSequence::from_table(&MAPPED, None).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidFps);
    assert_eq!(
        err.message(),
        "no fps given and no TIME_CODE_MODULUS header found."
    );
}

#[test]
fn bad_timecode_names_the_event() {
    let mut table = TWO_EVENTS;
    table[1][6] = "00:00:20:25";
    let err = EdlSequence::from_table(&table, fps24()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEdl);
    assert_eq!(
        err.message(),
        "event # 2: Invalid timecode: Illegal \"25\" found in TC"
    );
}

#[test]
fn length_mismatch_is_fatal() {
    let mut table = TWO_EVENTS;
    table[0][4] = "00:00:00:01";
    table[1][6] = "00:00:20:23";
    let err = EdlSequence::from_table(&table, fps24()).unwrap_err();
    assert_eq!(
        err.message(),
        "source length (487) does not match record length (488) on event # 1 - check frame rate"
    );
}

#[test]
fn null_event_without_dissolve_is_fatal() {
    let table = [
        TWO_EVENTS[0],
        ["2", "1", "V", "C", "01:00:01:23", "01:00:01:23", "00:00:20:23", "00:00:20:23"],
    ];
    let err = EdlSequence::from_table(&table, fps24()).unwrap_err();
    assert_eq!(err.message(), "invalid length detected on event # 2");
}

#[test]
fn no_events_is_fatal() {
    let table = [["TITLE:", "nothing", "", "", "", "", "", ""]];
    let err = EdlSequence::from_table(&table, fps24()).unwrap_err();
    assert_eq!(err.message(), "No event found!?!");
}

#[test]
fn events_sorted_by_record_in() {
    let table = [
        ["2", "B", "V", "C", "00:00:01:00", "00:00:02:00", "00:00:01:00", "00:00:02:00"],
        ["1", "A", "V", "C", "00:00:00:00", "00:00:01:00", "00:00:00:00", "00:00:01:00"],
    ];
    let sequence = EdlSequence::from_table(&table, fps24()).unwrap();
    let labels: Vec<&str> = sequence.events().iter().map(|e| e.label.as_str()).collect();
    assert_eq!(labels, vec!["1", "2"]);
}

#[test]
fn motion_and_dissolves_reconciled() {
    let sequence = EdlSequence::parse(MOTION_EDL, fps24()).unwrap();
    let events = sequence.events();
    let stats = sequence.stats();

    assert!(stats.has_m2);
    assert_eq!(stats.dissolve_count, 1);
    assert_eq!(stats.dissolve_length, 24);
    assert_eq!(stats.source_overlap_count, 0);
    assert_eq!(stats.record_overlap_count, 0);

    assert_eq!(events[0].speed, Some(-24.0));
    assert_eq!(events[0].rec_out, 615_579);
    assert_eq!(events[0].src_in, 86_396);
    assert_eq!(events[1].speed, Some(-24.0));
    assert_eq!(events[2].speed, Some(-12.0));
    assert_eq!(events[2].src_in, 172_967);
    assert_eq!(events[3].src_in, 172_832);
    assert_eq!(events[4].speed, None);
}

#[test]
fn motion_reference_must_exist() {
    let text = "001  T1  V  C  01:00:05:18 01:00:05:19 07:07:23:04 07:07:23:05\n\
                M2   T1  -24  01:00:00:00\n";
    let err = EdlSequence::parse(text, fps24()).unwrap_err();
    assert_eq!(err.message(), "M2 reference (01:00:00:00) not found.");
}

#[test]
fn positive_motion_keeps_lengths_apart() {
    let text = "TITLE:No title given\n\
                TIME_CODE_MODULUS:24\n\
                003  BOB07  V  C        07:07:37:02 07:07:40:06 07:07:29:03 07:07:40:08\n\
                M2   BOB07     6.7                    07:07:37:02\n";
    let sequence = EdlSequence::parse(text, None).unwrap();
    assert_eq!(sequence.events()[0].speed, Some(6.7));
    assert_eq!(sequence.events()[0].src_len(), 76);
    assert_eq!(sequence.events()[0].rec_len(), 269);
}

#[test]
fn dissolve_after_positive_motion_rescales_source_out() {
    let text = "001  A  V  C     01:00:00:00 01:00:00:12 00:00:00:00 00:00:01:00\n\
                M2   A  12.0     01:00:00:00\n\
                002  A  V  C     01:00:00:12 01:00:00:12 00:00:01:00 00:00:01:00\n\
                M2   A  12.0     01:00:00:12\n\
                002  B  V  D 012 02:00:00:00 02:00:00:12 00:00:01:00 00:00:01:12\n";
    let sequence = EdlSequence::parse(text, fps24()).unwrap();
    let outgoing = &sequence.events()[0];

    assert_eq!(outgoing.rec_out, 36);
    // 86400 + 1 + 36 * 12 / 24
    assert_eq!(outgoing.src_out, 86_419);
    assert_eq!(sequence.stats().dissolve_count, 1);
    assert_eq!(sequence.stats().dissolve_length, 12);
}

#[test]
fn dissolve_after_positive_motion_must_not_regress() {
    let text = "001  A  V  C     01:00:00:00 01:00:00:12 00:00:00:00 00:00:01:00\n\
                M2   A  12.0     01:00:00:00\n\
                002  A  V  C     01:00:01:00 01:00:01:00 00:00:01:00 00:00:01:00\n\
                M2   A  12.0     01:00:01:00\n\
                002  B  V  D 012 02:00:00:00 02:00:00:12 00:00:01:00 00:00:01:12\n";
    let err = EdlSequence::parse(text, fps24()).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidEdl);
    assert_eq!(err.message(), "Dissolve on M2 adjustment sanity check failure");
}

#[test]
fn bad_dissolve_duration() {
    let text = "001  A  V  C    00:00:00:00 00:00:01:00 00:00:00:00 00:00:01:00\n\
                002  A  V  C    00:00:01:00 00:00:01:00 00:00:01:00 00:00:01:00\n\
                002  B  V  D xx 00:00:05:00 00:00:06:00 00:00:01:00 00:00:02:00\n";
    let err = EdlSequence::parse(text, fps24()).unwrap_err();
    assert_eq!(
        err.message(),
        "invalid dissolve duration (no integer:D xx) on event 002"
    );
}

#[test]
fn plain_dissolve_extends_outgoing_event() {
    let text = "001  A  V  C     00:00:00:00 00:00:01:00 00:00:00:00 00:00:01:00\n\
                002  A  V  C     00:00:01:00 00:00:01:00 00:00:01:00 00:00:01:00\n\
                002  B  V  D 012 00:00:05:00 00:00:06:00 00:00:01:00 00:00:02:00\n";
    let sequence = EdlSequence::parse(text, fps24()).unwrap();
    let events = sequence.events();
    assert_eq!(events[0].rec_out, 36);
    assert_eq!(events[0].src_out, 36);
    assert_eq!(sequence.stats().dissolve_length, 12);
    assert_eq!(sequence.stats().record_overlap_count, 0);
}

#[test]
fn clip_name_comments_rename_previous_event() {
    let text = "001  AX  V  C  01:00:00:00 01:00:01:00 00:00:00:00 00:00:01:00\n\
                * FROM CLIP NAME:  interview.mov\n\
                >>> SOURCE AX ignored_after_clip_names\n";
    let sequence = EdlSequence::parse(text, fps24()).unwrap();
    assert_eq!(sequence.events()[0].source, "interview.mov");
}

#[test]
fn marker_rows_become_events() {
    let table = [
        ["00:00:00:00", "00:00:20:08", "c1"],
        ["01:00:00:00", "01:00:01:23", "c2"],
        ["02:03:47:18 (s: BOBINE_01) (e: 15)", "", ""],
    ];
    let sequence = EdlSequence::from_table(&table, fps24()).unwrap();
    let events = sequence.events();

    assert_eq!(events[0].label, "0");
    assert_eq!(events[0].source, "MARK");
    assert_eq!(events[0].rec_out, 488);
    assert_eq!(events[1].label, "1");
    assert_eq!(events[1].src_in, events[1].rec_in);
    assert_eq!(events[2].source, "BOBINE_01");
    assert_eq!(events[2].src_len(), 1);
}

#[test]
fn source_overlaps_ignore_source_names_but_not_filler() {
    let table = [
        ["1", "A", "V", "C", "00:00:00:00", "00:00:17:00", "15:00:00:00", "15:00:17:00"],
        ["2", "B", "V", "C", "00:00:00:00", "00:00:05:00", "17:05:06:19", "17:05:11:19"],
        ["3", "BL", "V", "C", "00:00:00:00", "00:00:05:00", "18:00:00:00", "18:00:05:00"],
    ];
    let sequence = EdlSequence::from_table(&table, fps24()).unwrap();
    assert_eq!(sequence.stats().source_overlap_count, 1);
    assert!(sequence.has_overlaps());
}

#[test]
fn record_overlaps_counted() {
    let table = [
        ["1", "A", "V", "C", "00:00:00:00", "00:00:02:00", "00:00:00:00", "00:00:02:00"],
        ["2", "B", "V", "C", "00:00:10:00", "00:00:11:00", "00:00:01:00", "00:00:02:00"],
    ];
    let sequence = EdlSequence::from_table(&table, fps24()).unwrap();
    assert_eq!(sequence.stats().record_overlap_count, 1);
}
