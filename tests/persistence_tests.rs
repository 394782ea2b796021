//! Binary format round-trips and corruption handling.

use std::io::Write;

use lexfst::{Error, Fst, Int32Fst, Pair, StringFst};

fn int_fixture() -> Int32Fst {
    Fst::new(vec![
        Pair::new("feb", 28),
        Pair::new("feb", 29),
        Pair::new("apr", 30),
        Pair::new("dec", 31),
    ])
    .unwrap()
}

#[test]
fn int_round_trip_preserves_everything() {
    let fst = int_fixture();
    let mut buf = Vec::new();
    let written = fst.write_to(&mut buf).unwrap();
    assert_eq!(written, buf.len() as u64);

    let loaded = Int32Fst::read_from(buf.as_slice()).unwrap();
    assert_eq!(loaded, fst);
}

#[test]
fn empty_fst_round_trips() {
    let fst = Int32Fst::new(vec![]).unwrap();
    let mut buf = Vec::new();
    fst.write_to(&mut buf).unwrap();
    // Two zero section lengths and nothing else.
    assert_eq!(buf.len(), 16);

    let loaded = Int32Fst::read_from(buf.as_slice()).unwrap();
    assert_eq!(loaded, fst);
    assert_eq!(loaded.search("anything"), None);
}

#[test]
fn data_section_is_little_endian() {
    let fst = Int32Fst::new(vec![Pair::new("ab", 1), Pair::new("ab", 0x0102_0304)]).unwrap();
    let mut buf = Vec::new();
    fst.write_to(&mut buf).unwrap();

    // data_len = 2, then the two tail entries 1 and 0x01020304.
    assert_eq!(&buf[0..8], &2i64.to_le_bytes());
    assert_eq!(&buf[8..12], &[1, 0, 0, 0]);
    assert_eq!(&buf[12..16], &[0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn truncated_stream_is_a_format_error() {
    let fst = int_fixture();
    let mut buf = Vec::new();
    fst.write_to(&mut buf).unwrap();

    for cut in [1, 7, 8, buf.len() / 2, buf.len() - 1] {
        let err = Int32Fst::read_from(&buf[..cut]).unwrap_err();
        assert!(
            matches!(err, Error::Format(_)),
            "cut at {}: unexpected {:?}",
            cut,
            err
        );
    }
}

#[test]
fn unknown_opcode_is_a_format_error() {
    let fst = int_fixture();
    let mut buf = Vec::new();
    fst.write_to(&mut buf).unwrap();

    // Overwrite the last program word's opcode byte with an unassigned
    // value. Words are little-endian, so the opcode is the last byte.
    let n = buf.len();
    buf[n - 1] = 0x0F;
    let err = Int32Fst::read_from(buf.as_slice()).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "unexpected {:?}", err);
}

#[test]
fn garbage_stream_is_rejected() {
    let err = Int32Fst::read_from(&b"not a transducer"[..]).unwrap_err();
    assert!(matches!(err, Error::Format(_) | Error::Io(_)));
}

#[test]
fn string_round_trip_preserves_everything() {
    let fst: StringFst = Fst::new(vec![
        Pair::new("東京", "Tokyo".to_string()),
        Pair::new("東京チョコレート", "Tokyo chocolate".to_string()),
        Pair::new("すもも", "peach".to_string()),
        Pair::new("すもも", "もも".to_string()),
    ])
    .unwrap();

    let mut buf = Vec::new();
    let written = fst.write_to(&mut buf).unwrap();
    assert_eq!(written, buf.len() as u64);

    let loaded = StringFst::read_from(buf.as_slice()).unwrap();
    assert_eq!(loaded, fst);
}

#[test]
fn string_entries_with_embedded_nul_are_rejected_on_write() {
    let fst: StringFst = Fst::new(vec![
        Pair::new("ab", "ok\0bad".to_string()),
        Pair::new("ab", "fine".to_string()),
    ])
    .unwrap();

    let mut buf = Vec::new();
    let err = fst.write_to(&mut buf).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "unexpected {:?}", err);
}

#[test]
fn string_entries_with_invalid_utf8_are_rejected_on_read() {
    let fst: StringFst = Fst::new(vec![Pair::new("ab", "x".to_string()), Pair::new("ab", "y".to_string())]).unwrap();
    let mut buf = Vec::new();
    fst.write_to(&mut buf).unwrap();

    // The first data entry is "x\0"; replace the x with a lone continuation
    // byte.
    buf[8] = 0x80;
    let err = StringFst::read_from(buf.as_slice()).unwrap_err();
    assert!(matches!(err, Error::Format(_)), "unexpected {:?}", err);
}

#[test]
fn round_trip_through_a_file() {
    let fst = int_fixture();
    let mut file = tempfile::tempfile().unwrap();
    fst.write_to(&mut file).unwrap();
    file.flush().unwrap();

    use std::io::Seek;
    file.rewind().unwrap();
    let loaded = Int32Fst::read_from(&file).unwrap();
    assert_eq!(loaded, fst);
}
