//! Property-based тесты wire-кодека и файла настроек.

use proptest::prelude::*;
use scanrc::{
    read_preferences, transfer_preferences,
    wire::{Direction, Wire, WireCodec, MIN_CAPACITY},
    write_preferences, Preferences, Record, StatusCode, WireError,
};

use generators::*;

const PROPTEST_CASES: u32 = 256;

fn encode_prefs(
    prefs: &mut Preferences,
    capacity: usize,
) -> Vec<u8> {
    let mut out = Vec::new();
    let mut wire = Wire::with_capacity(&mut out, Direction::Encode, capacity);
    write_preferences(prefs, &mut wire).unwrap();
    wire.finish().unwrap();
    out
}

fn encode_value<T: WireCodec>(value: &T) -> Vec<u8> {
    let mut out = Vec::new();
    let mut wire = Wire::new(&mut out, Direction::Encode);
    value.encode(&mut wire);
    wire.finish().unwrap();
    out
}

fn decode_value<T: WireCodec + Default>(
    bytes: &[u8],
    capacity: usize,
) -> (T, Option<WireError>) {
    let mut input = bytes;
    let mut wire = Wire::with_capacity(&mut input, Direction::Decode, capacity);
    let mut value = T::default();
    value.decode(&mut wire);
    (value, wire.reset_status())
}

fn encode_dyn(value: &dyn WireCodec) -> Vec<u8> {
    let mut out = Vec::new();
    let mut wire = Wire::new(&mut out, Direction::Encode);
    value.encode(&mut wire);
    wire.finish().unwrap();
    out
}

fn field_bytes<R: Record>(record: &R) -> Vec<Vec<u8>> {
    R::FIELDS.iter().map(|f| encode_dyn((f.get)(record))).collect()
}

/// Поля `back` до какого-то места совпадают с `orig`, дальше все по
/// умолчанию.
fn is_cut_record<R: Record>(
    back: &R,
    orig: &R,
) -> bool {
    let got = field_bytes(back);
    let want = field_bytes(orig);
    let fallback = field_bytes(&R::default());
    let split = got
        .iter()
        .zip(&want)
        .position(|(g, w)| g != w)
        .unwrap_or(got.len());
    got[split..] == fallback[split..]
}

/// Полные записи из начала `orig`, за ними не больше одной частичной.
fn is_cut_list<R: Record + PartialEq>(
    back: &[R],
    orig: &[R],
) -> bool {
    match back.split_last() {
        None => true,
        Some((last, done)) => {
            back.len() <= orig.len()
                && done == &orig[..done.len()]
                && is_cut_record(last, &orig[done.len()])
        }
    }
}

fn is_cut_preferences(
    back: &Preferences,
    orig: &Preferences,
    reached_sentinel: bool,
) -> bool {
    if !reached_sentinel {
        let defaults = Preferences::default();
        return is_cut_record(back, orig)
            && back.printers == defaults.printers
            && back.preset_areas == defaults.preset_areas
            && back.media == defaults.media;
    }
    if field_bytes(back) != field_bytes(orig) {
        return false;
    }
    if back.printers != orig.printers {
        is_cut_list(&back.printers, &orig.printers)
            && back.preset_areas.is_empty()
            && back.media.is_empty()
    } else if back.preset_areas != orig.preset_areas {
        is_cut_list(&back.preset_areas, &orig.preset_areas) && back.media.is_empty()
    } else {
        is_cut_list(&back.media, &orig.media)
    }
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: PROPTEST_CASES,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_preferences_round_trip(
        mut prefs in preferences_strategy(),
        capacity in MIN_CAPACITY..512usize,
    ) {
        let bytes = encode_prefs(&mut prefs, capacity);
        let mut input: &[u8] = &bytes;
        let mut wire = Wire::with_capacity(&mut input, Direction::Decode, capacity);
        let (back, summary) = read_preferences(&mut wire).unwrap();
        prop_assert_eq!(&back, &prefs);
        prop_assert!(!summary.mismatched());
    }

    #[test]
    fn prop_encoding_does_not_depend_on_capacity(
        mut prefs in preferences_strategy(),
        capacity in MIN_CAPACITY..128usize,
    ) {
        let small = encode_prefs(&mut prefs, capacity);
        let large = encode_prefs(&mut prefs, 1 << 20);
        prop_assert_eq!(small, large);
    }

    #[test]
    fn prop_string_escaping_is_bijective(s in text_strategy()) {
        let bytes = encode_value(&s);
        prop_assert_eq!(bytes.first(), Some(&b'"'));
        prop_assert_eq!(bytes.last(), Some(&b'\n'));
        let (back, status) = decode_value::<String>(&bytes, MIN_CAPACITY);
        prop_assert_eq!(status, None);
        prop_assert_eq!(back, s);
    }

    #[test]
    fn prop_word_round_trip(v in any::<i64>()) {
        let (back, status) = decode_value::<i64>(&encode_value(&v), MIN_CAPACITY);
        prop_assert_eq!(status, None);
        prop_assert_eq!(back, v);
    }

    #[test]
    fn prop_fixed_round_trip(v in fixed_strategy()) {
        let (back, status) = decode_value::<f64>(&encode_value(&v), MIN_CAPACITY);
        prop_assert_eq!(status, None);
        prop_assert_eq!(back, v);
    }

    #[test]
    fn prop_free_is_idempotent(mut prefs in preferences_strategy()) {
        let mut sink = Vec::new();
        let mut wire = Wire::new(&mut sink, Direction::Free);
        prop_assert_eq!(transfer_preferences(&mut prefs, &mut wire).unwrap(), None);
        let once = prefs.clone();
        prop_assert_eq!(transfer_preferences(&mut prefs, &mut wire).unwrap(), None);
        prop_assert_eq!(&prefs, &once);
        prop_assert!(prefs.working_directory.is_empty());
        prop_assert!(prefs.preview_window.is_none());
        prop_assert!(prefs.printers.is_empty());
        prop_assert!(prefs.preset_areas.is_empty());
        prop_assert!(prefs.media.is_empty());
        prop_assert!(wire.finish().is_ok());
        prop_assert!(sink.is_empty());
    }

    #[test]
    fn prop_arbitrary_input_never_panics(
        data in proptest::collection::vec(any::<u8>(), 0..512),
        capacity in MIN_CAPACITY..64usize,
    ) {
        let mut input: &[u8] = &data;
        let mut wire = Wire::with_capacity(&mut input, Direction::Decode, capacity);
        let _ = read_preferences(&mut wire);
    }

    #[test]
    fn prop_cut_stream_is_reported_or_a_clean_prefix(
        mut prefs in preferences_strategy(),
        cut_ratio in 0.0f64..1.0,
    ) {
        let bytes = encode_prefs(&mut prefs, 8192);
        let cut = (bytes.len() as f64 * cut_ratio) as usize;
        let mut input: &[u8] = &bytes[..cut];
        let mut wire = Wire::new(&mut input, Direction::Decode);
        match read_preferences(&mut wire) {
            Ok((back, summary)) => {
                prop_assert!(
                    is_cut_preferences(&back, &prefs, summary.reached_sentinel),
                    "cut at {} of {} produced values that were never written",
                    cut,
                    bytes.len()
                );
            }
            Err(err) => prop_assert_eq!(err.status_code(), StatusCode::UnexpectedEof),
        }
    }
}
