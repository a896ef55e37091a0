//! Интерпретатор таблицы полей.
//!
//! Сохранение пишет каждое поле парой «имя как строковый токен, значение».
//! Загрузка читает имена, пока не встретит поле-разделитель, конец потока
//! или ошибку. После неизвестного имени токены пропускаются до следующего
//! строкового токена с именем из таблицы, поэтому значение неизвестного
//! поля может состоять из любого числа токенов. Уже прочитанные поля при
//! ошибке не откатываются, а непрочитанные сохраняют значения по
//! умолчанию.

use scanrc_error::WireError;
use tracing::debug;

use super::{Field, Record};
use crate::wire::{Direction, Wire};

/// Чем закончилась загрузка записи.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadEnd {
    /// Прочитано поле-разделитель.
    Sentinel,
    /// Поток чисто закончился на границе токена.
    EndOfStream,
    /// Поток повреждён или оборван. Ошибка лежит в статусе потока.
    Failed,
}

impl LoadEnd {
    fn from_status(wire: &Wire<'_>) -> Self {
        if wire.at_end_of_stream() {
            LoadEnd::EndOfStream
        } else {
            LoadEnd::Failed
        }
    }
}

/// Пишет запись целиком в порядке таблицы.
pub fn save_record<R: Record>(
    record: &R,
    wire: &mut Wire<'_>,
) {
    for field in R::FIELDS {
        if !wire.is_ok() {
            break;
        }
        wire.write_string(field.name.as_bytes());
        (field.get)(record).encode(wire);
    }
}

/// Загружает запись на месте.
pub fn load_record<R: Record>(
    record: &mut R,
    wire: &mut Wire<'_>,
) -> LoadEnd {
    loop {
        let Some(name) = read_name(wire) else {
            return LoadEnd::from_status(wire);
        };
        let field = match R::field(&name) {
            Some(field) => field,
            None => {
                debug!("{}: skipping unknown field {:?}", R::NAME, name);
                match skip_unknown::<R>(wire) {
                    Some(field) => field,
                    None => return LoadEnd::from_status(wire),
                }
            }
        };
        if !decode_field(record, field, wire) {
            return LoadEnd::Failed;
        }
        if R::SENTINEL == Some(field.name) {
            return LoadEnd::Sentinel;
        }
    }
}

/// Освобождает все поля записи. Повторный вызов ничего не делает.
pub fn free_record<R: Record>(record: &mut R) {
    for field in R::FIELDS {
        (field.get_mut)(record).free();
    }
}

/// Обход записи в направлении потока.
///
/// Для `Decode` возвращает итог загрузки, для остальных направлений `None`.
pub fn transfer_record<R: Record>(
    record: &mut R,
    wire: &mut Wire<'_>,
) -> Option<LoadEnd> {
    match wire.direction() {
        Direction::Encode => {
            save_record(record, wire);
            None
        }
        Direction::Decode => Some(load_record(record, wire)),
        Direction::Free => {
            free_record(record);
            None
        }
    }
}

/// Декодирует значение поля. Конец потока посреди значения считается
/// обрывом.
pub(crate) fn decode_field<R>(
    record: &mut R,
    field: &Field<R>,
    wire: &mut Wire<'_>,
) -> bool {
    (field.get_mut)(record).decode(wire);
    if wire.at_end_of_stream() {
        wire.truncated(field.name);
    }
    wire.is_ok()
}

/// Читает имя следующего поля.
///
/// Одиночные word- и char-токены на месте имени пропускаются: так
/// переживают неизвестные поля-массивы из чисел.
pub(crate) fn read_name(wire: &mut Wire<'_>) -> Option<String> {
    loop {
        if !wire.skip_whitespace() {
            return None;
        }
        let start = wire.offset();
        match wire.peek_byte()? {
            b'"' => return wire.read_string(),
            b'-' | b'0'..=b'9' => {
                let word = wire.read_word()?;
                debug!("skipping stray word {} at byte {}", word, start);
            }
            b'\'' => {
                wire.read_char()?;
            }
            other => {
                wire.fail(WireError::malformed(
                    "field name",
                    format!("unexpected byte {:?}", other as char),
                    start,
                ));
                return None;
            }
        }
    }
}

/// Пропускает значение неизвестного поля.
///
/// Первый токен после имени всегда значение. Дальше пропускается всё до
/// строки, совпадающей с именем поля `R`; это поле и возвращается. `None`
/// означает конец потока или ошибку, см. статус.
pub(crate) fn skip_unknown<R: Record>(wire: &mut Wire<'_>) -> Option<&'static Field<R>> {
    if !wire.skip_whitespace() {
        wire.truncated("field value");
        return None;
    }
    skip_token(wire)?;
    loop {
        if !wire.skip_whitespace() {
            return None;
        }
        if let Some(name) = skip_token(wire)? {
            if let Some(field) = std::str::from_utf8(&name).ok().and_then(R::field) {
                return Some(field);
            }
        }
    }
}

/// Пропускает один токен. Для строки возвращает её байты.
fn skip_token(wire: &mut Wire<'_>) -> Option<Option<Vec<u8>>> {
    let start = wire.offset();
    match wire.peek_byte()? {
        b'"' => return wire.read_string_bytes().map(Some),
        b'\'' => {
            wire.read_char()?;
        }
        b'-' | b'0'..=b'9' => {
            wire.read_word()?;
        }
        other => {
            wire.fail(WireError::malformed(
                "field value",
                format!("unexpected byte {:?}", other as char),
                start,
            ));
            return None;
        }
    }
    Some(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::test_records::{Device, Header};

    fn save<R: Record>(record: &R) -> Vec<u8> {
        let mut out = Vec::new();
        let mut wire = Wire::new(&mut out, Direction::Encode);
        save_record(record, &mut wire);
        wire.finish().unwrap();
        out
    }

    fn load<R: Record>(bytes: &[u8]) -> (R, LoadEnd, Option<WireError>) {
        let mut input = bytes;
        let mut wire = Wire::new(&mut input, Direction::Decode);
        let mut record = R::default();
        let end = load_record(&mut record, &mut wire);
        (record, end, wire.reset_status())
    }

    fn printer_a() -> Device {
        Device {
            name: "printer \"A\"".into(),
            resolution: 300,
            gammas: [1.0, 1.0, 1.0],
        }
    }

    #[test]
    fn test_save_format() {
        let bytes = save(&printer_a());
        assert_eq!(
            bytes,
            b"\"name\"\n\"printer \\\"A\\\"\"\n\"resolution\"\n300\n\"gammas\"\n3\n65536\n65536\n65536\n"
        );
    }

    #[test]
    fn test_round_trip() {
        let bytes = save(&printer_a());
        let (device, end, status) = load::<Device>(&bytes);
        assert_eq!(device, printer_a());
        assert_eq!(end, LoadEnd::EndOfStream);
        assert_eq!(status, Some(WireError::Eof));
    }

    #[test]
    fn test_truncated_stream_keeps_defaults() {
        let bytes = save(&printer_a());
        let name_at = bytes
            .windows(b"\"resolution\"".len())
            .position(|w| w == b"\"resolution\"")
            .unwrap();

        for cut in [name_at + 5, name_at + b"\"resolution\"\n".len()] {
            let (device, end, status) = load::<Device>(&bytes[..cut]);
            assert_eq!(device.name, "printer \"A\"");
            assert_eq!(end, LoadEnd::Failed);
            assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
            assert_eq!(device.resolution, Device::default().resolution);
            assert_eq!(device.gammas, Device::default().gammas);
        }
    }

    #[test]
    fn test_truncated_inside_value() {
        let bytes = save(&printer_a());
        let cut = bytes.len() - 7;
        let (device, end, status) = load::<Device>(&bytes[..cut]);
        assert_eq!(end, LoadEnd::Failed);
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
        assert_eq!(device.resolution, 300);
        assert_eq!(device.gammas, Device::default().gammas);
    }

    #[test]
    fn test_word_cut_at_end_is_not_a_value() {
        let (device, end, status) = load::<Device>(b"\"name\"\n\"n\"\n\"resolution\"\n30");
        assert_eq!(end, LoadEnd::Failed);
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
        assert_eq!(device.name, "n");
        assert_eq!(device.resolution, Device::default().resolution);
    }

    #[test]
    fn test_missing_fields_keep_defaults() {
        let (device, end, _) = load::<Device>(b"\"name\"\n\"x\"\n");
        assert_eq!(end, LoadEnd::EndOfStream);
        assert_eq!(device.name, "x");
        assert_eq!(device.resolution, 72);
    }

    #[test]
    fn test_unknown_fields_are_skipped() {
        let input = b"\"colour\"\n\"red\"\n\"resolution\"\n600\n\"flag\"\n1\n\"initial\"\n'q'\n\"list\"\n3\n1\n2\n3\n\"name\"\n\"n\"\n";
        let (device, end, status) = load::<Device>(input);
        assert_eq!(end, LoadEnd::EndOfStream);
        assert_eq!(status, Some(WireError::Eof));
        assert_eq!(device.resolution, 600);
        assert_eq!(device.name, "n");
    }

    #[test]
    fn test_unknown_string_array_is_skipped() {
        let input = b"\"aliases\"\n1\n\"scanner-x\"\n\"name\"\n\"n\"\n\"resolution\"\n600\n";
        let (device, end, status) = load::<Device>(input);
        assert_eq!(end, LoadEnd::EndOfStream);
        assert_eq!(status, Some(WireError::Eof));
        assert_eq!(device.name, "n");
        assert_eq!(device.resolution, 600);
    }

    #[test]
    fn test_unknown_value_named_like_a_field() {
        let input = b"\"alias\"\n\"name\"\n\"name\"\n\"real\"\n";
        let (device, end, _) = load::<Device>(input);
        assert_eq!(end, LoadEnd::EndOfStream);
        assert_eq!(device.name, "real");
    }

    #[test]
    fn test_unknown_field_at_end_of_stream() {
        let (device, end, status) = load::<Device>(b"\"resolution\"\n150\n\"colour\"\n\"red\"\n");
        assert_eq!(end, LoadEnd::EndOfStream);
        assert_eq!(status, Some(WireError::Eof));
        assert_eq!(device.resolution, 150);
    }

    #[test]
    fn test_unknown_field_without_value_is_truncated() {
        let (_, end, status) = load::<Device>(b"\"colour\"\n");
        assert_eq!(end, LoadEnd::Failed);
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_garbage_where_name_expected() {
        let (device, end, status) = load::<Device>(b"\"resolution\"\n150\n?\n");
        assert_eq!(end, LoadEnd::Failed);
        assert!(matches!(status, Some(WireError::Malformed { .. })));
        assert_eq!(device.resolution, 150);
    }

    #[test]
    fn test_malformed_value_poisons_stream() {
        let (device, end, status) =
            load::<Device>(b"\"resolution\"\n\"oops\"\n\"name\"\n\"late\"\n");
        assert_eq!(end, LoadEnd::Failed);
        assert!(matches!(status, Some(WireError::Malformed { .. })));
        assert!(device.name.is_empty());
    }

    #[test]
    fn test_sentinel_stops_loading() {
        let header = Header {
            title: "t".into(),
            tags: vec!["a".into(), "b".into()],
            devices: 2,
        };
        let mut bytes = save(&header);
        bytes.extend_from_slice(b"\"name\"\n\"after\"\n");

        let mut input: &[u8] = &bytes;
        let mut wire = Wire::new(&mut input, Direction::Decode);
        let mut loaded = Header::default();
        assert_eq!(load_record(&mut loaded, &mut wire), LoadEnd::Sentinel);
        assert!(wire.is_ok());
        assert_eq!(loaded, header);
        assert_eq!(read_name(&mut wire).as_deref(), Some("name"));
    }

    #[test]
    fn test_transfer_and_free() {
        let mut header = Header {
            title: "t".into(),
            tags: vec!["a".into()],
            devices: 1,
        };
        let mut out = Vec::new();
        let mut wire = Wire::new(&mut out, Direction::Encode);
        assert_eq!(transfer_record(&mut header, &mut wire), None);
        wire.set_direction(Direction::Free);
        assert_eq!(transfer_record(&mut header, &mut wire), None);
        wire.finish().unwrap();

        assert!(header.title.is_empty());
        assert!(header.tags.is_empty());
        free_record(&mut header);
        assert!(header.tags.is_empty());

        let mut input: &[u8] = &out;
        let mut wire = Wire::new(&mut input, Direction::Decode);
        let mut back = Header::default();
        assert_eq!(
            transfer_record(&mut back, &mut wire),
            Some(LoadEnd::Sentinel)
        );
        assert_eq!(back.tags, vec!["a".to_string()]);
    }
}
