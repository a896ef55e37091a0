//! Скалярные кодеки: word (знаковое целое), string, byte, char и
//! производные от word: bool и вещественное в формате 16.16.
//!
//! Формат токенов:
//! - word: `-?[0-9]+\n`
//! - string: `"` + байты, где `"` и `\` экранированы `\` + `"\n`
//! - byte: две шестнадцатеричные цифры + `\n`
//! - char: `'` + символ UTF-8 (`'` и `\` экранированы) + `'\n`

use scanrc_error::WireError;

use super::{Wire, WireCodec};

/// Шаг, с которым растёт буфер строки при декодировании.
pub const STRING_CHUNK: usize = 64;
/// Максимальная длина строки (1mb).
pub const MAX_STRING_LEN: usize = 1024 * 1024;
/// Единица фиксированной точки 16.16.
pub const FIXED_ONE: f64 = 65536.0;

/// Переводит вещественное число в фиксированную точку 16.16.
///
/// `None`, если значение не помещается в `i32` или не конечно.
pub fn to_fixed(value: f64) -> Option<i32> {
    let scaled = (value * FIXED_ONE).round();
    if scaled.is_finite() && scaled >= f64::from(i32::MIN) && scaled <= f64::from(i32::MAX) {
        Some(scaled as i32)
    } else {
        None
    }
}

/// Обратное к [`to_fixed`].
pub fn from_fixed(word: i32) -> f64 {
    f64::from(word) / FIXED_ONE
}

impl Wire<'_> {
    /// Пишет word-токен.
    pub fn write_word(
        &mut self,
        value: i64,
    ) {
        let text = value.to_string();
        self.put_bytes(text.as_bytes());
        self.put_byte(b'\n');
    }

    /// Читает word-токен.
    ///
    /// Пропускает пробелы, принимает необязательный `-` и цифры до первого
    /// нецифрового байта. Без единой цифры или при переполнении `i64`
    /// токен считается повреждённым. Конец данных сразу за цифрами даёт
    /// [`WireError::UnexpectedEof`].
    pub fn read_word(&mut self) -> Option<i64> {
        if !self.skip_whitespace() {
            return None;
        }
        let start = self.offset();
        let negative = self.peek_byte() == Some(b'-');
        if negative {
            self.next_byte();
        }

        let mut value: i64 = 0;
        let mut digits = 0usize;
        while let Some(b) = self.peek_byte() {
            if !b.is_ascii_digit() {
                break;
            }
            self.next_byte();
            let d = i64::from(b - b'0');
            let next = value.checked_mul(10).and_then(|v| {
                if negative {
                    v.checked_sub(d)
                } else {
                    v.checked_add(d)
                }
            });
            match next {
                Some(v) => value = v,
                None => {
                    self.fail(WireError::malformed("word", "integer overflow", start));
                    return None;
                }
            }
            digits += 1;
        }
        if !self.is_ok() {
            return None;
        }
        if digits == 0 {
            match self.peek_byte() {
                Some(b) => self.fail(WireError::malformed(
                    "word",
                    format!("expected decimal digit, found {:?}", b as char),
                    start,
                )),
                None => self.truncated("word"),
            }
            return None;
        }
        // Без разделителя за цифрами число могло быть обрезано.
        if self.peek_byte().is_none() {
            self.truncated("word");
            return None;
        }
        Some(value)
    }

    /// Пишет строковый токен, экранируя `"` и `\`.
    pub fn write_string(
        &mut self,
        bytes: &[u8],
    ) {
        self.put_byte(b'"');
        let mut rest = bytes;
        while let Some(i) = rest.iter().position(|&b| b == b'"' || b == b'\\') {
            self.put_bytes(&rest[..i]);
            self.put_byte(b'\\');
            self.put_byte(rest[i]);
            rest = &rest[i + 1..];
        }
        self.put_bytes(rest);
        self.put_byte(b'"');
        self.put_byte(b'\n');
    }

    /// Читает строковый токен как сырые байты.
    ///
    /// Токен обязан начинаться с `"`. Буфер растёт шагами по
    /// [`STRING_CHUNK`] байт и в конце ужимается до точной длины.
    pub fn read_string_bytes(&mut self) -> Option<Vec<u8>> {
        if !self.skip_whitespace() {
            return None;
        }
        let start = self.offset();
        match self.peek_byte()? {
            b'"' => {
                self.next_byte();
            }
            other => {
                self.fail(WireError::malformed(
                    "string",
                    format!("expected '\"', found {:?}", other as char),
                    start,
                ));
                return None;
            }
        }

        let mut bytes: Vec<u8> = Vec::new();
        loop {
            let byte = match self.next_byte() {
                Some(b'"') => break,
                Some(b'\\') => match self.next_byte() {
                    Some(escaped) => escaped,
                    None => {
                        self.truncated("string");
                        return None;
                    }
                },
                Some(b) => b,
                None => {
                    self.truncated("string");
                    return None;
                }
            };
            if bytes.len() == bytes.capacity() {
                if bytes.len() >= MAX_STRING_LEN {
                    self.fail(WireError::SizeLimit {
                        what: "string".to_string(),
                        size: bytes.len() as u64 + 1,
                        limit: MAX_STRING_LEN as u64,
                    });
                    return None;
                }
                if bytes.try_reserve_exact(STRING_CHUNK).is_err() {
                    self.fail(WireError::OutOfMemory {
                        requested: bytes.len() + STRING_CHUNK,
                    });
                    return None;
                }
            }
            bytes.push(byte);
        }
        bytes.shrink_to_fit();
        Some(bytes)
    }

    /// Читает строковый токен как UTF-8.
    pub fn read_string(&mut self) -> Option<String> {
        let start = self.offset();
        let bytes = self.read_string_bytes()?;
        match String::from_utf8(bytes) {
            Ok(s) => Some(s),
            Err(e) => {
                self.fail(WireError::malformed(
                    "string",
                    format!("invalid UTF-8: {e}"),
                    start,
                ));
                None
            }
        }
    }

    /// Пишет байт двумя шестнадцатеричными цифрами.
    pub fn write_byte(
        &mut self,
        value: u8,
    ) {
        self.put_bytes(format!("{value:02x}\n").as_bytes());
    }

    /// Читает байт из двух шестнадцатеричных цифр.
    pub fn read_byte(&mut self) -> Option<u8> {
        if !self.skip_whitespace() {
            return None;
        }
        let start = self.offset();
        let mut value = 0u8;
        for _ in 0..2 {
            let Some(b) = self.next_byte() else {
                self.truncated("byte");
                return None;
            };
            let Some(nibble) = (b as char).to_digit(16) else {
                self.fail(WireError::malformed(
                    "byte",
                    format!("expected hex digit, found {:?}", b as char),
                    start,
                ));
                return None;
            };
            value = (value << 4) | nibble as u8;
        }
        Some(value)
    }

    /// Пишет символ в одинарных кавычках.
    pub fn write_char(
        &mut self,
        value: char,
    ) {
        self.put_byte(b'\'');
        if value == '\'' || value == '\\' {
            self.put_byte(b'\\');
        }
        let mut utf8 = [0u8; 4];
        self.put_bytes(value.encode_utf8(&mut utf8).as_bytes());
        self.put_byte(b'\'');
        self.put_byte(b'\n');
    }

    /// Читает символ в одинарных кавычках.
    pub fn read_char(&mut self) -> Option<char> {
        if !self.skip_whitespace() {
            return None;
        }
        let start = self.offset();
        if self.peek_byte()? != b'\'' {
            self.fail(WireError::malformed("char", "expected opening '", start));
            return None;
        }
        self.next_byte();

        let mut utf8 = [0u8; 4];
        let first = match self.next_byte() {
            Some(b'\\') => self.next_byte(),
            other => other,
        };
        let Some(first) = first else {
            self.truncated("char");
            return None;
        };
        let width = match first {
            0x00..=0x7f => 1,
            0xc0..=0xdf => 2,
            0xe0..=0xef => 3,
            0xf0..=0xf7 => 4,
            _ => {
                self.fail(WireError::malformed("char", "invalid UTF-8 lead byte", start));
                return None;
            }
        };
        utf8[0] = first;
        for slot in utf8.iter_mut().take(width).skip(1) {
            let Some(b) = self.next_byte() else {
                self.truncated("char");
                return None;
            };
            *slot = b;
        }
        let decoded = std::str::from_utf8(&utf8[..width])
            .ok()
            .and_then(|s| s.chars().next());
        let Some(value) = decoded else {
            self.fail(WireError::malformed("char", "invalid UTF-8 sequence", start));
            return None;
        };

        match self.next_byte() {
            Some(b'\'') => Some(value),
            Some(_) => {
                self.fail(WireError::malformed("char", "expected closing '", start));
                None
            }
            None => {
                self.truncated("char");
                None
            }
        }
    }
}

/// Word-кодек для целых уже `i64`: значение вне диапазона типа считается
/// повреждённым токеном.
macro_rules! impl_word_codec {
    ($($ty:ty),+) => {
        $(
            impl WireCodec for $ty {
                fn encode(
                    &self,
                    wire: &mut Wire<'_>,
                ) {
                    wire.write_word(i64::from(*self));
                }

                fn decode(
                    &mut self,
                    wire: &mut Wire<'_>,
                ) {
                    let start = wire.offset();
                    let Some(word) = wire.read_word() else {
                        return;
                    };
                    match <$ty>::try_from(word) {
                        Ok(v) => *self = v,
                        Err(_) => wire.fail(WireError::malformed(
                            "word",
                            format!("{word} does not fit into {}", stringify!($ty)),
                            start,
                        )),
                    }
                }
            }
        )+
    };
}

impl_word_codec!(i16, u16, i32, u32);

impl WireCodec for i64 {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_word(*self);
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        if let Some(word) = wire.read_word() {
            *self = word;
        }
    }
}

impl WireCodec for bool {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_word(i64::from(*self));
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        if let Some(word) = wire.read_word() {
            *self = word != 0;
        }
    }
}

/// Вещественные значения хранятся словом в фиксированной точке 16.16.
impl WireCodec for f64 {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        match to_fixed(*self) {
            Some(word) => wire.write_word(i64::from(word)),
            None => {
                let offset = wire.offset();
                wire.fail(WireError::malformed(
                    "fixed",
                    format!("{self} is outside the 16.16 fixed-point range"),
                    offset,
                ));
            }
        }
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        let start = wire.offset();
        let Some(word) = wire.read_word() else {
            return;
        };
        match i32::try_from(word) {
            Ok(w) => *self = from_fixed(w),
            Err(_) => wire.fail(WireError::malformed(
                "fixed",
                format!("{word} is outside the 16.16 fixed-point range"),
                start,
            )),
        }
    }
}

impl WireCodec for String {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_string(self.as_bytes());
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        if let Some(s) = wire.read_string() {
            *self = s;
        }
    }

    fn free(&mut self) {
        *self = String::new();
    }
}

impl WireCodec for u8 {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_byte(*self);
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        if let Some(b) = wire.read_byte() {
            *self = b;
        }
    }
}

impl WireCodec for char {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_char(*self);
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        if let Some(c) = wire.read_char() {
            *self = c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::{Direction, MIN_CAPACITY};

    fn encode<T: WireCodec + ?Sized>(value: &T) -> Vec<u8> {
        let mut out = Vec::new();
        let mut wire = Wire::new(&mut out, Direction::Encode);
        value.encode(&mut wire);
        wire.finish().unwrap();
        out
    }

    fn decode<T: WireCodec + Default>(bytes: &[u8]) -> (T, Option<WireError>) {
        let mut input = bytes;
        let mut wire = Wire::with_capacity(&mut input, Direction::Decode, MIN_CAPACITY);
        let mut value = T::default();
        value.decode(&mut wire);
        (value, wire.reset_status())
    }

    #[test]
    fn test_word_format() {
        assert_eq!(encode(&42i32), b"42\n");
        assert_eq!(encode(&-7i32), b"-7\n");
        assert_eq!(encode(&0i64), b"0\n");
        assert_eq!(encode(&i64::MIN), format!("{}\n", i64::MIN).as_bytes());
    }

    #[test]
    fn test_word_decode_skips_whitespace() {
        let (v, status) = decode::<i32>(b"  \n\t-300\n");
        assert_eq!(v, -300);
        assert_eq!(status, None);
    }

    #[test]
    fn test_word_decode_stops_at_first_non_digit() {
        let mut input: &[u8] = b"12\"x\"";
        let mut wire = Wire::new(&mut input, Direction::Decode);
        assert_eq!(wire.read_word(), Some(12));
        assert_eq!(wire.read_string().as_deref(), Some("x"));
    }

    #[test]
    fn test_word_cut_before_delimiter_is_truncated() {
        let (v, status) = decode::<i32>(b"17");
        assert_eq!(v, 0, "a cut word must not be stored");
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));

        let (v, status) = decode::<f64>(b"13107");
        assert_eq!(v, 0.0);
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_word_without_digits_is_malformed() {
        let (v, status) = decode::<i32>(b"abc\n");
        assert_eq!(v, 0);
        assert!(matches!(status, Some(WireError::Malformed { .. })));

        let (_, status) = decode::<i32>(b"-");
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_word_overflow_is_malformed() {
        let (_, status) = decode::<i64>(b"9223372036854775808\n");
        assert!(matches!(status, Some(WireError::Malformed { .. })));

        let (v, status) = decode::<i64>(b"-9223372036854775808\n");
        assert_eq!(v, i64::MIN);
        assert_eq!(status, None);

        let (v, status) = decode::<i32>(b"4294967296\n");
        assert_eq!(v, 0, "out-of-range word must leave the field untouched");
        assert!(matches!(status, Some(WireError::Malformed { .. })));

        let (_, status) = decode::<u16>(b"-1\n");
        assert!(matches!(status, Some(WireError::Malformed { .. })));
    }

    #[test]
    fn test_empty_stream_is_clean_eof() {
        let (_, status) = decode::<i32>(b"   ");
        assert_eq!(status, Some(WireError::Eof));
    }

    #[test]
    fn test_bool_codec() {
        assert_eq!(encode(&true), b"1\n");
        assert_eq!(encode(&false), b"0\n");
        assert!(decode::<bool>(b"5\n").0);
        assert!(!decode::<bool>(b"0\n").0);
    }

    #[test]
    fn test_fixed_point() {
        assert_eq!(encode(&1.0f64), b"65536\n");
        assert_eq!(encode(&-0.5f64), b"-32768\n");
        assert_eq!(decode::<f64>(b"98304\n").0, 1.5);
        assert_eq!(to_fixed(40000.0), None);
        assert_eq!(to_fixed(f64::NAN), None);
        assert_eq!(from_fixed(to_fixed(2.25).unwrap()), 2.25);
    }

    #[test]
    fn test_fixed_point_out_of_range_fails_encode() {
        let mut out = Vec::new();
        let mut wire = Wire::new(&mut out, Direction::Encode);
        1.0e9f64.encode(&mut wire);
        assert!(matches!(
            wire.finish(),
            Err(WireError::Malformed { .. })
        ));
        assert!(out.is_empty());
    }

    #[test]
    fn test_string_format_and_escaping() {
        assert_eq!(encode(&"plain".to_string()), b"\"plain\"\n");
        assert_eq!(encode(&String::new()), b"\"\"\n");
        assert_eq!(
            encode(&r#"printer "A" \ lpr"#.to_string()),
            br#""printer \"A\" \\ lpr""#.iter().chain(b"\n").copied().collect::<Vec<u8>>()
        );
    }

    #[test]
    fn test_string_escaping_is_bijective() {
        let samples = [
            "",
            "\"",
            "\\",
            "\\\"",
            "a\"b\\c",
            "line\nbreak",
            "кириллица и \"кавычки\"",
            "trailing backslash\\",
        ];
        for s in samples {
            let bytes = encode(&s.to_string());
            let (decoded, status) = decode::<String>(&bytes);
            assert_eq!(status, None, "sample {s:?}");
            assert_eq!(decoded, s);
        }
    }

    #[test]
    fn test_string_requires_opening_quote() {
        let (v, status) = decode::<String>(b"hello\"\n");
        assert!(v.is_empty());
        assert!(matches!(status, Some(WireError::Malformed { .. })));
    }

    #[test]
    fn test_truncated_string() {
        let (v, status) = decode::<String>(b"\"never clo");
        assert!(v.is_empty());
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));

        let (_, status) = decode::<String>(b"\"dangling escape\\");
        assert!(matches!(status, Some(WireError::UnexpectedEof { .. })));
    }

    #[test]
    fn test_string_invalid_utf8() {
        let (_, status) = decode::<String>(b"\"\xff\xfe\"\n");
        assert!(matches!(status, Some(WireError::Malformed { .. })));

        let mut input: &[u8] = b"\"\xff\"\n";
        let mut wire = Wire::new(&mut input, Direction::Decode);
        assert_eq!(wire.read_string_bytes(), Some(vec![0xff]));
    }

    #[test]
    fn test_string_longer_than_buffer() {
        let long = "x\"".repeat(100);
        let bytes = encode(&long);
        let (decoded, status) = decode::<String>(&bytes);
        assert_eq!(status, None);
        assert_eq!(decoded, long);
    }

    #[test]
    fn test_string_free_releases_buffer() {
        let mut s = "payload".to_string();
        s.free();
        assert!(s.is_empty());
        assert_eq!(s.capacity(), 0);
        s.free();
        assert!(s.is_empty());
    }

    #[test]
    fn test_byte_codec() {
        assert_eq!(encode(&0xabu8), b"ab\n");
        assert_eq!(encode(&0x05u8), b"05\n");
        assert_eq!(decode::<u8>(b"FF\n").0, 0xff);
        assert!(matches!(
            decode::<u8>(b"zz\n").1,
            Some(WireError::Malformed { .. })
        ));
        assert!(matches!(
            decode::<u8>(b"a").1,
            Some(WireError::UnexpectedEof { .. })
        ));
    }

    #[test]
    fn test_char_codec() {
        assert_eq!(encode(&'a'), b"'a'\n");
        assert_eq!(encode(&'\''), b"'\\''\n");
        assert_eq!(encode(&'\\'), b"'\\\\'\n");
        for c in ['a', '\'', '\\', 'ж', '€', '🦀', '"'] {
            let (decoded, status) = decode::<char>(&encode(&c));
            assert_eq!(status, None, "char {c:?}");
            assert_eq!(decoded, c);
        }
        assert!(matches!(
            decode::<char>(b"'ab'\n").1,
            Some(WireError::Malformed { .. })
        ));
        assert!(matches!(
            decode::<char>(b"x\n").1,
            Some(WireError::Malformed { .. })
        ));
    }
}
