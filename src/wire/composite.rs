//! Составные кодеки: массив с префиксом длины, массив фиксированной длины
//! и указатель (`Option<Box<T>>`).
//!
//! Декодированное значение присваивается полю только целиком. Если
//! декодирование прервалось, поле сохраняет прежнее значение, а частично
//! собранное освобождается.

use scanrc_error::WireError;

use super::{Wire, WireCodec};

/// Максимальная длина массива на проводе.
pub const MAX_ARRAY_LEN: usize = 1_048_576;

/// Значение is-null слова для отсутствующего указателя.
const PTR_NULL: i64 = 1;
/// Значение is-null слова для присутствующего указателя.
const PTR_PRESENT: i64 = 0;

impl Wire<'_> {
    /// Читает и проверяет длину массива.
    pub fn read_array_len(&mut self) -> Option<usize> {
        let start = self.offset();
        let len = self.read_word()?;
        if len < 0 {
            self.fail(WireError::malformed(
                "array",
                format!("negative length {len}"),
                start,
            ));
            return None;
        }
        if len as u64 > MAX_ARRAY_LEN as u64 {
            self.fail(WireError::malformed(
                "array",
                format!("length {len} exceeds limit {MAX_ARRAY_LEN}"),
                start,
            ));
            return None;
        }
        Some(len as usize)
    }

    /// Фиксирует провал элемента составного значения.
    ///
    /// Чистый конец потока внутри значения превращается в
    /// `UnexpectedEof`.
    fn element_failed(
        &mut self,
        context: &str,
    ) {
        if self.at_end_of_stream() {
            self.truncated(context);
        }
    }
}

/// Декодирует `len` элементов подряд. `None`, если поток оборвался.
fn decode_elements<T: WireCodec + Default>(
    wire: &mut Wire<'_>,
    len: usize,
) -> Option<Vec<T>> {
    let mut items: Vec<T> = Vec::new();
    if items.try_reserve_exact(len).is_err() {
        wire.fail(WireError::OutOfMemory {
            requested: len.saturating_mul(std::mem::size_of::<T>()),
        });
        return None;
    }
    for _ in 0..len {
        let mut item = T::default();
        item.decode(wire);
        if !wire.is_ok() {
            wire.element_failed("array");
            item.free();
            for mut done in items {
                done.free();
            }
            return None;
        }
        items.push(item);
    }
    Some(items)
}

impl<T: WireCodec + Default> WireCodec for Vec<T> {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_word(self.len() as i64);
        for item in self {
            item.encode(wire);
        }
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        let Some(len) = wire.read_array_len() else {
            return;
        };
        if let Some(items) = decode_elements(wire, len) {
            self.free();
            *self = items;
        }
    }

    fn free(&mut self) {
        for item in self.iter_mut() {
            item.free();
        }
        *self = Vec::new();
    }
}

impl<T: WireCodec + Default, const N: usize> WireCodec for [T; N] {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        wire.write_word(N as i64);
        for item in self {
            item.encode(wire);
        }
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        let start = wire.offset();
        let Some(len) = wire.read_array_len() else {
            return;
        };
        if len != N {
            wire.fail(WireError::malformed(
                "array",
                format!("expected {N} elements, found {len}"),
                start,
            ));
            return;
        }
        let mut decoded: [T; N] = std::array::from_fn(|_| T::default());
        for item in decoded.iter_mut() {
            item.decode(wire);
            if !wire.is_ok() {
                wire.element_failed("array");
                decoded.free();
                return;
            }
        }
        self.free();
        *self = decoded;
    }

    fn free(&mut self) {
        for item in self.iter_mut() {
            item.free();
        }
    }
}

impl<T: WireCodec + Default> WireCodec for Option<Box<T>> {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        match self {
            None => wire.write_word(PTR_NULL),
            Some(value) => {
                wire.write_word(PTR_PRESENT);
                value.encode(wire);
            }
        }
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        let start = wire.offset();
        let Some(flag) = wire.read_word() else {
            return;
        };
        match flag {
            PTR_NULL => {
                self.free();
            }
            PTR_PRESENT => {
                let mut value = Box::<T>::default();
                value.decode(wire);
                if wire.is_ok() {
                    self.free();
                    *self = Some(value);
                } else {
                    wire.element_failed("pointer");
                    value.free();
                }
            }
            other => wire.fail(WireError::malformed(
                "pointer",
                format!("invalid is-null flag {other}"),
                start,
            )),
        }
    }

    fn free(&mut self) {
        if let Some(mut value) = self.take() {
            value.free();
        }
    }
}
