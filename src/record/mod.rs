//! Декларативные таблицы полей и их интерпретатор.
//!
//! Запись описывается статической таблицей `{имя, доступ на чтение,
//! доступ на запись}`. Интерпретатор ([`table`]) сохраняет и загружает
//! запись целиком, не зная её внутреннего устройства: он видит только
//! `dyn WireCodec`. Повторяющиеся вложенные записи разбирает
//! [`repeated::RepeatedRecordReader`].

pub mod repeated;
pub mod table;

use std::fmt;

pub use repeated::{write_repeated, RepeatedRecordReader};
pub use table::{free_record, load_record, save_record, transfer_record, LoadEnd};

use crate::wire::WireCodec;

/// Описание одного поля записи `R`.
pub struct Field<R> {
    /// Имя поля в потоке.
    pub name: &'static str,
    pub get: fn(&R) -> &dyn WireCodec,
    pub get_mut: fn(&mut R) -> &mut dyn WireCodec,
}

impl<R> Clone for Field<R> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<R> Copy for Field<R> {}

impl<R> fmt::Debug for Field<R> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Field").field("name", &self.name).finish()
    }
}

/// Запись, сохраняемая через таблицу полей.
pub trait Record: Default + 'static {
    /// Имя записи для логов.
    const NAME: &'static str;

    /// Таблица полей в порядке записи в поток.
    const FIELDS: &'static [Field<Self>];

    /// Поле, после которого загрузка записи заканчивается.
    const SENTINEL: Option<&'static str> = None;

    /// Ищет поле по имени.
    fn field(name: &str) -> Option<&'static Field<Self>> {
        Self::FIELDS.iter().find(|f| f.name == name)
    }
}

/// Строит [`Field`] для поля `member` записи `record`.
///
/// ```ignore
/// const FIELDS: &'static [Field<Printer>] = &[
///     field!(Printer, "printer-name", name),
///     field!(Printer, "printer-command", command),
/// ];
/// ```
#[macro_export]
macro_rules! field {
    ($record:ty, $name:literal, $member:ident) => {{
        fn get(r: &$record) -> &dyn $crate::wire::WireCodec {
            &r.$member
        }
        fn get_mut(r: &mut $record) -> &mut dyn $crate::wire::WireCodec {
            &mut r.$member
        }
        $crate::record::Field::<$record> {
            name: $name,
            get,
            get_mut,
        }
    }};
}
