//! Повторяющиеся вложенные записи после основной записи.
//!
//! Число экземпляров в потоке не записано рядом с ними: границы
//! определяются по структуре. Новый экземпляр начинается с имени первого
//! поля таблицы, дальше поля идут в порядке таблицы (пропуски разрешены).
//! Имя, не подходящее ни под следующее поле, ни под первое, завершает
//! последовательность и передаётся следующему читателю как `lookahead`.

use std::marker::PhantomData;

use tracing::debug;

use super::{
    free_record, save_record,
    table::{decode_field, read_name},
    Record,
};
use crate::wire::Wire;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReaderState {
    /// Ждём имя первого поля очередного экземпляра.
    BeforeFirst,
    /// Читаем поля текущего экземпляра.
    Inside,
    /// Последовательность закончилась.
    Done,
}

/// Читатель последовательности записей `R`.
#[derive(Debug)]
pub struct RepeatedRecordReader<R> {
    state: ReaderState,
    lookahead: Option<String>,
    _record: PhantomData<fn() -> R>,
}

impl<R: Record> RepeatedRecordReader<R> {
    pub fn new() -> Self {
        Self::with_lookahead(None)
    }

    /// Читатель, который начнёт с уже прочитанного имени.
    pub fn with_lookahead(lookahead: Option<String>) -> Self {
        Self {
            state: ReaderState::BeforeFirst,
            lookahead,
            _record: PhantomData,
        }
    }

    pub fn is_done(&self) -> bool {
        self.state == ReaderState::Done
    }

    /// Читает следующий экземпляр.
    ///
    /// Экземпляр, оборванный чистым концом потока, сохраняется. Экземпляр,
    /// прерванный ошибкой потока, освобождается и отбрасывается.
    pub fn next_record(
        &mut self,
        wire: &mut Wire<'_>,
    ) -> Option<R> {
        if self.state == ReaderState::Done {
            return None;
        }
        let Some(first) = R::FIELDS.first() else {
            self.state = ReaderState::Done;
            return None;
        };
        let Some(mut name) = self.next_name(wire) else {
            self.state = ReaderState::Done;
            return None;
        };
        if name != first.name {
            self.lookahead = Some(name);
            self.state = ReaderState::Done;
            return None;
        }

        self.state = ReaderState::Inside;
        let mut record = R::default();
        let mut next = 0usize;
        loop {
            let matched = R::FIELDS[next..]
                .iter()
                .position(|f| f.name == name)
                .map(|pos| next + pos);
            match matched {
                Some(idx) => {
                    if !decode_field(&mut record, &R::FIELDS[idx], wire) {
                        debug!("{}: dropping instance interrupted by stream error", R::NAME);
                        free_record(&mut record);
                        self.state = ReaderState::Done;
                        return None;
                    }
                    next = idx + 1;
                }
                None => {
                    self.state = if name == first.name {
                        ReaderState::BeforeFirst
                    } else {
                        ReaderState::Done
                    };
                    self.lookahead = Some(name);
                    return Some(record);
                }
            }

            match self.next_name(wire) {
                Some(n) => name = n,
                None => {
                    self.state = ReaderState::Done;
                    if wire.at_end_of_stream() {
                        return Some(record);
                    }
                    debug!("{}: dropping instance interrupted by stream error", R::NAME);
                    free_record(&mut record);
                    return None;
                }
            }
        }
    }

    /// Читает все оставшиеся экземпляры.
    pub fn read_all(
        &mut self,
        wire: &mut Wire<'_>,
    ) -> Vec<R> {
        let mut records = Vec::new();
        while let Some(record) = self.next_record(wire) {
            records.push(record);
        }
        records
    }

    /// Отдаёт имя, на котором остановилась последовательность.
    pub fn into_lookahead(self) -> Option<String> {
        self.lookahead
    }

    fn next_name(
        &mut self,
        wire: &mut Wire<'_>,
    ) -> Option<String> {
        self.lookahead.take().or_else(|| read_name(wire))
    }
}

impl<R: Record> Default for RepeatedRecordReader<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Пишет экземпляры подряд. Их число хранит вызывающий в поле-счётчике.
pub fn write_repeated<R: Record>(
    records: &[R],
    wire: &mut Wire<'_>,
) {
    for record in records {
        save_record(record, wire);
    }
}
