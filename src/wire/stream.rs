//! Буферизованный направленный поток (`Wire`).
//!
//! Поток владеет буфером фиксированного размера, привязанным к
//! [`Channel`]. При декодировании буфер дочитывается, когда непрочитанных
//! байт не хватает; при кодировании сбрасывается в канал, когда не хватает
//! места. Направление `Free` ввода-вывода не выполняет совсем.
//!
//! Статус потока «липкий»: первая ошибка запоминается, и после неё все
//! операции ничего не делают, пока вызывающий не вызовет
//! [`Wire::reset_status`].

use std::{fmt, io};

use scanrc_error::WireError;
use tracing::{trace, warn};

use super::Channel;

/// Размер буфера по умолчанию.
pub const DEFAULT_CAPACITY: usize = 8192;
/// Минимальный размер буфера: самый длинный скалярный токен (`i64::MIN`
/// с разделителем) обязан помещаться целиком.
pub const MIN_CAPACITY: usize = 32;

/// Направление потока.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Значения → байты.
    Encode,
    /// Байты → значения.
    Decode,
    /// Освобождение выделенных при декодировании данных, без ввода-вывода.
    Free,
}

impl fmt::Display for Direction {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let name = match self {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
            Direction::Free => "free",
        };
        f.write_str(name)
    }
}

/// Буферизованный поток над [`Channel`].
pub struct Wire<'a> {
    channel: &'a mut dyn Channel,
    direction: Direction,
    status: Option<WireError>,
    buf: Box<[u8]>,
    /// Курсор чтения (Decode).
    pos: usize,
    /// Конец валидных данных (Decode) или «грязной» области (Encode).
    end: usize,
    /// Сколько байт поток прочитал или записал с момента создания.
    offset: u64,
}

impl<'a> Wire<'a> {
    /// Создаёт поток с буфером [`DEFAULT_CAPACITY`].
    pub fn new(
        channel: &'a mut dyn Channel,
        direction: Direction,
    ) -> Self {
        Self::with_capacity(channel, direction, DEFAULT_CAPACITY)
    }

    /// Создаёт поток с буфером заданного размера (не меньше
    /// [`MIN_CAPACITY`]).
    pub fn with_capacity(
        channel: &'a mut dyn Channel,
        direction: Direction,
        capacity: usize,
    ) -> Self {
        let capacity = capacity.max(MIN_CAPACITY);
        Self {
            channel,
            direction,
            status: None,
            buf: vec![0u8; capacity].into_boxed_slice(),
            pos: 0,
            end: 0,
            offset: 0,
        }
    }

    /// Текущее направление.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Размер буфера.
    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    /// Число байт, прошедших через поток (для диагностики).
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Текущий статус: `None`, пока ошибок не было.
    pub fn status(&self) -> Option<&WireError> {
        self.status.as_ref()
    }

    /// `true`, пока статус не выставлен.
    pub fn is_ok(&self) -> bool {
        self.status.is_none()
    }

    /// `true`, если поток остановлен штатным концом данных.
    pub fn at_end_of_stream(&self) -> bool {
        matches!(self.status, Some(WireError::Eof))
    }

    /// Запоминает ошибку. Первая ошибка выигрывает.
    pub fn fail(
        &mut self,
        err: WireError,
    ) {
        if self.status.is_none() {
            trace!(error = %err, offset = self.offset, "wire status set");
            self.status = Some(err);
        }
    }

    /// Явно сбрасывает статус, возвращая прежний.
    pub fn reset_status(&mut self) -> Option<WireError> {
        self.status.take()
    }

    /// Превращает штатный конец потока в обрыв посреди токена.
    pub(crate) fn truncated(
        &mut self,
        context: &str,
    ) {
        match self.status {
            Some(WireError::Eof) => {
                self.status = Some(WireError::UnexpectedEof {
                    context: context.to_string(),
                    offset: self.offset,
                });
            }
            None => self.fail(WireError::UnexpectedEof {
                context: context.to_string(),
                offset: self.offset,
            }),
            Some(_) => {}
        }
    }

    /// Гарантирует `n` байт места (Encode) или `n` непрочитанных байт
    /// (Decode).
    ///
    /// При нехватке данных на декодировании выставляет [`WireError::Eof`].
    /// После выставленного статуса ничего не делает и возвращает `false`.
    pub fn ensure_space(
        &mut self,
        n: usize,
    ) -> bool {
        if self.status.is_some() {
            return false;
        }
        match self.direction {
            Direction::Encode => self.reserve_out(n),
            Direction::Decode => {
                if self.fill(n) {
                    true
                } else {
                    self.fail(WireError::Eof);
                    false
                }
            }
            Direction::Free => true,
        }
    }

    /// Меняет направление: сброс под старым направлением, переключение,
    /// сброс под новым.
    pub fn set_direction(
        &mut self,
        direction: Direction,
    ) {
        self.flush();
        self.direction = direction;
        self.flush();
    }

    /// Сбрасывает буфер согласно текущему направлению: Encode пишет
    /// накопленные байты в канал, Decode отбрасывает непрочитанные, Free
    /// ничего не делает.
    pub fn flush(&mut self) {
        match self.direction {
            Direction::Encode => {
                if self.status.is_none() {
                    self.write_out();
                }
                self.end = 0;
            }
            Direction::Decode => {
                self.pos = 0;
                self.end = 0;
            }
            Direction::Free => {}
        }
    }

    /// Завершает работу с потоком: дописывает буфер и синхронизирует канал.
    ///
    /// Штатный конец потока ошибкой не считается.
    pub fn finish(mut self) -> Result<(), WireError> {
        if self.direction == Direction::Encode && self.status.is_none() {
            self.write_out();
            if self.status.is_none() {
                if let Err(e) = self.channel.sync() {
                    self.fail(WireError::from_io(&e));
                }
            }
        }
        self.end = 0;
        self.pos = 0;
        match self.status.take() {
            None | Some(WireError::Eof) => Ok(()),
            Some(err) => Err(err),
        }
    }

    // --- Байтовые примитивы для кодеков ---

    /// Пишет один байт.
    pub fn put_byte(
        &mut self,
        byte: u8,
    ) {
        if !self.expect_direction(Direction::Encode, "write") || !self.reserve_out(1) {
            return;
        }
        self.buf[self.end] = byte;
        self.end += 1;
        self.offset += 1;
    }

    /// Пишет срез байт, сбрасывая буфер по мере заполнения.
    pub fn put_bytes(
        &mut self,
        mut bytes: &[u8],
    ) {
        if !self.expect_direction(Direction::Encode, "write") {
            return;
        }
        while !bytes.is_empty() {
            if !self.reserve_out(1) {
                return;
            }
            let room = self.buf.len() - self.end;
            let take = room.min(bytes.len());
            self.buf[self.end..self.end + take].copy_from_slice(&bytes[..take]);
            self.end += take;
            self.offset += take as u64;
            bytes = &bytes[take..];
        }
    }

    /// Подсматривает следующий байт, не потребляя его.
    ///
    /// Возвращает `None` при конце данных (статус не меняется) или при
    /// ошибке (статус выставлен). Различить можно через [`Wire::is_ok`].
    pub fn peek_byte(&mut self) -> Option<u8> {
        if !self.expect_direction(Direction::Decode, "read") {
            return None;
        }
        if self.status.is_some() || !self.fill(1) {
            return None;
        }
        Some(self.buf[self.pos])
    }

    /// Потребляет следующий байт. Семантика `None` как у
    /// [`Wire::peek_byte`].
    pub fn next_byte(&mut self) -> Option<u8> {
        let byte = self.peek_byte()?;
        self.pos += 1;
        self.offset += 1;
        Some(byte)
    }

    /// Пропускает пробельные символы перед токеном.
    ///
    /// Конец данных на границе токена выставляет [`WireError::Eof`].
    pub fn skip_whitespace(&mut self) -> bool {
        loop {
            match self.peek_byte() {
                Some(b) if b.is_ascii_whitespace() => {
                    self.pos += 1;
                    self.offset += 1;
                }
                Some(_) => return true,
                None => {
                    self.fail(WireError::Eof);
                    return false;
                }
            }
        }
    }

    // --- Внутреннее управление буфером ---

    fn expect_direction(
        &mut self,
        expected: Direction,
        operation: &'static str,
    ) -> bool {
        if self.direction == expected {
            return true;
        }
        self.fail(WireError::WrongDirection {
            operation,
            direction: self.direction.to_string(),
        });
        false
    }

    /// Освобождает место под `n` байт, сбрасывая «грязную» область.
    fn reserve_out(
        &mut self,
        n: usize,
    ) -> bool {
        if self.status.is_some() {
            return false;
        }
        if self.buf.len() - self.end < n {
            self.write_out();
            self.end = 0;
        }
        if n > self.buf.len() {
            self.fail(WireError::SizeLimit {
                what: "buffered token".to_string(),
                size: n as u64,
                limit: self.buf.len() as u64,
            });
        }
        self.status.is_none()
    }

    /// Пишет всю «грязную» область в канал, повторяя частичные записи.
    fn write_out(&mut self) {
        let mut written = 0;
        while written < self.end {
            match self.channel.write_some(&self.buf[written..self.end]) {
                Ok(0) => {
                    self.fail(WireError::from_io(&io::Error::from(
                        io::ErrorKind::WriteZero,
                    )));
                    return;
                }
                Ok(k) => written += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(error = %e, "wire flush failed");
                    self.fail(WireError::from_io(&e));
                    return;
                }
            }
        }
        trace!(bytes = written, "wire buffer flushed");
    }

    /// Дочитывает буфер, пока в нём не окажется `n` непрочитанных байт.
    ///
    /// Возвращает `false` при конце данных (статус не трогает) или ошибке
    /// канала (статус `Io`).
    fn fill(
        &mut self,
        n: usize,
    ) -> bool {
        if self.end - self.pos >= n {
            return true;
        }
        if n > self.buf.len() {
            self.fail(WireError::SizeLimit {
                what: "buffered token".to_string(),
                size: n as u64,
                limit: self.buf.len() as u64,
            });
            return false;
        }
        // Уплотняем непрочитанный хвост к началу буфера.
        self.buf.copy_within(self.pos..self.end, 0);
        self.end -= self.pos;
        self.pos = 0;

        while self.end < n {
            match self.channel.read_some(&mut self.buf[self.end..]) {
                Ok(0) => return false,
                Ok(k) => self.end += k,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.fail(WireError::from_io(&e));
                    return false;
                }
            }
        }
        true
    }
}

impl Drop for Wire<'_> {
    fn drop(&mut self) {
        if self.direction == Direction::Encode && self.end > 0 && self.status.is_none() {
            warn!(
                pending = self.end,
                "wire dropped with unflushed bytes; call finish()"
            );
        }
    }
}

impl fmt::Debug for Wire<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.debug_struct("Wire")
            .field("direction", &self.direction)
            .field("status", &self.status)
            .field("capacity", &self.buf.len())
            .field("pos", &self.pos)
            .field("end", &self.end)
            .field("offset", &self.offset)
            .finish()
    }
}
