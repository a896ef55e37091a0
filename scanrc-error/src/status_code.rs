use std::fmt;

use num_enum::TryFromPrimitive;

/// Числовой код ошибки scanrc.
///
/// Сотни задают категорию (см. [`Category`]):
/// - 0: успех;
/// - 1xx: неверный запуск или настройки;
/// - 2xx: содержимое файла настроек;
/// - 3xx: канал ввода-вывода;
/// - 4xx: токены wire-формата.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive)]
#[repr(u16)]
#[non_exhaustive]
pub enum StatusCode {
    Success = 0,

    Internal = 100,
    InvalidArgs = 101,

    NotFound = 200,
    AlreadyExists = 201,
    InvalidData = 202,
    BadMagic = 203,

    Io = 300,
    PermissionDenied = 301,
    Interrupted = 302,
    DiskFull = 303,
    OutOfMemory = 304,
    UnexpectedEof = 305,
    EndOfStream = 306,

    MalformedToken = 400,
    SizeLimit = 401,
    WrongDirection = 402,
}

/// Крупная группа кодов.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Success,
    Usage,
    Data,
    Io,
    Format,
}

impl StatusCode {
    pub const fn code(self) -> u16 {
        self as u16
    }

    pub fn from_code(v: u16) -> Option<Self> {
        Self::try_from(v).ok()
    }

    pub fn category(self) -> Category {
        match self.code() / 100 {
            0 => Category::Success,
            1 => Category::Usage,
            2 => Category::Data,
            3 => Category::Io,
            _ => Category::Format,
        }
    }

    /// Повреждённый токен в потоке.
    pub fn is_format_error(self) -> bool {
        self.category() == Category::Format
    }

    /// Сбой канала. Штатный конец потока сюда не входит.
    pub fn is_io_error(self) -> bool {
        self.category() == Category::Io && self != Self::EndOfStream
    }

    /// Код завершения CLI в духе `sysexits.h`.
    pub fn exit_code(self) -> i32 {
        match (self, self.category()) {
            (Self::Success, _) => 0,
            (Self::Internal | Self::OutOfMemory, _) => 70,
            (Self::NotFound, _) => 66,
            (Self::PermissionDenied, _) => 77,
            (Self::UnexpectedEof, _) => 65,
            (_, Category::Usage) => 64,
            (_, Category::Data | Category::Format) => 65,
            (_, Category::Io) => 74,
            (_, Category::Success) => 1,
        }
    }
}

impl From<StatusCode> for u16 {
    fn from(c: StatusCode) -> Self {
        c.code()
    }
}

impl fmt::Display for StatusCode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        write!(f, "E{:03} {self:?}", self.code())
    }
}
