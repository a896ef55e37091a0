use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибка wire-потока.
///
/// Хранится в потоке как «липкий» статус: после первой ошибки все
/// последующие операции потока ничего не делают, пока статус не сброшен
/// явно.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// Ошибка чтения/записи канала.
    #[error("I/O error ({kind:?}): {reason}")]
    Io {
        kind: std::io::ErrorKind,
        reason: String,
    },

    /// Повреждённый или неожиданный токен.
    #[error("Malformed {what} at byte {offset}: {reason}")]
    Malformed {
        what: String,
        reason: String,
        offset: u64,
    },

    /// Не удалось выделить память под значение.
    #[error("Out of memory while allocating {requested} bytes")]
    OutOfMemory { requested: usize },

    /// Превышен лимит длины (массив, строка).
    #[error("Size limit exceeded for {what}: {size} > {limit}")]
    SizeLimit { what: String, size: u64, limit: u64 },

    /// Штатный конец потока на границе токена.
    #[error("end of stream")]
    Eof,

    /// Поток оборвался посреди токена.
    #[error("Unexpected end of stream inside {context} at byte {offset}")]
    UnexpectedEof { context: String, offset: u64 },

    /// Операция не соответствует текущему направлению потока.
    #[error("Cannot {operation} on a wire in {direction} direction")]
    WrongDirection {
        operation: &'static str,
        direction: String,
    },
}

impl WireError {
    /// Строит ошибку из `std::io::Error`, сохраняя вид и текст.
    pub fn from_io(err: &std::io::Error) -> Self {
        Self::Io {
            kind: err.kind(),
            reason: err.to_string(),
        }
    }

    /// Короткий конструктор для повреждённого токена.
    pub fn malformed(
        what: impl Into<String>,
        reason: impl Into<String>,
        offset: u64,
    ) -> Self {
        Self::Malformed {
            what: what.into(),
            reason: reason.into(),
            offset,
        }
    }

    /// `true` для штатного конца потока (не ошибка данных).
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Self::Eof)
    }
}

impl ErrorExt for WireError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::Io { kind, .. } => crate::io_status_code(*kind),
            Self::Malformed { .. } => StatusCode::MalformedToken,
            Self::OutOfMemory { .. } => StatusCode::OutOfMemory,
            Self::SizeLimit { .. } => StatusCode::SizeLimit,
            Self::Eof => StatusCode::EndOfStream,
            Self::UnexpectedEof { .. } => StatusCode::UnexpectedEof,
            Self::WrongDirection { .. } => StatusCode::WrongDirection,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
