pub mod prefs_error;
pub mod wire_error;

use std::{any::Any, io};

pub use prefs_error::*;
pub use wire_error::*;

use crate::{ErrorExt, StackError, StatusCode};

/// Ошибка без собственного типа: код и готовый текст.
///
/// Её строят `bail!(code, ..)` и преобразования из ошибок стандартной
/// библиотеки.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct GenericError {
    code: StatusCode,
    message: String,
}

impl GenericError {
    pub fn new(
        code: StatusCode,
        message: impl Into<String>,
    ) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl ErrorExt for GenericError {
    fn status_code(&self) -> StatusCode {
        self.code
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Сопоставляет вид ошибки канала с кодом scanrc.
pub fn io_status_code(kind: io::ErrorKind) -> StatusCode {
    use io::ErrorKind as K;

    match kind {
        K::NotFound => StatusCode::NotFound,
        K::AlreadyExists => StatusCode::AlreadyExists,
        K::PermissionDenied => StatusCode::PermissionDenied,
        K::Interrupted => StatusCode::Interrupted,
        K::UnexpectedEof => StatusCode::UnexpectedEof,
        K::StorageFull => StatusCode::DiskFull,
        K::OutOfMemory => StatusCode::OutOfMemory,
        K::InvalidData => StatusCode::InvalidData,
        _ => StatusCode::Io,
    }
}

impl From<io::Error> for StackError {
    fn from(err: io::Error) -> Self {
        GenericError::new(io_status_code(err.kind()), err.to_string()).into()
    }
}
