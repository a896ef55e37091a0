use std::any::Any;

use thiserror::Error;

use crate::{ErrorExt, StatusCode};

/// Ошибки файла настроек и конфигурации приложения.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PrefsError {
    /// Файл не начинается с маркера формата.
    #[error("Not a preferences file: expected marker {expected:?}, found {found:?}")]
    BadMagic { expected: String, found: String },

    /// Недопустимое значение параметра конфигурации.
    #[error("Invalid setting '{key}': {reason}")]
    InvalidSetting { key: String, reason: String },

    /// Конфигурацию не удалось собрать из источников.
    #[error("Failed to load settings: {reason}")]
    Settings { reason: String },
}

impl ErrorExt for PrefsError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BadMagic { .. } => StatusCode::BadMagic,
            Self::InvalidSetting { .. } => StatusCode::InvalidArgs,
            Self::Settings { .. } => StatusCode::InvalidData,
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
