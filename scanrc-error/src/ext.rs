use std::{any::Any, error::Error};

use crate::StatusCode;

/// Общий интерфейс ошибок scanrc, пригодный для `dyn`.
///
/// Любой тип с этим трейтом можно упаковать в [`StackError`](crate::StackError)
/// через `?` и потом достать обратно через `downcast_ref`.
pub trait ErrorExt: Error + Send + Sync + 'static {
    fn status_code(&self) -> StatusCode {
        StatusCode::Internal
    }

    fn as_any(&self) -> &dyn Any;

    /// Текст для вывода в терминал. Внутренние сбои не раскрываются.
    fn user_message(&self) -> String {
        if self.status_code() == StatusCode::Internal {
            "internal error, see the log for details".to_string()
        } else {
            self.to_string()
        }
    }
}
