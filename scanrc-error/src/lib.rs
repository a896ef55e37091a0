//! Ошибки scanrc: коды статуса, типизированные ошибки wire-потока и файла
//! настроек, а также [`StackError`] с цепочкой пояснений.

pub mod ext;
pub mod macros;
pub mod stack;
pub mod status_code;
pub mod types;

pub use ext::ErrorExt;
pub use macros::ResultExt;
pub use stack::{Frame, StackError};
pub use status_code::{Category, StatusCode};
pub use types::{io_status_code, GenericError, PrefsError, WireError};

pub type ScanrcResult<T> = Result<T, StackError>;
