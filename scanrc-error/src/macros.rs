use crate::StackError;

/// Возвращает `Err(StackError)` из текущей функции.
///
/// `bail!(err)` принимает любой тип с [`ErrorExt`](crate::ErrorExt),
/// `bail!(code, "fmt", args..)` собирает [`GenericError`](crate::GenericError).
#[macro_export]
macro_rules! bail {
    ($err:expr $(,)?) => {
        return ::std::result::Result::Err($crate::StackError::from($err))
    };
    ($code:expr, $($fmt:tt)+) => {
        return ::std::result::Result::Err($crate::StackError::new(
            $crate::GenericError::new($code, ::std::format!($($fmt)+)),
        ))
    };
}

/// `bail!`, если условие ложно. Аргументы после условия те же, что у `bail!`.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $($rest:tt)+) => {
        if !($cond) {
            $crate::bail!($($rest)+);
        }
    };
}

/// `.context(..)` для любого `Result`, ошибку которого можно превратить в
/// [`StackError`].
pub trait ResultExt<T> {
    fn context(
        self,
        note: impl Into<String>,
    ) -> Result<T, StackError>;

    /// Пояснение строится только при ошибке.
    fn with_context<S, F>(
        self,
        note: F,
    ) -> Result<T, StackError>
    where
        S: Into<String>,
        F: FnOnce() -> S;
}

impl<T, E: Into<StackError>> ResultExt<T> for Result<T, E> {
    #[track_caller]
    fn context(
        self,
        note: impl Into<String>,
    ) -> Result<T, StackError> {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().context(note)),
        }
    }

    #[track_caller]
    fn with_context<S, F>(
        self,
        note: F,
    ) -> Result<T, StackError>
    where
        S: Into<String>,
        F: FnOnce() -> S,
    {
        match self {
            Ok(v) => Ok(v),
            Err(e) => Err(e.into().context(note())),
        }
    }
}
