use std::{error::Error, fmt, panic::Location};

use crate::{ErrorExt, StatusCode};

/// Ошибка с цепочкой пояснений.
///
/// Корневая причина хранится как `dyn ErrorExt`, а каждый уровень, через
/// который прошла ошибка, может приписать свою [`Frame`]. В `Display`
/// пояснения идут от внешнего к внутреннему:
/// `loading /home/u/.scanrc/preferences: reading field "printer-name": ...`.
pub struct StackError {
    root: Box<dyn ErrorExt>,
    frames: Vec<Frame>,
}

/// Одно пояснение и место в коде, где его добавили.
#[derive(Debug, Clone)]
pub struct Frame {
    note: String,
    location: &'static Location<'static>,
}

impl Frame {
    pub fn note(&self) -> &str {
        &self.note
    }

    pub fn location(&self) -> &'static Location<'static> {
        self.location
    }
}

impl StackError {
    pub fn new<E: ErrorExt>(err: E) -> Self {
        Self {
            root: Box::new(err),
            frames: Vec::new(),
        }
    }

    /// Приписывает пояснение. Место вызова запоминается автоматически.
    #[track_caller]
    pub fn context(
        mut self,
        note: impl Into<String>,
    ) -> Self {
        self.frames.push(Frame {
            note: note.into(),
            location: Location::caller(),
        });
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.root.status_code()
    }

    pub fn user_message(&self) -> String {
        self.root.user_message()
    }

    pub fn root(&self) -> &dyn ErrorExt {
        self.root.as_ref()
    }

    /// Пояснения в порядке добавления, от самого внутреннего.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn downcast_ref<T: ErrorExt>(&self) -> Option<&T> {
        self.root.as_any().downcast_ref::<T>()
    }
}

impl fmt::Display for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        for frame in self.frames.iter().rev() {
            write!(f, "{}: ", frame.note)?;
        }
        write!(f, "{}", self.root)
    }
}

impl fmt::Debug for StackError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        writeln!(f, "{} [{}]", self.root, self.status_code())?;
        for frame in self.frames.iter().rev() {
            writeln!(
                f,
                "  at {}:{}: {}",
                frame.location.file(),
                frame.location.line(),
                frame.note
            )?;
        }
        Ok(())
    }
}

// Текст корня уже есть в Display, поэтому наружу отдаётся только его
// собственная причина. Иначе anyhow напечатает корень дважды.
impl Error for StackError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.root.source()
    }
}

impl<E: ErrorExt> From<E> for StackError {
    fn from(e: E) -> Self {
        StackError::new(e)
    }
}
