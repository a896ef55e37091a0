use tracing_appender::non_blocking::WorkerGuard;

/// Handle для управления жизненным циклом логирования.
///
/// Держит guard файлового вывода: пока handle жив, фоновый поток пишет
/// логи в файл; при drop или [`LoggingHandle::shutdown`] остаток буфера
/// сбрасывается на диск.
#[derive(Default)]
pub struct LoggingHandle {
    file_guard: Option<WorkerGuard>,
}

impl LoggingHandle {
    pub fn new(file_guard: Option<WorkerGuard>) -> Self {
        Self { file_guard }
    }

    pub fn has_file_sink(&self) -> bool {
        self.file_guard.is_some()
    }

    /// Сбрасывает файловый вывод и завершает логирование.
    pub fn shutdown(mut self) {
        if let Some(guard) = self.file_guard.take() {
            tracing::debug!("Flushing file logs");
            drop(guard);
        }
    }
}

impl std::fmt::Debug for LoggingHandle {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("LoggingHandle")
            .field("file_sink", &self.has_file_sink())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_without_file_sink() {
        let handle = LoggingHandle::default();
        assert!(!handle.has_file_sink());
        assert_eq!(format!("{handle:?}"), "LoggingHandle { file_sink: false }");
        handle.shutdown();
    }
}
