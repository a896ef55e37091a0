use tracing_appender::{
    non_blocking,
    non_blocking::WorkerGuard,
    rolling::{self, RollingFileAppender},
};
use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::config::{LoggingConfig, Rotation};

fn appender(config: &LoggingConfig) -> RollingFileAppender {
    let file = &config.file;
    match file.rotation {
        Rotation::Hourly => rolling::hourly(&file.dir, &file.prefix),
        Rotation::Daily => rolling::daily(&file.dir, &file.prefix),
        Rotation::Never => rolling::never(&file.dir, &file.prefix),
    }
}

/// Файловый layer с неблокирующей записью.
///
/// Guard должен жить, пока нужны логи: при его drop буфер сбрасывается.
pub fn layer_with_config<S>(
    config: &LoggingConfig
) -> (Box<dyn LayerTrait<S> + Send + Sync>, WorkerGuard)
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let (writer, guard) = non_blocking(appender(config));
    let layer = fmt::layer()
        .with_ansi(false)
        .with_target(true)
        .with_writer(writer);
    (Box::new(layer), guard)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tracing_subscriber::{prelude::*, registry::Registry};

    use super::*;

    #[test]
    fn test_file_layer_writes_after_guard_drop() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = LoggingConfig::default();
        config.file.enabled = true;
        config.file.dir = tmp.path().to_path_buf();
        config.file.rotation = Rotation::Never;

        let (layer, guard) = layer_with_config::<Registry>(&config);
        let subscriber = Registry::default().with(layer);
        tracing::subscriber::with_default(subscriber, || {
            tracing::warn!("written to the log file");
        });
        drop(guard);

        let text = fs::read_to_string(tmp.path().join("scanrc.log")).unwrap();
        assert!(text.contains("written to the log file"));
    }
}
