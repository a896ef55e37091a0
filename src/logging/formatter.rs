use std::io::{self, Stderr};

use tracing_subscriber::{fmt, layer::Layer as LayerTrait, registry::LookupSpan};

use crate::logging::config::{LogFormat, LoggingConfig};

/// Консольный layer в нужном формате.
///
/// Возвращаем boxed trait-объект, чтобы стереть конкретный тип формата.
/// Логи идут в stderr: stdout занят выводом команд.
pub fn build_formatter_from_config<S>(
    config: &LoggingConfig,
    format: LogFormat,
) -> Box<dyn LayerTrait<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
{
    let writer: fn() -> Stderr = io::stderr;
    let console = &config.console;

    match format {
        LogFormat::Json => Box::new(
            fmt::layer()
                .event_format(fmt::format().json().with_current_span(true))
                .with_writer(writer)
                .with_ansi(false)
                .with_target(console.with_target)
                .with_line_number(console.with_line_numbers),
        ),
        LogFormat::Pretty => Box::new(
            fmt::layer()
                .event_format(fmt::format().pretty())
                .with_writer(writer)
                .with_ansi(console.with_ansi)
                .with_target(console.with_target)
                .with_line_number(console.with_line_numbers),
        ),
        LogFormat::Compact => Box::new(
            fmt::layer()
                .event_format(fmt::format().compact())
                .with_writer(writer)
                .with_ansi(console.with_ansi)
                .with_target(console.with_target)
                .with_line_number(console.with_line_numbers),
        ),
    }
}
