use std::{fs, io, path::PathBuf};

use scanrc_error::{PrefsError, ScanrcResult};
use serde::{Deserialize, Serialize};

/// Формат вывода в консоль.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    #[default]
    Compact,
    Json,
}

/// Период ротации файла логов.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rotation {
    Hourly,
    #[default]
    Daily,
    Never,
}

/// Настройки консольного вывода.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsoleConfig {
    pub enabled: bool,
    pub format: LogFormat,
    pub with_ansi: bool,
    pub with_target: bool,
    pub with_line_numbers: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            format: LogFormat::Compact,
            with_ansi: true,
            with_target: false,
            with_line_numbers: false,
        }
    }
}

/// Настройки файлового вывода.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub enabled: bool,
    pub dir: PathBuf,
    pub prefix: String,
    pub rotation: Rotation,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            dir: PathBuf::from("logs"),
            prefix: "scanrc.log".to_string(),
            rotation: Rotation::Daily,
        }
    }
}

/// Конфигурация логирования.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Уровень для модулей `scanrc` (`error`, `warn`, `info`, `debug`,
    /// `trace`).
    pub level: String,
    pub console: ConsoleConfig,
    pub file: FileConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            console: ConsoleConfig::default(),
            file: FileConfig::default(),
        }
    }
}

const LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

impl LoggingConfig {
    /// Директива для `EnvFilter`: сторонние крейты пишут только ошибки.
    pub fn build_filter_directive(&self) -> String {
        format!("error,scanrc={}", self.level.to_ascii_lowercase())
    }

    pub fn validate(&self) -> ScanrcResult<()> {
        if !LEVELS.contains(&self.level.to_ascii_lowercase().as_str()) {
            return Err(PrefsError::InvalidSetting {
                key: "logging.level".to_string(),
                reason: format!("unknown level {:?}", self.level),
            }
            .into());
        }
        if self.file.enabled && self.file.prefix.is_empty() {
            return Err(PrefsError::InvalidSetting {
                key: "logging.file.prefix".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Создаёт каталог логов, если файловый вывод включён.
    pub fn ensure_log_dir(&self) -> io::Result<()> {
        if self.file.enabled {
            fs::create_dir_all(&self.file.dir)?;
        }
        Ok(())
    }
}
