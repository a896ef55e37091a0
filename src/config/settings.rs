use std::{
    env,
    path::{Path, PathBuf},
};

use config::{Config, ConfigError, Environment, File, FileFormat};
use scanrc_error::{PrefsError, ScanrcResult, StackError};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{
    logging::LoggingConfig,
    wire::{DEFAULT_CAPACITY, MIN_CAPACITY},
};

/// Настройки приложения.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Файл настроек сканера.
    pub preferences_path: PathBuf,
    /// Размер буфера wire-потока.
    pub buffer_capacity: usize,
    #[serde(default)]
    pub logging: LoggingConfig,
}

fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// `~/.scanrc/preferences`.
pub fn default_preferences_path() -> PathBuf {
    home_dir().join(".scanrc").join("preferences")
}

/// `$XDG_CONFIG_HOME/scanrc/config.toml` или `~/.config/scanrc/config.toml`.
pub fn default_config_path() -> PathBuf {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| home_dir().join(".config"))
        .join("scanrc")
        .join("config.toml")
}

fn settings_error(err: ConfigError) -> StackError {
    PrefsError::Settings {
        reason: err.to_string(),
    }
    .into()
}

impl Settings {
    /// Загружает настройки; файл по умолчанию не обязателен.
    pub fn load() -> ScanrcResult<Self> {
        Self::build(&default_config_path(), false)
    }

    /// Загружает настройки из явно указанного файла.
    pub fn load_from(path: &Path) -> ScanrcResult<Self> {
        Self::build(path, true)
    }

    fn build(
        path: &Path,
        required: bool,
    ) -> ScanrcResult<Self> {
        let cfg = Config::builder()
            // Значения по умолчанию
            .set_default(
                "preferences_path",
                default_preferences_path().to_string_lossy().into_owned(),
            )
            .and_then(|b| b.set_default("buffer_capacity", DEFAULT_CAPACITY as i64))
            .map_err(settings_error)?
            .add_source(
                File::from(path)
                    .format(FileFormat::Toml)
                    .required(required),
            )
            // Переменные окружения: SCANRC_BUFFER_CAPACITY, SCANRC_LOGGING__LEVEL
            .add_source(
                Environment::with_prefix("SCANRC")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(settings_error)?;

        let mut settings: Settings = cfg.try_deserialize().map_err(settings_error)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Проверяет значения. Слишком маленький буфер увеличивается до
    /// минимально допустимого.
    pub fn validate(&mut self) -> ScanrcResult<()> {
        if self.buffer_capacity < MIN_CAPACITY {
            warn!(
                "buffer_capacity {} is below the minimum, using {}",
                self.buffer_capacity, MIN_CAPACITY
            );
            self.buffer_capacity = MIN_CAPACITY;
        }
        if self.preferences_path.as_os_str().is_empty() {
            return Err(PrefsError::InvalidSetting {
                key: "preferences_path".to_string(),
                reason: "must not be empty".to_string(),
            }
            .into());
        }
        self.logging.validate()
    }
}
