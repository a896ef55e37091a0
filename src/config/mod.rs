//! Конфигурация приложения: значения по умолчанию, необязательный
//! TOML-файл и переменные окружения `SCANRC_*`.

pub mod settings;

pub use settings::{default_config_path, default_preferences_path, Settings};
