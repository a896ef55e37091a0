//! Настройки сканера и их файл.

pub mod file;
pub mod medium;
pub mod preferences;
pub mod preset_area;
pub mod printer;

pub use file::{
    free_preferences, load_from_path, load_preferences_into, read_preferences, save_to_path,
    transfer_preferences, write_preferences, LoadSummary, MAGIC,
};
pub use medium::Medium;
pub use preferences::{Geometry, Preferences};
pub use preset_area::PresetArea;
pub use printer::Printer;
