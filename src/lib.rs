/// Application settings loading (defaults, TOML file, environment).
pub mod config;
/// Flexible logging (formatting, filters, sinks).
pub mod logging;
/// Scanner preferences: records, defaults and the preferences file.
pub mod prefs;
/// Declarative field tables, the table interpreter and repeated sub-records.
pub mod record;
/// Buffered directional text stream and value codecs.
pub mod wire;

// -----------------------------------------------------------------------------
//  Frequently used public types
// -----------------------------------------------------------------------------

/// Settings.
pub use config::Settings;
/// Logging initialization.
pub use logging::{init_logging, LoggingConfig, LoggingHandle};
/// Preference records and file operations.
pub use prefs::{
    free_preferences, load_from_path, load_preferences_into, read_preferences, save_to_path,
    transfer_preferences, write_preferences, Geometry, LoadSummary, Medium, Preferences,
    PresetArea, Printer,
};
/// Field tables.
pub use record::{Field, LoadEnd, Record, RepeatedRecordReader};
/// Error types.
pub use scanrc_error::{ScanrcResult, StackError, StatusCode, WireError};
/// Wire stream and codecs.
pub use wire::{Channel, Direction, Wire, WireCodec};
