use serde::{Deserialize, Serialize};

use crate::{
    field,
    record::{Field, Record},
};

/// Профиль принтера для печати скана.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Printer {
    pub name: String,
    /// Команда печати, получающая PostScript на stdin.
    pub command: String,
    /// Опция команды, задающая число копий (`-#` для lpr).
    pub copy_number_option: String,
    /// Разрешение печати (dpi).
    pub resolution: i32,
    /// Размер печатной области (мм).
    pub width: f64,
    pub height: f64,
    /// Отступы печатной области (мм).
    pub left_offset: f64,
    pub bottom_offset: f64,
    pub gamma: f64,
    pub gamma_rgb: [f64; 3],
    /// Печатать в оттенках серого.
    pub grayscale: bool,
}

impl Default for Printer {
    fn default() -> Self {
        Self {
            name: "new printer".to_string(),
            command: "lpr".to_string(),
            copy_number_option: "-#".to_string(),
            resolution: 300,
            width: 203.25,
            height: 266.75,
            left_offset: 3.5,
            bottom_offset: 8.0,
            gamma: 1.0,
            gamma_rgb: [1.0; 3],
            grayscale: false,
        }
    }
}

impl Printer {
    /// Профиль по умолчанию: печать через `lpr`.
    pub fn lpr() -> Self {
        Self {
            name: "lpr".to_string(),
            ..Self::default()
        }
    }
}

impl Record for Printer {
    const NAME: &'static str = "printer";
    const FIELDS: &'static [Field<Self>] = &[
        field!(Printer, "printer-name", name),
        field!(Printer, "printer-command", command),
        field!(Printer, "printer-copy-number-option", copy_number_option),
        field!(Printer, "printer-resolution", resolution),
        field!(Printer, "printer-width", width),
        field!(Printer, "printer-height", height),
        field!(Printer, "printer-left-offset", left_offset),
        field!(Printer, "printer-bottom-offset", bottom_offset),
        field!(Printer, "printer-gamma", gamma),
        field!(Printer, "printer-gamma-rgb", gamma_rgb),
        field!(Printer, "printer-grayscale", grayscale),
    ];
}
