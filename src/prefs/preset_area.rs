use serde::{Deserialize, Serialize};

use crate::{
    field,
    record::{Field, Record},
};

/// Именованная область сканирования (мм от левого верхнего угла).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PresetArea {
    pub name: String,
    pub width: f64,
    pub height: f64,
    pub left: f64,
    pub top: f64,
}

impl PresetArea {
    pub fn new(
        name: &str,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            name: name.to_string(),
            width,
            height,
            left: 0.0,
            top: 0.0,
        }
    }

    /// Стандартный набор областей. Нулевой размер означает всю поверхность
    /// сканера. Размеры округлены до 1/8 мм, чтобы точно переживать
    /// фиксированную точку 16.16.
    pub fn standard() -> Vec<Self> {
        vec![
            Self::new("full size", 0.0, 0.0),
            Self::new("DIN A3", 297.0, 420.0),
            Self::new("DIN A4", 210.0, 297.0),
            Self::new("DIN A5", 148.0, 210.0),
            Self::new("13cm x 18cm", 129.0, 179.0),
            Self::new("10cm x 15cm", 99.0, 149.0),
            Self::new("9cm x 13cm", 89.0, 129.0),
            Self::new("legal", 215.875, 355.625),
            Self::new("letter", 215.875, 279.375),
        ]
    }
}

impl Record for PresetArea {
    const NAME: &'static str = "preset area";
    const FIELDS: &'static [Field<Self>] = &[
        field!(PresetArea, "preset-area-name", name),
        field!(PresetArea, "preset-area-width", width),
        field!(PresetArea, "preset-area-height", height),
        field!(PresetArea, "preset-area-left", left),
        field!(PresetArea, "preset-area-top", top),
    ];
}
