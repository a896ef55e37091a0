use serde::{Deserialize, Serialize};

use crate::{
    field,
    record::{Field, Record},
};

/// Описание носителя (плёнка, слайд, бумага) для коррекции цвета.
///
/// Массивы из четырёх значений хранятся в порядке: серый, красный,
/// зелёный, синий. Тени и света задаются в процентах.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Medium {
    pub name: String,
    pub shadow: [f64; 4],
    pub highlight: [f64; 4],
    pub gamma: [f64; 4],
    /// Негатив: значения инвертируются.
    pub negative: bool,
}

impl Default for Medium {
    fn default() -> Self {
        Self::full_range()
    }
}

impl Medium {
    /// Носитель без коррекции.
    pub fn full_range() -> Self {
        Self {
            name: "full range".to_string(),
            shadow: [0.0; 4],
            highlight: [100.0; 4],
            gamma: [1.0; 4],
            negative: false,
        }
    }

    pub fn standard() -> Vec<Self> {
        vec![
            Self::full_range(),
            Self {
                name: "standard negative".to_string(),
                shadow: [0.0, 0.0, 0.0, 0.0],
                highlight: [60.0, 60.0, 50.0, 40.0],
                gamma: [1.0, 1.0, 1.0, 1.0],
                negative: true,
            },
            Self {
                name: "standard slide".to_string(),
                shadow: [5.0; 4],
                highlight: [95.0; 4],
                gamma: [1.0, 1.0, 1.0, 1.0],
                negative: false,
            },
        ]
    }
}

impl Record for Medium {
    const NAME: &'static str = "medium";
    const FIELDS: &'static [Field<Self>] = &[
        field!(Medium, "medium-name", name),
        field!(Medium, "medium-shadow", shadow),
        field!(Medium, "medium-highlight", highlight),
        field!(Medium, "medium-gamma", gamma),
        field!(Medium, "medium-negative", negative),
    ];
}
