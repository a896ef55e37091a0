use scanrc_error::WireError;
use serde::{Deserialize, Serialize};

use super::{Medium, PresetArea, Printer};
use crate::{
    field,
    record::{Field, Record},
    wire::{Wire, WireCodec},
};

/// Положение и размер окна предпросмотра.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// Четыре слова подряд: x, y, ширина, высота.
impl WireCodec for Geometry {
    fn encode(
        &self,
        wire: &mut Wire<'_>,
    ) {
        for word in [self.x, self.y, self.width, self.height] {
            word.encode(wire);
        }
    }

    fn decode(
        &mut self,
        wire: &mut Wire<'_>,
    ) {
        let mut words = [0i32; 4];
        for word in words.iter_mut() {
            word.decode(wire);
            if !wire.is_ok() {
                if wire.at_end_of_stream() {
                    wire.truncated("geometry");
                }
                return;
            }
        }
        let [x, y, width, height] = words;
        if width < 0 || height < 0 {
            let offset = wire.offset();
            wire.fail(WireError::malformed(
                "geometry",
                format!("negative size {width}x{height}"),
                offset,
            ));
            return;
        }
        *self = Geometry {
            x,
            y,
            width,
            height,
        };
    }
}

/// Настройки приложения: основная запись и три списка вложенных записей.
///
/// Поля-счётчики хранят число экземпляров соответствующего списка и
/// выравниваются по спискам перед сохранением. Список принтеров
/// считается полем-разделителем `printerdefinitions`, после которого
/// идут вложенные записи.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    /// Версия программы, сохранившей файл.
    pub version: String,
    pub show_tooltips: bool,
    pub show_histogram_log: bool,
    pub preview_oversampling: f64,
    pub preview_gamma: f64,
    pub preview_gamma_rgb: [f64; 3],
    pub auto_enhance_gamma: bool,
    pub lineart_threshold: f64,
    pub jpeg_quality: i32,
    pub png_compression: i32,
    pub tiff_compression: i32,
    pub filename_counter_step: i32,
    pub filename_counter_len: i32,
    pub working_directory: String,
    pub filename_template: String,
    pub browser: String,
    /// Сохранённая геометрия окна предпросмотра; `None`, если окно ещё не
    /// открывалось.
    pub preview_window: Option<Box<Geometry>>,
    /// Индекс выбранного принтера.
    pub printer_index: i32,
    pub presetarea_definitions: i32,
    pub medium_definitions: i32,
    pub printer_definitions: i32,

    #[serde(default)]
    pub printers: Vec<Printer>,
    #[serde(default)]
    pub preset_areas: Vec<PresetArea>,
    #[serde(default)]
    pub media: Vec<Medium>,
}

impl Default for Preferences {
    fn default() -> Self {
        let mut prefs = Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            show_tooltips: true,
            show_histogram_log: true,
            preview_oversampling: 1.0,
            preview_gamma: 1.0,
            preview_gamma_rgb: [1.0; 3],
            auto_enhance_gamma: true,
            lineart_threshold: 50.0,
            jpeg_quality: 90,
            png_compression: 6,
            tiff_compression: 1,
            filename_counter_step: 1,
            filename_counter_len: 3,
            working_directory: String::new(),
            filename_template: "out-###.pnm".to_string(),
            browser: "xdg-open".to_string(),
            preview_window: None,
            printer_index: 0,
            presetarea_definitions: 0,
            medium_definitions: 0,
            printer_definitions: 0,
            printers: vec![Printer::lpr()],
            preset_areas: PresetArea::standard(),
            media: Medium::standard(),
        };
        prefs.sync_counters();
        prefs
    }
}

impl Preferences {
    /// Выравнивает поля-счётчики по длинам списков.
    pub fn sync_counters(&mut self) {
        self.printer_definitions = self.printers.len() as i32;
        self.presetarea_definitions = self.preset_areas.len() as i32;
        self.medium_definitions = self.media.len() as i32;
    }

    /// Выбранный принтер, если индекс в пределах списка.
    pub fn selected_printer(&self) -> Option<&Printer> {
        usize::try_from(self.printer_index)
            .ok()
            .and_then(|i| self.printers.get(i))
    }
}

impl Record for Preferences {
    const NAME: &'static str = "preferences";
    const FIELDS: &'static [Field<Self>] = &[
        field!(Preferences, "version", version),
        field!(Preferences, "show-tooltips", show_tooltips),
        field!(Preferences, "show-histogram-log", show_histogram_log),
        field!(Preferences, "preview-oversampling", preview_oversampling),
        field!(Preferences, "preview-gamma", preview_gamma),
        field!(Preferences, "preview-gamma-rgb", preview_gamma_rgb),
        field!(Preferences, "auto-enhance-gamma", auto_enhance_gamma),
        field!(Preferences, "lineart-threshold", lineart_threshold),
        field!(Preferences, "jpeg-quality", jpeg_quality),
        field!(Preferences, "png-compression", png_compression),
        field!(Preferences, "tiff-compression", tiff_compression),
        field!(Preferences, "filename-counter-step", filename_counter_step),
        field!(Preferences, "filename-counter-len", filename_counter_len),
        field!(Preferences, "working-directory", working_directory),
        field!(Preferences, "filename-template", filename_template),
        field!(Preferences, "browser", browser),
        field!(Preferences, "preview-window-geometry", preview_window),
        field!(Preferences, "printernr", printer_index),
        field!(Preferences, "presetarea-definitions", presetarea_definitions),
        field!(Preferences, "medium-definitions", medium_definitions),
        field!(Preferences, "printerdefinitions", printer_definitions),
    ];
    const SENTINEL: Option<&'static str> = Some("printerdefinitions");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wire::Direction;

    #[test]
    fn test_defaults() {
        let prefs = Preferences::default();
        assert_eq!(prefs.printers.len(), 1);
        assert_eq!(prefs.printer_definitions, 1);
        assert_eq!(prefs.presetarea_definitions, prefs.preset_areas.len() as i32);
        assert_eq!(prefs.medium_definitions, prefs.media.len() as i32);
        assert_eq!(prefs.selected_printer().map(|p| p.name.as_str()), Some("lpr"));
        assert_eq!(prefs.media[0], Medium::full_range());
    }

    #[test]
    fn test_sentinel_is_last_field() {
        assert_eq!(
            Preferences::FIELDS.last().map(|f| f.name),
            Preferences::SENTINEL
        );
    }

    #[test]
    fn test_field_names_are_unique() {
        fn check<R: Record>() {
            let mut names: Vec<&str> = R::FIELDS.iter().map(|f| f.name).collect();
            names.sort_unstable();
            let before = names.len();
            names.dedup();
            assert_eq!(names.len(), before, "duplicate field in {}", R::NAME);
        }
        check::<Preferences>();
        check::<Printer>();
        check::<PresetArea>();
        check::<Medium>();
    }

    #[test]
    fn test_geometry_codec() {
        let geometry = Some(Box::new(Geometry {
            x: -10,
            y: 20,
            width: 640,
            height: 480,
        }));
        let mut out = Vec::new();
        let mut wire = Wire::new(&mut out, Direction::Encode);
        geometry.encode(&mut wire);
        wire.finish().unwrap();
        assert_eq!(out, b"0\n-10\n20\n640\n480\n");

        let mut input: &[u8] = &out;
        let mut wire = Wire::new(&mut input, Direction::Decode);
        let mut back: Option<Box<Geometry>> = None;
        back.decode(&mut wire);
        assert_eq!(back, geometry);
    }

    #[test]
    fn test_geometry_rejects_negative_size() {
        let mut input: &[u8] = b"0\n0\n-1\n5\n";
        let mut wire = Wire::new(&mut input, Direction::Decode);
        let mut geometry = Geometry::default();
        geometry.decode(&mut wire);
        assert!(matches!(
            wire.reset_status(),
            Some(WireError::Malformed { .. })
        ));
        assert_eq!(geometry, Geometry::default());
    }

    #[test]
    fn test_selected_printer_out_of_range() {
        let prefs = Preferences {
            printer_index: 5,
            ..Preferences::default()
        };
        assert!(prefs.selected_printer().is_none());
    }
}
