//! Файл настроек: маркер формата, основная запись и три списка вложенных
//! записей (принтеры, области, носители).
//!
//! Кодек работает только через [`Channel`](crate::wire::Channel). Открытие
//! файла и атомарная замена через временный файл живут здесь.

use std::{
    fs::{self, File},
    path::Path,
};

use scanrc_error::{ensure, PrefsError, ResultExt, ScanrcResult, StackError, WireError};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use super::{Medium, Preferences, PresetArea, Printer};
use crate::{
    record::{
        free_record, load_record, save_record, write_repeated, LoadEnd, RepeatedRecordReader,
    },
    wire::{Direction, Wire},
};

/// Первый токен файла настроек.
pub const MAGIC: &str = "scanrc-preferences";

/// Итог загрузки: сколько вложенных записей прочитано и сколько заявлено
/// в полях-счётчиках.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    /// Дошла ли загрузка до поля-разделителя.
    pub reached_sentinel: bool,
    pub printers: usize,
    pub preset_areas: usize,
    pub media: usize,
    pub declared_printers: i32,
    pub declared_preset_areas: i32,
    pub declared_media: i32,
}

impl LoadSummary {
    /// Расходится ли число прочитанных записей с заявленным.
    pub fn mismatched(&self) -> bool {
        self.reached_sentinel
            && (!count_matches(self.printers, self.declared_printers)
                || !count_matches(self.preset_areas, self.declared_preset_areas)
                || !count_matches(self.media, self.declared_media))
    }
}

fn count_matches(
    found: usize,
    declared: i32,
) -> bool {
    usize::try_from(declared).is_ok_and(|d| d == found)
}

fn status_error(
    wire: &Wire<'_>,
    context: &'static str,
) -> Option<StackError> {
    match wire.status() {
        None | Some(WireError::Eof) => None,
        Some(err) => Some(StackError::from(err.clone()).context(context)),
    }
}

fn expect_direction(
    wire: &Wire<'_>,
    operation: &'static str,
    direction: Direction,
) -> ScanrcResult<()> {
    ensure!(
        wire.direction() == direction,
        WireError::WrongDirection {
            operation,
            direction: wire.direction().to_string(),
        }
    );
    Ok(())
}

/// Пишет настройки в поток. Поля-счётчики предварительно выравниваются
/// по спискам.
///
/// Данные остаются в буфере потока: сбрасывает их [`Wire::finish`].
pub fn write_preferences(
    prefs: &mut Preferences,
    wire: &mut Wire<'_>,
) -> ScanrcResult<()> {
    expect_direction(wire, "write_preferences", Direction::Encode)?;
    prefs.sync_counters();

    wire.write_string(MAGIC.as_bytes());
    save_record(prefs, wire);
    write_repeated(&prefs.printers, wire);
    write_repeated(&prefs.preset_areas, wire);
    write_repeated(&prefs.media, wire);

    match wire.status() {
        None => Ok(()),
        Some(err) => Err(StackError::from(err.clone()).context("writing preferences")),
    }
}

/// Читает настройки поверх значений по умолчанию.
pub fn read_preferences(wire: &mut Wire<'_>) -> ScanrcResult<(Preferences, LoadSummary)> {
    let mut prefs = Preferences::default();
    let summary = load_preferences_into(&mut prefs, wire)?;
    Ok((prefs, summary))
}

/// Загружает настройки на место `prefs`.
///
/// Поля, которых нет в потоке, сохраняют текущие значения. Списки
/// вложенных записей заменяются, только если поток дошёл до
/// поля-разделителя. При ошибке уже прочитанное остаётся в `prefs`.
pub fn load_preferences_into(
    prefs: &mut Preferences,
    wire: &mut Wire<'_>,
) -> ScanrcResult<LoadSummary> {
    expect_direction(wire, "load_preferences", Direction::Decode)?;

    let Some(magic) = wire.read_string_bytes() else {
        return Err(match status_error(wire, "reading preferences header") {
            Some(err) => err,
            None => StackError::from(WireError::UnexpectedEof {
                context: "preferences header".to_string(),
                offset: wire.offset(),
            }),
        });
    };
    if magic != MAGIC.as_bytes() {
        return Err(PrefsError::BadMagic {
            expected: MAGIC.to_string(),
            found: String::from_utf8_lossy(&magic).into_owned(),
        }
        .into());
    }

    let end = load_record(prefs, wire);
    let mut summary = LoadSummary {
        reached_sentinel: end == LoadEnd::Sentinel,
        declared_printers: prefs.printer_definitions,
        declared_preset_areas: prefs.presetarea_definitions,
        declared_media: prefs.medium_definitions,
        ..LoadSummary::default()
    };

    if summary.reached_sentinel {
        let mut printers = RepeatedRecordReader::<Printer>::new();
        prefs.printers = printers.read_all(wire);

        let mut areas = RepeatedRecordReader::<PresetArea>::with_lookahead(printers.into_lookahead());
        prefs.preset_areas = areas.read_all(wire);

        let mut media = RepeatedRecordReader::<Medium>::with_lookahead(areas.into_lookahead());
        prefs.media = media.read_all(wire);

        if let Some(name) = media.into_lookahead() {
            debug!("Ignoring trailing data starting at field {:?}", name);
        }

        summary.printers = prefs.printers.len();
        summary.preset_areas = prefs.preset_areas.len();
        summary.media = prefs.media.len();
    }

    if let Some(err) = status_error(wire, "loading preferences") {
        return Err(err);
    }

    if summary.mismatched() {
        warn!(
            "Preferences counters disagree with stored records: printers {}/{}, preset areas {}/{}, media {}/{}",
            summary.printers,
            summary.declared_printers,
            summary.preset_areas,
            summary.declared_preset_areas,
            summary.media,
            summary.declared_media
        );
    }
    Ok(summary)
}

/// Освобождает всё, что выделила загрузка: поля основной записи и три
/// списка вложенных записей. Повторный вызов ничего не делает.
pub fn free_preferences(prefs: &mut Preferences) {
    free_record(prefs);
    for printer in &mut prefs.printers {
        free_record(printer);
    }
    for area in &mut prefs.preset_areas {
        free_record(area);
    }
    for medium in &mut prefs.media {
        free_record(medium);
    }
    prefs.printers = Vec::new();
    prefs.preset_areas = Vec::new();
    prefs.media = Vec::new();
    prefs.sync_counters();
}

/// Обход настроек в направлении потока.
///
/// Для `Decode` возвращает итог загрузки, для остальных направлений `None`.
pub fn transfer_preferences(
    prefs: &mut Preferences,
    wire: &mut Wire<'_>,
) -> ScanrcResult<Option<LoadSummary>> {
    match wire.direction() {
        Direction::Encode => write_preferences(prefs, wire).map(|()| None),
        Direction::Decode => load_preferences_into(prefs, wire).map(Some),
        Direction::Free => {
            free_preferences(prefs);
            Ok(None)
        }
    }
}

/// Атомарно сохраняет настройки в `path`.
///
/// Данные пишутся во временный файл в том же каталоге, который затем
/// переименовывается поверх `path`. При ошибке прежний файл не меняется.
pub fn save_to_path(
    prefs: &mut Preferences,
    path: &Path,
    capacity: usize,
) -> ScanrcResult<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).with_context(|| format!("creating directory {}", dir.display()))?;

    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("creating temporary file in {}", dir.display()))?;
    {
        let mut wire = Wire::with_capacity(tmp.as_file_mut(), Direction::Encode, capacity);
        write_preferences(prefs, &mut wire)?;
        wire.finish().context("flushing preferences")?;
    }
    tmp.as_file()
        .sync_all()
        .context("syncing preferences to disk")?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("replacing {}", path.display()))?;

    info!(
        "Saved preferences to {} ({} printers, {} preset areas, {} media)",
        path.display(),
        prefs.printers.len(),
        prefs.preset_areas.len(),
        prefs.media.len()
    );
    Ok(())
}

/// Загружает настройки из файла.
pub fn load_from_path(
    path: &Path,
    capacity: usize,
) -> ScanrcResult<(Preferences, LoadSummary)> {
    let mut file = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let mut wire = Wire::with_capacity(&mut file, Direction::Decode, capacity);
    let loaded = read_preferences(&mut wire)
        .with_context(|| format!("reading {}", path.display()))?;

    info!(
        "Loaded preferences from {} ({} printers, {} preset areas, {} media)",
        path.display(),
        loaded.1.printers,
        loaded.1.preset_areas,
        loaded.1.media
    );
    Ok(loaded)
}
