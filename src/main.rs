//! CLI `scanrc`
//!
//! Просмотр, проверка и пересохранение файла настроек сканера.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scanrc::{
    init_logging, load_from_path, save_to_path, LoadSummary, Preferences, Settings, StackError,
};
use tracing::debug;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("GIT_COMMIT"),
    ", built ",
    env!("BUILD_TIME"),
    ")"
);

#[derive(Parser)]
#[command(name = "scanrc")]
#[command(version = env!("CARGO_PKG_VERSION"), long_version = LONG_VERSION)]
#[command(about = "Inspect and maintain scanner front-end preferences", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Файл конфигурации (TOML)
    #[arg(short, long, env = "SCANRC_CONFIG", global = true)]
    config: Option<PathBuf>,
    /// Файл настроек сканера вместо указанного в конфигурации
    #[arg(short, long, global = true)]
    prefs: Option<PathBuf>,
    /// Подробнее логировать (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Логировать только ошибки
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Показать содержимое файла настроек
    Show {
        /// Вывести в JSON
        #[arg(long)]
        json: bool,
    },
    /// Проверить файл и сверить счётчики вложенных записей
    Check,
    /// Создать файл с настройками по умолчанию
    Init {
        /// Перезаписать существующий файл
        #[arg(long)]
        force: bool,
    },
    /// Прочитать и сохранить файл заново (выравнивает счётчики)
    Rewrite,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            let code = e
                .downcast_ref::<StackError>()
                .map(|s| s.status_code().exit_code())
                .unwrap_or(1);
            ExitCode::from(u8::try_from(code).unwrap_or(1))
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let mut settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };
    if let Some(path) = &cli.prefs {
        settings.preferences_path = path.clone();
    }
    settings.logging.level = match (cli.quiet, cli.verbose) {
        (true, _) => "error".to_string(),
        (false, 0) => settings.logging.level.clone(),
        (false, 1) => "info".to_string(),
        (false, 2) => "debug".to_string(),
        (false, _) => "trace".to_string(),
    };

    let logging = init_logging(&settings.logging)?;
    debug!("Settings: {settings:?}");

    let result = match cli.command {
        Commands::Show { json } => show(&settings, json),
        Commands::Check => check(&settings),
        Commands::Init { force } => init(&settings, force),
        Commands::Rewrite => rewrite(&settings),
    };
    logging.shutdown();
    result
}

fn load(settings: &Settings) -> Result<(Preferences, LoadSummary)> {
    let loaded = load_from_path(&settings.preferences_path, settings.buffer_capacity)?;
    Ok(loaded)
}

fn show(
    settings: &Settings,
    json: bool,
) -> Result<()> {
    let (prefs, _) = load(settings)?;
    if json {
        let text = serde_json::to_string_pretty(&prefs).context("serializing preferences")?;
        println!("{text}");
        return Ok(());
    }

    println!("# {}", settings.preferences_path.display());
    println!("version            {}", prefs.version);
    println!("working directory  {}", prefs.working_directory);
    println!("filename template  {}", prefs.filename_template);
    println!(
        "preview gamma      {:.3} (r {:.3}, g {:.3}, b {:.3})",
        prefs.preview_gamma,
        prefs.preview_gamma_rgb[0],
        prefs.preview_gamma_rgb[1],
        prefs.preview_gamma_rgb[2]
    );
    println!("jpeg quality       {}", prefs.jpeg_quality);
    if let Some(g) = &prefs.preview_window {
        println!("preview window     {}x{}+{}+{}", g.width, g.height, g.x, g.y);
    }

    println!("\nprinters ({}):", prefs.printers.len());
    for (i, p) in prefs.printers.iter().enumerate() {
        let mark = if i as i32 == prefs.printer_index { '*' } else { ' ' };
        println!(" {mark} {:<20} {} @ {} dpi", p.name, p.command, p.resolution);
    }
    println!("\npreset areas ({}):", prefs.preset_areas.len());
    for a in &prefs.preset_areas {
        println!("   {:<20} {:.1} x {:.1} mm", a.name, a.width, a.height);
    }
    println!("\nmedia ({}):", prefs.media.len());
    for m in &prefs.media {
        let kind = if m.negative { "negative" } else { "positive" };
        println!("   {:<20} {kind}", m.name);
    }
    Ok(())
}

fn check(settings: &Settings) -> Result<()> {
    let (_, summary) = load(settings)?;
    println!(
        "{}: ok ({} printers, {} preset areas, {} media)",
        settings.preferences_path.display(),
        summary.printers,
        summary.preset_areas,
        summary.media
    );
    if !summary.reached_sentinel {
        println!("note: file has no sub-record section, defaults are used");
    }
    if summary.mismatched() {
        println!(
            "warning: stored counters differ (printers {}, preset areas {}, media {}); run `scanrc rewrite` to fix",
            summary.declared_printers, summary.declared_preset_areas, summary.declared_media
        );
    }
    Ok(())
}

fn init(
    settings: &Settings,
    force: bool,
) -> Result<()> {
    let path = &settings.preferences_path;
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let mut prefs = Preferences::default();
    save_to_path(&mut prefs, path, settings.buffer_capacity)?;
    println!("created {}", path.display());
    Ok(())
}

fn rewrite(settings: &Settings) -> Result<()> {
    let (mut prefs, summary) = load(settings)?;
    save_to_path(
        &mut prefs,
        &settings.preferences_path,
        settings.buffer_capacity,
    )?;
    println!(
        "rewrote {}{}",
        settings.preferences_path.display(),
        if summary.mismatched() {
            " (counters fixed)"
        } else {
            ""
        }
    );
    Ok(())
}
