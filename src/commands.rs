use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use log::info;
use rand::{rngs::StdRng, SeedableRng};

use crate::{
    cli::{Cli, Commands},
    compare::compare_runs,
    config::DATABASE_FILE_NAME,
    db::{helpers::parse_clock_time, sanitize_run_name, Database},
    generator::generate_rows,
    monitor::{console::format_table, run_console, MonitorController},
    settings::{MonitorSettings, SettingsStore},
    table::BoundedTableView,
};

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("org", "hexar", "hexar")
}

fn default_settings_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.config_dir().join("settings.json"))
        .unwrap_or_else(|| PathBuf::from("hexar-settings.json"))
}

fn default_database_path() -> PathBuf {
    project_dirs()
        .map(|dirs| dirs.data_dir().join(DATABASE_FILE_NAME))
        .unwrap_or_else(|| PathBuf::from(DATABASE_FILE_NAME))
}

/// Resolve the database path: flag, then saved setting, then the data directory.
pub fn database_path(flag: Option<PathBuf>, settings: &MonitorSettings) -> PathBuf {
    flag.or_else(|| settings.database.clone())
        .unwrap_or_else(default_database_path)
}

/// Sanitize `raw` and return the stored spelling of the run it names.
async fn existing_run(db: &Database, raw: &str) -> Result<String> {
    let run = sanitize_run_name(raw)?;
    match db.resolve_run(&run).await? {
        Some(stored) => Ok(stored),
        None => bail!("run {run} does not exist"),
    }
}

pub async fn dispatch(cli: Cli) -> Result<()> {
    let settings = SettingsStore::new(cli.settings.unwrap_or_else(default_settings_path))?;
    let preferences = settings.get();
    let db = Database::new(database_path(cli.db, &preferences))?;

    match cli.command {
        Commands::Monitor { device, run } => {
            let device = device
                .or_else(|| preferences.device.clone())
                .context("no device given; pass --device <path>")?;

            let mut monitor = MonitorController::new(db)
                .with_locale(preferences.locale)
                .with_last_run(preferences.last_run.clone());
            if let Some(raw) = run.as_deref() {
                let run = monitor.start_logging(raw).await?;
                println!("logging into run {run}");
            }
            settings.update(|s| s.device = Some(device.clone()))?;

            let reason = run_console(&mut monitor, &device).await?;
            info!("monitor finished: {reason:?}");

            let last_run = monitor.last_run().map(str::to_string);
            if last_run.is_some() && last_run != preferences.last_run {
                settings.update(|s| s.last_run = last_run)?;
            }
        }
        Commands::Runs => {
            let runs = db.list_runs().await?;
            if runs.is_empty() {
                println!("no runs in {}", db.path().display());
            }
            for run in runs {
                println!(
                    "{:<24} {:>7} rows  {} - {}",
                    run.name,
                    run.rows,
                    run.first_time.as_deref().unwrap_or("--:--:--"),
                    run.last_time.as_deref().unwrap_or("--:--:--"),
                );
            }
        }
        Commands::Show { run, limit } => {
            let run = existing_run(&db, &run).await?;
            let mut view = BoundedTableView::open(db, run, limit).await?;
            view.set_locale(preferences.locale);
            println!("{}", format_table(&view));
        }
        Commands::Comment {
            run,
            row,
            text,
            limit,
        } => {
            let run = existing_run(&db, &run).await?;
            let mut view = BoundedTableView::open(db, run.clone(), limit).await?;
            view.set_comment(row, &text).await?;
            println!("{run} row {row}: {:?}", view.value_at(row, 3)?);
        }
        Commands::Compare { runs, filter } => {
            let mut names = Vec::with_capacity(runs.len());
            for raw in &runs {
                let run = sanitize_run_name(raw)?;
                names.push(db.resolve_run(&run).await?.unwrap_or(run));
            }
            let comparison = compare_runs(&db, &names, filter).await?;
            println!("{}", serde_json::to_string_pretty(&comparison)?);
        }
        Commands::Drop { runs, yes } => {
            let names = runs
                .iter()
                .map(|raw| sanitize_run_name(raw))
                .collect::<Result<Vec<_>, _>>()?;
            if !yes {
                println!("would drop {} run(s): {}; pass --yes to confirm", names.len(), names.join(", "));
                return Ok(());
            }
            let dropped = db.drop_runs(names).await?;
            println!("dropped {dropped} run(s)");
        }
        Commands::Generate {
            run,
            start,
            points,
            base,
            seed,
        } => {
            let run = sanitize_run_name(&run)?;
            let start = parse_clock_time(&start, "--start")?;
            let rng = match seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            db.create_run_table(&run).await?;
            let inserted = db
                .insert_log_rows(&run, generate_rows(start, points, base, rng))
                .await?;
            println!("generated {inserted} readings in run {run}");
        }
    }

    Ok(())
}
