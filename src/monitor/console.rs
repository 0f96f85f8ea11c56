use std::path::Path;

use anyhow::{Context, Result};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
};
use tokio_util::sync::CancellationToken;

use crate::{
    config::LINK_TIMEOUT,
    ingest::{
        link::{open_device, LinkClosed},
        read_link, LinkEvent,
    },
    table::{view::display_float, BoundedTableView},
};

use super::controller::{MonitorController, SampleStatus};

// Set to false to silence console logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info};

/// Operator commands typed while the monitor is running.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Start logging into the named run (or the last one), or stop when already logging.
    Log(Option<String>),
    Zoom,
    Table,
    Comment { row: usize, text: String },
    Frame,
    Status,
    Help,
    Quit,
}

pub fn parse_command(line: &str) -> Result<ConsoleCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "log" => Ok(ConsoleCommand::Log(
            (!rest.is_empty()).then(|| rest.to_string()),
        )),
        "zoom" => Ok(ConsoleCommand::Zoom),
        "table" => Ok(ConsoleCommand::Table),
        "comment" => {
            let (row, text) = rest
                .split_once(char::is_whitespace)
                .unwrap_or((rest, ""));
            let row = row
                .parse()
                .map_err(|_| format!("expected a row number, got {row:?}"))?;
            Ok(ConsoleCommand::Comment {
                row,
                text: text.trim().to_string(),
            })
        }
        "frame" => Ok(ConsoleCommand::Frame),
        "status" => Ok(ConsoleCommand::Status),
        "help" | "?" => Ok(ConsoleCommand::Help),
        "quit" | "exit" | "q" => Ok(ConsoleCommand::Quit),
        "" => Err("empty command".to_string()),
        other => Err(format!("unknown command {other:?}, type 'help'")),
    }
}

const HELP: &str = "commands: log [run] | zoom | table | comment <row> <text> | frame | status | quit";

pub fn format_status(status: &SampleStatus, run: Option<&str>) -> String {
    let mut line = format!(
        "{}  reactor {}°C  vapor {}°C",
        status.sample.timestamp.format("%H:%M:%S"),
        display_float(status.sample.reactor),
        display_float(status.sample.vapor),
    );
    if let Some(run) = run {
        line.push_str(&format!("  [logging {run}]"));
    }
    if status.alerts.reactor_alert {
        line.push_str("  ALERT reactor");
    }
    if status.alerts.vapor_alert {
        line.push_str("  ALERT vapor");
    }
    if let Some(err) = &status.storage_error {
        line.push_str(&format!("  (not saved: {err})"));
    }
    line
}

/// Plain-text grid of a bounded view, one line per cached row.
pub fn format_table(view: &BoundedTableView) -> String {
    let columns = view.column_count();
    let mut cells: Vec<Vec<String>> = Vec::with_capacity(view.row_count() + 1);

    let mut header = vec!["#".to_string()];
    header.extend((0..columns).filter_map(|c| view.header(c).ok().map(str::to_string)));
    cells.push(header);
    for row in 0..view.row_count() {
        let mut line = vec![row.to_string()];
        line.extend((0..columns).filter_map(|c| view.value_at(row, c).ok()));
        cells.push(line);
    }

    let widths: Vec<usize> = (0..=columns)
        .map(|c| {
            cells
                .iter()
                .filter_map(|line| line.get(c))
                .map(|cell| cell.chars().count())
                .max()
                .unwrap_or(0)
        })
        .collect();

    cells
        .iter()
        .map(|line| {
            line.iter()
                .zip(&widths)
                .map(|(cell, width)| {
                    let pad = width.saturating_sub(cell.chars().count());
                    format!("{cell}{}", " ".repeat(pad))
                })
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Apply one operator command; returns the text to show and whether to quit.
pub async fn apply_command(
    monitor: &mut MonitorController,
    command: ConsoleCommand,
) -> (String, bool) {
    let output = match command {
        ConsoleCommand::Log(name) => match monitor.toggle_logging(name.as_deref()).await {
            Ok(Some(run)) => format!("logging started into run {run}"),
            Ok(None) => "logging stopped".to_string(),
            Err(err) => format!("error: {err:#}"),
        },
        ConsoleCommand::Zoom => {
            if monitor.toggle_scale() {
                "showing the full run".to_string()
            } else {
                "showing the recent window".to_string()
            }
        }
        ConsoleCommand::Table => match monitor.table() {
            Some(view) => format_table(view),
            None => "logging is not active".to_string(),
        },
        ConsoleCommand::Comment { row, text } => match monitor.set_comment(row, &text).await {
            Ok(()) => format!("comment saved on row {row}"),
            Err(err) => format!("error: {err:#}"),
        },
        ConsoleCommand::Frame => match serde_json::to_string_pretty(&monitor.frame()) {
            Ok(json) => json,
            Err(err) => format!("error: {err}"),
        },
        ConsoleCommand::Status => {
            let series = monitor.plot().current_series();
            format!(
                "{} samples shown ({}), logging: {}, alerts: {:?}",
                series.len(),
                if monitor.plot().is_full_range() { "full run" } else { "recent window" },
                monitor.run_name().unwrap_or("off"),
                monitor.alerts(),
            )
        }
        ConsoleCommand::Help => HELP.to_string(),
        ConsoleCommand::Quit => return (String::new(), true),
    };
    (output, false)
}

/// Run the live console: device samples and operator commands on one task.
pub async fn run_console(monitor: &mut MonitorController, device: &Path) -> Result<LinkClosed> {
    let reader = open_device(device).await?;
    let (tx, mut events) = mpsc::channel(64);
    let cancel = CancellationToken::new();
    let link = tokio::spawn(read_link(reader, LINK_TIMEOUT, tx, cancel.clone()));

    log_info!("reading samples from {}", device.display());
    println!("connected to {}; {HELP}", device.display());

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Some(LinkEvent::Sample(sample)) => {
                    let status = monitor.handle_sample(sample).await;
                    println!("{}", format_status(&status, monitor.run_name()));
                }
                Some(LinkEvent::Rejected { line, error }) => {
                    println!("rejected {line:?}: {error}");
                }
                Some(LinkEvent::Closed(reason)) => {
                    println!("link closed: {reason:?}");
                    break;
                }
                None => break,
            },
            line = stdin.next_line(), if stdin_open => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match parse_command(&line) {
                    Ok(command) => {
                        let (output, quit) = apply_command(monitor, command).await;
                        if quit {
                            break;
                        }
                        println!("{output}");
                    }
                    Err(message) => println!("{message}"),
                },
                Ok(None) => stdin_open = false,
                Err(err) => {
                    log_error!("stdin read failed: {err}");
                    stdin_open = false;
                }
            },
        }
    }

    cancel.cancel();
    drop(events);
    let reason = link.await.context("device reader task failed")?;
    Ok(reason)
}
