use anyhow::{anyhow, Result};
use chrono::{DateTime, Local};
use serde::Serialize;

use crate::{
    config::DEFAULT_TABLE_CAPACITY,
    db::{helpers::CLOCK_FORMAT, sanitize_run_name, Database, NewLogRow},
    errors::IngestError,
    ingest::{parse_line, AlertState, AlertThresholds, Reading},
    models::Sample,
    plot::{PlotFrame, SlidingPlotBuffer},
    table::{BoundedTableView, Locale},
};

// Set to false to silence per-sample logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_error, log_info, log_warn};

/// What happened to one accepted sample.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SampleStatus {
    pub sample: Sample,
    pub alerts: AlertState,
    /// Row id of the logged reading, when logging is active and the insert succeeded.
    pub logged_row: Option<i64>,
    /// Storage failure text; the sample still reached the plot.
    pub storage_error: Option<String>,
}

struct LoggingSession {
    view: BoundedTableView,
}

/// Ties one device link to the plot buffer and, while logging, to a run table.
pub struct MonitorController {
    db: Database,
    plot: SlidingPlotBuffer,
    thresholds: AlertThresholds,
    alerts: AlertState,
    locale: Locale,
    table_capacity: usize,
    logging: Option<LoggingSession>,
    /// Most recent run logged into; `toggle_logging(None)` resumes it.
    last_run: Option<String>,
}

impl MonitorController {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            plot: SlidingPlotBuffer::new(),
            thresholds: AlertThresholds::default(),
            alerts: AlertState::default(),
            locale: Locale::default(),
            table_capacity: DEFAULT_TABLE_CAPACITY,
            logging: None,
            last_run: None,
        }
    }

    pub fn with_thresholds(mut self, thresholds: AlertThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_last_run(mut self, last_run: Option<String>) -> Self {
        self.last_run = last_run;
        self
    }

    pub fn is_logging(&self) -> bool {
        self.logging.is_some()
    }

    pub fn run_name(&self) -> Option<&str> {
        self.logging.as_ref().map(|session| session.view.table())
    }

    pub fn last_run(&self) -> Option<&str> {
        self.last_run.as_deref()
    }

    pub fn alerts(&self) -> AlertState {
        self.alerts
    }

    pub fn plot(&self) -> &SlidingPlotBuffer {
        &self.plot
    }

    pub fn table(&self) -> Option<&BoundedTableView> {
        self.logging.as_ref().map(|session| &session.view)
    }

    /// Begin logging into the run named by `raw_name` (sanitized), creating it if needed.
    /// An existing run matched without regard to case keeps its stored name.
    pub async fn start_logging(&mut self, raw_name: &str) -> Result<String> {
        let run = sanitize_run_name(raw_name)?;
        self.db.create_run_table(&run).await?;
        let run = self.db.resolve_run(&run).await?.unwrap_or(run);

        let mut view = BoundedTableView::open(self.db.clone(), run.clone(), self.table_capacity)
            .await?;
        view.set_locale(self.locale);

        log_info!("logging started into run {run}");
        self.logging = Some(LoggingSession { view });
        self.last_run = Some(run.clone());
        Ok(run)
    }

    pub fn stop_logging(&mut self) -> Option<String> {
        let session = self.logging.take()?;
        let run = session.view.table().to_string();
        log_info!("logging stopped for run {run}");
        Some(run)
    }

    /// Stop logging when active, otherwise start it; returns the active run, if any.
    /// Without a name, logging resumes the last run.
    pub async fn toggle_logging(&mut self, raw_name: Option<&str>) -> Result<Option<String>> {
        if self.is_logging() {
            self.stop_logging();
            return Ok(None);
        }
        let raw_name = match raw_name {
            Some(name) => name.to_string(),
            None => self
                .last_run
                .clone()
                .ok_or_else(|| anyhow!("enter a run name to start logging"))?,
        };
        self.start_logging(&raw_name).await.map(Some)
    }

    pub async fn handle_line(
        &mut self,
        line: &str,
        now: DateTime<Local>,
    ) -> Result<SampleStatus, IngestError> {
        let Reading { reactor, vapor } = parse_line(line)?;
        Ok(self.handle_sample(Sample::new(now, reactor, vapor)).await)
    }

    pub async fn handle_sample(&mut self, sample: Sample) -> SampleStatus {
        let mut logged_row = None;
        let mut storage_error = None;

        if let Some(session) = self.logging.as_mut() {
            let row = NewLogRow::reading(
                sample.timestamp.format(CLOCK_FORMAT).to_string(),
                sample.reactor,
                sample.vapor,
            );
            match self.db.insert_log_row(session.view.table(), &row).await {
                Ok(row_id) => {
                    logged_row = Some(row_id);
                    if let Err(err) = session.view.reload().await {
                        log_error!("table reload failed: {err}");
                        storage_error = Some(err.to_string());
                    }
                }
                Err(err) => {
                    log_error!("failed to log sample into {}: {err:#}", session.view.table());
                    storage_error = Some(format!("{err:#}"));
                }
            }
        }

        self.plot.append(sample);

        let alerts = AlertState::evaluate(
            &Reading {
                reactor: sample.reactor,
                vapor: sample.vapor,
            },
            &self.thresholds,
        );
        if alerts.reactor_alert && !self.alerts.reactor_alert {
            log_warn!("reactor temperature {} above {}", sample.reactor, self.thresholds.reactor_max);
        }
        if alerts.vapor_alert && !self.alerts.vapor_alert {
            log_warn!("vapor temperature {} below {}", sample.vapor, self.thresholds.vapor_min);
        }
        self.alerts = alerts;

        SampleStatus {
            sample,
            alerts,
            logged_row,
            storage_error,
        }
    }

    pub fn toggle_scale(&mut self) -> bool {
        self.plot.toggle_scale()
    }

    pub fn frame(&self) -> PlotFrame {
        self.plot.frame()
    }

    /// Edit the comment of a row of the live table.
    pub async fn set_comment(&mut self, row: usize, text: &str) -> Result<()> {
        let session = self
            .logging
            .as_mut()
            .ok_or_else(|| anyhow!("logging is not active"))?;
        session.view.set_comment(row, text).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn controller() -> (tempfile::TempDir, MonitorController) {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("runs.db")).unwrap();
        (dir, MonitorController::new(db))
    }

    fn at(secs: i64) -> DateTime<Local> {
        Local.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[tokio::test]
    async fn samples_reach_the_plot_without_logging() {
        let (_dir, mut monitor) = controller();
        let status = monitor.handle_line("251.3;27.8", at(0)).await.unwrap();

        assert_eq!(status.logged_row, None);
        assert!(status.alerts.reactor_alert && status.alerts.vapor_alert);
        assert_eq!(monitor.plot().full_history().len(), 1);

        let status = monitor.handle_line("240.0;25.0", at(15)).await.unwrap();
        assert!(!status.alerts.any());
        assert_eq!(monitor.alerts(), AlertState::default());
    }

    #[tokio::test]
    async fn malformed_lines_are_rejected_and_not_plotted() {
        let (_dir, mut monitor) = controller();
        assert_eq!(
            monitor.handle_line("1;2;3", at(0)).await,
            Err(IngestError::FieldCount(3))
        );
        assert!(monitor.plot().full_history().is_empty());
    }

    #[tokio::test]
    async fn logging_appends_and_reloads_the_table() {
        let (_dir, mut monitor) = controller();
        let run = monitor.start_logging(" night run ").await.unwrap();
        assert_eq!(run, "nightrun");
        assert_eq!(monitor.run_name(), Some("nightrun"));

        for i in 0..3 {
            let status = monitor
                .handle_line(&format!("{};{}", 240 + i, 100 + i), at(i * 15))
                .await
                .unwrap();
            assert_eq!(status.logged_row, Some(i + 1));
            assert_eq!(status.storage_error, None);
        }

        let table = monitor.table().unwrap();
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.value_at(2, 1).unwrap(), "242.0");
        assert_eq!(table.value_at(0, 0).unwrap(), at(0).format("%H:%M:%S").to_string());

        monitor.set_comment(1, "  valve opened ").await.unwrap();
        assert_eq!(monitor.table().unwrap().value_at(1, 3).unwrap(), "valve opened");

        assert_eq!(monitor.stop_logging(), Some("nightrun".to_string()));
        monitor.handle_line("250;100", at(60)).await.unwrap();
        assert_eq!(monitor.plot().full_history().len(), 4);
        assert!(monitor.set_comment(0, "x").await.is_err());
    }

    #[tokio::test]
    async fn toggle_logging_requires_a_name_to_start() {
        let (_dir, mut monitor) = controller();
        assert!(monitor.toggle_logging(None).await.is_err());
        assert!(monitor.toggle_logging(Some("---")).await.is_err());
        assert_eq!(
            monitor.toggle_logging(Some("H1")).await.unwrap(),
            Some("H1".to_string())
        );
        assert_eq!(monitor.toggle_logging(None).await.unwrap(), None);
        assert!(!monitor.is_logging());
    }

    #[tokio::test]
    async fn logging_without_a_name_resumes_the_last_run() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("runs.db")).unwrap();
        let mut monitor = MonitorController::new(db).with_last_run(Some("H1".into()));
        assert_eq!(monitor.last_run(), Some("H1"));

        assert_eq!(monitor.toggle_logging(None).await.unwrap(), Some("H1".into()));
        assert_eq!(monitor.toggle_logging(None).await.unwrap(), None);

        monitor.start_logging("H2").await.unwrap();
        monitor.stop_logging();
        assert_eq!(monitor.last_run(), Some("H2"));
    }

    #[tokio::test]
    async fn mixed_case_name_reuses_the_stored_run() {
        let (_dir, mut monitor) = controller();
        monitor.start_logging("H1").await.unwrap();
        monitor.handle_line("240;100", at(0)).await.unwrap();
        monitor.stop_logging();

        assert_eq!(monitor.start_logging("h1").await.unwrap(), "H1");
        assert_eq!(monitor.run_name(), Some("H1"));
        assert_eq!(monitor.table().unwrap().row_count(), 1);
    }

    #[tokio::test]
    async fn storage_failure_is_reported_and_the_sample_is_still_plotted() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(dir.path().join("runs.db")).unwrap();
        let mut monitor = MonitorController::new(db.clone());
        monitor.start_logging("H1").await.unwrap();
        monitor.handle_line("240;100", at(0)).await.unwrap();
        let cached = monitor.table().unwrap().rows().to_vec();

        db.drop_runs(vec!["H1".into()]).await.unwrap();
        let status = monitor.handle_line("251.3;27.8", at(15)).await.unwrap();

        assert!(status.storage_error.is_some());
        assert_eq!(status.logged_row, None);
        assert!(status.alerts.reactor_alert);
        assert_eq!(monitor.plot().full_history().len(), 2);
        assert!(monitor.is_logging());
        assert_eq!(monitor.table().unwrap().rows(), cached.as_slice());
    }

    #[tokio::test]
    async fn scale_toggle_changes_the_frame_source() {
        let (_dir, mut monitor) = controller();
        for i in 0..130 {
            monitor.handle_line("200;80", at(i * 15)).await.unwrap();
        }
        assert_eq!(monitor.frame().reactor.len(), 120);
        assert!(monitor.toggle_scale());
        assert_eq!(monitor.frame().reactor.len(), 130);
    }
}
