//! Report orchestration: on-demand generation, CSV export, and the
//! background scheduler that refreshes every period on an interval.

use chrono::Utc;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument};

use crate::{
    analytics::{export::CsvExporter, report, store::EventStore, Report, ReportPeriod},
    db::DbPool,
    errors::ServiceError,
};

#[derive(Clone)]
pub struct ReportService {
    store: EventStore,
    exporter: Arc<CsvExporter>,
}

impl ReportService {
    pub fn new(db: Arc<DbPool>, report_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: EventStore::new(db),
            exporter: Arc::new(CsvExporter::new(report_dir)),
        }
    }

    /// Computes a full report over the period's window ending now.
    pub async fn generate_report(&self, period: ReportPeriod) -> Result<Report, ServiceError> {
        report::generate(&self.store, period, Utc::now()).await
    }

    /// Writes an already-computed report to disk. Export is separate from
    /// generation so a failed write can be retried without recomputing.
    pub fn export_report(&self, report: &Report) -> Result<PathBuf, ServiceError> {
        self.exporter.export(report)
    }

    #[instrument(skip(self))]
    pub async fn generate_and_export(
        &self,
        period: ReportPeriod,
    ) -> Result<(Report, PathBuf), ServiceError> {
        let report = self.generate_report(period).await?;
        let dir = self.export_report(&report)?;
        info!(%period, path = %dir.display(), "report exported");
        Ok((report, dir))
    }
}

/// Spawns one interval loop per report period. A failed cycle is logged and
/// skipped; the next tick runs on schedule.
pub fn spawn_report_scheduler(service: Arc<ReportService>) {
    let schedule = [
        (ReportPeriod::Daily, Duration::from_secs(24 * 60 * 60)),
        (ReportPeriod::Weekly, Duration::from_secs(7 * 24 * 60 * 60)),
        (ReportPeriod::Monthly, Duration::from_secs(30 * 24 * 60 * 60)),
        (ReportPeriod::Yearly, Duration::from_secs(365 * 24 * 60 * 60)),
    ];
    for (period, every) in schedule {
        let service = Arc::clone(&service);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // the first tick fires immediately; skip it so startup does not
            // recompute all four reports at once
            interval.tick().await;
            loop {
                interval.tick().await;
                match service.generate_and_export(period).await {
                    Ok((_, dir)) => {
                        info!(%period, path = %dir.display(), "scheduled report refreshed")
                    }
                    Err(err) => error!(%period, %err, "scheduled report failed"),
                }
            }
        });
    }
    info!("report scheduler started");
}
