//! CSV export of assembled reports.
//!
//! One file per metric section under `<base>/<period>/`. The exporter is a
//! sink: it trusts the report as handed to it and never recomputes anything.
//! Re-exporting the same period overwrites the previous artifacts.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, instrument};

use crate::errors::ServiceError;

use super::{format_duration_secs, Report};

/// Writes report sections as CSV files.
#[derive(Clone, Debug)]
pub struct CsvExporter {
    base_dir: PathBuf,
}

fn money(v: f64) -> String {
    format!("{:.2}", v)
}

fn export_err(e: impl std::fmt::Display) -> ServiceError {
    ServiceError::ExportFailure(e.to_string())
}

impl CsvExporter {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Exports every section of `report` and returns the period directory.
    #[instrument(skip(self, report), fields(period = %report.period))]
    pub fn export(&self, report: &Report) -> Result<PathBuf, ServiceError> {
        let dir = self.base_dir.join(report.period.to_string());
        fs::create_dir_all(&dir).map_err(export_err)?;

        self.write_summary(&dir, report)?;
        self.write_order_metrics(&dir, report)?;
        self.write_item_metrics(&dir, report)?;
        self.write_employee_metrics(&dir, report)?;
        self.write_attendance_metrics(&dir, report)?;
        self.write_operational_metrics(&dir, report)?;
        self.write_sales_trend(&dir, report)?;
        self.write_cohorts(&dir, report)?;
        self.write_rankings(&dir, report)?;

        info!(dir = %dir.display(), "report exported");
        Ok(dir)
    }

    fn writer(&self, dir: &Path, name: &str) -> Result<csv::Writer<fs::File>, ServiceError> {
        let path = dir.join(name);
        csv::Writer::from_path(&path).map_err(export_err)
    }

    fn write_summary(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "summary.csv")?;
        w.write_record([
            "Period",
            "WindowStart",
            "WindowEnd",
            "GeneratedAt",
            "GrowthRate",
            "ForecastRevenue",
        ])
        .map_err(export_err)?;
        w.write_record([
            report.period.to_string(),
            report.window_start.to_rfc3339(),
            report.window_end.to_rfc3339(),
            report.generated_at.to_rfc3339(),
            money(report.sales_trend.growth_rate),
            money(report.forecast_revenue),
        ])
        .map_err(export_err)?;
        w.flush().map_err(export_err)
    }

    fn write_order_metrics(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let m = &report.order_metrics;
        let mut w = self.writer(dir, "order_metrics.csv")?;
        w.write_record([
            "TotalOrders",
            "TotalRevenue",
            "AverageOrderValue",
            "MedianOrderValue",
            "MinOrderValue",
            "MaxOrderValue",
            "OrderCompletionRate",
        ])
        .map_err(export_err)?;
        w.write_record([
            m.total_orders.to_string(),
            money(m.total_revenue),
            money(m.average_order_value),
            money(m.median_order_value),
            money(m.min_order_value),
            money(m.max_order_value),
            money(m.order_completion_rate),
        ])
        .map_err(export_err)?;
        w.flush().map_err(export_err)?;

        let mut w = self.writer(dir, "orders_by_status.csv")?;
        w.write_record(["Status", "Count"]).map_err(export_err)?;
        for (status, count) in &m.orders_by_status {
            w.write_record([status.clone(), count.to_string()])
                .map_err(export_err)?;
        }
        w.flush().map_err(export_err)?;

        let mut w = self.writer(dir, "peak_order_hours.csv")?;
        w.write_record(["Hour", "Count"]).map_err(export_err)?;
        for hour in &m.peak_order_hours {
            w.write_record([hour.hour.to_string(), hour.count.to_string()])
                .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_item_metrics(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "item_metrics.csv")?;
        w.write_record(["ItemClass", "ItemID", "TotalQuantity"])
            .map_err(export_err)?;
        for item in &report.item_metrics.best_selling_foods {
            w.write_record([
                "food".to_string(),
                item.item_id.to_string(),
                money(item.total_quantity),
            ])
            .map_err(export_err)?;
        }
        for item in &report.item_metrics.best_selling_drinks {
            w.write_record([
                "drink".to_string(),
                item.item_id.to_string(),
                money(item.total_quantity),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_employee_metrics(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "employee_metrics.csv")?;
        w.write_record([
            "EmployeeID",
            "OrdersProcessed",
            "TotalSales",
            "AverageOrderValue",
            "AverageProcessingTime",
            "ProcessingTimeStdDev",
            "TotalWorkDuration",
        ])
        .map_err(export_err)?;
        for emp in &report.employee_metrics {
            let avg_processing = emp
                .average_processing_secs
                .map(|s| format_duration_secs(s.round() as i64))
                .unwrap_or_else(|| "N/A".to_string());
            let std_dev = emp
                .processing_std_dev_minutes
                .map(|m| format!("{:.2} minutes", m))
                .unwrap_or_else(|| "N/A".to_string());
            w.write_record([
                emp.employee_id.to_string(),
                emp.orders_processed.to_string(),
                money(emp.total_sales),
                money(emp.average_order_value),
                avg_processing,
                std_dev,
                format_duration_secs(emp.total_work_secs),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_attendance_metrics(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "attendance_metrics.csv")?;
        w.write_record(["EmployeeID", "Checkins", "Checkouts", "LateCheckins"])
            .map_err(export_err)?;
        for emp in &report.attendance_metrics.employees {
            w.write_record([
                emp.employee_id.to_string(),
                emp.checkins.to_string(),
                emp.checkouts.to_string(),
                emp.late_checkins.to_string(),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_operational_metrics(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let idle = &report.operational_metrics.idle_employees;
        let mut w = self.writer(dir, "operational_metrics.csv")?;
        w.write_record(["EmployeeID", "OrdersPerCheckin", "Idle"])
            .map_err(export_err)?;
        for ratio in &report.operational_metrics.order_to_attendance_ratios {
            w.write_record([
                ratio.employee_id.to_string(),
                money(ratio.ratio),
                idle.contains(&ratio.employee_id).to_string(),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_sales_trend(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "sales_trend.csv")?;
        w.write_record(["Month", "Revenue", "Orders"])
            .map_err(export_err)?;
        for bucket in &report.sales_trend.monthly {
            w.write_record([
                bucket.label.clone(),
                money(bucket.revenue),
                bucket.orders.to_string(),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)?;

        let mut w = self.writer(dir, "daily_metrics.csv")?;
        w.write_record(["Date", "Orders", "Revenue"])
            .map_err(export_err)?;
        for day in &report.sales_trend.daily {
            w.write_record([
                day.date.to_string(),
                day.orders.to_string(),
                money(day.revenue),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_cohorts(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "cohort_analysis.csv")?;
        w.write_record(["Cohort", "OrderCount", "TotalRevenue", "AverageOrderValue"])
            .map_err(export_err)?;
        for cohort in &report.cohort_analysis {
            w.write_record([
                cohort.cohort_label.clone(),
                cohort.order_count.to_string(),
                money(cohort.total_revenue),
                money(cohort.average_order_value),
            ])
            .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }

    fn write_rankings(&self, dir: &Path, report: &Report) -> Result<(), ServiceError> {
        let mut w = self.writer(dir, "efficiency_ranking.csv")?;
        w.write_record(["EmployeeID", "OrdersPerCheckin"])
            .map_err(export_err)?;
        for ratio in &report.efficiency_ranking {
            w.write_record([ratio.employee_id.to_string(), money(ratio.ratio)])
                .map_err(export_err)?;
        }
        w.flush().map_err(export_err)?;

        let mut w = self.writer(dir, "revenue_ranking.csv")?;
        w.write_record(["EmployeeID", "TotalSales"])
            .map_err(export_err)?;
        for rank in &report.revenue_ranking {
            w.write_record([rank.employee_id.to_string(), money(rank.total_sales)])
                .map_err(export_err)?;
        }
        w.flush().map_err(export_err)
    }
}
