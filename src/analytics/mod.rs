//! Reporting and analytics core.
//!
//! Everything in this module is computed from two immutable event slices
//! (orders and attendance) fetched for a single time window. Calculators are
//! pure functions; the orchestrator fans them out concurrently and fails the
//! whole report if any section fails, so a report's sections always describe
//! the same window. Export is a separate, explicitly invoked step.

pub mod calculators;
pub mod export;
pub mod report;
pub mod sessions;
pub mod store;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;

/// A check-in arriving at or after this local hour counts as late. Policy
/// constant, not derived from any schedule.
pub const LATE_CHECKIN_HOUR: u32 = 9;

/// Report window length selector.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReportPeriod {
    Daily,
    Weekly,
    Monthly,
    Yearly,
}

impl ReportPeriod {
    /// Parses a period token, case-insensitively. Anything outside the four
    /// known tokens is an `InvalidPeriod` error.
    pub fn parse(token: &str) -> Result<Self, ServiceError> {
        Self::from_str(token).map_err(|_| ServiceError::InvalidPeriod(token.to_string()))
    }

    /// Resolves the half-open window `[start, now)` for this period.
    pub fn window(&self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = match self {
            ReportPeriod::Daily => now - Duration::days(1),
            ReportPeriod::Weekly => now - Duration::days(7),
            ReportPeriod::Monthly => now
                .checked_sub_months(chrono::Months::new(1))
                .unwrap_or(now - Duration::days(30)),
            ReportPeriod::Yearly => now
                .checked_sub_months(chrono::Months::new(12))
                .unwrap_or(now - Duration::days(365)),
        };
        (start, now)
    }
}

/// Order item class. The catalog keeps foods and drinks in separate tables;
/// analytics ranks them separately too.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive, serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ItemClass {
    Food,
    Drink,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceKind {
    #[strum(to_string = "in", serialize = "checkin")]
    #[serde(rename = "in")]
    CheckIn,
    #[strum(to_string = "out", serialize = "checkout")]
    #[serde(rename = "out")]
    CheckOut,
}

/// One order line as analytics sees it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderLine {
    pub item_id: Uuid,
    pub class: ItemClass,
    pub quantity: f64,
}

/// Read-only snapshot of an order inside the report window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub lines: Vec<OrderLine>,
    pub total: f64,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Read-only snapshot of an attendance event inside the report window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendanceRecord {
    pub employee_id: Uuid,
    pub recorded_at: DateTime<Utc>,
    pub kind: AttendanceKind,
}

// ---------------------------------------------------------------------------
// Metric sections
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HourOrderCount {
    pub hour: u32,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OrderMetrics {
    pub total_orders: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
    pub median_order_value: f64,
    pub min_order_value: f64,
    pub max_order_value: f64,
    /// Percentage of orders with status "completed"; 0 when the window is
    /// empty.
    pub order_completion_rate: f64,
    pub orders_by_status: BTreeMap<String, u64>,
    /// Sorted by count descending, ties broken by hour ascending.
    pub peak_order_hours: Vec<HourOrderCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemRanking {
    pub item_id: Uuid,
    pub total_quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemMetrics {
    pub best_selling_foods: Vec<ItemRanking>,
    pub best_selling_drinks: Vec<ItemRanking>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeMetrics {
    pub employee_id: Uuid,
    pub orders_processed: u64,
    pub total_sales: f64,
    pub average_order_value: f64,
    /// Mean gap between consecutive orders, in seconds. `None` with fewer
    /// than two orders (rendered "N/A" in exports).
    pub average_processing_secs: Option<f64>,
    /// Standard deviation of the inter-order gaps, in minutes.
    pub processing_std_dev_minutes: Option<f64>,
    /// Accumulated paired work-session time inside the window, in seconds.
    pub total_work_secs: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeAttendance {
    pub employee_id: Uuid,
    pub checkins: u64,
    pub checkouts: u64,
    pub late_checkins: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct AttendanceMetrics {
    pub total_checkins: u64,
    pub total_checkouts: u64,
    /// Sorted by employee id ascending.
    pub employees: Vec<EmployeeAttendance>,
}

impl AttendanceMetrics {
    pub fn checkins_for(&self, employee_id: Uuid) -> u64 {
        self.employees
            .iter()
            .find(|e| e.employee_id == employee_id)
            .map(|e| e.checkins)
            .unwrap_or(0)
    }
}

/// Orders processed per check-in, per employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EmployeeRatio {
    pub employee_id: Uuid,
    pub ratio: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct OperationalMetrics {
    /// Sorted by ratio descending, ties broken by employee id ascending.
    pub order_to_attendance_ratios: Vec<EmployeeRatio>,
    /// Employees with attendance but zero processed orders.
    pub idle_employees: Vec<Uuid>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MonthlyBucket {
    /// Calendar month label, e.g. "Mar 2025".
    pub label: String,
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
    pub orders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub orders: u64,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SalesTrend {
    /// Chronologically sorted, only populated months.
    pub monthly: Vec<MonthlyBucket>,
    /// Chronologically sorted calendar days.
    pub daily: Vec<DailyBucket>,
    /// Percent change between the first and last populated month; 0 with
    /// fewer than two months or a zero first month.
    pub growth_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CohortData {
    /// Creation month label, e.g. "Mar 2025".
    pub cohort_label: String,
    pub order_count: u64,
    pub total_revenue: f64,
    pub average_order_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct RevenueRank {
    pub employee_id: Uuid,
    pub total_sales: f64,
}

/// Composite report over one fixed window. Transient: generated on demand,
/// exported, then dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Report {
    pub period: ReportPeriod,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub generated_at: DateTime<Utc>,
    pub order_metrics: OrderMetrics,
    pub item_metrics: ItemMetrics,
    /// Sorted by total sales descending.
    pub employee_metrics: Vec<EmployeeMetrics>,
    pub attendance_metrics: AttendanceMetrics,
    pub operational_metrics: OperationalMetrics,
    pub sales_trend: SalesTrend,
    /// Naive next-month revenue extrapolation from the sales trend.
    pub forecast_revenue: f64,
    pub cohort_analysis: Vec<CohortData>,
    pub efficiency_ranking: Vec<EmployeeRatio>,
    pub revenue_ranking: Vec<RevenueRank>,
}

/// Renders a non-negative number of seconds as compact human text:
/// "3m45s", "2h5m0s", "0s".
pub fn format_duration_secs(total_secs: i64) -> String {
    let secs = total_secs.max(0);
    let (h, m, s) = (secs / 3600, (secs % 3600) / 60, secs % 60);
    if h > 0 {
        format!("{}h{}m{}s", h, m, s)
    } else if m > 0 {
        format!("{}m{}s", m, s)
    } else {
        format!("{}s", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use rstest::rstest;

    #[rstest]
    #[case("daily", ReportPeriod::Daily)]
    #[case("WEEKLY", ReportPeriod::Weekly)]
    #[case("Monthly", ReportPeriod::Monthly)]
    #[case("yearly", ReportPeriod::Yearly)]
    fn parses_period_tokens_case_insensitively(
        #[case] token: &str,
        #[case] expected: ReportPeriod,
    ) {
        assert_eq!(ReportPeriod::parse(token).unwrap(), expected);
    }

    #[test]
    fn unknown_period_token_is_rejected() {
        assert_matches!(
            ReportPeriod::parse("fortnightly"),
            Err(ServiceError::InvalidPeriod(_))
        );
    }

    #[rstest]
    #[case(AttendanceKind::CheckIn, "in", "checkin")]
    #[case(AttendanceKind::CheckOut, "out", "checkout")]
    fn attendance_kind_stores_short_form_but_parses_both(
        #[case] kind: AttendanceKind,
        #[case] short: &str,
        #[case] long: &str,
    ) {
        use std::str::FromStr;
        assert_eq!(kind.to_string(), short);
        assert_eq!(AttendanceKind::from_str(short).unwrap(), kind);
        assert_eq!(AttendanceKind::from_str(long).unwrap(), kind);
    }

    #[test]
    fn monthly_window_uses_calendar_months() {
        let now = Utc.with_ymd_and_hms(2025, 3, 31, 12, 0, 0).unwrap();
        let (start, end) = ReportPeriod::Monthly.window(now);
        assert_eq!(end, now);
        // chrono clamps 31 Feb to 28 Feb
        assert_eq!(start, Utc.with_ymd_and_hms(2025, 2, 28, 12, 0, 0).unwrap());
    }

    #[rstest]
    #[case(0, "0s")]
    #[case(45, "45s")]
    #[case(225, "3m45s")]
    #[case(7500, "2h5m0s")]
    fn duration_formatting(#[case] secs: i64, #[case] expected: &str) {
        assert_eq!(format_duration_secs(secs), expected);
    }
}
