//! Report orchestration: window resolution, concurrent fetch, concurrent
//! section computation, assembly.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, instrument};

use crate::errors::ServiceError;

use super::{
    calculators,
    sessions::{accumulate_work_durations, TrailingSessionPolicy},
    store::EventStore,
    AttendanceRecord, OrderRecord, Report, ReportPeriod,
};

/// Resolves the period window, fetches both event slices, and builds the
/// composite report. Fetches run concurrently; a bad period token fails
/// before any query runs.
#[instrument(skip(store))]
pub async fn generate(
    store: &EventStore,
    period: ReportPeriod,
    now: DateTime<Utc>,
) -> Result<Report, ServiceError> {
    let (start, end) = period.window(now);
    info!(%period, %start, %end, "generating report");

    let (orders, attendance) =
        tokio::try_join!(store.fetch_orders(start, end), store.fetch_attendance(start, end))?;

    build_report(orders, attendance, period, start, end, now).await
}

/// Computes all metric sections from already-fetched slices.
///
/// The six independent sections run as parallel tasks over shared immutable
/// slices; the dependent ones (operational, efficiency, revenue ranking,
/// forecast) are derived after the join. Any task failure fails the whole
/// report: a report with missing sections would not be comparable with its
/// siblings. With a fixed window and fixed slices the output is fully
/// deterministic.
pub async fn build_report(
    orders: Vec<OrderRecord>,
    attendance: Vec<AttendanceRecord>,
    period: ReportPeriod,
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    generated_at: DateTime<Utc>,
) -> Result<Report, ServiceError> {
    let orders: Arc<[OrderRecord]> = orders.into();
    let attendance: Arc<[AttendanceRecord]> = attendance.into();

    let order_task = tokio::spawn({
        let orders = Arc::clone(&orders);
        async move { calculators::order_metrics(&orders) }
    });
    let item_task = tokio::spawn({
        let orders = Arc::clone(&orders);
        async move { calculators::item_metrics(&orders) }
    });
    let trend_task = tokio::spawn({
        let orders = Arc::clone(&orders);
        async move { calculators::sales_trend(&orders) }
    });
    let cohort_task = tokio::spawn({
        let orders = Arc::clone(&orders);
        async move { calculators::cohort_analysis(&orders) }
    });
    let attendance_task = tokio::spawn({
        let attendance = Arc::clone(&attendance);
        async move { calculators::attendance_metrics(&attendance) }
    });
    // Closed report: trailing open sessions are dropped, so the section only
    // reflects time the window can account for.
    let employee_task = tokio::spawn({
        let orders = Arc::clone(&orders);
        let attendance = Arc::clone(&attendance);
        async move {
            let durations =
                accumulate_work_durations(&attendance, TrailingSessionPolicy::Drop, window_end);
            calculators::employee_metrics(&orders, &durations)
        }
    });

    let (
        order_metrics,
        item_metrics,
        sales_trend,
        cohort_analysis,
        attendance_metrics,
        employee_metrics,
    ) = tokio::try_join!(
        order_task,
        item_task,
        trend_task,
        cohort_task,
        attendance_task,
        employee_task
    )
    .map_err(|e| ServiceError::ComputationFailure(e.to_string()))?;

    let operational_metrics =
        calculators::operational_metrics(&employee_metrics, &attendance_metrics);
    let efficiency_ranking =
        calculators::efficiency_ranking(&employee_metrics, &attendance_metrics);
    let revenue_ranking = calculators::revenue_ranking(&employee_metrics);
    let forecast_revenue = calculators::forecast_revenue(&sales_trend);

    Ok(Report {
        period,
        window_start,
        window_end,
        generated_at,
        order_metrics,
        item_metrics,
        employee_metrics,
        attendance_metrics,
        operational_metrics,
        sales_trend,
        forecast_revenue,
        cohort_analysis,
        efficiency_ranking,
        revenue_ranking,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::{AttendanceKind, ItemClass, OrderLine};
    use chrono::TimeZone;
    use uuid::Uuid;

    fn fixture() -> (Vec<OrderRecord>, Vec<AttendanceRecord>, Uuid) {
        let employee = Uuid::new_v4();
        let day = |h, m| Utc.with_ymd_and_hms(2025, 3, 10, h, m, 0).unwrap();
        let orders = [10.0, 20.0, 30.0]
            .iter()
            .zip([9u32, 13, 20])
            .map(|(&total, hour)| OrderRecord {
                id: Uuid::new_v4(),
                employee_id: employee,
                lines: vec![OrderLine {
                    item_id: Uuid::new_v4(),
                    class: ItemClass::Food,
                    quantity: 1.0,
                }],
                total,
                status: "completed".to_string(),
                created_at: day(hour, 0),
            })
            .collect();
        let attendance = vec![
            AttendanceRecord {
                employee_id: employee,
                recorded_at: day(8, 50),
                kind: AttendanceKind::CheckIn,
            },
            AttendanceRecord {
                employee_id: employee,
                recorded_at: day(21, 0),
                kind: AttendanceKind::CheckOut,
            },
        ];
        (orders, attendance, employee)
    }

    #[tokio::test]
    async fn composes_all_sections_from_one_window() {
        let (orders, attendance, employee) = fixture();
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();

        let report = build_report(orders, attendance, ReportPeriod::Daily, start, end, end)
            .await
            .unwrap();

        assert_eq!(report.order_metrics.total_orders, 3);
        assert_eq!(report.order_metrics.total_revenue, 60.0);
        assert_eq!(report.order_metrics.average_order_value, 20.0);
        assert_eq!(report.order_metrics.median_order_value, 20.0);
        assert_eq!(report.order_metrics.order_completion_rate, 100.0);

        let emp = &report.employee_metrics[0];
        assert_eq!(emp.employee_id, employee);
        assert_eq!(emp.orders_processed, 3);
        assert_eq!(emp.total_sales, 60.0);
        // 08:50 -> 21:00
        assert_eq!(emp.total_work_secs, (12 * 60 + 10) * 60);

        // checked in at 08:50, before the hour-9 threshold
        assert_eq!(report.attendance_metrics.employees[0].late_checkins, 0);

        // one checkin, three orders
        assert_eq!(
            report.operational_metrics.order_to_attendance_ratios[0].ratio,
            3.0
        );
        assert_eq!(report.efficiency_ranking[0].ratio, 3.0);
        assert!(report.operational_metrics.idle_employees.is_empty());
        assert_eq!(report.revenue_ranking[0].total_sales, 60.0);
    }

    #[tokio::test]
    async fn fixed_window_reruns_are_identical() {
        let (orders, attendance, _) = fixture();
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();

        let a = build_report(
            orders.clone(),
            attendance.clone(),
            ReportPeriod::Daily,
            start,
            end,
            end,
        )
        .await
        .unwrap();
        let b = build_report(orders, attendance, ReportPeriod::Daily, start, end, end)
            .await
            .unwrap();

        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[tokio::test]
    async fn empty_window_produces_zeroed_report() {
        let start = Utc.with_ymd_and_hms(2025, 3, 10, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2025, 3, 11, 0, 0, 0).unwrap();
        let report = build_report(vec![], vec![], ReportPeriod::Daily, start, end, end)
            .await
            .unwrap();
        assert_eq!(report.order_metrics.total_orders, 0);
        assert_eq!(report.order_metrics.order_completion_rate, 0.0);
        assert_eq!(report.forecast_revenue, 0.0);
        assert!(report.employee_metrics.is_empty());
        assert!(report.cohort_analysis.is_empty());
    }
}
