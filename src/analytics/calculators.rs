//! Pure metric calculators.
//!
//! Each function folds an immutable event slice into one metric section and
//! nothing else: no I/O, no shared state, no dependence on other sections
//! except where explicitly composed (operational ratios and the efficiency
//! ranking read employee + attendance metrics; the forecast reads the sales
//! trend). Every ratio uses floating-point division and a zero denominator
//! yields 0.0, never NaN.

use chrono::{Datelike, Duration, Timelike};
use std::collections::{BTreeMap, HashMap};
use uuid::Uuid;

use super::{
    AttendanceKind, AttendanceMetrics, AttendanceRecord, CohortData, DailyBucket,
    EmployeeAttendance, EmployeeMetrics, EmployeeRatio, HourOrderCount, ItemClass, ItemMetrics,
    ItemRanking, MonthlyBucket, OperationalMetrics, OrderMetrics, OrderRecord, RevenueRank,
    SalesTrend, LATE_CHECKIN_HOUR,
};

const COMPLETED_STATUS: &str = "completed";

fn month_label(year: i32, month: u32) -> String {
    const NAMES: [&str; 12] = [
        "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
    ];
    format!("{} {}", NAMES[(month as usize - 1).min(11)], year)
}

/// Median by sort-and-midpoint; even-length input averages the two middles.
fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = sorted.len();
    if n % 2 == 1 {
        sorted[n / 2]
    } else {
        (sorted[n / 2 - 1] + sorted[n / 2]) / 2.0
    }
}

/// Population standard deviation.
fn std_deviation(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let sum_sq = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>();
    (sum_sq / values.len() as f64).sqrt()
}

/// Overall order statistics: value distribution, status breakdown, peak
/// hours.
pub fn order_metrics(orders: &[OrderRecord]) -> OrderMetrics {
    let total_orders = orders.len() as u64;
    let mut total_revenue = 0.0;
    let mut values = Vec::with_capacity(orders.len());
    let mut orders_by_status: BTreeMap<String, u64> = BTreeMap::new();
    let mut by_hour: HashMap<u32, u64> = HashMap::new();
    let mut completed = 0u64;
    let mut min_value = 0.0f64;
    let mut max_value = 0.0f64;

    for (i, order) in orders.iter().enumerate() {
        total_revenue += order.total;
        values.push(order.total);
        if i == 0 || order.total < min_value {
            min_value = order.total;
        }
        if i == 0 || order.total > max_value {
            max_value = order.total;
        }
        *orders_by_status.entry(order.status.clone()).or_insert(0) += 1;
        if order.status == COMPLETED_STATUS {
            completed += 1;
        }
        *by_hour.entry(order.created_at.hour()).or_insert(0) += 1;
    }

    let average_order_value = if total_orders > 0 {
        total_revenue / total_orders as f64
    } else {
        0.0
    };
    let order_completion_rate = if total_orders > 0 {
        completed as f64 / total_orders as f64 * 100.0
    } else {
        0.0
    };

    let mut peak_order_hours: Vec<HourOrderCount> = by_hour
        .into_iter()
        .map(|(hour, count)| HourOrderCount { hour, count })
        .collect();
    // count descending, hour ascending on ties, so output is deterministic
    peak_order_hours.sort_by(|a, b| b.count.cmp(&a.count).then(a.hour.cmp(&b.hour)));

    OrderMetrics {
        total_orders,
        total_revenue,
        average_order_value,
        median_order_value: median(&values),
        min_order_value: min_value,
        max_order_value: max_value,
        order_completion_rate,
        orders_by_status,
        peak_order_hours,
    }
}

fn rank_items(quantities: HashMap<Uuid, f64>) -> Vec<ItemRanking> {
    let mut rankings: Vec<ItemRanking> = quantities
        .into_iter()
        .map(|(item_id, total_quantity)| ItemRanking {
            item_id,
            total_quantity,
        })
        .collect();
    rankings.sort_by(|a, b| {
        b.total_quantity
            .partial_cmp(&a.total_quantity)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.item_id.cmp(&b.item_id))
    });
    rankings
}

/// Quantity sold per item, ranked per class.
pub fn item_metrics(orders: &[OrderRecord]) -> ItemMetrics {
    let mut food_quantities: HashMap<Uuid, f64> = HashMap::new();
    let mut drink_quantities: HashMap<Uuid, f64> = HashMap::new();
    for order in orders {
        for line in &order.lines {
            let bucket = match line.class {
                ItemClass::Food => &mut food_quantities,
                ItemClass::Drink => &mut drink_quantities,
            };
            *bucket.entry(line.item_id).or_insert(0.0) += line.quantity;
        }
    }
    ItemMetrics {
        best_selling_foods: rank_items(food_quantities),
        best_selling_drinks: rank_items(drink_quantities),
    }
}

/// Per-employee order statistics, enriched with reconciled work durations.
/// Output is sorted by total sales descending (employee id ascending on
/// ties), which doubles as the revenue ranking order.
pub fn employee_metrics(
    orders: &[OrderRecord],
    work_durations: &HashMap<Uuid, Duration>,
) -> Vec<EmployeeMetrics> {
    struct Acc {
        orders: u64,
        sales: f64,
        timestamps: Vec<chrono::DateTime<chrono::Utc>>,
    }

    let mut per_employee: HashMap<Uuid, Acc> = HashMap::new();
    for order in orders {
        let acc = per_employee.entry(order.employee_id).or_insert(Acc {
            orders: 0,
            sales: 0.0,
            timestamps: Vec::new(),
        });
        acc.orders += 1;
        acc.sales += order.total;
        acc.timestamps.push(order.created_at);
    }

    let mut metrics: Vec<EmployeeMetrics> = per_employee
        .into_iter()
        .map(|(employee_id, mut acc)| {
            let average_order_value = if acc.orders > 0 {
                acc.sales / acc.orders as f64
            } else {
                0.0
            };

            let (average_processing_secs, processing_std_dev_minutes) =
                if acc.timestamps.len() > 1 {
                    acc.timestamps.sort();
                    let mut gap_minutes = Vec::with_capacity(acc.timestamps.len() - 1);
                    let mut total_gap_secs = 0.0;
                    for pair in acc.timestamps.windows(2) {
                        let gap = pair[1] - pair[0];
                        let secs = gap.num_milliseconds() as f64 / 1000.0;
                        total_gap_secs += secs;
                        gap_minutes.push(secs / 60.0);
                    }
                    let mean_secs = total_gap_secs / (acc.timestamps.len() - 1) as f64;
                    (Some(mean_secs), Some(std_deviation(&gap_minutes)))
                } else {
                    (None, None)
                };

            EmployeeMetrics {
                employee_id,
                orders_processed: acc.orders,
                total_sales: acc.sales,
                average_order_value,
                average_processing_secs,
                processing_std_dev_minutes,
                total_work_secs: work_durations
                    .get(&employee_id)
                    .map(|d| d.num_seconds())
                    .unwrap_or(0),
            }
        })
        .collect();

    metrics.sort_by(|a, b| {
        b.total_sales
            .partial_cmp(&a.total_sales)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.employee_id.cmp(&b.employee_id))
    });
    metrics
}

/// Check-in/check-out counts and late arrivals, globally and per employee.
pub fn attendance_metrics(records: &[AttendanceRecord]) -> AttendanceMetrics {
    let mut total_checkins = 0u64;
    let mut total_checkouts = 0u64;
    let mut per_employee: BTreeMap<Uuid, EmployeeAttendance> = BTreeMap::new();

    for record in records {
        let entry = per_employee
            .entry(record.employee_id)
            .or_insert(EmployeeAttendance {
                employee_id: record.employee_id,
                checkins: 0,
                checkouts: 0,
                late_checkins: 0,
            });
        match record.kind {
            AttendanceKind::CheckIn => {
                total_checkins += 1;
                entry.checkins += 1;
                if record.recorded_at.hour() >= LATE_CHECKIN_HOUR {
                    entry.late_checkins += 1;
                }
            }
            AttendanceKind::CheckOut => {
                total_checkouts += 1;
                entry.checkouts += 1;
            }
        }
    }

    AttendanceMetrics {
        total_checkins,
        total_checkouts,
        employees: per_employee.into_values().collect(),
    }
}

fn orders_per_checkin(
    employees: &[EmployeeMetrics],
    attendance: &AttendanceMetrics,
) -> Vec<EmployeeRatio> {
    let orders_by_employee: HashMap<Uuid, u64> = employees
        .iter()
        .map(|e| (e.employee_id, e.orders_processed))
        .collect();

    let mut ratios: Vec<EmployeeRatio> = attendance
        .employees
        .iter()
        .map(|att| {
            let orders = orders_by_employee.get(&att.employee_id).copied().unwrap_or(0);
            let ratio = if att.checkins > 0 {
                orders as f64 / att.checkins as f64
            } else {
                0.0
            };
            EmployeeRatio {
                employee_id: att.employee_id,
                ratio,
            }
        })
        .collect();
    ratios.sort_by(|a, b| {
        b.ratio
            .partial_cmp(&a.ratio)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.employee_id.cmp(&b.employee_id))
    });
    ratios
}

/// Orders-per-checkin ratios plus the idle list (attendance but no orders).
pub fn operational_metrics(
    employees: &[EmployeeMetrics],
    attendance: &AttendanceMetrics,
) -> OperationalMetrics {
    let orders_by_employee: HashMap<Uuid, u64> = employees
        .iter()
        .map(|e| (e.employee_id, e.orders_processed))
        .collect();

    let idle_employees: Vec<Uuid> = attendance
        .employees
        .iter()
        .filter(|att| {
            att.checkins > 0
                && orders_by_employee
                    .get(&att.employee_id)
                    .copied()
                    .unwrap_or(0)
                    == 0
        })
        .map(|att| att.employee_id)
        .collect();

    OperationalMetrics {
        order_to_attendance_ratios: orders_per_checkin(employees, attendance),
        idle_employees,
    }
}

/// Monthly and daily revenue buckets plus the first-to-last month growth
/// rate.
pub fn sales_trend(orders: &[OrderRecord]) -> SalesTrend {
    let mut monthly: BTreeMap<(i32, u32), (f64, u64)> = BTreeMap::new();
    let mut daily: BTreeMap<chrono::NaiveDate, (u64, f64)> = BTreeMap::new();

    for order in orders {
        let key = (order.created_at.year(), order.created_at.month());
        let month = monthly.entry(key).or_insert((0.0, 0));
        month.0 += order.total;
        month.1 += 1;

        let day = daily.entry(order.created_at.date_naive()).or_insert((0, 0.0));
        day.0 += 1;
        day.1 += order.total;
    }

    let monthly: Vec<MonthlyBucket> = monthly
        .into_iter()
        .map(|((year, month), (revenue, orders))| MonthlyBucket {
            label: month_label(year, month),
            year,
            month,
            revenue,
            orders,
        })
        .collect();

    let growth_rate = match (monthly.first(), monthly.last()) {
        (Some(first), Some(last)) if monthly.len() >= 2 && first.revenue > 0.0 => {
            (last.revenue - first.revenue) / first.revenue * 100.0
        }
        _ => 0.0,
    };

    SalesTrend {
        monthly,
        daily: daily
            .into_iter()
            .map(|(date, (orders, revenue))| DailyBucket {
                date,
                orders,
                revenue,
            })
            .collect(),
        growth_rate,
    }
}

/// Naive next-month revenue extrapolation:
/// `last + (growth_rate / 100) * last / months_observed`.
///
/// A deliberately rough heuristic kept exactly as stated, not a model.
pub fn forecast_revenue(trend: &SalesTrend) -> f64 {
    let Some(last) = trend.monthly.last() else {
        return 0.0;
    };
    last.revenue + (trend.growth_rate / 100.0) * last.revenue / trend.monthly.len() as f64
}

/// Orders grouped by creation month, chronologically sorted.
pub fn cohort_analysis(orders: &[OrderRecord]) -> Vec<CohortData> {
    let mut cohorts: BTreeMap<(i32, u32), (u64, f64)> = BTreeMap::new();
    for order in orders {
        let entry = cohorts
            .entry((order.created_at.year(), order.created_at.month()))
            .or_insert((0, 0.0));
        entry.0 += 1;
        entry.1 += order.total;
    }
    cohorts
        .into_iter()
        .map(|((year, month), (order_count, total_revenue))| CohortData {
            cohort_label: month_label(year, month),
            order_count,
            total_revenue,
            average_order_value: if order_count > 0 {
                total_revenue / order_count as f64
            } else {
                0.0
            },
        })
        .collect()
}

/// Orders processed per check-in, ranked descending.
pub fn efficiency_ranking(
    employees: &[EmployeeMetrics],
    attendance: &AttendanceMetrics,
) -> Vec<EmployeeRatio> {
    orders_per_checkin(employees, attendance)
}

/// Employee metrics re-projected as a revenue leaderboard.
pub fn revenue_ranking(employees: &[EmployeeMetrics]) -> Vec<RevenueRank> {
    // employee_metrics is already sorted by total sales descending
    employees
        .iter()
        .map(|e| RevenueRank {
            employee_id: e.employee_id,
            total_sales: e.total_sales,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn order(employee_id: Uuid, total: f64, status: &str, hour: u32) -> OrderRecord {
        OrderRecord {
            id: Uuid::new_v4(),
            employee_id,
            lines: Vec::new(),
            total,
            status: status.to_string(),
            created_at: Utc.with_ymd_and_hms(2025, 3, 10, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[10.0, 20.0, 30.0]), 20.0);
        assert_eq!(median(&[10.0, 20.0, 30.0, 40.0]), 25.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn empty_window_yields_zero_rates() {
        let metrics = order_metrics(&[]);
        assert_eq!(metrics.total_orders, 0);
        assert_eq!(metrics.order_completion_rate, 0.0);
        assert_eq!(metrics.average_order_value, 0.0);
        assert!(metrics.peak_order_hours.is_empty());
    }

    #[test]
    fn peak_hours_ties_break_by_hour_ascending() {
        let emp = Uuid::new_v4();
        let orders = vec![
            order(emp, 10.0, "completed", 20),
            order(emp, 10.0, "completed", 9),
            order(emp, 10.0, "completed", 20),
            order(emp, 10.0, "completed", 9),
            order(emp, 10.0, "completed", 13),
        ];
        let metrics = order_metrics(&orders);
        let hours: Vec<u32> = metrics.peak_order_hours.iter().map(|h| h.hour).collect();
        assert_eq!(hours, vec![9, 20, 13]);
    }

    #[test]
    fn growth_rate_first_to_last_month() {
        let emp = Uuid::new_v4();
        let mut orders = vec![];
        let mut jan = order(emp, 100.0, "completed", 10);
        jan.created_at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        orders.push(jan);
        let mut feb = order(emp, 150.0, "completed", 10);
        feb.created_at = Utc.with_ymd_and_hms(2025, 2, 15, 10, 0, 0).unwrap();
        orders.push(feb);

        let trend = sales_trend(&orders);
        assert_eq!(trend.growth_rate, 50.0);
        assert_eq!(trend.monthly.len(), 2);
        assert_eq!(trend.monthly[0].label, "Jan 2025");

        // single month: growth is 0
        let trend = sales_trend(&orders[..1]);
        assert_eq!(trend.growth_rate, 0.0);
    }

    #[test]
    fn forecast_matches_heuristic() {
        let emp = Uuid::new_v4();
        let mut jan = order(emp, 100.0, "completed", 10);
        jan.created_at = Utc.with_ymd_and_hms(2025, 1, 15, 10, 0, 0).unwrap();
        let mut feb = order(emp, 150.0, "completed", 10);
        feb.created_at = Utc.with_ymd_and_hms(2025, 2, 15, 10, 0, 0).unwrap();

        let trend = sales_trend(&[jan, feb]);
        // 150 + (50/100) * 150 / 2 = 187.5
        assert_eq!(forecast_revenue(&trend), 187.5);
        assert_eq!(
            forecast_revenue(&SalesTrend {
                monthly: vec![],
                daily: vec![],
                growth_rate: 0.0
            }),
            0.0
        );
    }

    #[test]
    fn efficiency_ratio_zero_checkins_is_zero() {
        let emp = Uuid::new_v4();
        let employees = employee_metrics(
            &[order(emp, 10.0, "completed", 10)],
            &HashMap::new(),
        );
        let attendance = AttendanceMetrics {
            total_checkins: 0,
            total_checkouts: 1,
            employees: vec![EmployeeAttendance {
                employee_id: emp,
                checkins: 0,
                checkouts: 1,
                late_checkins: 0,
            }],
        };
        let ranking = efficiency_ranking(&employees, &attendance);
        assert_eq!(ranking.len(), 1);
        assert_eq!(ranking[0].ratio, 0.0);
    }

    #[test]
    fn idle_means_attendance_but_no_orders() {
        let worker = Uuid::new_v4();
        let idler = Uuid::new_v4();
        let employees = employee_metrics(
            &[order(worker, 10.0, "completed", 10)],
            &HashMap::new(),
        );
        let attendance = AttendanceMetrics {
            total_checkins: 2,
            total_checkouts: 0,
            employees: vec![
                EmployeeAttendance {
                    employee_id: worker.min(idler),
                    checkins: 1,
                    checkouts: 0,
                    late_checkins: 0,
                },
                EmployeeAttendance {
                    employee_id: worker.max(idler),
                    checkins: 1,
                    checkouts: 0,
                    late_checkins: 0,
                },
            ],
        };
        let metrics = operational_metrics(&employees, &attendance);
        assert_eq!(metrics.idle_employees, vec![idler]);
    }

    #[test]
    fn item_ranking_breaks_quantity_ties_by_id() {
        let emp = Uuid::new_v4();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let mut o = order(emp, 10.0, "completed", 10);
        o.lines = vec![
            super::super::OrderLine {
                item_id: a.max(b),
                class: ItemClass::Food,
                quantity: 2.0,
            },
            super::super::OrderLine {
                item_id: a.min(b),
                class: ItemClass::Food,
                quantity: 2.0,
            },
        ];
        let metrics = item_metrics(&[o]);
        assert_eq!(metrics.best_selling_foods[0].item_id, a.min(b));
        assert_eq!(metrics.best_selling_foods[1].item_id, a.max(b));
    }

    #[test]
    fn single_order_employee_has_no_gap_stats() {
        let emp = Uuid::new_v4();
        let metrics = employee_metrics(&[order(emp, 10.0, "completed", 10)], &HashMap::new());
        assert_eq!(metrics[0].average_processing_secs, None);
        assert_eq!(metrics[0].processing_std_dev_minutes, None);
        assert_eq!(metrics[0].total_work_secs, 0);
    }

    #[test]
    fn late_checkin_threshold_is_hour_nine() {
        let emp = Uuid::new_v4();
        let records = vec![
            AttendanceRecord {
                employee_id: emp,
                recorded_at: Utc.with_ymd_and_hms(2025, 3, 10, 8, 50, 0).unwrap(),
                kind: AttendanceKind::CheckIn,
            },
            AttendanceRecord {
                employee_id: emp,
                recorded_at: Utc.with_ymd_and_hms(2025, 3, 11, 9, 0, 0).unwrap(),
                kind: AttendanceKind::CheckIn,
            },
        ];
        let metrics = attendance_metrics(&records);
        assert_eq!(metrics.employees[0].late_checkins, 1);
        assert_eq!(metrics.employees[0].checkins, 2);
    }
}
