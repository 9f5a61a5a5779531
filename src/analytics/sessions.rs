//! Work-duration reconciliation: pairing check-ins with check-outs.

use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use uuid::Uuid;

use super::{AttendanceKind, AttendanceRecord};

/// What to do with a check-in that has no matching check-out before the
/// window end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrailingSessionPolicy {
    /// Ignore the open session. Used for closed historical reports, where
    /// counting a shift that ends after the window would attribute time the
    /// window cannot see.
    Drop,
    /// Count the open session up to `now`. Used for live status queries
    /// ("how long has this employee worked today").
    CountOngoing,
}

/// Accumulates per-employee work durations from an unsorted attendance
/// slice.
///
/// Events are grouped by employee and scanned in timestamp order. A
/// check-in opens a session unless one is already open (duplicate check-ins
/// are ignored); a check-out closes the open session (orphan check-outs are
/// ignored). Malformed sequences therefore never error, they just contribute
/// nothing.
pub fn accumulate_work_durations(
    records: &[AttendanceRecord],
    policy: TrailingSessionPolicy,
    now: DateTime<Utc>,
) -> HashMap<Uuid, Duration> {
    let mut per_employee: HashMap<Uuid, Vec<&AttendanceRecord>> = HashMap::new();
    for rec in records {
        per_employee.entry(rec.employee_id).or_default().push(rec);
    }

    let mut durations = HashMap::with_capacity(per_employee.len());
    for (employee_id, mut events) in per_employee {
        events.sort_by_key(|r| r.recorded_at);

        let mut total = Duration::zero();
        let mut open_since: Option<DateTime<Utc>> = None;
        for event in events {
            match event.kind {
                AttendanceKind::CheckIn => {
                    if open_since.is_none() {
                        open_since = Some(event.recorded_at);
                    }
                }
                AttendanceKind::CheckOut => {
                    if let Some(start) = open_since.take() {
                        total += event.recorded_at - start;
                    }
                }
            }
        }
        if policy == TrailingSessionPolicy::CountOngoing {
            if let Some(start) = open_since {
                if now > start {
                    total += now - start;
                }
            }
        }
        durations.insert(employee_id, total);
    }
    durations
}
