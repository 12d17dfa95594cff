//! Guarantees one attendance record per calendar day of a month for an
//! employee, creating missing days blank on demand.

use std::collections::BTreeSet;

use chrono::{Datelike, Local, NaiveDate};

use crate::error::EngineResult;
use crate::model::AttendanceRecord;
use crate::store::LedgerStore;

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Last day of the month containing `date`.
pub fn month_end(date: NaiveDate) -> NaiveDate {
    let start = month_start(date);
    let next = if start.month() == 12 {
        NaiveDate::from_ymd_opt(start.year() + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(start.year(), start.month() + 1, 1)
    };
    next.and_then(|d| d.pred_opt()).unwrap_or(start)
}

/// Returns the full ordered set of attendance records covering every date
/// of the month containing `month`. Dates with no record get a blank one
/// created first. Missing days are computed as the set difference between
/// the month's range and existing work dates, so repeated calls never
/// attempt duplicate creation.
pub async fn materialize_month<S: LedgerStore>(
    store: &S,
    employee_id: u64,
    month: NaiveDate,
) -> EngineResult<Vec<AttendanceRecord>> {
    let from = month_start(month);
    let to = month_end(month);

    let existing = store.attendance_for_range(employee_id, from, to).await?;
    let have: BTreeSet<NaiveDate> = existing.iter().map(|r| r.work_date).collect();

    let missing: Vec<NaiveDate> = from
        .iter_days()
        .take_while(|d| *d <= to)
        .filter(|d| !have.contains(d))
        .collect();

    if !missing.is_empty() {
        let created = store.insert_blank_days(employee_id, &missing).await?;
        tracing::debug!(employee_id, %from, created, "materialized missing ledger days");
    }

    Ok(store.attendance_for_range(employee_id, from, to).await?)
}

/// Same as [`materialize_month`] for the current calendar month.
pub async fn materialize_current_month<S: LedgerStore>(
    store: &S,
    employee_id: u64,
) -> EngineResult<Vec<AttendanceRecord>> {
    materialize_month(store, employee_id, Local::now().date_naive()).await
}

/// Count of days where both clocks are present.
pub fn worked_sum(records: &[AttendanceRecord]) -> usize {
    records.iter().filter(|r| r.is_worked()).count()
}
