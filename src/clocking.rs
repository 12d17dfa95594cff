//! Direct employee clocking against the ledger. A first clock-in creates
//! the day's record; a clock-out closes it. Races with a concurrently
//! approved correction on the same record are not reconciled: the last
//! committed write wins.

use chrono::{NaiveDate, NaiveTime};

use crate::error::{EngineError, EngineResult, ValidationError};
use crate::model::AttendanceRecord;
use crate::store::LedgerStore;

/// Records a clock-in for the day, creating the attendance row when none
/// exists yet. A day that already has a clock-in refuses a second one.
pub async fn clock_in<S: LedgerStore>(
    store: &S,
    employee_id: u64,
    day: NaiveDate,
    at: NaiveTime,
) -> EngineResult<()> {
    match store.attendance_for_day(employee_id, day).await? {
        Some(record) if record.clock_in.is_some() => {
            Err(EngineError::AlreadyClockedIn { date: day })
        }
        Some(record) => {
            // Blank row left behind by the materializer.
            store.set_clock_in(record.id, at).await?;
            Ok(())
        }
        None => {
            store.insert_clocked_day(employee_id, day, at).await?;
            Ok(())
        }
    }
}

/// Records a clock-out against the day's open clock-in.
pub async fn clock_out<S: LedgerStore>(
    store: &S,
    employee_id: u64,
    day: NaiveDate,
    at: NaiveTime,
) -> EngineResult<()> {
    let record = store.attendance_for_day(employee_id, day).await?;
    match record {
        Some(ref record) if record.clock_in.is_some() && record.clock_out.is_none() => {
            if !AttendanceRecord::times_ordered(record.clock_in, Some(at)) {
                return Err(ValidationError::InvertedTimeRange { date: day }.into());
            }
            store.set_clock_out(record.id, at).await?;
            Ok(())
        }
        _ => Err(EngineError::NotClockedIn { date: day }),
    }
}
