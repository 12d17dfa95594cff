use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// One employee's clocking for a single calendar day; the ledger's unit of
/// truth. Unique per (employee_id, work_date).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: u64,
    pub employee_id: u64,
    pub work_date: NaiveDate,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub note: Option<String>,
}

impl AttendanceRecord {
    /// A day counts as worked when both clocks are present.
    pub fn is_worked(&self) -> bool {
        self.clock_in.is_some() && self.clock_out.is_some()
    }

    /// Record invariant: when clock_out is present, it must be strictly
    /// after clock_in.
    pub fn times_ordered(clock_in: Option<NaiveTime>, clock_out: Option<NaiveTime>) -> bool {
        match (clock_in, clock_out) {
            (Some(start), Some(end)) => end > start,
            (_, None) => true,
            (None, Some(_)) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn worked_requires_both_clocks() {
        let mut rec = AttendanceRecord {
            id: 1,
            employee_id: 10,
            work_date: NaiveDate::from_ymd_opt(2025, 10, 1).unwrap(),
            clock_in: Some(t(9, 0)),
            clock_out: None,
            note: None,
        };
        assert!(!rec.is_worked());
        rec.clock_out = Some(t(18, 0));
        assert!(rec.is_worked());
    }

    #[test]
    fn ordering_invariant() {
        assert!(AttendanceRecord::times_ordered(Some(t(9, 0)), Some(t(18, 0))));
        assert!(AttendanceRecord::times_ordered(Some(t(9, 0)), None));
        assert!(AttendanceRecord::times_ordered(None, None));
        assert!(!AttendanceRecord::times_ordered(Some(t(18, 0)), Some(t(9, 0))));
        assert!(!AttendanceRecord::times_ordered(Some(t(9, 0)), Some(t(9, 0))));
        assert!(!AttendanceRecord::times_ordered(None, Some(t(18, 0))));
    }
}
