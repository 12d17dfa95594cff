use chrono::NaiveDate;
use thiserror::Error;

use crate::store::StoreError;

/// Submission-path failures. Raised before anything is persisted and
/// carrying enough context to render one message per offending day.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("an approver must be selected before submitting changes")]
    MissingApprover,

    #[error("no changes found in the submitted rows")]
    NoChanges,

    #[error("a reason is required for the change on {date}")]
    MissingReason { date: NaiveDate },

    #[error("requested clock-out must be after requested clock-in on {date}")]
    InvertedTimeRange { date: NaiveDate },

    #[error("no attendance with a clock-in exists in the target month")]
    NoAttendanceData,

    #[error("start date {start} is after end date {end}")]
    InvertedDateRange { start: NaiveDate, end: NaiveDate },
}

/// Bulk-batch precondition failures. Raised before the decision
/// transaction opens; the whole batch is blocked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no rows were selected")]
    NoSelection,

    #[error("a selected row was left undecided")]
    UndecidedSelection,
}

/// A decision's cascade violated a record invariant mid-batch. The whole
/// batch rolls back; this names the first offending row.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("decision on request {request_id} ({date}) violates the attendance invariant")]
pub struct CascadeFailure {
    pub request_id: u64,
    pub date: NaiveDate,
}

/// Umbrella error for every engine entry point. Nothing in the engine
/// panics; the worst outcome is zero rows applied with the reason here.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Cascade(#[from] CascadeFailure),

    #[error("request {request_id} has already been resolved")]
    AlreadyResolved { request_id: u64 },

    #[error("already clocked in on {date}")]
    AlreadyClockedIn { date: NaiveDate },

    #[error("no open clock-in on {date}")]
    NotClockedIn { date: NaiveDate },

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EngineResult<T> = Result<T, EngineError>;
