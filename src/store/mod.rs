//! Persistence seam for the engine. `MySqlStore` is the production
//! implementation; `MemoryStore` backs the test suite with the same
//! uniqueness and atomicity guarantees.

pub mod memory;
pub mod mysql;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use thiserror::Error;

use crate::model::{
    AttendanceRecord, ChangeRequest, LeaveRequest, MonthlyApproval, NewChangeRequest,
    RequestStatus, leave_request::LeaveType,
};

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),

    /// A uniqueness or ordering constraint rejected the write.
    #[error("constraint violated: {0}")]
    Constraint(String),
}

/// One committed decision against a change request, with the attendance
/// cascade already resolved by the state machine.
#[derive(Debug, Clone)]
pub struct ChangeDecision {
    pub request_id: u64,
    pub status: RequestStatus,
    pub cascade: Option<AttendanceCascade>,
}

/// Approved values to write onto the linked attendance record in the
/// same transaction as the status update.
#[derive(Debug, Clone)]
pub struct AttendanceCascade {
    pub attendance_record_id: u64,
    pub clock_in: NaiveTime,
    pub clock_out: NaiveTime,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct MonthlyDecision {
    pub approval_id: u64,
    pub status: RequestStatus,
    pub approved_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone)]
pub struct LeaveDecision {
    pub request_id: u64,
    pub status: RequestStatus,
}

#[derive(Debug, Clone)]
pub struct NewLeaveRequest {
    pub employee_id: u64,
    pub approver_id: u64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub leave_type: LeaveType,
}

/// Storage contract required by the engine: transactional multi-row
/// writes, (employee, day) and (employee, month) uniqueness, and pending
/// lookups scoped by approver in one query.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    // Attendance ledger
    async fn attendance_for_range(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn attendance_by_ids(&self, ids: &[u64]) -> Result<Vec<AttendanceRecord>, StoreError>;

    async fn attendance_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError>;

    /// Creates blank records for the given days in one transaction.
    async fn insert_blank_days(
        &self,
        employee_id: u64,
        days: &[NaiveDate],
    ) -> Result<u64, StoreError>;

    async fn has_clock_in_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<bool, StoreError>;

    async fn insert_clocked_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
        clock_in: NaiveTime,
    ) -> Result<AttendanceRecord, StoreError>;

    async fn set_clock_in(&self, record_id: u64, at: NaiveTime) -> Result<(), StoreError>;

    async fn set_clock_out(&self, record_id: u64, at: NaiveTime) -> Result<(), StoreError>;

    // Change requests
    async fn insert_change_requests(
        &self,
        batch: &[NewChangeRequest],
    ) -> Result<u64, StoreError>;

    /// Pending requests among `ids` that belong to `approver_id`. Rows
    /// outside this scope are simply absent from the result.
    async fn pending_change_requests(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<ChangeRequest>, StoreError>;

    /// Applies a batch of decisions atomically: either every status
    /// update and cascade lands, or none do.
    async fn commit_change_decisions(
        &self,
        decisions: &[ChangeDecision],
    ) -> Result<(), StoreError>;

    // Monthly approvals
    /// Find-or-create with reset: status back to pending, approved_at
    /// cleared, approver overwritten.
    async fn upsert_monthly_approval(
        &self,
        employee_id: u64,
        target_month: NaiveDate,
        approver_id: u64,
    ) -> Result<MonthlyApproval, StoreError>;

    async fn pending_monthly_approvals(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<MonthlyApproval>, StoreError>;

    async fn commit_monthly_decisions(
        &self,
        decisions: &[MonthlyDecision],
    ) -> Result<(), StoreError>;

    // Leave requests
    async fn insert_leave_request(&self, request: &NewLeaveRequest) -> Result<u64, StoreError>;

    async fn pending_leave_requests(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError>;

    async fn commit_leave_decisions(&self, decisions: &[LeaveDecision])
    -> Result<(), StoreError>;
}
