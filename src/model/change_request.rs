use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use super::status::RequestStatus;

/// A proposed correction to one attendance record, awaiting or having
/// received an approver's decision. Immutable once created; only `status`
/// changes, exactly once.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct ChangeRequest {
    pub id: u64,
    pub attendance_record_id: u64,
    pub requester_id: u64,
    pub approver_id: u64,
    /// Values on the record at submission time, kept for audit. Never
    /// recomputed after creation.
    pub original_clock_in: Option<NaiveTime>,
    pub original_clock_out: Option<NaiveTime>,
    pub requested_clock_in: NaiveTime,
    pub requested_clock_out: NaiveTime,
    pub reason: String,
    pub status: RequestStatus,
}

/// Insert shape produced by the submission factory.
#[derive(Debug, Clone)]
pub struct NewChangeRequest {
    pub attendance_record_id: u64,
    pub requester_id: u64,
    pub approver_id: u64,
    pub original_clock_in: Option<NaiveTime>,
    pub original_clock_out: Option<NaiveTime>,
    pub requested_clock_in: NaiveTime,
    pub requested_clock_out: NaiveTime,
    pub reason: String,
}
