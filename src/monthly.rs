//! Monthly approval aggregate: a per-employee-per-month sign-off gate
//! with its own pending/approved/rejected lifecycle. Purely a gate; it
//! never cascades into attendance records.

use chrono::{NaiveDate, Utc};

use crate::error::{EngineError, EngineResult, SelectionError, ValidationError};
use crate::materializer::{month_end, month_start};
use crate::model::{MonthlyApproval, RequestStatus};
use crate::store::{LedgerStore, MonthlyDecision};

/// Find-or-create the approval row for (employee, month), unconditionally
/// resetting it to pending with approved_at cleared and the approver
/// overwritten, even when a prior decision existed. The save is refused
/// with `NoAttendanceData` unless at least one attendance record in the
/// month carries a clock-in; nothing is persisted in that case.
pub async fn submit_or_resubmit<S: LedgerStore>(
    store: &S,
    employee_id: u64,
    target_month: NaiveDate,
    approver_id: u64,
) -> EngineResult<MonthlyApproval> {
    let from = month_start(target_month);
    let to = month_end(target_month);

    if !store.has_clock_in_between(employee_id, from, to).await? {
        return Err(ValidationError::NoAttendanceData.into());
    }

    let approval = store
        .upsert_monthly_approval(employee_id, from, approver_id)
        .await?;
    tracing::info!(employee_id, approver_id, month = %from, "monthly approval submitted");
    Ok(approval)
}

/// Decision transition for one pending approval. Approve is the only
/// path that stamps approved_at.
pub fn decide(
    approval: &MonthlyApproval,
    decision: RequestStatus,
) -> Result<MonthlyDecision, EngineError> {
    if approval.status.is_terminal() {
        return Err(EngineError::AlreadyResolved {
            request_id: approval.id,
        });
    }

    match decision {
        RequestStatus::Approved => Ok(MonthlyDecision {
            approval_id: approval.id,
            status: RequestStatus::Approved,
            approved_at: Some(Utc::now()),
        }),
        RequestStatus::Rejected => Ok(MonthlyDecision {
            approval_id: approval.id,
            status: RequestStatus::Rejected,
            approved_at: None,
        }),
        RequestStatus::Pending => Err(SelectionError::UndecidedSelection.into()),
    }
}
