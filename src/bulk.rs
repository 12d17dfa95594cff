//! Bulk decision processor: validates a batch of approver decisions and
//! applies them atomically, scoped to the acting approver. The same
//! selection/validation/atomicity contract covers change requests,
//! monthly approvals and leave requests.

use std::collections::HashMap;

use crate::decision::DecisionEntry;
use crate::error::{CascadeFailure, EngineResult, SelectionError};
use crate::materializer::{month_end, month_start};
use crate::model::{AttendanceRecord, ChangeRequest, RequestStatus};
use crate::store::{LeaveDecision, LedgerStore};
use crate::{monthly, transition};

/// Internal partition of a processed batch. Only the applied count is
/// meant for external callers; the skipped list exists so authorization
/// filtering stays observable in tests.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BulkOutcome {
    /// Request ids transitioned in this batch.
    pub applied: Vec<u64>,
    /// Selected ids that did not resolve under the acting approver's
    /// scope (wrong approver or already consumed). Never surfaced as an
    /// error to avoid leaking cross-approver existence.
    pub skipped: Vec<u64>,
}

impl BulkOutcome {
    pub fn applied_count(&self) -> usize {
        self.applied.len()
    }
}

/// Batch preconditions, checked before any transaction opens: at least
/// one selected row, and no selected row left at pending.
fn screen(entries: &[DecisionEntry]) -> Result<Vec<DecisionEntry>, SelectionError> {
    let picked: Vec<DecisionEntry> = entries.iter().copied().filter(|e| e.selected).collect();
    if picked.is_empty() {
        return Err(SelectionError::NoSelection);
    }
    if picked
        .iter()
        .any(|e| e.decision == RequestStatus::Pending)
    {
        return Err(SelectionError::UndecidedSelection);
    }
    Ok(picked)
}

/// Applies a batch of decisions over change requests. Every resolved row
/// runs the approval state machine; approved cascades land on the linked
/// attendance records in the same transaction. A single cascade failure
/// aborts the whole batch with zero writes.
pub async fn decide_change_requests<S: LedgerStore>(
    store: &S,
    acting_approver_id: u64,
    entries: &[DecisionEntry],
) -> EngineResult<BulkOutcome> {
    let picked = screen(entries)?;
    let ids: Vec<u64> = picked.iter().map(|e| e.request_id).collect();

    let requests = store
        .pending_change_requests(&ids, acting_approver_id)
        .await?;
    let mut requests_by_id: HashMap<u64, &ChangeRequest> =
        requests.iter().map(|r| (r.id, r)).collect();

    let record_ids: Vec<u64> = requests.iter().map(|r| r.attendance_record_id).collect();
    let records = store.attendance_by_ids(&record_ids).await?;
    let records_by_id: HashMap<u64, &AttendanceRecord> =
        records.iter().map(|r| (r.id, r)).collect();

    let mut outcome = BulkOutcome::default();
    let mut decisions = Vec::with_capacity(picked.len());

    for entry in &picked {
        // remove(): each row is consumable once per batch, so a duplicate
        // id cannot transition twice off the same snapshot.
        let Some(request) = requests_by_id.remove(&entry.request_id) else {
            outcome.skipped.push(entry.request_id);
            continue;
        };
        let record = records_by_id
            .get(&request.attendance_record_id)
            .ok_or_else(|| {
                crate::store::StoreError::Constraint(format!(
                    "change request {} references missing attendance {}",
                    request.id, request.attendance_record_id
                ))
            })?;

        decisions.push(transition::decide(request, record, entry.decision)?);
        outcome.applied.push(entry.request_id);
    }

    store.commit_change_decisions(&decisions).await?;
    tracing::info!(
        approver_id = acting_approver_id,
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "change request batch processed"
    );
    Ok(outcome)
}

/// Bulk decisions over monthly approvals. Approval stamps approved_at and
/// re-validates the month's has-clock-in invariant as its cascade check;
/// a violation rolls back the whole batch. Never touches attendance rows.
pub async fn decide_monthly_approvals<S: LedgerStore>(
    store: &S,
    acting_approver_id: u64,
    entries: &[DecisionEntry],
) -> EngineResult<BulkOutcome> {
    let picked = screen(entries)?;
    let ids: Vec<u64> = picked.iter().map(|e| e.request_id).collect();

    let approvals = store
        .pending_monthly_approvals(&ids, acting_approver_id)
        .await?;
    let mut by_id: HashMap<u64, _> = approvals.iter().map(|m| (m.id, m)).collect();

    let mut outcome = BulkOutcome::default();
    let mut decisions = Vec::with_capacity(picked.len());

    for entry in &picked {
        // Duplicate ids consume the row on first use; later occurrences skip.
        let Some(approval) = by_id.remove(&entry.request_id) else {
            outcome.skipped.push(entry.request_id);
            continue;
        };

        if entry.decision == RequestStatus::Approved {
            let from = month_start(approval.target_month);
            let to = month_end(approval.target_month);
            let has_data = store
                .has_clock_in_between(approval.employee_id, from, to)
                .await?;
            if !has_data {
                return Err(CascadeFailure {
                    request_id: approval.id,
                    date: approval.target_month,
                }
                .into());
            }
        }

        decisions.push(monthly::decide(approval, entry.decision)?);
        outcome.applied.push(entry.request_id);
    }

    store.commit_monthly_decisions(&decisions).await?;
    tracing::info!(
        approver_id = acting_approver_id,
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "monthly approval batch processed"
    );
    Ok(outcome)
}

/// Bulk decisions over leave requests: the same contract with no cascade
/// target at all.
pub async fn decide_leave_requests<S: LedgerStore>(
    store: &S,
    acting_approver_id: u64,
    entries: &[DecisionEntry],
) -> EngineResult<BulkOutcome> {
    let picked = screen(entries)?;
    let ids: Vec<u64> = picked.iter().map(|e| e.request_id).collect();

    let requests = store
        .pending_leave_requests(&ids, acting_approver_id)
        .await?;
    let mut by_id: HashMap<u64, _> = requests.iter().map(|r| (r.id, r)).collect();

    let mut outcome = BulkOutcome::default();
    let mut decisions = Vec::with_capacity(picked.len());

    for entry in &picked {
        // Duplicate ids consume the row on first use; later occurrences skip.
        let Some(request) = by_id.remove(&entry.request_id) else {
            outcome.skipped.push(entry.request_id);
            continue;
        };
        decisions.push(LeaveDecision {
            request_id: request.id,
            status: entry.decision,
        });
        outcome.applied.push(entry.request_id);
    }

    store.commit_leave_decisions(&decisions).await?;
    tracing::info!(
        approver_id = acting_approver_id,
        applied = outcome.applied.len(),
        skipped = outcome.skipped.len(),
        "leave request batch processed"
    );
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(request_id: u64, selected: bool, decision: RequestStatus) -> DecisionEntry {
        DecisionEntry {
            request_id,
            selected,
            decision,
        }
    }

    #[test]
    fn screen_rejects_empty_selection() {
        let entries = vec![
            entry(1, false, RequestStatus::Approved),
            entry(2, false, RequestStatus::Rejected),
        ];
        assert_eq!(screen(&entries).unwrap_err(), SelectionError::NoSelection);
        assert_eq!(screen(&[]).unwrap_err(), SelectionError::NoSelection);
    }

    #[test]
    fn screen_rejects_undecided_selected_rows() {
        let entries = vec![
            entry(1, true, RequestStatus::Approved),
            entry(2, true, RequestStatus::Pending),
        ];
        assert_eq!(
            screen(&entries).unwrap_err(),
            SelectionError::UndecidedSelection
        );
    }

    #[test]
    fn screen_keeps_only_selected_rows() {
        let entries = vec![
            entry(1, true, RequestStatus::Approved),
            entry(2, false, RequestStatus::Pending),
            entry(3, true, RequestStatus::Rejected),
        ];
        let picked = screen(&entries).unwrap();
        assert_eq!(
            picked.iter().map(|e| e.request_id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }
}
