//! Approval state machine for a single change request: pending →
//! approved | rejected, terminal. Pure; the caller commits the produced
//! decision through the store.

use crate::error::{CascadeFailure, EngineError, SelectionError};
use crate::model::{AttendanceRecord, ChangeRequest, RequestStatus};
use crate::store::{AttendanceCascade, ChangeDecision};

/// Applies one decision to a pending request. On approve, the requested
/// times and reason cascade onto the linked attendance record, and the
/// record's ordering invariant is re-validated here; a violation aborts
/// the transition as a `CascadeFailure`. On reject, only the status
/// changes. A terminal request yields `AlreadyResolved`.
pub fn decide(
    request: &ChangeRequest,
    record: &AttendanceRecord,
    decision: RequestStatus,
) -> Result<ChangeDecision, EngineError> {
    if request.status.is_terminal() {
        return Err(EngineError::AlreadyResolved {
            request_id: request.id,
        });
    }

    match decision {
        RequestStatus::Approved => {
            if !AttendanceRecord::times_ordered(
                Some(request.requested_clock_in),
                Some(request.requested_clock_out),
            ) {
                return Err(CascadeFailure {
                    request_id: request.id,
                    date: record.work_date,
                }
                .into());
            }
            Ok(ChangeDecision {
                request_id: request.id,
                status: RequestStatus::Approved,
                cascade: Some(AttendanceCascade {
                    attendance_record_id: record.id,
                    clock_in: request.requested_clock_in,
                    clock_out: request.requested_clock_out,
                    note: request.reason.clone(),
                }),
            })
        }
        RequestStatus::Rejected => Ok(ChangeDecision {
            request_id: request.id,
            status: RequestStatus::Rejected,
            cascade: None,
        }),
        // Screened out by the bulk preconditions; kept as a typed error
        // for direct callers.
        RequestStatus::Pending => Err(SelectionError::UndecidedSelection.into()),
    }
}
