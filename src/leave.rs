//! Leave applications: filed here, decided through the bulk processor
//! like every other request kind.

use crate::error::{EngineResult, ValidationError};
use crate::store::{LedgerStore, NewLeaveRequest};

/// Files a pending leave application routed to an approver. The date
/// range must not be inverted.
pub async fn submit_leave<S: LedgerStore>(store: &S, request: NewLeaveRequest) -> EngineResult<u64> {
    if request.start_date > request.end_date {
        return Err(ValidationError::InvertedDateRange {
            start: request.start_date,
            end: request.end_date,
        }
        .into());
    }

    let id = store.insert_leave_request(&request).await?;
    tracing::info!(
        employee_id = request.employee_id,
        approver_id = request.approver_id,
        leave_id = id,
        "leave request submitted"
    );
    Ok(id)
}
