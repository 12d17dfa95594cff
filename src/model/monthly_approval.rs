use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::status::RequestStatus;

/// Per-employee-per-month sign-off gate. Coarser than per-day change
/// requests and never cascades into attendance records. Unique per
/// (employee_id, target_month); target_month is normalized to the first
/// day of the month.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct MonthlyApproval {
    pub id: u64,
    pub employee_id: u64,
    pub approver_id: u64,
    pub target_month: NaiveDate,
    pub status: RequestStatus,
    /// Stamped only by the approve transition.
    pub approved_at: Option<DateTime<Utc>>,
}
