//! In-process store used by the test suite. Mirrors the MySQL store's
//! guarantees: (employee, day) and (employee, month) uniqueness, approver
//! scoping, and all-or-nothing decision commits (staged on a copy, swapped
//! in only when every row passes).

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};

use crate::model::{
    AttendanceRecord, ChangeRequest, LeaveRequest, MonthlyApproval, NewChangeRequest,
    RequestStatus,
};

use super::{
    ChangeDecision, LeaveDecision, LedgerStore, MonthlyDecision, NewLeaveRequest, StoreError,
};

#[derive(Debug, Default, Clone)]
struct Tables {
    attendance: Vec<AttendanceRecord>,
    change_requests: Vec<ChangeRequest>,
    monthly_approvals: Vec<MonthlyApproval>,
    leave_requests: Vec<LeaveRequest>,
    next_id: u64,
}

impl Tables {
    fn alloc_id(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seeds a fully-specified attendance row, bypassing engine checks.
    pub fn seed_attendance(
        &self,
        employee_id: u64,
        work_date: NaiveDate,
        clock_in: Option<NaiveTime>,
        clock_out: Option<NaiveTime>,
        note: Option<&str>,
    ) -> u64 {
        let mut tables = self.lock();
        let id = tables.alloc_id();
        tables.attendance.push(AttendanceRecord {
            id,
            employee_id,
            work_date,
            clock_in,
            clock_out,
            note: note.map(str::to_owned),
        });
        id
    }

    /// Seeds a change request in any state, bypassing the factory. Lets
    /// tests stage rows the validator would have refused.
    pub fn seed_change_request(&self, request: NewChangeRequest, status: RequestStatus) -> u64 {
        let mut tables = self.lock();
        let id = tables.alloc_id();
        tables.change_requests.push(ChangeRequest {
            id,
            attendance_record_id: request.attendance_record_id,
            requester_id: request.requester_id,
            approver_id: request.approver_id,
            original_clock_in: request.original_clock_in,
            original_clock_out: request.original_clock_out,
            requested_clock_in: request.requested_clock_in,
            requested_clock_out: request.requested_clock_out,
            reason: request.reason,
            status,
        });
        id
    }

    pub fn attendance(&self, id: u64) -> Option<AttendanceRecord> {
        self.lock().attendance.iter().find(|r| r.id == id).cloned()
    }

    pub fn change_request(&self, id: u64) -> Option<ChangeRequest> {
        self.lock()
            .change_requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn change_requests_for_record(&self, attendance_record_id: u64) -> Vec<ChangeRequest> {
        self.lock()
            .change_requests
            .iter()
            .filter(|r| r.attendance_record_id == attendance_record_id)
            .cloned()
            .collect()
    }

    pub fn monthly_approval(&self, id: u64) -> Option<MonthlyApproval> {
        self.lock()
            .monthly_approvals
            .iter()
            .find(|m| m.id == id)
            .cloned()
    }

    pub fn leave_request(&self, id: u64) -> Option<LeaveRequest> {
        self.lock()
            .leave_requests
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn attendance_for_range(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<_> = self
            .lock()
            .attendance
            .iter()
            .filter(|r| r.employee_id == employee_id && r.work_date >= from && r.work_date <= to)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.work_date);
        Ok(records)
    }

    async fn attendance_by_ids(&self, ids: &[u64]) -> Result<Vec<AttendanceRecord>, StoreError> {
        let mut records: Vec<_> = self
            .lock()
            .attendance
            .iter()
            .filter(|r| ids.contains(&r.id))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.work_date);
        Ok(records)
    }

    async fn attendance_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        Ok(self
            .lock()
            .attendance
            .iter()
            .find(|r| r.employee_id == employee_id && r.work_date == day)
            .cloned())
    }

    async fn insert_blank_days(
        &self,
        employee_id: u64,
        days: &[NaiveDate],
    ) -> Result<u64, StoreError> {
        let mut tables = self.lock();
        for day in days {
            if tables
                .attendance
                .iter()
                .any(|r| r.employee_id == employee_id && r.work_date == *day)
            {
                return Err(StoreError::Constraint(format!(
                    "duplicate attendance for employee {employee_id} on {day}"
                )));
            }
        }
        for day in days {
            let id = tables.alloc_id();
            tables.attendance.push(AttendanceRecord {
                id,
                employee_id,
                work_date: *day,
                clock_in: None,
                clock_out: None,
                note: None,
            });
        }
        Ok(days.len() as u64)
    }

    async fn has_clock_in_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<bool, StoreError> {
        Ok(self.lock().attendance.iter().any(|r| {
            r.employee_id == employee_id
                && r.work_date >= from
                && r.work_date <= to
                && r.clock_in.is_some()
        }))
    }

    async fn insert_clocked_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
        clock_in: NaiveTime,
    ) -> Result<AttendanceRecord, StoreError> {
        let mut tables = self.lock();
        if tables
            .attendance
            .iter()
            .any(|r| r.employee_id == employee_id && r.work_date == day)
        {
            return Err(StoreError::Constraint(format!(
                "duplicate attendance for employee {employee_id} on {day}"
            )));
        }
        let id = tables.alloc_id();
        let record = AttendanceRecord {
            id,
            employee_id,
            work_date: day,
            clock_in: Some(clock_in),
            clock_out: None,
            note: None,
        };
        tables.attendance.push(record.clone());
        Ok(record)
    }

    async fn set_clock_in(&self, record_id: u64, at: NaiveTime) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let record = tables
            .attendance
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| StoreError::Constraint(format!("unknown attendance {record_id}")))?;
        record.clock_in = Some(at);
        Ok(())
    }

    async fn set_clock_out(&self, record_id: u64, at: NaiveTime) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let record = tables
            .attendance
            .iter_mut()
            .find(|r| r.id == record_id)
            .ok_or_else(|| StoreError::Constraint(format!("unknown attendance {record_id}")))?;
        record.clock_out = Some(at);
        Ok(())
    }

    async fn insert_change_requests(
        &self,
        batch: &[NewChangeRequest],
    ) -> Result<u64, StoreError> {
        let mut tables = self.lock();
        for request in batch {
            let id = tables.alloc_id();
            tables.change_requests.push(ChangeRequest {
                id,
                attendance_record_id: request.attendance_record_id,
                requester_id: request.requester_id,
                approver_id: request.approver_id,
                original_clock_in: request.original_clock_in,
                original_clock_out: request.original_clock_out,
                requested_clock_in: request.requested_clock_in,
                requested_clock_out: request.requested_clock_out,
                reason: request.reason.clone(),
                status: RequestStatus::Pending,
            });
        }
        Ok(batch.len() as u64)
    }

    async fn pending_change_requests(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<ChangeRequest>, StoreError> {
        Ok(self
            .lock()
            .change_requests
            .iter()
            .filter(|r| {
                ids.contains(&r.id)
                    && r.approver_id == approver_id
                    && r.status == RequestStatus::Pending
            })
            .cloned()
            .collect())
    }

    async fn commit_change_decisions(
        &self,
        decisions: &[ChangeDecision],
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let mut staged = tables.clone();

        for decision in decisions {
            let request = staged
                .change_requests
                .iter_mut()
                .find(|r| r.id == decision.request_id)
                .ok_or_else(|| {
                    StoreError::Constraint(format!("unknown request {}", decision.request_id))
                })?;
            if request.status.is_terminal() {
                return Err(StoreError::Constraint(format!(
                    "request {} is no longer pending",
                    decision.request_id
                )));
            }
            request.status = decision.status;

            if let Some(cascade) = &decision.cascade {
                if !AttendanceRecord::times_ordered(Some(cascade.clock_in), Some(cascade.clock_out))
                {
                    return Err(StoreError::Constraint(format!(
                        "clock ordering violated on attendance {}",
                        cascade.attendance_record_id
                    )));
                }
                let record = staged
                    .attendance
                    .iter_mut()
                    .find(|r| r.id == cascade.attendance_record_id)
                    .ok_or_else(|| {
                        StoreError::Constraint(format!(
                            "unknown attendance {}",
                            cascade.attendance_record_id
                        ))
                    })?;
                record.clock_in = Some(cascade.clock_in);
                record.clock_out = Some(cascade.clock_out);
                record.note = Some(cascade.note.clone());
            }
        }

        *tables = staged;
        Ok(())
    }

    async fn upsert_monthly_approval(
        &self,
        employee_id: u64,
        target_month: NaiveDate,
        approver_id: u64,
    ) -> Result<MonthlyApproval, StoreError> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .monthly_approvals
            .iter_mut()
            .find(|m| m.employee_id == employee_id && m.target_month == target_month)
        {
            existing.approver_id = approver_id;
            existing.status = RequestStatus::Pending;
            existing.approved_at = None;
            return Ok(existing.clone());
        }

        let id = tables.alloc_id();
        let approval = MonthlyApproval {
            id,
            employee_id,
            approver_id,
            target_month,
            status: RequestStatus::Pending,
            approved_at: None,
        };
        tables.monthly_approvals.push(approval.clone());
        Ok(approval)
    }

    async fn pending_monthly_approvals(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<MonthlyApproval>, StoreError> {
        Ok(self
            .lock()
            .monthly_approvals
            .iter()
            .filter(|m| {
                ids.contains(&m.id)
                    && m.approver_id == approver_id
                    && m.status == RequestStatus::Pending
            })
            .cloned()
            .collect())
    }

    async fn commit_monthly_decisions(
        &self,
        decisions: &[MonthlyDecision],
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let mut staged = tables.clone();

        for decision in decisions {
            let approval = staged
                .monthly_approvals
                .iter_mut()
                .find(|m| m.id == decision.approval_id)
                .ok_or_else(|| {
                    StoreError::Constraint(format!(
                        "unknown monthly approval {}",
                        decision.approval_id
                    ))
                })?;
            if approval.status.is_terminal() {
                return Err(StoreError::Constraint(format!(
                    "monthly approval {} is no longer pending",
                    decision.approval_id
                )));
            }
            approval.status = decision.status;
            approval.approved_at = decision.approved_at;
        }

        *tables = staged;
        Ok(())
    }

    async fn insert_leave_request(&self, request: &NewLeaveRequest) -> Result<u64, StoreError> {
        let mut tables = self.lock();
        let id = tables.alloc_id();
        tables.leave_requests.push(LeaveRequest {
            id,
            employee_id: request.employee_id,
            approver_id: request.approver_id,
            start_date: request.start_date,
            end_date: request.end_date,
            leave_type: request.leave_type,
            status: RequestStatus::Pending,
        });
        Ok(id)
    }

    async fn pending_leave_requests(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        Ok(self
            .lock()
            .leave_requests
            .iter()
            .filter(|r| {
                ids.contains(&r.id)
                    && r.approver_id == approver_id
                    && r.status == RequestStatus::Pending
            })
            .cloned()
            .collect())
    }

    async fn commit_leave_decisions(
        &self,
        decisions: &[LeaveDecision],
    ) -> Result<(), StoreError> {
        let mut tables = self.lock();
        let mut staged = tables.clone();

        for decision in decisions {
            let request = staged
                .leave_requests
                .iter_mut()
                .find(|r| r.id == decision.request_id)
                .ok_or_else(|| {
                    StoreError::Constraint(format!(
                        "unknown leave request {}",
                        decision.request_id
                    ))
                })?;
            if request.status.is_terminal() {
                return Err(StoreError::Constraint(format!(
                    "leave request {} is no longer pending",
                    decision.request_id
                )));
            }
            request.status = decision.status;
        }

        *tables = staged;
        Ok(())
    }
}
