use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::MySqlPool;

use crate::model::{AttendanceRecord, ChangeRequest, LeaveRequest, MonthlyApproval, NewChangeRequest};

use super::{
    ChangeDecision, LeaveDecision, LedgerStore, MonthlyDecision, NewLeaveRequest, StoreError,
};

/// Production store over MySQL. All multi-row writes run inside a single
/// transaction; lookups scoped by approver happen in one query.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

/// Builds the `?, ?, ...` list for a dynamic IN clause.
fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

#[async_trait]
impl LedgerStore for MySqlStore {
    async fn attendance_for_range(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<AttendanceRecord>, StoreError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, work_date, clock_in, clock_out, note
            FROM attendance_records
            WHERE employee_id = ? AND work_date BETWEEN ? AND ?
            ORDER BY work_date
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn attendance_by_ids(&self, ids: &[u64]) -> Result<Vec<AttendanceRecord>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT id, employee_id, work_date, clock_in, clock_out, note
            FROM attendance_records
            WHERE id IN ({})
            ORDER BY work_date
            "#,
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, AttendanceRecord>(&sql);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn attendance_for_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, StoreError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT id, employee_id, work_date, clock_in, clock_out, note
            FROM attendance_records
            WHERE employee_id = ? AND work_date = ?
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }

    async fn insert_blank_days(
        &self,
        employee_id: u64,
        days: &[NaiveDate],
    ) -> Result<u64, StoreError> {
        if days.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        for day in days {
            sqlx::query(
                r#"
                INSERT INTO attendance_records (employee_id, work_date)
                VALUES (?, ?)
                "#,
            )
            .bind(employee_id)
            .bind(day)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(days.len() as u64)
    }

    async fn has_clock_in_between(
        &self,
        employee_id: u64,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<bool, StoreError> {
        let found: i64 = sqlx::query_scalar(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM attendance_records
                WHERE employee_id = ? AND work_date BETWEEN ? AND ?
                AND clock_in IS NOT NULL
            )
            "#,
        )
        .bind(employee_id)
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await?;

        Ok(found != 0)
    }

    async fn insert_clocked_day(
        &self,
        employee_id: u64,
        day: NaiveDate,
        clock_in: NaiveTime,
    ) -> Result<AttendanceRecord, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance_records (employee_id, work_date, clock_in)
            VALUES (?, ?, ?)
            "#,
        )
        .bind(employee_id)
        .bind(day)
        .bind(clock_in)
        .execute(&self.pool)
        .await?;

        Ok(AttendanceRecord {
            id: result.last_insert_id(),
            employee_id,
            work_date: day,
            clock_in: Some(clock_in),
            clock_out: None,
            note: None,
        })
    }

    async fn set_clock_in(&self, record_id: u64, at: NaiveTime) -> Result<(), StoreError> {
        sqlx::query("UPDATE attendance_records SET clock_in = ? WHERE id = ?")
            .bind(at)
            .bind(record_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn set_clock_out(&self, record_id: u64, at: NaiveTime) -> Result<(), StoreError> {
        sqlx::query("UPDATE attendance_records SET clock_out = ? WHERE id = ?")
            .bind(at)
            .bind(record_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn insert_change_requests(
        &self,
        batch: &[NewChangeRequest],
    ) -> Result<u64, StoreError> {
        let mut tx = self.pool.begin().await?;
        for request in batch {
            sqlx::query(
                r#"
                INSERT INTO change_requests
                    (attendance_record_id, requester_id, approver_id,
                     original_clock_in, original_clock_out,
                     requested_clock_in, requested_clock_out, reason, status)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'pending')
                "#,
            )
            .bind(request.attendance_record_id)
            .bind(request.requester_id)
            .bind(request.approver_id)
            .bind(request.original_clock_in)
            .bind(request.original_clock_out)
            .bind(request.requested_clock_in)
            .bind(request.requested_clock_out)
            .bind(&request.reason)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        Ok(batch.len() as u64)
    }

    async fn pending_change_requests(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<ChangeRequest>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT id, attendance_record_id, requester_id, approver_id,
                   original_clock_in, original_clock_out,
                   requested_clock_in, requested_clock_out, reason, status
            FROM change_requests
            WHERE approver_id = ? AND status = 'pending' AND id IN ({})
            "#,
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, ChangeRequest>(&sql).bind(approver_id);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn commit_change_decisions(
        &self,
        decisions: &[ChangeDecision],
    ) -> Result<(), StoreError> {
        if decisions.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for decision in decisions {
            // Guarded on pending so a row consumed between lookup and
            // commit fails the batch instead of transitioning twice.
            let result =
                sqlx::query("UPDATE change_requests SET status = ? WHERE id = ? AND status = 'pending'")
                    .bind(decision.status)
                    .bind(decision.request_id)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::Constraint(format!(
                    "request {} is no longer pending",
                    decision.request_id
                )));
            }

            if let Some(cascade) = &decision.cascade {
                sqlx::query(
                    r#"
                    UPDATE attendance_records
                    SET clock_in = ?, clock_out = ?, note = ?
                    WHERE id = ?
                    "#,
                )
                .bind(cascade.clock_in)
                .bind(cascade.clock_out)
                .bind(&cascade.note)
                .bind(cascade.attendance_record_id)
                .execute(&mut *tx)
                .await?;
            }
        }
        tx.commit().await?;

        Ok(())
    }

    async fn upsert_monthly_approval(
        &self,
        employee_id: u64,
        target_month: NaiveDate,
        approver_id: u64,
    ) -> Result<MonthlyApproval, StoreError> {
        // One transaction, so the row read back cannot reflect a
        // concurrent resubmission.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO monthly_approvals
                (employee_id, target_month, approver_id, status, approved_at)
            VALUES (?, ?, ?, 'pending', NULL)
            ON DUPLICATE KEY UPDATE
                approver_id = VALUES(approver_id),
                status = 'pending',
                approved_at = NULL
            "#,
        )
        .bind(employee_id)
        .bind(target_month)
        .bind(approver_id)
        .execute(&mut *tx)
        .await?;

        let approval = sqlx::query_as::<_, MonthlyApproval>(
            r#"
            SELECT id, employee_id, approver_id, target_month, status, approved_at
            FROM monthly_approvals
            WHERE employee_id = ? AND target_month = ?
            "#,
        )
        .bind(employee_id)
        .bind(target_month)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(approval)
    }

    async fn pending_monthly_approvals(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<MonthlyApproval>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT id, employee_id, approver_id, target_month, status, approved_at
            FROM monthly_approvals
            WHERE approver_id = ? AND status = 'pending' AND id IN ({})
            "#,
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, MonthlyApproval>(&sql).bind(approver_id);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn commit_monthly_decisions(
        &self,
        decisions: &[MonthlyDecision],
    ) -> Result<(), StoreError> {
        if decisions.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for decision in decisions {
            let result = sqlx::query(
                "UPDATE monthly_approvals SET status = ?, approved_at = ? WHERE id = ? AND status = 'pending'",
            )
            .bind(decision.status)
            .bind(decision.approved_at)
            .bind(decision.approval_id)
            .execute(&mut *tx)
            .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::Constraint(format!(
                    "monthly approval {} is no longer pending",
                    decision.approval_id
                )));
            }
        }
        tx.commit().await?;

        Ok(())
    }

    async fn insert_leave_request(&self, request: &NewLeaveRequest) -> Result<u64, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO leave_requests
                (employee_id, approver_id, start_date, end_date, leave_type, status)
            VALUES (?, ?, ?, ?, ?, 'pending')
            "#,
        )
        .bind(request.employee_id)
        .bind(request.approver_id)
        .bind(request.start_date)
        .bind(request.end_date)
        .bind(request.leave_type)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_id())
    }

    async fn pending_leave_requests(
        &self,
        ids: &[u64],
        approver_id: u64,
    ) -> Result<Vec<LeaveRequest>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let sql = format!(
            r#"
            SELECT id, employee_id, approver_id, start_date, end_date, leave_type, status
            FROM leave_requests
            WHERE approver_id = ? AND status = 'pending' AND id IN ({})
            "#,
            placeholders(ids.len())
        );

        let mut query = sqlx::query_as::<_, LeaveRequest>(&sql).bind(approver_id);
        for id in ids {
            query = query.bind(*id);
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn commit_leave_decisions(
        &self,
        decisions: &[LeaveDecision],
    ) -> Result<(), StoreError> {
        if decisions.is_empty() {
            return Ok(());
        }

        let mut tx = self.pool.begin().await?;
        for decision in decisions {
            let result =
                sqlx::query("UPDATE leave_requests SET status = ? WHERE id = ? AND status = 'pending'")
                    .bind(decision.status)
                    .bind(decision.request_id)
                    .execute(&mut *tx)
                    .await?;
            if result.rows_affected() == 0 {
                return Err(StoreError::Constraint(format!(
                    "leave request {} is no longer pending",
                    decision.request_id
                )));
            }
        }
        tx.commit().await?;

        Ok(())
    }
}
