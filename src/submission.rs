//! Change-request validator and factory: turns a proposed multi-day edit
//! into zero or more persisted pending change requests. Fail-fast over the
//! whole batch; nothing persists unless every row passes.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveTime;
use serde::Deserialize;
use thiserror::Error;

use crate::error::{EngineResult, ValidationError};
use crate::model::{AttendanceRecord, NewChangeRequest};
use crate::store::LedgerStore;

/// One row of the submission payload after parsing. `None` means the
/// field was left blank on the form.
#[derive(Debug, Clone)]
pub struct ProposedEdit {
    pub attendance_record_id: u64,
    pub clock_in: Option<NaiveTime>,
    pub clock_out: Option<NaiveTime>,
    pub note: Option<String>,
}

/// Raw form row shaped as `{recordId → {clock_in, clock_out, note}}`.
/// Blank strings mean "untouched".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EditForm {
    #[serde(default)]
    pub clock_in: String,
    #[serde(default)]
    pub clock_out: String,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditParseError {
    #[error("unparseable time '{value}' for record {record_id}")]
    BadTime { record_id: u64, value: String },
}

fn parse_time(record_id: u64, raw: &str) -> Result<Option<NaiveTime>, EditParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    NaiveTime::parse_from_str(trimmed, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M:%S"))
        .map(Some)
        .map_err(|_| EditParseError::BadTime {
            record_id,
            value: trimmed.to_string(),
        })
}

/// Builds the typed edit list from the form map. BTreeMap keeps record
/// iteration order stable, which validation errors depend on.
pub fn parse_edits(form: &BTreeMap<u64, EditForm>) -> Result<Vec<ProposedEdit>, EditParseError> {
    form.iter()
        .map(|(record_id, row)| {
            let note = row.note.trim();
            Ok(ProposedEdit {
                attendance_record_id: *record_id,
                clock_in: parse_time(*record_id, &row.clock_in)?,
                clock_out: parse_time(*record_id, &row.clock_out)?,
                note: if note.is_empty() {
                    None
                } else {
                    Some(note.to_string())
                },
            })
        })
        .collect()
}

/// Validates the whole batch and persists one pending change request per
/// genuinely-changed row, all in a single transaction. Returns the
/// created count.
///
/// Per-row checks, in iteration order: rows with both clocks blank are
/// skipped; rows with no net difference from the stored values are
/// skipped and not tallied; a genuine change with a blank note fails with
/// `MissingReason`; after filling untouched sides from the stored record,
/// the requested range must be strictly ordered or the row fails with
/// `InvertedTimeRange`. An empty tally after the full scan fails with
/// `NoChanges`. Rows naming records outside the requester's ledger are
/// skipped silently.
pub async fn submit_changes<S: LedgerStore>(
    store: &S,
    requester_id: u64,
    approver_id: Option<u64>,
    edits: &[ProposedEdit],
) -> EngineResult<u64> {
    let Some(approver_id) = approver_id else {
        return Err(ValidationError::MissingApprover.into());
    };

    let ids: Vec<u64> = edits.iter().map(|e| e.attendance_record_id).collect();
    let records = store.attendance_by_ids(&ids).await?;
    let by_id: HashMap<u64, &AttendanceRecord> = records
        .iter()
        .filter(|r| r.employee_id == requester_id)
        .map(|r| (r.id, r))
        .collect();

    let mut batch: Vec<NewChangeRequest> = Vec::new();

    for edit in edits {
        let Some(record) = by_id.get(&edit.attendance_record_id) else {
            continue;
        };

        if edit.clock_in.is_none() && edit.clock_out.is_none() {
            continue;
        }

        // Untouched sides inherit the record's current value.
        let requested_in = edit.clock_in.or(record.clock_in);
        let requested_out = edit.clock_out.or(record.clock_out);

        if requested_in == record.clock_in && requested_out == record.clock_out {
            continue;
        }

        if edit.note.as_deref().is_none_or(|n| n.trim().is_empty()) {
            return Err(ValidationError::MissingReason {
                date: record.work_date,
            }
            .into());
        }

        let (requested_in, requested_out) = match (requested_in, requested_out) {
            (Some(start), Some(end)) if end > start => (start, end),
            _ => {
                return Err(ValidationError::InvertedTimeRange {
                    date: record.work_date,
                }
                .into());
            }
        };

        batch.push(NewChangeRequest {
            attendance_record_id: record.id,
            requester_id,
            approver_id,
            original_clock_in: record.clock_in,
            original_clock_out: record.clock_out,
            requested_clock_in: requested_in,
            requested_clock_out: requested_out,
            reason: edit.note.clone().unwrap_or_default(),
        });
    }

    if batch.is_empty() {
        return Err(ValidationError::NoChanges.into());
    }

    let created = store.insert_change_requests(&batch).await?;
    tracing::info!(requester_id, approver_id, created, "change requests submitted");
    Ok(created)
}
