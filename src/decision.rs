//! Typed decision entries built from the approver's form payload before
//! anything reaches the bulk processor. The raw map is shaped as
//! `{id → {selected: "0"|"1", status: "pending"|"approved"|"rejected"}}`.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::Deserialize;
use thiserror::Error;

use crate::model::RequestStatus;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DecisionForm {
    #[serde(default)]
    pub selected: String,
    #[serde(default)]
    pub status: String,
}

/// One pre-validated row of a bulk submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionEntry {
    pub request_id: u64,
    pub selected: bool,
    pub decision: RequestStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecisionParseError {
    #[error("unknown decision status '{value}' for request {request_id}")]
    UnknownStatus { request_id: u64, value: String },
}

/// Builds the entry list in stable id order. Only "1" marks a row
/// selected; anything else is an unticked checkbox.
pub fn parse_entries(
    form: &BTreeMap<u64, DecisionForm>,
) -> Result<Vec<DecisionEntry>, DecisionParseError> {
    form.iter()
        .map(|(request_id, row)| {
            let decision = RequestStatus::from_str(row.status.trim()).map_err(|_| {
                DecisionParseError::UnknownStatus {
                    request_id: *request_id,
                    value: row.status.clone(),
                }
            })?;
            Ok(DecisionEntry {
                request_id: *request_id,
                selected: row.selected.trim() == "1",
                decision,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(selected: &str, status: &str) -> DecisionForm {
        DecisionForm {
            selected: selected.to_string(),
            status: status.to_string(),
        }
    }

    #[test]
    fn parses_selected_and_status() {
        let mut form = BTreeMap::new();
        form.insert(4, row("1", "approved"));
        form.insert(2, row("0", "rejected"));
        form.insert(9, row("1", "pending"));

        let entries = parse_entries(&form).unwrap();
        assert_eq!(entries.len(), 3);
        // BTreeMap iteration gives stable id order.
        assert_eq!(entries[0].request_id, 2);
        assert!(!entries[0].selected);
        assert_eq!(entries[0].decision, RequestStatus::Rejected);
        assert_eq!(entries[1].request_id, 4);
        assert!(entries[1].selected);
        assert_eq!(entries[1].decision, RequestStatus::Approved);
        assert_eq!(entries[2].decision, RequestStatus::Pending);
    }

    #[test]
    fn deserializes_the_posted_form_map() {
        let payload = serde_json::json!({
            "4": { "selected": "1", "status": "approved" },
            "9": { "selected": "0", "status": "rejected" }
        });
        let form: BTreeMap<u64, DecisionForm> = serde_json::from_value(payload).unwrap();
        let entries = parse_entries(&form).unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].selected);
        assert_eq!(entries[0].decision, RequestStatus::Approved);
        assert!(!entries[1].selected);
    }

    #[test]
    fn unknown_status_is_a_parse_error() {
        let mut form = BTreeMap::new();
        form.insert(4, row("1", "maybe"));
        let err = parse_entries(&form).unwrap_err();
        assert_eq!(
            err,
            DecisionParseError::UnknownStatus {
                request_id: 4,
                value: "maybe".to_string()
            }
        );
    }
}
