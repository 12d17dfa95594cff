//! Attendance correction engine. Employees submit retroactive change
//! requests against their daily clocking ledger, approvers bulk-approve
//! or bulk-reject them, and a coarser monthly gate signs off a whole
//! month at once. The ledger itself is materialized so every calendar
//! day of a month has exactly one record.

pub mod bulk;
pub mod clocking;
pub mod config;
pub mod db;
pub mod decision;
pub mod error;
pub mod leave;
pub mod logging;
pub mod materializer;
pub mod model;
pub mod monthly;
pub mod store;
pub mod submission;
pub mod transition;

pub use bulk::{BulkOutcome, decide_change_requests, decide_leave_requests, decide_monthly_approvals};
pub use decision::{DecisionEntry, DecisionForm, parse_entries};
pub use error::{CascadeFailure, EngineError, EngineResult, SelectionError, ValidationError};
pub use materializer::{materialize_current_month, materialize_month, worked_sum};
pub use monthly::submit_or_resubmit;
pub use store::{LedgerStore, MemoryStore, MySqlStore};
pub use submission::{EditForm, ProposedEdit, parse_edits, submit_changes};
