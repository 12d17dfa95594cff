pub mod attendance;
pub mod change_request;
pub mod leave_request;
pub mod monthly_approval;
pub mod status;

pub use attendance::AttendanceRecord;
pub use change_request::{ChangeRequest, NewChangeRequest};
pub use leave_request::{LeaveRequest, LeaveType};
pub use monthly_approval::MonthlyApproval;
pub use status::RequestStatus;
