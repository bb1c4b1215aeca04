use uuid::Uuid;

use crate::domain::{Notification, OdStatus};

/// Criteria for listing OD requests. Empty criteria match every request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestFilter {
    pub user_id: Option<Uuid>,
    /// Exact register number of the submitting student, already trimmed
    pub register_no: Option<String>,
    /// Department of the submitter, compared case-insensitively
    pub department: Option<String>,
    /// Only these statuses; empty means any
    pub statuses: Vec<OdStatus>,
    /// Never these statuses
    pub excluded_statuses: Vec<OdStatus>,
    /// Case-insensitive substring over student name, register number, event title and organization
    pub search: Option<String>,
}

/// A compare-and-set status write.
///
/// Applied only while the stored status still equals `expected`. Every other
/// field is written in the same transaction.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusChange {
    pub request_id: Uuid,
    pub expected: OdStatus,
    pub next: OdStatus,
    pub od_letter_ref: Option<String>,
    pub advisor_id: Option<Uuid>,
    pub hod_id: Option<Uuid>,
    pub notification: Option<Notification>,
}

impl StatusChange {
    pub fn new(request_id: Uuid, expected: OdStatus, next: OdStatus) -> Self {
        Self {
            request_id,
            expected,
            next,
            od_letter_ref: None,
            advisor_id: None,
            hod_id: None,
            notification: None,
        }
    }

    pub fn with_letter(mut self, object_ref: impl Into<String>) -> Self {
        self.od_letter_ref = Some(object_ref.into());
        self
    }

    pub fn with_advisor(mut self, advisor_id: Uuid) -> Self {
        self.advisor_id = Some(advisor_id);
        self
    }

    pub fn with_hod(mut self, hod_id: Uuid) -> Self {
        self.hod_id = Some(hod_id);
        self
    }

    pub fn with_notification(mut self, notification: Notification) -> Self {
        self.notification = Some(notification);
        self
    }
}

/// How `Storage::save_attachment` writes an attachment row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentWrite {
    /// New row at the next free position of its kind, assigned in the transaction.
    Append,
    /// New file for an existing row. Position and creation time are kept.
    Replace,
    /// Prize details for a staged row. Matches only rows not finalized yet.
    Finalize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentSaved {
    /// Written at `position`; `completed` says whether the completion change applied.
    Written { position: u32, completed: bool },
    /// The row to replace or finalize no longer exists.
    Missing,
    /// The request is gone or no longer accepts evidence.
    Closed,
}
