//! Legal lifecycle of an OD request.
//!
//! ```text
//! Pending Advisor --advisor approve--> Pending HOD --HOD approve--> Approved --evidence--> Completed
//!        |                                 |
//!        +----------- reject --------------+--> Rejected
//!
//! any status --archive--> Archived --restore--> Pending Advisor
//! Archived --hard delete--> (gone)
//! ```
//!
//! Every function here is pure; persistence applies the result as a
//! compare-and-set on the status it was computed from.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::{Attachment, EvidenceKind, OdStatus};
use crate::error_handling::types::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    AdvisorApprove,
    AdvisorReject,
    HodApprove,
    HodReject,
    EvidenceComplete,
    Archive,
    Restore,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Action::AdvisorApprove => "advisor approval",
            Action::AdvisorReject => "advisor rejection",
            Action::HodApprove => "HOD approval",
            Action::HodReject => "HOD rejection",
            Action::EvidenceComplete => "evidence completion",
            Action::Archive => "archive",
            Action::Restore => "restore",
        };
        f.write_str(name)
    }
}

/// Status reached by applying `action` to a request in `from`.
pub fn transition(from: OdStatus, action: Action) -> Result<OdStatus, WorkflowError> {
    use OdStatus::*;

    let next = match (from, action) {
        (PendingAdvisor, Action::AdvisorApprove) => Some(PendingHod),
        (PendingAdvisor, Action::AdvisorReject) => Some(Rejected),
        (PendingHod, Action::HodApprove) => Some(Approved),
        (PendingHod, Action::HodReject) => Some(Rejected),
        (Approved, Action::EvidenceComplete) => Some(Completed),
        (Archived, Action::Archive) => None,
        (_, Action::Archive) => Some(Archived),
        // Restore does not remember the archived-from stage.
        (Archived, Action::Restore) => Some(PendingAdvisor),
        _ => None,
    };
    next.ok_or(WorkflowError::InvalidTransition { from, action })
}

/// Hard delete is only possible once a request has been archived.
pub fn ensure_purgeable(status: OdStatus) -> Result<(), WorkflowError> {
    match status {
        OdStatus::Archived => Ok(()),
        other => Err(WorkflowError::NotPurgeable(other)),
    }
}

/// A student may take back a request until a reviewer has passed it on.
pub fn ensure_withdrawable(status: OdStatus) -> Result<(), WorkflowError> {
    match status {
        OdStatus::PendingAdvisor | OdStatus::Rejected => Ok(()),
        other => Err(WorkflowError::NotWithdrawable(other)),
    }
}

pub fn accepts_evidence(status: OdStatus) -> Result<(), WorkflowError> {
    match status {
        OdStatus::Approved | OdStatus::Completed => Ok(()),
        other => Err(WorkflowError::EvidenceNotAllowed(other)),
    }
}

/// An attachment that closes out an approved request: a certificate, or a
/// finalized prize record, carrying a non-empty file reference.
pub fn qualifies_for_completion(attachment: &Attachment) -> bool {
    match attachment.kind {
        EvidenceKind::Certificate => attachment.has_file(),
        EvidenceKind::Prize => attachment.finalized && attachment.has_file(),
        EvidenceKind::Photo => false,
    }
}

/// Evidence rule: re-evaluated after every evidence write.
pub fn completes_with_evidence<'a>(
    status: OdStatus,
    evidence: impl IntoIterator<Item = &'a Attachment>,
) -> bool {
    status == OdStatus::Approved && evidence.into_iter().any(qualifies_for_completion)
}
