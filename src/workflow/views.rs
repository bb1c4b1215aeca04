//! Read models returned by portal operations.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::{OdRequest, OdStatus};

/// Per-status counters for the faculty dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub pending_advisor: u64,
    pub pending_hod: u64,
    pub approved: u64,
    pub completed: u64,
    pub rejected: u64,
    pub archived: u64,
}

impl DashboardStats {
    pub fn set(&mut self, status: OdStatus, count: u64) {
        match status {
            OdStatus::PendingAdvisor => self.pending_advisor = count,
            OdStatus::PendingHod => self.pending_hod = count,
            OdStatus::Approved => self.approved = count,
            OdStatus::Completed => self.completed = count,
            OdStatus::Rejected => self.rejected = count,
            OdStatus::Archived => self.archived = count,
        }
    }
}

/// Public tracking view of one request. Contact details are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackedRequest {
    pub id: Uuid,
    pub student_name: String,
    pub event_title: String,
    pub organization_name: String,
    pub event_type: String,
    pub event_date: NaiveDate,
    pub event_end_date: NaiveDate,
    pub status: OdStatus,
    pub created_at: DateTime<Utc>,
    pub team_size: usize,
}

impl From<&OdRequest> for TrackedRequest {
    fn from(request: &OdRequest) -> Self {
        Self {
            id: request.id,
            student_name: request.submitter.student_name.clone(),
            event_title: request.event.title.clone(),
            organization_name: request.event.organization_name.clone(),
            event_type: request.event.category.label().to_string(),
            event_date: request.event.start_date,
            event_end_date: request.event.end_date,
            status: request.status,
            created_at: request.created_at,
            team_size: request.team_members.len() + 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackingResult {
    pub register_no: String,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub requests: Vec<TrackedRequest>,
}

/// A generated spreadsheet ready for download.
#[derive(Debug, Clone, PartialEq)]
pub struct RegistryExport {
    pub file_name: String,
    pub bytes: Vec<u8>,
}
