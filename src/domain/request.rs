//! OD request records and the inputs used to create them.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::{EventCategory, EvidenceKind, OdStatus};

/// Submitter details copied at submission time.
///
/// Later profile edits never rewrite these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitterSnapshot {
    pub student_name: String,
    pub register_no: String,
    pub roll_no: String,
    pub phone_number: String,
    pub year: String,
    pub semester: String,
    pub department: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetails {
    pub title: String,
    pub organization_name: String,
    pub organization_location: String,
    pub category: EventCategory,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl EventDetails {
    pub fn is_single_day(&self) -> bool {
        self.start_date == self.end_date
    }
}

/// Additional participant on a team request. Plain data, not an account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TeamMember {
    pub id: Uuid,
    pub position: u32,
    pub name: String,
    pub register_no: String,
    pub roll_no: String,
    pub year: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrizeDetails {
    pub prize_type: String,
    pub event_name: String,
}

/// One piece of post-event evidence, stored as its own row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: Uuid,
    pub request_id: Uuid,
    pub kind: EvidenceKind,
    pub position: u32,
    pub object_ref: Option<String>,
    pub prize: Option<PrizeDetails>,
    /// False while a prize upload waits for its details.
    pub finalized: bool,
    pub created_at: DateTime<Utc>,
}

impl Attachment {
    pub fn has_file(&self) -> bool {
        self.object_ref
            .as_deref()
            .map(|r| !r.trim().is_empty())
            .unwrap_or(false)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OdRequest {
    pub id: Uuid,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub submitter: SubmitterSnapshot,
    pub event: EventDetails,
    pub status: OdStatus,
    pub registration_proof_ref: String,
    pub payment_proof_ref: Option<String>,
    pub event_poster_ref: String,
    pub od_letter_ref: Option<String>,
    pub lead_signature_ref: Option<String>,
    pub advisor_id: Option<Uuid>,
    pub hod_id: Option<Uuid>,
    pub remarks: Option<String>,
    pub achievement_details: Option<String>,
    pub team_members: Vec<TeamMember>,
    pub attachments: Vec<Attachment>,
}

impl OdRequest {
    pub fn evidence_of(&self, kind: EvidenceKind) -> impl Iterator<Item = &Attachment> {
        self.attachments.iter().filter(move |a| a.kind == kind)
    }

    pub fn next_position(&self, kind: EvidenceKind) -> u32 {
        self.evidence_of(kind)
            .map(|a| a.position + 1)
            .max()
            .unwrap_or(0)
    }

    /// Every stored object that belongs to this request.
    pub fn object_refs(&self) -> Vec<String> {
        let mut refs = vec![
            self.registration_proof_ref.clone(),
            self.event_poster_ref.clone(),
        ];
        refs.extend(self.payment_proof_ref.clone());
        refs.extend(self.od_letter_ref.clone());
        refs.extend(self.attachments.iter().filter_map(|a| a.object_ref.clone()));
        refs
    }
}

/// A file handed to the portal by a client.
#[derive(Debug, Clone, PartialEq)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct TeamMemberInput {
    pub name: String,
    pub register_no: String,
    pub roll_no: String,
    pub year: String,
}

/// Everything a student fills in on the submission form.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionForm {
    pub student_name: String,
    pub register_no: String,
    pub roll_no: String,
    pub phone_number: String,
    pub year: String,
    pub semester: String,
    pub event_title: String,
    pub organization_name: String,
    pub organization_location: String,
    pub event_type: String,
    pub custom_event_type: Option<String>,
    pub event_date: NaiveDate,
    pub event_end_date: Option<NaiveDate>,
    pub team_members: Vec<TeamMemberInput>,
    pub remarks: Option<String>,
    pub registration_proof: Option<Upload>,
    pub payment_proof: Option<Upload>,
    pub event_poster: Option<Upload>,
}
