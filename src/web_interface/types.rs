use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{
    EvidenceKind, Profile, Role, SubmissionForm, TeamMemberInput, Upload,
};
use crate::error_handling::types::PortalError;

/// API error payload
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub message: String,
}

/// A file inside a JSON body, content base64-encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadBody {
    pub file_name: String,
    pub content_type: String,
    pub data: String,
}

impl UploadBody {
    pub fn decode(self) -> Result<Upload, PortalError> {
        let data = STANDARD.decode(self.data.trim()).map_err(|_| {
            PortalError::Validation(format!("{} is not valid base64 content", self.file_name))
        })?;
        Ok(Upload {
            file_name: self.file_name,
            content_type: self.content_type.trim().to_ascii_lowercase(),
            data,
        })
    }
}

fn decode_optional(body: Option<UploadBody>) -> Result<Option<Upload>, PortalError> {
    body.map(UploadBody::decode).transpose()
}

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
    pub email: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
    pub profile: Profile,
}

#[derive(Debug, Deserialize)]
pub struct SubmissionBody {
    pub student_name: String,
    pub register_no: String,
    pub roll_no: String,
    pub phone_number: String,
    pub year: String,
    #[serde(default)]
    pub semester: String,
    pub event_title: String,
    pub organization_name: String,
    pub organization_location: String,
    pub event_type: String,
    pub custom_event_type: Option<String>,
    pub event_date: NaiveDate,
    pub event_end_date: Option<NaiveDate>,
    #[serde(default)]
    pub team_members: Vec<TeamMemberInput>,
    pub remarks: Option<String>,
    pub registration_proof: Option<UploadBody>,
    pub payment_proof: Option<UploadBody>,
    pub event_poster: Option<UploadBody>,
}

impl SubmissionBody {
    pub fn into_form(self) -> Result<SubmissionForm, PortalError> {
        Ok(SubmissionForm {
            student_name: self.student_name,
            register_no: self.register_no,
            roll_no: self.roll_no,
            phone_number: self.phone_number,
            year: self.year,
            semester: self.semester,
            event_title: self.event_title,
            organization_name: self.organization_name,
            organization_location: self.organization_location,
            event_type: self.event_type,
            custom_event_type: self.custom_event_type,
            event_date: self.event_date,
            event_end_date: self.event_end_date,
            team_members: self.team_members,
            remarks: self.remarks,
            registration_proof: decode_optional(self.registration_proof)?,
            payment_proof: decode_optional(self.payment_proof)?,
            event_poster: decode_optional(self.event_poster)?,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ReviewBody {
    pub approve: bool,
}

#[derive(Debug, Deserialize)]
pub struct EvidenceBody {
    pub kind: EvidenceKind,
    pub slot: Option<u32>,
    pub file: UploadBody,
}

#[derive(Debug, Deserialize)]
pub struct PrizeDetailsBody {
    pub prize_type: String,
    pub event_name: String,
}

#[derive(Debug, Deserialize)]
pub struct AchievementBody {
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub search: Option<String>,
}

/// Answer of the outbound email hook. `fallback` marks a simulated send.
#[derive(Debug, Serialize)]
pub struct EmailResponse {
    pub success: bool,
    pub fallback: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}
