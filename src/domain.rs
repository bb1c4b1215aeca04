//! Domain model of the OD portal.
//!
//! - `types`: statuses, roles, event categories, evidence kinds
//! - `request`: the OD request record, its team members and attachments
//! - `profile`: accounts, profiles and sessions
//! - `notification`: in-app alerts

pub mod notification;
pub mod profile;
pub mod request;
pub mod types;

pub use notification::Notification;
pub use profile::{Account, Profile, ProfileUpdate, SessionToken};
pub use request::{
    Attachment, EventDetails, OdRequest, PrizeDetails, SubmissionForm, SubmitterSnapshot,
    TeamMember, TeamMemberInput, Upload,
};
pub use types::{EventCategory, EvidenceKind, OdStatus, Role, Severity};
