//! User accounts, profiles and login sessions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::types::Role;

/// Current layout of the `profiles` table rows.
pub const PROFILE_SCHEMA_VERSION: i32 = 1;

/// Login credentials. Never serialized to clients.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub salt: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: Uuid,
    pub email: String,
    pub role: Role,
    pub full_name: String,
    pub identification_no: String,
    pub department: String,
    pub year: Option<String>,
    pub designation: Option<String>,
    pub is_hod: bool,
    pub signature_ref: Option<String>,
    pub is_profile_complete: bool,
    pub schema_version: i32,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn blank(user_id: Uuid, email: &str, role: Role) -> Self {
        Self {
            user_id,
            email: email.to_string(),
            role,
            full_name: String::new(),
            identification_no: String::new(),
            department: String::new(),
            year: None,
            designation: None,
            is_hod: false,
            signature_ref: None,
            is_profile_complete: false,
            schema_version: PROFILE_SCHEMA_VERSION,
            updated_at: Utc::now(),
        }
    }

    pub fn is_faculty(&self) -> bool {
        self.role == Role::Faculty
    }

    pub fn is_department_head(&self) -> bool {
        self.is_faculty() && self.is_hod
    }

    pub fn has_signature(&self) -> bool {
        self.signature_ref
            .as_deref()
            .map(|s| !s.trim().is_empty())
            .unwrap_or(false)
    }

    /// Department comparison used by every department-scoped permission.
    pub fn same_department(&self, department: &str) -> bool {
        self.department.trim().eq_ignore_ascii_case(department.trim())
    }
}

/// Fields a user fills in on the profile setup / edit screen.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ProfileUpdate {
    pub full_name: String,
    pub identification_no: String,
    pub department: String,
    pub year: Option<String>,
    pub designation: Option<String>,
    #[serde(default)]
    pub is_hod: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SessionToken {
    pub token: String,
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl SessionToken {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_blank_profile_is_incomplete() {
        let profile = Profile::blank(Uuid::new_v4(), "a@b.c", Role::Faculty);
        assert!(!profile.is_profile_complete);
        assert!(!profile.has_signature());
        assert!(!profile.is_department_head());
        assert_eq!(profile.schema_version, PROFILE_SCHEMA_VERSION);
    }

    #[test]
    fn test_same_department_is_case_insensitive() {
        let mut profile = Profile::blank(Uuid::new_v4(), "a@b.c", Role::Faculty);
        profile.department = "Civil Engineering".into();
        assert!(profile.same_department(" civil engineering"));
        assert!(!profile.same_department("Mechanical Engineering"));
    }

    #[test]
    fn test_session_expiry() {
        let now = Utc::now();
        let session = SessionToken {
            token: "t".into(),
            user_id: Uuid::new_v4(),
            created_at: now,
            expires_at: now + Duration::seconds(10),
        };
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::seconds(10)));
    }
}
