//! Enumerations shared by requests, profiles and notifications.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Lifecycle status of an OD request.
///
/// The string forms are the ones persisted and shown to users, so they must
/// never change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OdStatus {
    #[serde(rename = "Pending Advisor")]
    PendingAdvisor,
    #[serde(rename = "Pending HOD")]
    PendingHod,
    Approved,
    Rejected,
    Completed,
    Archived,
}

impl OdStatus {
    pub const ALL: [OdStatus; 6] = [
        OdStatus::PendingAdvisor,
        OdStatus::PendingHod,
        OdStatus::Approved,
        OdStatus::Rejected,
        OdStatus::Completed,
        OdStatus::Archived,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            OdStatus::PendingAdvisor => "Pending Advisor",
            OdStatus::PendingHod => "Pending HOD",
            OdStatus::Approved => "Approved",
            OdStatus::Rejected => "Rejected",
            OdStatus::Completed => "Completed",
            OdStatus::Archived => "Archived",
        }
    }
}

impl fmt::Display for OdStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OdStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OdStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| format!("unknown status '{}'", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Faculty,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Faculty => "faculty",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "faculty" => Ok(Role::Faculty),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// Kind of event a student asks leave for. `Other` carries the free-text label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum EventCategory {
    Symposium,
    Workshop,
    PaperPresentation,
    TechnicalQuiz,
    ModelMaking,
    SurveyingCamp,
    IndustrialVisit,
    Internship,
    Culturals,
    Sports,
    Other(String),
}

impl EventCategory {
    const NAMED: [EventCategory; 10] = [
        EventCategory::Symposium,
        EventCategory::Workshop,
        EventCategory::PaperPresentation,
        EventCategory::TechnicalQuiz,
        EventCategory::ModelMaking,
        EventCategory::SurveyingCamp,
        EventCategory::IndustrialVisit,
        EventCategory::Internship,
        EventCategory::Culturals,
        EventCategory::Sports,
    ];

    pub fn label(&self) -> &str {
        match self {
            EventCategory::Symposium => "Symposium",
            EventCategory::Workshop => "Workshop",
            EventCategory::PaperPresentation => "Paper Presentation",
            EventCategory::TechnicalQuiz => "Technical Quiz",
            EventCategory::ModelMaking => "Model Making",
            EventCategory::SurveyingCamp => "Surveying Camp",
            EventCategory::IndustrialVisit => "Industrial Visit",
            EventCategory::Internship => "Internship",
            EventCategory::Culturals => "Culturals",
            EventCategory::Sports => "Sports",
            EventCategory::Other(label) => label,
        }
    }

    /// Resolve the form selection. `"Other"` takes the custom label, which
    /// must not be blank.
    pub fn from_selection(selection: &str, custom: Option<&str>) -> Result<Self, String> {
        let selection = selection.trim();
        if selection.eq_ignore_ascii_case("other") {
            return match custom.map(str::trim) {
                Some(label) if !label.is_empty() => Ok(EventCategory::Other(label.to_string())),
                _ => Err("Describe the event type when choosing 'Other'".to_string()),
            };
        }
        EventCategory::NAMED
            .iter()
            .find(|c| c.label() == selection)
            .cloned()
            .ok_or_else(|| format!("Unknown event type '{}'", selection))
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<EventCategory> for String {
    fn from(category: EventCategory) -> Self {
        category.label().to_string()
    }
}

impl TryFrom<String> for EventCategory {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err("event type is empty".to_string());
        }
        Ok(EventCategory::NAMED
            .iter()
            .find(|c| c.label() == trimmed)
            .cloned()
            .unwrap_or_else(|| EventCategory::Other(trimmed.to_string())))
    }
}

/// Post-event proof attached to an approved request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceKind {
    Photo,
    Certificate,
    Prize,
}

impl EvidenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceKind::Photo => "photo",
            EvidenceKind::Certificate => "certificate",
            EvidenceKind::Prize => "prize",
        }
    }
}

impl FromStr for EvidenceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "photo" => Ok(EvidenceKind::Photo),
            "certificate" => Ok(EvidenceKind::Certificate),
            "prize" => Ok(EvidenceKind::Prize),
            other => Err(format!("unknown evidence kind '{}'", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Info,
    Warning,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Success => "success",
            Severity::Info => "info",
            Severity::Warning => "warning",
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Severity::Success),
            "info" => Ok(Severity::Info),
            "warning" => Ok(Severity::Warning),
            other => Err(format!("unknown severity '{}'", other)),
        }
    }
}

/// Academic year label used in letters and listings ("2" -> "2nd Year").
pub fn year_label(year: &str) -> String {
    match year.trim() {
        "1" => "1st Year".to_string(),
        "2" => "2nd Year".to_string(),
        "3" => "3rd Year".to_string(),
        "4" => "4th Year".to_string(),
        other => format!("{} Year", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings_are_stable() {
        for status in OdStatus::ALL {
            assert_eq!(status.as_str().parse::<OdStatus>().unwrap(), status);
        }
        assert_eq!(
            serde_json::to_string(&OdStatus::PendingHod).unwrap(),
            "\"Pending HOD\""
        );
        assert!("Pending".parse::<OdStatus>().is_err());
    }

    #[test]
    fn test_event_category_selection() {
        assert_eq!(
            EventCategory::from_selection("Paper Presentation", None).unwrap(),
            EventCategory::PaperPresentation
        );
        assert_eq!(
            EventCategory::from_selection("Other", Some(" Guest Lecture ")).unwrap(),
            EventCategory::Other("Guest Lecture".into())
        );
        assert!(EventCategory::from_selection("Other", Some("  ")).is_err());
        assert!(EventCategory::from_selection("Hackathon", None).is_err());
    }

    #[test]
    fn test_event_category_serde_uses_label() {
        let json = serde_json::to_string(&EventCategory::IndustrialVisit).unwrap();
        assert_eq!(json, "\"Industrial Visit\"");
        let back: EventCategory = serde_json::from_str("\"Guest Lecture\"").unwrap();
        assert_eq!(back, EventCategory::Other("Guest Lecture".into()));
    }

    #[test]
    fn test_year_label() {
        assert_eq!(year_label("1"), "1st Year");
        assert_eq!(year_label("2"), "2nd Year");
        assert_eq!(year_label("3"), "3rd Year");
        assert_eq!(year_label("4"), "4th Year");
        assert_eq!(year_label("5"), "5 Year");
    }
}
