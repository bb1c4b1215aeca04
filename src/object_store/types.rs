use std::fmt;
use std::str::FromStr;

use chrono::Utc;
use uuid::Uuid;

use crate::error_handling::types::ObjectStoreError;

/// Logical folders of the object store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Folder {
    RegistrationProofs,
    PaymentProofs,
    EventPosters,
    OdLetters,
    Evidence,
    Certificates,
    Signatures,
}

impl Folder {
    pub const ALL: [Folder; 7] = [
        Folder::RegistrationProofs,
        Folder::PaymentProofs,
        Folder::EventPosters,
        Folder::OdLetters,
        Folder::Evidence,
        Folder::Certificates,
        Folder::Signatures,
    ];

    pub fn dir_name(&self) -> &'static str {
        match self {
            Folder::RegistrationProofs => "registration_proofs",
            Folder::PaymentProofs => "payment_proofs",
            Folder::EventPosters => "event_posters",
            Folder::OdLetters => "od_letters",
            Folder::Evidence => "evidence",
            Folder::Certificates => "certificates",
            Folder::Signatures => "signatures",
        }
    }
}

impl FromStr for Folder {
    type Err = ObjectStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Folder::ALL
            .iter()
            .copied()
            .find(|f| f.dir_name() == s)
            .ok_or_else(|| ObjectStoreError::InvalidReference(format!("unknown folder '{}'", s)))
    }
}

/// Address of a stored object: `folder/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectRef {
    pub folder: Folder,
    pub name: String,
}

impl ObjectRef {
    pub fn new(folder: Folder, name: impl Into<String>) -> Result<Self, ObjectStoreError> {
        let name = name.into();
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.starts_with('.')
        {
            return Err(ObjectStoreError::InvalidReference(name));
        }
        Ok(Self { folder, name })
    }

    /// Unique name for a freshly uploaded file: `{unix_millis}_{uuid}.{ext}`.
    pub fn unique(folder: Folder, content_type: &str) -> Self {
        let ext = extension_for(content_type);
        Self {
            folder,
            name: format!("{}_{}.{}", Utc::now().timestamp_millis(), Uuid::new_v4(), ext),
        }
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.folder.dir_name(), self.name)
    }
}

impl FromStr for ObjectRef {
    type Err = ObjectStoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (folder, name) = s
            .split_once('/')
            .ok_or_else(|| ObjectStoreError::InvalidReference(s.to_string()))?;
        ObjectRef::new(folder.parse()?, name)
    }
}

/// File extension for an accepted content type, `bin` when unknown.
pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/jpeg" => "jpg",
        _ => mime_guess::get_mime_extensions_str(content_type)
            .and_then(|exts| exts.first().copied())
            .unwrap_or("bin"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reference_parsing() {
        let r: ObjectRef = "od_letters/abc_approved.pdf".parse().unwrap();
        assert_eq!(r.folder, Folder::OdLetters);
        assert_eq!(r.name, "abc_approved.pdf");
        assert_eq!(r.to_string(), "od_letters/abc_approved.pdf");

        assert!("nowhere/a.pdf".parse::<ObjectRef>().is_err());
        assert!("evidence/../secret".parse::<ObjectRef>().is_err());
        assert!("evidence/".parse::<ObjectRef>().is_err());
        assert!("evidence".parse::<ObjectRef>().is_err());
    }

    #[test]
    fn test_unique_names_carry_extension() {
        let a = ObjectRef::unique(Folder::Evidence, "application/pdf");
        let b = ObjectRef::unique(Folder::Evidence, "application/pdf");
        assert_ne!(a, b);
        assert!(a.name.ends_with(".pdf"));
        assert!(ObjectRef::unique(Folder::Signatures, "image/png").name.ends_with(".png"));
        assert!(ObjectRef::unique(Folder::Evidence, "image/jpeg").name.ends_with(".jpg"));
    }
}
