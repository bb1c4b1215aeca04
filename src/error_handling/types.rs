use std::fmt;

use crate::domain::types::OdStatus;
use crate::workflow::state_machine::Action;

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    TomlError(String),
    InvalidValue(String),
    DirectoryDoesNotExist(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::TomlError(e) => write!(f, "TOML parsing error: {}", e),
            ConfigError::InvalidValue(e) => write!(f, "Invalid configuration value: {}", e),
            ConfigError::DirectoryDoesNotExist(e) => write!(f, "Directory error: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::IoError(err)
    }
}

#[derive(Debug)]
pub enum StorageError {
    ConnectionFailed,
    WriteFailed,
    ReadFailed,
    CorruptRecord(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ConnectionFailed => write!(f, "Storage connection failed"),
            StorageError::WriteFailed => write!(f, "Storage write failed"),
            StorageError::ReadFailed => write!(f, "Storage read failed"),
            StorageError::CorruptRecord(e) => write!(f, "Corrupt stored record: {}", e),
        }
    }
}

impl std::error::Error for StorageError {}

#[derive(Debug)]
pub enum ObjectStoreError {
    IoError(std::io::Error),
    NotFound(String),
    InvalidReference(String),
}

impl fmt::Display for ObjectStoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ObjectStoreError::IoError(e) => write!(f, "Object store IO error: {}", e),
            ObjectStoreError::NotFound(e) => write!(f, "Object not found: {}", e),
            ObjectStoreError::InvalidReference(e) => write!(f, "Invalid object reference: {}", e),
        }
    }
}

impl std::error::Error for ObjectStoreError {}

impl From<std::io::Error> for ObjectStoreError {
    fn from(err: std::io::Error) -> Self {
        ObjectStoreError::IoError(err)
    }
}

#[derive(Debug)]
pub enum WorkflowError {
    InvalidTransition { from: OdStatus, action: Action },
    MissingSignature,
    NotPurgeable(OdStatus),
    NotWithdrawable(OdStatus),
    EvidenceNotAllowed(OdStatus),
    Conflict(OdStatus),
}

impl fmt::Display for WorkflowError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowError::InvalidTransition { from, action } => {
                write!(f, "Cannot apply {} to a request in status '{}'", action, from)
            }
            WorkflowError::MissingSignature => write!(
                f,
                "Upload your digital signature in your profile before approving requests"
            ),
            WorkflowError::NotPurgeable(s) => {
                write!(f, "Only archived requests can be deleted (current status '{}')", s)
            }
            WorkflowError::NotWithdrawable(s) => {
                write!(f, "A request in status '{}' can no longer be withdrawn", s)
            }
            WorkflowError::EvidenceNotAllowed(s) => {
                write!(f, "Evidence can only be attached to approved requests (current status '{}')", s)
            }
            WorkflowError::Conflict(s) => {
                write!(f, "Request changed concurrently, it is no longer '{}'", s)
            }
        }
    }
}

impl std::error::Error for WorkflowError {}

#[derive(Debug)]
pub enum LetterError {
    FontUnavailable(String),
    RenderFailed(String),
}

impl fmt::Display for LetterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LetterError::FontUnavailable(e) => write!(f, "Letter font unavailable: {}", e),
            LetterError::RenderFailed(e) => write!(f, "Letter rendering failed: {}", e),
        }
    }
}

impl std::error::Error for LetterError {}

#[derive(Debug)]
pub enum ExportError {
    WorkbookFailed(String),
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportError::WorkbookFailed(e) => write!(f, "Workbook generation failed: {}", e),
        }
    }
}

impl std::error::Error for ExportError {}

#[derive(Debug)]
pub enum NotifyError {
    InvalidMessage(String),
    RequestFailed(String),
    ProviderRejected(u16, String),
}

impl fmt::Display for NotifyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NotifyError::InvalidMessage(e) => write!(f, "Invalid email message: {}", e),
            NotifyError::RequestFailed(e) => write!(f, "Email request failed: {}", e),
            NotifyError::ProviderRejected(code, e) => {
                write!(f, "Email provider rejected message ({}): {}", code, e)
            }
        }
    }
}

impl std::error::Error for NotifyError {}

#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    SessionExpired,
    InvalidCredentials,
    EmailTaken,
    ProfileIncomplete,
    Forbidden(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuthError::MissingSession => write!(f, "Authentication required"),
            AuthError::SessionExpired => write!(f, "Session expired, please log in again"),
            AuthError::InvalidCredentials => write!(f, "Invalid email or password"),
            AuthError::EmailTaken => write!(f, "An account with this email already exists"),
            AuthError::ProfileIncomplete => write!(f, "Complete your profile to continue"),
            AuthError::Forbidden(e) => write!(f, "Forbidden: {}", e),
        }
    }
}

impl std::error::Error for AuthError {}

/// Error returned by every portal operation.
#[derive(Debug)]
pub enum PortalError {
    Validation(String),
    NotFound(String),
    Auth(AuthError),
    Workflow(WorkflowError),
    Storage(StorageError),
    ObjectStore(ObjectStoreError),
    Letter(LetterError),
    Export(ExportError),
    Notify(NotifyError),
}

impl fmt::Display for PortalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PortalError::Validation(e) => write!(f, "{}", e),
            PortalError::NotFound(e) => write!(f, "{} not found", e),
            PortalError::Auth(e) => write!(f, "{}", e),
            PortalError::Workflow(e) => write!(f, "{}", e),
            PortalError::Storage(e) => write!(f, "{}", e),
            PortalError::ObjectStore(e) => write!(f, "{}", e),
            PortalError::Letter(e) => write!(f, "{}", e),
            PortalError::Export(e) => write!(f, "{}", e),
            PortalError::Notify(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for PortalError {}

impl From<AuthError> for PortalError {
    fn from(err: AuthError) -> Self {
        PortalError::Auth(err)
    }
}

impl From<WorkflowError> for PortalError {
    fn from(err: WorkflowError) -> Self {
        PortalError::Workflow(err)
    }
}

impl From<StorageError> for PortalError {
    fn from(err: StorageError) -> Self {
        PortalError::Storage(err)
    }
}

impl From<ObjectStoreError> for PortalError {
    fn from(err: ObjectStoreError) -> Self {
        PortalError::ObjectStore(err)
    }
}

impl From<LetterError> for PortalError {
    fn from(err: LetterError) -> Self {
        PortalError::Letter(err)
    }
}

impl From<ExportError> for PortalError {
    fn from(err: ExportError) -> Self {
        PortalError::Export(err)
    }
}

impl From<NotifyError> for PortalError {
    fn from(err: NotifyError) -> Self {
        PortalError::Notify(err)
    }
}

#[derive(Debug)]
pub enum WebError {
    BindFailed(String),
}

impl fmt::Display for WebError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebError::BindFailed(e) => write!(f, "Web server bind failed: {}", e),
        }
    }
}

impl std::error::Error for WebError {}

#[derive(Debug)]
pub enum ControllerError {
    ConfigurationError(ConfigError),
    StorageError(StorageError),
    ObjectStoreError(ObjectStoreError),
    WebError(WebError),
    InitializationFailed(String),
}

impl fmt::Display for ControllerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ControllerError::ConfigurationError(e) => write!(f, "Configuration error: {}", e),
            ControllerError::StorageError(e) => write!(f, "Storage error: {}", e),
            ControllerError::ObjectStoreError(e) => write!(f, "Object store error: {}", e),
            ControllerError::WebError(e) => write!(f, "Web error: {}", e),
            ControllerError::InitializationFailed(e) => write!(f, "Initialization failed: {}", e),
        }
    }
}

impl std::error::Error for ControllerError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_portal_error_display_passes_through_message() {
        let err: PortalError = WorkflowError::MissingSignature.into();
        assert_eq!(
            err.to_string(),
            "Upload your digital signature in your profile before approving requests"
        );

        let err = PortalError::NotFound("Request".into());
        assert_eq!(err.to_string(), "Request not found");
    }

    #[test]
    fn test_invalid_transition_names_status_and_action() {
        let err = WorkflowError::InvalidTransition {
            from: OdStatus::Rejected,
            action: Action::HodApprove,
        };
        let text = err.to_string();
        assert!(text.contains("Rejected"));
        assert!(text.contains("HOD approval"));
    }
}
