//! Storage Trait
//!
//! This module defines the `Storage` trait, the interface every persistence
//! backend of the portal implements.
//!
//! Implementors of this trait are responsible for:
//! - Persisting OD requests together with their team members and evidence
//! - Applying status changes atomically, as compare-and-set writes
//! - Managing accounts, profiles and login sessions
//! - Storing in-app notifications
//!
//! All methods return a `Result` to handle potential storage errors.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    Account, Attachment, Notification, OdRequest, OdStatus, Profile, SessionToken,
};
use crate::error_handling::types::StorageError;
use crate::storage::types::{AttachmentSaved, AttachmentWrite, RequestFilter, StatusChange};

#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts a new request with its team members and attachments.
    async fn insert_request(&self, request: &OdRequest) -> Result<(), StorageError>;

    async fn get_request(&self, id: Uuid) -> Result<Option<OdRequest>, StorageError>;

    /// Requests matching `filter`, newest first.
    async fn find_requests(&self, filter: &RequestFilter) -> Result<Vec<OdRequest>, StorageError>;

    /// Number of requests currently in `status`.
    async fn count_requests(&self, status: OdStatus) -> Result<u64, StorageError>;

    /// Applies `change` if the stored status still equals `change.expected`.
    ///
    /// Returns `false` when the request is gone or its status moved on, in
    /// which case nothing is written.
    async fn apply_transition(&self, change: &StatusChange) -> Result<bool, StorageError>;

    /// Writes an attachment as described by `write`, only while the request
    /// is `Approved` or `Completed`. When `completion` is given it is applied
    /// in the same transaction.
    async fn save_attachment(
        &self,
        attachment: &Attachment,
        write: AttachmentWrite,
        completion: Option<&StatusChange>,
    ) -> Result<AttachmentSaved, StorageError>;

    /// Removes one attachment of a request and returns it.
    async fn remove_attachment(
        &self,
        request_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<Option<Attachment>, StorageError>;

    /// Prize uploads still waiting for their details that were created before `cutoff`.
    async fn staged_attachments_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Attachment>, StorageError>;

    /// Deletes a request and every dependent row, only while it is in `expected` status.
    async fn delete_request(
        &self,
        id: Uuid,
        expected: OdStatus,
    ) -> Result<bool, StorageError>;

    async fn set_achievement(&self, id: Uuid, details: Option<String>) -> Result<bool, StorageError>;

    /// Creates an account and its initial profile together.
    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<(), StorageError>;

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError>;

    /// Inserts or replaces a profile.
    async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError>;

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError>;

    async fn create_session(&self, session: &SessionToken) -> Result<(), StorageError>;

    async fn get_session(&self, token: &str) -> Result<Option<SessionToken>, StorageError>;

    async fn delete_session(&self, token: &str) -> Result<bool, StorageError>;

    /// Removes every session that expired at or before `now`.
    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StorageError>;

    async fn save_notification(&self, notification: &Notification) -> Result<(), StorageError>;

    /// Latest `limit` notifications of a user, newest first.
    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Notification>, StorageError>;

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<bool, StorageError>;
}
