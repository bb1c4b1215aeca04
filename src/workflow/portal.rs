//! The portal service: every user-facing operation, enforced server-side.
//!
//! Operations are grouped by concern across sibling modules (`submission`,
//! `review`, `evidence`, `registry`), each adding an `impl PortalService`
//! block. This file holds the service itself, access guards, accounts,
//! profiles, notifications and object access.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use log::{debug, info, warn};
use regex::Regex;
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::configuration::{InstitutionConfig, LimitsConfig, MAX_TTL_SECS};
use crate::domain::{
    Account, Notification, OdRequest, Profile, ProfileUpdate, Role, SessionToken, Upload,
};
use crate::error_handling::types::{AuthError, ObjectStoreError, PortalError};
use crate::object_store::{Folder, ObjectRef, ObjectStore};
use crate::storage::Storage;

pub(crate) const PHONE_PATTERN: &str = r"^\+?[0-9 ]{7,15}$";
const MIN_PASSWORD_LEN: usize = 8;
const NOTIFICATION_LIMIT: u64 = 10;
const SIGNATURE_TYPES: [&str; 2] = ["image/png", "image/jpeg"];

pub struct PortalService {
    pub(crate) storage: Arc<dyn Storage>,
    pub(crate) objects: Arc<dyn ObjectStore>,
    pub(crate) institution: InstitutionConfig,
    pub(crate) limits: LimitsConfig,
    pub(crate) phone_pattern: Regex,
}

impl PortalService {
    pub fn new(
        storage: Arc<dyn Storage>,
        objects: Arc<dyn ObjectStore>,
        institution: InstitutionConfig,
        limits: LimitsConfig,
    ) -> Result<Self, PortalError> {
        let phone_pattern = Regex::new(PHONE_PATTERN)
            .map_err(|e| PortalError::Validation(format!("invalid phone pattern: {}", e)))?;
        Ok(Self { storage, objects, institution, limits, phone_pattern })
    }

    // ----- accounts & sessions -----

    pub async fn register(
        &self,
        email: &str,
        password: &str,
        role: Role,
    ) -> Result<Profile, PortalError> {
        let email = normalize_email(email)?;
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(PortalError::Validation(format!(
                "Password must be at least {} characters",
                MIN_PASSWORD_LEN
            )));
        }
        if self.storage.find_account_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken.into());
        }

        let salt = Uuid::new_v4().simple().to_string();
        let account = Account {
            id: Uuid::new_v4(),
            email: email.clone(),
            password_hash: hash_password(&salt, password),
            salt,
            created_at: Utc::now(),
        };
        let profile = Profile::blank(account.id, &email, role);
        self.storage.create_account(&account, &profile).await?;
        info!("Registered {} account {}", role.as_str(), account.id);
        Ok(profile)
    }

    pub async fn login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(SessionToken, Profile), PortalError> {
        let email = normalize_email(email).map_err(|_| AuthError::InvalidCredentials)?;
        let account = self
            .storage
            .find_account_by_email(&email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !password_matches(&account.salt, password, &account.password_hash) {
            warn!("Failed login for account {}", account.id);
            return Err(AuthError::InvalidCredentials.into());
        }
        let profile = self
            .storage
            .get_profile(account.id)
            .await?
            .ok_or_else(|| PortalError::NotFound("Profile".into()))?;

        let now = Utc::now();
        let session = SessionToken {
            token: Uuid::new_v4().simple().to_string(),
            user_id: account.id,
            created_at: now,
            expires_at: now + ttl(self.limits.session_ttl_secs),
        };
        self.storage.create_session(&session).await?;
        info!("Account {} logged in", account.id);
        Ok((session, profile))
    }

    pub async fn logout(&self, token: &str) -> Result<(), PortalError> {
        if self.storage.delete_session(token).await? {
            debug!("Session closed");
        }
        Ok(())
    }

    /// Resolve a bearer token to the acting user's profile.
    pub async fn authenticate(&self, token: Option<&str>) -> Result<Profile, PortalError> {
        let token = token
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingSession)?;
        let session = self
            .storage
            .get_session(token)
            .await?
            .ok_or(AuthError::MissingSession)?;
        if session.is_expired(Utc::now()) {
            self.storage.delete_session(token).await?;
            return Err(AuthError::SessionExpired.into());
        }
        self.storage
            .get_profile(session.user_id)
            .await?
            .ok_or_else(|| PortalError::NotFound("Profile".into()))
    }

    // ----- profiles -----

    pub async fn complete_profile(
        &self,
        actor: &Profile,
        update: ProfileUpdate,
    ) -> Result<Profile, PortalError> {
        let full_name = required(&update.full_name, "Full name")?;
        let identification_no = required(&update.identification_no, "Identification number")?;
        let department = required(&update.department, "Department")?;
        let year = update.year.as_deref().map(str::trim).filter(|y| !y.is_empty());
        if actor.role == Role::Student && year.is_none() {
            return Err(PortalError::Validation("Year is required for students".into()));
        }
        if actor.role == Role::Student && update.is_hod {
            return Err(AuthError::Forbidden("students cannot be heads of department".into()).into());
        }

        let mut profile = actor.clone();
        profile.full_name = full_name;
        profile.identification_no = identification_no;
        profile.department = department;
        profile.year = year.map(str::to_string);
        profile.designation = update
            .designation
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        profile.is_hod = actor.role == Role::Faculty && update.is_hod;
        profile.is_profile_complete = true;
        profile.updated_at = Utc::now();
        self.storage.save_profile(&profile).await?;
        info!("Profile of {} saved", profile.user_id);
        Ok(profile)
    }

    /// Store a new signature image and drop the previous one.
    pub async fn upload_signature(
        &self,
        actor: &Profile,
        upload: Upload,
    ) -> Result<Profile, PortalError> {
        if !SIGNATURE_TYPES.contains(&upload.content_type.as_str()) {
            return Err(PortalError::Validation("Signature must be a PNG or JPEG image".into()));
        }
        self.validate_upload(&upload, "Signature")?;

        let object = ObjectRef::unique(Folder::Signatures, &upload.content_type);
        self.objects.put(&object, &upload.data).await?;

        let previous = actor.signature_ref.clone();
        let mut profile = actor.clone();
        profile.signature_ref = Some(object.to_string());
        profile.updated_at = Utc::now();
        if let Err(e) = self.storage.save_profile(&profile).await {
            self.discard(&object.to_string()).await;
            return Err(e.into());
        }
        if let Some(previous) = previous {
            self.discard(&previous).await;
        }
        info!("Signature of {} updated", profile.user_id);
        Ok(profile)
    }

    // ----- notifications -----

    pub async fn notifications(&self, actor: &Profile) -> Result<Vec<Notification>, PortalError> {
        require_complete(actor)?;
        Ok(self
            .storage
            .list_notifications(actor.user_id, NOTIFICATION_LIMIT)
            .await?)
    }

    pub async fn mark_read(&self, actor: &Profile, id: Uuid) -> Result<(), PortalError> {
        require_complete(actor)?;
        if self.storage.mark_notification_read(actor.user_id, id).await? {
            Ok(())
        } else {
            Err(PortalError::NotFound("Notification".into()))
        }
    }

    // ----- objects -----

    /// Raw bytes and content type of a stored object.
    pub async fn read_object(
        &self,
        folder: &str,
        name: &str,
    ) -> Result<(Vec<u8>, String), PortalError> {
        let folder: Folder = folder
            .parse()
            .map_err(|_| PortalError::NotFound("File".into()))?;
        let object = ObjectRef::new(folder, name).map_err(|_| PortalError::NotFound("File".into()))?;
        let bytes = self.objects.get(&object).await.map_err(|e| match e {
            ObjectStoreError::NotFound(_) => PortalError::NotFound("File".into()),
            other => PortalError::ObjectStore(other),
        })?;
        let content_type = mime_guess::from_path(&object.name)
            .first_or_octet_stream()
            .to_string();
        Ok((bytes, content_type))
    }

    pub fn object_url(&self, reference: &str) -> Option<String> {
        reference
            .parse::<ObjectRef>()
            .ok()
            .map(|object| self.objects.public_url(&object))
    }

    // ----- maintenance -----

    pub async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, PortalError> {
        let purged = self.storage.purge_expired_sessions(now).await?;
        if purged > 0 {
            info!("Purged {} expired session(s)", purged);
        }
        Ok(purged)
    }

    // ----- shared helpers -----

    pub(crate) async fn load_request(&self, id: Uuid) -> Result<OdRequest, PortalError> {
        self.storage
            .get_request(id)
            .await?
            .ok_or_else(|| PortalError::NotFound("Request".into()))
    }

    pub(crate) fn validate_upload(&self, upload: &Upload, label: &str) -> Result<(), PortalError> {
        if upload.data.is_empty() {
            return Err(PortalError::Validation(format!("{} file is empty", label)));
        }
        if upload.data.len() > self.limits.max_upload_bytes {
            return Err(PortalError::Validation(format!(
                "{} exceeds the {} MB upload limit",
                label,
                self.limits.max_upload_bytes / (1024 * 1024)
            )));
        }
        if !self
            .limits
            .accepted_content_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(&upload.content_type))
        {
            return Err(PortalError::Validation(format!(
                "{} must be a PDF, JPEG or PNG file",
                label
            )));
        }
        Ok(())
    }

    /// Store an upload under a fresh unique name.
    pub(crate) async fn store_upload(
        &self,
        folder: Folder,
        upload: &Upload,
    ) -> Result<ObjectRef, PortalError> {
        let object = ObjectRef::unique(folder, &upload.content_type.to_ascii_lowercase());
        self.objects.put(&object, &upload.data).await?;
        Ok(object)
    }

    /// Fetch an image referenced by a profile or request. Any failure
    /// degrades to `None`.
    pub(crate) async fn load_signature(&self, reference: Option<&str>) -> Option<Vec<u8>> {
        let reference = reference.map(str::trim).filter(|r| !r.is_empty())?;
        let object = match reference.parse::<ObjectRef>() {
            Ok(object) => object,
            Err(e) => {
                warn!("Ignoring signature reference {}: {}", reference, e);
                return None;
            }
        };
        match self.objects.get(&object).await {
            Ok(bytes) => Some(bytes),
            Err(e) => {
                warn!("Signature {} could not be loaded: {}", reference, e);
                None
            }
        }
    }

    /// Best-effort object removal.
    pub(crate) async fn discard(&self, reference: &str) {
        match reference.parse::<ObjectRef>() {
            Ok(object) => {
                if let Err(e) = self.objects.delete(&object).await {
                    warn!("Could not delete {}: {}", reference, e);
                }
            }
            Err(e) => warn!("Not deleting unknown reference {}: {}", reference, e),
        }
    }
}

// ----- access guards -----

pub(crate) fn require_complete(actor: &Profile) -> Result<(), PortalError> {
    if actor.is_profile_complete {
        Ok(())
    } else {
        Err(AuthError::ProfileIncomplete.into())
    }
}

pub(crate) fn require_student(actor: &Profile) -> Result<(), PortalError> {
    require_complete(actor)?;
    match actor.role {
        Role::Student => Ok(()),
        Role::Faculty => Err(AuthError::Forbidden("student access only".into()).into()),
    }
}

pub(crate) fn require_faculty(actor: &Profile) -> Result<(), PortalError> {
    require_complete(actor)?;
    match actor.role {
        Role::Faculty => Ok(()),
        Role::Student => Err(AuthError::Forbidden("faculty access only".into()).into()),
    }
}

pub(crate) fn require_hod(actor: &Profile) -> Result<(), PortalError> {
    require_faculty(actor)?;
    if actor.is_department_head() {
        Ok(())
    } else {
        Err(AuthError::Forbidden("only the head of department can do this".into()).into())
    }
}

pub(crate) fn require_department(actor: &Profile, request: &OdRequest) -> Result<(), PortalError> {
    if actor.same_department(&request.submitter.department) {
        Ok(())
    } else {
        Err(AuthError::Forbidden("request belongs to another department".into()).into())
    }
}

pub(crate) fn require_owner(actor: &Profile, request: &OdRequest) -> Result<(), PortalError> {
    if request.user_id == actor.user_id {
        Ok(())
    } else {
        Err(AuthError::Forbidden("only the submitting student can do this".into()).into())
    }
}

pub(crate) fn required(value: &str, label: &str) -> Result<String, PortalError> {
    let value = value.trim();
    if value.is_empty() {
        Err(PortalError::Validation(format!("{} is required", label)))
    } else {
        Ok(value.to_string())
    }
}

/// Lifetime from configured seconds, capped at [`MAX_TTL_SECS`].
pub(crate) fn ttl(secs: u64) -> Duration {
    Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
}

fn normalize_email(email: &str) -> Result<String, PortalError> {
    let email = email.trim().to_lowercase();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => Ok(email),
        _ => Err(PortalError::Validation("A valid email address is required".into())),
    }
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Constant-time check of `password` against a stored hash.
fn password_matches(salt: &str, password: &str, stored: &str) -> bool {
    hash_password(salt, password)
        .as_bytes()
        .ct_eq(stored.as_bytes())
        .into()
}
