//! Post-event evidence: photos, certificates and prize records.
//!
//! Every write re-checks the completion rule and, when it holds, advances the
//! request to `Completed` in the same storage transaction.

use std::iter;

use chrono::{DateTime, Utc};
use log::{debug, info};
use uuid::Uuid;

use super::portal::{required, require_owner, require_student, ttl, PortalService};
use super::state_machine::{accepts_evidence, completes_with_evidence, transition, Action};
use crate::domain::{
    Attachment, EvidenceKind, Notification, OdRequest, PrizeDetails, Profile, Severity, Upload,
};
use crate::error_handling::types::{PortalError, WorkflowError};
use crate::object_store::Folder;
use crate::storage::{AttachmentSaved, AttachmentWrite, StatusChange};

impl PortalService {
    /// Add a photo or certificate, or replace the one at `slot`.
    pub async fn upload_evidence(
        &self,
        actor: &Profile,
        id: Uuid,
        kind: EvidenceKind,
        slot: Option<u32>,
        upload: Upload,
    ) -> Result<OdRequest, PortalError> {
        let folder = match kind {
            EvidenceKind::Photo => Folder::Evidence,
            EvidenceKind::Certificate => Folder::Certificates,
            EvidenceKind::Prize => {
                return Err(PortalError::Validation(
                    "Prize files go through the prize upload".into(),
                ))
            }
        };
        let request = self.load_owned_for_evidence(actor, id).await?;
        self.validate_upload(&upload, "Evidence")?;

        let replaced = match slot {
            Some(position) => Some(
                request
                    .evidence_of(kind)
                    .find(|a| a.position == position)
                    .cloned()
                    .ok_or_else(|| PortalError::NotFound("Attachment".into()))?,
            ),
            None => None,
        };

        let object = self.store_upload(folder, &upload).await?;
        let (attachment, write) = match replaced {
            Some(ref previous) => (
                Attachment {
                    object_ref: Some(object.to_string()),
                    ..previous.clone()
                },
                AttachmentWrite::Replace,
            ),
            None => (
                Attachment {
                    id: Uuid::new_v4(),
                    request_id: id,
                    kind,
                    position: request.next_position(kind),
                    object_ref: Some(object.to_string()),
                    prize: None,
                    finalized: true,
                    created_at: Utc::now(),
                },
                AttachmentWrite::Append,
            ),
        };
        let position = match self.persist_evidence(&request, &attachment, write).await {
            Ok(position) => position,
            Err(e) => {
                self.discard(&object.to_string()).await;
                return Err(e);
            }
        };
        if let Some(old) = replaced.and_then(|a| a.object_ref) {
            self.discard(&old).await;
        }
        info!(
            "{} {} stored at position {} on {}",
            kind.as_str(),
            attachment.id,
            position,
            id
        );
        self.load_request(id).await
    }

    /// Remove one piece of evidence. The status never goes back.
    pub async fn remove_evidence(
        &self,
        actor: &Profile,
        id: Uuid,
        attachment_id: Uuid,
    ) -> Result<OdRequest, PortalError> {
        self.load_owned_for_evidence(actor, id).await?;
        let removed = self
            .storage
            .remove_attachment(id, attachment_id)
            .await?
            .ok_or_else(|| PortalError::NotFound("Attachment".into()))?;
        if let Some(reference) = removed.object_ref {
            self.discard(&reference).await;
        }
        info!("{} {} removed from {}", removed.kind.as_str(), attachment_id, id);
        self.load_request(id).await
    }

    /// First half of a prize upload: the file is kept as a pending record
    /// until `finalize_prize` supplies its details.
    pub async fn stage_prize(
        &self,
        actor: &Profile,
        id: Uuid,
        upload: Upload,
    ) -> Result<Attachment, PortalError> {
        let request = self.load_owned_for_evidence(actor, id).await?;
        self.validate_upload(&upload, "Prize evidence")?;

        let object = self.store_upload(Folder::Certificates, &upload).await?;
        let mut attachment = Attachment {
            id: Uuid::new_v4(),
            request_id: id,
            kind: EvidenceKind::Prize,
            position: request.next_position(EvidenceKind::Prize),
            object_ref: Some(object.to_string()),
            prize: None,
            finalized: false,
            created_at: Utc::now(),
        };
        match self.persist_evidence(&request, &attachment, AttachmentWrite::Append).await {
            Ok(position) => attachment.position = position,
            Err(e) => {
                self.discard(&object.to_string()).await;
                return Err(e);
            }
        }
        info!("Prize upload {} staged on {}", attachment.id, id);
        Ok(attachment)
    }

    pub async fn finalize_prize(
        &self,
        actor: &Profile,
        id: Uuid,
        attachment_id: Uuid,
        prize_type: &str,
        event_name: &str,
    ) -> Result<OdRequest, PortalError> {
        let prize = prize_details(prize_type, event_name)?;
        let request = self.load_owned_for_evidence(actor, id).await?;
        let mut attachment = request
            .evidence_of(EvidenceKind::Prize)
            .find(|a| a.id == attachment_id && !a.finalized)
            .cloned()
            .ok_or_else(|| PortalError::NotFound("Attachment".into()))?;
        attachment.prize = Some(prize);
        attachment.finalized = true;
        self.persist_evidence(&request, &attachment, AttachmentWrite::Finalize)
            .await?;
        info!("Prize {} finalized on {}", attachment_id, id);
        self.load_request(id).await
    }

    /// A prize entry without an evidence file.
    pub async fn add_prize_record(
        &self,
        actor: &Profile,
        id: Uuid,
        prize_type: &str,
        event_name: &str,
    ) -> Result<OdRequest, PortalError> {
        let prize = prize_details(prize_type, event_name)?;
        let request = self.load_owned_for_evidence(actor, id).await?;
        let attachment = Attachment {
            id: Uuid::new_v4(),
            request_id: id,
            kind: EvidenceKind::Prize,
            position: request.next_position(EvidenceKind::Prize),
            object_ref: None,
            prize: Some(prize),
            finalized: true,
            created_at: Utc::now(),
        };
        self.persist_evidence(&request, &attachment, AttachmentWrite::Append)
            .await?;
        info!("Prize record {} added to {}", attachment.id, id);
        self.load_request(id).await
    }

    /// Drop prize uploads whose details never arrived.
    pub async fn purge_stale_staging(&self, now: DateTime<Utc>) -> Result<usize, PortalError> {
        let cutoff = now - ttl(self.limits.prize_staging_ttl_secs);
        let stale = self.storage.staged_attachments_before(cutoff).await?;
        let mut purged = 0;
        for attachment in stale {
            if let Some(removed) = self
                .storage
                .remove_attachment(attachment.request_id, attachment.id)
                .await?
            {
                if let Some(reference) = removed.object_ref {
                    self.discard(&reference).await;
                }
                purged += 1;
            }
        }
        if purged > 0 {
            info!("Purged {} stale prize upload(s)", purged);
        }
        Ok(purged)
    }

    async fn load_owned_for_evidence(
        &self,
        actor: &Profile,
        id: Uuid,
    ) -> Result<OdRequest, PortalError> {
        require_student(actor)?;
        let request = self.load_request(id).await?;
        require_owner(actor, &request)?;
        accepts_evidence(request.status)?;
        Ok(request)
    }

    /// Save `attachment`, completing the request when the evidence now
    /// qualifies. Returns the position the row was written at.
    async fn persist_evidence(
        &self,
        request: &OdRequest,
        attachment: &Attachment,
        write: AttachmentWrite,
    ) -> Result<u32, PortalError> {
        let evidence = request
            .attachments
            .iter()
            .filter(|a| a.id != attachment.id)
            .chain(iter::once(attachment));
        let completion = if completes_with_evidence(request.status, evidence) {
            let next = transition(request.status, Action::EvidenceComplete)?;
            Some(
                StatusChange::new(request.id, request.status, next).with_notification(
                    Notification::new(
                        request.user_id,
                        format!(
                            "Your OD request for '{}' is now marked as completed.",
                            request.event.title
                        ),
                        Severity::Success,
                    ),
                ),
            )
        } else {
            None
        };

        match self
            .storage
            .save_attachment(attachment, write, completion.as_ref())
            .await?
        {
            AttachmentSaved::Written { position, completed } => {
                if completed {
                    info!("Request {} completed with evidence", request.id);
                } else if completion.is_some() {
                    debug!("Request {} already left '{}'", request.id, request.status);
                }
                Ok(position)
            }
            AttachmentSaved::Missing => Err(PortalError::NotFound("Attachment".into())),
            AttachmentSaved::Closed => {
                let current = self.load_request(request.id).await?;
                accepts_evidence(current.status)?;
                Err(WorkflowError::Conflict(request.status).into())
            }
        }
    }
}

fn prize_details(prize_type: &str, event_name: &str) -> Result<PrizeDetails, PortalError> {
    Ok(PrizeDetails {
        prize_type: required(prize_type, "Prize type")?,
        event_name: required(event_name, "Prize event name")?,
    })
}
