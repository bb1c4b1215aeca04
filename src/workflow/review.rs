//! Faculty review: queues, the two approval stages, archive and deletion.

use log::{error, info, warn};
use uuid::Uuid;

use super::portal::{require_department, require_faculty, require_hod, PortalService};
use super::state_machine::{ensure_purgeable, transition, Action};
use super::views::DashboardStats;
use crate::domain::{Notification, OdRequest, OdStatus, Profile, Severity};
use crate::error_handling::types::{PortalError, WorkflowError};
use crate::letter::{self, LetterImages};
use crate::object_store::{Folder, ObjectRef};
use crate::storage::{RequestFilter, StatusChange};

impl PortalService {
    /// Requests waiting for this faculty member, newest first. Advisors see
    /// `Pending Advisor`; heads of department also see `Pending HOD`.
    pub async fn review_queue(
        &self,
        actor: &Profile,
        search: Option<&str>,
    ) -> Result<Vec<OdRequest>, PortalError> {
        require_faculty(actor)?;
        let mut statuses = vec![OdStatus::PendingAdvisor];
        if actor.is_department_head() {
            statuses.push(OdStatus::PendingHod);
        }
        let filter = RequestFilter {
            department: Some(actor.department.clone()),
            statuses,
            ..Default::default()
        };
        let requests = self.storage.find_requests(&filter).await?;
        let needle = search.map(|s| s.trim().to_lowercase()).filter(|s| !s.is_empty());
        Ok(match needle {
            Some(needle) => requests
                .into_iter()
                .filter(|r| {
                    r.submitter.student_name.to_lowercase().contains(&needle)
                        || r.submitter.register_no.to_lowercase().contains(&needle)
                })
                .collect(),
            None => requests,
        })
    }

    pub async fn dashboard_stats(&self, actor: &Profile) -> Result<DashboardStats, PortalError> {
        require_faculty(actor)?;
        let mut stats = DashboardStats::default();
        for status in OdStatus::ALL {
            stats.set(status, self.storage.count_requests(status).await?);
        }
        Ok(stats)
    }

    /// First-stage decision. Approval forwards to the HOD; no letter yet.
    pub async fn advisor_review(
        &self,
        actor: &Profile,
        id: Uuid,
        approve: bool,
    ) -> Result<OdRequest, PortalError> {
        require_faculty(actor)?;
        let request = self.load_request(id).await?;
        require_department(actor, &request)?;

        let action = if approve { Action::AdvisorApprove } else { Action::AdvisorReject };
        let next = transition(request.status, action)?;
        let notification = if approve {
            Notification::new(
                request.user_id,
                format!(
                    "Your OD request for '{}' was approved by the advisor and forwarded to the HOD.",
                    request.event.title
                ),
                Severity::Info,
            )
        } else {
            Notification::new(
                request.user_id,
                format!("Your OD request for '{}' was rejected by the advisor.", request.event.title),
                Severity::Warning,
            )
        };
        let change = StatusChange::new(id, request.status, next)
            .with_advisor(actor.user_id)
            .with_notification(notification);
        self.commit(&change).await?;
        info!("Advisor {} applied {} to {}", actor.user_id, action, id);
        self.load_request(id).await
    }

    /// Final decision. Approval needs the HOD's signature and produces the
    /// signed letter before the status changes.
    pub async fn hod_review(
        &self,
        actor: &Profile,
        id: Uuid,
        approve: bool,
    ) -> Result<OdRequest, PortalError> {
        require_hod(actor)?;
        let request = self.load_request(id).await?;
        require_department(actor, &request)?;

        if !approve {
            let next = transition(request.status, Action::HodReject)?;
            let change = StatusChange::new(id, request.status, next)
                .with_hod(actor.user_id)
                .with_notification(Notification::new(
                    request.user_id,
                    format!("Your OD request for '{}' was rejected by the HOD.", request.event.title),
                    Severity::Warning,
                ));
            self.commit(&change).await?;
            info!("HOD {} rejected {}", actor.user_id, id);
            return self.load_request(id).await;
        }

        let next = transition(request.status, Action::HodApprove)?;
        if !actor.has_signature() {
            return Err(WorkflowError::MissingSignature.into());
        }

        let images = LetterImages {
            lead_signature: self.load_signature(request.lead_signature_ref.as_deref()).await,
            approver_signature: self.load_signature(actor.signature_ref.as_deref()).await,
        };
        let bytes = letter::generate(&request, &self.institution, Some(actor), &images)?;
        let letter_ref = ObjectRef::new(Folder::OdLetters, format!("{}_approved.pdf", id))?;
        self.objects.put(&letter_ref, &bytes).await?;

        let change = StatusChange::new(id, request.status, next)
            .with_hod(actor.user_id)
            .with_letter(letter_ref.to_string())
            .with_notification(Notification::new(
                request.user_id,
                format!(
                    "Your OD request for '{}' has been approved. The signed letter is ready.",
                    request.event.title
                ),
                Severity::Success,
            ));
        match self.storage.apply_transition(&change).await {
            Ok(true) => {
                info!("HOD {} approved {}, letter at {}", actor.user_id, id, letter_ref);
                let approved = letter_ref.to_string();
                if let Some(superseded) = request.od_letter_ref.filter(|r| *r != approved) {
                    self.discard(&superseded).await;
                }
                self.load_request(id).await
            }
            Ok(false) => {
                self.discard_unclaimed_letter(id, &letter_ref).await;
                Err(self.conflict(id, request.status).await)
            }
            Err(e) => {
                error!("Approval of {} not recorded, removing letter: {}", id, e);
                self.discard(&letter_ref.to_string()).await;
                Err(e.into())
            }
        }
    }

    pub async fn archive(&self, actor: &Profile, id: Uuid) -> Result<OdRequest, PortalError> {
        self.faculty_transition(actor, id, Action::Archive).await
    }

    /// Archived requests always come back to the first review stage.
    pub async fn restore(&self, actor: &Profile, id: Uuid) -> Result<OdRequest, PortalError> {
        self.faculty_transition(actor, id, Action::Restore).await
    }

    /// Permanently remove an archived request and its stored files.
    pub async fn hard_delete(&self, actor: &Profile, id: Uuid) -> Result<(), PortalError> {
        require_hod(actor)?;
        let request = self.load_request(id).await?;
        require_department(actor, &request)?;
        ensure_purgeable(request.status)?;

        if !self.storage.delete_request(id, OdStatus::Archived).await? {
            return Err(self.conflict(id, OdStatus::Archived).await);
        }
        for reference in request.object_refs() {
            self.discard(&reference).await;
        }
        info!("HOD {} permanently deleted {}", actor.user_id, id);
        Ok(())
    }

    async fn faculty_transition(
        &self,
        actor: &Profile,
        id: Uuid,
        action: Action,
    ) -> Result<OdRequest, PortalError> {
        require_faculty(actor)?;
        let request = self.load_request(id).await?;
        require_department(actor, &request)?;
        let next = transition(request.status, action)?;
        self.commit(&StatusChange::new(id, request.status, next)).await?;
        info!("{} applied {} to {} ({} -> {})", actor.user_id, action, id, request.status, next);
        self.load_request(id).await
    }

    /// Apply a status change, turning a lost compare-and-set into `Conflict`.
    async fn commit(&self, change: &StatusChange) -> Result<(), PortalError> {
        if self.storage.apply_transition(change).await? {
            Ok(())
        } else {
            Err(self.conflict(change.request_id, change.expected).await)
        }
    }

    pub(super) async fn conflict(&self, id: Uuid, expected: OdStatus) -> PortalError {
        match self.storage.get_request(id).await {
            Ok(Some(current)) => {
                warn!("Request {} is '{}', expected '{}'", id, current.status, expected);
                WorkflowError::Conflict(expected).into()
            }
            Ok(None) => PortalError::NotFound("Request".into()),
            Err(e) => e.into(),
        }
    }

    /// After a lost race, drop the letter unless the winning write points at it.
    async fn discard_unclaimed_letter(&self, id: Uuid, letter_ref: &ObjectRef) {
        let reference = letter_ref.to_string();
        let claimed = matches!(
            self.storage.get_request(id).await,
            Ok(Some(ref current)) if current.od_letter_ref.as_deref() == Some(reference.as_str())
        );
        if !claimed {
            self.discard(&reference).await;
        }
    }
}
