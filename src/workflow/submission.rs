//! Student request submission.

use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;

use super::portal::{required, require_owner, require_student, PortalService};
use super::state_machine::ensure_withdrawable;
use crate::domain::{
    EventCategory, EventDetails, OdRequest, OdStatus, Profile, SubmissionForm, SubmitterSnapshot,
    TeamMember, Upload,
};
use crate::error_handling::types::PortalError;
use crate::letter::{self, LetterImages};
use crate::object_store::{Folder, ObjectRef};
use crate::storage::request_filter;

impl PortalService {
    /// Validate a submission, store its files, render the requisition letter
    /// and persist the request in `Pending Advisor`.
    pub async fn submit_request(
        &self,
        actor: &Profile,
        form: SubmissionForm,
    ) -> Result<OdRequest, PortalError> {
        require_student(actor)?;
        let draft = self.validate_submission(actor, &form)?;
        let registration_proof = form
            .registration_proof
            .as_ref()
            .ok_or_else(|| PortalError::Validation("Registration proof is required".into()))?;
        let event_poster = form
            .event_poster
            .as_ref()
            .ok_or_else(|| PortalError::Validation("Event poster is required".into()))?;

        let mut stored: Vec<ObjectRef> = Vec::new();
        let result = self
            .store_submission(
                draft,
                registration_proof,
                form.payment_proof.as_ref(),
                event_poster,
                &mut stored,
            )
            .await;
        match result {
            Ok(request) => {
                info!(
                    "Request {} submitted by {} ({} participant(s))",
                    request.id,
                    actor.user_id,
                    request.team_members.len() + 1
                );
                Ok(request)
            }
            Err(e) => {
                for object in stored {
                    self.discard(&object.to_string()).await;
                }
                Err(e)
            }
        }
    }

    pub async fn my_requests(&self, actor: &Profile) -> Result<Vec<OdRequest>, PortalError> {
        require_student(actor)?;
        Ok(self
            .storage
            .find_requests(&request_filter::by_owner(actor.user_id))
            .await?)
    }

    /// Take back a request no reviewer has signed off on. The request and
    /// its stored files are removed.
    pub async fn withdraw_request(&self, actor: &Profile, id: Uuid) -> Result<(), PortalError> {
        require_student(actor)?;
        let request = self.load_request(id).await?;
        require_owner(actor, &request)?;
        ensure_withdrawable(request.status)?;

        if !self.storage.delete_request(id, request.status).await? {
            return Err(self.conflict(id, request.status).await);
        }
        for reference in request.object_refs() {
            self.discard(&reference).await;
        }
        info!("Student {} withdrew {} ('{}')", actor.user_id, id, request.status);
        Ok(())
    }

    async fn store_submission(
        &self,
        mut request: OdRequest,
        registration_proof: &Upload,
        payment_proof: Option<&Upload>,
        event_poster: &Upload,
        stored: &mut Vec<ObjectRef>,
    ) -> Result<OdRequest, PortalError> {
        let object = self.store_upload(Folder::RegistrationProofs, registration_proof).await?;
        request.registration_proof_ref = object.to_string();
        stored.push(object);

        if let Some(upload) = payment_proof {
            let object = self.store_upload(Folder::PaymentProofs, upload).await?;
            request.payment_proof_ref = Some(object.to_string());
            stored.push(object);
        }

        let object = self.store_upload(Folder::EventPosters, event_poster).await?;
        request.event_poster_ref = object.to_string();
        stored.push(object);

        match self.write_requisition_letter(&request).await {
            Ok(object) => {
                request.od_letter_ref = Some(object.to_string());
                stored.push(object);
            }
            Err(e) => warn!("Requisition letter for {} not generated: {}", request.id, e),
        }

        self.storage.insert_request(&request).await?;
        Ok(request)
    }

    async fn write_requisition_letter(&self, request: &OdRequest) -> Result<ObjectRef, PortalError> {
        let images = LetterImages {
            lead_signature: self.load_signature(request.lead_signature_ref.as_deref()).await,
            approver_signature: None,
        };
        let bytes = letter::generate(request, &self.institution, None, &images)?;
        let object = ObjectRef::new(Folder::OdLetters, format!("{}_requisition.pdf", request.id))?;
        self.objects.put(&object, &bytes).await?;
        Ok(object)
    }

    /// Every check that must pass before anything is written.
    fn validate_submission(
        &self,
        actor: &Profile,
        form: &SubmissionForm,
    ) -> Result<OdRequest, PortalError> {
        let student_name = required(&form.student_name, "Student name")?;
        let register_no = required(&form.register_no, "Register number")?;
        let roll_no = required(&form.roll_no, "Roll number")?;
        let phone_number = required(&form.phone_number, "Phone number")?;
        let year = required(&form.year, "Year")?;
        let title = required(&form.event_title, "Event title")?;
        let organization_name = required(&form.organization_name, "Organization name")?;
        let organization_location = required(&form.organization_location, "Organization location")?;
        required(&form.event_type, "Event type")?;

        if !self.phone_pattern.is_match(&phone_number) {
            return Err(PortalError::Validation(
                "Phone number must be 7 to 15 digits, optionally starting with +".into(),
            ));
        }
        let category =
            EventCategory::from_selection(&form.event_type, form.custom_event_type.as_deref())
                .map_err(PortalError::Validation)?;

        let start_date = form.event_date;
        let end_date = form.event_end_date.unwrap_or(start_date);
        if end_date < start_date {
            return Err(PortalError::Validation(
                "Event end date cannot be before the start date".into(),
            ));
        }

        let team_members = form
            .team_members
            .iter()
            .enumerate()
            .map(|(index, member)| {
                let label = format!("Team member {}", index + 1);
                let member_year = member.year.trim();
                Ok(TeamMember {
                    id: Uuid::new_v4(),
                    position: index as u32,
                    name: required(&member.name, &format!("{} name", label))?,
                    register_no: required(&member.register_no, &format!("{} register number", label))?,
                    roll_no: required(&member.roll_no, &format!("{} roll number", label))?,
                    year: if member_year.is_empty() { year.clone() } else { member_year.to_string() },
                })
            })
            .collect::<Result<Vec<_>, PortalError>>()?;

        match form.registration_proof {
            Some(ref upload) => self.validate_upload(upload, "Registration proof")?,
            None => return Err(PortalError::Validation("Registration proof is required".into())),
        }
        match form.event_poster {
            Some(ref upload) => self.validate_upload(upload, "Event poster")?,
            None => return Err(PortalError::Validation("Event poster is required".into())),
        }
        if let Some(ref upload) = form.payment_proof {
            self.validate_upload(upload, "Payment proof")?;
        }

        Ok(OdRequest {
            id: Uuid::new_v4(),
            user_id: actor.user_id,
            created_at: Utc::now(),
            submitter: SubmitterSnapshot {
                student_name,
                register_no,
                roll_no,
                phone_number,
                year,
                semester: form.semester.trim().to_string(),
                department: actor.department.clone(),
            },
            event: EventDetails {
                title,
                organization_name,
                organization_location,
                category,
                start_date,
                end_date,
            },
            status: OdStatus::PendingAdvisor,
            registration_proof_ref: String::new(),
            payment_proof_ref: None,
            event_poster_ref: String::new(),
            od_letter_ref: None,
            lead_signature_ref: actor.signature_ref.clone(),
            advisor_id: None,
            hod_id: None,
            remarks: form
                .remarks
                .as_deref()
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(str::to_string),
            achievement_details: None,
            team_members,
            attachments: Vec::new(),
        })
    }
}
