//! End-to-end scenarios through `PortalService` against a real SQLite file
//! and object tree.

use std::sync::Arc;

use chrono::{Duration, NaiveDate, Utc};
use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};

use crate::configuration::{InstitutionConfig, LimitsConfig};
use crate::domain::{
    EvidenceKind, OdRequest, OdStatus, Profile, ProfileUpdate, Role, Severity, SubmissionForm,
    TeamMemberInput, Upload,
};
use crate::error_handling::types::{AuthError, PortalError, WorkflowError};
use crate::object_store::FileObjectStore;
use crate::storage::DatabaseStorage;
use crate::workflow::PortalService;

const DEPARTMENT: &str = "Civil Engineering";
const PASSWORD: &str = "password123";
const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nnot-really-an-image";

struct Fixture {
    _dir: TempDir,
    portal: PortalService,
}

async fn fixture() -> Fixture {
    let dir = TempDir::new().unwrap();
    let storage = DatabaseStorage::new_file(dir.path().join("portal.sqlite3"))
        .await
        .unwrap();
    let objects = FileObjectStore::new(dir.path().join("objects"), "http://localhost:8080").unwrap();
    let portal = PortalService::new(
        Arc::new(storage),
        Arc::new(objects),
        InstitutionConfig::default(),
        LimitsConfig::default(),
    )
    .unwrap();
    Fixture { _dir: dir, portal }
}

fn pdf() -> Upload {
    Upload {
        file_name: "proof.pdf".into(),
        content_type: "application/pdf".into(),
        data: b"%PDF-1.4 proof".to_vec(),
    }
}

fn png() -> Upload {
    Upload {
        file_name: "image.png".into(),
        content_type: "image/png".into(),
        data: FAKE_PNG.to_vec(),
    }
}

async fn user(
    portal: &PortalService,
    email: &str,
    name: &str,
    role: Role,
    department: &str,
    is_hod: bool,
) -> Profile {
    let profile = portal.register(email, PASSWORD, role).await.unwrap();
    portal
        .complete_profile(
            &profile,
            ProfileUpdate {
                full_name: name.into(),
                identification_no: format!("ID-{}", name),
                department: department.into(),
                year: (role == Role::Student).then(|| "3".to_string()),
                designation: (role == Role::Faculty).then(|| "Assistant Professor".to_string()),
                is_hod,
            },
        )
        .await
        .unwrap()
}

async fn student(portal: &PortalService) -> Profile {
    user(portal, "asha@college.edu", "Asha", Role::Student, DEPARTMENT, false).await
}

async fn advisor(portal: &PortalService) -> Profile {
    user(portal, "ravi@college.edu", "Ravi Kumar", Role::Faculty, DEPARTMENT, false).await
}

async fn hod(portal: &PortalService, with_signature: bool) -> Profile {
    let hod = user(portal, "hod@college.edu", "Dr. Meena", Role::Faculty, DEPARTMENT, true).await;
    if with_signature {
        portal.upload_signature(&hod, png()).await.unwrap()
    } else {
        hod
    }
}

fn form() -> SubmissionForm {
    SubmissionForm {
        student_name: "Asha".into(),
        register_no: "7376221CE101".into(),
        roll_no: "21CE101".into(),
        phone_number: "+91 98765 43210".into(),
        year: "3".into(),
        semester: "5".into(),
        event_title: "Bridge Design Workshop".into(),
        organization_name: "PSG Tech".into(),
        organization_location: "Coimbatore".into(),
        event_type: "Workshop".into(),
        custom_event_type: None,
        event_date: NaiveDate::from_ymd_opt(2026, 3, 14).unwrap(),
        event_end_date: None,
        team_members: vec![],
        remarks: Some("  ".into()),
        registration_proof: Some(pdf()),
        payment_proof: None,
        event_poster: Some(png()),
    }
}

fn object_name(reference: &str) -> (&str, &str) {
    reference.split_once('/').unwrap()
}

/// Submit and take the request through both approvals.
async fn approved_request(portal: &PortalService) -> (Profile, Profile, OdRequest) {
    let student = student(portal).await;
    let advisor = advisor(portal).await;
    let hod = hod(portal, true).await;
    let request = portal.submit_request(&student, form()).await.unwrap();
    portal.advisor_review(&advisor, request.id, true).await.unwrap();
    let request = portal.hod_review(&hod, request.id, true).await.unwrap();
    assert_eq!(request.status, OdStatus::Approved);
    (student, hod, request)
}

#[tokio::test]
async fn test_submission_defaults_end_date_and_writes_requisition_letter() {
    let f = fixture().await;
    let student = student(&f.portal).await;

    let request = f.portal.submit_request(&student, form()).await.unwrap();
    assert_eq!(request.status, OdStatus::PendingAdvisor);
    assert_eq!(request.event.end_date, request.event.start_date);
    assert_eq!(request.submitter.department, DEPARTMENT);
    assert_eq!(request.remarks, None);

    let letter = request.od_letter_ref.clone().unwrap();
    assert_eq!(letter, format!("od_letters/{}_requisition.pdf", request.id));
    let (folder, name) = object_name(&letter);
    let (bytes, content_type) = f.portal.read_object(folder, name).await.unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(content_type, "application/pdf");

    let mine = f.portal.my_requests(&student).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].id, request.id);
}

#[tokio::test]
async fn test_team_submission_keeps_member_order_and_year_fallback() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let mut team = form();
    team.team_members = vec![
        TeamMemberInput {
            name: "Bala".into(),
            register_no: "7376221CE102".into(),
            roll_no: "21CE102".into(),
            year: "".into(),
        },
        TeamMemberInput {
            name: "Chitra".into(),
            register_no: "7376221CE203".into(),
            roll_no: "21CE203".into(),
            year: "2".into(),
        },
    ];

    let request = f.portal.submit_request(&student, team).await.unwrap();
    let loaded = f.portal.load_request(request.id).await.unwrap();
    let names: Vec<&str> = loaded.team_members.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(names, vec!["Bala", "Chitra"]);
    assert_eq!(loaded.team_members[0].year, "3");
    assert_eq!(loaded.team_members[1].year, "2");
}

#[tokio::test]
async fn test_submission_validation_writes_nothing() {
    let f = fixture().await;
    let student = student(&f.portal).await;

    let mut bad_dates = form();
    bad_dates.event_end_date = Some(NaiveDate::from_ymd_opt(2026, 3, 10).unwrap());
    let err = f.portal.submit_request(&student, bad_dates).await.unwrap_err();
    assert!(matches!(err, PortalError::Validation(_)));

    let mut bad_phone = form();
    bad_phone.phone_number = "98-76".into();
    assert!(matches!(
        f.portal.submit_request(&student, bad_phone).await,
        Err(PortalError::Validation(_))
    ));

    let mut no_poster = form();
    no_poster.event_poster = None;
    assert_err!(f.portal.submit_request(&student, no_poster).await);

    let mut too_big = form();
    too_big.registration_proof = Some(Upload {
        data: vec![0u8; LimitsConfig::default().max_upload_bytes + 1],
        ..pdf()
    });
    assert_err!(f.portal.submit_request(&student, too_big).await);

    let mut other = form();
    other.event_type = "Other".into();
    other.custom_event_type = Some(" ".into());
    assert_err!(f.portal.submit_request(&student, other).await);

    assert!(f.portal.my_requests(&student).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submission_requires_complete_student_profile() {
    let f = fixture().await;
    let faculty = advisor(&f.portal).await;
    assert!(matches!(
        f.portal.submit_request(&faculty, form()).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));

    let blank = f
        .portal
        .register("new@college.edu", PASSWORD, Role::Student)
        .await
        .unwrap();
    assert!(matches!(
        f.portal.submit_request(&blank, form()).await,
        Err(PortalError::Auth(AuthError::ProfileIncomplete))
    ));
}

#[tokio::test]
async fn test_hod_without_signature_cannot_approve() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let advisor = advisor(&f.portal).await;
    let hod = hod(&f.portal, false).await;

    let request = f.portal.submit_request(&student, form()).await.unwrap();
    let request = f.portal.advisor_review(&advisor, request.id, true).await.unwrap();
    assert_eq!(request.status, OdStatus::PendingHod);
    assert_eq!(request.advisor_id, Some(advisor.user_id));

    let err = f.portal.hod_review(&hod, request.id, true).await.unwrap_err();
    assert!(matches!(err, PortalError::Workflow(WorkflowError::MissingSignature)));

    let loaded = f.portal.load_request(request.id).await.unwrap();
    assert_eq!(loaded.status, OdStatus::PendingHod);
    assert_eq!(loaded.hod_id, None);
    assert!(matches!(
        f.portal
            .read_object("od_letters", &format!("{}_approved.pdf", request.id))
            .await,
        Err(PortalError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_full_approval_writes_letter_and_notifies() {
    let f = fixture().await;
    let (student, hod, request) = approved_request(&f.portal).await;

    let letter = request.od_letter_ref.clone().unwrap();
    assert_eq!(letter, format!("od_letters/{}_approved.pdf", request.id));
    assert_eq!(request.hod_id, Some(hod.user_id));
    let (folder, name) = object_name(&letter);
    assert_ok!(f.portal.read_object(folder, name).await);

    let notifications = f.portal.notifications(&student).await.unwrap();
    assert_eq!(notifications.len(), 2);
    assert_eq!(notifications[0].severity, Severity::Success);
    assert_eq!(notifications[1].severity, Severity::Info);

    f.portal.mark_read(&student, notifications[0].id).await.unwrap();
    assert!(f.portal.notifications(&student).await.unwrap()[0].read);
    assert!(matches!(
        f.portal.mark_read(&hod, notifications[1].id).await,
        Err(PortalError::NotFound(_))
    ));

    // A second approval is no longer a legal transition.
    assert!(matches!(
        f.portal.hod_review(&hod, request.id, true).await,
        Err(PortalError::Workflow(WorkflowError::InvalidTransition { .. }))
    ));
}

#[tokio::test]
async fn test_rejection_notifies_with_warning() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let advisor = advisor(&f.portal).await;
    let request = f.portal.submit_request(&student, form()).await.unwrap();

    let request = f.portal.advisor_review(&advisor, request.id, false).await.unwrap();
    assert_eq!(request.status, OdStatus::Rejected);
    let notifications = f.portal.notifications(&student).await.unwrap();
    assert_eq!(notifications[0].severity, Severity::Warning);

    assert_err!(f.portal.advisor_review(&advisor, request.id, true).await);
}

#[tokio::test]
async fn test_other_department_and_role_are_refused() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let outsider = user(
        &f.portal,
        "mech@college.edu",
        "Outsider",
        Role::Faculty,
        "Mechanical Engineering",
        true,
    )
    .await;
    let advisor = advisor(&f.portal).await;
    let request = f.portal.submit_request(&student, form()).await.unwrap();

    assert!(matches!(
        f.portal.advisor_review(&outsider, request.id, true).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));
    assert!(matches!(
        f.portal.advisor_review(&student, request.id, true).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));

    f.portal.advisor_review(&advisor, request.id, true).await.unwrap();
    // Plain advisors cannot take the HOD stage.
    assert!(matches!(
        f.portal.hod_review(&advisor, request.id, true).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));
}

#[tokio::test]
async fn test_concurrent_reviews_apply_once() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let advisor = advisor(&f.portal).await;
    let request = f.portal.submit_request(&student, form()).await.unwrap();

    let (first, second) = tokio::join!(
        f.portal.advisor_review(&advisor, request.id, true),
        f.portal.advisor_review(&advisor, request.id, false)
    );
    let outcomes = [first, second];
    assert_eq!(outcomes.iter().filter(|r| r.is_ok()).count(), 1);
    for outcome in outcomes.iter().filter_map(|r| r.as_ref().err()) {
        assert!(matches!(
            outcome,
            PortalError::Workflow(WorkflowError::Conflict(_))
                | PortalError::Workflow(WorkflowError::InvalidTransition { .. })
        ));
    }
}

#[tokio::test]
async fn test_review_queue_and_stats() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let advisor = advisor(&f.portal).await;
    let hod = hod(&f.portal, true).await;
    let first = f.portal.submit_request(&student, form()).await.unwrap();
    let second = f.portal.submit_request(&student, form()).await.unwrap();
    f.portal.advisor_review(&advisor, first.id, true).await.unwrap();

    let queue = f.portal.review_queue(&advisor, None).await.unwrap();
    assert_eq!(queue.len(), 1);
    assert_eq!(queue[0].id, second.id);

    let queue = f.portal.review_queue(&hod, None).await.unwrap();
    assert_eq!(queue.len(), 2);
    assert_eq!(f.portal.review_queue(&hod, Some("asha")).await.unwrap().len(), 2);
    assert!(f.portal.review_queue(&hod, Some("nobody")).await.unwrap().is_empty());

    let stats = f.portal.dashboard_stats(&advisor).await.unwrap();
    assert_eq!(stats.pending_advisor, 1);
    assert_eq!(stats.pending_hod, 1);
    assert_eq!(stats.approved, 0);
    assert_err!(f.portal.dashboard_stats(&student).await);
}

#[tokio::test]
async fn test_tracking() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    f.portal.submit_request(&student, form()).await.unwrap();

    let result = f.portal.track(" 7376221CE101 ").await.unwrap();
    assert!(result.found);
    assert_eq!(result.requests.len(), 1);
    assert_eq!(result.requests[0].status, OdStatus::PendingAdvisor);

    let empty = f.portal.track("0000").await.unwrap();
    assert!(!empty.found);
    assert!(empty.requests.is_empty());
    assert!(empty.message.is_some());

    assert!(matches!(f.portal.track("   ").await, Err(PortalError::Validation(_))));
}

#[tokio::test]
async fn test_archive_and_restore() {
    let f = fixture().await;
    let (_, hod, request) = approved_request(&f.portal).await;

    let archived = f.portal.archive(&hod, request.id).await.unwrap();
    assert_eq!(archived.status, OdStatus::Archived);
    assert_err!(f.portal.archive(&hod, request.id).await);

    let restored = f.portal.restore(&hod, request.id).await.unwrap();
    assert_eq!(restored.status, OdStatus::PendingAdvisor);
    assert!(matches!(
        f.portal.restore(&hod, request.id).await,
        Err(PortalError::Workflow(WorkflowError::InvalidTransition { .. }))
    ));
}

#[tokio::test]
async fn test_certificate_completes_request() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;

    let after_photo = f
        .portal
        .upload_evidence(&student, request.id, EvidenceKind::Photo, None, png())
        .await
        .unwrap();
    assert_eq!(after_photo.status, OdStatus::Approved);

    let after_cert = f
        .portal
        .upload_evidence(&student, request.id, EvidenceKind::Certificate, None, pdf())
        .await
        .unwrap();
    assert_eq!(after_cert.status, OdStatus::Completed);
    let certificate = after_cert.evidence_of(EvidenceKind::Certificate).next().unwrap().clone();
    assert_eq!(certificate.position, 0);

    // Replacing a slot keeps the attachment identity and drops the old file.
    let replaced = f
        .portal
        .upload_evidence(&student, request.id, EvidenceKind::Certificate, Some(0), pdf())
        .await
        .unwrap();
    let updated = replaced.evidence_of(EvidenceKind::Certificate).next().unwrap();
    assert_eq!(updated.id, certificate.id);
    assert_ne!(updated.object_ref, certificate.object_ref);
    let (folder, name) = object_name(certificate.object_ref.as_deref().unwrap());
    assert!(matches!(
        f.portal.read_object(folder, name).await,
        Err(PortalError::NotFound(_))
    ));

    let after_remove = f
        .portal
        .remove_evidence(&student, request.id, certificate.id)
        .await
        .unwrap();
    assert_eq!(after_remove.status, OdStatus::Completed);
    assert_eq!(after_remove.evidence_of(EvidenceKind::Certificate).count(), 0);
}

#[tokio::test]
async fn test_evidence_rules() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let request = f.portal.submit_request(&student, form()).await.unwrap();

    assert!(matches!(
        f.portal
            .upload_evidence(&student, request.id, EvidenceKind::Certificate, None, pdf())
            .await,
        Err(PortalError::Workflow(WorkflowError::EvidenceNotAllowed(_)))
    ));

    let (owner, _, approved) = approved_request_for_second_student(&f.portal).await;
    assert!(matches!(
        f.portal
            .upload_evidence(&student, approved.id, EvidenceKind::Photo, None, png())
            .await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));
    assert!(matches!(
        f.portal
            .upload_evidence(&owner, approved.id, EvidenceKind::Photo, Some(4), png())
            .await,
        Err(PortalError::NotFound(_))
    ));
    assert_err!(
        f.portal
            .upload_evidence(&owner, approved.id, EvidenceKind::Prize, None, pdf())
            .await
    );
}

async fn approved_request_for_second_student(
    portal: &PortalService,
) -> (Profile, Profile, OdRequest) {
    let owner = user(portal, "bala@college.edu", "Bala", Role::Student, DEPARTMENT, false).await;
    let advisor = advisor(portal).await;
    let hod = hod(portal, true).await;
    let request = portal.submit_request(&owner, form()).await.unwrap();
    portal.advisor_review(&advisor, request.id, true).await.unwrap();
    let request = portal.hod_review(&hod, request.id, true).await.unwrap();
    (owner, hod, request)
}

#[tokio::test]
async fn test_staged_prize_completes_only_when_finalized() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;

    let staged = f.portal.stage_prize(&student, request.id, pdf()).await.unwrap();
    assert!(!staged.finalized);
    let loaded = f.portal.load_request(request.id).await.unwrap();
    assert_eq!(loaded.status, OdStatus::Approved);

    assert!(matches!(
        f.portal
            .finalize_prize(&student, request.id, staged.id, "First Prize", " ")
            .await,
        Err(PortalError::Validation(_))
    ));

    let finalized = f
        .portal
        .finalize_prize(&student, request.id, staged.id, "First Prize", "Quiz")
        .await
        .unwrap();
    assert_eq!(finalized.status, OdStatus::Completed);
    let prize = finalized.evidence_of(EvidenceKind::Prize).next().unwrap();
    assert!(prize.finalized);
    assert_eq!(prize.prize.as_ref().unwrap().event_name, "Quiz");
}

#[tokio::test]
async fn test_prize_record_without_file_does_not_complete() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;

    let updated = f
        .portal
        .add_prize_record(&student, request.id, "Runner Up", "Paper Contest")
        .await
        .unwrap();
    assert_eq!(updated.status, OdStatus::Approved);
    assert_eq!(updated.evidence_of(EvidenceKind::Prize).count(), 1);
}

#[tokio::test]
async fn test_stale_staging_is_purged() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;
    let staged = f.portal.stage_prize(&student, request.id, pdf()).await.unwrap();

    assert_eq!(f.portal.purge_stale_staging(Utc::now()).await.unwrap(), 0);
    let later = Utc::now() + Duration::hours(2);
    assert_eq!(f.portal.purge_stale_staging(later).await.unwrap(), 1);

    let loaded = f.portal.load_request(request.id).await.unwrap();
    assert!(loaded.attachments.is_empty());
    let (folder, name) = object_name(staged.object_ref.as_deref().unwrap());
    assert_err!(f.portal.read_object(folder, name).await);
}

#[tokio::test]
async fn test_hard_delete_only_from_archive() {
    let f = fixture().await;
    let (_, hod, request) = approved_request(&f.portal).await;
    let (_, advisor) = f.portal.login("ravi@college.edu", PASSWORD).await.unwrap();

    assert!(matches!(
        f.portal.hard_delete(&hod, request.id).await,
        Err(PortalError::Workflow(WorkflowError::NotPurgeable(OdStatus::Approved)))
    ));
    f.portal.archive(&advisor, request.id).await.unwrap();
    assert!(matches!(
        f.portal.hard_delete(&advisor, request.id).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));

    assert_ok!(f.portal.hard_delete(&hod, request.id).await);
    assert!(matches!(
        f.portal.load_request(request.id).await,
        Err(PortalError::NotFound(_))
    ));
    let (folder, name) = object_name(&request.registration_proof_ref);
    assert_err!(f.portal.read_object(folder, name).await);
}

#[tokio::test]
async fn test_registry_and_export() {
    let f = fixture().await;
    let (student, hod, request) = approved_request(&f.portal).await;
    f.portal.submit_request(&student, form()).await.unwrap();

    let registry = f.portal.registry(&hod, None).await.unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(f.portal.registry(&hod, Some("bridge")).await.unwrap().len(), 1);
    assert!(f.portal.registry(&hod, Some("robotics")).await.unwrap().is_empty());

    let updated = f
        .portal
        .update_achievement(&hod, request.id, "  Best paper award ")
        .await
        .unwrap();
    assert_eq!(updated.achievement_details.as_deref(), Some("Best paper award"));
    let cleared = f.portal.update_achievement(&hod, request.id, "  ").await.unwrap();
    assert_eq!(cleared.achievement_details, None);

    let export = f.portal.export_registry(&hod, None).await.unwrap();
    assert!(export.file_name.starts_with("OD_Registry_"));
    assert!(export.file_name.ends_with(".xlsx"));
    assert!(export.bytes.starts_with(b"PK"));
    assert_err!(f.portal.export_registry(&student, None).await);
}

#[tokio::test]
async fn test_login_sessions() {
    let f = fixture().await;
    let student = student(&f.portal).await;

    assert!(matches!(
        f.portal.register("ASHA@college.edu", PASSWORD, Role::Student).await,
        Err(PortalError::Auth(AuthError::EmailTaken))
    ));
    assert!(matches!(
        f.portal.login("asha@college.edu", "wrong-password").await,
        Err(PortalError::Auth(AuthError::InvalidCredentials))
    ));

    let (session, profile) = f.portal.login(" Asha@College.edu ", PASSWORD).await.unwrap();
    assert_eq!(profile.user_id, student.user_id);
    let actor = f.portal.authenticate(Some(&session.token)).await.unwrap();
    assert_eq!(actor.full_name, "Asha");

    f.portal.logout(&session.token).await.unwrap();
    assert!(matches!(
        f.portal.authenticate(Some(&session.token)).await,
        Err(PortalError::Auth(AuthError::MissingSession))
    ));
    assert!(matches!(
        f.portal.authenticate(None).await,
        Err(PortalError::Auth(AuthError::MissingSession))
    ));
}

#[tokio::test]
async fn test_signature_upload_replaces_previous_object() {
    let f = fixture().await;
    let hod = hod(&f.portal, true).await;
    let first = hod.signature_ref.clone().unwrap();

    let updated = f.portal.upload_signature(&hod, png()).await.unwrap();
    assert_ne!(updated.signature_ref.as_deref(), Some(first.as_str()));
    let (folder, name) = object_name(&first);
    assert_err!(f.portal.read_object(folder, name).await);

    assert!(matches!(
        f.portal.upload_signature(&updated, pdf()).await,
        Err(PortalError::Validation(_))
    ));
}

#[tokio::test]
async fn test_approval_replaces_requisition_letter_and_delete_clears_both() {
    let f = fixture().await;
    let (_, hod, request) = approved_request(&f.portal).await;
    let requisition = format!("{}_requisition.pdf", request.id);
    let approved = format!("{}_approved.pdf", request.id);

    assert!(matches!(
        f.portal.read_object("od_letters", &requisition).await,
        Err(PortalError::NotFound(_))
    ));
    assert_ok!(f.portal.read_object("od_letters", &approved).await);

    f.portal.archive(&hod, request.id).await.unwrap();
    f.portal.hard_delete(&hod, request.id).await.unwrap();
    for name in [&requisition, &approved] {
        assert!(matches!(
            f.portal.read_object("od_letters", name).await,
            Err(PortalError::NotFound(_))
        ));
    }
}

#[tokio::test]
async fn test_replacing_a_photo_keeps_upload_order() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;
    for _ in 0..2 {
        f.portal
            .upload_evidence(&student, request.id, EvidenceKind::Photo, None, png())
            .await
            .unwrap();
    }
    let before: Vec<_> = f
        .portal
        .load_request(request.id)
        .await
        .unwrap()
        .evidence_of(EvidenceKind::Photo)
        .cloned()
        .collect();

    let after = f
        .portal
        .upload_evidence(&student, request.id, EvidenceKind::Photo, Some(0), png())
        .await
        .unwrap();
    let photos: Vec<_> = after.evidence_of(EvidenceKind::Photo).collect();
    let positions: Vec<u32> = photos.iter().map(|a| a.position).collect();
    assert_eq!(positions, vec![0, 1]);
    assert_eq!(photos[0].id, before[0].id);
    assert_ne!(photos[0].object_ref, before[0].object_ref);
    assert_eq!(photos[1].object_ref, before[1].object_ref);
    assert_eq!(
        photos[0].created_at.timestamp_micros(),
        before[0].created_at.timestamp_micros()
    );
}

#[tokio::test]
async fn test_concurrent_photo_uploads_get_distinct_positions() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;

    let (first, second) = tokio::join!(
        f.portal
            .upload_evidence(&student, request.id, EvidenceKind::Photo, None, png()),
        f.portal
            .upload_evidence(&student, request.id, EvidenceKind::Photo, None, png())
    );
    first.unwrap();
    second.unwrap();
    let loaded = f.portal.load_request(request.id).await.unwrap();
    let positions: Vec<u32> = loaded.evidence_of(EvidenceKind::Photo).map(|a| a.position).collect();
    assert_eq!(positions, vec![0, 1]);
}

#[tokio::test]
async fn test_finalizing_a_purged_prize_is_not_found() {
    let f = fixture().await;
    let (student, _, request) = approved_request(&f.portal).await;
    let staged = f.portal.stage_prize(&student, request.id, pdf()).await.unwrap();
    assert_eq!(
        f.portal
            .purge_stale_staging(Utc::now() + Duration::days(2))
            .await
            .unwrap(),
        1
    );

    assert!(matches!(
        f.portal
            .finalize_prize(&student, request.id, staged.id, "First Prize", "Quiz")
            .await,
        Err(PortalError::NotFound(_))
    ));
    let loaded = f.portal.load_request(request.id).await.unwrap();
    assert!(loaded.attachments.is_empty());
    assert_eq!(loaded.status, OdStatus::Approved);
}

#[tokio::test]
async fn test_archived_request_takes_no_evidence() {
    let f = fixture().await;
    let (student, hod, request) = approved_request(&f.portal).await;
    f.portal.archive(&hod, request.id).await.unwrap();

    assert!(matches!(
        f.portal
            .upload_evidence(&student, request.id, EvidenceKind::Certificate, None, pdf())
            .await,
        Err(PortalError::Workflow(WorkflowError::EvidenceNotAllowed(OdStatus::Archived)))
    ));
    assert!(matches!(
        f.portal
            .add_prize_record(&student, request.id, "First Prize", "Quiz")
            .await,
        Err(PortalError::Workflow(WorkflowError::EvidenceNotAllowed(OdStatus::Archived)))
    ));
    let loaded = f.portal.load_request(request.id).await.unwrap();
    assert!(loaded.attachments.is_empty());
}

#[tokio::test]
async fn test_withdraw_request() {
    let f = fixture().await;
    let student = student(&f.portal).await;
    let advisor = advisor(&f.portal).await;
    let other = user(&f.portal, "bala@college.edu", "Bala", Role::Student, DEPARTMENT, false).await;

    let pending = f.portal.submit_request(&student, form()).await.unwrap();
    assert!(matches!(
        f.portal.withdraw_request(&other, pending.id).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));
    assert!(matches!(
        f.portal.withdraw_request(&advisor, pending.id).await,
        Err(PortalError::Auth(AuthError::Forbidden(_)))
    ));
    f.portal.withdraw_request(&student, pending.id).await.unwrap();
    assert!(matches!(
        f.portal.load_request(pending.id).await,
        Err(PortalError::NotFound(_))
    ));
    let (folder, name) = object_name(&pending.registration_proof_ref);
    assert_err!(f.portal.read_object(folder, name).await);
    assert!(matches!(
        f.portal
            .read_object("od_letters", &format!("{}_requisition.pdf", pending.id))
            .await,
        Err(PortalError::NotFound(_))
    ));

    let forwarded = f.portal.submit_request(&student, form()).await.unwrap();
    f.portal.advisor_review(&advisor, forwarded.id, true).await.unwrap();
    assert!(matches!(
        f.portal.withdraw_request(&student, forwarded.id).await,
        Err(PortalError::Workflow(WorkflowError::NotWithdrawable(OdStatus::PendingHod)))
    ));

    let rejected = f.portal.submit_request(&student, form()).await.unwrap();
    f.portal.advisor_review(&advisor, rejected.id, false).await.unwrap();
    assert_ok!(f.portal.withdraw_request(&student, rejected.id).await);
    assert_eq!(f.portal.my_requests(&student).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_notifications_need_a_complete_profile() {
    let f = fixture().await;
    let blank = f
        .portal
        .register("new@college.edu", PASSWORD, Role::Student)
        .await
        .unwrap();
    assert!(matches!(
        f.portal.notifications(&blank).await,
        Err(PortalError::Auth(AuthError::ProfileIncomplete))
    ));
    assert!(matches!(
        f.portal.mark_read(&blank, uuid::Uuid::new_v4()).await,
        Err(PortalError::Auth(AuthError::ProfileIncomplete))
    ));
}
