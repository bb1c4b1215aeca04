use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use log::{debug, error, info};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveValue::Set, ColumnTrait, ConnectOptions, ConnectionTrait, Database, DatabaseConnection,
    DbErr, EntityName, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Schema, TransactionTrait,
};
use uuid::Uuid;

use crate::domain::{
    Account, Attachment, EventCategory, EventDetails, EvidenceKind, Notification, OdRequest,
    OdStatus, PrizeDetails, Profile, Role, SessionToken, Severity, SubmitterSnapshot, TeamMember,
};
use crate::error_handling::types::StorageError;
use crate::storage::db_entities::{
    accounts, attachments, notifications, od_requests, profiles, sessions, team_members,
};
use crate::storage::storage_trait::Storage;
use crate::storage::types::{AttachmentSaved, AttachmentWrite, RequestFilter, StatusChange};

/// Request statuses in which evidence rows may be written.
const EVIDENCE_STATUSES: [OdStatus; 2] = [OdStatus::Approved, OdStatus::Completed];

/// SQLite-backed storage built on SeaORM.
pub struct DatabaseStorage {
    db: DatabaseConnection,
}

impl DatabaseStorage {
    /// Open (or create) the database file at `path` and make sure every table exists.
    pub async fn new_file<P: AsRef<Path>>(path: P) -> Result<Self, StorageError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                error!("Cannot create database directory {}: {}", parent.display(), e);
                StorageError::WriteFailed
            })?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let mut options = ConnectOptions::new(url);
        options.max_connections(5).sqlx_logging(false);
        let db = Database::connect(options).await.map_err(|e| {
            error!("Failed to open database {}: {}", path.display(), e);
            StorageError::ConnectionFailed
        })?;

        let storage = Self { db };
        storage.create_schema().await?;
        info!("Database storage ready at {}", path.display());
        Ok(storage)
    }

    async fn create_schema(&self) -> Result<(), StorageError> {
        self.create_table(od_requests::Entity).await?;
        self.create_table(team_members::Entity).await?;
        self.create_table(attachments::Entity).await?;
        self.create_table(profiles::Entity).await?;
        self.create_table(accounts::Entity).await?;
        self.create_table(sessions::Entity).await?;
        self.create_table(notifications::Entity).await?;
        Ok(())
    }

    async fn create_table<E: EntityTrait>(&self, entity: E) -> Result<(), StorageError> {
        let table = entity.table_name().to_string();
        let backend = self.db.get_database_backend();
        let mut statement = Schema::new(backend).create_table_from_entity(entity);
        statement.if_not_exists();
        self.db
            .execute(backend.build(&statement))
            .await
            .map_err(write_failed("create table"))?;
        debug!("Ensured table {}", table);
        Ok(())
    }

    /// Attach team members and attachments to request rows, keeping row order.
    async fn hydrate<C: ConnectionTrait>(
        db: &C,
        rows: Vec<od_requests::Model>,
    ) -> Result<Vec<OdRequest>, StorageError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();

        let mut members: HashMap<String, Vec<team_members::Model>> = HashMap::new();
        for member in team_members::Entity::find()
            .filter(team_members::Column::RequestId.is_in(ids.clone()))
            .order_by_asc(team_members::Column::Position)
            .all(db)
            .await
            .map_err(read_failed("load team members"))?
        {
            members.entry(member.request_id.clone()).or_default().push(member);
        }

        let mut evidence: HashMap<String, Vec<attachments::Model>> = HashMap::new();
        for attachment in attachments::Entity::find()
            .filter(attachments::Column::RequestId.is_in(ids))
            .order_by_asc(attachments::Column::Position)
            .order_by_asc(attachments::Column::CreatedAt)
            .all(db)
            .await
            .map_err(read_failed("load attachments"))?
        {
            evidence.entry(attachment.request_id.clone()).or_default().push(attachment);
        }

        rows.into_iter()
            .map(|row| {
                let team = members.remove(&row.id).unwrap_or_default();
                let files = evidence.remove(&row.id).unwrap_or_default();
                request_from_rows(row, team, files)
            })
            .collect()
    }

    /// Locks the request row for writing while it still accepts evidence.
    async fn claim_open_request<C: ConnectionTrait>(
        db: &C,
        request_id: Uuid,
    ) -> Result<bool, StorageError> {
        let claimed = od_requests::Entity::update_many()
            .col_expr(od_requests::Column::Status, Expr::col(od_requests::Column::Status).into())
            .filter(od_requests::Column::Id.eq(request_id.to_string()))
            .filter(od_requests::Column::Status.is_in(EVIDENCE_STATUSES.iter().map(|s| s.as_str())))
            .exec(db)
            .await
            .map_err(write_failed("claim request"))?;
        Ok(claimed.rows_affected > 0)
    }

    /// Writes one attachment row, returning its position or `None` when the
    /// targeted row is gone.
    async fn write_attachment<C: ConnectionTrait>(
        db: &C,
        attachment: &Attachment,
        write: AttachmentWrite,
    ) -> Result<Option<u32>, StorageError> {
        let key = attachment.id.to_string();
        let request_key = attachment.request_id.to_string();
        match write {
            AttachmentWrite::Append => {
                let last = attachments::Entity::find()
                    .filter(attachments::Column::RequestId.eq(request_key))
                    .filter(attachments::Column::Kind.eq(attachment.kind.as_str()))
                    .order_by_desc(attachments::Column::Position)
                    .one(db)
                    .await
                    .map_err(read_failed("load last attachment"))?;
                let position = last.map_or(0, |row| row.position + 1);
                let mut model = attachment_model(attachment);
                model.position = Set(position);
                attachments::Entity::insert(model)
                    .exec_without_returning(db)
                    .await
                    .map_err(write_failed("insert attachment"))?;
                parse_position(position).map(Some)
            }
            AttachmentWrite::Replace => {
                let updated = attachments::Entity::update_many()
                    .col_expr(
                        attachments::Column::ObjectRef,
                        Expr::value(attachment.object_ref.clone()),
                    )
                    .filter(attachments::Column::Id.eq(key))
                    .filter(attachments::Column::RequestId.eq(request_key))
                    .filter(attachments::Column::Kind.eq(attachment.kind.as_str()))
                    .exec(db)
                    .await
                    .map_err(write_failed("replace attachment"))?;
                Ok((updated.rows_affected > 0).then_some(attachment.position))
            }
            AttachmentWrite::Finalize => {
                let prize = attachment.prize.as_ref();
                let updated = attachments::Entity::update_many()
                    .col_expr(
                        attachments::Column::PrizeType,
                        Expr::value(prize.map(|p| p.prize_type.clone())),
                    )
                    .col_expr(
                        attachments::Column::PrizeEvent,
                        Expr::value(prize.map(|p| p.event_name.clone())),
                    )
                    .col_expr(attachments::Column::Finalized, Expr::value(true))
                    .filter(attachments::Column::Id.eq(key))
                    .filter(attachments::Column::RequestId.eq(request_key))
                    .filter(attachments::Column::Finalized.eq(false))
                    .exec(db)
                    .await
                    .map_err(write_failed("finalize attachment"))?;
                Ok((updated.rows_affected > 0).then_some(attachment.position))
            }
        }
    }

    /// Compare-and-set on the status column plus the fields carried by `change`.
    async fn apply_change<C: ConnectionTrait>(
        db: &C,
        change: &StatusChange,
    ) -> Result<bool, StorageError> {
        let mut update = od_requests::Entity::update_many()
            .col_expr(od_requests::Column::Status, Expr::value(change.next.as_str()))
            .filter(od_requests::Column::Id.eq(change.request_id.to_string()))
            .filter(od_requests::Column::Status.eq(change.expected.as_str()));
        if let Some(ref letter) = change.od_letter_ref {
            update = update.col_expr(od_requests::Column::OdLetterRef, Expr::value(letter.clone()));
        }
        if let Some(advisor) = change.advisor_id {
            update = update.col_expr(od_requests::Column::AdvisorId, Expr::value(advisor.to_string()));
        }
        if let Some(hod) = change.hod_id {
            update = update.col_expr(od_requests::Column::HodId, Expr::value(hod.to_string()));
        }
        let result = update.exec(db).await.map_err(write_failed("update status"))?;
        if result.rows_affected == 0 {
            debug!(
                "Status change {} -> {} on {} lost the race",
                change.expected, change.next, change.request_id
            );
            return Ok(false);
        }
        if let Some(ref notification) = change.notification {
            notifications::Entity::insert(notification_model(notification))
                .exec_without_returning(db)
                .await
                .map_err(write_failed("insert notification"))?;
        }
        Ok(true)
    }
}

#[async_trait]
impl Storage for DatabaseStorage {
    async fn insert_request(&self, request: &OdRequest) -> Result<(), StorageError> {
        let txn = self.db.begin().await.map_err(write_failed("begin transaction"))?;
        od_requests::Entity::insert(request_model(request))
            .exec_without_returning(&txn)
            .await
            .map_err(write_failed("insert request"))?;
        if !request.team_members.is_empty() {
            team_members::Entity::insert_many(
                request.team_members.iter().map(|m| member_model(request.id, m)),
            )
            .exec_without_returning(&txn)
            .await
            .map_err(write_failed("insert team members"))?;
        }
        for attachment in &request.attachments {
            attachments::Entity::insert(attachment_model(attachment))
                .exec_without_returning(&txn)
                .await
                .map_err(write_failed("insert attachment"))?;
        }
        txn.commit().await.map_err(write_failed("commit request"))?;
        debug!("Inserted request {}", request.id);
        Ok(())
    }

    async fn get_request(&self, id: Uuid) -> Result<Option<OdRequest>, StorageError> {
        let row = od_requests::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await
            .map_err(read_failed("load request"))?;
        match row {
            Some(row) => Ok(Self::hydrate(&self.db, vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_requests(&self, filter: &RequestFilter) -> Result<Vec<OdRequest>, StorageError> {
        let mut query = od_requests::Entity::find();
        if let Some(user_id) = filter.user_id {
            query = query.filter(od_requests::Column::UserId.eq(user_id.to_string()));
        }
        if let Some(ref register_no) = filter.register_no {
            query = query.filter(od_requests::Column::RegisterNo.eq(register_no.clone()));
        }
        if !filter.statuses.is_empty() {
            query = query.filter(
                od_requests::Column::Status.is_in(filter.statuses.iter().map(|s| s.as_str())),
            );
        }
        if !filter.excluded_statuses.is_empty() {
            query = query.filter(
                od_requests::Column::Status
                    .is_not_in(filter.excluded_statuses.iter().map(|s| s.as_str())),
            );
        }
        let rows = query
            .order_by_desc(od_requests::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(read_failed("list requests"))?;

        let department = filter.department.as_deref().map(|d| d.trim().to_lowercase());
        let search = filter.search.as_deref().map(|s| s.trim().to_lowercase());
        let rows = rows
            .into_iter()
            .filter(|row| {
                department
                    .as_deref()
                    .map_or(true, |d| row.department.trim().to_lowercase() == d)
            })
            .filter(|row| {
                search.as_deref().map_or(true, |needle| {
                    [
                        &row.student_name,
                        &row.register_no,
                        &row.event_title,
                        &row.organization_name,
                    ]
                    .iter()
                    .any(|field| field.to_lowercase().contains(needle))
                })
            })
            .collect();
        Self::hydrate(&self.db, rows).await
    }

    async fn count_requests(&self, status: OdStatus) -> Result<u64, StorageError> {
        od_requests::Entity::find()
            .filter(od_requests::Column::Status.eq(status.as_str()))
            .count(&self.db)
            .await
            .map_err(read_failed("count requests"))
    }

    async fn apply_transition(&self, change: &StatusChange) -> Result<bool, StorageError> {
        let txn = self.db.begin().await.map_err(write_failed("begin transaction"))?;
        if !Self::apply_change(&txn, change).await? {
            txn.rollback().await.map_err(write_failed("rollback"))?;
            return Ok(false);
        }
        txn.commit().await.map_err(write_failed("commit status change"))?;
        info!(
            "Request {} moved {} -> {}",
            change.request_id, change.expected, change.next
        );
        Ok(true)
    }

    async fn save_attachment(
        &self,
        attachment: &Attachment,
        write: AttachmentWrite,
        completion: Option<&StatusChange>,
    ) -> Result<AttachmentSaved, StorageError> {
        let txn = self.db.begin().await.map_err(write_failed("begin transaction"))?;
        if !Self::claim_open_request(&txn, attachment.request_id).await? {
            txn.rollback().await.map_err(write_failed("rollback"))?;
            debug!("Request {} does not accept evidence", attachment.request_id);
            return Ok(AttachmentSaved::Closed);
        }
        let Some(position) = Self::write_attachment(&txn, attachment, write).await? else {
            txn.rollback().await.map_err(write_failed("rollback"))?;
            debug!("Attachment {} is gone, {:?} skipped", attachment.id, write);
            return Ok(AttachmentSaved::Missing);
        };
        let completed = match completion {
            Some(change) => Self::apply_change(&txn, change).await?,
            None => false,
        };
        txn.commit().await.map_err(write_failed("commit attachment"))?;
        debug!(
            "Saved {} attachment {} at position {} on {}",
            attachment.kind.as_str(),
            attachment.id,
            position,
            attachment.request_id
        );
        Ok(AttachmentSaved::Written { position, completed })
    }

    async fn remove_attachment(
        &self,
        request_id: Uuid,
        attachment_id: Uuid,
    ) -> Result<Option<Attachment>, StorageError> {
        let row = attachments::Entity::find_by_id(attachment_id.to_string())
            .filter(attachments::Column::RequestId.eq(request_id.to_string()))
            .one(&self.db)
            .await
            .map_err(read_failed("load attachment"))?;
        let Some(row) = row else {
            return Ok(None);
        };
        attachments::Entity::delete_by_id(row.id.clone())
            .exec(&self.db)
            .await
            .map_err(write_failed("delete attachment"))?;
        attachment_from_row(row).map(Some)
    }

    async fn staged_attachments_before(
        &self,
        cutoff: DateTime<Utc>,
    ) -> Result<Vec<Attachment>, StorageError> {
        attachments::Entity::find()
            .filter(attachments::Column::Kind.eq(EvidenceKind::Prize.as_str()))
            .filter(attachments::Column::Finalized.eq(false))
            .filter(attachments::Column::CreatedAt.lt(timestamp(cutoff)))
            .all(&self.db)
            .await
            .map_err(read_failed("list staged attachments"))?
            .into_iter()
            .map(attachment_from_row)
            .collect()
    }

    async fn delete_request(&self, id: Uuid, expected: OdStatus) -> Result<bool, StorageError> {
        let txn = self.db.begin().await.map_err(write_failed("begin transaction"))?;
        let key = id.to_string();
        let deleted = od_requests::Entity::delete_many()
            .filter(od_requests::Column::Id.eq(key.clone()))
            .filter(od_requests::Column::Status.eq(expected.as_str()))
            .exec(&txn)
            .await
            .map_err(write_failed("delete request"))?;
        if deleted.rows_affected == 0 {
            txn.rollback().await.map_err(write_failed("rollback"))?;
            return Ok(false);
        }
        team_members::Entity::delete_many()
            .filter(team_members::Column::RequestId.eq(key.clone()))
            .exec(&txn)
            .await
            .map_err(write_failed("delete team members"))?;
        attachments::Entity::delete_many()
            .filter(attachments::Column::RequestId.eq(key))
            .exec(&txn)
            .await
            .map_err(write_failed("delete attachments"))?;
        txn.commit().await.map_err(write_failed("commit delete"))?;
        info!("Request {} permanently deleted", id);
        Ok(true)
    }

    async fn set_achievement(&self, id: Uuid, details: Option<String>) -> Result<bool, StorageError> {
        let result = od_requests::Entity::update_many()
            .col_expr(od_requests::Column::AchievementDetails, Expr::value(details))
            .filter(od_requests::Column::Id.eq(id.to_string()))
            .exec(&self.db)
            .await
            .map_err(write_failed("update achievement"))?;
        Ok(result.rows_affected > 0)
    }

    async fn create_account(&self, account: &Account, profile: &Profile) -> Result<(), StorageError> {
        let txn = self.db.begin().await.map_err(write_failed("begin transaction"))?;
        accounts::Entity::insert(accounts::ActiveModel {
            id: Set(account.id.to_string()),
            email: Set(account.email.clone()),
            password_hash: Set(account.password_hash.clone()),
            salt: Set(account.salt.clone()),
            created_at: Set(timestamp(account.created_at)),
        })
        .exec_without_returning(&txn)
        .await
        .map_err(write_failed("insert account"))?;
        profiles::Entity::insert(profile_model(profile))
            .exec_without_returning(&txn)
            .await
            .map_err(write_failed("insert profile"))?;
        txn.commit().await.map_err(write_failed("commit account"))?;
        info!("Created {} account {}", profile.role.as_str(), account.id);
        Ok(())
    }

    async fn find_account_by_email(&self, email: &str) -> Result<Option<Account>, StorageError> {
        let row = accounts::Entity::find()
            .filter(accounts::Column::Email.eq(email))
            .one(&self.db)
            .await
            .map_err(read_failed("load account"))?;
        row.map(|row| {
            Ok(Account {
                id: parse_uuid(&row.id)?,
                email: row.email,
                password_hash: row.password_hash,
                salt: row.salt,
                created_at: parse_time(&row.created_at)?,
            })
        })
        .transpose()
    }

    async fn save_profile(&self, profile: &Profile) -> Result<(), StorageError> {
        let model = profile_model(profile);
        let updated = profiles::Entity::update_many()
            .set(model.clone())
            .filter(profiles::Column::UserId.eq(profile.user_id.to_string()))
            .exec(&self.db)
            .await
            .map_err(write_failed("update profile"))?;
        if updated.rows_affected == 0 {
            profiles::Entity::insert(model)
                .exec_without_returning(&self.db)
                .await
                .map_err(write_failed("insert profile"))?;
        }
        Ok(())
    }

    async fn get_profile(&self, user_id: Uuid) -> Result<Option<Profile>, StorageError> {
        profiles::Entity::find_by_id(user_id.to_string())
            .one(&self.db)
            .await
            .map_err(read_failed("load profile"))?
            .map(profile_from_row)
            .transpose()
    }

    async fn create_session(&self, session: &SessionToken) -> Result<(), StorageError> {
        sessions::Entity::insert(sessions::ActiveModel {
            token: Set(session.token.clone()),
            user_id: Set(session.user_id.to_string()),
            created_at: Set(timestamp(session.created_at)),
            expires_at: Set(timestamp(session.expires_at)),
        })
        .exec_without_returning(&self.db)
        .await
        .map_err(write_failed("insert session"))?;
        Ok(())
    }

    async fn get_session(&self, token: &str) -> Result<Option<SessionToken>, StorageError> {
        let row = sessions::Entity::find_by_id(token.to_string())
            .one(&self.db)
            .await
            .map_err(read_failed("load session"))?;
        row.map(|row| {
            Ok(SessionToken {
                user_id: parse_uuid(&row.user_id)?,
                created_at: parse_time(&row.created_at)?,
                expires_at: parse_time(&row.expires_at)?,
                token: row.token,
            })
        })
        .transpose()
    }

    async fn delete_session(&self, token: &str) -> Result<bool, StorageError> {
        let result = sessions::Entity::delete_by_id(token.to_string())
            .exec(&self.db)
            .await
            .map_err(write_failed("delete session"))?;
        Ok(result.rows_affected > 0)
    }

    async fn purge_expired_sessions(&self, now: DateTime<Utc>) -> Result<u64, StorageError> {
        let result = sessions::Entity::delete_many()
            .filter(sessions::Column::ExpiresAt.lte(timestamp(now)))
            .exec(&self.db)
            .await
            .map_err(write_failed("purge sessions"))?;
        Ok(result.rows_affected)
    }

    async fn save_notification(&self, notification: &Notification) -> Result<(), StorageError> {
        notifications::Entity::insert(notification_model(notification))
            .exec_without_returning(&self.db)
            .await
            .map_err(write_failed("insert notification"))?;
        Ok(())
    }

    async fn list_notifications(
        &self,
        user_id: Uuid,
        limit: u64,
    ) -> Result<Vec<Notification>, StorageError> {
        notifications::Entity::find()
            .filter(notifications::Column::UserId.eq(user_id.to_string()))
            .order_by_desc(notifications::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(read_failed("list notifications"))?
            .into_iter()
            .map(|row| {
                Ok(Notification {
                    id: parse_uuid(&row.id)?,
                    user_id: parse_uuid(&row.user_id)?,
                    severity: row.severity.parse::<Severity>().map_err(StorageError::CorruptRecord)?,
                    read: row.is_read,
                    created_at: parse_time(&row.created_at)?,
                    message: row.message,
                })
            })
            .collect()
    }

    async fn mark_notification_read(&self, user_id: Uuid, id: Uuid) -> Result<bool, StorageError> {
        let result = notifications::Entity::update_many()
            .col_expr(notifications::Column::IsRead, Expr::value(true))
            .filter(notifications::Column::Id.eq(id.to_string()))
            .filter(notifications::Column::UserId.eq(user_id.to_string()))
            .exec(&self.db)
            .await
            .map_err(write_failed("mark notification read"))?;
        Ok(result.rows_affected > 0)
    }
}

fn write_failed(context: &'static str) -> impl FnOnce(DbErr) -> StorageError {
    move |e| {
        error!("Database {} failed: {}", context, e);
        StorageError::WriteFailed
    }
}

fn read_failed(context: &'static str) -> impl FnOnce(DbErr) -> StorageError {
    move |e| {
        error!("Database {} failed: {}", context, e);
        StorageError::ReadFailed
    }
}

/// Fixed-width UTC timestamps so that text ordering matches time ordering.
fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_time(raw: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| StorageError::CorruptRecord(format!("invalid timestamp '{}'", raw)))
}

fn parse_date(raw: &str) -> Result<NaiveDate, StorageError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| StorageError::CorruptRecord(format!("invalid date '{}'", raw)))
}

fn parse_uuid(raw: &str) -> Result<Uuid, StorageError> {
    Uuid::parse_str(raw).map_err(|_| StorageError::CorruptRecord(format!("invalid id '{}'", raw)))
}

fn parse_optional_uuid(raw: Option<&str>) -> Result<Option<Uuid>, StorageError> {
    raw.map(parse_uuid).transpose()
}

fn parse_position(raw: i32) -> Result<u32, StorageError> {
    u32::try_from(raw).map_err(|_| StorageError::CorruptRecord(format!("invalid position {}", raw)))
}

fn request_model(request: &OdRequest) -> od_requests::ActiveModel {
    od_requests::ActiveModel {
        id: Set(request.id.to_string()),
        user_id: Set(request.user_id.to_string()),
        created_at: Set(timestamp(request.created_at)),
        student_name: Set(request.submitter.student_name.clone()),
        register_no: Set(request.submitter.register_no.clone()),
        roll_no: Set(request.submitter.roll_no.clone()),
        phone_number: Set(request.submitter.phone_number.clone()),
        year: Set(request.submitter.year.clone()),
        semester: Set(request.submitter.semester.clone()),
        department: Set(request.submitter.department.clone()),
        event_title: Set(request.event.title.clone()),
        organization_name: Set(request.event.organization_name.clone()),
        organization_location: Set(request.event.organization_location.clone()),
        event_type: Set(request.event.category.label().to_string()),
        event_date: Set(request.event.start_date.format("%Y-%m-%d").to_string()),
        event_end_date: Set(request.event.end_date.format("%Y-%m-%d").to_string()),
        status: Set(request.status.as_str().to_string()),
        registration_proof_ref: Set(request.registration_proof_ref.clone()),
        payment_proof_ref: Set(request.payment_proof_ref.clone()),
        event_poster_ref: Set(request.event_poster_ref.clone()),
        od_letter_ref: Set(request.od_letter_ref.clone()),
        lead_signature_ref: Set(request.lead_signature_ref.clone()),
        advisor_id: Set(request.advisor_id.map(|id| id.to_string())),
        hod_id: Set(request.hod_id.map(|id| id.to_string())),
        remarks: Set(request.remarks.clone()),
        achievement_details: Set(request.achievement_details.clone()),
    }
}

fn member_model(request_id: Uuid, member: &TeamMember) -> team_members::ActiveModel {
    team_members::ActiveModel {
        id: Set(member.id.to_string()),
        request_id: Set(request_id.to_string()),
        position: Set(member.position as i32),
        name: Set(member.name.clone()),
        register_no: Set(member.register_no.clone()),
        roll_no: Set(member.roll_no.clone()),
        year: Set(member.year.clone()),
    }
}

fn attachment_model(attachment: &Attachment) -> attachments::ActiveModel {
    attachments::ActiveModel {
        id: Set(attachment.id.to_string()),
        request_id: Set(attachment.request_id.to_string()),
        kind: Set(attachment.kind.as_str().to_string()),
        position: Set(attachment.position as i32),
        object_ref: Set(attachment.object_ref.clone()),
        prize_type: Set(attachment.prize.as_ref().map(|p| p.prize_type.clone())),
        prize_event: Set(attachment.prize.as_ref().map(|p| p.event_name.clone())),
        finalized: Set(attachment.finalized),
        created_at: Set(timestamp(attachment.created_at)),
    }
}

fn profile_model(profile: &Profile) -> profiles::ActiveModel {
    profiles::ActiveModel {
        user_id: Set(profile.user_id.to_string()),
        email: Set(profile.email.clone()),
        role: Set(profile.role.as_str().to_string()),
        full_name: Set(profile.full_name.clone()),
        identification_no: Set(profile.identification_no.clone()),
        department: Set(profile.department.clone()),
        year: Set(profile.year.clone()),
        designation: Set(profile.designation.clone()),
        is_hod: Set(profile.is_hod),
        signature_ref: Set(profile.signature_ref.clone()),
        is_profile_complete: Set(profile.is_profile_complete),
        schema_version: Set(profile.schema_version),
        updated_at: Set(timestamp(profile.updated_at)),
    }
}

fn notification_model(notification: &Notification) -> notifications::ActiveModel {
    notifications::ActiveModel {
        id: Set(notification.id.to_string()),
        user_id: Set(notification.user_id.to_string()),
        message: Set(notification.message.clone()),
        severity: Set(notification.severity.as_str().to_string()),
        is_read: Set(notification.read),
        created_at: Set(timestamp(notification.created_at)),
    }
}

fn request_from_rows(
    row: od_requests::Model,
    members: Vec<team_members::Model>,
    files: Vec<attachments::Model>,
) -> Result<OdRequest, StorageError> {
    let team_members = members
        .into_iter()
        .map(|m| {
            Ok(TeamMember {
                id: parse_uuid(&m.id)?,
                position: parse_position(m.position)?,
                name: m.name,
                register_no: m.register_no,
                roll_no: m.roll_no,
                year: m.year,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;
    let attachments = files
        .into_iter()
        .map(attachment_from_row)
        .collect::<Result<Vec<_>, StorageError>>()?;

    Ok(OdRequest {
        id: parse_uuid(&row.id)?,
        user_id: parse_uuid(&row.user_id)?,
        created_at: parse_time(&row.created_at)?,
        submitter: SubmitterSnapshot {
            student_name: row.student_name,
            register_no: row.register_no,
            roll_no: row.roll_no,
            phone_number: row.phone_number,
            year: row.year,
            semester: row.semester,
            department: row.department,
        },
        event: EventDetails {
            title: row.event_title,
            organization_name: row.organization_name,
            organization_location: row.organization_location,
            category: EventCategory::try_from(row.event_type).map_err(StorageError::CorruptRecord)?,
            start_date: parse_date(&row.event_date)?,
            end_date: parse_date(&row.event_end_date)?,
        },
        status: row.status.parse::<OdStatus>().map_err(StorageError::CorruptRecord)?,
        registration_proof_ref: row.registration_proof_ref,
        payment_proof_ref: row.payment_proof_ref,
        event_poster_ref: row.event_poster_ref,
        od_letter_ref: row.od_letter_ref,
        lead_signature_ref: row.lead_signature_ref,
        advisor_id: parse_optional_uuid(row.advisor_id.as_deref())?,
        hod_id: parse_optional_uuid(row.hod_id.as_deref())?,
        remarks: row.remarks,
        achievement_details: row.achievement_details,
        team_members,
        attachments,
    })
}

fn attachment_from_row(row: attachments::Model) -> Result<Attachment, StorageError> {
    let prize = match (row.prize_type, row.prize_event) {
        (Some(prize_type), Some(event_name)) => Some(PrizeDetails { prize_type, event_name }),
        _ => None,
    };
    Ok(Attachment {
        id: parse_uuid(&row.id)?,
        request_id: parse_uuid(&row.request_id)?,
        kind: row.kind.parse::<EvidenceKind>().map_err(StorageError::CorruptRecord)?,
        position: parse_position(row.position)?,
        object_ref: row.object_ref,
        prize,
        finalized: row.finalized,
        created_at: parse_time(&row.created_at)?,
    })
}

fn profile_from_row(row: profiles::Model) -> Result<Profile, StorageError> {
    Ok(Profile {
        user_id: parse_uuid(&row.user_id)?,
        email: row.email,
        role: row.role.parse::<Role>().map_err(StorageError::CorruptRecord)?,
        full_name: row.full_name,
        identification_no: row.identification_no,
        department: row.department,
        year: row.year,
        designation: row.designation,
        is_hod: row.is_hod,
        signature_ref: row.signature_ref,
        is_profile_complete: row.is_profile_complete,
        schema_version: row.schema_version,
        updated_at: parse_time(&row.updated_at)?,
    })
}
