//! SeaORM entity models used by the database storage backend.
//!
//! These structs map to the SQLite tables created by `database_storage`:
//! - `od_requests` — one row per OD request, submitter and event snapshot
//! - `team_members` — additional participants, one row each
//! - `attachments` — post-event evidence, one row per file or prize record
//! - `profiles` — per-user profile, keyed by account id
//! - `accounts` — login credentials
//! - `sessions` — opaque login tokens
//! - `notifications` — in-app alerts
//!
//! Timestamps are RFC3339 strings, dates `YYYY-MM-DD`, ids UUID strings and
//! enums their display strings.

/// OD requests table entity model.
pub mod od_requests {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "od_requests")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Owning student account
        pub user_id: String,
        pub created_at: String,
        pub student_name: String,
        pub register_no: String,
        pub roll_no: String,
        pub phone_number: String,
        pub year: String,
        pub semester: String,
        pub department: String,
        pub event_title: String,
        pub organization_name: String,
        pub organization_location: String,
        pub event_type: String,
        pub event_date: String,
        pub event_end_date: String,
        /// One of the six status display strings
        pub status: String,
        pub registration_proof_ref: String,
        pub payment_proof_ref: Option<String>,
        pub event_poster_ref: String,
        pub od_letter_ref: Option<String>,
        pub lead_signature_ref: Option<String>,
        pub advisor_id: Option<String>,
        pub hod_id: Option<String>,
        pub remarks: Option<String>,
        pub achievement_details: Option<String>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(has_many = "super::team_members::Entity")]
        TeamMembers,
        #[sea_orm(has_many = "super::attachments::Entity")]
        Attachments,
    }

    impl Related<super::team_members::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::TeamMembers.def()
        }
    }

    impl Related<super::attachments::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Attachments.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Team members table entity model.
pub mod team_members {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "team_members")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Foreign key to `od_requests.id`
        pub request_id: String,
        /// Order in which the member was entered on the form
        pub position: i32,
        pub name: String,
        pub register_no: String,
        pub roll_no: String,
        pub year: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::od_requests::Entity",
            from = "Column::RequestId",
            to = "super::od_requests::Column::Id",
            on_delete = "Cascade"
        )]
        Request,
    }

    impl Related<super::od_requests::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Request.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Evidence attachments table entity model.
pub mod attachments {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "attachments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Foreign key to `od_requests.id`
        pub request_id: String,
        /// `photo`, `certificate` or `prize`
        pub kind: String,
        /// Upload order within the kind
        pub position: i32,
        pub object_ref: Option<String>,
        pub prize_type: Option<String>,
        pub prize_event: Option<String>,
        /// False while a staged prize upload waits for its details
        pub finalized: bool,
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "super::od_requests::Entity",
            from = "Column::RequestId",
            to = "super::od_requests::Column::Id",
            on_delete = "Cascade"
        )]
        Request,
    }

    impl Related<super::od_requests::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Request.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}
}

/// Profiles table entity model.
pub mod profiles {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "profiles")]
    pub struct Model {
        /// Same id as `accounts.id`
        #[sea_orm(primary_key, auto_increment = false)]
        pub user_id: String,
        pub email: String,
        pub role: String,
        pub full_name: String,
        pub identification_no: String,
        pub department: String,
        pub year: Option<String>,
        pub designation: Option<String>,
        pub is_hod: bool,
        pub signature_ref: Option<String>,
        pub is_profile_complete: bool,
        pub schema_version: i32,
        pub updated_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Accounts table entity model.
pub mod accounts {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "accounts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        /// Lower-cased, trimmed
        #[sea_orm(unique)]
        pub email: String,
        /// Hex SHA-256 of salt + password
        pub password_hash: String,
        pub salt: String,
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Sessions table entity model.
pub mod sessions {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "sessions")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub token: String,
        pub user_id: String,
        pub created_at: String,
        pub expires_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

/// Notifications table entity model.
pub mod notifications {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "notifications")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: String,
        pub user_id: String,
        pub message: String,
        /// `success`, `info` or `warning`
        pub severity: String,
        pub is_read: bool,
        pub created_at: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}
