//! Storage subsystem
//!
//! This module provides abstractions and implementations for persisting
//! OD requests, evidence, accounts, sessions and notifications.
//!
//! Components:
//! - `storage_trait`: the Storage trait defining a uniform API.
//! - `types`: request filters and compare-and-set status changes.
//! - `database_storage`: ORM-based SQLite implementation using SeaORM.
//! - `request_filter`: helpers to build request queries.
//! - `db_entities`: SeaORM entity models for the database backend.

pub mod database_storage;
pub mod db_entities;
pub mod request_filter;
pub mod storage_trait;
pub mod types;

pub use database_storage::DatabaseStorage;
pub use storage_trait::Storage;
pub use types::{AttachmentSaved, AttachmentWrite, RequestFilter, StatusChange};
