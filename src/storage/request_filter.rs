//! Helpers for building `RequestFilter` values.
//!
//! This module re-exports `RequestFilter` and provides convenience builders
//! for the listings the portal needs.

pub use crate::storage::types::RequestFilter;

use uuid::Uuid;

use crate::domain::OdStatus;

/// Requests submitted by one student account.
pub fn by_owner(user_id: Uuid) -> RequestFilter {
    RequestFilter { user_id: Some(user_id), ..Default::default() }
}

/// Requests whose submitter has this register number.
pub fn by_register_no<S: AsRef<str>>(register_no: S) -> RequestFilter {
    RequestFilter {
        register_no: Some(register_no.as_ref().trim().to_string()),
        ..Default::default()
    }
}

/// Requests of one department waiting in the given stage.
pub fn department_queue<S: Into<String>>(department: S, status: OdStatus) -> RequestFilter {
    RequestFilter {
        department: Some(department.into()),
        statuses: vec![status],
        ..Default::default()
    }
}

/// Every request of a department.
pub fn by_department<S: Into<String>>(department: S) -> RequestFilter {
    RequestFilter { department: Some(department.into()), ..Default::default() }
}

/// Requests that appear in the approved-activity registry.
pub fn registry<S: Into<String>>(department: S, search: Option<String>) -> RequestFilter {
    RequestFilter {
        department: Some(department.into()),
        statuses: vec![OdStatus::Approved, OdStatus::Completed],
        search: search.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()),
        ..Default::default()
    }
}
