//! OD request workflow.
//!
//! [`PortalService`] is the single entry point used by the HTTP layer. Its
//! operations are split by concern:
//!
//! - `portal`: the service, access guards, accounts, profiles, notifications
//! - `state_machine`: legal status transitions
//! - `submission`: request creation and the requisition letter
//! - `review`: queues, the two approval stages, archive and hard delete
//! - `evidence`: photos, certificates, staged prize uploads
//! - `registry`: public tracking, the faculty registry and export
//! - `views`: read models returned to clients

pub mod evidence;
pub mod portal;
pub mod registry;
pub mod review;
pub mod state_machine;
pub mod submission;
pub mod views;

#[cfg(test)]
mod tests;

pub use portal::PortalService;
pub use state_machine::{transition, Action};
pub use views::{DashboardStats, RegistryExport, TrackedRequest, TrackingResult};
