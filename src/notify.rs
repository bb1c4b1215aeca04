//! Outbound notification channels.
//!
//! In-app notifications live in storage; this module only covers the
//! optional email hook.

pub mod email;

pub use email::{EmailDispatcher, EmailMessage, EmailOutcome};
