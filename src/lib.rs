pub mod configuration;
pub mod controller;
pub mod domain;
pub mod error_handling;
pub mod export;
pub mod letter;
pub mod notify;
pub mod object_store;
pub mod storage;
pub mod web_interface;
pub mod workflow;

pub use controller::Controller;
pub use workflow::PortalService;
