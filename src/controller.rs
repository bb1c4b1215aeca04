//! Process wiring: storage, portal service, maintenance task, web server.

pub mod controller_handler;

pub use controller_handler::{run_maintenance, spawn_maintenance, Controller};
