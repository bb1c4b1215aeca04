pub mod config;
pub mod types;

pub use config::{CliArgs, Config};
pub use types::{
    EmailConfig, InstitutionConfig, LimitsConfig, ServerConfig, StorageConfig, MAX_TTL_SECS,
};
