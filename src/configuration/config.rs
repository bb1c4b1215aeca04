use super::types::*;
use crate::error_handling::types::ConfigError;
use clap::Parser;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Application configuration structure that defines all runtime parameters.
///
/// The configuration is read from a TOML file where every section and field is
/// optional, then selectively overridden from the command line or the
/// environment through [`CliArgs`].
///
/// # Examples
///
/// ```
/// use od_portal::configuration::config::Config;
///
/// let config = Config::from_toml_str("[server]\nport = 9000\n").unwrap();
/// assert_eq!(config.server.port, 9000);
/// assert_eq!(config.limits.max_upload_bytes, 5 * 1024 * 1024);
/// ```
///
/// # Fields Overview
///
/// - `server`: bind address, port and the public base URL used for object links
/// - `storage`: data directory holding the SQLite database and the object tree
/// - `institution`: letterhead printed on generated OD letters
/// - `limits`: upload size/type restrictions, session and staging lifetimes
/// - `email`: transactional email provider for the outbound hook
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub institution: InstitutionConfig,
    pub limits: LimitsConfig,
    pub email: EmailConfig,
}

/// Command-line arguments of the `od-portal` binary.
///
/// Every override can also be given through the environment, which is how
/// container deployments usually configure the service.
#[derive(Parser, Debug, Clone, Default)]
#[command(name = "od-portal")]
#[command(about = "On-Duty request portal: submission, approval and letter generation")]
pub struct CliArgs {
    /// Path to the TOML configuration file
    pub config_file: Option<PathBuf>,

    /// Network address to bind the HTTP server to
    #[arg(long, env = "OD_PORTAL_BIND_ADDRESS")]
    pub bind_address: Option<String>,

    /// HTTP port
    #[arg(long, env = "OD_PORTAL_PORT")]
    pub port: Option<u16>,

    /// Directory holding the database and uploaded objects
    #[arg(long, env = "OD_PORTAL_DATA_DIR")]
    pub data_dir: Option<String>,

    /// API key of the transactional email provider
    #[arg(long, env = "OD_PORTAL_EMAIL_API_KEY", hide_env_values = true)]
    pub email_api_key: Option<String>,
}

impl Config {
    /// Reads and validates a configuration file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::DirectoryDoesNotExist(format!(
                "configuration file {} does not exist",
                path.display()
            )));
        }
        let raw = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Config =
            toml::from_str(raw).map_err(|e| ConfigError::TomlError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Builds the effective configuration for the binary: file (or defaults)
    /// with command-line/environment overrides applied on top.
    pub fn load(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config_file {
            Some(path) => Self::from_file(path)?,
            None => {
                info!("No configuration file given, using defaults");
                Config::default()
            }
        };
        config.apply_overrides(args);
        config.validate()?;
        Ok(config)
    }

    pub fn apply_overrides(&mut self, args: &CliArgs) {
        if let Some(ref bind) = args.bind_address {
            debug!("Overriding bind address with {}", bind);
            self.server.bind_address = bind.clone();
        }
        if let Some(port) = args.port {
            debug!("Overriding port with {}", port);
            self.server.port = port;
        }
        if let Some(ref dir) = args.data_dir {
            debug!("Overriding data directory with {}", dir);
            self.storage.data_dir = dir.clone();
        }
        if let Some(ref key) = args.email_api_key {
            if !key.trim().is_empty() {
                self.email.api_key = Some(key.clone());
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue("server.port must not be 0".into()));
        }
        if self.server.bind_address.trim().is_empty() {
            return Err(ConfigError::InvalidValue("server.bind_address is empty".into()));
        }
        if self.institution.name.trim().is_empty() {
            return Err(ConfigError::InvalidValue("institution.name is empty".into()));
        }
        if self.limits.max_upload_bytes == 0 {
            return Err(ConfigError::InvalidValue(
                "limits.max_upload_bytes must be positive".into(),
            ));
        }
        if self.limits.accepted_content_types.is_empty() {
            return Err(ConfigError::InvalidValue(
                "limits.accepted_content_types must list at least one type".into(),
            ));
        }
        for (name, value) in [
            ("limits.session_ttl_secs", self.limits.session_ttl_secs),
            ("limits.prize_staging_ttl_secs", self.limits.prize_staging_ttl_secs),
            ("limits.cleanup_interval_secs", self.limits.cleanup_interval_secs),
        ] {
            if value == 0 {
                return Err(ConfigError::InvalidValue(format!("{} must be positive", name)));
            }
            if value > MAX_TTL_SECS {
                return Err(ConfigError::InvalidValue(format!(
                    "{} must not exceed {} seconds",
                    name, MAX_TTL_SECS
                )));
            }
        }
        Ok(())
    }

    pub fn database_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.database_file)
    }

    pub fn objects_path(&self) -> PathBuf {
        Path::new(&self.storage.data_dir).join(&self.storage.objects_dir)
    }

    pub fn socket_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.limits.accepted_content_types.len(), 3);
        assert_eq!(config.database_path(), PathBuf::from("./data/od_portal.sqlite3"));
        assert_eq!(config.objects_path(), PathBuf::from("./data/objects"));
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml_str(
            r#"
            [server]
            port = 9090
            public_base_url = "https://od.example.edu"

            [institution]
            name = "TEST COLLEGE"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.institution.name, "TEST COLLEGE");
        assert_eq!(config.institution.address, InstitutionConfig::default().address);
        assert_eq!(config.limits, LimitsConfig::default());
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("[server]\nport = 0\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[limits]\naccepted_content_types = []\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[limits]\ncleanup_interval_secs = 0\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[limits]\nsession_ttl_secs = 9223372036854775807\n"),
            Err(ConfigError::InvalidValue(_))
        ));
        let one_year = format!("[limits]\nprize_staging_ttl_secs = {}\n", MAX_TTL_SECS);
        assert!(Config::from_toml_str(&one_year).is_ok());
        let past_one_year = format!("[limits]\nprize_staging_ttl_secs = {}\n", MAX_TTL_SECS + 1);
        assert!(matches!(
            Config::from_toml_str(&past_one_year),
            Err(ConfigError::InvalidValue(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[server\nport = 1"),
            Err(ConfigError::TomlError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "[storage]\ndata_dir = \"/tmp/od\"").unwrap();
        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.storage.data_dir, "/tmp/od");

        let missing = Config::from_file(Path::new("/definitely/not/here.toml"));
        assert!(matches!(missing, Err(ConfigError::DirectoryDoesNotExist(_))));
    }

    #[test]
    #[serial]
    fn test_cli_overrides() {
        std::env::remove_var("OD_PORTAL_PORT");
        let args = CliArgs::try_parse_from([
            "od-portal",
            "--bind-address",
            "127.0.0.1",
            "--port",
            "3000",
            "--data-dir",
            "/tmp/portal",
        ])
        .unwrap_or_else(|e| panic!("{}", e));
        let config = Config::load(&args).unwrap();
        assert_eq!(config.socket_address(), "127.0.0.1:3000");
        assert_eq!(config.storage.data_dir, "/tmp/portal");
        assert_eq!(config.email.api_key, None);
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("OD_PORTAL_PORT", "4000");
        std::env::set_var("OD_PORTAL_EMAIL_API_KEY", "re_test");
        let args = CliArgs::try_parse_from(["od-portal"]).unwrap();
        std::env::remove_var("OD_PORTAL_PORT");
        std::env::remove_var("OD_PORTAL_EMAIL_API_KEY");

        let config = Config::load(&args).unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.email.api_key.as_deref(), Some("re_test"));
    }
}
