use serde::Deserialize;

/// HTTP listener settings.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    /// Prefix used when handing out object URLs, without trailing slash.
    pub public_base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0".to_string(),
            port: 8080,
            public_base_url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub data_dir: String,
    pub database_file: String,
    pub objects_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            database_file: "od_portal.sqlite3".to_string(),
            objects_dir: "objects".to_string(),
        }
    }
}

/// Letterhead details printed on every OD letter.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct InstitutionConfig {
    pub name: String,
    pub address: String,
    pub footer: String,
}

impl Default for InstitutionConfig {
    fn default() -> Self {
        Self {
            name: "ERODE SENGUNTHAR ENGINEERING COLLEGE".to_string(),
            address: "ERODE - 638057".to_string(),
            footer: "This is an electronically signed document generated by the OD portal."
                .to_string(),
        }
    }
}

/// Upper bound for every lifetime and interval in [`LimitsConfig`]: one year.
pub const MAX_TTL_SECS: u64 = 366 * 24 * 60 * 60;

#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_upload_bytes: usize,
    pub accepted_content_types: Vec<String>,
    pub session_ttl_secs: u64,
    pub prize_staging_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_upload_bytes: 5 * 1024 * 1024,
            accepted_content_types: vec![
                "application/pdf".to_string(),
                "image/jpeg".to_string(),
                "image/png".to_string(),
            ],
            session_ttl_secs: 12 * 60 * 60,
            prize_staging_ttl_secs: 60 * 60,
            cleanup_interval_secs: 10 * 60,
        }
    }
}

/// Transactional email provider used by the outbound notification hook.
#[derive(Debug, PartialEq, Clone, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub endpoint: String,
    pub sender: String,
    pub api_key: Option<String>,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.resend.com/emails".to_string(),
            sender: "OD Portal <onboarding@resend.dev>".to_string(),
            api_key: None,
        }
    }
}
