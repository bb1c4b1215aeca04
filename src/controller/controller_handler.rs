use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;

use crate::configuration::config::Config;
use crate::error_handling::types::*;
use crate::notify::EmailDispatcher;
use crate::object_store::FileObjectStore;
use crate::storage::DatabaseStorage;
use crate::web_interface::WebServer;
use crate::workflow::PortalService;

/// Owns the configuration and wires storage, the portal service, the
/// maintenance task and the web server together.
pub struct Controller {
    pub config: Config,
}

impl Controller {
    pub fn new(config: Config) -> Result<Self, ControllerError> {
        info!("Initializing controller");
        config.validate().map_err(|err| {
            error!("Invalid configuration: {}", err);
            ControllerError::ConfigurationError(err)
        })?;
        Ok(Self { config })
    }

    /// Builds the portal service on top of the configured storage backends.
    pub async fn build_portal(&self) -> Result<PortalService, ControllerError> {
        let database = self.config.database_path();
        let storage = DatabaseStorage::new_file(&database).await.map_err(|err| {
            error!("Unable to open database {}: {}", database.display(), err);
            ControllerError::StorageError(err)
        })?;

        let objects_path = self.config.objects_path();
        let objects = FileObjectStore::new(&objects_path, &self.config.server.public_base_url)
            .map_err(|err| {
                error!("Unable to prepare object store {}: {}", objects_path.display(), err);
                ControllerError::ObjectStoreError(err)
            })?;
        info!(
            "Storage ready: database {}, objects {}",
            database.display(),
            objects_path.display()
        );

        PortalService::new(
            Arc::new(storage),
            Arc::new(objects),
            self.config.institution.clone(),
            self.config.limits.clone(),
        )
        .map_err(|err| ControllerError::InitializationFailed(err.to_string()))
    }

    /// Runs the portal until the web server stops.
    pub async fn run(&mut self) -> Result<(), ControllerError> {
        let addr: SocketAddr = self.config.socket_address().parse().map_err(|err| {
            error!("Invalid listen address {}: {}", self.config.socket_address(), err);
            ControllerError::InitializationFailed(format!(
                "invalid listen address {}",
                self.config.socket_address()
            ))
        })?;

        let portal = Arc::new(self.build_portal().await?);
        let email = Arc::new(EmailDispatcher::new(self.config.email.clone()));
        let maintenance = spawn_maintenance(
            portal.clone(),
            Duration::from_secs(self.config.limits.cleanup_interval_secs),
        );

        let server = WebServer::new(portal, email);
        let result = server.start(addr).await.map_err(ControllerError::WebError);
        self.shutdown(maintenance);
        result
    }

    fn shutdown(&self, maintenance: JoinHandle<()>) {
        info!("Shutting down controller");
        maintenance.abort();
    }
}

/// Periodically purges stale staged prize uploads and expired sessions.
pub fn spawn_maintenance(portal: Arc<PortalService>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            run_maintenance(&portal).await;
        }
    })
}

/// One maintenance pass. Failures are logged and retried on the next tick.
pub async fn run_maintenance(portal: &PortalService) {
    let now = Utc::now();
    debug!("Running maintenance pass");
    if let Err(err) = portal.purge_stale_staging(now).await {
        warn!("Purging staged prize uploads failed: {}", err);
    }
    if let Err(err) = portal.purge_expired_sessions(now).await {
        warn!("Purging expired sessions failed: {}", err);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config_in(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.storage.data_dir = dir.path().join("data").to_string_lossy().into_owned();
        config
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(matches!(
            Controller::new(config),
            Err(ControllerError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_build_portal_creates_data_layout() {
        let dir = TempDir::new().unwrap();
        let controller = Controller::new(config_in(&dir)).unwrap();
        let portal = controller.build_portal().await.unwrap();

        assert!(controller.config.database_path().exists());
        assert!(controller.config.objects_path().join("od_letters").is_dir());
        run_maintenance(&portal).await;
    }

    #[tokio::test]
    async fn test_invalid_listen_address() {
        let dir = TempDir::new().unwrap();
        let mut config = config_in(&dir);
        config.server.bind_address = "not an address".into();
        let mut controller = Controller::new(config).unwrap();
        assert!(matches!(
            controller.run().await,
            Err(ControllerError::InitializationFailed(_))
        ));
    }
}
