use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{debug, error, info, warn};
use tokio::fs;

use crate::error_handling::types::ObjectStoreError;
use crate::object_store::object_store_trait::ObjectStore;
use crate::object_store::types::{Folder, ObjectRef};

/// Filesystem-backed object store: one sub-directory per [`Folder`].
pub struct FileObjectStore {
    base_path: PathBuf,
    public_base_url: String,
}

impl FileObjectStore {
    pub fn new<P: AsRef<Path>>(base_path: P, public_base_url: &str) -> Result<Self, ObjectStoreError> {
        let base_path = base_path.as_ref().to_path_buf();
        for folder in Folder::ALL {
            let dir = base_path.join(folder.dir_name());
            std::fs::create_dir_all(&dir).map_err(|e| {
                error!("Failed to create object folder {}: {}", dir.display(), e);
                ObjectStoreError::IoError(e)
            })?;
        }
        info!("FileObjectStore initialized at {}", base_path.display());
        Ok(Self {
            base_path,
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        })
    }

    fn path_for(&self, object: &ObjectRef) -> PathBuf {
        self.base_path.join(object.folder.dir_name()).join(&object.name)
    }
}

#[async_trait]
impl ObjectStore for FileObjectStore {
    async fn put(&self, object: &ObjectRef, data: &[u8]) -> Result<(), ObjectStoreError> {
        let path = self.path_for(object);
        fs::write(&path, data).await.map_err(|e| {
            error!("Write failed {}: {}", path.display(), e);
            ObjectStoreError::IoError(e)
        })?;
        info!("Stored {} ({} byte(s))", object, data.len());
        Ok(())
    }

    async fn get(&self, object: &ObjectRef) -> Result<Vec<u8>, ObjectStoreError> {
        let path = self.path_for(object);
        match fs::read(&path).await {
            Ok(bytes) => {
                debug!("Read {} byte(s) from {}", bytes.len(), path.display());
                Ok(bytes)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ObjectStoreError::NotFound(object.to_string()))
            }
            Err(e) => {
                error!("Read failed {}: {}", path.display(), e);
                Err(ObjectStoreError::IoError(e))
            }
        }
    }

    async fn delete(&self, object: &ObjectRef) -> Result<bool, ObjectStoreError> {
        let path = self.path_for(object);
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted {}", object);
                Ok(true)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Delete of missing object {}", object);
                Ok(false)
            }
            Err(e) => {
                error!("Delete failed {}: {}", path.display(), e);
                Err(ObjectStoreError::IoError(e))
            }
        }
    }

    fn public_url(&self, object: &ObjectRef) -> String {
        format!("{}/files/{}", self.public_base_url, object)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_get_delete() {
        let dir = TempDir::new().unwrap();
        let store = FileObjectStore::new(dir.path(), "http://portal.test/").unwrap();
        let object = ObjectRef::unique(Folder::Certificates, "application/pdf");

        store.put(&object, b"%PDF-1.3").await.unwrap();
        assert_eq!(store.get(&object).await.unwrap(), b"%PDF-1.3");
        assert!(dir.path().join("certificates").join(&object.name).exists());

        assert!(store.delete(&object).await.unwrap());
        assert!(!store.delete(&object).await.unwrap());
        assert!(matches!(
            store.get(&object).await,
            Err(ObjectStoreError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_public_url_layout() {
        let dir = TempDir::new().unwrap();
        let store = FileObjectStore::new(dir.path(), "http://portal.test/").unwrap();
        let object = ObjectRef::new(Folder::OdLetters, "x_approved.pdf").unwrap();
        assert_eq!(
            store.public_url(&object),
            "http://portal.test/files/od_letters/x_approved.pdf"
        );
        for folder in Folder::ALL {
            assert!(dir.path().join(folder.dir_name()).is_dir());
        }
    }
}
