use std::path::{Component, Path, PathBuf};

use crate::domain::errors::StorageError;
use crate::domain::ports::ObjectStorage;

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

fn public_url(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key.trim_start_matches('/'))
}

/// Object storage reached over HTTP: `PUT {endpoint}/{bucket}/{key}`.
///
/// The bucket is expected to be publicly readable under `public_base_url`.
#[derive(Debug, Clone)]
pub struct HttpObjectStorage {
    client: reqwest::Client,
    endpoint: String,
    bucket: String,
    public_base_url: String,
    api_token: Option<String>,
}

impl HttpObjectStorage {
    pub fn new(
        client: reqwest::Client,
        endpoint: impl Into<String>,
        bucket: impl Into<String>,
        public_base_url: impl Into<String>,
        api_token: Option<String>,
    ) -> Self {
        Self {
            client,
            endpoint: endpoint.into(),
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
            api_token,
        }
    }

    fn object_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            self.bucket,
            key.trim_start_matches('/')
        )
    }
}

impl ObjectStorage for HttpObjectStorage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, StorageError> {
        let mut request = self
            .client
            .put(self.object_url(key))
            .header(reqwest::header::CONTENT_TYPE, TEXT_CONTENT_TYPE)
            .body(bytes);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| StorageError::Http(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
            });
        }

        Ok(public_url(&self.public_base_url, key))
    }
}

/// Writes objects below a local directory that some web server exposes at
/// `public_base_url`.
#[derive(Debug, Clone)]
pub struct LocalDirStorage {
    root: PathBuf,
    public_base_url: String,
}

impl LocalDirStorage {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            public_base_url: public_base_url.into(),
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            return Err(StorageError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("invalid object key '{}'", key),
            )));
        }
        Ok(self.root.join(relative))
    }
}

impl ObjectStorage for LocalDirStorage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, StorageError> {
        let path = self.path_for(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        Ok(public_url(&self.public_base_url, key))
    }
}

/// The storage backend selected by configuration.
#[derive(Debug, Clone)]
pub enum Storage {
    Http(HttpObjectStorage),
    Local(LocalDirStorage),
}

impl ObjectStorage for Storage {
    async fn upload(&self, bytes: Vec<u8>, key: &str) -> Result<String, StorageError> {
        match self {
            Storage::Http(storage) => storage.upload(bytes, key).await,
            Storage::Local(storage) => storage.upload(bytes, key).await,
        }
    }
}
