//! Ephemeral artifact store and HTTP file server
//!
//! Synthesized audio is written under a fresh unique name inside a serving
//! directory and becomes fetchable immediately at
//! `http://<lan-ip>:<http-port>/<filename>`. Artifacts are deleted by a
//! detached timer task after a grace period following dispatch; the delay is a
//! safety margin independent of whether playback was confirmed finished.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::{Error, Result};

/// Writes, addresses, and eventually deletes synthesized artifacts
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    root: PathBuf,
    base_url: String,
}

impl ArtifactStore {
    /// Create a store rooted at `root`, addressable at `base_url`
    /// (e.g. `http://192.168.1.10:8731`)
    ///
    /// # Errors
    ///
    /// Returns error if the serving directory cannot be created
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .map_err(|e| Error::Artifact(format!("failed to create {}: {e}", root.display())))?;

        Ok(Self {
            root,
            base_url: base_url.into(),
        })
    }

    /// The serving directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist encoded audio under a fresh unique filename.
    ///
    /// Returns the generated filename (relative to the serving directory).
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub async fn store(&self, audio: &[u8], extension: &str) -> Result<String> {
        let filename = format!("{}.{extension}", Uuid::new_v4());
        let path = self.root.join(&filename);

        tokio::fs::write(&path, audio)
            .await
            .map_err(|e| Error::Artifact(format!("failed to write {}: {e}", path.display())))?;

        tracing::info!(path = %path.display(), bytes = audio.len(), "artifact stored");
        Ok(filename)
    }

    /// Fetchable URL for a stored artifact
    #[must_use]
    pub fn url_for(&self, filename: &str) -> String {
        format!("{}/{filename}", self.base_url)
    }

    /// Delete an artifact after `delay`, from a detached timer task so the
    /// pipeline worker is never stalled by cleanup bookkeeping.
    ///
    /// Deletion errors are swallowed: the file may already be gone or still
    /// briefly held open by a fetch in progress.
    pub fn schedule_cleanup(&self, filename: &str, delay: Duration) {
        let path = self.root.join(filename);
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match tokio::fs::remove_file(&path).await {
                Ok(()) => tracing::debug!(path = %path.display(), "artifact deleted"),
                Err(e) => {
                    tracing::debug!(path = %path.display(), error = %e, "artifact delete skipped");
                }
            }
        });
    }
}

/// Read-only HTTP GET surface over the artifact directory
///
/// `GET /<filename>` returns the raw bytes with a content type inferred from
/// the extension. No other routes exist.
pub struct ArtifactServer {
    listener: TcpListener,
    root: PathBuf,
}

impl ArtifactServer {
    /// Bind the artifact server
    ///
    /// # Errors
    ///
    /// Returns error if the address cannot be bound
    pub async fn bind(root: impl Into<PathBuf>, addr: &str) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| Error::Config(format!("failed to bind artifact server: {e}")))?;
        Ok(Self {
            listener,
            root: root.into(),
        })
    }

    /// The bound local address
    ///
    /// # Errors
    ///
    /// Returns error if the socket address cannot be read
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve artifacts until the task is dropped
    ///
    /// # Errors
    ///
    /// Returns error if the server fails
    pub async fn run(self) -> Result<()> {
        tracing::info!(
            addr = %self.local_addr()?,
            dir = %self.root.display(),
            "artifact server listening"
        );

        let router = Router::new()
            .fallback_service(ServeDir::new(&self.root))
            .layer(TraceLayer::new_for_http());

        axum::serve(self.listener, router)
            .await
            .map_err(|e| Error::Config(format!("artifact server error: {e}")))?;

        Ok(())
    }

    /// Run the artifact server in a background task
    #[must_use]
    pub fn spawn(self) -> tokio::task::JoinHandle<Result<()>> {
        tokio::spawn(async move { self.run().await })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn store_writes_unique_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "http://10.0.0.1:8731").unwrap();

        let a = store.store(b"first", "mp3").await.unwrap();
        let b = store.store(b"second", "mp3").await.unwrap();

        assert_ne!(a, b);
        assert!(a.ends_with(".mp3"));
        assert_eq!(std::fs::read(dir.path().join(&a)).unwrap(), b"first");
        assert_eq!(std::fs::read(dir.path().join(&b)).unwrap(), b"second");
    }

    #[tokio::test]
    async fn url_contains_base_and_filename() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "http://10.0.0.1:8731").unwrap();

        let name = store.store(b"audio", "mp3").await.unwrap();
        assert_eq!(store.url_for(&name), format!("http://10.0.0.1:8731/{name}"));
    }

    #[tokio::test]
    async fn cleanup_deletes_after_delay() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "http://10.0.0.1:8731").unwrap();

        let name = store.store(b"audio", "mp3").await.unwrap();
        let path = dir.path().join(&name);

        store.schedule_cleanup(&name, Duration::from_millis(100));
        assert!(path.exists());

        tokio::time::sleep(Duration::from_millis(400)).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn cleanup_of_missing_file_is_swallowed() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "http://10.0.0.1:8731").unwrap();

        store.schedule_cleanup("never-existed.mp3", Duration::from_millis(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn server_serves_stored_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let store = ArtifactStore::new(dir.path(), "http://placeholder").unwrap();
        let name = store.store(b"mp3-bytes", "mp3").await.unwrap();

        let server = ArtifactServer::bind(dir.path(), "127.0.0.1:0").await.unwrap();
        let addr = server.local_addr().unwrap();
        let _handle = server.spawn();

        let body = reqwest::get(format!("http://{addr}/{name}"))
            .await
            .unwrap()
            .bytes()
            .await
            .unwrap();
        assert_eq!(&body[..], b"mp3-bytes");
    }
}
