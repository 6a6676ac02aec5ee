//! Byte acquisition seam for asset loading
//!
//! [`AssetSource`] abstracts where asset bytes come from (filesystem, HTTP,
//! archive) so the loader and its tests can swap transports freely. Fetches
//! report chunk-level progress so the loader can emit download events.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;

/// Chunk-level progress callback: (bytes loaded so far, total bytes)
pub type FetchProgress<'a> = &'a (dyn Fn(u64, u64) + Send + Sync);

/// Source of raw asset bytes
#[async_trait]
pub trait AssetSource: Send + Sync {
    /// Fetch the full contents of `path`, invoking `progress` as chunks land
    async fn fetch(&self, path: &str, progress: FetchProgress<'_>) -> std::io::Result<Vec<u8>>;

    /// Lightweight existence probe (HEAD-style), used for sidecar files
    async fn exists(&self, path: &str) -> bool;
}

/// Filesystem-backed asset source
///
/// Reads in 64 KiB chunks so large models report incremental progress.
pub struct FileSource {
    root: PathBuf,
}

const CHUNK_SIZE: usize = 64 * 1024;

impl FileSource {
    /// Create a new file source rooted at the given directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl AssetSource for FileSource {
    async fn fetch(&self, path: &str, progress: FetchProgress<'_>) -> std::io::Result<Vec<u8>> {
        let full_path = self.root.join(path);
        let mut file = tokio::fs::File::open(&full_path).await?;
        let total = file.metadata().await?.len();

        let mut data = Vec::with_capacity(total as usize);
        let mut chunk = vec![0u8; CHUNK_SIZE];
        loop {
            let read = file.read(&mut chunk).await?;
            if read == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..read]);
            progress(data.len() as u64, total);
        }

        Ok(data)
    }

    async fn exists(&self, path: &str) -> bool {
        tokio::fs::metadata(self.root.join(path)).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_file_source_fetch_reports_progress() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blob.bin");
        let payload = vec![7u8; CHUNK_SIZE + 100];
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&payload)
            .unwrap();

        let source = FileSource::new(dir.path());
        let events = parking_lot::Mutex::new(Vec::new());
        let progress = |loaded: u64, total: u64| events.lock().push((loaded, total));

        let data = source.fetch("blob.bin", &progress).await.unwrap();
        assert_eq!(data, payload);

        let events = events.into_inner();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], (CHUNK_SIZE as u64, payload.len() as u64));
        assert_eq!(events[1], (payload.len() as u64, payload.len() as u64));
    }

    #[tokio::test]
    async fn test_file_source_exists_probe() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("present.mtl"), b"newmtl a\n").unwrap();

        let source = FileSource::new(dir.path());
        assert!(source.exists("present.mtl").await);
        assert!(!source.exists("absent.mtl").await);
    }
}
