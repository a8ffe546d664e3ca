//! File sources handed to the upload controller.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::{Error, Result};

/// A user-selected file: metadata known up front, contents read on demand.
#[async_trait]
pub trait FileSource: Send + Sync {
    /// Original filename
    fn name(&self) -> &str;

    /// Declared MIME type
    fn mime_type(&self) -> &str;

    /// Declared size in bytes
    fn size(&self) -> u64;

    /// Read the full contents.
    async fn read_all(&self) -> std::io::Result<Vec<u8>>;
}

/// File held in memory.
#[derive(Debug, Clone)]
pub struct MemoryFile {
    name: String,
    mime_type: String,
    data: Vec<u8>,
}

impl MemoryFile {
    /// Create a file from bytes already in memory.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            data,
        }
    }
}

#[async_trait]
impl FileSource for MemoryFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    async fn read_all(&self) -> std::io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }
}

/// File on disk. Size is taken from metadata at open; contents are read
/// when the upload reaches its encoding stage.
#[derive(Debug, Clone)]
pub struct DiskFile {
    path: PathBuf,
    name: String,
    mime_type: String,
    size: u64,
}

impl DiskFile {
    /// Stat `path` and infer its MIME type from the extension.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());

        let metadata = tokio::fs::metadata(&path).await.map_err(|e| Error::ReadError {
            file: name.clone(),
            reason: e.to_string(),
        })?;

        if !metadata.is_file() {
            return Err(Error::ReadError {
                file: name,
                reason: "not a regular file".to_string(),
            });
        }

        Ok(Self {
            mime_type: mime_from_extension(&path).to_string(),
            size: metadata.len(),
            path,
            name,
        })
    }

    /// Override the inferred MIME type.
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = mime_type.into();
        self
    }

    /// Path on disk
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl FileSource for DiskFile {
    fn name(&self) -> &str {
        &self.name
    }

    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn size(&self) -> u64 {
        self.size
    }

    async fn read_all(&self) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(&self.path).await
    }
}

/// Infer a MIME type from a file extension.
pub fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("mp4") => "video/mp4",
        Some("mov") => "video/quicktime",
        Some("webm") => "video/webm",
        Some("pdf") => "application/pdf",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mime_from_extension() {
        assert_eq!(mime_from_extension(Path::new("me.JPG")), "image/jpeg");
        assert_eq!(mime_from_extension(Path::new("clip.mov")), "video/quicktime");
        assert_eq!(mime_from_extension(Path::new("cv.pdf")), "application/pdf");
        assert_eq!(mime_from_extension(Path::new("README")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_disk_file_reads_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.png");
        std::fs::write(&path, [1u8, 2, 3, 4]).unwrap();

        let file = DiskFile::open(&path).await.unwrap();
        assert_eq!(file.name(), "photo.png");
        assert_eq!(file.mime_type(), "image/png");
        assert_eq!(file.size(), 4);
        assert_eq!(file.read_all().await.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_disk_file_missing_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = DiskFile::open(dir.path().join("nope.pdf")).await;
        assert!(matches!(result, Err(Error::ReadError { file, .. }) if file == "nope.pdf"));
    }

    #[tokio::test]
    async fn test_memory_file() {
        let file = MemoryFile::new("a.gif", "image/gif", vec![0; 10]);
        assert_eq!(file.size(), 10);
        assert_eq!(file.read_all().await.unwrap().len(), 10);
    }
}
