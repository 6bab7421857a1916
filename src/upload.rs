//! Blob upload: scoped temp files and the uploader collaborator.
//!
//! Every generated image goes through [`render_and_store`]: the backend
//! writes a fresh `.png` temp file, the [`Uploader`] copies it somewhere
//! public and returns its URL, and the temp file is removed when the guard
//! drops, whether the render or the upload succeeded or not.
//!
//! [`LocalUploader`] is the concrete uploader the CLI uses. It names each
//! file after the SHA-256 of its contents, so uploading the same image twice
//! yields the same URL and never leaves duplicates behind.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("{0}")]
    Rejected(String),
}

/// Blob storage that turns a local file into a public URL.
pub trait Uploader {
    fn store(&self, file: &Path) -> Result<String, UploadError>;
}

/// Render into a scoped `.png` temp file and upload it.
///
/// `render` receives the temp path and must write the image there.
pub fn render_and_store<E>(
    uploader: &dyn Uploader,
    render: impl FnOnce(&Path) -> Result<(), E>,
) -> Result<String, E>
where
    E: From<UploadError>,
{
    let file = tempfile::Builder::new()
        .prefix("social-image-")
        .suffix(".png")
        .tempfile()
        .map_err(UploadError::from)?;
    render(file.path())?;
    let url = uploader.store(file.path())?;
    debug!(path = %file.path().display(), %url, "uploaded rendered image");
    Ok(url)
}

/// Content-addressed uploader writing into a local directory.
#[derive(Debug, Clone)]
pub struct LocalUploader {
    directory: PathBuf,
    public_base_url: String,
}

impl LocalUploader {
    pub fn new(directory: impl Into<PathBuf>, public_base_url: &str) -> Self {
        Self {
            directory: directory.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
        }
    }
}

impl Uploader for LocalUploader {
    fn store(&self, file: &Path) -> Result<String, UploadError> {
        let bytes = fs::read(file)?;
        if bytes.is_empty() {
            return Err(UploadError::Rejected(format!(
                "refusing to upload empty file {}",
                file.display()
            )));
        }
        let name = format!("{}.png", hash_bytes(&bytes));
        fs::create_dir_all(&self.directory)?;
        fs::write(self.directory.join(&name), &bytes)?;
        Ok(format!("{}/{}", self.public_base_url, name))
    }
}

fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}
