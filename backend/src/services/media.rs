//! Storage for uploaded images.
//!
//! Files land under `<media root>/uploads/{profiles,posts}/` with a name built
//! from a slug of the owning record and a random UUID. Records keep the path
//! relative to the media root; clients see it below the public URL prefix.

use file_format::FileFormat;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::error::{ServiceError, ServiceResult};

/// Which record an upload belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    Profiles,
    Posts,
}

impl MediaCategory {
    fn directory(self) -> &'static str {
        match self {
            Self::Profiles => "uploads/profiles",
            Self::Posts => "uploads/posts",
        }
    }
}

/// Image formats accepted for upload, detected from magic bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
}

impl ImageKind {
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        match FileFormat::from_bytes(bytes) {
            FileFormat::PortableNetworkGraphics => Some(Self::Png),
            FileFormat::JointPhotographicExpertsGroup => Some(Self::Jpeg),
            FileFormat::GraphicsInterchangeFormat => Some(Self::Gif),
            FileFormat::Webp => Some(Self::Webp),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
            Self::Webp => "webp",
        }
    }
}

/// Lowercase ASCII slug: alphanumerics, `_` and `-`; whitespace runs become `-`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(ch.to_ascii_lowercase());
        } else if ch.is_whitespace() || ch == '-' {
            pending_dash = true;
        }
    }
    let slug = slug.trim_matches(|c| c == '-' || c == '_').to_string();
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug
    }
}

/// Writes uploads below a media root and renders their public URLs.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
    url_prefix: String,
    max_bytes: usize,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>, url_prefix: impl Into<String>, max_bytes: usize) -> Self {
        Self {
            root: root.into(),
            url_prefix: url_prefix.into(),
            max_bytes,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Public URL for a stored relative path.
    pub fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.url_prefix.trim_end_matches('/'), path)
    }

    /// Validate and persist an image. Returns its path relative to the root.
    pub async fn save_image(
        &self,
        category: MediaCategory,
        label: &str,
        bytes: &[u8],
    ) -> ServiceResult<String> {
        if bytes.is_empty() {
            return Err(ServiceError::invalid(
                "image",
                "The submitted file is empty.",
            ));
        }
        if bytes.len() > self.max_bytes {
            return Err(ServiceError::invalid(
                "image",
                format!("Ensure the file is at most {} bytes.", self.max_bytes),
            ));
        }
        let kind = ImageKind::detect(bytes).ok_or_else(|| {
            ServiceError::invalid(
                "image",
                "Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
            )
        })?;

        let relative = format!(
            "{}/{}-{}.{}",
            category.directory(),
            slugify(label),
            Uuid::new_v4(),
            kind.extension()
        );
        let target = self.root.join(&relative);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| ServiceError::Media(format!("{}: {}", parent.display(), e)))?;
        }
        tokio::fs::write(&target, bytes)
            .await
            .map_err(|e| ServiceError::Media(format!("{}: {}", target.display(), e)))?;

        log::debug!("Stored {} bytes at {}", bytes.len(), target.display());
        Ok(relative)
    }

    /// Remove a previously stored file. Failures are logged, not returned.
    pub async fn remove(&self, relative: &str) {
        let target = self.root.join(relative);
        if let Err(e) = tokio::fs::remove_file(&target).await {
            log::warn!("Could not remove {}: {}", target.display(), e);
        }
    }
}
