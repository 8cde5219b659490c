//! Gallery image storage
//!
//! The gallery directory is the database: listing enumerates it, upload
//! writes to it, delete unlinks from it. No metadata is kept anywhere else.
//! The filesystem sits behind [`ImageRepository`] so the name filtering and
//! route logic stay testable without real disk I/O.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use rand::Rng;
use thiserror::Error;

/// Extensions accepted for upload and returned by listings.
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Upload size ceiling: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum GalleryError {
    #[error("images only (jpeg, jpg, png, gif)")]
    UnsupportedType,

    #[error("image exceeds the {0}-byte upload limit")]
    PayloadTooLarge(u64),

    #[error("image not found: {0}")]
    NotFound(String),

    #[error("gallery I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Store of published gallery images.
#[async_trait]
pub trait ImageRepository: Send + Sync {
    /// Filenames of all images, in directory enumeration order.
    async fn list(&self) -> Result<Vec<String>, GalleryError>;

    /// Validate and store an upload; returns the generated filename.
    async fn save(
        &self,
        content: &[u8],
        original_name: &str,
        media_type: Option<&str>,
    ) -> Result<String, GalleryError>;

    /// Remove a stored image by filename.
    async fn delete(&self, filename: &str) -> Result<(), GalleryError>;
}

/// Lowercased extension of `name`, if it is one of the allowed image types.
pub fn image_extension(name: &str) -> Option<String> {
    let ext = Path::new(name).extension()?.to_str()?.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// Whether a declared media type is an accepted image type.
pub fn is_supported_media_type(media_type: &str) -> bool {
    match media_type.split_once('/') {
        Some(("image", subtype)) => {
            let subtype = subtype
                .split(';')
                .next()
                .unwrap_or(subtype)
                .trim()
                .to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&subtype.as_str())
        }
        _ => false,
    }
}

/// Keep only names with a recognized image extension.
pub fn filter_image_names<I>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    names
        .into_iter()
        .filter(|name| image_extension(name).is_some())
        .collect()
}

/// A filename that refers to a direct child of the gallery directory.
/// Anything with a path separator or a parent-dir component is rejected so
/// the delete route cannot reach outside the gallery root.
fn is_plain_filename(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains('/')
        && !name.contains('\\')
}

/// Generate a collision-resistant stored filename:
/// `image-<unix-millis>-<random>.<ext>`.
fn unique_filename(ext: &str) -> String {
    let millis = chrono::Utc::now().timestamp_millis();
    let suffix: u32 = rand::thread_rng().gen_range(0..1_000_000_000);
    format!("image-{millis}-{suffix}.{ext}")
}

/// Filesystem-backed gallery rooted at a single directory.
pub struct DiskGallery {
    root: PathBuf,
    max_bytes: u64,
}

impl DiskGallery {
    /// Open the gallery, creating the directory tree if absent.
    pub fn open(root: impl Into<PathBuf>, max_bytes: u64) -> Result<Self, GalleryError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        tracing::info!("Ensured gallery directory exists: {}", root.display());
        Ok(Self { root, max_bytes })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl ImageRepository for DiskGallery {
    async fn list(&self) -> Result<Vec<String>, GalleryError> {
        let mut names = Vec::new();
        let mut dir = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = dir.next_entry().await? {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
        Ok(filter_image_names(names))
    }

    async fn save(
        &self,
        content: &[u8],
        original_name: &str,
        media_type: Option<&str>,
    ) -> Result<String, GalleryError> {
        let ext = image_extension(original_name).ok_or(GalleryError::UnsupportedType)?;
        if let Some(media_type) = media_type {
            if !is_supported_media_type(media_type) {
                return Err(GalleryError::UnsupportedType);
            }
        }
        if content.len() as u64 > self.max_bytes {
            return Err(GalleryError::PayloadTooLarge(self.max_bytes));
        }

        // Timestamp + random suffix makes collisions improbable; regenerate
        // rather than overwrite if one happens anyway.
        let filename = loop {
            let candidate = unique_filename(&ext);
            if !tokio::fs::try_exists(self.root.join(&candidate)).await? {
                break candidate;
            }
        };

        tokio::fs::write(self.root.join(&filename), content).await?;
        tracing::info!("Stored image {} ({} bytes)", filename, content.len());
        Ok(filename)
    }

    async fn delete(&self, filename: &str) -> Result<(), GalleryError> {
        if !is_plain_filename(filename) {
            // A blocked traversal is indistinguishable from a missing file.
            return Err(GalleryError::NotFound(filename.to_string()));
        }

        match tokio::fs::remove_file(self.root.join(filename)).await {
            Ok(()) => {
                tracing::info!("Deleted image {}", filename);
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GalleryError::NotFound(filename.to_string()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn open_gallery(dir: &TempDir) -> DiskGallery {
        DiskGallery::open(dir.path(), DEFAULT_MAX_UPLOAD_BYTES).unwrap()
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert_eq!(image_extension("photo.JPG").as_deref(), Some("jpg"));
        assert_eq!(image_extension("anim.gif").as_deref(), Some("gif"));
        assert_eq!(image_extension("notes.txt"), None);
        assert_eq!(image_extension("no_extension"), None);
    }

    #[test]
    fn media_type_check_accepts_image_subtypes_only() {
        assert!(is_supported_media_type("image/png"));
        assert!(is_supported_media_type("image/jpeg; charset=binary"));
        assert!(!is_supported_media_type("image/webp"));
        assert!(!is_supported_media_type("text/plain"));
        assert!(!is_supported_media_type("png"));
    }

    #[test]
    fn listing_filter_needs_no_disk() {
        let names = vec![
            "a.jpg".to_string(),
            "b.PNG".to_string(),
            "notes.txt".to_string(),
            "subfolder".to_string(),
            "c.gif".to_string(),
        ];
        assert_eq!(filter_image_names(names), vec!["a.jpg", "b.PNG", "c.gif"]);
    }

    #[test]
    fn generated_names_differ_and_keep_extension() {
        let a = unique_filename("png");
        let b = unique_filename("png");
        assert_ne!(a, b);
        assert!(a.starts_with("image-"));
        assert!(a.ends_with(".png"));
    }

    #[test]
    fn plain_filename_rejects_traversal_shapes() {
        assert!(is_plain_filename("image-1-2.jpg"));
        assert!(!is_plain_filename("../secrets.txt"));
        assert!(!is_plain_filename("nested/photo.jpg"));
        assert!(!is_plain_filename("..\\windows.jpg"));
        assert!(!is_plain_filename(".."));
        assert!(!is_plain_filename(""));
    }

    #[tokio::test]
    async fn save_list_delete_roundtrip() {
        let dir = TempDir::new().unwrap();
        let gallery = open_gallery(&dir);

        assert!(gallery.list().await.unwrap().is_empty());

        let name = gallery
            .save(b"png-bytes", "pixel.png", Some("image/png"))
            .await
            .unwrap();
        assert!(name.ends_with(".png"));
        assert_eq!(gallery.list().await.unwrap(), vec![name.clone()]);

        gallery.delete(&name).await.unwrap();
        assert!(gallery.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saves_never_overwrite() {
        let dir = TempDir::new().unwrap();
        let gallery = open_gallery(&dir);

        let a = gallery.save(b"one", "a.jpg", None).await.unwrap();
        let b = gallery.save(b"two", "a.jpg", None).await.unwrap();

        assert_ne!(a, b);
        assert_eq!(gallery.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn save_rejects_unsupported_uploads() {
        let dir = TempDir::new().unwrap();
        let gallery = open_gallery(&dir);

        let bad_ext = gallery.save(b"data", "script.svg", None).await;
        assert!(matches!(bad_ext, Err(GalleryError::UnsupportedType)));

        let bad_mime = gallery
            .save(b"data", "photo.png", Some("application/octet-stream"))
            .await;
        assert!(matches!(bad_mime, Err(GalleryError::UnsupportedType)));

        assert!(gallery.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn save_enforces_size_ceiling() {
        let dir = TempDir::new().unwrap();
        let gallery = DiskGallery::open(dir.path(), 8).unwrap();

        let too_big = gallery.save(b"123456789", "big.jpg", None).await;
        assert!(matches!(too_big, Err(GalleryError::PayloadTooLarge(8))));

        assert!(gallery.save(b"12345678", "ok.jpg", None).await.is_ok());
    }

    #[tokio::test]
    async fn delete_missing_is_not_found_and_changes_nothing() {
        let dir = TempDir::new().unwrap();
        let gallery = open_gallery(&dir);
        let kept = gallery.save(b"keep", "keep.gif", None).await.unwrap();

        let missing = gallery.delete("image-0-0.png").await;
        assert!(matches!(missing, Err(GalleryError::NotFound(_))));
        assert_eq!(gallery.list().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn delete_blocks_path_traversal() {
        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim.jpg");
        std::fs::write(&victim, b"do not touch").unwrap();

        let dir = TempDir::new_in(outside.path()).unwrap();
        let gallery = open_gallery(&dir);

        let attempt = gallery.delete("../victim.jpg").await;
        assert!(matches!(attempt, Err(GalleryError::NotFound(_))));
        assert!(victim.exists());
    }
}
