//! Avatar blob store — opaque "store blob, return URL" capability.
//!
//! Uploads land under the data directory and are served by the HTTP layer
//! from `/avatars/`. Filenames are prefixed with a fresh UUID so uploads
//! never collide or overwrite each other.

use std::fs;
use std::path::{Path, PathBuf};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum AvatarError {
    #[error("Avatar storage failed: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone)]
pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    /// Open the store, creating the directory if needed.
    pub fn open(dir: &Path) -> Result<Self, AvatarError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist the blob and return the URL path it will be served under.
    pub fn store(&self, bytes: &[u8], filename: &str) -> Result<String, AvatarError> {
        let name = format!("{}_{}", Uuid::new_v4(), sanitize(filename));
        fs::write(self.dir.join(&name), bytes)?;
        Ok(format!("/avatars/{name}"))
    }
}

/// Keep only filesystem-safe filename characters.
fn sanitize(filename: &str) -> String {
    let cleaned: String = filename
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_writes_blob_and_returns_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::open(dir.path()).unwrap();

        let url = store.store(b"png-bytes", "me.png").unwrap();
        assert!(url.starts_with("/avatars/"));
        assert!(url.ends_with("me.png"));

        let name = url.strip_prefix("/avatars/").unwrap();
        let on_disk = fs::read(dir.path().join(name)).unwrap();
        assert_eq!(on_disk, b"png-bytes");
    }

    #[test]
    fn same_filename_never_collides() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::open(dir.path()).unwrap();

        let first = store.store(b"a", "me.png").unwrap();
        let second = store.store(b"b", "me.png").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn hostile_filenames_are_sanitized() {
        let dir = tempfile::tempdir().unwrap();
        let store = AvatarStore::open(dir.path()).unwrap();

        let url = store.store(b"x", "../../etc/passwd").unwrap();
        // No path separators survive, so the name cannot escape the store dir.
        assert!(!url.strip_prefix("/avatars/").unwrap().contains('/'));
        assert!(!url.strip_prefix("/avatars/").unwrap().contains('\\'));
    }
}
