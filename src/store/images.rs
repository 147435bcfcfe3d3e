//! Image side-store.
//!
//! Images are copied into one folder keyed by their original file name. A
//! second image with the same name replaces the first. Nothing links a
//! stored image to an order.

use crate::error::{OrderError, Result};
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{info, warn};

/// Accepted image extensions, lowercase.
pub const IMAGE_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

/// Folder holding uploaded images.
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    /// Open the store, creating the folder if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| OrderError::file_access(&dir, e))?;
        Ok(Self { dir })
    }

    /// Store folder.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Copy `source` into the store and return the stored path.
    pub fn add(&self, source: &Path) -> Result<PathBuf> {
        let name = source
            .file_name()
            .ok_or_else(|| OrderError::file_access(source, "not a file"))?;
        if !is_image(source) {
            return Err(OrderError::file_access(
                source,
                format!("expected one of {}", IMAGE_EXTENSIONS.join(", ")),
            ));
        }

        let target = self.dir.join(name);
        if target.exists() {
            warn!("Replacing stored image {}", target.display());
        }
        fs::copy(source, &target).map_err(|e| OrderError::file_access(source, e))?;

        info!("Stored image {}", target.display());
        Ok(target)
    }

    /// Delete a stored image. Returns whether a file was removed.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let target = self.dir.join(name);
        let mut components = Path::new(name).components();
        if !matches!(
            (components.next(), components.next()),
            (Some(Component::Normal(_)), None)
        ) {
            return Err(OrderError::file_access(target, "not a stored image name"));
        }
        if !target.exists() {
            return Ok(false);
        }
        fs::remove_file(&target).map_err(|e| OrderError::file_access(&target, e))?;
        info!("Removed image {}", target.display());
        Ok(true)
    }

    /// Names of stored images, sorted.
    pub fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.dir).map_err(|e| OrderError::file_access(&self.dir, e))?;
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.is_file() && is_image(&path) {
                if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}
