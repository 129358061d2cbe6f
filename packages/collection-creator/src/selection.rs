//! Image selection: the drop-zone filter and the current file selection.

use bytes::Bytes;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Extensions accepted by the drop zone and the MIME type each maps to.
const ACCEPTED: &[(&str, &str)] = &[
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("gif", "image/gif"),
];

/// MIME type for an accepted image path, matched on extension.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    ACCEPTED
        .iter()
        .find(|(accepted, _)| *accepted == ext)
        .map(|(_, mime)| *mime)
}

/// A selected image held in memory.
#[derive(Debug, Clone)]
pub struct ImageFile {
    pub path: PathBuf,
    pub name: String,
    pub mime: &'static str,
    pub content: Bytes,
}

impl ImageFile {
    pub fn new(name: impl Into<String>, mime: &'static str, content: impl Into<Bytes>) -> Self {
        let name = name.into();
        Self {
            path: PathBuf::from(&name),
            name,
            mime,
            content: content.into(),
        }
    }

    pub fn size(&self) -> u64 {
        self.content.len() as u64
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotAnImage,
    TooLarge { size: u64, max: u64 },
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnImage => write!(f, "not a png, jpg, or gif image"),
            Self::TooLarge { size, max } => write!(f, "{size} bytes exceeds the {max} byte limit"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RejectedFile {
    pub path: PathBuf,
    pub reason: RejectReason,
}

/// Result of one drop: accepted files in drop order plus the rejects.
#[derive(Debug, Default)]
pub struct DropOutcome {
    pub accepted: Vec<ImageFile>,
    pub rejected: Vec<RejectedFile>,
}

/// Acceptance rules for dropped files.
#[derive(Debug, Clone, Copy)]
pub struct DropPolicy {
    pub max_bytes: u64,
}

impl DropPolicy {
    pub fn new(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    pub fn check(&self, path: &Path, size: u64) -> Result<&'static str, RejectReason> {
        let mime = image_mime(path).ok_or(RejectReason::NotAnImage)?;
        if size > self.max_bytes {
            return Err(RejectReason::TooLarge {
                size,
                max: self.max_bytes,
            });
        }
        Ok(mime)
    }

    /// Read every acceptable file. Unreadable paths abort the drop.
    pub async fn drop_files(&self, paths: &[PathBuf]) -> Result<DropOutcome, crate::Error> {
        let mut outcome = DropOutcome::default();
        for path in paths {
            let meta = tokio::fs::metadata(path)
                .await
                .map_err(|e| crate::Error::Selection(format!("{}: {e}", path.display())))?;

            let mime = match self.check(path, meta.len()) {
                Ok(mime) => mime,
                Err(reason) => {
                    warn!(path = %path.display(), %reason, "File rejected");
                    outcome.rejected.push(RejectedFile {
                        path: path.clone(),
                        reason,
                    });
                    continue;
                }
            };

            let content = tokio::fs::read(path)
                .await
                .map_err(|e| crate::Error::Selection(format!("{}: {e}", path.display())))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string());

            debug!(name = %name, mime, bytes = content.len(), "File accepted");
            outcome.accepted.push(ImageFile {
                path: path.clone(),
                name,
                mime,
                content: Bytes::from(content),
            });
        }
        Ok(outcome)
    }
}

/// Expand directories one level deep (entries sorted by name); files pass through.
pub async fn expand_paths(paths: &[PathBuf]) -> Result<Vec<PathBuf>, crate::Error> {
    let mut out = Vec::new();
    for path in paths {
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|e| crate::Error::Selection(format!("{}: {e}", path.display())))?;
        if !meta.is_dir() {
            out.push(path.clone());
            continue;
        }

        let mut entries = tokio::fs::read_dir(path)
            .await
            .map_err(|e| crate::Error::Selection(format!("{}: {e}", path.display())))?;
        let mut files = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| crate::Error::Selection(format!("{}: {e}", path.display())))?
        {
            let is_file = entry.file_type().await.map(|t| t.is_file()).unwrap_or(false);
            if is_file {
                files.push(entry.path());
            }
        }
        files.sort();
        out.extend(files);
    }
    Ok(out)
}

/// The current set of files. Each drop replaces it; selections never merge.
#[derive(Debug, Default)]
pub struct FileSelection {
    files: Vec<ImageFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn replace(&mut self, files: Vec<ImageFile>) {
        self.files = files;
    }

    pub fn files(&self) -> &[ImageFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}
