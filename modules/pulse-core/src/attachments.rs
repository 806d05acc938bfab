//! Files staged on a submission before it is published.
//!
//! Each staged file holds a [`PreviewHandle`] registered with a
//! [`PreviewRegistry`]. Handles are released on `remove`, `clear`, or when
//! the set is dropped, so `registry.live()` reaching zero means nothing leaked.

use std::fmt;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

use pulse_common::{Evidence, EvidenceKind, PulseError};

const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp", "bmp", "svg", "heic"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Image,
    Pdf,
}

impl AttachmentKind {
    /// Images and PDFs only. A recognised MIME type wins; otherwise the file
    /// extension decides.
    pub fn detect(name: &str, mime: &str) -> Result<Self, PulseError> {
        let mime = mime.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            return Ok(AttachmentKind::Image);
        }
        if mime == "application/pdf" {
            return Ok(AttachmentKind::Pdf);
        }

        let extension = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match extension.as_deref() {
            Some("pdf") => Ok(AttachmentKind::Pdf),
            Some(ext) if IMAGE_EXTENSIONS.contains(&ext) => Ok(AttachmentKind::Image),
            _ => Err(PulseError::Validation(format!(
                "unsupported attachment '{name}' ({mime}); only images and PDF are accepted"
            ))),
        }
    }

    fn evidence_kind(self) -> EvidenceKind {
        match self {
            AttachmentKind::Image => EvidenceKind::Image,
            AttachmentKind::Pdf => EvidenceKind::Document,
        }
    }
}

/// Counts preview handles that have been created and not yet released.
#[derive(Debug, Clone, Default)]
pub struct PreviewRegistry {
    live: Arc<AtomicUsize>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    fn open(&self, id: AttachmentId) -> PreviewHandle {
        self.live.fetch_add(1, Ordering::SeqCst);
        PreviewHandle {
            id,
            live: Arc::clone(&self.live),
        }
    }
}

/// Local preview of a staged file. Released on drop.
#[derive(Debug)]
pub struct PreviewHandle {
    id: AttachmentId,
    live: Arc<AtomicUsize>,
}

impl PreviewHandle {
    pub fn url(&self) -> String {
        format!("preview://{}", self.id)
    }
}

impl Drop for PreviewHandle {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
        debug!(attachment_id = %self.id, "Preview released");
    }
}

#[derive(Debug)]
pub struct StagedAttachment {
    pub id: AttachmentId,
    pub name: String,
    pub kind: AttachmentKind,
    preview: PreviewHandle,
}

impl StagedAttachment {
    pub fn preview_url(&self) -> String {
        self.preview.url()
    }
}

#[derive(Debug)]
pub struct AttachmentSet {
    registry: PreviewRegistry,
    staged: Vec<StagedAttachment>,
}

impl AttachmentSet {
    pub fn new(registry: PreviewRegistry) -> Self {
        Self {
            registry,
            staged: Vec::new(),
        }
    }

    pub fn stage(&mut self, name: &str, mime: &str, bytes: Vec<u8>) -> Result<AttachmentId, PulseError> {
        let kind = AttachmentKind::detect(name, mime)?;
        let id = AttachmentId::new();
        let preview = self.registry.open(id);

        debug!(attachment_id = %id, name, ?kind, size = bytes.len(), "Attachment staged");
        self.staged.push(StagedAttachment {
            id,
            name: name.to_string(),
            kind,
            preview,
        });
        Ok(id)
    }

    /// Returns false when `id` is not staged.
    pub fn remove(&mut self, id: AttachmentId) -> bool {
        let before = self.staged.len();
        self.staged.retain(|a| a.id != id);
        self.staged.len() != before
    }

    pub fn clear(&mut self) {
        self.staged.clear();
    }

    pub fn len(&self) -> usize {
        self.staged.len()
    }

    pub fn is_empty(&self) -> bool {
        self.staged.is_empty()
    }

    pub fn to_evidence(&self, contributor: &str) -> Vec<Evidence> {
        self.staged
            .iter()
            .map(|a| Evidence {
                id: a.id.to_string(),
                kind: a.kind.evidence_kind(),
                url: a.preview_url(),
                contributor: contributor.to_string(),
                verified: false,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_by_mime_or_extension() {
        assert_eq!(AttachmentKind::detect("a", "image/png").unwrap(), AttachmentKind::Image);
        assert_eq!(AttachmentKind::detect("a", "application/pdf").unwrap(), AttachmentKind::Pdf);
        assert_eq!(
            AttachmentKind::detect("scan.PDF", "application/octet-stream").unwrap(),
            AttachmentKind::Pdf
        );
        assert_eq!(AttachmentKind::detect("photo.jpeg", "").unwrap(), AttachmentKind::Image);

        let err = AttachmentKind::detect("notes.txt", "text/plain").unwrap_err();
        assert!(matches!(err, PulseError::Validation(_)));
        assert!(AttachmentKind::detect("clip.mp4", "video/mp4").is_err());
    }

    #[test]
    fn test_handles_released_on_remove_clear_and_drop() {
        let registry = PreviewRegistry::new();
        let mut set = AttachmentSet::new(registry.clone());

        let first = set.stage("a.png", "image/png", vec![1, 2, 3]).unwrap();
        set.stage("b.pdf", "application/pdf", vec![4]).unwrap();
        set.stage("c.png", "image/png", vec![5]).unwrap();
        assert_eq!(registry.live(), 3);

        assert!(set.remove(first));
        assert!(!set.remove(first));
        assert_eq!(registry.live(), 2);

        set.clear();
        assert_eq!(registry.live(), 0);

        set.stage("d.png", "image/png", Vec::new()).unwrap();
        assert_eq!(registry.live(), 1);
        drop(set);
        assert_eq!(registry.live(), 0);
    }

    #[test]
    fn test_rejected_file_opens_no_handle() {
        let registry = PreviewRegistry::new();
        let mut set = AttachmentSet::new(registry.clone());
        assert!(set.stage("run.exe", "application/x-msdownload", vec![0]).is_err());
        assert_eq!(registry.live(), 0);
        assert!(set.is_empty());
    }

    #[test]
    fn test_to_evidence() {
        let mut set = AttachmentSet::new(PreviewRegistry::new());
        let image = set.stage("a.png", "image/png", vec![1]).unwrap();
        set.stage("b.pdf", "application/pdf", vec![2]).unwrap();

        let evidence = set.to_evidence("alex");
        assert_eq!(evidence.len(), 2);
        assert_eq!(evidence[0].kind, EvidenceKind::Image);
        assert_eq!(evidence[0].url, format!("preview://{image}"));
        assert_eq!(evidence[1].kind, EvidenceKind::Document);
        assert!(evidence.iter().all(|e| !e.verified && e.contributor == "alex"));
    }
}
