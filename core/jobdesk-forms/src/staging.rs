//! Attachment staging.
//!
//! Files picked by the user are held here until the form is submitted. Each
//! staged file owns one preview resource from a [`PreviewSource`]; the handle
//! is moved back into the source on release, so a preview cannot be released
//! twice. Files outside the field's [`UploadLimits`] are turned away before a
//! preview exists.

use crate::error::{RejectedFile, ResourceLeakWarning};
use jobdesk_model::{FileRef, UploadLimits};
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{debug, warn};
use uuid::Uuid;

/// Identity of a picked file. Clones of a [`LocalFile`] share it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileKey(Uuid);

impl FileKey {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for FileKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for FileKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A file the user picked, before it is staged.
#[derive(Debug, Clone)]
pub struct LocalFile {
    key: FileKey,
    name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl LocalFile {
    pub fn new(
        name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Self {
        Self {
            key: FileKey::new(),
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Reads a file from disk, guessing the MIME type from its extension.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(name, mime_from_extension(path), bytes))
    }

    pub fn key(&self) -> FileKey {
        self.key
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }
}

fn mime_from_extension(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        _ => "application/octet-stream",
    }
}

/// A revocable preview resource (e.g., an object URL). Not cloneable.
#[derive(Debug, PartialEq, Eq)]
pub struct PreviewHandle {
    id: Uuid,
    uri: String,
}

impl PreviewHandle {
    pub fn new(id: Uuid, uri: impl Into<String>) -> Self {
        Self { id, uri: uri.into() }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

/// Creates and releases preview resources.
pub trait PreviewSource: Send + Sync {
    fn create(&self, file: &LocalFile) -> PreviewHandle;

    /// Consumes the handle; the resource behind it is gone afterwards.
    fn release(&self, handle: PreviewHandle);
}

#[derive(Debug, Default)]
struct PreviewLedger {
    live: HashMap<Uuid, String>,
    released: HashMap<Uuid, u32>,
}

/// In-memory [`PreviewSource`] that keeps count, for leak checks.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    ledger: Mutex<PreviewLedger>,
}

impl PreviewRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn ledger(&self) -> std::sync::MutexGuard<'_, PreviewLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Previews created and not yet released.
    pub fn live_count(&self) -> usize {
        self.ledger().live.len()
    }

    pub fn is_live(&self, id: Uuid) -> bool {
        self.ledger().live.contains_key(&id)
    }

    /// How many times the preview `id` was released.
    pub fn release_count(&self, id: Uuid) -> u32 {
        self.ledger().released.get(&id).copied().unwrap_or(0)
    }

    /// Fails when any preview is still live.
    pub fn check_leaks(&self) -> Result<(), ResourceLeakWarning> {
        match self.live_count() {
            0 => Ok(()),
            live => Err(ResourceLeakWarning { live }),
        }
    }
}

impl PreviewSource for PreviewRegistry {
    fn create(&self, file: &LocalFile) -> PreviewHandle {
        let id = Uuid::now_v7();
        let uri = format!("preview://{id}/{}", file.name());
        self.ledger().live.insert(id, uri.clone());
        PreviewHandle::new(id, uri)
    }

    fn release(&self, handle: PreviewHandle) {
        let mut ledger = self.ledger();
        if ledger.live.remove(&handle.id).is_none() {
            warn!("Released preview {} that was not live", handle.uri);
        }
        *ledger.released.entry(handle.id).or_insert(0) += 1;
    }
}

/// A staged file with its preview. Created by [`AttachmentStaging::add_files`].
#[derive(Debug)]
pub struct StagedAttachment {
    origin: FileKey,
    preview: PreviewHandle,
    file_name: String,
    mime_type: String,
    bytes: Arc<[u8]>,
}

impl StagedAttachment {
    pub fn origin_key(&self) -> FileKey {
        self.origin
    }

    pub fn preview(&self) -> &PreviewHandle {
        &self.preview
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn bytes(&self) -> &Arc<[u8]> {
        &self.bytes
    }

    /// The reference written into the form record.
    pub fn file_ref(&self) -> FileRef {
        FileRef {
            file_id: self.origin.as_uuid(),
            file_name: self.file_name.clone(),
            mime_type: self.mime_type.clone(),
            size_bytes: self.size_bytes(),
            preview: self.preview.uri().to_string(),
        }
    }
}

/// The staged files of one form field.
pub struct AttachmentStaging {
    field_path: String,
    items: Vec<StagedAttachment>,
    previews: Arc<dyn PreviewSource>,
    limits: UploadLimits,
}

impl AttachmentStaging {
    pub fn new(field_path: impl Into<String>, previews: Arc<dyn PreviewSource>) -> Self {
        Self {
            field_path: field_path.into(),
            items: Vec::new(),
            previews,
            limits: UploadLimits::default(),
        }
    }

    pub fn with_limits(mut self, limits: UploadLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn field_path(&self) -> &str {
        &self.field_path
    }

    pub fn limits(&self) -> &UploadLimits {
        &self.limits
    }

    /// Checks `file` against the limits, as if `staged` files were held.
    fn admit(&self, file: &LocalFile, staged: usize) -> Result<(), RejectedFile> {
        if let Some(max) = self.limits.max_bytes.filter(|max| file.size_bytes() > *max) {
            return Err(RejectedFile::TooLarge {
                name: file.name().to_string(),
                size: file.size_bytes(),
                max,
            });
        }
        if !self.limits.accepts_type(file.mime_type()) {
            return Err(RejectedFile::UnsupportedType {
                name: file.name().to_string(),
                mime_type: file.mime_type().to_string(),
            });
        }
        if let Some(max) = self.limits.max_files.filter(|max| staged >= *max) {
            return Err(RejectedFile::TooMany {
                name: file.name().to_string(),
                max,
            });
        }
        Ok(())
    }

    /// Appends files after the ones already staged. A file whose key is
    /// already staged is skipped; files outside the limits are returned.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = LocalFile>) -> Vec<RejectedFile> {
        let mut rejected = Vec::new();
        for file in files {
            if self.contains(file.key()) {
                debug!("Skipping already staged file {} on {}", file.name(), self.field_path);
                continue;
            }
            if let Err(reason) = self.admit(&file, self.items.len()) {
                warn!("Not staging on {}: {}", self.field_path, reason);
                rejected.push(reason);
                continue;
            }
            let preview = self.previews.create(&file);
            debug!("Staged {} ({} bytes) on {}", file.name(), file.size_bytes(), self.field_path);
            self.items.push(StagedAttachment {
                origin: file.key,
                preview,
                file_name: file.name,
                mime_type: file.mime_type,
                bytes: file.bytes,
            });
        }
        rejected
    }

    /// Removes the attachment staged from `key`. Returns false if absent.
    pub fn remove_file(&mut self, key: FileKey) -> bool {
        let Some(index) = self.items.iter().position(|a| a.origin == key) else {
            return false;
        };
        let removed = self.items.remove(index);
        self.previews.release(removed.preview);
        true
    }

    /// Drops every staged attachment and releases its preview.
    pub fn remove_all(&mut self) {
        for attachment in self.items.drain(..) {
            self.previews.release(attachment.preview);
        }
    }

    /// Stages `file` as the only attachment (single-file fields). A rejected
    /// file leaves the current attachment in place.
    pub fn replace(&mut self, file: LocalFile) -> Result<(), RejectedFile> {
        self.admit(&file, 0)?;
        self.remove_all();
        self.add_files([file]);
        Ok(())
    }

    pub fn contains(&self, key: FileKey) -> bool {
        self.items.iter().any(|a| a.origin == key)
    }

    pub fn attachments(&self) -> &[StagedAttachment] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn file_refs(&self) -> Vec<FileRef> {
        self.items.iter().map(StagedAttachment::file_ref).collect()
    }
}

impl fmt::Debug for AttachmentStaging {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttachmentStaging")
            .field("field_path", &self.field_path)
            .field("items", &self.items)
            .field("limits", &self.limits)
            .finish_non_exhaustive()
    }
}

impl Drop for AttachmentStaging {
    fn drop(&mut self) {
        if !self.items.is_empty() {
            warn!(
                "{} staged preview(s) on {} still held at drop; releasing",
                self.items.len(),
                self.field_path
            );
            self.remove_all();
        }
    }
}
