//! Design studio working state.
//!
//! [`StudioState`] is an ordinary value owned by whoever drives the studio
//! and handed to the code that needs it. What survives a reload is exactly
//! [`PersistedStudio`]; everything else is rebuilt on the next session.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CheckoutError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Uploading,
    Generating,
    Success,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageKind {
    Original,
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EditMode {
    #[default]
    Full,
    Segment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "1K")]
    OneK,
    #[serde(rename = "2K")]
    TwoK,
    #[default]
    #[serde(rename = "4K")]
    FourK,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignImage {
    pub id: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base64: Option<String>,
    #[serde(rename = "type")]
    pub kind: ImageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DesignImage {
    pub fn new(url: impl Into<String>, kind: ImageKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            url: url.into(),
            base64: None,
            kind,
            style: None,
            name: None,
        }
    }

    /// Object URLs only live as long as the page that created them.
    pub fn is_local_blob(&self) -> bool {
        self.url.starts_with("blob:")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentInfo {
    pub label: String,
    pub label_zh: String,
    pub mask_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inpaint_mask_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inpaint_mask_base64: Option<String>,
    pub bbox: Vec<f64>,
    pub confidence: f64,
}

/// The image the user picked but has not uploaded anywhere yet.
#[derive(Debug, Clone, PartialEq)]
pub struct OriginalUpload {
    pub file_name: String,
    pub preview: String,
}

/// The part of [`StudioState`] written to disk.
///
/// Local blob URLs and inline base64 payloads are never part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PersistedStudio {
    #[serde(default)]
    pub work_images: Vec<DesignImage>,
    #[serde(default)]
    pub selected_image_id: Option<String>,
    #[serde(default)]
    pub segments_cache: BTreeMap<String, Vec<SegmentInfo>>,
    #[serde(default)]
    pub selected_style: usize,
    #[serde(default)]
    pub edit_mode: EditMode,
    #[serde(default)]
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudioState {
    #[serde(skip)]
    pub original: Option<OriginalUpload>,
    pub generated_images: Vec<String>,

    pub work_images: Vec<DesignImage>,
    pub selected_image_id: Option<String>,
    pub segments_cache: BTreeMap<String, Vec<SegmentInfo>>,
    pub selected_segment_ids: Vec<String>,
    pub selected_style: usize,
    pub edit_mode: EditMode,
    pub prompt: String,

    pub room_type: String,
    pub style: String,
    pub quality: Quality,

    pub status: GenerationStatus,
    pub progress: u8,
    pub error: Option<String>,
}

impl Default for StudioState {
    fn default() -> Self {
        Self {
            original: None,
            generated_images: Vec::new(),
            work_images: Vec::new(),
            selected_image_id: None,
            segments_cache: BTreeMap::new(),
            selected_segment_ids: Vec::new(),
            selected_style: 0,
            edit_mode: EditMode::Full,
            prompt: String::new(),
            room_type: "living_room".to_string(),
            style: "wabi_sabi".to_string(),
            quality: Quality::FourK,
            status: GenerationStatus::Idle,
            progress: 0,
            error: None,
        }
    }
}

impl StudioState {
    /// Picking a new source image discards the previous results.
    pub fn set_original_image(&mut self, file_name: impl Into<String>, preview: impl Into<String>) {
        self.original = Some(OriginalUpload {
            file_name: file_name.into(),
            preview: preview.into(),
        });
        self.generated_images.clear();
        self.status = GenerationStatus::Idle;
        self.error = None;
    }

    pub fn clear_original_image(&mut self) {
        self.original = None;
        self.generated_images.clear();
        self.status = GenerationStatus::Idle;
    }

    pub fn set_status(&mut self, status: GenerationStatus) {
        self.status = status;
    }

    pub fn set_progress(&mut self, progress: u8) {
        self.progress = progress.min(100);
    }

    /// Setting an error flips the status to `Error`, clearing it to `Idle`.
    pub fn set_error(&mut self, error: Option<String>) {
        self.status = if error.is_some() {
            GenerationStatus::Error
        } else {
            GenerationStatus::Idle
        };
        self.error = error;
    }

    pub fn add_generated_image(&mut self, url: impl Into<String>) {
        self.generated_images.push(url.into());
        self.status = GenerationStatus::Success;
    }

    pub fn clear_generated_images(&mut self) {
        self.generated_images.clear();
        self.status = GenerationStatus::Idle;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Append an image to the workbench and select it.
    pub fn add_work_image(&mut self, image: DesignImage) {
        self.selected_image_id = Some(image.id.clone());
        self.work_images.push(image);
    }

    pub fn selected_image(&self) -> Option<&DesignImage> {
        let id = self.selected_image_id.as_deref()?;
        self.work_images.iter().find(|img| img.id == id)
    }

    pub fn set_segments(&mut self, image_id: impl Into<String>, segments: Vec<SegmentInfo>) {
        self.segments_cache.insert(image_id.into(), segments);
    }

    pub fn segments_for(&self, image_id: &str) -> &[SegmentInfo] {
        self.segments_cache
            .get(image_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn select_segments(&mut self, ids: Vec<String>) {
        self.selected_segment_ids = ids;
    }

    pub fn set_selected_style(&mut self, index: usize) {
        self.selected_style = index;
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn set_room_type(&mut self, room_type: impl Into<String>) {
        self.room_type = room_type.into();
    }

    pub fn set_style(&mut self, style: impl Into<String>) {
        self.style = style.into();
    }

    pub fn set_quality(&mut self, quality: Quality) {
        self.quality = quality;
    }

    /// Snapshot of what should survive a reload.
    pub fn persisted(&self) -> PersistedStudio {
        let work_images = self
            .work_images
            .iter()
            .filter(|img| !img.is_local_blob())
            .map(|img| DesignImage {
                base64: None,
                ..img.clone()
            })
            .collect();

        let segments_cache = self
            .segments_cache
            .iter()
            .map(|(id, segments)| {
                let stripped = segments
                    .iter()
                    .map(|seg| SegmentInfo {
                        inpaint_mask_base64: None,
                        ..seg.clone()
                    })
                    .collect();
                (id.clone(), stripped)
            })
            .collect();

        PersistedStudio {
            work_images,
            selected_image_id: self.selected_image_id.clone(),
            segments_cache,
            selected_style: self.selected_style,
            edit_mode: self.edit_mode,
            prompt: self.prompt.clone(),
        }
    }

    /// Fresh state carrying the persisted fields.
    pub fn restore(saved: PersistedStudio) -> Self {
        Self {
            work_images: saved.work_images,
            selected_image_id: saved.selected_image_id,
            segments_cache: saved.segments_cache,
            selected_style: saved.selected_style,
            edit_mode: saved.edit_mode,
            prompt: saved.prompt,
            ..Self::default()
        }
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), CheckoutError> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(&self.persisted())?;
        std::fs::write(path, json)?;
        debug!(path = %path.display(), images = self.work_images.len(), "studio state saved");
        Ok(())
    }

    /// Load saved state; a missing file yields the defaults.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, CheckoutError> {
        let path = path.as_ref();
        let json = match std::fs::read_to_string(path) {
            Ok(json) => json,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %path.display(), "no saved studio state");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };
        let saved: PersistedStudio = serde_json::from_str(&json)?;
        Ok(Self::restore(saved))
    }
}
