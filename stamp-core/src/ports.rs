//! Collaborator ports - camera, gallery, and device location.
//!
//! The editing core never touches hardware or permission prompts; it
//! consumes these narrow interfaces and degrades gracefully when a
//! collaborator denies or fails.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::encode::Coordinate;
use crate::error::StampResult;

/// Which camera supplies the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    /// Rear camera.
    #[default]
    Back,
    /// Front camera.
    Front,
}

impl Facing {
    /// The other camera.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::Back,
        }
    }
}

/// Flash behavior for a capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlashMode {
    /// Flash disabled.
    #[default]
    Off,
    /// Flash fires on capture.
    On,
}

impl FlashMode {
    /// The opposite flash setting.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Off => Self::On,
            Self::On => Self::Off,
        }
    }
}

/// Opaque handle to an encoded base image.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageHandle(Vec<u8>);

impl ImageHandle {
    /// Wrap encoded image bytes.
    #[must_use]
    pub fn new(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    /// The encoded bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Consume the handle, yielding the encoded bytes.
    #[must_use]
    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }
}

impl std::fmt::Debug for ImageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageHandle")
            .field("len", &self.0.len())
            .finish()
    }
}

/// A captured or picked base image, with coordinates when the location
/// collaborator granted them.
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    /// The encoded base image.
    pub image: ImageHandle,
    /// Device location at capture time, if available.
    pub coords: Option<Coordinate>,
}

/// Camera collaborator.
#[async_trait]
pub trait CameraPort: Send + Sync {
    /// Capture a frame with the given facing and flash settings.
    async fn capture_frame(&self, facing: Facing, flash: FlashMode) -> StampResult<ImageHandle>;
}

/// Gallery collaborator.
#[async_trait]
pub trait GalleryPort: Send + Sync {
    /// Let the user pick an image; `None` means the pick was cancelled.
    async fn pick(&self) -> StampResult<Option<ImageHandle>>;
}

/// Device-location collaborator.
#[async_trait]
pub trait LocationPort: Send + Sync {
    /// Current device position, or `None` when permission is denied or the
    /// fix fails. Denial is not an error; the session proceeds without
    /// geodata.
    async fn current_location(&self) -> Option<Coordinate>;
}

/// Capture a photo and attach the device location when available.
///
/// # Errors
///
/// Returns the camera collaborator's error when the capture itself fails.
/// A denied or failed location fix is not an error.
pub async fn photo_from_camera(
    camera: &dyn CameraPort,
    location: &dyn LocationPort,
    facing: Facing,
    flash: FlashMode,
) -> StampResult<CapturedPhoto> {
    let coords = location.current_location().await;
    if coords.is_none() {
        tracing::debug!("no device location attached to capture");
    }
    let image = camera.capture_frame(facing, flash).await?;
    Ok(CapturedPhoto { image, coords })
}

/// Pick a photo from the gallery and attach the device location when
/// available. `None` means the user cancelled the pick.
///
/// # Errors
///
/// Returns the gallery collaborator's error when the pick itself fails.
pub async fn photo_from_gallery(
    gallery: &dyn GalleryPort,
    location: &dyn LocationPort,
) -> StampResult<Option<CapturedPhoto>> {
    let Some(image) = gallery.pick().await? else {
        return Ok(None);
    };
    let coords = location.current_location().await;
    Ok(Some(CapturedPhoto { image, coords }))
}
