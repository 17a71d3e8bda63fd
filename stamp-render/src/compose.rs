//! Deterministic flattening of a committed session into one raster.

use image::{imageops, DynamicImage, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use stamp_core::{Canvas, EditingSession, ImageHandle, OverlayState};

use crate::error::{RenderError, RenderResult};
use crate::marker::render_marker;

/// Output raster format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JPEG (no alpha, quality-controlled).
    #[default]
    Jpeg,
    /// PNG (lossless, alpha preserved).
    Png,
}

impl OutputFormat {
    /// Conventional file extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
        }
    }
}

/// How the snapshot collaborator should encode the composite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotOptions {
    /// Output format.
    pub format: OutputFormat,
    /// JPEG quality 1-100; ignored for PNG.
    pub quality: u8,
}

impl Default for SnapshotOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: 90,
        }
    }
}

/// An encoded output raster.
#[derive(Debug, Clone)]
pub struct Raster {
    /// Encoded bytes.
    pub bytes: Vec<u8>,
    /// Encoding of `bytes`.
    pub format: OutputFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

/// Everything the snapshot collaborator needs to flatten one frame:
/// the base image, the canvas it is composed on, the *committed* overlay
/// state, and the encoded marker payload.
///
/// Building one mid-drag is undefined; callers commit the gesture first.
#[derive(Debug, Clone)]
pub struct CompositeScene {
    /// Encoded base image.
    pub base: ImageHandle,
    /// Composition area.
    pub canvas: Canvas,
    /// Committed marker state.
    pub overlay: OverlayState,
    /// Marker payload; empty means no geodata and no marker is drawn.
    pub payload: String,
}

impl CompositeScene {
    /// Capture the committed state of an editing session.
    #[must_use]
    pub fn from_session(session: &EditingSession) -> Self {
        Self {
            base: session.photo().image.clone(),
            canvas: session.canvas(),
            overlay: session.geometry().committed_state(),
            payload: session.payload(),
        }
    }
}

/// Scale-and-crop a decoded base image so it covers the canvas exactly.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
fn cover_fit(base: &DynamicImage, width: u32, height: u32) -> RgbaImage {
    let rgba = base.to_rgba8();
    let (source_w, source_h) = rgba.dimensions();
    if (source_w, source_h) == (width, height) {
        return rgba;
    }

    let scale = f64::max(
        f64::from(width) / f64::from(source_w.max(1)),
        f64::from(height) / f64::from(source_h.max(1)),
    );
    let scaled_w = ((f64::from(source_w) * scale).ceil() as u32).max(width);
    let scaled_h = ((f64::from(source_h) * scale).ceil() as u32).max(height);

    let resized = imageops::resize(&rgba, scaled_w, scaled_h, imageops::FilterType::Lanczos3);
    let offset_x = (scaled_w - width) / 2;
    let offset_y = (scaled_h - height) / 2;
    imageops::crop_imm(&resized, offset_x, offset_y, width, height).to_image()
}

/// Flatten the scene into an RGBA buffer of exactly the canvas size.
///
/// # Errors
///
/// Returns [`RenderError::Decode`] for an undecodable base image and
/// marker errors from [`render_marker`].
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn flatten(scene: &CompositeScene) -> RenderResult<RgbaImage> {
    let base = image::load_from_memory(scene.base.as_bytes())
        .map_err(|error| RenderError::Decode(error.to_string()))?;

    let width = (scene.canvas.width.max(1.0)) as u32;
    let height = (scene.canvas.height.max(1.0)) as u32;
    let mut flattened = cover_fit(&base, width, height);

    if scene.payload.is_empty() {
        tracing::debug!("no geodata, flattening base image only");
        return Ok(flattened);
    }

    let size = (scene.overlay.size.round().max(1.0)) as u32;
    let marker = render_marker(&scene.payload, size, &scene.overlay.color)?;
    imageops::overlay(
        &mut flattened,
        &marker,
        i64::from(scene.overlay.position.x.round() as i32),
        i64::from(scene.overlay.position.y.round() as i32),
    );
    Ok(flattened)
}

/// Encode a flattened buffer into the requested output format.
///
/// # Errors
///
/// Returns [`RenderError::Encode`] when the codec rejects the buffer.
pub fn encode_raster(image: &RgbaImage, options: &SnapshotOptions) -> RenderResult<Raster> {
    let (width, height) = image.dimensions();
    let mut buffer = std::io::Cursor::new(Vec::new());

    match options.format {
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(image.clone()).to_rgb8();
            let encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(
                &mut buffer,
                options.quality.clamp(1, 100),
            );
            encoder
                .write_image(rgb.as_raw(), width, height, image::ColorType::Rgb8.into())
                .map_err(|error| RenderError::Encode(format!("JPEG encoding failed: {error}")))?;
        }
        OutputFormat::Png => {
            let encoder = image::codecs::png::PngEncoder::new(&mut buffer);
            encoder
                .write_image(
                    image.as_raw(),
                    width,
                    height,
                    image::ColorType::Rgba8.into(),
                )
                .map_err(|error| RenderError::Encode(format!("PNG encoding failed: {error}")))?;
        }
    }

    Ok(Raster {
        bytes: buffer.into_inner(),
        format: options.format,
        width,
        height,
    })
}
