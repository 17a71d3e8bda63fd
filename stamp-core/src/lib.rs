//! # Geostamp Core
//!
//! Session logic for stamping a photo with a draggable QR marker.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │                 stamp-core                  │
//! ├─────────────────────────────────────────────┤
//! │  Geometry Engine │  Content Encoder         │
//! │  - Clamped drag  │  - Coordinate precedence │
//! │  - Resize/reset  │  - Map-link payload      │
//! ├─────────────────────────────────────────────┤
//! │  Editing Session │  Collaborator Ports      │
//! │  - Photo swap    │  - Camera / gallery      │
//! │  - Override slot │  - Device location       │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! The crate is pure session state: pixels, networking, and persistence
//! live behind the port traits and in the sibling crates.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod encode;
pub mod error;
pub mod geometry;
pub mod ports;
pub mod session;

pub use encode::{active_coordinate, encode_payload, map_url, Coordinate, SelectedLocation};
pub use error::{StampError, StampResult};
pub use geometry::{
    Canvas, DragPhase, OverlayGeometry, OverlayState, Position, Translation, DEFAULT_MARKER_COLOR,
    DEFAULT_MARKER_SIZE, MARKER_COLOR_PRESETS, MAX_MARKER_SIZE, MIN_MARKER_SIZE,
};
pub use ports::{
    photo_from_camera, photo_from_gallery, CameraPort, CapturedPhoto, Facing, FlashMode,
    GalleryPort, ImageHandle, LocationPort,
};
pub use session::EditingSession;

/// Core crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
