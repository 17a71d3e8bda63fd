//! # Geostamp Renderer
//!
//! Flattens a committed editing session into one output raster and drives
//! the save pipeline.
//!
//! ## Pipeline
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               SavePipeline                  │
//! │  - single-flight gate                       │
//! ├──────────────────────┬──────────────────────┤
//! │     SnapshotPort     │    AssetStorePort    │
//! │  FlattenSnapshot     │    FsAssetStore      │
//! │  - cover-fit base    │    - pictures dir    │
//! │  - QR marker overlay │    - uuid filenames  │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! Both ports are swappable; the defaults compose with the `image` crate
//! and persist to the filesystem.

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod compose;
pub mod error;
pub mod marker;
pub mod save;

pub use compose::{
    encode_raster, flatten, CompositeScene, OutputFormat, Raster, SnapshotOptions,
};
pub use error::{RenderError, RenderResult};
pub use marker::{parse_hex_color, render_marker};
pub use save::{
    AssetRef, AssetStorePort, FlattenSnapshot, FsAssetStore, SavePipeline, SnapshotPort,
};

/// Renderer crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
