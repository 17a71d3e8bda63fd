//! The save pipeline: snapshot, persist, and the single-flight gate.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use crate::compose::{encode_raster, flatten, CompositeScene, Raster, SnapshotOptions};
use crate::error::{RenderError, RenderResult};

/// Snapshot collaborator: rasterize whatever the scene describes.
#[async_trait]
pub trait SnapshotPort: Send + Sync {
    /// Produce an encoded raster of the composed scene.
    async fn capture(
        &self,
        scene: &CompositeScene,
        options: &SnapshotOptions,
    ) -> RenderResult<Raster>;
}

/// Asset-store collaborator: persist a raster, returning an opaque
/// reference.
#[async_trait]
pub trait AssetStorePort: Send + Sync {
    /// Persist the raster. Must either fully succeed or leave no partial
    /// write behind.
    async fn persist(&self, raster: Raster) -> RenderResult<AssetRef>;
}

/// Opaque reference to a persisted asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRef {
    /// Unique asset identifier.
    pub id: Uuid,
    /// Store-specific locator (a file path for [`FsAssetStore`]).
    pub uri: String,
}

/// Default snapshot collaborator: deterministic in-process flattening.
#[derive(Debug, Default)]
pub struct FlattenSnapshot;

#[async_trait]
impl SnapshotPort for FlattenSnapshot {
    async fn capture(
        &self,
        scene: &CompositeScene,
        options: &SnapshotOptions,
    ) -> RenderResult<Raster> {
        let flattened = flatten(scene)?;
        encode_raster(&flattened, options)
    }
}

/// Default asset store: writes rasters into a pictures directory.
#[derive(Debug, Clone)]
pub struct FsAssetStore {
    dir: PathBuf,
}

impl FsAssetStore {
    /// Create a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`RenderError::PermissionDenied`] when the directory cannot
    /// be created for permission reasons, [`RenderError::Io`] otherwise.
    pub fn new(dir: impl Into<PathBuf>) -> RenderResult<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir).map_err(|error| classify_io(&dir, error))?;
        Ok(Self { dir })
    }

    /// The directory assets are written into.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn classify_io(path: &Path, error: std::io::Error) -> RenderError {
    if error.kind() == std::io::ErrorKind::PermissionDenied {
        RenderError::PermissionDenied(path.display().to_string())
    } else {
        RenderError::Io(error)
    }
}

#[async_trait]
impl AssetStorePort for FsAssetStore {
    async fn persist(&self, raster: Raster) -> RenderResult<AssetRef> {
        let id = Uuid::new_v4();
        let path = self
            .dir
            .join(format!("stamp-{id}.{}", raster.format.extension()));

        tokio::fs::write(&path, &raster.bytes)
            .await
            .map_err(|error| classify_io(&path, error))?;

        Ok(AssetRef {
            id,
            uri: path.display().to_string(),
        })
    }
}

/// Drives one save: snapshot the composite, then persist it.
///
/// Exactly one save may be in flight at a time; a second call while one is
/// pending is rejected with [`RenderError::SaveInFlight`] rather than
/// queued. A failed save leaves no partial state, so retrying is simply
/// calling [`SavePipeline::save`] again.
pub struct SavePipeline<S: SnapshotPort, A: AssetStorePort> {
    snapshot: S,
    store: A,
    in_flight: AtomicBool,
}

impl SavePipeline<FlattenSnapshot, FsAssetStore> {
    /// Pipeline with the default collaborators, persisting into `dir`.
    ///
    /// # Errors
    ///
    /// Propagates [`FsAssetStore::new`] errors.
    pub fn with_defaults(dir: impl Into<PathBuf>) -> RenderResult<Self> {
        Ok(Self::new(FlattenSnapshot, FsAssetStore::new(dir)?))
    }
}

impl<S: SnapshotPort, A: AssetStorePort> SavePipeline<S, A> {
    /// Build a pipeline from explicit collaborators.
    pub fn new(snapshot: S, store: A) -> Self {
        Self {
            snapshot,
            store,
            in_flight: AtomicBool::new(false),
        }
    }

    /// Whether a save is currently in flight.
    #[must_use]
    pub fn is_saving(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Flatten and persist the scene.
    ///
    /// The scene must carry committed (not mid-drag) overlay state.
    ///
    /// # Errors
    ///
    /// [`RenderError::SaveInFlight`] when another save is pending; any
    /// snapshot or store error otherwise, with session state untouched.
    pub async fn save(
        &self,
        scene: &CompositeScene,
        options: &SnapshotOptions,
    ) -> RenderResult<AssetRef> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("rejecting save: one is already in flight");
            return Err(RenderError::SaveInFlight);
        }

        let result = self.run(scene, options).await;
        self.in_flight.store(false, Ordering::SeqCst);

        match &result {
            Ok(asset) => tracing::info!(asset = %asset.uri, "composite saved"),
            Err(error) => tracing::warn!(error = %error, "save failed"),
        }
        result
    }

    async fn run(
        &self,
        scene: &CompositeScene,
        options: &SnapshotOptions,
    ) -> RenderResult<AssetRef> {
        let raster = self.snapshot.capture(scene, options).await?;
        self.store.persist(raster).await
    }
}
