//! # Geostamp CLI
//!
//! Drives a headless editing session end to end: load a photo, resolve the
//! marker's geodata (flags or place search), position the marker, and save
//! the flattened composite.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use clap::{Parser, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use stamp_core::{
    photo_from_gallery, Canvas, Coordinate, EditingSession, GalleryPort, ImageHandle,
    LocationPort, StampError, StampResult, Translation, DEFAULT_MARKER_COLOR,
    DEFAULT_MARKER_SIZE,
};
use stamp_render::{CompositeScene, OutputFormat, SavePipeline, SnapshotOptions};
use stamp_search::{
    NominatimProvider, PhotonProvider, ProviderChain, SearchPhase, SearchService,
};

/// How long to wait for a place search before proceeding without it.
const SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
enum FormatArg {
    #[default]
    Jpeg,
    Png,
}

impl From<FormatArg> for OutputFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Jpeg => Self::Jpeg,
            FormatArg::Png => Self::Png,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "geostamp", version, about)]
struct Args {
    /// Photo to stamp.
    #[arg(long)]
    image: PathBuf,

    /// Captured latitude (requires --lon).
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Captured longitude (requires --lat).
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Place to search for; the first hit overrides --lat/--lon.
    #[arg(long)]
    place: Option<String>,

    /// Marker x position; defaults to the bottom-right placement.
    #[arg(long, requires = "y")]
    x: Option<f32>,

    /// Marker y position; defaults to the bottom-right placement.
    #[arg(long, requires = "x")]
    y: Option<f32>,

    /// Marker edge in pixels.
    #[arg(long, default_value_t = DEFAULT_MARKER_SIZE)]
    size: f32,

    /// Marker foreground color (hex).
    #[arg(long, default_value = DEFAULT_MARKER_COLOR)]
    color: String,

    /// Directory the stamped image is written into.
    #[arg(long, default_value = "stamped")]
    out: PathBuf,

    /// Output format.
    #[arg(long, value_enum, default_value = "jpeg")]
    format: FormatArg,

    /// JPEG quality (1-100).
    #[arg(long, default_value_t = 90)]
    quality: u8,
}

/// Gallery collaborator reading one file from disk.
struct FileGallery {
    path: PathBuf,
}

#[async_trait]
impl GalleryPort for FileGallery {
    async fn pick(&self) -> StampResult<Option<ImageHandle>> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|error| StampError::Gallery(format!("{}: {error}", self.path.display())))?;
        Ok(Some(ImageHandle::new(bytes)))
    }
}

/// Location collaborator answering with coordinates from the flags.
struct StaticLocation {
    coords: Option<Coordinate>,
}

#[async_trait]
impl LocationPort for StaticLocation {
    async fn current_location(&self) -> Option<Coordinate> {
        self.coords
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,stamp_search=debug,stamp_render=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

/// Run a place search and wait for it to settle.
async fn resolve_place(service: &SearchService, place: &str) -> Option<stamp_core::SelectedLocation> {
    service.search_now(place);

    let deadline = tokio::time::Instant::now() + SEARCH_TIMEOUT;
    loop {
        let snapshot = service.snapshot();
        match snapshot.phase {
            SearchPhase::Resolved => {
                let first = snapshot.suggestions.first()?;
                tracing::info!(place = %first.label(), "using first search hit");
                return service.select(first);
            }
            SearchPhase::Failed => {
                tracing::warn!(
                    error = snapshot.last_error.as_deref().unwrap_or("no results"),
                    "place search failed, proceeding without override"
                );
                return None;
            }
            _ if tokio::time::Instant::now() >= deadline => {
                tracing::warn!("place search timed out, proceeding without override");
                return None;
            }
            _ => tokio::time::sleep(Duration::from_millis(50)).await,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let gallery = FileGallery {
        path: args.image.clone(),
    };
    let location = StaticLocation {
        coords: match (args.lat, args.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)),
            _ => None,
        },
    };

    let photo = photo_from_gallery(&gallery, &location)
        .await?
        .context("gallery pick was cancelled")?;
    let mut session = EditingSession::new(Canvas::default(), photo);

    if let Some(place) = &args.place {
        let chain = ProviderChain::new(vec![
            Box::new(PhotonProvider::new().context("photon provider")?),
            Box::new(NominatimProvider::new().context("nominatim provider")?),
        ]);
        let service = SearchService::new(chain);
        session.set_selected_location(resolve_place(&service, place).await);
    }

    let geometry = session.geometry_mut();
    geometry.resize(args.size);
    geometry.set_color(&args.color);
    if let (Some(x), Some(y)) = (args.x, args.y) {
        let baseline = geometry.baseline();
        geometry.drag_end(Translation::new(x - baseline.x, y - baseline.y));
    }

    if session.payload().is_empty() {
        tracing::warn!("no geodata available; the composite will carry no marker");
    }

    let scene = CompositeScene::from_session(&session);
    let pipeline = SavePipeline::with_defaults(&args.out).context("opening output directory")?;
    let options = SnapshotOptions {
        format: args.format.into(),
        quality: args.quality,
    };

    let asset = pipeline.save(&scene, &options).await.context("saving composite")?;
    println!("{}", asset.uri);
    Ok(())
}
