//! One photo-editing session: base image, overlay, and the override slot.

use crate::encode::{active_coordinate, encode_payload, Coordinate, SelectedLocation};
use crate::geometry::{Canvas, OverlayGeometry};
use crate::ports::CapturedPhoto;

/// State of one editing session, from photo arrival to save or cancel.
///
/// The canvas is fixed for the session's lifetime. Supplying a new base
/// image resets the overlay to defaults and clears any place override; a
/// stale override must never leak onto a freshly captured photo.
#[derive(Debug)]
pub struct EditingSession {
    canvas: Canvas,
    photo: CapturedPhoto,
    geometry: OverlayGeometry,
    selected: Option<SelectedLocation>,
}

impl EditingSession {
    /// Start a session for the given photo.
    #[must_use]
    pub fn new(canvas: Canvas, photo: CapturedPhoto) -> Self {
        Self {
            canvas,
            photo,
            geometry: OverlayGeometry::new(canvas),
            selected: None,
        }
    }

    /// Replace the base image, resetting overlay state and the override.
    pub fn replace_photo(&mut self, photo: CapturedPhoto) {
        tracing::debug!(
            had_override = self.selected.is_some(),
            "new base image, resetting overlay state"
        );
        self.photo = photo;
        self.geometry = OverlayGeometry::new(self.canvas);
        self.selected = None;
    }

    /// The session's fixed canvas.
    #[must_use]
    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    /// The current base image.
    #[must_use]
    pub fn photo(&self) -> &CapturedPhoto {
        &self.photo
    }

    /// The overlay geometry engine.
    #[must_use]
    pub fn geometry(&self) -> &OverlayGeometry {
        &self.geometry
    }

    /// Mutable access to the overlay geometry engine.
    pub fn geometry_mut(&mut self) -> &mut OverlayGeometry {
        &mut self.geometry
    }

    /// Set or clear the place override.
    pub fn set_selected_location(&mut self, selected: Option<SelectedLocation>) {
        self.selected = selected;
    }

    /// The current place override, if any.
    #[must_use]
    pub fn selected_location(&self) -> Option<&SelectedLocation> {
        self.selected.as_ref()
    }

    /// The coordinate the marker encodes right now (override wins).
    #[must_use]
    pub fn active_coordinate(&self) -> Option<Coordinate> {
        active_coordinate(self.photo.coords, self.selected.as_ref())
    }

    /// The marker payload for the current state; empty means no geodata.
    #[must_use]
    pub fn payload(&self) -> String {
        encode_payload(self.photo.coords, self.selected.as_ref())
    }

    /// End the session, returning the photo it was editing.
    #[must_use]
    pub fn end(self) -> CapturedPhoto {
        self.photo
    }
}
