//! # Geostamp Place Search
//!
//! Asynchronous text-to-coordinates lookup feeding the marker's override
//! slot.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │               SearchService                 │
//! │  - 350 ms debounce                          │
//! │  - generation-guarded responses             │
//! │  - selection / override lifecycle           │
//! ├─────────────────────────────────────────────┤
//! │               ProviderChain                 │
//! │  - fixed fallback order                     │
//! ├──────────────────────┬──────────────────────┤
//! │   PhotonProvider     │  NominatimProvider   │
//! └──────────────────────┴──────────────────────┘
//! ```
//!
//! Keystrokes go in via [`SearchService::set_query`]; a UI renders
//! [`SearchService::snapshot`] and accepts a suggestion with
//! [`SearchService::select`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod nominatim;
pub mod photon;
pub mod provider;
pub mod service;
pub mod suggestion;

pub use error::{SearchError, SearchResult};
pub use nominatim::NominatimProvider;
pub use photon::PhotonProvider;
pub use provider::{PlaceProvider, ProviderChain};
pub use service::{SearchPhase, SearchService, SearchSnapshot, DEBOUNCE_DELAY, MIN_QUERY_LEN};
pub use suggestion::PlaceSuggestion;

/// User agent presented to search providers.
pub(crate) const USER_AGENT: &str = concat!("geostamp/", env!("CARGO_PKG_VERSION"));

/// Maximum suggestions requested per provider call.
pub(crate) const RESULT_LIMIT: &str = "8";
