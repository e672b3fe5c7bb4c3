//! Geographic coordinate and external map link construction.
//!
//! Map links target the public Google Maps URL scheme, which needs no API
//! key. Both builders are pure string templates; nothing here touches the
//! network.

use serde::{Deserialize, Serialize};

/// Zoom level used by [`embed_url`] when the caller does not pick one.
pub const DEFAULT_MAP_ZOOM: u8 = 16;

const MAPS_SEARCH_BASE: &str = "https://www.google.com/maps/search/?api=1&query=";
const MAPS_EMBED_BASE: &str = "https://www.google.com/maps?q=";

/// A latitude/longitude pair in decimal degrees.
///
/// No range validation is applied; values are taken as the device or the
/// user reported them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinate {
    #[must_use]
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components rounded to six decimal places (about 11 cm).
    #[must_use]
    pub fn rounded(&self) -> Self {
        Self {
            lat: round6(self.lat),
            lng: round6(self.lng),
        }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    fn query_pair(&self) -> String {
        format!("{:.6},{:.6}", self.lat, self.lng)
    }
}

fn round6(value: f64) -> f64 {
    (value * 1_000_000.0).round() / 1_000_000.0
}

/// Anything that can report the coordinate to use for maps and submission.
///
/// The location acquirer implements this; the aggregator only reads it at
/// payload time.
pub trait LocationSource {
    fn effective_coordinate(&self) -> Option<Coordinate>;
}

impl LocationSource for Option<Coordinate> {
    fn effective_coordinate(&self) -> Option<Coordinate> {
        *self
    }
}

impl LocationSource for Coordinate {
    fn effective_coordinate(&self) -> Option<Coordinate> {
        Some(*self)
    }
}

/// URL that opens a map search centred on `coord`.
#[must_use]
pub fn maps_url(coord: Coordinate) -> String {
    format!("{MAPS_SEARCH_BASE}{}", coord.query_pair())
}

/// URL suitable for an embedded map frame centred on `coord`.
///
/// `zoom` falls back to [`DEFAULT_MAP_ZOOM`].
#[must_use]
pub fn embed_url(coord: Coordinate, zoom: Option<u8>) -> String {
    let zoom = zoom.unwrap_or(DEFAULT_MAP_ZOOM);
    format!(
        "{MAPS_EMBED_BASE}{}&z={zoom}&output=embed",
        coord.query_pair()
    )
}

/// The pair of links the location panel shows for a coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MapLinks {
    pub search: String,
    pub embed: String,
}

impl MapLinks {
    #[must_use]
    pub fn for_coordinate(coord: Coordinate, zoom: Option<u8>) -> Self {
        Self {
            search: maps_url(coord),
            embed: embed_url(coord, zoom),
        }
    }
}
