//! The airport record carried as payload in the spatial index.

use crate::error::Result;
use crate::geodetic::Point;
use serde::{Deserialize, Serialize};

/// One airport from the OpenFlights-style dataset.
///
/// Coordinates are kept raw as read from the file; [`Airport::position`]
/// runs them through the validated [`Point`] constructor. The dataset loader
/// only yields airports whose coordinates pass that validation, so for
/// loader-produced records `position()` cannot fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// Dataset identifier.
    pub airport_id: u64,
    /// Airport name, e.g. "Boeing Field King County Intl".
    pub name: String,
    /// City served.
    pub city: String,
    /// Country or territory.
    pub country: String,
    /// Three-letter IATA code, e.g. "BFI".
    pub iata: String,
    /// Four-letter ICAO code, e.g. "KBFI".
    pub icao: String,
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Field elevation in feet.
    pub elevation_ft: f64,
}

impl Airport {
    /// The airport's location as a validated [`Point`].
    ///
    /// # Errors
    ///
    /// Returns [`crate::NearportError::InvalidCoordinate`] when the raw
    /// latitude or longitude is out of range.
    pub fn position(&self) -> Result<Point> {
        Point::new(self.latitude, self.longitude)
    }

    /// Whether this record carries a usable three-letter IATA code.
    pub fn has_iata(&self) -> bool {
        self.iata.len() == 3 && self.iata.chars().all(|c| c.is_ascii_alphanumeric())
    }
}
