//! Great-circle geometry: validated geographic points and the haversine
//! distance on a sphere of configurable radius.

use crate::error::{NearportError, Result};
use serde::{Deserialize, Serialize};

/// A geographic coordinate: latitude and longitude in decimal degrees.
///
/// Construction validates the ranges (latitude in [-90, 90], longitude in
/// [-180, 180]), so a `Point` in hand is always a valid location and distance
/// computations never fail.
///
/// # Examples
///
/// ```
/// use nearport::Point;
///
/// let seattle = Point::new(47.6071, -122.3381)?;
/// assert_eq!(seattle.latitude(), 47.6071);
/// assert!(Point::new(91.0, 0.0).is_err());
/// # Ok::<(), nearport::NearportError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPoint")]
pub struct Point {
    lat: f64,
    lon: f64,
}

/// Unvalidated wire form of [`Point`]; deserialization routes through
/// [`Point::new`] so out-of-range coordinates cannot sneak in field-wise.
#[derive(Deserialize)]
struct RawPoint {
    lat: f64,
    lon: f64,
}

impl TryFrom<RawPoint> for Point {
    type Error = NearportError;

    fn try_from(raw: RawPoint) -> Result<Self> {
        Point::new(raw.lat, raw.lon)
    }
}

impl Point {
    /// Create a point from latitude and longitude in degrees.
    ///
    /// # Errors
    ///
    /// Returns [`NearportError::InvalidCoordinate`] when the latitude is
    /// outside [-90, 90] or the longitude is outside [-180, 180]. NaN fails
    /// both bounds.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(NearportError::InvalidCoordinate {
                axis: "latitude",
                value: latitude,
                min: -90.0,
                max: 90.0,
            });
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(NearportError::InvalidCoordinate {
                axis: "longitude",
                value: longitude,
                min: -180.0,
                max: 180.0,
            });
        }
        Ok(Self {
            lat: latitude,
            lon: longitude,
        })
    }

    /// Latitude in degrees, within [-90, 90].
    pub fn latitude(&self) -> f64 {
        self.lat
    }

    /// Longitude in degrees, within [-180, 180].
    pub fn longitude(&self) -> f64 {
        self.lon
    }
}

/// A sphere on which great-circle distances are measured.
///
/// The reference instance for geographic work is [`Geodetic::EARTH`]
/// (radius 6371 km).
///
/// # Examples
///
/// ```
/// use nearport::{Geodetic, Point};
///
/// let seattle = Point::new(47.6071, -122.3381)?;
/// let bengaluru = Point::new(12.9796, 77.7277)?;
///
/// let km = Geodetic::EARTH.distance(&seattle, &bengaluru);
/// assert!((km - 12990.0).abs() < 1.0);
/// # Ok::<(), nearport::NearportError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    radius_km: f64,
}

impl Geodetic {
    /// Earth as a sphere of radius 6371 km.
    pub const EARTH: Geodetic = Geodetic { radius_km: 6371.0 };

    /// A sphere with the given radius in kilometers.
    pub const fn new(radius_km: f64) -> Self {
        Self { radius_km }
    }

    /// Sphere radius in kilometers.
    pub fn radius_km(&self) -> f64 {
        self.radius_km
    }

    /// Circumference of the sphere in kilometers.
    pub fn circumference(&self) -> f64 {
        2.0 * std::f64::consts::PI * self.radius_km
    }

    /// Great-circle distance between two points in kilometers, by the
    /// haversine formula.
    ///
    /// For all valid points the result is symmetric (up to floating-point
    /// rounding), non-negative, zero for identical points, and never exceeds
    /// half the circumference.
    pub fn distance(&self, a: &Point, b: &Point) -> f64 {
        let lat_a = a.lat.to_radians();
        let lat_b = b.lat.to_radians();
        let d_lat = (b.lat - a.lat).to_radians();
        let d_lon = (b.lon - a.lon).to_radians();

        let h = (d_lat / 2.0).sin().powi(2)
            + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
        // Rounding can push h a hair past 1.0 for near-antipodal points.
        let h = h.clamp(0.0, 1.0);

        self.radius_km * 2.0 * h.sqrt().atan2((1.0 - h).sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEATTLE: (f64, f64) = (47.6071, -122.3381);
    const BENGALURU: (f64, f64) = (12.9796, 77.7277);

    fn point(coords: (f64, f64)) -> Point {
        Point::new(coords.0, coords.1).unwrap()
    }

    #[test]
    fn spot_check_seattle_to_bengaluru() {
        let km = Geodetic::EARTH.distance(&point(SEATTLE), &point(BENGALURU));
        assert!((km - 12990.0).abs() < 1.0, "got {}", km);
    }

    #[test]
    fn distance_is_symmetric() {
        let a = point(SEATTLE);
        let b = point(BENGALURU);
        let ab = Geodetic::EARTH.distance(&a, &b);
        let ba = Geodetic::EARTH.distance(&b, &a);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        let a = point(SEATTLE);
        assert_eq!(Geodetic::EARTH.distance(&a, &a), 0.0);
    }

    #[test]
    fn antipodes_stay_within_half_circumference() {
        let a = Point::new(0.0, 0.0).unwrap();
        let b = Point::new(0.0, 180.0).unwrap();
        let km = Geodetic::EARTH.distance(&a, &b);
        assert!(km <= Geodetic::EARTH.circumference() / 2.0 + 1e-9);
        assert!(km > 20_000.0);
    }

    #[test]
    fn poles_are_half_a_meridian_apart() {
        let north = Point::new(90.0, 0.0).unwrap();
        let south = Point::new(-90.0, 0.0).unwrap();
        let km = Geodetic::EARTH.distance(&north, &south);
        assert!((km - Geodetic::EARTH.circumference() / 2.0).abs() < 1e-6);
    }

    #[test]
    fn seam_neighbors_are_close() {
        // 0.2 degrees of longitude apart, across the antimeridian.
        let east = Point::new(0.0, 179.9).unwrap();
        let west = Point::new(0.0, -179.9).unwrap();
        let km = Geodetic::EARTH.distance(&east, &west);
        assert!(km < 25.0, "got {}", km);
    }

    #[test]
    fn rejects_out_of_range_coordinates() {
        assert!(Point::new(90.0001, 0.0).is_err());
        assert!(Point::new(-90.0001, 0.0).is_err());
        assert!(Point::new(0.0, 180.0001).is_err());
        assert!(Point::new(0.0, -180.0001).is_err());
        assert!(Point::new(f64::NAN, 0.0).is_err());
        assert!(Point::new(0.0, f64::NAN).is_err());
    }

    #[test]
    fn accepts_boundary_coordinates() {
        assert!(Point::new(90.0, 180.0).is_ok());
        assert!(Point::new(-90.0, -180.0).is_ok());
        assert!(Point::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn deserialization_enforces_coordinate_ranges() {
        assert!(serde_json::from_str::<Point>(r#"{"lat":999.0,"lon":0.0}"#).is_err());
        assert!(serde_json::from_str::<Point>(r#"{"lat":0.0,"lon":-200.0}"#).is_err());

        let p: Point = serde_json::from_str(r#"{"lat":47.6071,"lon":-122.3381}"#).unwrap();
        assert_eq!(p.latitude(), 47.6071);
        assert_eq!(p.longitude(), -122.3381);

        let json = serde_json::to_string(&p).unwrap();
        let back: Point = serde_json::from_str(&json).unwrap();
        assert_eq!(back, p);
    }

    #[test]
    fn custom_radius_scales_linearly() {
        let a = point(SEATTLE);
        let b = point(BENGALURU);
        let earth = Geodetic::EARTH.distance(&a, &b);
        let doubled = Geodetic::new(2.0 * 6371.0).distance(&a, &b);
        assert!((doubled - 2.0 * earth).abs() < 1e-6);
    }
}
