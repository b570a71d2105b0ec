//! Geographic coordinates and the planar projection used for geometric queries.
//!
//! Street graphs are stored in WGS84 latitude/longitude. Nearest-node lookups
//! and centroid computation work in a local equirectangular projection centred
//! on the graph, which keeps distances in metres and is accurate to well under a
//! metre across a single city.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Mean earth radius in metres, matching the value used for OSM edge lengths.
pub const EARTH_RADIUS_M: f64 = 6_371_009.0;

/// A WGS84 position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Return `self` when both components are finite.
    pub fn validated(self) -> Result<Self> {
        if self.lat.is_finite() && self.lon.is_finite() {
            Ok(self)
        } else {
            Err(Error::InvalidCoordinate {
                lat: self.lat,
                lon: self.lon,
            })
        }
    }

    /// Great-circle distance to another coordinate in metres.
    pub fn distance_to(&self, other: &Self) -> f64 {
        haversine_distance(self, other)
    }

    /// `[lat, lon]` pair, the wire shape used by map clients.
    pub fn to_lat_lon(self) -> [f64; 2] {
        [self.lat, self.lon]
    }
}

/// Great-circle distance between two coordinates in metres.
pub fn haversine_distance(a: &Coordinate, b: &Coordinate) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lon - a.lon).to_radians();

    let h = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Local equirectangular projection around a reference point.
///
/// `x` grows eastwards and `y` northwards, both in metres from the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalProjection {
    origin: Coordinate,
    cos_lat: f64,
}

impl LocalProjection {
    pub fn new(origin: Coordinate) -> Self {
        Self {
            origin,
            cos_lat: origin.lat.to_radians().cos(),
        }
    }

    /// Centre the projection on the mean of the supplied positions.
    ///
    /// Falls back to `(0, 0)` when the iterator is empty.
    pub fn centred_on<'a>(positions: impl IntoIterator<Item = &'a Coordinate>) -> Self {
        let mut count = 0usize;
        let mut lat = 0.0;
        let mut lon = 0.0;
        for position in positions {
            count += 1;
            lat += position.lat;
            lon += position.lon;
        }

        if count == 0 {
            return Self::new(Coordinate::new(0.0, 0.0));
        }

        Self::new(Coordinate::new(lat / count as f64, lon / count as f64))
    }

    pub fn origin(&self) -> Coordinate {
        self.origin
    }

    /// Project a coordinate to planar `[x, y]` metres.
    pub fn project(&self, coord: &Coordinate) -> [f64; 2] {
        let x = (coord.lon - self.origin.lon).to_radians() * EARTH_RADIUS_M * self.cos_lat;
        let y = (coord.lat - self.origin.lat).to_radians() * EARTH_RADIUS_M;
        [x, y]
    }

    /// Convert planar `[x, y]` metres back to a coordinate.
    pub fn unproject(&self, point: [f64; 2]) -> Coordinate {
        let lat = self.origin.lat + (point[1] / EARTH_RADIUS_M).to_degrees();
        let lon = if self.cos_lat.abs() < f64::EPSILON {
            self.origin.lon
        } else {
            self.origin.lon + (point[0] / (EARTH_RADIUS_M * self.cos_lat)).to_degrees()
        };
        Coordinate::new(lat, lon)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn haversine_matches_known_distance() {
        // One degree of latitude is ~111.2 km on the mean-radius sphere.
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(1.0, 0.0);
        let d = haversine_distance(&a, &b);
        assert!((d - 111_195.0).abs() < 10.0, "distance was {d}");
    }

    #[test]
    fn haversine_is_zero_for_same_point() {
        let a = Coordinate::new(-15.84, -70.02);
        assert_eq!(a.distance_to(&a), 0.0);
    }

    #[test]
    fn projection_round_trips_near_origin() {
        let projection = LocalProjection::new(Coordinate::new(-15.84, -70.02));
        let point = Coordinate::new(-15.83, -70.01);
        let back = projection.unproject(projection.project(&point));
        assert!((back.lat - point.lat).abs() < 1e-9);
        assert!((back.lon - point.lon).abs() < 1e-9);
    }

    #[test]
    fn projected_distance_tracks_great_circle() {
        let projection = LocalProjection::new(Coordinate::new(-15.84, -70.02));
        let a = Coordinate::new(-15.84, -70.02);
        let b = Coordinate::new(-15.83, -70.03);
        let pa = projection.project(&a);
        let pb = projection.project(&b);
        let planar = ((pa[0] - pb[0]).powi(2) + (pa[1] - pb[1]).powi(2)).sqrt();
        let spherical = haversine_distance(&a, &b);
        assert!((planar - spherical).abs() < 1.0);
    }

    #[test]
    fn centred_on_uses_mean_position() {
        let points = [Coordinate::new(0.0, 0.0), Coordinate::new(2.0, 4.0)];
        let projection = LocalProjection::centred_on(points.iter());
        assert_eq!(projection.origin(), Coordinate::new(1.0, 2.0));
    }

    #[test]
    fn validated_rejects_nan() {
        assert!(Coordinate::new(f64::NAN, 0.0).validated().is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).validated().is_err());
        assert!(Coordinate::new(1.0, 2.0).validated().is_ok());
    }
}
