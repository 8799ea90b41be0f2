//! Planar projections for measuring distance along routes.
//!
//! Route sources deliver WGS84 longitude/latitude. Measures are only meaningful
//! in a planar CRS, so geometries are projected on load and results are
//! unprojected again for export.

use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// Projection selected in configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectionKind {
    /// Coordinates are already planar
    Identity,
    /// EPSG:3857 spherical mercator
    WebMercator,
    /// Equirectangular plane centered on the network
    #[default]
    LocalTangent,
}

impl std::str::FromStr for ProjectionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "identity" | "none" => Ok(ProjectionKind::Identity),
            "web_mercator" | "epsg:3857" => Ok(ProjectionKind::WebMercator),
            "local_tangent" => Ok(ProjectionKind::LocalTangent),
            other => Err(format!("unknown projection '{}'", other)),
        }
    }
}

impl ProjectionKind {
    /// Build the projection, centering the local plane on `bounds` (lon/lat)
    pub fn build(self, bounds: Option<Rect<f64>>) -> Projection {
        match self {
            ProjectionKind::Identity => Projection::Identity,
            ProjectionKind::WebMercator => Projection::WebMercator,
            ProjectionKind::LocalTangent => {
                let center = bounds.map(|b| b.center()).unwrap_or(Coord { x: 0.0, y: 0.0 });
                Projection::LocalTangent(LocalTangentPlane::new(center.x, center.y))
            }
        }
    }
}

/// A concrete forward/inverse transform between lon/lat and planar meters
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Identity,
    WebMercator,
    LocalTangent(LocalTangentPlane),
}

impl Projection {
    /// lon/lat to planar
    pub fn forward(&self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Projection::Identity => coord,
            Projection::WebMercator => web_mercator::project(coord),
            Projection::LocalTangent(plane) => plane.project(coord),
        }
    }

    /// Planar to lon/lat
    pub fn inverse(&self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Projection::Identity => coord,
            Projection::WebMercator => web_mercator::unproject(coord),
            Projection::LocalTangent(plane) => plane.unproject(coord),
        }
    }
}

mod web_mercator {
    use geo::Coord;
    use std::f64::consts::FRAC_PI_4;

    const RADIUS: f64 = 6_378_137.0;
    const MAX_LATITUDE: f64 = 85.051_128_78;

    pub fn project(coord: Coord<f64>) -> Coord<f64> {
        let lat = coord.y.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        Coord {
            x: RADIUS * coord.x.to_radians(),
            y: RADIUS * (FRAC_PI_4 + lat / 2.0).tan().ln(),
        }
    }

    pub fn unproject(coord: Coord<f64>) -> Coord<f64> {
        Coord {
            x: (coord.x / RADIUS).to_degrees(),
            y: (2.0 * (coord.y / RADIUS).exp().atan() - 2.0 * FRAC_PI_4).to_degrees(),
        }
    }
}

/// A local tangent plane centered at (lon0, lat0).
///
/// x = R * cos(lat0) * dlon, y = R * dlat
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalTangentPlane {
    origin_lon_rad: f64,
    origin_lat_rad: f64,
    cos_lat0: f64,
}

impl LocalTangentPlane {
    const EARTH_RADIUS: f64 = 6_371_007.2;

    pub fn new(lon0: f64, lat0: f64) -> Self {
        let origin_lon_rad = lon0.to_radians();
        let origin_lat_rad = lat0.to_radians();
        Self {
            origin_lon_rad,
            origin_lat_rad,
            cos_lat0: origin_lat_rad.cos(),
        }
    }

    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let dlon = coord.x.to_radians() - self.origin_lon_rad;
        let dlat = coord.y.to_radians() - self.origin_lat_rad;
        Coord {
            x: Self::EARTH_RADIUS * self.cos_lat0 * dlon,
            y: Self::EARTH_RADIUS * dlat,
        }
    }

    pub fn unproject(&self, coord: Coord<f64>) -> Coord<f64> {
        let dlon = coord.x / (Self::EARTH_RADIUS * self.cos_lat0);
        let dlat = coord.y / Self::EARTH_RADIUS;
        Coord {
            x: (self.origin_lon_rad + dlon).to_degrees(),
            y: (self.origin_lat_rad + dlat).to_degrees(),
        }
    }
}
