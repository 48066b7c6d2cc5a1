//! Longitude/latitude point and its text conventions.
//!
//! - Geo-indexing text is `"lat,lon"`; reading it validates the ranges.
//! - Plain text is `"lon,lat"` with no range check.

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::bridge;
use crate::cfg::GeoCfg;
use crate::error::{Format, GeoError, Result};

const MAX_LON: f64 = 180.0;
const MIN_LON: f64 = -180.0;
const MAX_LAT: f64 = 90.0;
const MIN_LAT: f64 = -90.0;

/// A coordinate in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BasePoint {
    pub lon: f64,
    pub lat: f64,
}

impl BasePoint {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Parse geo-indexing `"lat,lon"` text.
    pub fn from_index_str(text: &str) -> Result<Self> {
        let (lat, lon) = split_pair(text)?;
        let p = Self::new(lon, lat);
        p.check_range()?;
        Ok(p)
    }

    /// Reject latitudes outside [-90, 90] and longitudes outside [-180, 180].
    pub fn check_range(&self) -> Result<()> {
        if !Self::is_valid_lat(self.lat) {
            return Err(GeoError::Range {
                axis: "lat",
                value: self.lat,
                min: MIN_LAT,
                max: MAX_LAT,
            });
        }
        if !Self::is_valid_lon(self.lon) {
            return Err(GeoError::Range {
                axis: "lon",
                value: self.lon,
                min: MIN_LON,
                max: MAX_LON,
            });
        }
        Ok(())
    }

    /// Geo-indexing `"lat,lon"` text.
    pub fn to_index_string(&self) -> String {
        format!("{},{}", self.lat, self.lon)
    }

    /// Parse plain `"lon,lat"` text.
    pub fn from_lon_lat_str(text: &str) -> Result<Self> {
        let (lon, lat) = split_pair(text)?;
        Ok(Self::new(lon, lat))
    }

    pub fn to_lon_lat_string(&self) -> String {
        format!("{},{}", self.lon, self.lat)
    }

    #[inline]
    pub fn is_valid_lon(lon: f64) -> bool {
        (MIN_LON..=MAX_LON).contains(&lon)
    }

    #[inline]
    pub fn is_valid_lat(lat: f64) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&lat)
    }

    pub fn to_point(&self, cfg: &GeoCfg) -> Point {
        bridge::create_point(self.lon, self.lat, cfg)
    }

    pub fn to_geojson(&self, cfg: &GeoCfg) -> String {
        bridge::write_geojson(&self.to_point(cfg).into(), cfg)
    }
}

impl From<Point> for BasePoint {
    fn from(p: Point) -> Self {
        Self::new(p.x(), p.y())
    }
}

/// Lenient geo-indexing parse: any malformed input yields `None`.
pub fn point_from_index_str(text: &str, cfg: &GeoCfg) -> Option<Point> {
    let (lat, lon) = split_pair(text).ok()?;
    Some(bridge::create_point(lon, lat, cfg))
}

fn split_pair(text: &str) -> Result<(f64, f64)> {
    let mut parts = text.split(',');
    let (Some(first), Some(second)) = (parts.next(), parts.next()) else {
        return Err(GeoError::parse(
            Format::PointText,
            format!("expected two comma-separated numbers, got {text:?}"),
        ));
    };
    let parse = |s: &str| {
        s.trim()
            .parse::<f64>()
            .map_err(|e| GeoError::parse(Format::PointText, format!("{s:?}: {e}")))
    };
    Ok((parse(first)?, parse(second)?))
}
