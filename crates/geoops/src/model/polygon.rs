//! Plain-data polygons: ring lists with the outer boundary at index 0.
//!
//! Single-ring consumers (engine coordinate arrays, kernel polygons built
//! from point lists) cannot carry holes; those conversions fail with
//! `UnsupportedShape` instead of dropping rings.

use geo::{Coord, MultiPolygon, Polygon};
use serde::{Deserialize, Serialize};

use super::point::BasePoint;
use crate::bridge;
use crate::cfg::GeoCfg;
use crate::error::{GeoError, Result};

/// Ordered, implicitly closed point sequence.
pub type Ring = Vec<BasePoint>;

/// One polygon: outer ring followed by hole rings.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BasePolygon {
    pub base_points: Vec<Ring>,
}

impl BasePolygon {
    pub fn new(base_points: Vec<Ring>) -> Self {
        Self { base_points }
    }

    /// From `[[[lon, lat], ..], ..]`.
    pub fn from_triple_list(rings: &[Vec<[f64; 2]>]) -> Self {
        Self::new(rings.iter().map(|r| ring_from_pairs(r)).collect())
    }

    /// From a single engine coordinate ring (`x` = lon, `y` = lat).
    pub fn from_engine_coords(coords: &[Coord]) -> Self {
        Self::new(vec![ring_from_coords(coords)])
    }

    /// From a kernel polygon, holes included.
    pub fn from_polygon(polygon: &Polygon) -> Self {
        bridge::base_polygon_from(polygon)
    }

    pub fn has_holes(&self) -> bool {
        self.base_points.len() > 1
    }

    fn outer(&self) -> Result<&Ring> {
        if self.has_holes() {
            return Err(GeoError::holes_unsupported());
        }
        self.base_points
            .first()
            .ok_or_else(|| GeoError::InvalidArgument("polygon has no rings".to_string()))
    }

    /// Single-ring engine coordinates.
    pub fn to_engine_coords(&self) -> Result<Vec<Coord>> {
        Ok(self.outer()?.iter().map(coord_of).collect())
    }

    /// Kernel polygon from the outer ring.
    pub fn to_polygon(&self, cfg: &GeoCfg) -> Result<Polygon> {
        bridge::polygon_from_points(self.outer()?, cfg)
    }
}

/// Polygons stored as ring groups, one group per component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BaseMultiPolygon {
    pub base_points: Vec<Vec<Ring>>,
}

impl BaseMultiPolygon {
    pub fn new(base_points: Vec<Vec<Ring>>) -> Self {
        Self { base_points }
    }

    /// From `[[[[lon, lat], ..], ..], ..]`.
    pub fn from_quadra_list(polygons: &[Vec<Vec<[f64; 2]>>]) -> Self {
        Self::new(
            polygons
                .iter()
                .map(|rings| rings.iter().map(|r| ring_from_pairs(r)).collect())
                .collect(),
        )
    }

    /// From engine coordinate rings, one single-ring component each.
    pub fn from_engine_coords(rings: &[Vec<Coord>]) -> Self {
        Self::new(rings.iter().map(|r| vec![ring_from_coords(r)]).collect())
    }

    pub fn from_multi_polygon(multi: &MultiPolygon) -> Self {
        bridge::base_multi_polygon_from(multi)
    }

    pub fn from_base_polygon(polygon: BasePolygon) -> Self {
        Self::new(vec![polygon.base_points])
    }

    fn outers(&self) -> Result<Vec<&Ring>> {
        self.base_points
            .iter()
            .map(|rings| match rings.as_slice() {
                [outer] => Ok(outer),
                [] => Err(GeoError::InvalidArgument(
                    "polygon component has no rings".to_string(),
                )),
                _ => Err(GeoError::holes_unsupported()),
            })
            .collect()
    }

    pub fn to_engine_coords(&self) -> Result<Vec<Vec<Coord>>> {
        Ok(self
            .outers()?
            .into_iter()
            .map(|ring| ring.iter().map(coord_of).collect())
            .collect())
    }

    pub fn to_multi_polygon(&self, cfg: &GeoCfg) -> Result<MultiPolygon> {
        let outers: Vec<Ring> = self.outers()?.into_iter().cloned().collect();
        bridge::multi_polygon_from_point_lists(&outers, cfg)
    }
}

impl From<BasePolygon> for BaseMultiPolygon {
    fn from(polygon: BasePolygon) -> Self {
        Self::from_base_polygon(polygon)
    }
}

fn ring_from_pairs(pairs: &[[f64; 2]]) -> Ring {
    pairs.iter().map(|[lon, lat]| BasePoint::new(*lon, *lat)).collect()
}

fn ring_from_coords(coords: &[Coord]) -> Ring {
    coords.iter().map(|c| BasePoint::new(c.x, c.y)).collect()
}

#[inline]
fn coord_of(p: &BasePoint) -> Coord {
    Coord { x: p.lon, y: p.lat }
}
