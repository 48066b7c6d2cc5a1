//! Raw coordinates and the Point/Ring model to kernel geometry and back.
//!
//! Flat nested lists follow the GeoJSON shape: a ring is `[[lon, lat], ..]`,
//! a polygon a list of rings (outer first), a multi-polygon a list of
//! polygons.

use geo::{Coord, Geometry, GeometryCollection, LineString, MultiPoint, MultiPolygon, Point, Polygon};
use tracing::{error, warn};

use crate::cfg::GeoCfg;
use crate::error::Result;
use crate::kernel::linear_ring;
use crate::model::{BaseMultiPolygon, BasePoint, BasePolygon, Ring};

pub fn create_point(lon: f64, lat: f64, cfg: &GeoCfg) -> Point {
    let pm = &cfg.precision;
    Point::new(pm.make_precise(lon), pm.make_precise(lat))
}

/// `None` (with a warning) on empty input.
pub fn create_multi_point(points: &[BasePoint], cfg: &GeoCfg) -> Option<MultiPoint> {
    if points.is_empty() {
        warn!("createMultiPoint pointList is empty");
        return None;
    }
    Some(MultiPoint::new(
        points.iter().map(|p| create_point(p.lon, p.lat, cfg)).collect(),
    ))
}

pub fn create_collection(geometries: Vec<Geometry>) -> GeometryCollection {
    GeometryCollection::new_from(geometries)
}

/// Single-ring polygon from a closed point list.
pub fn polygon_from_points(points: &[BasePoint], cfg: &GeoCfg) -> Result<Polygon> {
    ring_of(points, cfg)
        .map(|ring| Polygon::new(ring, Vec::new()))
        .inspect_err(|e| error!(input = ?points, error = %e, "fromPointList error"))
}

/// One single-ring polygon per point list.
pub fn multi_polygon_from_point_lists(lists: &[Ring], cfg: &GeoCfg) -> Result<MultiPolygon> {
    lists
        .iter()
        .map(|points| ring_of(points, cfg).map(|ring| Polygon::new(ring, Vec::new())))
        .collect::<Result<Vec<_>>>()
        .map(MultiPolygon::new)
        .inspect_err(|e| error!(input = ?lists, error = %e, "fromMultiPointList error"))
}

fn ring_of(points: &[BasePoint], cfg: &GeoCfg) -> Result<LineString> {
    linear_ring(
        points.iter().map(|p| Coord { x: p.lon, y: p.lat }).collect(),
        &cfg.precision,
    )
}

fn ring_of_pairs(pairs: &[[f64; 2]], cfg: &GeoCfg) -> Result<LineString> {
    linear_ring(
        pairs.iter().map(|[x, y]| Coord { x: *x, y: *y }).collect(),
        &cfg.precision,
    )
}

/// Polygon from `[[[lon, lat], ..], ..]`; rings after the first are holes.
/// `Ok(None)` (with a warning) on empty input.
pub fn create_polygon(rings: &[Vec<[f64; 2]>], cfg: &GeoCfg) -> Result<Option<Polygon>> {
    let Some((outer, holes)) = rings.split_first() else {
        warn!("createPolygon coordinates is empty");
        return Ok(None);
    };
    let exterior = ring_of_pairs(outer, cfg)?;
    let interiors = holes
        .iter()
        .map(|h| ring_of_pairs(h, cfg))
        .collect::<Result<Vec<_>>>()?;
    Ok(Some(Polygon::new(exterior, interiors)))
}

/// Multi-polygon from a list of polygon ring lists. Empty polygon entries
/// become empty polygons.
pub fn create_multi_polygon(
    polygons: &[Vec<Vec<[f64; 2]>>],
    cfg: &GeoCfg,
) -> Result<Option<MultiPolygon>> {
    if polygons.is_empty() {
        warn!("createMultiPolygon coordinates is empty");
        return Ok(None);
    }
    let mut out = Vec::with_capacity(polygons.len());
    for rings in polygons {
        let p = create_polygon(rings, cfg)?
            .unwrap_or_else(|| Polygon::new(LineString::new(Vec::new()), Vec::new()));
        out.push(p);
    }
    Ok(Some(MultiPolygon::new(out)))
}

/// Kernel polygon to ring lists, holes included.
pub fn base_polygon_from(polygon: &Polygon) -> BasePolygon {
    let mut rings = Vec::with_capacity(1 + polygon.interiors().len());
    rings.push(ring_points(polygon.exterior()));
    rings.extend(polygon.interiors().iter().map(ring_points));
    BasePolygon::new(rings)
}

pub fn base_multi_polygon_from(multi: &MultiPolygon) -> BaseMultiPolygon {
    BaseMultiPolygon::new(
        multi
            .0
            .iter()
            .map(|p| base_polygon_from(p).base_points)
            .collect(),
    )
}

fn ring_points(ring: &LineString) -> Ring {
    ring.0.iter().map(|c| BasePoint::new(c.x, c.y)).collect()
}
