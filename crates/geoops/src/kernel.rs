//! Seam to the `geo` geometry kernel.
//!
//! Purpose
//! - Turn kernel panics into typed `GeoError::Kernel` values so that callers
//!   can retry instead of unwinding. The process panic hook still runs before
//!   the panic is caught; binaries that want a quiet stderr install their own
//!   hook (the CLI routes it to `tracing` at debug level).
//! - Build kernel objects from raw coordinates under the precision grid.
//! - Provide the polygonal view (`MultiPolygon`) the boolean operations need
//!   and collapse their output to the most specific shape.
//!
//! Code cross-refs: `robust::normalize`, `bridge::coords`, `cfg::PrecisionModel`

use std::any::Any;
use std::cmp::Ordering;
use std::panic::{catch_unwind, AssertUnwindSafe};

use geo::algorithm::orient::{Direction, Orient};
use geo::{
    Coord, CoordsIter, Geometry, GeometryCollection, LineString, MapCoordsInPlace, MultiPolygon,
    Polygon,
};

use crate::cfg::PrecisionModel;
use crate::error::{GeoError, Result};

/// Run a kernel call, reporting a panic as `GeoError::Kernel`.
pub(crate) fn guarded<T>(op: &'static str, f: impl FnOnce() -> T) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f)).map_err(|payload| GeoError::Kernel {
        op,
        reason: panic_reason(payload.as_ref()),
    })
}

fn panic_reason(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "kernel panicked".to_string()
    }
}

/// Reject kernel output carrying non-finite ordinates.
pub(crate) fn ensure_finite(op: &'static str, geom: Geometry) -> Result<Geometry> {
    if geom.coords_iter().all(|c| c.x.is_finite() && c.y.is_finite()) {
        Ok(geom)
    } else {
        Err(GeoError::Kernel {
            op,
            reason: "result has non-finite coordinates".to_string(),
        })
    }
}

/// Snap every ordinate of `geom` to the grid.
pub fn snap<G: MapCoordsInPlace<f64>>(geom: &mut G, pm: &PrecisionModel) {
    geom.map_coords_in_place(|c| Coord {
        x: pm.make_precise(c.x),
        y: pm.make_precise(c.y),
    });
}

/// Build a linear ring. Empty input yields an empty ring; anything else must
/// be closed and carry at least four points.
pub fn linear_ring(coords: Vec<Coord>, pm: &PrecisionModel) -> Result<LineString> {
    if coords.is_empty() {
        return Ok(LineString::new(coords));
    }
    if coords.len() < 4 {
        return Err(GeoError::Kernel {
            op: "linear ring",
            reason: format!(
                "Invalid number of points in LinearRing (found {} - must be 0 or >= 4)",
                coords.len()
            ),
        });
    }
    if coords.first() != coords.last() {
        return Err(GeoError::Kernel {
            op: "linear ring",
            reason: "Points of LinearRing do not form a closed linestring".to_string(),
        });
    }
    let mut ring = LineString::new(coords);
    snap(&mut ring, pm);
    Ok(ring)
}

/// Polygonal view of `geom` for boolean operations.
pub(crate) fn polygonal(geom: &Geometry) -> Result<MultiPolygon> {
    let mut out = Vec::new();
    collect_polygons(geom, &mut out)?;
    Ok(MultiPolygon::new(out))
}

fn collect_polygons(geom: &Geometry, out: &mut Vec<Polygon>) -> Result<()> {
    match geom {
        Geometry::Polygon(p) => out.push(p.clone()),
        Geometry::MultiPolygon(mp) => out.extend(mp.0.iter().cloned()),
        Geometry::Rect(r) => out.push(r.to_polygon()),
        Geometry::Triangle(t) => out.push(t.to_polygon()),
        Geometry::GeometryCollection(gc) => {
            for g in &gc.0 {
                collect_polygons(g, out)?;
            }
        }
        other => {
            return Err(GeoError::UnsupportedShape(format!(
                "{} is not polygonal",
                kind_name(other)
            )))
        }
    }
    Ok(())
}

/// Most specific polygonal shape: a lone component becomes a `Polygon`.
pub(crate) fn simplest(mut mp: MultiPolygon) -> Geometry {
    if mp.0.len() == 1 {
        if let Some(p) = mp.0.pop() {
            return Geometry::Polygon(p);
        }
    }
    Geometry::MultiPolygon(mp)
}

/// Components of a collection-like geometry; anything else is its own
/// single component.
pub(crate) fn components(geom: &Geometry) -> Vec<Geometry> {
    match geom {
        Geometry::MultiPoint(mp) => mp.0.iter().copied().map(Geometry::Point).collect(),
        Geometry::MultiLineString(ml) => ml.0.iter().cloned().map(Geometry::LineString).collect(),
        Geometry::MultiPolygon(mp) => mp.0.iter().cloned().map(Geometry::Polygon).collect(),
        Geometry::GeometryCollection(gc) => gc.0.clone(),
        other => vec![other.clone()],
    }
}

pub(crate) fn kind_name(geom: &Geometry) -> &'static str {
    match geom {
        Geometry::Point(_) => "Point",
        Geometry::Line(_) => "Line",
        Geometry::LineString(_) => "LineString",
        Geometry::Polygon(_) => "Polygon",
        Geometry::MultiPoint(_) => "MultiPoint",
        Geometry::MultiLineString(_) => "MultiLineString",
        Geometry::MultiPolygon(_) => "MultiPolygon",
        Geometry::GeometryCollection(_) => "GeometryCollection",
        Geometry::Rect(_) => "Rect",
        Geometry::Triangle(_) => "Triangle",
    }
}

/// Canonical vertex order: exterior rings counter-clockwise, holes clockwise,
/// every ring starting at its lexicographically smallest vertex, components
/// sorted by that vertex.
pub fn canonical(geom: &Geometry) -> Geometry {
    match geom {
        Geometry::Polygon(p) => Geometry::Polygon(canonical_polygon(p)),
        Geometry::MultiPolygon(mp) => {
            let mut polys: Vec<Polygon> = mp.0.iter().map(canonical_polygon).collect();
            polys.sort_by(|a, b| cmp_first(a.exterior(), b.exterior()));
            Geometry::MultiPolygon(MultiPolygon::new(polys))
        }
        Geometry::GeometryCollection(gc) => Geometry::GeometryCollection(GeometryCollection::new_from(
            gc.0.iter().map(canonical).collect(),
        )),
        other => other.clone(),
    }
}

fn canonical_polygon(p: &Polygon) -> Polygon {
    let oriented = p.orient(Direction::Default);
    let (exterior, interiors) = oriented.into_inner();
    let mut holes: Vec<LineString> = interiors.into_iter().map(rotate_to_min).collect();
    holes.sort_by(cmp_first);
    Polygon::new(rotate_to_min(exterior), holes)
}

fn rotate_to_min(ring: LineString) -> LineString {
    let mut coords = ring.0;
    if coords.len() < 4 || coords.first() != coords.last() {
        return LineString::new(coords);
    }
    coords.pop();
    let start = coords
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| cmp_coord(a, b))
        .map(|(i, _)| i)
        .unwrap_or(0);
    coords.rotate_left(start);
    coords.push(coords[0]);
    LineString::new(coords)
}

fn cmp_first(a: &LineString, b: &LineString) -> Ordering {
    match (a.0.first(), b.0.first()) {
        (Some(ca), Some(cb)) => cmp_coord(ca, cb),
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
    }
}

fn cmp_coord(a: &Coord, b: &Coord) -> Ordering {
    match a.x.partial_cmp(&b.x).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal),
        o => o,
    }
}
