//! Hole handling, sliver trimming and geometry merging.

use std::mem::discriminant;

use geo::{
    Area, Geometry, GeometryCollection, MultiLineString, MultiPoint, MultiPolygon, Polygon,
    Validation,
};
use tracing::debug;

use crate::cfg::GeoCfg;
use crate::error::{GeoError, Result};

/// `true` only for a polygon with at least one interior ring.
pub fn has_holes(geom: &Geometry) -> bool {
    matches!(geom, Geometry::Polygon(p) if !p.interiors().is_empty())
}

/// Summed absolute area of a polygon's holes; 0 for anything else.
pub fn holes_area(geom: &Geometry) -> f64 {
    let Geometry::Polygon(p) = geom else {
        return 0.0;
    };
    p.interiors()
        .iter()
        .map(|ring| Polygon::new(ring.clone(), Vec::new()).unsigned_area())
        .sum()
}

/// A polygon rebuilt from its exterior ring; anything else unchanged.
pub fn remove_holes(geom: &Geometry) -> Geometry {
    match geom {
        Geometry::Polygon(p) => Geometry::Polygon(Polygon::new(p.exterior().clone(), Vec::new())),
        other => other.clone(),
    }
}

/// Drop sliver components of a multi-polygon.
///
/// Components whose share of the total area falls below
/// `cfg.omit_tolerance` are discarded. Exactly one survivor is returned as a
/// polygon; zero or several survivors give `None`. Other shapes pass through.
pub fn trim_polygon(geom: &Geometry, cfg: &GeoCfg) -> Option<Geometry> {
    let Geometry::MultiPolygon(mp) = geom else {
        return Some(geom.clone());
    };
    let total = mp.unsigned_area();
    let mut kept = mp
        .0
        .iter()
        .filter(|p| p.unsigned_area() / total >= cfg.omit_tolerance);
    match (kept.next(), kept.next()) {
        (Some(only), None) => Some(Geometry::Polygon(only.clone())),
        (first, _) => {
            debug!(
                components = mp.0.len(),
                survived = first.is_some(),
                "trimPolygon found no single dominant component"
            );
            None
        }
    }
}

/// Combine geometries into the most specific shape that holds them all.
///
/// A lone geometry is returned as-is. Several points, line strings or
/// polygons become the matching multi-geometry; mixed kinds, or any
/// multi-geometry or collection among several inputs, give a collection.
pub fn merge(geometries: &[Geometry]) -> Result<Geometry> {
    let Some(first) = geometries.first() else {
        return Err(GeoError::InvalidArgument(
            "merge requires at least one geometry".to_string(),
        ));
    };
    if geometries.len() == 1 {
        return Ok(first.clone());
    }
    let kind = discriminant(first);
    if geometries.iter().all(|g| discriminant(g) == kind) {
        match first {
            Geometry::Point(_) => {
                return Ok(Geometry::MultiPoint(MultiPoint::new(
                    geometries.iter().filter_map(|g| match g {
                        Geometry::Point(p) => Some(*p),
                        _ => None,
                    }).collect(),
                )))
            }
            Geometry::LineString(_) => {
                return Ok(Geometry::MultiLineString(MultiLineString::new(
                    geometries.iter().filter_map(|g| match g {
                        Geometry::LineString(l) => Some(l.clone()),
                        _ => None,
                    }).collect(),
                )))
            }
            Geometry::Polygon(_) => {
                return Ok(Geometry::MultiPolygon(MultiPolygon::new(
                    geometries.iter().filter_map(|g| match g {
                        Geometry::Polygon(p) => Some(p.clone()),
                        _ => None,
                    }).collect(),
                )))
            }
            _ => {}
        }
    }
    Ok(Geometry::GeometryCollection(GeometryCollection::new_from(
        geometries.to_vec(),
    )))
}

/// A valid polygon without holes.
pub fn is_valid_simple_polygon(geom: &Geometry) -> bool {
    match geom {
        Geometry::Polygon(p) => p.interiors().is_empty() && p.is_valid(),
        _ => false,
    }
}
