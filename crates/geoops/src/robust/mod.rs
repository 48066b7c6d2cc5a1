//! Robust boolean operations over the `geo` kernel.
//!
//! Purpose
//! - Union, intersection and difference that survive kernel failures on
//!   numerically degenerate input.
//! - Tolerance-based predicates and shape utilities built on top of them.
//!
//! Strategy
//! - Attempt the exact kernel operation. On a kernel failure, normalize both
//!   operands (canonical vertex order, then grow and shrink by
//!   `GeoCfg::buffer_tolerance`) and try exactly once more. A second failure
//!   is returned to the caller; there is no third tier.
//! - Union additionally falls back to a grown-operand union when the exact
//!   result falls apart into several components: adjacent regions separated
//!   by a sliver gap are expected to merge into one polygon.
//! - Shape errors (non-polygonal operands) are never retried.
//!
//! Code cross-refs: `kernel::{guarded, polygonal, canonical}`, `cfg::GeoCfg`

mod predicates;
mod shape;

pub use predicates::{contains, covers, intersects, is_cover_in_deviation, is_intersection_over_deviation};
pub use shape::{has_holes, holes_area, is_valid_simple_polygon, merge, remove_holes, trim_polygon};

use geo::algorithm::Buffer;
use geo::{BooleanOps, Geometry, MultiPolygon};
use tracing::debug;

use crate::cfg::GeoCfg;
use crate::error::{GeoError, Result};
use crate::kernel::{canonical, ensure_finite, guarded, polygonal, simplest};

/// Canonicalize vertex order, then grow and shrink by `cfg.buffer_tolerance`.
///
/// Repairs minor self-intersections and coincident vertices at the cost of a
/// boundary shift bounded by the tolerance.
pub fn normalize(geom: &Geometry, cfg: &GeoCfg) -> Result<Geometry> {
    let canon = canonical(geom);
    let tol = cfg.buffer_tolerance;
    let repaired = guarded("normalize", || canon.buffer(tol).buffer(-tol))?;
    ensure_finite("normalize", simplest(repaired))
}

/// Exact attempt, then one retry on normalized operands after a kernel
/// failure.
pub(crate) fn with_retry<F>(
    op: &'static str,
    g1: &Geometry,
    g2: &Geometry,
    cfg: &GeoCfg,
    exact: F,
) -> Result<Geometry>
where
    F: Fn(&Geometry, &Geometry) -> Result<Geometry>,
{
    match exact(g1, g2) {
        Err(GeoError::Kernel { reason, .. }) => {
            debug!(op, reason, "exact operation failed, retrying on normalized operands");
            let n1 = normalize(g1, cfg)?;
            let n2 = normalize(g2, cfg)?;
            exact(&n1, &n2)
        }
        other => other,
    }
}

fn boolean<F>(op: &'static str, g1: &Geometry, g2: &Geometry, f: F) -> Result<Geometry>
where
    F: FnOnce(&MultiPolygon, &MultiPolygon) -> MultiPolygon,
{
    let a = polygonal(g1)?;
    let b = polygonal(g2)?;
    let out = guarded(op, || f(&a, &b))?;
    ensure_finite(op, simplest(out))
}

fn exact_union(g1: &Geometry, g2: &Geometry) -> Result<Geometry> {
    boolean("union", g1, g2, |a, b| a.union(b))
}

fn exact_intersection(g1: &Geometry, g2: &Geometry) -> Result<Geometry> {
    boolean("intersection", g1, g2, |a, b| a.intersection(b))
}

fn exact_difference(g1: &Geometry, g2: &Geometry) -> Result<Geometry> {
    boolean("difference", g1, g2, |a, b| a.difference(b))
}

/// Union of two polygonal geometries.
///
/// Falls back to growing both operands by `cfg.buffer_tolerance`, unioning,
/// and shrinking the result when the exact union fails or comes back as
/// several components.
pub fn union(g1: &Geometry, g2: &Geometry, cfg: &GeoCfg) -> Result<Geometry> {
    union_with(g1, g2, cfg, exact_union, buffered_union)
}

/// Union control flow over an exact attempt and a single grown-operand
/// fallback. A fallback failure is returned as-is.
pub(crate) fn union_with<E, B>(
    g1: &Geometry,
    g2: &Geometry,
    cfg: &GeoCfg,
    exact: E,
    fallback: B,
) -> Result<Geometry>
where
    E: FnOnce(&Geometry, &Geometry) -> Result<Geometry>,
    B: FnOnce(&Geometry, &Geometry, &GeoCfg) -> Result<Geometry>,
{
    match exact(g1, g2) {
        Ok(Geometry::MultiPolygon(mp)) if mp.0.len() > 1 => {
            debug!(components = mp.0.len(), "union split into components, using grown operands");
            fallback(g1, g2, cfg)
        }
        Err(GeoError::Kernel { reason, .. }) => {
            debug!(reason, "union failed, using grown operands");
            fallback(g1, g2, cfg)
        }
        other => other,
    }
}

fn buffered_union(g1: &Geometry, g2: &Geometry, cfg: &GeoCfg) -> Result<Geometry> {
    let a = polygonal(g1)?;
    let b = polygonal(g2)?;
    let tol = cfg.buffer_tolerance;
    let merged = guarded("union", || a.buffer(tol).union(&b.buffer(tol)).buffer(-tol))?;
    ensure_finite("union", simplest(merged))
}

pub fn intersection(g1: &Geometry, g2: &Geometry, cfg: &GeoCfg) -> Result<Geometry> {
    with_retry("intersection", g1, g2, cfg, exact_intersection)
}

/// `g1` minus `g2`.
pub fn difference(g1: &Geometry, g2: &Geometry, cfg: &GeoCfg) -> Result<Geometry> {
    with_retry("difference", g1, g2, cfg, exact_difference)
}
