//! Tolerance-based overlap predicates.
//!
//! Ratios are taken against the smaller operand's area; deviations are
//! absolute areas. All of them go through the robust `intersection`.

use geo::{Area, Contains, Geometry};

use super::intersection;
use crate::cfg::GeoCfg;
use crate::error::Result;
use crate::kernel::components;

/// Overlap ratio `area(g1 ∩ g2) / min(area(g1), area(g2))` exceeds
/// `tolerance`.
pub fn intersects(g1: &Geometry, g2: &Geometry, tolerance: f64, cfg: &GeoCfg) -> Result<bool> {
    let inter = intersection(g1, g2, cfg)?.unsigned_area();
    let smaller = g1.unsigned_area().min(g2.unsigned_area());
    Ok(inter / smaller > tolerance)
}

/// Overlap area strictly exceeds `deviation`.
pub fn is_intersection_over_deviation(
    g1: &Geometry,
    g2: &Geometry,
    deviation: f64,
    cfg: &GeoCfg,
) -> Result<bool> {
    Ok(intersection(g1, g2, cfg)?.unsigned_area() > deviation)
}

/// `small` is covered by `big` up to a relative `tolerance`.
pub fn covers(big: &Geometry, small: &Geometry, tolerance: f64, cfg: &GeoCfg) -> Result<bool> {
    let inter = intersection(big, small, cfg)?.unsigned_area();
    Ok(ratio_within(inter, small.unsigned_area(), tolerance))
}

/// `small` is covered by `big` up to an absolute area `deviation`.
pub fn is_cover_in_deviation(
    big: &Geometry,
    small: &Geometry,
    deviation: f64,
    cfg: &GeoCfg,
) -> Result<bool> {
    let inter = intersection(big, small, cfg)?.unsigned_area();
    Ok(area_within(inter, small.unsigned_area(), deviation))
}

#[inline]
pub(super) fn ratio_within(inter: f64, reference: f64, tolerance: f64) -> bool {
    (inter / reference - 1.0).abs() < tolerance
}

#[inline]
pub(super) fn area_within(inter: f64, reference: f64, deviation: f64) -> bool {
    (inter - reference).abs() <= deviation
}

/// Some component of `g1` contains `g2`. Collections and multi-geometries
/// are split into components; a missing operand never contains or is
/// contained.
pub fn contains(g1: Option<&Geometry>, g2: Option<&Geometry>) -> bool {
    let (Some(g1), Some(g2)) = (g1, g2) else {
        return false;
    };
    components(g1).iter().any(|c| c.contains(g2))
}
