//! Precision and tolerance policy shared by every component.
//!
//! - `PrecisionModel`: fixed-point grid applied when geometry is constructed
//!   from raw coordinates (parsers, ring builders, cell boundaries).
//! - `GeoCfg`: the precision model plus every tolerance consumed by the
//!   robust operations and the GeoJSON writer.
//!
//! Policy
//! - Defaults are fixed constants; callers build one `GeoCfg` at startup and
//!   pass it along. Nothing here is mutated after construction.

use serde::{Deserialize, Serialize};

/// Decimal digits of the default grid. At the equator one unit of the last
/// digit is well below a millimetre; 15 keeps full f64 resolution for
/// degree-scale coordinates.
pub const DEFAULT_DECIMALS: u32 = 15;
/// Grow/shrink distance of the normalize (buffer/un-buffer) repair.
pub const BUFFER_TOLERANCE: f64 = 0.000_01;
/// Components below this share of the total area are dropped by `trim_polygon`.
pub const OMIT_TOLERANCE: f64 = 0.0001;
/// Decimal digits kept when writing GeoJSON.
pub const GEOJSON_DECIMALS: u32 = 7;

/// Largest integer magnitude an f64 represents with room for exact rounding.
const EXACT_INT_LIMIT: f64 = (1u64 << 50) as f64;

/// Fixed-point coordinate grid: `x ↦ round(x·scale)/scale`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PrecisionModel {
    pub scale: f64,
}

impl PrecisionModel {
    #[inline]
    pub fn with_decimals(decimals: u32) -> Self {
        Self {
            scale: 10f64.powi(decimals as i32),
        }
    }

    /// Snap a single ordinate to the grid.
    ///
    /// Ordinates whose scaled value leaves the exactly-representable integer
    /// range are already coarser than the grid and pass through unchanged,
    /// as do NaN and infinities.
    #[inline]
    pub fn make_precise(&self, x: f64) -> f64 {
        let scaled = x * self.scale;
        if !scaled.is_finite() || scaled.abs() >= EXACT_INT_LIMIT {
            return x;
        }
        scaled.round() / self.scale
    }
}

impl Default for PrecisionModel {
    fn default() -> Self {
        Self::with_decimals(DEFAULT_DECIMALS)
    }
}

/// Geometry configuration (precision grid and tolerances).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeoCfg {
    pub precision: PrecisionModel,
    pub buffer_tolerance: f64,
    pub omit_tolerance: f64,
    pub geojson_decimals: u32,
}

impl Default for GeoCfg {
    fn default() -> Self {
        Self {
            precision: PrecisionModel::default(),
            buffer_tolerance: BUFFER_TOLERANCE,
            omit_tolerance: OMIT_TOLERANCE,
            geojson_decimals: GEOJSON_DECIMALS,
        }
    }
}
