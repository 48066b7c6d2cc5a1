//! Robust 2-D geometry operations for lon/lat data.
//!
//! Layers
//! - `cfg`: precision model and tolerances (`GeoCfg`), passed into every call.
//! - `model`: plain Point/Ring value types.
//! - `bridge`: WKT, WKB (SRID-prefixed), GeoJSON and coordinate lists.
//! - `robust`: boolean operations with normalize-and-retry, tolerance
//!   predicates, hole/sliver utilities.
//! - `cluster`: greedy geodesic point clustering.
//! - `hex`: hexagonal grid cells.
//!
//! All modules are independent users of the shared policy; none of them
//! holds global state.

pub mod bridge;
pub mod cfg;
pub mod cluster;
pub mod error;
pub mod hex;
pub mod kernel;
pub mod model;
pub mod robust;

/// Library version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub use cfg::{GeoCfg, PrecisionModel};
pub use error::{GeoError, Result};
pub use geo::{Geometry, MultiPoint, Point};

/// Common exports for quick imports in callers.
pub mod prelude {
    pub use crate::bridge::{parse_geojson, parse_wkb, parse_wkt, write_geojson, write_wkb, write_wkt};
    pub use crate::cfg::{GeoCfg, PrecisionModel};
    pub use crate::cluster::{distance, group_by_centroid_distance, group_by_distance};
    pub use crate::error::{GeoError, Result};
    pub use crate::model::{BaseMultiPolygon, BasePoint, BasePolygon};
    pub use crate::robust::{
        contains, covers, difference, intersection, intersects, is_cover_in_deviation,
        is_intersection_over_deviation, merge, normalize, trim_polygon, union,
    };
    pub use geo::Geometry;
}
