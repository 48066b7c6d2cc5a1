//! Point/Ring model: plain value types for points, rings and polygons.
//!
//! Purpose
//! - Give callers without direct kernel access a stable, serializable shape
//!   (`BasePoint`, `BasePolygon`, `BaseMultiPolygon`).
//! - Keep conversions to kernel geometry explicit and fallible where the
//!   target cannot represent holes.
//!
//! Code cross-refs: `bridge::{polygon_from_points, base_polygon_from}`

mod point;
mod polygon;

pub use point::{point_from_index_str, BasePoint};
pub use polygon::{BaseMultiPolygon, BasePolygon, Ring};
