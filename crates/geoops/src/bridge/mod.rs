//! Format bridge: external representations to kernel geometry and back.
//!
//! Purpose
//! - WKT, GeoJSON and SRID-prefixed WKB text/bytes.
//! - Raw coordinates, flat nested lists and the Point/Ring model.
//!
//! Contract
//! - Every constructed geometry is snapped to `GeoCfg::precision`.
//! - Parse failures come back as `GeoError::Parse` after being logged with
//!   the offending input; nothing here panics on malformed input.
//!
//! Code cross-refs: `kernel::{snap, linear_ring}`, `model::{BasePolygon, BaseMultiPolygon}`

mod coords;
mod text;
mod wkb;

pub use coords::{
    base_multi_polygon_from, base_polygon_from, create_collection, create_multi_point,
    create_multi_polygon, create_point, create_polygon, multi_polygon_from_point_lists,
    polygon_from_points,
};
pub use text::{
    base_polygon_to_geojson, geojson_to_base_polygon, geojson_to_polygon, parse_geojson,
    parse_wkt, write_geojson, write_wkt, EMPTY_GEO_COLLECTION_JSON,
};
pub use wkb::{
    decode_column, encode_column, parse_wkb, write_wkb, WkbReader, WkbWriter, MAX_NESTING,
};

#[cfg(test)]
mod tests;
