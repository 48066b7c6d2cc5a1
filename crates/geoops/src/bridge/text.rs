//! WKT and GeoJSON text.
//!
//! - WKT is lossless both ways (shortest round-trip float formatting).
//! - GeoJSON reads at full precision and writes coordinates rounded to
//!   `GeoCfg::geojson_decimals`; no CRS member is ever emitted.

use geo::{Coord, Geometry, MapCoords, Polygon};
use geojson::{GeoJson, JsonObject};
use tracing::error;
use wkt::{ToWkt, TryFromWkt};

use crate::cfg::GeoCfg;
use crate::error::{Format, GeoError, Result};
use crate::kernel::snap;
use crate::model::BasePolygon;

/// GeoJSON for an empty geometry collection.
pub const EMPTY_GEO_COLLECTION_JSON: &str = r#"{"type": "GeometryCollection", "geometries": []}"#;

/// Parse WKT under the precision grid.
pub fn parse_wkt(text: &str, cfg: &GeoCfg) -> Result<Geometry> {
    match Geometry::<f64>::try_from_wkt_str(text) {
        Ok(mut geom) => {
            snap(&mut geom, &cfg.precision);
            Ok(geom)
        }
        Err(e) => {
            error!(input = text, error = %e, "wkt2Geometry error");
            Err(GeoError::parse(Format::Wkt, e))
        }
    }
}

/// Full-precision WKT.
pub fn write_wkt(geom: &Geometry) -> String {
    geom.wkt_string()
}

/// Parse a GeoJSON geometry (features yield their geometry, feature
/// collections a geometry collection).
pub fn parse_geojson(text: &str, cfg: &GeoCfg) -> Result<Geometry> {
    let parsed = text
        .parse::<GeoJson>()
        .map_err(|e| GeoError::parse(Format::GeoJson, e))
        .and_then(|gj| Geometry::<f64>::try_from(gj).map_err(|e| GeoError::parse(Format::GeoJson, e)));
    match parsed {
        Ok(mut geom) => {
            snap(&mut geom, &cfg.precision);
            Ok(geom)
        }
        Err(e) => {
            error!(input = text, error = %e, "geoJson2Geometry error");
            Err(e)
        }
    }
}

/// GeoJSON geometry object with coordinates rounded to
/// `cfg.geojson_decimals` digits.
pub fn write_geojson(geom: &Geometry, cfg: &GeoCfg) -> String {
    let factor = 10f64.powi(cfg.geojson_decimals as i32);
    let rounded = geom.map_coords(|c| Coord {
        x: round_to(c.x, factor),
        y: round_to(c.y, factor),
    });
    let object = JsonObject::from(&geojson::Geometry::new(geojson::Value::from(&rounded)));
    serde_json::Value::Object(object).to_string()
}

#[inline]
fn round_to(x: f64, factor: f64) -> f64 {
    let scaled = x * factor;
    if scaled.is_finite() {
        scaled.round() / factor
    } else {
        x
    }
}

/// `Some` only when the text parses to a single polygon.
pub fn geojson_to_polygon(text: &str, cfg: &GeoCfg) -> Option<Polygon> {
    match parse_geojson(text, cfg) {
        Ok(Geometry::Polygon(p)) => Some(p),
        _ => None,
    }
}

pub fn geojson_to_base_polygon(text: &str, cfg: &GeoCfg) -> Option<BasePolygon> {
    geojson_to_polygon(text, cfg).map(|p| BasePolygon::from_polygon(&p))
}

/// Fails when the polygon carries holes.
pub fn base_polygon_to_geojson(polygon: &BasePolygon, cfg: &GeoCfg) -> Result<String> {
    let p = polygon.to_polygon(cfg)?;
    Ok(write_geojson(&Geometry::Polygon(p), cfg))
}
