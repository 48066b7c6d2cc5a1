//! Hexagonal grid cells (H3) to points and polygons.
//!
//! Cells are carried as their raw `u64` index; the hexadecimal code is the
//! text form. Coordinates are lon/lat degrees like everywhere else in the
//! crate.

use geo::Polygon;
use h3o::{CellIndex, LatLng, Resolution};
use tracing::error;

use crate::bridge::{base_polygon_from, create_polygon};
use crate::cfg::GeoCfg;
use crate::error::{Format, GeoError, Result};
use crate::model::{BasePoint, BasePolygon};

fn cell(id: u64) -> Result<CellIndex> {
    CellIndex::try_from(id).map_err(|e| GeoError::InvalidArgument(format!("cell {id:#x}: {e}")))
}

/// Cell index from its hexadecimal code.
pub fn cell_from_code(code: &str) -> Result<u64> {
    let code = code.trim();
    if code.is_empty() {
        return Err(GeoError::InvalidArgument("cell code is blank".to_string()));
    }
    code.parse::<CellIndex>()
        .map(u64::from)
        .map_err(|e| GeoError::parse(Format::CellCode, format!("{code:?}: {e}")))
}

/// Hexadecimal code of a cell index.
pub fn code_from_cell(id: u64) -> Result<String> {
    Ok(cell(id)?.to_string())
}

/// Center of the cell.
pub fn center_point(id: u64) -> Result<BasePoint> {
    let ll = LatLng::from(cell(id)?);
    Ok(BasePoint::new(ll.lng(), ll.lat()))
}

/// Index of the cell holding `point` at `resolution` (0..=15).
pub fn cell_of(point: &BasePoint, resolution: u8) -> Result<u64> {
    point.check_range()?;
    let res = Resolution::try_from(resolution)
        .map_err(|e| GeoError::InvalidArgument(format!("resolution {resolution}: {e}")))?;
    let ll = LatLng::new(point.lat, point.lon)
        .map_err(|e| GeoError::InvalidArgument(format!("coordinate {point:?}: {e}")))
        .inspect_err(|e| error!(?point, error = %e, "getH3Id error"))?;
    Ok(u64::from(ll.to_cell(res)))
}

/// Cell outline as a closed single-ring polygon.
pub fn cell_polygon(id: u64, cfg: &GeoCfg) -> Result<Polygon> {
    let boundary = cell(id)?.boundary();
    let mut ring: Vec<[f64; 2]> = boundary.iter().map(|ll| [ll.lng(), ll.lat()]).collect();
    if let Some(&first) = ring.first() {
        ring.push(first);
    }
    create_polygon(&[ring], cfg)?
        .ok_or_else(|| GeoError::InvalidArgument(format!("cell {id:#x} has no boundary")))
}

pub fn cell_base_polygon(id: u64, cfg: &GeoCfg) -> Result<BasePolygon> {
    cell_polygon(id, cfg).map(|p| base_polygon_from(&p))
}
