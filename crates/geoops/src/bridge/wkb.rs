//! 2-D WKB codec and the SRID-prefixed binary column contract.
//!
//! Layout
//! - Column bytes: 4-byte SRID prefix (zero on write, ignored on read)
//!   followed by a WKB body.
//! - Bodies are written little-endian, two ordinates per coordinate; the
//!   reader honours the byte-order flag of every nested geometry.
//!
//! Concurrency
//! - `WkbReader` and `WkbWriter` carry per-call cursor and buffer state and
//!   take `&mut self`. The free functions below use one lazily built
//!   instance per thread, never shared across threads.

use std::cell::RefCell;

use geo::{
    Coord, Geometry, GeometryCollection, LineString, MultiLineString, MultiPoint, MultiPolygon,
    Point, Polygon,
};
use tracing::error;

use crate::cfg::{GeoCfg, PrecisionModel};
use crate::error::{Format, GeoError, Result};

const SRID_PREFIX_LEN: usize = 4;

const WKB_POINT: u32 = 1;
const WKB_LINESTRING: u32 = 2;
const WKB_POLYGON: u32 = 3;
const WKB_MULTIPOINT: u32 = 4;
const WKB_MULTILINESTRING: u32 = 5;
const WKB_MULTIPOLYGON: u32 = 6;
const WKB_GEOMETRYCOLLECTION: u32 = 7;

const BIG_ENDIAN: u8 = 0;
const LITTLE_ENDIAN: u8 = 1;

/// Smallest encoded size of one element, used to reject absurd counts
/// before allocating.
const COORD_LEN: usize = 16;
const HEADER_LEN: usize = 5;

/// Deepest accepted nesting of collections and multi-geometries.
pub const MAX_NESTING: usize = 64;

thread_local! {
    static WKB_READER: RefCell<Option<WkbReader>> = RefCell::new(None);
    static WKB_WRITER: RefCell<Option<WkbWriter>> = RefCell::new(None);
}

/// Stateful WKB body reader. Coordinates are snapped to its grid.
#[derive(Debug)]
pub struct WkbReader {
    precision: PrecisionModel,
    pos: usize,
    little_endian: bool,
    depth: usize,
}

impl WkbReader {
    pub fn new(precision: PrecisionModel) -> Self {
        Self {
            precision,
            pos: 0,
            little_endian: true,
            depth: 0,
        }
    }

    /// Decode one geometry from a WKB body (no SRID prefix).
    pub fn read(&mut self, body: &[u8]) -> Result<Geometry> {
        self.pos = 0;
        self.little_endian = true;
        self.depth = 0;
        self.read_geometry(body)
    }

    fn read_geometry(&mut self, buf: &[u8]) -> Result<Geometry> {
        if self.depth >= MAX_NESTING {
            return Err(wkb_error(format!(
                "nesting too deep (more than {MAX_NESTING} levels) at byte {}",
                self.pos
            )));
        }
        self.depth += 1;
        let geom = self.read_body(buf);
        self.depth -= 1;
        geom
    }

    fn read_body(&mut self, buf: &[u8]) -> Result<Geometry> {
        self.little_endian = match self.read_u8(buf)? {
            LITTLE_ENDIAN => true,
            BIG_ENDIAN => false,
            other => return Err(wkb_error(format!("unknown byte order flag {other}"))),
        };
        let type_code = self.read_u32(buf)?;
        let geom = match type_code {
            WKB_POINT => Geometry::Point(Point::from(self.read_coord(buf)?)),
            WKB_LINESTRING => Geometry::LineString(self.read_line_string(buf)?),
            WKB_POLYGON => Geometry::Polygon(self.read_polygon(buf)?),
            WKB_MULTIPOINT => {
                let n = self.read_count(buf, HEADER_LEN + COORD_LEN)?;
                let mut points = Vec::with_capacity(n);
                for _ in 0..n {
                    match self.read_geometry(buf)? {
                        Geometry::Point(p) => points.push(p),
                        _ => return Err(wkb_error("MultiPoint member is not a Point")),
                    }
                }
                Geometry::MultiPoint(MultiPoint::new(points))
            }
            WKB_MULTILINESTRING => {
                let n = self.read_count(buf, HEADER_LEN + 4)?;
                let mut lines = Vec::with_capacity(n);
                for _ in 0..n {
                    match self.read_geometry(buf)? {
                        Geometry::LineString(ls) => lines.push(ls),
                        _ => return Err(wkb_error("MultiLineString member is not a LineString")),
                    }
                }
                Geometry::MultiLineString(MultiLineString::new(lines))
            }
            WKB_MULTIPOLYGON => {
                let n = self.read_count(buf, HEADER_LEN + 4)?;
                let mut polygons = Vec::with_capacity(n);
                for _ in 0..n {
                    match self.read_geometry(buf)? {
                        Geometry::Polygon(p) => polygons.push(p),
                        _ => return Err(wkb_error("MultiPolygon member is not a Polygon")),
                    }
                }
                Geometry::MultiPolygon(MultiPolygon::new(polygons))
            }
            WKB_GEOMETRYCOLLECTION => {
                let n = self.read_count(buf, HEADER_LEN)?;
                let mut members = Vec::with_capacity(n);
                for _ in 0..n {
                    members.push(self.read_geometry(buf)?);
                }
                Geometry::GeometryCollection(GeometryCollection::new_from(members))
            }
            other => return Err(wkb_error(format!("unsupported geometry type {other}"))),
        };
        Ok(geom)
    }

    fn read_line_string(&mut self, buf: &[u8]) -> Result<LineString> {
        let n = self.read_count(buf, COORD_LEN)?;
        let mut coords = Vec::with_capacity(n);
        for _ in 0..n {
            coords.push(self.read_coord(buf)?);
        }
        Ok(LineString::new(coords))
    }

    fn read_polygon(&mut self, buf: &[u8]) -> Result<Polygon> {
        let n = self.read_count(buf, 4)?;
        let mut rings = Vec::with_capacity(n);
        for _ in 0..n {
            rings.push(self.read_line_string(buf)?);
        }
        let mut rings = rings.into_iter();
        let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
        Ok(Polygon::new(exterior, rings.collect()))
    }

    fn read_coord(&mut self, buf: &[u8]) -> Result<Coord> {
        let x = self.read_f64(buf)?;
        let y = self.read_f64(buf)?;
        Ok(Coord {
            x: self.precision.make_precise(x),
            y: self.precision.make_precise(y),
        })
    }

    /// Element count, bounded by what the remaining bytes could hold.
    fn read_count(&mut self, buf: &[u8], min_elem_len: usize) -> Result<usize> {
        let n = self.read_u32(buf)? as usize;
        let remaining = buf.len().saturating_sub(self.pos);
        if n.saturating_mul(min_elem_len) > remaining {
            return Err(wkb_error(format!(
                "count {n} exceeds remaining {remaining} bytes"
            )));
        }
        Ok(n)
    }

    fn take<const N: usize>(&mut self, buf: &[u8]) -> Result<[u8; N]> {
        let bytes = buf
            .get(self.pos..self.pos + N)
            .ok_or_else(|| wkb_error(format!("unexpected end of input at byte {}", self.pos)))?;
        self.pos += N;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    fn read_u8(&mut self, buf: &[u8]) -> Result<u8> {
        Ok(self.take::<1>(buf)?[0])
    }

    fn read_u32(&mut self, buf: &[u8]) -> Result<u32> {
        let b = self.take::<4>(buf)?;
        Ok(if self.little_endian {
            u32::from_le_bytes(b)
        } else {
            u32::from_be_bytes(b)
        })
    }

    fn read_f64(&mut self, buf: &[u8]) -> Result<f64> {
        let b = self.take::<8>(buf)?;
        Ok(if self.little_endian {
            f64::from_le_bytes(b)
        } else {
            f64::from_be_bytes(b)
        })
    }
}

/// Little-endian, 2-D WKB body writer reusing one output buffer.
#[derive(Debug, Default)]
pub struct WkbWriter {
    buf: Vec<u8>,
}

impl WkbWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encode `geom`; the slice is valid until the next call.
    pub fn write(&mut self, geom: &Geometry) -> &[u8] {
        self.buf.clear();
        self.put_geometry(geom);
        &self.buf
    }

    fn put_geometry(&mut self, geom: &Geometry) {
        match geom {
            Geometry::Point(p) => {
                self.put_header(WKB_POINT);
                self.put_coord(p.0);
            }
            Geometry::Line(l) => {
                self.put_header(WKB_LINESTRING);
                self.put_u32(2);
                self.put_coord(l.start);
                self.put_coord(l.end);
            }
            Geometry::LineString(ls) => {
                self.put_header(WKB_LINESTRING);
                self.put_line_string(ls);
            }
            Geometry::Polygon(p) => self.put_polygon(p),
            Geometry::Rect(r) => self.put_polygon(&r.to_polygon()),
            Geometry::Triangle(t) => self.put_polygon(&t.to_polygon()),
            Geometry::MultiPoint(mp) => {
                self.put_header(WKB_MULTIPOINT);
                self.put_u32(mp.0.len() as u32);
                for p in &mp.0 {
                    self.put_header(WKB_POINT);
                    self.put_coord(p.0);
                }
            }
            Geometry::MultiLineString(ml) => {
                self.put_header(WKB_MULTILINESTRING);
                self.put_u32(ml.0.len() as u32);
                for ls in &ml.0 {
                    self.put_header(WKB_LINESTRING);
                    self.put_line_string(ls);
                }
            }
            Geometry::MultiPolygon(mp) => {
                self.put_header(WKB_MULTIPOLYGON);
                self.put_u32(mp.0.len() as u32);
                for p in &mp.0 {
                    self.put_polygon(p);
                }
            }
            Geometry::GeometryCollection(gc) => {
                self.put_header(WKB_GEOMETRYCOLLECTION);
                self.put_u32(gc.0.len() as u32);
                for g in &gc.0 {
                    self.put_geometry(g);
                }
            }
        }
    }

    fn put_polygon(&mut self, p: &Polygon) {
        self.put_header(WKB_POLYGON);
        // an empty exterior means an empty polygon: zero rings
        if p.exterior().0.is_empty() {
            self.put_u32(0);
            return;
        }
        self.put_u32(1 + p.interiors().len() as u32);
        self.put_line_string(p.exterior());
        for ring in p.interiors() {
            self.put_line_string(ring);
        }
    }

    fn put_line_string(&mut self, ls: &LineString) {
        self.put_u32(ls.0.len() as u32);
        for c in &ls.0 {
            self.put_coord(*c);
        }
    }

    fn put_header(&mut self, type_code: u32) {
        self.buf.push(LITTLE_ENDIAN);
        self.put_u32(type_code);
    }

    fn put_u32(&mut self, v: u32) {
        self.buf.extend_from_slice(&v.to_le_bytes());
    }

    fn put_coord(&mut self, c: Coord) {
        self.buf.extend_from_slice(&c.x.to_le_bytes());
        self.buf.extend_from_slice(&c.y.to_le_bytes());
    }
}

fn wkb_error(reason: impl ToString) -> GeoError {
    GeoError::parse(Format::Wkb, reason)
}

/// Run `f` with this thread's reader, rebuilding it if the grid changed.
fn with_reader<T>(precision: PrecisionModel, f: impl FnOnce(&mut WkbReader) -> T) -> T {
    WKB_READER.with(|cell| {
        let mut slot = cell.borrow_mut();
        if slot.as_ref().is_some_and(|r| r.precision != precision) {
            *slot = None;
        }
        f(slot.get_or_insert_with(|| WkbReader::new(precision)))
    })
}

fn with_writer<T>(f: impl FnOnce(&mut WkbWriter) -> T) -> T {
    WKB_WRITER.with(|cell| {
        let mut slot = cell.borrow_mut();
        f(slot.get_or_insert_with(WkbWriter::new))
    })
}

/// Decode SRID-prefixed WKB; the prefix value is ignored.
pub fn parse_wkb(bytes: &[u8], cfg: &GeoCfg) -> Result<Geometry> {
    let result = match bytes.get(SRID_PREFIX_LEN..) {
        Some(body) => with_reader(cfg.precision, |r| r.read(body)),
        None => Err(wkb_error(format!(
            "{} bytes is shorter than the SRID prefix",
            bytes.len()
        ))),
    };
    if let Err(e) = &result {
        error!(len = bytes.len(), error = %e, "wkb2Geometry error");
    }
    result
}

/// Encode as SRID-prefixed (SRID 0) little-endian 2-D WKB.
pub fn write_wkb(geom: &Geometry) -> Vec<u8> {
    with_writer(|w| {
        let body = w.write(geom);
        let mut out = Vec::with_capacity(SRID_PREFIX_LEN + body.len());
        out.extend_from_slice(&[0u8; SRID_PREFIX_LEN]);
        out.extend_from_slice(body);
        out
    })
}

/// Decode a nullable geometry column value.
pub fn decode_column(bytes: Option<&[u8]>, cfg: &GeoCfg) -> Result<Geometry> {
    let bytes = bytes.ok_or(GeoError::NullInput("geometry column bytes"))?;
    parse_wkb(bytes, cfg)
}

/// Encode a geometry column value.
pub fn encode_column(geom: &Geometry) -> Vec<u8> {
    write_wkb(geom)
}
