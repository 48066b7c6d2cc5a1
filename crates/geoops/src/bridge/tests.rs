use super::*;
use crate::cfg::GeoCfg;
use crate::error::{Format, GeoError};
use crate::model::BasePoint;
use geo::{polygon, Area, CoordsIter, Geometry, LineString, MultiPolygon, Point};
use proptest::prelude::*;

fn cfg() -> GeoCfg {
    GeoCfg::default()
}

fn square(x0: f64, y0: f64, side: f64) -> Vec<[f64; 2]> {
    vec![
        [x0, y0],
        [x0 + side, y0],
        [x0 + side, y0 + side],
        [x0, y0 + side],
        [x0, y0],
    ]
}

#[test]
fn wkt_parse_and_write() {
    let g = parse_wkt("POLYGON((0 0, 2 0, 2 2, 0 2, 0 0))", &cfg()).unwrap();
    assert!((g.unsigned_area() - 4.0).abs() < 1e-12);
    let text = write_wkt(&g);
    assert!(text.starts_with("POLYGON"));
    assert_eq!(parse_wkt(&text, &cfg()).unwrap(), g);
}

#[test]
fn wkt_keeps_full_precision() {
    let text = "POINT(116.39712812345678 39.90469912345678)";
    let g = parse_wkt(text, &cfg()).unwrap();
    assert_eq!(g, Geometry::Point(Point::new(116.39712812345678, 39.90469912345678)));
    assert_eq!(parse_wkt(&write_wkt(&g), &cfg()).unwrap(), g);
}

#[test]
fn malformed_wkt_is_a_parse_error() {
    assert!(matches!(
        parse_wkt("POLYGON((0 0, 1", &cfg()),
        Err(GeoError::Parse { format: Format::Wkt, .. })
    ));
}

#[test]
fn geojson_write_rounds_to_seven_digits_without_crs() {
    let g = Geometry::Point(Point::new(116.397_128_123, 39.904_699_87));
    let json = write_geojson(&g, &cfg());
    assert!(!json.contains("crs"));
    let v: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(v["type"], "Point");
    assert_eq!(v["coordinates"][0].as_f64().unwrap(), 116.397_128_1);
    assert_eq!(v["coordinates"][1].as_f64().unwrap(), 39.904_699_9);
}

#[test]
fn geojson_reads_polygons_and_features() {
    let polygon = r#"{"type":"Polygon","coordinates":[[[0,0],[1,0],[1,1],[0,1],[0,0]]]}"#;
    assert!(geojson_to_polygon(polygon, &cfg()).is_some());
    let bp = geojson_to_base_polygon(polygon, &cfg()).unwrap();
    assert_eq!(bp.base_points[0].len(), 5);

    let feature = format!(r#"{{"type":"Feature","properties":{{}},"geometry":{polygon}}}"#);
    assert!(matches!(parse_geojson(&feature, &cfg()), Ok(Geometry::Polygon(_))));

    let point = r#"{"type":"Point","coordinates":[1,2]}"#;
    assert!(geojson_to_polygon(point, &cfg()).is_none());
    assert!(geojson_to_polygon("{not json", &cfg()).is_none());
}

#[test]
fn empty_collection_constant_parses() {
    match parse_geojson(EMPTY_GEO_COLLECTION_JSON, &cfg()).unwrap() {
        Geometry::GeometryCollection(gc) => assert!(gc.0.is_empty()),
        g => panic!("unexpected {g:?}"),
    }
}

#[test]
fn base_polygon_geojson_rejects_holes() {
    let bp = crate::model::BasePolygon::from_triple_list(&[square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0)]);
    assert!(matches!(
        base_polygon_to_geojson(&bp, &cfg()),
        Err(GeoError::UnsupportedShape(_))
    ));
    let single = crate::model::BasePolygon::from_triple_list(&[square(0.0, 0.0, 4.0)]);
    let json = base_polygon_to_geojson(&single, &cfg()).unwrap();
    assert!(json.contains("\"Polygon\""));
}

#[test]
fn wkb_point_layout_is_bit_exact() {
    let bytes = write_wkb(&Geometry::Point(Point::new(1.5, -2.0)));
    let mut expected = vec![0, 0, 0, 0, 1, 1, 0, 0, 0];
    expected.extend_from_slice(&1.5f64.to_le_bytes());
    expected.extend_from_slice(&(-2.0f64).to_le_bytes());
    assert_eq!(bytes, expected);
}

#[test]
fn wkb_ignores_srid_value_and_reads_big_endian() {
    let mut bytes = vec![0xE6, 0x10, 0, 0, 0, 0, 0, 0, 1];
    bytes.extend_from_slice(&3.0f64.to_be_bytes());
    bytes.extend_from_slice(&4.0f64.to_be_bytes());
    assert_eq!(
        parse_wkb(&bytes, &cfg()).unwrap(),
        Geometry::Point(Point::new(3.0, 4.0))
    );
}

#[test]
fn wkb_round_trips_holes_and_collections() {
    let with_hole = create_polygon(&[square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0)], &cfg())
        .unwrap()
        .unwrap();
    let mp = MultiPolygon::new(vec![
        with_hole.clone(),
        polygon![(x: 10., y: 10.), (x: 11., y: 10.), (x: 11., y: 11.), (x: 10., y: 10.)],
    ]);
    let gc = Geometry::GeometryCollection(create_collection(vec![
        Geometry::MultiPolygon(mp.clone()),
        Geometry::Point(Point::new(7.0, 8.0)),
        Geometry::LineString(LineString::from(vec![(0., 0.), (1., 1.)])),
    ]));
    for g in [Geometry::Polygon(with_hole), Geometry::MultiPolygon(mp), gc] {
        assert_eq!(parse_wkb(&write_wkb(&g), &cfg()).unwrap(), g);
    }
}

#[test]
fn wkb_rejects_truncated_and_bogus_input() {
    assert!(matches!(parse_wkb(&[0, 0], &cfg()), Err(GeoError::Parse { format: Format::Wkb, .. })));
    let mut bytes = write_wkb(&Geometry::Point(Point::new(1.0, 2.0)));
    bytes.truncate(bytes.len() - 3);
    assert!(parse_wkb(&bytes, &cfg()).is_err());
    // polygon claiming four billion rings
    let bogus = [0, 0, 0, 0, 1, 3, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
    assert!(parse_wkb(&bogus, &cfg()).is_err());
    // unknown byte order flag
    assert!(parse_wkb(&[0, 0, 0, 0, 7, 1, 0, 0, 0], &cfg()).is_err());
}

/// SRID prefix, `collections` single-member collections, then one point.
fn nested_collections(collections: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; 4];
    for _ in 0..collections {
        bytes.extend_from_slice(&[1, 7, 0, 0, 0, 1, 0, 0, 0]);
    }
    bytes.extend_from_slice(&[1, 1, 0, 0, 0]);
    bytes.extend_from_slice(&1.5f64.to_le_bytes());
    bytes.extend_from_slice(&2.5f64.to_le_bytes());
    bytes
}

#[test]
fn wkb_nesting_is_capped() {
    // The point itself is one level.
    let ok = parse_wkb(&nested_collections(MAX_NESTING - 1), &cfg()).unwrap();
    assert_eq!(ok.coords_iter().next(), Some(geo::coord! { x: 1.5, y: 2.5 }));
    assert!(matches!(
        parse_wkb(&nested_collections(MAX_NESTING), &cfg()),
        Err(GeoError::Parse { format: Format::Wkb, .. })
    ));
    // Deep enough to exhaust the stack without the cap.
    assert!(matches!(
        parse_wkb(&nested_collections(200_000), &cfg()),
        Err(GeoError::Parse { format: Format::Wkb, .. })
    ));
    // The reader recovers for the next call on this thread.
    let p = Geometry::Point(Point::new(3.0, 4.0));
    assert_eq!(parse_wkb(&write_wkb(&p), &cfg()).unwrap(), p);
}

#[test]
fn column_decode_requires_bytes() {
    assert!(matches!(decode_column(None, &cfg()), Err(GeoError::NullInput(_))));
    let g = Geometry::Point(Point::new(1.0, 1.0));
    assert_eq!(decode_column(Some(encode_column(&g).as_slice()), &cfg()).unwrap(), g);
}

#[test]
fn wkb_codecs_are_per_thread() {
    let handles: Vec<_> = (0..4)
        .map(|i| {
            std::thread::spawn(move || {
                let cfg = GeoCfg::default();
                for k in 0..200 {
                    let side = 1.0 + (i * 1000 + k) as f64;
                    let p = create_polygon(&[square(0.0, 0.0, side)], &cfg).unwrap().unwrap();
                    let g = Geometry::Polygon(p);
                    assert_eq!(parse_wkb(&write_wkb(&g), &cfg).unwrap(), g);
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
}

#[test]
fn reader_and_writer_are_reusable() {
    let mut reader = WkbReader::new(cfg().precision);
    let mut writer = WkbWriter::new();
    let a = Geometry::Point(Point::new(1.0, 2.0));
    let b = Geometry::Polygon(polygon![(x: 0., y: 0.), (x: 1., y: 0.), (x: 0., y: 1.)]);
    let a_bytes = writer.write(&a).to_vec();
    let b_bytes = writer.write(&b).to_vec();
    assert_eq!(reader.read(&b_bytes).unwrap(), b);
    assert_eq!(reader.read(&a_bytes).unwrap(), a);
}

#[test]
fn flat_lists_build_polygons_with_holes() {
    let p = create_polygon(&[square(0.0, 0.0, 4.0), square(1.0, 1.0, 1.0)], &cfg())
        .unwrap()
        .unwrap();
    assert_eq!(p.interiors().len(), 1);
    assert!((p.unsigned_area() - 15.0).abs() < 1e-12);
    assert!(create_polygon(&[], &cfg()).unwrap().is_none());
    assert!(create_multi_polygon(&[], &cfg()).unwrap().is_none());

    let mp = create_multi_polygon(&[vec![square(0.0, 0.0, 1.0)], vec![square(3.0, 3.0, 1.0)]], &cfg())
        .unwrap()
        .unwrap();
    assert_eq!(mp.0.len(), 2);
}

#[test]
fn open_rings_fail_conversion() {
    let open = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    assert!(matches!(
        create_polygon(&[open.to_vec()], &cfg()),
        Err(GeoError::Kernel { .. })
    ));
    let points: Vec<BasePoint> = open.iter().map(|[x, y]| BasePoint::new(*x, *y)).collect();
    assert!(polygon_from_points(&points, &cfg()).is_err());
}

#[test]
fn multi_point_requires_points() {
    assert!(create_multi_point(&[], &cfg()).is_none());
    let mp = create_multi_point(&[BasePoint::new(1.0, 2.0), BasePoint::new(3.0, 4.0)], &cfg()).unwrap();
    assert_eq!(mp.0[1], Point::new(3.0, 4.0));
}

fn grid_ordinate() -> impl Strategy<Value = f64> {
    (-180_000_000i64..180_000_000).prop_map(|v| v as f64 / 1e6)
}

fn jagged_ordinate() -> impl Strategy<Value = f64> {
    -180.0f64..180.0
}

/// Star-shaped simple polygon around `(cx, cy)`.
fn star_polygon(cx: f64, cy: f64, radii: &[f64]) -> Vec<[f64; 2]> {
    let n = radii.len();
    let mut ring: Vec<[f64; 2]> = radii
        .iter()
        .enumerate()
        .map(|(k, r)| {
            let t = std::f64::consts::TAU * k as f64 / n as f64;
            [cx + r * t.cos(), cy + r * t.sin()]
        })
        .collect();
    ring.push(ring[0]);
    ring
}

proptest! {
    #[test]
    fn wkb_round_trip_polygons(
        cx in grid_ordinate(),
        cy in grid_ordinate(),
        radii in prop::collection::vec(0.001f64..5.0, 3..24),
    ) {
        let cfg = GeoCfg::default();
        let p = create_polygon(&[star_polygon(cx, cy, &radii)], &cfg).unwrap().unwrap();
        let g = Geometry::Polygon(p);
        prop_assert_eq!(parse_wkb(&write_wkb(&g), &cfg).unwrap(), g);
    }

    #[test]
    fn wkt_round_trip_is_exact(
        cx in grid_ordinate(),
        cy in grid_ordinate(),
        radii in prop::collection::vec(0.001f64..5.0, 3..24),
        px in jagged_ordinate(),
        py in jagged_ordinate(),
    ) {
        let cfg = GeoCfg::default();
        let p = create_polygon(&[star_polygon(cx, cy, &radii)], &cfg).unwrap().unwrap();
        for g in [Geometry::Polygon(p), Geometry::Point(create_point(px, py, &cfg))] {
            prop_assert_eq!(parse_wkt(&write_wkt(&g), &cfg).unwrap(), g);
        }
    }

    #[test]
    fn geojson_loss_is_bounded(
        cx in jagged_ordinate(),
        cy in -80.0f64..80.0,
        radii in prop::collection::vec(0.001f64..5.0, 3..24),
    ) {
        let cfg = GeoCfg::default();
        let p = create_polygon(&[star_polygon(cx, cy, &radii)], &cfg).unwrap().unwrap();
        let g = Geometry::Polygon(p);
        let back = parse_geojson(&write_geojson(&g, &cfg), &cfg).unwrap();
        prop_assert_eq!(back.coords_count(), g.coords_count());
        for (a, b) in g.coords_iter().zip(back.coords_iter()) {
            prop_assert!((a.x - b.x).abs() <= 5e-8 + 1e-12);
            prop_assert!((a.y - b.y).abs() <= 5e-8 + 1e-12);
        }
    }
}
