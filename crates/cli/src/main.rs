use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use geoops::bridge::{parse_geojson, parse_wkb, parse_wkt, write_geojson, write_wkb, write_wkt};
use geoops::model::BasePoint;
use geoops::{cluster, hex, robust, GeoCfg, Geometry, Point};
use polars::prelude::*;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;

mod provenance;

#[derive(Parser)]
#[command(name = "cli")]
#[command(about = "Geometry conversion, robust overlay and clustering")]
struct Cmd {
    /// Optional JSON file with `GeoCfg` overrides; missing keys keep defaults
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Format {
    Wkt,
    Geojson,
    Wkb,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Op {
    Union,
    Intersection,
    Difference,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Predicate {
    Intersects,
    OverDeviation,
    Covers,
    CoverInDeviation,
    Contains,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Anchor {
    /// Compare against each group's first point
    First,
    /// Compare against each group's running centroid
    Centroid,
}

#[derive(Subcommand)]
enum Action {
    /// Re-encode a geometry file
    Convert {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, value_enum)]
        from: Format,
        #[arg(long, value_enum)]
        to: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Robust boolean operation on two geometry files
    Op {
        #[arg(value_enum)]
        op: Op,
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Wkt)]
        format: Format,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Evaluate a tolerance predicate; prints true/false
    Check {
        #[arg(value_enum)]
        predicate: Predicate,
        #[arg(long)]
        a: PathBuf,
        #[arg(long)]
        b: PathBuf,
        #[arg(long, value_enum, default_value_t = Format::Wkt)]
        format: Format,
        /// Ratio tolerance or absolute area deviation, depending on the predicate
        #[arg(long, default_value_t = 0.01)]
        tolerance: f64,
    },
    /// Greedy clustering of lon/lat points read from CSV
    Cluster {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "lon")]
        lon_col: String,
        #[arg(long, default_value = "lat")]
        lat_col: String,
        /// Maximum distance in metres
        #[arg(long)]
        distance: f64,
        #[arg(long, value_enum, default_value_t = Anchor::First)]
        anchor: Anchor,
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Hexagonal cell of a "lon,lat" point
    Hex {
        #[arg(long)]
        point: String,
        #[arg(long, default_value_t = 9)]
        res: u8,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    SubscriberBuilder::default().with_target(false).init();
    // Kernel panics are caught and retried; keep their hook output off stderr.
    std::panic::set_hook(Box::new(|info| tracing::debug!(%info, "panic")));
    let cmd = Cmd::parse();
    let cfg = load_cfg(cmd.config.as_deref())?;
    match cmd.action {
        Action::Convert { input, from, to, out } => convert(&input, from, to, out.as_deref(), &cfg),
        Action::Op { op, a, b, format, out } => overlay(op, &a, &b, format, out.as_deref(), &cfg),
        Action::Check { predicate, a, b, format, tolerance } => {
            let holds = check(predicate, &a, &b, format, tolerance, &cfg)?;
            println!("{holds}");
            Ok(())
        }
        Action::Cluster { input, lon_col, lat_col, distance, anchor, out } => {
            run_cluster(&input, &lon_col, &lat_col, distance, anchor, out.as_deref(), &cfg)
        }
        Action::Hex { point, res } => hex_cell(&point, res, &cfg),
        Action::Report => report(&cfg),
    }
}

fn load_cfg(path: Option<&Path>) -> Result<GeoCfg> {
    let Some(path) = path else {
        return Ok(GeoCfg::default());
    };
    let bytes = std::fs::read(path).with_context(|| format!("reading config {}", path.display()))?;
    let cfg: GeoCfg = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!(?cfg, "config");
    Ok(cfg)
}

fn read_geometry(path: &Path, format: Format, cfg: &GeoCfg) -> Result<Geometry> {
    let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let geom = match format {
        Format::Wkb => parse_wkb(&bytes, cfg)?,
        Format::Wkt => parse_wkt(std::str::from_utf8(&bytes)?.trim(), cfg)?,
        Format::Geojson => parse_geojson(std::str::from_utf8(&bytes)?, cfg)?,
    };
    Ok(geom)
}

fn encode(geom: &Geometry, format: Format, cfg: &GeoCfg) -> Vec<u8> {
    match format {
        Format::Wkb => write_wkb(geom),
        Format::Wkt => write_wkt(geom).into_bytes(),
        Format::Geojson => write_geojson(geom, cfg).into_bytes(),
    }
}

/// Write `bytes` to `out` with a provenance sidecar, or print them.
fn emit(bytes: &[u8], binary: bool, out: Option<&Path>, params: serde_json::Value, cfg: &GeoCfg) -> Result<()> {
    let Some(out) = out else {
        if binary {
            println!("{}", bytes.iter().map(|b| format!("{b:02x}")).collect::<String>());
        } else {
            println!("{}", String::from_utf8_lossy(bytes));
        }
        return Ok(());
    };
    if let Some(parent) = out.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::write(out, bytes).with_context(|| format!("writing {}", out.display()))?;
    let sidecar = provenance::write_sidecar(out, provenance::Payload::new(params, cfg))?;
    tracing::info!(out = %out.display(), sidecar = %sidecar.display(), "written");
    Ok(())
}

fn convert(input: &Path, from: Format, to: Format, out: Option<&Path>, cfg: &GeoCfg) -> Result<()> {
    tracing::info!(input = %input.display(), ?from, ?to, "convert");
    let geom = read_geometry(input, from, cfg)?;
    let params = json!({
        "action": "convert",
        "input": input.to_string_lossy(),
        "from": format!("{from:?}"),
        "to": format!("{to:?}"),
    });
    emit(&encode(&geom, to, cfg), matches!(to, Format::Wkb), out, params, cfg)
}

fn overlay(op: Op, a: &Path, b: &Path, format: Format, out: Option<&Path>, cfg: &GeoCfg) -> Result<()> {
    tracing::info!(?op, a = %a.display(), b = %b.display(), "op");
    let ga = read_geometry(a, format, cfg)?;
    let gb = read_geometry(b, format, cfg)?;
    let result = match op {
        Op::Union => robust::union(&ga, &gb, cfg),
        Op::Intersection => robust::intersection(&ga, &gb, cfg),
        Op::Difference => robust::difference(&ga, &gb, cfg),
    }
    .with_context(|| format!("{op:?} failed"))?;
    let params = json!({
        "action": "op",
        "op": format!("{op:?}"),
        "a": a.to_string_lossy(),
        "b": b.to_string_lossy(),
    });
    emit(&encode(&result, format, cfg), matches!(format, Format::Wkb), out, params, cfg)
}

fn check(predicate: Predicate, a: &Path, b: &Path, format: Format, tolerance: f64, cfg: &GeoCfg) -> Result<bool> {
    let ga = read_geometry(a, format, cfg)?;
    let gb = read_geometry(b, format, cfg)?;
    let holds = match predicate {
        Predicate::Intersects => robust::intersects(&ga, &gb, tolerance, cfg)?,
        Predicate::OverDeviation => robust::is_intersection_over_deviation(&ga, &gb, tolerance, cfg)?,
        Predicate::Covers => robust::covers(&ga, &gb, tolerance, cfg)?,
        Predicate::CoverInDeviation => robust::is_cover_in_deviation(&ga, &gb, tolerance, cfg)?,
        Predicate::Contains => robust::contains(Some(&ga), Some(&gb)),
    };
    tracing::info!(?predicate, tolerance, holds, "check");
    Ok(holds)
}

fn read_points(input: &Path, lon_col: &str, lat_col: &str, cfg: &GeoCfg) -> Result<Vec<Point>> {
    let df = LazyCsvReader::new(input)
        .with_infer_schema_length(Some(100))
        .finish()?
        .select([
            col(lon_col).cast(DataType::Float64),
            col(lat_col).cast(DataType::Float64),
        ])
        .collect()?;
    tracing::info!(rows = df.height(), cols = df.width(), "input_csv_shape");
    let lon = df.column(lon_col)?.f64()?;
    let lat = df.column(lat_col)?.f64()?;
    let mut points = Vec::with_capacity(df.height());
    for (i, (x, y)) in lon.into_iter().zip(lat.into_iter()).enumerate() {
        match (x, y) {
            (Some(x), Some(y)) => points.push(geoops::bridge::create_point(x, y, cfg)),
            _ => bail!("row {i}: missing {lon_col}/{lat_col}"),
        }
    }
    Ok(points)
}

fn run_cluster(
    input: &Path,
    lon_col: &str,
    lat_col: &str,
    distance: f64,
    anchor: Anchor,
    out: Option<&Path>,
    cfg: &GeoCfg,
) -> Result<()> {
    tracing::info!(input = %input.display(), distance, ?anchor, "cluster");
    let points = read_points(input, lon_col, lat_col, cfg)?;
    let groups = match anchor {
        Anchor::First => cluster::group_by_distance(&points, distance),
        Anchor::Centroid => cluster::group_by_centroid_distance(&points, distance),
    };
    let doc = json!({
        "groups": groups
            .iter()
            .map(|g| -> Result<serde_json::Value> {
                let geometry: serde_json::Value =
                    serde_json::from_str(&write_geojson(&Geometry::MultiPoint(g.clone()), cfg))?;
                Ok(json!({ "size": g.0.len(), "geometry": geometry }))
            })
            .collect::<Result<Vec<_>>>()?,
    });
    let params = json!({
        "action": "cluster",
        "input": input.to_string_lossy(),
        "points": points.len(),
        "distance_m": distance,
        "anchor": format!("{anchor:?}"),
    });
    emit(&serde_json::to_vec_pretty(&doc)?, false, out, params, cfg)
}

fn hex_cell(point: &str, res: u8, cfg: &GeoCfg) -> Result<()> {
    let p = BasePoint::from_lon_lat_str(point)?;
    let id = hex::cell_of(&p, res)?;
    let outline = hex::cell_polygon(id, cfg)?;
    let center = hex::center_point(id)?;
    let doc = json!({
        "cell": hex::code_from_cell(id)?,
        "center": center.to_lon_lat_string(),
        "polygon": serde_json::from_str::<serde_json::Value>(&write_geojson(&Geometry::Polygon(outline), cfg))?,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn report(cfg: &GeoCfg) -> Result<()> {
    let obj = json!({
        "code_rev": provenance::current_git_rev(),
        "version": geoops::VERSION,
        "cfg": cfg,
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn config_file_overrides_only_given_keys() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cfg.json");
        fs::write(&path, r#"{"omit_tolerance": 0.01}"#).unwrap();
        let cfg = load_cfg(Some(&path)).unwrap();
        assert_eq!(cfg.omit_tolerance, 0.01);
        assert_eq!(cfg.buffer_tolerance, GeoCfg::default().buffer_tolerance);
        assert_eq!(load_cfg(None).unwrap(), GeoCfg::default());
    }

    #[test]
    fn convert_writes_artifact_and_sidecar() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("square.wkt");
        fs::write(&input, "POLYGON((0 0,1 0,1 1,0 1,0 0))\n").unwrap();
        let out = dir.path().join("square.wkb");
        let cfg = GeoCfg::default();
        convert(&input, Format::Wkt, Format::Wkb, Some(&out), &cfg).unwrap();
        let back = read_geometry(&out, Format::Wkb, &cfg).unwrap();
        assert_eq!(back, read_geometry(&input, Format::Wkt, &cfg).unwrap());
        assert!(dir.path().join("square.provenance.json").exists());
    }

    #[test]
    fn overlay_and_check_agree() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.wkt");
        let b = dir.path().join("b.wkt");
        fs::write(&a, "POLYGON((0 0,2 0,2 2,0 2,0 0))").unwrap();
        fs::write(&b, "POLYGON((1 0,3 0,3 2,1 2,1 0))").unwrap();
        let cfg = GeoCfg::default();
        let out = dir.path().join("u.wkt");
        overlay(Op::Union, &a, &b, Format::Wkt, Some(&out), &cfg).unwrap();
        assert!(read_geometry(&out, Format::Wkt, &cfg).is_ok());
        assert!(check(Predicate::Intersects, &a, &b, Format::Wkt, 0.4, &cfg).unwrap());
        assert!(!check(Predicate::Covers, &a, &b, Format::Wkt, 0.01, &cfg).unwrap());
    }

    #[test]
    fn cluster_reads_csv_points() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("pts.csv");
        fs::write(&input, "id,lon,lat\n1,0.0,0.0\n2,0.0,0.001\n3,0.0,0.01\n").unwrap();
        let cfg = GeoCfg::default();
        let points = read_points(&input, "lon", "lat", &cfg).unwrap();
        assert_eq!(points.len(), 3);
        let out = dir.path().join("groups.json");
        run_cluster(&input, "lon", "lat", 150.0, Anchor::First, Some(&out), &cfg).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&fs::read(&out).unwrap()).unwrap();
        assert_eq!(doc["groups"].as_array().unwrap().len(), 2);
        assert_eq!(doc["groups"][0]["size"], 2);
    }
}
