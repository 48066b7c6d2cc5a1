use anyhow::{Context, Result};
use geoops::GeoCfg;
use serde_json::{json, Value};
use std::ffi::OsStr;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Metadata used to generate a provenance sidecar.
pub struct Payload {
    pub params: Value,
    /// Precision and tolerances the artifact was produced under.
    pub cfg: GeoCfg,
}

impl Payload {
    pub fn new(params: Value, cfg: &GeoCfg) -> Self {
        Self { params, cfg: *cfg }
    }
}

/// Write `<artifact>.provenance.json` with the git commit, callsite, library
/// version, config, params and outputs.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let provenance_path = provenance_path(artifact);
    if let Some(parent) = provenance_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }

    let callsite = Location::caller();
    let doc = json!({
        "code_rev": current_git_rev(),
        "callsite": {
            "file": callsite.file(),
            "line": callsite.line()
        },
        "version": geoops::VERSION,
        "cfg": payload.cfg,
        "params": payload.params,
        "outputs": [artifact.to_string_lossy()]
    });
    fs::write(&provenance_path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", provenance_path.display()))?;
    Ok(provenance_path)
}

/// `dir/name.ext` becomes `dir/name.provenance.json`.
fn provenance_path(artifact: &Path) -> PathBuf {
    let mut name = artifact.file_stem().unwrap_or(OsStr::new("artifact")).to_os_string();
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// Commit the artifact was produced from. `GIT_COMMIT` wins over asking git.
pub fn current_git_rev() -> String {
    std::env::var("GIT_COMMIT")
        .ok()
        .filter(|rev| !rev.is_empty())
        .or_else(|| {
            let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
            out.status.success().then(|| String::from_utf8_lossy(&out.stdout).trim().to_string())
        })
        .unwrap_or_else(|| "unknown".to_string())
}
