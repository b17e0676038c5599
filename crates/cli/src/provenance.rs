//! `<plan>.provenance.json`: what produced a written plan.
//!
//! The sidecar sits next to the CSV and records the code revision, the
//! request and switches that went in, and the sizes of what came out, so a
//! plan can be traced without re-running the planner.

use anyhow::{Context, Result};
use drillroute::api::{PlanOptions, PlanOutput, PlanRequest};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, PartialEq, Serialize)]
pub struct PlanProvenance {
    pub code_rev: String,
    pub version: &'static str,
    pub request: String,
    pub options: PlanOptions,
    pub holes_requested: usize,
    /// Holes left after geofence and obstacle filtering.
    pub holes_kept: usize,
    pub nodes: usize,
    pub edges: usize,
    pub streets_fitted: bool,
    pub plan: String,
}

impl PlanProvenance {
    pub fn new(
        request_path: &Path,
        request: &PlanRequest,
        options: &PlanOptions,
        output: &PlanOutput,
        plan: &Path,
    ) -> Self {
        Self {
            code_rev: code_revision(),
            version: drillroute::VERSION,
            request: request_path.to_string_lossy().into_owned(),
            options: *options,
            holes_requested: request.holes.len(),
            holes_kept: output.holes.len(),
            nodes: output.graph.len(),
            edges: output.graph.edges.len(),
            streets_fitted: options.fit_streets,
            plan: plan.to_string_lossy().into_owned(),
        }
    }

    /// Write the sidecar next to the plan and return its path.
    pub fn write(&self) -> Result<PathBuf> {
        let path = sidecar_path(Path::new(&self.plan));
        let doc = serde_json::to_vec_pretty(self)?;
        fs::write(&path, doc).with_context(|| format!("writing {}", path.display()))?;
        Ok(path)
    }
}

/// `site/global_plan.csv` becomes `site/global_plan.provenance.json`.
pub fn sidecar_path(plan: &Path) -> PathBuf {
    plan.with_extension("provenance.json")
}

/// Commit the binary describes: `GIT_COMMIT` (build time, then run time),
/// else the checkout's `HEAD`, else `"unknown"`.
pub fn code_revision() -> String {
    option_env!("GIT_COMMIT")
        .map(str::to_owned)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|rev| !rev.is_empty())
        .or_else(git_head)
        .unwrap_or_else(|| "unknown".to_owned())
}

fn git_head() -> Option<String> {
    let out = Command::new("git").args(["rev-parse", "HEAD"]).output().ok()?;
    if !out.status.success() {
        return None;
    }
    let rev = String::from_utf8(out.stdout).ok()?;
    let rev = rev.trim();
    (!rev.is_empty()).then(|| rev.to_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use drillroute::api::{HoleInput, PoseGraph};
    use drillroute::prelude::{Polygon, Vec2};
    use serde_json::Value;
    use tempfile::tempdir;

    fn hole(id: i64, x: f64) -> HoleInput {
        HoleInput { id, x, y: 5.0 }
    }

    #[test]
    fn sidecar_sits_next_to_the_plan() {
        let derived = sidecar_path(Path::new("/tmp/site-a/global_plan.csv"));
        assert_eq!(derived, Path::new("/tmp/site-a/global_plan.provenance.json"));
        assert_eq!(sidecar_path(Path::new("plan")), Path::new("plan.provenance.json"));
    }

    #[test]
    fn sidecar_records_request_switches_and_sizes() {
        let dir = tempdir().unwrap();
        let plan = dir.path().join("global_plan.csv");
        let request = PlanRequest {
            geofence: Polygon::rect(0.0, 0.0, 20.0, 20.0),
            home: [Vec2::new(1.0, 1.0), Vec2::new(2.0, 1.0)],
            streets: Vec::new(),
            transit_streets: Vec::new(),
            holes: vec![hole(3, 10.0), hole(4, 40.0)],
            low_obstacles: Vec::new(),
            high_obstacles: Vec::new(),
        };
        let options = PlanOptions {
            fit_streets: true,
            ..PlanOptions::default()
        };
        let output = PlanOutput {
            graph: PoseGraph::default(),
            streets: Vec::new(),
            holes: vec![hole(3, 10.0)],
        };

        let prov = PlanProvenance::new(Path::new("site.json"), &request, &options, &output, &plan);
        let path = prov.write().unwrap();
        assert_eq!(path, dir.path().join("global_plan.provenance.json"));

        let parsed: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(parsed["request"], "site.json");
        assert_eq!(parsed["plan"], plan.to_string_lossy().as_ref());
        assert_eq!(parsed["options"]["fit_streets"], true);
        assert_eq!(parsed["options"]["use_obstacles"], false);
        assert_eq!(parsed["holes_requested"], 2);
        assert_eq!(parsed["holes_kept"], 1);
        assert_eq!(parsed["nodes"], 0);
        assert_eq!(parsed["streets_fitted"], true);
        assert_eq!(parsed["version"], drillroute::VERSION);
        assert!(!parsed["code_rev"].as_str().unwrap().is_empty());
    }
}
