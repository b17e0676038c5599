//! Curated surface for callers (the CLI, benches, integration tests).
//!
//! Important
//! - Not a stable API. Prefer these re-exports over reaching into submodules
//!   so call sites read the same across the workspace.

// Planning
pub use crate::plan::{plan, HoleInput, PlanCfg, PlanOptions, PlanOutput, PlanRequest};
// Graph and persistence
pub use crate::graph::{
    assemble, edge_weight, should_connect, AssemblyCfg, AssemblyInput, EdgeCfg, HoleTarget,
    PoseGraph, PoseNode, PoseRecord, PoseType,
};
// Queries
pub use crate::path::{GraphHandle, NamedKey, NamedNode, PathFinder, PathPose};
// Stages
pub use crate::candidate::{generate as generate_candidate, Candidate, CandidateCfg};
pub use crate::fit::{fit_all_streets, fit_curve, FitCfg};
pub use crate::sampler::{sample_features, FeatureKind, SamplerCfg, SiteObstacles};
// Plumbing
pub use crate::error::{GraphLoadError, HoleId, NodeId, PlanError, QueryError};
pub use crate::progress::{NoProgress, Progress, ProgressSink};
