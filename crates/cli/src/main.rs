use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use drillroute::api::{plan, GraphHandle, PathFinder, PlanCfg, PlanOptions, PlanRequest};
use serde_json::{json, Value};
use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

mod events;
mod plan_io;
mod provenance;

use events::{EventStream, ProgressEvent};
use provenance::PlanProvenance;

#[derive(Parser)]
#[command(name = "drillroute")]
#[command(about = "Plan drill-rig pose graphs and query routes over them")]
struct Cmd {
    /// Log per-stage details
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    action: Action,
}

#[derive(Args, Debug)]
struct PlanFlags {
    /// Smooth streets away from holes and obstacles before sampling
    #[arg(long)]
    fit_streets: bool,
    /// Prune colliding points and fit a second time
    #[arg(long)]
    fit_twice: bool,
    #[arg(long)]
    use_obstacles: bool,
    #[arg(long)]
    use_high_obstacles: bool,
    #[arg(long = "use-transit")]
    use_transit_streets: bool,
}

impl From<&PlanFlags> for PlanOptions {
    fn from(f: &PlanFlags) -> Self {
        PlanOptions {
            fit_streets: f.fit_streets,
            fit_twice: f.fit_twice,
            use_obstacles: f.use_obstacles,
            use_high_obstacles: f.use_high_obstacles,
            use_transit_streets: f.use_transit_streets,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Build the pose graph for a site and write it as CSV
    Plan {
        /// JSON planning request
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "global_plan.csv")]
        out: PathBuf,
        #[command(flatten)]
        flags: PlanFlags,
        /// Stream NDJSON progress/result/error events on stdout
        #[arg(long)]
        events: bool,
    },
    /// Cheapest route between two node ids of a saved plan
    Path {
        #[arg(long)]
        graph: PathBuf,
        #[arg(long)]
        start: usize,
        #[arg(long)]
        goal: usize,
    },
    /// List home and drill-hole nodes of a saved plan
    Nodes {
        #[arg(long)]
        graph: PathBuf,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    let level = if cmd.verbose { Level::DEBUG } else { Level::INFO };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
    match cmd.action {
        Action::Plan {
            input,
            out,
            flags,
            events,
        } => {
            let stream = EventStream::new(std::io::stdout().lock(), events);
            run_plan(&input, &out, &flags, &stream)
        }
        Action::Path { graph, start, goal } => path(&graph, start, goal),
        Action::Nodes { graph } => nodes(&graph),
        Action::Report => report(),
    }
}

fn read_request(input: &Path) -> Result<PlanRequest> {
    let file = File::open(input).with_context(|| format!("opening {}", input.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parsing planning request {}", input.display()))
}

fn run_plan<W: Write>(
    input: &Path,
    out: &Path,
    flags: &PlanFlags,
    stream: &EventStream<W>,
) -> Result<()> {
    tracing::info!(input = %input.display(), out = %out.display(), ?flags, "plan");
    match plan_to_files(input, out, &PlanOptions::from(flags), stream) {
        Ok(payload) => {
            stream.emit(&ProgressEvent::Result { payload });
            Ok(())
        }
        Err(err) => {
            stream.emit(&ProgressEvent::Error {
                message: format!("{err:#}"),
            });
            Err(err)
        }
    }
}

/// Plan, write the CSV and its sidecar, and describe both for the result event.
fn plan_to_files<W: Write>(
    input: &Path,
    out: &Path,
    options: &PlanOptions,
    stream: &EventStream<W>,
) -> Result<Value> {
    let request = read_request(input)?;
    let sink = |value: f64| stream.emit(&ProgressEvent::Progress { value });
    let output = plan(&request, options, &PlanCfg::default(), &sink)?;

    plan_io::write_plan_csv(out, &output.graph.to_records())?;
    let provenance = PlanProvenance::new(input, &request, options, &output, out);
    let sidecar = provenance.write()?;
    tracing::info!(nodes = provenance.nodes, edges = provenance.edges, "plan done");
    Ok(json!({
        "graph": out.to_string_lossy(),
        "provenance": sidecar.to_string_lossy(),
        "nodes": provenance.nodes,
        "edges": provenance.edges,
        "holes": provenance.holes_kept,
    }))
}

fn load(graph: &Path) -> Result<GraphHandle> {
    let records = plan_io::read_plan_csv(graph)?;
    let finder = PathFinder::from_records(&records)
        .with_context(|| format!("loading pose graph {}", graph.display()))?;
    let handle = GraphHandle::new();
    handle.load(finder);
    Ok(handle)
}

fn path(graph: &Path, start: usize, goal: usize) -> Result<()> {
    let handle = load(graph)?;
    let route = handle.find_path(start, goal)?;
    if route.is_none() {
        tracing::info!(start, goal, "no route between nodes");
    }
    println!("{}", serde_json::to_string_pretty(&route)?);
    Ok(())
}

fn nodes(graph: &Path) -> Result<()> {
    let handle = load(graph)?;
    println!("{}", serde_json::to_string_pretty(&handle.list_named_nodes()?)?);
    Ok(())
}

fn report() -> Result<()> {
    let obj = json!({
        "code_rev": provenance::code_revision(),
        "version": drillroute::VERSION,
        "params": PlanOptions::default(),
        "outputs": []
    });
    println!("{}", serde_json::to_string_pretty(&obj)?);
    Ok(())
}
