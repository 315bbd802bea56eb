use clap::{Parser, Subcommand};
use itertools::Itertools;
use mm_diagram::layout::LineKind;
use mm_diagram::types::{assertion_type_name, ProofNode};
use mm_diagram::view::var_colors;
use mm_diagram::{decompress_index, LayoutConfig, ProofView, RawAssertion, StepLookup};
use serde_derive::Serialize;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

type Error = Box<dyn std::error::Error + Send + Sync>;

#[derive(Parser)]
#[command(name = "mm-diagram", version, about = "Lay out compressed Metamath proofs")]
struct Cli {
  /// JSON file with layout settings; missing keys keep their defaults
  #[arg(long, global = true)]
  config: Option<PathBuf>,
  /// Base scale the font metrics and margins are derived from
  #[arg(long, global = true)]
  scale: Option<f64>,
  #[command(subcommand)]
  cmd: Command,
}

#[derive(Subcommand)]
enum Command {
  /// Decode an assertion payload and lay out its proof steps
  Layout {
    payload: PathBuf,
    /// Keep syntactic-category hypotheses in the proof
    #[arg(long)]
    show_types: bool,
    /// Only lay out the step with this display number
    #[arg(long)]
    step: Option<usize>,
    /// Print the primitives as JSON instead of a summary
    #[arg(long)]
    json: bool,
    /// Decoding threads (default: number of CPUs)
    #[arg(short, long)]
    jobs: Option<usize>,
  },
  /// Decode an index payload and list its entries
  Index { payload: PathBuf },
}

#[derive(Serialize)]
struct StepOut<'a> {
  step: usize,
  node: &'a ProofNode,
  width: f64,
  height: f64,
  diagram: mm_diagram::Diagram,
}

fn init_logging() {
  let directive = std::env::var("MM_DIAGRAM_LOG")
    .or_else(|_| std::env::var("RUST_LOG"))
    .unwrap_or_else(|_| "warn".into());
  let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("warn"));
  tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn read_config(path: Option<&Path>, scale: Option<f64>) -> Result<LayoutConfig, Error> {
  let mut cfg = match path {
    None => LayoutConfig::default(),
    Some(path) => serde_json::from_str(&std::fs::read_to_string(path)?)?,
  };
  if let Some(scale) = scale {
    cfg.rescale(scale)
  }
  debug!(?cfg, "layout config");
  Ok(cfg)
}

fn run_layout(
  cfg: &LayoutConfig, payload: &Path, show_types: bool, step: Option<usize>, json: bool,
  jobs: Option<usize>,
) -> Result<(), Error> {
  let raw = RawAssertion::parse(&std::fs::read_to_string(payload)?)?;
  let asrt = raw.header()?;
  println!("{} {}", assertion_type_name(&asrt.ty), asrt.name);
  if !raw.has_proof() {
    info!(name = %asrt.name, "assertion has no proof");
    return Ok(())
  }

  let threads = jobs.unwrap_or_else(num_cpus::get);
  let decoded = raw.decompressor().proof_nodes_parallel(raw.records(), threads);
  let mut nodes = Vec::with_capacity(decoded.len());
  for (i, r) in decoded.into_iter().enumerate() {
    match r {
      Ok(node) => nodes.push(node),
      Err(e) => warn!(record = i, "skipping proof record: {e}"),
    }
  }
  debug!(nodes = nodes.len(), "decoded proof");

  let view = ProofView::new(&nodes, !show_types);
  let colors = var_colors(&asrt.var_types, cfg);
  let mut out = vec![];
  for (i, node) in view.steps().iter().enumerate() {
    let n = i + 1;
    if node.is_leaf() || step.is_some_and(|s| s != n) {
      continue
    }
    let diagram = match view.layout(node, &colors, cfg) {
      Ok(d) => d,
      Err(e) => {
        warn!(step = n, label = %node.label, "skipping diagram: {e}");
        continue
      }
    };
    let (width, height) = diagram.surface_size(cfg);
    if json {
      out.push(StepOut { step: n, node, width, height, diagram })
    } else {
      let hyps = node.essential_args().iter().filter_map(|&id| view.step_number(id)).join(",");
      println!(
        "{n:4}: {:<12} [{hyps}] {width:.0}x{height:.0}, {} primitives, {} connectors",
        node.label,
        diagram.primitives.len(),
        diagram.lines(LineKind::Connector).count(),
      );
    }
  }
  if json {
    println!("{}", serde_json::to_string_pretty(&out)?);
  }
  Ok(())
}

fn run_index(payload: &Path) -> Result<(), Error> {
  let index = decompress_index(&std::fs::read_to_string(payload)?)?;
  for e in &index.elems {
    let hyps = e.hypotheses.iter().map(|h| h.join(" ")).join(" & ");
    let sep = if hyps.is_empty() { "" } else { " => " };
    let ty = assertion_type_name(&e.ty);
    println!("{:6} {ty:<8} {:<16} {hyps}{sep}{}", e.id, e.label, e.expression.join(" "));
  }
  Ok(())
}

fn main() -> ExitCode {
  init_logging();
  let cli = Cli::parse();
  let res = read_config(cli.config.as_deref(), cli.scale).and_then(|cfg| match cli.cmd {
    Command::Layout { payload, show_types, step, json, jobs } =>
      run_layout(&cfg, &payload, show_types, step, json, jobs),
    Command::Index { payload } => run_index(&payload),
  });
  match res {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      eprintln!("error: {e}");
      ExitCode::FAILURE
    }
  }
}
