use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use futures::{Stream, StreamExt, stream};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use gke_audit_collector::{ClusterData, DataCollector};
use gke_audit_config::{ClusterDef, Config};
use gke_audit_input::SharedInput;
use gke_audit_inputs::{GkeLocalInput, MetricQuery, MetricsInputBuilder, RestInput};

/// gke-audit - collect GKE cluster data from multiple inputs for policy evaluation
#[derive(Parser)]
#[command(name = "gke-audit")]
#[command(version, about, long_about = None)]
struct Cli {
  /// Log at debug level unless RUST_LOG is set
  #[arg(long, short, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
  /// Collect data for every configured cluster from every enabled input
  Collect {
    /// Path to the config file (JSON)
    #[arg(long, short)]
    config: PathBuf,

    /// Override the collector's maximum number of workers
    #[arg(long)]
    workers: Option<usize>,

    /// Write the collected data to this file instead of stdout
    #[arg(long, short)]
    output: Option<PathBuf>,
  },

  /// List the enabled inputs
  Inputs {
    /// Path to the config file (JSON)
    #[arg(long, short)]
    config: PathBuf,
  },
}

fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);

  match cli.command {
    Some(Commands::Collect {
      config,
      workers,
      output,
    }) => run_collect(config, workers, output),
    Some(Commands::Inputs { config }) => run_inputs(config),
    None => {
      println!("gke-audit - use --help to see available commands");
      Ok(())
    }
  }
}

fn init_tracing(verbose: bool) {
  let default_level = if verbose { "debug" } else { "info" };
  tracing_subscriber::registry()
    .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_level.into()))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();
}

fn load_config(path: &Path, workers: Option<usize>) -> Result<Config> {
  let mut config = Config::load(path)
    .with_context(|| format!("failed to load config file: {}", path.display()))?;
  if workers.is_some() {
    config.collector.max_workers = workers;
  }
  config.apply_defaults();
  config.validate().context("configuration is not valid")?;
  Ok(config)
}

fn run_inputs(config_file: PathBuf) -> Result<()> {
  let config = load_config(&config_file, None)?;
  for input in build_inputs(&config)? {
    println!("{}: {}", input.id(), input.description());
  }
  Ok(())
}

fn run_collect(config_file: PathBuf, workers: Option<usize>, output: Option<PathBuf>) -> Result<()> {
  let config = load_config(&config_file, workers)?;
  let rt = tokio::runtime::Runtime::new()?;
  rt.block_on(async { run_collect_async(config, output).await })
}

async fn run_collect_async(config: Config, output: Option<PathBuf>) -> Result<()> {
  let cluster_ids = resolve_cluster_ids(&config).await?;
  let inputs = build_inputs(&config)?;
  info!(
    clusters = cluster_ids.len(),
    inputs = inputs.len(),
    "starting collection"
  );

  let cancel = CancellationToken::new();
  let interrupts = Box::pin(stream::unfold((), |()| async {
    tokio::signal::ctrl_c().await.ok().map(|_| ((), ()))
  }));
  let interrupt_cancel = cancel.clone();
  let interrupt = tokio::spawn(async move {
    if handle_interrupts(interrupts, interrupt_cancel).await {
      error!("second interrupt received, exiting");
      std::process::exit(130);
    }
  });

  let outcome = collect_and_write(&config, &inputs, &cluster_ids, cancel, output.as_deref()).await;
  interrupt.abort();
  outcome
}

async fn collect_and_write(
  config: &Config,
  inputs: &[SharedInput],
  cluster_ids: &[String],
  cancel: CancellationToken,
  output: Option<&Path>,
) -> Result<()> {
  let collector = DataCollector::new(config.collector.to_collector_config());
  let result = collector
    .collect_with_cancel(inputs, cluster_ids, cancel)
    .await;

  for input in inputs {
    if let Err(e) = input.close().await {
      warn!(input_id = %input.id(), error = %e, "failed to close input");
    }
  }

  for e in &result.errors {
    error!(cluster_id = %e.cluster_id, input_id = %e.input_id, error = %e.source, "collection error");
  }
  let count = result.errors.len();
  if let Some(first) = result.errors.into_iter().next() {
    return Err(
      anyhow::Error::new(first).context(format!("collection finished with {} error(s)", count)),
    );
  }

  write_output(&result.clusters, output).await
}

/// Cancel on the first interrupt. Returns `true` once a second interrupt
/// arrives, `false` if the interrupt stream ends first.
async fn handle_interrupts<S>(mut interrupts: S, cancel: CancellationToken) -> bool
where
  S: Stream<Item = ()> + Unpin,
{
  if interrupts.next().await.is_none() {
    return false;
  }
  warn!("interrupt received, cancelling collection (interrupt again to exit)");
  cancel.cancel();
  interrupts.next().await.is_some()
}

async fn write_output(
  clusters: &HashMap<String, ClusterData>,
  output: Option<&Path>,
) -> Result<()> {
  // clusters sorted by id, inputs within a cluster by input id
  let sorted: BTreeMap<_, _> = clusters.iter().collect();
  let json = serde_json::to_string_pretty(&sorted)?;

  match output {
    Some(path) => {
      tokio::fs::write(path, json)
        .await
        .with_context(|| format!("failed to write output file: {}", path.display()))?;
      eprintln!("Wrote data for {} cluster(s) to {}", sorted.len(), path.display());
    }
    None => println!("{}", json),
  }
  Ok(())
}

/// Cluster ids from the dump file when one is configured, otherwise from the
/// configured cluster list.
async fn resolve_cluster_ids(config: &Config) -> Result<Vec<String>> {
  if let Some(dump_file) = &config.dump_file {
    return GkeLocalInput::new(dump_file)
      .cluster_names()
      .await
      .with_context(|| format!("failed to read cluster names from dump file: {}", dump_file));
  }
  Ok(
    config
      .clusters
      .iter()
      .filter_map(ClusterDef::cluster_id)
      .collect(),
  )
}

fn build_inputs(config: &Config) -> Result<Vec<SharedInput>> {
  let mut inputs: Vec<SharedInput> = Vec::new();

  if let Some(def) = config.inputs.gke_local.as_ref().filter(|i| i.enabled) {
    let file = def.file.as_ref().context("gkeLocal input has no file")?;
    inputs.push(Arc::new(GkeLocalInput::new(file)));
  }

  if let Some(def) = config.inputs.rest.as_ref().filter(|i| i.enabled) {
    let endpoint = def.endpoint.as_ref().context("rest input has no endpoint")?;
    let input = RestInput::new(endpoint).context("failed to create rest input")?;
    inputs.push(Arc::new(input));
  }

  if let Some(def) = config.inputs.metrics_api.as_ref().filter(|i| i.enabled) {
    let address = def.address.as_ref().context("metricsAPI input has no address")?;
    let queries = def
      .metrics
      .iter()
      .map(|m| MetricQuery::new(&m.name, &m.query))
      .collect();
    let mut builder = MetricsInputBuilder::new(address, queries);
    if let (Some(username), Some(password)) = (&def.username, &def.password) {
      builder = builder.with_credentials(username, password);
    }
    if let Some(max_queries) = def.max_queries {
      builder = builder.with_max_queries(max_queries);
    }
    let input = builder.build().context("failed to create metricsAPI input")?;
    inputs.push(Arc::new(input));
  }

  Ok(inputs)
}
