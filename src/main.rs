use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};

use podcost::config::{self, Config};
use podcost::report::{self, OutputFormat};
use podcost::{
    exit_codes, logging, Estimator, InstanceCatalog, NodeSizer, PerTaskRates, PodFootprint,
    RawRequest, Tier, TierUsage,
};

#[derive(Parser)]
#[command(name = "podcost")]
#[command(
    about = "Monthly cost estimator for container workloads",
    long_about = "podcost compares the monthly cost of running a pod fleet on two billing models.\n\nModels:\n  - Per task: each pod billed per vCPU-hour and GiB-hour\n  - Cluster: cheapest instance type from a pricing catalog, billed per node,\n    plus control-plane fee and an always-on core node pool\n\nUsage is described in three daily tiers: peak, normal and off-hours."
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json, csv)
    #[arg(long, global = true, default_value = "text")]
    output: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Estimate monthly cost under both billing models
    Estimate {
        /// vCPUs per pod (unparseable values count as 0)
        #[arg(long)]
        pod_cpu: String,
        /// Memory per pod in GiB
        #[arg(long)]
        pod_mem: String,
        /// Pods running during peak hours
        #[arg(long)]
        peak_pods: String,
        /// Peak hours per day
        #[arg(long)]
        peak_hours: String,
        /// Pods running during normal hours
        #[arg(long)]
        normal_pods: Option<String>,
        /// Normal hours per day
        #[arg(long)]
        normal_hours: Option<String>,
        /// Pods running during off-hours
        #[arg(long)]
        off_hours_pods: Option<String>,
        /// Off-hours per day
        #[arg(long)]
        off_hours: Option<String>,
        /// Pricing catalog CSV (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,
        /// Price-list document with the per-vCPU-hour price
        #[arg(long, requires = "memory_price_list")]
        vcpu_price_list: Option<PathBuf>,
        /// Price-list document with the per-GiB-hour price
        #[arg(long, requires = "vcpu_price_list")]
        memory_price_list: Option<PathBuf>,
    },
    /// Size a single tier against the catalog
    Size {
        /// vCPUs per pod
        #[arg(long)]
        pod_cpu: Decimal,
        /// Memory per pod in GiB
        #[arg(long)]
        pod_mem: Decimal,
        /// Number of pods
        #[arg(long)]
        pods: u32,
        /// Hours per day
        #[arg(long, default_value_t = 24)]
        hours: u32,
        /// Tier the pods run in (peak, normal, off-hours)
        #[arg(long, default_value = "peak")]
        tier: Tier,
        /// Pricing catalog CSV (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// List the instance types in the pricing catalog
    Catalog {
        /// Pricing catalog CSV (overrides config)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },
    /// Initialize configuration
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = ".podcost.toml")]
        output: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(exit_codes::exit_code_for_anyhow(&e));
    }
}

fn run(cli: Cli) -> Result<()> {
    // Load config
    let config = Config::load(cli.config.as_deref())?;
    logging::init(cli.verbose, &config.logging);

    let format: OutputFormat = cli.output.parse()?;

    // Execute command
    match cli.command {
        Commands::Estimate {
            pod_cpu,
            pod_mem,
            peak_pods,
            peak_hours,
            normal_pods,
            normal_hours,
            off_hours_pods,
            off_hours,
            catalog,
            vcpu_price_list,
            memory_price_list,
        } => {
            let raw = RawRequest {
                pod_cpu: Some(pod_cpu),
                pod_mem: Some(pod_mem),
                peak_pods: Some(peak_pods),
                peak_hours: Some(peak_hours),
                normal_pods,
                normal_hours,
                off_hours_pods,
                off_hours,
            };
            let request = raw.coerce()?;

            let rates = match (vcpu_price_list, memory_price_list) {
                (Some(cpu), Some(mem)) => PerTaskRates::from_price_lists(&cpu, &mem)?,
                _ => config.per_task,
            };

            let catalog = load_catalog(catalog.as_deref(), &config)?;
            let estimator = Estimator::new(&catalog, config.cluster.clone(), rates);
            let estimate = estimator
                .estimate(&request)
                .context("Failed to calculate cluster costs")?;
            println!("{}", report::render(&estimate, format)?);
        }
        Commands::Size {
            pod_cpu,
            pod_mem,
            pods,
            hours,
            tier,
            catalog,
        } => {
            let footprint = PodFootprint::new(pod_cpu, pod_mem)?;
            let catalog = load_catalog(catalog.as_deref(), &config)?;
            let result =
                NodeSizer::new(&catalog).size_tier(tier, &footprint, TierUsage::new(pods, hours))?;
            println!("{}", report::render_sizing(&result, format)?);
        }
        Commands::Catalog { catalog } => {
            let catalog = load_catalog(catalog.as_deref(), &config)?;
            println!("{}", report::render_catalog_as(&catalog, format)?);
        }
        Commands::Init { output } => {
            config::init_config(&output)?;
        }
    }

    Ok(())
}

fn load_catalog(path: Option<&Path>, config: &Config) -> Result<InstanceCatalog> {
    let path = path.unwrap_or(config.catalog.path.as_path());
    let catalog = InstanceCatalog::load(path)
        .with_context(|| format!("Failed to load pricing catalog: {}", path.display()))?;
    if catalog.is_empty() {
        eprintln!(
            "WARNING: No usable instance types in {}; cluster estimates will fail.",
            path.display()
        );
    }
    Ok(catalog)
}
