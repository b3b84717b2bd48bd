use clap::{Parser, Subcommand};
use color_eyre::Result;
use env_logger::Env;
use log::{info, LevelFilter};
use std::path::PathBuf;

use dctopo::config::{Config, GeneralConfig, OutputConfig, OutputFormat, TopologyParams};
use dctopo::{config_loader, orchestrator};

/// Generate datacenter network topologies
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file; the topology is printed to stdout if omitted
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output format; inferred from the output extension if omitted
    #[arg(short, long, value_enum, global = true)]
    format: Option<OutputFormat>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// k-ary fat-tree
    FatTree {
        /// Switch port count, a positive even number
        #[arg(long, allow_negative_numbers = true)]
        k: i64,
    },
    /// Core/edge mesh with servers under each edge switch
    TwoTier {
        #[arg(long = "core", allow_negative_numbers = true)]
        n_core: i64,
        #[arg(long = "edge", allow_negative_numbers = true)]
        n_edge: i64,
        /// Servers per edge switch
        #[arg(long = "servers", allow_negative_numbers = true)]
        n_servers: i64,
    },
    /// Core/aggregation mesh over a strict edge hierarchy
    ThreeTier {
        #[arg(long = "core", allow_negative_numbers = true)]
        n_core: i64,
        #[arg(long = "agg", allow_negative_numbers = true)]
        n_agg: i64,
        #[arg(long = "edge-per-agg", allow_negative_numbers = true)]
        n_edge_per_agg: i64,
        #[arg(long = "servers-per-edge", allow_negative_numbers = true)]
        n_servers_per_edge: i64,
    },
    /// BCube(n, k)
    Bcube {
        /// Switch port count
        #[arg(long, allow_negative_numbers = true)]
        n: i64,
        /// Highest level
        #[arg(long, allow_negative_numbers = true)]
        k: i64,
    },
    /// Run a YAML job file
    Run {
        #[arg(short, long)]
        config: PathBuf,
    },
}

impl Command {
    /// The job this subcommand describes; `run` loads it from YAML
    fn job(&self) -> Result<Config> {
        let topology = match *self {
            Command::Run { ref config } => return config_loader::load_config(config),
            Command::FatTree { k } => TopologyParams::FatTree { k },
            Command::TwoTier {
                n_core,
                n_edge,
                n_servers,
            } => TopologyParams::TwoTier {
                n_core,
                n_edge,
                n_servers,
            },
            Command::ThreeTier {
                n_core,
                n_agg,
                n_edge_per_agg,
                n_servers_per_edge,
            } => TopologyParams::ThreeTier {
                n_core,
                n_agg,
                n_edge_per_agg,
                n_servers_per_edge,
            },
            Command::Bcube { n, k } => TopologyParams::Bcube { n, k },
        };
        Ok(Config {
            general: GeneralConfig::default(),
            topology,
            links: None,
            output: OutputConfig::default(),
        })
    }
}

/// Turn the command line into a job. Command-line output settings override
/// the ones in a job file.
fn job_from_args(args: &Args) -> Result<Config> {
    let mut config = args.command.job()?;

    if let Some(path) = &args.output {
        config.output.path = Some(path.clone());
    }
    if let Some(format) = args.format {
        config.output.format = Some(format);
    }
    config.validate()?;
    Ok(config)
}

/// Level requested by the job file, if any
fn job_log_level(config: &Config) -> Option<LevelFilter> {
    config.general.log_level.as_deref()?.parse().ok()
}

/// Start logging at `info` before the job is loaded. Returns true when the
/// threshold may still be moved by the job, which is when RUST_LOG is unset.
fn init_logging() -> bool {
    let from_env = std::env::var_os("RUST_LOG").is_some();
    let filter = if from_env { "info" } else { "trace" };
    env_logger::Builder::from_env(Env::default().default_filter_or(filter)).init();
    if !from_env {
        log::set_max_level(LevelFilter::Info);
    }
    !from_env
}

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();
    let adjustable = init_logging();

    info!("Starting dctopo v{}", env!("CARGO_PKG_VERSION"));
    if let Command::Run { config: path } = &args.command {
        info!("Job file: {:?}", path);
    }

    let config = job_from_args(&args)?;
    if let Some(level) = job_log_level(&config).filter(|_| adjustable) {
        log::set_max_level(level);
    }

    let topology = orchestrator::run(&config)?;

    info!(
        "Done: {} nodes ({} switches, {} servers), {} links",
        topology.number_of_nodes(),
        topology.number_of_switches(),
        topology.number_of_servers(),
        topology.number_of_edges()
    );
    Ok(())
}
