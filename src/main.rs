use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::config::{Appender, Config, Root};
use log4rs::encode::pattern::PatternEncoder;
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use vpc_topology_builder::config::{read_raw_config, DEFAULT_SYNTH_ZONES};
use vpc_topology_builder::output::OutputFormat;
use vpc_topology_builder::{
    build_and_render, write_output, zone_provider, DeploymentContext, PrivateRouteTablePolicy,
    RawTopologyConfig, TopologyConfig, ZoneSource,
};

const LOG_CONFIG_FILE: &str = "log4rs.yml";

/// Derive a standard VPC topology and emit it for a provisioning backend.
#[derive(Parser, Debug)]
#[command(name = "vpc-topology-builder", version)]
struct Args {
    /// JSON topology config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Project name; overrides the config file.
    #[arg(short, long)]
    project: Option<String>,

    /// Deployment region; falls back to AWS_REGION, then AWS_DEFAULT_REGION.
    #[arg(short, long, env = "CDK_DEFAULT_REGION")]
    region: Option<String>,

    /// Deployment account id; falls back to AWS_ACCOUNT_ID.
    #[arg(long, env = "CDK_DEFAULT_ACCOUNT")]
    account: Option<String>,

    /// Comma-separated availability zones, e.g. eu-west-1a,eu-west-1b,eu-west-1c.
    #[arg(short, long, conflicts_with = "aws_lookup")]
    zones: Option<String>,

    /// Look zones up with the AWS CLI.
    #[arg(long)]
    aws_lookup: bool,

    /// AWS CLI profile for the zone lookup.
    #[arg(long, requires = "aws_lookup")]
    profile: Option<String>,

    /// Directory for the daily zone cache.
    #[arg(long, requires = "aws_lookup")]
    cache_dir: Option<PathBuf>,

    /// One private route table per private subnet instead of a fixed three.
    #[arg(long)]
    per_subnet_route_tables: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Graph)]
    format: OutputFormat,

    /// Output file; stdout when omitted.
    #[arg(short, long)]
    out: Option<PathBuf>,
}

fn init_logging() -> Result<(), Box<dyn Error>> {
    if Path::new(LOG_CONFIG_FILE).exists() {
        log4rs::init_file(LOG_CONFIG_FILE, Default::default())?;
        return Ok(());
    }
    // stdout carries the rendered graph
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new(
            "{d(%H:%M:%S)} {h({l:5})} {t} - {m}{n}",
        )))
        .build();
    let config = Config::builder()
        .appender(Appender::builder().build("stderr", Box::new(stderr)))
        .build(Root::builder().appender("stderr").build(LevelFilter::Info))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let mut raw = match &args.config {
        Some(path) => read_raw_config(path)?,
        None => RawTopologyConfig::default(),
    };
    if let Some(project) = args.project {
        raw.project_name = project;
    }
    if args.per_subnet_route_tables {
        raw.private_route_tables = PrivateRouteTablePolicy::PerSubnet;
    }
    let config = TopologyConfig::from_raw(raw)?;

    let region = args.region.as_deref().map(str::trim).filter(|r| !r.is_empty());
    let mut context = match region {
        Some(region) => DeploymentContext::new(region)?,
        None => DeploymentContext::from_env()?,
    };
    if let Some(account) = args.account.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        context = context.with_account(account);
    }

    let source = match (args.zones, args.aws_lookup) {
        (Some(list), _) => ZoneSource::List(list),
        (None, true) => ZoneSource::AwsCli {
            profile: args.profile,
            cache_dir: args.cache_dir,
        },
        (None, false) => ZoneSource::Synthesized(DEFAULT_SYNTH_ZONES.max(config.zone_slots())),
    };
    let zones = zone_provider(&source)?;

    let text = build_and_render(&config, context, &*zones, args.format)?;
    write_output(&text, args.out.as_deref())
}

fn main() -> ExitCode {
    // Do as little as possible in main.rs as it can't contain any tests
    dotenv::dotenv().ok();
    let args = Args::parse();
    if let Err(e) = init_logging() {
        eprintln!("Error initializing log4rs: {e}");
        return ExitCode::FAILURE;
    }
    log::info!("#Start main()");

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
