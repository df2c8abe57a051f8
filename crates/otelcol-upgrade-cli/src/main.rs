use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, Command};
use otelcol_upgrade::{
    EventRecorder, MemoryRecorder, TracingRecorder, UpgradeConfig, VersionRegistry, VersionUpgrade,
};
use otelcol_upgrade_cli::{render, FileStore};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("otelcol-upgrade")
        .version(otelcol_upgrade::VERSION)
        .about("Upgrade managed OpenTelemetry Collector resources to the latest version")
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter directive, defaults to RUST_LOG or info"),
        )
        .subcommand(Command::new("versions").about("List registered versions, oldest first"))
        .subcommand(
            Command::new("upgrade")
                .about("Upgrade every managed collector in a CollectorList file")
                .arg(
                    Arg::new("file")
                        .long("file")
                        .short('f')
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("YAML file holding a CollectorList"),
                )
                .arg(
                    Arg::new("config")
                        .long("config")
                        .value_parser(value_parser!(PathBuf))
                        .help("Upgrade engine configuration (YAML or TOML)"),
                )
                .arg(
                    Arg::new("strict")
                        .long("strict")
                        .action(ArgAction::SetTrue)
                        .help("Fail collectors recorded at an unregistered version"),
                )
                .arg(
                    Arg::new("stream-events")
                        .long("stream-events")
                        .action(ArgAction::SetTrue)
                        .help("Log audit events as they happen instead of listing them in the report"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the upgraded collectors instead of writing the file"),
                ),
        )
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    let filter = match matches.get_one::<String>("log-level") {
        Some(level) => EnvFilter::try_new(level).ok(),
        None => EnvFilter::try_from_default_env().ok(),
    }
    .unwrap_or_else(|| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let registry = Arc::new(VersionRegistry::with_defaults()?);

    match matches.subcommand() {
        Some(("versions", _)) => {
            let latest = registry.latest().tag();
            for tag in registry.tags() {
                if tag == latest {
                    println!("{tag} (latest)");
                } else {
                    println!("{tag}");
                }
            }
        }
        Some(("upgrade", args)) => {
            let file = args
                .get_one::<PathBuf>("file")
                .context("--file is required")?;
            let mut config = match args.get_one::<PathBuf>("config") {
                Some(path) => UpgradeConfig::from_file(path)
                    .with_context(|| format!("failed to load {}", path.display()))?,
                None => UpgradeConfig::default(),
            };
            if args.get_flag("strict") {
                config = config.with_strict_versions(true);
            }

            let files = FileStore::load(file)?;
            let memory = Arc::new(MemoryRecorder::new());
            let recorder: Arc<dyn EventRecorder> = if args.get_flag("stream-events") {
                Arc::new(TracingRecorder)
            } else {
                memory.clone()
            };
            let upgrade =
                VersionUpgrade::new(registry, files.store(), recorder).with_config(config);

            let report = upgrade.managed_instances().await?;
            eprint!("{}", render(&report, &memory.events()));

            if args.get_flag("dry-run") {
                print!("{}", files.to_yaml()?);
            } else if !report.upgraded.is_empty() {
                files.save()?;
            }

            if report.has_failures() {
                std::process::exit(1);
            }
        }
        _ => {
            cli().print_help()?;
        }
    }
    Ok(())
}
