//! mirrorhost CLI
//!
//! Command-line interface for mirrorhost operations:
//! - Check which modules a config resolves to
//! - Bootstrap the modules and print the page
//! - Fetch the env map of a running host
//! - Generate a default config file

use clap::{Parser, Subcommand};
use mirrorhost::config::{generate_default_config, Config};
use mirrorhost::host::{EnvClient, EnvClientConfig, EnvSource, LocalShell};
use mirrorhost::loader::{Orchestrator, OrchestratorOptions, PageDocument, RunReport};
use mirrorhost::modules::{builtin_registry, Resolution};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "mirrorhost-cli")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Inspect and exercise a smart mirror module configuration")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: search the standard locations)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format (table, json)
    #[arg(short, long, default_value = "table", global = true)]
    pub format: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the configured modules and list them
    Check,

    /// Bootstrap and start the modules, then print the page
    Render {
        /// Page title
        #[arg(long, default_value = "MagicMirror²")]
        title: String,
        /// Write the page here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Fetch the env map of a running host
    Env {
        /// Host URL
        #[arg(long, default_value = "http://localhost:8080")]
        url: String,
        /// Base path the host is mounted under
        #[arg(long, default_value = "/")]
        base_path: String,
    },

    /// Generate default config file
    Config {
        /// Output path (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check => {
            let config = load_config(&cli.config)?;
            let options = OrchestratorOptions::from(&config.loader);
            let resolution = options.resolver.resolve(
                &config.modules,
                &options.system_modules,
                &config.loader.env_vars(),
                &config.loader.positions,
            );

            match cli.format.as_str() {
                "json" => println!("{}", serde_json::to_string_pretty(&resolution)?),
                _ => print_resolution(&resolution),
            }
        }

        Commands::Render { title, output } => {
            let config = load_config(&cli.config)?;
            let shell = Arc::new(
                LocalShell::new(
                    EnvSource::Static(config.loader.env_vars()),
                    builtin_registry(),
                )
                .with_positions(config.loader.positions.clone()),
            );
            let document = Arc::new(PageDocument::new(&config.loader.root_dir));
            let mut orchestrator = Orchestrator::new(
                shell,
                document.clone(),
                OrchestratorOptions::from(&config.loader),
            );

            let report = orchestrator.run(&config.modules).await;
            let page = document.render_html(&title).await;

            match output {
                Some(path) => {
                    std::fs::write(&path, &page)?;
                    eprintln!("Page written to {:?}", path);
                }
                None => println!("{}", page),
            }

            match cli.format.as_str() {
                "json" => eprintln!("{}", serde_json::to_string_pretty(&report)?),
                _ => print_report(&report),
            }
        }

        Commands::Env { url, base_path } => {
            let client = EnvClient::new(EnvClientConfig {
                base_url: url,
                base_path,
                ..Default::default()
            })?;

            match client.fetch().await {
                Ok(env) => match cli.format.as_str() {
                    "json" => println!("{}", serde_json::to_string_pretty(&env)?),
                    _ => {
                        println!("{:<20} {}", "modulesDir", env.modules_dir);
                        println!("{:<20} {}", "customCss", env.custom_css);
                        let mut extra: Vec<_> = env.extra.iter().collect();
                        extra.sort_by(|a, b| a.0.cmp(b.0));
                        for (key, value) in extra {
                            println!("{:<20} {}", key, value);
                        }
                    }
                },
                Err(e) => {
                    eprintln!("Cannot fetch env from {}", client.env_url());
                    eprintln!("Error: {}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Config { output } => {
            let content = generate_default_config();
            match output {
                Some(path) => {
                    std::fs::write(&path, content)?;
                    println!("Config written to {:?}", path);
                }
                None => print!("{}", content),
            }
        }
    }

    Ok(())
}

fn load_config(path: &Option<PathBuf>) -> anyhow::Result<Config> {
    Ok(match path {
        Some(path) => Config::load_with_env(path)?,
        None => Config::load_default(),
    })
}

fn print_resolution(resolution: &Resolution) {
    println!(
        "{:<28} {:<20} {:<15} {}",
        "Identifier", "Module", "Position", "Path"
    );
    println!("{}", "-".repeat(90));
    for d in &resolution.descriptors {
        println!(
            "{:<28} {:<20} {:<15} {}",
            d.identifier,
            d.name,
            d.position.as_deref().unwrap_or("-"),
            d.path
        );
    }

    if !resolution.rejected.is_empty() {
        println!();
        println!("Rejected:");
        for r in &resolution.rejected {
            println!("  #{} {}: {}", r.index, r.module_class, r.reason);
        }
    }
}

fn print_report(report: &RunReport) {
    eprintln!("Run {}", report.run_id);
    eprintln!("  Resolved:     {}", report.resolved);
    eprintln!("  Rejected:     {}", report.rejected.len());
    eprintln!("  Bootstrapped: {}", report.bootstrapped);
    eprintln!("  Started:      {}", report.started.len());
    eprintln!("  Hidden:       {}", report.hidden.len());
    if report.cancelled {
        eprintln!("  (cancelled)");
    }
    for failure in &report.failed {
        eprintln!("  Failed {}: {}", failure.identifier, failure.error);
    }
}
