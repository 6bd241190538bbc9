//! Gateway CLI - fill a prompt template and generate a response
//!
//! Main entry point for the gateway command-line tool.

use anyhow::{anyhow, Context};
use clap::{Args, Parser, Subcommand};
use gateway::{FallbackOrchestrator, GatewaySettings, PromptTemplate, SettingsLoader, Variables};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gateway")]
#[command(about = "Gateway - primary/secondary model generation with cost reporting", long_about = None)]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Log at debug level (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill a template and generate a response
    Generate {
        /// Template text, or @path to read it from a file
        #[arg(short, long)]
        template: String,

        /// System instruction, or @path to read it from a file
        #[arg(short, long)]
        system: Option<String>,

        /// Template variable as key=value (repeatable)
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_var)]
        vars: Vec<(String, String)>,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Show the effective price table
    Pricing {
        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Report which models have credentials configured
    Check {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

#[derive(Args)]
struct ConfigArgs {
    /// Settings file applied after the user and project files
    #[arg(short, long, env = "GATEWAY_CONFIG")]
    config: Option<PathBuf>,
}

impl ConfigArgs {
    async fn load(&self) -> anyhow::Result<GatewaySettings> {
        SettingsLoader::new()
            .load(self.config.as_deref())
            .await
            .context("Failed to load settings")
    }
}

fn parse_var(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}

async fn read_text(arg: &str) -> anyhow::Result<String> {
    match arg.strip_prefix('@') {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read {}", path)),
        None => Ok(arg.to_string()),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            template,
            system,
            vars,
            json,
            config,
        } => {
            let settings = config.load().await?;

            let mut prompt = PromptTemplate::new(read_text(&template).await?);
            if let Some(system) = system {
                prompt = prompt.with_system(read_text(&system).await?);
            }
            let variables: Variables = vars.into_iter().collect();

            let missing: Vec<String> = prompt
                .variables()?
                .into_iter()
                .filter(|name| !variables.contains_key(name))
                .collect();
            if !missing.is_empty() {
                return Err(anyhow!("Missing --var for: {}", missing.join(", ")));
            }

            let orchestrator = FallbackOrchestrator::from_settings(&settings);
            let generation = orchestrator.generate_detailed(&prompt, &variables).await;

            if json {
                println!("{}", serde_json::to_string_pretty(&generation)?);
            } else {
                println!("{}", generation.text);
                println!();
                match generation.served_by {
                    Some(slot) => println!(
                        "[{} | {} in / {} out tokens | ${:.6}]",
                        slot, generation.input_tokens, generation.output_tokens, generation.cost.dollars
                    ),
                    None => println!("[no model responded | $0.000000]"),
                }
            }

            if generation.is_success() {
                Ok(())
            } else {
                Err(anyhow!("All models failed"))
            }
        }
        Commands::Pricing { config } => {
            let settings = config.load().await?;
            let table = settings.price_table();

            println!("{:<32} {:>14} {:>14}", "Model", "Input $/1M", "Output $/1M");
            println!("{}", "-".repeat(62));
            for (model, price) in table.iter() {
                println!(
                    "{:<32} {:>14.4} {:>14.4}",
                    model,
                    price.input_per_token * 1_000_000.0,
                    price.output_per_token * 1_000_000.0
                );
            }
            Ok(())
        }
        Commands::Check { config } => {
            let settings = config.load().await?;

            let mut ready = 0;
            for (label, model) in [("primary", &settings.primary), ("secondary", &settings.secondary)] {
                let status = match model.provider() {
                    Ok(provider) if llm::adapter::has_credentials(provider) => {
                        ready += 1;
                        "✓ credentials found".to_string()
                    }
                    Ok(provider) => format!("✗ {} not set", provider.api_key_env()),
                    Err(e) => format!("✗ {}", e),
                };
                println!(
                    "{:<10} {:<8} {:<28} {}",
                    label, model.provider, model.model_name, status
                );
            }

            if ready == 0 {
                Err(anyhow!("No model has credentials configured"))
            } else {
                Ok(())
            }
        }
    }
}
