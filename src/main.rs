use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config_manager::SystemConfig;
use oklink_client::{validate_tron_address, OklinkClient};
use tracing::{error, info};

mod logging;
mod render;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Json,
    Table,
}

#[derive(Parser, Debug)]
#[command(version, about = "Tron address lookups through the OKLink explorer", long_about = None)]
struct CliArgs {
    /// Tron addresses to look up
    #[arg(required = true)]
    addresses: Vec<String>,

    /// Locale path segment tried before the canonical path (defaults to config)
    #[arg(long)]
    locale: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Path to TOML config file
    #[arg(long, default_value = "config.toml")]
    config: String,

    /// Skip the local address shape check
    #[arg(long, default_value_t = false)]
    no_validate: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = CliArgs::parse();

    let log_filter = logging::init();

    let config = SystemConfig::load_from_path(&args.config)
        .with_context(|| format!("failed to load configuration from {}", args.config))?;
    logging::apply_debug_mode(log_filter.as_ref(), config.system.debug_mode)?;

    if !args.no_validate {
        for address in &args.addresses {
            validate_tron_address(address).map_err(anyhow::Error::msg)?;
        }
    }

    info!(
        "Looking up {} address(es) via {}",
        args.addresses.len(),
        config.explorer.base_url
    );
    let client = OklinkClient::new(&config.explorer)?;
    let results = client
        .lookup_many(args.addresses.iter().cloned(), args.locale.as_deref())
        .await;

    let failed = results.iter().filter(|r| r.result.is_err()).count();
    for lookup in &results {
        if let Err(e) = &lookup.result {
            error!("❌ {}: {}", lookup.address, e);
        }
    }

    let output = match args.format {
        OutputFormat::Json => render::to_json(&results)?,
        OutputFormat::Table => render::to_table(&results),
    };
    println!("{}", output);

    if failed > 0 {
        anyhow::bail!("{} of {} lookups failed", failed, results.len());
    }
    Ok(())
}
