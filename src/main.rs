use anyhow::Result;
use invoice_mapper::mapping::{self, LineRequest};
use invoice_mapper::MapperConfig;
use std::env;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Classify a single invoice line description from the command line and
/// print the structured result as JSON.
///
/// Usage: `invoice-mapper "<description>" [vendor_name] [invoiced_qty]`
fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args: Vec<String> = env::args().skip(1).collect();
    let description = args
        .first()
        .ok_or_else(|| anyhow::anyhow!("usage: invoice-mapper \"<description>\" [vendor_name] [invoiced_qty]"))?;
    let vendor_name = args.get(1).cloned();
    let invoiced_qty = match args.get(2) {
        Some(raw) => raw
            .parse::<f64>()
            .map_err(|_| anyhow::anyhow!("invoiced_qty must be a number, got '{}'", raw))?,
        None => 1.0,
    };

    let config = MapperConfig::from_env();
    config.validate().map_err(|e| anyhow::anyhow!("{}", e))?;

    info!(description = %description, vendor = ?vendor_name, "Classifying invoice line");

    let request = LineRequest {
        description: description.clone(),
        vendor_name,
        invoiced_qty,
        unit_cost: 0.0,
    };
    let result = mapping::classify_offline(&request);

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
