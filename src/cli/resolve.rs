//! Resolve command - GPU identifier to capacity estimate

use clap::Args;

use super::display;
use crate::infrastructure::reference::ReferenceData;

#[derive(Args, Clone)]
pub struct ResolveArgs {
    /// GPU identifier as reported by the system, e.g. "NVIDIA GeForce RTX 4070"
    pub identifier: String,

    /// System memory in GB; sizes integrated GPUs
    #[arg(long)]
    pub memory: Option<f64>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run(args: ResolveArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let data = ReferenceData::new(config.data);

    let resolver = data.resolver()?;
    let estimate = resolver.resolve(&args.identifier, args.memory);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&estimate)?);
    } else {
        display::print_estimate(&args.identifier, &estimate);
    }

    Ok(())
}
