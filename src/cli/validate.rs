//! Validate command - check the reference data files

use std::path::PathBuf;

use clap::Args;
use tracing::error;

use crate::infrastructure::reference::{load_catalog, load_device_database, load_resolver_rules};

#[derive(Args, Clone)]
pub struct ValidateArgs {
    /// Catalog file (overrides config)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Device database file (overrides config)
    #[arg(long)]
    pub devices: Option<PathBuf>,
}

pub fn run(args: ValidateArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let catalog_path = args.catalog.unwrap_or(config.data.catalog_path);
    let devices_path = args.devices.unwrap_or(config.data.devices_path);
    let mut failures = 0;

    match load_catalog(&catalog_path) {
        Ok(catalog) => println!("✓ {} - {} models", catalog_path.display(), catalog.len()),
        Err(e) => {
            error!("{}", e);
            println!("✗ {}", catalog_path.display());
            for issue in e.to_string().split("; ") {
                println!("    {}", issue);
            }
            failures += 1;
        }
    }

    match load_device_database(&devices_path) {
        Ok(database) => println!("✓ {} - {} devices", devices_path.display(), database.len()),
        Err(e) => {
            error!("{}", e);
            println!("✗ {}: {}", devices_path.display(), e);
            failures += 1;
        }
    }

    if let Some(rules_path) = &config.data.resolver_rules_path {
        match load_resolver_rules(rules_path) {
            Ok(_) => println!("✓ {}", rules_path.display()),
            Err(e) => {
                error!("{}", e);
                println!("✗ {}: {}", rules_path.display(), e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{} data file(s) failed validation", failures);
    }

    Ok(())
}
