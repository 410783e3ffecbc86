//! Profile command - save, show and clear the hardware profile

use std::sync::Arc;

use clap::{Args, Subcommand};

use super::display;
use crate::domain::hardware::{AcceptableQuality, OsFamily, Priority, UserPreferences};
use crate::infrastructure::profile::JsonFileProfileRepository;
use crate::infrastructure::reference::ReferenceData;
use crate::infrastructure::services::{ProfileInput, ProfileService};

#[derive(Args, Clone)]
pub struct ProfileArgs {
    #[command(subcommand)]
    pub command: ProfileCommand,
}

#[derive(Subcommand, Clone)]
pub enum ProfileCommand {
    /// Save a hardware profile, resolving the GPU
    Set(SetArgs),

    /// Show the saved profile
    Show {
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Remove the saved profile
    Clear,
}

#[derive(Args, Clone)]
pub struct SetArgs {
    /// System memory in GB
    #[arg(long)]
    pub ram: f64,

    /// GPU identifier; leave out for CPU-only machines
    #[arg(long)]
    pub gpu: Option<String>,

    /// Physical CPU core count
    #[arg(long)]
    pub cores: Option<u32>,

    /// windows, macos or linux
    #[arg(long)]
    pub os: Option<OsFamily>,

    /// quality, speed or balanced
    #[arg(long)]
    pub priority: Option<Priority>,

    /// Lowest acceptable quality: high, medium or any
    #[arg(long)]
    pub quality: Option<AcceptableQuality>,

    /// Use cases you care about, in order of importance
    #[arg(long = "use-case")]
    pub use_cases: Vec<String>,

    /// Print the saved record as JSON
    #[arg(long)]
    pub json: bool,
}

impl SetArgs {
    fn into_input(self) -> ProfileInput {
        let mut preferences = UserPreferences::new()
            .with_priority(self.priority.unwrap_or_default())
            .with_acceptable_quality(self.quality.unwrap_or_default());

        for use_case in self.use_cases {
            preferences = preferences.with_use_case(use_case);
        }

        ProfileInput {
            gpu_identifier: self.gpu,
            system_memory_gb: self.ram,
            cpu_core_count: self.cores,
            os_family: self.os.unwrap_or_default(),
            preferences,
            detection_errors: Vec::new(),
        }
    }
}

pub fn run(args: ProfileArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();
    let repository = Arc::new(JsonFileProfileRepository::new(&config.data.profile_path));

    match args.command {
        ProfileCommand::Set(set) => {
            let json = set.json;
            let mut service = ProfileService::new(repository);

            if set.gpu.as_deref().is_some_and(|gpu| !gpu.trim().is_empty()) {
                let data = ReferenceData::new(config.data.clone());
                service = service.with_resolver(data.resolver()?);
            }

            let record = service.save(set.into_input())?;

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                display::print_profile(&record);
                println!();
                println!("Saved to {}", config.data.profile_path.display());
            }
        }
        ProfileCommand::Show { json } => {
            let service = ProfileService::new(repository);

            match service.load()? {
                Some(record) if json => println!("{}", serde_json::to_string_pretty(&record)?),
                Some(record) => display::print_profile(&record),
                None => println!("No hardware profile saved. Run `profile set --ram <GB>` to create one."),
            }
        }
        ProfileCommand::Clear => {
            let service = ProfileService::new(repository);

            if service.clear()? {
                println!("Hardware profile cleared.");
            } else {
                println!("No hardware profile to clear.");
            }
        }
    }

    Ok(())
}
