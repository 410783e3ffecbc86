//! Recommend command - rank catalog models against the saved profile

use std::sync::Arc;

use clap::Args;

use super::display;
use crate::domain::fitness::{RecommendationFilters, SortMode};
use crate::infrastructure::profile::JsonFileProfileRepository;
use crate::infrastructure::reference::ReferenceData;
use crate::infrastructure::services::{ProfileService, RecommendationRequest, RecommendationService};

#[derive(Args, Clone)]
pub struct RecommendArgs {
    /// Only models tagged with one of these use cases
    #[arg(long = "use-case")]
    pub use_cases: Vec<String>,

    /// Upper bound on VRAM per variant, in GB
    #[arg(long)]
    pub max_vram: Option<f64>,

    /// Upper bound on RAM per variant, in GB
    #[arg(long)]
    pub max_ram: Option<f64>,

    /// Smallest acceptable context window, in tokens
    #[arg(long)]
    pub min_context: Option<u32>,

    /// score, vram, size, context or efficiency
    #[arg(long, default_value = "score")]
    pub sort: SortMode,

    /// Show at most this many models
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,

    /// Print JSON instead of text
    #[arg(long)]
    pub json: bool,
}

impl RecommendArgs {
    fn request(&self) -> RecommendationRequest {
        RecommendationRequest {
            filters: RecommendationFilters {
                use_cases: self.use_cases.clone(),
                max_vram_gb: self.max_vram,
                max_ram_gb: self.max_ram,
                min_context_window: self.min_context,
            },
            sort: self.sort,
            limit: self.limit,
        }
    }
}

pub fn run(args: RecommendArgs) -> anyhow::Result<()> {
    let config = super::bootstrap();

    let repository = Arc::new(JsonFileProfileRepository::new(&config.data.profile_path));
    let record = ProfileService::new(repository).load_required()?;

    let data = ReferenceData::new(config.data);
    let service = RecommendationService::new(data.catalog()?);
    let report = service.recommend(&record.profile, &args.request());

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display::print_report(&report);
    }

    Ok(())
}
