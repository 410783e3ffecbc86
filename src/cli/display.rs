//! Text output for the CLI commands

use crate::domain::fitness::{ExplainableReason, Rating, RecommendedArtifact};
use crate::domain::hardware::{CapacityEstimate, ResolutionSource, StoredProfile};
use crate::infrastructure::services::RecommendationReport;

fn header(title: &str) {
    println!("{}", title);
    println!("{}", "=".repeat(title.chars().count()));
}

/// `8 GB`, `12.5 GB`
pub fn format_gb(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{:.0} GB", value)
    } else {
        format!("{:.1} GB", value)
    }
}

/// `4K`, `128K`, `1000`
pub fn format_context(tokens: u32) -> String {
    if tokens >= 1024 && tokens % 1024 == 0 {
        format!("{}K", tokens / 1024)
    } else {
        tokens.to_string()
    }
}

fn rating_marker(rating: Rating) -> &'static str {
    match rating {
        Rating::Positive => "+",
        Rating::Neutral => "~",
        Rating::Negative => "-",
    }
}

fn describe_source(source: &ResolutionSource) -> String {
    match source {
        ResolutionSource::Device { name, shared_tier } => match shared_tier {
            Some(tier) => format!("{} (shared memory, {} tier)", name, tier.label()),
            None => name.clone(),
        },
        ResolutionSource::Pattern { pattern } => format!("pattern '{}'", pattern),
        ResolutionSource::IntegratedKeyword {
            keyword,
            shared_tier,
        } => format!("integrated keyword '{}' ({} tier)", keyword, shared_tier.label()),
        ResolutionSource::ConservativeDefault => "no match, conservative default".to_string(),
    }
}

pub fn print_estimate(identifier: &str, estimate: &CapacityEstimate) {
    header("GPU Resolution");
    println!("Identifier: {}", identifier);
    println!("Capacity:   {}", format_gb(estimate.capacity_gb));
    println!("Fidelity:   {}", estimate.fidelity.label());
    println!("Source:     {}", describe_source(&estimate.source));
}

pub fn print_profile(record: &StoredProfile) {
    let profile = &record.profile;

    header("Hardware Profile");
    match (&profile.gpu_identifier, profile.gpu_capacity()) {
        (Some(id), Some(capacity)) => {
            let fidelity = profile.gpu_fidelity.map(|f| f.label()).unwrap_or("estimated");
            println!("GPU:        {} ({}, {})", id, format_gb(capacity), fidelity);
        }
        (Some(id), None) => println!("GPU:        {} (no usable memory)", id),
        (None, _) => println!("GPU:        none"),
    }
    println!("RAM:        {}", format_gb(profile.system_memory_gb));
    if let Some(cores) = profile.cpu_core_count {
        println!("CPU cores:  {}", cores);
    }
    println!("OS:         {:?}", profile.os_family);
    println!("Priority:   {}", profile.preferences.priority.label());
    println!("Quality:    {:?}", profile.preferences.acceptable_quality);
    if !profile.preferences.selected_use_cases.is_empty() {
        println!("Use cases:  {}", profile.preferences.selected_use_cases.join(", "));
    }
    for error in &profile.detection_errors {
        println!("Detection:  {}", error);
    }
    println!("Saved:      {}", record.saved_at.format("%Y-%m-%d %H:%M:%S UTC"));
}

fn print_reason(reason: &ExplainableReason) {
    println!(
        "    [{}] {}: {}",
        rating_marker(reason.rating),
        reason.factor,
        reason.explanation
    );
}

fn print_recommendation(rank: usize, result: &RecommendedArtifact) {
    let top = &result.top_assessment;
    let variant = &result.default_variant;

    println!(
        "{:>2}. {} ({}) - {} {:.1}",
        rank,
        result.artifact.name,
        result.artifact.parameters,
        top.category.label(),
        top.score
    );
    println!(
        "    {} | VRAM {} | RAM {} | file {} | context {}",
        variant.quantization,
        format_gb(variant.vram_required),
        format_gb(variant.ram_required),
        format_gb(variant.file_size),
        format_context(variant.context_window)
    );

    for reason in &top.reasons {
        print_reason(reason);
    }
    for warning in &top.warnings {
        println!("    ! {}", warning);
    }
    for suggestion in &top.suggestions {
        println!("    > {}", suggestion);
    }

    if result.variant_assessments.len() > 1 {
        let others: Vec<String> = result.variant_assessments[1..]
            .iter()
            .map(|va| format!("{} {:.1}", va.variant.quantization, va.assessment.score))
            .collect();
        println!("    Other variants: {}", others.join(", "));
    }

    if let Some(ollama) = &result.artifact.links.ollama {
        println!("    Run: {}", ollama);
    }
}

pub fn print_report(report: &RecommendationReport) {
    header("Recommendations");

    let gpu = match (&report.profile.gpu_identifier, report.profile.gpu_capacity_gb) {
        (Some(id), Some(capacity)) => format!("{} ({})", id, format_gb(capacity)),
        _ => "no GPU".to_string(),
    };
    println!(
        "Hardware: {}, {} RAM | sorted by {}",
        gpu,
        format_gb(report.profile.system_memory_gb),
        report.sort.label()
    );
    println!();

    if report.nothing_fits {
        println!("No models in the catalog fit this hardware with the current filters.");
        return;
    }

    for (index, result) in report.results.iter().enumerate() {
        print_recommendation(index + 1, result);
        println!();
    }

    if report.results.len() < report.total_compatible {
        println!(
            "Showing {} of {} compatible models.",
            report.results.len(),
            report.total_compatible
        );
    }
}
