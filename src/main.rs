use clap::Parser;
use llm_fit_advisor::cli::{self, Cli, Command};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Resolve(args) => cli::resolve::run(args),
        Command::Profile(args) => cli::profile::run(args),
        Command::Recommend(args) => cli::recommend::run(args),
        Command::Validate(args) => cli::validate::run(args),
    }
}
