use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::fmt::format::FmtSpan;

use tfaudit_policy::{build_registry, evaluator, PolicyConfig};
use tfaudit_tfjson as tfjson;

mod report;

use report::Format;

#[derive(Parser, Debug)]
#[command(author, version, about="tfaudit — compliance checks for Terraform-managed IAM Identity Center resources")]
struct Cli {
    /// Plan JSON (terraform show -json), resource dump, or binary plan file
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Policy config (YAML); shipped defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t=Format::Table, global = true)]
    format: Format,

    /// Runner used to render binary plan files
    #[arg(long, value_enum, default_value_t=Runner::Auto, global = true)]
    runner: Runner,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
enum Runner { Auto, Terraform, Tofu }

#[derive(Subcommand, Debug)] enum Cmd {
    /// Evaluate the resources in --file and print a report
    Check,
    /// Print the rule catalog
    Rules,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().json().with_span_events(FmtSpan::CLOSE).init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => PolicyConfig::from_yaml_file(path)?,
        None => PolicyConfig::default(),
    };
    let registry = build_registry(&config);

    match cli.cmd {
        Cmd::Rules => {
            report::render_rules(&registry, cli.format)?;
        }
        Cmd::Check => {
            let file = cli.file.as_deref().context("--file is required for 'check'")?;
            let prefer = match cli.runner {
                Runner::Terraform => Some(tfjson::runner::Runner::Terraform),
                Runner::Tofu      => Some(tfjson::runner::Runner::Tofu),
                Runner::Auto      => None,
            };
            let resources = tfjson::load(file, prefer)?;
            tracing::info!(resources = resources.len(), rules = registry.len(), "evaluating");

            let workers = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
            let results = evaluator::evaluate_parallel(&registry, &resources, workers);
            let summary = report::Summary::from_results(&results);
            report::render(&results, &summary, cli.format)?;

            if summary.non_compliant > 0 {
                anyhow::bail!("{} non-compliant finding(s)", summary.non_compliant);
            }
        }
    }
    Ok(())
}
