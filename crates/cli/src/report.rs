use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use tfaudit_core::{EvaluationResult, Verdict};
use tfaudit_policy::{Registry, RuleCategory};

#[derive(Copy, Clone, Eq, PartialEq, Debug, ValueEnum)]
pub enum Format {
    Table,
    Json,
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub compliant: usize,
    pub non_compliant: usize,
    pub indeterminate: usize,
    pub not_applicable: usize,
}

impl Summary {
    pub fn from_results(results: &[EvaluationResult]) -> Self {
        let mut summary = Summary::default();
        for result in results {
            match result.verdict {
                Verdict::Compliant => summary.compliant += 1,
                Verdict::NonCompliant => summary.non_compliant += 1,
                Verdict::Indeterminate => summary.indeterminate += 1,
                Verdict::NotApplicable => summary.not_applicable += 1,
            }
        }
        summary
    }
}

#[derive(Serialize)]
struct JsonReport<'a> {
    results: &'a [EvaluationResult],
    summary: &'a Summary,
}

pub fn render(results: &[EvaluationResult], summary: &Summary, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let report = JsonReport { results, summary };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Format::Table => {
            for line in table_lines(results, summary) {
                println!("{line}");
            }
        }
    }
    Ok(())
}

fn table_lines(results: &[EvaluationResult], summary: &Summary) -> Vec<String> {
    let rule_w = width("RULE", results.iter().map(|r| r.rule_id.len()));
    let addr_w = width("RESOURCE", results.iter().map(|r| r.resource_address.len()));
    let verdict_w = width("VERDICT", results.iter().map(|r| r.verdict.as_str().len()));

    let mut lines = vec![format!(
        "{:<rule_w$}  {:<addr_w$}  {:<verdict_w$}  DETAIL",
        "RULE", "RESOURCE", "VERDICT"
    )];
    for result in results {
        lines.push(format!(
            "{:<rule_w$}  {:<addr_w$}  {:<verdict_w$}  {}",
            result.rule_id,
            result.resource_address,
            result.verdict.as_str(),
            result.detail.as_deref().unwrap_or("-"),
        ));
    }
    lines.push(format!(
        "{} compliant, {} non-compliant, {} indeterminate, {} not applicable",
        summary.compliant, summary.non_compliant, summary.indeterminate, summary.not_applicable
    ));
    lines
}

fn width(header: &str, lens: impl Iterator<Item = usize>) -> usize {
    lens.chain(std::iter::once(header.len())).max().unwrap_or(0)
}

#[derive(Serialize)]
struct RuleInfo<'a> {
    id: &'a str,
    name: &'a str,
    category: RuleCategory,
    applies_to: Vec<&'a str>,
}

pub fn render_rules(registry: &Registry, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let rules: Vec<RuleInfo<'_>> = registry
                .rules()
                .iter()
                .map(|r| RuleInfo {
                    id: r.id,
                    name: r.name,
                    category: r.category,
                    applies_to: r.applies_to.iter().map(String::as_str).collect(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rules)?);
        }
        Format::Table => {
            let id_w = width("ID", registry.rules().iter().map(|r| r.id.len()));
            let cat_w = width(
                "CATEGORY",
                registry.rules().iter().map(|r| r.category.as_str().len()),
            );
            println!("{:<id_w$}  {:<cat_w$}  NAME", "ID", "CATEGORY");
            for rule in registry.rules() {
                println!(
                    "{:<id_w$}  {:<cat_w$}  {}",
                    rule.id,
                    rule.category.as_str(),
                    rule.name
                );
            }
        }
    }
    Ok(())
}
