use std::collections::BTreeSet;

use serde::Serialize;
use tfaudit_core::{AttributeMap, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RuleCategory {
    GeneralSecurity,
    Iam,
    CostAttribution,
}

impl RuleCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCategory::GeneralSecurity => "general-security",
            RuleCategory::Iam => "iam",
            RuleCategory::CostAttribution => "cost-attribution",
        }
    }
}

/// What one rule check produced: the verdict plus an optional explanation
/// surfaced in reports for non-compliant and indeterminate findings.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub verdict: Verdict,
    pub detail: Option<String>,
}

impl Outcome {
    pub fn compliant() -> Self {
        Self { verdict: Verdict::Compliant, detail: None }
    }

    pub fn not_applicable() -> Self {
        Self { verdict: Verdict::NotApplicable, detail: None }
    }

    pub fn non_compliant(detail: impl Into<String>) -> Self {
        Self { verdict: Verdict::NonCompliant, detail: Some(detail.into()) }
    }

    pub fn indeterminate(detail: impl Into<String>) -> Self {
        Self { verdict: Verdict::Indeterminate, detail: Some(detail.into()) }
    }
}

type CheckFn = Box<dyn Fn(&AttributeMap) -> Outcome + Send + Sync>;

/// One catalog entry: stable metadata plus the pure check function. Built
/// once at startup and shared read-only across evaluations.
pub struct RuleDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub category: RuleCategory,
    pub applies_to: BTreeSet<String>,
    check: CheckFn,
}

impl RuleDefinition {
    pub fn new(
        id: &'static str,
        name: &'static str,
        category: RuleCategory,
        applies_to: &[&str],
        check: impl Fn(&AttributeMap) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            name,
            category,
            applies_to: applies_to.iter().map(|s| s.to_string()).collect(),
            check: Box::new(check),
        }
    }

    pub fn is_applicable(&self, kind: &str) -> bool {
        self.applies_to.contains(kind)
    }

    pub fn check(&self, attributes: &AttributeMap) -> Outcome {
        (self.check)(attributes)
    }
}

pub struct Registry {
    rules: Vec<RuleDefinition>,
}

impl Registry {
    pub fn new(rules: Vec<RuleDefinition>) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &[RuleDefinition] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules_for<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a RuleDefinition> {
        self.rules.iter().filter(move |r| r.is_applicable(kind))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_rule(id: &'static str, applies_to: &[&str]) -> RuleDefinition {
        RuleDefinition::new(id, "noop", RuleCategory::Iam, applies_to, |_| {
            Outcome::compliant()
        })
    }

    #[test]
    fn dispatch_filters_by_resource_type() {
        let registry = Registry::new(vec![
            noop_rule("a", &["aws_ssoadmin_permission_set"]),
            noop_rule("b", &["aws_ssoadmin_managed_policy_attachment"]),
            noop_rule("c", &["aws_ssoadmin_permission_set", "aws_iam_role"]),
        ]);
        let ids: Vec<&str> = registry
            .rules_for("aws_ssoadmin_permission_set")
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["a", "c"]);
        assert_eq!(registry.rules_for("aws_s3_bucket").count(), 0);
    }
}
