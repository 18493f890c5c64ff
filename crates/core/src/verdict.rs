use std::fmt;

use serde::Serialize;

use crate::attr::AttributeMap;

/// Per-(rule, resource) compliance classification. `NotApplicable` marks a
/// resource excluded by a rule's precondition; it is kept distinct from
/// `Compliant` for audit clarity, though neither requires action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Verdict {
    Compliant,
    NonCompliant,
    Indeterminate,
    NotApplicable,
}

impl Verdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verdict::Compliant => "compliant",
            Verdict::NonCompliant => "non-compliant",
            Verdict::Indeterminate => "indeterminate",
            Verdict::NotApplicable => "not-applicable",
        }
    }

}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    pub rule_id: String,
    pub resource_address: String,
    pub verdict: Verdict,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// One configuration unit as supplied by the host parser: a stable address,
/// a resource type, and the attribute body following the wrapping
/// convention of `attr`.
#[derive(Debug, Clone)]
pub struct Resource {
    pub address: String,
    pub kind: String,
    pub attributes: AttributeMap,
}

impl Resource {
    pub fn new(address: impl Into<String>, kind: impl Into<String>, attributes: AttributeMap) -> Self {
        Self {
            address: address.into(),
            kind: kind.into(),
            attributes,
        }
    }
}
