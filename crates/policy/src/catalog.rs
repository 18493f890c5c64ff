//! The fixed rule catalog. Rules are plain data plus a check closure,
//! constructed once from the policy config; there is no registration side
//! effect and no shared mutable state afterwards.

use std::collections::BTreeSet;

use tfaudit_core::{normalize_hours, resolve, resolve_tags, AttrValue, Normalized};

use crate::config::PolicyConfig;
use crate::rule::{Outcome, Registry, RuleCategory, RuleDefinition};

pub const PERMISSION_SET: &str = "aws_ssoadmin_permission_set";
pub const MANAGED_POLICY_ATTACHMENT: &str = "aws_ssoadmin_managed_policy_attachment";

pub fn build_registry(config: &PolicyConfig) -> Registry {
    Registry::new(vec![
        tag_classification(config),
        least_privilege(config),
        session_duration(config),
        separation_of_duties(config),
        privilege_boundary(config),
        required_tags(config),
    ])
}

fn tag_classification(config: &PolicyConfig) -> RuleDefinition {
    let key = config.classification_tag_key.clone();
    let allowed: BTreeSet<String> = config
        .classification_values
        .iter()
        .map(|v| v.to_lowercase())
        .collect();
    RuleDefinition::new(
        "tag-classification",
        "Permission sets declare a recognized data classification tag",
        RuleCategory::GeneralSecurity,
        &[PERMISSION_SET],
        move |attrs| match resolve_tags(attrs.get("tags")).get(&key) {
            Some(value) if allowed.contains(&value.to_lowercase()) => Outcome::compliant(),
            Some(value) => {
                Outcome::non_compliant(format!("tag {key} has unrecognized value {value:?}"))
            }
            None => Outcome::non_compliant(format!("tag {key} is missing")),
        },
    )
}

fn least_privilege(config: &PolicyConfig) -> RuleDefinition {
    let marker = config.full_admin_policy_marker.clone();
    RuleDefinition::new(
        "least-privilege",
        "Attachments do not grant the full-administrator managed policy",
        RuleCategory::Iam,
        &[MANAGED_POLICY_ATTACHMENT],
        move |attrs| {
            let reference = attrs
                .get("managed_policy_arn")
                .map(resolve)
                .unwrap_or(AttrValue::Null);
            match reference.text() {
                Some(text) if text.contains(&marker) => {
                    Outcome::non_compliant(format!("policy reference contains {marker}"))
                }
                _ => Outcome::compliant(),
            }
        },
    )
}

fn session_duration(config: &PolicyConfig) -> RuleDefinition {
    let max_hours = config.session_max_hours;
    RuleDefinition::new(
        "session-duration",
        "Permission set sessions stay within the ordinary duration bound",
        RuleCategory::Iam,
        &[PERMISSION_SET],
        move |attrs| duration_outcome(attrs.get("session_duration"), max_hours),
    )
}

fn separation_of_duties(config: &PolicyConfig) -> RuleDefinition {
    let markers = lowercased(&config.admin_name_markers);
    let max_hours = config.admin_session_max_hours;
    RuleDefinition::new(
        "separation-of-duties",
        "Administrative permission sets use short-lived sessions",
        RuleCategory::Iam,
        &[PERMISSION_SET],
        move |attrs| {
            if !name_matches(attrs.get("name"), &markers) {
                return Outcome::not_applicable();
            }
            duration_outcome(attrs.get("session_duration"), max_hours)
        },
    )
}

fn privilege_boundary(config: &PolicyConfig) -> RuleDefinition {
    let markers = lowercased(&config.high_privilege_markers);
    RuleDefinition::new(
        "privilege-boundary",
        "High-privilege permission sets carry a permissions boundary",
        RuleCategory::Iam,
        &[PERMISSION_SET],
        move |attrs| {
            if !name_matches(attrs.get("name"), &markers) {
                return Outcome::not_applicable();
            }
            match attrs.get("permissions_boundary").map(resolve) {
                Some(value) if !value.is_null() => Outcome::compliant(),
                _ => Outcome::non_compliant(
                    "high-privilege permission set has no permissions boundary",
                ),
            }
        },
    )
}

fn required_tags(config: &PolicyConfig) -> RuleDefinition {
    let required = config.required_tag_keys.clone();
    RuleDefinition::new(
        "required-tags",
        "Permission sets carry the cost-attribution tag set",
        RuleCategory::CostAttribution,
        &[PERMISSION_SET],
        move |attrs| {
            let tags = resolve_tags(attrs.get("tags"));
            let missing: Vec<&str> = required
                .iter()
                .filter(|key| !tags.contains_key(key.as_str()))
                .map(|key| key.as_str())
                .collect();
            if missing.is_empty() {
                Outcome::compliant()
            } else {
                Outcome::non_compliant(format!("missing required tags: {}", missing.join(", ")))
            }
        },
    )
}

fn lowercased(markers: &[String]) -> Vec<String> {
    markers.iter().map(|m| m.to_lowercase()).collect()
}

fn name_matches(raw: Option<&AttrValue>, markers: &[String]) -> bool {
    let Some(value) = raw.map(resolve) else {
        return false;
    };
    let Some(name) = value.text() else {
        return false;
    };
    let name = name.to_lowercase();
    markers.iter().any(|marker| name.contains(marker))
}

fn duration_outcome(raw: Option<&AttrValue>, max_hours: f64) -> Outcome {
    match normalize_hours(raw) {
        // the provider default applies and sits within every configured bound
        Normalized::Absent => Outcome::compliant(),
        Normalized::Indeterminate => {
            Outcome::indeterminate("session duration could not be interpreted")
        }
        Normalized::Hours(hours) if hours <= max_hours => Outcome::compliant(),
        Normalized::Hours(hours) => Outcome::non_compliant(format!(
            "session duration {hours}h exceeds the {max_hours}h bound"
        )),
    }
}
