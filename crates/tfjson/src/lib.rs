//! Adapter between Terraform's JSON output and the engine's resource form.
//! Accepts either a full plan document (`terraform show -json`) or a flat
//! array of `{address, type, attributes}` entries from another HCL host.

use std::path::Path;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as Json;
use tfaudit_core::{AttrValue, AttributeMap, Resource};

pub mod runner;

// Interpolation markers or function-call syntax mean the upstream parser
// handed us expression text rather than a literal.
static CALL_SYNTAX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{|[A-Za-z_][A-Za-z0-9_]*\(").unwrap());

fn looks_unresolved(s: &str) -> bool {
    CALL_SYNTAX.is_match(s)
}

pub fn attr_from_json(value: &Json) -> AttrValue {
    match value {
        Json::Null => AttrValue::Null,
        Json::Bool(b) => AttrValue::Bool(*b),
        Json::Number(n) => AttrValue::Number(n.as_f64().unwrap_or(0.0)),
        Json::String(s) if looks_unresolved(s) => AttrValue::Unresolved(s.clone()),
        Json::String(s) => AttrValue::String(s.clone()),
        Json::Array(items) => AttrValue::Sequence(items.iter().map(attr_from_json).collect()),
        Json::Object(entries) => AttrValue::Mapping(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), attr_from_json(v)))
                .collect(),
        ),
    }
}

/// Load resources from disk. `.json` files are read directly; anything else
/// is treated as a binary plan and rendered through `show -json` first.
pub fn load(path: &Path, prefer: Option<runner::Runner>) -> Result<Vec<Resource>> {
    let doc: Json = if path.extension().and_then(|s| s.to_str()) == Some("json") {
        let bytes =
            std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
        serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))?
    } else {
        let r = runner::pick_runner(prefer)?;
        runner::show_json(r, path)?
    };
    resources_from_json(&doc)
}

pub fn resources_from_json(doc: &Json) -> Result<Vec<Resource>> {
    if let Some(planned) = doc.get("planned_values") {
        let mut out = Vec::new();
        if let Some(root) = planned.get("root_module") {
            collect_module(root, &mut out);
        }
        Ok(out)
    } else if let Some(items) = doc.as_array() {
        items.iter().map(resource_from_dump).collect()
    } else {
        anyhow::bail!("unrecognized input: expected a terraform plan JSON or a resource array")
    }
}

fn collect_module(module: &Json, out: &mut Vec<Resource>) {
    if let Some(resources) = module.get("resources").and_then(Json::as_array) {
        for entry in resources {
            let (Some(address), Some(kind)) = (
                entry.get("address").and_then(Json::as_str),
                entry.get("type").and_then(Json::as_str),
            ) else {
                continue;
            };
            out.push(Resource::new(address, kind, body_of(entry.get("values"))));
        }
    }
    if let Some(children) = module.get("child_modules").and_then(Json::as_array) {
        for child in children {
            collect_module(child, out);
        }
    }
}

fn resource_from_dump(entry: &Json) -> Result<Resource> {
    let address = entry
        .get("address")
        .and_then(Json::as_str)
        .context("resource entry missing \"address\"")?;
    let kind = entry
        .get("type")
        .and_then(Json::as_str)
        .context("resource entry missing \"type\"")?;
    let body = entry.get("attributes").or_else(|| entry.get("values"));
    Ok(Resource::new(address, kind, body_of(body)))
}

fn body_of(body: Option<&Json>) -> AttributeMap {
    match body {
        Some(Json::Object(entries)) => entries
            .iter()
            .map(|(k, v)| (k.clone(), attr_from_json(v)))
            .collect(),
        _ => AttributeMap::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classifies_expression_strings_as_unresolved() {
        assert_eq!(
            attr_from_json(&json!("${merge(var.a, {X = \"y\"})}")),
            AttrValue::Unresolved("${merge(var.a, {X = \"y\"})}".into())
        );
        assert_eq!(
            attr_from_json(&json!("lookup(var.tags, \"Owner\")")),
            AttrValue::Unresolved("lookup(var.tags, \"Owner\")".into())
        );
        assert_eq!(
            attr_from_json(&json!("PT8H")),
            AttrValue::String("PT8H".into())
        );
        assert_eq!(
            attr_from_json(&json!("arn:aws:iam::aws:policy/AdministratorAccess")),
            AttrValue::String("arn:aws:iam::aws:policy/AdministratorAccess".into())
        );
    }

    #[test]
    fn list_wrapping_survives_ingest() {
        // unwrapping is the resolver's job at rule time, not the adapter's
        let raw = attr_from_json(&json!(["PT8H"]));
        assert_eq!(
            raw,
            AttrValue::Sequence(vec![AttrValue::String("PT8H".into())])
        );
    }

    #[test]
    fn walks_plan_documents_including_child_modules() {
        let doc = json!({
            "format_version": "1.2",
            "planned_values": {
                "root_module": {
                    "resources": [{
                        "address": "aws_ssoadmin_permission_set.admin",
                        "type": "aws_ssoadmin_permission_set",
                        "values": {
                            "name": "AdminAccess",
                            "session_duration": "PT4H",
                            "tags": {"Owner": "sre"}
                        }
                    }],
                    "child_modules": [{
                        "address": "module.sso",
                        "resources": [{
                            "address": "module.sso.aws_ssoadmin_managed_policy_attachment.ro",
                            "type": "aws_ssoadmin_managed_policy_attachment",
                            "values": {
                                "managed_policy_arn": "arn:aws:iam::aws:policy/ReadOnlyAccess"
                            }
                        }]
                    }]
                }
            }
        });
        let resources = resources_from_json(&doc).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].address, "aws_ssoadmin_permission_set.admin");
        assert_eq!(
            resources[0].attributes["tags"],
            AttrValue::Mapping(
                [("Owner".to_string(), AttrValue::String("sre".into()))]
                    .into_iter()
                    .collect()
            )
        );
        assert_eq!(resources[1].kind, "aws_ssoadmin_managed_policy_attachment");
    }

    #[test]
    fn accepts_flat_resource_dumps() {
        let doc = json!([{
            "address": "aws_ssoadmin_permission_set.batch",
            "type": "aws_ssoadmin_permission_set",
            "attributes": {
                "name": ["BatchReadOnly"],
                "session_duration": ["PT480M"]
            }
        }]);
        let resources = resources_from_json(&doc).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(
            resources[0].attributes["session_duration"],
            AttrValue::Sequence(vec![AttrValue::String("PT480M".into())])
        );
    }

    #[test]
    fn rejects_entries_without_identity() {
        let doc = json!([{ "type": "aws_ssoadmin_permission_set" }]);
        assert!(resources_from_json(&doc).is_err());
        assert!(resources_from_json(&json!("nope")).is_err());
    }

    #[test]
    fn loads_plan_json_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plan.json");
        std::fs::write(
            &path,
            serde_json::to_vec(&json!({
                "planned_values": {"root_module": {"resources": [{
                    "address": "aws_ssoadmin_permission_set.a",
                    "type": "aws_ssoadmin_permission_set",
                    "values": {"name": "ReadOnly"}
                }]}}
            }))
            .unwrap(),
        )
        .unwrap();
        let resources = load(&path, None).unwrap();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].attributes["name"], AttrValue::String("ReadOnly".into()));
    }
}
