//! Batch evaluation of the (rule x resource) matrix. Every check is a pure
//! function over immutable inputs, so the matrix can be partitioned across
//! worker threads without locking and re-running a batch is idempotent.

use std::time::Instant;

use tfaudit_core::{EvaluationResult, Resource};

use crate::rule::{Registry, RuleDefinition};

pub fn evaluate(registry: &Registry, resources: &[Resource]) -> Vec<EvaluationResult> {
    evaluate_with_deadline(registry, resources, None)
}

/// Evaluate with an optional batch deadline. Pairs finished before the
/// deadline passes are returned; the remainder of the matrix is skipped.
pub fn evaluate_with_deadline(
    registry: &Registry,
    resources: &[Resource],
    deadline: Option<Instant>,
) -> Vec<EvaluationResult> {
    let mut results = Vec::new();
    for resource in resources {
        for rule in registry.rules_for(&resource.kind) {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::warn!(
                    completed = results.len(),
                    "batch deadline reached, returning partial results"
                );
                return results;
            }
            results.push(run_one(rule, resource));
        }
    }
    results
}

/// Partition the resource list across scoped worker threads. Chunks are
/// concatenated in input order, so the output is identical to the
/// sequential path.
pub fn evaluate_parallel(
    registry: &Registry,
    resources: &[Resource],
    workers: usize,
) -> Vec<EvaluationResult> {
    let workers = workers.clamp(1, resources.len().max(1));
    if workers == 1 {
        return evaluate(registry, resources);
    }
    let chunk_len = resources.len().div_ceil(workers);
    let mut results = Vec::new();
    std::thread::scope(|scope| {
        let handles: Vec<_> = resources
            .chunks(chunk_len)
            .map(|chunk| scope.spawn(move || evaluate(registry, chunk)))
            .collect();
        for handle in handles {
            results.extend(handle.join().expect("rule checks do not panic"));
        }
    });
    results
}

fn run_one(rule: &RuleDefinition, resource: &Resource) -> EvaluationResult {
    let outcome = rule.check(&resource.attributes);
    tracing::debug!(
        rule = rule.id,
        resource = %resource.address,
        verdict = %outcome.verdict,
        "evaluated"
    );
    EvaluationResult {
        rule_id: rule.id.to_string(),
        resource_address: resource.address.clone(),
        verdict: outcome.verdict,
        detail: outcome.detail,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use tfaudit_core::{AttrValue, AttributeMap, Verdict};

    use super::*;
    use crate::catalog::{build_registry, PERMISSION_SET};
    use crate::config::PolicyConfig;

    fn permission_set(address: &str, name: &str, duration: &str) -> Resource {
        let attributes: AttributeMap = [
            ("name", AttrValue::String(name.into())),
            ("session_duration", AttrValue::String(duration.into())),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
        Resource::new(address, PERMISSION_SET, attributes)
    }

    fn fleet(count: usize) -> Vec<Resource> {
        (0..count)
            .map(|i| permission_set(&format!("module.sso.ps[{i}]"), &format!("Set{i}"), "PT4H"))
            .collect()
    }

    #[test]
    fn produces_one_result_per_applicable_pair() {
        let registry = build_registry(&PolicyConfig::default());
        let resources = vec![
            permission_set("a", "ReadOnly", "PT4H"),
            Resource::new("b", "aws_s3_bucket", AttributeMap::new()),
        ];
        let results = evaluate(&registry, &resources);
        // five permission-set rules apply to "a", nothing applies to "b"
        assert_eq!(results.len(), 5);
        assert!(results.iter().all(|r| r.resource_address == "a"));
    }

    #[test]
    fn rerunning_an_unchanged_batch_is_idempotent() {
        let registry = build_registry(&PolicyConfig::default());
        let resources = fleet(7);
        assert_eq!(
            evaluate(&registry, &resources),
            evaluate(&registry, &resources)
        );
    }

    #[test]
    fn parallel_output_equals_sequential_output() {
        let registry = build_registry(&PolicyConfig::default());
        let resources = fleet(23);
        let sequential = evaluate(&registry, &resources);
        for workers in [1, 2, 4, 64] {
            assert_eq!(evaluate_parallel(&registry, &resources, workers), sequential);
        }
    }

    #[test]
    fn expired_deadline_yields_a_valid_partial_result_set() {
        let registry = build_registry(&PolicyConfig::default());
        let resources = fleet(5);
        let expired = Instant::now() - Duration::from_secs(1);
        assert!(evaluate_with_deadline(&registry, &resources, Some(expired)).is_empty());

        let generous = Instant::now() + Duration::from_secs(60);
        assert_eq!(
            evaluate_with_deadline(&registry, &resources, Some(generous)).len(),
            evaluate(&registry, &resources).len()
        );
    }

    #[test]
    fn verdicts_carry_through_to_results() {
        let registry = build_registry(&PolicyConfig::default());
        let resources = vec![permission_set("admin", "AdminAccess", "PT2H")];
        let results = evaluate(&registry, &resources);
        let by_rule = |id: &str| {
            results
                .iter()
                .find(|r| r.rule_id == id)
                .map(|r| r.verdict)
                .unwrap()
        };
        assert_eq!(by_rule("session-duration"), Verdict::Compliant);
        assert_eq!(by_rule("separation-of-duties"), Verdict::NonCompliant);
        assert_eq!(by_rule("privilege-boundary"), Verdict::NonCompliant);
    }
}
