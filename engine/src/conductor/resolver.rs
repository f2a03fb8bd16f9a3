//! Dependency Resolver
//!
//! Substitutes `{{stepK_result}}` placeholders in step parameters with the
//! string results of steps that already ran in the same plan. Only backward
//! references can resolve; anything else stays verbatim.

use crate::conductor::types::ResultMap;
use sdk::Parameters;
use tracing::warn;

fn placeholder(index: usize) -> String {
    format!("{{{{step{}_result}}}}", index)
}

/// Escape a result so it can sit inside a serialized JSON string
fn escape_for_json(text: &str) -> String {
    let quoted = serde_json::Value::String(text.to_string()).to_string();
    quoted[1..quoted.len() - 1].to_string()
}

/// Rewrite `params` using the results gathered so far.
///
/// Never fails: if the rewritten text no longer parses, the original
/// parameters are returned.
pub fn resolve(params: &Parameters, results: &ResultMap) -> Parameters {
    if results.is_empty() {
        return params.clone();
    }

    let serialized = match serde_json::to_string(params) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "Failed to serialize step parameters");
            return params.clone();
        }
    };

    if !serialized.contains("{{step") {
        return params.clone();
    }

    let mut rewritten = serialized;
    for (index, result) in results {
        let token = placeholder(*index);
        if rewritten.contains(&token) {
            rewritten = rewritten.replace(&token, &escape_for_json(result));
        }
    }

    match serde_json::from_str(&rewritten) {
        Ok(resolved) => resolved,
        Err(e) => {
            warn!(error = %e, "Resolved parameters are not valid JSON, keeping originals");
            params.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn results(entries: &[(usize, &str)]) -> ResultMap {
        entries.iter().map(|(k, v)| (*k, v.to_string())).collect()
    }

    #[test]
    fn test_substitutes_earlier_result() {
        let params = Parameters::new().with("expression", "{{step1_result}}*2");
        let resolved = resolve(&params, &results(&[(1, "21")]));
        assert_eq!(resolved.str("expression").unwrap(), "21*2");
    }

    #[test]
    fn test_multiline_result_stays_valid() {
        let params = Parameters::new().with("response", "Files:\n{{step1_result}}");
        let resolved = resolve(&params, &results(&[(1, "a.txt\nb \"quoted\".txt")]));
        assert_eq!(
            resolved.str("response").unwrap(),
            "Files:\na.txt\nb \"quoted\".txt"
        );
    }

    #[test]
    fn test_forward_reference_left_verbatim() {
        let params = Parameters::new()
            .with("a", "{{step1_result}}")
            .with("b", "{{step3_result}}");
        let resolved = resolve(&params, &results(&[(1, "x")]));
        assert_eq!(resolved.str("a").unwrap(), "x");
        assert_eq!(resolved.str("b").unwrap(), "{{step3_result}}");
    }

    #[test]
    fn test_no_results_is_identity() {
        let params = Parameters::new().with("q", "{{step1_result}}");
        assert_eq!(resolve(&params, &ResultMap::new()), params);
    }

    #[test]
    fn test_step1_does_not_touch_step10() {
        let params = Parameters::new().with("q", "{{step10_result}}");
        let resolved = resolve(&params, &results(&[(1, "one")]));
        assert_eq!(resolved.str("q").unwrap(), "{{step10_result}}");
    }

    #[test]
    fn test_key_order_preserved() {
        let params = Parameters::new()
            .with("zeta", "{{step1_result}}")
            .with("alpha", 1);
        let resolved = resolve(&params, &results(&[(1, "z")]));
        let keys: Vec<&str> = resolved.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
