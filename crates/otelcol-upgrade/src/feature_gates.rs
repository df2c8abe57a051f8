//! Feature-gate argument editing
//!
//! The `feature-gates` argument holds a comma-joined list of tokens, each
//! optionally prefixed with `+` (enable) or `-` (disable).

use std::collections::BTreeMap;

/// Argument key holding the feature-gate list
pub const FEATURE_GATES_ARG: &str = "feature-gates";

/// Tokens of the feature-gate argument in order
pub fn feature_gates(args: &BTreeMap<String, String>) -> impl Iterator<Item = &str> {
    args.get(FEATURE_GATES_ARG)
        .map(|value| value.split(','))
        .into_iter()
        .flatten()
}

/// Remove the exact token `gate`
///
/// The argument is deleted when no token remains. Returns `true` when the
/// token was present.
///
/// # Examples
/// ```
/// # use std::collections::BTreeMap;
/// # use otelcol_upgrade::feature_gates::remove_feature_gate;
/// let mut args = BTreeMap::from([("feature-gates".to_string(), "-foo,bar".to_string())]);
/// assert!(remove_feature_gate(&mut args, "-foo"));
/// assert_eq!(args["feature-gates"], "bar");
/// ```
pub fn remove_feature_gate(args: &mut BTreeMap<String, String>, gate: &str) -> bool {
    let Some(value) = args.get(FEATURE_GATES_ARG) else {
        return false;
    };
    let tokens: Vec<&str> = value.split(',').collect();
    if !tokens.contains(&gate) {
        return false;
    }

    let remaining: Vec<&str> = tokens.into_iter().filter(|token| *token != gate).collect();
    if remaining.is_empty() {
        args.remove(FEATURE_GATES_ARG);
    } else {
        let joined = remaining.join(",");
        args.insert(FEATURE_GATES_ARG.to_string(), joined);
    }
    true
}

/// Append `gate` unless a token for the same gate is already present
///
/// A token for the same gate with either sign counts as present, so an
/// explicit operator choice is kept. Returns `true` when the token was added.
pub fn add_feature_gate(args: &mut BTreeMap<String, String>, gate: &str) -> bool {
    let name = gate_name(gate);
    if feature_gates(args).any(|token| gate_name(token) == name) {
        return false;
    }

    match args.get_mut(FEATURE_GATES_ARG) {
        Some(value) if !value.is_empty() => {
            value.push(',');
            value.push_str(gate);
        }
        _ => {
            args.insert(FEATURE_GATES_ARG.to_string(), gate.to_string());
        }
    }
    true
}

fn gate_name(token: &str) -> &str {
    token.trim_start_matches(['+', '-'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn args(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn remove_keeps_other_tokens() {
        let mut a = args(&[("feature-gates", "-foo,bar")]);
        assert!(remove_feature_gate(&mut a, "-foo"));
        assert_eq!(a, args(&[("feature-gates", "bar")]));
    }

    #[test]
    fn remove_last_token_deletes_key() {
        let mut a = args(&[("feature-gates", "-foo")]);
        assert!(remove_feature_gate(&mut a, "-foo"));
        assert!(a.is_empty());
    }

    #[test]
    fn remove_without_key_is_noop() {
        let mut a = args(&[("foo", "bar")]);
        assert!(!remove_feature_gate(&mut a, "-foo"));
        assert_eq!(a, args(&[("foo", "bar")]));
    }

    #[test]
    fn remove_matches_exact_token_only() {
        let mut a = args(&[("feature-gates", "+foo,foo.bar")]);
        assert!(!remove_feature_gate(&mut a, "-foo"));
        assert!(!remove_feature_gate(&mut a, "foo"));
        assert_eq!(a, args(&[("feature-gates", "+foo,foo.bar")]));
    }

    #[test]
    fn add_appends_once() {
        let mut a = args(&[("feature-gates", "bar")]);
        assert!(add_feature_gate(&mut a, "-foo"));
        assert!(!add_feature_gate(&mut a, "-foo"));
        assert_eq!(a, args(&[("feature-gates", "bar,-foo")]));
    }

    #[test]
    fn add_respects_explicit_choice() {
        let mut a = args(&[("feature-gates", "+foo")]);
        assert!(!add_feature_gate(&mut a, "-foo"));
        assert_eq!(a, args(&[("feature-gates", "+foo")]));
    }

    #[test]
    fn add_creates_key() {
        let mut a = BTreeMap::new();
        assert!(add_feature_gate(&mut a, "-foo"));
        assert_eq!(a, args(&[("feature-gates", "-foo")]));
    }

    proptest! {
        #[test]
        fn remove_preserves_order_of_survivors(
            tokens in proptest::collection::vec("[+-]?[a-z]{1,6}", 1..8),
            pick in any::<proptest::sample::Index>(),
        ) {
            let gate = tokens[pick.index(tokens.len())].clone();
            let mut a = args(&[("feature-gates", &tokens.join(","))]);
            prop_assert!(remove_feature_gate(&mut a, &gate));

            let expected: Vec<&String> = tokens.iter().filter(|t| **t != gate).collect();
            let actual: Vec<&str> = feature_gates(&a).collect();
            prop_assert_eq!(actual.len(), expected.len());
            for (actual, expected) in actual.iter().zip(expected) {
                prop_assert_eq!(*actual, expected.as_str());
            }
            prop_assert!(!remove_feature_gate(&mut a, &gate));
        }
    }
}
