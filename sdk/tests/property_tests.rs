use proptest::prelude::*;
use sdk::errors::{EngineError, NexusErrorExt};
use sdk::types::{value_to_text, Parameters};

// Every error variant yields a non-empty, static user hint that never echoes
// the raw message it was built from.
proptest! {
    #[test]
    fn test_error_user_hint_completeness(error_str in "[a-z]{12,24}") {
        let errs = vec![
            EngineError::Config(error_str.clone()),
            EngineError::ToolError(error_str.clone()),
            EngineError::MissingParameter(error_str.clone()),
            EngineError::Calculation(error_str.clone()),
            EngineError::Network(error_str.clone()),
            EngineError::PathDenied(std::path::PathBuf::from(&error_str)),
            EngineError::Persistence {
                path: std::path::PathBuf::from(&error_str),
                message: error_str.clone(),
            },
        ];

        for err in errs {
            let hint = err.user_hint();
            prop_assert!(!hint.is_empty());
            prop_assert!(!hint.contains(&error_str));
        }
    }
}

// Parameters survive a JSON round-trip with keys in their original order.
proptest! {
    #[test]
    fn test_parameters_json_roundtrip(
        entries in proptest::collection::vec(("[a-z_]{1,10}", "\\PC{0,20}"), 0..8)
    ) {
        let mut params = Parameters::new();
        for (k, v) in &entries {
            params.insert(k.clone(), v.clone());
        }

        let text = serde_json::to_string(&params).unwrap();
        let parsed: Parameters = serde_json::from_str(&text).unwrap();

        prop_assert_eq!(&parsed, &params);
        let original: Vec<&String> = params.iter().map(|(k, _)| k).collect();
        let reloaded: Vec<&String> = parsed.iter().map(|(k, _)| k).collect();
        prop_assert_eq!(original, reloaded);
    }
}

proptest! {
    #[test]
    fn test_string_values_render_verbatim(s in "\\PC*") {
        prop_assert_eq!(value_to_text(&serde_json::Value::String(s.clone())), s);
    }
}
