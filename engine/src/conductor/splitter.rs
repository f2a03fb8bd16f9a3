//! Task Splitter
//!
//! Breaks one request into independent tasks when the user quotes them,
//! e.g. `"What time is it?" "List files in tools"`.

use regex::Regex;
use std::sync::OnceLock;

static QUOTED_SPAN: OnceLock<Regex> = OnceLock::new();

fn quoted_span() -> &'static Regex {
    QUOTED_SPAN.get_or_init(|| Regex::new(r#""([^"]*)""#).expect("Invalid quoted span pattern"))
}

/// Split raw input into tasks.
///
/// Every double-quoted span with non-empty content becomes its own task, in
/// left-to-right order, and unquoted text is dropped. Without such a span the
/// input is returned unchanged as the only task.
pub fn split(raw: &str) -> Vec<String> {
    let tasks: Vec<String> = quoted_span()
        .captures_iter(raw)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str())
        .filter(|span| !span.is_empty())
        .map(String::from)
        .collect();

    if tasks.is_empty() {
        vec![raw.to_string()]
    } else {
        tasks
    }
}
