//! Reasoning-trace removal
//!
//! Reasoning models wrap their chain of thought in `<think>`...`</think>`.
//! The trace is streamed to the viewer like any other output, but it is cut
//! out before the reply becomes the other model's prompt.

use regex::Regex;
use std::sync::LazyLock;

pub const OPEN_MARKER: &str = "<think>";
pub const CLOSE_MARKER: &str = "</think>";

/// Shortest span from an opening marker to the next closing marker,
/// newlines included
static REASONING_SPAN: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        "(?s){}.*?{}",
        regex::escape(OPEN_MARKER),
        regex::escape(CLOSE_MARKER)
    );
    Regex::new(&pattern).expect("invalid REASONING_SPAN regex")
});

/// Remove every reasoning span from a completed reply.
///
/// An opening marker with no closing marker after it is left in place.
pub fn strip_reasoning(text: &str) -> String {
    REASONING_SPAN.replace_all(text, "").into_owned()
}
