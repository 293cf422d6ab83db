//! Compact output rendering helpers for CLI surfaces.
//!
//! Keeps listing and result output bounded and readable while preserving
//! signal.

/// Collapse newlines/extra whitespace and bound length for terminal display.
pub fn compact_line(input: &str, max_chars: usize) -> String {
    let collapsed = input.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = collapsed.chars();
    let preview: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}...", preview)
    } else {
        preview
    }
}

/// Shorten an identifier for table columns: full ids go in JSON output,
/// eight leading chars are plenty on screen.
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// Render an epoch-milliseconds timestamp the way the listing shows it.
pub fn format_timestamp(millis: Option<i64>) -> String {
    match millis {
        Some(ms) if ms > 0 => {
            let secs = ms / 1000;
            format!("{secs}Z")
        }
        _ => "-".to_string(),
    }
}
