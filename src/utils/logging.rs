use serde::Serialize;

/// Pretty-prints `value` for `log_action` only when DEBUG is enabled.
pub(crate) fn with_pretty_json_debug<T, F>(value: &T, log_action: F)
where
    T: Serialize + ?Sized,
    F: FnOnce(&str),
{
    if !tracing::enabled!(tracing::Level::DEBUG) {
        return;
    }

    let pretty_json = serde_json::to_string_pretty(value)
        .unwrap_or_else(|error| format!("<pretty serialize failed: {error}>"));
    log_action(pretty_json.as_str());
}

/// Body excerpt for log lines, cut at a char boundary.
pub(crate) fn body_excerpt(bytes: &[u8], max_chars: usize) -> String {
    let text = String::from_utf8_lossy(bytes);
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...<truncated>", &text[..idx]),
        None => text.into_owned(),
    }
}
