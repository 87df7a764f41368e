/// Find the largest byte offset <= `max_bytes` that falls on a UTF-8 char boundary.
pub(crate) fn floor_char_boundary(text: &str, max_bytes: usize) -> usize {
    if max_bytes >= text.len() {
        return text.len();
    }
    // Walk backwards from max_bytes until we hit a char boundary
    let mut i = max_bytes;
    while i > 0 && !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Truncate a string to approximately `max_bytes` bytes on a line boundary.
/// Never splits a multi-byte character.
pub fn truncate_on_line_boundary(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let safe_end = floor_char_boundary(text, max_bytes);
    match text[..safe_end].rfind('\n') {
        Some(pos) => &text[..pos],
        None => &text[..safe_end],
    }
}

/// Trim tool output for embedding in a comment, marking when it was cut.
pub fn clip_output(text: &str, max_bytes: usize) -> String {
    let trimmed = text.trim_end();
    let clipped = truncate_on_line_boundary(trimmed, max_bytes);
    if clipped.len() < trimmed.len() {
        format!("{clipped}\n… (output truncated)")
    } else {
        clipped.to_string()
    }
}

/// Turn a snake_case event name into a title ("dependabot_alert" → "Dependabot Alert").
pub fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
