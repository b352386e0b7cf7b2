/// Escapes `& < > " '` for interpolation into HTML. Single pass, so already
/// escaped input gets escaped again.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len() + text.len() / 8);

    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }

    escaped
}

/// Escapes `text` and turns its line breaks into `<br>`.
pub fn escape_multiline(text: &str) -> String {
    escape_html(text).replace('\n', "<br>")
}
