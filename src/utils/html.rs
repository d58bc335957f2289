/// Escapes text for use in HTML element content and quoted attribute values.
pub fn escape(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

/// JSON embedded in a `<script>` block must not be able to close the block.
pub fn script_safe_json(json: &str) -> String {
    json.replace("</", "<\\/")
}

pub fn notice(kind: &str, message: &str) -> String {
    format!(
        r#"<div class="notice notice-{}"><p>{}</p></div>"#,
        escape(kind),
        escape(message)
    )
}
