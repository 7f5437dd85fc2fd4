use regex::Regex;
use std::sync::LazyLock;

static HTML_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```html\n(.*?)\n```").expect("static regex"));

const DOCTYPE: &str = "<!DOCTYPE html>";

/// Pull the HTML document out of a model reply.
///
/// Order: the first ```` ```html ```` fence, then everything from the first
/// `<!DOCTYPE html>`, then the whole (trimmed) reply. Never fails.
pub fn extract_html(raw: &str) -> String {
    let text = raw.trim();

    if let Some(body) = HTML_FENCE.captures(text).and_then(|c| c.get(1)) {
        if !body.as_str().is_empty() {
            return body.as_str().trim().to_string();
        }
    }

    if let Some(start) = text.find(DOCTYPE) {
        return text[start..].to_string();
    }

    text.to_string()
}

/// Extracts the first top-level JSON object substring from a string.
/// Handles nested braces; returns None if not found.
pub fn extract_first_json_object(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut start = None;
    let mut depth = 0usize;

    for (i, &b) in bytes.iter().enumerate() {
        if b == b'{' {
            if start.is_none() {
                start = Some(i);
            }
            depth += 1;
        } else if b == b'}' && depth > 0 {
            depth -= 1;
            if depth == 0 {
                if let Some(st) = start {
                    return Some(s[st..=i].to_string());
                }
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fenced_block_contents_are_returned() {
        let raw = "Here you go:\n```html\n<!DOCTYPE html>\n<html><body>hi</body></html>\n```\nEnjoy!";
        assert_eq!(extract_html(raw), "<!DOCTYPE html>\n<html><body>hi</body></html>");
    }

    #[test]
    fn doctype_marker_used_without_fence() {
        let raw = "Sure thing.\n<!DOCTYPE html>\n<html></html>";
        assert_eq!(extract_html(raw), "<!DOCTYPE html>\n<html></html>");
    }

    #[test]
    fn raw_text_passes_through() {
        assert_eq!(extract_html("<div>partial</div>"), "<div>partial</div>");
        assert_eq!(extract_html("  no html at all \n"), "no html at all");
    }

    #[test]
    fn first_fence_wins() {
        let raw = "```html\n<p>a</p>\n```\n```html\n<p>b</p>\n```";
        assert_eq!(extract_html(raw), "<p>a</p>");
    }

    #[test]
    fn unterminated_fence_falls_back_to_marker() {
        let raw = "```html\n<!DOCTYPE html><html></html>";
        assert_eq!(extract_html(raw), "<!DOCTYPE html><html></html>");
    }

    #[test]
    fn json_object_found_inside_prose() {
        let s = "model says: {\"a\": {\"b\": 1}} trailing";
        assert_eq!(extract_first_json_object(s).as_deref(), Some("{\"a\": {\"b\": 1}}"));
        assert!(extract_first_json_object("nothing here").is_none());
    }
}
