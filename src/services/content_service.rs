use serde_json::Value as JsonValue;

pub struct ContentService;

impl ContentService {
    /// Picks the HTML carried by a report's `content`.
    ///
    /// `content` is either a JSON document with an `html` string field or
    /// literal HTML. Anything that does not parse as JSON, or parses without an
    /// `html` string, is taken verbatim.
    pub fn resolve_html(content: &str) -> String {
        match serde_json::from_str::<JsonValue>(content) {
            Ok(doc) => match doc.get("html").and_then(|h| h.as_str()) {
                Some(html) => html.to_string(),
                None => content.to_string(),
            },
            Err(_) => content.to_string(),
        }
    }

    /// Allow-list sanitizing: scripts, event handlers and `javascript:` URLs
    /// are removed, ordinary formatting markup is kept.
    pub fn sanitize_html(html: &str) -> String {
        ammonia::clean(html)
    }

    pub fn render(content: &str) -> String {
        Self::sanitize_html(&Self::resolve_html(content))
    }

    /// Plain-text rendering for the PDF export. Block-level closing tags become
    /// line breaks.
    pub fn strip_html(input: &str) -> String {
        let mut result = String::new();
        let mut tag = String::new();
        let mut inside_tag = false;

        for c in input.chars() {
            if c == '<' {
                inside_tag = true;
                tag.clear();
            } else if c == '>' {
                inside_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split_whitespace()
                    .next()
                    .unwrap_or("")
                    .to_ascii_lowercase();
                if matches!(
                    name.as_str(),
                    "p" | "br" | "br/" | "div" | "li" | "h1" | "h2" | "h3" | "h4" | "tr"
                ) {
                    result.push('\n');
                }
            } else if inside_tag {
                tag.push(c);
            } else {
                result.push(c);
            }
        }

        let decoded = result
            .replace("&nbsp;", " ")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&amp;", "&");

        decoded
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
