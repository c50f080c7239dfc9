use std::sync::LazyLock;

use regex::Regex;

use super::metadata::Metadata;

/// `<!-- key: value -->` on a single (already trimmed) line.
static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^<!--\s*([A-Za-z0-9_]+)\s*:\s*(.+?)\s*-->$").expect("valid directive regex")
});

/// Parse one trimmed line as a directive.
pub fn parse_directive(line: &str) -> Option<(&str, &str)> {
    let caps = DIRECTIVE.captures(line)?;
    Some((caps.get(1)?.as_str(), caps.get(2)?.as_str()))
}

/// Pull leading directive comments off a slide chunk.
///
/// Blank lines and directives are consumed until the first line that is
/// neither. If nothing but directives remain, the content falls back to the
/// whole trimmed chunk so that the slide is never empty.
pub fn extract(chunk: &str) -> (Metadata, String) {
    let mut meta = Metadata::new();
    let lines: Vec<&str> = chunk.split('\n').collect();
    let mut content_start = 0;

    for (i, line) in lines.iter().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            content_start = i + 1;
            continue;
        }
        if let Some((key, value)) = parse_directive(trimmed) {
            meta.insert(key, value);
            content_start = i + 1;
            continue;
        }
        break;
    }

    let rest = lines[content_start..].join("\n");
    let rest = rest.trim();
    let content = if rest.is_empty() { chunk.trim() } else { rest };
    (meta, content.to_string())
}
