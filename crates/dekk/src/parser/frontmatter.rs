use std::sync::LazyLock;

use regex::Regex;

use super::metadata::Metadata;

/// A `---` fence on the first line, a block, and a closing `---` line that is
/// followed by a newline. The block match is lazy, so the first closing fence wins.
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---\n((?s:.*?))\n---\n").expect("valid frontmatter regex"));

/// The raw fenced block at the top of a document, if there is one.
///
/// Returns `(block, consumed_len)` where `consumed_len` covers both fences and
/// the trailing newline.
pub fn fenced_block(content: &str) -> Option<(&str, usize)> {
    let caps = FENCE.captures(content)?;
    let whole = caps.get(0)?;
    let block = caps.get(1)?;
    Some((block.as_str(), whole.end()))
}

/// Split one frontmatter line into a trimmed `(key, value)` pair.
///
/// The first colon separates key from value; lines without a colon, or with
/// nothing before it, are not pairs.
pub fn split_pair(line: &str) -> Option<(&str, &str)> {
    let colon = line.find(':')?;
    if colon == 0 {
        return None;
    }
    let key = line[..colon].trim();
    if key.is_empty() {
        return None;
    }
    Some((key, line[colon + 1..].trim()))
}

/// Extract deck metadata and return the remaining body.
///
/// The fenced block only counts as frontmatter when at least one usable
/// `key: value` pair survives key filtering. Otherwise the whole input is body,
/// so a deck that opens with a bare `---` rule keeps it as a separator.
pub fn extract(content: &str) -> (Metadata, &str) {
    let Some((block, consumed)) = fenced_block(content) else {
        return (Metadata::new(), content);
    };

    let mut meta = Metadata::new();
    let mut accepted = 0;
    for line in block.split('\n') {
        if let Some((key, value)) = split_pair(line) {
            if meta.insert(key, value) {
                accepted += 1;
            }
        }
    }

    if accepted == 0 {
        return (Metadata::new(), content);
    }
    (meta, &content[consumed..])
}
