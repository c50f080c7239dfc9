/// Split a document body (after frontmatter extraction) into raw slide chunks.
///
/// Every thematic-break line ends the current chunk, with or without blank
/// lines around it. Chunks are returned trimmed, and empty ones are dropped,
/// so leading, trailing and doubled separators never produce blank slides.
pub fn split(body: &str) -> Vec<String> {
    let body = body.replace("\r\n", "\n");

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in body.split('\n') {
        if is_thematic_break(line) {
            push_chunk(&mut chunks, &current);
            current.clear();
        } else {
            current.push(line);
        }
    }
    push_chunk(&mut chunks, &current);

    chunks
}

/// Number of slides `split` would produce, without allocating the chunks.
pub fn count(body: &str) -> usize {
    let mut slides = 0;
    let mut has_content = false;
    for line in body.split('\n') {
        if is_thematic_break(line) {
            if has_content {
                slides += 1;
            }
            has_content = false;
        } else if !line.trim().is_empty() {
            has_content = true;
        }
    }
    if has_content {
        slides += 1;
    }
    slides
}

fn push_chunk(chunks: &mut Vec<String>, lines: &[&str]) {
    let text = lines.join("\n");
    let trimmed = text.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}

/// A markdown thematic break: three or more of the same `-`, `*` or `_`,
/// optionally separated by whitespace, and nothing else on the line.
///
/// Table delimiter rows (`|---|---|`) and emphasis runs (`**bold**`) fail
/// because of the other characters on the line.
pub fn is_thematic_break(line: &str) -> bool {
    let trimmed = line.trim();
    let Some(marker) = trimmed.chars().next() else {
        return false;
    };
    if !matches!(marker, '-' | '*' | '_') {
        return false;
    }

    let mut marks = 0;
    for c in trimmed.chars() {
        if c == marker {
            marks += 1;
        } else if !c.is_whitespace() {
            return false;
        }
    }
    marks >= 3
}
