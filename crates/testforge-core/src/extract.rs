//! Code extraction from free-form model output.
//!
//! [`extract_fenced_blocks`] is line oriented and keeps only fenced content.
//! [`sanitize`] is a string-level cleanup that removes any fence markers left
//! behind; the repair stage applies it after extraction.

const FENCE: &str = "```";

/// Concatenate the contents of every fenced block in `text`.
///
/// A fence opens on any trimmed line starting with three backticks (an
/// optional language tag may follow) and closes on a bare fence line. Lines
/// are kept verbatim, interior blank lines included; other fence-prefixed
/// lines inside a block are dropped. An unterminated fence
/// runs to the end of the text; text without fences yields an empty string.
pub fn extract_fenced_blocks(text: &str) -> String {
    let mut code_lines = Vec::new();
    let mut in_block = false;

    for line in text.lines() {
        let trimmed = line.trim();
        if !in_block {
            if is_opener(trimmed) {
                in_block = true;
            }
            continue;
        }
        if trimmed == FENCE {
            in_block = false;
            continue;
        }
        // A tagged marker inside an open block is never code.
        if trimmed.starts_with(FENCE) {
            continue;
        }
        code_lines.push(line);
    }

    code_lines.join("\n")
}

fn is_opener(trimmed: &str) -> bool {
    match trimmed.strip_prefix(FENCE) {
        Some(tag) => !tag.starts_with('`') && !tag.contains(char::is_whitespace),
        None => false,
    }
}

/// Strip residual fence markers, tagged or bare, and surrounding whitespace.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find(FENCE) {
        out.push_str(&rest[..idx]);
        rest = rest[idx + FENCE.len()..].trim_start_matches(is_tag_char);
    }
    out.push_str(rest);
    out.trim().to_string()
}

fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '+' | '.' | '-')
}
