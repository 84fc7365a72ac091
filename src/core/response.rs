//! Response sizing utilities for Discord limits
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Add `paginate_lines` for paginated replies, fold truncation helpers into `truncate`
//! - 1.0.0: Message chunking

/// Discord embed description limit
pub const EMBED_LIMIT: usize = 4096;
/// Discord message content limit
pub const MESSAGE_LIMIT: usize = 2000;

/// Chunk text into pieces of at most `max_size` bytes (UTF-8 safe, line-aware)
///
/// Splits at newlines when possible and falls back to character splitting for
/// lines longer than `max_size`.
pub fn chunk_text(text: &str, max_size: usize) -> Vec<String> {
    if text.len() <= max_size {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        let needed = line.len() + 1;
        if current.len() + needed > max_size {
            if !current.is_empty() {
                chunks.push(current.trim_end().to_string());
                current.clear();
            }
            if needed > max_size {
                chunks.extend(split_long_line(line, max_size));
                continue;
            }
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.is_empty() {
        chunks.push(current.trim_end().to_string());
    }
    chunks
}

fn split_long_line(line: &str, max_size: usize) -> Vec<String> {
    let mut result = Vec::new();
    let mut current = String::new();

    for ch in line.chars() {
        if current.len() + ch.len_utf8() > max_size && !current.is_empty() {
            result.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        result.push(current);
    }
    result
}

/// Chunk text for message content (2000 character limit)
pub fn chunk_for_message(text: &str) -> Vec<String> {
    chunk_text(text, MESSAGE_LIMIT)
}

/// Truncate text to `limit` bytes on a character boundary, adding an ellipsis if cut
pub fn truncate(text: &str, limit: usize) -> String {
    if text.len() <= limit {
        return text.to_string();
    }
    let mut end = limit.saturating_sub(3);
    while end > 0 && !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}

/// Group lines into pages of at most `per_page` lines each
pub fn paginate_lines<S: AsRef<str>>(lines: &[S], per_page: usize) -> Vec<String> {
    lines
        .chunks(per_page.max(1))
        .map(|page| {
            page.iter()
                .map(|l| l.as_ref())
                .collect::<Vec<_>>()
                .join("\n")
        })
        .collect()
}
