/// Telegram rejects media captions longer than this many UTF-16 units (counted after entity parsing).
pub const CAPTION_LIMIT: usize = 1024;

/// Length as Telegram counts it: UTF-16 code units.
pub fn utf16_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Trim text to at most `max_units` UTF-16 code units, appending an ellipsis if trimmed.
/// Never splits a character, so astral-plane symbols are kept whole or dropped.
pub fn trim_with_ellipsis(text: &str, max_units: usize) -> String {
    if max_units == 0 { return String::new(); }
    if utf16_len(text) <= max_units { return text.to_string(); }
    if max_units == 1 { return "…".to_string(); }
    let budget = max_units - 1;
    let mut used = 0;
    let mut s = String::new();
    for c in text.chars() {
        if used + c.len_utf16() > budget { break; }
        used += c.len_utf16();
        s.push(c);
    }
    s.push('…');
    s
}

/// Escape every MarkdownV2 reserved character.
pub fn escape_markdown_v2(text: &str) -> String {
    const RESERVED: &[char] = &[
        '_', '*', '[', ']', '(', ')', '~', '`', '>', '#', '+', '-', '=', '|', '{', '}', '.', '!', '\\',
    ];
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if RESERVED.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Inside ``` blocks only the backtick and the backslash need escaping.
fn escape_code_block(text: &str) -> String {
    text.replace('\\', "\\\\").replace('`', "\\`")
}

// "```\n" + "\n```"
const FENCE_OVERHEAD: usize = 8;

/// Builds a MarkdownV2 caption from the commit message.
///
/// The message is shown as a fenced code block. When the block would not fit
/// into [`CAPTION_LIMIT`], the commit URL is used instead; without a URL the
/// message is trimmed so the block fits.
pub fn build_caption(commit_message: Option<&str>, commit_url: Option<&str>) -> Option<String> {
    let message = commit_message.map(str::trim).filter(|m| !m.is_empty())?;

    if utf16_len(message) + FENCE_OVERHEAD <= CAPTION_LIMIT {
        return Some(format!("```\n{}\n```", escape_code_block(message)));
    }

    match commit_url.map(str::trim).filter(|u| !u.is_empty()) {
        Some(url) => Some(escape_markdown_v2(&trim_with_ellipsis(url, CAPTION_LIMIT))),
        None => {
            let cut = trim_with_ellipsis(message, CAPTION_LIMIT - FENCE_OVERHEAD);
            Some(format!("```\n{}\n```", escape_code_block(&cut)))
        }
    }
}
