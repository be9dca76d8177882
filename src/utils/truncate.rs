//! Truncation Utilities
//!
//! Shortens long tool output (file reads, API payloads) for display while
//! keeping both ends and respecting UTF-8 boundaries.

const APPROX_BYTES_PER_LINE: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TruncationPolicy {
    Bytes(usize),
    Lines(usize),
}

impl TruncationPolicy {
    pub fn byte_budget(&self) -> usize {
        match self {
            TruncationPolicy::Bytes(b) => *b,
            TruncationPolicy::Lines(l) => l.saturating_mul(APPROX_BYTES_PER_LINE),
        }
    }
}

/// Keep the head and tail of `content` within the policy's byte budget
pub fn truncate_text(content: &str, policy: TruncationPolicy) -> String {
    let max_bytes = policy.byte_budget();

    if content.len() <= max_bytes {
        return content.to_string();
    }

    if max_bytes == 0 {
        return format!("... [{} bytes truncated] ...", content.len());
    }

    let half = max_bytes / 2;

    let prefix_end = content
        .char_indices()
        .map(|(idx, c)| idx + c.len_utf8())
        .take_while(|end| *end <= half)
        .last()
        .unwrap_or(0);

    let suffix_target = content.len().saturating_sub(half);
    let suffix_start = content
        .char_indices()
        .map(|(idx, _)| idx)
        .find(|idx| *idx >= suffix_target)
        .unwrap_or(content.len())
        .max(prefix_end);

    let prefix = &content[..prefix_end];
    let suffix = &content[suffix_start..];
    let truncated = content.len() - (prefix.len() + suffix.len());

    format!("{} ... [{} bytes truncated] ... {}", prefix, truncated, suffix)
}
