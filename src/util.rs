use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// Shortens a label to at most `max_chars` characters, ending in `…` when cut.
pub fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_owned();
    }
    let kept = max_chars.saturating_sub(1);
    let mut truncated = label.chars().take(kept).collect::<String>();
    truncated.push('…');
    truncated
}

/// Date part of an ISO-8601 timestamp, or the input unchanged.
pub fn format_created_at(timestamp: &str) -> &str {
    timestamp
        .split_once('T')
        .map(|(date, _)| date)
        .unwrap_or(timestamp)
}

/// Deterministic pair in `[-1, 1]` derived from `seed`.
pub fn stable_pair(seed: impl Hash) -> (f32, f32) {
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);
    let hash = hasher.finish();

    let x = ((hash & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    let y = (((hash >> 32) & 0xffff_ffff) as f64 / u32::MAX as f64) as f32;
    ((x * 2.0) - 1.0, (y * 2.0) - 1.0)
}
