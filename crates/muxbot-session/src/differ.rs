//! Output differ: "what appeared since the last capture".
//!
//! A pane capture is always a full redraw plus scrollback, never an
//! incremental feed. [`diff`] approximates the new part of `current` relative
//! to `previous`:
//!
//! 1. Nothing is new on the first observation or when the captures match.
//! 2. If `current` is longer and ends with the last [`TAIL_CHARS`] characters
//!    of `previous`, the text in front of the trailing `previous`-sized
//!    region is the new part.
//! 3. Otherwise both captures are split into lines (outer blank lines
//!    trimmed). Leading lines of `current` that also occur anywhere in
//!    `previous` are skipped; everything from the first unseen line on is new.
//!
//! Step 3 is a heuristic. Repeated lines in `previous` can make the walk stop
//! late or early, so streamed output may occasionally drop or repeat a line.

use std::collections::HashSet;

/// Size of the `previous` suffix probed by the append fast path.
pub const TAIL_CHARS: usize = 500;

/// New output in `current` relative to `previous`, or `None` if nothing is new.
pub fn diff(previous: &str, current: &str) -> Option<String> {
    if previous.is_empty() || previous == current {
        return None;
    }

    if let Some(grown) = appended_head(previous, current) {
        return non_blank(grown.to_string());
    }

    unseen_lines(previous, current)
}

/// Fast path: `current` grew and still ends with the tail of `previous`.
fn appended_head<'a>(previous: &str, current: &'a str) -> Option<&'a str> {
    if current.len() <= previous.len() || !current.ends_with(tail(previous, TAIL_CHARS)) {
        return None;
    }
    current.get(..current.len() - previous.len())
}

/// General path: first line of `current` not present in `previous`, onward.
fn unseen_lines(previous: &str, current: &str) -> Option<String> {
    let seen: HashSet<&str> = trimmed_lines(previous).into_iter().collect();
    let lines = trimmed_lines(current);

    let start = lines.iter().position(|line| !seen.contains(line))?;
    non_blank(lines[start..].join("\n").trim().to_string())
}

/// Lines of `text` with leading and trailing blank lines removed.
fn trimmed_lines(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let start = lines
        .iter()
        .position(|l| !l.trim().is_empty())
        .unwrap_or(lines.len());
    let end = lines
        .iter()
        .rposition(|l| !l.trim().is_empty())
        .map_or(start, |i| i + 1);
    lines[start..end].to_vec()
}

/// Last `n` characters of `s`.
fn tail(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    match s.char_indices().rev().nth(n - 1) {
        Some((idx, _)) => &s[idx..],
        None => s,
    }
}

fn non_blank(s: String) -> Option<String> {
    if s.trim().is_empty() {
        None
    } else {
        Some(s)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
