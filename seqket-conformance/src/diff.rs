//! Line-based unified diff between a reference document and a conversion
//! result.
//!
//! Texts are split at every Unicode line boundary, so line terminator style and a
//! trailing terminator do not count as differences. Output follows the usual
//! unified format: `---`/`+++` headers, then hunks with three lines of
//! context.

use std::fmt;
use std::ops::Range;

/// Unchanged lines kept around each change.
pub const CONTEXT_LINES: usize = 3;

/// Upper bound on LCS table cells for the changed middle section. Beyond it
/// the whole middle is reported as one replaced block.
const MAX_LCS_CELLS: usize = 4 * 1024 * 1024;

/// Ordered unified-diff lines. Empty means the texts are line-equal.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnifiedDiff {
    lines: Vec<String>,
}

impl UnifiedDiff {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Number of `@@` hunks.
    pub fn hunk_count(&self) -> usize {
        self.lines.iter().filter(|l| l.starts_with("@@ ")).count()
    }
}

impl fmt::Display for UnifiedDiff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tag {
    Equal,
    /// Lines removed from `a` and/or inserted from `b`.
    Change,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Opcode {
    tag: Tag,
    a: Range<usize>,
    b: Range<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Keep,
    Delete,
    Insert,
}

/// Compute the unified diff from `expected` (old side) to `actual` (new side).
pub fn unified_diff(expected: &str, actual: &str, from_label: &str, to_label: &str) -> UnifiedDiff {
    let a = split_lines(expected);
    let b = split_lines(actual);

    if a == b {
        return UnifiedDiff::default();
    }

    let ops = opcodes(&a, &b, MAX_LCS_CELLS);

    let mut lines = vec![format!("--- {}", from_label), format!("+++ {}", to_label)];
    for group in group_opcodes(ops, CONTEXT_LINES) {
        let (first, last) = match (group.first(), group.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => continue,
        };
        lines.push(format!(
            "@@ -{} +{} @@",
            format_range(first.a.start, last.a.end),
            format_range(first.b.start, last.b.end)
        ));

        for op in &group {
            match op.tag {
                Tag::Equal => {
                    lines.extend(a[op.a.clone()].iter().map(|l| format!(" {}", l)));
                }
                Tag::Change => {
                    lines.extend(a[op.a.clone()].iter().map(|l| format!("-{}", l)));
                    lines.extend(b[op.b.clone()].iter().map(|l| format!("+{}", l)));
                }
            }
        }
    }

    UnifiedDiff { lines }
}

/// Split `text` at line boundaries, dropping the terminators.
///
/// Boundaries are `\n`, `\r`, `\r\n` (one break), `\x0b`, `\x0c`,
/// `\x1c`..`\x1e`, `\u{85}`, `\u{2028}` and `\u{2029}`. A terminator at the
/// very end does not start another line.
fn split_lines(text: &str) -> Vec<&str> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut chars = text.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        let end = match c {
            '\r' => match chars.peek() {
                Some((_, '\n')) => {
                    chars.next();
                    i + 2
                }
                _ => i + 1,
            },
            '\n' | '\x0b' | '\x0c' | '\x1c' | '\x1d' | '\x1e' | '\u{85}' | '\u{2028}'
            | '\u{2029}' => i + c.len_utf8(),
            _ => continue,
        };
        lines.push(&text[start..i]);
        start = end;
    }

    if start < text.len() {
        lines.push(&text[start..]);
    }
    lines
}

/// Hunk range: `start` when the length is one, `start-1,0` when empty.
fn format_range(start: usize, stop: usize) -> String {
    let length = stop - start;
    match length {
        0 => format!("{},0", start),
        1 => format!("{}", start + 1),
        _ => format!("{},{}", start + 1, length),
    }
}

/// Edit script from `a` to `b`, folded into equal/change runs.
fn opcodes(a: &[&str], b: &[&str], max_cells: usize) -> Vec<Opcode> {
    let prefix = a.iter().zip(b).take_while(|(x, y)| x == y).count();
    let suffix = a[prefix..]
        .iter()
        .rev()
        .zip(b[prefix..].iter().rev())
        .take_while(|(x, y)| x == y)
        .count();

    let mid_a = &a[prefix..a.len() - suffix];
    let mid_b = &b[prefix..b.len() - suffix];

    let mut steps = vec![Step::Keep; prefix];
    steps.extend(middle_steps(mid_a, mid_b, max_cells));
    steps.extend(std::iter::repeat(Step::Keep).take(suffix));

    fold_steps(&steps)
}

/// LCS walk over the section between the common prefix and suffix.
fn middle_steps(a: &[&str], b: &[&str], max_cells: usize) -> Vec<Step> {
    let (n, m) = (a.len(), b.len());
    let width = m + 1;

    let cells = (n + 1).saturating_mul(width);
    if n == 0 || m == 0 || cells > max_cells {
        let mut steps = vec![Step::Delete; n];
        steps.extend(std::iter::repeat(Step::Insert).take(m));
        return steps;
    }

    // lcs[i * width + j] = LCS length of a[i..] and b[j..]
    let mut lcs = vec![0u32; cells];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            lcs[i * width + j] = if a[i] == b[j] {
                lcs[(i + 1) * width + j + 1] + 1
            } else {
                lcs[(i + 1) * width + j].max(lcs[i * width + j + 1])
            };
        }
    }

    let mut steps = Vec::with_capacity(n + m);
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if a[i] == b[j] {
            steps.push(Step::Keep);
            i += 1;
            j += 1;
        } else if lcs[(i + 1) * width + j] >= lcs[i * width + j + 1] {
            steps.push(Step::Delete);
            i += 1;
        } else {
            steps.push(Step::Insert);
            j += 1;
        }
    }
    steps.extend(std::iter::repeat(Step::Delete).take(n - i));
    steps.extend(std::iter::repeat(Step::Insert).take(m - j));
    steps
}

fn fold_steps(steps: &[Step]) -> Vec<Opcode> {
    let mut ops: Vec<Opcode> = Vec::new();
    let (mut i, mut j) = (0, 0);

    for step in steps {
        let (tag, next_i, next_j) = match step {
            Step::Keep => (Tag::Equal, i + 1, j + 1),
            Step::Delete => (Tag::Change, i + 1, j),
            Step::Insert => (Tag::Change, i, j + 1),
        };

        match ops.last_mut() {
            Some(last) if last.tag == tag => {
                last.a.end = next_i;
                last.b.end = next_j;
            }
            _ => ops.push(Opcode {
                tag,
                a: i..next_i,
                b: j..next_j,
            }),
        }

        i = next_i;
        j = next_j;
    }

    ops
}

/// Split opcodes into hunks, trimming equal runs to `n` lines of context.
fn group_opcodes(mut codes: Vec<Opcode>, n: usize) -> Vec<Vec<Opcode>> {
    if let Some(first) = codes.first_mut() {
        if first.tag == Tag::Equal {
            first.a.start = first.a.start.max(first.a.end.saturating_sub(n));
            first.b.start = first.b.start.max(first.b.end.saturating_sub(n));
        }
    }
    if let Some(last) = codes.last_mut() {
        if last.tag == Tag::Equal {
            last.a.end = last.a.end.min(last.a.start + n);
            last.b.end = last.b.end.min(last.b.start + n);
        }
    }

    let mut groups = Vec::new();
    let mut group = Vec::new();

    for mut op in codes {
        if op.tag == Tag::Equal && op.a.len() > n * 2 {
            group.push(Opcode {
                tag: Tag::Equal,
                a: op.a.start..op.a.end.min(op.a.start + n),
                b: op.b.start..op.b.end.min(op.b.start + n),
            });
            groups.push(std::mem::take(&mut group));
            op.a.start = op.a.start.max(op.a.end - n);
            op.b.start = op.b.start.max(op.b.end - n);
        }
        group.push(op);
    }

    let only_context = group.len() == 1 && group[0].tag == Tag::Equal;
    if !group.is_empty() && !only_context {
        groups.push(group);
    }

    groups
}
