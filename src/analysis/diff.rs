//! Line-based diff between two texts

use std::fmt;

use serde::Serialize;

/// How a run of lines differs between the old and new text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Unchanged,
    Removed,
    Added,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeKind::Unchanged => write!(f, "unchanged"),
            ChangeKind::Removed => write!(f, "removed"),
            ChangeKind::Added => write!(f, "added"),
        }
    }
}

/// A maximal run of consecutive lines with the same kind
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub kind: ChangeKind,
    /// The lines of the run, each with its line terminator
    pub value: String,
    /// Number of lines in the run
    pub count: usize,
}

/// Number of changes of each kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub removed: usize,
    pub added: usize,
    pub unchanged: usize,
}

impl DiffSummary {
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut summary = Self::default();
        for change in changes {
            match change.kind {
                ChangeKind::Removed => summary.removed += 1,
                ChangeKind::Added => summary.added += 1,
                ChangeKind::Unchanged => summary.unchanged += 1,
            }
        }
        summary
    }
}

/// Diff two texts line by line
///
/// Lines keep their trailing `\n`, so a final line without one differs from
/// the same line with one. Inside each changed region the removed lines come
/// before the added lines.
pub fn diff_lines(old: &str, new: &str) -> Vec<Change> {
    let old: Vec<&str> = old.split_inclusive('\n').collect();
    let new: Vec<&str> = new.split_inclusive('\n').collect();

    let prefix = old
        .iter()
        .zip(&new)
        .take_while(|(a, b)| a == b)
        .count();
    let suffix = old[prefix..]
        .iter()
        .rev()
        .zip(new[prefix..].iter().rev())
        .take_while(|(a, b)| a == b)
        .count();

    let mut builder = ChangeBuilder::default();
    for line in &old[..prefix] {
        builder.push(ChangeKind::Unchanged, line);
    }
    diff_middle(
        &old[prefix..old.len() - suffix],
        &new[prefix..new.len() - suffix],
        &mut builder,
    );
    for line in &old[old.len() - suffix..] {
        builder.push(ChangeKind::Unchanged, line);
    }
    builder.finish()
}

/// One step of an edit script, indexing into the old or new lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Edit {
    Keep(usize),
    Remove(usize),
    Insert(usize),
}

/// Diff the differing middle part, grouping each changed region
fn diff_middle(old: &[&str], new: &[&str], builder: &mut ChangeBuilder) {
    let mut removed = Vec::new();
    let mut added = Vec::new();
    for edit in edit_script(old, new) {
        match edit {
            Edit::Keep(i) => {
                builder.flush_region(&mut removed, &mut added);
                builder.push(ChangeKind::Unchanged, old[i]);
            }
            Edit::Remove(i) => removed.push(old[i]),
            Edit::Insert(j) => added.push(new[j]),
        }
    }
    builder.flush_region(&mut removed, &mut added);
}

/// Shortest edit script between two line lists (Myers' greedy algorithm)
///
/// Takes O((N+M)·D) time for D edits. One frontier of N+M entries is kept
/// per edit step for the backtrack, so memory also grows with D rather than
/// with N·M: two long prompts that differ in a few lines stay cheap.
fn edit_script(old: &[&str], new: &[&str]) -> Vec<Edit> {
    let (n, m) = (old.len() as isize, new.len() as isize);
    let max = n + m;
    let offset = max + 1;
    let at = |k: isize| (k + offset) as usize;

    // frontier[at(k)] = furthest x reached on diagonal k = x - y
    let mut frontier = vec![0isize; (2 * max + 3) as usize];
    let mut trace = Vec::new();
    'search: for d in 0..=max {
        trace.push(frontier.clone());
        for k in (-d..=d).step_by(2) {
            let mut x = if k == -d || (k != d && frontier[at(k - 1)] < frontier[at(k + 1)]) {
                frontier[at(k + 1)]
            } else {
                frontier[at(k - 1)] + 1
            };
            let mut y = x - k;
            while x < n && y < m && old[x as usize] == new[y as usize] {
                x += 1;
                y += 1;
            }
            frontier[at(k)] = x;
            if x >= n && y >= m {
                break 'search;
            }
        }
    }

    let mut edits = Vec::new();
    let (mut x, mut y) = (n, m);
    for (d, frontier) in trace.iter().enumerate().rev() {
        let d = d as isize;
        let k = x - y;
        let prev_k = if k == -d || (k != d && frontier[at(k - 1)] < frontier[at(k + 1)]) {
            k + 1
        } else {
            k - 1
        };
        let prev_x = frontier[at(prev_k)];
        let prev_y = prev_x - prev_k;
        while x > prev_x && y > prev_y {
            x -= 1;
            y -= 1;
            edits.push(Edit::Keep(x as usize));
        }
        if d > 0 {
            if x == prev_x {
                edits.push(Edit::Insert(prev_y as usize));
            } else {
                edits.push(Edit::Remove(prev_x as usize));
            }
        }
        x = prev_x;
        y = prev_y;
    }
    edits.reverse();
    edits
}

#[derive(Default)]
struct ChangeBuilder {
    changes: Vec<Change>,
}

impl ChangeBuilder {
    fn push(&mut self, kind: ChangeKind, line: &str) {
        match self.changes.last_mut() {
            Some(last) if last.kind == kind => {
                last.value.push_str(line);
                last.count += 1;
            }
            _ => self.changes.push(Change {
                kind,
                value: line.to_string(),
                count: 1,
            }),
        }
    }

    fn flush_region(&mut self, removed: &mut Vec<&str>, added: &mut Vec<&str>) {
        for line in removed.drain(..) {
            self.push(ChangeKind::Removed, line);
        }
        for line in added.drain(..) {
            self.push(ChangeKind::Added, line);
        }
    }

    fn finish(self) -> Vec<Change> {
        self.changes
    }
}

/// Render changes as text, one line per source line with a `-`/`+`/space marker
pub fn render_diff(changes: &[Change]) -> String {
    let mut out = String::new();
    for change in changes {
        let marker = match change.kind {
            ChangeKind::Unchanged => ' ',
            ChangeKind::Removed => '-',
            ChangeKind::Added => '+',
        };
        for line in change.value.split_inclusive('\n') {
            out.push(marker);
            out.push(' ');
            out.push_str(line);
            if !line.ends_with('\n') {
                out.push('\n');
            }
        }
    }
    out
}
