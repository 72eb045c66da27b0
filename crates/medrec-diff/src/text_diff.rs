//! Line-level diff of free-text fields such as an entry's description.
//!
//! Display only: the structural diff already says *that* a text field
//! changed, this says *where*. Uses the `similar` crate (Myers diff).

use similar::{ChangeTag, TextDiff};

/// Line diff of two texts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LineDiff {
    /// The diff hunks.
    pub hunks: Vec<DiffHunk>,
    /// Total number of lines in the old text.
    pub old_lines: usize,
    /// Total number of lines in the new text.
    pub new_lines: usize,
}

impl LineDiff {
    /// Returns `true` if the two texts are identical.
    pub fn is_empty(&self) -> bool {
        self.hunks.is_empty()
    }

    pub fn additions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Added(_)))
            .count()
    }

    pub fn deletions(&self) -> usize {
        self.lines()
            .filter(|l| matches!(l, DiffLine::Removed(_)))
            .count()
    }

    fn lines(&self) -> impl Iterator<Item = &DiffLine> {
        self.hunks.iter().flat_map(|h| &h.lines)
    }
}

/// A contiguous region of changes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiffHunk {
    /// Line number in the old text where this hunk starts (1-based).
    pub old_start: usize,
    /// Line number in the new text where this hunk starts (1-based).
    pub new_start: usize,
    pub lines: Vec<DiffLine>,
}

/// A single line (or word, see [`word_changes`]) in a diff.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DiffLine {
    Context(String),
    Added(String),
    Removed(String),
}

/// Compute a line-by-line diff with one line of context around changes.
pub fn diff_text(old: &str, new: &str) -> LineDiff {
    let old_lines = old.lines().count();
    let new_lines = new.lines().count();

    if old == new {
        return LineDiff {
            hunks: Vec::new(),
            old_lines,
            new_lines,
        };
    }

    let text_diff = TextDiff::from_lines(old, new);
    let hunks = text_diff
        .grouped_ops(1)
        .iter()
        .filter_map(|group| {
            let first = group.first()?;
            let lines = group
                .iter()
                .flat_map(|op| text_diff.iter_changes(op))
                .map(|change| {
                    let text = change.value().trim_end_matches('\n').to_string();
                    tagged(change.tag(), text)
                })
                .collect();
            Some(DiffHunk {
                old_start: first.old_range().start + 1,
                new_start: first.new_range().start + 1,
                lines,
            })
        })
        .collect();

    LineDiff {
        hunks,
        old_lines,
        new_lines,
    }
}

/// Word-level changes for short, single-line texts.
///
/// Whitespace runs are tokens of their own, so concatenating the context
/// and added parts reproduces `new`.
pub fn word_changes(old: &str, new: &str) -> Vec<DiffLine> {
    let text_diff = TextDiff::from_words(old, new);
    text_diff
        .iter_all_changes()
        .map(|change| tagged(change.tag(), change.value().to_string()))
        .collect()
}

fn tagged(tag: ChangeTag, text: String) -> DiffLine {
    match tag {
        ChangeTag::Equal => DiffLine::Context(text),
        ChangeTag::Delete => DiffLine::Removed(text),
        ChangeTag::Insert => DiffLine::Added(text),
    }
}
