//! Source preprocessing: comment stripping and blank-line removal.
//!
//! The preprocessor turns raw program text into the ordered list of
//! instruction and label lines the rest of the pipeline works on. Each kept
//! line remembers its 1-indexed position in the original text so that parse
//! and runtime errors can point back at the source.

/// Comment marker; everything from here to end of line is ignored.
pub const COMMENT_MARKER: char = ';';

/// Delimiter for text literals.
pub const QUOTE: char = '\'';

/// A preprocessed, trimmed, non-empty source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The line text with comments and surrounding whitespace removed.
    pub text: String,
    /// 1-indexed line number in the original source.
    pub original_line: usize,
}

impl SourceLine {
    /// Creates a source line from already-cleaned text.
    #[must_use]
    pub fn new(text: impl Into<String>, original_line: usize) -> Self {
        Self {
            text: text.into(),
            original_line,
        }
    }
}

/// Strips comments and blank lines from `source`.
///
/// Both `\n` and `\r\n` separators are accepted. Relative line order is
/// preserved, and label lines stay interleaved with instruction lines.
#[must_use]
pub fn preprocess(source: &str) -> Vec<SourceLine> {
    preprocess_numbered((1..).zip(source.lines()))
}

/// Strips comments and blank lines from lines that already carry their
/// original line numbers, such as code extracted from a larger document.
#[must_use]
pub fn preprocess_numbered<'a>(
    lines: impl IntoIterator<Item = (usize, &'a str)>,
) -> Vec<SourceLine> {
    lines
        .into_iter()
        .filter_map(|(line_number, line)| {
            let text = strip_comment(line).trim();
            (!text.is_empty()).then(|| SourceLine::new(text, line_number))
        })
        .collect()
}

/// Removes a trailing comment from a single line.
///
/// A `;` inside a single-quoted literal belongs to the literal. An unbalanced
/// quote leaves the rest of the line intact so the line parser can report it.
#[must_use]
pub fn strip_comment(line: &str) -> &str {
    let mut in_quote = false;
    for (pos, ch) in line.char_indices() {
        match ch {
            QUOTE => in_quote = !in_quote,
            COMMENT_MARKER if !in_quote => return &line[..pos],
            _ => {}
        }
    }
    line
}
