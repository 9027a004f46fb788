//! Source ingestion for plain and literate program files.
//!
//! - **Literate** (`.md`): Markdown where fenced code blocks tagged `asm`
//!   hold the program and everything else is prose.
//! - **Plain** (any other extension): the whole file is program text.
//!
//! Both paths yield preprocessed lines numbered against the original file, so
//! load and runtime errors point at the line the user actually wrote.

use std::path::Path;

use interpreter_core::{preprocess, preprocess_numbered, SourceLine};

/// Language tag that marks a fenced block as program text.
pub const LITERATE_TAG: &str = "asm";

/// Extracts program lines from a file's contents.
///
/// For `.md` files, only fenced code blocks tagged [`LITERATE_TAG`] are read.
/// For all other files, the entire content is program text.
#[must_use]
pub fn extract_source(file_path: &Path, content: &str) -> Vec<SourceLine> {
    if is_literate_file(file_path) {
        preprocess_numbered(literate_lines(content))
    } else {
        preprocess(content)
    }
}

/// Returns `true` if the file should be read as Markdown.
#[must_use]
pub fn is_literate_file(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Lines inside `asm` blocks, paired with their 1-indexed file line.
fn literate_lines(content: &str) -> Vec<(usize, &str)> {
    let mut lines = Vec::new();
    let mut in_block = false;
    let mut fence_len = 0;

    for (idx, line) in content.lines().enumerate() {
        let line_num = idx + 1;

        match fence_length(line) {
            Some(len) if in_block && len >= fence_len => {
                in_block = false;
                fence_len = 0;
            }
            Some(len) if !in_block => {
                if fence_info(line, len) == LITERATE_TAG {
                    in_block = true;
                    fence_len = len;
                }
            }
            // A shorter fence inside a block is program text.
            Some(_) => lines.push((line_num, line)),
            None if in_block => lines.push((line_num, line)),
            None => {}
        }
    }

    lines
}

/// Number of backticks opening a fence, if `line` is one.
fn fence_length(line: &str) -> Option<usize> {
    let count = line.trim_start().chars().take_while(|&c| c == '`').count();
    (count >= 3).then_some(count)
}

/// First word of the info string after the fence.
fn fence_info(line: &str, fence_len: usize) -> &str {
    let after_fence = &line.trim_start()[fence_len..];
    after_fence.split_whitespace().next().unwrap_or("")
}
