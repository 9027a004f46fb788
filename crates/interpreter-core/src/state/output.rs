/// Append-only sequence of `msg` fragments for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputBuffer {
    fragments: Vec<String>,
}

impl OutputBuffer {
    /// Creates an empty buffer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            fragments: Vec::new(),
        }
    }

    /// Appends one fragment.
    pub fn push(&mut self, fragment: String) {
        self.fragments.push(fragment);
    }

    /// Returns `true` when nothing has been emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty()
    }

    /// Concatenation of every fragment with no separator.
    #[must_use]
    pub fn contents(&self) -> String {
        self.fragments.concat()
    }
}
