use std::collections::HashMap;

/// Named signed 64-bit registers, created on first write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterFile {
    values: HashMap<String, i64>,
}

impl RegisterFile {
    /// Creates an empty register file.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads a register; `None` when it was never assigned.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<i64> {
        self.values.get(name).copied()
    }

    /// Writes a register, creating it if needed.
    pub fn set(&mut self, name: &str, value: i64) {
        if let Some(slot) = self.values.get_mut(name) {
            *slot = value;
        } else {
            self.values.insert(name.to_string(), value);
        }
    }

    /// Number of assigned registers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when nothing has been assigned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Register contents sorted by name.
    #[must_use]
    pub fn sorted(&self) -> Vec<(&str, i64)> {
        let mut entries: Vec<_> = self
            .values
            .iter()
            .map(|(name, value)| (name.as_str(), *value))
            .collect();
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

/// Operand pair recorded by the last `cmp`.
///
/// Starts as `(0, 0)` and is only replaced by the next `cmp`; conditional
/// jumps read it without clearing it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ComparisonFlag {
    /// Left `cmp` operand.
    pub left: i64,
    /// Right `cmp` operand.
    pub right: i64,
}

impl ComparisonFlag {
    /// Records a new comparison.
    pub const fn record(&mut self, left: i64, right: i64) {
        self.left = left;
        self.right = right;
    }
}

/// LIFO stack of return line indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CallStack {
    frames: Vec<usize>,
}

impl CallStack {
    /// Creates an empty call stack.
    #[must_use]
    pub const fn new() -> Self {
        Self { frames: Vec::new() }
    }

    /// Pushes the index to resume at after the matching `ret`.
    pub fn push(&mut self, return_to: usize) {
        self.frames.push(return_to);
    }

    /// Pops the most recent return index.
    pub fn pop(&mut self) -> Option<usize> {
        self.frames.pop()
    }

    /// Number of outstanding calls.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Returns `true` when no call is outstanding.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::{CallStack, ComparisonFlag, RegisterFile};

    #[test]
    fn registers_are_created_on_first_write() {
        let mut regs = RegisterFile::new();
        assert!(regs.is_empty());
        assert_eq!(regs.get("a"), None);

        regs.set("a", 5);
        regs.set("a", -2);
        regs.set("B", 9);

        assert_eq!(regs.get("a"), Some(-2));
        assert_eq!(regs.get("B"), Some(9));
        assert_eq!(regs.get("b"), None);
        assert_eq!(regs.len(), 2);
        assert_eq!(regs.sorted(), vec![("B", 9), ("a", -2)]);
    }

    #[test]
    fn comparison_flag_starts_at_zero_and_keeps_last_pair() {
        let mut flag = ComparisonFlag::default();
        assert_eq!((flag.left, flag.right), (0, 0));

        flag.record(81, 153);
        flag.record(4, 2);
        assert_eq!(flag, ComparisonFlag { left: 4, right: 2 });
    }

    #[test]
    fn call_stack_is_lifo_and_tracks_depth() {
        let mut stack = CallStack::new();
        assert!(stack.is_empty());
        assert_eq!(stack.pop(), None);

        stack.push(3);
        stack.push(7);
        assert_eq!(stack.depth(), 2);
        assert_eq!(stack.pop(), Some(7));
        assert_eq!(stack.pop(), Some(3));
        assert_eq!(stack.depth(), 0);
    }
}
