//! Label index: label name to program line index.
//!
//! Built once from the loaded program before execution so jumps and calls
//! resolve in constant time.

use std::collections::HashMap;

use crate::fault::ParseErrorKind;

/// Where a label points and where it was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelDefinition {
    /// Program line index of the label line.
    pub index: usize,
    /// 1-indexed source line of the definition.
    pub defined_at: usize,
}

/// Mapping from label name to its single definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelIndex {
    labels: HashMap<String, LabelDefinition>,
}

impl LabelIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a label definition.
    ///
    /// # Errors
    ///
    /// Returns [`ParseErrorKind::DuplicateLabel`] when `name` is already
    /// defined; the first definition is kept.
    pub fn define(
        &mut self,
        name: &str,
        definition: LabelDefinition,
    ) -> Result<(), ParseErrorKind> {
        if let Some(existing) = self.labels.get(name) {
            return Err(ParseErrorKind::DuplicateLabel {
                name: name.to_string(),
                first_definition: existing.defined_at,
            });
        }
        self.labels.insert(name.to_string(), definition);
        Ok(())
    }

    /// Program line index for `name`, matched exactly.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<usize> {
        self.labels.get(name).map(|def| def.index)
    }

    /// Full definition record for `name`.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<LabelDefinition> {
        self.labels.get(name).copied()
    }

    /// Number of defined labels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns `true` when no labels are defined.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Label names sorted by program position.
    #[must_use]
    pub fn names_in_order(&self) -> Vec<&str> {
        let mut entries: Vec<_> = self.labels.iter().collect();
        entries.sort_by_key(|(_, def)| def.index);
        entries.into_iter().map(|(name, _)| name.as_str()).collect()
    }
}
