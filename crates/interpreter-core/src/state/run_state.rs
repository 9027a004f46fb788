use crate::ErrorKind;

/// Execution state machine for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize, serde::Serialize))]
pub enum RunState {
    /// Ready to execute the line at `pointer`.
    Running {
        /// Index of the next program line.
        pointer: usize,
    },
    /// `end` executed; the output buffer is final.
    Halted,
    /// A fault aborted the run.
    Failed(ErrorKind),
}

impl Default for RunState {
    fn default() -> Self {
        Self::Running { pointer: 0 }
    }
}

#[cfg(test)]
mod tests {
    use super::RunState;
    use crate::ErrorKind;

    #[test]
    fn run_state_default_is_running_at_zero() {
        assert_eq!(RunState::default(), RunState::Running { pointer: 0 });
    }

    #[test]
    fn failed_state_carries_its_kind() {
        assert_ne!(
            RunState::Failed(ErrorKind::StackUnderflow),
            RunState::Failed(ErrorKind::DivideByZero)
        );
        assert_ne!(RunState::Halted, RunState::Running { pointer: 0 });
    }
}
