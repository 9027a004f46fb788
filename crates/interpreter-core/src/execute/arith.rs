//! Integer arithmetic under the configured overflow policy.

use crate::api::OverflowPolicy;
use crate::program::ArithOp;

/// Why an arithmetic operation produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithFault {
    /// Divisor was zero.
    DivideByZero,
    /// Result out of range under [`OverflowPolicy::Checked`].
    Overflow,
}

/// Computes `left <op> right`.
///
/// Division truncates toward zero. A zero divisor always faults, whatever the
/// policy.
///
/// # Errors
///
/// Returns [`ArithFault::DivideByZero`] for `div` by zero and
/// [`ArithFault::Overflow`] when a checked operation leaves the `i64` range.
pub const fn apply(
    op: ArithOp,
    left: i64,
    right: i64,
    policy: OverflowPolicy,
) -> Result<i64, ArithFault> {
    if matches!(op, ArithOp::Div) && right == 0 {
        return Err(ArithFault::DivideByZero);
    }

    match policy {
        OverflowPolicy::Checked => {
            let result = match op {
                ArithOp::Add => left.checked_add(right),
                ArithOp::Sub => left.checked_sub(right),
                ArithOp::Mul => left.checked_mul(right),
                ArithOp::Div => left.checked_div(right),
            };
            match result {
                Some(value) => Ok(value),
                None => Err(ArithFault::Overflow),
            }
        }
        OverflowPolicy::Wrapping => Ok(match op {
            ArithOp::Add => left.wrapping_add(right),
            ArithOp::Sub => left.wrapping_sub(right),
            ArithOp::Mul => left.wrapping_mul(right),
            ArithOp::Div => left.wrapping_div(right),
        }),
        OverflowPolicy::Saturating => Ok(match op {
            ArithOp::Add => left.saturating_add(right),
            ArithOp::Sub => left.saturating_sub(right),
            ArithOp::Mul => left.saturating_mul(right),
            ArithOp::Div => left.saturating_div(right),
        }),
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::{apply, ArithFault};
    use crate::api::OverflowPolicy;
    use crate::program::ArithOp;

    #[rstest]
    #[case(ArithOp::Add, 2, 3, 5)]
    #[case(ArithOp::Sub, 2, 3, -1)]
    #[case(ArithOp::Mul, -4, 3, -12)]
    #[case(ArithOp::Div, 7, 2, 3)]
    #[case(ArithOp::Div, -7, 2, -3)]
    #[case(ArithOp::Div, 7, -2, -3)]
    fn in_range_results_agree_across_policies(
        #[case] op: ArithOp,
        #[case] left: i64,
        #[case] right: i64,
        #[case] expected: i64,
    ) {
        for policy in [
            OverflowPolicy::Checked,
            OverflowPolicy::Wrapping,
            OverflowPolicy::Saturating,
        ] {
            assert_eq!(apply(op, left, right, policy), Ok(expected));
        }
    }

    #[test]
    fn zero_divisor_faults_under_every_policy() {
        for policy in [
            OverflowPolicy::Checked,
            OverflowPolicy::Wrapping,
            OverflowPolicy::Saturating,
        ] {
            assert_eq!(
                apply(ArithOp::Div, 5, 0, policy),
                Err(ArithFault::DivideByZero)
            );
        }
    }

    #[rstest]
    #[case(ArithOp::Add, i64::MAX, 1, i64::MIN, i64::MAX)]
    #[case(ArithOp::Sub, i64::MIN, 1, i64::MAX, i64::MIN)]
    #[case(ArithOp::Mul, i64::MAX, 2, -2, i64::MAX)]
    #[case(ArithOp::Div, i64::MIN, -1, i64::MIN, i64::MAX)]
    fn overflow_follows_policy(
        #[case] op: ArithOp,
        #[case] left: i64,
        #[case] right: i64,
        #[case] wrapped: i64,
        #[case] saturated: i64,
    ) {
        assert_eq!(
            apply(op, left, right, OverflowPolicy::Checked),
            Err(ArithFault::Overflow)
        );
        assert_eq!(
            apply(op, left, right, OverflowPolicy::Wrapping),
            Ok(wrapped)
        );
        assert_eq!(
            apply(op, left, right, OverflowPolicy::Saturating),
            Ok(saturated)
        );
    }
}
